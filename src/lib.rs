//! # plist-serde
//!
//! Reading and writing XML property lists, with two ways to get typed data
//! in and out of them.
//!
//! ## Overview
//!
//! A document is decoded into a [`Dictionary`] of [`Value`]s and encoded back
//! from one. Tags may be spelled in the Full vocabulary (`dict`, `integer`,
//! ...) or the Short one (`d`, `i`, ...); [`Settings`] choose which are
//! accepted and which is written.
//!
//! Typed data goes through either
//!
//! - the [`Mapper`], driven by member descriptors declared with
//!   [`plist_object!`]. Members may live under nested key paths and pass
//!   through value converters, or
//! - serde, via [`to_bytes`] / [`from_bytes`] and friends.
//!
//! ## Value mapping
//!
//! | Rust type | Full tag | Short tag |
//! |-----------|----------|-----------|
//! | `String`  | `string`  | `s` |
//! | `i32`     | `integer` | `i` |
//! | `f32`     | `real`    | `r` |
//! | `bool`    | `true` / `false` | `t` / `f` |
//! | nested object, map | `dict` | `d` |
//! | `Vec<T>`, `[T; N]` | `array` | `a` |
//!
//! ## Example
//!
//! ```rust
//! use plist_serde::{Settings, TagVocabulary, deserialize, plist_object, serialize};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Sample {
//!     simple: String,
//!     int_value: i32,
//! }
//!
//! plist_object!(Sample {
//!     simple: ["Simple"],
//!     int_value: ["IntValue"],
//! });
//!
//! let settings = Settings::new(TagVocabulary::Both, TagVocabulary::Short).unwrap();
//! let sample = Sample { simple: "Plist".into(), int_value: 696969 };
//!
//! let bytes = serialize(&sample, &settings).unwrap();
//! let text = String::from_utf8(bytes.clone()).unwrap();
//! assert!(text.contains("<k>IntValue</k>"));
//! assert!(text.contains("<i>696969</i>"));
//!
//! let decoded: Sample = deserialize(&bytes, &settings).unwrap();
//! assert_eq!(decoded, sample);
//! ```

use std::io::{BufRead, Write};
use std::sync::Arc;

pub mod codec;
pub mod converter;
pub mod de;
pub mod dictionary;
pub mod error;
pub mod mapper;
pub mod markup;
#[cfg(feature = "tokio")]
pub mod nonblocking;
mod numeric;
pub mod registry;
pub mod ser;
pub mod settings;
pub mod tags;
pub mod value;

pub use converter::{
    ConverterDescriptor, ConverterUsage, Direction, IntToBoolConverter, PlistConverter,
    StringToBoolConverter,
};
pub use de::{Deserializer, from_dictionary, from_value};
pub use dictionary::Dictionary;
pub use error::{Error, Result};
pub use mapper::{
    ContainerKind, Mapper, Member, ObjectDescriptor, ObjectRegistry, PlistField, PlistObject,
};
pub use registry::ConverterRegistry;
pub use ser::{Serializer, to_dictionary, to_value};
pub use settings::{
    FormattingOptions, Indent, InvalidDataPolicy, Settings, SettingsBuilder, TagVocabulary,
};
pub use value::{ScalarValue, Value, ValueKind};

pub use serde::{Deserialize, Serialize};

// ── Documents ──────────────────────────────────────────────────────────────

/// Decodes a document into its root dictionary.
pub fn load(input: &[u8], settings: &Settings) -> Result<Dictionary> {
    load_from_reader(input, settings)
}

pub fn load_from_reader<R: BufRead>(reader: R, settings: &Settings) -> Result<Dictionary> {
    codec::read_document(reader, Arc::new(settings.clone()))
}

/// Encodes `dict` with the settings it carries.
pub fn save(dict: &Dictionary) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    save_to_writer(dict, &mut out)?;
    Ok(out)
}

pub fn save_to_string(dict: &Dictionary) -> Result<String> {
    String::from_utf8(save(dict)?).map_err(|e| Error::Xml(e.to_string()))
}

pub fn save_to_writer<W: Write>(dict: &Dictionary, writer: W) -> Result<()> {
    codec::write_document(dict, writer)
}

// ── Object mapping ─────────────────────────────────────────────────────────

/// Decodes a document and maps its root dictionary onto `T`.
pub fn deserialize<T: PlistObject>(input: &[u8], settings: &Settings) -> Result<T> {
    deserialize_from_reader(input, settings)
}

pub fn deserialize_from_reader<T: PlistObject, R: BufRead>(
    reader: R,
    settings: &Settings,
) -> Result<T> {
    let dict = load_from_reader(reader, settings)?;
    Mapper::new(Arc::clone(dict.shared_settings())).deserialize(&dict)
}

/// Maps `object` to a dictionary and encodes it.
pub fn serialize<T: PlistObject>(object: &T, settings: &Settings) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    serialize_to_writer(object, settings, &mut out)?;
    Ok(out)
}

pub fn serialize_to_string<T: PlistObject>(object: &T, settings: &Settings) -> Result<String> {
    String::from_utf8(serialize(object, settings)?).map_err(|e| Error::Xml(e.to_string()))
}

pub fn serialize_to_writer<T: PlistObject, W: Write>(
    object: &T,
    settings: &Settings,
    writer: W,
) -> Result<()> {
    let dict = Mapper::new(settings.clone()).serialize(object)?;
    save_to_writer(&dict, writer)
}

// ── serde ──────────────────────────────────────────────────────────────────

/// Decodes a document with default settings and deserializes its root
/// dictionary with serde.
pub fn from_bytes<T: serde::de::DeserializeOwned>(input: &[u8]) -> Result<T> {
    let dict = load(input, &Settings::default())?;
    from_dictionary(&dict)
}

/// Serializes `value` with serde and encodes it with default settings.
///
/// `value` must serialize to a map or a struct.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    save(&to_dictionary(value, &Settings::default())?)
}
