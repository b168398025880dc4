//! serde Serializer into the value tree.
//!
//! Every serialized value becomes `Option<Value>`; `None` stands for
//! "nothing to store" and is what `()` and `Option::None` produce.
//!
//! ## Mapping summary
//! - `bool` → Bool, integers that fit `i32` → Integer, floats → Real
//! - `char` / `str` → String
//! - `None` / `()` / unit struct → absent (omitted from dicts, dropped from arrays)
//! - seq / tuple / tuple struct → Array
//! - map / struct → Dict; map keys must serialize to strings, integers or bools
//! - unit variant → String holding the variant name
//! - other variants → single-entry Dict keyed by the variant name; a newtype
//!   variant whose body serializes to nothing is rejected
//! - bytes are not representable

use serde::ser::{self, Serialize};
use std::sync::Arc;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::numeric;
use crate::settings::Settings;
use crate::value::Value;

// ── Public entry points ────────────────────────────────────────────────────

/// Serialize `value` into a [`Value`]. `None` if it serializes to nothing.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Option<Value>> {
    value.serialize(Serializer::new(Settings::shared_default()))
}

/// Serialize `value` into a root dictionary carrying `settings`.
///
/// Fails unless `value` serializes to a map, a struct or a struct variant.
pub fn to_dictionary<T: Serialize + ?Sized>(value: &T, settings: &Settings) -> Result<Dictionary> {
    let serializer = Serializer::new(Arc::new(settings.clone()));
    match value.serialize(serializer)? {
        Some(Value::Dict(dict)) => Ok(dict),
        Some(other) => Err(Error::UnsupportedValueKind(format!(
            "the root of a plist must be a dict, found {}",
            other.kind()
        ))),
        None => Err(Error::UnsupportedValueKind(
            "the root of a plist must be a dict, found nothing".to_owned(),
        )),
    }
}

// ── Serializer ─────────────────────────────────────────────────────────────

/// Builds [`Value`]s. Dictionaries it creates share its settings.
#[derive(Debug, Clone)]
pub struct Serializer {
    settings: Arc<Settings>,
}

impl Serializer {
    pub fn new(settings: Arc<Settings>) -> Self {
        Serializer { settings }
    }

    fn dictionary(&self) -> Dictionary {
        Dictionary::with_settings(Arc::clone(&self.settings))
    }

    fn integer<N: TryInto<i32> + Copy + std::fmt::Display>(v: N) -> Result<Option<Value>> {
        v.try_into()
            .map(|v| Some(Value::Integer(v)))
            .map_err(|_| Error::UnsupportedValueKind(format!("{v} does not fit a 32-bit integer")))
    }
}

impl ser::Serializer for Serializer {
    type Ok = Option<Value>;
    type Error = Error;

    type SerializeSeq = SerializeArray;
    type SerializeTuple = SerializeArray;
    type SerializeTupleStruct = SerializeArray;
    type SerializeTupleVariant = SerializeVariant<SerializeArray>;
    type SerializeMap = SerializeDict;
    type SerializeStruct = SerializeDict;
    type SerializeStructVariant = SerializeVariant<SerializeDict>;

    // ── Primitives ─────────────────────────────────────────────────────────

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(Some(Value::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        Ok(Some(Value::Integer(v.into())))
    }
    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        Ok(Some(Value::Integer(v.into())))
    }
    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        Ok(Some(Value::Integer(v)))
    }
    /// Only values within `i32` range are accepted
    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        Self::integer(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        Ok(Some(Value::Integer(v.into())))
    }
    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        Ok(Some(Value::Integer(v.into())))
    }
    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        Self::integer(v)
    }
    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        Self::integer(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        Ok(Some(Value::Real(v)))
    }
    /// Narrowed to `f32`, the only real width the format carries
    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        Ok(Some(Value::Real(v as f32)))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        Ok(Some(Value::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(Some(Value::String(v.to_owned())))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
        Err(Error::UnsupportedValueKind(
            "byte strings have no plist representation".to_owned(),
        ))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(None)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(None)
    }

    /// Unit variant → its name as a string
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        Ok(Some(Value::String(variant.to_owned())))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self)
    }

    /// Newtype variant → `{ variant: value }`
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        let mut dict = self.dictionary();
        let Some(body) = value.serialize(self)? else {
            return Err(Error::UnsupportedValueKind(format!(
                "variant `{variant}` has an empty body"
            )));
        };
        dict.insert(variant, body);
        Ok(Some(Value::Dict(dict)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeArray {
            serializer: self,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    /// Tuple variant → `{ variant: [fields..] }`
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeVariant {
            variant,
            inner: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeDict {
            dict: self.dictionary(),
            serializer: self,
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    /// Struct variant → `{ variant: { fields.. } }`
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeVariant {
            variant,
            inner: self.serialize_map(Some(len))?,
        })
    }
}

// ── Compound serializers ───────────────────────────────────────────────────

pub struct SerializeArray {
    serializer: Serializer,
    items: Vec<Value>,
}

impl SerializeArray {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        if let Some(value) = value.serialize(self.serializer.clone())? {
            self.items.push(value);
        }
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Array(self.items)
    }
}

macro_rules! forward_serialize_element {
    ($t:path, $method:ident) => {
        impl $t for SerializeArray {
            type Ok = Option<Value>;
            type Error = Error;
            fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                self.push(value)
            }
            fn end(self) -> Result<Option<Value>> {
                Ok(Some(self.finish()))
            }
        }
    };
}

forward_serialize_element!(ser::SerializeSeq, serialize_element);
forward_serialize_element!(ser::SerializeTuple, serialize_element);
forward_serialize_element!(ser::SerializeTupleStruct, serialize_field);

pub struct SerializeDict {
    serializer: Serializer,
    dict: Dictionary,
    pending_key: Option<String>,
}

impl SerializeDict {
    fn entry<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<()> {
        let value = value.serialize(self.serializer.clone())?;
        self.dict.insert_entry(key, value);
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Dict(self.dict)
    }
}

impl ser::SerializeMap for SerializeDict {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::Message("map value serialized before its key".to_owned()))?;
        self.entry(key, value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeStruct for SerializeDict {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.entry(key.to_owned(), value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(self.finish()))
    }
}

/// Wraps a variant body in a single-entry dict.
pub struct SerializeVariant<S> {
    variant: &'static str,
    inner: S,
}

impl<S> SerializeVariant<S> {
    fn wrap(variant: &'static str, body: Value, settings: &Arc<Settings>) -> Option<Value> {
        let mut dict = Dictionary::with_settings(Arc::clone(settings));
        dict.insert(variant, body);
        Some(Value::Dict(dict))
    }
}

impl ser::SerializeTupleVariant for SerializeVariant<SerializeArray> {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.inner.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        let settings = Arc::clone(&self.inner.serializer.settings);
        Ok(Self::wrap(self.variant, self.inner.finish(), &settings))
    }
}

impl ser::SerializeStructVariant for SerializeVariant<SerializeDict> {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.inner.entry(key.to_owned(), value)
    }

    fn end(self) -> Result<Option<Value>> {
        let settings = Arc::clone(&self.inner.serializer.settings);
        Ok(Self::wrap(self.variant, self.inner.finish(), &settings))
    }
}

// ── KeySerializer ──────────────────────────────────────────────────────────
//
// Dictionary keys are strings on the wire. Integer and bool keys are written
// with their text form; anything else is rejected.

struct KeySerializer;

fn key_error(what: &str) -> Error {
    Error::UnsupportedValueKind(format!("{what} cannot be used as a dictionary key"))
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_owned())
    }
    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(numeric::format_integer(v.into()))
    }
    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(numeric::format_integer(v.into()))
    }
    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(numeric::format_integer(v))
    }
    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(itoa::Buffer::new().format(v).to_owned())
    }
    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(numeric::format_integer(v.into()))
    }
    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(numeric::format_integer(v.into()))
    }
    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(itoa::Buffer::new().format(v).to_owned())
    }
    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(itoa::Buffer::new().format(v).to_owned())
    }
    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(key_error("a float"))
    }
    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(key_error("a float"))
    }
    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_error("a byte string"))
    }
    fn serialize_none(self) -> Result<String> {
        Err(key_error("`None`"))
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<String> {
        Err(key_error("`()`"))
    }
    fn serialize_unit_struct(self, name: &'static str) -> Result<String> {
        Err(key_error(name))
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_owned())
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(key_error("a newtype variant"))
    }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_error("a sequence"))
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_error("a tuple"))
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_error("a tuple struct"))
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_error("a tuple variant"))
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_error("a map"))
    }
    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_error(name))
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_error("a struct variant"))
    }
}
