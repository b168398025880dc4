//! Format codec: [`Value`] trees to and from [`Element`] trees.
//!
//! ## Document shape
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <plist version="1.0">
//!   <dict>
//!     <key>Simple</key>
//!     <string>Plist</string>
//!     <key>IntValue</key>
//!     <integer>696969</integer>
//!   </dict>
//! </plist>
//! ```
//!
//! Dictionary children alternate `(key, value)`; array children are values
//! only. Entries that hold no value are never written.

use log::{debug, trace};
use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::markup::Element;
use crate::numeric;
use crate::settings::{Settings, TagVocabulary};
use crate::tags::Tag;
use crate::value::Value;

/// Name of the document element.
pub const ROOT_ELEMENT: &str = "plist";

/// Propagates `error` under `ThrowError`, otherwise logs it and yields `fallback`.
fn recover<T>(settings: &Settings, error: Error, fallback: T) -> Result<T> {
    if settings.invalid_data_policy().is_throw() {
        Err(error)
    } else {
        debug!("ignoring invalid data: {error}");
        Ok(fallback)
    }
}

// ── Decoding ───────────────────────────────────────────────────────────────

/// Decodes one value element. `None` means the element was not understood and
/// the policy asked to carry on.
pub fn decode_value(element: &Element, settings: &Arc<Settings>) -> Result<Option<Value>> {
    let Some(tag) = Tag::resolve(&element.name, settings.input_vocabulary()) else {
        let error = Error::corrupted(format!("unsupported element <{}>", element.name));
        return recover(settings, error, None);
    };
    trace!("decoding <{}> as {tag:?}", element.name);

    match tag {
        Tag::String => Ok(Some(Value::String(element.text.clone()))),
        Tag::Integer => match numeric::parse_integer(&element.text) {
            Some(v) => Ok(Some(Value::Integer(v))),
            None => {
                let error = Error::corrupted(format!("invalid integer `{}`", element.text));
                recover(settings, error, None)
            }
        },
        Tag::Real => match numeric::parse_real(&element.text) {
            Some(v) => Ok(Some(Value::Real(v))),
            None => {
                let error = Error::corrupted(format!("invalid real `{}`", element.text));
                recover(settings, error, None)
            }
        },
        Tag::True => Ok(Some(Value::Bool(true))),
        Tag::False => Ok(Some(Value::Bool(false))),
        Tag::Dict => decode_dict(&element.children, settings).map(|d| Some(Value::Dict(d))),
        Tag::Array => decode_array(&element.children, settings).map(|a| Some(Value::Array(a))),
        Tag::Key => {
            let error = Error::corrupted(format!("<{}> outside of a dictionary", element.name));
            recover(settings, error, None)
        }
    }
}

/// Decodes dictionary children pairwise, in document order. A repeated key
/// overwrites the earlier value.
pub fn decode_dict(children: &[Element], settings: &Arc<Settings>) -> Result<Dictionary> {
    let mut dict = Dictionary::with_settings(Arc::clone(settings));
    for pair in children.chunks(2) {
        let key_element = &pair[0];
        if Tag::resolve(&key_element.name, settings.input_vocabulary()) != Some(Tag::Key) {
            let error = Error::corrupted(format!(
                "expected a key element, found <{}>",
                key_element.name
            ));
            recover(settings, error, ())?;
        }
        let value = match pair.get(1) {
            Some(value_element) => decode_value(value_element, settings)?,
            None => {
                let error =
                    Error::corrupted(format!("key `{}` has no value element", key_element.text));
                recover(settings, error, None)?
            }
        };
        dict.insert_entry(key_element.text.clone(), value);
    }
    Ok(dict)
}

/// Decodes array children in order. Elements that decode to no value are dropped.
pub fn decode_array(children: &[Element], settings: &Arc<Settings>) -> Result<Vec<Value>> {
    let mut items = Vec::with_capacity(children.len());
    for child in children {
        if let Some(value) = decode_value(child, settings)? {
            items.push(value);
        }
    }
    Ok(items)
}

// ── Encoding ───────────────────────────────────────────────────────────────

pub fn encode_value(value: &Value, vocabulary: TagVocabulary) -> Element {
    match value {
        Value::String(s) => Element::with_text(Tag::String.name(vocabulary), s.as_str()),
        Value::Integer(v) => {
            Element::with_text(Tag::Integer.name(vocabulary), numeric::format_integer(*v))
        }
        Value::Real(v) => Element::with_text(Tag::Real.name(vocabulary), numeric::format_real(*v)),
        Value::Bool(true) => Element::new(Tag::True.name(vocabulary)),
        Value::Bool(false) => Element::new(Tag::False.name(vocabulary)),
        Value::Dict(dict) => encode_dict(dict, Tag::Dict.name(vocabulary), vocabulary),
        Value::Array(items) => {
            let mut array = Element::new(Tag::Array.name(vocabulary));
            for item in items {
                array.push(encode_value(item, vocabulary));
            }
            array
        }
    }
}

/// Encodes `dict` into an element named `name`, skipping entries without a value.
pub fn encode_dict(dict: &Dictionary, name: &str, vocabulary: TagVocabulary) -> Element {
    let mut element = Element::new(name);
    for (key, value) in dict.present() {
        trace!("encoding key `{key}`");
        element.push(Element::with_text(Tag::Key.name(vocabulary), key));
        element.push(encode_value(value, vocabulary));
    }
    element
}

// ── Documents ──────────────────────────────────────────────────────────────

/// Reads a plist document and decodes its root dictionary.
pub fn read_document<R: BufRead>(source: R, settings: Arc<Settings>) -> Result<Dictionary> {
    let root = Element::parse(source)?;
    if root.name != ROOT_ELEMENT {
        debug!("unexpected document element <{}>", root.name);
    }
    let accepts_dict = |e: &&Element| {
        e.name == Tag::Dict.full()
            || Tag::resolve(&e.name, settings.input_vocabulary()) == Some(Tag::Dict)
    };
    let Some(dict) = root.children.iter().find(accepts_dict) else {
        return Err(Error::corrupted("missing root dictionary"));
    };
    decode_dict(&dict.children, &settings)
}

/// Writes `dict` as a complete plist document using the dictionary's own settings.
pub fn write_document<W: Write>(dict: &Dictionary, sink: W) -> Result<()> {
    let settings = dict.settings();
    let mut root = Element::new(ROOT_ELEMENT);
    root.attributes = settings.root_attributes().to_vec();
    root.push(encode_dict(dict, Tag::Dict.full(), settings.output_vocabulary()));
    root.write(sink, settings.formatting())
}
