//! serde Deserializer over the value tree.
//!
//! Strings are borrowed from the tree, so `&str` fields work as long as the
//! tree outlives the result.

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::value::Value;
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;

/// Deserialize a `T` from a single value.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(Deserializer::from_value(value))
}

/// Deserialize a `T` from a root dictionary.
pub fn from_dictionary<T: DeserializeOwned>(dict: &Dictionary) -> Result<T> {
    T::deserialize(Deserializer::from_dictionary(dict))
}

#[derive(Debug, Clone, Copy)]
enum Node<'de> {
    Value(&'de Value),
    Dict(&'de Dictionary),
}

/// Reads from a borrowed [`Value`] or [`Dictionary`].
#[derive(Debug, Clone, Copy)]
pub struct Deserializer<'de> {
    node: Node<'de>,
}

impl<'de> Deserializer<'de> {
    pub fn from_value(value: &'de Value) -> Self {
        Deserializer {
            node: Node::Value(value),
        }
    }

    pub fn from_dictionary(dict: &'de Dictionary) -> Self {
        Deserializer {
            node: Node::Dict(dict),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = match self.node {
            Node::Value(v) => v.kind().to_string(),
            Node::Dict(_) => "dict".to_owned(),
        };
        Error::UnsupportedValueKind(format!("expected {expected}, found {found}"))
    }
}

// ── Main Deserializer impl ─────────────────────────────────────────────────

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            Node::Dict(dict) | Node::Value(Value::Dict(dict)) => {
                visitor.visit_map(MapDeserializer::new(dict))
            }
            Node::Value(Value::String(s)) => visitor.visit_borrowed_str(s),
            Node::Value(Value::Integer(v)) => visitor.visit_i32(*v),
            Node::Value(Value::Real(v)) => visitor.visit_f32(*v),
            Node::Value(Value::Bool(v)) => visitor.visit_bool(*v),
            Node::Value(Value::Array(items)) => visitor.visit_seq(SeqDeserializer::new(items)),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::UnsupportedValueKind(
            "byte strings have no plist representation".to_owned(),
        ))
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    /// A value that exists is always `Some`; absent entries never reach here.
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    /// Unit variants are read from a string, all others from a single-entry dict.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.node {
            Node::Value(Value::String(variant)) => visitor.visit_enum(EnumDeserializer {
                variant,
                body: None,
            }),
            Node::Dict(dict) | Node::Value(Value::Dict(dict)) => {
                let mut entries = dict.present();
                match (entries.next(), entries.next()) {
                    (Some((variant, body)), None) => visitor.visit_enum(EnumDeserializer {
                        variant,
                        body: Some(body),
                    }),
                    _ => Err(self.unexpected("a dict with exactly one entry")),
                }
            }
            _ => Err(self.unexpected("a string or a single-entry dict")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}

// ── Sequence access ────────────────────────────────────────────────────────

struct SeqDeserializer<'de> {
    items: std::slice::Iter<'de, Value>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(items: &'de [Value]) -> Self {
        SeqDeserializer {
            items: items.iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        self.items
            .next()
            .map(|item| seed.deserialize(Deserializer::from_value(item)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

// ── Map access ─────────────────────────────────────────────────────────────

/// Walks the present entries of a dictionary; absent entries are skipped.
struct MapDeserializer<'de> {
    entries: std::vec::IntoIter<(&'de str, &'de Value)>,
    pending: Option<&'de Value>,
}

impl<'de> MapDeserializer<'de> {
    fn new(dict: &'de Dictionary) -> Self {
        MapDeserializer {
            entries: dict.present().collect::<Vec<_>>().into_iter(),
            pending: None,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer<'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.entries.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(KeyDeserializer(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        match self.pending.take() {
            Some(value) => seed.deserialize(Deserializer::from_value(value)),
            None => Err(Error::Message("map value requested before its key".to_owned())),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

// ── Keys ───────────────────────────────────────────────────────────────────
//
// Keys are always text. Numeric and bool map keys are parsed back from it.

struct KeyDeserializer<'de>(&'de str);

macro_rules! parse_key {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                match self.0.trim().parse::<$ty>() {
                    Ok(v) => visitor.$visit(v),
                    Err(_) => Err(Error::UnsupportedValueKind(format!(
                        "dictionary key `{}` is not a valid {}",
                        self.0,
                        stringify!($ty)
                    ))),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_str(self.0)
    }

    parse_key! {
        deserialize_bool => visit_bool: bool,
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_enum(self.0.into_deserializer())
    }

    forward_to_deserialize_any! {
        i128 u128 f32 f64 char str string bytes byte_buf unit unit_struct
        seq tuple tuple_struct map struct identifier ignored_any
    }
}

// ── Enum access ────────────────────────────────────────────────────────────

struct EnumDeserializer<'de> {
    variant: &'de str,
    body: Option<&'de Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = Error;
    type Variant = VariantDeserializer<'de>;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.variant))?;
        Ok((variant, VariantDeserializer { body: self.body }))
    }
}

struct VariantDeserializer<'de> {
    body: Option<&'de Value>,
}

impl<'de> VariantDeserializer<'de> {
    fn body(&self, expected: &str) -> Result<&'de Value> {
        self.body
            .ok_or_else(|| Error::UnsupportedValueKind(format!("{expected} variant has no body")))
    }
}

impl<'de> VariantAccess<'de> for VariantDeserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(Deserializer::from_value(self.body("newtype")?))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        match self.body("tuple")? {
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            other => Err(Error::UnsupportedValueKind(format!(
                "tuple variant must be an array, found {}",
                other.kind()
            ))),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.body("struct")? {
            Value::Dict(dict) => visitor.visit_map(MapDeserializer::new(dict)),
            other => Err(Error::UnsupportedValueKind(format!(
                "struct variant must be a dict, found {}",
                other.kind()
            ))),
        }
    }
}
