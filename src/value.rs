//! The dynamic value tree.
//!
//! A decoded plist is a [`Dictionary`] whose entries hold [`Value`]s. The set
//! of variants is closed and mirrors the wire vocabulary one to one:
//!
//! | Variant | Full tag | Short tag |
//! |---------|----------|-----------|
//! | [`Value::String`]  | `string`  | `s` |
//! | [`Value::Integer`] | `integer` | `i` |
//! | [`Value::Real`]    | `real`    | `r` |
//! | [`Value::Bool`]    | `true` / `false` | `t` / `f` |
//! | [`Value::Dict`]    | `dict`    | `d` |
//! | [`Value::Array`]   | `array`   | `a` |
//!
//! Absence is not a variant: a dictionary entry may hold `None`, which is
//! never written to the wire.

use serde::de::{self, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::dictionary::Dictionary;

/// A single plist value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i32),
    Real(f32),
    Bool(bool),
    Dict(Dictionary),
    Array(Vec<Value>),
}

/// The variant tag of a [`Value`], used in diagnostics and converter checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Real,
    Bool,
    Dict,
    Array,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Bool => "bool",
            ValueKind::Dict => "dict",
            ValueKind::Array => "array",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Real(_) => ValueKind::Real,
            Value::Bool(_) => ValueKind::Bool,
            Value::Dict(_) => ValueKind::Dict,
            Value::Array(_) => ValueKind::Array,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f32> {
        match self {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_dict(self) -> Option<Dictionary> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Dictionary> for Value {
    fn from(v: Dictionary) -> Self {
        Value::Dict(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

// ── Scalars ────────────────────────────────────────────────────────────────

/// A Rust type that corresponds to exactly one scalar [`Value`] variant.
///
/// Converters are declared in terms of scalars so their input and output
/// kinds can be checked before they are invoked.
pub trait ScalarValue: Sized + Send + Sync + 'static {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

impl ScalarValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl ScalarValue for i32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer()
    }

    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl ScalarValue for f32 {
    const KIND: ValueKind = ValueKind::Real;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_real()
    }

    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl ScalarValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

// ── serde ──────────────────────────────────────────────────────────────────

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(v) => serializer.serialize_i32(*v),
            Value::Real(v) => serializer.serialize_f32(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Dict(d) => d.serialize(serializer),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a plist value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        i32::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &"a 32-bit integer"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        i32::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &"a 32-bit integer"))
    }

    fn visit_f32<E: de::Error>(self, v: f32) -> Result<Value, E> {
        Ok(Value::Real(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Real(v as f32))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Value, A::Error> {
        crate::dictionary::DictionaryVisitor
            .visit_map(map)
            .map(Value::Dict)
    }
}
