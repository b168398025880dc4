use std::any::type_name;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::mapper::descriptor::{ContainerKind, PlistObject};
use crate::value::Value;

/// A Rust type that can be stored in a [`Member`](crate::mapper::Member).
///
/// Decoding returns `Ok(None)` when the invalid-data policy asked to carry on
/// past bad data; the member then keeps the value it already had.
pub trait PlistField: Sized + 'static {
    const KIND: ContainerKind;

    /// Whether absence is a legal state for this field.
    const OPTIONAL: bool = false;

    fn from_plist(value: &Value, mapper: &Mapper) -> Result<Option<Self>>;

    /// Encodes the field. `None` leaves the entry out.
    fn to_plist(&self, mapper: &Mapper) -> Result<Option<Value>>;

    /// Called when the member's key path holds no value.
    fn from_missing(name: &str, mapper: &Mapper) -> Result<Option<Self>> {
        mapper.recover(
            Error::corrupted(format!("no value for member `{name}`")),
            None,
        )
    }
}

fn unsupported<T>(value: &Value, mapper: &Mapper) -> Result<Option<T>> {
    let error = Error::UnsupportedValueKind(format!(
        "cannot read {} as `{}`",
        value.kind(),
        type_name::<T>()
    ));
    mapper.recover(error, None)
}

macro_rules! scalar_field {
    ($ty:ty, $variant:ident, $read:expr) => {
        impl PlistField for $ty {
            const KIND: ContainerKind = ContainerKind::Basic;

            fn from_plist(value: &Value, mapper: &Mapper) -> Result<Option<Self>> {
                match value {
                    Value::$variant(v) => Ok(Some($read(v))),
                    other => unsupported(other, mapper),
                }
            }

            fn to_plist(&self, _mapper: &Mapper) -> Result<Option<Value>> {
                Ok(Some(Value::$variant(self.clone())))
            }
        }
    };
}

scalar_field!(String, String, |v: &String| v.clone());
scalar_field!(i32, Integer, |v: &i32| *v);
scalar_field!(f32, Real, |v: &f32| *v);
scalar_field!(bool, Bool, |v: &bool| *v);

/// A raw value is taken as is.
impl PlistField for Value {
    const KIND: ContainerKind = ContainerKind::Basic;

    fn from_plist(value: &Value, _mapper: &Mapper) -> Result<Option<Self>> {
        Ok(Some(value.clone()))
    }

    fn to_plist(&self, _mapper: &Mapper) -> Result<Option<Value>> {
        Ok(Some(self.clone()))
    }
}

impl PlistField for Dictionary {
    const KIND: ContainerKind = ContainerKind::Basic;

    fn from_plist(value: &Value, mapper: &Mapper) -> Result<Option<Self>> {
        match value {
            Value::Dict(dict) => Ok(Some(dict.clone())),
            other => unsupported(other, mapper),
        }
    }

    fn to_plist(&self, _mapper: &Mapper) -> Result<Option<Value>> {
        Ok(Some(Value::Dict(self.clone())))
    }
}

impl<F: PlistField> PlistField for Option<F> {
    const KIND: ContainerKind = F::KIND;
    const OPTIONAL: bool = true;

    fn from_plist(value: &Value, mapper: &Mapper) -> Result<Option<Self>> {
        F::from_plist(value, mapper).map(|v| v.map(Some))
    }

    fn to_plist(&self, mapper: &Mapper) -> Result<Option<Value>> {
        match self {
            Some(v) => v.to_plist(mapper),
            None => Ok(None),
        }
    }

    fn from_missing(_name: &str, _mapper: &Mapper) -> Result<Option<Self>> {
        Ok(Some(None))
    }
}

impl<T: PlistObject> PlistField for T {
    const KIND: ContainerKind = ContainerKind::NestedObject;

    fn from_plist(value: &Value, mapper: &Mapper) -> Result<Option<Self>> {
        match value {
            Value::Dict(dict) => mapper.deserialize::<T>(dict).map(Some),
            other => {
                let error = Error::corrupted(format!(
                    "`{}` must be stored in a dict, found {}",
                    type_name::<T>(),
                    other.kind()
                ));
                mapper.recover(error, None)
            }
        }
    }

    fn to_plist(&self, mapper: &Mapper) -> Result<Option<Value>> {
        mapper.serialize(self).map(|dict| Some(Value::Dict(dict)))
    }
}

// ── Collections ────────────────────────────────────────────────────────────

/// Decodes every array item as `E`. Items the policy skipped are dropped.
fn decode_items<E: PlistField>(
    value: &Value,
    container: &str,
    mapper: &Mapper,
) -> Result<Option<Vec<E>>> {
    let Value::Array(items) = value else {
        let error = Error::corrupted(format!(
            "`{container}` must be stored in an array, found {}",
            value.kind()
        ));
        return mapper.recover(error, None);
    };
    let mut decoded = Vec::with_capacity(items.len());
    for item in items {
        if let Some(element) = E::from_plist(item, mapper)? {
            decoded.push(element);
        }
    }
    Ok(Some(decoded))
}

fn encode_items<E: PlistField>(items: &[E], mapper: &Mapper) -> Result<Option<Value>> {
    let mut encoded = Vec::with_capacity(items.len());
    for item in items {
        if let Some(value) = item.to_plist(mapper)? {
            encoded.push(value);
        }
    }
    Ok(Some(Value::Array(encoded)))
}

impl<E: PlistField> PlistField for Vec<E> {
    const KIND: ContainerKind = ContainerKind::Collection;

    fn from_plist(value: &Value, mapper: &Mapper) -> Result<Option<Self>> {
        decode_items(value, type_name::<Self>(), mapper)
    }

    fn to_plist(&self, mapper: &Mapper) -> Result<Option<Value>> {
        encode_items(self, mapper)
    }
}

impl<E: PlistField> PlistField for Box<[E]> {
    const KIND: ContainerKind = ContainerKind::Collection;

    fn from_plist(value: &Value, mapper: &Mapper) -> Result<Option<Self>> {
        decode_items(value, type_name::<Self>(), mapper).map(|v| v.map(Vec::into_boxed_slice))
    }

    fn to_plist(&self, mapper: &Mapper) -> Result<Option<Value>> {
        encode_items(self, mapper)
    }
}

/// The array must hold exactly `N` usable items.
impl<E: PlistField, const N: usize> PlistField for [E; N] {
    const KIND: ContainerKind = ContainerKind::Collection;

    fn from_plist(value: &Value, mapper: &Mapper) -> Result<Option<Self>> {
        let Some(items) = decode_items::<E>(value, type_name::<Self>(), mapper)? else {
            return Ok(None);
        };
        match <[E; N]>::try_from(items) {
            Ok(array) => Ok(Some(array)),
            Err(items) => {
                let error = Error::corrupted(format!(
                    "`{}` needs {N} items, found {}",
                    type_name::<Self>(),
                    items.len()
                ));
                mapper.recover(error, None)
            }
        }
    }

    fn to_plist(&self, mapper: &Mapper) -> Result<Option<Value>> {
        encode_items(self, mapper)
    }
}
