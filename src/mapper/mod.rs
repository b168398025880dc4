//! Descriptor-driven object mapping.
//!
//! A [`Mapper`] turns a [`PlistObject`] into a [`Dictionary`] and back. Each
//! declared [`Member`] is resolved through its key path, optionally passed
//! through a converter, and then decoded according to its field type:
//!
//! - scalars (`String`, `i32`, `f32`, `bool`) and raw [`Value`]s are assigned
//!   as they are,
//! - nested [`PlistObject`]s are read from and written to dicts,
//! - `Vec<E>`, `Box<[E]>` and `[E; N]` are read from and written to arrays.
//!
//! Data that does not fit is reported or skipped according to the
//! [`InvalidDataPolicy`](crate::InvalidDataPolicy) of the mapper's settings.
//! Skipped members keep the value they have in `T::default()`.
//!
//! ```rust
//! use plist_serde::{Mapper, Settings, plist_object};
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
//! let mapper = Mapper::new(Settings::default());
//! let sample = Sample { simple: "Plist".into(), int_value: 696969 };
//! let dict = mapper.serialize(&sample).unwrap();
//! assert_eq!(dict.get("IntValue").and_then(|v| v.as_integer()), Some(696969));
//! assert_eq!(mapper.deserialize::<Sample>(&dict).unwrap(), sample);
//! ```

mod descriptor;
mod dynamic;
mod field;
mod pipeline;

pub use descriptor::{
    ContainerKind, IntoPath, Member, ObjectDescriptor, PlistObject, descriptor_of,
};
pub use dynamic::ObjectRegistry;
pub use field::PlistField;

use log::{debug, trace};
use std::any::type_name;
use std::sync::Arc;

use crate::converter::Direction;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::registry::ConverterRegistry;
use crate::settings::Settings;
use crate::value::Value;

/// Maps [`PlistObject`]s to and from dictionaries under one set of settings.
#[derive(Debug, Clone)]
pub struct Mapper {
    settings: Arc<Settings>,
    converters: Arc<ConverterRegistry>,
}

impl Mapper {
    /// A mapper that caches converters in [`ConverterRegistry::global`].
    pub fn new(settings: impl Into<Arc<Settings>>) -> Self {
        Mapper {
            settings: settings.into(),
            converters: Arc::clone(ConverterRegistry::global()),
        }
    }

    /// Uses `registry` for shared converter instances instead of the global one.
    pub fn with_registry(mut self, registry: Arc<ConverterRegistry>) -> Self {
        self.converters = registry;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Applies the invalid-data policy to `error`.
    ///
    /// Usage errors always propagate. Data errors propagate under
    /// `ThrowError`; otherwise they are logged and `fallback` is returned.
    pub fn recover<T>(&self, error: Error, fallback: T) -> Result<T> {
        if error.is_usage_error() || self.settings.invalid_data_policy().is_throw() {
            Err(error)
        } else {
            debug!("ignoring invalid data: {error}");
            Ok(fallback)
        }
    }

    /// Builds a `T` from `dict`.
    pub fn deserialize<T: PlistObject>(&self, dict: &Dictionary) -> Result<T> {
        let descriptor = descriptor_of::<T>();
        if descriptor.members().is_empty() {
            return Err(Error::NoMappableMembers(type_name::<T>()));
        }

        let mut object = T::default();
        for member in descriptor.members() {
            trace!(
                "reading {:?} member `{}` of {}",
                member.kind(),
                member.name(),
                type_name::<T>()
            );
            let raw = self.resolve(dict, member.key_path())?;
            let converted;
            let value = match member.converter_descriptor() {
                // An absent optional member stays `None` without involving its converter.
                Some(_) if raw.is_none() && member.is_optional() => None,
                Some(converter) => {
                    converted = pipeline::convert(self, converter, raw, Direction::Decode)?;
                    match converted.as_ref() {
                        Some(value) => Some(value),
                        // The pipeline already applied the policy; the member keeps its default.
                        None => continue,
                    }
                }
                None => raw,
            };
            member.assign(&mut object, value, self)?;
        }
        Ok(object)
    }

    /// Flattens `object` into a new dictionary sharing this mapper's settings.
    pub fn serialize<T: PlistObject>(&self, object: &T) -> Result<Dictionary> {
        let descriptor = descriptor_of::<T>();
        if descriptor.members().is_empty() {
            return Err(Error::NoMappableMembers(type_name::<T>()));
        }

        let mut dict = Dictionary::with_settings(Arc::clone(&self.settings));
        for member in descriptor.members() {
            trace!(
                "writing {:?} member `{}` of {}",
                member.kind(),
                member.name(),
                type_name::<T>()
            );
            let Some(value) = member.read(object, self)? else {
                continue;
            };
            let value = match member.converter_descriptor() {
                Some(converter) => {
                    pipeline::convert(self, converter, Some(&value), Direction::Encode)?
                }
                None => Some(value),
            };
            if let Some(value) = value {
                self.store(&mut dict, member.key_path(), value)?;
            }
        }
        Ok(dict)
    }

    /// Follows `path` through nested dicts. A segment before the last that is
    /// not a dict is a data error.
    fn resolve<'a>(&self, dict: &'a Dictionary, path: &[String]) -> Result<Option<&'a Value>> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(None);
        };
        let mut current = dict;
        for segment in parents {
            match current.get(segment) {
                Some(Value::Dict(next)) => current = next,
                found => {
                    let error = Error::corrupted(format!(
                        "`{segment}` in path `{}` is {}, not a dict",
                        path.join("/"),
                        found.map_or("missing".to_owned(), |v| v.kind().to_string())
                    ));
                    return self.recover(error, None);
                }
            }
        }
        Ok(current.get(last))
    }

    /// Stores `value` at `path`, creating intermediate dicts as needed.
    fn store(&self, dict: &mut Dictionary, path: &[String], value: Value) -> Result<()> {
        let Some((segment, rest)) = path.split_first() else {
            return Ok(());
        };
        if rest.is_empty() {
            dict.insert(segment.as_str(), value);
            return Ok(());
        }
        if let Some(Value::Dict(child)) = dict.get_mut(segment) {
            return self.store(child, rest, value);
        }
        if let Some(kind) = dict.get(segment).map(Value::kind) {
            let error = Error::corrupted(format!("`{segment}` already holds {kind}, not a dict"));
            self.recover(error, ())?;
        }
        // Inserting over an existing key keeps its position.
        let mut child = Dictionary::with_settings(Arc::clone(dict.shared_settings()));
        self.store(&mut child, rest, value)?;
        dict.insert(segment.as_str(), Value::Dict(child));
        Ok(())
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Mapper::new(Settings::default())
    }
}
