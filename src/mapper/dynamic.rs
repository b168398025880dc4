//! Mapping for types known only at runtime.

use log::debug;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::mapper::descriptor::PlistObject;

type SerializeFn = fn(&Mapper, &dyn Any) -> Result<Dictionary>;
type DeserializeFn = fn(&Mapper, &Dictionary) -> Result<Box<dyn Any>>;

#[derive(Clone, Copy)]
struct Registration {
    name: &'static str,
    serialize: SerializeFn,
    deserialize: DeserializeFn,
}

fn serialize_erased<T: PlistObject>(mapper: &Mapper, object: &dyn Any) -> Result<Dictionary> {
    match object.downcast_ref::<T>() {
        Some(object) => mapper.serialize(object),
        None => Err(Error::ObjectNotAnnotated(type_name::<T>().to_owned())),
    }
}

fn deserialize_erased<T: PlistObject>(mapper: &Mapper, dict: &Dictionary) -> Result<Box<dyn Any>> {
    mapper
        .deserialize::<T>(dict)
        .map(|object| Box::new(object) as Box<dyn Any>)
}

/// The set of [`PlistObject`] types that may be mapped through `dyn Any`.
#[derive(Default)]
pub struct ObjectRegistry {
    types: RwLock<HashMap<TypeId, Registration>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`. Returns `false` if it was already registered.
    pub fn register<T: PlistObject>(&self) -> bool {
        let mut types = self.types.write();
        if types.contains_key(&TypeId::of::<T>()) {
            return false;
        }
        debug!("registered plist object {}", type_name::<T>());
        types.insert(
            TypeId::of::<T>(),
            Registration {
                name: type_name::<T>(),
                serialize: serialize_erased::<T>,
                deserialize: deserialize_erased::<T>,
            },
        );
        true
    }

    pub fn is_registered(&self, type_id: TypeId) -> bool {
        self.types.read().contains_key(&type_id)
    }

    /// Name of a registered type.
    pub fn type_name(&self, type_id: TypeId) -> Option<&'static str> {
        self.types.read().get(&type_id).map(|r| r.name)
    }

    fn lookup(&self, type_id: TypeId) -> Result<Registration> {
        self.types
            .read()
            .get(&type_id)
            .copied()
            .ok_or_else(|| Error::ObjectNotAnnotated(format!("{type_id:?}")))
    }
}

impl std::fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types = self.types.read();
        f.debug_set().entries(types.values().map(|r| r.name)).finish()
    }
}

impl Mapper {
    /// Serializes an object whose concrete type was registered in `registry`.
    pub fn serialize_dyn(&self, registry: &ObjectRegistry, object: &dyn Any) -> Result<Dictionary> {
        let registration = registry.lookup(object.type_id())?;
        (registration.serialize)(self, object)
    }

    /// Deserializes the registered type identified by `type_id`.
    pub fn deserialize_dyn(
        &self,
        registry: &ObjectRegistry,
        type_id: TypeId,
        dict: &Dictionary,
    ) -> Result<Box<dyn Any>> {
        let registration = registry.lookup(type_id)?;
        (registration.deserialize)(self, dict)
    }
}
