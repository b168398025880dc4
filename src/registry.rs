//! Converter instance cache.

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::converter::{DynConverter, PlistConverter};

static GLOBAL: Lazy<Arc<ConverterRegistry>> = Lazy::new(|| Arc::new(ConverterRegistry::new()));

/// Holds one shared instance per converter type.
///
/// Instances configured through member overrides are never stored here; see
/// [`ConverterRegistry::fresh`].
#[derive(Default)]
pub struct ConverterRegistry {
    shared: RwLock<HashMap<TypeId, Arc<dyn DynConverter>>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by the top-level functions.
    pub fn global() -> &'static Arc<ConverterRegistry> {
        &GLOBAL
    }

    /// Returns the cached instance of `C`, creating it on first use.
    pub fn shared<C: PlistConverter>(&self) -> Arc<dyn DynConverter> {
        let id = TypeId::of::<C>();
        if let Some(converter) = self.shared.read().get(&id) {
            return Arc::clone(converter);
        }
        let mut cache = self.shared.write();
        let converter = cache.entry(id).or_insert_with(|| {
            debug!("instantiating shared converter {}", type_name::<C>());
            Arc::new(C::default()) as Arc<dyn DynConverter>
        });
        Arc::clone(converter)
    }

    /// Returns a new instance of `C` that is not cached.
    pub fn fresh<C: PlistConverter>(&self) -> Box<dyn DynConverter> {
        debug!("instantiating fresh converter {}", type_name::<C>());
        Box::new(C::default())
    }

    pub fn contains<C: PlistConverter>(&self) -> bool {
        self.shared.read().contains_key(&TypeId::of::<C>())
    }

    pub fn len(&self) -> usize {
        self.shared.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.read().is_empty()
    }

    /// Drops every cached instance.
    pub fn clear(&self) {
        self.shared.write().clear();
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("shared", &self.len())
            .finish()
    }
}
