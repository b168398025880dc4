use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::settings::Settings;
use crate::value::Value;

/// An insertion-ordered plist dictionary.
///
/// Entries map a key to `Option<Value>`; a `None` entry is kept in memory but
/// never written out. Re-inserting an existing key replaces its value in place,
/// so the key keeps its original position.
///
/// Every dictionary carries the [`Settings`] it was created under. Nested
/// dictionaries produced by the codec or the mapper share the same settings.
#[derive(Clone)]
pub struct Dictionary {
    entries: IndexMap<String, Option<Value>>,
    settings: Arc<Settings>,
}

impl Dictionary {
    /// Creates an empty dictionary using [`Settings::default`].
    pub fn new() -> Self {
        Self::with_settings(Settings::shared_default())
    }

    pub fn with_settings(settings: Arc<Settings>) -> Self {
        Dictionary {
            entries: IndexMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn shared_settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Inserts a present value, returning the previous one if any.
    pub fn insert<V: Into<Value>>(&mut self, key: impl Into<String>, value: V) -> Option<Value> {
        self.insert_entry(key, Some(value.into()))
    }

    /// Inserts a possibly absent value, returning the previous one if any.
    pub fn insert_entry(&mut self, key: impl Into<String>, value: Option<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value).flatten()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key).and_then(Option::as_mut)
    }

    /// Returns the raw entry: `None` if the key is missing, `Some(None)` if it maps to no value.
    pub fn get_entry(&self, key: &str) -> Option<Option<&Value>> {
        self.entries.get(key).map(Option::as_ref)
    }

    /// Follows `path` through nested dictionaries.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.get(segment.as_ref())?.as_dict()?;
        }
        current.get(last.as_ref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes an entry, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key).flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the entries that hold a value.
    pub fn present(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-sensitive; settings are not compared.
impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

impl<K: Into<String>> Extend<(K, Value)> for Dictionary {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

// ── serde ──────────────────────────────────────────────────────────────────

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.present() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DictionaryVisitor)
    }
}

pub(crate) struct DictionaryVisitor;

impl<'de> Visitor<'de> for DictionaryVisitor {
    type Value = Dictionary;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a plist dictionary")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Dictionary, A::Error> {
        let mut dict = Dictionary::new();
        while let Some((key, value)) = map.next_entry::<String, Option<Value>>()? {
            dict.insert_entry(key, value);
        }
        Ok(dict)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Dictionary, E> {
        Ok(Dictionary::new())
    }
}
