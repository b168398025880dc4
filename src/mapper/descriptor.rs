//! Per-type member descriptors.
//!
//! A type takes part in mapping by implementing [`PlistObject`], usually
//! through the [`plist_object!`](crate::plist_object) macro. Its
//! [`ObjectDescriptor`] is built on first use and cached for the rest of the
//! process.

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::converter::ConverterDescriptor;
use crate::error::Result;
use crate::mapper::Mapper;
use crate::mapper::field::PlistField;
use crate::value::Value;

/// How a member's value is mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A scalar or raw [`Value`]
    Basic,
    /// Another [`PlistObject`], stored as a dict
    NestedObject,
    /// A sequence, stored as an array
    Collection,
}

/// A type whose declared members map to and from a [`Dictionary`](crate::Dictionary).
///
/// Deserialization starts from `Self::default()` and assigns each member in
/// declaration order, so members that cannot be read keep their default.
pub trait PlistObject: Default + 'static {
    fn describe() -> ObjectDescriptor<Self>;
}

type ReadFn<T> = dyn Fn(&T, &Mapper) -> Result<Option<Value>> + Send + Sync;
type WriteFn<T> = dyn Fn(&mut T, Option<&Value>, &Mapper) -> Result<()> + Send + Sync;

/// One mapped member of `T`.
pub struct Member<T> {
    name: &'static str,
    path: Vec<String>,
    kind: ContainerKind,
    optional: bool,
    converter: Option<ConverterDescriptor>,
    read: Box<ReadFn<T>>,
    write: Box<WriteFn<T>>,
}

impl<T: 'static> Member<T> {
    /// Declares a member stored under `name`, accessed through `get`/`get_mut`.
    pub fn new<F: PlistField>(
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        Member {
            name,
            path: vec![name.to_owned()],
            kind: F::KIND,
            optional: F::OPTIONAL,
            converter: None,
            read: Box::new(move |object: &T, mapper: &Mapper| get(object).to_plist(mapper)),
            write: Box::new(move |object: &mut T, value: Option<&Value>, mapper: &Mapper| {
                let decoded = match value {
                    Some(value) => F::from_plist(value, mapper)?,
                    None => F::from_missing(name, mapper)?,
                };
                if let Some(decoded) = decoded {
                    *get_mut(object) = decoded;
                }
                Ok(())
            }),
        }
    }

    /// Stores the member under a key path instead of its name. An empty path
    /// is ignored.
    pub fn path(mut self, path: impl IntoPath) -> Self {
        let path = path.into_path();
        if !path.is_empty() {
            self.path = path;
        }
        self
    }

    pub fn converter(mut self, converter: ConverterDescriptor) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key_path(&self) -> &[String] {
        &self.path
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// `true` for `Option` members, which may be absent without error.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn converter_descriptor(&self) -> Option<&ConverterDescriptor> {
        self.converter.as_ref()
    }

    pub(crate) fn read(&self, object: &T, mapper: &Mapper) -> Result<Option<Value>> {
        (self.read)(object, mapper)
    }

    pub(crate) fn assign(
        &self,
        object: &mut T,
        value: Option<&Value>,
        mapper: &Mapper,
    ) -> Result<()> {
        (self.write)(object, value, mapper)
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("converter", &self.converter)
            .finish()
    }
}

/// The ordered member list of `T`.
pub struct ObjectDescriptor<T> {
    members: Vec<Member<T>>,
}

impl<T: 'static> ObjectDescriptor<T> {
    pub fn new() -> Self {
        ObjectDescriptor { members: Vec::new() }
    }

    pub fn member(mut self, member: Member<T>) -> Self {
        self.members.push(member);
        self
    }

    pub fn members(&self) -> &[Member<T>] {
        &self.members
    }

    pub fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl<T: 'static> Default for ObjectDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObjectDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDescriptor")
            .field("type", &type_name::<T>())
            .field("members", &self.members)
            .finish()
    }
}

/// A member key path.
pub trait IntoPath {
    fn into_path(self) -> Vec<String>;
}

impl IntoPath for &str {
    fn into_path(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl IntoPath for String {
    fn into_path(self) -> Vec<String> {
        vec![self]
    }
}

impl<const N: usize> IntoPath for [&str; N] {
    fn into_path(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl IntoPath for &[&str] {
    fn into_path(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl IntoPath for Vec<String> {
    fn into_path(self) -> Vec<String> {
        self
    }
}

// ── Cache ──────────────────────────────────────────────────────────────────

static DESCRIPTORS: Lazy<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Returns the cached descriptor of `T`, describing it on first use.
pub fn descriptor_of<T: PlistObject>() -> Arc<ObjectDescriptor<T>> {
    let id = TypeId::of::<T>();
    let cached = DESCRIPTORS.read().get(&id).cloned();
    if let Some(Ok(descriptor)) = cached.map(Arc::downcast::<ObjectDescriptor<T>>) {
        return descriptor;
    }

    let described = Arc::new(T::describe());
    debug!(
        "described {} with {} member(s)",
        type_name::<T>(),
        described.members.len()
    );
    let stored = DESCRIPTORS
        .write()
        .entry(id)
        .or_insert_with(|| Arc::clone(&described) as Arc<dyn Any + Send + Sync>)
        .clone();
    Arc::downcast::<ObjectDescriptor<T>>(stored).unwrap_or(described)
}

/// Implements [`PlistObject`] for a struct from a member list.
///
/// Each entry names a field, optionally followed by `: [..]` with the key
/// path and `=> expr` with a [`ConverterDescriptor`]. Without a path the
/// field name is the key.
///
/// ```rust
/// use plist_serde::converter::{ConverterDescriptor, IntToBoolConverter};
/// use plist_serde::plist_object;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Window {
///     title: String,
///     width: i32,
///     city: Option<String>,
///     visible: bool,
/// }
///
/// plist_object!(Window {
///     title: ["Title"],
///     width: ["Frame", "Width"],
///     city,
///     visible: ["Visible"] => ConverterDescriptor::of::<IntToBoolConverter>(),
/// });
/// ```
#[macro_export]
macro_rules! plist_object {
    ($ty:ty { $( $field:ident $(: [$($segment:expr),+ $(,)?])? $(=> $converter:expr)? ),* $(,)? }) => {
        impl $crate::PlistObject for $ty {
            fn describe() -> $crate::mapper::ObjectDescriptor<Self> {
                $crate::mapper::ObjectDescriptor::new()
                $(
                    .member({
                        let member = $crate::mapper::Member::new(
                            stringify!($field),
                            |object: &Self| &object.$field,
                            |object: &mut Self| &mut object.$field,
                        );
                        $( let member = member.path([$($segment),+]); )?
                        $( let member = member.converter($converter); )?
                        member
                    })
                )*
            }
        }
    };
}
