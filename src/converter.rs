//! Bidirectional value converters.
//!
//! A converter sits between the wire value and a member's value. On decode
//! [`PlistConverter::read_value`] turns the wire `Input` into the member's
//! `Output`; on encode [`PlistConverter::write_value`] does the reverse.
//!
//! ```rust
//! use plist_serde::converter::PlistConverter;
//!
//! /// Stores percentages as a 0..1 ratio on the wire.
//! #[derive(Default)]
//! struct Percent {
//!     scale: f32,
//! }
//!
//! impl PlistConverter for Percent {
//!     type Input = f32;
//!     type Output = f32;
//!
//!     fn read_value(&self, value: f32) -> f32 {
//!         value * self.scale
//!     }
//!
//!     fn write_value(&self, value: f32) -> f32 {
//!         value / self.scale
//!     }
//! }
//!
//! let percent = Percent { scale: 100.0 };
//! assert_eq!(percent.read_value(0.5), 50.0);
//! ```
//!
//! Converters may expose configurable properties with their own defaults.
//! A member that overrides any of them always gets a fresh instance instead
//! of the shared one from the [`ConverterRegistry`](crate::ConverterRegistry).

use bitflags::bitflags;
use std::any::{TypeId, type_name};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::registry::ConverterRegistry;
use crate::value::{ScalarValue, Value, ValueKind};

/// The direction a value is travelling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Wire to member
    Decode,
    /// Member to wire
    Encode,
}

bitflags! {
    /// Directions in which a declared converter is applied.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConverterUsage: u8 {
        const DECODE = 1;
        const ENCODE = 2;
        const BOTH = Self::DECODE.bits() | Self::ENCODE.bits();
    }
}

impl ConverterUsage {
    pub fn applies_to(self, direction: Direction) -> bool {
        match direction {
            Direction::Decode => self.contains(ConverterUsage::DECODE),
            Direction::Encode => self.contains(ConverterUsage::ENCODE),
        }
    }
}

impl Default for ConverterUsage {
    fn default() -> Self {
        ConverterUsage::BOTH
    }
}

/// A configurable converter property and its default.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterProperty {
    pub name: &'static str,
    pub default: Value,
}

/// A typed bidirectional converter.
///
/// `Input` is the wire-side scalar, `Output` the member-side scalar.
pub trait PlistConverter: Default + Send + Sync + 'static {
    type Input: ScalarValue;
    type Output: ScalarValue;

    fn read_value(&self, value: Self::Input) -> Self::Output;

    fn write_value(&self, value: Self::Output) -> Self::Input;

    /// Properties that members may override.
    fn properties() -> &'static [ConverterProperty] {
        &[]
    }

    /// Applies an override. Only called with declared property names and
    /// values of the declared kind.
    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        let _ = value;
        Err(Error::ConverterContractViolation {
            converter: type_name::<Self>(),
            reason: format!("property `{name}` cannot be set"),
        })
    }
}

/// Object-safe view of a [`PlistConverter`].
pub trait DynConverter: Send + Sync {
    fn converter_name(&self) -> &'static str;

    /// Kind accepted in `direction`.
    fn expected_kind(&self, direction: Direction) -> ValueKind;

    /// Converts `value`, or returns `None` if it is not of the expected kind.
    fn convert(&self, value: &Value, direction: Direction) -> Option<Value>;

    fn properties(&self) -> &'static [ConverterProperty];

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()>;
}

impl<C: PlistConverter> DynConverter for C {
    fn converter_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn expected_kind(&self, direction: Direction) -> ValueKind {
        match direction {
            Direction::Decode => C::Input::KIND,
            Direction::Encode => C::Output::KIND,
        }
    }

    fn convert(&self, value: &Value, direction: Direction) -> Option<Value> {
        match direction {
            Direction::Decode => {
                let input = C::Input::from_value(value)?;
                Some(self.read_value(input).into_value())
            }
            Direction::Encode => {
                let output = C::Output::from_value(value)?;
                Some(self.write_value(output).into_value())
            }
        }
    }

    fn properties(&self) -> &'static [ConverterProperty] {
        <C as PlistConverter>::properties()
    }

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        PlistConverter::set_property(self, name, value)
    }
}

/// A per-member override of a converter property. `None` means "use the
/// property's declared default".
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterOverride {
    pub property: &'static str,
    pub value: Option<Value>,
}

/// How a member uses a converter.
#[derive(Clone)]
pub struct ConverterDescriptor {
    type_id: TypeId,
    name: &'static str,
    input: ValueKind,
    output: ValueKind,
    usage: ConverterUsage,
    default_value: Option<Value>,
    overrides: Vec<ConverterOverride>,
    shared: fn(&ConverterRegistry) -> Arc<dyn DynConverter>,
    fresh: fn(&ConverterRegistry) -> Box<dyn DynConverter>,
}

impl ConverterDescriptor {
    /// Declares converter `C`, applied in both directions with no default.
    pub fn of<C: PlistConverter>() -> Self {
        ConverterDescriptor {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
            input: C::Input::KIND,
            output: C::Output::KIND,
            usage: ConverterUsage::BOTH,
            default_value: None,
            overrides: Vec::new(),
            shared: ConverterRegistry::shared::<C>,
            fresh: ConverterRegistry::fresh::<C>,
        }
    }

    pub fn with_usage(mut self, usage: ConverterUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Value used when the converter is skipped or the input is unusable.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Overrides a converter property for this member only.
    pub fn with_override(mut self, property: &'static str, value: Option<Value>) -> Self {
        self.overrides.push(ConverterOverride { property, value });
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn usage(&self) -> ConverterUsage {
        self.usage
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn overrides(&self) -> &[ConverterOverride] {
        &self.overrides
    }

    /// Kind the converter accepts in `direction`.
    pub fn expected_kind(&self, direction: Direction) -> ValueKind {
        match direction {
            Direction::Decode => self.input,
            Direction::Encode => self.output,
        }
    }

    /// Returns an instance ready to convert.
    ///
    /// Any override forces a new, uncached instance, even when the override
    /// equals the property default. Otherwise the registry's shared instance
    /// is used.
    pub fn instantiate(&self, registry: &ConverterRegistry) -> Result<Arc<dyn DynConverter>> {
        if self.overrides.is_empty() {
            return Ok((self.shared)(registry));
        }

        let mut converter = (self.fresh)(registry);
        let properties = converter.properties();
        for o in &self.overrides {
            let Some(property) = properties.iter().find(|p| p.name == o.property) else {
                return Err(Error::ConverterContractViolation {
                    converter: self.name,
                    reason: format!("no configurable property `{}`", o.property),
                });
            };
            let value = o.value.as_ref().unwrap_or(&property.default);
            if value.kind() != property.default.kind() {
                return Err(Error::ConverterContractViolation {
                    converter: self.name,
                    reason: format!(
                        "property `{}` takes {}, got {}",
                        property.name,
                        property.default.kind(),
                        value.kind()
                    ),
                });
            }
            converter.set_property(property.name, value)?;
        }
        Ok(Arc::from(converter))
    }
}

impl std::fmt::Debug for ConverterDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterDescriptor")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("default_value", &self.default_value)
            .field("overrides", &self.overrides)
            .finish()
    }
}

// ── Built-in converters ────────────────────────────────────────────────────

const REVERSE_VALUE: &str = "reverse_value";

static BOOL_CONVERTER_PROPERTIES: [ConverterProperty; 1] = [ConverterProperty {
    name: REVERSE_VALUE,
    default: Value::Bool(false),
}];

/// `<integer>` greater than zero reads as `true`; `true` writes `1`.
/// With `reverse_value` set the result is inverted.
#[derive(Debug, Default, Clone)]
pub struct IntToBoolConverter {
    pub reverse_value: bool,
}

impl PlistConverter for IntToBoolConverter {
    type Input = i32;
    type Output = bool;

    fn read_value(&self, value: i32) -> bool {
        (value > 0) ^ self.reverse_value
    }

    fn write_value(&self, value: bool) -> i32 {
        if value ^ self.reverse_value { 1 } else { 0 }
    }

    fn properties() -> &'static [ConverterProperty] {
        &BOOL_CONVERTER_PROPERTIES
    }

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        match (name, value) {
            (REVERSE_VALUE, Value::Bool(v)) => {
                self.reverse_value = *v;
                Ok(())
            }
            _ => Err(Error::ConverterContractViolation {
                converter: type_name::<Self>(),
                reason: format!("cannot set `{name}` to {}", value.kind()),
            }),
        }
    }
}

/// Same as [`IntToBoolConverter`] over integer text in a `<string>`.
/// Text that is not an integer reads as `false` (before reversal).
#[derive(Debug, Default, Clone)]
pub struct StringToBoolConverter {
    pub reverse_value: bool,
}

impl PlistConverter for StringToBoolConverter {
    type Input = String;
    type Output = bool;

    fn read_value(&self, value: String) -> bool {
        let n = crate::numeric::parse_integer(&value).unwrap_or(0);
        (n > 0) ^ self.reverse_value
    }

    fn write_value(&self, value: bool) -> String {
        if value ^ self.reverse_value { "1" } else { "0" }.to_owned()
    }

    fn properties() -> &'static [ConverterProperty] {
        &BOOL_CONVERTER_PROPERTIES
    }

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        match (name, value) {
            (REVERSE_VALUE, Value::Bool(v)) => {
                self.reverse_value = *v;
                Ok(())
            }
            _ => Err(Error::ConverterContractViolation {
                converter: type_name::<Self>(),
                reason: format!("cannot set `{name}` to {}", value.kind()),
            }),
        }
    }
}
