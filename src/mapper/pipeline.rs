//! Converter application for a single member value.

use log::trace;

use crate::converter::{ConverterDescriptor, Direction};
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::value::Value;

/// Runs `raw` through the member's converter in `direction`.
///
/// Wherever the policy allows carrying on, the configured default replaces the
/// value. A converter skipped by its usage flags yields the configured default
/// without being invoked. `None` means there is nothing to store.
pub(crate) fn convert(
    mapper: &Mapper,
    descriptor: &ConverterDescriptor,
    raw: Option<&Value>,
    direction: Direction,
) -> Result<Option<Value>> {
    let default = descriptor.default_value().cloned();

    let Some(raw) = raw else {
        let error = Error::corrupted(format!(
            "no value to hand to converter `{}`",
            descriptor.name()
        ));
        return mapper.recover(error, default);
    };

    if !descriptor.usage().applies_to(direction) {
        trace!("converter `{}` skipped for {direction:?}", descriptor.name());
        return Ok(default);
    }

    let expected = descriptor.expected_kind(direction);
    if raw.kind() != expected {
        let error = Error::ConverterTypeMismatch {
            converter: descriptor.name(),
            expected,
            found: raw.kind(),
        };
        return mapper.recover(error, default);
    }

    let converter = descriptor.instantiate(mapper.registry())?;
    match converter.convert(raw, direction) {
        Some(converted) => {
            trace!(
                "converter `{}` mapped {} to {}",
                descriptor.name(),
                raw.kind(),
                converted.kind()
            );
            Ok(Some(converted))
        }
        None => {
            let error = Error::ConverterTypeMismatch {
                converter: converter.converter_name(),
                expected: converter.expected_kind(direction),
                found: raw.kind(),
            };
            mapper.recover(error, default)
        }
    }
}
