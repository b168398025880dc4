use serde::{de, ser};
use std::fmt;
use thiserror::Error;

use crate::value::ValueKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding, encoding or mapping a plist.
///
/// Variants fall in two groups. Usage errors ([`Error::ObjectNotAnnotated`],
/// [`Error::NoMappableMembers`], [`Error::ConverterContractViolation`],
/// [`Error::InvalidSettings`]) are raised for programmer mistakes and always
/// abort the call. Data errors ([`Error::CorruptedFormat`],
/// [`Error::ConverterTypeMismatch`], [`Error::UnsupportedValueKind`]) are
/// subject to the [`InvalidDataPolicy`](crate::InvalidDataPolicy).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A structural element is malformed or missing, or a key path did not resolve
    #[error("corrupted plist: {0}")]
    CorruptedFormat(String),

    /// The runtime type was never registered as a plist object
    #[error("type `{0}` is not a registered plist object")]
    ObjectNotAnnotated(String),

    /// The plist object declares no members
    #[error("type `{0}` declares no plist members")]
    NoMappableMembers(&'static str),

    /// A converter was configured in a way its contract does not allow
    #[error("converter `{converter}` contract violation: {reason}")]
    ConverterContractViolation {
        converter: &'static str,
        reason: String,
    },

    /// The value handed to a converter is not of the kind it accepts
    #[error("converter `{converter}` expects {expected}, found {found}")]
    ConverterTypeMismatch {
        converter: &'static str,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A value cannot be represented by the target (or source) type
    #[error("unsupported value kind: {0}")]
    UnsupportedValueKind(String),

    /// Settings were constructed with an invalid combination
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),

    /// The markup reader or writer failed
    #[error("XML error: {0}")]
    Xml(String),

    /// An I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(String),

    /// A blocking task could not be joined
    #[error("task failed: {0}")]
    Task(String),

    /// A custom error message from serde
    #[error("{0}")]
    Message(String),
}

impl Error {
    pub(crate) fn corrupted(msg: impl Into<String>) -> Self {
        Error::CorruptedFormat(msg.into())
    }

    /// Returns `true` for errors caused by API misuse. These ignore the invalid-data policy.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::ObjectNotAnnotated(_)
                | Error::NoMappableMembers(_)
                | Error::ConverterContractViolation { .. }
                | Error::InvalidSettings(_)
        )
    }

    /// Returns `true` for data-shape errors that the invalid-data policy may suppress.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::CorruptedFormat(_)
                | Error::ConverterTypeMismatch { .. }
                | Error::UnsupportedValueKind(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
