//! Codec and mapper configuration.
//!
//! [`Settings`] are immutable once built. Use [`Settings::builder`] to change
//! anything from the defaults:
//!
//! ```rust
//! use plist_serde::{InvalidDataPolicy, Settings, TagVocabulary};
//!
//! let settings = Settings::builder()
//!     .output_vocabulary(TagVocabulary::Short)
//!     .invalid_data_policy(InvalidDataPolicy::ReturnDefaultOrOriginal)
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.output_vocabulary(), TagVocabulary::Short);
//!
//! // `Both` only makes sense when reading.
//! assert!(Settings::builder().output_vocabulary(TagVocabulary::Both).build().is_err());
//! ```

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Which tag spellings are in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagVocabulary {
    /// `k`, `s`, `i`, `r`, `t`, `f`, `d`, `a`
    Short,
    /// `key`, `string`, `integer`, `real`, `true`, `false`, `dict`, `array`
    Full,
    /// Accept either spelling, Full resolved first (input only)
    Both,
}

impl TagVocabulary {
    pub fn accepts_full(self) -> bool {
        matches!(self, TagVocabulary::Full | TagVocabulary::Both)
    }

    pub fn accepts_short(self) -> bool {
        matches!(self, TagVocabulary::Short | TagVocabulary::Both)
    }
}

/// What to do when data does not have the expected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvalidDataPolicy {
    /// Fail the whole call with the data error
    #[default]
    ThrowError,
    /// Substitute the closest default and keep going
    ReturnDefaultOrOriginal,
}

impl InvalidDataPolicy {
    pub fn is_throw(self) -> bool {
        self == InvalidDataPolicy::ThrowError
    }
}

/// Indentation used when writing documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    pub char: u8,
    pub size: usize,
}

impl Default for Indent {
    fn default() -> Self {
        Indent { char: b' ', size: 2 }
    }
}

/// Output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingOptions {
    /// `None` writes the whole document on one line
    pub indent: Option<Indent>,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>`
    pub declaration: bool,
}

impl FormattingOptions {
    /// Single-line output without a declaration.
    pub fn compact() -> Self {
        FormattingOptions {
            indent: None,
            declaration: false,
        }
    }
}

impl Default for FormattingOptions {
    fn default() -> Self {
        FormattingOptions {
            indent: Some(Indent::default()),
            declaration: true,
        }
    }
}

/// Immutable codec configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    input_vocabulary: TagVocabulary,
    output_vocabulary: TagVocabulary,
    invalid_data_policy: InvalidDataPolicy,
    formatting: FormattingOptions,
    root_attributes: Vec<(String, String)>,
}

static DEFAULT_SETTINGS: Lazy<Arc<Settings>> = Lazy::new(|| Arc::new(Settings::default()));

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Shorthand for the two vocabularies, everything else default.
    pub fn new(input: TagVocabulary, output: TagVocabulary) -> Result<Self> {
        Self::builder()
            .input_vocabulary(input)
            .output_vocabulary(output)
            .build()
    }

    pub(crate) fn shared_default() -> Arc<Settings> {
        Arc::clone(&DEFAULT_SETTINGS)
    }

    pub fn input_vocabulary(&self) -> TagVocabulary {
        self.input_vocabulary
    }

    pub fn output_vocabulary(&self) -> TagVocabulary {
        self.output_vocabulary
    }

    pub fn invalid_data_policy(&self) -> InvalidDataPolicy {
        self.invalid_data_policy
    }

    pub fn formatting(&self) -> &FormattingOptions {
        &self.formatting
    }

    pub fn root_attributes(&self) -> &[(String, String)] {
        &self.root_attributes
    }

    /// Returns a builder seeded with these settings.
    pub fn to_builder(&self) -> SettingsBuilder {
        SettingsBuilder {
            inner: self.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            input_vocabulary: TagVocabulary::Both,
            output_vocabulary: TagVocabulary::Full,
            invalid_data_policy: InvalidDataPolicy::ThrowError,
            formatting: FormattingOptions::default(),
            root_attributes: vec![("version".to_owned(), "1.0".to_owned())],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    inner: Settings,
}

impl SettingsBuilder {
    pub fn input_vocabulary(mut self, vocabulary: TagVocabulary) -> Self {
        self.inner.input_vocabulary = vocabulary;
        self
    }

    pub fn output_vocabulary(mut self, vocabulary: TagVocabulary) -> Self {
        self.inner.output_vocabulary = vocabulary;
        self
    }

    pub fn invalid_data_policy(mut self, policy: InvalidDataPolicy) -> Self {
        self.inner.invalid_data_policy = policy;
        self
    }

    pub fn formatting(mut self, formatting: FormattingOptions) -> Self {
        self.inner.formatting = formatting;
        self
    }

    /// Replaces the root attributes.
    pub fn root_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.root_attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn root_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.root_attributes.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Settings> {
        if self.inner.output_vocabulary == TagVocabulary::Both {
            return Err(Error::InvalidSettings(
                "output vocabulary must be either Full or Short",
            ));
        }
        Ok(self.inner)
    }
}
