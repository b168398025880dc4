//! Tag spellings for both vocabularies.

use crate::settings::TagVocabulary;

/// Every element the codec reads or writes inside the root dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Key,
    String,
    Integer,
    Real,
    True,
    False,
    Dict,
    Array,
}

impl Tag {
    pub const ALL: [Tag; 8] = [
        Tag::Key,
        Tag::String,
        Tag::Integer,
        Tag::Real,
        Tag::True,
        Tag::False,
        Tag::Dict,
        Tag::Array,
    ];

    pub const fn full(self) -> &'static str {
        match self {
            Tag::Key => "key",
            Tag::String => "string",
            Tag::Integer => "integer",
            Tag::Real => "real",
            Tag::True => "true",
            Tag::False => "false",
            Tag::Dict => "dict",
            Tag::Array => "array",
        }
    }

    pub const fn short(self) -> &'static str {
        match self {
            Tag::Key => "k",
            Tag::String => "s",
            Tag::Integer => "i",
            Tag::Real => "r",
            Tag::True => "t",
            Tag::False => "f",
            Tag::Dict => "d",
            Tag::Array => "a",
        }
    }

    /// Spelling for output. `Both` is rejected by the settings builder and is
    /// treated as `Full` here.
    pub const fn name(self, vocabulary: TagVocabulary) -> &'static str {
        match vocabulary {
            TagVocabulary::Short => self.short(),
            TagVocabulary::Full | TagVocabulary::Both => self.full(),
        }
    }

    /// Resolves an element name against the accepted vocabularies, Full first.
    pub fn resolve(name: &str, vocabulary: TagVocabulary) -> Option<Tag> {
        let full = vocabulary
            .accepts_full()
            .then(|| Self::ALL.into_iter().find(|t| t.full() == name))
            .flatten();
        full.or_else(|| {
            vocabulary
                .accepts_short()
                .then(|| Self::ALL.into_iter().find(|t| t.short() == name))
                .flatten()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_respects_vocabulary() {
        assert_eq!(Tag::resolve("dict", TagVocabulary::Full), Some(Tag::Dict));
        assert_eq!(Tag::resolve("d", TagVocabulary::Full), None);
        assert_eq!(Tag::resolve("d", TagVocabulary::Short), Some(Tag::Dict));
        assert_eq!(Tag::resolve("dict", TagVocabulary::Short), None);
        assert_eq!(Tag::resolve("i", TagVocabulary::Both), Some(Tag::Integer));
        assert_eq!(Tag::resolve("integer", TagVocabulary::Both), Some(Tag::Integer));
        assert_eq!(Tag::resolve("date", TagVocabulary::Both), None);
    }

    #[test]
    fn output_names() {
        assert_eq!(Tag::Key.name(TagVocabulary::Full), "key");
        assert_eq!(Tag::Key.name(TagVocabulary::Short), "k");
        assert_eq!(Tag::False.name(TagVocabulary::Short), "f");
    }
}
