use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Knobs that shape the generated schemas. Loaded from a catalog's `options`
/// block or built in code; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaOptions {
    /// Applied to record field names to produce property labels.
    pub field_label: RenameRule,
    /// Removed from the front of field names before `field_label` runs.
    pub strip_field_prefix: Option<String>,
    /// Applied to sum variant names to produce tags.
    pub constructor_tag: RenameRule,
    /// Applied to record and sum names to produce definition names.
    pub datatype_name: RenameRule,
    /// Sums whose variants all lack payloads become `{type: string, enum}`.
    pub all_nullary_to_string_tag: bool,
    /// Records with a single field take that field's schema, even when the
    /// field is named.
    pub unwrap_unary_records: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenameRule {
    #[default]
    #[serde(rename = "verbatim")]
    Verbatim,
    #[serde(rename = "lowercase")]
    Lower,
    #[serde(rename = "UPPERCASE")]
    Upper,
    #[serde(rename = "PascalCase")]
    Pascal,
    #[serde(rename = "camelCase")]
    Camel,
    #[serde(rename = "snake_case")]
    Snake,
    #[serde(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnake,
    #[serde(rename = "kebab-case")]
    Kebab,
    #[serde(rename = "SCREAMING-KEBAB-CASE")]
    ScreamingKebab,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            field_label: RenameRule::Verbatim,
            strip_field_prefix: None,
            constructor_tag: RenameRule::Verbatim,
            datatype_name: RenameRule::Verbatim,
            all_nullary_to_string_tag: true,
            unwrap_unary_records: false,
        }
    }
}

impl SchemaOptions {
    pub fn validate(&self) -> Result<()> {
        if self.strip_field_prefix.as_deref() == Some("") {
            return Err(Error::Misconfigured("`strip_field_prefix` must not be empty".into()));
        }
        Ok(())
    }

    pub fn field_label(&self, raw: &str) -> String {
        let stripped = match self.strip_field_prefix.as_deref() {
            Some(prefix) => match raw.strip_prefix(prefix) {
                Some(rest) if !rest.is_empty() => rest,
                _ => raw,
            },
            None => raw,
        };
        self.field_label.apply(stripped)
    }

    pub fn constructor_tag(&self, raw: &str) -> String {
        self.constructor_tag.apply(raw)
    }

    pub fn datatype_name(&self, raw: &str) -> String {
        self.datatype_name.apply(raw)
    }
}

impl RenameRule {
    pub const ALL: [RenameRule; 9] = [
        Self::Verbatim,
        Self::Lower,
        Self::Upper,
        Self::Pascal,
        Self::Camel,
        Self::Snake,
        Self::ScreamingSnake,
        Self::Kebab,
        Self::ScreamingKebab,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verbatim => "verbatim",
            Self::Lower => "lowercase",
            Self::Upper => "UPPERCASE",
            Self::Pascal => "PascalCase",
            Self::Camel => "camelCase",
            Self::Snake => "snake_case",
            Self::ScreamingSnake => "SCREAMING_SNAKE_CASE",
            Self::Kebab => "kebab-case",
            Self::ScreamingKebab => "SCREAMING-KEBAB-CASE",
        }
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Verbatim => name.to_owned(),
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
            Self::Pascal => split_words(name).iter().map(|word| capitalize(word)).collect(),
            Self::Camel => {
                let mut out = String::new();
                for (index, word) in split_words(name).iter().enumerate() {
                    if index == 0 {
                        out.push_str(&word.to_lowercase());
                    } else {
                        out.push_str(&capitalize(word));
                    }
                }
                out
            }
            Self::Snake => join_words(name, '_', str::to_lowercase),
            Self::ScreamingSnake => join_words(name, '_', str::to_uppercase),
            Self::Kebab => join_words(name, '-', str::to_lowercase),
            Self::ScreamingKebab => join_words(name, '-', str::to_uppercase),
        }
    }
}

impl FromStr for RenameRule {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str() == value)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|rule| rule.as_str()).collect();
                Error::Misconfigured(format!("unknown rename rule `{value}` (expected one of {})", known.join(", ")))
            })
    }
}

/// Reject names that would not survive inside `#/definitions/<name>`.
pub fn check_name(name: &str) -> Result<()> {
    let bad = |ch: char| matches!(ch, '/' | '~' | '#') || ch.is_whitespace();
    if name.is_empty() || name.chars().any(bad) {
        return Err(Error::InvalidName(name.to_owned()));
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Split an identifier into words at separators and case changes.
/// `XMLParser` is `XML` + `Parser`; `user_id2Key` is `user` + `id2` + `Key`.
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    for segment in name.split(|ch: char| ch == '_' || ch == '-' || ch.is_whitespace()) {
        let chars: Vec<char> = segment.chars().collect();
        let mut current = String::new();
        for (index, &ch) in chars.iter().enumerate() {
            if index > 0 && ch.is_uppercase() {
                let prev = chars[index - 1];
                let next_is_lower = chars.get(index + 1).is_some_and(|c| c.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(ch);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

fn join_words(name: &str, separator: char, case: fn(&str) -> String) -> String {
    let words: Vec<String> = split_words(name).iter().map(|word| case(word)).collect();
    words.join(&separator.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ------------------------------- Tests ------------------------------------ //
