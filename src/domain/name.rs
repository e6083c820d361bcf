use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

use super::grammar::DELIMITER;

/// A preened local name: the value half of a key segment.
///
/// A local name is non-empty and, once preened, contains only ASCII lowercase
/// letters, ASCII digits, `_` and `-`. This character class is a contract with
/// the identifier columns of the persistence store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalName(NonEmptyString);

impl LocalName {
    /// Preens and validates a raw local name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameError`] if the name is blank, contains the path
    /// delimiter, or contains any other character outside the allow-list.
    pub fn new(raw: &str) -> Result<Self, InvalidNameError> {
        let trimmed = raw.trim();

        if let Some(c) = trimmed.chars().find(|&c| !is_name_char(c)) {
            let violation = if c == DELIMITER {
                NameViolation::Delimiter
            } else {
                NameViolation::Character(c)
            };
            return Err(InvalidNameError::new(raw, violation));
        }

        NonEmptyString::new(trimmed.to_ascii_lowercase())
            .map(Self)
            .map_err(|_| InvalidNameError::new(raw, NameViolation::Empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Checked before lowercasing, so no non-ASCII character can fold into the
/// allow-list.
const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Canonicalizes a single local name.
///
/// Surrounding whitespace is removed and the name is lowercased, so inputs
/// differing only in those respects collide. `preen` is idempotent.
///
/// # Errors
///
/// Returns [`InvalidNameError`] if the preened name is not a valid
/// [`LocalName`].
pub fn preen(raw: &str) -> Result<String, InvalidNameError> {
    LocalName::new(raw).map(|name| name.as_str().to_owned())
}

impl FromStr for LocalName {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for LocalName {
    type Error = InvalidNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for LocalName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for LocalName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for LocalName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a local name cannot be preened into a valid name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid local name '{name}': {violation}")]
pub struct InvalidNameError {
    name: String,
    violation: NameViolation,
}

impl InvalidNameError {
    fn new(name: &str, violation: NameViolation) -> Self {
        Self {
            name: name.to_string(),
            violation,
        }
    }

    /// The raw name that was rejected.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Why the name was rejected.
    #[must_use]
    pub const fn violation(&self) -> NameViolation {
        self.violation
    }
}

/// The rule a rejected local name broke.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum NameViolation {
    /// Nothing is left after trimming.
    #[error("name is empty")]
    Empty,

    /// The name contains the path delimiter.
    #[error("name contains the path delimiter '/'")]
    Delimiter,

    /// The name contains a character outside `[a-z0-9_-]`.
    #[error("character {0:?} is not allowed (expected a-z, 0-9, '_' or '-')")]
    Character(char),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("class_key", "class_key"; "already canonical")]
    #[test_case("  Class_Key\t", "class_key"; "whitespace and case")]
    #[test_case("ORDER-LINE-2", "order-line-2"; "digits and hyphens")]
    fn preen_canonicalizes(raw: &str, expected: &str) {
        assert_eq!(preen(raw).unwrap(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "blank")]
    #[test_case("\n\t"; "control whitespace")]
    fn blank_names_are_empty(raw: &str) {
        let error = preen(raw).unwrap_err();
        assert_eq!(error.violation(), NameViolation::Empty);
        assert_eq!(error.name(), raw);
    }

    #[test]
    fn delimiter_is_rejected() {
        let error = preen("a/b").unwrap_err();
        assert_eq!(error.violation(), NameViolation::Delimiter);
    }

    #[test_case("two words", ' '; "interior space")]
    #[test_case("dotted.name", '.'; "dot")]
    #[test_case("café", 'é'; "non ascii")]
    #[test_case("\u{212A}ey", '\u{212A}'; "kelvin sign folds to ascii k")]
    #[test_case("\u{130}d", '\u{130}'; "dotted capital i")]
    fn characters_outside_allow_list_are_rejected(raw: &str, offending: char) {
        let error = preen(raw).unwrap_err();
        assert_eq!(error.violation(), NameViolation::Character(offending));
    }

    #[test_case("Domain_Key")]
    #[test_case("  spaced  ")]
    #[test_case("x")]
    fn preen_is_idempotent(raw: &str) {
        let once = preen(raw).unwrap();
        assert_eq!(preen(&once).unwrap(), once);
    }

    #[test]
    fn case_and_whitespace_variants_collide() {
        assert_eq!(
            LocalName::new(" StateKey ").unwrap(),
            LocalName::new("statekey").unwrap()
        );
    }

    #[test]
    fn error_display() {
        let error = preen("a/b").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid local name 'a/b': name contains the path delimiter '/'"
        );
    }
}
