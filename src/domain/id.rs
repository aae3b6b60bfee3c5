use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// A validated post identifier.
///
/// Identifiers are non-empty and contain only ASCII alphanumerics, `-` and
/// `_`, so they can double as file names in a directory-backed store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(NonEmptyString);

impl PostId {
    /// Creates a new `PostId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPostId`] if the string is empty or contains characters
    /// other than ASCII alphanumerics, `-` and `_`.
    pub fn new(s: String) -> Result<Self, InvalidPostId> {
        let non_empty = NonEmptyString::new(s.clone()).map_err(|_| InvalidPostId(s.clone()))?;

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InvalidPostId(s));
        }

        Ok(Self(non_empty))
    }

    /// Generates a fresh random identifier (32 lowercase hex digits).
    ///
    /// # Panics
    ///
    /// Never in practice: a simple-formatted UUID is always a valid id.
    #[must_use]
    pub fn generate() -> Self {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        Self::new(raw).expect("a simple uuid is always a valid post id")
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PostId {
    type Error = InvalidPostId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PostId {
    type Error = InvalidPostId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl From<PostId> for String {
    fn from(id: PostId) -> Self {
        id.0.into_inner()
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for PostId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = InvalidPostId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when a string is not a valid post identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid post id '{0}': must be non-empty and contain only ASCII letters, digits, '-' or '_'"
)]
pub struct InvalidPostId(String);
