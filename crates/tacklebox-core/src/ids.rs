//! Core identifier types for tacklebox.
//!
//! Subjects are the only identity the backend knows about. They come from the
//! federated identity provider and travel inside session tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest subject identifier accepted, in bytes.
///
/// Firebase caps uids at 128 characters.
pub const MAX_SUBJECT_LEN: usize = 128;

/// A verified subject identifier (the Firebase uid).
///
/// A `SubjectId` is never empty and never longer than [`MAX_SUBJECT_LEN`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a `SubjectId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or longer than [`MAX_SUBJECT_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.len() > MAX_SUBJECT_LEN {
            return Err(IdError::TooLong {
                max: MAX_SUBJECT_LEN,
                got: value.len(),
            });
        }
        Ok(Self(value))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier and return the owned string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SubjectId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input string is empty.
    #[error("identifier is empty")]
    Empty,

    /// The input is longer than allowed.
    #[error("identifier too long: max {max} bytes, got {got}")]
    TooLong {
        /// The maximum number of bytes.
        max: usize,
        /// The actual number of bytes.
        got: usize,
    },
}
