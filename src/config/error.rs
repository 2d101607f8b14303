use std::fmt;

use thiserror::Error;

/// A single field that could not be resolved.
///
/// Field errors are collected by the resolver and only ever reach callers
/// wrapped in [`ConfigError::Unresolved`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{key} is not set")]
    NotSet { key: String },

    #[error("{key} {reason}")]
    Invalid { key: String, reason: String },
}

impl FieldError {
    /// The environment variable this error refers to.
    pub fn key(&self) -> &str {
        match self {
            Self::NotSet { key } | Self::Invalid { key, .. } => key,
        }
    }
}

/// Field errors in the order they were encountered during the schema walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// True when every error is a missing value rather than a bad one.
    pub fn only_missing(&self) -> bool {
        self.0
            .iter()
            .all(|e| matches!(e, FieldError::NotSet { .. }))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// One or more fields failed to resolve. The message lists every one.
    #[error("{0}")]
    Unresolved(FieldErrors),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] toml::de::Error),
}

impl ConfigError {
    /// The individual field errors, if this is a resolution failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Unresolved(errors) => Some(errors),
            Self::Deserialize(_) => None,
        }
    }
}
