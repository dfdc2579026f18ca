//! Error types for the configuration layer.
//!
//! Aggregation itself never fails. Errors only come from building
//! registries and attribute sets out of names or JSON documents.

use crate::attribute_id::AttributeId;
use thiserror::Error;

/// Errors raised while resolving attribute identities or loading configuration.
///
/// # Examples
///
/// ```rust
/// use statforge::{AttributeError, AttributeId};
///
/// let err = AttributeError::UnknownAttribute(AttributeId::from_str("Mana"));
/// assert_eq!(err.to_string(), "Unknown attribute: Mana");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AttributeError {
    /// No identity with this name is registered.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(AttributeId),

    /// An identity with this name is already registered.
    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(AttributeId),

    /// Attribute names must contain at least one non-whitespace character.
    #[error("Attribute name must not be empty")]
    InvalidName,

    /// A configuration document could not be parsed or written.
    ///
    /// Holds the underlying serde message.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for AttributeError {
    fn from(err: serde_json::Error) -> Self {
        AttributeError::Config(err.to_string())
    }
}
