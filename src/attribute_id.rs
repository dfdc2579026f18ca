//! Attribute identity module.
//!
//! Provides the `AttributeId` type, an interned string name for attributes,
//! and `AttributeType`, which pairs a name with a display category. The
//! aggregation core only ever looks at the name.

use serde::{Deserialize, Serialize};

/// Default category assigned to identities that do not name one.
pub const DEFAULT_CATEGORY: &str = "Core";

/// Declares an `Arc<str>` newtype id with string conversions, `Borrow<str>`
/// for map lookups by `&str`, `Display`, and serde as a plain string.
macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(::std::sync::Arc<str>);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` from a string slice.")]
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Self {
                Self(::std::sync::Arc::from(s))
            }

            /// Get the string representation of this id.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_str(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(::std::sync::Arc::from(s))
            }
        }

        impl ::std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let s = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from(s))
            }
        }
    };
}

pub(crate) use interned_id;

interned_id! {
    /// Interned string identifier for attributes.
    ///
    /// Uses `Arc<str>` so clones are cheap and comparisons are plain string
    /// comparisons.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::AttributeId;
    ///
    /// let health = AttributeId::from_str("Health");
    /// let health2: AttributeId = "Health".into();
    /// let health3: AttributeId = String::from("Health").into();
    ///
    /// assert_eq!(health, health2);
    /// assert_eq!(health, health3);
    /// ```
    AttributeId
}

/// Anything that can identify an attribute.
///
/// The name is the stable key used for lookups and notifications. The
/// category is only for grouping and display.
pub trait AttributeIdentity {
    /// Stable attribute name.
    fn name(&self) -> &str;

    /// Display/grouping category.
    fn category(&self) -> &str;
}

/// A concrete attribute identity: a name plus a category.
///
/// # Examples
///
/// ```rust
/// use statforge::{AttributeIdentity, AttributeType};
///
/// let speed = AttributeType::new("Speed", "Movement");
/// assert_eq!(speed.name(), "Speed");
/// assert_eq!(speed.category(), "Movement");
///
/// let health = AttributeType::core("Health");
/// assert_eq!(health.category(), "Core");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeType {
    /// Attribute name.
    pub name: AttributeId,
    /// Grouping category.
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl AttributeType {
    /// Create an identity with an explicit category.
    pub fn new(name: impl Into<AttributeId>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }

    /// Create an identity in the default `"Core"` category.
    pub fn core(name: impl Into<AttributeId>) -> Self {
        Self::new(name, DEFAULT_CATEGORY)
    }

    /// The interned name.
    pub fn id(&self) -> &AttributeId {
        &self.name
    }
}

impl AttributeIdentity for AttributeType {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn category(&self) -> &str {
        &self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_id_creation() {
        let id1 = AttributeId::from_str("Health");
        let id2 = AttributeId::from_str("Health");
        assert_eq!(id1, id2);
        assert_eq!(id1.as_str(), "Health");
    }

    #[test]
    fn test_attribute_id_ordering() {
        let armor = AttributeId::from_str("Armor");
        let health = AttributeId::from_str("Health");
        assert!(armor < health);
    }

    #[test]
    fn test_ids_share_string_behavior() {
        use crate::modifier::ModifierId;
        use std::collections::HashMap;

        let mut by_attribute = HashMap::new();
        by_attribute.insert(AttributeId::from_str("Health"), 1);
        assert_eq!(by_attribute.get("Health"), Some(&1));

        let mut by_modifier = HashMap::new();
        by_modifier.insert(ModifierId::from_str("ring"), 2);
        assert_eq!(by_modifier.get("ring"), Some(&2));

        assert!(AttributeId::from_str("Mana") == *"Mana");
        assert!(ModifierId::from_str("ring") == *"ring");
        assert_eq!(ModifierId::from_str("ring").to_string(), "ring");

        let json = serde_json::to_string(&ModifierId::from_str("ring")).unwrap();
        assert_eq!(json, r#""ring""#);
        let back: ModifierId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "ring");
    }

    #[test]
    fn test_attribute_type_deserialize_default_category() {
        let ty: AttributeType = serde_json::from_str(r#"{"name":"Mana"}"#).unwrap();
        assert_eq!(ty.name(), "Mana");
        assert_eq!(ty.category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_attribute_type_serializes_name_as_string() {
        let ty = AttributeType::new("Strength", "Offense");
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, r#"{"name":"Strength","category":"Offense"}"#);
    }
}
