//! Attribute sets.
//!
//! An [`AttributeSet`] is a preset of starting base values, e.g. "Warrior"
//! or "Goblin". Entities read it once when they are built; later changes to
//! the set do not reach existing entities.

use crate::attribute_id::{AttributeId, AttributeType};
use crate::error::AttributeError;
use crate::numeric::AttrValue;
use crate::registry::AttributeLookup;
use serde::{Deserialize, Serialize};

/// One preset entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub attribute: AttributeType,
    pub base_value: AttrValue,
}

/// Ordered list of (identity, base value) pairs, at most one per name.
///
/// # Examples
///
/// ```rust
/// use statforge::{AttributeRegistry, AttributeSet};
///
/// let registry = AttributeRegistry::from_json(
///     r#"{"attributes":[{"name":"Health"},{"name":"Mana"}]}"#,
/// )
/// .unwrap();
///
/// let mage = AttributeSet::from_names(&registry, [("Health", 60.0), ("Mana", 150.0)]).unwrap();
/// assert_eq!(mage.base_value("Mana"), Some(150.0));
///
/// assert!(AttributeSet::from_names(&registry, [("Rage", 10.0)]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    entries: Vec<AttributeEntry>,
}

impl AttributeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set by resolving names through `lookup`.
    pub fn from_names<'a>(
        lookup: &impl AttributeLookup,
        values: impl IntoIterator<Item = (&'a str, AttrValue)>,
    ) -> Result<Self, AttributeError> {
        let mut set = Self::new();
        for (name, base_value) in values {
            let attribute = lookup
                .lookup(name)
                .ok_or_else(|| AttributeError::UnknownAttribute(AttributeId::from_str(name)))?;
            set.add(attribute, base_value);
        }
        Ok(set)
    }

    /// Parse a set document.
    pub fn from_json(json: &str) -> Result<Self, AttributeError> {
        let parsed: AttributeSet = serde_json::from_str(json)?;
        // Later duplicates overwrite earlier ones, as `add` does.
        let mut set = Self::new();
        for entry in parsed.entries {
            set.add(entry.attribute, entry.base_value);
        }
        Ok(set)
    }

    /// Serialize the set to JSON.
    pub fn to_json(&self) -> Result<String, AttributeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add an entry, or update the base value of an existing one in place.
    pub fn add(&mut self, attribute: AttributeType, base_value: AttrValue) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.attribute.name == attribute.name)
        {
            Some(entry) => entry.base_value = base_value,
            None => self.entries.push(AttributeEntry {
                attribute,
                base_value,
            }),
        }
    }

    /// Remove the entry for `name`. Returns `false` if absent.
    pub fn remove(&mut self, name: &str) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| entry.attribute.name.as_str() == name)
        {
            Some(position) => {
                self.entries.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.base_value(name).is_some()
    }

    pub fn base_value(&self, name: &str) -> Option<AttrValue> {
        self.entries
            .iter()
            .find(|entry| entry.attribute.name.as_str() == name)
            .map(|entry| entry.base_value)
    }

    pub fn entries(&self) -> &[AttributeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
