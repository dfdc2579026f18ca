//! Attribute identity registry.
//!
//! An [`AttributeRegistry`] is the catalogue of known attributes: names,
//! categories and lookups. Containers receive it (or any other
//! [`AttributeLookup`]) when they need to resolve names.

use crate::attribute_id::{AttributeId, AttributeType};
use crate::error::AttributeError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Resolves attribute names to identities.
pub trait AttributeLookup {
    fn lookup(&self, name: &str) -> Option<AttributeType>;
}

impl AttributeLookup for HashMap<String, AttributeType> {
    fn lookup(&self, name: &str) -> Option<AttributeType> {
        self.get(name).cloned()
    }
}

/// Catalogue of attribute identities in registration order.
///
/// # Examples
///
/// ```rust
/// use statforge::AttributeRegistry;
///
/// let registry = AttributeRegistry::from_json(
///     r#"{"attributes":[
///         {"name":"Health"},
///         {"name":"Strength","category":"Offense"},
///         {"name":"Agility","category":"Offense"}
///     ]}"#,
/// )
/// .unwrap();
///
/// assert_eq!(registry.len(), 3);
/// assert_eq!(registry.categories(), vec!["Core", "Offense"]);
/// assert_eq!(registry.by_category("Offense").count(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRegistry")]
pub struct AttributeRegistry {
    attributes: Vec<AttributeType>,
    #[serde(skip)]
    index: HashMap<AttributeId, usize>,
}

/// Wire shape of a registry document, before validation and indexing.
#[derive(Deserialize)]
struct RawRegistry {
    #[serde(default)]
    attributes: Vec<AttributeType>,
}

impl TryFrom<RawRegistry> for AttributeRegistry {
    type Error = AttributeError;

    fn try_from(raw: RawRegistry) -> Result<Self, Self::Error> {
        if raw
            .attributes
            .iter()
            .any(|attribute| attribute.name.as_str().trim().is_empty())
        {
            return Err(AttributeError::InvalidName);
        }
        let mut registry = Self {
            attributes: raw.attributes,
            index: HashMap::new(),
        };
        registry.reindex();
        Ok(registry)
    }
}

impl AttributeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry document.
    ///
    /// Duplicate names keep their first occurrence and are reported by
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, AttributeError> {
        let raw: RawRegistry = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Serialize the registry to JSON.
    pub fn to_json(&self) -> Result<String, AttributeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Register an identity. Fails if the name is taken or blank.
    pub fn insert(&mut self, attribute: AttributeType) -> Result<(), AttributeError> {
        if attribute.name.as_str().trim().is_empty() {
            return Err(AttributeError::InvalidName);
        }
        if self.index.contains_key(&attribute.name) {
            return Err(AttributeError::DuplicateAttribute(attribute.name));
        }
        self.index
            .insert(attribute.name.clone(), self.attributes.len());
        self.attributes.push(attribute);
        Ok(())
    }

    /// Return the identity named `name`, registering it under `category`
    /// if it does not exist yet.
    pub fn create(&mut self, name: &str, category: &str) -> Result<AttributeType, AttributeError> {
        if let Some(existing) = self.get(name) {
            return Ok(existing.clone());
        }
        let attribute = AttributeType::new(name, category);
        self.insert(attribute.clone())?;
        Ok(attribute)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeType> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    /// Like [`get`](Self::get), but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<&AttributeType, AttributeError> {
        self.get(name)
            .ok_or_else(|| AttributeError::UnknownAttribute(AttributeId::from_str(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Unregister an identity. Returns `false` if it was not registered.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.attributes.iter().position(|a| a.name.as_str() == name) {
            Some(position) => {
                self.attributes.remove(position);
                self.reindex();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Identities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeType> {
        self.attributes.iter()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .map(|a| a.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Identities in `category`, in registration order.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a AttributeType> {
        self.attributes.iter().filter(move |a| a.category == category)
    }

    /// Names registered more than once, sorted. Each is logged as a warning.
    pub fn validate(&self) -> Vec<AttributeId> {
        let mut counts: HashMap<&AttributeId, usize> = HashMap::new();
        for attribute in &self.attributes {
            *counts.entry(&attribute.name).or_insert(0) += 1;
        }

        let mut duplicates: Vec<AttributeId> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.clone())
            .collect();
        duplicates.sort();

        for name in &duplicates {
            warn!(attribute = %name, "duplicate attribute in registry");
        }
        duplicates
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, attribute) in self.attributes.iter().enumerate() {
            self.index.entry(attribute.name.clone()).or_insert(position);
        }
    }
}

impl AttributeLookup for AttributeRegistry {
    fn lookup(&self, name: &str) -> Option<AttributeType> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AttributeRegistry {
        let mut r = AttributeRegistry::new();
        r.insert(AttributeType::core("Health")).unwrap();
        r.insert(AttributeType::new("Speed", "Movement")).unwrap();
        r
    }

    #[test]
    fn test_insert_rejects_duplicates_and_blank_names() {
        let mut r = registry();
        assert_eq!(
            r.insert(AttributeType::core("Health")),
            Err(AttributeError::DuplicateAttribute(AttributeId::from_str(
                "Health"
            )))
        );
        assert_eq!(
            r.insert(AttributeType::core("   ")),
            Err(AttributeError::InvalidName)
        );
    }

    #[test]
    fn test_create_returns_existing() {
        let mut r = registry();
        let speed = r.create("Speed", "Other").unwrap();
        assert_eq!(speed.category, "Movement");
        assert_eq!(r.len(), 2);

        let mana = r.create("Mana", "Magic").unwrap();
        assert_eq!(mana.category, "Magic");
        assert!(r.contains("Mana"));
    }

    #[test]
    fn test_remove_reindexes() {
        let mut r = registry();
        assert!(r.remove("Health"));
        assert!(!r.remove("Health"));
        assert_eq!(r.get("Speed").map(|a| a.category.as_str()), Some("Movement"));
        assert!(r.require("Health").is_err());
    }

    #[test]
    fn test_validate_reports_duplicates_from_json() {
        let r = AttributeRegistry::from_json(
            r#"{"attributes":[{"name":"Armor"},{"name":"Armor","category":"Defense"}]}"#,
        )
        .unwrap();
        assert_eq!(r.validate(), vec![AttributeId::from_str("Armor")]);
        assert_eq!(r.get("Armor").map(|a| a.category.as_str()), Some("Core"));
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            AttributeRegistry::from_json("not json"),
            Err(AttributeError::Config(_))
        ));
        assert_eq!(
            AttributeRegistry::from_json(r#"{"attributes":[{"name":""}]}"#).unwrap_err(),
            AttributeError::InvalidName
        );
    }

    #[test]
    fn test_nested_deserialize_builds_index() {
        #[derive(Deserialize)]
        struct GameConfig {
            registry: AttributeRegistry,
        }

        let config: GameConfig = serde_json::from_str(
            r#"{"registry":{"attributes":[{"name":"Health"},{"name":"Speed","category":"Movement"}]}}"#,
        )
        .unwrap();
        assert_eq!(config.registry.len(), 2);
        assert!(config.registry.contains("Health"));
        assert_eq!(
            config.registry.get("Speed").map(|a| a.category.as_str()),
            Some("Movement")
        );
        assert!(config.registry.lookup("Health").is_some());

        let direct: AttributeRegistry =
            serde_json::from_str(r#"{"attributes":[{"name":"Health"}]}"#).unwrap();
        assert!(direct.get("Health").is_some());
    }

    #[test]
    fn test_direct_deserialize_rejects_blank_names() {
        let err = serde_json::from_str::<AttributeRegistry>(r#"{"attributes":[{"name":" "}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let r = registry();
        let back = AttributeRegistry::from_json(&r.to_json().unwrap()).unwrap();
        let names: Vec<&str> = back.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Health", "Speed"]);
        assert!(back.lookup("Speed").is_some());
    }
}
