//! Entity attribute containers.
//!
//! [`EntityAttributes`] owns one [`AttributeInstance`] per attribute name,
//! forwards modifier requests to the right instance and ticks them all from
//! its clock. Instance notifications are re-published as
//! [`AttributeChanged`] events.
//!
//! There is deliberately no "value of the entity" shortcut: every read names
//! the attribute it wants.

use crate::attribute_id::{AttributeId, AttributeType};
use crate::attribute_set::AttributeSet;
use crate::clock::Clock;
use crate::factory;
use crate::instance::AttributeInstance;
use crate::listeners::{ListenerId, Listeners};
use crate::modifier::{Modifier, ModifierApplication, ModifierId, ModifierKind};
use crate::numeric::AttrValue;
use crate::registry::AttributeLookup;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Published whenever one of the entity's attributes notifies a change.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChanged {
    pub attribute: AttributeType,
    pub value: AttrValue,
}

/// The attributes of one game entity.
///
/// # Examples
///
/// ```rust
/// use statforge::clock::ManualClock;
/// use statforge::{AttributeSet, AttributeType, EntityAttributes};
///
/// let mut preset = AttributeSet::new();
/// preset.add(AttributeType::core("Health"), 100.0);
///
/// let clock = ManualClock::new();
/// let mut hero = EntityAttributes::from_set(&preset, clock.clone());
///
/// hero.add_flat("Health", 25.0, 5.0, "Potion");
/// assert_eq!(hero.value("Health"), Some(125.0));
///
/// clock.advance(5.0);
/// hero.tick();
/// assert_eq!(hero.value("Health"), Some(100.0));
/// assert_eq!(hero.value("Mana"), None);
/// ```
pub struct EntityAttributes {
    attributes: BTreeMap<AttributeId, OwnedInstance>,
    clock: Box<dyn Clock>,
    on_changed: Rc<RefCell<Listeners<AttributeChanged>>>,
    next_modifier: u64,
}

/// An instance plus the subscription that re-publishes its changes.
#[derive(Debug)]
struct OwnedInstance {
    instance: AttributeInstance,
    bubbling: ListenerId,
}

impl OwnedInstance {
    /// Release the entity's subscription and hand the instance back.
    fn release(mut self) -> AttributeInstance {
        self.instance.remove_listener(self.bubbling);
        self.instance
    }
}

impl EntityAttributes {
    /// An entity with no attributes.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            attributes: BTreeMap::new(),
            clock: Box::new(clock),
            on_changed: Rc::new(RefCell::new(Listeners::new())),
            next_modifier: 0,
        }
    }

    /// An entity seeded from a preset.
    pub fn from_set(set: &AttributeSet, clock: impl Clock + 'static) -> Self {
        let mut entity = Self::new(clock);
        entity.set_attribute_set(set);
        entity
    }

    /// Drop every attribute and rebuild from `set`.
    pub fn set_attribute_set(&mut self, set: &AttributeSet) {
        self.attributes.clear();
        for entry in set.entries() {
            self.add_attribute(entry.attribute.clone(), entry.base_value);
        }
        debug!(count = self.attributes.len(), "attribute set applied");
    }

    /// Add an attribute with a fresh instance.
    ///
    /// An existing attribute with the same name is replaced and returned,
    /// no longer reporting to this entity.
    pub fn add_attribute(
        &mut self,
        attribute: AttributeType,
        base_value: AttrValue,
    ) -> Option<AttributeInstance> {
        let mut instance = AttributeInstance::new(attribute.clone(), base_value);

        let sink = Rc::clone(&self.on_changed);
        let changed = attribute.clone();
        let bubbling = instance.on_value_changed(move |value| {
            sink.borrow_mut().emit(&AttributeChanged {
                attribute: changed.clone(),
                value: *value,
            });
        });

        self.attributes
            .insert(attribute.name, OwnedInstance { instance, bubbling })
            .map(OwnedInstance::release)
    }

    /// Resolve `name` through `lookup` and add it.
    ///
    /// Returns `false` if the name is unknown.
    pub fn add_attribute_by_name(
        &mut self,
        lookup: &impl AttributeLookup,
        name: &str,
        base_value: AttrValue,
    ) -> bool {
        match lookup.lookup(name) {
            Some(attribute) => {
                self.add_attribute(attribute, base_value);
                true
            }
            None => {
                debug!(attribute = name, "unknown attribute name");
                false
            }
        }
    }

    /// Remove an attribute and all its modifiers.
    ///
    /// The returned instance no longer reports to this entity.
    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeInstance> {
        self.attributes.remove(name).map(OwnedInstance::release)
    }

    /// Current value of `name`.
    pub fn value(&self, name: &str) -> Option<AttrValue> {
        self.attribute(name).map(AttributeInstance::current_value)
    }

    /// Base value of `name`, ignoring modifiers.
    pub fn base_value(&self, name: &str) -> Option<AttrValue> {
        self.attribute(name).map(AttributeInstance::base_value)
    }

    /// Clear all modifiers on `name`, then set its base value.
    pub fn set_value(&mut self, name: &str, value: AttrValue) -> bool {
        match self.attribute_mut(name) {
            Some(instance) => {
                instance.clear_all_modifiers();
                instance.set_base_value(value);
                true
            }
            None => false,
        }
    }

    /// Set the base value of `name`, keeping its modifiers.
    pub fn set_base_value(&mut self, name: &str, value: AttrValue) -> bool {
        match self.attribute_mut(name) {
            Some(instance) => {
                instance.set_base_value(value);
                true
            }
            None => false,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInstance> {
        self.attributes.get(name).map(|owned| &owned.instance)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut AttributeInstance> {
        self.attributes.get_mut(name).map(|owned| &mut owned.instance)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attribute names, sorted.
    pub fn attribute_names(&self) -> impl Iterator<Item = &AttributeId> {
        self.attributes.keys()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of modifiers held by `name`; 0 if the attribute is unknown.
    pub fn modifier_count(&self, name: &str) -> usize {
        self.attribute(name)
            .map_or(0, AttributeInstance::modifier_count)
    }

    /// Build and apply a modifier. Returns its generated id, or `None` if
    /// the attribute is unknown.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_modifier(
        &mut self,
        name: &str,
        kind: ModifierKind,
        value: AttrValue,
        application: ModifierApplication,
        duration: f64,
        source: &str,
        priority: i32,
    ) -> Option<ModifierId> {
        if !self.attributes.contains_key(name) {
            return None;
        }

        let id = ModifierId::from(format!("{source}_{kind}_{}", self.next_modifier));
        self.next_modifier += 1;

        let modifier = factory::create(
            id.clone(),
            kind,
            value,
            application,
            source,
            duration,
            priority,
        );
        self.apply(name, modifier);
        Some(id)
    }

    /// Apply a pre-built modifier, activating it at the clock's current time.
    pub fn apply(&mut self, name: &str, modifier: Modifier) -> bool {
        let now = self.clock.now();
        match self.attribute_mut(name) {
            Some(instance) => {
                instance.add_modifier(modifier, now);
                true
            }
            None => {
                debug!(
                    attribute = name,
                    modifier = %modifier.id(),
                    "dropping modifier for unknown attribute"
                );
                false
            }
        }
    }

    /// Remove a modifier from `name` by id.
    pub fn remove_modifier(&mut self, name: &str, id: &str) -> bool {
        self.attribute_mut(name)
            .is_some_and(|instance| instance.remove_modifier(id))
    }

    /// Flat bonus; temporary when `duration > 0`.
    pub fn add_flat(
        &mut self,
        name: &str,
        value: AttrValue,
        duration: f64,
        source: &str,
    ) -> Option<ModifierId> {
        self.add_timed(name, ModifierKind::Flat, value, duration, source)
    }

    /// Percentage of base (e.g. `20.0` for +20%); temporary when `duration > 0`.
    pub fn add_percentage(
        &mut self,
        name: &str,
        percent: AttrValue,
        duration: f64,
        source: &str,
    ) -> Option<ModifierId> {
        self.add_timed(name, ModifierKind::PercentageAdd, percent, duration, source)
    }

    /// Compounding multiplier (e.g. `50.0` for x1.5); temporary when `duration > 0`.
    pub fn add_multiplier(
        &mut self,
        name: &str,
        percent: AttrValue,
        duration: f64,
        source: &str,
    ) -> Option<ModifierId> {
        self.add_timed(
            name,
            ModifierKind::PercentageMultiply,
            percent,
            duration,
            source,
        )
    }

    /// Clear modifiers on one attribute, or on all of them when `name` is `None`.
    pub fn clear_all_modifiers(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                if let Some(instance) = self.attribute_mut(name) {
                    instance.clear_all_modifiers();
                }
            }
            None => {
                for owned in self.attributes.values_mut() {
                    owned.instance.clear_all_modifiers();
                }
            }
        }
    }

    /// Remove modifiers carrying `source`, on one attribute or on all.
    ///
    /// Each affected attribute notifies once. Returns the number removed.
    pub fn clear_modifiers_by_source(&mut self, source: &str, name: Option<&str>) -> usize {
        match name {
            Some(name) => self
                .attribute_mut(name)
                .map_or(0, |instance| instance.clear_modifiers_by_source(source)),
            None => self
                .attributes
                .values_mut()
                .map(|owned| owned.instance.clear_modifiers_by_source(source))
                .sum(),
        }
    }

    /// Advance every attribute to the clock's current time.
    ///
    /// Returns the number of modifiers that expired.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let evicted = self
            .attributes
            .values_mut()
            .map(|owned| owned.instance.update(now))
            .sum();
        trace!(now, evicted, "entity ticked");
        evicted
    }

    /// Register a callback for attribute changes.
    pub fn on_attribute_changed(
        &mut self,
        callback: impl FnMut(&AttributeChanged) + 'static,
    ) -> ListenerId {
        self.on_changed.borrow_mut().subscribe(callback)
    }

    /// Release an attribute-change callback.
    pub fn remove_listener(&mut self, listener: ListenerId) -> bool {
        self.on_changed.borrow_mut().unsubscribe(listener)
    }

    /// Current time according to the entity's clock.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    fn add_timed(
        &mut self,
        name: &str,
        kind: ModifierKind,
        value: AttrValue,
        duration: f64,
        source: &str,
    ) -> Option<ModifierId> {
        let application = if duration > 0.0 {
            ModifierApplication::Temporary
        } else {
            ModifierApplication::Permanent
        };
        self.apply_modifier(name, kind, value, application, duration, source, 0)
    }
}

impl fmt::Debug for EntityAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityAttributes")
            .field("attributes", &self.attributes)
            .field("listeners", &self.on_changed.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn entity() -> (EntityAttributes, ManualClock) {
        let clock = ManualClock::new();
        let mut set = AttributeSet::new();
        set.add(AttributeType::core("Health"), 100.0);
        set.add(AttributeType::new("Speed", "Movement"), 5.0);
        (EntityAttributes::from_set(&set, clock.clone()), clock)
    }

    #[test]
    fn test_seeded_from_set() {
        let (e, _) = entity();
        assert_eq!(e.len(), 2);
        assert_eq!(e.value("Health"), Some(100.0));
        assert_eq!(e.base_value("Speed"), Some(5.0));
        let names: Vec<&str> = e.attribute_names().map(AttributeId::as_str).collect();
        assert_eq!(names, vec!["Health", "Speed"]);
    }

    #[test]
    fn test_unknown_attribute_is_noop() {
        let (mut e, _) = entity();
        assert_eq!(e.add_flat("Mana", 5.0, 0.0, "x"), None);
        assert!(!e.remove_modifier("Mana", "anything"));
        assert!(!e.set_base_value("Mana", 3.0));
        assert_eq!(e.modifier_count("Mana"), 0);
    }

    #[test]
    fn test_apply_modifier_generates_distinct_ids() {
        let (mut e, _) = entity();
        let a = e.add_flat("Health", 1.0, 0.0, "Gem").unwrap();
        let b = e.add_flat("Health", 1.0, 0.0, "Gem").unwrap();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("Gem_Flat_"));
        assert_eq!(e.value("Health"), Some(102.0));
    }

    #[test]
    fn test_set_value_clears_modifiers() {
        let (mut e, _) = entity();
        e.add_multiplier("Speed", 100.0, 0.0, "Boots");
        assert_eq!(e.value("Speed"), Some(10.0));

        assert!(e.set_value("Speed", 7.0));
        assert_eq!(e.value("Speed"), Some(7.0));
        assert_eq!(e.modifier_count("Speed"), 0);
    }

    #[test]
    fn test_changes_bubble_with_identity() {
        let (mut e, _) = entity();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        e.on_attribute_changed(move |event| {
            sink.borrow_mut()
                .push((event.attribute.category.clone(), event.value));
        });

        e.add_percentage("Speed", 20.0, 0.0, "Haste");
        assert_eq!(*seen.borrow(), vec![("Movement".to_string(), 6.0)]);
    }

    #[test]
    fn test_detached_instances_stop_bubbling() {
        let (mut e, _) = entity();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        e.on_attribute_changed(move |event| {
            sink.borrow_mut()
                .push((event.attribute.name.to_string(), event.value));
        });

        let mut removed = e.remove_attribute("Health").unwrap();
        assert!(!e.has_attribute("Health"));
        assert_eq!(removed.listener_count(), 0);
        removed.set_base_value(5.0);

        let mut replaced = e
            .add_attribute(AttributeType::new("Speed", "Movement"), 8.0)
            .unwrap();
        assert_eq!(replaced.listener_count(), 0);
        replaced.set_base_value(1.0);
        assert!(seen.borrow().is_empty());

        e.set_base_value("Speed", 9.0);
        assert_eq!(*seen.borrow(), vec![("Speed".to_string(), 9.0)]);
    }

    #[test]
    fn test_tick_uses_clock() {
        let (mut e, clock) = entity();
        e.add_flat("Health", -20.0, 2.0, "Poison");
        clock.advance(1.0);
        assert_eq!(e.tick(), 0);
        assert_eq!(e.value("Health"), Some(80.0));
        clock.advance(1.0);
        assert_eq!(e.tick(), 1);
        assert_eq!(e.value("Health"), Some(100.0));
    }

    #[test]
    fn test_add_attribute_by_name() {
        let mut lookup = std::collections::HashMap::new();
        lookup.insert("Mana".to_string(), AttributeType::new("Mana", "Magic"));

        let (mut e, _) = entity();
        assert!(e.add_attribute_by_name(&lookup, "Mana", 40.0));
        assert!(!e.add_attribute_by_name(&lookup, "Rage", 40.0));
        assert_eq!(e.attribute("Mana").map(|i| i.attribute().category.as_str()), Some("Magic"));
    }
}
