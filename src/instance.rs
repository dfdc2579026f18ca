//! Aggregated attribute instances.
//!
//! An [`AttributeInstance`] owns a base value and the modifiers applied to
//! one attribute, and recomputes the effective value on every read:
//!
//! ```text
//! value = (base + Σ flat + base × Σ percent / 100) × Π (1 + multiplier / 100)
//! ```
//!
//! Live modifiers are taken in priority order (ties keep insertion order),
//! so the multiplier chain is reproducible bit for bit.

use crate::attribute_id::{AttributeId, AttributeIdentity, AttributeType};
use crate::breakdown::{FlatStep, MultiplierStep, PercentStep, ValueBreakdown};
use crate::listeners::{ListenerId, Listeners};
use crate::modifier::{Modifier, ModifierId, ModifierKind};
use crate::numeric::{percent_factor, values_differ, AttrValue};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// A held modifier plus the expiry subscription the instance registered on it.
struct AttachedModifier {
    modifier: Modifier,
    expiry_listener: ListenerId,
}

/// One attribute's base value and modifier stack.
///
/// Every mutation notifies value-changed listeners with the freshly
/// recomputed value; `update` only does so when the value moved by more
/// than [`VALUE_EPSILON`](crate::numeric::VALUE_EPSILON).
///
/// # Examples
///
/// ```rust
/// use statforge::{factory, AttributeInstance, AttributeType};
///
/// let mut health = AttributeInstance::new(AttributeType::core("Health"), 100.0);
///
/// health.add_modifier(factory::flat(10.0, "Armor", 0.0), 0.0);
/// health.add_modifier(factory::percentage(20.0, "Aura", 0.0), 0.0);
/// health.add_modifier(factory::multiplier(50.0, "Rage", 0.0), 0.0);
/// assert_eq!(health.current_value(), 195.0); // (100 + 10 + 20) * 1.5
/// ```
pub struct AttributeInstance {
    attribute: AttributeType,
    base_value: AttrValue,
    /// Insertion order; replacements are re-appended.
    modifiers: Vec<AttachedModifier>,
    /// Ids pushed by expiry subscriptions, drained by `update`.
    expired_inbox: Rc<RefCell<Vec<ModifierId>>>,
    on_value_changed: Listeners<AttrValue>,
}

impl AttributeInstance {
    /// Create an instance with no modifiers.
    pub fn new(attribute: AttributeType, base_value: AttrValue) -> Self {
        Self {
            attribute,
            base_value,
            modifiers: Vec::new(),
            expired_inbox: Rc::new(RefCell::new(Vec::new())),
            on_value_changed: Listeners::new(),
        }
    }

    /// Create an instance from any identity provider.
    pub fn from_identity(identity: &impl AttributeIdentity, base_value: AttrValue) -> Self {
        Self::new(
            AttributeType::new(identity.name(), identity.category()),
            base_value,
        )
    }

    pub fn attribute(&self) -> &AttributeType {
        &self.attribute
    }

    pub fn name(&self) -> &AttributeId {
        &self.attribute.name
    }

    pub fn base_value(&self) -> AttrValue {
        self.base_value
    }

    /// Effective value from the base value and every live modifier.
    ///
    /// Recomputed on each call; nothing is cached.
    pub fn current_value(&self) -> AttrValue {
        self.compute(None)
    }

    /// Step-by-step explanation of [`current_value`](Self::current_value).
    pub fn breakdown(&self) -> ValueBreakdown {
        let mut breakdown = ValueBreakdown::new(self.attribute.name.clone(), self.base_value);
        breakdown.value = self.compute(Some(&mut breakdown));
        breakdown
    }

    /// Every held modifier in insertion order, including expired ones that
    /// have not been evicted yet.
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter().map(|attached| &attached.modifier)
    }

    /// Number of held modifiers.
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Whether a live modifier with this id is held.
    pub fn has_modifier(&self, id: &str) -> bool {
        self.modifier(id).is_some()
    }

    /// The live modifier with this id.
    pub fn modifier(&self, id: &str) -> Option<&Modifier> {
        self.modifiers()
            .find(|m| m.id().as_str() == id && m.is_live())
    }

    /// Attach and activate a modifier at time `now`.
    ///
    /// A held modifier with the same id is discarded first, so identical ids
    /// replace rather than stack. Modifiers that are already expired are
    /// dropped without being attached. Listeners are always notified.
    pub fn add_modifier(&mut self, mut modifier: Modifier, now: f64) {
        if let Some(index) = self.position(modifier.id().as_str()) {
            self.discard(index);
            debug!(
                attribute = %self.attribute.name,
                modifier = %modifier.id(),
                "replacing modifier with the same id"
            );
        }

        if modifier.is_expired() {
            debug!(
                attribute = %self.attribute.name,
                modifier = %modifier.id(),
                "ignoring already expired modifier"
            );
        } else {
            let inbox = Rc::clone(&self.expired_inbox);
            let expiry_listener =
                modifier.subscribe_expired(move |id| inbox.borrow_mut().push(id.clone()));
            modifier.activate(now);
            debug!(
                attribute = %self.attribute.name,
                modifier = %modifier.id(),
                kind = %modifier.kind(),
                magnitude = modifier.magnitude(),
                "modifier attached"
            );
            self.modifiers.push(AttachedModifier {
                modifier,
                expiry_listener,
            });
        }

        self.notify();
    }

    /// Remove, expire and discard the modifier with this id.
    ///
    /// Returns `false`, without notifying, if no such modifier is held.
    pub fn remove_modifier(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.discard(index);
                debug!(attribute = %self.attribute.name, modifier = id, "modifier removed");
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Detach the modifier with this id and hand it back unexpired.
    ///
    /// The instance's subscription on it is released. Listeners are
    /// notified when a modifier was taken.
    pub fn take_modifier(&mut self, id: &str) -> Option<Modifier> {
        let index = self.position(id)?;
        let modifier = self.detach(index);
        self.notify();
        Some(modifier)
    }

    /// Remove every modifier and notify once.
    pub fn clear_all_modifiers(&mut self) {
        let count = self.modifiers.len();
        while !self.modifiers.is_empty() {
            self.discard(self.modifiers.len() - 1);
        }
        self.expired_inbox.borrow_mut().clear();
        debug!(attribute = %self.attribute.name, count, "cleared all modifiers");
        self.notify();
    }

    /// Remove every modifier whose source label equals `source`.
    ///
    /// Notifies once if anything was removed. Returns the number removed.
    pub fn clear_modifiers_by_source(&mut self, source: &str) -> usize {
        let doomed: Vec<usize> = self
            .modifiers
            .iter()
            .enumerate()
            .filter(|(_, attached)| attached.modifier.source() == source)
            .map(|(index, _)| index)
            .collect();

        for &index in doomed.iter().rev() {
            self.discard(index);
        }

        if !doomed.is_empty() {
            debug!(
                attribute = %self.attribute.name,
                source,
                count = doomed.len(),
                "cleared modifiers by source"
            );
            self.notify();
        }
        doomed.len()
    }

    /// Replace the base value and notify with the recomputed value.
    pub fn set_base_value(&mut self, base_value: AttrValue) {
        self.base_value = base_value;
        self.notify();
    }

    /// Advance every modifier to time `now` and evict the ones that expired.
    ///
    /// Notifies at most once, and only if the value changed by more than
    /// the epsilon. Returns the number of modifiers evicted.
    pub fn update(&mut self, now: f64) -> usize {
        let previous = self.current_value();

        for attached in self.modifiers.iter_mut() {
            attached.modifier.update(now);
        }

        let expired = std::mem::take(&mut *self.expired_inbox.borrow_mut());
        let mut evicted = 0;
        for id in expired {
            let found = self
                .modifiers
                .iter()
                .position(|attached| *attached.modifier.id() == id && attached.modifier.is_expired());
            if let Some(index) = found {
                let modifier = self.detach(index);
                debug!(
                    attribute = %self.attribute.name,
                    modifier = %modifier.id(),
                    applied = modifier.applied_amount(),
                    "modifier expired"
                );
                evicted += 1;
            }
        }

        let current = self.current_value();
        trace!(
            attribute = %self.attribute.name,
            now,
            previous,
            current,
            evicted,
            "attribute updated"
        );
        if values_differ(previous, current) {
            self.on_value_changed.emit(&current);
        }
        evicted
    }

    /// Register a value-changed callback. It receives the new value.
    pub fn on_value_changed(&mut self, callback: impl FnMut(&AttrValue) + 'static) -> ListenerId {
        self.on_value_changed.subscribe(callback)
    }

    /// Release a value-changed callback.
    pub fn remove_listener(&mut self, listener: ListenerId) -> bool {
        self.on_value_changed.unsubscribe(listener)
    }

    /// Number of value-changed callbacks.
    pub fn listener_count(&self) -> usize {
        self.on_value_changed.len()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.modifiers
            .iter()
            .position(|attached| attached.modifier.id().as_str() == id)
    }

    /// Remove the modifier at `index` and release the instance's subscription.
    fn detach(&mut self, index: usize) -> Modifier {
        let AttachedModifier {
            mut modifier,
            expiry_listener,
        } = self.modifiers.remove(index);
        modifier.unsubscribe_expired(expiry_listener);
        modifier
    }

    /// Detach, force-expire and drop the modifier at `index`.
    fn discard(&mut self, index: usize) {
        let mut modifier = self.detach(index);
        modifier.force_expire();
    }

    fn notify(&mut self) {
        let value = self.current_value();
        self.on_value_changed.emit(&value);
    }

    fn compute(&self, mut breakdown: Option<&mut ValueBreakdown>) -> AttrValue {
        let mut live: Vec<&Modifier> = self.modifiers().filter(|m| m.is_live()).collect();
        live.sort_by_key(|m| m.priority());

        let of_kind = |kind: ModifierKind| live.iter().copied().filter(move |m| m.kind() == kind);

        let base = self.base_value;
        let mut result = base;

        let mut flat_total = 0.0;
        let mut has_flat = false;
        for modifier in of_kind(ModifierKind::Flat) {
            flat_total += modifier.current_value();
            has_flat = true;
        }
        result += flat_total;
        if has_flat {
            if let Some(b) = breakdown.as_deref_mut() {
                b.flat = Some(FlatStep {
                    total: flat_total,
                    after: result,
                });
            }
        }

        let mut percent_total = 0.0;
        let mut has_percent = false;
        for modifier in of_kind(ModifierKind::PercentageAdd) {
            percent_total += modifier.current_value();
            has_percent = true;
        }
        let mut percent_amount = 0.0;
        if percent_total != 0.0 {
            percent_amount = base * (percent_total / 100.0);
            result += percent_amount;
        }
        if has_percent {
            if let Some(b) = breakdown.as_deref_mut() {
                b.percent = Some(PercentStep {
                    total_percent: percent_total,
                    amount: percent_amount,
                    after: result,
                });
            }
        }

        for modifier in of_kind(ModifierKind::PercentageMultiply) {
            let factor = percent_factor(modifier.current_value());
            let before = result;
            result *= factor;
            if let Some(b) = breakdown.as_deref_mut() {
                b.multipliers.push(MultiplierStep {
                    modifier: modifier.id().clone(),
                    factor,
                    before,
                    after: result,
                });
            }
        }

        result
    }
}

impl fmt::Debug for AttributeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeInstance")
            .field("attribute", &self.attribute)
            .field("base_value", &self.base_value)
            .field(
                "modifiers",
                &self.modifiers.iter().map(|a| &a.modifier).collect::<Vec<_>>(),
            )
            .field("listeners", &self.on_value_changed.len())
            .finish()
    }
}
