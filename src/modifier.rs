//! Modifiers and their lifecycle.
//!
//! A [`Modifier`] is one adjustment to an attribute: a kind (how its
//! magnitude combines), an application mode (how it behaves over time) and
//! a small state machine:
//!
//! ```text
//! Created --activate(now)--> Active --update(now) / force_expire()--> Expired
//! ```
//!
//! `Created` and `Expired` modifiers contribute nothing. Time is always
//! supplied by the caller in seconds; modifiers never read a clock.

use crate::attribute_id::interned_id;
use crate::listeners::{ListenerId, Listeners};
use crate::numeric::{clamp01, AttrValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a modifier's magnitude combines into the aggregate.
///
/// Aggregation applies the kinds in declaration order: all flat values,
/// then the summed percentage of base, then each multiplier in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Absolute delta: `+10` adds 10.
    Flat,
    /// Percent of the base value, summed with the other percentages: `+20` adds 20% of base.
    PercentageAdd,
    /// Compounding percent change: `+50` multiplies by 1.5.
    PercentageMultiply,
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierKind::Flat => "Flat",
            ModifierKind::PercentageAdd => "PercentageAdd",
            ModifierKind::PercentageMultiply => "PercentageMultiply",
        };
        f.write_str(name)
    }
}

/// How a modifier behaves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierApplication {
    /// Applies once and expires during activation.
    Instant,
    /// Full magnitude until `duration` has elapsed. A zero duration never expires.
    Temporary,
    /// Full magnitude until removed.
    Permanent,
    /// Ramps linearly from 0 to full magnitude over `duration`, then expires.
    OverTime,
}

/// Lifecycle state of a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierState {
    /// Not yet attached to an attribute.
    Created,
    /// Contributing to its attribute.
    Active,
    /// Inert and waiting to be discarded.
    Expired,
}

interned_id! {
    /// Unique modifier identifier, used for replacement and removal.
    ModifierId
}

/// A single adjustment to an attribute value.
///
/// # Examples
///
/// ```rust
/// use statforge::{Modifier, ModifierApplication, ModifierKind};
///
/// let mut regen = Modifier::new(
///     "regen",
///     ModifierKind::Flat,
///     ModifierApplication::OverTime,
///     50.0,
/// )
/// .with_duration(10.0);
///
/// assert_eq!(regen.current_value(), 0.0); // not active yet
///
/// regen.activate(0.0);
/// regen.update(5.0);
/// assert_eq!(regen.current_value(), 25.0);
///
/// assert!(regen.update(10.0));
/// assert!(regen.is_expired());
/// assert_eq!(regen.applied_amount(), 50.0);
/// ```
pub struct Modifier {
    id: ModifierId,
    source: String,
    kind: ModifierKind,
    application: ModifierApplication,
    magnitude: AttrValue,
    duration: f64,
    priority: i32,

    state: ModifierState,
    activated_at: f64,
    last_tick: f64,
    applied_amount: AttrValue,
    on_expired: Listeners<ModifierId>,
}

impl Modifier {
    /// Source label used when none is given.
    pub const DEFAULT_SOURCE: &'static str = "Unknown";

    /// Create a modifier in the `Created` state with no duration, priority 0
    /// and the default source label.
    pub fn new(
        id: impl Into<ModifierId>,
        kind: ModifierKind,
        application: ModifierApplication,
        magnitude: AttrValue,
    ) -> Self {
        Self {
            id: id.into(),
            source: Self::DEFAULT_SOURCE.to_string(),
            kind,
            application,
            magnitude,
            duration: 0.0,
            priority: 0,
            state: ModifierState::Created,
            activated_at: 0.0,
            last_tick: 0.0,
            applied_amount: 0.0,
            on_expired: Listeners::new(),
        }
    }

    /// Set the source label.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the duration in seconds. Negative and NaN durations become 0.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Set the ordering priority. Lower priorities apply first.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn id(&self) -> &ModifierId {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    pub fn application(&self) -> ModifierApplication {
        self.application
    }

    /// Signed magnitude as configured.
    pub fn magnitude(&self) -> AttrValue {
        self.magnitude
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn state(&self) -> ModifierState {
        self.state
    }

    /// Whether the modifier has ever been activated (stays true after expiry).
    pub fn is_active(&self) -> bool {
        self.state != ModifierState::Created
    }

    pub fn is_expired(&self) -> bool {
        self.state == ModifierState::Expired
    }

    /// Whether the modifier currently contributes to an aggregate.
    pub fn is_live(&self) -> bool {
        self.state == ModifierState::Active
    }

    /// Activation timestamp, if the modifier has been activated.
    pub fn activated_at(&self) -> Option<f64> {
        self.is_active().then_some(self.activated_at)
    }

    /// Time of the last `activate` or `update` call.
    pub fn last_tick(&self) -> f64 {
        self.last_tick
    }

    /// The last contribution this modifier reported.
    ///
    /// Instant modifiers record their magnitude on activation; over-time
    /// modifiers are pinned to their full magnitude when they expire.
    pub fn applied_amount(&self) -> AttrValue {
        self.applied_amount
    }

    /// Seconds since activation, as of the last tick.
    pub fn elapsed(&self) -> f64 {
        if self.is_active() {
            (self.last_tick - self.activated_at).max(0.0)
        } else {
            0.0
        }
    }

    /// Seconds left before natural expiry, as of the last tick.
    ///
    /// Always 0 for modifiers without a duration.
    pub fn remaining_time(&self) -> f64 {
        if self.duration > 0.0 {
            (self.duration - self.elapsed()).max(0.0)
        } else {
            0.0
        }
    }

    /// Fraction of the duration elapsed, in `[0, 1]`. 1 when there is no duration.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            clamp01(self.elapsed() / self.duration)
        } else {
            1.0
        }
    }

    /// Move from `Created` to `Active` at time `now`.
    ///
    /// Instant modifiers record their magnitude and expire immediately,
    /// firing the expiry notification. Returns `false` (and does nothing)
    /// if the modifier was already activated or expired.
    pub fn activate(&mut self, now: f64) -> bool {
        if self.state != ModifierState::Created {
            return false;
        }

        self.state = ModifierState::Active;
        self.activated_at = now;
        self.last_tick = now;

        if self.application == ModifierApplication::Instant {
            self.applied_amount = self.magnitude;
            self.expire();
        }
        true
    }

    /// Contribution at time `now`. Zero unless the modifier is live.
    pub fn value_at(&self, now: f64) -> AttrValue {
        if self.state != ModifierState::Active {
            return 0.0;
        }

        match self.application {
            ModifierApplication::Instant
            | ModifierApplication::Temporary
            | ModifierApplication::Permanent => self.magnitude,
            ModifierApplication::OverTime => {
                if self.duration > 0.0 {
                    let elapsed = now - self.activated_at;
                    self.magnitude * clamp01(elapsed / self.duration)
                } else {
                    self.magnitude
                }
            }
        }
    }

    /// Contribution as of the last tick.
    pub fn current_value(&self) -> AttrValue {
        self.value_at(self.last_tick)
    }

    /// Advance to time `now`, expiring the modifier if its duration has run out.
    ///
    /// Returns `true` only on the call that expired it.
    pub fn update(&mut self, now: f64) -> bool {
        if self.state != ModifierState::Active {
            return false;
        }

        self.last_tick = now;
        let timed = matches!(
            self.application,
            ModifierApplication::Temporary | ModifierApplication::OverTime
        );

        if timed && self.duration > 0.0 && now - self.activated_at >= self.duration {
            if self.application == ModifierApplication::OverTime {
                self.applied_amount = self.magnitude;
            }
            self.expire();
            return true;
        }

        self.applied_amount = self.value_at(now);
        false
    }

    /// Expire the modifier regardless of its duration.
    ///
    /// Returns `false` if it was already expired; the expiry notification
    /// never fires twice.
    pub fn force_expire(&mut self) -> bool {
        if self.state == ModifierState::Expired {
            return false;
        }
        self.expire();
        true
    }

    /// Register a callback for the transition to `Expired`.
    pub fn subscribe_expired(&mut self, callback: impl FnMut(&ModifierId) + 'static) -> ListenerId {
        self.on_expired.subscribe(callback)
    }

    /// Release an expiry callback.
    pub fn unsubscribe_expired(&mut self, listener: ListenerId) -> bool {
        self.on_expired.unsubscribe(listener)
    }

    /// Number of registered expiry callbacks.
    pub fn expiry_listener_count(&self) -> usize {
        self.on_expired.len()
    }

    fn expire(&mut self) {
        self.state = ModifierState::Expired;
        let id = self.id.clone();
        self.on_expired.emit(&id);
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("kind", &self.kind)
            .field("application", &self.application)
            .field("magnitude", &self.magnitude)
            .field("duration", &self.duration)
            .field("priority", &self.priority)
            .field("state", &self.state)
            .field("activated_at", &self.activated_at)
            .field("listeners", &self.on_expired.len())
            .finish()
    }
}
