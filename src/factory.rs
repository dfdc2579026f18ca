//! Modifier factory.
//!
//! Shortcuts for the common modifier shapes. Every function returns a
//! fresh, not-yet-activated [`Modifier`]; when no id is supplied one is
//! generated from a process-wide counter (`"flat_0"`, `"buff_1"`, ...).
//!
//! The free functions cover the usual cases. [`ModifierBuilder`] offers
//! the same shapes with every optional field spelled out:
//!
//! ```rust
//! use statforge::factory::{self, ModifierBuilder};
//! use statforge::{ModifierApplication, ModifierKind};
//!
//! let sword = factory::flat(12.0, "Sword", 0.0);
//! assert_eq!(sword.application(), ModifierApplication::Permanent);
//!
//! let haste = ModifierBuilder::multiplier(25.0)
//!     .id("haste")
//!     .source("Spell")
//!     .duration(8.0)
//!     .priority(2)
//!     .build();
//! assert_eq!(haste.kind(), ModifierKind::PercentageMultiply);
//! assert_eq!(haste.application(), ModifierApplication::Temporary);
//! ```

use crate::modifier::{Modifier, ModifierApplication, ModifierId, ModifierKind};
use crate::numeric::AttrValue;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default source label for buffs.
pub const BUFF_SOURCE: &str = "Buff";
/// Default source label for debuffs.
pub const DEBUFF_SOURCE: &str = "Debuff";

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Generate a process-unique modifier id with the given prefix.
///
/// # Examples
///
/// ```rust
/// use statforge::factory::generate_id;
///
/// let a = generate_id("mod");
/// let b = generate_id("mod");
/// assert_ne!(a, b);
/// assert!(a.as_str().starts_with("mod_"));
/// ```
pub fn generate_id(prefix: &str) -> ModifierId {
    let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    ModifierId::from(format!("{prefix}_{n}"))
}

/// Temporary when a duration is given, otherwise permanent.
fn timed_or_permanent(duration: f64) -> ModifierApplication {
    if duration > 0.0 {
        ModifierApplication::Temporary
    } else {
        ModifierApplication::Permanent
    }
}

/// Fluent builder for modifiers.
///
/// Starts from a kind and magnitude; application defaults to Permanent,
/// or Temporary once a positive duration is set, unless an application
/// was chosen explicitly.
#[derive(Debug, Clone)]
pub struct ModifierBuilder {
    kind: ModifierKind,
    magnitude: AttrValue,
    application: Option<ModifierApplication>,
    id: Option<ModifierId>,
    id_prefix: &'static str,
    source: Option<String>,
    duration: f64,
    priority: i32,
}

impl ModifierBuilder {
    /// Start a builder for any kind.
    pub fn new(kind: ModifierKind, magnitude: AttrValue) -> Self {
        Self {
            kind,
            magnitude,
            application: None,
            id: None,
            id_prefix: "mod",
            source: None,
            duration: 0.0,
            priority: 0,
        }
    }

    /// Flat delta.
    pub fn flat(value: AttrValue) -> Self {
        Self::new(ModifierKind::Flat, value).prefix("flat")
    }

    /// Percentage of the base value.
    pub fn percentage(percent: AttrValue) -> Self {
        Self::new(ModifierKind::PercentageAdd, percent).prefix("perc")
    }

    /// Compounding percent multiplier.
    pub fn multiplier(percent: AttrValue) -> Self {
        Self::new(ModifierKind::PercentageMultiply, percent).prefix("mult")
    }

    /// Use a fixed id instead of a generated one.
    pub fn id(mut self, id: impl Into<ModifierId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Use a caller-supplied id if present, otherwise keep generating one.
    pub fn maybe_id(mut self, id: Option<ModifierId>) -> Self {
        if id.is_some() {
            self.id = id;
        }
        self
    }

    /// Prefix used for generated ids.
    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.id_prefix = prefix;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Force a specific application mode.
    pub fn application(mut self, application: ModifierApplication) -> Self {
        self.application = Some(application);
        self
    }

    /// Build the modifier, generating an id if none was set.
    pub fn build(self) -> Modifier {
        let application = self
            .application
            .unwrap_or_else(|| timed_or_permanent(self.duration));
        let id = self.id.unwrap_or_else(|| generate_id(self.id_prefix));
        let source = self
            .source
            .unwrap_or_else(|| Modifier::DEFAULT_SOURCE.to_string());

        Modifier::new(id, self.kind, application, self.magnitude)
            .with_source(source)
            .with_duration(self.duration)
            .with_priority(self.priority)
    }
}

/// Fully specified modifier.
pub fn create(
    id: impl Into<ModifierId>,
    kind: ModifierKind,
    magnitude: AttrValue,
    application: ModifierApplication,
    source: &str,
    duration: f64,
    priority: i32,
) -> Modifier {
    ModifierBuilder::new(kind, magnitude)
        .id(id)
        .application(application)
        .source(source)
        .duration(duration)
        .priority(priority)
        .build()
}

/// Flat modifier; temporary when `duration > 0`.
pub fn flat(value: AttrValue, source: &str, duration: f64) -> Modifier {
    ModifierBuilder::flat(value)
        .source(source)
        .duration(duration)
        .build()
}

/// Percentage-of-base modifier; temporary when `duration > 0`.
pub fn percentage(percent: AttrValue, source: &str, duration: f64) -> Modifier {
    ModifierBuilder::percentage(percent)
        .source(source)
        .duration(duration)
        .build()
}

/// Compounding multiplier; temporary when `duration > 0`.
pub fn multiplier(percent: AttrValue, source: &str, duration: f64) -> Modifier {
    ModifierBuilder::multiplier(percent)
        .source(source)
        .duration(duration)
        .build()
}

/// Ramps from 0 to `total` over `duration`.
pub fn over_time(total: AttrValue, duration: f64, kind: ModifierKind, source: &str) -> Modifier {
    ModifierBuilder::new(kind, total)
        .prefix("ot")
        .application(ModifierApplication::OverTime)
        .source(source)
        .duration(duration)
        .build()
}

/// One-shot modifier that expires when activated.
pub fn instant(value: AttrValue, kind: ModifierKind, source: &str) -> Modifier {
    ModifierBuilder::new(kind, value)
        .prefix("instant")
        .application(ModifierApplication::Instant)
        .source(source)
        .build()
}

/// Full magnitude for `duration` seconds.
pub fn temporary(value: AttrValue, duration: f64, kind: ModifierKind, source: &str) -> Modifier {
    ModifierBuilder::new(kind, value)
        .prefix("temp")
        .application(ModifierApplication::Temporary)
        .source(source)
        .duration(duration)
        .build()
}

/// Full magnitude until removed.
pub fn permanent(value: AttrValue, kind: ModifierKind, source: &str) -> Modifier {
    ModifierBuilder::new(kind, value)
        .prefix("perm")
        .application(ModifierApplication::Permanent)
        .source(source)
        .build()
}

/// Positive modifier with the `"Buff"` source. The sign of `value` is ignored.
pub fn buff(value: AttrValue, duration: f64, kind: ModifierKind) -> Modifier {
    ModifierBuilder::new(kind, value.abs())
        .prefix("buff")
        .source(BUFF_SOURCE)
        .duration(duration)
        .build()
}

/// Negative modifier with the `"Debuff"` source. The sign of `value` is ignored.
pub fn debuff(value: AttrValue, duration: f64, kind: ModifierKind) -> Modifier {
    ModifierBuilder::new(kind, -value.abs())
        .prefix("debuff")
        .source(DEBUFF_SOURCE)
        .duration(duration)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_application_depends_on_duration() {
        assert_eq!(
            flat(5.0, "Ring", 0.0).application(),
            ModifierApplication::Permanent
        );
        assert_eq!(
            flat(5.0, "Potion", 30.0).application(),
            ModifierApplication::Temporary
        );
    }

    #[test]
    fn test_generated_ids_use_prefix() {
        assert!(percentage(10.0, "x", 0.0).id().as_str().starts_with("perc_"));
        assert!(multiplier(10.0, "x", 0.0).id().as_str().starts_with("mult_"));
        assert!(instant(1.0, ModifierKind::Flat, "x")
            .id()
            .as_str()
            .starts_with("instant_"));
        assert!(buff(1.0, 0.0, ModifierKind::Flat)
            .id()
            .as_str()
            .starts_with("buff_"));
    }

    #[test]
    fn test_builder_defaults() {
        let m = ModifierBuilder::flat(3.0).build();
        assert_eq!(m.source(), Modifier::DEFAULT_SOURCE);
        assert_eq!(m.priority(), 0);
        assert_eq!(m.duration(), 0.0);
        assert_eq!(m.application(), ModifierApplication::Permanent);
    }

    #[test]
    fn test_maybe_id() {
        let fixed = ModifierBuilder::flat(1.0)
            .maybe_id(Some(ModifierId::from_str("fixed")))
            .build();
        assert_eq!(fixed.id().as_str(), "fixed");

        let generated = ModifierBuilder::flat(1.0).maybe_id(None).build();
        assert!(generated.id().as_str().starts_with("flat_"));
    }

    #[test]
    fn test_buff_and_debuff_signs() {
        assert_eq!(buff(-7.0, 5.0, ModifierKind::Flat).magnitude(), 7.0);
        assert_eq!(debuff(7.0, 5.0, ModifierKind::Flat).magnitude(), -7.0);
        assert_eq!(debuff(-7.0, 0.0, ModifierKind::Flat).magnitude(), -7.0);
        assert_eq!(
            debuff(7.0, 0.0, ModifierKind::Flat).application(),
            ModifierApplication::Permanent
        );
    }
}
