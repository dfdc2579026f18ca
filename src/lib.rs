//! # statforge - Attribute & Modifier Engine for Games
//!
//! Computes the effective value of numeric entity attributes (health,
//! strength, speed, ...) from a base value and a stack of modifiers:
//! - **Deterministic** aggregation with a fixed operator order
//! - **Timed** modifiers (instant, temporary, permanent, ramp-in over time)
//! - **Explicit** change notifications with owned listener handles
//! - **Tick-driven**: time only advances when the caller says so
//!
//! ## Core Concepts
//!
//! ### Aggregation
//!
//! ```text
//! base → + Σ flat → + base × Σ percent / 100 → × (1 + m / 100) for each multiplier
//! ```
//!
//! 1. **Flat** modifiers add an absolute amount
//! 2. **PercentageAdd** modifiers are summed and applied once, against the base
//! 3. **PercentageMultiply** modifiers compound one after another
//!
//! Live modifiers are ordered by priority, then by insertion.
//!
//! ### Lifecycle
//!
//! Modifiers are created, activated when attached to an attribute, and
//! expire either when a tick finds their duration elapsed or when they are
//! removed. Expired modifiers are evicted on the next tick.
//!
//! ## Example
//!
//! ```rust
//! use statforge::*;
//!
//! let mut health = AttributeInstance::new(AttributeType::core("Health"), 100.0);
//!
//! let flat = factory::flat(10.0, "Armor", 0.0);
//! let flat_id = flat.id().clone();
//! health.add_modifier(flat, 0.0);
//! health.add_modifier(factory::percentage(20.0, "Aura", 0.0), 0.0);
//! health.add_modifier(factory::multiplier(50.0, "Rage", 0.0), 0.0);
//! assert_eq!(health.current_value(), 195.0);
//!
//! health.remove_modifier(flat_id.as_str());
//! assert_eq!(health.current_value(), 180.0);
//! ```
//!
//! ## Modules
//!
//! - [`modifier`] - Modifiers and their state machine
//! - [`factory`] - Shortcuts and a builder for common modifier shapes
//! - [`instance`] - Per-attribute aggregation
//! - [`entity`] - Container of named attributes for one entity
//! - [`attribute_id`] - Attribute identities
//! - [`registry`] - Catalogue of known attributes
//! - [`attribute_set`] - Starting base-value presets
//! - [`breakdown`] - Step-by-step value explanations
//! - [`listeners`] - Callback registry used for notifications
//! - [`clock`] - Time sources
//! - [`numeric`] - Value type and epsilon helpers
//! - [`error`] - Error types

pub mod attribute_id;
pub mod attribute_set;
pub mod breakdown;
pub mod clock;
pub mod entity;
pub mod error;
pub mod factory;
pub mod instance;
pub mod listeners;
pub mod modifier;
pub mod numeric;
pub mod registry;

// Re-export main types for convenience
pub use attribute_id::{AttributeId, AttributeIdentity, AttributeType};
pub use attribute_set::{AttributeEntry, AttributeSet};
pub use breakdown::ValueBreakdown;
pub use clock::{Clock, ManualClock};
pub use entity::{AttributeChanged, EntityAttributes};
pub use error::AttributeError;
pub use factory::ModifierBuilder;
pub use instance::AttributeInstance;
pub use listeners::ListenerId;
pub use modifier::{Modifier, ModifierApplication, ModifierId, ModifierKind, ModifierState};
pub use numeric::{AttrValue, VALUE_EPSILON};
pub use registry::{AttributeLookup, AttributeRegistry};
