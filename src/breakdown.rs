//! Calculation breakdowns.
//!
//! A [`ValueBreakdown`] records every step that produced an attribute's
//! current value, for debug overlays and tooltips. It is produced by
//! [`AttributeInstance::breakdown`](crate::AttributeInstance::breakdown)
//! from the same code path as the value itself.

use crate::attribute_id::AttributeId;
use crate::modifier::ModifierId;
use crate::numeric::AttrValue;
use serde::Serialize;
use std::fmt;

/// Sum of all flat modifiers and the running value after adding it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatStep {
    pub total: AttrValue,
    pub after: AttrValue,
}

/// Summed percentage of base and the running value after adding it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentStep {
    /// Sum of percentages, e.g. `20.0` for +20%.
    pub total_percent: AttrValue,
    /// `base * total_percent / 100`.
    pub amount: AttrValue,
    pub after: AttrValue,
}

/// One compounding multiplier application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplierStep {
    pub modifier: ModifierId,
    pub factor: AttrValue,
    pub before: AttrValue,
    pub after: AttrValue,
}

/// Step-by-step explanation of an attribute's current value.
///
/// # Examples
///
/// ```rust
/// use statforge::{factory, AttributeInstance, AttributeType};
///
/// let mut strength = AttributeInstance::new(AttributeType::core("Strength"), 100.0);
/// strength.add_modifier(factory::flat(10.0, "Ring", 0.0), 0.0);
/// strength.add_modifier(factory::multiplier(50.0, "Rage", 0.0), 0.0);
///
/// let breakdown = strength.breakdown();
/// assert_eq!(breakdown.value, 165.0);
/// assert_eq!(breakdown.multipliers.len(), 1);
/// println!("{breakdown}");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueBreakdown {
    pub attribute: AttributeId,
    pub base: AttrValue,
    /// Present only when at least one flat modifier is live.
    pub flat: Option<FlatStep>,
    /// Present only when at least one percentage modifier is live.
    pub percent: Option<PercentStep>,
    /// Multipliers in the order they were applied.
    pub multipliers: Vec<MultiplierStep>,
    /// Final value; always equal to the instance's current value.
    pub value: AttrValue,
}

impl ValueBreakdown {
    /// Start a breakdown at the base value.
    pub fn new(attribute: AttributeId, base: AttrValue) -> Self {
        Self {
            attribute,
            base,
            flat: None,
            percent: None,
            multipliers: Vec::new(),
            value: base,
        }
    }

    /// Whether no modifier touched the value.
    pub fn is_unmodified(&self) -> bool {
        self.flat.is_none() && self.percent.is_none() && self.multipliers.is_empty()
    }
}

impl fmt::Display for ValueBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Base: {:.1}", self.base)?;
        if let Some(flat) = &self.flat {
            writeln!(f, "+ Flat: {:+.1} = {:.1}", flat.total, flat.after)?;
        }
        if let Some(percent) = &self.percent {
            writeln!(
                f,
                "+ {:.1}% of base ({:.1}): {:+.1} = {:.1}",
                percent.total_percent, self.base, percent.amount, percent.after
            )?;
        }
        for step in &self.multipliers {
            writeln!(
                f,
                "x {:.2}: {:.1} -> {:.1}",
                step.factor, step.before, step.after
            )?;
        }
        Ok(())
    }
}
