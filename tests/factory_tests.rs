//! Tests for the modifier factory.
//!
//! These tests verify:
//! - Shortcut shapes (kind, application, source, sign)
//! - Builder defaults and overrides
//! - Behavior of factory-made modifiers once attached

use approx::assert_abs_diff_eq;
use statforge::factory::{self, ModifierBuilder, BUFF_SOURCE, DEBUFF_SOURCE};
use statforge::*;
use std::collections::HashSet;

// ============================================================================
// Unit Tests: Shortcuts
// ============================================================================

#[test]
fn test_create_sets_every_field() {
    let m = factory::create(
        "shield",
        ModifierKind::PercentageAdd,
        15.0,
        ModifierApplication::Temporary,
        "Shield",
        6.0,
        -1,
    );

    assert_eq!(m.id().as_str(), "shield");
    assert_eq!(m.kind(), ModifierKind::PercentageAdd);
    assert_eq!(m.application(), ModifierApplication::Temporary);
    assert_eq!(m.magnitude(), 15.0);
    assert_eq!(m.source(), "Shield");
    assert_eq!(m.duration(), 6.0);
    assert_eq!(m.priority(), -1);
    assert_eq!(m.state(), ModifierState::Created);
}

#[test]
fn test_kind_shortcuts() {
    assert_eq!(factory::flat(1.0, "a", 0.0).kind(), ModifierKind::Flat);
    assert_eq!(
        factory::percentage(1.0, "a", 0.0).kind(),
        ModifierKind::PercentageAdd
    );
    assert_eq!(
        factory::multiplier(1.0, "a", 0.0).kind(),
        ModifierKind::PercentageMultiply
    );
}

#[test]
fn test_application_shortcuts() {
    let k = ModifierKind::Flat;
    assert_eq!(
        factory::over_time(10.0, 5.0, k, "a").application(),
        ModifierApplication::OverTime
    );
    assert_eq!(
        factory::instant(10.0, k, "a").application(),
        ModifierApplication::Instant
    );
    assert_eq!(
        factory::temporary(10.0, 5.0, k, "a").application(),
        ModifierApplication::Temporary
    );
    assert_eq!(
        factory::permanent(10.0, k, "a").application(),
        ModifierApplication::Permanent
    );
}

#[test]
fn test_buff_and_debuff_signs() {
    let up = factory::buff(-8.0, 3.0, ModifierKind::Flat);
    assert_eq!(up.magnitude(), 8.0);
    assert_eq!(up.source(), BUFF_SOURCE);
    assert_eq!(up.application(), ModifierApplication::Temporary);

    let down = factory::debuff(8.0, 0.0, ModifierKind::PercentageMultiply);
    assert_eq!(down.magnitude(), -8.0);
    assert_eq!(down.source(), DEBUFF_SOURCE);
    assert_eq!(down.application(), ModifierApplication::Permanent);
}

#[test]
fn test_generated_ids_are_unique() {
    let ids: HashSet<ModifierId> = (0..100)
        .map(|_| factory::flat(1.0, "a", 0.0).id().clone())
        .collect();
    assert_eq!(ids.len(), 100);
}

// ============================================================================
// Unit Tests: Builder
// ============================================================================

#[test]
fn test_builder_explicit_application_wins() {
    let m = ModifierBuilder::flat(2.0)
        .duration(4.0)
        .application(ModifierApplication::OverTime)
        .build();
    assert_eq!(m.application(), ModifierApplication::OverTime);
}

#[test]
fn test_builder_negative_duration_clamped() {
    let m = ModifierBuilder::flat(2.0).duration(-4.0).build();
    assert_eq!(m.duration(), 0.0);
    assert_eq!(m.application(), ModifierApplication::Permanent);
}

#[test]
fn test_builder_maybe_id() {
    let named = ModifierBuilder::flat(1.0)
        .maybe_id(Some(ModifierId::from_str("ring")))
        .build();
    assert_eq!(named.id().as_str(), "ring");

    let generated = ModifierBuilder::flat(1.0).maybe_id(None).build();
    assert!(generated.id().as_str().starts_with("flat_"));
}

// ============================================================================
// Integration Tests: Attached Behavior
// ============================================================================

/// Instant modifiers expire on attach and are evicted on the next update.
#[test]
fn test_instant_contributes_nothing() {
    let mut inst = AttributeInstance::new(AttributeType::core("Health"), 50.0);
    let heal = factory::instant(30.0, ModifierKind::Flat, "Potion");
    let id = heal.id().clone();

    inst.add_modifier(heal, 1.0);
    assert_eq!(inst.current_value(), 50.0);
    assert!(!inst.has_modifier(id.as_str()));
    assert_eq!(inst.modifier_count(), 1);

    let held = inst.modifiers().next().unwrap();
    assert!(held.is_expired());
    assert_eq!(held.applied_amount(), 30.0);

    assert_eq!(inst.update(1.0), 1);
    assert_eq!(inst.modifier_count(), 0);
}

/// Ramps linearly and pins the applied amount on expiry.
#[test]
fn test_over_time_ramp() {
    let mut m = factory::over_time(40.0, 8.0, ModifierKind::Flat, "Regen");
    m.activate(2.0);

    assert!(!m.update(4.0));
    assert_abs_diff_eq!(m.current_value(), 10.0, epsilon = VALUE_EPSILON);
    assert_abs_diff_eq!(m.progress(), 0.25, epsilon = VALUE_EPSILON);

    assert!(m.update(10.0));
    assert!(m.is_expired());
    assert_eq!(m.applied_amount(), 40.0);
    assert_eq!(m.current_value(), 0.0);
}

/// Zero-duration ramps apply in full right away.
#[test]
fn test_over_time_zero_duration() {
    let mut m = factory::over_time(40.0, 0.0, ModifierKind::Flat, "Burst");
    m.activate(0.0);
    assert_eq!(m.current_value(), 40.0);
    assert!(!m.update(100.0));
    assert!(m.is_live());
}

/// Priorities reorder multipliers without changing the compounded result.
#[test]
fn test_priority_orders_multipliers() {
    let mut inst = AttributeInstance::new(AttributeType::core("Damage"), 10.0);
    inst.add_modifier(
        ModifierBuilder::multiplier(100.0).id("late").priority(5).build(),
        0.0,
    );
    inst.add_modifier(
        ModifierBuilder::multiplier(50.0).id("early").priority(-5).build(),
        0.0,
    );

    let breakdown = inst.breakdown();
    let order: Vec<&str> = breakdown
        .multipliers
        .iter()
        .map(|step| step.modifier.as_str())
        .collect();
    assert_eq!(order, vec!["early", "late"]);
    assert_abs_diff_eq!(inst.current_value(), 30.0, epsilon = VALUE_EPSILON);
}

/// A removed modifier is expired and cannot be reused.
#[test]
fn test_removed_modifier_is_expired() {
    let mut inst = AttributeInstance::new(AttributeType::core("Armor"), 5.0);
    let plate = factory::permanent(10.0, ModifierKind::Flat, "Plate");
    let id = plate.id().clone();

    inst.add_modifier(plate, 0.0);
    let taken = inst.take_modifier(id.as_str()).unwrap();
    assert!(taken.is_live());
    assert_eq!(inst.current_value(), 5.0);

    inst.add_modifier(taken, 1.0);
    assert_eq!(inst.current_value(), 15.0);
    assert!(inst.remove_modifier(id.as_str()));
    assert!(!inst.remove_modifier(id.as_str()));
}
