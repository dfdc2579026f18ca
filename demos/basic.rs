//! Basic example: aggregating modifiers on a single attribute
//!
//! This example demonstrates:
//! - Flat, percentage and multiplier modifiers
//! - The fixed aggregation order
//! - Value-changed notifications and breakdowns

use statforge::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut health = AttributeInstance::new(AttributeType::core("Health"), 100.0);
    health.on_value_changed(|value| println!("  -> Health is now {:.1}", value));

    println!("Adding modifiers to Health (base 100):");

    let armor = factory::flat(10.0, "Armor", 0.0);
    let armor_id = armor.id().clone();
    println!("  - Armor: +10 flat");
    health.add_modifier(armor, 0.0);

    println!("  - Aura: +20% of base");
    health.add_modifier(factory::percentage(20.0, "Aura", 0.0), 0.0);

    println!("  - Rage: x1.5");
    health.add_modifier(factory::multiplier(50.0, "Rage", 0.0), 0.0);

    println!("\n=== Breakdown ===");
    print!("{}", health.breakdown());
    println!("Final Value: {:.2}", health.current_value());
    println!("\nCalculation: (100 + 10 + 20) * 1.5 = {:.2}", health.current_value());

    println!("\nRemoving the armor bonus:");
    health.remove_modifier(armor_id.as_str());

    println!("\n=== Breakdown ===");
    print!("{}", health.breakdown());
}
