//! Buffs example: timed modifiers on an entity
//!
//! This example demonstrates:
//! - Loading attribute identities and presets from JSON
//! - Temporary buffs, debuffs and ramping heals
//! - Ticking an entity from a manual clock

use statforge::clock::ManualClock;
use statforge::*;
use tracing_subscriber::EnvFilter;

const REGISTRY: &str = r#"{
    "attributes": [
        {"name": "Health"},
        {"name": "Strength", "category": "Offense"},
        {"name": "Speed", "category": "Movement"}
    ]
}"#;

fn main() -> Result<(), AttributeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = AttributeRegistry::from_json(REGISTRY)?;
    let warrior = AttributeSet::from_names(
        &registry,
        [("Health", 120.0), ("Strength", 15.0), ("Speed", 5.0)],
    )?;

    let clock = ManualClock::new();
    let mut hero = EntityAttributes::from_set(&warrior, clock.clone());
    hero.on_attribute_changed(|event| {
        println!(
            "  [{}] {} = {:.2}",
            event.attribute.category, event.attribute.name, event.value
        );
    });

    println!("Applying effects at t=0:");
    hero.apply("Strength", factory::buff(5.0, 4.0, ModifierKind::Flat));
    hero.apply(
        "Speed",
        factory::debuff(40.0, 2.0, ModifierKind::PercentageMultiply),
    );
    hero.apply(
        "Health",
        factory::over_time(60.0, 6.0, ModifierKind::Flat, "Regen"),
    );

    println!("\nTicking:");
    for _ in 0..7 {
        clock.advance(1.0);
        println!("t={:.0}", clock.now());
        let expired = hero.tick();
        if expired > 0 {
            println!("  {} modifier(s) expired", expired);
        }
    }

    println!("\n=== Final Values ===");
    for name in hero.attribute_names() {
        if let Some(value) = hero.value(name.as_str()) {
            println!("{}: {:.2}", name, value);
        }
    }

    Ok(())
}
