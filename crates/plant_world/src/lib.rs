//! Factory description loading shared between plant_cli and plant_daemon.

use anyhow::{ensure, Context, Result};
use plant_core::{
    Constraint, Factory, FactoryDef, Floor, Material, Specification, UnitSettings,
};
use std::collections::HashSet;
use std::path::Path;

/// Rejects descriptions the core would accept but that make no sense on a
/// shop floor. Every error names the offending entry.
pub fn validate_config(def: &FactoryDef) -> Result<()> {
    ensure!(!def.name.trim().is_empty(), "factory name is empty");
    if let Some(minutes) = def.minutes_per_day {
        ensure!(minutes > 0, "factory '{}': minutes_per_day must be positive", def.name);
    }

    let mut names: HashSet<&str> = HashSet::new();
    for unit in &def.production_units {
        ensure!(!unit.name.trim().is_empty(), "production unit with empty name");
        ensure!(
            names.insert(unit.name.as_str()),
            "duplicate production unit '{}'",
            unit.name
        );
        ensure!(
            unit.rate > 0.0,
            "production unit '{}': rate must be positive, got {}",
            unit.name,
            unit.rate
        );
        ensure!(
            unit.load_time > 0,
            "production unit '{}': load_time must be positive",
            unit.name
        );
        for (label, capacity) in [("input", unit.input_capacity), ("output", unit.output_capacity)] {
            if let Some(capacity) = capacity {
                ensure!(
                    capacity >= 0.0,
                    "production unit '{}': negative {label} capacity {capacity}",
                    unit.name
                );
            }
        }
        for input in &unit.inputs {
            ensure!(
                input.quantity >= 0.0,
                "production unit '{}': input '{}' has negative quantity",
                unit.name,
                input.material_type
            );
        }
        for output in &unit.outputs {
            ensure!(
                output.quantity >= 0.0,
                "production unit '{}': output '{}' has negative quantity",
                unit.name,
                output.material_type
            );
            ensure!(
                output.price >= 0.0,
                "production unit '{}': output '{}' has negative price",
                unit.name,
                output.material_type
            );
        }
    }

    for (index, worker) in def.workers.iter().enumerate() {
        ensure!(
            worker.working_hour > 0,
            "worker entry {index}: working_hour must be positive"
        );
    }
    Ok(())
}

pub fn parse_config(json: &str) -> Result<FactoryDef> {
    let def: FactoryDef = serde_json::from_str(json).context("parsing factory description")?;
    validate_config(&def)?;
    Ok(def)
}

pub fn load_config(path: &Path) -> Result<FactoryDef> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_config(&json).with_context(|| format!("loading {}", path.display()))
}

/// One unit per entry with fresh zones, `count` workers per worker entry.
/// Required skills become constraints on the unit's start operation.
pub fn build_factory(def: &FactoryDef) -> Factory {
    let mut floor = Floor::new();
    for unit in &def.production_units {
        let mut spec = Specification::new();
        for input in &unit.inputs {
            spec.add(Constraint::material_input(Material::new(
                input.material_type.clone(),
                input.quantity,
            )));
        }
        for output in &unit.outputs {
            spec.add_priced_output(
                Material::new(output.material_type.clone(), output.quantity),
                output.price,
            );
        }
        let settings = UnitSettings {
            rate: unit.rate,
            load_time: unit.load_time,
            input_capacity: unit.input_capacity,
            output_capacity: unit.output_capacity,
            start_constraints: unit
                .required_skills
                .iter()
                .map(|skill| Constraint::skill(skill.clone()))
                .collect(),
        };
        floor.add_production_unit(unit.name.clone(), spec, settings);
    }
    for worker in &def.workers {
        for _ in 0..worker.count {
            floor.hire_worker(worker.working_hour, &worker.skills);
        }
    }
    tracing::info!(
        factory = %def.name,
        units = def.production_units.len(),
        workers = floor.workers.len(),
        "factory built"
    );

    let factory = Factory::new(def.name.clone(), floor);
    match def.minutes_per_day {
        Some(minutes) => factory.with_shift_length(minutes),
        None => factory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXTIL: &str = r#"{
        "name": "textil",
        "production_units": [
            {"name": "typeA", "rate": 5},
            {"name": "typeB"}
        ]
    }"#;

    #[test]
    fn defaults_fill_missing_fields() {
        let def = parse_config(TEXTIL).unwrap();

        assert_eq!(def.name, "textil");
        assert_eq!(def.production_units.len(), 2);
        assert!((def.production_units[0].rate - 5.0).abs() < 1e-9);
        assert!((def.production_units[1].rate - 1.0).abs() < 1e-9);
        assert_eq!(def.production_units[1].load_time, 1);
        assert!(def.production_units[1].output_capacity.is_none());
        assert!(def.workers.is_empty());
        assert!(def.minutes_per_day.is_none());
    }

    #[test]
    fn build_creates_units_and_workers() {
        let mut def = parse_config(TEXTIL).unwrap();
        def.workers = vec![plant_core::WorkerDef {
            working_hour: 480,
            skills: vec!["weaver".to_string()],
            count: 3,
        }];

        let factory = build_factory(&def);

        assert_eq!(factory.name, "textil");
        assert_eq!(factory.floor.units.len(), 2);
        assert_eq!(factory.floor.workers.len(), 3);
        assert!(factory.floor.workers.values().all(|w| w.has_skill("weaver")));
        let type_a = factory.floor.unit_by_name("typeA").unwrap();
        assert!((type_a.rate - 5.0).abs() < 1e-9);
        assert_eq!(factory.in_flight().len(), 2);
    }

    #[test]
    fn required_skills_guard_the_start() {
        let def = parse_config(
            r#"{"name": "smithy", "production_units": [
                {"name": "forge", "required_skills": ["blacksmith"]}
            ]}"#,
        )
        .unwrap();

        let factory = build_factory(&def);

        let forge = factory.floor.unit_by_name("forge").unwrap();
        assert_eq!(
            forge.protocol.start_constraints(),
            &[Constraint::skill("blacksmith")]
        );
    }

    #[test]
    fn rejects_duplicate_unit_names() {
        let err = parse_config(
            r#"{"name": "f", "production_units": [{"name": "a"}, {"name": "a"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate production unit 'a'"));
    }

    #[test]
    fn rejects_non_positive_rate() {
        let err = parse_config(r#"{"name": "f", "production_units": [{"name": "a", "rate": 0}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("rate must be positive"));
    }

    #[test]
    fn rejects_negative_price() {
        let err = parse_config(
            r#"{"name": "f", "production_units": [{"name": "a",
                "outputs": [{"type": "plank", "quantity": 1, "price": -1}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("negative price"));
    }

    #[test]
    fn rejects_zero_working_hour() {
        let err = parse_config(
            r#"{"name": "f", "production_units": [], "workers": [{"working_hour": 0}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("working_hour must be positive"));
    }

    #[test]
    fn rejects_empty_factory_name() {
        let err = parse_config(r#"{"name": " ", "production_units": []}"#).unwrap_err();
        assert!(err.to_string().contains("factory name is empty"));
    }
}
