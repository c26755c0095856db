//! Input constraints and output materials of a production unit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::material::MIN_MEANINGFUL_QUANTITY;
use crate::{Material, Worker};

/// Predicate over an input set or over the acting worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Constraint {
    /// Holds iff some input of the same type has at least `material.quantity`.
    MaterialInput { material: Material },
    /// Holds iff the acting worker exists and has `skill`.
    Skill { skill: String },
}

impl Constraint {
    pub fn material_input(material: Material) -> Self {
        Constraint::MaterialInput { material }
    }

    pub fn skill(skill: impl Into<String>) -> Self {
        Constraint::Skill {
            skill: skill.into(),
        }
    }

    pub fn validate(&self, inputs: &[Material], worker: Option<&Worker>) -> bool {
        match self {
            Constraint::MaterialInput { material } => inputs.iter().any(|input| {
                input.same_type(material)
                    && input.quantity + MIN_MEANINGFUL_QUANTITY >= material.quantity
            }),
            Constraint::Skill { skill } => worker.is_some_and(|w| w.has_skill(skill)),
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::MaterialInput { material } => {
                write!(f, "Validate input is type of {}", material.material_type)
            }
            Constraint::Skill { skill } => write!(f, "Validate worker has skill {skill}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    constraints: Vec<Constraint>,
    outputs: Vec<Material>,
    /// Unit price per output material type. Missing types are worth nothing.
    prices: HashMap<String, f64>,
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn add_output_material(&mut self, material: Material) {
        self.outputs.push(material);
    }

    pub fn add_priced_output(&mut self, material: Material, unit_price: f64) {
        self.prices
            .insert(material.material_type.clone(), unit_price.max(0.0));
        self.outputs.push(material);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn output_materials(&self) -> &[Material] {
        &self.outputs
    }

    pub fn price_of(&self, material_type: &str) -> f64 {
        self.prices.get(material_type).copied().unwrap_or(0.0)
    }

    pub fn requires_skill(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Skill { .. }))
    }

    /// Materials named by the input constraints, in declaration order.
    pub fn required_inputs(&self) -> Vec<&Material> {
        self.constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::MaterialInput { material } => Some(material),
                Constraint::Skill { .. } => None,
            })
            .collect()
    }

    /// True iff every constraint holds. An empty input set never validates.
    /// Skill constraints fail, there being no acting worker.
    pub fn validate_all(&self, inputs: &[Material]) -> bool {
        self.validate_all_with(inputs, None)
    }

    /// True iff at least one constraint holds. An empty input set never validates.
    pub fn validate_any(&self, inputs: &[Material]) -> bool {
        self.validate_any_with(inputs, None)
    }

    /// [`validate_all`](Self::validate_all) on behalf of `worker`.
    pub fn validate_all_with(&self, inputs: &[Material], worker: Option<&Worker>) -> bool {
        !inputs.is_empty() && self.first_unmet(inputs, worker).is_none()
    }

    pub fn validate_any_with(&self, inputs: &[Material], worker: Option<&Worker>) -> bool {
        !inputs.is_empty() && self.constraints.iter().any(|c| c.validate(inputs, worker))
    }

    /// First constraint that does not hold, in declaration order.
    pub fn first_unmet(&self, inputs: &[Material], worker: Option<&Worker>) -> Option<&Constraint> {
        self.constraints.iter().find(|c| !c.validate(inputs, worker))
    }
}

impl std::fmt::Display for Specification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self.constraints.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}
