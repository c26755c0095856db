//! Typed, quantified resources.

use serde::{Deserialize, Serialize};

use crate::specification::{Constraint, Specification};

/// Quantities below this are treated as zero (rounding noise from
/// fractional load slices).
pub(crate) const MIN_MEANINGFUL_QUANTITY: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "type")]
    pub material_type: String,
    pub quantity: f64,
}

impl Material {
    /// Negative quantities are clamped to zero.
    pub fn new(material_type: impl Into<String>, quantity: f64) -> Self {
        Self {
            material_type: material_type.into(),
            quantity: quantity.max(0.0),
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.quantity < MIN_MEANINGFUL_QUANTITY
    }

    pub fn same_type(&self, other: &Material) -> bool {
        self.material_type == other.material_type
    }

    /// Adds `other` into `self` when both have the same type.
    /// Returns `false` (and leaves `self` untouched) otherwise.
    pub fn merge(&mut self, other: &Material) -> bool {
        if !self.same_type(other) {
            return false;
        }
        self.quantity += other.quantity;
        true
    }

    /// A new material of the same type holding `quantity`.
    pub fn portion(&self, quantity: f64) -> Material {
        Material::new(self.material_type.clone(), quantity)
    }

    /// Subtracts what `spec` requires of this material's type, never going
    /// below zero. Returns the quantity actually consumed.
    pub fn consume(&mut self, spec: &Specification) -> f64 {
        let required: f64 = spec
            .constraints()
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::MaterialInput { material } if material.same_type(self) => {
                    Some(material.quantity)
                }
                _ => None,
            })
            .sum();
        let taken = required.min(self.quantity);
        self.quantity -= taken;
        if self.is_depleted() {
            self.quantity = 0.0;
        }
        taken
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.quantity, self.material_type)
    }
}
