//! Capacity-bounded storage of materials keyed by type.

use serde::{Deserialize, Serialize};

use crate::material::MIN_MEANINGFUL_QUANTITY;
use crate::{Material, Specification, StockError, ZoneId};

/// One merged [`Material`] per type, kept in first-stocked order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockingZone {
    pub id: ZoneId,
    /// Total quantity bound across all types. `None` is unbounded.
    capacity: Option<f64>,
    stock: Vec<Material>,
}

impl StockingZone {
    pub fn new(id: ZoneId, capacity: Option<f64>) -> Self {
        Self {
            id,
            capacity: capacity.map(|c| c.max(0.0)),
            stock: Vec::new(),
        }
    }

    pub fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    pub fn materials(&self) -> &[Material] {
        &self.stock
    }

    /// Total quantity stocked across all types.
    pub fn count(&self) -> f64 {
        self.stock.iter().map(|m| m.quantity).sum()
    }

    pub fn quantity_of(&self, material_type: &str) -> f64 {
        self.stock
            .iter()
            .find(|m| m.material_type == material_type)
            .map_or(0.0, |m| m.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }

    pub fn free_capacity(&self) -> Option<f64> {
        self.capacity.map(|c| (c - self.count()).max(0.0))
    }

    pub fn can_accept(&self, quantity: f64) -> bool {
        self.free_capacity()
            .is_none_or(|free| quantity <= free + MIN_MEANINGFUL_QUANTITY)
    }

    /// Stocks `material`, merging into an existing entry of the same type.
    /// Fails without touching prior stock if capacity would be exceeded.
    pub fn add_to_stock(&mut self, material: Material) -> Result<(), StockError> {
        if material.is_depleted() {
            tracing::warn!(zone = %self.id, material = %material.material_type, "ignoring zero-quantity stock");
            return Ok(());
        }
        if !self.can_accept(material.quantity) {
            return Err(StockError::Full {
                zone_id: self.id.clone(),
                requested: material.quantity,
                free: self.free_capacity().unwrap_or(0.0),
            });
        }
        match self.stock.iter_mut().find(|m| m.same_type(&material)) {
            Some(existing) => {
                existing.merge(&material);
            }
            None => self.stock.push(material),
        }
        Ok(())
    }

    /// Takes `quantity` of `material_type` out of the zone. Entries reduced
    /// to zero are dropped.
    pub fn remove(&mut self, material_type: &str, quantity: f64) -> Result<Material, StockError> {
        let available = self.quantity_of(material_type);
        if available + MIN_MEANINGFUL_QUANTITY < quantity {
            return Err(StockError::Insufficient {
                zone_id: self.id.clone(),
                material_type: material_type.to_string(),
                requested: quantity,
                available,
            });
        }
        if let Some(existing) = self
            .stock
            .iter_mut()
            .find(|m| m.material_type == material_type)
        {
            existing.quantity = (existing.quantity - quantity).max(0.0);
        }
        self.purge_depleted();
        Ok(Material::new(material_type, quantity.min(available)))
    }

    /// Takes up to `max` of the first-stocked material.
    pub fn take_first(&mut self, max: f64) -> Option<Material> {
        let first = self.stock.first()?;
        let quantity = first.quantity.min(max);
        let material_type = first.material_type.clone();
        self.remove(&material_type, quantity).ok()
    }

    /// Consumes what `spec` requires from every stocked material and returns
    /// the consumed portions.
    pub fn consume(&mut self, spec: &Specification) -> Vec<Material> {
        let mut consumed = Vec::new();
        for material in &mut self.stock {
            let taken = material.consume(spec);
            if taken > MIN_MEANINGFUL_QUANTITY {
                consumed.push(material.portion(taken));
            }
        }
        self.purge_depleted();
        consumed
    }

    fn purge_depleted(&mut self) {
        self.stock.retain(|m| !m.is_depleted());
    }
}
