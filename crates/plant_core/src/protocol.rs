use serde::{Deserialize, Serialize};

use crate::{Constraint, Material, Operation, Specification, UnitId};

/// Generator of a unit's perpetual operation cycle.
///
/// Index 0 is the one-off `Start`. Every later index maps onto the repeating
/// suffix `[Load(input) for each distinct input..., Produce]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    next_index: usize,
    /// Ticks each generated load takes.
    load_time: u32,
    /// Attached to the `Start` operation, e.g. required skills.
    start_constraints: Vec<Constraint>,
}

impl Protocol {
    pub fn new(load_time: u32) -> Self {
        Self {
            next_index: 0,
            load_time: load_time.max(1),
            start_constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_start_constraint(mut self, constraint: Constraint) -> Self {
        self.start_constraints.push(constraint);
        self
    }

    pub fn start_constraints(&self) -> &[Constraint] {
        &self.start_constraints
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn reset(&mut self) {
        self.next_index = 0;
    }

    pub fn next_operation(&mut self, unit: &UnitId, spec: &Specification) -> Operation {
        let operation = self.operation_at(self.next_index, unit, spec);
        self.next_index += 1;
        operation
    }

    pub fn operation_at(&self, index: usize, unit: &UnitId, spec: &Specification) -> Operation {
        if index == 0 {
            return self
                .start_constraints
                .iter()
                .cloned()
                .fold(Operation::start(unit.clone()), Operation::with_constraint);
        }
        let loads = distinct_inputs(spec);
        let position = (index - 1) % (loads.len() + 1);
        match loads.into_iter().nth(position) {
            Some(material) => {
                Operation::load(unit.clone(), material).with_time_to_perform(self.load_time)
            }
            None => Operation::produce(unit.clone()),
        }
    }
}

/// One material per required input type, quantities of repeated types summed.
fn distinct_inputs(spec: &Specification) -> Vec<Material> {
    let mut loads: Vec<Material> = Vec::new();
    for required in spec.required_inputs() {
        match loads.iter_mut().find(|m| m.same_type(required)) {
            Some(existing) => {
                existing.merge(required);
            }
            None => loads.push(required.clone()),
        }
    }
    loads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OperationKind;

    fn unit() -> UnitId {
        UnitId("unit_0001".to_string())
    }

    fn two_input_spec() -> Specification {
        let mut spec = Specification::new();
        spec.add(Constraint::material_input(Material::new("flour", 1.0)));
        spec.add(Constraint::material_input(Material::new("water", 2.0)));
        spec.add(Constraint::skill("baker"));
        spec
    }

    fn label(op: &Operation) -> String {
        match &op.kind {
            OperationKind::Load(load) => format!("load {}", load.material.material_type),
            other => other.label().to_string(),
        }
    }

    #[test]
    fn start_once_then_cycle_loads_and_produce() {
        let mut protocol = Protocol::new(2);
        let spec = two_input_spec();

        let labels: Vec<String> = (0..8)
            .map(|_| label(&protocol.next_operation(&unit(), &spec)))
            .collect();

        assert_eq!(
            labels,
            [
                "start",
                "load flour",
                "load water",
                "produce",
                "load flour",
                "load water",
                "produce",
                "load flour"
            ]
        );
    }

    #[test]
    fn loads_use_required_quantity_and_load_time() {
        let protocol = Protocol::new(3);
        let op = protocol.operation_at(2, &unit(), &two_input_spec());
        assert_eq!(op.time_to_perform, 3);
        match op.kind {
            OperationKind::Load(load) => assert_eq!(load.material, Material::new("water", 2.0)),
            other => panic!("expected load, got {other:?}"),
        }
    }

    #[test]
    fn repeated_input_types_share_one_load() {
        let mut spec = Specification::new();
        spec.add(Constraint::material_input(Material::new("wood", 1.0)));
        spec.add(Constraint::material_input(Material::new("wood", 2.0)));
        let protocol = Protocol::new(1);

        match protocol.operation_at(1, &unit(), &spec).kind {
            OperationKind::Load(load) => assert!((load.material.quantity - 3.0).abs() < 1e-9),
            other => panic!("expected load, got {other:?}"),
        }
        assert!(matches!(
            protocol.operation_at(2, &unit(), &spec).kind,
            OperationKind::Produce(_)
        ));
    }

    #[test]
    fn start_carries_protocol_constraints() {
        let protocol = Protocol::new(1).with_start_constraint(Constraint::skill("sawyer"));
        let start = protocol.operation_at(0, &unit(), &Specification::new());
        assert_eq!(start.constraints(), &[Constraint::skill("sawyer")]);
    }

    #[test]
    fn spec_without_inputs_only_produces() {
        let protocol = Protocol::new(1);
        for index in 1..4 {
            assert!(matches!(
                protocol.operation_at(index, &unit(), &Specification::new()).kind,
                OperationKind::Produce(_)
            ));
        }
    }
}
