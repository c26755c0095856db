use std::collections::BTreeMap;

use crate::{EventEnvelope, Factory, FactoryRef};

/// Factories of one simulation run, addressed by reference.
/// References start at 1 and are never reused.
pub struct Registry {
    next_reference: u64,
    factories: BTreeMap<FactoryRef, Factory>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            next_reference: 1,
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, factory: Factory) -> FactoryRef {
        let reference = FactoryRef(self.next_reference);
        self.next_reference += 1;
        tracing::info!(reference = %reference, factory = %factory.name, "factory registered");
        self.factories.insert(reference, factory);
        reference
    }

    pub fn get(&self, reference: FactoryRef) -> Option<&Factory> {
        self.factories.get(&reference)
    }

    pub fn get_mut(&mut self, reference: FactoryRef) -> Option<&mut Factory> {
        self.factories.get_mut(&reference)
    }

    /// Advances the referenced factory by `during` ticks.
    pub fn run(&mut self, reference: FactoryRef, during: u64) -> Option<Vec<EventEnvelope>> {
        self.get_mut(reference).map(|factory| factory.run(during))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
