use parking_lot::Mutex;
use plant_core::Registry;
use std::sync::Arc;

pub type SharedRegistry = Arc<Mutex<Registry>>;

#[derive(Clone, Default)]
pub struct AppState {
    pub registry: SharedRegistry,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
        }
    }
}
