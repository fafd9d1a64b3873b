//! Driver registry for actuator backends.
//!
//! Uses constructor injection: the registry is built at startup, populated
//! via `register()`, and queried by name. No global state.

use std::collections::BTreeMap;

use elevator_common::hal::{ActuatorDevice, DriverContext, DriverFactory, HalError};
use tracing::info;

/// Registry of available actuator backends.
pub struct DriverRegistry {
    factories: BTreeMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry pre-populated with every built-in backend.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_all_drivers(&mut registry);
        registry
    }

    /// Register a backend factory.
    ///
    /// # Errors
    /// `HalError::ConfigError` if a backend with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) -> Result<(), HalError> {
        if self.factories.contains_key(name) {
            return Err(HalError::ConfigError(format!(
                "driver '{name}' is already registered"
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Create a backend instance by name.
    ///
    /// # Errors
    /// `HalError::DriverNotFound` if no backend with that name is registered,
    /// or whatever the factory itself reports.
    pub fn create_driver(
        &self,
        name: &str,
        ctx: &DriverContext,
    ) -> Result<Box<dyn ActuatorDevice>, HalError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| HalError::DriverNotFound(name.to_string()))?;
        let device = factory(ctx)?;
        info!(driver = device.name(), "actuator backend created");
        Ok(device)
    }

    /// Registered backend names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
