//! Registry of named grid variables.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{GridError, Result};
use crate::variables::{
    Divergence, GridVariable, Temperature, UWind, VWind, VariableDescriptor, VerticalVelocity,
    WindDirection, WindSpeed,
};

/// Variables available to a resolver, keyed by unique name.
///
/// Owned by the application context and passed to whatever needs it; there
/// is no process-wide registry.
#[derive(Clone, Default)]
pub struct VariableRegistry {
    variables: BTreeMap<String, Arc<dyn GridVariable>>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard ERA5 pressure-level variables: stored temperature (K),
    /// wind components and vertical velocity, plus wind speed, wind
    /// direction (degrees) and divergence.
    pub fn era5() -> Self {
        let mut registry = Self::new();
        let defaults: Vec<Arc<dyn GridVariable>> = vec![
            Arc::new(Temperature::kelvin()),
            Arc::new(UWind::new()),
            Arc::new(VWind::new()),
            Arc::new(VerticalVelocity::new()),
            Arc::new(WindSpeed::new()),
            Arc::new(WindDirection::degrees()),
            Arc::new(Divergence::new()),
        ];
        for variable in defaults {
            registry
                .register(variable)
                .expect("built-in variable names are unique");
        }
        registry
    }

    /// Register a variable under its descriptor name.
    pub fn register(&mut self, variable: Arc<dyn GridVariable>) -> Result<()> {
        let name = variable.name().to_string();
        if self.variables.contains_key(&name) {
            return Err(GridError::DuplicateVariable(name));
        }
        debug!(variable = %name, requires = ?variable.requires(), "Registered variable");
        self.variables.insert(name, variable);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn GridVariable>> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| GridError::UnknownVariable(name.to_string()))
    }

    pub fn descriptor(&self, name: &str) -> Result<VariableDescriptor> {
        Ok(self.get(name)?.descriptor().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl std::fmt::Debug for VariableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.variables.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_era5_defaults() {
        let registry = VariableRegistry::era5();
        assert_eq!(registry.len(), 7);
        assert!(registry.contains("wind_speed"));
        assert_eq!(registry.get("temperature").unwrap().unit(), "K");
    }

    #[test]
    fn test_era5_names() {
        let registry = VariableRegistry::era5();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "divergence",
                "temperature",
                "u_component_of_wind",
                "v_component_of_wind",
                "vertical_velocity",
                "wind_direction",
                "wind_speed",
            ]
        );
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = VariableRegistry::era5();
        let err = registry
            .register(Arc::new(Temperature::celsius()))
            .unwrap_err();
        assert!(matches!(err, GridError::DuplicateVariable(name) if name == "temperature"));
        // The original entry is untouched.
        assert_eq!(registry.get("temperature").unwrap().unit(), "K");
    }

    #[test]
    fn test_unknown_variable_names_key() {
        let registry = VariableRegistry::new();
        let err = registry.get("geopotential").err().unwrap();
        assert!(err.to_string().contains("geopotential"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = VariableRegistry::era5();
        let names: Vec<&str> = registry.names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
