//! Immutable variable metadata and its builder.

use serde::{Deserialize, Serialize};

/// Colormap used to display a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Colormap {
    /// A named palette, e.g. `"RdBu"`.
    Named(String),
    /// A linear gradient through hex color stops.
    Gradient(Vec<String>),
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::Named("ocean".to_string())
    }
}

/// On-disk storage type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageDtype {
    /// Packed f16 bit patterns.
    #[default]
    Float16,
    Float32,
}

/// Name, display metadata and inputs of a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    pub name: String,
    pub title: String,
    pub unit: String,
    pub colormap: Colormap,
    pub dtype: StorageDtype,
    /// Stored variables read to produce this one. A stored variable
    /// requires itself.
    pub requires: Vec<String>,
    /// Whether values are centered on zero (diverging palette).
    pub diverging: bool,
}

impl VariableDescriptor {
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(name)
    }

    /// Whether this variable is computed from other variables.
    pub fn is_derived(&self) -> bool {
        self.requires.len() != 1 || self.requires[0] != self.name
    }
}

/// Builder for [`VariableDescriptor`].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    title: Option<String>,
    unit: String,
    colormap: Colormap,
    dtype: StorageDtype,
    requires: Option<Vec<String>>,
    diverging: bool,
}

impl DescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            unit: String::new(),
            colormap: Colormap::default(),
            dtype: StorageDtype::default(),
            requires: None,
            diverging: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn colormap(mut self, name: impl Into<String>) -> Self {
        self.colormap = Colormap::Named(name.into());
        self
    }

    pub fn gradient(mut self, stops: &[&str]) -> Self {
        self.colormap = Colormap::Gradient(stops.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn dtype(mut self, dtype: StorageDtype) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn requires(mut self, names: &[&str]) -> Self {
        self.requires = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn diverging(mut self, diverging: bool) -> Self {
        self.diverging = diverging;
        self
    }

    pub fn build(self) -> VariableDescriptor {
        let title = self.title.unwrap_or_else(|| title_case(&self.name));
        let requires = self.requires.unwrap_or_else(|| vec![self.name.clone()]);
        VariableDescriptor {
            name: self.name,
            title,
            unit: self.unit,
            colormap: self.colormap,
            dtype: self.dtype,
            requires,
            diverging: self.diverging,
        }
    }
}

/// `"wind_speed"` → `"Wind Speed"`.
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
