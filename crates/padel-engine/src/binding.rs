//! Identidad de un objeto del motor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Forma de la API expuesta por una clase del motor. Se fija en el catálogo,
/// nunca se deduce por llamada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityShape {
    /// `setMolecule` / `run` / `getDescriptorNames` / `getDescriptorValues`.
    Direct,
    /// `calculate(estructura) -> {names, values}`.
    Composite,
}

/// Clase del motor más los argumentos con los que se instancia.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineBinding {
    pub class: String,
    pub args: Vec<String>,
    pub shape: CapabilityShape,
}

impl EngineBinding {
    pub fn new(class: impl Into<String>, shape: CapabilityShape) -> Self {
        Self { class: class.into(),
               args: Vec::new(),
               shape }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Clave estable para caches por binding.
    pub fn key(&self) -> String {
        if self.args.is_empty() {
            self.class.clone()
        } else {
            format!("{}({})", self.class, self.args.join(","))
        }
    }
}

impl fmt::Display for EngineBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
