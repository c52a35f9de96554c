//! Contratos del runtime en proceso.
//!
//! Las estructuras viajan como bloques MOL V2000 (texto); cada implementación
//! las convierte a su representación nativa. Los valores se devuelven tal
//! cual los imprime el motor, el parseo numérico es responsabilidad del
//! pipeline.

use crate::{CapabilityShape, EngineBinding, EngineError};

pub trait DirectCalculator: Send {
    fn set_molecule(&mut self, molblock: &str) -> Result<(), EngineError>;
    fn run(&mut self) -> Result<(), EngineError>;
    fn descriptor_names(&self) -> Result<Vec<String>, EngineError>;
    fn descriptor_values(&self) -> Result<Vec<String>, EngineError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompositeValue {
    pub names: Vec<String>,
    pub values: Vec<String>,
}

pub trait CompositeCalculator: Send {
    fn calculate(&mut self, molblock: &str) -> Result<CompositeValue, EngineError>;
}

/// Objeto instanciado por el runtime para un `EngineBinding`.
pub enum EngineObject {
    Direct(Box<dyn DirectCalculator>),
    Composite(Box<dyn CompositeCalculator>),
}

impl EngineObject {
    pub fn shape(&self) -> CapabilityShape {
        match self {
            EngineObject::Direct(_) => CapabilityShape::Direct,
            EngineObject::Composite(_) => CapabilityShape::Composite,
        }
    }

    /// Calcula nombres y valores para una molécula con la forma que tenga el
    /// objeto.
    pub fn evaluate(&mut self, molblock: &str) -> Result<CompositeValue, EngineError> {
        match self {
            EngineObject::Direct(calc) => {
                calc.set_molecule(molblock)?;
                calc.run()?;
                Ok(CompositeValue { names: calc.descriptor_names()?,
                                    values: calc.descriptor_values()? })
            }
            EngineObject::Composite(calc) => calc.calculate(molblock),
        }
    }
}

/// Runtime del motor. Una instancia por proceso: el runtime real (JVM) es
/// estado global no apto para uso concurrente.
pub trait EngineRuntime: Send + Sync {
    fn instantiate(&self, binding: &EngineBinding) -> Result<EngineObject, EngineError>;

    /// `true` sólo si el runtime puede replicarse entre workers.
    fn is_replicable(&self) -> bool {
        false
    }
}
