//! padel-engine: colaboradores externos del pipeline PaDEL.
//!
//! - `binding`: identidad de una clase del motor (+ argumentos de constructor)
//!   y la forma de su API (`CapabilityShape`).
//! - `calculator`: contratos del runtime en proceso (`EngineRuntime`,
//!   `DirectCalculator`, `CompositeCalculator`).
//! - `command`: construcción y ejecución de los comandos ePaDEL.
//! - `toolkit`: generación de coordenadas 2D delegada a un toolkit químico.
//! - `bridge` (feature `python-bridge`): implementación vía pyo3 + jpype + RDKit.

use std::time::Duration;

use thiserror::Error;

pub mod binding;
pub mod calculator;
pub mod command;
pub mod toolkit;

#[cfg(feature = "python-bridge")]
pub mod bridge;

pub use binding::{CapabilityShape, EngineBinding};
pub use calculator::{CompositeCalculator, CompositeValue, DirectCalculator, EngineObject, EngineRuntime};
pub use command::{CommandRunner, CommandTarget, EPadelLauncher, EngineCommand, ProcessRunner};
pub use toolkit::{PassThroughToolkit, StructureToolkit};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Error inicializando el runtime del motor: {0}")]
    Init(String),
    #[error("No se pudo lanzar `{program}`: {source}")]
    Launch { program: String, source: std::io::Error },
    #[error("El motor terminó con estado {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("El motor excedió el tiempo límite de {0:?}")]
    Timeout(Duration),
    #[error("Cálculo fallido: {0}")]
    Computation(String),
    #[error("Objeto de motor no soportado: {0}")]
    Unsupported(String),
    #[error("Error del toolkit estructural: {0}")]
    Toolkit(String),
    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "python-bridge")]
impl From<pyo3::PyErr> for EngineError {
    fn from(e: pyo3::PyErr) -> Self {
        EngineError::Computation(e.to_string())
    }
}
