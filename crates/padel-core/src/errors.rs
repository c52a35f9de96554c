//! Errores del pipeline.
//!
//! Los problemas por molécula no son errores: viajan como
//! `prepare::Rejection` y acaban en una fila nula.

use padel_domain::DomainError;
use padel_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PadelError {
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("unsupported engine object: {0}")]
    UnsupportedEngineObject(String),
    #[error("engine computation failed: {0}")]
    EngineComputationFailure(String),
    #[error("engine could not be launched: {0}")]
    EngineLaunchFailure(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("configuration: {0}")]
    Config(String),
    #[error("worker pool: {0}")]
    WorkerPool(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DomainError> for PadelError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UnknownIdentifier(_) | DomainError::InvalidSelection(_) => {
                PadelError::InvalidSelection(e.to_string())
            }
            DomainError::Catalog(_) => PadelError::Config(e.to_string()),
            DomainError::Parse(_) => PadelError::InvalidArgument(e.to_string()),
        }
    }
}

impl From<EngineError> for PadelError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Launch { .. } | EngineError::Exit { .. } | EngineError::Timeout(_) | EngineError::Init(_) => {
                PadelError::EngineLaunchFailure(e.to_string())
            }
            EngineError::Unsupported(_) => PadelError::UnsupportedEngineObject(e.to_string()),
            EngineError::Computation(_) | EngineError::Toolkit(_) => PadelError::EngineComputationFailure(e.to_string()),
            EngineError::Io(io) => PadelError::Io(io),
        }
    }
}
