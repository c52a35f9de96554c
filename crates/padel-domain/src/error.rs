use thiserror::Error;

/// Errores del dominio: catálogo, selecciones y estructuras.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Identificador desconocido: {0}")]
    UnknownIdentifier(String),

    #[error("Selección inválida: {0}")]
    InvalidSelection(String),

    #[error("Catálogo inválido: {0}")]
    Catalog(String),

    #[error("Bloque MOL inválido: {0}")]
    Parse(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Catalog(e.to_string())
    }
}
