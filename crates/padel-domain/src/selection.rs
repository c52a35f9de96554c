//! Selecciones: un descriptor o fingerprint pedido por el llamador, ya
//! resuelto contra el catálogo.

use padel_engine::{CapabilityShape, EngineBinding};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionKind {
    Descriptor,
    Fingerprint,
}

/// `Catalog`: tipo sin estado, se instancia igual en cualquier worker.
/// `Configured`: instancia preconfigurada por el llamador (tamaño,
/// profundidad); no se replica entre workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionOrigin {
    Catalog,
    Configured,
}

pub const DEFAULT_FP_SIZE: usize = 1024;
pub const DEFAULT_FP_SEARCH_DEPTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerprintParams {
    pub size: usize,
    pub search_depth: usize,
}

impl Default for FingerprintParams {
    fn default() -> Self {
        Self { size: DEFAULT_FP_SIZE,
               search_depth: DEFAULT_FP_SEARCH_DEPTH }
    }
}

/// Petición de selección tal como llega del llamador.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub identifier: String,
    pub params: Option<FingerprintParams>,
}

impl SelectionRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self { identifier: identifier.into(),
               params: None }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.params.get_or_insert_with(FingerprintParams::default).size = size;
        self
    }

    pub fn with_search_depth(mut self, depth: usize) -> Self {
        self.params.get_or_insert_with(FingerprintParams::default).search_depth = depth;
        self
    }
}

impl From<&str> for SelectionRequest {
    fn from(identifier: &str) -> Self {
        SelectionRequest::new(identifier)
    }
}

impl From<String> for SelectionRequest {
    fn from(identifier: String) -> Self {
        SelectionRequest::new(identifier)
    }
}

/// Selección inmutable. Sólo el registro la construye.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    kind: SelectionKind,
    identifier: String,
    name: String,
    is_3d: bool,
    subcomponents: Vec<String>,
    bit_width: Option<usize>,
    params: Option<FingerprintParams>,
    origin: SelectionOrigin,
    shape: CapabilityShape,
    bindings: Vec<EngineBinding>,
}

impl Selection {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(kind: SelectionKind,
                      identifier: &str,
                      name: &str,
                      is_3d: bool,
                      subcomponents: Vec<String>,
                      bit_width: Option<usize>,
                      params: Option<FingerprintParams>,
                      origin: SelectionOrigin,
                      shape: CapabilityShape,
                      bindings: Vec<EngineBinding>)
                      -> Self {
        Selection { kind,
                    identifier: identifier.to_string(),
                    name: name.to_string(),
                    is_3d,
                    subcomponents,
                    bit_width,
                    params,
                    origin,
                    shape,
                    bindings }
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    /// Identificador canónico: grupo de descriptores o nombre largo del
    /// fingerprint.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Nombre corto; para fingerprints es el código `-f` de ePaDEL.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    pub fn subcomponents(&self) -> &[String] {
        &self.subcomponents
    }

    pub fn bit_width(&self) -> Option<usize> {
        self.bit_width
    }

    pub fn params(&self) -> Option<FingerprintParams> {
        self.params
    }

    pub fn origin(&self) -> SelectionOrigin {
        self.origin
    }

    pub fn is_configured(&self) -> bool {
        self.origin == SelectionOrigin::Configured
    }

    pub fn shape(&self) -> CapabilityShape {
        self.shape
    }

    pub fn bindings(&self) -> &[EngineBinding] {
        &self.bindings
    }

    pub fn is_fingerprint(&self) -> bool {
        self.kind == SelectionKind::Fingerprint
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params {
            Some(p) if self.is_configured() => {
                write!(f, "{}(size={}, searchDepth={})", self.name, p.size, p.search_depth)
            }
            _ => write!(f, "{}", self.name),
        }
    }
}
