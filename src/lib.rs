//! padel-rust
//!
//! Librería de entrada del workspace:
//! - Reexporta la fachada `PaDEL` y los tipos de resultado de `padel-core`.
//! - Reexporta el catálogo (`Registry`, `SelectionRequest`) de `padel-domain`.
//! - `cli` contiene el parseo de argumentos y la lectura de ficheros SD que
//!   usa el binario `padel`.

pub mod cli;

pub use padel_core::{init_dotenv, Cell, EngineConfig, EngineMode, PaDEL, PadelError, ResultTable};
pub use padel_domain::{Registry, Selection, SelectionKind, SelectionRequest};
