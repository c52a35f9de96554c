//! padel-core: pipeline de lotes sobre el motor PaDEL.
//!
//! Flujo por llamada a `PaDEL::calculate`: el `Scheduler` parte la entrada en
//! chunks contiguos; cada chunk pasa por `Preparer` → `EngineAdapter` →
//! `assemble_chunk` y los fragmentos se concatenan en el orden de entrada.
pub mod adapter;
pub mod assemble;
pub mod config;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod padel;
pub mod prepare;
pub mod scheduler;
pub mod table;

pub use adapter::{EngineAdapter, ExternalProcessAdapter, InProcessAdapter};
pub use assemble::{assemble_chunk, requested_columns};
pub use config::{init_dotenv, EngineConfig, EngineMode};
pub use errors::PadelError;
pub use padel::{engine_from_config, PaDEL};
pub use prepare::{MoleculeInput, PreparedMolecule, Preparer, ReadyMolecule, Rejection};
pub use scheduler::{PipelineConfig, Scheduler};
pub use table::{parse_numeric, Cell, PartialResult, ResultTable};
