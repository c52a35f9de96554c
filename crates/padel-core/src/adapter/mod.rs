//! Invocación del motor. Dos estrategias con el mismo contrato: para una
//! selección y las moléculas Ready de un chunk, una tabla con una fila por
//! molécula en el mismo orden.

pub mod external;
pub mod in_process;

pub use external::ExternalProcessAdapter;
pub use in_process::InProcessAdapter;

use padel_domain::Selection;

use crate::errors::PadelError;
use crate::prepare::ReadyMolecule;
use crate::table::PartialResult;

pub trait EngineAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute(&self, selection: &Selection, ready: &[ReadyMolecule]) -> Result<PartialResult, PadelError>;

    /// Todas las selecciones de un chunk, en orden.
    fn compute_all(&self, selections: &[Selection], ready: &[ReadyMolecule]) -> Result<Vec<PartialResult>, PadelError> {
        selections.iter().map(|s| self.compute(s, ready)).collect()
    }

    /// `true` si puede usarse desde varios workers a la vez.
    fn is_replicable(&self) -> bool;
}
