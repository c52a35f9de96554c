// padel-domain library entry point
pub mod error;
pub mod molblock;
pub mod registry;
pub mod selection;

pub use error::DomainError;
pub use molblock::{split_sd_records, Atom, MolBlock, V2000_MAX_ATOMS};
pub use registry::{CatalogSource, Registry};
pub use selection::{FingerprintParams, DEFAULT_FP_SEARCH_DEPTH, DEFAULT_FP_SIZE, Selection, SelectionKind, SelectionOrigin, SelectionRequest};
