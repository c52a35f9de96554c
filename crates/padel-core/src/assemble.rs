//! Ensamblado de un chunk: concatenación por columnas, filas nulas en las
//! posiciones rechazadas y filtrado a las columnas pedidas.
//!
//! Las filas nulas se insertan antes de que el chunk salga del worker, así la
//! concatenación final no necesita saber nada de los rechazos.

use indexmap::IndexSet;
use log::warn;
use padel_domain::Selection;

use crate::errors::PadelError;
use crate::prepare::PreparedMolecule;
use crate::table::{PartialResult, ResultTable};

/// Columnas pedidas: orden de selección y, dentro de cada una, orden del
/// catálogo.
pub fn requested_columns(selections: &[Selection]) -> Vec<String> {
    let set: IndexSet<&String> = selections.iter().flat_map(|s| s.subcomponents()).collect();
    set.into_iter().cloned().collect()
}

pub fn assemble_chunk(prepared: &[PreparedMolecule],
                      partials: Vec<PartialResult>,
                      requested: &[String])
                      -> Result<ResultTable, PadelError> {
    let n_ready = prepared.iter().filter(|m| m.is_ready()).count();
    let mut merged = ResultTable::hconcat(partials.into_iter().map(|p| p.table).collect(), n_ready)?;

    let rejected: Vec<usize> = prepared.iter()
                                       .enumerate()
                                       .filter(|(_, m)| !m.is_ready())
                                       .map(|(pos, _)| pos)
                                       .collect();
    merged.insert_null_rows(&rejected)?;

    let (table, missing) = merged.reindex_columns(requested);
    if n_ready > 0 && !missing.is_empty() {
        warn!("assemble:missing_columns count={} first={} (se rellenan con nulos)",
              missing.len(),
              missing[0]);
    }
    Ok(table)
}
