//! Estrategia de proceso externo (ePaDEL).
//!
//! El chunk se escribe una vez en un fichero SD temporal que se borra al
//! salir del ámbito, también si algo falla. Para descriptores ePaDEL emite
//! siempre el conjunto completo: se calcula una vez por chunk y se proyecta
//! a cada selección. Los fingerprints van en una invocación cada uno.
//!
//! Aquí no hay tolerancia por molécula: si el número de filas, de valores o
//! de bits de un fingerprint no cuadra, falla el chunk entero. El fichero compartido no permite reintentar
//! una molécula aislada.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use padel_domain::Selection;
use padel_engine::{CommandRunner, CommandTarget, EPadelLauncher};
use tempfile::NamedTempFile;

use crate::adapter::EngineAdapter;
use crate::errors::PadelError;
use crate::prepare::ReadyMolecule;
use crate::table::{parse_numeric, PartialResult, ResultTable};

pub struct ExternalProcessAdapter {
    launcher: EPadelLauncher,
    runner: Arc<dyn CommandRunner>,
}

impl ExternalProcessAdapter {
    pub fn new(launcher: EPadelLauncher, runner: Arc<dyn CommandRunner>) -> Self {
        Self { launcher, runner }
    }

    fn write_batch(ready: &[ReadyMolecule]) -> Result<NamedTempFile, PadelError> {
        let mut file = tempfile::Builder::new().prefix("padel-batch-").suffix(".sdf").tempfile()?;
        for molecule in ready {
            file.write_all(molecule.record.as_bytes())?;
            file.write_all(b"$$$$\n")?;
        }
        file.flush()?;
        debug!("external:batch path={} molecules={}", file.path().display(), ready.len());
        Ok(file)
    }

    fn run_table(&self, target: &CommandTarget, batch: &Path, expected_rows: usize) -> Result<ResultTable, PadelError> {
        let names_out = self.runner.run(&self.launcher.names_command(target))?;
        let names: Vec<String> = names_out.split_whitespace().map(String::from).collect();
        if names.is_empty() {
            return Err(PadelError::EngineComputationFailure(format!("{target:?}: ePaDEL no devolvió nombres")));
        }

        let values_out = self.runner.run(&self.launcher.values_command(target, batch))?;
        let mut table = ResultTable::from_rows(names, Vec::new())?;
        for (line_no, line) in values_out.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let row = line.split_whitespace().map(parse_numeric).collect::<Result<Vec<_>, _>>()?;
            table.push_row(row)
                 .map_err(|e| PadelError::EngineComputationFailure(format!("{target:?} fila {line_no}: {e}")))?;
        }
        if table.n_rows() != expected_rows {
            return Err(PadelError::EngineComputationFailure(format!("{target:?}: {} filas para {expected_rows} moléculas",
                                                                    table.n_rows())));
        }
        Ok(table)
    }

    fn fingerprint_target(selection: &Selection) -> CommandTarget {
        let params = selection.params().filter(|_| selection.is_configured());
        CommandTarget::Fingerprint { code: selection.name().to_string(),
                                     size: params.map(|p| p.size),
                                     search_depth: params.map(|p| p.search_depth) }
    }
}

/// Columnas de la selección presentes en la salida del motor, en el orden
/// del catálogo.
fn project(superset: &ResultTable, selection: &Selection) -> ResultTable {
    let present: Vec<String> = selection.subcomponents()
                                        .iter()
                                        .filter(|c| superset.has_column(c))
                                        .cloned()
                                        .collect();
    superset.reindex_columns(&present).0
}

impl EngineAdapter for ExternalProcessAdapter {
    fn name(&self) -> &'static str {
        "external-process"
    }

    fn compute(&self, selection: &Selection, ready: &[ReadyMolecule]) -> Result<PartialResult, PadelError> {
        self.compute_all(std::slice::from_ref(selection), ready)?
            .pop()
            .ok_or_else(|| PadelError::EngineComputationFailure(format!("{selection}: sin resultado")))
    }

    fn compute_all(&self, selections: &[Selection], ready: &[ReadyMolecule]) -> Result<Vec<PartialResult>, PadelError> {
        if ready.is_empty() {
            return Ok(selections.iter()
                                .map(|s| PartialResult { selection: s.name().to_string(),
                                                         table: ResultTable::new(s.subcomponents().iter().cloned()) })
                                .collect());
        }

        // Se borra al salir del ámbito, con éxito o con error.
        let batch = Self::write_batch(ready)?;

        let descriptors: Vec<&Selection> = selections.iter().filter(|s| !s.is_fingerprint()).collect();
        let superset = if descriptors.is_empty() {
            None
        } else {
            let three_d = descriptors.iter().any(|s| s.is_3d());
            Some(self.run_table(&CommandTarget::Descriptors { three_d }, batch.path(), ready.len())?)
        };

        let mut partials = Vec::with_capacity(selections.len());
        for selection in selections {
            let table = match &superset {
                Some(all) if !selection.is_fingerprint() => project(all, selection),
                _ => {
                    let table = self.run_table(&Self::fingerprint_target(selection), batch.path(), ready.len())?;
                    if !table.columns().eq(selection.subcomponents().iter().map(String::as_str)) {
                        warn!("external:fingerprint_width selection={selection} expected={} got={}",
                              selection.subcomponents().len(),
                              table.n_cols());
                        return Err(PadelError::EngineComputationFailure(format!("{selection}: {} bits para {} esperados",
                                                                                table.n_cols(),
                                                                                selection.subcomponents().len())));
                    }
                    table
                }
            };
            partials.push(PartialResult { selection: selection.name().to_string(),
                                          table });
        }
        Ok(partials)
    }

    fn is_replicable(&self) -> bool {
        true
    }
}
