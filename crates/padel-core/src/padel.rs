//! Fachada pública: `PaDEL::new(selecciones, ignore_3d)` y `calculate`.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use padel_domain::{CatalogSource, Registry, Selection, SelectionOrigin, SelectionRequest};
use padel_engine::{ProcessRunner, StructureToolkit};
use uuid::Uuid;

use crate::adapter::{EngineAdapter, ExternalProcessAdapter};
use crate::assemble::requested_columns;
use crate::config::{EngineConfig, EngineMode};
use crate::constants::{BANNER, DETAILS_URL};
use crate::errors::PadelError;
use crate::prepare::{MoleculeInput, Preparer};
use crate::scheduler::{PipelineConfig, Scheduler};
use crate::table::ResultTable;

pub struct PaDEL {
    selections: Arc<[Selection]>,
    requested: Arc<[String]>,
    adapter: Arc<dyn EngineAdapter>,
    toolkit: Arc<dyn StructureToolkit>,
    ignore_3d: bool,
    cannot_parallelize: bool,
    source: CatalogSource,
}

impl PaDEL {
    /// Resuelve las selecciones y construye el motor según el entorno
    /// (`EngineConfig::from_env`).
    pub fn new<I, R>(requests: I, ignore_3d: bool) -> Result<Self, PadelError>
        where I: IntoIterator<Item = R>,
              R: Into<SelectionRequest>
    {
        let registry = Registry::global()?;
        let selections = resolve_all(registry, requests, ignore_3d)?;
        let config = EngineConfig::from_env()?;
        let (adapter, toolkit) = engine_from_config(&config)?;
        Ok(Self::assemble(selections, adapter, toolkit, ignore_3d, registry.source().clone()))
    }

    /// Igual que `new` pero con motor y toolkit explícitos.
    pub fn with_engine<I, R>(requests: I,
                             ignore_3d: bool,
                             adapter: Arc<dyn EngineAdapter>,
                             toolkit: Arc<dyn StructureToolkit>)
                             -> Result<Self, PadelError>
        where I: IntoIterator<Item = R>,
              R: Into<SelectionRequest>
    {
        let registry = Registry::global()?;
        let selections = resolve_all(registry, requests, ignore_3d)?;
        Ok(Self::assemble(selections, adapter, toolkit, ignore_3d, registry.source().clone()))
    }

    fn assemble(selections: Vec<Selection>,
                adapter: Arc<dyn EngineAdapter>,
                toolkit: Arc<dyn StructureToolkit>,
                ignore_3d: bool,
                source: CatalogSource)
                -> Self {
        let cannot_parallelize = selections.iter().any(|s| s.origin() == SelectionOrigin::Configured);
        let requested: Arc<[String]> = requested_columns(&selections).into();
        debug!("padel:new selections={} columns={} engine={} cannot_parallelize={cannot_parallelize}",
               selections.len(),
               requested.len(),
               adapter.name());
        Self { selections: selections.into(),
               requested,
               adapter,
               toolkit,
               ignore_3d,
               cannot_parallelize,
               source }
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn columns(&self) -> &[String] {
        &self.requested
    }

    pub fn ignore_3d(&self) -> bool {
        self.ignore_3d
    }

    /// Paralelizar exige más de un worker, sólo selecciones de catálogo y un
    /// motor replicable.
    pub fn can_parallelize(&self, njobs: usize) -> bool {
        njobs > 1 && !self.cannot_parallelize && self.adapter.is_replicable()
    }

    /// Calcula la tabla para `molecules` (bloques MOL V2000). Una fila por
    /// molécula y en el mismo orden; las rechazadas quedan a nulo.
    pub fn calculate<S: AsRef<str>>(&self,
                                    molecules: &[S],
                                    show_banner: bool,
                                    njobs: usize,
                                    chunksize: usize)
                                    -> Result<ResultTable, PadelError> {
        let scheduler = Scheduler::new(njobs, chunksize)?;
        if show_banner {
            print!("{BANNER}");
        }
        let run_id = Uuid::new_v4();
        let parallel = self.can_parallelize(njobs);
        if njobs > 1 && !parallel {
            warn!("padel:sequential_fallback njobs={njobs} reason={}", self.sequential_reason());
        }
        info!("padel:calculate:start run_id={run_id} molecules={} selections={} njobs={njobs} chunksize={chunksize} parallel={parallel}",
              molecules.len(),
              self.selections.len());

        let inputs = MoleculeInput::sequence(molecules.iter().map(|m| m.as_ref().to_string()));
        let config = PipelineConfig { selections: Arc::clone(&self.selections),
                                      requested: Arc::clone(&self.requested),
                                      adapter: Arc::clone(&self.adapter),
                                      preparer: Preparer::new(Arc::clone(&self.toolkit), self.requires_3d()) };
        let table = scheduler.run(&config, &inputs, parallel)?;

        info!("padel:calculate:done run_id={run_id} rows={} columns={} digest={}",
              table.n_rows(),
              table.n_cols(),
              table.digest());
        Ok(table)
    }

    fn sequential_reason(&self) -> &'static str {
        if self.cannot_parallelize {
            "fingerprint configurado"
        } else {
            "motor no replicable"
        }
    }

    fn requires_3d(&self) -> bool {
        self.selections.iter().any(Selection::is_3d)
    }

    /// Dónde consultar el detalle de cada descriptor y de dónde salió el
    /// catálogo.
    pub fn details(&self) -> String {
        let source = match &self.source {
            CatalogSource::Embedded => "embedded catalog".to_string(),
            CatalogSource::Directory(dir) => format!("catalog directory {}", dir.display()),
        };
        format!("Full details about the PaDEL descriptors can be found at:\n{DETAILS_URL}\nColumn names come from the {source}.")
    }
}

/// Resuelve todas las peticiones antes de tocar el motor; un identificador
/// inválido rechaza la lista completa. Las repeticiones se descartan.
fn resolve_all<I, R>(registry: &Registry, requests: I, ignore_3d: bool) -> Result<Vec<Selection>, PadelError>
    where I: IntoIterator<Item = R>,
          R: Into<SelectionRequest>
{
    let mut seen = HashSet::new();
    let mut selections = Vec::new();
    for request in requests {
        let request: SelectionRequest = request.into();
        let selection = registry.resolve(&request)?;
        if !seen.insert(selection.identifier().to_string()) {
            warn!("padel:duplicate_selection selection={} (se conserva la primera)", selection.identifier());
            continue;
        }
        if ignore_3d && selection.is_3d() {
            info!("padel:skip_3d selection={}", selection.identifier());
            continue;
        }
        selections.push(selection);
    }
    Ok(selections)
}

/// Motor y toolkit según la configuración.
pub fn engine_from_config(config: &EngineConfig) -> Result<(Arc<dyn EngineAdapter>, Arc<dyn StructureToolkit>), PadelError> {
    let adapter: Arc<dyn EngineAdapter> = match config.mode {
        EngineMode::External => {
            let runner = Arc::new(ProcessRunner::new(config.timeout));
            Arc::new(ExternalProcessAdapter::new(config.launcher(), runner))
        }
        EngineMode::InProcess => in_process_adapter(config)?,
    };
    Ok((adapter, default_toolkit()))
}

#[cfg(feature = "python-bridge")]
fn in_process_adapter(config: &EngineConfig) -> Result<Arc<dyn EngineAdapter>, PadelError> {
    let runtime = padel_engine::bridge::PyEngineRuntime::init(&config.classpath)?;
    Ok(Arc::new(crate::adapter::InProcessAdapter::new(Arc::new(runtime))))
}

#[cfg(not(feature = "python-bridge"))]
fn in_process_adapter(_config: &EngineConfig) -> Result<Arc<dyn EngineAdapter>, PadelError> {
    Err(PadelError::Config("PADEL_ENGINE_MODE=in-process requiere compilar con la feature `python-bridge`".into()))
}

#[cfg(feature = "python-bridge")]
fn default_toolkit() -> Arc<dyn StructureToolkit> {
    Arc::new(padel_engine::bridge::RdkitToolkit)
}

#[cfg(not(feature = "python-bridge"))]
fn default_toolkit() -> Arc<dyn StructureToolkit> {
    Arc::new(padel_engine::PassThroughToolkit)
}
