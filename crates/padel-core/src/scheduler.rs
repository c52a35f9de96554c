//! Planificación por chunks.
//!
//! La entrada se parte en chunks contiguos. En paralelo cada chunk va a un
//! pool de rayon acotado a `njobs` hilos; los fragmentos se recogen por
//! índice de chunk, nunca por orden de llegada, así que el orden final es el
//! de entrada. El primer error fatal aborta la llamada.

use std::sync::Arc;

use log::debug;
use padel_domain::Selection;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::adapter::EngineAdapter;
use crate::assemble::assemble_chunk;
use crate::errors::PadelError;
use crate::prepare::{MoleculeInput, PreparedMolecule, Preparer};
use crate::table::ResultTable;

/// Configuración inmutable de un chunk. Cada worker recibe su propia copia.
#[derive(Clone)]
pub struct PipelineConfig {
    pub selections: Arc<[Selection]>,
    pub requested: Arc<[String]>,
    pub adapter: Arc<dyn EngineAdapter>,
    pub preparer: Preparer,
}

impl PipelineConfig {
    /// Preparación → motor → ensamblado para un chunk.
    pub fn run_chunk(&self, chunk: &[MoleculeInput]) -> Result<ResultTable, PadelError> {
        let prepared = self.preparer.prepare_chunk(chunk);
        let ready: Vec<_> = prepared.iter()
                                    .filter_map(|m| match m {
                                        PreparedMolecule::Ready(r) => Some(r.clone()),
                                        PreparedMolecule::Rejected { .. } => None,
                                    })
                                    .collect();
        let partials = self.adapter.compute_all(&self.selections, &ready)?;
        assemble_chunk(&prepared, partials, &self.requested)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    njobs: usize,
    chunksize: usize,
}

impl Scheduler {
    pub fn new(njobs: usize, chunksize: usize) -> Result<Self, PadelError> {
        if njobs == 0 {
            return Err(PadelError::InvalidArgument("njobs debe ser >= 1".into()));
        }
        if chunksize == 0 {
            return Err(PadelError::InvalidArgument("chunksize debe ser >= 1".into()));
        }
        Ok(Self { njobs, chunksize })
    }

    pub fn njobs(&self) -> usize {
        self.njobs
    }

    pub fn chunksize(&self) -> usize {
        self.chunksize
    }

    pub fn chunk_count(&self, n_molecules: usize) -> usize {
        n_molecules.div_ceil(self.chunksize)
    }

    pub fn run(&self, config: &PipelineConfig, molecules: &[MoleculeInput], parallel: bool) -> Result<ResultTable, PadelError> {
        let fragments = if parallel && self.njobs > 1 && self.chunk_count(molecules.len()) > 1 {
            self.run_parallel(config, molecules)?
        } else {
            molecules.chunks(self.chunksize)
                     .enumerate()
                     .map(|(i, chunk)| {
                         debug!("scheduler:chunk mode=sequential chunk={i} size={}", chunk.len());
                         config.run_chunk(chunk)
                     })
                     .collect::<Result<Vec<_>, _>>()?
        };
        let table = ResultTable::vconcat(config.requested.to_vec(), fragments)?;
        if table.n_rows() != molecules.len() {
            return Err(PadelError::EngineComputationFailure(format!("{} filas para {} moléculas",
                                                                    table.n_rows(),
                                                                    molecules.len())));
        }
        Ok(table)
    }

    fn run_parallel(&self, config: &PipelineConfig, molecules: &[MoleculeInput]) -> Result<Vec<ResultTable>, PadelError> {
        let pool = ThreadPoolBuilder::new().num_threads(self.njobs)
                                           .thread_name(|i| format!("padel-worker-{i}"))
                                           .build()
                                           .map_err(|e| PadelError::WorkerPool(e.to_string()))?;
        debug!("scheduler:pool threads={} chunks={}", self.njobs, self.chunk_count(molecules.len()));
        pool.install(|| {
                molecules.par_chunks(self.chunksize)
                         .enumerate()
                         .map(|(i, chunk)| {
                             let worker_config = config.clone();
                             debug!("scheduler:chunk mode=parallel chunk={i} size={}", chunk.len());
                             worker_config.run_chunk(chunk)
                         })
                         .collect::<Result<Vec<_>, _>>()
            })
    }
}
