//! Preparación de moléculas antes del motor.
//!
//! Cada entrada produce exactamente un resultado, en el mismo orden: `Ready`
//! con el registro V2000 que se enviará al motor, o `Rejected` con el motivo.
//! Un rechazo nunca es un error; acaba como fila nula en la tabla.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use padel_domain::{MolBlock, V2000_MAX_ATOMS};
use padel_engine::StructureToolkit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoleculeInput {
    pub index: usize,
    pub molblock: String,
}

impl MoleculeInput {
    pub fn new(index: usize, molblock: impl Into<String>) -> Self {
        Self { index,
               molblock: molblock.into() }
    }

    /// Numera una secuencia de bloques MOL desde 0.
    pub fn sequence<I, S>(molblocks: I) -> Vec<MoleculeInput>
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        molblocks.into_iter().enumerate().map(|(i, m)| MoleculeInput::new(i, m)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    TooLarge,
    Missing3D,
    MalformedStructure,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::TooLarge => "too large",
            Rejection::Missing3D => "missing 3D conformer",
            Rejection::MalformedStructure => "malformed structure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyMolecule {
    pub index: usize,
    pub molblock: MolBlock,
    /// Bloque V2000 tal como se escribe en el lote.
    pub record: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreparedMolecule {
    Ready(ReadyMolecule),
    Rejected { index: usize, reason: Rejection },
}

impl PreparedMolecule {
    pub fn index(&self) -> usize {
        match self {
            PreparedMolecule::Ready(m) => m.index,
            PreparedMolecule::Rejected { index, .. } => *index,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PreparedMolecule::Ready(_))
    }
}

#[derive(Clone)]
pub struct Preparer {
    toolkit: Arc<dyn StructureToolkit>,
    require_3d: bool,
    max_atoms: usize,
}

impl Preparer {
    pub fn new(toolkit: Arc<dyn StructureToolkit>, require_3d: bool) -> Self {
        Self { toolkit,
               require_3d,
               max_atoms: V2000_MAX_ATOMS }
    }

    pub fn with_max_atoms(mut self, max_atoms: usize) -> Self {
        self.max_atoms = max_atoms;
        self
    }

    pub fn require_3d(&self) -> bool {
        self.require_3d
    }

    pub fn prepare_chunk(&self, inputs: &[MoleculeInput]) -> Vec<PreparedMolecule> {
        inputs.iter().map(|m| self.prepare(m)).collect()
    }

    pub fn prepare(&self, input: &MoleculeInput) -> PreparedMolecule {
        match self.try_prepare(input) {
            Ok(ready) => PreparedMolecule::Ready(ready),
            Err((reason, detail)) => {
                warn!("prepare:rejected index={} reason={reason} detail={detail}", input.index);
                PreparedMolecule::Rejected { index: input.index,
                                             reason }
            }
        }
    }

    fn try_prepare(&self, input: &MoleculeInput) -> Result<ReadyMolecule, (Rejection, String)> {
        let malformed = |detail: String| (Rejection::MalformedStructure, detail);

        let mut mol = MolBlock::parse(&input.molblock).map_err(|e| malformed(e.to_string()))?;
        if mol.atom_count() == 0 {
            return Err(malformed("sin átomos".into()));
        }
        if mol.atom_count() > self.max_atoms {
            return Err((Rejection::TooLarge, format!("{} átomos > {}", mol.atom_count(), self.max_atoms)));
        }
        if self.require_3d && !mol.is_3d() {
            return Err((Rejection::Missing3D, "sin conformero 3D".into()));
        }
        if !mol.has_conformer() && !self.require_3d {
            // Copia de trabajo: el bloque del llamador no se toca.
            let with_coords = self.toolkit
                                  .compute_2d_coords(&input.molblock)
                                  .map_err(|e| malformed(e.to_string()))?;
            mol = MolBlock::parse(&with_coords).map_err(|e| malformed(e.to_string()))?;
            debug!("prepare:2d_coords index={}", input.index);
        }
        if !mol.has_explicit_hydrogens() {
            warn!("prepare:implicit_hydrogens index={} (varios descriptores saldrán sesgados)",
                  input.index);
        }
        let record = mol.to_v2000().map_err(|e| malformed(e.to_string()))?;
        Ok(ReadyMolecule { index: input.index,
                           molblock: mol,
                           record })
    }
}
