//! Toolkit estructural externo (coordenadas 2D).

use log::debug;

use crate::EngineError;

/// Genera coordenadas 2D para un bloque MOL V2000 sin conformero. Devuelve un
/// bloque nuevo, nunca modifica el del llamador.
pub trait StructureToolkit: Send + Sync {
    fn compute_2d_coords(&self, molblock: &str) -> Result<String, EngineError>;
}

/// Toolkit nulo: deja las coordenadas como están y el motor trabaja con la
/// topología. Se usa cuando no hay RDKit disponible.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughToolkit;

impl StructureToolkit for PassThroughToolkit {
    fn compute_2d_coords(&self, molblock: &str) -> Result<String, EngineError> {
        debug!("toolkit:passthrough bytes={}", molblock.len());
        Ok(molblock.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_returns_copy() {
        let block = "metano\n\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n";
        assert_eq!(PassThroughToolkit.compute_2d_coords(block).unwrap(), block);
    }
}
