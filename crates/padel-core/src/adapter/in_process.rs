//! Estrategia en proceso: un objeto del motor por binding, una llamada por
//! molécula.
//!
//! Si una molécula falla se usa la fila vacía del binding (mismos nombres,
//! todo nulo), calculada una sola vez con una molécula proxy. Así un fallo
//! individual nunca desalinea filas ni aborta el lote.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use padel_domain::Selection;
use padel_engine::{EngineBinding, EngineObject, EngineRuntime};

use crate::adapter::EngineAdapter;
use crate::constants::{PROXY_2D_MOLBLOCK, PROXY_3D_MOLBLOCK};
use crate::errors::PadelError;
use crate::prepare::ReadyMolecule;
use crate::table::{parse_numeric, Cell, PartialResult, ResultTable};

/// Objeto instanciado más los nombres de su fila vacía.
struct Slot {
    object: EngineObject,
    names: Vec<String>,
}

pub struct InProcessAdapter {
    runtime: Arc<dyn EngineRuntime>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl InProcessAdapter {
    pub fn new(runtime: Arc<dyn EngineRuntime>) -> Self {
        Self { runtime,
               slots: Mutex::new(HashMap::new()) }
    }

    fn instantiate(&self, binding: &EngineBinding, three_d: bool) -> Result<Slot, PadelError> {
        let mut object = self.runtime.instantiate(binding)?;
        if object.shape() != binding.shape {
            return Err(PadelError::UnsupportedEngineObject(format!("{binding}: se esperaba {:?}, el runtime dio {:?}",
                                                                   binding.shape,
                                                                   object.shape())));
        }
        let proxy = if three_d { PROXY_3D_MOLBLOCK } else { PROXY_2D_MOLBLOCK };
        let empty = object.evaluate(proxy)
                          .map_err(|e| PadelError::EngineComputationFailure(format!("{binding} con molécula proxy: {e}")))?;
        debug!("in_process:empty_row binding={binding} columns={}", empty.names.len());
        Ok(Slot { object,
                  names: empty.names })
    }

    fn binding_table(slot: &mut Slot,
                     binding: &EngineBinding,
                     ready: &[ReadyMolecule])
                     -> Result<ResultTable, PadelError> {
        let mut table = ResultTable::from_rows(slot.names.clone(), Vec::new())?;
        for molecule in ready {
            let row = match evaluate_row(&mut slot.object, &slot.names, &molecule.record) {
                Ok(row) => row,
                Err(reason) => {
                    warn!("in_process:empty_row index={} binding={binding} reason={reason}", molecule.index);
                    vec![Cell::Null; slot.names.len()]
                }
            };
            table.push_row(row)?;
        }
        Ok(table)
    }
}

fn evaluate_row(object: &mut EngineObject, names: &[String], record: &str) -> Result<Vec<Cell>, String> {
    let value = object.evaluate(record).map_err(|e| e.to_string())?;
    if value.values.len() != names.len() {
        return Err(format!("{} valores para {} columnas", value.values.len(), names.len()));
    }
    if !value.names.is_empty() && value.names != names {
        return Err("nombres de columna distintos a los de la fila vacía".into());
    }
    value.values
         .iter()
         .map(|v| parse_numeric(v).map_err(|e| e.to_string()))
         .collect()
}

impl EngineAdapter for InProcessAdapter {
    fn name(&self) -> &'static str {
        "in-process"
    }

    fn compute(&self, selection: &Selection, ready: &[ReadyMolecule]) -> Result<PartialResult, PadelError> {
        let mut slots = self.slots
                            .lock()
                            .map_err(|_| PadelError::WorkerPool("caché de objetos del motor envenenada".into()))?;
        let mut tables = Vec::with_capacity(selection.bindings().len());
        for binding in selection.bindings() {
            let key = binding.key();
            if !slots.contains_key(&key) {
                let slot = self.instantiate(binding, selection.is_3d())?;
                slots.insert(key.clone(), slot);
            }
            let slot = slots.get_mut(&key)
                            .ok_or_else(|| PadelError::WorkerPool(format!("objeto {key} no disponible")))?;
            tables.push(Self::binding_table(slot, binding, ready)?);
        }
        let table = ResultTable::hconcat(tables, ready.len())?;
        Ok(PartialResult { selection: selection.name().to_string(),
                           table })
    }

    fn is_replicable(&self) -> bool {
        self.runtime.is_replicable()
    }
}
