//! Runtime en proceso vía Python embebido (pyo3): PaDEL/CDK sobre jpype y
//! RDKit para coordenadas 2D.
//!
//! El módulo Python y la JVM son estado global del proceso: se cargan una
//! sola vez y nunca se liberan. Por eso `PyEngineRuntime` no es replicable.

use std::ffi::CString;
use std::path::PathBuf;
use std::sync::OnceLock;

use log::{debug, info};
use pyo3::ffi::c_str;
use pyo3::prelude::*;
use pyo3::types::PyModule;

use crate::{CapabilityShape, CompositeCalculator, CompositeValue, DirectCalculator, EngineBinding, EngineError,
            EngineObject, EngineRuntime, StructureToolkit};

static BRIDGE_MODULE: OnceLock<Py<PyModule>> = OnceLock::new();

fn load_module(py: Python<'_>) -> PyResult<Py<PyModule>> {
    if let Some(module) = BRIDGE_MODULE.get() {
        return Ok(module.clone_ref(py));
    }
    let code = CString::new(include_str!("../python/padel_bridge.py"))?;
    let module = PyModule::from_code(py, code.as_c_str(), c_str!("padel_bridge.py"), c_str!("padel_bridge"))?;
    // Si otro hilo ganó la carrera nos quedamos con su módulo.
    BRIDGE_MODULE.set(module.unbind()).ok();
    BRIDGE_MODULE.get()
                 .map(|module| module.clone_ref(py))
                 .ok_or_else(|| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>("módulo puente no disponible"))
}

/// Arranca la JVM con el classpath de PaDEL (idempotente).
pub fn init_bridge(classpath: &[PathBuf]) -> PyResult<()> {
    Python::attach(|py| {
        let module = load_module(py)?;
        let cp: Vec<String> = classpath.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        module.bind(py).getattr("start_jvm")?.call1((cp,))?;
        Ok(())
    })
}

pub struct PyEngineRuntime {
    _private: (),
}

impl PyEngineRuntime {
    pub fn init(classpath: &[PathBuf]) -> Result<Self, EngineError> {
        init_bridge(classpath).map_err(|e| EngineError::Init(e.to_string()))?;
        info!("bridge:jvm started classpath_entries={}", classpath.len());
        Ok(Self { _private: () })
    }
}

impl EngineRuntime for PyEngineRuntime {
    fn instantiate(&self, binding: &EngineBinding) -> Result<EngineObject, EngineError> {
        Python::attach(|py| {
            let module = load_module(py)?;
            let obj = module.bind(py)
                            .getattr("new_engine_object")?
                            .call1((binding.class.as_str(), binding.args.clone()))?;
            let object = match binding.shape {
                CapabilityShape::Direct if obj.hasattr("setMolecule")? => {
                    EngineObject::Direct(Box::new(PyDirect { obj: obj.unbind() }))
                }
                CapabilityShape::Composite if obj.hasattr("calculate")? => {
                    EngineObject::Composite(Box::new(PyComposite { obj: obj.unbind() }))
                }
                shape => {
                    return Err(EngineError::Unsupported(format!("{} no expone la forma {:?}", binding.class, shape)));
                }
            };
            debug!("bridge:instantiate binding={}", binding);
            Ok(object)
        })
    }
}

struct PyDirect {
    obj: Py<PyAny>,
}

impl DirectCalculator for PyDirect {
    fn set_molecule(&mut self, molblock: &str) -> Result<(), EngineError> {
        Python::attach(|py| {
            let module = load_module(py)?;
            module.bind(py).getattr("set_molecule")?.call1((self.obj.bind(py), molblock))?;
            Ok(())
        })
    }

    fn run(&mut self) -> Result<(), EngineError> {
        Python::attach(|py| {
            self.obj.bind(py).call_method0("run")?;
            Ok(())
        })
    }

    fn descriptor_names(&self) -> Result<Vec<String>, EngineError> {
        Python::attach(|py| {
            let module = load_module(py)?;
            let names: Vec<String> = module.bind(py).getattr("descriptor_names")?.call1((self.obj.bind(py),))?.extract()?;
            Ok(names)
        })
    }

    fn descriptor_values(&self) -> Result<Vec<String>, EngineError> {
        Python::attach(|py| {
            let module = load_module(py)?;
            let values: Vec<String> = module.bind(py).getattr("descriptor_values")?.call1((self.obj.bind(py),))?.extract()?;
            Ok(values)
        })
    }
}

struct PyComposite {
    obj: Py<PyAny>,
}

impl CompositeCalculator for PyComposite {
    fn calculate(&mut self, molblock: &str) -> Result<CompositeValue, EngineError> {
        Python::attach(|py| {
            let module = load_module(py)?;
            let (names, values): (Vec<String>, Vec<String>) =
                module.bind(py).getattr("composite_calculate")?.call1((self.obj.bind(py), molblock))?.extract()?;
            Ok(CompositeValue { names, values })
        })
    }
}

/// Coordenadas 2D con `AllChem.Compute2DCoords` de RDKit.
#[derive(Debug, Default, Clone, Copy)]
pub struct RdkitToolkit;

impl StructureToolkit for RdkitToolkit {
    fn compute_2d_coords(&self, molblock: &str) -> Result<String, EngineError> {
        Python::attach(|py| {
            let module = load_module(py).map_err(|e| EngineError::Toolkit(e.to_string()))?;
            let out: String = module.bind(py)
                                    .getattr("compute_2d_coords")
                                    .and_then(|f| f.call1((molblock,)))
                                    .and_then(|r| r.extract())
                                    .map_err(|e| EngineError::Toolkit(e.to_string()))?;
            Ok(out)
        })
    }
}
