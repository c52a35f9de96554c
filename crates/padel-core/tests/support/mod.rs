//! Dobles de prueba compartidos: runtime en proceso simulado, runner que
//! emula ePaDEL y moléculas de ejemplo. Ningún test necesita Java.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use padel_core::{EngineAdapter, ExternalProcessAdapter, InProcessAdapter};
use padel_domain::{split_sd_records, MolBlock, Registry, Selection, SelectionRequest};
use padel_engine::{CapabilityShape, CommandRunner, CompositeCalculator, CompositeValue, DirectCalculator, EPadelLauncher,
                   EngineBinding, EngineCommand, EngineError, EngineObject, EngineRuntime};

pub const FAIL_TITLE: &str = "FAIL";

/// Valor determinista para una columna: depende sólo del nombre y del
/// número de átomos, así ambas estrategias producen lo mismo.
pub fn fake_value(column: &str, atom_count: usize, fingerprint: bool) -> String {
    if fingerprint {
        ((atom_count + column.len()) % 2).to_string()
    } else if column.len() % 3 == 0 {
        format!("{:.3}", atom_count as f64 / column.len() as f64)
    } else {
        (atom_count * 10 + column.len()).to_string()
    }
}

fn registry() -> &'static Registry {
    Registry::global().expect("catálogo embebido")
}

/// Columnas que emite un binding: si la selección tiene un binding por
/// columna, la suya; si no, el primero emite todas.
fn columns_for(binding: &EngineBinding) -> Option<(Vec<String>, bool)> {
    let reg = registry();
    for sel in reg.selections() {
        if let Some(i) = sel.bindings().iter().position(|b| b == binding) {
            let cols = if sel.bindings().len() == sel.subcomponents().len() {
                vec![sel.subcomponents()[i].clone()]
            } else if i == 0 {
                sel.subcomponents().to_vec()
            } else {
                Vec::new()
            };
            return Some((cols, sel.is_fingerprint()));
        }
    }
    // Fingerprint configurado: misma clase, argumentos (size, searchDepth).
    let sel = reg.selections().find(|s| s.is_fingerprint() && s.bindings()[0].class == binding.class)?;
    let size = binding.args.first()?.parse().ok()?;
    let depth = binding.args.get(1)?.parse().ok()?;
    let configured = reg.resolve(&SelectionRequest::new(sel.name()).with_size(size).with_search_depth(depth))
                        .ok()?;
    Some((configured.subcomponents().to_vec(), true))
}

fn atom_count_of(molblock: &str) -> Result<(usize, String), EngineError> {
    let mol = MolBlock::parse(molblock).map_err(|e| EngineError::Computation(e.to_string()))?;
    Ok((mol.atom_count(), mol.title().to_string()))
}

struct MockDirect {
    names: Vec<String>,
    fingerprint: bool,
    loaded: Option<String>,
    values: Vec<String>,
}

impl DirectCalculator for MockDirect {
    fn set_molecule(&mut self, molblock: &str) -> Result<(), EngineError> {
        self.loaded = Some(molblock.to_string());
        Ok(())
    }

    fn run(&mut self) -> Result<(), EngineError> {
        let block = self.loaded.as_deref().ok_or_else(|| EngineError::Computation("sin molécula".into()))?;
        let (atoms, title) = atom_count_of(block)?;
        if title == FAIL_TITLE {
            return Err(EngineError::Computation("fallo simulado".into()));
        }
        self.values = self.names.iter().map(|n| fake_value(n, atoms, self.fingerprint)).collect();
        Ok(())
    }

    fn descriptor_names(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.names.clone())
    }

    fn descriptor_values(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.values.clone())
    }
}

struct MockComposite {
    names: Vec<String>,
}

impl CompositeCalculator for MockComposite {
    fn calculate(&mut self, molblock: &str) -> Result<CompositeValue, EngineError> {
        let (atoms, title) = atom_count_of(molblock)?;
        if title == FAIL_TITLE {
            return Err(EngineError::Computation("fallo simulado".into()));
        }
        Ok(CompositeValue { names: self.names.clone(),
                            values: self.names.iter().map(|n| fake_value(n, atoms, false)).collect() })
    }
}

/// Runtime en proceso simulado.
#[derive(Default)]
pub struct MockRuntime {
    pub replicable: bool,
    pub wrong_shape: bool,
    pub instantiations: AtomicUsize,
}

impl MockRuntime {
    pub fn replicable() -> Self {
        Self { replicable: true,
               ..Self::default() }
    }

    pub fn wrong_shape() -> Self {
        Self { wrong_shape: true,
               ..Self::default() }
    }
}

impl EngineRuntime for MockRuntime {
    fn instantiate(&self, binding: &EngineBinding) -> Result<EngineObject, EngineError> {
        self.instantiations.fetch_add(1, Ordering::SeqCst);
        let (names, fingerprint) =
            columns_for(binding).ok_or_else(|| EngineError::Unsupported(format!("clase desconocida {binding}")))?;
        let shape = match (binding.shape, self.wrong_shape) {
            (shape, false) => shape,
            (CapabilityShape::Direct, true) => CapabilityShape::Composite,
            (CapabilityShape::Composite, true) => CapabilityShape::Direct,
        };
        Ok(match shape {
               CapabilityShape::Direct => EngineObject::Direct(Box::new(MockDirect { names,
                                                                                     fingerprint,
                                                                                     loaded: None,
                                                                                     values: Vec::new() })),
               CapabilityShape::Composite => EngineObject::Composite(Box::new(MockComposite { names })),
           })
    }

    fn is_replicable(&self) -> bool {
        self.replicable
    }
}

/// Emula `java -jar ePaDEL.jar` a partir del catálogo.
#[derive(Default)]
pub struct FakeEpadelRunner {
    pub commands: Mutex<Vec<EngineCommand>>,
    pub inputs: Mutex<Vec<PathBuf>>,
    pub calls: AtomicUsize,
    /// Devuelve una fila de menos en los comandos de valores.
    pub drop_last_row: bool,
    /// Los fingerprints salen con un bit de menos (nombres y valores).
    pub short_fingerprints: bool,
}

impl FakeEpadelRunner {
    pub fn dropping_rows() -> Self {
        Self { drop_last_row: true,
               ..Self::default() }
    }

    pub fn short_fingerprints() -> Self {
        Self { short_fingerprints: true,
               ..Self::default() }
    }

    pub fn commands(&self) -> Vec<EngineCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn inputs(&self) -> Vec<PathBuf> {
        self.inputs.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn columns(command: &EngineCommand) -> Result<(Vec<String>, bool), EngineError> {
        let reg = registry();
        if command.has_flag("-d") {
            let cols = reg.descriptor_columns(command.has_flag("-3D")).into_iter().map(String::from).collect();
            return Ok((cols, false));
        }
        let code = command.flag_value("-f").ok_or_else(|| EngineError::Computation("falta -d o -f".into()))?;
        let mut request = SelectionRequest::new(code);
        if let Some(size) = command.flag_value("-nBits") {
            request = request.with_size(size.parse().map_err(|_| EngineError::Computation("-nBits".into()))?);
        }
        if let Some(depth) = command.flag_value("-searchDepth") {
            request = request.with_search_depth(depth.parse().map_err(|_| EngineError::Computation("-searchDepth".into()))?);
        }
        let sel = reg.resolve(&request).map_err(|e| EngineError::Computation(e.to_string()))?;
        Ok((sel.subcomponents().to_vec(), true))
    }
}

impl CommandRunner for FakeEpadelRunner {
    fn run(&self, command: &EngineCommand) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.commands.lock() {
            log.push(command.clone());
        }
        let (mut names, fingerprint) = Self::columns(command)?;
        if fingerprint && self.short_fingerprints {
            names.pop();
        }
        if command.has_flag("-n") {
            return Ok(names.join(" "));
        }
        let path = command.flag_value("-i").ok_or_else(|| EngineError::Computation("falta -i".into()))?;
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(PathBuf::from(path));
        }
        let sdf = std::fs::read_to_string(path)?;
        let mut lines = Vec::new();
        for record in split_sd_records(&sdf) {
            let (atoms, title) = atom_count_of(&record)?;
            if title == FAIL_TITLE {
                return Err(EngineError::Exit { status: "exit status: 1".into(),
                                               stderr: "java.lang.NullPointerException".into() });
            }
            let row: Vec<String> = names.iter().map(|n| fake_value(n, atoms, fingerprint)).collect();
            lines.push(row.join(" "));
        }
        if self.drop_last_row {
            lines.pop();
        }
        Ok(lines.join("\n"))
    }
}

pub fn launcher() -> EPadelLauncher {
    EPadelLauncher::new("java", vec!["-Xmx1g".into()], "/opt/padel/ePaDEL.jar")
}

pub fn external_adapter(runner: Arc<FakeEpadelRunner>) -> Arc<dyn EngineAdapter> {
    Arc::new(ExternalProcessAdapter::new(launcher(), runner))
}

pub fn in_process_adapter(runtime: MockRuntime) -> Arc<dyn EngineAdapter> {
    Arc::new(InProcessAdapter::new(Arc::new(runtime)))
}

pub fn selection(identifier: &str) -> Selection {
    registry().lookup(identifier).expect("selección de catálogo").clone()
}

// --- Moléculas ---

fn block(title: &str, dim: &str, atoms: &[(&str, f64, f64, f64)], bonds: &[(usize, usize)]) -> String {
    let mut out = format!("{title}\n     fixture        {dim}\n\n");
    out.push_str(&format!("{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000\n", atoms.len(), bonds.len()));
    for (symbol, x, y, z) in atoms {
        out.push_str(&format!("{x:>10.4}{y:>10.4}{z:>10.4} {symbol:<3} 0  0  0  0  0  0  0  0  0  0  0  0\n"));
    }
    for (a, b) in bonds {
        out.push_str(&format!("{a:>3}{b:>3}  1  0\n"));
    }
    out.push_str("M  END\n");
    out
}

/// Cadena lineal de `n` carbonos con coordenadas 2D.
pub fn alkane(n: usize) -> String {
    let atoms: Vec<(&str, f64, f64, f64)> = (0..n).map(|i| ("C", i as f64 * 1.3, (i % 2) as f64 * 0.75, 0.0)).collect();
    let bonds: Vec<(usize, usize)> = (1..n).map(|i| (i, i + 1)).collect();
    block(&format!("C{n}"), "2D", &atoms, &bonds)
}

/// Agua con hidrógenos explícitos y conformero 3D.
pub fn water_3d() -> String {
    block("water",
          "3D",
          &[("O", 0.0, 0.0, 0.1173), ("H", 0.0, 0.7572, -0.4692), ("H", 0.0, -0.7572, -0.4692)],
          &[(1, 2), (1, 3)])
}

/// Molécula sin átomos.
pub fn empty_molecule() -> String {
    block("empty", "2D", &[], &[])
}

/// Estructura válida que el motor simulado no sabe calcular.
pub fn failing_molecule() -> String {
    block(FAIL_TITLE, "2D", &[("C", 0.0, 0.0, 0.0), ("O", 1.2, 0.0, 0.0)], &[(1, 2)])
}

pub fn molecules(n: usize) -> Vec<String> {
    (1..=n).map(alkane).collect()
}

/// Línea de cuentas con un número de enlaces que no cabe en `usize`.
pub fn overflowing_counts_molecule() -> String {
    "bad\n\n\n1 18446744073709551615  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0\nM  END\n".to_string()
}
