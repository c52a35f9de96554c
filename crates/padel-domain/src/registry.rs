//! Registro de descriptores y fingerprints.
//!
//! Los nombres de columna y las descripciones viven en dos TSV embebidos
//! (`catalog/descriptors.tsv`, `catalog/fingerprints.tsv`) que pueden
//! sustituirse en tiempo de ejecución con `PADEL_CATALOG_DIR`. Lo que no es
//! dato (clase del motor, argumentos, forma de la API, 3D) está fijado en las
//! tablas de este módulo.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use padel_engine::{CapabilityShape, EngineBinding};
use serde::Serialize;

use crate::selection::{FingerprintParams, Selection, SelectionKind, SelectionOrigin, SelectionRequest};
use crate::DomainError;

const EMBEDDED_DESCRIPTORS: &str = include_str!("../catalog/descriptors.tsv");
const EMBEDDED_FINGERPRINTS: &str = include_str!("../catalog/fingerprints.tsv");

pub const CATALOG_DIR_VAR: &str = "PADEL_CATALOG_DIR";

const PADEL_PACKAGE: &str = "libpadeldescriptor";
const EPADEL_PACKAGE: &str = "extendedlibpadeldescriptor";

/// Cómo se instancian las clases de un grupo.
enum Classes {
    /// `libpadeldescriptor.CDK_<grupo>Descriptor()`
    Cdk,
    /// Una o varias clases CDK con argumentos propios.
    Custom(&'static [(&'static str, &'static [&'static str])]),
    /// Descriptor propio de PaDEL con `calculate(...)`.
    Composite(&'static str),
}

struct GroupSpec {
    id: &'static str,
    is_3d: bool,
    classes: Classes,
}

const fn group(id: &'static str, is_3d: bool, classes: Classes) -> GroupSpec {
    GroupSpec { id, is_3d, classes }
}

const ATOM_COUNT: &[(&str, &[&str])] = &[("CDK_AtomCountDescriptor", &["*"]),
                                         ("CDK_HeavyAtomCountDescriptor", &[]),
                                         ("CDK_AtomCountDescriptor", &["H"]),
                                         ("CDK_AtomCountDescriptor", &["B"]),
                                         ("CDK_AtomCountDescriptor", &["C"]),
                                         ("CDK_AtomCountDescriptor", &["N"]),
                                         ("CDK_AtomCountDescriptor", &["O"]),
                                         ("CDK_AtomCountDescriptor", &["S"]),
                                         ("CDK_AtomCountDescriptor", &["P"]),
                                         ("CDK_AtomCountDescriptor", &["F"]),
                                         ("CDK_AtomCountDescriptor", &["Cl"]),
                                         ("CDK_AtomCountDescriptor", &["Br"]),
                                         ("CDK_AtomCountDescriptor", &["I"]),
                                         ("CDK_HalogenCountDescriptor", &[])];

const XLOGP: &[(&str, &[&str])] = &[("CDK_XLogPDescriptor", &["false", "true"])];

// El identificador del grupo no coincide con el nombre de la clase.
const ESTATE_ATOM_TYPE: &[(&str, &[&str])] = &[("CDK_EStateAtomTypeDescriptor", &[])];

// Orden = orden de emisión de ePaDEL.
const DESCRIPTOR_GROUPS: &[GroupSpec] = &[group("AcidicGroupCount", false, Classes::Cdk),
                                          group("ALOGP", false, Classes::Cdk),
                                          group("APol", false, Classes::Cdk),
                                          group("AromaticAtomsCount", false, Classes::Cdk),
                                          group("AromaticBondsCount", false, Classes::Cdk),
                                          group("AtomCount", false, Classes::Custom(ATOM_COUNT)),
                                          group("Autocorrelation", false, Classes::Cdk),
                                          group("BaryszMatrix", false, Classes::Composite("BaryszMatrixDescriptor")),
                                          group("BasicGroupCount", false, Classes::Cdk),
                                          group("BCUT", false, Classes::Cdk),
                                          group("BondCount", false, Classes::Cdk),
                                          group("BPol", false, Classes::Cdk),
                                          group("BurdenModifiedEigenvalues", false, Classes::Cdk),
                                          group("CarbonTypes", false, Classes::Cdk),
                                          group("ChiChain", false, Classes::Cdk),
                                          group("ChiCluster", false, Classes::Cdk),
                                          group("ChiPathCluster", false, Classes::Cdk),
                                          group("ChiPath", false, Classes::Cdk),
                                          group("Constitutional", false, Classes::Cdk),
                                          group("Crippen", false, Classes::Cdk),
                                          group("DetourMatrix", false, Classes::Cdk),
                                          group("EccentricConnectivityIndex", false, Classes::Cdk),
                                          group("ElectrotopologicalStateAtomType", false, Classes::Custom(ESTATE_ATOM_TYPE)),
                                          group("ExtendedTopochemicalAtom", false, Classes::Cdk),
                                          group("FMF", false, Classes::Cdk),
                                          group("FragmentComplexity", false, Classes::Cdk),
                                          group("HBondAcceptorCount", false, Classes::Cdk),
                                          group("HBondDonorCount", false, Classes::Cdk),
                                          group("HybridizationRatio", false, Classes::Cdk),
                                          group("InformationContent", false, Classes::Cdk),
                                          group("KappaShapeIndices", false, Classes::Cdk),
                                          group("LargestChain", false, Classes::Cdk),
                                          group("LargestPiSystem", false, Classes::Cdk),
                                          group("LongestAliphaticChain", false, Classes::Cdk),
                                          group("MannholdLogP", false, Classes::Cdk),
                                          group("McGowanVolume", false, Classes::Cdk),
                                          group("MDE", false, Classes::Cdk),
                                          group("MLFER", false, Classes::Cdk),
                                          group("PathCount", false, Classes::Cdk),
                                          group("PetitjeanNumber", false, Classes::Cdk),
                                          group("RingCount", false, Classes::Cdk),
                                          group("RotatableBondsCount", false, Classes::Cdk),
                                          group("RuleOfFive", false, Classes::Cdk),
                                          group("Topological", false, Classes::Cdk),
                                          group("TopologicalCharge", false, Classes::Cdk),
                                          group("TopologicalDistanceMatrix", false, Classes::Cdk),
                                          group("TPSA", false, Classes::Cdk),
                                          group("VABC", false, Classes::Cdk),
                                          group("VAdjMa", false, Classes::Cdk),
                                          group("WalkCount", false, Classes::Cdk),
                                          group("Weight", false, Classes::Cdk),
                                          group("WeightedPath", false, Classes::Cdk),
                                          group("WienerNumbers", false, Classes::Cdk),
                                          group("XLogP", false, Classes::Custom(XLOGP)),
                                          group("ZagrebIndex", false, Classes::Cdk),
                                          group("Autocorrelation3D", true, Classes::Cdk),
                                          group("CPSA", true, Classes::Cdk),
                                          group("GravitationalIndex", true, Classes::Cdk),
                                          group("LengthOverBreadth", true, Classes::Cdk),
                                          group("MomentOfInertia", true, Classes::Cdk),
                                          group("PetitjeanShapeIndex", true, Classes::Cdk),
                                          group("RDF", true, Classes::Cdk),
                                          group("WHIM", true, Classes::Cdk)];

struct FingerprintSpec {
    code: &'static str,
    class: &'static str,
    configurable: bool,
}

const fn fp(code: &'static str, class: &'static str, configurable: bool) -> FingerprintSpec {
    FingerprintSpec { code, class, configurable }
}

const FINGERPRINTS: &[FingerprintSpec] = &[fp("FP", "eCDK_Fingerprinter", true),
                                           fp("ExtFP", "eCDK_ExtendedFingerprinter", false),
                                           fp("EStateFP", "eCDK_EStateFingerprinter", false),
                                           fp("GraphFP", "eCDK_GraphOnlyFingerprinter", true),
                                           fp("MACCSFP", "eCDK_MACCSFingerprinter", false),
                                           fp("PubchemFP", "eCDK_PubchemFingerprinter", false),
                                           fp("SubFP", "eCDK_SubstructureFingerprinter", false),
                                           fp("SubFPC", "eCDK_SubstructureFingerprintCount", false),
                                           fp("KRFP", "eCDK_KlekotaRothFingerprinter", false),
                                           fp("KRFPC", "eCDK_KlekotaRothFingerprintCount", false),
                                           fp("AP2DFP", "eCDK_AtomPairs2DFingerprinter", false),
                                           fp("AP2DFPC", "eCDK_AtomPairs2DFingerprintCount", false)];

/// Fila del TSV de fingerprints que se conserva para resolver peticiones
/// configuradas.
#[derive(Debug, Clone)]
struct FingerprintEntry {
    bit_prefix: String,
    first_bit: usize,
    configurable: bool,
    class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogSource {
    Embedded,
    Directory(PathBuf),
}

/// Catálogo inmutable. `Registry::global()` lo carga una vez por proceso.
#[derive(Debug)]
pub struct Registry {
    selections: IndexMap<String, Selection>,
    aliases: IndexMap<String, String>,
    fingerprints: IndexMap<String, FingerprintEntry>,
    descriptions: IndexMap<String, String>,
    source: CatalogSource,
}

static GLOBAL: OnceCell<Registry> = OnceCell::new();

impl Registry {
    /// Registro del proceso. Usa `PADEL_CATALOG_DIR` si está definida, si no
    /// el catálogo embebido.
    pub fn global() -> Result<&'static Registry, DomainError> {
        GLOBAL.get_or_try_init(|| {
                  let registry = match std::env::var(CATALOG_DIR_VAR) {
                      Ok(dir) if !dir.trim().is_empty() => Registry::from_dir(Path::new(dir.trim()))?,
                      _ => Registry::embedded()?,
                  };
                  info!("registry:loaded source={:?} selections={}",
                        registry.source,
                        registry.selections.len());
                  Ok(registry)
              })
    }

    pub fn embedded() -> Result<Registry, DomainError> {
        Registry::from_tsv(EMBEDDED_DESCRIPTORS, EMBEDDED_FINGERPRINTS)
    }

    pub fn from_dir(dir: &Path) -> Result<Registry, DomainError> {
        let descriptors = fs::read_to_string(dir.join("descriptors.tsv"))?;
        let fingerprints = fs::read_to_string(dir.join("fingerprints.tsv"))?;
        let mut registry = Registry::from_tsv(&descriptors, &fingerprints)?;
        registry.source = CatalogSource::Directory(dir.to_path_buf());
        Ok(registry)
    }

    pub fn from_tsv(descriptors: &str, fingerprints: &str) -> Result<Registry, DomainError> {
        let mut registry = Registry { selections: IndexMap::new(),
                                      aliases: IndexMap::new(),
                                      fingerprints: IndexMap::new(),
                                      descriptions: IndexMap::new(),
                                      source: CatalogSource::Embedded };
        registry.load_descriptors(descriptors)?;
        registry.load_fingerprints(fingerprints)?;
        Ok(registry)
    }

    fn load_descriptors(&mut self, tsv: &str) -> Result<(), DomainError> {
        let mut columns: IndexMap<String, Vec<(String, String)>> = IndexMap::new();
        for (line_no, fields) in tsv_rows(tsv, 3)? {
            let [group_id, name, description] = [fields[0], fields[1], fields[2]];
            if self.descriptions.insert(name.to_string(), description.to_string()).is_some() {
                return Err(DomainError::Catalog(format!("columna duplicada `{name}` (línea {line_no})")));
            }
            columns.entry(group_id.to_string())
                   .or_default()
                   .push((name.to_string(), description.to_string()));
        }

        for spec in DESCRIPTOR_GROUPS {
            let Some(rows) = columns.shift_remove(spec.id) else {
                debug!("registry:group_without_columns group={}", spec.id);
                continue;
            };
            let (bindings, shape) = descriptor_bindings(spec);
            let names = rows.into_iter().map(|(name, _)| name).collect();
            let selection = Selection::new(SelectionKind::Descriptor,
                                           spec.id,
                                           spec.id,
                                           spec.is_3d,
                                           names,
                                           None,
                                           None,
                                           SelectionOrigin::Catalog,
                                           shape,
                                           bindings);
            self.selections.insert(spec.id.to_string(), selection);
        }
        for unknown in columns.keys() {
            warn!("registry:unknown_group group={unknown} (sin clase del motor, se ignora)");
        }
        Ok(())
    }

    fn load_fingerprints(&mut self, tsv: &str) -> Result<(), DomainError> {
        for (line_no, fields) in tsv_rows(tsv, 6)? {
            let [long_name, code, fixed, prefix, first, description] =
                [fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]];
            let Some(spec) = FINGERPRINTS.iter().find(|s| s.code == code) else {
                warn!("registry:unknown_fingerprint code={code} (sin clase del motor, se ignora)");
                continue;
            };
            let first_bit = match first {
                "0" => 0,
                "1" => 1,
                other => {
                    return Err(DomainError::Catalog(format!("primer bit `{other}` inválido (línea {line_no})")));
                }
            };
            let fixed_width = match fixed {
                "-" => None,
                n => Some(n.parse::<usize>()
                           .map_err(|_| DomainError::Catalog(format!("tamaño `{n}` inválido (línea {line_no})")))?),
            };
            if fixed_width.is_none() && !spec.configurable {
                return Err(DomainError::Catalog(format!("{code} necesita tamaño fijo (línea {line_no})")));
            }
            let entry = FingerprintEntry { bit_prefix: prefix.to_string(),
                                           first_bit,
                                           configurable: spec.configurable,
                                           class: format!("{EPADEL_PACKAGE}.{}", spec.class) };
            let params = spec.configurable.then(FingerprintParams::default);
            let width = fixed_width.or(params.map(|p| p.size)).unwrap_or_default();
            let selection = fingerprint_selection(long_name, code, &entry, width, params, SelectionOrigin::Catalog);

            self.descriptions.insert(code.to_string(), description.to_string());
            self.fingerprints.insert(long_name.to_string(), entry);
            self.aliases.insert(code.to_string(), long_name.to_string());
            self.selections.insert(long_name.to_string(), selection);
        }
        Ok(())
    }

    fn canonical<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.aliases.get(identifier).map(String::as_str).unwrap_or(identifier)
    }

    /// Metadatos de catálogo para un identificador (grupo de descriptores,
    /// nombre largo o corto de fingerprint).
    pub fn lookup(&self, identifier: &str) -> Result<&Selection, DomainError> {
        self.selections
            .get(self.canonical(identifier))
            .ok_or_else(|| DomainError::UnknownIdentifier(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.selections.contains_key(self.canonical(identifier))
    }

    /// Resuelve una petición. Con parámetros, el fingerprint pasa a ser una
    /// instancia configurada con sus propios bits.
    pub fn resolve(&self, request: &SelectionRequest) -> Result<Selection, DomainError> {
        let base = self.lookup(&request.identifier)?;
        let Some(params) = request.params else {
            return Ok(base.clone());
        };
        if !base.is_fingerprint() {
            return Err(DomainError::InvalidSelection(format!("{} es un descriptor y no admite parámetros",
                                                             base.identifier())));
        }
        let entry = self.fingerprints
                        .get(base.identifier())
                        .ok_or_else(|| DomainError::UnknownIdentifier(request.identifier.clone()))?;
        if !entry.configurable {
            warn!("registry:params_ignored fingerprint={} size={} search_depth={} (tamaño fijo)",
                  base.name(),
                  params.size,
                  params.search_depth);
            return Ok(base.clone());
        }
        if params.size == 0 || params.search_depth == 0 {
            return Err(DomainError::InvalidSelection(format!("{}: size y searchDepth deben ser >= 1", base.name())));
        }
        Ok(fingerprint_selection(base.identifier(),
                                 base.name(),
                                 entry,
                                 params.size,
                                 Some(params),
                                 SelectionOrigin::Configured))
    }

    pub fn selections(&self) -> impl Iterator<Item = &Selection> {
        self.selections.values()
    }

    pub fn descriptor_identifiers(&self) -> Vec<&str> {
        self.selections().filter(|s| !s.is_fingerprint()).map(Selection::identifier).collect()
    }

    pub fn fingerprint_identifiers(&self) -> Vec<&str> {
        self.selections().filter(|s| s.is_fingerprint()).map(Selection::identifier).collect()
    }

    /// Todas las columnas de descriptores en orden de emisión; las 3D sólo si
    /// `three_d`.
    pub fn descriptor_columns(&self, three_d: bool) -> Vec<&str> {
        self.selections()
            .filter(|s| !s.is_fingerprint() && (three_d || !s.is_3d()))
            .flat_map(|s| s.subcomponents().iter().map(String::as_str))
            .collect()
    }

    /// Descripción de una columna de descriptor o de un fingerprint (por
    /// nombre corto).
    pub fn describe(&self, name: &str) -> Option<&str> {
        self.descriptions.get(name).map(String::as_str)
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }
}

fn descriptor_bindings(spec: &GroupSpec) -> (Vec<EngineBinding>, CapabilityShape) {
    match spec.classes {
        Classes::Cdk => {
            let class = format!("{PADEL_PACKAGE}.CDK_{}Descriptor", spec.id);
            (vec![EngineBinding::new(class, CapabilityShape::Direct)], CapabilityShape::Direct)
        }
        Classes::Custom(classes) => {
            let bindings = classes.iter()
                                  .map(|(class, args)| {
                                      EngineBinding::new(format!("{PADEL_PACKAGE}.{class}"), CapabilityShape::Direct)
                                          .with_args(args.iter().copied())
                                  })
                                  .collect();
            (bindings, CapabilityShape::Direct)
        }
        Classes::Composite(class) => {
            let binding = EngineBinding::new(format!("{PADEL_PACKAGE}.{class}"), CapabilityShape::Composite);
            (vec![binding], CapabilityShape::Composite)
        }
    }
}

fn fingerprint_selection(long_name: &str,
                         code: &str,
                         entry: &FingerprintEntry,
                         width: usize,
                         params: Option<FingerprintParams>,
                         origin: SelectionOrigin)
                         -> Selection {
    let bits = (entry.first_bit..entry.first_bit + width).map(|i| format!("{}{}", entry.bit_prefix, i))
                                                        .collect();
    let mut binding = EngineBinding::new(entry.class.clone(), CapabilityShape::Direct);
    if let (SelectionOrigin::Configured, Some(p)) = (origin, params) {
        binding = binding.with_args([p.size.to_string(), p.search_depth.to_string()]);
    }
    Selection::new(SelectionKind::Fingerprint,
                   long_name,
                   code,
                   false,
                   bits,
                   Some(width),
                   params,
                   origin,
                   CapabilityShape::Direct,
                   vec![binding])
}

/// Filas de datos de un TSV con cabecera: (número de línea, campos).
fn tsv_rows(tsv: &str, width: usize) -> Result<Vec<(usize, Vec<&str>)>, DomainError> {
    let mut rows = Vec::new();
    for (i, line) in tsv.lines().enumerate().skip(1) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != width {
            return Err(DomainError::Catalog(format!("línea {}: se esperaban {width} campos, hay {}",
                                                    i + 1,
                                                    fields.len())));
        }
        rows.push((i + 1, fields));
    }
    Ok(rows)
}
