//! CLI mínima del binario `padel`.
//!
//! ```text
//! padel list
//! padel calc --sdf <FICHERO> --select <ID>[:size[:depth]] ... [--njobs N]
//!            [--chunksize N] [--keep-3d] [--banner] [--json]
//! ```
//!
//! `njobs` y `chunksize` toman por defecto `PADEL_NJOBS` / `PADEL_CHUNKSIZE`.

use std::path::{Path, PathBuf};

use log::info;
use padel_core::{EngineConfig, PaDEL, PadelError};
use padel_domain::{split_sd_records, Registry, SelectionRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Uso incorrecto: {0}")]
    Usage(String),
    #[error("No se pudo leer {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Padel(#[from] PadelError),
}

impl CliError {
    /// Código de salida del proceso.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Read { .. } => 3,
            CliError::Padel(PadelError::InvalidSelection(_)) | CliError::Padel(PadelError::InvalidArgument(_)) => 2,
            CliError::Padel(_) => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalcArgs {
    pub sdf: PathBuf,
    pub selections: Vec<SelectionRequest>,
    pub njobs: Option<usize>,
    pub chunksize: Option<usize>,
    pub ignore_3d: bool,
    pub banner: bool,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Calc(CalcArgs),
}

pub fn parse_args(args: &[String]) -> Result<Command, CliError> {
    match args.first().map(String::as_str) {
        Some("list") => Ok(Command::List),
        Some("calc") => parse_calc(&args[1..]).map(Command::Calc),
        Some(other) => Err(CliError::Usage(format!("subcomando desconocido `{other}`"))),
        None => Err(CliError::Usage("falta subcomando (list | calc)".into())),
    }
}

fn parse_calc(args: &[String]) -> Result<CalcArgs, CliError> {
    let mut sdf = None;
    let mut calc = CalcArgs { sdf: PathBuf::new(),
                              selections: Vec::new(),
                              njobs: None,
                              chunksize: None,
                              ignore_3d: true,
                              banner: false,
                              json: false };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| CliError::Usage(format!("{flag} necesita un valor")))
        };
        match arg.as_str() {
            "--sdf" => sdf = Some(PathBuf::from(value("--sdf")?)),
            "--select" => calc.selections.push(parse_selection(&value("--select")?)?),
            "--njobs" => calc.njobs = Some(parse_count("--njobs", &value("--njobs")?)?),
            "--chunksize" => calc.chunksize = Some(parse_count("--chunksize", &value("--chunksize")?)?),
            "--keep-3d" => calc.ignore_3d = false,
            "--banner" => calc.banner = true,
            "--json" => calc.json = true,
            other => return Err(CliError::Usage(format!("opción desconocida `{other}`"))),
        }
    }
    calc.sdf = sdf.ok_or_else(|| CliError::Usage("falta --sdf".into()))?;
    if calc.selections.is_empty() {
        return Err(CliError::Usage("al menos un --select".into()));
    }
    Ok(calc)
}

/// `ID`, `ID:size` o `ID:size:depth`.
fn parse_selection(raw: &str) -> Result<SelectionRequest, CliError> {
    let mut parts = raw.split(':');
    let identifier = parts.next().unwrap_or_default();
    if identifier.is_empty() {
        return Err(CliError::Usage(format!("selección vacía `{raw}`")));
    }
    let mut request = SelectionRequest::new(identifier);
    if let Some(size) = parts.next() {
        request = request.with_size(parse_count("size", size)?);
    }
    if let Some(depth) = parts.next() {
        request = request.with_search_depth(parse_count("depth", depth)?);
    }
    if parts.next().is_some() {
        return Err(CliError::Usage(format!("selección mal formada `{raw}`")));
    }
    Ok(request)
}

fn parse_count(flag: &str, raw: &str) -> Result<usize, CliError> {
    raw.parse().map_err(|_| CliError::Usage(format!("{flag}: `{raw}` no es un entero")))
}

/// Lee un fichero SD y devuelve un bloque MOL por registro.
pub fn read_sdf(path: &Path) -> Result<Vec<String>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(),
                                                                               source })?;
    let records = split_sd_records(&text);
    info!("cli:read_sdf path={} records={}", path.display(), records.len());
    Ok(records)
}

/// Identificadores del catálogo, uno por línea, con su anchura.
pub fn list_catalog(registry: &Registry) -> String {
    let mut out = String::new();
    for selection in registry.selections() {
        out.push_str(&format!("{}\t{}\t{}\t{}\n",
                              selection.identifier(),
                              selection.name(),
                              if selection.is_fingerprint() { "fingerprint" } else { "descriptor" },
                              selection.subcomponents().len()));
    }
    out
}

/// Ejecuta `calc` y devuelve la tabla ya serializada.
pub fn run_calc(args: &CalcArgs, config: &EngineConfig) -> Result<String, CliError> {
    let molecules = read_sdf(&args.sdf)?;
    let padel = PaDEL::new(args.selections.iter().cloned(), args.ignore_3d)?;
    let table = padel.calculate(&molecules,
                                args.banner,
                                args.njobs.unwrap_or(config.njobs),
                                args.chunksize.unwrap_or(config.chunksize))?;
    if args.json {
        Ok(table.to_json()?)
    } else {
        Ok(table.to_tsv())
    }
}
