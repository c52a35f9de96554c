//! Configuración del motor desde variables de entorno (con `.env` opcional).
//!
//! | Variable                    | Default              |
//! |-----------------------------|----------------------|
//! | `PADEL_ENGINE_MODE`         | `external`           |
//! | `PADEL_JAVA`                | `java`               |
//! | `PADEL_JAVA_OPTS`           | vacío                |
//! | `PADEL_EPADEL_JAR`          | `ePaDEL.jar`         |
//! | `PADEL_CLASSPATH`           | vacío                |
//! | `PADEL_ENGINE_TIMEOUT_SECS` | sin límite           |
//! | `PADEL_NJOBS`               | 1                    |
//! | `PADEL_CHUNKSIZE`           | 100                  |
//!
//! `PADEL_CATALOG_DIR` la lee el registro directamente.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use padel_engine::EPadelLauncher;

use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_NJOBS};
use crate::errors::PadelError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// Runtime embebido (feature `python-bridge`).
    InProcess,
    /// Un proceso ePaDEL por invocación.
    External,
}

impl FromStr for EngineMode {
    type Err = PadelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-process" | "inprocess" | "in_process" => Ok(EngineMode::InProcess),
            "external" | "process" | "subprocess" => Ok(EngineMode::External),
            other => Err(PadelError::Config(format!("PADEL_ENGINE_MODE desconocido: `{other}`"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub mode: EngineMode,
    pub java: String,
    pub java_opts: Vec<String>,
    pub epadel_jar: PathBuf,
    pub classpath: Vec<PathBuf>,
    pub timeout: Option<Duration>,
    pub njobs: usize,
    pub chunksize: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { mode: EngineMode::External,
               java: "java".into(),
               java_opts: Vec::new(),
               epadel_jar: PathBuf::from("ePaDEL.jar"),
               classpath: Vec::new(),
               timeout: None,
               njobs: DEFAULT_NJOBS,
               chunksize: DEFAULT_CHUNK_SIZE }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, PadelError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero leyendo de una función; útil en tests.
    pub fn from_vars<F>(get: F) -> Result<Self, PadelError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = EngineConfig::default();
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mode = var("PADEL_ENGINE_MODE").map(|v| v.parse::<EngineMode>()).transpose()?.unwrap_or(defaults.mode);
        let java = var("PADEL_JAVA").unwrap_or(defaults.java);
        let java_opts: Vec<String> = var("PADEL_JAVA_OPTS").map(|v| v.split_whitespace().map(String::from).collect())
                                                           .unwrap_or_default();
        let epadel_jar = var("PADEL_EPADEL_JAR").map(PathBuf::from).unwrap_or(defaults.epadel_jar);
        let classpath: Vec<PathBuf> = var("PADEL_CLASSPATH").map(|v| env::split_paths(&v).collect()).unwrap_or_default();
        let timeout = parse_number::<u64>(var("PADEL_ENGINE_TIMEOUT_SECS"), "PADEL_ENGINE_TIMEOUT_SECS")?.filter(|s| *s > 0)
                                                                                                     .map(Duration::from_secs);
        let njobs = parse_number(var("PADEL_NJOBS"), "PADEL_NJOBS")?.unwrap_or(defaults.njobs);
        let chunksize = parse_number(var("PADEL_CHUNKSIZE"), "PADEL_CHUNKSIZE")?.unwrap_or(defaults.chunksize);
        if njobs == 0 || chunksize == 0 {
            return Err(PadelError::Config("PADEL_NJOBS y PADEL_CHUNKSIZE deben ser >= 1".into()));
        }

        Ok(Self { mode,
                  java,
                  java_opts,
                  epadel_jar,
                  classpath,
                  timeout,
                  njobs,
                  chunksize })
    }

    pub fn launcher(&self) -> EPadelLauncher {
        EPadelLauncher::new(self.java.clone(), self.java_opts.clone(), self.epadel_jar.clone())
    }
}

fn parse_number<T: FromStr>(raw: Option<String>, key: &str) -> Result<Option<T>, PadelError> {
    raw.map(|v| v.parse::<T>().map_err(|_| PadelError::Config(format!("{key} no es un número: `{v}`"))))
       .transpose()
}
