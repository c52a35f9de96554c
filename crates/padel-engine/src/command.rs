//! Comandos del motor externo (ePaDEL).
//!
//! Por cada selección se lanzan dos comandos: uno que imprime los nombres de
//! columna (`-n`) y otro que imprime una fila de valores por molécula del
//! fichero SD de entrada (`-i`). Ambos escriben en stdout separando por
//! espacios.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::EngineError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Espera máxima a los lectores de pipes tras matar al hijo por timeout.
const READER_GRACE: Duration = Duration::from_millis(500);

/// Línea de comando ya construida (programa + argumentos).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    program: String,
    args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(),
               args: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Valor que sigue a `flag`, si existe.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args.iter().position(|a| a == flag).and_then(|i| self.args.get(i + 1)).map(String::as_str)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Qué calcula una invocación de ePaDEL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTarget {
    /// Conjunto completo de descriptores (`-d`), con 3D opcional.
    Descriptors { three_d: bool },
    /// Un fingerprint (`-f CODE`) con tamaño/profundidad opcionales.
    Fingerprint {
        code: String,
        size: Option<usize>,
        search_depth: Option<usize>,
    },
}

/// Construye las invocaciones `java [opts] -jar ePaDEL.jar ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EPadelLauncher {
    java: String,
    java_opts: Vec<String>,
    jar: PathBuf,
}

impl EPadelLauncher {
    pub fn new(java: impl Into<String>, java_opts: Vec<String>, jar: impl Into<PathBuf>) -> Self {
        Self { java: java.into(),
               java_opts,
               jar: jar.into() }
    }

    pub fn jar(&self) -> &Path {
        &self.jar
    }

    fn base(&self) -> EngineCommand {
        EngineCommand::new(self.java.clone()).args(self.java_opts.iter().cloned())
                                             .arg("-jar")
                                             .arg(self.jar.to_string_lossy().into_owned())
    }

    fn with_target(cmd: EngineCommand, target: &CommandTarget) -> EngineCommand {
        match target {
            CommandTarget::Descriptors { three_d } => {
                let cmd = cmd.arg("-d");
                if *three_d {
                    cmd.arg("-3D")
                } else {
                    cmd
                }
            }
            CommandTarget::Fingerprint { code, size, search_depth } => {
                let mut cmd = cmd.arg("-f").arg(code.clone());
                if let Some(size) = size {
                    cmd = cmd.arg("-nBits").arg(size.to_string());
                }
                if let Some(depth) = search_depth {
                    cmd = cmd.arg("-searchDepth").arg(depth.to_string());
                }
                cmd
            }
        }
    }

    pub fn names_command(&self, target: &CommandTarget) -> EngineCommand {
        Self::with_target(self.base(), target).arg("-n")
    }

    pub fn values_command(&self, target: &CommandTarget, input: &Path) -> EngineCommand {
        Self::with_target(self.base(), target).arg("-i").arg(input.to_string_lossy().into_owned())
    }
}

/// Ejecuta un comando y devuelve su stdout. Sustituible en tests.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &EngineCommand) -> Result<String, EngineError>;
}

/// Runner real basado en `std::process`. Sin `timeout` la espera es
/// ilimitada.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &EngineCommand) -> Result<String, EngineError> {
        debug!("engine:spawn program={} args={:?}", command.program(), command.arguments());
        let mut child = command.to_command()
                               .stdin(Stdio::null())
                               .stdout(Stdio::piped())
                               .stderr(Stdio::piped())
                               .spawn()
                               .map_err(|source| EngineError::Launch { program: command.program().to_string(),
                                                                       source })?;

        // Los pipes se drenan en hilos propios para que un stdout grande no
        // bloquee al hijo mientras esperamos.
        let stdout = child.stdout.take().ok_or_else(|| EngineError::Init("stdout no capturado".into()))?;
        let stderr = child.stderr.take().ok_or_else(|| EngineError::Init("stderr no capturado".into()))?;
        let out_reader = spawn_drain(stdout);
        let err_reader = spawn_drain(stderr);

        let status = match self.timeout {
            None => child.wait()?,
            Some(limit) => match wait_with_deadline(&mut child, limit)? {
                Some(status) => status,
                None => {
                    // Un nieto puede mantener el pipe abierto: no se espera más
                    // de READER_GRACE por cada lector.
                    for (stream, reader) in [("stdout", &out_reader), ("stderr", &err_reader)] {
                        if reader.recv_timeout(READER_GRACE).is_err() {
                            warn!("engine:reader_detached stream={stream} grace={READER_GRACE:?}");
                        }
                    }
                    return Err(EngineError::Timeout(limit));
                }
            },
        };

        let out = out_reader.recv()
                            .map_err(|_| EngineError::Computation("lector de stdout abortó".into()))??;
        let err = err_reader.recv()
                            .map_err(|_| EngineError::Computation("lector de stderr abortó".into()))??;

        if !status.success() {
            return Err(EngineError::Exit { status: status.to_string(),
                                           stderr: err.trim().to_string() });
        }
        Ok(out)
    }
}

fn spawn_drain<R: Read + Send + 'static>(mut reader: R) -> Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = String::new();
        let result = reader.read_to_string(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });
    rx
}

/// `None` si venció el plazo (el hijo ya está muerto y recogido).
fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<Option<ExitStatus>, EngineError> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= limit {
            warn!("engine:timeout pid={} limit={:?}", child.id(), limit);
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
