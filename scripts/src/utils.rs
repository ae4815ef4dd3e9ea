//! Utilities for the broadcast scripts: logging, JSON file IO, and external command execution

use std::{
    fmt::{self, Display},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use itertools::Itertools;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing_subscriber::EnvFilter;

use crate::{
    constants::{DEFAULT_LOG_FILTER, JSON_EXTENSION, SOLIDITY_EXTENSION, SUMMARY_INDENT},
    errors::ScriptError,
    types::{BroadcastRecord, ContractArtifact},
};

/// Install the global tracing subscriber, filtering by `RUST_LOG` and
/// falling back to `info`
pub fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// -----------
// | File IO |
// -----------

/// Read and deserialize a JSON document from the given path
pub fn get_json_from_file<T: DeserializeOwned>(file_path: &Path) -> Result<T, ScriptError> {
    let file_contents = fs::read_to_string(file_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            ScriptError::ReadFile(format!("{} does not exist", file_path.display()))
        }
        _ => ScriptError::ReadFile(format!("{}: {}", file_path.display(), e)),
    })?;

    serde_json::from_str(&file_contents)
        .map_err(|e| ScriptError::JsonParsing(format!("{}: {}", file_path.display(), e)))
}

/// Serialize a value as indented JSON and write it to the given path,
/// overwriting any existing file
pub fn write_json_to_file<T: Serialize>(file_path: &Path, value: &T) -> Result<(), ScriptError> {
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(SUMMARY_INDENT));
    value
        .serialize(&mut serializer)
        .map_err(|e| ScriptError::WriteFile(e.to_string()))?;

    fs::write(file_path, buf)
        .map_err(|e| ScriptError::WriteFile(format!("{}: {}", file_path.display(), e)))
}

/// Read a Foundry broadcast document
pub fn read_broadcast(file_path: &Path) -> Result<BroadcastRecord, ScriptError> {
    get_json_from_file(file_path)
}

/// The path of the compilation artifact for the given contract,
/// i.e. `<artifacts_dir>/<name>.sol/<name>.json`
pub fn artifact_path(artifacts_dir: &Path, contract_name: &str) -> PathBuf {
    artifacts_dir
        .join(format!("{contract_name}.{SOLIDITY_EXTENSION}"))
        .join(format!("{contract_name}.{JSON_EXTENSION}"))
}

/// Read the constructor parameter types of the given contract from its
/// compilation artifact
pub fn read_constructor_types(
    artifacts_dir: &Path,
    contract_name: &str,
) -> Result<Vec<String>, ScriptError> {
    let path = artifact_path(artifacts_dir, contract_name);
    let artifact: ContractArtifact = get_json_from_file(&path).map_err(|e| match e {
        ScriptError::JsonParsing(s) => ScriptError::ArtifactParsing(s),
        e => e,
    })?;

    artifact.constructor_types()
}

// ------------
// | Commands |
// ------------

/// An external command, described as a program and a structured argument list
/// so that no shell ever interprets the arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// The program to execute
    pub program: String,
    /// The arguments to pass, in order
    pub args: Vec<String>,
    /// Environment variables to set for the child process
    pub envs: Vec<(String, String)>,
}

impl ExternalCommand {
    /// Create a command with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

/// Renders the command line, leaving out environment values as they may hold secrets
impl Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.program)
        } else {
            write!(f, "{} {}", self.program, self.args.iter().join(" "))
        }
    }
}

/// The captured result of running an [`ExternalCommand`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the command exited successfully
    pub success: bool,
    /// The exit code, absent if the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Everything the command wrote to stdout
    pub stdout: String,
    /// Everything the command wrote to stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Convert an unsuccessful exit into an error carrying the command's stderr
    pub fn success_or(self, command: &ExternalCommand) -> Result<Self, ScriptError> {
        if self.success {
            return Ok(self);
        }

        let code = self
            .exit_code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        Err(ScriptError::CommandExecution(format!(
            "`{}` exited with {}: {}",
            command,
            code,
            self.stderr.trim()
        )))
    }
}

/// Executes external commands on behalf of the scripts
pub trait CommandRunner {
    /// Run the command to completion, capturing its output
    ///
    /// An error is returned only if the command could not be run at all;
    /// an unsuccessful exit is reported through [`CommandOutput::success`].
    fn run(&mut self, command: &ExternalCommand) -> Result<CommandOutput, ScriptError>;
}

/// Runs commands as blocking child processes of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&mut self, command: &ExternalCommand) -> Result<CommandOutput, ScriptError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null());

        let output = cmd
            .output()
            .map_err(|e| ScriptError::CommandExecution(format!("{}: {}", command.program, e)))?;

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
