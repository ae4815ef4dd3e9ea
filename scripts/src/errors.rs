//! Definitions of errors that can occur while summarizing or verifying a deployment broadcast

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the broadcast scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading a file from disk
    ReadFile(String),
    /// Error writing a file to disk
    WriteFile(String),
    /// Error decoding a JSON document
    JsonParsing(String),
    /// The broadcast document is structurally invalid
    BroadcastFormat(String),
    /// A proxy was deployed pointing at an address that matches no known target
    UnknownProxy(String),
    /// A required configuration value was not provided
    MissingConfig(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// Error spawning an external command, or the command exited unsuccessfully
    CommandExecution(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadFile(s) => write!(f, "error reading file: {}", s),
            ScriptError::WriteFile(s) => write!(f, "error writing file: {}", s),
            ScriptError::JsonParsing(s) => write!(f, "error decoding JSON: {}", s),
            ScriptError::BroadcastFormat(s) => write!(f, "malformed broadcast: {}", s),
            ScriptError::UnknownProxy(s) => write!(f, "unknown proxy address: {}", s),
            ScriptError::MissingConfig(s) => write!(f, "missing configuration: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CommandExecution(s) => write!(f, "error executing command: {}", s),
        }
    }
}

impl Error for ScriptError {}
