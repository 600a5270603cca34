//! Weave Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Weave crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the project file looked up by default
pub const PROJECT_FILE: &str = "weave.json";

/// Project file (`weave.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root module identifier; read from `go.mod` when absent
    pub module: Option<String>,
    /// Directory holding standard-library sources
    pub std: Option<String>,
    /// Module prefix -> directory, relative to the project root
    pub dependencies: BTreeMap<String, String>,
    /// Default hoisting mode for targets that don't set one
    pub hoist: bool,
    /// Log level: "silent", "error", "warn", "info", "debug", "trace"
    pub log: Option<String>,
    /// Providers to generate
    pub targets: Vec<TargetConfig>,
}

/// A single provider to generate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Generated function name
    pub name: String,
    /// Module the generated file belongs to
    pub module: String,
    /// Output file, relative to the project root
    pub output: Option<String>,
    /// Caller-supplied types, e.g. `"*net/http.Request"`
    pub params: Vec<String>,
    /// Requested types, e.g. `"*example.com/app/web.Web"`
    pub results: Vec<String>,
    /// Type substitutions: from -> to
    pub aliases: BTreeMap<String, String>,
    /// Overrides the project-wide hoisting mode
    pub hoist: Option<bool>,
}

impl ProjectConfig {
    /// Parse a project file from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Hoisting mode for a target
    pub fn hoist_for(&self, target: &TargetConfig) -> bool {
        target.hoist.unwrap_or(self.hoist)
    }
}

/// Log level vocabulary shared by the API and CLI
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name; "silent" maps to `Error`
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "silent" | "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Resolution phase enum for phase-specific log filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Parser,
    Finder,
    Loader,
    Hoist,
    Generator,
}

impl Phase {
    /// All phases, in pipeline order
    pub const ALL: [Phase; 5] = [
        Phase::Parser,
        Phase::Finder,
        Phase::Loader,
        Phase::Hoist,
        Phase::Generator,
    ];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parser => "parser",
            Phase::Finder => "finder",
            Phase::Loader => "loader",
            Phase::Hoist => "hoist",
            Phase::Generator => "generator",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("weave::{}", self.as_str())
    }
}
