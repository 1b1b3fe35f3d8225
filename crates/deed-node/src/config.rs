//! # Node Configuration

use std::path::PathBuf;

use deed_telemetry::TelemetryConfig;
use dr_title_registry::WorkflowConfig;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "./deed-data";

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Directory holding roles.json, audit.jsonl and the lock file.
    pub data_dir: PathBuf,
    /// Workflow validation limits.
    pub workflow: WorkflowConfig,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            workflow: WorkflowConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl NodeConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryConfig) -> Self {
        self.telemetry = telemetry;
        self
    }
}
