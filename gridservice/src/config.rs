use std::fs;
use std::path::Path;

use basketatlas::core::{asset::Asset, request::SimulationRequest};
use basketatlas::protocol::enums::PayloadFormat;
use serde::{Deserialize, Serialize};

use crate::driver::DEFAULT_CHUNK_SIZE;
use crate::errors::{Result, ServiceError};
use crate::platform::options::TaskOptions;

/// Settings of a valuation run, read from a JSON document. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub task_options: TaskOptions,
    pub chunk_size: usize,
    /// Worker threads of the in-process platform; 0 picks one per core.
    pub worker_threads: usize,
    pub payload_format: PayloadFormat,
    pub request: SimulationRequest,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            task_options: TaskOptions::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            worker_threads: 0,
            payload_format: PayloadFormat::default(),
            request: SimulationRequest::new(
                vec![
                    Asset::new("AAPL", 180.0, 0.25, 0.4),
                    Asset::new("MSFT", 350.0, 0.20, 0.3),
                    Asset::new("GOOGL", 140.0, 0.28, 0.3),
                ],
                0.05,
                1.0,
                10_000,
            ),
        }
    }
}

impl ServiceConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ServiceConfig = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn check(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ServiceError::Config("chunk_size must be positive".to_string()));
        }
        if self.task_options.partition_id.is_empty() {
            return Err(ServiceError::Config("partition_id must not be empty".to_string()));
        }
        Ok(())
    }
}
