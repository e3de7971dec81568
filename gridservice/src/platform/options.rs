use std::collections::BTreeMap;
use std::time::Duration;

use basketatlas::protocol::enums::PayloadFormat;
use basketatlas::utils::errors::ParseError;
use serde::{Deserialize, Serialize};

/// Execution options attached to a session and, optionally, to single tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskOptions {
    pub max_duration_secs: u64,
    pub max_retries: u32,
    pub priority: u32,
    pub partition_id: String,
    pub application_name: String,
    pub application_version: String,
    pub application_namespace: String,
    pub options: BTreeMap<String, String>,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            max_duration_secs: 3600,
            max_retries: 3,
            priority: 1,
            partition_id: "default".to_string(),
            application_name: "basket-valuation".to_string(),
            application_version: "1.0".to_string(),
            application_namespace: "finance".to_string(),
            options: BTreeMap::new(),
        }
    }
}

impl TaskOptions {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    pub fn with_partition(mut self, partition_id: impl Into<String>) -> Self {
        self.partition_id = partition_id.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_duration_secs(mut self, secs: u64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    pub fn with_payload_format(mut self, format: PayloadFormat) -> Self {
        self.options
            .insert(PayloadFormat::OPTION_KEY.to_string(), format.tag().to_string());
        self
    }

    /// Format of the payloads of tasks carrying these options. Untagged means `lines/v1`.
    pub fn payload_format(&self) -> Result<PayloadFormat, ParseError> {
        match self.options.get(PayloadFormat::OPTION_KEY) {
            Some(tag) => tag.parse(),
            None => Ok(PayloadFormat::default()),
        }
    }
}
