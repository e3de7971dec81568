use std::sync::Arc;

use basketatlas::core::request::SimulationRequest;
use basketatlas::core::results::SimulationResult;
use basketatlas::math::normalsource::{NormalSource, StandardNormalSource};
use basketatlas::models::basketsimulator::BasketSimulator;
use basketatlas::protocol::traits::codec_for;
use basketatlas::utils::errors::{BasketError, ParseError};
use thiserror::Error;
use tracing::{debug, error};

use crate::platform::options::TaskOptions;

/// Failed task status, carried back to the platform as a readable message.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct TaskFailure {
    message: String,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<BasketError> for TaskFailure {
    fn from(e: BasketError) -> Self {
        TaskFailure::new(e.to_string())
    }
}

impl From<ParseError> for TaskFailure {
    fn from(e: ParseError) -> Self {
        BasketError::from(e).into()
    }
}

/// Executes one task: payload bytes in, result bytes or a failure status out.
pub trait TaskProcessor: Send + Sync {
    fn process(&self, payload: &[u8], options: &TaskOptions) -> Result<Vec<u8>, TaskFailure>;
}

/// Builds the random source for one task execution.
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn NormalSource> + Send + Sync>;

/// Prices one chunk of a basket request.
pub struct BasketWorker {
    simulator: BasketSimulator,
    sources: SourceFactory,
}

impl Default for BasketWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl BasketWorker {
    /// Every execution draws from a generator freshly seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_source_factory(Arc::new(|| {
            Box::new(StandardNormalSource::from_entropy()) as Box<dyn NormalSource>
        }))
    }

    pub fn with_source_factory(sources: SourceFactory) -> Self {
        Self {
            simulator: BasketSimulator::new(),
            sources,
        }
    }

    pub fn execute(
        &self,
        request: &SimulationRequest,
    ) -> basketatlas::utils::errors::Result<SimulationResult> {
        let mut source = (self.sources)();
        self.simulator.simulate_request(request, &mut source)
    }
}

impl TaskProcessor for BasketWorker {
    fn process(&self, payload: &[u8], options: &TaskOptions) -> Result<Vec<u8>, TaskFailure> {
        let outcome = options
            .payload_format()
            .map(codec_for)
            .and_then(|codec| codec.decode(payload))
            .map_err(BasketError::from)
            .and_then(|request| {
                debug!(
                    assets = request.basket().len(),
                    paths = request.num_simulations(),
                    "decoded chunk request"
                );
                self.execute(&request)
            });

        match outcome {
            Ok(result) => Ok(result.to_token()),
            Err(e) => {
                error!(error = %e, "error during task computing");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basketatlas::core::asset::Asset;
    use basketatlas::protocol::{enums::PayloadFormat, jsoncodec::JsonCodec, traits::PayloadCodec};

    struct Zero;

    impl NormalSource for Zero {
        fn next_normal(&mut self) -> f64 {
            0.0
        }
    }

    fn zero_worker() -> BasketWorker {
        BasketWorker::with_source_factory(Arc::new(|| Box::new(Zero) as Box<dyn NormalSource>))
    }

    #[test]
    fn test_process_line_payload() {
        let token = zero_worker()
            .process(b"0.05,1.0,10\nX,100,0.2,1.0", &TaskOptions::default())
            .unwrap();
        let result = SimulationResult::from_token(&token).unwrap();
        assert!((result.value() - 100.0 * (-0.02_f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_process_json_payload() {
        let request = SimulationRequest::new(vec![Asset::new("X", 100.0, 0.2, 1.0)], 0.05, 1.0, 10);
        let payload = JsonCodec.encode(&request);
        let options = TaskOptions::default().with_payload_format(PayloadFormat::JsonV1);
        let token = zero_worker().process(&payload, &options).unwrap();
        assert!(SimulationResult::from_token(&token).is_ok());
    }

    #[test]
    fn test_parse_error_becomes_failure() {
        let failure = zero_worker()
            .process(b"0.05,1.0\nAAPL,180,0.25,0.4", &TaskOptions::default())
            .unwrap_err();
        assert!(failure.message().contains("line 1"), "{}", failure);
    }

    #[test]
    fn test_validation_error_becomes_failure() {
        let failure = zero_worker()
            .process(b"0.05,1.0,10\nX,100,0.2,0.5\nY,100,0.2,0.4", &TaskOptions::default())
            .unwrap_err();
        assert!(failure.message().contains("weights do not sum to one"), "{}", failure);
    }

    #[test]
    fn test_unknown_format_tag() {
        let mut options = TaskOptions::default();
        options
            .options
            .insert("payload_format".to_string(), "binary/v0".to_string());
        let failure = zero_worker()
            .process(b"0.05,1.0,10\nX,100,0.2,1.0", &options)
            .unwrap_err();
        assert!(failure.message().contains("binary/v0"));
    }

    #[test]
    fn test_entropy_worker_runs() {
        let request = SimulationRequest::new(vec![Asset::new("X", 100.0, 1e-6, 1.0)], 0.0, 1.0, 1_000);
        let result = BasketWorker::new().execute(&request).unwrap();
        assert!((result.value() - 100.0).abs() < 0.5);
    }
}
