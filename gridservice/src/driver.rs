use basketatlas::core::request::SimulationRequest;
use basketatlas::core::results::{AggregateResult, SimulationResult};
use basketatlas::distribution::resultaggregator::{aggregate, ChunkResult};
use basketatlas::distribution::taskpartitioner::{partition, TaskChunk};
use basketatlas::protocol::enums::PayloadFormat;
use basketatlas::protocol::traits::codec_for;
use tracing::{debug, error, info};

use crate::errors::{ChunkFailure, ChunkFailures, PlatformError, Result, ServiceError};
use crate::platform::options::TaskOptions;
use crate::platform::traits::{SessionId, SlotId, TaskPlatform, TaskSubmission};

pub const DEFAULT_CHUNK_SIZE: usize = 1_000;

/// Outcome of one distributed valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverReport {
    session: SessionId,
    num_chunks: usize,
    aggregate: AggregateResult,
}

impl DriverReport {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn num_chunks(&self) -> usize {
        self.num_chunks
    }

    pub fn aggregate(&self) -> AggregateResult {
        self.aggregate
    }

    pub fn value(&self) -> f64 {
        self.aggregate.value()
    }

    pub fn num_simulations(&self) -> usize {
        self.aggregate.num_simulations()
    }
}

/// Splits a request into chunks, runs one platform task per chunk and combines the
/// chunk values once every output is available.
pub struct Driver<'a, P: TaskPlatform + ?Sized> {
    platform: &'a P,
    options: TaskOptions,
    chunk_size: usize,
    format: PayloadFormat,
}

impl<'a, P: TaskPlatform + ?Sized> Driver<'a, P> {
    pub fn new(platform: &'a P, options: TaskOptions) -> Self {
        Self {
            platform,
            options,
            chunk_size: DEFAULT_CHUNK_SIZE,
            format: PayloadFormat::default(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    pub fn run(&self, request: &SimulationRequest) -> Result<DriverReport> {
        let codec = codec_for(self.format);
        let chunks = partition(request, self.chunk_size)?;
        let options = self.options.clone().with_payload_format(self.format);

        let session = self.platform.create_session(&options)?;
        info!(
            session = %session,
            chunks = chunks.len(),
            paths = request.num_simulations(),
            format = %self.format,
            "starting basket valuation"
        );

        let names: Vec<String> = chunks
            .iter()
            .flat_map(|c| [c.payload_slot_name(), c.output_slot_name()])
            .collect();
        let slots = self.platform.create_slots(&session, &names)?;
        if slots.len() != names.len() {
            return Err(PlatformError::Rejected(format!(
                "asked for {} slots, got {}",
                names.len(),
                slots.len()
            ))
            .into());
        }

        let mut submissions = Vec::with_capacity(chunks.len());
        let mut outputs = Vec::with_capacity(chunks.len());
        for (chunk, pair) in chunks.iter().zip(slots.chunks_exact(2)) {
            let (payload_slot, output_slot) = (pair[0].clone(), pair[1].clone());
            self.platform
                .upload(&session, &payload_slot, codec.encode(chunk.request()))?;
            submissions.push(TaskSubmission::new(payload_slot, output_slot.clone()));
            outputs.push(output_slot);
        }
        info!(session = %session, "uploaded payloads");

        let tasks = self.platform.submit_tasks(&session, submissions)?;
        info!(session = %session, tasks = tasks.len(), "submitted tasks, waiting for results");

        self.platform.wait_for_slots(&session, &outputs)?;
        info!(session = %session, "all chunk outputs available");

        let mut results = Vec::with_capacity(chunks.len());
        let mut failures = Vec::new();
        for (chunk, slot) in chunks.iter().zip(&outputs) {
            match self.fetch_chunk(&session, chunk, slot) {
                Ok(result) => results.push(result),
                Err(message) => failures.push(ChunkFailure {
                    index: chunk.index(),
                    message,
                }),
            }
        }

        if !failures.is_empty() {
            let failures = ChunkFailures(failures);
            error!(session = %session, %failures, "basket valuation failed");
            return Err(ServiceError::ChunksFailed(failures));
        }

        let aggregate = aggregate(results)?;
        info!(
            session = %session,
            value = %aggregate,
            paths = aggregate.num_simulations(),
            "basket valuation complete"
        );
        Ok(DriverReport {
            session,
            num_chunks: chunks.len(),
            aggregate,
        })
    }

    fn fetch_chunk(
        &self,
        session: &SessionId,
        chunk: &TaskChunk,
        slot: &SlotId,
    ) -> std::result::Result<ChunkResult, String> {
        let token = self
            .platform
            .download(session, slot)
            .map_err(|e| match e {
                PlatformError::TaskFailed { message, .. } => message,
                other => other.to_string(),
            })?;
        let result = SimulationResult::from_token(&token).map_err(|e| e.to_string())?;
        debug!(chunk = chunk.index(), value = result.value(), "decoded chunk result");
        Ok(ChunkResult::new(result, chunk.num_simulations()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use basketatlas::core::asset::Asset;

    /// Platform that answers every task with a fixed token per chunk index.
    struct ScriptedPlatform {
        tokens: Vec<std::result::Result<&'static str, &'static str>>,
        uploads: RefCell<Vec<Vec<u8>>>,
        slot_names: RefCell<Vec<String>>,
    }

    impl ScriptedPlatform {
        fn new(tokens: Vec<std::result::Result<&'static str, &'static str>>) -> Self {
            Self {
                tokens,
                uploads: RefCell::new(Vec::new()),
                slot_names: RefCell::new(Vec::new()),
            }
        }
    }

    impl TaskPlatform for ScriptedPlatform {
        fn create_session(&self, _options: &TaskOptions) -> std::result::Result<SessionId, PlatformError> {
            Ok(SessionId::new("s"))
        }

        fn create_slots(
            &self,
            _session: &SessionId,
            names: &[String],
        ) -> std::result::Result<Vec<SlotId>, PlatformError> {
            self.slot_names.borrow_mut().extend(names.iter().cloned());
            Ok(names.iter().map(|n| SlotId::new(n.clone())).collect())
        }

        fn upload(
            &self,
            _session: &SessionId,
            _slot: &SlotId,
            data: Vec<u8>,
        ) -> std::result::Result<(), PlatformError> {
            self.uploads.borrow_mut().push(data);
            Ok(())
        }

        fn submit_tasks(
            &self,
            _session: &SessionId,
            tasks: Vec<TaskSubmission>,
        ) -> std::result::Result<Vec<crate::platform::traits::TaskId>, PlatformError> {
            Ok(tasks
                .iter()
                .enumerate()
                .map(|(i, _)| crate::platform::traits::TaskId::new(format!("t{}", i)))
                .collect())
        }

        fn wait_for_slots(
            &self,
            _session: &SessionId,
            _slots: &[SlotId],
        ) -> std::result::Result<(), PlatformError> {
            Ok(())
        }

        fn download(
            &self,
            _session: &SessionId,
            slot: &SlotId,
        ) -> std::result::Result<Vec<u8>, PlatformError> {
            let index: usize = slot
                .as_str()
                .trim_start_matches("output")
                .parse()
                .map_err(|_| PlatformError::UnknownSlot(slot.to_string()))?;
            match self.tokens[index] {
                Ok(token) => Ok(token.as_bytes().to_vec()),
                Err(message) => Err(PlatformError::TaskFailed {
                    slot: slot.to_string(),
                    message: message.to_string(),
                }),
            }
        }
    }

    fn request(paths: usize) -> SimulationRequest {
        SimulationRequest::new(vec![Asset::new("AAPL", 180.0, 0.25, 1.0)], 0.05, 1.0, paths)
    }

    #[test]
    fn test_weighted_aggregation_of_uneven_chunks() {
        let platform = ScriptedPlatform::new(vec![Ok("100"), Ok("200")]);
        let report = Driver::new(&platform, TaskOptions::default())
            .with_chunk_size(9_000)
            .run(&request(10_000))
            .unwrap();
        assert_eq!(report.num_chunks(), 2);
        assert_eq!(report.value(), 110.0);
        assert_eq!(report.num_simulations(), 10_000);
        assert_eq!(report.session().as_str(), "s");
    }

    #[test]
    fn test_slots_and_payloads() {
        let platform = ScriptedPlatform::new(vec![Ok("1"), Ok("1"), Ok("1")]);
        Driver::new(&platform, TaskOptions::default())
            .with_chunk_size(4)
            .run(&request(10))
            .unwrap();
        assert_eq!(
            *platform.slot_names.borrow(),
            vec!["payload0", "output0", "payload1", "output1", "payload2", "output2"]
        );
        let uploads = platform.uploads.borrow();
        assert_eq!(uploads.len(), 3);
        assert_eq!(uploads[2], b"0.05,1,2\nAAPL,180,0.25,1".to_vec());
    }

    #[test]
    fn test_any_failed_chunk_fails_the_request() {
        let platform = ScriptedPlatform::new(vec![Ok("100"), Err("boom"), Ok("garbage")]);
        let err = Driver::new(&platform, TaskOptions::default())
            .with_chunk_size(10)
            .run(&request(30))
            .unwrap_err();
        match err {
            ServiceError::ChunksFailed(ChunkFailures(failures)) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].index, 1);
                assert_eq!(failures[0].message, "boom");
                assert_eq!(failures[1].index, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_invalid_chunk_size() {
        let platform = ScriptedPlatform::new(vec![]);
        let err = Driver::new(&platform, TaskOptions::default())
            .with_chunk_size(0)
            .run(&request(30))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Basket(_)));
    }
}
