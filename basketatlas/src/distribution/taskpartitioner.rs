use tracing::debug;

use crate::core::request::SimulationRequest;
use crate::utils::errors::{BasketError, Result, ValidationError};

/// A slice of a larger request, tagged with the index of its output slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskChunk {
    index: usize,
    request: SimulationRequest,
}

impl TaskChunk {
    pub fn new(index: usize, request: SimulationRequest) -> Self {
        Self { index, request }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn request(&self) -> &SimulationRequest {
        &self.request
    }

    pub fn num_simulations(&self) -> usize {
        self.request.num_simulations()
    }

    pub fn payload_slot_name(&self) -> String {
        format!("payload{}", self.index)
    }

    pub fn output_slot_name(&self) -> String {
        format!("output{}", self.index)
    }
}

/// Splits `request` into `ceil(n / chunk_size)` chunks of `chunk_size` paths; the last
/// one takes the remainder. Chunks come back in index order.
pub fn partition(request: &SimulationRequest, chunk_size: usize) -> Result<Vec<TaskChunk>> {
    if chunk_size == 0 {
        return Err(BasketError::InvalidChunkSize(chunk_size));
    }
    let total = request.num_simulations();
    if total == 0 {
        return Err(ValidationError::NonPositivePathCount.into());
    }

    let num_chunks = total.div_ceil(chunk_size);
    let chunks = (0..num_chunks)
        .map(|index| {
            let paths = if index + 1 == num_chunks {
                total - chunk_size * (num_chunks - 1)
            } else {
                chunk_size
            };
            TaskChunk::new(index, request.with_num_simulations(paths))
        })
        .collect();
    debug!(
        total,
        chunk_size,
        chunks = num_chunks,
        "partitioned simulation request"
    );
    Ok(chunks)
}
