use crate::core::results::{AggregateResult, SimulationResult};
use crate::utils::errors::{BasketError, Result};

/// A chunk's average together with the number of paths it averaged over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkResult {
    result: SimulationResult,
    num_simulations: usize,
}

impl ChunkResult {
    pub fn new(result: SimulationResult, num_simulations: usize) -> Self {
        Self {
            result,
            num_simulations,
        }
    }

    pub fn result(&self) -> SimulationResult {
        self.result
    }

    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }
}

/// Path-weighted mean of chunk averages: `Σ vᵢ nᵢ / Σ nᵢ`.
///
/// Chunks may differ in size (the partitioner's last chunk usually does), so each
/// average counts in proportion to its paths.
pub fn aggregate<I>(chunks: I) -> Result<AggregateResult>
where
    I: IntoIterator<Item = ChunkResult>,
{
    let mut seen = false;
    let mut weighted_sum = 0.0;
    let mut total_paths = 0usize;
    for chunk in chunks {
        seen = true;
        weighted_sum += chunk.result.value() * chunk.num_simulations as f64;
        total_paths += chunk.num_simulations;
    }

    if !seen {
        return Err(BasketError::NoChunkResults);
    }
    if total_paths == 0 {
        return Err(BasketError::ZeroPathCount);
    }
    Ok(AggregateResult::new(
        weighted_sum / total_paths as f64,
        total_paths,
    ))
}
