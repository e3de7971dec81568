use std::fmt;

/// Discounted average basket value over the paths of one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    value: f64,
}

impl SimulationResult {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Final estimate combined from every chunk of one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateResult {
    value: f64,
    num_simulations: usize,
}

impl AggregateResult {
    pub fn new(value: f64, num_simulations: usize) -> Self {
        Self {
            value,
            num_simulations,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Total number of paths behind the estimate.
    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
