use serde::{Deserialize, Serialize};

use super::asset::Asset;

/// A basket valuation request. Built once by the caller and consumed by a single worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    basket: Vec<Asset>,
    risk_free_rate: f64,
    time_to_maturity: f64,
    num_simulations: usize,
}

impl SimulationRequest {
    pub fn new(
        basket: Vec<Asset>,
        risk_free_rate: f64,
        time_to_maturity: f64,
        num_simulations: usize,
    ) -> Self {
        Self {
            basket,
            risk_free_rate,
            time_to_maturity,
            num_simulations,
        }
    }

    pub fn basket(&self) -> &[Asset] {
        &self.basket
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn time_to_maturity(&self) -> f64 {
        self.time_to_maturity
    }

    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }

    /// Same basket and market parameters with a different path count.
    pub fn with_num_simulations(&self, num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..self.clone()
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.basket.iter().map(|a| a.weight()).sum()
    }
}
