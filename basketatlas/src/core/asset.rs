use serde::{Deserialize, Serialize};

/// One instrument in a basket: spot level, lognormal volatility and basket weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    name: String,
    spot: f64,
    volatility: f64,
    weight: f64,
}

impl Asset {
    pub fn new(name: impl Into<String>, spot: f64, volatility: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            spot,
            volatility,
            weight,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}
