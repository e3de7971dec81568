use tracing::trace;

use crate::core::{asset::Asset, request::SimulationRequest, results::SimulationResult};
use crate::math::normalsource::NormalSource;
use crate::utils::errors::{Result, ValidationError};

/// Tolerance on the sum of basket weights.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Per-asset terms of the GBM terminal price that do not depend on the draw.
#[derive(Debug, Clone, Copy)]
struct AssetTerms {
    spot: f64,
    weight: f64,
    drift: f64,
    diffusion: f64,
}

/// A basket that passed validation, ready for the path loop.
#[derive(Debug, Clone)]
pub struct ValidatedBasket {
    terms: Vec<AssetTerms>,
    discount: f64,
    num_paths: usize,
}

impl ValidatedBasket {
    pub fn num_paths(&self) -> usize {
        self.num_paths
    }

    pub fn num_assets(&self) -> usize {
        self.terms.len()
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount
    }
}

/// Monte Carlo valuation of a weighted basket under risk neutral geometric Brownian motion.
///
/// Each path draws one independent standard normal per asset and prices the terminal
/// basket `Σ wᵢ Sᵢ(T)` with
/// `Sᵢ(T) = Sᵢ(0) exp((r - σᵢ²/2) T + σᵢ √T Z)`.
/// The estimate is the discounted sample mean `exp(-rT) · mean(basket)`. No correlation
/// between assets and no variance reduction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasketSimulator;

impl BasketSimulator {
    pub fn new() -> Self {
        Self
    }

    /// Checks every input and precomputes the per-asset terms. Nothing is drawn here.
    pub fn validate(
        &self,
        basket: &[Asset],
        risk_free_rate: f64,
        time_to_maturity: f64,
        num_paths: usize,
    ) -> std::result::Result<ValidatedBasket, ValidationError> {
        if basket.is_empty() {
            return Err(ValidationError::EmptyBasket);
        }
        if num_paths == 0 {
            return Err(ValidationError::NonPositivePathCount);
        }
        if !(time_to_maturity > 0.0) {
            return Err(ValidationError::NonPositiveMaturity(time_to_maturity));
        }

        let mut total_weight = 0.0;
        for asset in basket {
            if !(asset.spot() > 0.0) {
                return Err(ValidationError::NonPositiveSpot {
                    asset: asset.name().to_string(),
                    value: asset.spot(),
                });
            }
            if !(asset.volatility() > 0.0) {
                return Err(ValidationError::NonPositiveVolatility {
                    asset: asset.name().to_string(),
                    value: asset.volatility(),
                });
            }
            if asset.weight() < 0.0 {
                return Err(ValidationError::NegativeWeight {
                    asset: asset.name().to_string(),
                    value: asset.weight(),
                });
            }
            total_weight += asset.weight();
        }
        if !((total_weight - 1.0).abs() <= WEIGHT_TOLERANCE) {
            return Err(ValidationError::WeightsDoNotSumToOne(total_weight));
        }

        let sqrt_t = time_to_maturity.sqrt();
        let terms = basket
            .iter()
            .map(|asset| {
                let sigma = asset.volatility();
                AssetTerms {
                    spot: asset.spot(),
                    weight: asset.weight(),
                    drift: (risk_free_rate - 0.5 * sigma * sigma) * time_to_maturity,
                    diffusion: sigma * sqrt_t,
                }
            })
            .collect();

        Ok(ValidatedBasket {
            terms,
            discount: (-risk_free_rate * time_to_maturity).exp(),
            num_paths,
        })
    }

    /// Runs the path loop on an already validated basket.
    pub fn run<S: NormalSource + ?Sized>(&self, basket: &ValidatedBasket, source: &mut S) -> f64 {
        let mut total_value = 0.0;
        for _ in 0..basket.num_paths {
            let mut path_value = 0.0;
            for asset in &basket.terms {
                let z = source.next_normal();
                let st = asset.spot * (asset.drift + asset.diffusion * z).exp();
                path_value += asset.weight * st;
            }
            total_value += path_value;
        }
        basket.discount * (total_value / basket.num_paths as f64)
    }

    pub fn simulate<S: NormalSource + ?Sized>(
        &self,
        basket: &[Asset],
        risk_free_rate: f64,
        time_to_maturity: f64,
        num_paths: usize,
        source: &mut S,
    ) -> Result<f64> {
        let validated = self.validate(basket, risk_free_rate, time_to_maturity, num_paths)?;
        trace!(
            assets = validated.num_assets(),
            paths = num_paths,
            "running basket paths"
        );
        Ok(self.run(&validated, source))
    }

    pub fn simulate_request<S: NormalSource + ?Sized>(
        &self,
        request: &SimulationRequest,
        source: &mut S,
    ) -> Result<SimulationResult> {
        let value = self.simulate(
            request.basket(),
            request.risk_free_rate(),
            request.time_to_maturity(),
            request.num_simulations(),
            source,
        )?;
        Ok(SimulationResult::new(value))
    }
}
