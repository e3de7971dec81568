use serde_json::json;

use crate::core::request::SimulationRequest;
use crate::utils::errors::ParseError;

use super::enums::PayloadFormat;
use super::traits::PayloadCodec;

/// Structured payload:
/// `{"basket":[{"name","spot","volatility","weight"}],"risk_free_rate","time_to_maturity","num_simulations"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn format(&self) -> PayloadFormat {
        PayloadFormat::JsonV1
    }

    fn encode(&self, request: &SimulationRequest) -> Vec<u8> {
        let basket: Vec<_> = request
            .basket()
            .iter()
            .map(|asset| {
                json!({
                    "name": asset.name(),
                    "spot": asset.spot(),
                    "volatility": asset.volatility(),
                    "weight": asset.weight(),
                })
            })
            .collect();
        json!({
            "basket": basket,
            "risk_free_rate": request.risk_free_rate(),
            "time_to_maturity": request.time_to_maturity(),
            "num_simulations": request.num_simulations(),
        })
        .to_string()
        .into_bytes()
    }

    fn decode(&self, payload: &[u8]) -> Result<SimulationRequest, ParseError> {
        let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        serde_json::from_str(text).map_err(|e| ParseError::Json(e.to_string()))
    }
}
