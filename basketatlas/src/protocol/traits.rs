use crate::core::request::SimulationRequest;
use crate::utils::errors::ParseError;

use super::enums::PayloadFormat;
use super::jsoncodec::JsonCodec;
use super::linecodec::LineCodec;

/// Turns a request into transport bytes and back.
///
/// `encode` never validates; `decode` checks structure only and must accept whatever
/// `encode` produced for a request it previously decoded.
pub trait PayloadCodec: Send + Sync {
    fn format(&self) -> PayloadFormat;

    fn encode(&self, request: &SimulationRequest) -> Vec<u8>;

    fn decode(&self, payload: &[u8]) -> Result<SimulationRequest, ParseError>;
}

pub fn codec_for(format: PayloadFormat) -> Box<dyn PayloadCodec> {
    match format {
        PayloadFormat::LinesV1 => Box::new(LineCodec),
        PayloadFormat::JsonV1 => Box::new(JsonCodec),
    }
}
