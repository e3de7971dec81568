use crate::core::results::SimulationResult;
use crate::utils::errors::ParseError;

impl SimulationResult {
    /// Single decimal token written to a chunk's output slot.
    pub fn to_token(&self) -> Vec<u8> {
        self.value().to_string().into_bytes()
    }

    pub fn from_token(token: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(token).map_err(|_| ParseError::InvalidUtf8)?;
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(SimulationResult::new(value)),
            _ => Err(ParseError::InvalidResult(text.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token() {
        let result = SimulationResult::new(101.25);
        assert_eq!(result.to_token(), b"101.25".to_vec());
        assert_eq!(SimulationResult::from_token(&result.to_token()), Ok(result));
    }

    #[test]
    fn test_token_accepts_other_decimal_forms() {
        assert_eq!(
            SimulationResult::from_token(b" 1.5e2\n"),
            Ok(SimulationResult::new(150.0))
        );
        assert_eq!(
            SimulationResult::from_token(b"102.000000"),
            Ok(SimulationResult::new(102.0))
        );
    }

    #[test]
    fn test_bad_token() {
        assert_eq!(
            SimulationResult::from_token(b"value"),
            Err(ParseError::InvalidResult("value".to_string()))
        );
        assert!(SimulationResult::from_token(b"NaN").is_err());
        assert!(SimulationResult::from_token(b"").is_err());
    }
}
