use crate::core::{asset::Asset, request::SimulationRequest};
use crate::utils::errors::ParseError;

use super::enums::PayloadFormat;
use super::traits::PayloadCodec;

const HEADER_FIELDS: usize = 3;
const ASSET_FIELDS: usize = 4;

/// Canonical text payload.
///
/// ```text
/// risk_free_rate,time_to_maturity,num_simulations
/// name,spot,volatility,weight
/// ...
/// ```
/// Blank lines are skipped. Line numbers in errors are 1-based positions in the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn parse_number(line: usize, field: &'static str, value: &str) -> Result<f64, ParseError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidNumber {
            line,
            field,
            value: value.to_string(),
        }),
    }
}

fn check_field_count(line: usize, fields: &[&str], expected: usize) -> Result<(), ParseError> {
    if fields.len() != expected {
        return Err(ParseError::FieldCount {
            line,
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

fn parse_asset(line: usize, text: &str) -> Result<Asset, ParseError> {
    let fields = split_fields(text);
    check_field_count(line, &fields, ASSET_FIELDS)?;
    let name = fields[0];
    if name.is_empty() {
        return Err(ParseError::EmptyName(line));
    }
    Ok(Asset::new(
        name,
        parse_number(line, "spot", fields[1])?,
        parse_number(line, "volatility", fields[2])?,
        parse_number(line, "weight", fields[3])?,
    ))
}

impl PayloadCodec for LineCodec {
    fn format(&self) -> PayloadFormat {
        PayloadFormat::LinesV1
    }

    fn encode(&self, request: &SimulationRequest) -> Vec<u8> {
        let mut lines = Vec::with_capacity(request.basket().len() + 1);
        lines.push(format!(
            "{},{},{}",
            request.risk_free_rate(),
            request.time_to_maturity(),
            request.num_simulations()
        ));
        lines.extend(request.basket().iter().map(|asset| {
            format!(
                "{},{},{},{}",
                asset.name(),
                asset.spot(),
                asset.volatility(),
                asset.weight()
            )
        }));
        lines.join("\n").into_bytes()
    }

    fn decode(&self, payload: &[u8]) -> Result<SimulationRequest, ParseError> {
        let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        match lines.len() {
            0 => return Err(ParseError::Empty),
            1 => return Err(ParseError::TooFewLines(1)),
            _ => {}
        }

        let (header_line, header) = lines[0];
        let fields = split_fields(header);
        check_field_count(header_line, &fields, HEADER_FIELDS)?;
        let risk_free_rate = parse_number(header_line, "risk_free_rate", fields[0])?;
        let time_to_maturity = parse_number(header_line, "time_to_maturity", fields[1])?;
        let num_simulations =
            fields[2]
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidNumber {
                    line: header_line,
                    field: "num_simulations",
                    value: fields[2].to_string(),
                })?;

        let basket = lines[1..]
            .iter()
            .map(|(line, text)| parse_asset(*line, text))
            .collect::<Result<Vec<Asset>, ParseError>>()?;

        Ok(SimulationRequest::new(
            basket,
            risk_free_rate,
            time_to_maturity,
            num_simulations,
        ))
    }
}
