use thiserror::Error;

/// Structural problems found while decoding a chunk payload or a result token.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("empty payload")]
    Empty,
    #[error("expected at least 2 lines, got {0}")]
    TooFewLines(usize),
    #[error("line {line}: expected {expected} fields, got {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: field `{field}` is not a finite number: {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {0}: asset name is empty")]
    EmptyName(usize),
    #[error("unknown payload format: {0}")]
    UnknownFormat(String),
    #[error("malformed json payload: {0}")]
    Json(String),
    #[error("malformed result token: {0:?}")]
    InvalidResult(String),
}

/// Numerically invalid requests, rejected before any path is simulated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("empty basket")]
    EmptyBasket,
    #[error("non-positive path count")]
    NonPositivePathCount,
    #[error("non-positive maturity: {0}")]
    NonPositiveMaturity(f64),
    #[error("non-positive spot for {asset}: {value}")]
    NonPositiveSpot { asset: String, value: f64 },
    #[error("non-positive volatility for {asset}: {value}")]
    NonPositiveVolatility { asset: String, value: f64 },
    #[error("negative weight for {asset}: {value}")]
    NegativeWeight { asset: String, value: f64 },
    #[error("weights do not sum to one (sum = {0})")]
    WeightsDoNotSumToOne(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BasketError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(usize),
    #[error("No chunk results to aggregate")]
    NoChunkResults,
    #[error("Chunk results cover zero paths")]
    ZeroPathCount,
}

pub type Result<T> = std::result::Result<T, BasketError>;

impl From<BasketError> for String {
    fn from(e: BasketError) -> Self {
        e.to_string()
    }
}
