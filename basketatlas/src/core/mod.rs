pub mod asset;
pub mod request;
pub mod results;
