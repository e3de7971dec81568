pub mod core;
pub mod distribution;
pub mod math;
pub mod models;
pub mod prelude;
pub mod protocol;
pub mod utils;
