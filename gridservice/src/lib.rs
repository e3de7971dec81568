pub mod config;
pub mod driver;
pub mod errors;
pub mod logging;
pub mod platform;
pub mod prelude;
pub mod worker;
