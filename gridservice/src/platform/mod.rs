pub mod local;
pub mod options;
pub mod traits;
