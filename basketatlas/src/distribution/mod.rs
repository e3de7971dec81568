pub mod resultaggregator;
pub mod taskpartitioner;
