pub mod chain;
pub mod generator;
pub mod preprocess;
pub mod stats;
