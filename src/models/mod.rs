//! Opaque scorer boundary: ONNX model loading and prediction

pub mod loader;
pub mod scorer;

pub use loader::{load_artifacts, LoadedArtifacts};
pub use scorer::{LoanScorer, Prediction};
