//! Loan Default Risk Pipeline Library
//!
//! Scores loan applications for default risk. The feature representation
//! produced for a live application is guaranteed to match, column for column,
//! the one the model was trained on (no train/serve skew).

pub mod config;
pub mod consumer;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod types;

pub use config::AppConfig;
pub use consumer::ApplicationConsumer;
pub use error::InputError;
pub use features::{ColumnCatalog, ScoringPipeline};
pub use models::loader::load_artifacts;
pub use models::scorer::LoanScorer;
pub use producer::DecisionProducer;
pub use types::{application::LoanApplication, decision::RiskDecision};
