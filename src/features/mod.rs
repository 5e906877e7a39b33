//! Feature schema alignment engine
//!
//! Everything that turns a raw [`LoanApplication`](crate::LoanApplication)
//! into the exact ordered numeric vector the trained model expects. Batch
//! training and live inference both go through these functions so the two
//! representations cannot drift apart.

pub mod align;
pub mod catalog;
pub mod derive;
pub mod encode;
pub mod pipeline;

pub use align::{align, AlignedVector};
pub use catalog::ColumnCatalog;
pub use derive::{derive, DerivedFeatures};
pub use encode::{CategoricalEncoder, CategoryField, EncodedRecord, Level, Vocabulary};
pub use pipeline::{run_batch, ScoringPipeline, TrainingDataset};
