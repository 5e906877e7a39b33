//! Schema-consistent pipeline orchestration
//!
//! The one path both training and serving go through. `run_batch` builds the
//! training matrix and captures the catalog; [`ScoringPipeline`] replays the
//! identical derive -> encode -> align composition for single live records
//! against that catalog, so the vector fed to the scorer lines up
//! feature-for-feature between the two contexts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::InputError;
use crate::features::align::{align, AlignedVector};
use crate::features::catalog::ColumnCatalog;
use crate::features::derive::derive;
use crate::features::encode::{CategoricalEncoder, Vocabulary, NUMERIC_COLUMNS};
use crate::types::application::LoanApplication;

/// Everything a training run needs to hand to the model fitter.
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// Feature rows, each in catalog order
    pub matrix: Vec<Vec<f32>>,
    /// Default labels, one per row (0 = repaid, 1 = defaulted)
    pub labels: Vec<u8>,
    /// The catalog the matrix columns follow; persist alongside the model
    pub catalog: ColumnCatalog,
}

/// Build the training dataset from historical rows.
///
/// Captures the categorical vocabulary and the column catalog from this
/// batch, then runs every row through the same encode and align steps the
/// serving path uses. Rows must carry `default_flag`; a row that cannot be
/// derived fails the whole batch with its index in the error.
pub fn run_batch(
    rows: &[LoanApplication],
    reference_instant: DateTime<Utc>,
) -> Result<TrainingDataset> {
    let mut derived = Vec::with_capacity(rows.len());
    let mut labels = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let features =
            derive(row, reference_instant).with_context(|| format!("training row {}", index))?;
        let label = features
            .default_flag
            .ok_or(InputError::MissingLabel)
            .with_context(|| format!("training row {}", index))?;
        labels.push(label as u8);
        derived.push(features);
    }

    let encoder = CategoricalEncoder::new(Vocabulary::capture(&derived));

    let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(encoder.vocabulary().indicator_columns());
    let catalog = ColumnCatalog::capture(columns)?;

    let matrix: Vec<Vec<f32>> = derived
        .iter()
        .map(|features| align(&encoder.encode(features), &catalog).into_values())
        .collect();

    info!(
        rows = matrix.len(),
        columns = catalog.len(),
        "Training dataset assembled"
    );

    Ok(TrainingDataset {
        matrix,
        labels,
        catalog,
    })
}

/// The serving-side pipeline, bound to one immutable catalog.
///
/// Built once at process start from the loaded catalog and shared read-only
/// across all concurrent scoring calls; it holds no mutable state.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    encoder: CategoricalEncoder,
    catalog: ColumnCatalog,
}

impl ScoringPipeline {
    /// Bind a pipeline to a previously captured catalog.
    pub fn new(catalog: ColumnCatalog) -> Self {
        let encoder = CategoricalEncoder::new(Vocabulary::from_catalog(&catalog));
        Self { encoder, catalog }
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    /// Turn one live record into the vector the scorer expects.
    ///
    /// Unknown categorical levels are absorbed silently; a record that
    /// matches no catalog column at all is rejected as malformed instead of
    /// scoring an all-zero vector.
    pub fn run_single(
        &self,
        application: &LoanApplication,
        reference_instant: DateTime<Utc>,
    ) -> Result<AlignedVector, InputError> {
        let features = derive(application, reference_instant)?;
        let aligned = align(&self.encoder.encode(&features), &self.catalog);

        if aligned.matched_columns() == 0 {
            return Err(InputError::NoCatalogOverlap);
        }

        Ok(aligned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn row(job: &str, product_type: &str, defaulted: bool) -> LoanApplication {
        let mut app = LoanApplication::new("", 5000.0, 36, 30);
        app.job = job.to_string();
        app.product_type = product_type.to_string();
        app.default_flag = Some(defaulted);
        app
    }

    fn scenario_catalog() -> ColumnCatalog {
        ColumnCatalog::capture(
            [
                "principal_amount",
                "term_months",
                "age",
                "gender_numeric",
                "job_unskilled",
                "product_type_car",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_run_batch_column_order() {
        let rows = vec![
            row("skilled", "car", false),
            row("unskilled", "education", true),
        ];

        let dataset = run_batch(&rows, reference()).unwrap();

        // Numeric columns first, then job_*, then product_type_*; the first
        // sorted level of each category is the dropped reference class.
        assert_eq!(
            dataset.catalog.columns(),
            &[
                "principal_amount",
                "term_months",
                "age",
                "gender_numeric",
                "job_unskilled",
                "product_type_education",
            ]
        );
        assert_eq!(dataset.labels, vec![0, 1]);
        assert_eq!(dataset.matrix[1], vec![5000.0, 36.0, 30.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_run_batch_requires_labels() {
        let mut unlabeled = row("skilled", "car", false);
        unlabeled.default_flag = None;

        let err = run_batch(&[unlabeled], reference()).unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn test_known_record_scenario() {
        // Catalog fixed, input fully in-vocabulary except "skilled", which
        // has no column (reference class): vector [5000, 36, 30, 1, 0, 1]
        let pipeline = ScoringPipeline::new(scenario_catalog());
        let mut app = LoanApplication::new("req_1", 5000.0, 36, 30);
        app.gender = "male".to_string();
        app.job = "skilled".to_string();
        app.product_type = "car".to_string();

        let vector = pipeline.run_single(&app, reference()).unwrap();
        assert_eq!(vector.values(), &[5000.0, 36.0, 30.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unseen_job_scenario() {
        // job "astronaut" never appeared in training: its indicator stays 0
        // and nothing else in the vector changes
        let pipeline = ScoringPipeline::new(scenario_catalog());
        let mut app = LoanApplication::new("req_2", 5000.0, 36, 30);
        app.job = "astronaut".to_string();

        let vector = pipeline.run_single(&app, reference()).unwrap();
        assert_eq!(vector.values(), &[5000.0, 36.0, 30.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unseen_product_type_defaults_to_zero() {
        // product_type entirely outside the vocabulary: product_type_car
        // stays 0, no error
        let pipeline = ScoringPipeline::new(scenario_catalog());
        let mut app = LoanApplication::new("req_3", 5000.0, 36, 30);
        app.product_type = "yacht".to_string();

        let vector = pipeline.run_single(&app, reference()).unwrap();
        assert_eq!(vector.values(), &[5000.0, 36.0, 30.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unseen_level_equals_reference_level() {
        let pipeline = ScoringPipeline::new(scenario_catalog());

        let mut unseen = LoanApplication::new("req_4", 5000.0, 36, 30);
        unseen.job = "astronaut".to_string();
        let mut reference_class = LoanApplication::new("req_5", 5000.0, 36, 30);
        reference_class.job = "skilled".to_string();

        let a = pipeline.run_single(&unseen, reference()).unwrap();
        let b = pipeline.run_single(&reference_class, reference()).unwrap();
        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn test_round_trip_on_seen_data() {
        // Replaying a training row through the serving path reproduces its
        // matrix row exactly
        let rows = vec![
            row("skilled", "car", false),
            row("unskilled", "education", true),
            row("management", "furniture", false),
        ];
        let dataset = run_batch(&rows, reference()).unwrap();
        let pipeline = ScoringPipeline::new(dataset.catalog.clone());

        for (index, training_row) in rows.iter().enumerate() {
            let mut live = training_row.clone();
            live.default_flag = None;
            let vector = pipeline.run_single(&live, reference()).unwrap();
            assert_eq!(vector.values(), dataset.matrix[index].as_slice());
        }
    }

    #[test]
    fn test_run_single_is_deterministic() {
        let pipeline = ScoringPipeline::new(scenario_catalog());
        let app = LoanApplication::new("req_6", 5000.0, 36, 30);

        let first = pipeline.run_single(&app, reference()).unwrap();
        let second = pipeline.run_single(&app, reference()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_overlap_is_rejected() {
        // A catalog from some other encoding scheme shares nothing with the
        // record; the pipeline refuses to score an all-zero vector
        let foreign = ColumnCatalog::capture(vec![
            "utilization_ratio".to_string(),
            "bill_trend".to_string(),
        ])
        .unwrap();
        let pipeline = ScoringPipeline::new(foreign);
        let app = LoanApplication::new("req_7", 5000.0, 36, 30);

        assert_eq!(
            pipeline.run_single(&app, reference()),
            Err(InputError::NoCatalogOverlap)
        );
    }

    #[test]
    fn test_missing_age_surfaces_per_request() {
        let pipeline = ScoringPipeline::new(scenario_catalog());
        let mut app = LoanApplication::new("req_8", 5000.0, 36, 30);
        app.age = None;
        app.birth_date = None;

        assert_eq!(
            pipeline.run_single(&app, reference()),
            Err(InputError::MissingAge)
        );
    }
}
