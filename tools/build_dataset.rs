//! Training Dataset Builder
//!
//! Reads historical loan application rows (JSON lines), runs them through
//! the schema-consistent batch pipeline, and writes the training CSV plus
//! the column catalog artifact. The model fitter consumes the CSV and the
//! catalog is persisted next to the exported model so serving can load the
//! pair together.

use anyhow::{Context, Result};
use chrono::Utc;
use loan_risk_pipeline::features::run_batch;
use loan_risk_pipeline::LoanApplication;
use std::fs;
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("build_dataset=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let input_path = args.get(1).map(|s| s.as_str()).unwrap_or("data/raw_loans.jsonl");
    let dataset_path = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or("data/training_dataset.csv");
    let catalog_path = args
        .get(3)
        .map(|s| s.as_str())
        .unwrap_or("models/model_columns.json");

    info!(
        input = %input_path,
        dataset = %dataset_path,
        catalog = %catalog_path,
        "Building training dataset"
    );

    let raw = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read raw rows from {}", input_path))?;

    let mut rows = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: LoanApplication = serde_json::from_str(line)
            .with_context(|| format!("Malformed row on line {}", number + 1))?;
        rows.push(row);
    }
    info!(rows = rows.len(), "Raw rows loaded");

    // Extraction-time "now": ages in the dataset are as of this run.
    let dataset = run_batch(&rows, Utc::now())?;

    if let Some(parent) = Path::new(dataset_path).parent() {
        fs::create_dir_all(parent)?;
    }
    if let Some(parent) = Path::new(catalog_path).parent() {
        fs::create_dir_all(parent)?;
    }

    let mut csv = String::new();
    csv.push_str(&dataset.catalog.columns().join(","));
    csv.push_str(",target\n");
    for (features, label) in dataset.matrix.iter().zip(&dataset.labels) {
        let row: Vec<String> = features.iter().map(|v| v.to_string()).collect();
        csv.push_str(&row.join(","));
        csv.push_str(&format!(",{}\n", label));
    }
    fs::write(dataset_path, csv)
        .with_context(|| format!("Failed to write dataset to {}", dataset_path))?;

    dataset.catalog.save(catalog_path)?;

    info!(
        rows = dataset.matrix.len(),
        columns = dataset.catalog.len(),
        "Training dataset and column catalog written"
    );

    Ok(())
}
