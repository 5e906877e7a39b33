//! Artifact loading
//!
//! The trained model and its column catalog are a pair: one is useless
//! without the other. Both are loaded together, once, at process start, and
//! any mismatch aborts startup before the process can serve traffic.

use std::path::Path;

use anyhow::{bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::ValueType;
use tracing::info;

use crate::features::catalog::ColumnCatalog;
use crate::models::scorer::LoanScorer;

/// The immutable pair every inference call depends on.
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub scorer: LoanScorer,
    pub catalog: ColumnCatalog,
}

/// Load the model/catalog pair, failing fast on any inconsistency.
///
/// Checks that both files exist and that the session's declared input width
/// agrees with the catalog length. The pairing is checked, not
/// cryptographically bound: a model and a catalog from different training
/// runs that happen to share a width would still load.
pub fn load_artifacts<P: AsRef<Path>>(
    model_path: P,
    catalog_path: P,
    onnx_threads: usize,
) -> Result<LoadedArtifacts> {
    let model_path = model_path.as_ref();
    let catalog_path = catalog_path.as_ref();

    if !model_path.exists() {
        bail!("model artifact not found: {}", model_path.display());
    }
    if !catalog_path.exists() {
        bail!("column catalog not found: {}", catalog_path.display());
    }

    let catalog = ColumnCatalog::load(catalog_path)?;

    ort::init().commit();
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(ort::Error::<()>::from)?
        .with_intra_threads(onnx_threads)
        .map_err(ort::Error::<()>::from)?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;

    if let Some(width) = declared_input_width(&session) {
        if width != catalog.len() {
            bail!(
                "model expects {} input features but catalog {} has {} columns",
                width,
                catalog_path.display(),
                catalog.len()
            );
        }
    }

    let scorer = LoanScorer::new(session);

    info!(
        model = %model_path.display(),
        catalog = %catalog_path.display(),
        columns = catalog.len(),
        onnx_threads = onnx_threads,
        "Artifacts loaded"
    );

    Ok(LoadedArtifacts { scorer, catalog })
}

/// The feature dimension the model declares for its first input, when it is
/// static. Symbolic batch dimensions are ignored.
fn declared_input_width(session: &Session) -> Option<usize> {
    let input = session.inputs().first()?;
    match input.dtype() {
        ValueType::Tensor { shape, .. } => {
            let last = shape.iter().copied().last()?;
            if last > 0 {
                Some(last as usize)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_fails_fast() {
        let err = load_artifacts("/nonexistent/loan_model.onnx", "/nonexistent/columns.json", 1)
            .unwrap_err();
        assert!(err.to_string().contains("model artifact not found"));
    }

    #[test]
    fn test_missing_catalog_fails_fast() {
        // Any readable file stands in for the model; the catalog check runs
        // before the session is built
        let model = std::env::temp_dir().join(format!("fake_model_{}.onnx", std::process::id()));
        std::fs::write(&model, b"not a real model").unwrap();

        let err =
            load_artifacts(model.as_path(), Path::new("/nonexistent/columns.json"), 1).unwrap_err();
        std::fs::remove_file(&model).ok();

        assert!(err.to_string().contains("column catalog not found"));
    }
}
