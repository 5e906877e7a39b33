//! The column catalog artifact
//!
//! The ordered list of feature names the model was fit on. Captured once per
//! training run, persisted next to the model file, and loaded read-only by
//! every serving process. The catalog order is the only valid input shape
//! for the scorer; it is never mutated after capture.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Ordered, unique feature column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCatalog {
    columns: Vec<String>,
}

impl ColumnCatalog {
    /// Capture a catalog from the training matrix column set.
    ///
    /// The label column must already be excluded. Duplicate names would make
    /// alignment ambiguous, so they are rejected here rather than detected
    /// at serving time.
    pub fn capture(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                bail!("duplicate column name in catalog: {}", column);
            }
        }
        Ok(Self { columns })
    }

    /// Column names in catalog order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Persist the catalog as a JSON artifact next to the model file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write column catalog to {}", path.display()))?;
        Ok(())
    }

    /// Load a previously captured catalog.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read column catalog from {}", path.display()))?;
        let catalog: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse column catalog {}", path.display()))?;
        if catalog.is_empty() {
            bail!("column catalog {} is empty", path.display());
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_columns() -> Vec<String> {
        ["principal_amount", "term_months", "age", "gender_numeric"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_capture_preserves_order() {
        let catalog = ColumnCatalog::capture(sample_columns()).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.columns()[0], "principal_amount");
        assert_eq!(catalog.columns()[3], "gender_numeric");
    }

    #[test]
    fn test_capture_rejects_duplicates() {
        let mut columns = sample_columns();
        columns.push("age".to_string());
        assert!(ColumnCatalog::capture(columns).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let catalog = ColumnCatalog::capture(sample_columns()).unwrap();
        let path = std::env::temp_dir().join(format!(
            "model_columns_test_{}.json",
            std::process::id()
        ));

        catalog.save(&path).unwrap();
        let loaded = ColumnCatalog::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(catalog, loaded);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ColumnCatalog::load("/nonexistent/model_columns.json").is_err());
    }
}
