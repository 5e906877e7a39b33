//! Categorical encoding with a training-time vocabulary
//!
//! Expands the closed set of categorical fields into binary indicator
//! columns. The vocabulary of recognized levels is fixed when the training
//! batch is encoded; at inference it is reconstructed from the persisted
//! column catalog, so the encoder can never emit a column the aligner will
//! not recognize.

use std::collections::HashMap;

use crate::features::catalog::ColumnCatalog;
use crate::features::derive::DerivedFeatures;

/// Numeric columns, in the order they appear in the training matrix.
pub const NUMERIC_COLUMNS: [&str; 4] =
    ["principal_amount", "term_months", "age", "gender_numeric"];

/// The closed set of categorical fields the encoder recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryField {
    Job,
    ProductType,
}

impl CategoryField {
    /// All category fields, in training-matrix column order.
    pub const ALL: [CategoryField; 2] = [CategoryField::Job, CategoryField::ProductType];

    /// Raw field name, used as the indicator column prefix.
    pub fn name(&self) -> &'static str {
        match self {
            CategoryField::Job => "job",
            CategoryField::ProductType => "product_type",
        }
    }

    /// The record's value for this field.
    pub fn value<'a>(&self, features: &'a DerivedFeatures) -> &'a str {
        match self {
            CategoryField::Job => &features.job,
            CategoryField::ProductType => &features.product_type,
        }
    }

    /// Indicator column name for a level of this field.
    pub fn column(&self, level: &str) -> String {
        format!("{}_{}", self.name(), level)
    }
}

/// How a record's level relates to the training vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Index into the field's indicator levels.
    Known(usize),
    /// Unseen at training time, or the dropped reference level. Encodes as
    /// all-zero indicators, same as the reference class.
    Unknown,
}

/// The indicator levels per categorical field, fixed at training time.
///
/// Holds only the levels that own an indicator column: per field, the
/// distinct observed levels sorted, with the first dropped as the implicit
/// reference class (the usual collinearity avoidance). The dropped level is
/// recorded only by its absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    indicator_levels: HashMap<CategoryField, Vec<String>>,
}

impl Vocabulary {
    /// Capture the vocabulary from a training batch.
    pub fn capture<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a DerivedFeatures>,
    {
        let mut observed: HashMap<CategoryField, Vec<String>> = HashMap::new();
        for row in rows {
            for field in CategoryField::ALL {
                let levels = observed.entry(field).or_default();
                let value = field.value(row);
                if !levels.iter().any(|l| l == value) {
                    levels.push(value.to_string());
                }
            }
        }

        let mut indicator_levels = HashMap::new();
        for field in CategoryField::ALL {
            let mut levels = observed.remove(&field).unwrap_or_default();
            levels.sort();
            // First level becomes the reference class and loses its column
            if !levels.is_empty() {
                levels.remove(0);
            }
            indicator_levels.insert(field, levels);
        }

        Self { indicator_levels }
    }

    /// Reconstruct the vocabulary from a persisted catalog.
    ///
    /// The catalog's indicator column names are the only durable record of
    /// which levels were observed at training time; parsing them back is
    /// what lets the inference path encode with the exact training
    /// vocabulary without a second artifact.
    pub fn from_catalog(catalog: &ColumnCatalog) -> Self {
        let mut indicator_levels: HashMap<CategoryField, Vec<String>> = HashMap::new();
        for field in CategoryField::ALL {
            indicator_levels.insert(field, Vec::new());
        }

        for column in catalog.columns() {
            for field in CategoryField::ALL {
                let prefix = format!("{}_", field.name());
                if let Some(level) = column.strip_prefix(&prefix) {
                    indicator_levels
                        .entry(field)
                        .or_default()
                        .push(level.to_string());
                    break;
                }
            }
        }

        Self { indicator_levels }
    }

    /// Indicator levels for a field, in column order.
    pub fn levels(&self, field: CategoryField) -> &[String] {
        self.indicator_levels
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Classify a record's value against the vocabulary.
    pub fn classify(&self, field: CategoryField, value: &str) -> Level {
        match self.levels(field).iter().position(|l| l == value) {
            Some(index) => Level::Known(index),
            None => Level::Unknown,
        }
    }

    /// All indicator column names, fields in declaration order, levels in
    /// sorted order within each field.
    pub fn indicator_columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        for field in CategoryField::ALL {
            for level in self.levels(field) {
                columns.push(field.column(level));
            }
        }
        columns
    }
}

/// An encoded record: column name to numeric value.
///
/// Numeric fields appear under their own names; each categorical field
/// contributes one 0/1 indicator per vocabulary level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedRecord {
    columns: HashMap<String, f64>,
}

impl EncodedRecord {
    pub fn insert(&mut self, name: String, value: f64) {
        self.columns.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.columns.iter()
    }
}

/// Encoder applying a fixed vocabulary to derived features.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    vocabulary: Vocabulary,
}

impl CategoricalEncoder {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Encode one record.
    ///
    /// Total: an unseen level simply leaves all of its field's indicators at
    /// zero, indistinguishable from the reference class. Never invents a
    /// column outside the vocabulary.
    pub fn encode(&self, features: &DerivedFeatures) -> EncodedRecord {
        let mut record = EncodedRecord::default();

        record.insert("principal_amount".to_string(), features.principal_amount);
        record.insert("term_months".to_string(), features.term_months as f64);
        record.insert("age".to_string(), features.age as f64);
        record.insert("gender_numeric".to_string(), features.gender_numeric as f64);

        for field in CategoryField::ALL {
            let level = self.vocabulary.classify(field, field.value(features));
            for (index, name) in self.vocabulary.levels(field).iter().enumerate() {
                let hit = matches!(level, Level::Known(i) if i == index);
                record.insert(field.column(name), if hit { 1.0 } else { 0.0 });
            }
        }

        record
    }
}
