//! Risk decision data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::scorer::Prediction;
use crate::types::application::LoanApplication;

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Determine risk level from a default probability and thresholds
    pub fn from_probability(probability: f64, thresholds: &RiskLevelThresholds) -> Self {
        if probability >= thresholds.critical {
            RiskLevel::Critical
        } else if probability >= thresholds.high {
            RiskLevel::High
        } else if probability >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Configurable risk level thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            low: 0.3,
            medium: 0.5,
            high: 0.7,
            critical: 0.9,
        }
    }
}

/// The scoring verdict published for every processed application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDecision {
    /// Unique decision identifier
    pub decision_id: String,

    /// Associated application ID
    pub application_id: String,

    /// Predicted class: 0 = repays, 1 = defaults
    pub label: u8,

    /// Probability of default (0.0 - 1.0)
    pub probability_of_default: f64,

    /// Risk level classification
    pub risk_level: RiskLevel,

    /// Decision timestamp
    pub timestamp: DateTime<Utc>,

    /// Principal echoed from the application
    pub principal_amount: f64,

    /// Term echoed from the application
    pub term_months: u32,
}

impl RiskDecision {
    /// Build a decision from a scorer prediction and the source application.
    pub fn from_prediction(
        prediction: &Prediction,
        application: &LoanApplication,
        thresholds: &RiskLevelThresholds,
    ) -> Self {
        Self {
            decision_id: uuid::Uuid::new_v4().to_string(),
            application_id: application.application_id.clone(),
            label: prediction.label,
            probability_of_default: prediction.probability_of_default,
            risk_level: RiskLevel::from_probability(prediction.probability_of_default, thresholds),
            timestamp: Utc::now(),
            principal_amount: application.principal_amount,
            term_months: application.term_months,
        }
    }
}
