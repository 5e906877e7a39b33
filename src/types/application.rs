//! Raw loan application records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A raw applicant record, as it arrives from the warehouse extract or from
/// a live scoring request.
///
/// Batch rows carry `birth_date` (and `default_flag`); live requests usually
/// carry `age` directly and never carry a label. Everything downstream works
/// from this one shape so both paths share the same feature code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Record identifier. Empty for warehouse rows, set for live requests.
    #[serde(default)]
    pub application_id: String,

    /// Requested loan principal
    pub principal_amount: f64,

    /// Loan term in months
    pub term_months: u32,

    /// Applicant birth date (batch extract form)
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,

    /// Applicant age in years (live request form)
    #[serde(default)]
    pub age: Option<u32>,

    /// Gender as a free string ("male", "female", "other", ...)
    pub gender: String,

    /// Job category ("skilled", "unskilled", ...)
    pub job: String,

    /// Loan product category ("car", "education", ...)
    pub product_type: String,

    /// Default label; present only on historical training rows
    #[serde(default)]
    pub default_flag: Option<bool>,

    /// Arrival timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl LoanApplication {
    /// Create an application with the given core fields; age form, no label.
    pub fn new(application_id: &str, principal_amount: f64, term_months: u32, age: u32) -> Self {
        Self {
            application_id: application_id.to_string(),
            principal_amount,
            term_months,
            birth_date: None,
            age: Some(age),
            gender: "male".to_string(),
            job: "skilled".to_string(),
            product_type: "car".to_string(),
            default_flag: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_serialization() {
        let app = LoanApplication::new("app_123", 5000.0, 36, 30);

        let json = serde_json::to_string(&app).unwrap();
        let deserialized: LoanApplication = serde_json::from_str(&json).unwrap();

        assert_eq!(app.application_id, deserialized.application_id);
        assert_eq!(app.principal_amount, deserialized.principal_amount);
        assert_eq!(app.age, deserialized.age);
        assert_eq!(deserialized.default_flag, None);
    }

    #[test]
    fn test_request_without_optional_fields() {
        // A live request: no id defaulting is tested, no birth_date, no label
        let json = r#"{
            "application_id": "req_1",
            "principal_amount": 5000,
            "term_months": 36,
            "age": 30,
            "gender": "male",
            "job": "skilled",
            "product_type": "car"
        }"#;

        let app: LoanApplication = serde_json::from_str(json).unwrap();
        assert_eq!(app.age, Some(30));
        assert_eq!(app.birth_date, None);
        assert_eq!(app.default_flag, None);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        // Missing `gender` is a deserialization error, surfaced per-request
        let json = r#"{
            "principal_amount": 5000,
            "term_months": 36,
            "age": 30,
            "job": "skilled",
            "product_type": "car"
        }"#;

        assert!(serde_json::from_str::<LoanApplication>(json).is_err());
    }
}
