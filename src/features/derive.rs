//! Derived feature calculation
//!
//! Computes the features that are functions of raw fields. Pure and
//! deterministic given the record and a reference instant; the reference
//! instant is an explicit parameter so tests can pin it.

use chrono::{DateTime, Datelike, Utc};

use crate::error::InputError;
use crate::types::application::LoanApplication;

/// Raw fields plus the computed features, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatures {
    pub principal_amount: f64,
    pub term_months: u32,
    pub age: u32,
    pub gender_numeric: u8,
    pub job: String,
    pub product_type: String,
    pub default_flag: Option<bool>,
}

/// Compute derived features from a raw application.
///
/// Age comes from whichever raw form the record carries: the stored birth
/// date (batch extracts) or the direct age field (live requests). Both call
/// sites pass wall-clock "now" as the reference instant, so an applicant's
/// age can differ by up to a year between the batch extraction and a later
/// live request. That drift is accepted and bounded; pinning a fixed date
/// here would silently skew every other record instead.
pub fn derive(
    application: &LoanApplication,
    reference_instant: DateTime<Utc>,
) -> Result<DerivedFeatures, InputError> {
    let age = match (application.age, application.birth_date) {
        (Some(age), _) => age,
        (None, Some(birth_date)) => {
            // Year subtraction, matching the batch feature build; a birth
            // year in the future clamps to zero rather than wrapping.
            (reference_instant.year() - birth_date.year()).max(0) as u32
        }
        (None, None) => return Err(InputError::MissingAge),
    };

    Ok(DerivedFeatures {
        principal_amount: application.principal_amount,
        term_months: application.term_months,
        age,
        gender_numeric: gender_numeric(&application.gender),
        job: application.job.clone(),
        product_type: application.product_type.clone(),
        default_flag: application.default_flag,
    })
}

/// Map gender to its numeric form: "male" is 1, everything else is 0.
///
/// Total over all possible strings; "female", "other", typos and empty
/// values all map to 0 rather than failing.
fn gender_numeric(gender: &str) -> u8 {
    match gender {
        "male" => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_age_from_birth_date() {
        let mut app = LoanApplication::new("a1", 5000.0, 36, 30);
        app.age = None;
        app.birth_date = NaiveDate::from_ymd_opt(1990, 3, 1);

        let features = derive(&app, reference()).unwrap();
        assert_eq!(features.age, 34);
    }

    #[test]
    fn test_age_passthrough_wins_over_birth_date() {
        let mut app = LoanApplication::new("a1", 5000.0, 36, 30);
        app.birth_date = NaiveDate::from_ymd_opt(1990, 3, 1);

        let features = derive(&app, reference()).unwrap();
        assert_eq!(features.age, 30);
    }

    #[test]
    fn test_missing_age_source_is_an_error() {
        let mut app = LoanApplication::new("a1", 5000.0, 36, 30);
        app.age = None;
        app.birth_date = None;

        assert_eq!(derive(&app, reference()), Err(InputError::MissingAge));
    }

    #[test]
    fn test_future_birth_year_clamps_to_zero() {
        let mut app = LoanApplication::new("a1", 5000.0, 36, 30);
        app.age = None;
        app.birth_date = NaiveDate::from_ymd_opt(2030, 1, 1);

        let features = derive(&app, reference()).unwrap();
        assert_eq!(features.age, 0);
    }

    #[test]
    fn test_gender_mapping_is_total() {
        assert_eq!(gender_numeric("male"), 1);
        assert_eq!(gender_numeric("female"), 0);
        assert_eq!(gender_numeric("other"), 0);
        assert_eq!(gender_numeric("MALE"), 0);
        assert_eq!(gender_numeric(""), 0);
        assert_eq!(gender_numeric("nonsense"), 0);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let app = LoanApplication::new("a1", 5000.0, 36, 30);
        let first = derive(&app, reference()).unwrap();
        let second = derive(&app, reference()).unwrap();
        assert_eq!(first, second);
    }
}
