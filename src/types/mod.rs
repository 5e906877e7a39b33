//! Type definitions for the loan risk pipeline

pub mod application;
pub mod decision;

pub use application::LoanApplication;
pub use decision::{RiskDecision, RiskLevel};
