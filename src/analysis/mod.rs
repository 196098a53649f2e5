//! Single-shot, cached analysis endpoints.
//!
//! Each request type normalizes its payload at deserialization, builds a
//! deterministic prompt, and goes through [`AnalysisService`], which memoizes
//! results in the response cache keyed by a scoped fingerprint.

mod advanced;
mod insights;
pub mod normalize;
mod service;
mod wellness;

pub use advanced::AdvancedHealthRequest;
pub use insights::HealthInsightsRequest;
pub use service::{Analysis, AnalysisError, AnalysisRequest, AnalysisService};
pub use wellness::{WELLNESS_MODEL, WellnessRequest};
