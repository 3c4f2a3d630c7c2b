//! Deterministic query planning for natural-language stats questions.
//!
//! Free text is normalised, scanned for metrics and entities, classified into
//! one of a closed set of intents and assembled into a
//! [`QueryPlan`](hoop_core::plan::QueryPlan). Everything here is synchronous
//! and side-effect free; the same question always yields the same plan.

mod entities;
mod intent;
mod normalize;
mod planner;
mod resolve;
mod validate;

pub mod error;

pub use entities::{extract_entities, extract_window};
pub use error::{InvariantViolation, PlanViolation};
pub use intent::{IntentMatch, Signals, classify_intent};
pub use normalize::normalize_question;
pub use planner::{PlannedQuery, Planner};
pub use resolve::{MetricResolution, resolve_metrics};
pub use validate::validate_plan;
