//! Core types and trait definitions for the Hoop Hub query engine.
//!
//! No HTTP or database dependencies. The planner, the store backends and
//! the API all depend on it.

pub mod cache;
pub mod catalog;
pub mod error;
pub mod metric;
pub mod plan;
pub mod run;
pub mod store;
pub mod time;
pub mod trace;

pub use error::{Error, Result, parse_discriminant};
