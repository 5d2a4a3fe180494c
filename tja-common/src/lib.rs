//! # TJA Common Library
//!
//! Shared code for the traffic jam analyzer services including:
//! - Traffic models (readings, analysis outcomes, camera sources)
//! - Bootstrap configuration loading
//! - Common error type
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{AnalysisOutcome, CameraSource, Reading, SourceUpdate, TrafficResult};
