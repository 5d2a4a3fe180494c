//! HTTP control surface for tja-analyzer
//!
//! Operational endpoints only: health, worker control and one-off analysis.

pub mod analyze;
pub mod health;
pub mod worker;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use worker::worker_routes;
