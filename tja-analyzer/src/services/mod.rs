//! Analyzer services and collaborator clients

pub mod image_fetcher;
pub mod model_client;
pub mod orchestrator;
pub mod prober;
pub mod prompts;
pub mod vector_index;

pub use image_fetcher::{FetchError, HttpImageFetcher};
pub use model_client::{ModelError, OllamaClient};
pub use orchestrator::AnalysisOrchestrator;
pub use prober::FieldRecoveryProber;
pub use vector_index::{DisabledVectorIndex, HttpVectorIndex};
