//! Field recovery prober
//!
//! Last-resort strategy when no parse strategy could read the main reply:
//! ask the model for title, date and traffic one at a time, each as plain
//! text, against the same image. Model failures propagate; they are not a
//! format problem.

use std::sync::Arc;
use tja_common::Reading;
use tracing::{debug, info};

use crate::parser::parse_traffic;
use crate::services::model_client::ModelError;
use crate::services::prompts::{DATE_PROMPT, TITLE_PROMPT, TRAFFIC_PROMPT};
use crate::types::ModelClient;

const DATA_PREFIX: &str = "{ \"data\": \"";
const DATA_SUFFIX: &str = "\" }";

pub struct FieldRecoveryProber {
    model: Arc<dyn ModelClient>,
}

impl FieldRecoveryProber {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Query each field separately
    ///
    /// Returns `Ok(None)` when any field comes back empty. Traffic text that
    /// is not an integer becomes 0.
    pub async fn probe(&self, image: &[u8]) -> Result<Option<Reading>, ModelError> {
        let title = self.ask(TITLE_PROMPT, image).await?;
        let date = self.ask(DATE_PROMPT, image).await?;
        let traffic = self.ask(TRAFFIC_PROMPT, image).await?;

        if title.is_empty() || date.is_empty() || traffic.is_empty() {
            debug!(
                title_empty = title.is_empty(),
                date_empty = date.is_empty(),
                traffic_empty = traffic.is_empty(),
                "Field recovery incomplete"
            );
            return Ok(None);
        }

        let reading = Reading::new(title, date, parse_traffic(&traffic));
        info!(title = %reading.title, traffic = reading.traffic, "Recovered reading field by field");
        Ok(Some(reading))
    }

    async fn ask(&self, prompt: &str, image: &[u8]) -> Result<String, ModelError> {
        let reply = self.model.complete(prompt, Some(image)).await?;
        debug!(reply = %reply, "Field query reply");
        Ok(unwrap_data_envelope(&reply).trim().to_string())
    }
}

/// Strip a literal `{ "data": "` ... `" }` wrapper
///
/// Exact text match only: no JSON parsing, no whitespace tolerance inside
/// the wrapper, no unescaping.
pub fn unwrap_data_envelope(reply: &str) -> &str {
    reply
        .strip_prefix(DATA_PREFIX)
        .and_then(|rest| rest.strip_suffix(DATA_SUFFIX))
        .unwrap_or(reply)
}
