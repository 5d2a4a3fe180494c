//! Traffic data model shared by the analyzer and its collaborators
//!
//! A [`Reading`] is produced once per successful analysis and never mutated;
//! the storage layer appends it to the source's history as a [`TrafficResult`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to freshly discovered cameras that have not been named yet
pub const PLACEHOLDER_TITLE: &str = "entry";

/// One parsed traffic observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Camera name (text in the top-left corner of the snapshot)
    pub title: String,
    /// Camera-supplied timestamp text, kept verbatim
    pub date: String,
    /// Congestion estimate, nominally 0-100 (not enforced)
    pub traffic: i32,
}

impl Reading {
    pub fn new(title: impl Into<String>, date: impl Into<String>, traffic: i32) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            traffic,
        }
    }

    /// A reading is usable only when both title and date carry text
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty() && !self.date.is_empty()
    }
}

/// Result of one analysis pass for one camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub source_url: String,
    pub created_at: DateTime<Utc>,
    /// `None` when every recovery strategy failed
    pub reading: Option<Reading>,
}

impl AnalysisOutcome {
    pub fn matched(source_url: impl Into<String>, reading: Reading) -> Self {
        Self {
            source_url: source_url.into(),
            created_at: crate::time::now(),
            reading: Some(reading),
        }
    }

    pub fn empty(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            created_at: crate::time::now(),
            reading: None,
        }
    }
}

/// Stored history entry for a camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficResult {
    pub id: i64,
    pub source_id: i64,
    pub traffic_title: String,
    pub cctv_date: Option<String>,
    pub traffic_amount: i32,
    pub created_at: DateTime<Utc>,
}

/// Camera source as owned by the storage layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSource {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub enabled: bool,
    pub cctv_date: Option<String>,
    pub current_traffic_amount: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Past readings in insertion order
    pub results: Vec<TrafficResult>,
}

impl CameraSource {
    /// Image identifier embedded in the camera URL
    pub fn identifier(&self) -> String {
        identifier_from_url(&self.url)
    }

    /// Mirror a stored result onto this in-memory copy
    pub fn record_result(&mut self, result: TrafficResult) {
        self.current_traffic_amount = result.traffic_amount;
        self.cctv_date = result.cctv_date.clone();
        self.results.push(result);
    }

    /// Plain-text description used as the document for similarity search
    pub fn traffic_summary(&self) -> String {
        let cctv_date = self.cctv_date.as_deref().unwrap_or("unknown");
        let mut summary = format!(
            "The traffic in the camera named [{}] is [{}/100] at the time [{}].\nTraffic Camera History:",
            self.title, self.current_traffic_amount, cctv_date
        );
        for (index, result) in self.results.iter().enumerate() {
            summary.push_str(&format!(
                " Index: [{}]. The traffic is [{}/100] at the time [{}].",
                index,
                result.traffic_amount,
                result.cctv_date.as_deref().unwrap_or("unknown")
            ));
        }
        summary
    }
}

/// Field patch applied by the bootstrap phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceUpdate {
    pub title: Option<String>,
    pub cctv_date: Option<String>,
}

impl SourceUpdate {
    /// Name a camera after its first reading
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            title: Some(reading.title.clone()),
            cctv_date: Some(reading.date.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.cctv_date.is_none()
    }
}

/// Derive the image identifier from a camera URL
///
/// `http://host/e-Traffic3/data/TF-123.jpg` becomes `TF-123`.
pub fn identifier_from_url(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).replace(".jpg", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_source() -> CameraSource {
        let ts = Utc.with_ymd_and_hms(2025, 6, 12, 18, 0, 0).unwrap();
        CameraSource {
            id: 7,
            url: "http://cic.tenerife.es/e-Traffic3/data/TF-5-21.jpg".to_string(),
            title: "3M-TVM-21 (Túnel 3 de Mayo)".to_string(),
            enabled: true,
            cctv_date: Some("12/06/2025 18:47".to_string()),
            current_traffic_amount: 40,
            created_at: ts,
            updated_at: ts,
            results: vec![],
        }
    }

    #[test]
    fn reading_validity_requires_title_and_date() {
        assert!(Reading::new("Cam", "12/06/2025 18:47", 0).is_valid());
        assert!(!Reading::new("", "12/06/2025 18:47", 10).is_valid());
        assert!(!Reading::new("Cam", "", 10).is_valid());
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let outcome = AnalysisOutcome::matched("http://x/a.jpg", Reading::new("A", "B", 3));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["sourceUrl"], "http://x/a.jpg");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["reading"]["traffic"], 3);
    }

    #[test]
    fn empty_outcome_has_null_reading() {
        let outcome = AnalysisOutcome::empty("http://x/a.jpg");
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json["reading"].is_null());
    }

    #[test]
    fn identifier_strips_path_and_extension() {
        assert_eq!(
            identifier_from_url("http://cic.tenerife.es/e-Traffic3/data/TF-5-21.jpg"),
            "TF-5-21"
        );
        assert_eq!(identifier_from_url("plain"), "plain");
        assert_eq!(sample_source().identifier(), "TF-5-21");
    }

    #[test]
    fn record_result_appends_and_refreshes_current_values() {
        let mut source = sample_source();
        let result = TrafficResult {
            id: 1,
            source_id: 7,
            traffic_title: source.title.clone(),
            cctv_date: Some("12/06/2025 18:52".to_string()),
            traffic_amount: 85,
            created_at: Utc::now(),
        };
        source.record_result(result);

        assert_eq!(source.results.len(), 1);
        assert_eq!(source.current_traffic_amount, 85);
        assert_eq!(source.cctv_date.as_deref(), Some("12/06/2025 18:52"));
    }

    #[test]
    fn summary_lists_history_in_order() {
        let mut source = sample_source();
        for (i, amount) in [10, 20].into_iter().enumerate() {
            source.record_result(TrafficResult {
                id: i as i64,
                source_id: 7,
                traffic_title: source.title.clone(),
                cctv_date: Some(format!("12/06/2025 18:5{}", i)),
                traffic_amount: amount,
                created_at: Utc::now(),
            });
        }
        let summary = source.traffic_summary();
        assert!(summary.contains("[3M-TVM-21 (Túnel 3 de Mayo)] is [20/100]"));
        let first = summary.find("Index: [0]").unwrap();
        let second = summary.find("Index: [1]").unwrap();
        assert!(first < second);
    }

    #[test]
    fn source_update_from_reading() {
        let update = SourceUpdate::from_reading(&Reading::new("Cam", "01/01/2024 12:00", 5));
        assert_eq!(update.title.as_deref(), Some("Cam"));
        assert_eq!(update.cctv_date.as_deref(), Some("01/01/2024 12:00"));
        assert!(!update.is_empty());
        assert!(SourceUpdate::default().is_empty());
    }
}
