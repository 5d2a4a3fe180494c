//! In-memory collaborator fakes

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use tja_analyzer::error::AnalyzerError;
use tja_analyzer::services::{FetchError, ModelError};
use tja_analyzer::types::{ImageFetcher, ModelClient, SourceAnalyzer, SourceRepository, VectorIndex};
use tja_common::{
    AnalysisOutcome, CameraSource, Error, Reading, SourceUpdate, TrafficResult,
};

/// Camera with an `http://cams.test/data/{identifier}.jpg` URL
pub fn camera(id: i64, identifier: &str, title: &str) -> CameraSource {
    let now = Utc::now();
    CameraSource {
        id,
        url: format!("http://cams.test/data/{}.jpg", identifier),
        title: title.to_string(),
        enabled: true,
        cctv_date: None,
        current_traffic_amount: 0,
        created_at: now,
        updated_at: now,
        results: Vec::new(),
    }
}

/// Model that replays a fixed script of replies
///
/// Once the script runs out every call returns empty text.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: Mutex<Vec<(String, Option<Vec<u8>>)>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, error: ModelError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Prompts received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Image payloads received, in order
    pub fn images(&self) -> Vec<Option<Vec<u8>>> {
        self.calls.lock().unwrap().iter().map(|(_, i)| i.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, ModelError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), image.map(|i| i.to_vec())));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

/// Fetcher returning fixed bytes, or failing with a status
pub struct FakeFetcher {
    result: Result<Vec<u8>, u16>,
    urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn ok(bytes: &[u8]) -> Self {
        Self {
            result: Ok(bytes.to_vec()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            result: Err(status),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.result.clone().map_err(FetchError::Status)
    }
}

/// Source repository kept in a vector
#[derive(Default)]
pub struct InMemoryRepository {
    sources: Mutex<Vec<CameraSource>>,
    next_result_id: Mutex<i64>,
    fail_listing: bool,
    listing_delay: Option<Duration>,
    fail_append_for: HashSet<i64>,
    updates: Mutex<Vec<(i64, SourceUpdate)>>,
}

impl InMemoryRepository {
    pub fn new(sources: Vec<CameraSource>) -> Self {
        Self {
            sources: Mutex::new(sources),
            ..Default::default()
        }
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make both listing calls take this long
    pub fn slow_listing(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    pub fn failing_append_for(mut self, id: i64) -> Self {
        self.fail_append_for.insert(id);
        self
    }

    pub fn source(&self, id: i64) -> Option<CameraSource> {
        self.sources.lock().unwrap().iter().find(|s| s.id == id).cloned()
    }

    pub fn updates(&self) -> Vec<(i64, SourceUpdate)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceRepository for InMemoryRepository {
    async fn list_enabled(&self) -> tja_common::Result<Vec<CameraSource>> {
        if let Some(delay) = self.listing_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_listing {
            return Err(Error::Io(std::io::Error::other("listing unavailable")));
        }
        Ok(self
            .sources
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.enabled)
            .cloned()
            .collect())
    }

    async fn list_by_title(&self, title: &str) -> tja_common::Result<Vec<CameraSource>> {
        if let Some(delay) = self.listing_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_listing {
            return Err(Error::Io(std::io::Error::other("listing unavailable")));
        }
        Ok(self
            .sources
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.title.eq_ignore_ascii_case(title))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, fields: &SourceUpdate) -> tja_common::Result<()> {
        self.updates.lock().unwrap().push((id, fields.clone()));
        let mut sources = self.sources.lock().unwrap();
        let source = sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("traffic source {}", id)))?;
        if let Some(title) = &fields.title {
            source.title = title.clone();
        }
        if let Some(date) = &fields.cctv_date {
            source.cctv_date = Some(date.clone());
        }
        Ok(())
    }

    async fn append_result(&self, id: i64, reading: &Reading) -> tja_common::Result<TrafficResult> {
        if self.fail_append_for.contains(&id) {
            return Err(Error::Io(std::io::Error::other(format!("append failed for {}", id))));
        }

        let result_id = {
            let mut next = self.next_result_id.lock().unwrap();
            *next += 1;
            *next
        };

        let result = TrafficResult {
            id: result_id,
            source_id: id,
            traffic_title: reading.title.clone(),
            cctv_date: Some(reading.date.clone()),
            traffic_amount: reading.traffic,
            created_at: Utc::now(),
        };

        let mut sources = self.sources.lock().unwrap();
        let source = sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("traffic source {}", id)))?;
        source.record_result(result.clone());
        Ok(result)
    }
}

/// Vector index that remembers every upsert
#[derive(Default)]
pub struct RecordingIndex {
    upserts: Mutex<Vec<CameraSource>>,
    fail_for: HashSet<i64>,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, id: i64) -> Self {
        self.fail_for.insert(id);
        self
    }

    pub fn upserts(&self) -> Vec<CameraSource> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for RecordingIndex {
    async fn upsert(&self, source: &CameraSource) -> Result<bool, AnalyzerError> {
        if self.fail_for.contains(&source.id) {
            return Err(AnalyzerError::VectorIndex(format!("index down for {}", source.id)));
        }
        self.upserts.lock().unwrap().push(source.clone());
        Ok(true)
    }
}

/// Analyzer with a canned outcome per identifier
///
/// Unknown identifiers produce an outcome without a reading.
#[derive(Default)]
pub struct ScriptedAnalyzer {
    readings: HashMap<String, Reading>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    analyzed: Mutex<Vec<String>>,
}

impl ScriptedAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reading(mut self, identifier: &str, title: &str, date: &str, traffic: i32) -> Self {
        self.readings
            .insert(identifier.to_string(), Reading::new(title, date, traffic));
        self
    }

    pub fn failing(mut self, identifier: &str) -> Self {
        self.failing.insert(identifier.to_string());
        self
    }

    /// Make every analysis take this long
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Identifiers analyzed so far, in order
    pub fn analyzed(&self) -> Vec<String> {
        self.analyzed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, identifier: &str) -> Result<AnalysisOutcome, AnalyzerError> {
        self.analyzed.lock().unwrap().push(identifier.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let url = format!("http://cams.test/data/{}.jpg", identifier);
        if self.failing.contains(identifier) {
            return Err(AnalyzerError::Model(ModelError::Connection(
                "http://model.test".to_string(),
            )));
        }

        Ok(match self.readings.get(identifier) {
            Some(reading) => AnalysisOutcome::matched(url, reading.clone()),
            None => AnalysisOutcome::empty(url),
        })
    }
}
