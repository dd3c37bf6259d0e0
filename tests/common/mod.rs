//! Shared test helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use transferwatch::application::extract::CandidateExtractor;
use transferwatch::application::reliability::SourceReliabilityTable;
use transferwatch::application::scheduler::{SchedulerConfig, TransferScheduler};
use transferwatch::application::vocabulary::ClubVocabulary;
use transferwatch::domain::entities::transfer_record::TransferRecord;
use transferwatch::domain::error::FeedError;
use transferwatch::domain::ports::content_source::ContentSource;
use transferwatch::domain::ports::listener::{TransferListener, TransferNotification};
use transferwatch::domain::ports::transfer_feed::TransferFeed;
use transferwatch::domain::values::confidence::ExtractionConfidence;
use transferwatch::domain::values::source_tier::SourceScore;

/// What a scripted URL returns on one call.
#[derive(Debug, Clone)]
pub enum Script {
    Text(String),
    Fail,
    Slow(Duration, String),
    Panic,
}

/// In-memory content source. Each URL replays its scripts in order, one
/// per call, repeating the last one once exhausted.
#[derive(Default)]
pub struct ScriptedSource {
    pages: HashMap<String, Vec<Script>>,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, scripts: Vec<Script>) -> Self {
        self.pages.insert(url.to_string(), scripts);
        self
    }

    /// A URL that always returns `text`.
    pub fn fixed(self, url: &str, text: &str) -> Self {
        self.page(url, vec![Script::Text(text.to_string())])
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_script(&self, url: &str) -> Option<Script> {
        let scripts = self.pages.get(url)?;
        let mut calls = self.calls.lock().unwrap();
        let n = calls.entry(url.to_string()).or_insert(0);
        let script = scripts.get(*n).or_else(|| scripts.last()).cloned();
        *n += 1;
        script
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        match self.next_script(url) {
            Some(Script::Text(text)) => Ok(text),
            Some(Script::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Script::Fail) => Err(FeedError::Network(format!("{url} unreachable"))),
            Some(Script::Panic) => panic!("scripted panic for {url}"),
            None => Err(FeedError::Network(format!("no route to {url}"))),
        }
    }
}

/// Feed returning a fixed record set, optionally after a delay.
pub struct StaticFeed {
    pub records: Vec<TransferRecord>,
    pub delay: Duration,
}

impl StaticFeed {
    pub fn new(records: Vec<TransferRecord>) -> Self {
        Self {
            records,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl TransferFeed for StaticFeed {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<Vec<TransferRecord>, FeedError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.records.clone())
    }
}

#[derive(Default)]
pub struct CollectingListener {
    pub received: Mutex<Vec<TransferNotification>>,
}

impl CollectingListener {
    pub fn notifications(&self) -> Vec<TransferNotification> {
        self.received.lock().unwrap().clone()
    }
}

impl TransferListener for CollectingListener {
    fn notify(&self, notification: &TransferNotification) {
        self.received.lock().unwrap().push(notification.clone());
    }
}

/// "Name joins Club." sentences, one per pair.
pub fn joins(moves: &[(&str, &str)]) -> String {
    moves
        .iter()
        .map(|(player, club)| format!("{player} joins {club}."))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn scheduler(
    source: Arc<ScriptedSource>,
    config: SchedulerConfig,
) -> (TransferScheduler, Arc<CollectingListener>) {
    let vocabulary = Arc::new(ClubVocabulary::premier_league());
    let listener = Arc::new(CollectingListener::default());
    let scheduler = TransferScheduler::builder(
        source,
        Arc::new(CandidateExtractor::new(vocabulary)),
        Arc::new(SourceReliabilityTable::default()),
    )
    .config(config)
    .listener(listener.clone())
    .build();
    (scheduler, listener)
}

pub fn config_for(urls: &[&str]) -> SchedulerConfig {
    SchedulerConfig {
        urls: urls.iter().map(|u| u.to_string()).collect(),
        fetch_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

pub fn record(player: &str, from: &str, to: &str, fee: &str, score: u8) -> TransferRecord {
    let confidence = ExtractionConfidence::new(0.9).unwrap();
    TransferRecord {
        id: uuid::Uuid::new_v4().to_string(),
        player_name: player.to_string(),
        from_club: from.to_string(),
        to_club: to.to_string(),
        fee: fee.parse().unwrap(),
        confidence,
        verification_status: confidence.verification_status(),
        source_score: SourceScore::new(score).unwrap(),
        source: format!("https://{}.example", to.to_lowercase().replace(' ', "")),
        date: Utc::now(),
    }
}

/// Poll `check` every 10ms for up to two seconds.
pub async fn wait_until(check: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
