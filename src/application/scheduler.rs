//! Periodic acquisition + extraction over a fixed URL set.
//!
//! A cycle fetches every URL and feed with bounded concurrency, each under
//! its own timeout. It then extracts and merges candidates, filters them
//! down to qualifying transfers and notifies listeners when new ones
//! appear. Cycles never overlap: the manual trigger and the timer share
//! one state lock.

use crate::application::extract::CandidateExtractor;
use crate::application::filter::{filter, TransferFilter};
use crate::application::merge::{merge, merge_records, DocumentExtraction};
use crate::application::reliability::SourceReliabilityTable;
use crate::domain::entities::transfer_record::TransferRecord;
use crate::domain::error::{DomainError, FeedError};
use crate::domain::ports::content_source::ContentSource;
use crate::domain::ports::listener::{TransferListener, TransferNotification};
use crate::domain::ports::transfer_feed::TransferFeed;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Shortest timer period; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);
/// Longest timer period, keeping `Instant` arithmetic in range.
const MAX_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// How a cycle decides that transfers are new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDetection {
    /// Players absent from the previous cycle's qualifying set.
    #[default]
    NewKeys,
    /// Growth of the qualifying count since the previous cycle.
    CountOnly,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub urls: Vec<String>,
    pub max_concurrency: usize,
    pub fetch_timeout: Duration,
    pub change_detection: ChangeDetection,
    /// Filter a record must pass to count as qualifying.
    pub criteria: TransferFilter,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            max_concurrency: 8,
            fetch_timeout: Duration::from_secs(15),
            change_detection: ChangeDetection::default(),
            criteria: TransferFilter::default(),
        }
    }
}

/// Outcome of one cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Every merged record of the cycle.
    pub records: Vec<TransferRecord>,
    /// Records that passed the scheduler's criteria.
    pub qualifying: Vec<TransferRecord>,
    pub new_count: usize,
    /// URLs and feeds that were read successfully.
    pub sources: Vec<String>,
    /// URLs and feeds that failed and contributed nothing.
    pub failed_sources: Vec<String>,
    pub notification: Option<TransferNotification>,
}

/// Carried from one cycle to the next.
#[derive(Debug, Default)]
struct CycleState {
    last_count: usize,
    last_keys: HashSet<String>,
}

struct Pipeline {
    config: SchedulerConfig,
    source: Arc<dyn ContentSource>,
    feeds: Vec<Arc<dyn TransferFeed>>,
    extractor: Arc<CandidateExtractor>,
    reliability: Arc<SourceReliabilityTable>,
    listeners: RwLock<Vec<Arc<dyn TransferListener>>>,
    state: tokio::sync::Mutex<CycleState>,
    last_report: Mutex<Option<CycleReport>>,
}

/// One unit of acquisition work in a cycle.
enum Job<'a> {
    Page(&'a str),
    Feed(&'a Arc<dyn TransferFeed>),
}

impl Job<'_> {
    fn name(&self) -> String {
        match self {
            Job::Page(url) => url.to_string(),
            Job::Feed(feed) => feed.name().to_string(),
        }
    }
}

enum Acquired {
    Page(String),
    Records(Vec<TransferRecord>),
}

impl Pipeline {
    async fn fetch_raw(&self, job: &Job<'_>) -> Result<Acquired, FeedError> {
        match job {
            Job::Page(url) => self.source.fetch(url).await.map(Acquired::Page),
            Job::Feed(feed) => feed.fetch().await.map(Acquired::Records),
        }
    }

    /// Fetch one URL or feed under the per-source timeout. A panic in the
    /// source is caught and reported as a failure of that source alone.
    async fn acquire(&self, job: Job<'_>) -> (String, Result<Acquired, FeedError>) {
        let timeout = self.config.fetch_timeout;
        let work = AssertUnwindSafe(self.fetch_raw(&job)).catch_unwind();
        let result = match tokio::time::timeout(timeout, work).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic_info)) => {
                let panic_msg = extract_panic_message(&panic_info);
                error!(source = %job.name(), panic = %panic_msg, "acquisition panicked");
                Err(FeedError::Network(format!("acquisition panicked: {panic_msg}")))
            }
            Err(_) => Err(FeedError::Timeout(timeout.as_secs())),
        };
        (job.name(), result)
    }

    async fn run_cycle(&self) -> CycleReport {
        let mut state = self.state.lock().await;
        let started_at = Utc::now();
        if self.config.urls.is_empty() && self.feeds.is_empty() {
            warn!("cycle started with no URLs or feeds configured");
        }

        // Pages first, then feeds; `buffered` keeps that order in the results.
        let jobs: Vec<Job<'_>> = self
            .config
            .urls
            .iter()
            .map(|url| Job::Page(url.as_str()))
            .chain(self.feeds.iter().map(Job::Feed))
            .collect();
        let acquisitions: Vec<_> = jobs.into_iter().map(|job| self.acquire(job)).collect();
        let fetched: Vec<(String, Result<Acquired, FeedError>)> = stream::iter(acquisitions)
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut sources = Vec::new();
        let mut failed_sources = Vec::new();
        let mut documents = Vec::new();
        let mut feed_records = Vec::new();
        for (name, result) in fetched {
            match result {
                Ok(Acquired::Page(text)) => {
                    let candidates = self.extractor.extract(&text, &name);
                    documents.push(DocumentExtraction {
                        source_score: self.reliability.calculate_confidence_score(&name),
                        source: name.clone(),
                        fetched_at: Utc::now(),
                        candidates,
                    });
                    sources.push(name);
                }
                Ok(Acquired::Records(records)) => {
                    debug!(feed = %name, count = records.len(), "feed read");
                    feed_records.extend(records);
                    sources.push(name);
                }
                Err(e) => {
                    warn!(source = %name, error = %e, "acquisition failed, skipping source");
                    failed_sources.push(name);
                }
            }
        }

        let records = merge_records(merge(documents).into_iter().chain(feed_records));
        let qualifying = filter(&records, &self.config.criteria);

        let (new_count, new_sources) = match self.config.change_detection {
            ChangeDetection::CountOnly => (
                qualifying.len().saturating_sub(state.last_count),
                distinct_sources(qualifying.iter()),
            ),
            ChangeDetection::NewKeys => {
                let fresh: Vec<&TransferRecord> = qualifying
                    .iter()
                    .filter(|r| !state.last_keys.contains(&r.player_key()))
                    .collect();
                (fresh.len(), distinct_sources(fresh.into_iter()))
            }
        };

        let notification = (new_count > 0).then(|| TransferNotification::new(new_count, new_sources));
        if let Some(n) = &notification {
            info!(count = n.count, sources = ?n.sources, "new transfers found");
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for listener in listeners {
                listener.notify(n);
            }
        }

        state.last_count = qualifying.len();
        state.last_keys = qualifying.iter().map(TransferRecord::player_key).collect();

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            records,
            qualifying,
            new_count,
            sources,
            failed_sources,
            notification,
        };
        info!(
            records = report.records.len(),
            qualifying = report.qualifying.len(),
            new = report.new_count,
            failed = report.failed_sources.len(),
            "cycle complete"
        );
        *self.last_report.lock().unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
        report
    }
}

fn extract_panic_message(panic_info: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn distinct_sources<'a>(records: impl Iterator<Item = &'a TransferRecord>) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .filter(|r| seen.insert(r.source.as_str()))
        .map(|r| r.source.clone())
        .collect()
}

/// Runs a cycle in its own task so a panic inside it cannot take the
/// timer down or leave the cycle state half-written.
async fn run_guarded(pipeline: Arc<Pipeline>) -> Result<CycleReport, DomainError> {
    tokio::spawn(async move { pipeline.run_cycle().await })
        .await
        .map_err(|e| {
            error!(error = %e, "cycle aborted");
            DomainError::Cycle(e.to_string())
        })
}

async fn poll_loop(pipeline: Arc<Pipeline>, interval: Duration, cancel: CancellationToken) {
    let _ = run_guarded(pipeline.clone()).await;

    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let _ = run_guarded(pipeline.clone()).await;
    }
    info!("transfer polling stopped");
}

struct RunHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Idle until [`start`](Self::start), running until [`stop`](Self::stop).
pub struct TransferScheduler {
    pipeline: Arc<Pipeline>,
    running: Mutex<Option<RunHandle>>,
}

impl TransferScheduler {
    pub fn builder(
        source: Arc<dyn ContentSource>,
        extractor: Arc<CandidateExtractor>,
        reliability: Arc<SourceReliabilityTable>,
    ) -> SchedulerBuilder {
        SchedulerBuilder {
            config: SchedulerConfig::default(),
            source,
            feeds: Vec::new(),
            extractor,
            reliability,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.pipeline.config
    }

    pub fn add_listener(&self, listener: Arc<dyn TransferListener>) {
        self.pipeline
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.task.is_finished())
    }

    /// Run one cycle now, then every `interval`. No-op (returns false) when
    /// already running. Must be called inside a Tokio runtime.
    pub fn start(&self, interval: Duration) -> bool {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.as_ref().is_some_and(|h| !h.task.is_finished()) {
            debug!("scheduler already running");
            return false;
        }

        let interval = interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(self.pipeline.clone(), interval, cancel.clone()));
        *running = Some(RunHandle { cancel, task });
        info!(
            interval_secs = interval.as_secs_f64(),
            urls = self.pipeline.config.urls.len(),
            "transfer polling started"
        );
        true
    }

    /// Stop re-arming the timer. A cycle already in flight completes.
    /// Returns false when not running.
    pub fn stop(&self) -> bool {
        let handle = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(h) => {
                h.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Like [`stop`](Self::stop), then wait for any in-flight cycle.
    pub async fn shutdown(&self) {
        let handle = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(h) = handle {
            h.cancel.cancel();
            if let Err(e) = h.task.await {
                error!(error = %e, "polling task ended abnormally");
            }
        }
    }

    /// Run one cycle immediately, independent of the timer.
    pub async fn trigger(&self) -> Result<CycleReport, DomainError> {
        run_guarded(self.pipeline.clone()).await
    }

    pub fn last_report(&self) -> Option<CycleReport> {
        self.pipeline
            .last_report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Qualifying count stored by the last completed cycle.
    pub async fn last_count(&self) -> usize {
        self.pipeline.state.lock().await.last_count
    }
}

impl Drop for TransferScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct SchedulerBuilder {
    config: SchedulerConfig,
    source: Arc<dyn ContentSource>,
    feeds: Vec<Arc<dyn TransferFeed>>,
    extractor: Arc<CandidateExtractor>,
    reliability: Arc<SourceReliabilityTable>,
    listeners: Vec<Arc<dyn TransferListener>>,
}

impl SchedulerBuilder {
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn urls(mut self, urls: Vec<String>) -> Self {
        self.config.urls = urls;
        self
    }

    pub fn feed(mut self, feed: Arc<dyn TransferFeed>) -> Self {
        self.feeds.push(feed);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn TransferListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> TransferScheduler {
        TransferScheduler {
            pipeline: Arc::new(Pipeline {
                config: self.config,
                source: self.source,
                feeds: self.feeds,
                extractor: self.extractor,
                reliability: self.reliability,
                listeners: RwLock::new(self.listeners),
                state: tokio::sync::Mutex::new(CycleState::default()),
                last_report: Mutex::new(None),
            }),
            running: Mutex::new(None),
        }
    }
}
