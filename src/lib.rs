pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::extract::CandidateExtractor;
use crate::application::filter::TransferFilter;
use crate::application::merge::{merge, DocumentExtraction};
use crate::application::reliability::SourceReliabilityTable;
use crate::application::scheduler::{CycleReport, SchedulerConfig, TransferScheduler};
use crate::application::vocabulary::ClubVocabulary;
use crate::config::AppConfig;
use crate::domain::entities::transfer_candidate::TransferCandidate;
use crate::domain::entities::transfer_record::TransferRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::content_source::ContentSource;
use crate::domain::ports::transfer_feed::TransferFeed;
use crate::domain::values::source_tier::SourceScore;
use crate::infrastructure::feeds::http::HttpContentSource;
use crate::infrastructure::feeds::scoreinside::ScoreInsideFeed;
use crate::infrastructure::notify::TracingListener;
use chrono::Utc;
use std::sync::Arc;

pub struct TransferWatch {
    config: AppConfig,
    vocabulary: Arc<ClubVocabulary>,
    extractor: Arc<CandidateExtractor>,
    reliability: Arc<SourceReliabilityTable>,
    source: Arc<dyn ContentSource>,
}

impl TransferWatch {
    /// Build from `TRANSFERWATCH_*` environment settings, fetching over HTTP.
    pub fn new() -> Result<Self, DomainError> {
        Self::from_config(AppConfig::from_env()?)
    }

    pub fn from_config(config: AppConfig) -> Result<Self, DomainError> {
        let source = Arc::new(HttpContentSource::new(config.fetch_timeout()));
        Self::with_source(config, source)
    }

    /// Use a caller-supplied content source instead of HTTP.
    pub fn with_source(
        config: AppConfig,
        source: Arc<dyn ContentSource>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let vocabulary = Arc::new(config.vocabulary());
        Ok(Self {
            extractor: Arc::new(CandidateExtractor::new(vocabulary.clone())),
            reliability: Arc::new(config.reliability()),
            vocabulary,
            config,
            source,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &ClubVocabulary {
        &self.vocabulary
    }

    pub fn extract(&self, content: &str, source_url: &str) -> Vec<TransferCandidate> {
        self.extractor.extract(content, source_url)
    }

    /// Extract one document and wrap the candidates as records.
    pub fn extract_records(&self, content: &str, source_url: &str) -> Vec<TransferRecord> {
        merge(vec![DocumentExtraction {
            source: source_url.to_string(),
            source_score: self.calculate_confidence_score(source_url),
            fetched_at: Utc::now(),
            candidates: self.extract(content, source_url),
        }])
    }

    pub fn merge(&self, documents: Vec<DocumentExtraction>) -> Vec<TransferRecord> {
        merge(documents)
    }

    pub fn filter(&self, records: &[TransferRecord], criteria: &TransferFilter) -> Vec<TransferRecord> {
        application::filter::filter(records, criteria)
    }

    pub fn calculate_confidence_score(&self, source: &str) -> SourceScore {
        self.reliability.calculate_confidence_score(source)
    }

    /// A scheduler over the configured URLs, feeds and criteria, logging
    /// notifications through tracing.
    pub fn scheduler(&self) -> TransferScheduler {
        self.scheduler_with(self.config.scheduler_config())
    }

    pub fn scheduler_with(&self, config: SchedulerConfig) -> TransferScheduler {
        let mut builder = TransferScheduler::builder(
            self.source.clone(),
            self.extractor.clone(),
            self.reliability.clone(),
        )
        .config(config)
        .listener(Arc::new(TracingListener));
        for feed in self.feeds() {
            builder = builder.feed(feed);
        }
        builder.build()
    }

    /// Run a single cycle over `urls` (the configured set when `None`)
    /// with `criteria` in place of the configured ones.
    pub async fn scan(
        &self,
        urls: Option<Vec<String>>,
        criteria: TransferFilter,
    ) -> Result<CycleReport, DomainError> {
        let mut config = self.config.scheduler_config();
        if let Some(urls) = urls {
            config.urls = urls;
        }
        config.criteria = criteria;
        self.scheduler_with(config).trigger().await
    }

    fn feeds(&self) -> Vec<Arc<dyn TransferFeed>> {
        match &self.config.scoreinside {
            Some(si) if !si.token.is_empty() => vec![Arc::new(ScoreInsideFeed::new(
                si.clone(),
                self.vocabulary.clone(),
                &self.reliability,
                self.config.fetch_timeout(),
            ))],
            _ => Vec::new(),
        }
    }
}
