use crate::application::filter::TransferFilter;
use crate::application::reliability::{SourceReliabilityTable, SourceTierConfig};
use crate::application::scheduler::{ChangeDetection, SchedulerConfig};
use crate::application::vocabulary::{ClubEntry, ClubVocabulary, League};
use crate::domain::error::DomainError;
use crate::infrastructure::feeds::scoreinside::ScoreInsideConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_PATH_VAR: &str = "TRANSFERWATCH_CONFIG";
pub const INTERVAL_VAR: &str = "TRANSFERWATCH_INTERVAL_MINUTES";
pub const TIMEOUT_VAR: &str = "TRANSFERWATCH_TIMEOUT_SECS";
pub const CONCURRENCY_VAR: &str = "TRANSFERWATCH_CONCURRENCY";
pub const URLS_VAR: &str = "TRANSFERWATCH_URLS";
pub const SCOREINSIDE_TOKEN_VAR: &str = "TRANSFERWATCH_SCOREINSIDE_TOKEN";

/// Longest accepted polling interval, one week.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Outlet transfer pages polled by default.
const NEWS_URLS: &[&str] = &[
    "https://www.bbc.com/sport/football/transfers",
    "https://www.skysports.com/football/transfers",
    "https://www.premierleague.com/news",
    "https://www.transfermarkt.com/premier-league/transfers/wettbewerb/GB1",
    "https://www.goal.com/en/transfers",
    "https://www.football365.com/transfers",
    "https://www.teamtalk.com/transfers",
    "https://www.planetsport.com/football/transfers",
    "https://www.givemesport.com/transfer-news",
    "https://talksport.com/football/transfer-news",
];

/// Official club news pages polled by default.
const CLUB_URLS: &[&str] = &[
    "https://www.arsenal.com/news",
    "https://www.chelseafc.com/en/news",
    "https://www.liverpoolfc.com/news",
    "https://www.manutd.com/en/news",
    "https://www.mancity.com/news",
    "https://www.tottenhamhotspur.com/news",
    "https://www.whufc.com/news",
    "https://www.avfc.co.uk/news",
    "https://www.brentfordfc.com/news",
    "https://www.brightonandhovealbion.com/news",
    "https://www.evertonfc.com/news",
    "https://www.fulhamfc.com/news",
    "https://www.leedsunited.com/news",
    "https://www.nufc.co.uk/news",
    "https://www.cpfc.co.uk/news",
];

pub fn default_urls() -> Vec<String> {
    NEWS_URLS
        .iter()
        .chain(CLUB_URLS)
        .map(|u| u.to_string())
        .collect()
}

/// Process-wide settings, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub urls: Vec<String>,
    pub interval_minutes: u64,
    pub fetch_timeout_secs: u64,
    pub max_concurrency: usize,
    pub change_detection: ChangeDetection,
    pub clubs: Vec<ClubEntry>,
    pub tiers: SourceTierConfig,
    pub criteria: TransferFilter,
    pub scoreinside: Option<ScoreInsideConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            interval_minutes: 15,
            fetch_timeout_secs: 15,
            max_concurrency: 8,
            change_detection: ChangeDetection::default(),
            clubs: League::PremierLeague.clubs(),
            tiers: SourceTierConfig::default(),
            criteria: TransferFilter::default(),
            scoreinside: None,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: AppConfig = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Config(format!("invalid {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        if let Some(v) = lookup(INTERVAL_VAR) {
            config.interval_minutes = parse_var(INTERVAL_VAR, &v)?;
        }
        if let Some(v) = lookup(TIMEOUT_VAR) {
            config.fetch_timeout_secs = parse_var(TIMEOUT_VAR, &v)?;
        }
        if let Some(v) = lookup(CONCURRENCY_VAR) {
            config.max_concurrency = parse_var(CONCURRENCY_VAR, &v)?;
        }
        if let Some(v) = lookup(URLS_VAR) {
            config.urls = v
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(token) = lookup(SCOREINSIDE_TOKEN_VAR).filter(|t| !t.trim().is_empty()) {
            config
                .scoreinside
                .get_or_insert_with(ScoreInsideConfig::default)
                .token = token.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        interval_from_minutes(self.interval_minutes)?;
        if self.fetch_timeout_secs == 0 {
            return Err(DomainError::Config("fetchTimeoutSecs must be at least 1".into()));
        }
        if self.max_concurrency == 0 {
            return Err(DomainError::Config("maxConcurrency must be at least 1".into()));
        }
        if self.clubs.is_empty() {
            return Err(DomainError::Config("club vocabulary is empty".into()));
        }
        Ok(())
    }

    /// Polling interval, clamped to [`MAX_INTERVAL_MINUTES`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.min(MAX_INTERVAL_MINUTES) * 60)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn vocabulary(&self) -> ClubVocabulary {
        ClubVocabulary::new(self.clubs.clone())
    }

    pub fn reliability(&self) -> SourceReliabilityTable {
        SourceReliabilityTable::new(&self.tiers)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            urls: self.urls.clone(),
            max_concurrency: self.max_concurrency,
            fetch_timeout: self.fetch_timeout(),
            change_detection: self.change_detection,
            criteria: self.criteria.clone(),
        }
    }
}

/// Polling interval for a minute count from config or the command line.
pub fn interval_from_minutes(minutes: u64) -> Result<Duration, DomainError> {
    match minutes.checked_mul(60) {
        Some(secs) if (1..=MAX_INTERVAL_MINUTES).contains(&minutes) => Ok(Duration::from_secs(secs)),
        _ => Err(DomainError::Config(format!(
            "interval must be between 1 and {MAX_INTERVAL_MINUTES} minutes, got {minutes}"
        ))),
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, DomainError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| DomainError::Config(format!("{name}={value:?}: {e}")))
}
