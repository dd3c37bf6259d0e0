use crate::application::patterns::find_fee;
use crate::application::reliability::SourceReliabilityTable;
use crate::application::vocabulary::ClubVocabulary;
use crate::domain::entities::transfer_candidate::UNKNOWN_CLUB;
use crate::domain::entities::transfer_record::TransferRecord;
use crate::domain::error::FeedError;
use crate::domain::ports::transfer_feed::TransferFeed;
use crate::domain::values::confidence::ExtractionConfidence;
use crate::domain::values::fee::Fee;
use crate::domain::values::source_tier::SourceScore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://liveapi.scoreinside.com";

/// Confidence for entries the API files under a done-deal category.
const CONFIRMED_CONFIDENCE: f64 = 0.9;
/// Confidence for rumours and links.
const REPORTED_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreInsideConfig {
    pub token: String,
    pub base_url: String,
    pub max_pages: u32,
    pub per_page: u32,
}

impl Default for ScoreInsideConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: 1,
            per_page: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    status: u16,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TopTransfersResult {
    #[serde(default)]
    top_transfers: Vec<TopTransfer>,
}

#[derive(Debug, Deserialize)]
struct TopTransfer {
    #[serde(default)]
    scat: String,
    #[serde(default)]
    pr: Option<String>,
    team_from: Option<Team>,
    team: Option<Team>,
    player: Option<Player>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    transfer_articles: Option<ArticlePage>,
}

#[derive(Debug, Deserialize)]
struct ArticlePage {
    #[serde(default)]
    data: Vec<TransferArticle>,
}

#[derive(Debug, Deserialize)]
struct TransferArticle {
    #[serde(default)]
    scat: String,
    article: Option<Article>,
    team: Option<Team>,
    team_from: Option<Team>,
    player: Option<Player>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    hdl: String,
    #[serde(default)]
    sdt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Team {
    #[serde(default)]
    nm: String,
}

#[derive(Debug, Deserialize)]
struct Player {
    #[serde(default)]
    nm: String,
}

/// Parsed fields common to both endpoints.
struct Entry<'a> {
    player: Option<&'a Player>,
    team: Option<&'a Team>,
    team_from: Option<&'a Team>,
    scat: &'a str,
    fee: Fee,
    date: DateTime<Utc>,
}

/// Top transfers and transfer news from the ScoreInside live API.
pub struct ScoreInsideFeed {
    config: ScoreInsideConfig,
    vocabulary: Arc<ClubVocabulary>,
    source_score: SourceScore,
    client: reqwest::Client,
}

impl ScoreInsideFeed {
    pub fn new(
        config: ScoreInsideConfig,
        vocabulary: Arc<ClubVocabulary>,
        reliability: &SourceReliabilityTable,
        timeout: Duration,
    ) -> Self {
        let source_score = reliability.calculate_confidence_score(&config.base_url);
        Self {
            config,
            vocabulary,
            source_score,
            client: reqwest::Client::builder()
                .user_agent("transferwatch/0.1")
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    fn top_transfers_url(&self) -> String {
        format!(
            "{}/api/user/favourite/team-top-transfers",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn news_url(&self) -> String {
        format!(
            "{}/api/user/favourite/teams/news",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, FeedError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FeedError::Network(format!(
                "ScoreInside API returned {}",
                resp.status()
            )));
        }

        resp.text()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))
    }

    /// Convert a top-transfers response body into records.
    pub fn parse_top_transfers(&self, body: &str) -> Result<Vec<TransferRecord>, FeedError> {
        let resp: ApiResponse<TopTransfersResult> =
            serde_json::from_str(body).map_err(|e| FeedError::Parse(e.to_string()))?;
        check_status(resp.status)?;
        let now = Utc::now();
        Ok(resp
            .result
            .map(|r| r.top_transfers)
            .unwrap_or_default()
            .iter()
            .filter_map(|t| {
                self.to_record(Entry {
                    player: t.player.as_ref(),
                    team: t.team.as_ref(),
                    team_from: t.team_from.as_ref(),
                    scat: &t.scat,
                    fee: t.pr.as_deref().map(Fee::parse_lenient).unwrap_or_default(),
                    date: now,
                })
            })
            .collect())
    }

    /// Convert one transfer-news page into records. The second value is the
    /// number of raw articles on the page, used to decide on pagination.
    pub fn parse_news_page(&self, body: &str) -> Result<(Vec<TransferRecord>, usize), FeedError> {
        let resp: ApiResponse<NewsResult> =
            serde_json::from_str(body).map_err(|e| FeedError::Parse(e.to_string()))?;
        check_status(resp.status)?;
        let articles = resp
            .result
            .and_then(|r| r.transfer_articles)
            .map(|p| p.data)
            .unwrap_or_default();
        let now = Utc::now();
        let records = articles
            .iter()
            .filter_map(|a| {
                let headline = a.article.as_ref().map(|art| art.hdl.as_str()).unwrap_or("");
                let date = a
                    .article
                    .as_ref()
                    .and_then(|art| art.sdt.as_deref())
                    .and_then(parse_date)
                    .unwrap_or(now);
                self.to_record(Entry {
                    player: a.player.as_ref(),
                    team: a.team.as_ref(),
                    team_from: a.team_from.as_ref(),
                    scat: &a.scat,
                    fee: find_fee(headline).unwrap_or_default(),
                    date,
                })
            })
            .collect();
        Ok((records, articles.len()))
    }

    fn to_record(&self, entry: Entry<'_>) -> Option<TransferRecord> {
        let player = entry.player.map(|p| p.nm.trim()).filter(|n| !n.is_empty())?;
        let team = entry.team.map(|t| t.nm.as_str())?;
        let Some(to_club) = self.vocabulary.resolve(team) else {
            debug!(player, team, "destination outside club vocabulary, skipping");
            return None;
        };
        let from_club = entry
            .team_from
            .and_then(|t| self.vocabulary.resolve(&t.nm))
            .filter(|from| *from != to_club)
            .unwrap_or(UNKNOWN_CLUB);

        let confidence = ExtractionConfidence::new(category_confidence(entry.scat)).ok()?;
        Some(TransferRecord {
            id: uuid::Uuid::new_v4().to_string(),
            player_name: player.to_string(),
            from_club: from_club.to_string(),
            to_club: to_club.to_string(),
            fee: entry.fee,
            confidence,
            verification_status: confidence.verification_status(),
            source_score: self.source_score,
            source: self.config.base_url.clone(),
            date: entry.date,
        })
    }
}

#[async_trait]
impl TransferFeed for ScoreInsideFeed {
    fn name(&self) -> &str {
        "scoreinside"
    }

    async fn fetch(&self) -> Result<Vec<TransferRecord>, FeedError> {
        if self.config.token.is_empty() {
            return Err(FeedError::Config("ScoreInside token not set".into()));
        }

        let token = ("fcm_token", self.config.token.clone());
        let body = self.get(&self.top_transfers_url(), &[token.clone()]).await?;
        let mut records = self.parse_top_transfers(&body)?;

        for page in 1..=self.config.max_pages {
            let query = [
                ("page", page.to_string()),
                ("per_page", self.config.per_page.to_string()),
                token.clone(),
            ];
            let body = match self.get(&self.news_url(), &query).await {
                Ok(body) => body,
                Err(e) if page > 1 => {
                    warn!(page, error = %e, "news page failed, keeping earlier pages");
                    break;
                }
                Err(e) => return Err(e),
            };
            let (page_records, raw) = self.parse_news_page(&body)?;
            records.extend(page_records);
            if raw < self.config.per_page as usize {
                break;
            }
        }

        debug!(count = records.len(), "scoreinside records");
        Ok(records)
    }
}

fn check_status(status: u16) -> Result<(), FeedError> {
    if status == 0 || status == 200 {
        Ok(())
    } else {
        Err(FeedError::Network(format!("ScoreInside API status {status}")))
    }
}

/// Category labels the API uses for completed deals.
pub fn is_confirmed_category(scat: &str) -> bool {
    matches!(
        scat.trim().to_lowercase().as_str(),
        "top source" | "confirmed" | "official" | "done deal" | "done deals"
    )
}

fn category_confidence(scat: &str) -> f64 {
    if is_confirmed_category(scat) {
        CONFIRMED_CONFIDENCE
    } else {
        REPORTED_CONFIDENCE
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|d| d.and_utc())
        })
}
