use crate::domain::entities::transfer_candidate::TransferCandidate;
use crate::domain::values::confidence::ExtractionConfidence;
use crate::domain::values::fee::Fee;
use crate::domain::values::source_tier::{SourceScore, SourceTier};
use crate::domain::values::verification::VerificationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deduplicated candidate tied to the document it came from. Lives for one
/// polling cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub id: String,
    pub player_name: String,
    pub from_club: String,
    pub to_club: String,
    pub fee: Fee,
    /// Parse-time score, 0.0–1.0. Governs `verification_status`.
    pub confidence: ExtractionConfidence,
    pub verification_status: VerificationStatus,
    /// Source reliability, 0–100. Governs tier badges and filtering.
    pub source_score: SourceScore,
    pub source: String,
    pub date: DateTime<Utc>,
}

impl TransferRecord {
    pub fn from_candidate(
        candidate: TransferCandidate,
        source: impl Into<String>,
        source_score: SourceScore,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            player_name: candidate.player_name,
            from_club: candidate.from_club,
            to_club: candidate.to_club,
            fee: candidate.fee,
            confidence: candidate.confidence,
            verification_status: candidate.verification_status,
            source_score,
            source: source.into(),
            date,
        }
    }

    pub fn player_key(&self) -> String {
        self.player_name.trim().to_lowercase()
    }

    pub fn tier(&self) -> SourceTier {
        self.source_score.tier()
    }

    /// Whether either side of the move is `club` (case-insensitive).
    pub fn involves(&self, club: &str) -> bool {
        self.to_club.eq_ignore_ascii_case(club) || self.from_club.eq_ignore_ascii_case(club)
    }

    pub fn summary(&self) -> String {
        if self.from_club == crate::domain::entities::transfer_candidate::UNKNOWN_CLUB {
            format!("{} → {} ({})", self.player_name, self.to_club, self.fee)
        } else {
            format!(
                "{}: {} → {} ({})",
                self.player_name, self.from_club, self.to_club, self.fee
            )
        }
    }
}
