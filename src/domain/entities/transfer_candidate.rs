use crate::domain::values::confidence::ExtractionConfidence;
use crate::domain::values::fee::Fee;
use crate::domain::values::verification::VerificationStatus;
use serde::{Deserialize, Serialize};

/// Placeholder club when the origin cannot be read from local context.
pub const UNKNOWN_CLUB: &str = "Unknown";

/// One transfer statement extracted from one document. Never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCandidate {
    pub player_name: String,
    pub from_club: String,
    pub to_club: String,
    pub fee: Fee,
    /// Parse-time score, 0.0–1.0.
    pub confidence: ExtractionConfidence,
    pub verification_status: VerificationStatus,
}

impl TransferCandidate {
    pub fn new(
        player_name: String,
        from_club: Option<String>,
        to_club: String,
        fee: Fee,
        confidence: ExtractionConfidence,
    ) -> Self {
        Self {
            player_name,
            from_club: from_club.unwrap_or_else(|| UNKNOWN_CLUB.to_string()),
            to_club,
            fee,
            confidence,
            verification_status: confidence.verification_status(),
        }
    }

    /// Dedup key: trimmed, lower-cased player name.
    pub fn player_key(&self) -> String {
        self.player_name.trim().to_lowercase()
    }
}
