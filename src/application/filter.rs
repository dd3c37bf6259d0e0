//! Post-hoc filtering of detected transfers.

use crate::domain::entities::transfer_record::TransferRecord;
use serde::{Deserialize, Serialize};

/// Caller-supplied criteria. Every absent field passes; present fields are
/// ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferFilter {
    /// Minimum fee in GBP-equivalent units. Non-numeric fees count as 0.
    pub min_fee: Option<f64>,
    /// Keep records whose origin or destination is listed.
    pub clubs: Option<Vec<String>>,
    /// Minimum source-tier score (0–100).
    pub min_confidence: Option<u8>,
}

impl TransferFilter {
    pub fn is_empty(&self) -> bool {
        self.min_fee.is_none()
            && self.clubs.as_ref().is_none_or(|c| c.is_empty())
            && self.min_confidence.is_none()
    }

    pub fn matches(&self, record: &TransferRecord) -> bool {
        let fee_ok = match self.min_fee {
            Some(min) if min > 0.0 => record.fee.gbp_value() >= min,
            _ => true,
        };
        let club_ok = match &self.clubs {
            Some(clubs) if !clubs.is_empty() => clubs.iter().any(|c| record.involves(c.trim())),
            _ => true,
        };
        let confidence_ok = self
            .min_confidence
            .is_none_or(|min| record.source_score.value() >= min);
        fee_ok && club_ok && confidence_ok
    }
}

/// Records matching `criteria`, in input order. The input is untouched.
pub fn filter(records: &[TransferRecord], criteria: &TransferFilter) -> Vec<TransferRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}
