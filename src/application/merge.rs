//! Cross-document deduplication: one record per player, first seen wins.

use crate::domain::entities::transfer_candidate::TransferCandidate;
use crate::domain::entities::transfer_record::TransferRecord;
use crate::domain::values::source_tier::SourceScore;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Candidates extracted from one document, with the document's provenance.
#[derive(Debug, Clone)]
pub struct DocumentExtraction {
    pub source: String,
    pub source_score: SourceScore,
    pub fetched_at: DateTime<Utc>,
    pub candidates: Vec<TransferCandidate>,
}

impl DocumentExtraction {
    fn into_records(self) -> impl Iterator<Item = TransferRecord> {
        let DocumentExtraction {
            source,
            source_score,
            fetched_at,
            candidates,
        } = self;
        candidates.into_iter().map(move |c| {
            TransferRecord::from_candidate(c, source.clone(), source_score, fetched_at)
        })
    }
}

/// Flatten documents in input order into records, keeping the first record
/// per lower-cased player name.
pub fn merge(documents: Vec<DocumentExtraction>) -> Vec<TransferRecord> {
    merge_records(documents.into_iter().flat_map(DocumentExtraction::into_records))
}

/// Order-preserving, first-wins dedup of records already built.
pub fn merge_records(records: impl IntoIterator<Item = TransferRecord>) -> Vec<TransferRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            let key = r.player_key();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::confidence::ExtractionConfidence;
    use crate::domain::values::fee::Fee;

    fn candidate(player: &str, to: &str) -> TransferCandidate {
        TransferCandidate::new(
            player.into(),
            None,
            to.into(),
            Fee::Undisclosed,
            ExtractionConfidence::new(0.9).unwrap(),
        )
    }

    fn doc(source: &str, candidates: Vec<TransferCandidate>) -> DocumentExtraction {
        DocumentExtraction {
            source: source.into(),
            source_score: SourceScore::unrated(),
            fetched_at: Utc::now(),
            candidates,
        }
    }

    #[test]
    fn test_first_document_wins() {
        let merged = merge(vec![
            doc("a", vec![candidate("Jane Doe", "Arsenal")]),
            doc("b", vec![candidate("JANE DOE ", "Chelsea"), candidate("Jo Bloggs", "Everton")]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].to_club, "Arsenal");
        assert_eq!(merged[0].source, "a");
        assert_eq!(merged[1].player_name, "Jo Bloggs");
        assert_eq!(merged[1].source, "b");
    }

    #[test]
    fn test_empty_input() {
        assert!(merge(vec![]).is_empty());
        assert!(merge(vec![doc("a", vec![])]).is_empty());
    }
}
