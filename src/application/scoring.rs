//! Confidence scoring. Two independent scales:
//!
//! - extraction stage ([`ExtractionConfidence`], 0.0–1.0): pattern family
//!   plus linguistic cues, decides `verification_status`;
//! - source tier (0–100): reliability of the domain, computed by
//!   [`SourceReliabilityTable`](crate::application::reliability::SourceReliabilityTable).

use crate::application::patterns::{has_confirmation_keyword, PatternFamily};
use crate::domain::values::confidence::ExtractionConfidence;

pub const KEYWORD_BOOST: f64 = 0.10;
pub const OFFICIAL_DOCUMENT_BOOST: f64 = 0.05;

/// Whether the document as a whole reads as an official announcement.
pub fn is_official_document(content: &str) -> bool {
    let lower = content.to_lowercase();
    lower.contains("official") || lower.contains("confirmed")
}

/// Parse-time score for one match.
pub fn extraction_confidence(
    family: PatternFamily,
    matched_text: &str,
    official_document: bool,
) -> ExtractionConfidence {
    let base = ExtractionConfidence::new(family.base_confidence()).unwrap_or_default();
    let mut boost = 0.0;
    if has_confirmation_keyword(matched_text) {
        boost += KEYWORD_BOOST;
    }
    if official_document {
        boost += OFFICIAL_DOCUMENT_BOOST;
    }
    base.boosted(boost)
}
