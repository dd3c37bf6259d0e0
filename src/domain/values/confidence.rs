use super::verification::VerificationStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score at or above which an extraction counts as confirmed.
pub const CONFIRMED_THRESHOLD: f64 = 0.8;

/// Parse-time confidence on a 0.0–1.0 scale, derived from the pattern family
/// and linguistic cues. Unrelated to [`super::source_tier::SourceScore`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ExtractionConfidence(f64);

impl ExtractionConfidence {
    pub fn new(value: f64) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!(
                "Extraction confidence must be between 0.0 and 1.0, got {value}"
            ));
        }
        Ok(ExtractionConfidence(value))
    }

    /// Add `delta`, clamping into range. The sum is rounded to two decimal
    /// places so `0.7 + 0.1` lands on exactly `0.8`.
    pub fn boosted(self, delta: f64) -> Self {
        let sum = ((self.0 + delta) * 100.0).round() / 100.0;
        ExtractionConfidence(sum.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn verification_status(&self) -> VerificationStatus {
        if self.0 >= CONFIRMED_THRESHOLD {
            VerificationStatus::Confirmed
        } else {
            VerificationStatus::Unverified
        }
    }
}

impl TryFrom<f64> for ExtractionConfidence {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExtractionConfidence> for f64 {
    fn from(c: ExtractionConfidence) -> Self {
        c.0
    }
}

impl fmt::Display for ExtractionConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for ExtractionConfidence {
    fn default() -> Self {
        ExtractionConfidence(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(ExtractionConfidence::new(1.2).is_err());
        assert!(ExtractionConfidence::new(-0.1).is_err());
        assert!(ExtractionConfidence::new(0.0).is_ok());
    }

    #[test]
    fn test_boost_clamps_at_one() {
        let c = ExtractionConfidence::new(0.9).unwrap().boosted(0.1).boosted(0.05);
        assert_eq!(c.value(), 1.0);
    }

    #[test]
    fn test_status_threshold() {
        let medical = ExtractionConfidence::new(0.8).unwrap();
        assert_eq!(medical.verification_status(), VerificationStatus::Confirmed);
        let tabular = ExtractionConfidence::new(0.75).unwrap();
        assert_eq!(tabular.verification_status(), VerificationStatus::Unverified);
    }

    #[test]
    fn test_float_sum_still_confirmed() {
        // 0.7 + 0.1 == 0.7999999999999999 in f64
        let c = ExtractionConfidence::new(0.7).unwrap().boosted(0.1);
        assert_eq!(c.value(), 0.8);
        assert_eq!(c.verification_status(), VerificationStatus::Confirmed);
        let below = ExtractionConfidence::new(0.799).unwrap();
        assert_eq!(below.verification_status(), VerificationStatus::Unverified);
    }
}
