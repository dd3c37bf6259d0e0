use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Score given to a source that no tier claims.
pub const UNRATED_SCORE: u8 = 40;

/// Reliability band of a news source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    /// Official club and league channels, public broadcasters
    Tier1,
    /// National press and established transfer journalists
    Tier2,
    /// Aggregators and regional outlets
    Tier3,
    /// Gossip pages and social media
    Tier4,
}

impl SourceTier {
    pub const ALL: [SourceTier; 4] = [Self::Tier1, Self::Tier2, Self::Tier3, Self::Tier4];

    pub fn base_score(&self) -> SourceScore {
        match self {
            Self::Tier1 => SourceScore(90),
            Self::Tier2 => SourceScore(70),
            Self::Tier3 => SourceScore(50),
            Self::Tier4 => SourceScore(20),
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tier1 => write!(f, "Tier 1"),
            Self::Tier2 => write!(f, "Tier 2"),
            Self::Tier3 => write!(f, "Tier 3"),
            Self::Tier4 => write!(f, "Tier 4"),
        }
    }
}

impl FromStr for SourceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(' ', "").as_str() {
            "tier1" | "1" => Ok(Self::Tier1),
            "tier2" | "2" => Ok(Self::Tier2),
            "tier3" | "3" => Ok(Self::Tier3),
            "tier4" | "4" => Ok(Self::Tier4),
            _ => Err(format!("Invalid source tier: '{}'. Use tier1..tier4", s)),
        }
    }
}

/// Source reliability on a 0–100 integer scale. Drives tier badges and
/// the `min_confidence` filter; never mixed with extraction confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SourceScore(u8);

impl SourceScore {
    pub fn new(value: u8) -> Result<Self, String> {
        if value > 100 {
            return Err(format!("Source score must be between 0 and 100, got {value}"));
        }
        Ok(SourceScore(value))
    }

    pub fn unrated() -> Self {
        SourceScore(UNRATED_SCORE)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Badge band shown next to a rumour.
    pub fn tier(&self) -> SourceTier {
        match self.0 {
            80.. => SourceTier::Tier1,
            60..=79 => SourceTier::Tier2,
            40..=59 => SourceTier::Tier3,
            _ => SourceTier::Tier4,
        }
    }
}

impl TryFrom<u8> for SourceScore {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceScore> for u8 {
    fn from(s: SourceScore) -> Self {
        s.0
    }
}

impl fmt::Display for SourceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for SourceScore {
    fn default() -> Self {
        Self::unrated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_scores() {
        let scores: Vec<u8> = SourceTier::ALL.iter().map(|t| t.base_score().value()).collect();
        assert_eq!(scores, vec![90, 70, 50, 20]);
    }

    #[test]
    fn test_badge_bands() {
        assert_eq!(SourceScore::new(90).unwrap().tier(), SourceTier::Tier1);
        assert_eq!(SourceScore::new(70).unwrap().tier(), SourceTier::Tier2);
        assert_eq!(SourceScore::unrated().tier(), SourceTier::Tier3);
        assert_eq!(SourceScore::new(20).unwrap().tier(), SourceTier::Tier4);
    }

    #[test]
    fn test_tier_round_trips_through_text() {
        for tier in SourceTier::ALL {
            let parsed: SourceTier = tier.to_string().parse().unwrap();
            assert_eq!(parsed, tier);
        }
    }

    #[test]
    fn test_rejects_score_over_100() {
        assert!(SourceScore::new(101).is_err());
    }
}
