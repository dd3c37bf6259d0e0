use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Confirmed,
    #[default]
    Unverified,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::Unverified => write!(f, "unverified"),
        }
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "confirmed" | "done" | "official" => Ok(Self::Confirmed),
            "unverified" | "rumour" | "rumor" | "rumoured" | "rumored" => Ok(Self::Unverified),
            _ => Err(format!(
                "Invalid verification status: '{}'. Use 'confirmed' or 'unverified'",
                s
            )),
        }
    }
}
