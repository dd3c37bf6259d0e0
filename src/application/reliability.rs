//! Static mapping from source domains to reliability tiers.

use crate::domain::values::source_tier::{SourceScore, SourceTier};
use serde::{Deserialize, Serialize};
use url::Url;

/// Domain fragments per tier. A fragment without a `/` matches a host or
/// any of its subdomains; a fragment with a path matches a host+path prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTierConfig {
    pub tier1: Vec<String>,
    pub tier2: Vec<String>,
    pub tier3: Vec<String>,
    pub tier4: Vec<String>,
}

fn owned(fragments: &[&str]) -> Vec<String> {
    fragments.iter().map(|s| s.to_string()).collect()
}

impl Default for SourceTierConfig {
    fn default() -> Self {
        Self {
            tier1: owned(&[
                // Official clubs
                "arsenal.com", "avfc.co.uk", "afcb.co.uk", "brentfordfc.com",
                "brightonandhovealbion.com", "burnleyfc.com", "chelseafc.com", "cpfc.co.uk",
                "evertonfc.com", "fulhamfc.com", "leedsunited.com", "liverpoolfc.com",
                "mancity.com", "manutd.com", "nufc.co.uk", "nottinghamforest.co.uk",
                "safc.com", "tottenhamhotspur.com", "whufc.com", "wolves.co.uk",
                // League, broadcasters
                "premierleague.com", "efl.com", "bbc.co.uk/sport", "bbc.com/sport",
                "skysports.com", "theguardian.com/football",
            ]),
            tier2: owned(&[
                "theathletic.com", "nytimes.com/athletic", "telegraph.co.uk", "thetimes.co.uk",
                "thetimes.com", "independent.co.uk", "espn.co.uk", "espn.com", "reuters.com",
                "transfermarkt.com", "transfermarkt.co.uk", "standard.co.uk", "talksport.com",
            ]),
            tier3: owned(&[
                "goal.com", "football365.com", "teamtalk.com", "planetsport.com",
                "givemesport.com", "football.london", "manchestereveningnews.co.uk",
                "liverpoolecho.co.uk", "90min.com", "mirror.co.uk", "thesun.co.uk",
                "dailymail.co.uk", "express.co.uk", "scoreinside.com",
            ]),
            tier4: owned(&[
                "caughtoffside.com", "footballtransfers.com", "sportwitness.co.uk",
                "twitter.com", "x.com", "reddit.com", "facebook.com", "instagram.com",
                "tiktok.com", "youtube.com",
            ]),
        }
    }
}

/// Looks sources up tier1 → tier4, first match wins.
#[derive(Debug, Clone)]
pub struct SourceReliabilityTable {
    tiers: Vec<(SourceTier, Vec<String>)>,
}

impl SourceReliabilityTable {
    pub fn new(config: &SourceTierConfig) -> Self {
        let normalize = |list: &[String]| -> Vec<String> {
            list.iter()
                .map(|f| f.trim().trim_start_matches("www.").to_lowercase())
                .filter(|f| !f.is_empty())
                .collect()
        };
        Self {
            tiers: vec![
                (SourceTier::Tier1, normalize(&config.tier1)),
                (SourceTier::Tier2, normalize(&config.tier2)),
                (SourceTier::Tier3, normalize(&config.tier3)),
                (SourceTier::Tier4, normalize(&config.tier4)),
            ],
        }
    }

    /// Tier of `source` (URL or bare domain), if any tier lists it.
    pub fn tier_for(&self, source: &str) -> Option<SourceTier> {
        let (host, path) = split_source(source)?;
        self.tiers
            .iter()
            .find(|(_, fragments)| fragments.iter().any(|f| fragment_matches(f, &host, &path)))
            .map(|(tier, _)| *tier)
    }

    /// 0–100 reliability score; 40 for sources no tier lists.
    pub fn calculate_confidence_score(&self, source: &str) -> SourceScore {
        self.tier_for(source)
            .map(|t| t.base_score())
            .unwrap_or_else(SourceScore::unrated)
    }
}

impl Default for SourceReliabilityTable {
    fn default() -> Self {
        Self::new(&SourceTierConfig::default())
    }
}

/// Lower-cased host (without `www.`) and path of a URL or bare domain.
fn split_source(source: &str) -> Option<(String, String)> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{trimmed}")).ok())?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    Some((host, parsed.path().to_lowercase()))
}

fn fragment_matches(fragment: &str, host: &str, path: &str) -> bool {
    let (frag_host, frag_path) = match fragment.split_once('/') {
        Some((h, p)) => (h, Some(p)),
        None => (fragment, None),
    };
    let host_ok = host == frag_host || host.ends_with(&format!(".{frag_host}"));
    match frag_path {
        None => host_ok,
        Some(p) => {
            let p = p.trim_end_matches('/');
            let rest = path.trim_start_matches('/');
            host_ok && (rest == p || rest.starts_with(&format!("{p}/")))
        }
    }
}
