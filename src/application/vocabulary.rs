//! Known-club vocabulary used to validate and normalize club mentions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest club fragment that may be matched by reverse containment.
const MIN_CLUB_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubEntry {
    /// Canonical spelling, emitted in every record.
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ClubEntry {
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum League {
    PremierLeague,
    Championship,
}

impl League {
    pub fn clubs(&self) -> Vec<ClubEntry> {
        match self {
            League::PremierLeague => vec![
                ClubEntry::new("Arsenal", &[]),
                ClubEntry::new("Aston Villa", &[]),
                ClubEntry::new("Bournemouth", &["AFC Bournemouth"]),
                ClubEntry::new("Brentford", &[]),
                ClubEntry::new("Brighton & Hove Albion", &["Brighton"]),
                ClubEntry::new("Burnley", &[]),
                ClubEntry::new("Chelsea", &[]),
                ClubEntry::new("Crystal Palace", &[]),
                ClubEntry::new("Everton", &[]),
                ClubEntry::new("Fulham", &[]),
                ClubEntry::new("Leeds United", &["Leeds", "LUFC"]),
                ClubEntry::new("Liverpool", &["LFC"]),
                ClubEntry::new("Manchester City", &["Man City"]),
                ClubEntry::new("Manchester United", &["Man United", "Man Utd", "MUFC"]),
                ClubEntry::new("Newcastle United", &["Newcastle"]),
                ClubEntry::new("Nottingham Forest", &["Nott'm Forest"]),
                ClubEntry::new("Sheffield United", &["Sheffield Utd", "Sheff Utd"]),
                ClubEntry::new("Tottenham Hotspur", &["Tottenham", "Spurs"]),
                ClubEntry::new("West Ham United", &["West Ham"]),
                ClubEntry::new("Wolverhampton Wanderers", &["Wolves"]),
                ClubEntry::new("Luton Town", &["Luton"]),
                ClubEntry::new("Leicester City", &["Leicester"]),
                ClubEntry::new("Sunderland", &[]),
            ],
            League::Championship => vec![
                ClubEntry::new("Middlesbrough", &[]),
                ClubEntry::new("West Bromwich Albion", &["West Brom"]),
                ClubEntry::new("Millwall", &[]),
                ClubEntry::new("Blackburn Rovers", &["Blackburn"]),
                ClubEntry::new("Norwich City", &["Norwich"]),
                ClubEntry::new("Coventry City", &["Coventry"]),
                ClubEntry::new("Hull City", &[]),
                ClubEntry::new("Swansea City", &["Swansea"]),
                ClubEntry::new("Stoke City", &["Stoke"]),
                ClubEntry::new("Watford", &[]),
                ClubEntry::new("Bristol City", &[]),
                ClubEntry::new("Preston North End", &["Preston"]),
                ClubEntry::new("Queens Park Rangers", &["QPR"]),
                ClubEntry::new("Oxford United", &[]),
                ClubEntry::new("Derby County", &["Derby"]),
                ClubEntry::new("Sheffield Wednesday", &["Sheffield Wed", "Sheff Wed"]),
                ClubEntry::new("Plymouth Argyle", &["Plymouth"]),
                ClubEntry::new("Portsmouth", &[]),
                ClubEntry::new("Cardiff City", &["Cardiff"]),
            ],
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            League::PremierLeague => write!(f, "premier-league"),
            League::Championship => write!(f, "championship"),
        }
    }
}

impl FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "premier-league" | "premier" | "epl" | "pl" => Ok(League::PremierLeague),
            "championship" | "efl" => Ok(League::Championship),
            _ => Err(format!("Unknown league: {s}")),
        }
    }
}

/// Ordered list of recognised clubs. Lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct ClubVocabulary {
    entries: Vec<ClubEntry>,
    /// (lower-cased name or alias, index into `entries`), in entry order
    names: Vec<(String, usize)>,
}

impl ClubVocabulary {
    pub fn new(entries: Vec<ClubEntry>) -> Self {
        let names = entries
            .iter()
            .enumerate()
            .flat_map(|(idx, e)| {
                std::iter::once(e.name.as_str())
                    .chain(e.aliases.iter().map(String::as_str))
                    .map(move |n| (n.trim().to_lowercase(), idx))
            })
            .filter(|(n, _)| !n.is_empty())
            .collect();
        Self { entries, names }
    }

    pub fn premier_league() -> Self {
        Self::for_leagues(&[League::PremierLeague])
    }

    pub fn for_leagues(leagues: &[League]) -> Self {
        Self::new(leagues.iter().flat_map(|l| l.clubs()).collect())
    }

    pub fn entries(&self) -> &[ClubEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `text` contains any club name or alias.
    pub fn mentions_club(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.names.iter().any(|(name, _)| lower.contains(name.as_str()))
    }

    /// True when `name` is a canonical vocabulary spelling.
    pub fn is_canonical(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Resolve a captured club phrase to its canonical name.
    ///
    /// A phrase that contains vocabulary names resolves to the one occurring
    /// earliest (longest on ties). Otherwise the first entry whose name
    /// contains the whole phrase wins.
    pub fn resolve(&self, candidate: &str) -> Option<&str> {
        let lower = candidate.trim().to_lowercase();
        if lower.chars().count() < MIN_CLUB_LEN {
            return None;
        }

        let forward = self
            .names
            .iter()
            .filter_map(|(name, idx)| lower.find(name.as_str()).map(|pos| (pos, name.len(), *idx)))
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        if let Some((_, _, idx)) = forward {
            return Some(&self.entries[idx].name);
        }

        self.names
            .iter()
            .find(|(name, _)| name.contains(lower.as_str()))
            .map(|(_, idx)| self.entries[*idx].name.as_str())
    }
}

impl Default for ClubVocabulary {
    fn default() -> Self {
        Self::premier_league()
    }
}
