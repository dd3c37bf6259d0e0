//! Pattern families for spotting transfer statements in page text.
//!
//! Every family is a closed [`PatternFamily`] variant carrying its own
//! patterns and base weight. Scanning never fails: malformed or unrelated
//! text simply yields no matches.

use crate::domain::values::fee::Fee;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

/// One to four name words on one line, shortest first. Stops at punctuation.
const PLAYER: &str = r"(\p{L}[\p{L}'\-]*(?:[^\S\n]+\p{L}[\p{L}'\-]*){0,3}?)";
/// One to four club words on one line, longest first; `&` may join words.
const CLUB: &str = r"(\p{L}[\p{L}&'\-]*(?:[^\S\n]+(?:&[^\S\n]+)?\p{L}[\p{L}&'\-]*){0,3})";
/// Where a trailing player mention ends.
const PLAYER_END: &str = r"(?:\s+(?:from|for|on|in|who|and|after)\b|\s*[.,;:!?()]|\s*$)";
/// Arrow or verb between a player and destination in headline phrasing.
const HEADLINE_LINK: &str = r"(?:\s*(?:→|->)\s*|\s+(?:to|joins?|signs\s+for)\s+)";

/// Phrases that mark a statement as official rather than speculative.
pub const CONFIRMATION_KEYWORDS: &[&str] = &[
    "has signed",
    "officially joins",
    "completed transfer",
    "completes move",
    "signs for",
    "announces signing of",
    "confirmed signing",
    "welcome to",
    "pleased to announce",
    "delighted to confirm",
    "agreement reached",
    "medical completed",
    "contract signed",
    "registration confirmed",
    "confirmed",
    "official",
    "signs",
    "joins",
    "completed",
];

/// Whether `text` contains any confirmation keyword.
pub fn has_confirmation_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    CONFIRMATION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Which capture holds the player and which the club.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureOrder {
    PlayerFirst,
    ClubFirst,
}

struct StatementPattern {
    regex: Regex,
    order: CaptureOrder,
}

fn statement(pattern: String, order: CaptureOrder) -> StatementPattern {
    StatementPattern {
        regex: Regex::new(&format!("(?i){pattern}")).expect("statement pattern"),
        order,
    }
}

static OFFICIAL_SIGNING: LazyLock<Vec<StatementPattern>> = LazyLock::new(|| {
    vec![
        statement(
            format!(
                r"\b{PLAYER}\s+(?:has\s+)?(?:officially\s+)?(?:signed\s+(?:for|with)|signs\s+for|joins|joined|(?:has\s+)?completed?\s+(?:a\s+|his\s+|her\s+)?(?:permanent\s+)?move\s+to|announced\s+as\s+(?:a\s+)?new\s+signing\s+for)\s+{CLUB}"
            ),
            CaptureOrder::PlayerFirst,
        ),
        statement(
            format!(
                r"\b{CLUB}\s+(?:are\s+|is\s+|have\s+been\s+|has\s+been\s+)?(?:pleased\s+to\s+(?:announce|confirm)|delighted\s+to\s+(?:announce|confirm)|thrilled\s+to\s+announce|welcomes?|announces?)\s+(?:the\s+(?:signing|arrival|capture)\s+of\s+)?{PLAYER}{PLAYER_END}"
            ),
            CaptureOrder::ClubFirst,
        ),
        statement(
            format!(
                r"\b(?:official|confirmed)\s*[:\-–]\s*{PLAYER}\s+(?:signs\s+for|joins|has\s+joined)\s+{CLUB}"
            ),
            CaptureOrder::PlayerFirst,
        ),
    ]
});

static MEDICAL_COMPLETION: LazyLock<Vec<StatementPattern>> = LazyLock::new(|| {
    vec![
        statement(
            format!(
                r"\b{PLAYER}\s+(?:has\s+)?(?:completes?|completed|undergoes?|underwent|passes?|passed)\s+(?:a\s+|his\s+|her\s+)?medical\s+(?:at|with|for|ahead\s+of\s+(?:a\s+|his\s+|her\s+)?move\s+to)\s+{CLUB}"
            ),
            CaptureOrder::PlayerFirst,
        ),
        statement(
            format!(r"\bmedical\s+(?:completed?|done|passed)\s+for\s+{PLAYER}\s+(?:at|with)\s+{CLUB}"),
            CaptureOrder::PlayerFirst,
        ),
    ]
});

static HERE_WE_GO: LazyLock<Vec<StatementPattern>> = LazyLock::new(|| {
    vec![
        statement(
            format!(r"\bhere\s+we\s+go\s*[!.]*\s*[:\-–]?\s*{PLAYER}{HEADLINE_LINK}{CLUB}"),
            CaptureOrder::PlayerFirst,
        ),
        statement(
            format!(r"\b(?:breaking|confirmed|done\s+deal)\s*[!:\-–]*\s*{PLAYER}{HEADLINE_LINK}{CLUB}"),
            CaptureOrder::PlayerFirst,
        ),
    ]
});

static FEE_AMOUNTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:fee|transfer|deal|price|cost|worth|valued\s+at|reported)\b\s*[:\-]?\s*(?:of\s+)?(?:around|approximately|about|up\s+to|rising\s+to|in\s+the\s+region\s+of)?\s*([£$€]?\s*\d+(?:[.,]\d+)*\s*(?:bn|billion|million|mil|m|thousand|k)?)\b",
        r"([£$€]\s?\d+(?:[.,]\d+)*\s*(?:bn|billion|million|mil|m|thousand|k))\b",
        r"\b(\d+(?:\.\d+)?\s+million)\b",
        r"\b(undisclosed|free\s+transfer|on\s+a\s+free|loan\s+deal|season-long\s+loan|on\s+loan|released)\b",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("fee pattern"))
    .collect()
});

static TABLE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(player|name|club|to|destination|from|fee|price)\s*[:|]\s*([^,;|\n\r]+?)\s*(?:[,;|\n\r]|$)")
        .expect("table label pattern")
});

/// Named pattern families, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    OfficialSigning,
    FeeAmounts,
    MedicalCompletion,
    HereWeGo,
    Tabular,
}

impl PatternFamily {
    pub const ALL: [PatternFamily; 5] = [
        Self::OfficialSigning,
        Self::FeeAmounts,
        Self::MedicalCompletion,
        Self::HereWeGo,
        Self::Tabular,
    ];

    /// Extraction-stage starting score for a match of this family.
    pub fn base_confidence(&self) -> f64 {
        match self {
            Self::OfficialSigning => 0.9,
            Self::HereWeGo => 0.85,
            Self::MedicalCompletion => 0.8,
            Self::Tabular => 0.75,
            Self::FeeAmounts => 0.6,
        }
    }

    /// Run every pattern of this family over `content`, in pattern order.
    pub fn scan(&self, content: &str) -> Vec<RawMatch> {
        match self {
            Self::OfficialSigning => scan_statements(*self, &OFFICIAL_SIGNING, content),
            Self::MedicalCompletion => scan_statements(*self, &MEDICAL_COMPLETION, content),
            Self::HereWeGo => scan_statements(*self, &HERE_WE_GO, content),
            Self::FeeAmounts => scan_fees(content),
            Self::Tabular => scan_tabular(content),
        }
    }
}

impl fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OfficialSigning => write!(f, "official_signing"),
            Self::FeeAmounts => write!(f, "fee_amounts"),
            Self::MedicalCompletion => write!(f, "medical_completion"),
            Self::HereWeGo => write!(f, "here_we_go"),
            Self::Tabular => write!(f, "tabular"),
        }
    }
}

/// A pattern hit before any validation.
///
/// For statement and tabular families `subject` is the player mention and
/// `object` the club mention. For fee matches `subject` is the fee phrase
/// and `object` its normalized form.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub family: PatternFamily,
    pub subject: String,
    pub object: String,
    /// Tabular only: the `from:` field.
    pub origin: Option<String>,
    /// Tabular only: the `fee:` field.
    pub fee: Option<String>,
    /// Byte span of the whole match in the scanned content.
    pub span: Range<usize>,
    /// Byte span of the subject.
    pub subject_span: Range<usize>,
}

impl RawMatch {
    pub fn text<'a>(&self, content: &'a str) -> &'a str {
        &content[self.span.clone()]
    }
}

fn scan_statements(
    family: PatternFamily,
    patterns: &[StatementPattern],
    content: &str,
) -> Vec<RawMatch> {
    let mut out = Vec::new();
    for pattern in patterns {
        for caps in pattern.regex.captures_iter(content) {
            let (Some(whole), Some(first), Some(second)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let (player, club) = match pattern.order {
                CaptureOrder::PlayerFirst => (first, second),
                CaptureOrder::ClubFirst => (second, first),
            };
            out.push(RawMatch {
                family,
                subject: player.as_str().to_string(),
                object: club.as_str().to_string(),
                origin: None,
                fee: None,
                span: whole.range(),
                subject_span: player.range(),
            });
        }
    }
    out
}

fn scan_fees(content: &str) -> Vec<RawMatch> {
    let mut out = Vec::new();
    for pattern in FEE_AMOUNTS.iter() {
        for caps in pattern.captures_iter(content) {
            let (Some(whole), Some(phrase)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Ok(fee) = phrase.as_str().parse::<Fee>() else {
                continue;
            };
            out.push(RawMatch {
                family: PatternFamily::FeeAmounts,
                subject: phrase.as_str().trim().to_string(),
                object: fee.to_string(),
                origin: None,
                fee: Some(fee.to_string()),
                span: whole.range(),
                subject_span: phrase.range(),
            });
        }
    }
    out
}

/// First fee found in `text`, trying fee patterns in order.
pub fn find_fee(text: &str) -> Option<Fee> {
    FEE_AMOUNTS.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .find_map(|m| m.as_str().parse::<Fee>().ok())
    })
}

#[derive(Debug, Default)]
struct TableRow {
    player: Option<(String, Range<usize>)>,
    club: Option<String>,
    origin: Option<String>,
    fee: Option<String>,
    start: Option<usize>,
    end: usize,
}

impl TableRow {
    fn into_match(self) -> Option<RawMatch> {
        let (player, subject_span) = self.player?;
        let club = self.club?;
        Some(RawMatch {
            family: PatternFamily::Tabular,
            subject: player,
            object: club,
            origin: self.origin,
            fee: self.fee,
            span: self.start.unwrap_or(subject_span.start)..self.end,
            subject_span,
        })
    }
}

/// Reads `label: value` runs, in any label order. A row ends when a label
/// repeats or prose separates two labels.
fn scan_tabular(content: &str) -> Vec<RawMatch> {
    let mut out = Vec::new();
    let mut row = TableRow::default();
    let mut last_end = 0;

    for caps in TABLE_LABEL.captures_iter(content) {
        let (Some(whole), Some(label), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let label = label.as_str().to_lowercase();
        let slot_taken = match label.as_str() {
            "player" | "name" => row.player.is_some(),
            "club" | "to" | "destination" => row.club.is_some(),
            "from" => row.origin.is_some(),
            _ => row.fee.is_some(),
        };
        let separated = row.start.is_some() && !content[last_end..whole.start()].trim().is_empty();
        if slot_taken || separated {
            out.extend(std::mem::take(&mut row).into_match());
        }

        let text = value.as_str().trim().to_string();
        match label.as_str() {
            "player" | "name" => row.player = Some((text, value.range())),
            "club" | "to" | "destination" => row.club = Some(text),
            "from" => row.origin = Some(text),
            _ => row.fee = Some(text),
        }
        row.start.get_or_insert(whole.start());
        row.end = whole.end();
        last_end = whole.end();
    }
    out.extend(row.into_match());
    out
}
