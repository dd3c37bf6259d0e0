use crate::application::patterns::{find_fee, PatternFamily, RawMatch};
use crate::application::scoring::{extraction_confidence, is_official_document};
use crate::application::vocabulary::ClubVocabulary;
use crate::domain::entities::transfer_candidate::TransferCandidate;
use crate::domain::values::confidence::ExtractionConfidence;
use crate::domain::values::fee::Fee;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Characters searched on each side of a match for a fee.
pub const FEE_WINDOW_CHARS: usize = 200;
/// Characters after a player mention searched for a `from <club>` clause.
const ORIGIN_WINDOW_CHARS: usize = 80;
const MIN_PLAYER_LEN: usize = 3;
/// Lower-case words allowed inside a capitalised name ("Virgil van Dijk").
const NAME_PARTICLES: &[&str] = &[
    "van", "von", "de", "der", "den", "da", "das", "do", "dos", "di", "del", "della", "la", "le",
    "bin", "ter",
];

/// Positional and descriptive words that head a mention but are not
/// part of the name ("Winger Jo Bloggs").
const ROLE_WORDS: &[&str] = &[
    "winger", "striker", "forward", "midfielder", "defender", "goalkeeper", "keeper",
    "full-back", "centre-back", "center-back", "captain", "playmaker", "youngster",
    "teenager", "wonderkid", "veteran", "star", "ace", "target", "international",
];

static PLAYER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\s'\-]+$").expect("player name regex"));

static STRIP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\s'\-]").expect("strip name regex"));

static ORIGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s,(]*(?:from|formerly\s+of|leaving)\s+(\p{L}[\p{L}&'\-]*(?:\s+(?:&\s+)?\p{L}[\p{L}&'\-]*){0,3})")
        .expect("origin clause regex")
});

/// Turns page text into validated transfer candidates.
pub struct CandidateExtractor {
    vocabulary: Arc<ClubVocabulary>,
}

impl CandidateExtractor {
    pub fn new(vocabulary: Arc<ClubVocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &ClubVocabulary {
        &self.vocabulary
    }

    /// Every candidate in `content`, one per player (first seen wins), in
    /// family order then position order. Pure; `source_url` is only logged.
    pub fn extract(&self, content: &str, source_url: &str) -> Vec<TransferCandidate> {
        let official_document = is_official_document(content);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for family in PatternFamily::ALL {
            let found: Vec<TransferCandidate> = match family {
                PatternFamily::OfficialSigning
                | PatternFamily::MedicalCompletion
                | PatternFamily::HereWeGo => family
                    .scan(content)
                    .iter()
                    .filter_map(|m| self.statement_candidate(m, content, official_document))
                    .collect(),
                // Fees are read from each statement's surroundings instead
                PatternFamily::FeeAmounts => continue,
                PatternFamily::Tabular => family
                    .scan(content)
                    .iter()
                    .filter_map(|m| self.tabular_candidate(m))
                    .collect(),
            };

            for candidate in found {
                if seen.insert(candidate.player_key()) {
                    debug!(
                        source = source_url,
                        family = %family,
                        player = %candidate.player_name,
                        to = %candidate.to_club,
                        "transfer candidate"
                    );
                    candidates.push(candidate);
                }
            }
        }

        debug!(source = source_url, count = candidates.len(), "extraction finished");
        candidates
    }

    fn statement_candidate(
        &self,
        m: &RawMatch,
        content: &str,
        official_document: bool,
    ) -> Option<TransferCandidate> {
        let player = focus_name(m.subject.trim());
        if !self.is_valid_player_name(player) {
            debug!(player, family = %m.family, "rejected player name");
            return None;
        }
        let Some(to_club) = self.vocabulary.resolve(&m.object) else {
            debug!(club = %m.object, family = %m.family, "rejected club name");
            return None;
        };

        let matched = m.text(content);
        let fee = find_fee(context_window(content, m.span.clone(), FEE_WINDOW_CHARS))
            .unwrap_or(Fee::Undisclosed);
        let confidence = extraction_confidence(m.family, matched, official_document);
        let from_club = self.origin_club(m, content, to_club);

        Some(TransferCandidate::new(
            clean_name(player),
            from_club,
            to_club.to_string(),
            fee,
            confidence,
        ))
    }

    /// Tabular rows keep a flat baseline score with no boosts.
    fn tabular_candidate(&self, m: &RawMatch) -> Option<TransferCandidate> {
        let player = m.subject.trim();
        if !self.is_valid_player_name(player) {
            return None;
        }
        let to_club = self.vocabulary.resolve(&m.object)?;
        let from_club = m
            .origin
            .as_deref()
            .and_then(|o| self.vocabulary.resolve(o))
            .filter(|from| *from != to_club)
            .map(str::to_string);
        let fee = m.fee.as_deref().map(Fee::parse_lenient).unwrap_or_default();
        let confidence = ExtractionConfidence::new(PatternFamily::Tabular.base_confidence())
            .unwrap_or_default();

        Some(TransferCandidate::new(
            clean_name(player),
            from_club,
            to_club.to_string(),
            fee,
            confidence,
        ))
    }

    /// At least three characters, letters/spaces/apostrophes/hyphens only,
    /// and no club name inside.
    pub fn is_valid_player_name(&self, name: &str) -> bool {
        let name = name.trim();
        name.chars().count() >= MIN_PLAYER_LEN
            && PLAYER_NAME_RE.is_match(name)
            && !self.vocabulary.mentions_club(name)
    }

    /// Canonical club name when `name` matches the vocabulary.
    pub fn is_valid_club_name(&self, name: &str) -> bool {
        self.vocabulary.resolve(name).is_some()
    }

    /// Origin club from a `from <club>` clause inside the club capture,
    /// right after the player mention, or right after the match.
    fn origin_club(&self, m: &RawMatch, content: &str, to_club: &str) -> Option<String> {
        let inside = m
            .object
            .to_lowercase()
            .find(" from ")
            .and_then(|pos| m.object.get(pos..));
        let after_player = context_after(content, m.subject_span.end, ORIGIN_WINDOW_CHARS);
        let after_match = context_after(content, m.span.end, ORIGIN_WINDOW_CHARS);

        [inside, Some(after_player), Some(after_match)]
            .into_iter()
            .flatten()
            .filter_map(|text| ORIGIN_RE.captures(text).and_then(|c| c.get(1)))
            .filter_map(|club| self.vocabulary.resolve(club.as_str()))
            .find(|club| *club != to_club)
            .map(str::to_string)
    }
}

/// Drop lead-in words from a mention: lower-case prose ("reports say Jane
/// Doe" → "Jane Doe") and leading role words ("Winger Jo Bloggs" → "Jo
/// Bloggs"). Mentions without any capitalised word are kept whole.
pub fn focus_name(mention: &str) -> &str {
    let is_capitalised = |w: &str| w.chars().next().is_some_and(char::is_uppercase);
    let is_particle = |w: &str| NAME_PARTICLES.contains(&w);
    let is_role = |w: &str| ROLE_WORDS.iter().any(|r| r.eq_ignore_ascii_case(w));

    let words = word_offsets(mention);
    if !words.iter().any(|(_, w)| is_capitalised(w)) {
        return mention;
    }

    let mut start = 0;
    for (i, (_, word)) in words.iter().enumerate() {
        let next_is_capitalised = words.get(i + 1).is_some_and(|(_, w)| is_capitalised(w));
        if !is_capitalised(word) && !(is_particle(word) && next_is_capitalised && i > start) {
            start = i + 1;
        }
    }
    while words.get(start).is_some_and(|(_, w)| is_role(w))
        && words[start + 1..].iter().any(|(_, w)| is_capitalised(w))
    {
        start += 1;
    }
    match words.get(start) {
        Some((offset, _)) => &mention[*offset..],
        None => mention,
    }
}

/// Whitespace-separated words with their byte offsets.
fn word_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}

/// Strip everything but letters, spaces, apostrophes and hyphens, and
/// collapse whitespace runs.
pub fn clean_name(name: &str) -> String {
    STRIP_NAME_RE
        .replace_all(name, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `span` widened by up to `radius` characters each side.
fn context_window(content: &str, span: Range<usize>, radius: usize) -> &str {
    let start = content[..span.start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(span.start, |(i, _)| i);
    let end = content[span.end..]
        .char_indices()
        .nth(radius)
        .map_or(content.len(), |(i, _)| span.end + i);
    &content[start..end]
}

/// Up to `len` characters starting at byte `from`.
fn context_after(content: &str, from: usize, len: usize) -> &str {
    let tail = &content[from..];
    let end = tail.char_indices().nth(len).map_or(tail.len(), |(i, _)| i);
    &tail[..end]
}
