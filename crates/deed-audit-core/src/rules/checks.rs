//! The three deed checks. Each returns `Some(flag)` when its requirement is
//! not met by the text and `None` otherwise.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{RuleFlag, Severity};

/// Day, ordinal/separator run, single whitespace, month name, single whitespace, year.
/// The ordinal class is kept as-is even though it also admits stray letters.
pub(crate) const SPOKEN_DATE_PATTERN: &str =
    r"\d{1,2}[-/thstndrd]+\s(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s\d{2,4}";
/// `D-M-YYYY` or `D/M/YYYY`, separators may be mixed.
pub(crate) const NUMERIC_DATE_PATTERN: &str = r"\d{1,2}[-/]\d{1,2}[-/]\d{2,4}";
/// `12-Dec-2025` style, the format the advice text asks drafters to use.
pub(crate) const COMPACT_DATE_PATTERN: &str =
    r"\d{1,2}[-/](?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*[-/]\d{2,4}";

pub(crate) const INDEMNITY_KEYWORDS: &[&str] = &["indemni"];
pub(crate) const DISPUTE_KEYWORDS: &[&str] = &["arbitration", "court"];

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        "(?i){}|{}|{}",
        SPOKEN_DATE_PATTERN, NUMERIC_DATE_PATTERN, COMPACT_DATE_PATTERN
    );
    Regex::new(&pattern).expect("built-in date pattern must compile")
});

static INDEMNITY_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| keyword_matcher(INDEMNITY_KEYWORDS));
static DISPUTE_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| keyword_matcher(DISPUTE_KEYWORDS));

fn keyword_matcher(keywords: &[&str]) -> AhoCorasick {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(keywords)
        .expect("built-in keyword automaton must compile")
}

/// Flags deeds that never state a possession date.
pub fn check_possession_date(text: &str) -> Option<RuleFlag> {
    if DATE_REGEX.is_match(text) {
        return None;
    }
    Some(RuleFlag::new(
        "Possession Date Missing",
        Severity::High,
        "Ensure a specific date (e.g., 12-Dec-2025) is written.",
    ))
}

/// Flags deeds without any indemnity language.
pub fn check_indemnity_clause(text: &str) -> Option<RuleFlag> {
    if INDEMNITY_MATCHER.is_match(text) {
        return None;
    }
    Some(RuleFlag::new(
        "Missing Indemnity Clause",
        Severity::High,
        "Seller must explicitly indemnify buyer against title defects.",
    ))
}

/// Flags deeds that mention neither arbitration nor a court.
pub fn check_dispute_resolution(text: &str) -> Option<RuleFlag> {
    if DISPUTE_MATCHER.is_match(text) {
        return None;
    }
    Some(RuleFlag::new(
        "No Dispute Resolution",
        Severity::Medium,
        "Add an Arbitration clause to avoid lengthy court battles.",
    ))
}
