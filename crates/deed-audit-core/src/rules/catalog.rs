use serde::Serialize;

use super::checks::{
    check_dispute_resolution, check_indemnity_clause, check_possession_date,
    COMPACT_DATE_PATTERN, DISPUTE_KEYWORDS, INDEMNITY_KEYWORDS, NUMERIC_DATE_PATTERN,
    SPOKEN_DATE_PATTERN,
};
use super::{RuleFlag, Severity};

/// Distinguishes between literal keyword and regular-expression rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Keyword,
    Regex,
}

/// Static description of one built-in check.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleDefinition {
    /// Stable identifier (e.g. `CLAUSE_INDEMNITY`).
    pub id: &'static str,
    pub description: &'static str,
    pub kind: RuleKind,
    /// Severity of the flag raised when the requirement is not met.
    pub severity: Severity,
    /// Any one of these satisfies the rule.
    pub patterns: &'static [&'static str],
    #[serde(skip)]
    pub check: fn(&str) -> Option<RuleFlag>,
}

pub static RULE_CATALOG: [RuleDefinition; 3] = [
    RuleDefinition {
        id: "DATE_POSSESSION",
        description: "Deed states a concrete possession date",
        kind: RuleKind::Regex,
        severity: Severity::High,
        patterns: &[
            SPOKEN_DATE_PATTERN,
            NUMERIC_DATE_PATTERN,
            COMPACT_DATE_PATTERN,
        ],
        check: check_possession_date,
    },
    RuleDefinition {
        id: "CLAUSE_INDEMNITY",
        description: "Seller indemnifies the buyer",
        kind: RuleKind::Keyword,
        severity: Severity::High,
        patterns: INDEMNITY_KEYWORDS,
        check: check_indemnity_clause,
    },
    RuleDefinition {
        id: "CLAUSE_DISPUTE",
        description: "Deed names a dispute resolution forum",
        kind: RuleKind::Keyword,
        severity: Severity::Medium,
        patterns: DISPUTE_KEYWORDS,
        check: check_dispute_resolution,
    },
];
