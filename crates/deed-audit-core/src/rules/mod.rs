use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub mod catalog;
pub mod checks;

pub use catalog::{RuleDefinition, RuleKind, RULE_CATALOG};

/// Ordinal risk level attached to rule flags and model risk items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Levels from most to least urgent, the order reports list them in.
    pub const BY_URGENCY: [Severity; 3] = [Self::High, Self::Medium, Self::Low];

    /// Interpret a free-form severity label (`"High"`, `"MEDIUM"`, `"low"` ...).
    ///
    /// Returns `None` for anything that is not one of the three levels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A deterministic finding computed locally from the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFlag {
    pub risk: String,
    pub severity: Severity,
    pub advice: String,
}

impl RuleFlag {
    pub fn new(risk: impl Into<String>, severity: Severity, advice: impl Into<String>) -> Self {
        Self {
            risk: risk.into(),
            severity,
            advice: advice.into(),
        }
    }
}

/// Run every built-in check against `text`.
///
/// Flags are emitted in catalog order (date, indemnity, dispute). Each check
/// looks only at the text, so one flag never suppresses or implies another.
pub fn run_rule_checks(text: &str) -> Vec<RuleFlag> {
    let mut flags = Vec::new();
    for rule in RULE_CATALOG.iter() {
        let flag = (rule.check)(text);
        trace!(rule_id = rule.id, flagged = flag.is_some(), "evaluated rule");
        flags.extend(flag);
    }
    debug!(flags = flags.len(), text_len = text.len(), "rule checks completed");
    flags
}
