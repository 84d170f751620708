mod gemini;
mod parse;
mod settings;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::rules::{RuleFlag, Severity};

pub use gemini::GeminiAnalyst;
pub use settings::AnalystSettings;

/// Client abstraction for the language model that reviews a deed.
#[async_trait]
pub trait AuditAnalyst: Send + Sync {
    /// Produce a structured report for the document text, given the locally computed rule flags.
    async fn analyze(&self, text: &str, flags: &[RuleFlag], credential: &str)
        -> Result<AuditReport>;

    /// Whether the analyst cannot run without an API credential.
    fn requires_credential(&self) -> bool {
        true
    }
}

/// Structured judgment returned by the analyst. Every field is optional; the
/// renderer substitutes placeholders for anything the model left out.
///
/// Models do not always honour the requested shape, so deserialisation is
/// lenient: a non-string leaf keeps its JSON text, a misplaced list or
/// summary is dropped, and only unparseable JSON fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditReport {
    #[serde(deserialize_with = "lenient_object")]
    pub executive_summary: Option<ExecutiveSummary>,
    #[serde(deserialize_with = "lenient_list")]
    pub section_analysis: Vec<SectionAnalysis>,
    #[serde(deserialize_with = "lenient_list")]
    pub risk_report: Vec<RiskItem>,
    #[serde(deserialize_with = "lenient_text")]
    pub final_verdict: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutiveSummary {
    #[serde(deserialize_with = "lenient_text")]
    pub parties: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub property_details: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub financial_terms: Option<String>,
}

/// Plain-language explanation of one clause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionAnalysis {
    #[serde(deserialize_with = "lenient_text")]
    pub section_title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub legal_summary: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub simple_explanation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskItem {
    #[serde(deserialize_with = "lenient_text")]
    pub issue: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub severity: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub advice: Option<String>,
}

/// Strings pass through, `null` is absent, anything else becomes its JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

/// Entries that are not objects are skipped; a lone object counts as a one-item list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        value @ Value::Object(_) => vec![value],
        _ => Vec::new(),
    };
    Ok(entries
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

impl RiskItem {
    /// Severity bucket used for display. Missing or unrecognised labels count as low.
    pub fn severity_level(&self) -> Severity {
        self.severity
            .as_deref()
            .and_then(Severity::from_label)
            .unwrap_or(Severity::Low)
    }
}

/// Display classification of a free-text verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictTone {
    Alarming,
    Caution,
    Clear,
}

impl VerdictTone {
    pub fn from_verdict(verdict: &str) -> Self {
        if verdict.contains("FRAUD") {
            Self::Alarming
        } else if verdict.contains("SUSPICIOUS") {
            Self::Caution
        } else {
            Self::Clear
        }
    }
}

impl AuditReport {
    pub fn verdict(&self) -> &str {
        self.final_verdict.as_deref().unwrap_or("UNKNOWN")
    }

    pub fn verdict_tone(&self) -> VerdictTone {
        VerdictTone::from_verdict(self.verdict())
    }
}

/// Offline analyst: echoes the rule flags back as the risk report.
#[derive(Debug, Default, Clone)]
pub struct NoopAnalyst;

#[async_trait]
impl AuditAnalyst for NoopAnalyst {
    async fn analyze(
        &self,
        _text: &str,
        flags: &[RuleFlag],
        _credential: &str,
    ) -> Result<AuditReport> {
        Ok(AuditReport {
            executive_summary: None,
            section_analysis: Vec::new(),
            risk_report: flags
                .iter()
                .map(|flag| RiskItem {
                    issue: Some(flag.risk.clone()),
                    severity: Some(flag.severity.to_string()),
                    advice: Some(flag.advice.clone()),
                })
                .collect(),
            final_verdict: Some("UNREVIEWED".into()),
        })
    }

    fn requires_credential(&self) -> bool {
        false
    }
}

/// Build the analyst named by `settings.provider`.
pub fn build_analyst(settings: &AnalystSettings) -> Result<Box<dyn AuditAnalyst>> {
    match settings.provider.trim().to_ascii_lowercase().as_str() {
        "gemini" => Ok(Box::new(GeminiAnalyst::new(settings)?)),
        "noop" => Ok(Box::new(NoopAnalyst)),
        other => bail!("unsupported analyst provider `{other}` (expected `gemini` or `noop`)"),
    }
}
