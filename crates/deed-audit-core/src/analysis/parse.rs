use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::debug;

use super::AuditReport;

/// Parse a model reply into an [`AuditReport`].
///
/// Strict JSON first, then relaxed JSON5 (trailing commas, comments). Only a
/// reply that is not a JSON object at all is an error; odd field types are
/// absorbed by the report model itself.
pub(crate) fn parse_report(raw: &str) -> Result<AuditReport> {
    let body = unfenced_body(raw);
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(strict_err) => {
            debug!(error = %strict_err, "strict JSON parse failed; retrying with JSON5");
            json5::from_str::<Value>(body)
                .with_context(|| format!("model reply is not valid JSON: {strict_err}"))?
        }
    };
    if !value.is_object() {
        bail!("model reply is valid JSON but not an object");
    }
    serde_json::from_value(value).context("model reply could not be read as an audit report")
}

/// The reply without surrounding whitespace or a Markdown code fence. The
/// fence's info tag (`json`, `JSON`, `json5`) is dropped along with it.
fn unfenced_body(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(opened) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = opened.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let body = body.rfind("```").map_or(body, |close| &body[..close]);
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ExecutiveSummary, RiskItem};
    use crate::report::{render_outcome, OutputFormat};
    use crate::workflow::AuditOutcome;
    use proptest::prelude::*;

    #[test]
    fn parses_strict_json() {
        let report = parse_report(r#"{"final_verdict": "NORMAL", "risk_report": []}"#).unwrap();
        assert_eq!(report.verdict(), "NORMAL");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"final_verdict\": \"SUSPICIOUS\"}\n```";
        assert_eq!(parse_report(raw).unwrap().verdict(), "SUSPICIOUS");
    }

    #[test]
    fn fence_without_newlines_or_tag() {
        assert_eq!(unfenced_body("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(unfenced_body("  ```JSON {\"a\":1} ``` "), "{\"a\":1}");
        assert_eq!(unfenced_body("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn falls_back_to_json5() {
        let raw = "{final_verdict: 'FRAUD-LIKE', risk_report: [{issue: 'Forged stamp',},],}";
        let report = parse_report(raw).unwrap();
        assert_eq!(report.verdict(), "FRAUD-LIKE");
        assert_eq!(report.risk_report[0].issue.as_deref(), Some("Forged stamp"));
    }

    #[test]
    fn rejects_prose() {
        let err = parse_report("I cannot review this document.").unwrap_err();
        assert!(format!("{err:#}").contains("not valid JSON"));
    }

    #[test]
    fn rejects_top_level_array() {
        let err = parse_report(r#"[{"issue": "x"}]"#).unwrap_err();
        assert!(err.to_string().contains("not an object"));
    }

    #[test]
    fn nested_financial_terms_still_render() {
        let report = parse_report(
            r#"{"executive_summary":{"parties":"A | B","financial_terms":{"price":"50L","mode":"RTGS"}},"final_verdict":"NORMAL"}"#,
        )
        .unwrap();
        let outcome = AuditOutcome {
            rule_flags: Vec::new(),
            report,
            document_chars: 0,
        };
        let output = render_outcome(&outcome, OutputFormat::Human).unwrap();
        assert!(output.contains("Verdict: NORMAL"));
        assert!(output.contains("Parties: A | B"));
        let financials = output
            .lines()
            .find(|line| line.trim_start().starts_with("Financials:"))
            .unwrap();
        assert!(financials.contains(r#""price":"50L""#));
        assert!(financials.contains(r#""mode":"RTGS""#));
    }

    fn severity_label() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            prop::sample::select(vec!["High", "Medium", "Low", "critical"])
                .prop_map(|label| Some(label.to_string())),
        ]
    }

    fn report_strategy() -> impl Strategy<Value = AuditReport> {
        let risk = ("[A-Za-z ]{1,24}", severity_label()).prop_map(|(issue, severity)| RiskItem {
            issue: Some(issue),
            severity,
            advice: None,
        });
        (
            prop::option::of("[A-Za-z|: ]{1,30}"),
            prop::collection::vec(risk, 0..4),
            prop::option::of("[A-Z][A-Z-]{0,12}"),
        )
            .prop_map(|(parties, risk_report, final_verdict)| AuditReport {
                executive_summary: parties.map(|parties| ExecutiveSummary {
                    parties: Some(parties),
                    ..ExecutiveSummary::default()
                }),
                section_analysis: Vec::new(),
                risk_report,
                final_verdict,
            })
    }

    fn scalar_verdict() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[A-Z-]{1,12}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn fenced_reports_parse_back(
            report in report_strategy(),
            tag in prop::sample::select(vec!["json", "JSON", "json5", ""]),
        ) {
            let body = serde_json::to_string_pretty(&report).unwrap();
            let reply = format!("```{tag}\n{body}\n```\n");
            prop_assert_eq!(parse_report(&reply).unwrap(), report);
        }

        #[test]
        fn any_scalar_verdict_is_displayable(verdict in scalar_verdict()) {
            let raw = serde_json::json!({ "final_verdict": verdict.clone() }).to_string();
            let report = parse_report(&raw).unwrap();
            let expected = match &verdict {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            prop_assert_eq!(report.verdict(), expected.as_str());
        }
    }
}
