use std::fmt::Write;

use serde::Serialize;

use crate::analysis::{AuditReport, ExecutiveSummary, RiskItem, SectionAnalysis, VerdictTone};
use crate::rules::{RuleFlag, Severity};
use crate::workflow::AuditOutcome;

const MISSING: &str = "N/A";

/// Format styles supported by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Render a completed audit.
pub fn render_outcome(outcome: &AuditOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(outcome),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonOutcome::from(outcome))?),
    }
}

/// Render the result of the rule checks alone.
pub fn render_flags(flags: &[RuleFlag], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => {
            let mut out = String::new();
            if flags.is_empty() {
                writeln!(out, "All rule checks passed.")?;
            } else {
                writeln!(out, "{} rule flag(s):", flags.len())?;
                write_flags(&mut out, flags)?;
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(flags)?),
    }
}

fn render_human(outcome: &AuditOutcome) -> anyhow::Result<String> {
    let report = &outcome.report;
    let mut out = String::new();
    writeln!(
        out,
        "Verdict: {} ({})",
        report.verdict(),
        tone_label(report.verdict_tone())
    )?;
    writeln!(
        out,
        "Risks Found: {} • Rule Flags: {}",
        report.risk_report.len(),
        outcome.rule_flags.len()
    )?;

    writeln!(out)?;
    writeln!(out, "Summary:")?;
    write_summary(&mut out, report.executive_summary.as_ref())?;

    writeln!(out)?;
    writeln!(out, "Risks:")?;
    write_risks(&mut out, &report.risk_report)?;

    writeln!(out)?;
    writeln!(out, "Rule Flags:")?;
    if outcome.rule_flags.is_empty() {
        writeln!(out, "  None.")?;
    } else {
        write_flags(&mut out, &outcome.rule_flags)?;
    }

    writeln!(out)?;
    writeln!(out, "Clause Explainer:")?;
    write_sections(&mut out, &report.section_analysis)?;

    Ok(out)
}

fn tone_label(tone: VerdictTone) -> &'static str {
    match tone {
        VerdictTone::Alarming => "alarming",
        VerdictTone::Caution => "caution",
        VerdictTone::Clear => "clear",
    }
}

fn write_summary(out: &mut String, summary: Option<&ExecutiveSummary>) -> std::fmt::Result {
    let field =
        |pick: fn(&ExecutiveSummary) -> Option<&str>| text_or_missing(summary.and_then(pick));
    writeln!(out, "  Parties: {}", field(|s| s.parties.as_deref()))?;
    writeln!(out, "  Property: {}", field(|s| s.property_details.as_deref()))?;
    writeln!(out, "  Financials: {}", field(|s| s.financial_terms.as_deref()))
}

fn write_risks(out: &mut String, risks: &[RiskItem]) -> std::fmt::Result {
    if risks.is_empty() {
        return writeln!(out, "  No high-priority risks detected.");
    }
    for level in Severity::BY_URGENCY {
        let group: Vec<_> = risks
            .iter()
            .filter(|risk| risk.severity_level() == level)
            .collect();
        if group.is_empty() {
            continue;
        }
        writeln!(out, "  {} ({}):", level, group.len())?;
        for risk in group {
            writeln!(out, "    - {}", text_or_missing(risk.issue.as_deref()))?;
            writeln!(out, "      Advice: {}", text_or_missing(risk.advice.as_deref()))?;
        }
    }
    Ok(())
}

fn write_flags(out: &mut String, flags: &[RuleFlag]) -> std::fmt::Result {
    for flag in flags {
        writeln!(out, "  - [{}] {}", flag.severity, flag.risk)?;
        writeln!(out, "    Advice: {}", flag.advice)?;
    }
    Ok(())
}

fn write_sections(out: &mut String, sections: &[SectionAnalysis]) -> std::fmt::Result {
    if sections.is_empty() {
        return writeln!(out, "  No clauses explained.");
    }
    for section in sections {
        writeln!(out, "  * {}", text_or_missing(section.section_title.as_deref()))?;
        writeln!(
            out,
            "    Legal: {}",
            text_or_missing(section.legal_summary.as_deref())
        )?;
        writeln!(
            out,
            "    Simple English: {}",
            text_or_missing(section.simple_explanation.as_deref())
        )?;
    }
    Ok(())
}

fn text_or_missing(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .map(single_line)
        .unwrap_or_else(|| MISSING.to_string())
}

fn single_line(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[derive(Debug, Serialize)]
struct JsonOutcome<'a> {
    verdict: &'a str,
    verdict_tone: VerdictTone,
    rule_flags: &'a [RuleFlag],
    document_chars: usize,
    report: &'a AuditReport,
}

impl<'a> From<&'a AuditOutcome> for JsonOutcome<'a> {
    fn from(outcome: &'a AuditOutcome) -> Self {
        Self {
            verdict: outcome.report.verdict(),
            verdict_tone: outcome.report.verdict_tone(),
            rule_flags: &outcome.rule_flags,
            document_chars: outcome.document_chars,
            report: &outcome.report,
        }
    }
}
