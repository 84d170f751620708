pub mod analysis;
pub mod extract;
pub mod report;
pub mod rules;
pub mod workflow;

pub use analysis::{
    build_analyst, AnalystSettings, AuditAnalyst, AuditReport, ExecutiveSummary, GeminiAnalyst,
    NoopAnalyst, RiskItem, SectionAnalysis, VerdictTone,
};
pub use extract::{ExtractionError, PdfTextExtractor, TextExtractor};
pub use report::{render_flags, render_outcome, OutputFormat};
pub use rules::{run_rule_checks, RuleDefinition, RuleFlag, RuleKind, Severity, RULE_CATALOG};
pub use workflow::{run_audit, AuditError, AuditOutcome, AuditRequest};
