use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::analysis::{AuditAnalyst, AuditReport};
use crate::extract::{ExtractionError, TextExtractor};
use crate::rules::{run_rule_checks, RuleFlag};

/// Inputs for one audit. Nothing here outlives the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditRequest<'a> {
    /// Raw bytes of the uploaded document.
    pub document: Option<&'a [u8]>,
    /// API credential for the analyst.
    pub credential: Option<&'a str>,
}

/// Everything the presentation layer needs from a completed audit.
#[derive(Debug, Clone, Serialize)]
pub struct AuditOutcome {
    pub rule_flags: Vec<RuleFlag>,
    pub report: AuditReport,
    pub document_chars: usize,
}

/// Terminal failures of an audit request.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("an API key is required; pass --api-key or set DEED_AUDIT_API_KEY")]
    MissingCredential,
    #[error("no document supplied; provide a PDF to audit")]
    MissingDocument,
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Analysis Failed: {0:#}")]
    Analysis(anyhow::Error),
}

/// Extract, check and analyse one document.
///
/// Preconditions are checked before any work: the credential (when the analyst
/// needs one), then the document. Extraction failure stops the audit before the
/// rule checks run, and an analyst error is returned instead of a partial report.
#[instrument(name = "run_audit", skip_all, fields(has_document = request.document.is_some()))]
pub async fn run_audit<E, A>(
    extractor: &E,
    analyst: &A,
    request: AuditRequest<'_>,
) -> Result<AuditOutcome, AuditError>
where
    E: TextExtractor + ?Sized,
    A: AuditAnalyst + ?Sized,
{
    let credential = request
        .credential
        .map(str::trim)
        .filter(|key| !key.is_empty());
    let credential = match credential {
        Some(key) => key,
        None if analyst.requires_credential() => return Err(AuditError::MissingCredential),
        None => "",
    };
    let document = request.document.ok_or(AuditError::MissingDocument)?;

    let text = extractor.extract(document)?;
    let document_chars = text.chars().count();
    info!(document_chars, "document text extracted");

    let rule_flags = run_rule_checks(&text);
    info!(rule_flags = rule_flags.len(), "rule checks finished; requesting analysis");

    let report = analyst
        .analyze(&text, &rule_flags, credential)
        .await
        .map_err(AuditError::Analysis)?;
    info!(
        verdict = report.verdict(),
        risks = report.risk_report.len(),
        "analysis received"
    );

    Ok(AuditOutcome {
        rule_flags,
        report,
        document_chars,
    })
}
