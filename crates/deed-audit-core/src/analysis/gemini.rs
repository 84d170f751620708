use super::parse::parse_report;
use super::{AnalystSettings, AuditAnalyst, AuditReport};
use crate::rules::RuleFlag;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-flash-latest";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Analyst backed by the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiAnalyst {
    http: Client,
    url: String,
    temperature: f32,
}

impl GeminiAnalyst {
    pub fn new(settings: &AnalystSettings) -> Result<Self> {
        let base = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let model = settings
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base.trim_end_matches('/'),
            model
        );
        let http = Client::builder()
            .user_agent(concat!("deed-audit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(
                settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self {
            http,
            url,
            temperature: settings.temperature,
        })
    }

    fn request_for(&self, text: &str, flags: &[RuleFlag]) -> Result<GeminiRequest> {
        let flags_json =
            serde_json::to_string(flags).context("failed to serialise rule flags for prompt")?;
        Ok(GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(system_prompt(&flags_json)),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart {
                    text: Some(text.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json".into(),
            },
        })
    }
}

#[async_trait]
impl AuditAnalyst for GeminiAnalyst {
    #[instrument(name = "gemini_analyze", skip_all, fields(text_len = text.len(), flags = flags.len()))]
    async fn analyze(
        &self,
        text: &str,
        flags: &[RuleFlag],
        credential: &str,
    ) -> Result<AuditReport> {
        if credential.trim().is_empty() {
            bail!("Gemini API key must be provided");
        }
        let payload = self.request_for(text, flags)?;

        let response = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, credential)
            .json(&payload)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to call Gemini generateContent API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Gemini API error ({}): {}", status, body);
        }

        let message: GeminiResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to parse Gemini response")?;
        let content = message
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .filter_map(|part| part.text)
            .find(|text| !text.trim().is_empty())
            .ok_or_else(|| anyhow!("Gemini response missing message content"))?;
        debug!(reply_len = content.len(), "received Gemini reply");

        parse_report(&content).context("expected JSON audit report from Gemini response")
    }
}

fn system_prompt(flags_json: &str) -> String {
    format!(
        r#"You are a legal auditor for Indian residential property transactions, reviewing a sale deed.

Automated rule flags raised before your review: {flags_json}
The user message contains the full deed text.

Tasks:
1. Summarise the deal (parties, property, financial terms).
2. Explain every clause in plain English for a layperson.
3. Assess risks, confirming or dismissing each automated rule flag.

Respond with JSON only, in exactly this shape:
{{
  "executive_summary": {{
    "parties": "Seller: <name> | Buyer: <name>",
    "property_details": "<address, survey number>",
    "financial_terms": "<price and payment mode>"
  }},
  "section_analysis": [
    {{
      "section_title": "<clause name>",
      "legal_summary": "<technical summary>",
      "simple_explanation": "<one sentence for a layperson>"
    }}
  ],
  "risk_report": [
    {{ "issue": "<issue>", "severity": "High|Medium|Low", "advice": "<advice>" }}
  ],
  "final_verdict": "NORMAL|SUSPICIOUS|FRAUD-LIKE"
}}"#
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiResponseContent,
}

#[derive(Deserialize, Default)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}
