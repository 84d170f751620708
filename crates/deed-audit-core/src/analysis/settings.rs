use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Configuration for the analyst. The API credential is not part
/// of it; callers pass the credential with each request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalystSettings {
    pub provider: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: f32,
}

impl Default for AnalystSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".into(),
            endpoint: None,
            model: None,
            timeout_secs: None,
            temperature: 0.2,
        }
    }
}

impl AnalystSettings {
    pub const API_KEY_ENV: &'static str = "DEED_AUDIT_API_KEY";
    const PROVIDER_ENV: &'static str = "DEED_AUDIT_PROVIDER";
    const ENDPOINT_ENV: &'static str = "DEED_AUDIT_ENDPOINT";
    const MODEL_ENV: &'static str = "DEED_AUDIT_MODEL";
    const TIMEOUT_ENV: &'static str = "DEED_AUDIT_TIMEOUT_SECS";
    const TEMPERATURE_ENV: &'static str = "DEED_AUDIT_TEMPERATURE";

    /// Apply any non-blank `DEED_AUDIT_*` variables found in `vars` on top of `self`.
    ///
    /// * `DEED_AUDIT_PROVIDER` — `gemini` (default) or `noop`.
    /// * `DEED_AUDIT_ENDPOINT` — base URL override.
    /// * `DEED_AUDIT_MODEL` — model id override.
    /// * `DEED_AUDIT_TIMEOUT_SECS` / `DEED_AUDIT_TEMPERATURE` — request tuning.
    pub fn with_env_overrides(mut self, vars: &HashMap<String, String>) -> Result<Self> {
        let value = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(provider) = value(Self::PROVIDER_ENV) {
            self.provider = provider;
        }
        if let Some(endpoint) = value(Self::ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Some(model) = value(Self::MODEL_ENV) {
            self.model = Some(model);
        }
        if let Some(timeout) = value(Self::TIMEOUT_ENV) {
            let secs = timeout
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds", Self::TIMEOUT_ENV))?;
            self.timeout_secs = Some(secs);
        }
        if let Some(temperature) = value(Self::TEMPERATURE_ENV) {
            self.temperature = temperature
                .parse::<f32>()
                .with_context(|| format!("{} must be a number", Self::TEMPERATURE_ENV))?;
        }
        Ok(self)
    }

    /// Read the credential from `DEED_AUDIT_API_KEY`, ignoring blank values.
    pub fn credential_from_env() -> Option<String> {
        std::env::var(Self::API_KEY_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}
