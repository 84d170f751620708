use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deed_audit_core::{
    build_analyst, render_flags, render_outcome, run_audit, run_rule_checks, AnalystSettings,
    AuditError, AuditRequest, OutputFormat, PdfTextExtractor, RuleKind, TextExtractor, RULE_CATALOG,
};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "deed-audit",
    author,
    version,
    about = "Sale deed auditor: rule checks plus language-model review"
)]
struct Cli {
    /// Optional settings file (TOML, YAML or JSON) with an `[analyst]` table
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a PDF, run the rule checks and request a model review
    Audit {
        /// Sale deed to audit
        #[arg(value_name = "PDF")]
        pdf: PathBuf,
        /// API key for the analyst (falls back to DEED_AUDIT_API_KEY)
        #[arg(long = "api-key", value_name = "KEY")]
        api_key: Option<String>,
        /// Emit the outcome as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Run only the local rule checks
    Check {
        /// PDF to check, or a text file with --plain-text (`-` reads stdin)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Treat INPUT as UTF-8 text instead of a PDF
        #[arg(long = "plain-text")]
        plain_text: bool,
        /// Emit flags as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// List the built-in rules
    Rules {
        /// Emit rules as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    analyst: Option<AnalystSettings>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Rules { json: false }) {
        Commands::Audit { pdf, api_key, json } => {
            audit(&pdf, api_key, cli.config.as_deref(), output_format(json)).await?
        }
        Commands::Check {
            input,
            plain_text,
            json,
        } => check(&input, plain_text, output_format(json)).await?,
        Commands::Rules { json } => list_rules(json)?,
    }
    Ok(())
}

async fn audit(
    pdf: &Path,
    api_key: Option<String>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let settings = load_settings(config_path)?;
    let analyst = build_analyst(&settings)?;
    let credential = api_key
        .filter(|key| !key.trim().is_empty())
        .or_else(AnalystSettings::credential_from_env);
    if credential.is_none() && analyst.requires_credential() {
        return Err(AuditError::MissingCredential.into());
    }

    let document = tokio::fs::read(pdf)
        .await
        .with_context(|| format!("failed to read {}", pdf.display()))?;
    info!(path = %pdf.display(), provider = %settings.provider, "starting audit");

    let outcome = run_audit(
        &PdfTextExtractor,
        analyst.as_ref(),
        AuditRequest {
            document: Some(&document),
            credential: credential.as_deref(),
        },
    )
    .await
    .with_context(|| format!("audit of {} failed", pdf.display()))?;

    print!("{}", render_outcome(&outcome, format)?);
    Ok(())
}

async fn check(input: &Path, plain_text: bool, format: OutputFormat) -> Result<()> {
    let text = if plain_text {
        read_text(input).await?
    } else {
        let document = tokio::fs::read(input)
            .await
            .with_context(|| format!("failed to read {}", input.display()))?;
        PdfTextExtractor
            .extract(&document)
            .with_context(|| format!("could not extract text from {}", input.display()))?
    };

    let flags = run_rule_checks(&text);
    print!("{}", render_flags(&flags, format)?);
    Ok(())
}

async fn read_text(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read text from stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))
}

fn list_rules(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&RULE_CATALOG)?);
        return Ok(());
    }

    println!("{} built-in rule(s)", RULE_CATALOG.len());
    for rule in RULE_CATALOG.iter() {
        let kind = match rule.kind {
            RuleKind::Keyword => "keyword",
            RuleKind::Regex => "regex",
        };
        println!(
            "- {id:<18} [{kind:7}] {severity:<6} :: {desc}",
            id = rule.id,
            kind = kind,
            severity = rule.severity,
            desc = rule.description,
        );
    }
    Ok(())
}

/// Defaults, then the `[analyst]` table of the config file, then `DEED_AUDIT_*` variables.
fn load_settings(config_path: Option<&Path>) -> Result<AnalystSettings> {
    let base = match config_path {
        Some(path) => {
            let file: FileConfig = config::Config::builder()
                .add_source(config::File::from(path))
                .build()
                .and_then(|cfg| cfg.try_deserialize())
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            file.analyst.unwrap_or_default()
        }
        None => AnalystSettings::default(),
    };
    base.with_env_overrides(&std::env::vars().collect())
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
