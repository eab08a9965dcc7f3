use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::layout::MarkdownMode;
use crate::llm_client::{DEFAULT_CHAT_API_URL, DEFAULT_CHAT_MODEL};

/// Application configuration loaded from environment variables.
/// Everything has a default; the chat relay and profile fetch stay off
/// without their credentials.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub export_dir: PathBuf,
    /// `literal` (default) prints markdown syntax; `stripped` removes it before layout.
    pub export_markdown: MarkdownMode,
    pub openai_api_key: Option<String>,
    pub chat_api_url: String,
    pub chat_model: String,
    pub github_token: Option<String>,
    pub github_username: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            export_dir: var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("exports")),
            export_markdown: var("EXPORT_MARKDOWN")
                .map(|v| parse_markdown_mode(&v))
                .transpose()
                .context("EXPORT_MARKDOWN must be `literal` or `stripped`")?
                .unwrap_or_default(),
            openai_api_key: var("OPENAI_API_KEY"),
            chat_api_url: var("CHAT_API_URL").unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_string()),
            chat_model: var("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            github_token: var("GITHUB_TOKEN"),
            github_username: var("GITHUB_USERNAME"),
        })
    }
}

fn parse_markdown_mode(value: &str) -> Result<MarkdownMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "literal" => Ok(MarkdownMode::Literal),
        "stripped" => Ok(MarkdownMode::Stripped),
        other => Err(anyhow!("unknown markdown mode '{other}'")),
    }
}
