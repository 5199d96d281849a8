//! Agent configuration: model endpoint, SMTP credentials, artifact paths.
//!
//! Configuration is an explicit struct constructed once at startup and passed
//! by reference into the resolver and dispatcher — no process-wide globals.
//! Values layer as: built-in defaults ← optional TOML file ← environment.
//! Secrets (`OPENAI_API_KEY`, `SMTP_PASS`) come from the environment only and
//! their absence is a reported failure at first use, never a startup crash.

use std::path::Path;

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::paths::{AtlasPaths, PathError};

/// Errors from configuration loading.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(atlas::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {path}")]
    #[diagnostic(
        code(atlas::config::parse),
        help("The file must be valid TOML. Check the syntax near the reported location.")
    )]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Paths(#[from] PathError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for the external language model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// API key. `None` until `OPENAI_API_KEY` is set.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Settings for the outgoing mail transport.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host.
    pub host: String,
    /// SMTPS port.
    pub port: u16,
    /// Sender address (also the SMTP username).
    pub sender: String,
    /// App password. `None` until `SMTP_PASS` is set.
    pub app_password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".into(),
            port: 465,
            sender: String::new(),
            app_password: None,
        }
    }
}

/// Complete agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub smtp: SmtpConfig,
    pub paths: AtlasPaths,
    /// Conversational-mode prefix, matched case-insensitively.
    pub wake_phrase: String,
}

/// TOML shape of the optional config file. All fields optional; anything
/// absent falls back to defaults or environment values.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    llm: LlmFileSection,
    #[serde(default)]
    smtp: SmtpFileSection,
    wake_phrase: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmFileSection {
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SmtpFileSection {
    host: Option<String>,
    port: Option<u16>,
    sender: Option<String>,
}

impl AgentConfig {
    /// Load configuration: defaults, then the TOML file (if given), then
    /// environment variables on top.
    pub fn load(file: Option<&Path>) -> ConfigResult<Self> {
        let parsed = match file {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                })?;
                toml::from_str::<ConfigFile>(&content).map_err(|e| ConfigError::Parse {
                    path: path.display().to_string(),
                    source: e,
                })?
            }
            None => ConfigFile::default(),
        };

        let mut llm = LlmConfig::default();
        if let Some(v) = parsed.llm.base_url {
            llm.base_url = v;
        }
        if let Some(v) = parsed.llm.model {
            llm.model = v;
        }
        if let Some(v) = parsed.llm.timeout_secs {
            llm.timeout_secs = v;
        }
        if let Ok(v) = std::env::var("ATLAS_LLM_BASE_URL") {
            llm.base_url = v;
        }
        if let Ok(v) = std::env::var("ATLAS_LLM_MODEL") {
            llm.model = v;
        }
        llm.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());

        let mut smtp = SmtpConfig::default();
        if let Some(v) = parsed.smtp.host {
            smtp.host = v;
        }
        if let Some(v) = parsed.smtp.port {
            smtp.port = v;
        }
        if let Some(v) = parsed.smtp.sender {
            smtp.sender = v;
        }
        if let Ok(v) = std::env::var("ATLAS_SMTP_SENDER") {
            smtp.sender = v;
        }
        smtp.app_password = std::env::var("SMTP_PASS").ok().filter(|p| !p.is_empty());

        let paths = AtlasPaths::resolve()?;

        Ok(Self {
            llm,
            smtp,
            paths,
            wake_phrase: parsed.wake_phrase.unwrap_or_else(|| "hey ai".into()),
        })
    }
}
