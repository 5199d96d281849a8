//! Rich diagnostic error types for atlas.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes and help text. This module aggregates them
//! into a single top-level type so binaries can return one `Result`.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::exec::desktop::DesktopError;
use crate::exec::mailer::MailError;
use crate::exec::web::WebError;
use crate::intent::IntentParseError;
use crate::llm::LlmError;
use crate::paths::PathError;

/// Top-level error type for the atlas agent.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum AtlasError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Paths(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Intent(#[from] IntentParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Desktop(#[from] DesktopError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Web(#[from] WebError),
}

/// Convenience alias for functions returning atlas results.
pub type AtlasResult<T> = std::result::Result<T, AtlasError>;
