//! Two-stage intent resolution: deterministic fast paths, then the classifier.
//!
//! The fast path covers the two intents whose free-text payloads an external
//! classifier is most likely to mis-segment (swapping an email subject and
//! body, splitting a contact name mid-word). Regex capture groups give exact
//! field extraction and skip the network round trip entirely.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::classify::Classifier;
use crate::intent::Intent;
use crate::llm::{LanguageModel, LlmError};

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^send email to (\S+@\S+) subject (.+) body (.+)$").unwrap()
    })
}

fn whatsapp_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^send (?:message|msg) to (.+?) (.+)$").unwrap())
}

/// Resolve high-value intents deterministically, without the classifier.
///
/// Recognizes:
/// - `send email to <addr> subject <subject> body <body>` → [`Intent::Email`]
/// - `send message|msg to <contact> <message>` → [`Intent::Whatsapp`]
///
/// Matching is case-insensitive; captured fields keep their original case
/// and are trimmed.
pub fn resolve_fast_path(text: &str) -> Option<Intent> {
    let text = text.trim();

    if let Some(caps) = email_pattern().captures(text) {
        return Some(Intent::Email {
            to: caps[1].trim().to_string(),
            subject: caps[2].trim().to_string(),
            body: caps[3].trim().to_string(),
        });
    }

    if let Some(caps) = whatsapp_pattern().captures(text) {
        return Some(Intent::Whatsapp {
            contact: caps[1].trim().to_string(),
            message: caps[2].trim().to_string(),
        });
    }

    None
}

/// The full task-resolution stage: fast path first, classifier second.
///
/// Returns the raw intent line (wire format) so the caller can report what
/// was resolved alongside the dispatch result.
pub fn resolve_task(text: &str, model: &dyn LanguageModel) -> Result<String, LlmError> {
    if let Some(intent) = resolve_fast_path(text) {
        debug!(intent = %intent, "resolved via fast path");
        return Ok(intent.to_string());
    }

    let line = Classifier::new(model).classify(text)?;
    debug!(intent = %line, "resolved via classifier");
    Ok(line)
}
