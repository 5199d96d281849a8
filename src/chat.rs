//! Conversational fallback behind the wake phrase.
//!
//! When an utterance opens with the wake phrase, task resolution is bypassed
//! and the model answers conversationally. The original query (never the
//! reply) is then re-scanned for a task keyword; a hit produces a secondary
//! action bundled alongside the chat reply. Tasks that need no parameters run
//! immediately; parameter-bearing ones report what is missing instead of
//! guessing.

use crate::exec::{ActionResult, Dispatcher};
use crate::intent::Intent;
use crate::llm::{LanguageModel, LlmError};

const PERSONA: &str = "You are a friendly, helpful AI assistant named Atlas. \
    Answer naturally, conversationally, and helpfully. \
    Keep responses short and engaging, unless the user asks for a detailed explanation.";

/// The outcome of a wake-phrase turn: a chat reply, plus an optional
/// secondary task detected in the query.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The conversational reply (always present).
    pub reply: String,
    /// Task keyword found in the query, if any.
    pub task: Option<&'static str>,
    /// Result of running (or declining to run) the detected task.
    pub task_result: Option<ActionResult>,
}

/// Strip the wake phrase prefix, case-insensitively.
///
/// Returns the remainder of the query, or `None` when the utterance is not
/// conversational. A bare wake phrase becomes a default greeting.
pub fn strip_wake_phrase(text: &str, wake_phrase: &str) -> Option<String> {
    let trimmed = text.trim();
    let prefix = trimmed.get(..wake_phrase.len());
    if !prefix.is_some_and(|p| p.eq_ignore_ascii_case(wake_phrase)) {
        return None;
    }
    let rest = trimmed[wake_phrase.len()..].trim();
    if rest.is_empty() {
        Some("Hello".to_string())
    } else {
        Some(rest.to_string())
    }
}

/// Produce a conversational reply for an already-stripped query.
pub fn chat_reply(model: &dyn LanguageModel, query: &str) -> Result<String, LlmError> {
    let content = model.complete(PERSONA, query)?;
    Ok(format!("🤖 {}", content.trim()))
}

/// Run one full wake-phrase turn: reply, scan, and (maybe) act.
pub fn run_chat_turn(
    model: &dyn LanguageModel,
    dispatcher: &Dispatcher<'_>,
    query: &str,
) -> Result<ChatOutcome, LlmError> {
    let reply = chat_reply(model, query)?;

    let Some(keyword) = Intent::scan_keyword(query) else {
        return Ok(ChatOutcome {
            reply,
            task: None,
            task_result: None,
        });
    };

    let task_result = offer_task(keyword, dispatcher);
    Ok(ChatOutcome {
        reply,
        task: Some(keyword),
        task_result: Some(task_result),
    })
}

/// Execute a keyword-detected task, or explain why it cannot run bare.
///
/// Only tasks with no required parameters execute here; the rest point the
/// user at the explicit command form rather than prompting or guessing.
fn offer_task(keyword: &'static str, dispatcher: &Dispatcher<'_>) -> ActionResult {
    match keyword {
        // Parameterless: the keyword uppercased is the unit tag itself.
        "screenshot" | "maps_find_me" | "mute_sound" | "unmute_sound" | "weather" => {
            dispatcher.dispatch(&keyword.to_uppercase())
        }
        "whatsapp" => ActionResult::failure(
            "❌ WhatsApp messaging requires contact and message details. \
             Try: send message to <contact> <message>",
        ),
        "whatsapp_call" => ActionResult::failure(
            "❌ WhatsApp audio call requires a contact name. Try: call <contact>",
        ),
        "whatsapp_video_call" => ActionResult::failure(
            "❌ WhatsApp video call requires a contact name. Try: video call <contact>",
        ),
        "email" => ActionResult::failure(
            "❌ Email requires recipient, subject, and body. \
             Try: send email to <addr> subject <subject> body <body>",
        ),
        "google" => ActionResult::failure("❌ Google search requires a query."),
        "youtube" => ActionResult::failure("❌ YouTube search requires a query."),
        "ytplay" => ActionResult::failure("❌ YouTube play requires a query."),
        "set_volume" => ActionResult::failure("❌ Set volume requires a level between 0 and 100."),
        "codegen" => ActionResult::failure("❌ Code generation requires a description."),
        "solve" => ActionResult::failure("❌ Problem solving requires a question."),
        other => ActionResult::failure(format!("⚠️ Unrecognized task '{other}'.")),
    }
}
