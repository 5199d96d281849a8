//! The agent: one utterance in, one [`AgentResponse`] out.
//!
//! Resolution runs in four fixed stages, each one claiming the utterance or
//! passing it on:
//!
//! 1. wake phrase → conversational turn (with keyword-detected side task)
//! 2. note patterns → local note store, no model involved
//! 3. fast-path regexes → typed intent, no model involved
//! 4. constrained classifier → intent line → dispatcher
//!
//! The agent owns its capability seams behind trait objects, so the whole
//! pipeline runs against fakes in tests.

use serde::Serialize;
use tracing::debug;

use crate::chat::{run_chat_turn, strip_wake_phrase};
use crate::config::AgentConfig;
use crate::error::AtlasResult;
use crate::exec::desktop::{Desktop, MacDesktop};
use crate::exec::mailer::{Mailer, SmtpMailer};
use crate::exec::web::{UreqWebClient, WebClient};
use crate::exec::Dispatcher;
use crate::llm::{LanguageModel, OpenAiClient};
use crate::notes::{resolve_note_intent, NoteStore};
use crate::resolve::resolve_task;

/// What one turn produced, serialized as-is by the HTTP server.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    /// The user-facing text: a chat reply or an action's result message.
    pub response: String,
    /// The resolved task, when one ran: an intent line, `NOTE`, or a
    /// keyword detected during chat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Result of a side task run during a chat turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_result: Option<String>,
}

impl AgentResponse {
    fn plain(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            task: None,
            task_result: None,
        }
    }
}

/// The assembled pipeline.
pub struct Agent {
    config: AgentConfig,
    desktop: Box<dyn Desktop>,
    mailer: Box<dyn Mailer>,
    web: Box<dyn WebClient>,
    model: Box<dyn LanguageModel>,
    notes: NoteStore,
}

impl Agent {
    /// Wire up the production seams and create the working directories.
    pub fn new(config: AgentConfig) -> AtlasResult<Self> {
        config.paths.ensure_dirs()?;
        let model = OpenAiClient::new(config.llm.clone());
        let mailer = SmtpMailer::new(config.smtp.clone());
        Ok(Self::with_parts(
            config,
            Box::new(MacDesktop),
            Box::new(mailer),
            Box::new(UreqWebClient::new()),
            Box::new(model),
        ))
    }

    /// Assemble an agent from explicit seams. Directories are not created.
    pub fn with_parts(
        config: AgentConfig,
        desktop: Box<dyn Desktop>,
        mailer: Box<dyn Mailer>,
        web: Box<dyn WebClient>,
        model: Box<dyn LanguageModel>,
    ) -> Self {
        let notes = NoteStore::new(config.paths.notes_dir.clone());
        Self {
            config,
            desktop,
            mailer,
            web,
            model,
            notes,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(
            &self.config.paths,
            self.desktop.as_ref(),
            self.mailer.as_ref(),
            self.web.as_ref(),
            self.model.as_ref(),
        )
    }

    /// Handle one utterance end to end.
    pub fn handle(&self, text: &str) -> AgentResponse {
        let text = text.trim();

        // Stage 1: conversational turn behind the wake phrase.
        if let Some(query) = strip_wake_phrase(text, &self.config.wake_phrase) {
            debug!(%query, "wake phrase matched; chat turn");
            return match run_chat_turn(self.model.as_ref(), &self.dispatcher(), &query) {
                Ok(outcome) => AgentResponse {
                    response: outcome.reply,
                    task: outcome.task.map(str::to_string),
                    task_result: outcome.task_result.map(|r| r.message),
                },
                Err(e) => AgentResponse::plain(format!("❌ Chat failed: {e}")),
            };
        }

        // Stage 2: note commands stay local.
        if let Some(command) = resolve_note_intent(text) {
            debug!(?command, "note intent matched");
            let result = self.notes.execute(&command, self.desktop.as_ref());
            return AgentResponse {
                response: result.message,
                task: Some("NOTE".into()),
                task_result: None,
            };
        }

        // Stages 3 + 4: fast path, then the classifier; dispatch the line.
        let line = match resolve_task(text, self.model.as_ref()) {
            Ok(line) => line,
            Err(e) => return AgentResponse::plain(format!("❌ Could not resolve task: {e}")),
        };
        let result = self.dispatcher().dispatch(&line);
        AgentResponse {
            response: result.message,
            task: Some(line),
            task_result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::exec::desktop::NoopDesktop;
    use crate::exec::mailer::MailResult;
    use crate::exec::web::{WebError, WebResult};
    use crate::llm::LlmError;
    use crate::paths::AtlasPaths;

    struct CannedModel {
        response: String,
    }
    impl LanguageModel for CannedModel {
        fn complete(&self, _: &str, _: &str) -> Result<String, LlmError> {
            Ok(self.response.clone())
        }
    }

    struct PanickingModel;
    impl LanguageModel for PanickingModel {
        fn complete(&self, _: &str, _: &str) -> Result<String, LlmError> {
            panic!("model must not be invoked");
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<String>>,
    }
    impl Mailer for RecordingMailer {
        fn send(&self, to: &str, _: &str, _: &str) -> MailResult<()> {
            self.sent.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    struct NoWeb;
    impl WebClient for NoWeb {
        fn get_text(&self, url: &str) -> WebResult<String> {
            Err(WebError::RequestFailed {
                url: url.into(),
                message: "offline".into(),
            })
        }
    }

    fn test_agent(dir: &std::path::Path, model: Box<dyn LanguageModel>) -> Agent {
        let paths = AtlasPaths {
            notes_dir: dir.join("notes"),
            projects_dir: dir.join("projects"),
            screenshots_dir: dir.join("shots"),
        };
        paths.ensure_dirs().unwrap();
        let config = AgentConfig {
            llm: crate::config::LlmConfig::default(),
            smtp: crate::config::SmtpConfig::default(),
            paths,
            wake_phrase: "hey ai".into(),
        };
        Agent::with_parts(
            config,
            Box::new(NoopDesktop),
            Box::new(RecordingMailer::default()),
            Box::new(NoWeb),
            model,
        )
    }

    #[test]
    fn wake_phrase_routes_to_chat() {
        let dir = tempfile::tempdir().unwrap();
        let agent = test_agent(
            dir.path(),
            Box::new(CannedModel {
                response: "Doing great!".into(),
            }),
        );
        let reply = agent.handle("hey ai how are you");
        assert_eq!(reply.response, "🤖 Doing great!");
        assert_eq!(reply.task, None);
    }

    #[test]
    fn note_commands_never_touch_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let agent = test_agent(dir.path(), Box::new(PanickingModel));

        let reply = agent.handle("note buy milk");
        assert!(reply.response.starts_with("📝"));
        assert_eq!(reply.task.as_deref(), Some("NOTE"));

        let reply = agent.handle("list notes");
        assert!(reply.response.starts_with("📂"));
    }

    #[test]
    fn fast_path_email_skips_the_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let agent = test_agent(dir.path(), Box::new(PanickingModel));

        let reply = agent.handle("send email to a@b.com subject Hello body Hi there");
        assert_eq!(reply.response, "📧 Email sent to a@b.com");
        assert_eq!(reply.task.as_deref(), Some("EMAIL:a@b.com|Hello|Hi there"));
    }

    #[test]
    fn classifier_line_is_dispatched() {
        let dir = tempfile::tempdir().unwrap();
        let agent = test_agent(
            dir.path(),
            Box::new(CannedModel {
                response: "MUTE_SOUND".into(),
            }),
        );
        let reply = agent.handle("please silence the machine");
        assert_eq!(reply.response, "🔇 Sound muted.");
        assert_eq!(reply.task.as_deref(), Some("MUTE_SOUND"));
    }

    #[test]
    fn malformed_classifier_output_is_a_failure_response() {
        let dir = tempfile::tempdir().unwrap();
        let agent = test_agent(
            dir.path(),
            Box::new(CannedModel {
                response: "SET_VOLUME:150".into(),
            }),
        );
        let reply = agent.handle("volume to one hundred fifty");
        assert!(reply.response.starts_with("❌"));
        assert_eq!(reply.task.as_deref(), Some("SET_VOLUME:150"));
    }
}
