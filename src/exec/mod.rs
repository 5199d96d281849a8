//! Action dispatch: typed intents in, human-readable results out.
//!
//! The dispatcher is the only place an intent line crosses from text into
//! effects. Parsing happens here, so a malformed line from the classifier
//! dies as a failure result instead of reaching a handler (or the shell).
//! Every handler goes through a capability seam; the dispatcher itself owns
//! no sockets, subprocesses, or credentials.

pub mod automation;
pub mod desktop;
pub mod mailer;
pub mod project;
pub mod web;

use tracing::warn;

use crate::intent::Intent;
use crate::llm::LanguageModel;
use crate::paths::AtlasPaths;

use self::desktop::Desktop;
use self::mailer::Mailer;
use self::web::WebClient;

/// The outcome of executing one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    /// Whether the action's effect took hold.
    pub success: bool,
    /// Human-readable summary, prefixed with a semantic marker.
    pub message: String,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Routes parsed intents to their handlers.
///
/// Borrows its seams so tests can assemble one from local fakes without any
/// ownership ceremony.
pub struct Dispatcher<'a> {
    paths: &'a AtlasPaths,
    desktop: &'a dyn Desktop,
    mailer: &'a dyn Mailer,
    web: &'a dyn WebClient,
    model: &'a dyn LanguageModel,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        paths: &'a AtlasPaths,
        desktop: &'a dyn Desktop,
        mailer: &'a dyn Mailer,
        web: &'a dyn WebClient,
        model: &'a dyn LanguageModel,
    ) -> Self {
        Self {
            paths,
            desktop,
            mailer,
            web,
            model,
        }
    }

    /// Parse an intent line and execute it.
    ///
    /// A known tag with a malformed payload is rejected here; it never falls
    /// through to the shell.
    pub fn dispatch(&self, line: &str) -> ActionResult {
        match Intent::parse(line) {
            Ok(intent) => self.dispatch_intent(&intent),
            Err(e) => ActionResult::failure(format!("❌ {e}")),
        }
    }

    /// Execute an already-parsed intent.
    pub fn dispatch_intent(&self, intent: &Intent) -> ActionResult {
        match intent {
            Intent::Codegen(prompt) => {
                project::create_project(self.model, self.desktop, &self.paths.projects_dir, prompt)
            }
            Intent::Solve(query) => project::solve(self.model, query),
            Intent::Weather => web::get_weather(self.web),
            Intent::Screenshot => {
                automation::take_screenshot(self.desktop, &self.paths.screenshots_dir)
            }
            Intent::Whatsapp { contact, message } => {
                automation::send_whatsapp_message(self.desktop, contact, message)
            }
            Intent::WhatsappCall(contact) => automation::make_audio_call(self.desktop, contact),
            Intent::WhatsappVideoCall(contact) => {
                automation::make_video_call(self.desktop, contact)
            }
            Intent::Email { to, subject, body } => match self.mailer.send(to, subject, body) {
                Ok(()) => ActionResult::ok(format!("📧 Email sent to {to}")),
                Err(e) => ActionResult::failure(format!("❌ Could not send email: {e}")),
            },
            Intent::Google(query) => web::google_search(self.desktop, query),
            Intent::Youtube(query) => web::youtube_search(self.desktop, query),
            Intent::YtPlay(query) => web::youtube_play(self.web, self.desktop, query),
            Intent::MapsFindMe => automation::maps_find_me(self.desktop),
            Intent::MuteSound => automation::mute_sound(self.desktop),
            Intent::UnmuteSound => automation::unmute_sound(self.desktop),
            Intent::SetVolume(level) => automation::set_volume(self.desktop, *level),
            Intent::RawCommand(command) => self.run_raw_command(command),
        }
    }

    /// Shell escape hatch for utterances no tag matched.
    fn run_raw_command(&self, command: &str) -> ActionResult {
        warn!(%command, "no intent matched; executing as raw shell command");
        match self.desktop.run_shell(command) {
            Ok(output) => {
                let output = output.trim();
                if output.is_empty() {
                    ActionResult::ok("✅ Command executed.")
                } else {
                    ActionResult::ok(output)
                }
            }
            Err(e) => ActionResult::failure(format!("❌ Command failed: {e}")),
        }
    }
}
