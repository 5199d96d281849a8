//! End-to-end pipeline tests: utterance in, response out, with every
//! capability seam replaced by a recording fake.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use atlas::agent::Agent;
use atlas::config::{AgentConfig, LlmConfig, SmtpConfig};
use atlas::exec::desktop::{Desktop, DesktopResult};
use atlas::exec::mailer::{MailResult, Mailer};
use atlas::exec::web::{WebClient, WebError, WebResult};
use atlas::llm::{LanguageModel, LlmError};
use atlas::paths::AtlasPaths;

// ── Fakes ─────────────────────────────────────────────────────────────────

/// Desktop fake that records every primitive invoked.
#[derive(Default)]
struct RecordingDesktop {
    log: Mutex<Vec<String>>,
}

impl RecordingDesktop {
    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl Desktop for RecordingDesktop {
    fn run_shell(&self, command: &str) -> DesktopResult<String> {
        self.push(format!("shell:{command}"));
        Ok("shell output\n".into())
    }
    fn run_applescript(&self, script: &str) -> DesktopResult<String> {
        self.push(format!("osascript:{script}"));
        Ok(String::new())
    }
    fn open_path(&self, path: &Path, app: Option<&str>) -> DesktopResult<()> {
        self.push(format!("open:{}:{}", path.display(), app.unwrap_or("-")));
        Ok(())
    }
    fn open_url(&self, url: &str) -> DesktopResult<()> {
        self.push(format!("url:{url}"));
        Ok(())
    }
    fn capture_screen(&self, path: &Path) -> DesktopResult<()> {
        self.push(format!("capture:{}", path.display()));
        Ok(())
    }
    fn click(&self, x: u32, y: u32) -> DesktopResult<()> {
        self.push(format!("click:{x},{y}"));
        Ok(())
    }
    fn move_cursor(&self, x: u32, y: u32) -> DesktopResult<()> {
        self.push(format!("move:{x},{y}"));
        Ok(())
    }
    fn type_text(&self, text: &str) -> DesktopResult<()> {
        self.push(format!("type:{text}"));
        Ok(())
    }
    fn press_return(&self) -> DesktopResult<()> {
        self.push("return".into());
        Ok(())
    }
    fn screen_size(&self) -> DesktopResult<(u32, u32)> {
        Ok((1000, 1000))
    }
    fn sleep(&self, _duration: Duration) {}
}

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: std::sync::Arc<Mutex<Vec<(String, String, String)>>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> MailResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.into(), subject.into(), body.into()));
        Ok(())
    }
}

struct CannedWeb {
    responses: Vec<(String, String)>,
}

impl WebClient for CannedWeb {
    fn get_text(&self, url: &str) -> WebResult<String> {
        self.responses
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| WebError::RequestFailed {
                url: url.to_string(),
                message: "no canned response".into(),
            })
    }
}

struct CannedModel {
    response: String,
}

impl LanguageModel for CannedModel {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}

struct PanickingModel;

impl LanguageModel for PanickingModel {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        panic!("the model must not be invoked on this path");
    }
}

// ── Harness ───────────────────────────────────────────────────────────────

struct Harness {
    agent: Agent,
    _dir: tempfile::TempDir,
}

fn harness(model: Box<dyn LanguageModel>, web: Box<dyn WebClient>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let paths = AtlasPaths {
        notes_dir: dir.path().join("notes"),
        projects_dir: dir.path().join("projects"),
        screenshots_dir: dir.path().join("screenshots"),
    };
    paths.ensure_dirs().unwrap();
    let config = AgentConfig {
        llm: LlmConfig::default(),
        smtp: SmtpConfig::default(),
        paths,
        wake_phrase: "hey ai".into(),
    };
    let agent = Agent::with_parts(
        config,
        Box::new(RecordingDesktop::default()),
        Box::new(RecordingMailer::default()),
        web,
        model,
    );
    Harness { agent, _dir: dir }
}

fn offline_web() -> Box<dyn WebClient> {
    Box::new(CannedWeb {
        responses: Vec::new(),
    })
}

// ── Notes ─────────────────────────────────────────────────────────────────

#[test]
fn note_round_trip_save_list_read() {
    let h = harness(Box::new(PanickingModel), offline_web());

    let saved = h.agent.handle("save note: groceries: milk and eggs");
    assert!(saved.response.starts_with("📝"), "{}", saved.response);
    assert_eq!(saved.task.as_deref(), Some("NOTE"));

    let listed = h.agent.handle("list notes");
    assert!(listed.response.contains("groceries"), "{}", listed.response);

    let read = h.agent.handle("read note groceries");
    assert!(read.response.contains("milk and eggs"), "{}", read.response);
}

#[test]
fn bare_notes_lists_instead_of_saving() {
    let h = harness(Box::new(PanickingModel), offline_web());
    let reply = h.agent.handle("notes");
    assert!(reply.response.starts_with("📂"), "{}", reply.response);
}

#[test]
fn missing_note_is_reported_not_created() {
    let h = harness(Box::new(PanickingModel), offline_web());
    let reply = h.agent.handle("read note nothing-here");
    assert!(reply.response.starts_with("❌"), "{}", reply.response);
}

// ── Fast path ─────────────────────────────────────────────────────────────

#[test]
fn email_fast_path_bypasses_the_classifier() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AtlasPaths {
        notes_dir: dir.path().join("notes"),
        projects_dir: dir.path().join("projects"),
        screenshots_dir: dir.path().join("screenshots"),
    };
    paths.ensure_dirs().unwrap();
    let mailer = RecordingMailer::default();
    let config = AgentConfig {
        llm: LlmConfig::default(),
        smtp: SmtpConfig::default(),
        paths,
        wake_phrase: "hey ai".into(),
    };
    let agent = Agent::with_parts(
        config,
        Box::new(RecordingDesktop::default()),
        Box::new(mailer.clone()),
        offline_web(),
        Box::new(PanickingModel),
    );

    let reply = agent.handle("send email to test@example.com subject Hello body This is a test");
    assert_eq!(reply.response, "📧 Email sent to test@example.com");
    assert_eq!(
        reply.task.as_deref(),
        Some("EMAIL:test@example.com|Hello|This is a test")
    );

    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![(
            "test@example.com".into(),
            "Hello".into(),
            "This is a test".into()
        )]
    );
}

#[test]
fn whatsapp_fast_path_bypasses_the_classifier() {
    let h = harness(Box::new(PanickingModel), offline_web());
    let reply = h.agent.handle("send message to Sneha hello how are you");
    assert_eq!(reply.task.as_deref(), Some("WHATSAPP:Sneha|hello how are you"));
    assert!(reply.response.contains("Sneha"), "{}", reply.response);
}

// ── Classifier output handling ────────────────────────────────────────────

#[test]
fn volume_out_of_range_is_rejected_before_dispatch() {
    let h = harness(
        Box::new(CannedModel {
            response: "SET_VOLUME:150".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("crank it way up");
    assert!(reply.response.starts_with("❌"), "{}", reply.response);
}

#[test]
fn non_numeric_volume_is_rejected() {
    let h = harness(
        Box::new(CannedModel {
            response: "SET_VOLUME:abc".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("set the volume to abc");
    assert!(reply.response.starts_with("❌"), "{}", reply.response);
}

#[test]
fn valid_volume_dispatches() {
    let h = harness(
        Box::new(CannedModel {
            response: "SET_VOLUME:30".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("set volume to 30");
    assert_eq!(reply.response, "🔊 Volume set to 30%.");
}

#[test]
fn mute_sound_reports_the_marker() {
    let h = harness(
        Box::new(CannedModel {
            response: "MUTE_SOUND".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("silence please");
    assert_eq!(reply.response, "🔇 Sound muted.");
    assert_eq!(reply.task.as_deref(), Some("MUTE_SOUND"));
}

#[test]
fn unknown_classifier_text_runs_as_raw_command() {
    let h = harness(
        Box::new(CannedModel {
            response: "open -a Calculator".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("open the calculator app");
    assert!(reply.response.contains("shell output"), "{}", reply.response);
    assert_eq!(reply.task.as_deref(), Some("open -a Calculator"));
}

#[test]
fn malformed_known_tag_is_an_error_not_a_shell_command() {
    let h = harness(
        Box::new(CannedModel {
            response: "EMAIL:missing_fields".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("email something");
    assert!(reply.response.starts_with("❌"), "{}", reply.response);
}

// ── Weather ───────────────────────────────────────────────────────────────

#[test]
fn weather_chains_geolocation_into_the_report() {
    let web = Box::new(CannedWeb {
        responses: vec![
            (
                "https://ipinfo.io/json".into(),
                r#"{"city":"Pune","region":"Maharashtra"}"#.into(),
            ),
            (
                "https://wttr.in/Pune,Maharashtra".into(),
                "Pune,Maharashtra: ⛅️ +28°C\n".into(),
            ),
        ],
    });
    let h = harness(
        Box::new(CannedModel {
            response: "WEATHER".into(),
        }),
        web,
    );
    let reply = h.agent.handle("how is the weather");
    assert_eq!(reply.response, "🌦️ Pune,Maharashtra: ⛅️ +28°C");
}

// ── Chat fallback ─────────────────────────────────────────────────────────

#[test]
fn wake_phrase_returns_a_chat_reply() {
    let h = harness(
        Box::new(CannedModel {
            response: "Nice to meet you!".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("hey ai introduce yourself");
    assert_eq!(reply.response, "🤖 Nice to meet you!");
    assert_eq!(reply.task, None);
    assert_eq!(reply.task_result, None);
}

#[test]
fn chat_turn_runs_a_parameterless_keyword_task() {
    let h = harness(
        Box::new(CannedModel {
            response: "Sure, muting now.".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("hey ai please mute_sound for me");
    assert_eq!(reply.response, "🤖 Sure, muting now.");
    assert_eq!(reply.task.as_deref(), Some("mute_sound"));
    assert_eq!(reply.task_result.as_deref(), Some("🔇 Sound muted."));
}

#[test]
fn chat_turn_declines_parameter_bearing_keywords() {
    let h = harness(
        Box::new(CannedModel {
            response: "Happy to help with email.".into(),
        }),
        offline_web(),
    );
    let reply = h.agent.handle("hey ai can you email someone");
    assert_eq!(reply.task.as_deref(), Some("email"));
    let result = reply.task_result.unwrap();
    assert!(result.starts_with("❌"), "{result}");
    assert!(result.contains("send email to"), "{result}");
}
