//! Scripted GUI automation sequences composed from [`Desktop`] primitives.
//!
//! WhatsApp has no scripting interface, so calls and messages are driven
//! through the UI itself: activate the app, focus search, type the contact,
//! then walk the cursor along screen-relative waypoints to the call buttons.
//! The waypoint fractions assume the default window layout; sleeps between
//! steps give the UI time to animate.

use std::path::Path;
use std::time::Duration;

use chrono::Local;
use tracing::info;

use super::desktop::{Desktop, DesktopError, DesktopResult};
use super::ActionResult;

/// Fractional (x, y) cursor waypoints leading toward the call buttons in the
/// top-right corner of the WhatsApp chat view.
const CALL_APPROACH: [(f64, f64); 3] = [(0.60, 0.25), (0.78, 0.15), (0.88, 0.08)];
const AUDIO_CALL_BUTTON: (f64, f64) = (0.915, 0.045);
const VIDEO_CALL_BUTTON: (f64, f64) = (0.945, 0.045);
const SEARCH_BOX: (f64, f64) = (0.20, 0.08);

fn at(frac: (f64, f64), size: (u32, u32)) -> (u32, u32) {
    (
        (frac.0 * size.0 as f64) as u32,
        (frac.1 * size.1 as f64) as u32,
    )
}

/// Bring WhatsApp to the front and select a chat by typing into search.
fn open_whatsapp_chat(desktop: &dyn Desktop, contact: &str) -> DesktopResult<(u32, u32)> {
    desktop.run_applescript("tell application \"WhatsApp\" to activate")?;
    desktop.sleep(Duration::from_secs(2));

    let size = desktop.screen_size()?;
    let (x, y) = at(SEARCH_BOX, size);
    desktop.click(x, y)?;
    desktop.sleep(Duration::from_millis(500));

    desktop.type_text(contact)?;
    desktop.sleep(Duration::from_secs(1));
    desktop.press_return()?;
    desktop.sleep(Duration::from_secs(1));
    Ok(size)
}

/// Send a WhatsApp message through the desktop app's UI.
pub fn send_whatsapp_message(desktop: &dyn Desktop, contact: &str, message: &str) -> ActionResult {
    let run = || -> DesktopResult<()> {
        open_whatsapp_chat(desktop, contact)?;
        desktop.type_text(message)?;
        desktop.sleep(Duration::from_millis(500));
        desktop.press_return()?;
        Ok(())
    };
    match run() {
        Ok(()) => ActionResult::ok(format!("📤 WhatsApp message sent to {contact}!")),
        Err(e) => ActionResult::failure(format!("❌ WhatsApp message failed: {e}")),
    }
}

fn start_call(desktop: &dyn Desktop, contact: &str, button: (f64, f64)) -> DesktopResult<()> {
    let size = open_whatsapp_chat(desktop, contact)?;

    // Walk the cursor in so the hover states register before the click.
    for waypoint in CALL_APPROACH {
        let (x, y) = at(waypoint, size);
        desktop.move_cursor(x, y)?;
        desktop.sleep(Duration::from_millis(300));
    }
    let (x, y) = at(button, size);
    desktop.click(x, y)?;
    Ok(())
}

/// Start a WhatsApp audio call with the named contact.
pub fn make_audio_call(desktop: &dyn Desktop, contact: &str) -> ActionResult {
    match start_call(desktop, contact, AUDIO_CALL_BUTTON) {
        Ok(()) => ActionResult::ok(format!("📞 Audio call started with {contact}!")),
        Err(e) => ActionResult::failure(format!("❌ Audio call failed: {e}")),
    }
}

/// Start a WhatsApp video call with the named contact.
pub fn make_video_call(desktop: &dyn Desktop, contact: &str) -> ActionResult {
    match start_call(desktop, contact, VIDEO_CALL_BUTTON) {
        Ok(()) => ActionResult::ok(format!("🎥 Video call started with {contact}!")),
        Err(e) => ActionResult::failure(format!("❌ Video call failed: {e}")),
    }
}

/// Open Maps centered on the current location (⌘L).
pub fn maps_find_me(desktop: &dyn Desktop) -> ActionResult {
    let run = || -> DesktopResult<()> {
        desktop.run_applescript("tell application \"Maps\" to activate")?;
        desktop.sleep(Duration::from_secs(2));
        desktop.run_applescript(
            "tell application \"System Events\" to keystroke \"l\" using command down",
        )?;
        Ok(())
    };
    match run() {
        Ok(()) => ActionResult::ok("📍 Showing your current location in Maps."),
        Err(e) => ActionResult::failure(format!("❌ Could not open Maps: {e}")),
    }
}

/// Mute system output.
pub fn mute_sound(desktop: &dyn Desktop) -> ActionResult {
    match desktop.run_applescript("set volume output muted true") {
        Ok(_) => ActionResult::ok("🔇 Sound muted."),
        Err(e) => ActionResult::failure(format!("❌ Could not mute sound: {e}")),
    }
}

/// Unmute system output.
pub fn unmute_sound(desktop: &dyn Desktop) -> ActionResult {
    match desktop.run_applescript("set volume output muted false") {
        Ok(_) => ActionResult::ok("🔊 Sound unmuted."),
        Err(e) => ActionResult::failure(format!("❌ Could not unmute sound: {e}")),
    }
}

/// Set system output volume to a percentage in `0..=100`.
///
/// Range enforcement happens at intent parsing; this trusts its input.
pub fn set_volume(desktop: &dyn Desktop, level: u8) -> ActionResult {
    match desktop.run_applescript(&format!("set volume output volume {level}")) {
        Ok(_) => ActionResult::ok(format!("🔊 Volume set to {level}%.")),
        Err(e) => ActionResult::failure(format!("❌ Could not set volume: {e}")),
    }
}

/// Capture the screen to a timestamped file and open it.
pub fn take_screenshot(desktop: &dyn Desktop, screenshots_dir: &Path) -> ActionResult {
    let filename = format!("screenshot-{}.png", Local::now().format("%Y-%m-%d-%H-%M-%S"));
    let path = screenshots_dir.join(filename);

    if let Err(e) = desktop.capture_screen(&path) {
        return ActionResult::failure(format!("❌ Screenshot failed: {e}"));
    }
    info!(path = %path.display(), "screenshot captured");

    // Best effort; the capture already succeeded.
    let _ = desktop.open_path(&path, None);
    ActionResult::ok(format!("📸 Screenshot saved and opened: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::exec::desktop::NoopDesktop;

    /// Records every primitive the sequence invokes.
    #[derive(Default)]
    struct RecordingDesktop {
        log: Mutex<Vec<String>>,
    }

    impl RecordingDesktop {
        fn entries(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
        fn push(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }
    }

    impl Desktop for RecordingDesktop {
        fn run_shell(&self, command: &str) -> DesktopResult<String> {
            self.push(format!("shell:{command}"));
            Ok(String::new())
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

    #[test]
    fn message_sequence_types_contact_then_message() {
        let desktop = RecordingDesktop::default();
        let result = send_whatsapp_message(&desktop, "Sneha", "hello there");
        assert!(result.success);
        assert!(result.message.contains("Sneha"));

        let log = desktop.entries();
        let contact_pos = log.iter().position(|e| e == "type:Sneha").unwrap();
        let message_pos = log.iter().position(|e| e == "type:hello there").unwrap();
        assert!(contact_pos < message_pos);
        assert_eq!(log.iter().filter(|e| *e == "return").count(), 2);
    }

    #[test]
    fn audio_and_video_calls_hit_different_buttons() {
        let desktop = RecordingDesktop::default();
        assert!(make_audio_call(&desktop, "Ankit").success);
        assert!(desktop.entries().contains(&"click:915,45".to_string()));

        let desktop = RecordingDesktop::default();
        assert!(make_video_call(&desktop, "Riya").success);
        assert!(desktop.entries().contains(&"click:945,45".to_string()));
    }

    #[test]
    fn call_approach_moves_through_waypoints() {
        let desktop = RecordingDesktop::default();
        make_audio_call(&desktop, "Ankit");
        let log = desktop.entries();
        assert!(log.contains(&"move:600,250".to_string()));
        assert!(log.contains(&"move:780,150".to_string()));
        assert!(log.contains(&"move:880,80".to_string()));
    }

    #[test]
    fn screenshot_reports_the_saved_path() {
        let desktop = RecordingDesktop::default();
        let result = take_screenshot(&desktop, Path::new("/tmp/shots"));
        assert!(result.success);
        assert!(result.message.starts_with("📸"));
        assert!(result.message.contains("/tmp/shots/screenshot-"));
    }

    #[test]
    fn volume_controls_emit_markers() {
        let d = NoopDesktop;
        assert_eq!(mute_sound(&d).message, "🔇 Sound muted.");
        assert_eq!(unmute_sound(&d).message, "🔊 Sound unmuted.");
        assert_eq!(set_volume(&d, 40).message, "🔊 Volume set to 40%.");
    }

    /// A desktop whose AppleScript calls always fail.
    struct BrokenDesktop;
    impl Desktop for BrokenDesktop {
        fn run_shell(&self, _: &str) -> DesktopResult<String> {
            Ok(String::new())
        }
        fn run_applescript(&self, _: &str) -> DesktopResult<String> {
            Err(DesktopError::ScreenSize {
                message: "no display".into(),
            })
        }
        fn open_path(&self, _: &Path, _: Option<&str>) -> DesktopResult<()> {
            Ok(())
        }
        fn open_url(&self, _: &str) -> DesktopResult<()> {
            Ok(())
        }
        fn capture_screen(&self, _: &Path) -> DesktopResult<()> {
            Ok(())
        }
        fn click(&self, _: u32, _: u32) -> DesktopResult<()> {
            Ok(())
        }
        fn move_cursor(&self, _: u32, _: u32) -> DesktopResult<()> {
            Ok(())
        }
        fn type_text(&self, _: &str) -> DesktopResult<()> {
            Ok(())
        }
        fn press_return(&self) -> DesktopResult<()> {
            Ok(())
        }
        fn screen_size(&self) -> DesktopResult<(u32, u32)> {
            Ok((1000, 1000))
        }
        fn sleep(&self, _: Duration) {}
    }

    #[test]
    fn automation_failures_surface_as_failure_results() {
        let result = mute_sound(&BrokenDesktop);
        assert!(!result.success);
        assert!(result.message.starts_with("❌"));
    }
}
