//! The desktop capability seam: subprocess-backed OS automation.
//!
//! [`Desktop`] is the single interface through which handlers touch the host:
//! shell commands, AppleScript, file/URL opens, screen capture, and cursor
//! control. [`MacDesktop`] shells out to the standard macOS tools
//! (`osascript`, `open`, `screencapture`, `cliclick`); [`NoopDesktop`]
//! records nothing and succeeds at everything, for tests.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from desktop automation.
#[derive(Debug, Error, Diagnostic)]
pub enum DesktopError {
    #[error("failed to launch {program}: {source}")]
    #[diagnostic(
        code(atlas::desktop::launch),
        help("Check that the tool is installed and on PATH.")
    )]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}: {stderr}")]
    #[diagnostic(
        code(atlas::desktop::exit_status),
        help("The automation tool reported a failure; see its stderr output.")
    )]
    ExitStatus {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("could not determine screen size: {message}")]
    #[diagnostic(
        code(atlas::desktop::screen_size),
        help("Screen-relative cursor paths need the display bounds from the window system.")
    )]
    ScreenSize { message: String },
}

pub type DesktopResult<T> = std::result::Result<T, DesktopError>;

/// OS automation primitives, one seam for every subprocess side effect.
///
/// Implementations must be `Send + Sync`: the HTTP server shares one agent
/// across blocking worker threads.
pub trait Desktop: Send + Sync {
    /// Execute a shell command (`bash -c`), returning combined stdout.
    fn run_shell(&self, command: &str) -> DesktopResult<String>;

    /// Execute an AppleScript snippet via `osascript -e`.
    fn run_applescript(&self, script: &str) -> DesktopResult<String>;

    /// Open a file, optionally in a named application.
    fn open_path(&self, path: &Path, app: Option<&str>) -> DesktopResult<()>;

    /// Open a URL in the default browser.
    fn open_url(&self, url: &str) -> DesktopResult<()>;

    /// Capture the screen silently to the given path.
    fn capture_screen(&self, path: &Path) -> DesktopResult<()>;

    /// Click at absolute screen coordinates.
    fn click(&self, x: u32, y: u32) -> DesktopResult<()>;

    /// Move the cursor to absolute screen coordinates.
    fn move_cursor(&self, x: u32, y: u32) -> DesktopResult<()>;

    /// Type literal text into the focused window.
    fn type_text(&self, text: &str) -> DesktopResult<()>;

    /// Press the Return key.
    fn press_return(&self) -> DesktopResult<()>;

    /// The main display's size in points.
    fn screen_size(&self) -> DesktopResult<(u32, u32)>;

    /// Pause between automation steps (GUI animations need real time).
    fn sleep(&self, duration: Duration);
}

/// Production implementation shelling out to macOS tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacDesktop;

impl MacDesktop {
    fn run(&self, program: &str, args: &[&str]) -> DesktopResult<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| DesktopError::Launch {
                program: program.to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(DesktopError::ExitStatus {
                program: program.to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Escape text for embedding in an AppleScript double-quoted string.
fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Desktop for MacDesktop {
    fn run_shell(&self, command: &str) -> DesktopResult<String> {
        self.run("bash", &["-c", command])
    }

    fn run_applescript(&self, script: &str) -> DesktopResult<String> {
        self.run("osascript", &["-e", script])
    }

    fn open_path(&self, path: &Path, app: Option<&str>) -> DesktopResult<()> {
        let path_str = path.display().to_string();
        match app {
            Some(app) => self.run("open", &["-a", app, &path_str])?,
            None => self.run("open", &[path_str.as_str()])?,
        };
        Ok(())
    }

    fn open_url(&self, url: &str) -> DesktopResult<()> {
        self.run("open", &[url])?;
        Ok(())
    }

    fn capture_screen(&self, path: &Path) -> DesktopResult<()> {
        let path_str = path.display().to_string();
        self.run("screencapture", &["-x", &path_str])?;
        Ok(())
    }

    fn click(&self, x: u32, y: u32) -> DesktopResult<()> {
        self.run("cliclick", &[&format!("c:{x},{y}")])?;
        Ok(())
    }

    fn move_cursor(&self, x: u32, y: u32) -> DesktopResult<()> {
        self.run("cliclick", &[&format!("m:{x},{y}")])?;
        Ok(())
    }

    fn type_text(&self, text: &str) -> DesktopResult<()> {
        let script = format!(
            "tell application \"System Events\" to keystroke \"{}\"",
            applescript_escape(text)
        );
        self.run_applescript(&script)?;
        Ok(())
    }

    fn press_return(&self) -> DesktopResult<()> {
        self.run_applescript("tell application \"System Events\" to key code 36")?;
        Ok(())
    }

    fn screen_size(&self) -> DesktopResult<(u32, u32)> {
        // Finder reports desktop bounds as "0, 0, <width>, <height>".
        let out = self
            .run_applescript("tell application \"Finder\" to get bounds of window of desktop")?;
        let parts: Vec<u32> = out
            .trim()
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect();
        match parts.as_slice() {
            [_, _, w, h] => Ok((*w, *h)),
            _ => Err(DesktopError::ScreenSize {
                message: format!("unexpected bounds output: {}", out.trim()),
            }),
        }
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Inert implementation: every operation succeeds and does nothing.
///
/// Used in unit tests where the side effect itself is irrelevant; tests that
/// assert *which* effects ran use their own recording fakes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDesktop;

impl Desktop for NoopDesktop {
    fn run_shell(&self, _command: &str) -> DesktopResult<String> {
        Ok(String::new())
    }
    fn run_applescript(&self, _script: &str) -> DesktopResult<String> {
        Ok(String::new())
    }
    fn open_path(&self, _path: &Path, _app: Option<&str>) -> DesktopResult<()> {
        Ok(())
    }
    fn open_url(&self, _url: &str) -> DesktopResult<()> {
        Ok(())
    }
    fn capture_screen(&self, _path: &Path) -> DesktopResult<()> {
        Ok(())
    }
    fn click(&self, _x: u32, _y: u32) -> DesktopResult<()> {
        Ok(())
    }
    fn move_cursor(&self, _x: u32, _y: u32) -> DesktopResult<()> {
        Ok(())
    }
    fn type_text(&self, _text: &str) -> DesktopResult<()> {
        Ok(())
    }
    fn press_return(&self) -> DesktopResult<()> {
        Ok(())
    }
    fn screen_size(&self) -> DesktopResult<(u32, u32)> {
        Ok((1440, 900))
    }
    fn sleep(&self, _duration: Duration) {}
}
