//! Note commands: deterministic matching and flat-file storage.
//!
//! Note utterances short-circuit the whole resolution pipeline — they never
//! reach the fast path or the classifier. Each note is a single timestamped
//! line in its own freshly created file; the timestamp suffix in the filename
//! doubles as a chronological sort key, so listing is just a sorted glob.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::exec::desktop::Desktop;
use crate::exec::ActionResult;

/// A recognized note command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteCommand {
    /// `note buy milk` / `save note buy milk` — timestamped filename.
    SaveToday { body: String },
    /// `save note groceries: milk, eggs` — slug-named file.
    SaveNamed { name: String, body: String },
    /// `list notes`
    List,
    /// `open note groceries`
    Open { name: String },
    /// `read note groceries`
    Read { name: String },
}

struct NotePatterns {
    save_today: Regex,
    save_named: Regex,
    save_generic: Regex,
    open: Regex,
    read: Regex,
}

fn patterns() -> &'static NotePatterns {
    static PATTERNS: OnceLock<NotePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| NotePatterns {
        save_today: Regex::new(r"(?i)^(?:note|take note)(?:\s*[:\-]?\s*)(.+)$").unwrap(),
        save_named: Regex::new(r"(?i)^(?:save\s+note)\s*:?\s*([^:]+)\s*:\s*(.+)$").unwrap(),
        save_generic: Regex::new(
            r"(?i)^(?:save(?:\s+a)?\s+note)(?:\s+(?:with\s+text)?)?\s*[:\-]?\s*(.+)$",
        )
        .unwrap(),
        open: Regex::new(r"(?i)^(?:open\s+note)\s+(.+)$").unwrap(),
        read: Regex::new(r"(?i)^(?:read\s+note)\s+(.+)$").unwrap(),
    })
}

/// Resolve a note command from an utterance, or `None` to let the pipeline
/// continue to task resolution.
///
/// Location-flavored text takes precedence: utterances mentioning maps or
/// the user's location never match, even when they share note vocabulary.
/// First match wins; earlier patterns are strictly more specific. The exact
/// list phrases are checked before the save patterns so that bare `notes`
/// lists instead of saving a note with body "s".
pub fn resolve_note_intent(text: &str) -> Option<NoteCommand> {
    let s = text.trim();
    let lower = s.to_lowercase();

    if lower.contains("where am i") || lower.contains("my location") || lower.contains("map") {
        return None;
    }

    if matches!(lower.as_str(), "list notes" | "list note" | "notes" | "show notes") {
        return Some(NoteCommand::List);
    }

    let p = patterns();
    if let Some(caps) = p.save_today.captures(s) {
        return Some(NoteCommand::SaveToday {
            body: caps[1].trim().to_string(),
        });
    }
    if let Some(caps) = p.save_named.captures(s) {
        return Some(NoteCommand::SaveNamed {
            name: caps[1].trim().to_string(),
            body: caps[2].trim().to_string(),
        });
    }
    if let Some(caps) = p.save_generic.captures(s) {
        return Some(NoteCommand::SaveToday {
            body: caps[1].trim().to_string(),
        });
    }
    if let Some(caps) = p.open.captures(s) {
        return Some(NoteCommand::Open {
            name: caps[1].trim().to_string(),
        });
    }
    if let Some(caps) = p.read.captures(s) {
        return Some(NoteCommand::Read {
            name: caps[1].trim().to_string(),
        });
    }

    None
}

/// Flat-file note storage under a fixed, auto-created directory.
#[derive(Debug, Clone)]
pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Execute a resolved note command.
    pub fn execute(&self, command: &NoteCommand, desktop: &dyn Desktop) -> ActionResult {
        match command {
            NoteCommand::SaveToday { body } => self.save_today(body, desktop),
            NoteCommand::SaveNamed { name, body } => self.save_named(name, body, desktop),
            NoteCommand::List => self.list(),
            NoteCommand::Open { name } => self.open(name, desktop),
            NoteCommand::Read { name } => self.read(name),
        }
    }

    /// Save a note into a freshly timestamped `note-<ts>.txt`.
    pub fn save_today(&self, body: &str, desktop: &dyn Desktop) -> ActionResult {
        if body.is_empty() {
            return ActionResult::failure("❌ No content provided for the note.");
        }
        let filename = format!("note-{}.txt", file_timestamp());
        self.write_note(&filename, body, desktop)
    }

    /// Save a note into `<slug>.txt`, where slug is the trimmed name with
    /// spaces replaced by underscores. The stable filename is what `open` and
    /// `read` look up later; an existing note of the same name is replaced.
    pub fn save_named(&self, name: &str, body: &str, desktop: &dyn Desktop) -> ActionResult {
        if name.trim().is_empty() {
            return ActionResult::failure("❌ No filename provided.");
        }
        if body.is_empty() {
            return ActionResult::failure("❌ No content provided for the note.");
        }
        let slug = name.trim().replace(' ', "_");
        self.write_note(&format!("{slug}.txt"), body, desktop)
    }

    fn write_note(&self, filename: &str, body: &str, desktop: &dyn Desktop) -> ActionResult {
        let path = self.dir.join(filename);
        let line = format!("[{}] {body}\n", line_timestamp());

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            return ActionResult::failure(format!("❌ Failed to create notes dir: {e}"));
        }
        if let Err(e) = std::fs::write(&path, &line) {
            return ActionResult::failure(format!("❌ Failed to write note: {e}"));
        }

        // Best effort; a missing editor must not fail the save.
        let _ = desktop.open_path(&path, Some("TextEdit"));

        ActionResult::ok(format!(
            "📝 New note created: {}\n➡️ Content:\n{}",
            path.display(),
            line.trim_end()
        ))
    }

    /// List all notes with their byte sizes, in chronological order.
    pub fn list(&self) -> ActionResult {
        let mut files: Vec<(String, u64)> = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.path().extension().and_then(|x| x.to_str()) == Some("txt")
                })
                .filter_map(|e| {
                    let name = e.file_name().into_string().ok()?;
                    let size = e.metadata().ok()?.len();
                    Some((name, size))
                })
                .collect(),
            Err(_) => Vec::new(),
        };

        if files.is_empty() {
            return ActionResult::ok("📂 No notes found.");
        }

        files.sort();
        let mut lines = vec!["📂 Notes:".to_string()];
        for (name, size) in &files {
            lines.push(format!("- {name} ({size} bytes)"));
        }
        ActionResult::ok(lines.join("\n"))
    }

    /// Open a note in the text editor. The `.txt` extension is optional.
    pub fn open(&self, name: &str, desktop: &dyn Desktop) -> ActionResult {
        let path = self.note_path(name);
        if !path.exists() {
            return ActionResult::failure(format!("❌ Note not found: {}", path.display()));
        }
        if let Err(e) = desktop.open_path(&path, Some("TextEdit")) {
            return ActionResult::failure(format!("❌ Failed to open note: {e}"));
        }
        ActionResult::ok(format!("📂 Opened note: {}", path.display()))
    }

    /// Read a note's contents back. The `.txt` extension is optional.
    pub fn read(&self, name: &str) -> ActionResult {
        let path = self.note_path(name);
        if !path.exists() {
            return ActionResult::failure(format!("❌ Note not found: {}", path.display()));
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ActionResult::ok(format!("📄 Contents of {name}:\n\n{content}"))
            }
            Err(e) => ActionResult::failure(format!("❌ Failed to read note: {e}")),
        }
    }

    /// Lookups slug spaces the same way saves do.
    fn note_path(&self, name: &str) -> PathBuf {
        let mut name = name.trim().replace(' ', "_");
        if !name.ends_with(".txt") {
            name.push_str(".txt");
        }
        self.dir.join(name)
    }
}

/// Timestamp used in filenames: `2026-08-30-14-05-09`.
fn file_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d-%H-%M-%S").to_string()
}

/// Timestamp used inside the note line: `2026-08-30 14:05:09`.
fn line_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
