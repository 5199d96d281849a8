//! Model-backed handlers: project generation and problem solving.
//!
//! Codegen asks the model for runnable code, sniffs a file extension from the
//! request wording, writes the result into the projects directory, and opens
//! it in the editor. Solve is a plain question-answer round trip.

use std::path::Path;

use chrono::Local;
use tracing::info;

use super::desktop::Desktop;
use super::ActionResult;
use crate::llm::LanguageModel;

const CODEGEN_SYSTEM: &str = "You are an expert software developer. \
    Output only clean, complete, runnable code for the user's request. \
    No explanations, no markdown fences.";

const SOLVE_SYSTEM: &str = "You are an expert in mathematics, aptitude, and logical reasoning. \
    Solve the user's problem step by step and state the final answer clearly.";

const EDITOR_APP: &str = "Visual Studio Code";

/// Pick a file extension from keywords in the request.
fn sniff_extension(prompt: &str) -> &'static str {
    let lower = prompt.to_lowercase();
    if lower.contains("html") || lower.contains("website") {
        "html"
    } else if lower.contains("python") || lower.contains(" py") {
        "py"
    } else if lower.contains("javascript") || lower.contains(" js") {
        "js"
    } else if lower.contains("c++") || lower.contains("cpp") {
        "cpp"
    } else {
        "txt"
    }
}

/// Generate code for the request, save it, and open it in the editor.
pub fn create_project(
    model: &dyn LanguageModel,
    desktop: &dyn Desktop,
    projects_dir: &Path,
    prompt: &str,
) -> ActionResult {
    let code = match model.complete(CODEGEN_SYSTEM, prompt) {
        Ok(code) => code,
        Err(e) => return ActionResult::failure(format!("❌ Code generation failed: {e}")),
    };

    let ext = sniff_extension(prompt);
    let filename = format!("project-{}.{ext}", Local::now().format("%Y-%m-%d-%H-%M-%S"));
    let path = projects_dir.join(filename);

    if let Err(e) = std::fs::write(&path, &code) {
        return ActionResult::failure(format!("❌ Could not save project file: {e}"));
    }
    info!(path = %path.display(), "project file written");

    // Editor launch is best effort; the file is already on disk.
    let _ = desktop.open_path(&path, Some(EDITOR_APP));

    let preview: String = code.chars().take(300).collect();
    ActionResult::ok(format!(
        "🧠 Project created at {}\n\n{preview}",
        path.display()
    ))
}

/// Answer a reasoning or math question with the model.
pub fn solve(model: &dyn LanguageModel, query: &str) -> ActionResult {
    match model.complete(SOLVE_SYSTEM, query) {
        Ok(answer) => ActionResult::ok(format!("🧠 Solution:\n{}", answer.trim())),
        Err(e) => ActionResult::failure(format!("❌ Error solving: {e}")),
    }
}
