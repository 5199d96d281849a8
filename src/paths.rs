//! Filesystem layout for atlas artifacts.
//!
//! The agent writes three kinds of files: notes, screenshots, and generated
//! project files. All three live under the user's Desktop by default (this is
//! a desktop assistant; artifacts should land where the user can see them),
//! with `ATLAS_*` environment overrides for each directory.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(atlas::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(atlas::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Artifact directories for the agent.
#[derive(Debug, Clone)]
pub struct AtlasPaths {
    /// `~/Desktop/notes/` (override: `ATLAS_NOTES_DIR`)
    pub notes_dir: PathBuf,
    /// `~/Desktop/AI_Projects/` (override: `ATLAS_PROJECTS_DIR`)
    pub projects_dir: PathBuf,
    /// `~/Desktop/` (override: `ATLAS_SCREENSHOTS_DIR`)
    pub screenshots_dir: PathBuf,
}

impl AtlasPaths {
    /// Resolve artifact directories from the environment with Desktop fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let desktop = home.join("Desktop");

        let notes_dir = std::env::var("ATLAS_NOTES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| desktop.join("notes"));

        let projects_dir = std::env::var("ATLAS_PROJECTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| desktop.join("AI_Projects"));

        let screenshots_dir = std::env::var("ATLAS_SCREENSHOTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| desktop.clone());

        Ok(Self {
            notes_dir,
            projects_dir,
            screenshots_dir,
        })
    }

    /// Create all artifact directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.notes_dir, &self.projects_dir, &self.screenshots_dir] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }
}
