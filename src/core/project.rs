//! Project discovery and on-disk layout
//!
//! A FIT project is any directory containing a `.fit/` marker. Entities live
//! as `<ID>.fit.yaml` files under per-type directories; the archive of
//! sealed runs lives inside the marker directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Marker directory identifying a project root
pub const MARKER_DIR: &str = ".fit";

/// File suffix for all persisted entities
pub const ENTITY_SUFFIX: &str = ".fit.yaml";

/// Errors from project discovery and layout
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not inside a FIT project (no {MARKER_DIR}/ directory found). Run 'fit init' first")]
    NotAProject,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A discovered project root
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Discover the project by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Discover the project by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            if d.join(MARKER_DIR).is_dir() {
                return Ok(Self {
                    root: d.to_path_buf(),
                });
            }
            dir = d.parent();
        }
        Err(ProjectError::NotAProject)
    }

    /// Open a directory as a project root without walking up
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the project config file
    pub fn config_path(&self) -> PathBuf {
        self.root.join(MARKER_DIR).join("config.yaml")
    }

    /// Path to the team roster file
    pub fn team_path(&self) -> PathBuf {
        self.root.join(MARKER_DIR).join("team.yaml")
    }

    /// Directory holding archive seals for finalized runs
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR).join("archive")
    }

    /// Directory holding entities of the given type
    pub fn entity_dir(&self, prefix: EntityPrefix) -> PathBuf {
        match prefix {
            EntityPrefix::Tpl => self.root.join("templates"),
            EntityPrefix::Run => self.root.join("runs"),
        }
    }

    /// Canonical file path for an entity
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.entity_dir(id.prefix())
            .join(format!("{}{}", id, ENTITY_SUFFIX))
    }

    /// Iterate entity files of the given type, sorted by file name
    /// (ULIDs sort chronologically, so this is creation order)
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> Vec<PathBuf> {
        let dir = self.entity_dir(prefix);
        if !dir.exists() {
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(ENTITY_SUFFIX))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }
}
