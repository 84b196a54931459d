//! Archive integrity - tamper evidence for finalized runs
//!
//! When a run reaches DONE it is sealed: a SHA-256 digest over its canonical
//! YAML serialization, stored next to the run. Verification recomputes the
//! digest against the persisted run and compares; it has no side effects.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::identity::EntityId;
use crate::core::project::Project;
use crate::entities::run::{Run, RunStatus};

/// Digest algorithm recorded in every seal
pub const DIGEST_ALGORITHM: &str = "sha256";

/// Errors from sealing and verification
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Run {0} has not reached done; nothing to seal or verify")]
    NotFinalized(String),

    #[error("No archive seal found for run {0}")]
    SealNotFound(String),

    #[error("Malformed seal file: {0}")]
    Malformed(String),

    #[error("Failed to serialize run for sealing: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The tamper-evidence token for one archived run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSeal {
    pub run_id: EntityId,
    pub run_code: String,
    pub algorithm: String,
    pub digest: String,
    pub sealed_at: DateTime<Utc>,
}

/// Verification result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
}

/// Digest over the run's canonical YAML serialization
pub fn compute_digest(run: &Run) -> Result<String, ArchiveError> {
    let canonical =
        serde_yml::to_string(run).map_err(|e| ArchiveError::Serialize(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Seal a finalized run
pub fn seal(run: &Run) -> Result<ArchiveSeal, ArchiveError> {
    if run.status != RunStatus::Done {
        return Err(ArchiveError::NotFinalized(run.id.to_string()));
    }
    Ok(ArchiveSeal {
        run_id: run.id.clone(),
        run_code: run.run_code.clone(),
        algorithm: DIGEST_ALGORITHM.to_string(),
        digest: compute_digest(run)?,
        sealed_at: Utc::now(),
    })
}

/// Recompute the digest for a run and compare against its seal
pub fn verify_against(seal: &ArchiveSeal, run: &Run) -> Result<Verdict, ArchiveError> {
    if run.status != RunStatus::Done {
        return Err(ArchiveError::NotFinalized(run.id.to_string()));
    }
    let valid = seal.algorithm == DIGEST_ALGORITHM && seal.digest == compute_digest(run)?;
    Ok(Verdict { valid })
}

/// File-backed seal store under `.fit/archive/`
pub struct FileArchive {
    dir: PathBuf,
}

impl FileArchive {
    pub fn new(project: &Project) -> Self {
        Self {
            dir: project.archive_dir(),
        }
    }

    /// Path of the seal file for a run
    pub fn seal_path(&self, run_id: &EntityId) -> PathBuf {
        self.dir.join(format!("{}.seal.json", run_id))
    }

    /// Whether a seal exists for the run
    pub fn has_seal(&self, run_id: &EntityId) -> bool {
        self.seal_path(run_id).exists()
    }

    /// Write (or overwrite) the seal for a run
    pub fn store(&self, seal: &ArchiveSeal) -> Result<(), ArchiveError> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(seal)
            .map_err(|e| ArchiveError::Serialize(e.to_string()))?;
        std::fs::write(self.seal_path(&seal.run_id), content)?;
        Ok(())
    }

    /// Load the stored seal for a run
    pub fn load(&self, run_id: &EntityId) -> Result<ArchiveSeal, ArchiveError> {
        let path = self.seal_path(run_id);
        if !path.exists() {
            return Err(ArchiveError::SealNotFound(run_id.to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ArchiveError::Malformed(e.to_string()))
    }

    /// Seal a run and store the result
    pub fn seal_and_store(&self, run: &Run) -> Result<ArchiveSeal, ArchiveError> {
        let seal = seal(run)?;
        self.store(&seal)?;
        Ok(seal)
    }

    /// Verify a run against its stored seal
    pub fn verify(&self, run: &Run) -> Result<Verdict, ArchiveError> {
        let seal = self.load(&run.id)?;
        verify_against(&seal, run)
    }
}
