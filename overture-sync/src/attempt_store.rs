//! Attempt store — per-repository provisioning state for resumable retries.
//!
//! Persists an [`AttemptState`] JSON document at
//! `<home>/.overture/attempts/<owner>__<repo>.json`.
//! Writes use an atomic `.tmp` + rename pattern. Only step records and the
//! observed commit sha are stored — never secret material.

use std::path::{Path, PathBuf};

use overture_core::{AttemptState, RepoSlug, StepId};

use crate::error::{io_err, SyncError};

/// Path to the attempt store JSON for `repo`, rooted at `home`.
///
/// `~/.overture/attempts/<owner>__<repo>.json`
pub fn store_path_at(home: &Path, repo: &RepoSlug) -> PathBuf {
    home.join(".overture")
        .join("attempts")
        .join(format!("{}.json", repo.store_key()))
}

/// Load the attempt state for `repo`.
///
/// Returns a fresh state if the file does not yet exist, or if a stored
/// document no longer covers every step (an older or hand-edited file).
pub fn load_at(home: &Path, repo: &RepoSlug) -> Result<AttemptState, SyncError> {
    let path = store_path_at(home, repo);
    if !path.exists() {
        return Ok(AttemptState::new());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let state: AttemptState = serde_json::from_str(&contents)?;

    let covers_every_step = StepId::all()
        .iter()
        .all(|step| state.steps.iter().any(|r| r.step == *step));
    if !covers_every_step {
        tracing::warn!(path = %path.display(), "attempt store missing steps, starting fresh");
        return Ok(AttemptState::new());
    }
    Ok(state)
}

/// Save the attempt state for `repo` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_at(home: &Path, repo: &RepoSlug, state: &AttemptState) -> Result<(), SyncError> {
    let path = store_path_at(home, repo);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid attempt store path"),
        ));
    };

    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}
