//! Output-path housekeeping.

use std::path::Path;

use crate::domain::StaleOutputPolicy;
use crate::error::AppError;

/// Apply `policy` to a previous animation at `path` after a run produced no frames.
///
/// Returns `true` if a file was removed.
pub fn clear_stale_output(path: &Path, policy: StaleOutputPolicy) -> Result<bool, AppError> {
    if policy == StaleOutputPolicy::Keep {
        return Ok(false);
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "removed stale animation");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AppError::io(format!(
            "Failed to remove stale output '{}': {e}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_policy_deletes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chronografy.gif");
        std::fs::write(&path, b"old").unwrap();
        assert!(clear_stale_output(&path, StaleOutputPolicy::Remove).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn remove_policy_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.gif");
        assert!(!clear_stale_output(&path, StaleOutputPolicy::Remove).unwrap());
    }

    #[test]
    fn keep_policy_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chronografy.gif");
        std::fs::write(&path, b"old").unwrap();
        assert!(!clear_stale_output(&path, StaleOutputPolicy::Keep).unwrap());
        assert!(path.exists());
    }
}
