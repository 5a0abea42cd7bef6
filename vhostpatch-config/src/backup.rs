//! Pre-mutation backup copies
//!
//! 💾 The copy is a manual recovery artifact; nothing reads it back.

use crate::error::{PatchError, PatchResult};
use std::path::{Path, PathBuf};
use vhostpatch_core::config::BackupSettings;

/// Copy `source` into the staging directory under `<prefix>-<tag>-<basename>.bak`.
///
/// An existing backup with the same name is overwritten.
pub fn backup_file(settings: &BackupSettings, tag: &str, source: &Path) -> PatchResult<PathBuf> {
    let backup_path = settings.path_for(tag, source);

    std::fs::copy(source, &backup_path).map_err(|e| PatchError::Backup {
        source_path: source.to_path_buf(),
        backup_path: backup_path.clone(),
        source: e,
    })?;

    tracing::info!("💾 Backed up {:?} to {:?}", source, backup_path);
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_copies_content() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("daterabbit");
        std::fs::write(&source, "server {}\n").unwrap();

        let settings = BackupSettings {
            dir: dir.path().join("staging"),
            prefix: "nginx".to_string(),
        };
        std::fs::create_dir(&settings.dir).unwrap();

        let path = backup_file(&settings, "dedup", &source).unwrap();
        assert_eq!(path, settings.dir.join("nginx-dedup-daterabbit.bak"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "server {}\n");
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let settings = BackupSettings {
            dir: dir.path().to_path_buf(),
            prefix: "nginx".to_string(),
        };
        let err = backup_file(&settings, "dedup", &dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, PatchError::Backup { .. }));
    }
}
