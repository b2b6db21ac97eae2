use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::{AppConfig, ModelConfig};

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    pub models: ModelConfig,
}

/// Creates the log directory and resolves artifact paths to absolute form.
///
/// Artifacts are only resolved here; their presence is checked when the models
/// load so a missing file surfaces as a model load error.
pub fn ensure_directories(config: &AppConfig) -> Result<ResolvedPaths> {
    let logs_dir = ensure_dir(&config.directories.logs_dir)?;

    let probe_file = logs_dir.join(".write-test");
    fs::write(&probe_file, b"ok")
        .with_context(|| format!("log directory {} is not writable", logs_dir.display()))?;
    fs::remove_file(&probe_file)?;

    Ok(ResolvedPaths {
        logs_dir,
        models: ModelConfig {
            vectorizer_path: resolve(&config.models.vectorizer_path),
            classifier_path: resolve(&config.models.classifier_path),
        },
    })
}

fn ensure_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("failed to create directory {}", path))?;
    }
    Ok(dir.canonicalize().unwrap_or(dir))
}

fn resolve(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_log_dir() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("nested/logs");
        let created = ensure_dir(logs.to_str().unwrap()).unwrap();
        assert!(created.is_dir());
    }

    #[test]
    fn unresolvable_artifact_paths_are_kept_verbatim() {
        let path = PathBuf::from("does/not/exist.json");
        assert_eq!(resolve(&path), path);
    }
}
