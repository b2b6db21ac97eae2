use std::{fs, io::ErrorKind, path::Path};

use serde::de::DeserializeOwned;

use super::error::{ArtifactKind, ModelLoadError};

/// Reads and decodes one JSON artifact from disk.
pub fn read_artifact<T: DeserializeOwned>(
    kind: ArtifactKind,
    path: &Path,
) -> Result<T, ModelLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ModelLoadError::NotFound {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            ModelLoadError::Read {
                kind,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&raw).map_err(|source| ModelLoadError::Decode {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
