use std::{io, path::PathBuf};

use thiserror::Error;

use super::features::Label;

/// Which of the two pre-trained artifacts a load error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Vectorizer,
    Classifier,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => "vectorizer",
            ArtifactKind::Classifier => "classifier",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("{kind} artifact not found: {}", path.display())]
    NotFound { kind: ArtifactKind, path: PathBuf },
    #[error("failed to read {kind} artifact {}", path.display())]
    Read {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {kind} artifact {}", path.display())]
    Decode {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {kind} artifact: {reason}")]
    Invalid { kind: ArtifactKind, reason: String },
}

impl ModelLoadError {
    pub(crate) fn invalid(kind: ArtifactKind, reason: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("classifier emitted unknown label {0}")]
    UnknownLabel(Label),
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("no article text supplied")]
    EmptyInput,
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}
