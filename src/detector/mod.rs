//! Text normalization and the pre-trained TF-IDF + linear classifier pair.
pub mod artifact;
pub mod error;
pub mod features;
pub mod linear;
pub mod model;
pub mod normalize;
pub mod tfidf;
pub mod verdict;

use chrono::Utc;

use crate::domain::Analysis;

pub use error::{AnalysisError, ClassifyError};
pub use features::{Classifier, Vectorizer};
pub use model::ModelContext;
pub use normalize::normalize;
pub use verdict::Verdict;

/// Vectorizes already-normalized text and maps the predicted label to a verdict.
pub fn classify(
    normalized: &str,
    vectorizer: &dyn Vectorizer,
    classifier: &dyn Classifier,
) -> Result<Verdict, ClassifyError> {
    let features = vectorizer.transform(normalized);
    let label = classifier.predict(&features)?;
    tracing::debug!(
        target: "detector",
        nnz = features.nnz(),
        label = %label,
        "classified article"
    );
    Verdict::try_from(label)
}

/// Runs one detection request from raw article text to a stamped verdict.
///
/// Blank input is rejected before any model call.
pub fn analyze(raw: &str, models: &ModelContext) -> Result<Analysis, AnalysisError> {
    if raw.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let normalized = normalize(raw);
    let verdict = models.classify(&normalized)?;
    Ok(Analysis {
        verdict,
        input_chars: raw.chars().count(),
        classified_at: Utc::now(),
    })
}
