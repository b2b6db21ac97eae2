use std::sync::Arc;

use crate::config::ModelConfig;

use super::{
    artifact::read_artifact,
    error::{ArtifactKind, ClassifyError, ModelLoadError},
    features::{Classifier, Vectorizer},
    linear::{LinearArtifact, LinearClassifier},
    tfidf::{TfidfArtifact, TfidfVectorizer},
    verdict::Verdict,
};

/// The loaded vectorizer/classifier pair.
///
/// Constructing one is the only way into the loaded state, and nothing can
/// mutate it afterwards; clones share the same models.
#[derive(Clone)]
pub struct ModelContext {
    vectorizer: Arc<dyn Vectorizer>,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("dimension", &self.vectorizer.dimension())
            .field("classes", &self.classifier.classes())
            .finish()
    }
}

impl ModelContext {
    /// Pairs a vectorizer with a classifier after checking they agree on the
    /// feature space and that every class maps onto a verdict.
    pub fn new(
        vectorizer: Arc<dyn Vectorizer>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ModelLoadError> {
        if vectorizer.dimension() != classifier.dimension() {
            return Err(ModelLoadError::invalid(
                ArtifactKind::Classifier,
                format!(
                    "classifier expects {} features but vectorizer produces {}",
                    classifier.dimension(),
                    vectorizer.dimension()
                ),
            ));
        }
        for &label in classifier.classes() {
            Verdict::try_from(label).map_err(|_| {
                ModelLoadError::invalid(
                    ArtifactKind::Classifier,
                    format!("class {label} has no verdict mapping"),
                )
            })?;
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Loads both artifacts from disk.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelLoadError> {
        let vectorizer_artifact: TfidfArtifact =
            read_artifact(ArtifactKind::Vectorizer, &config.vectorizer_path)?;
        let vectorizer = TfidfVectorizer::from_artifact(vectorizer_artifact)?;

        let classifier_artifact: LinearArtifact =
            read_artifact(ArtifactKind::Classifier, &config.classifier_path)?;
        let classifier = LinearClassifier::from_artifact(classifier_artifact)?;

        let context = Self::new(Arc::new(vectorizer), Arc::new(classifier))?;
        tracing::info!(
            target: "model",
            vectorizer = %config.vectorizer_path.display(),
            classifier = %config.classifier_path.display(),
            dimension = context.dimension(),
            "model artifacts loaded"
        );
        Ok(context)
    }

    pub fn dimension(&self) -> usize {
        self.vectorizer.dimension()
    }

    pub fn vectorizer(&self) -> &dyn Vectorizer {
        self.vectorizer.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn classify(&self, normalized: &str) -> Result<Verdict, ClassifyError> {
        super::classify(normalized, self.vectorizer(), self.classifier())
    }
}
