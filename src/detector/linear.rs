use serde::Deserialize;

use super::{
    error::{ArtifactKind, ClassifyError, ModelLoadError},
    features::{Classifier, FeatureVector, Label},
};

/// Weights of a fitted binary linear model (Passive-Aggressive, SGD, ...).
#[derive(Debug, Deserialize)]
pub struct LinearArtifact {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    pub classes: Vec<Label>,
}

#[derive(Debug)]
pub struct LinearClassifier {
    coef: Vec<f64>,
    intercept: f64,
    classes: [Label; 2],
}

impl LinearClassifier {
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, ModelLoadError> {
        let kind = ArtifactKind::Classifier;
        let classes: [Label; 2] = match artifact.classes.as_slice() {
            [negative, positive] if negative != positive => [*negative, *positive],
            other => {
                return Err(ModelLoadError::invalid(
                    kind,
                    format!("expected two distinct classes, got {other:?}"),
                ))
            }
        };
        if artifact.coef.is_empty() {
            return Err(ModelLoadError::invalid(kind, "coefficients are empty"));
        }
        if artifact.coef.iter().any(|w| !w.is_finite()) || !artifact.intercept.is_finite() {
            return Err(ModelLoadError::invalid(kind, "weights must be finite"));
        }

        Ok(Self {
            coef: artifact.coef,
            intercept: artifact.intercept,
            classes,
        })
    }

    /// Signed distance to the separating hyperplane.
    pub fn decision_function(&self, features: &FeatureVector) -> Result<f64, ClassifyError> {
        if features.dimension() != self.coef.len() {
            return Err(ClassifyError::DimensionMismatch {
                expected: self.coef.len(),
                actual: features.dimension(),
            });
        }
        Ok(features.dot(&self.coef) + self.intercept)
    }
}

impl Classifier for LinearClassifier {
    fn dimension(&self) -> usize {
        self.coef.len()
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<Label, ClassifyError> {
        let score = self.decision_function(features)?;
        Ok(if score > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn classifier(value: serde_json::Value) -> Result<LinearClassifier, ModelLoadError> {
        let artifact: LinearArtifact = serde_json::from_value(value).unwrap();
        LinearClassifier::from_artifact(artifact)
    }

    #[test]
    fn positive_score_selects_second_class() {
        let model = classifier(json!({"coef": [1.0, -1.0], "intercept": 0.0, "classes": [0, 1]}))
            .unwrap();
        let up = FeatureVector::from_entries(2, [(0, 0.8)]);
        let down = FeatureVector::from_entries(2, [(1, 0.8)]);
        assert_eq!(model.predict(&up), Ok(Label(1)));
        assert_eq!(model.predict(&down), Ok(Label(0)));
    }

    #[test]
    fn zero_score_selects_first_class() {
        let model = classifier(json!({"coef": [1.0], "classes": [0, 1]})).unwrap();
        assert_eq!(model.decision_function(&FeatureVector::zeros(1)), Ok(0.0));
        assert_eq!(model.predict(&FeatureVector::zeros(1)), Ok(Label(0)));
    }

    #[test]
    fn intercept_shifts_the_boundary() {
        let model =
            classifier(json!({"coef": [1.0], "intercept": 0.25, "classes": [0, 1]})).unwrap();
        assert_eq!(model.predict(&FeatureVector::zeros(1)), Ok(Label(1)));
    }

    #[test]
    fn rejects_wrong_dimension() {
        let model = classifier(json!({"coef": [1.0, 2.0], "classes": [0, 1]})).unwrap();
        assert_eq!(
            model.predict(&FeatureVector::zeros(3)),
            Err(ClassifyError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn rejects_bad_class_sets_and_weights() {
        for case in [
            json!({"coef": [1.0], "classes": [1]}),
            json!({"coef": [1.0], "classes": [1, 1]}),
            json!({"coef": [1.0], "classes": [0, 1, 2]}),
            json!({"coef": [], "classes": [0, 1]}),
        ] {
            assert!(classifier(case.clone()).is_err(), "{case} was accepted");
        }
        // NaN cannot be written in JSON, so build the artifact directly.
        let artifact = LinearArtifact {
            coef: vec![f64::NAN],
            intercept: 0.0,
            classes: vec![Label(0), Label(1)],
        };
        assert!(LinearClassifier::from_artifact(artifact).is_err());
    }
}
