use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::Deserialize;

use super::{
    error::{ArtifactKind, ModelLoadError},
    features::{FeatureVector, Vectorizer},
};

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    #[default]
    L2,
    None,
}

/// Fitted vectorizer state as exported from training.
#[derive(Debug, Deserialize)]
pub struct TfidfArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default)]
    pub token_pattern: Option<String>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default, deserialize_with = "deserialize_norm")]
    pub norm: Norm,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

// `"norm": null` means no normalization.
fn deserialize_norm<'de, D>(deserializer: D) -> Result<Norm, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Norm>::deserialize(deserializer)?.unwrap_or(Norm::None))
}

#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    binary: bool,
    sublinear_tf: bool,
    norm: Norm,
}

impl TfidfVectorizer {
    pub fn from_artifact(artifact: TfidfArtifact) -> Result<Self, ModelLoadError> {
        let kind = ArtifactKind::Vectorizer;
        let dimension = artifact.idf.len();
        if dimension == 0 {
            return Err(ModelLoadError::invalid(kind, "idf weights are empty"));
        }
        if artifact.vocabulary.len() != dimension {
            return Err(ModelLoadError::invalid(
                kind,
                format!(
                    "vocabulary has {} terms but idf has {} weights",
                    artifact.vocabulary.len(),
                    dimension
                ),
            ));
        }
        let mut seen = vec![false; dimension];
        for (term, &idx) in &artifact.vocabulary {
            if idx >= dimension {
                return Err(ModelLoadError::invalid(
                    kind,
                    format!("term {term:?} has out-of-range index {idx}"),
                ));
            }
            if std::mem::replace(&mut seen[idx], true) {
                return Err(ModelLoadError::invalid(
                    kind,
                    format!("index {idx} is assigned to more than one term"),
                ));
            }
        }
        if let Some(pos) = artifact.idf.iter().position(|w| !w.is_finite()) {
            return Err(ModelLoadError::invalid(
                kind,
                format!("idf weight at {pos} is not finite"),
            ));
        }
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelLoadError::invalid(
                kind,
                format!("invalid ngram_range ({min_n}, {max_n})"),
            ));
        }
        let pattern = artifact
            .token_pattern
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_PATTERN);
        let token_pattern = Regex::new(pattern).map_err(|err| {
            ModelLoadError::invalid(kind, format!("token_pattern does not compile: {err}"))
        })?;
        if token_pattern.captures_len() > 2 {
            return Err(ModelLoadError::invalid(
                kind,
                "token_pattern may contain at most one capture group",
            ));
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            token_pattern,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.unwrap_or_default().into_iter().collect(),
            binary: artifact.binary,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let tokens: Vec<&str> = if self.token_pattern.captures_len() == 2 {
            self.token_pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .collect()
        } else {
            self.token_pattern
                .find_iter(text)
                .map(|m| m.as_str())
                .collect()
        };
        tokens
            .into_iter()
            .filter(|t| !self.stop_words.contains(*t))
            .collect()
    }

    fn term_counts(&self, tokens: &[&str]) -> HashMap<usize, f64> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            if n == 1 {
                for token in tokens {
                    if let Some(&idx) = self.vocabulary.get(*token) {
                        *counts.entry(idx).or_insert(0.0) += 1.0;
                    }
                }
                continue;
            }
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&idx) = self.vocabulary.get(&gram) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }
        counts
    }
}

impl Vectorizer for TfidfVectorizer {
    fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn transform(&self, text: &str) -> FeatureVector {
        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };
        let tokens = self.tokenize(text);
        let counts = self.term_counts(&tokens);

        let mut weighted: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.binary {
                    1.0
                } else if self.sublinear_tf {
                    1.0 + tf.ln()
                } else {
                    tf
                };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let scale = match self.norm {
            Norm::L2 => weighted.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Norm::L1 => weighted.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        if scale > 0.0 && scale != 1.0 {
            for (_, value) in &mut weighted {
                *value /= scale;
            }
        }

        FeatureVector::from_entries(self.dimension(), weighted)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn vectorizer(value: serde_json::Value) -> TfidfVectorizer {
        let artifact: TfidfArtifact = serde_json::from_value(value).unwrap();
        TfidfVectorizer::from_artifact(artifact).unwrap()
    }

    fn basic() -> TfidfVectorizer {
        vectorizer(json!({
            "vocabulary": {"election": 0, "fraud": 1, "senate": 2, "vote": 3},
            "idf": [1.0, 2.0, 1.5, 1.0]
        }))
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn defaults_follow_l2_unigram_settings() {
        let v = basic();
        assert_eq!(v.dimension(), 4);
        assert!(v.lowercase);
        assert_eq!(v.ngram_range, (1, 1));
        assert_eq!(v.norm, Norm::L2);
    }

    #[test]
    fn out_of_vocabulary_terms_are_ignored() {
        let v = basic();
        let features = v.transform("the unknown words only");
        assert_eq!(features.dimension(), 4);
        assert_eq!(features.nnz(), 0);
    }

    #[test]
    fn weights_are_tf_times_idf_then_l2_normalized() {
        let v = basic();
        // election x2 (idf 1.0) and fraud x1 (idf 2.0) → raw (2.0, 2.0)
        let features = v.transform("election fraud election lies");
        let expected = 2.0 / (8.0f64).sqrt();
        assert_close(features.get(0), expected);
        assert_close(features.get(1), expected);
        assert_eq!(features.get(2), 0.0);
        let norm: f64 = features.entries().iter().map(|(_, v)| v * v).sum();
        assert_close(norm, 1.0);
    }

    #[test]
    fn single_character_tokens_are_skipped_by_default_pattern() {
        let v = vectorizer(json!({
            "vocabulary": {"a": 0, "vote": 1},
            "idf": [1.0, 1.0]
        }));
        let features = v.transform("a vote");
        assert_eq!(features.get(0), 0.0);
        assert_close(features.get(1), 1.0);
    }

    #[test]
    fn sublinear_tf_and_no_norm() {
        let v = vectorizer(json!({
            "vocabulary": {"vote": 0},
            "idf": [2.0],
            "sublinear_tf": true,
            "norm": null
        }));
        let features = v.transform("vote vote vote");
        assert_close(features.get(0), (1.0 + 3.0f64.ln()) * 2.0);
    }

    #[test]
    fn binary_counts_with_l1_norm() {
        let v = vectorizer(json!({
            "vocabulary": {"vote": 0, "senate": 1},
            "idf": [1.0, 3.0],
            "binary": true,
            "norm": "l1"
        }));
        let features = v.transform("vote vote senate");
        assert_close(features.get(0), 0.25);
        assert_close(features.get(1), 0.75);
    }

    #[test]
    fn bigrams_and_stop_words() {
        let v = vectorizer(json!({
            "vocabulary": {"fake news": 0, "news": 1, "fake": 2},
            "idf": [1.0, 1.0, 1.0],
            "ngram_range": [1, 2],
            "stop_words": ["the"],
            "norm": null
        }));
        // "the" is dropped before n-grams are built
        let features = v.transform("fake the news");
        assert_close(features.get(0), 1.0);
        assert_close(features.get(1), 1.0);
        assert_close(features.get(2), 1.0);
    }

    #[test]
    fn capture_group_selects_token() {
        let v = vectorizer(json!({
            "vocabulary": {"vote": 0},
            "idf": [1.0],
            "token_pattern": r"#(\w+)",
            "norm": null
        }));
        let features = v.transform("#vote vote");
        assert_close(features.get(0), 1.0);
    }

    #[test]
    fn lowercase_flag_controls_case_folding() {
        let v = vectorizer(json!({
            "vocabulary": {"vote": 0},
            "idf": [1.0],
            "lowercase": false,
            "norm": null
        }));
        assert_eq!(v.transform("VOTE").nnz(), 0);
        assert_eq!(basic().transform("VOTE").nnz(), 1);
    }

    #[test]
    fn rejects_inconsistent_artifacts() {
        let cases = [
            json!({"vocabulary": {}, "idf": []}),
            json!({"vocabulary": {"a": 0}, "idf": [1.0, 1.0]}),
            json!({"vocabulary": {"ab": 0, "cd": 0}, "idf": [1.0, 1.0]}),
            json!({"vocabulary": {"ab": 5}, "idf": [1.0]}),
            json!({"vocabulary": {"ab": 0}, "idf": [1.0], "ngram_range": [2, 1]}),
            json!({"vocabulary": {"ab": 0}, "idf": [1.0], "token_pattern": "("}),
        ];
        for case in cases {
            let artifact: TfidfArtifact = serde_json::from_value(case.clone()).unwrap();
            let err = TfidfVectorizer::from_artifact(artifact).unwrap_err();
            assert!(
                matches!(
                    err,
                    ModelLoadError::Invalid {
                        kind: ArtifactKind::Vectorizer,
                        ..
                    }
                ),
                "{case} was accepted"
            );
        }
    }
}
