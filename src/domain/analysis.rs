use chrono::{DateTime, Utc};

use crate::detector::Verdict;

/// Outcome of one detection request. Lives only until it is rendered.
///
/// `classified_at` is when the model returned; the reply reports its own
/// completion time after the presentation delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub verdict: Verdict,
    pub input_chars: usize,
    pub classified_at: DateTime<Utc>,
}
