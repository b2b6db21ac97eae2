use once_cell::sync::Lazy;
use regex::Regex;

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?\S+|www\S+").expect("valid url regex"));
static NON_WORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W").expect("valid non-word regex"));
static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit regex"));

/// Canonicalizes article text before vectorization.
///
/// URLs are stripped first, then every non-word character becomes a space,
/// digits are deleted and the result is lowercased. The URL pass runs again at
/// the end because digit removal and lowercasing can assemble a new URL-like
/// token (`ht1tpx`, `HTTPS://`), which keeps the output a fixed point.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let without_urls = URL_REGEX.replace_all(text, "");
    let words_only = NON_WORD_REGEX.replace_all(&without_urls, " ");
    let without_digits = DIGIT_REGEX.replace_all(&words_only, "");
    let lowered = without_digits.to_lowercase();
    URL_REGEX.replace_all(&lowered, "").into_owned()
}
