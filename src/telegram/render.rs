use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use teloxide::types::Message;

use crate::{detector::Verdict, domain::Analysis};

pub const EMPTY_INPUT_WARNING: &str = "⚠️ Please enter a news article to analyze.";
pub const FAILURE_MESSAGE: &str =
    "❌ The article could not be analyzed. Please try again later.";
const DISCLAIMER: &str = "This tool is for educational purposes only. \
                          Always verify news from multiple reliable sources.";

pub fn intro() -> String {
    format!(
        "<b>🔍 Fake News Detector</b>\n\n\
         Our AI-powered tool uses advanced machine learning to help identify \
         potential fake news articles.\n\n\
         Paste your article here (or send <code>/analyze</code> followed by the text) \
         and the verdict will come right back.\n\n\
         <i>{DISCLAIMER}</i>"
    )
}

/// Verdict card; `completed_at` is stamped by the caller once the reply is due.
pub fn analysis(analysis: &Analysis, completed_at: DateTime<Utc>, tz: Tz) -> String {
    let headline = match analysis.verdict {
        Verdict::True => "✅ True News",
        Verdict::Fake => "❌ Fake News",
    };
    format!(
        "<b>Analysis Result</b>\n\n<b>{headline}</b>\n\n──────────\n\
         <i>Analysis completed at: {}</i>",
        timestamp(completed_at, tz)
    )
}

pub fn timestamp(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Article body of a message: its text, or the caption of a media message.
pub fn article_text(msg: &Message) -> Option<&str> {
    msg.text().or_else(|| msg.caption())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample(verdict: Verdict) -> Analysis {
        Analysis {
            verdict,
            input_chars: 42,
            classified_at: Utc.with_ymd_and_hms(2026, 10, 17, 3, 4, 4).unwrap(),
        }
    }

    fn completed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 3, 4, 5).unwrap()
    }

    #[test]
    fn true_verdict_is_rendered_with_check_mark() {
        let out = analysis(&sample(Verdict::True), completed(), chrono_tz::UTC);
        assert!(out.contains("✅ True News"));
        assert!(!out.contains("Fake"));
        assert!(out.ends_with("Analysis completed at: 2026-10-17 03:04:05</i>"));
    }

    #[test]
    fn fake_verdict_is_rendered_with_cross() {
        let out = analysis(&sample(Verdict::Fake), completed(), chrono_tz::UTC);
        assert!(out.contains("❌ Fake News"));
    }

    #[test]
    fn reports_completion_time_not_classification_time() {
        let item = sample(Verdict::True);
        let done = item.classified_at + chrono::Duration::milliseconds(1_500);
        let out = analysis(&item, done, chrono_tz::UTC);
        assert!(out.contains("Analysis completed at: 2026-10-17 03:04:05"));
        assert!(!out.contains("03:04:04"));
    }

    #[test]
    fn timestamp_uses_configured_zone() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 23, 30, 0).unwrap();
        assert_eq!(timestamp(at, chrono_tz::Asia::Seoul), "2026-10-18 08:30:00");
    }

    #[test]
    fn intro_carries_disclaimer() {
        assert!(intro().contains(DISCLAIMER));
    }
}
