//! Computed fields attached to every document after parsing.
//!
//! All three derivations are pure functions of the raw body and the source
//! file name:
//!
//! | Field         | Derivation                                              |
//! |---------------|---------------------------------------------------------|
//! | `wordCount`   | number of whitespace-delimited tokens in the body       |
//! | `readingTime` | `words / words_per_minute`, displayed as `"N min read"` |
//! | `slug`        | file name minus the `.mdx` suffix ([`naming`])          |
//!
//! [`naming`]: crate::naming

use crate::naming;
use crate::types::{ComputedFields, ReadingTime};

/// Default reading speed used when the config doesn't override it.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Count whitespace-delimited tokens. Runs of whitespace count as one
/// separator, and leading/trailing whitespace produces no empty tokens.
pub fn word_count(raw: &str) -> usize {
    raw.split_whitespace().count()
}

/// Estimate reading time at `words_per_minute`.
///
/// The display text rounds minutes up, so any non-empty body reads as at
/// least "1 min read". A zero reading speed is rejected by config
/// validation; here it is treated as one word per minute.
pub fn reading_time(raw: &str, words_per_minute: u32) -> ReadingTime {
    let words = word_count(raw);
    let wpm = f64::from(words_per_minute.max(1));
    let minutes = words as f64 / wpm;
    // Round to two decimals before ceiling so 2.0000001 reads as 2, not 3.
    let displayed = ((minutes * 100.0).round() / 100.0).ceil() as u64;
    ReadingTime {
        text: format!("{displayed} min read"),
        minutes,
        time: (minutes * 60.0 * 1000.0).round() as u64,
        words,
    }
}

/// Compute all derived fields for a document.
pub fn compute(raw: &str, source_file_name: &str, words_per_minute: u32) -> ComputedFields {
    ComputedFields {
        reading_time: reading_time(raw, words_per_minute),
        word_count: word_count(raw),
        slug: naming::derive_slug(source_file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_collapses_whitespace_runs() {
        assert_eq!(word_count("a  b   c"), 3);
    }

    #[test]
    fn word_count_ignores_leading_and_trailing_whitespace() {
        assert_eq!(word_count("\n  hello world \t\n"), 2);
    }

    #[test]
    fn word_count_mixed_whitespace() {
        assert_eq!(word_count("one\ttwo\nthree\r\nfour"), 4);
    }

    #[test]
    fn word_count_empty_body() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n "), 0);
    }

    #[test]
    fn reading_time_exact_minutes() {
        let body = vec!["word"; 400].join(" ");
        let rt = reading_time(&body, 200);
        assert_eq!(rt.words, 400);
        assert_eq!(rt.minutes, 2.0);
        assert_eq!(rt.time, 120_000);
        assert_eq!(rt.text, "2 min read");
    }

    #[test]
    fn reading_time_rounds_up_display() {
        let body = vec!["word"; 250].join(" ");
        let rt = reading_time(&body, 200);
        assert_eq!(rt.minutes, 1.25);
        assert_eq!(rt.text, "2 min read");
        assert_eq!(rt.time, 75_000);
    }

    #[test]
    fn reading_time_short_body_is_one_minute() {
        let rt = reading_time("just a few words", 200);
        assert_eq!(rt.text, "1 min read");
    }

    #[test]
    fn reading_time_empty_body() {
        let rt = reading_time("", 200);
        assert_eq!(rt.words, 0);
        assert_eq!(rt.time, 0);
        assert_eq!(rt.text, "0 min read");
    }

    #[test]
    fn reading_time_respects_speed() {
        let body = vec!["word"; 300].join(" ");
        assert_eq!(reading_time(&body, 100).text, "3 min read");
        assert_eq!(reading_time(&body, 300).text, "1 min read");
    }

    #[test]
    fn compute_fills_all_fields() {
        let fields = compute("a  b   c", "my.post.mdx", DEFAULT_WORDS_PER_MINUTE);
        assert_eq!(fields.word_count, 3);
        assert_eq!(fields.slug, "my.post");
        assert_eq!(fields.reading_time.words, 3);
    }
}
