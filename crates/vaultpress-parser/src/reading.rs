//! Reading-time estimate for post headers.

use crate::frontmatter::strip_frontmatter;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Average adult reading speed
pub const WORDS_PER_MINUTE: usize = 225;

static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)`{1,3}.*?`{1,3}").unwrap());
static HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#{1,6}\s+").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_~`]").unwrap());

/// Estimated reading time of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTime {
    /// `"4 min read"`
    pub text: String,
    pub minutes: usize,
    /// Milliseconds
    pub time: u64,
    pub words: usize,
}

impl ReadingTime {
    fn from_words(words: usize) -> Self {
        let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
        Self {
            text: format!("{} min read", minutes),
            minutes,
            time: minutes as u64 * 60 * 1000,
            words,
        }
    }

    /// Short form for narrow layouts (`"4 min"`)
    pub fn short_text(&self) -> String {
        format!("{} min", self.minutes)
    }
}

impl Default for ReadingTime {
    fn default() -> Self {
        Self::from_words(0)
    }
}

/// Count words of the visible text and estimate minutes, at least one
pub fn calculate_reading_time(content: &str) -> ReadingTime {
    let body = strip_frontmatter(content);
    let text = IMAGE.replace_all(body, "");
    let text = LINK.replace_all(&text, "$1");
    let text = CODE.replace_all(&text, "");
    let text = HEADER.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    ReadingTime::from_words(text.split_whitespace().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_is_one_minute() {
        let rt = calculate_reading_time("");
        assert_eq!(rt.minutes, 1);
        assert_eq!(rt.words, 0);
        assert_eq!(rt.text, "1 min read");
        assert_eq!(rt.time, 60_000);
    }

    #[test]
    fn test_markup_is_not_counted() {
        let content = "---\ntitle: x\n---\n## Heading here\n\n**bold** [link text](url) ![alt](a.png) `code`";
        assert_eq!(calculate_reading_time(content).words, 5);
    }

    #[test]
    fn test_minutes_round_up() {
        let words = vec!["word"; 451].join(" ");
        let rt = calculate_reading_time(&words);
        assert_eq!(rt.minutes, 3);
        assert_eq!(rt.short_text(), "3 min");
    }
}
