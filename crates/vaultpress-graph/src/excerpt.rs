//! Readable context windows around a link, for linked mentions.
//!
//! The window is cut from raw Markdown, then Markdown syntax is stripped
//! while link tokens are kept whole so callers can render them. Everything
//! here is deterministic: offsets are byte offsets snapped to character
//! boundaries and case folding is ASCII only.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use vaultpress_core::utils::{ceil_char_boundary, floor_char_boundary};
use vaultpress_core::{Excerpt, ExcerptConfig};
use vaultpress_parser::resolver::{is_internal_link, link_text_from_url};
use vaultpress_parser::scanner::{code_ranges, fenced_code_ranges};
use vaultpress_parser::strip_frontmatter;

/// Leading context when the link sits too close to the end for trailing context
const NEAR_END_LEADING: usize = 250;
/// Extra context kept after a link that directly follows the match
const FOLLOWING_LINK_SLACK: usize = 50;
/// Cleaned excerpts shorter than this are re-widened once
const MIN_CLEANED_LEN: usize = 60;

// ============================================================================
// Patterns
// ============================================================================

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static FULL_WIKILINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\[[^\]]+\]\]").unwrap());
static LINK_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\]]*\][^)]*\)").unwrap());

/// Markdown syntax removal, applied in order
static STRIP_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?s)```.*?```", " "),
        (r"(?s)```.*$", " "),
        (r"(?s)^.*?```", " "),
        (r"```+", " "),
        (r"`[^`\n]+`", " "),
        (r"\*\*([^*]+?)\*\*", "${1}"),
        (r"\*([^*\s][^*]*?[^*\s])\*", "${1}"),
        (r"\*([^*\s]+)\*", "${1}"),
        (r"_{1,2}([^_]+)_{1,2}", "${1}"),
        (r"~~([^~]+)~~", "${1}"),
        (r"#{1,6}\s+", ""),
        (r"\s*>\s*\[![\w-]+\]\s*", " "),
        (r"\s*>\s*", " "),
        (r"\s*---+\s*", " "),
        (r"\s*\[![\w-]+\]\s*", " "),
        (r"^-\s+", ""),
        (r"^\d+\.\s+", ""),
        (r"\*\*+", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

static DOUBLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]+):\s*-\s*([A-Z][a-z]+):").unwrap());
static DASHED_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+:\s*-\s*").unwrap());
static TRAILING_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[a-z]+)?:\s*$").unwrap());
static ORPHAN_LIST_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z\s]+)\s+-\s+[A-Z][a-z]+(?:\s+[a-z]+)?:\s*").unwrap()
});
static DASH_BEFORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*").unwrap());
static LABEL_AHEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(?:\s+[a-z]+)?:").unwrap());
static SPACED_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[a-z]+)?:\s+").unwrap());
static TRAILING_COLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\s*$").unwrap());
static TRAILING_DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*$").unwrap());
static FENCE_MARKERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9_]+\b").unwrap());
static WIKILINK_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[[^\]]+\]\]").unwrap());
static MARKDOWN_LINK_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]\([^)]+\)").unwrap());

static OPEN_WIKILINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[[^\]]*\]?$").unwrap());
static OPEN_MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\([^)]*$").unwrap());
static MARKDOWN_LINK_REMNANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\[\]]*\]\([^)]*\)?").unwrap());

// ============================================================================
// Locating the reference
// ============================================================================

/// Excerpt around the first reference to `link_text` in `content`.
///
/// Wikilinks (`[[link_text...]]`, ASCII case-insensitive) are tried first,
/// then standard links whose URL names the same post. References inside code
/// are ignored. Returns an empty string when nothing is found.
pub fn create_excerpt_around_link(content: &str, link_text: &str, config: &ExcerptConfig) -> String {
    let body = strip_frontmatter(content);
    let code = code_ranges(body);

    let found = find_wikilink(body, link_text, |i| code.contains(i))
        .or_else(|| find_markdown_link(body, link_text, |i| code.contains(i)));

    match found {
        Some(span) => extract_excerpt_at(body, span.start, span.len(), config).excerpt,
        None => String::new(),
    }
}

fn find_wikilink(body: &str, link_text: &str, in_code: impl Fn(usize) -> bool) -> Option<Range<usize>> {
    // ASCII lowercasing keeps byte offsets aligned with `body`
    let haystack = body.to_ascii_lowercase();
    let needle = format!("[[{}", link_text.to_ascii_lowercase());

    let mut from = 0;
    while let Some(found) = haystack[from..].find(&needle) {
        let start = from + found;
        let after = start + needle.len();
        let rest = &body[after..];
        match rest.find(']') {
            Some(close) if rest[close..].starts_with("]]") => {
                let end = after + close + 2;
                if !in_code(start) {
                    return Some(start..end);
                }
                from = end;
            }
            _ => from = after,
        }
    }
    None
}

fn find_markdown_link(body: &str, link_text: &str, in_code: impl Fn(usize) -> bool) -> Option<Range<usize>> {
    let wanted = link_text.strip_suffix("/index").unwrap_or(link_text);
    MARKDOWN_LINK.captures_iter(body).find_map(|caps| {
        let whole = caps.get(0)?;
        let url = caps.get(2)?.as_str();
        if in_code(whole.start()) || !is_internal_link(url) {
            return None;
        }
        let target = link_text_from_url(url)?;
        let target = target.strip_suffix("/index").unwrap_or(&target);
        (target == wanted).then(|| whole.range())
    })
}

// ============================================================================
// Window selection
// ============================================================================

/// Excerpt for a link of `link_len` bytes at byte `position` of `content`.
///
/// A link inside a fenced code block (or past the end) yields an empty excerpt.
pub fn extract_excerpt_at(
    content: &str,
    position: usize,
    link_len: usize,
    config: &ExcerptConfig,
) -> Excerpt {
    let len = content.len();
    let fences = fenced_code_ranges(content);
    if position > len || fences.iter().any(|f| f.contains(&position)) {
        return Excerpt::default();
    }

    let context = config.context_length;
    let min_context = config.min_context_length;
    let mut link_len = link_len.min(len - position);

    let near_end = len - (position + link_len) < min_context;
    let leading = if near_end { (context * 2).max(NEAR_END_LEADING) } else { context };
    let mut start = position.saturating_sub(leading);
    let mut end = (position + link_len + if near_end { 0 } else { context }).min(len);

    // Never cross a code block that does not hold the link
    for fence in &fences {
        if fence.start > start && fence.start < end && fence.start > position {
            end = fence.start;
        }
        if fence.end > start && fence.end < position && fence.start < start {
            start = fence.end;
        }
    }

    let before = position - start;
    if before < min_context && start > 0 {
        let desired = start.saturating_sub(min_context - before);
        if !fences.iter().any(|f| f.end > desired && f.end <= start) {
            start = desired;
        }
    }
    let after = end.saturating_sub(position + link_len);
    if after < min_context && end < len {
        let desired = (end + (min_context - after)).min(len);
        if !fences.iter().any(|f| f.start >= end && f.start < desired) {
            end = desired;
        }
    }

    // Widen to the complete wikilink, anchor and display included
    if let Some(full) = FULL_WIKILINK.find(&content[position..])
        && full.len() > link_len
    {
        link_len = full.len();
        end = (position + link_len + context).min(len);
    }

    // Keep a link that starts right after the match whole
    let link_end = position + link_len;
    let tail = &content[link_end..];
    for token in [LINK_TAIL.find(tail), FULL_WIKILINK.find(tail)].into_iter().flatten() {
        if end < link_end + token.end() {
            end = (link_end + token.end() + FOLLOWING_LINK_SLACK).min(len);
        }
    }

    let mut start = floor_char_boundary(content, start);
    let end = ceil_char_boundary(content, end);
    let mut excerpt = clean_excerpt(&content[start..end], config);

    // Markdown-heavy windows shrink a lot; widen once, backwards
    let words = excerpt
        .split_whitespace()
        .filter(|w| w.chars().any(|c| c.is_ascii_alphanumeric()))
        .count();
    if (words < config.min_words || excerpt.len() < MIN_CLEANED_LEN) && start > 0 {
        let raw_len = (end - start) as f64;
        let ratio = if excerpt.is_empty() { 3.0 } else { raw_len / excerpt.len() as f64 };
        let needed = MIN_CLEANED_LEN
            .saturating_sub(excerpt.len())
            .max(config.min_words.saturating_sub(words) * 8);
        let additional = (needed as f64 * ratio.max(2.0) * 1.5).ceil() as usize;
        let wider = floor_char_boundary(content, start.saturating_sub(additional));

        let blocked = fences.iter().any(|f| f.end > wider && f.end <= start);
        if !blocked && wider < start {
            start = wider;
            excerpt = clean_excerpt(&content[start..end], config);
        }
    }

    Excerpt {
        excerpt: truncate_excerpt(drop_leading_remnant(&excerpt), config),
        is_at_start: start == 0,
        is_at_end: end >= len,
    }
}

// ============================================================================
// Cleaning
// ============================================================================

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Replace matches of `re` only where the text after the match satisfies `ahead`.
///
/// A rejected match does not consume its text: the search resumes one
/// character after where it started.
fn replace_when_followed(text: &str, re: &Regex, ahead: impl Fn(&str) -> bool, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut from = 0;
    while from <= text.len() {
        let Some(caps) = re.captures_at(text, from) else { break };
        let Some(whole) = caps.get(0) else { break };
        if ahead(&text[whole.end()..]) {
            out.push_str(&text[last..whole.start()]);
            caps.expand(replacement, &mut out);
            last = whole.end();
            from = if whole.is_empty() { next_char(text, whole.end()) } else { whole.end() };
        } else {
            from = next_char(text, whole.start());
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Byte offset just past the character at `at` (or past the end)
fn next_char(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(at + 1, |c| at + c.len_utf8())
}

fn label_or_end(rest: &str) -> bool {
    rest.is_empty() || LABEL_AHEAD.is_match(rest)
}

/// Strip Markdown syntax from a raw window, keeping link tokens
fn strip_markdown(raw: &str) -> String {
    let mut text = collapse_whitespace(raw);
    for (rule, replacement) in STRIP_RULES.iter() {
        text = rule.replace_all(&text, *replacement).into_owned();
    }
    collapse_whitespace(&text)
}

/// One round of orphaned label and dash removal
fn tidy_once(text: &str) -> String {
    let text = DOUBLE_LABEL.replace_all(text, "");
    let text = replace_when_followed(&text, &DASHED_LABEL, label_or_end, "");
    let text = TRAILING_LABEL.replace(&text, "");
    let text = replace_when_followed(
        &text,
        &ORPHAN_LIST_LABEL,
        |rest| rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_uppercase() || c == '['),
        "${1} ",
    );
    let text = replace_when_followed(&text, &DASH_BEFORE, |rest| LABEL_AHEAD.is_match(rest), " ");
    let text = TRAILING_COLON.replace(&text, "");
    let text = TRAILING_DASH.replace(&text, "");
    collapse_whitespace(&text)
}

/// Repeat [`tidy_once`] until nothing changes, at most `passes` times
fn tidy_fragments(text: &str, passes: usize) -> String {
    let mut current = text.to_string();
    for _ in 0..passes {
        let next = tidy_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Drop a token that is immediately repeated after whitespace
fn collapse_repeats(text: &str, unit: &Regex, ignore_case: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut from = 0;
    while let Some(m) = unit.find_at(text, from) {
        let token = m.as_str();
        let rest = &text[m.end()..];
        let candidate = rest.trim_start();
        let gap = rest.len() - candidate.len();

        let repeated = gap > 0
            && candidate.is_char_boundary(token.len().min(candidate.len()))
            && candidate.len() >= token.len()
            && if ignore_case {
                candidate[..token.len()].eq_ignore_ascii_case(token)
            } else {
                candidate.starts_with(token)
            }
            && candidate[token.len()..].chars().next().is_none_or(char::is_whitespace);

        if repeated {
            out.push_str(&text[last..m.end()]);
            last = m.end() + gap + token.len();
            from = last;
        } else {
            from = m.end();
        }
        if from >= text.len() {
            break;
        }
    }
    out.push_str(&text[last..]);
    out
}

fn collapse_duplicates(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..2 {
        current = collapse_repeats(&current, &WORD, true);
        current = collapse_repeats(&current, &WIKILINK_TOKEN, false);
        current = collapse_repeats(&current, &MARKDOWN_LINK_TOKEN, false);
        current = collapse_whitespace(&current);
    }
    current
}

/// Full cleanup of a raw Markdown window
fn clean_excerpt(raw: &str, config: &ExcerptConfig) -> String {
    let text = strip_markdown(raw);
    let text = tidy_fragments(&text, config.cleanup_passes);

    let text = FENCE_MARKERS.replace_all(&text, " ");
    let text = replace_when_followed(&text, &SPACED_LABEL, label_or_end, " ");
    let text = TRAILING_LABEL.replace(&text, "");
    collapse_duplicates(&collapse_whitespace(&text))
}

// ============================================================================
// Truncation
// ============================================================================

/// Start of a link token left open at the end of `text`
fn open_link_start(text: &str) -> Option<usize> {
    OPEN_WIKILINK
        .find(text)
        .or_else(|| OPEN_MARKDOWN_LINK.find(text))
        .map(|m| m.start())
}

/// Drop trailing half-links until none remain
fn close_links(mut text: &str) -> &str {
    while let Some(start) = open_link_start(text) {
        text = text[..start].trim_end();
    }
    text
}

/// Drop the tail of a link the window start cut through
fn drop_leading_remnant(text: &str) -> &str {
    let wikilink_tail = text
        .find("]]")
        .filter(|&close| !text[..close].contains("[["))
        .map(|close| close + 2);
    let rest = match wikilink_tail {
        Some(end) => &text[end..],
        None => match MARKDOWN_LINK_REMNANT.find(text) {
            Some(m) => &text[m.end()..],
            None => text,
        },
    };
    rest.trim_start()
}

/// Cut to `max_length` at a word boundary without splitting a link.
///
/// A link cut by the limit is kept whole when it ends within the configured
/// overrun; otherwise the excerpt stops before it.
pub fn truncate_excerpt(text: &str, config: &ExcerptConfig) -> String {
    if text.len() <= config.max_length {
        return close_links(text).to_string();
    }
    let cut = floor_char_boundary(text, config.max_length);
    let head = &text[..cut];

    if let Some(open) = open_link_start(head) {
        let closer = if head[open..].starts_with("[[") { "]]" } else { ")" };
        if let Some(close) = text[cut..].find(closer) {
            let link_end = cut + close + closer.len();
            if link_end <= config.ceiling() {
                return close_links(&text[..link_end]).to_string();
            }
        }
        if open > 0 {
            return close_links(text[..open].trim_end()).to_string();
        }
    }

    let boundary = match head.rfind(' ') {
        Some(space) if space > 0 => &head[..space],
        _ => head,
    };
    close_links(boundary.trim()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excerpt(content: &str, link: &str) -> String {
        create_excerpt_around_link(content, link, &ExcerptConfig::default())
    }

    #[test]
    fn test_short_document() {
        assert_eq!(excerpt("See [[b]] for more", "b"), "See [[b]] for more");
    }

    #[test]
    fn test_case_insensitive_wikilink_with_display() {
        assert_eq!(
            excerpt("Read **this**: [[My Post#Intro|the intro]] today.", "my post"),
            "Read this: [[My Post#Intro|the intro]] today."
        );
    }

    #[test]
    fn test_link_in_code_skipped() {
        let content = "`[[b]]` is syntax.\n\nBut [[b]] is real.";
        assert_eq!(excerpt(content, "b"), "is syntax. But [[b]] is real.");
    }

    #[test]
    fn test_markdown_link_fallback() {
        assert_eq!(
            excerpt("Go [there](posts/trip/index.md#day) now", "trip"),
            "Go [there](posts/trip/index.md#day) now"
        );
        assert_eq!(excerpt("Nothing here", "trip"), "");
    }

    #[test]
    fn test_markdown_stripped() {
        let content = "## Setup\n\n> [!note] Heads up\n> Use ~~old~~ *new* `code` and [[b]]\n\n---\n\n- item";
        assert_eq!(
            excerpt(content, "b"),
            "Setup Heads up Use old new and [[b]] - item"
        );
    }

    #[test]
    fn test_window_stops_at_code_block() {
        let content = format!(
            "{}\n```\nsecret code\n```\nIntro text leads to [[b]] and then more words follow here.",
            "filler ".repeat(5)
        );
        let result = excerpt(&content, "b");
        assert!(!result.contains("secret"));
        assert!(result.contains("[[b]]"));
    }

    #[test]
    fn test_duplicates_collapsed() {
        assert_eq!(collapse_duplicates("the the cat [[x]] [[x]] sat"), "the cat [[x]] sat");
        assert_eq!(collapse_duplicates("The the end"), "The end");
        assert_eq!(collapse_duplicates("is is."), "is is.");
    }

    #[test]
    fn test_rejected_match_retried_inside() {
        let re = Regex::new("xab|a").unwrap();
        assert_eq!(replace_when_followed("xab", &re, |rest| rest.starts_with('b'), "_"), "x_b");
        assert_eq!(replace_when_followed("Some - Label: here", &DASH_BEFORE, |rest| LABEL_AHEAD.is_match(rest), " "), "Some Label: here");
    }

    #[test]
    fn test_tidy_removes_orphan_labels() {
        assert_eq!(tidy_fragments("Some text - Label:", 5), "Some text");
        assert_eq!(tidy_fragments("Ends with colon:", 5), "Ends with colon");
    }

    #[test]
    fn test_truncate_at_word_boundary() {
        let text = "word ".repeat(60);
        let config = ExcerptConfig::default();
        let cut = truncate_excerpt(text.trim(), &config);
        assert!(cut.len() <= config.max_length);
        assert!(cut.ends_with("word"));
    }

    #[test]
    fn test_truncate_keeps_whole_link_within_overrun() {
        let config = ExcerptConfig::default();
        let text = format!("{} [[a long linked note]] tail", "x".repeat(190));
        let cut = truncate_excerpt(&text, &config);
        assert!(cut.ends_with("[[a long linked note]]"));

        let text = format!("{} [[{}]] tail", "x".repeat(190), "y".repeat(150));
        let cut = truncate_excerpt(&text, &config);
        assert_eq!(cut, "x".repeat(190));
    }

    #[test]
    fn test_long_excerpt_bounded() {
        let content = format!("{} [[b]] {}", "alpha beta ".repeat(40), "gamma delta ".repeat(40));
        let result = excerpt(&content, "b");
        assert!(result.len() <= ExcerptConfig::default().ceiling());
        assert!(result.contains("[[b]]"));
    }

    fn has_half_link(text: &str) -> bool {
        let rest = WIKILINK_TOKEN.replace_all(text, "");
        let rest = MARKDOWN_LINK_TOKEN.replace_all(&rest, "");
        rest.contains("[[") || rest.contains("]]") || rest.contains("](")
    }

    fn filler(len: usize) -> String {
        "lorem ipsum dolor sit amet ".chars().cycle().take(len).collect()
    }

    #[test]
    fn test_window_end_never_splits_later_link() {
        for n in 0..200 {
            let content = format!("See [[b]] {} [[some other long link name here]] end", filler(n));
            let result = excerpt(&content, "b");
            assert!(!has_half_link(&result), "filler {}: {:?}", n, result);
            assert!(result.starts_with("See [[b]]"), "filler {}: {:?}", n, result);
        }
    }

    #[test]
    fn test_window_start_never_splits_earlier_link() {
        for n in 0..320 {
            for earlier in ["[[an earlier long linked note]]", "[an earlier note](posts/earlier-note.md)"] {
                let content = format!("{} {} then [[b]] tail", earlier, filler(n));
                let result = excerpt(&content, "b");
                assert!(!has_half_link(&result), "filler {}: {:?}", n, result);
            }
        }
    }

    #[test]
    fn test_short_text_loses_trailing_half_link() {
        let config = ExcerptConfig::default();
        assert_eq!(truncate_excerpt("See [[b]] and [[other", &config), "See [[b]] and");
        assert_eq!(truncate_excerpt("See [[b]] and [[other]", &config), "See [[b]] and");
        assert_eq!(truncate_excerpt("See [[b]] and [x](posts/x", &config), "See [[b]] and");
        assert_eq!(drop_leading_remnant("note]] then [[b]]"), "then [[b]]");
        assert_eq!(drop_leading_remnant("note](posts/n.md) then [[b]]"), "then [[b]]");
        assert_eq!(drop_leading_remnant("See [[b]] now"), "See [[b]] now");
    }

    #[test]
    fn test_deterministic() {
        let content = "Intro. ".repeat(30) + "Then [[b]] appears. " + &"Outro. ".repeat(30);
        assert_eq!(excerpt(&content, "b"), excerpt(&content, "b"));
    }

    #[test]
    fn test_link_inside_fence_is_empty() {
        let content = "```\n[[b]]\n```";
        assert_eq!(extract_excerpt_at(content, 4, 5, &ExcerptConfig::default()), Excerpt::default());
    }
}
