//! Stateless pattern matchers for Obsidian syntax in raw text.
//!
//! Every scan returns [`MatchSpan`]s with byte offsets into the scanned
//! text. Scans over whole documents drop any match that overlaps a fenced
//! code block or an inline code span; scans over single text nodes
//! (`*_in_text`) assume the caller already excluded code.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

// ============================================================================
// Compiled regex patterns
// ============================================================================

/// Fenced code block, non-greedy to the next fence
static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[\s\S]*?```").unwrap());

/// Inline code span
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]*`").unwrap());

/// Wikilink or image wikilink: [[target]], [[target|display]], ![[file]]
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!?\[\[([^\]]+)\]\]").unwrap());

/// Standard Markdown link: [text](url)
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Inline tag at a word boundary. The prefix character is consumed.
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s\p{P}--#])#([A-Za-z0-9_-]+)").unwrap());

/// Callout header at the start of a blockquote's first paragraph
static CALLOUT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!([\w-]+)\]([+\-]?)(?:[ \t]+([^\n]+))?").unwrap());

/// Highlight mark
static MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"==(.+?)==").unwrap());

/// Obsidian comment, possibly multi-line
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%%[\s\S]*?%%").unwrap());

// ============================================================================
// Match spans
// ============================================================================

/// What a [`MatchSpan`] matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Wikilink,
    ImageWikilink,
    MarkdownLink,
    Tag,
    CalloutHeader,
    Mark,
    Comment,
    FencedCode,
    InlineCode,
}

/// A match with byte offsets and captured groups.
///
/// Group layout per kind:
/// - wikilinks: `[target, display?]`, split at the first `|`
/// - markdown links: `[text, url]`
/// - tags: `[tag]` (span covers `#tag`, not the prefix character)
/// - callout headers: `[type, fold, title?]`
/// - marks: `[inner]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub kind: MatchKind,
    pub groups: Vec<String>,
}

impl MatchSpan {
    fn new(range: Range<usize>, kind: MatchKind, groups: Vec<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            kind,
            groups,
        }
    }

    /// Captured group by position
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).map(String::as_str)
    }

    /// Byte range of the whole match
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether this is an image wikilink (`![[...]]`)
    pub fn is_image(&self) -> bool {
        self.kind == MatchKind::ImageWikilink
    }
}

// ============================================================================
// Excluded ranges (code blocks and inline code)
// ============================================================================

/// Sorted, merged byte ranges that other scans must not touch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExcludedRanges {
    ranges: Vec<Range<usize>>,
}

impl ExcludedRanges {
    /// Whether a byte offset falls inside any range
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        // First range starting after `offset`; only its predecessor can contain it
        let idx = self.ranges.partition_point(|r| r.start <= offset);
        idx > 0 && offset < self.ranges[idx - 1].end
    }

    /// Whether `span` shares at least one byte with any range
    pub fn overlaps(&self, span: &Range<usize>) -> bool {
        if span.start >= span.end {
            return self.contains(span.start);
        }
        let idx = self.ranges.partition_point(|r| r.start < span.end);
        idx > 0 && self.ranges[idx - 1].end > span.start
    }

    /// The merged ranges, in order
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    fn add(&mut self, range: Range<usize>) {
        self.ranges.push(range);
    }

    /// Sort and merge overlapping ranges so lookups can binary search.
    fn optimize(&mut self) {
        if self.ranges.is_empty() {
            return;
        }
        self.ranges.sort_by_key(|r| r.start);

        let mut merged = Vec::with_capacity(self.ranges.len());
        let mut current = self.ranges[0].clone();
        for range in self.ranges.iter().skip(1) {
            if range.start <= current.end {
                current.end = current.end.max(range.end);
            } else {
                merged.push(current);
                current = range.clone();
            }
        }
        merged.push(current);
        self.ranges = merged;
    }
}

impl FromIterator<Range<usize>> for ExcludedRanges {
    fn from_iter<I: IntoIterator<Item = Range<usize>>>(iter: I) -> Self {
        let mut excluded = ExcludedRanges::default();
        for range in iter {
            excluded.add(range);
        }
        excluded.optimize();
        excluded
    }
}

/// Byte ranges of fenced code blocks only
pub fn fenced_code_ranges(content: &str) -> Vec<Range<usize>> {
    FENCED_CODE.find_iter(content).map(|m| m.range()).collect()
}

/// Fenced code blocks and inline code spans, merged
pub fn code_ranges(content: &str) -> ExcludedRanges {
    if !content.contains('`') {
        return ExcludedRanges::default();
    }
    FENCED_CODE
        .find_iter(content)
        .chain(INLINE_CODE.find_iter(content))
        .map(|m| m.range())
        .collect()
}

/// Whether byte `index` of `content` lies inside code
pub fn is_in_code(content: &str, index: usize) -> bool {
    code_ranges(content).contains(index)
}

// ============================================================================
// Scans
// ============================================================================

/// Wikilinks and image wikilinks outside code
pub fn scan_wikilinks(content: &str) -> Vec<MatchSpan> {
    if !content.contains("[[") {
        return Vec::new();
    }
    let code = code_ranges(content);
    scan_wikilinks_in_text(content)
        .into_iter()
        .filter(|span| !code.overlaps(&span.range()))
        .collect()
}

/// Wikilinks in a single text node
pub fn scan_wikilinks_in_text(text: &str) -> Vec<MatchSpan> {
    WIKILINK
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?.as_str();
            let kind = if whole.as_str().starts_with('!') {
                MatchKind::ImageWikilink
            } else {
                MatchKind::Wikilink
            };
            let mut parts = inner.split('|');
            let mut groups = vec![parts.next().unwrap_or(inner).to_string()];
            if let Some(display) = parts.next() {
                groups.push(display.to_string());
            }
            Some(MatchSpan::new(whole.range(), kind, groups))
        })
        .collect()
}

/// Standard `[text](url)` links outside code, images excluded
pub fn scan_markdown_links(content: &str) -> Vec<MatchSpan> {
    let code = code_ranges(content);
    MARKDOWN_LINK
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if whole.start() > 0 && content.as_bytes()[whole.start() - 1] == b'!' {
                return None;
            }
            if code.overlaps(&whole.range()) {
                return None;
            }
            let groups = vec![caps[1].to_string(), caps[2].to_string()];
            Some(MatchSpan::new(whole.range(), MatchKind::MarkdownLink, groups))
        })
        .collect()
}

/// Inline `#tags` preceded by start, whitespace or punctuation.
///
/// ```
/// use vaultpress_parser::scanner::scan_tags;
///
/// let tags = scan_tags("see #intro-guide.");
/// assert_eq!(tags[0].group(0), Some("intro-guide"));
/// assert!(scan_tags("foo#bar").is_empty());
/// ```
pub fn scan_tags(text: &str) -> Vec<MatchSpan> {
    if !text.contains('#') {
        return Vec::new();
    }
    TAG.captures_iter(text)
        .filter_map(|caps| {
            let tag = caps.get(1)?;
            // span starts at '#', after any consumed prefix
            let start = tag.start() - 1;
            Some(MatchSpan::new(
                start..tag.end(),
                MatchKind::Tag,
                vec![tag.as_str().to_string()],
            ))
        })
        .collect()
}

/// Callout header at the start of `text`
pub fn scan_callout_header(text: &str) -> Option<MatchSpan> {
    let caps = CALLOUT_HEADER.captures(text)?;
    let whole = caps.get(0)?;
    let mut groups = vec![
        caps[1].to_string(),
        caps.get(2).map_or("", |m| m.as_str()).to_string(),
    ];
    if let Some(title) = caps.get(3) {
        groups.push(title.as_str().to_string());
    }
    Some(MatchSpan::new(whole.range(), MatchKind::CalloutHeader, groups))
}

/// `==highlight==` spans
pub fn scan_marks(text: &str) -> Vec<MatchSpan> {
    if !text.contains("==") {
        return Vec::new();
    }
    MARK.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(MatchSpan::new(whole.range(), MatchKind::Mark, vec![caps[1].to_string()]))
        })
        .collect()
}

/// `%%comment%%` spans, multi-line included
pub fn scan_comments(text: &str) -> Vec<MatchSpan> {
    if !text.contains("%%") {
        return Vec::new();
    }
    COMMENT
        .find_iter(text)
        .map(|m| MatchSpan::new(m.range(), MatchKind::Comment, Vec::new()))
        .collect()
}

/// Code spans as match spans, fenced blocks first
pub fn scan_code(content: &str) -> Vec<MatchSpan> {
    let mut spans: Vec<MatchSpan> = FENCED_CODE
        .find_iter(content)
        .map(|m| MatchSpan::new(m.range(), MatchKind::FencedCode, Vec::new()))
        .collect();
    spans.extend(
        INLINE_CODE
            .find_iter(content)
            .map(|m| MatchSpan::new(m.range(), MatchKind::InlineCode, Vec::new())),
    );
    spans
}
