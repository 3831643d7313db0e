//! Frontmatter extraction: `---\nYAML\n---`

use regex::Regex;
use std::sync::LazyLock;
use vaultpress_core::{Collection, Document, Error, Frontmatter, Result};

/// Matches YAML frontmatter at the very start of a file
static FRONTMATTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---\s*\n([\s\S]*?)\n---\s*\n").unwrap());

/// Split raw file content into `(frontmatter_yaml, body)`
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    match FRONTMATTER_PATTERN.captures(content) {
        Some(caps) => {
            let yaml = caps.get(1).map(|m| m.as_str());
            let end = caps.get(0).map_or(0, |m| m.end());
            (yaml, &content[end..])
        }
        None => (None, content),
    }
}

/// Body with any frontmatter block removed
pub fn strip_frontmatter(content: &str) -> &str {
    split_frontmatter(content).1
}

/// Deserialize frontmatter YAML; empty YAML gives default frontmatter
pub fn parse_frontmatter(yaml: &str) -> Result<Frontmatter> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| Error::parse_error(format!("invalid frontmatter: {}", e)))
}

/// Load a document from raw file content
pub fn parse_document(collection: Collection, id: &str, raw: &str) -> Result<Document> {
    let (yaml, body) = split_frontmatter(raw);
    let frontmatter = match yaml {
        Some(yaml) => parse_frontmatter(yaml)
            .map_err(|e| Error::parse_error(format!("{}/{}: {}", collection, id, e)))?,
        None => Frontmatter::default(),
    };
    Ok(Document::new(collection, id, body).with_frontmatter(frontmatter))
}
