//! Linked mentions: which posts reference a target, with context.

use crate::excerpt::create_excerpt_around_link;
use vaultpress_core::{Corpus, ExcerptConfig, LinkedMention};
use vaultpress_parser::{extract_standard_links, extract_wikilinks};

/// Every other post whose links resolve to `target_slug`, in corpus order.
///
/// The first matching link (wikilinks before standard links) anchors the
/// excerpt. Backlinks are posts-only.
pub fn find_backlinks(corpus: &Corpus, target_slug: &str, config: &ExcerptConfig) -> Vec<LinkedMention> {
    let mentions: Vec<LinkedMention> = corpus
        .posts()
        .filter(|post| post.slug() != target_slug && !post.body.is_empty())
        .filter_map(|post| {
            let link = extract_wikilinks(&post.body)
                .into_iter()
                .chain(extract_standard_links(&post.body))
                .find(|link| link.slug == target_slug)?;
            Some(LinkedMention {
                title: post.title().to_string(),
                slug: post.slug().to_string(),
                excerpt: create_excerpt_around_link(&post.body, &link.link, config),
            })
        })
        .collect();

    log::debug!("Found {} linked mentions of {}", mentions.len(), target_slug);
    mentions
}
