//! Property-based tests for the link graph and excerpt truncation

use proptest::collection::vec;
use proptest::prelude::*;
use regex::Regex;
use vaultpress_core::{Collection, Corpus, Document, ExcerptConfig};
use vaultpress_graph::{LinkGraph, create_excerpt_around_link, truncate_excerpt};

/// Posts `p0..pn`, each linking to the next one around a ring
fn ring(size: usize) -> Corpus {
    (0..size)
        .map(|i| Document::new(Collection::Posts, format!("p{}", i), format!("Next: [[p{}]]", (i + 1) % size)))
        .collect()
}

/// A plain word, a wikilink or a standard post link
fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,8}",
        1 => "[c-z]{1,6}( [a-z]{1,6}){0,4}".prop_map(|name| format!("[[{}]]", name)),
        1 => ("[a-z]{1,6}( [a-z]{1,6}){0,2}", "[a-z]{1,8}")
            .prop_map(|(text, slug)| format!("[{}](posts/{}.md)", text, slug)),
    ]
}

/// Link syntax left over once every complete link is removed
fn has_half_link(text: &str) -> bool {
    let wikilinks = Regex::new(r"\[\[[^\]]+\]\]").unwrap();
    let markdown = Regex::new(r"\[[^\]]+\]\([^)]+\)").unwrap();
    let rest = wikilinks.replace_all(text, "");
    let rest = markdown.replace_all(&rest, "");
    rest.contains("[[") || rest.contains("]]") || rest.contains("](")
}

proptest! {
    #[test]
    fn ring_has_one_backlink_per_post(size in 2usize..30) {
        let graph = LinkGraph::from_corpus(&ring(size));
        prop_assert_eq!(graph.edge_count(), size);
        for i in 0..size {
            let backlinks = graph.backlinks(&format!("p{}", i));
            prop_assert_eq!(backlinks.len(), 1);
            prop_assert_eq!(&backlinks[0].0, &format!("p{}", (i + size - 1) % size));
        }
        prop_assert!(graph.orphaned_posts().is_empty());
        prop_assert_eq!(graph.cycles().len(), 1);
    }

    #[test]
    fn truncation_stays_under_ceiling(text in "[a-z \\[\\]()|]{0,400}") {
        let config = ExcerptConfig::default();
        let cut = truncate_excerpt(&text, &config);
        prop_assert!(cut.len() <= config.ceiling());
        prop_assert!(text.contains(&cut));
    }

    #[test]
    fn excerpt_keeps_links_whole(before in vec(segment(), 0..80), after in vec(segment(), 0..80)) {
        let content = format!("{} [[b]] {}", before.join(" "), after.join(" "));
        let config = ExcerptConfig::default();
        let excerpt = create_excerpt_around_link(&content, "b", &config);
        prop_assert!(!has_half_link(&excerpt), "{:?}", excerpt);
        prop_assert!(excerpt.len() <= config.ceiling());
    }
}
