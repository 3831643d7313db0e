//! Post link graph using petgraph

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use vaultpress_core::{Corpus, LinkMatch};
use vaultpress_parser::extract_all_internal_links;

/// Node index type for graph
type NodeIndex = petgraph::graph::NodeIndex;

/// Directed graph of posts: nodes are post slugs, edges are links
pub struct LinkGraph {
    graph: DiGraph<String, LinkMatch>,

    /// Map from post slug to node index
    slug_index: HashMap<String, NodeIndex>,
}

impl LinkGraph {
    /// Create an empty link graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            slug_index: HashMap::new(),
        }
    }

    /// Build the graph over every post in the corpus.
    ///
    /// All posts become nodes first so links can point forward.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut graph = Self::new();
        for post in corpus.posts() {
            graph.add_post(post.slug());
        }
        for post in corpus.posts() {
            graph.update_links(post.slug(), &post.body);
        }
        log::debug!(
            "Built link graph: {} posts, {} links",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Add a post node, returning the existing one for a known slug
    pub fn add_post(&mut self, slug: &str) -> NodeIndex {
        if let Some(&idx) = self.slug_index.get(slug) {
            return idx;
        }
        let idx = self.graph.add_node(slug.to_string());
        self.slug_index.insert(slug.to_string(), idx);
        idx
    }

    /// Remove a post and every edge touching it
    pub fn remove_post(&mut self, slug: &str) {
        let Some(idx) = self.slug_index.remove(slug) else {
            return;
        };
        // remove_node swaps the last node into the freed index
        let last = NodeIndex::new(self.graph.node_count() - 1);
        self.graph.remove_node(idx);
        if last != idx
            && let Some(moved) = self.graph.node_weight(idx)
        {
            self.slug_index.insert(moved.clone(), idx);
        }
    }

    /// Replace a post's outgoing edges with the links found in `body`.
    ///
    /// Links to unknown posts and self-links are not recorded.
    pub fn update_links(&mut self, source: &str, body: &str) {
        let source_idx = self.add_post(source);

        // remove_edge swaps the last edge into the freed index; go high to low
        let mut outgoing: Vec<_> = self.graph.edges(source_idx).map(|e| e.id()).collect();
        outgoing.sort_unstable_by(|a, b| b.cmp(a));
        for edge_id in outgoing {
            self.graph.remove_edge(edge_id);
        }

        for link in extract_all_internal_links(body) {
            if link.slug == source {
                continue;
            }
            match self.slug_index.get(&link.slug) {
                Some(&target_idx) => {
                    self.graph.add_edge(source_idx, target_idx, link);
                }
                None => log::debug!("Unresolved link in {}: {}", source, link.link),
            }
        }
    }

    /// Posts linking to `slug`, with the links they use, ordered by slug
    pub fn backlinks(&self, slug: &str) -> Vec<(String, Vec<LinkMatch>)> {
        let Some(&target_idx) = self.slug_index.get(slug) else {
            return Vec::new();
        };
        self.group_edges(
            self.graph
                .edges_directed(target_idx, Incoming)
                .map(|edge| (edge.source(), edge.weight())),
        )
    }

    /// Posts `slug` links to, ordered by slug
    pub fn forward_links(&self, slug: &str) -> Vec<(String, Vec<LinkMatch>)> {
        let Some(&source_idx) = self.slug_index.get(slug) else {
            return Vec::new();
        };
        self.group_edges(
            self.graph
                .edges(source_idx)
                .map(|edge| (edge.target(), edge.weight())),
        )
    }

    fn group_edges<'a>(
        &self,
        edges: impl Iterator<Item = (NodeIndex, &'a LinkMatch)>,
    ) -> Vec<(String, Vec<LinkMatch>)> {
        edges
            .fold(BTreeMap::new(), |mut acc, (idx, link)| {
                acc.entry(self.graph[idx].clone())
                    .or_insert_with(Vec::new)
                    .push(link.clone());
                acc
            })
            .into_iter()
            .collect()
    }

    /// Posts with no incoming or outgoing links, sorted
    pub fn orphaned_posts(&self) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph.edges_directed(idx, Incoming).next().is_none()
                    && self.graph.edges(idx).next().is_none()
            })
            .map(|idx| self.graph[idx].clone())
            .collect();
        orphans.sort();
        orphans
    }

    /// Groups of posts that reach each other through links
    pub fn cycles(&self) -> Vec<Vec<String>> {
        kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut slugs: Vec<String> = scc.iter().map(|&idx| self.graph[idx].clone()).collect();
                slugs.sort();
                slugs
            })
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let node_count = self.graph.node_count();
        let edge_count = self.graph.edge_count();

        let average_links_per_post = if node_count > 0 {
            edge_count as f64 / node_count as f64
        } else {
            0.0
        };

        GraphStats {
            total_posts: node_count,
            total_links: edge_count,
            orphaned_posts: self.orphaned_posts().len(),
            average_links_per_post,
        }
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slug_index.contains_key(slug)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_posts: usize,
    pub total_links: usize,
    pub orphaned_posts: usize,
    pub average_links_per_post: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultpress_core::{Collection, Document};

    fn corpus(posts: &[(&str, &str)]) -> Corpus {
        Corpus::new(
            posts
                .iter()
                .map(|(id, body)| Document::new(Collection::Posts, *id, *body))
                .collect(),
        )
    }

    #[test]
    fn test_from_corpus() {
        let graph = LinkGraph::from_corpus(&corpus(&[
            ("a", "See [[b]] and [c](posts/c.md)"),
            ("b", "Back to [[a]]"),
            ("c", ""),
        ]));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_pages_are_not_nodes() {
        let corpus = Corpus::new(vec![
            Document::new(Collection::Posts, "a", "[[about]]"),
            Document::new(Collection::Pages, "about", "[[a]]"),
        ]);
        let graph = LinkGraph::from_corpus(&corpus);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_backlinks_grouped_by_source() {
        let graph = LinkGraph::from_corpus(&corpus(&[
            ("z-post", "[[target]]"),
            ("a-post", "[[Target|it]] [[a-post]]"),
            ("target", ""),
        ]));
        let backlinks = graph.backlinks("target");
        let sources: Vec<_> = backlinks.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(sources, vec!["a-post", "z-post"]);
        assert_eq!(backlinks[0].1[0].display, "it");
        assert!(graph.backlinks("a-post").is_empty());
        assert!(graph.backlinks("missing").is_empty());
    }

    #[test]
    fn test_forward_links_and_folder_posts() {
        let graph = LinkGraph::from_corpus(&corpus(&[
            ("trip/index", ""),
            ("home", "[[trip/index]] and [[nowhere]]"),
        ]));
        let forward = graph.forward_links("home");
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].0, "trip");
    }

    #[test]
    fn test_update_links_replaces_edges() {
        let mut graph = LinkGraph::from_corpus(&corpus(&[("a", "[[b]]"), ("b", ""), ("c", "")]));
        graph.update_links("a", "[[c]]");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.forward_links("a")[0].0, "c");
    }

    #[test]
    fn test_remove_post_keeps_index_consistent() {
        let mut graph = LinkGraph::from_corpus(&corpus(&[("a", "[[c]]"), ("b", ""), ("c", "[[a]]")]));
        graph.remove_post("a");
        assert!(!graph.contains("a"));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        graph.update_links("b", "[[c]]");
        assert_eq!(graph.backlinks("c")[0].0, "b");
    }

    #[test]
    fn test_orphans_cycles_and_stats() {
        let graph = LinkGraph::from_corpus(&corpus(&[
            ("a", "[[b]]"),
            ("b", "[[a]]"),
            ("lonely", ""),
        ]));
        assert_eq!(graph.orphaned_posts(), vec!["lonely".to_string()]);
        assert_eq!(graph.cycles(), vec![vec!["a".to_string(), "b".to_string()]]);

        let stats = graph.stats();
        assert_eq!(stats.total_posts, 3);
        assert_eq!(stats.total_links, 2);
        assert_eq!(stats.orphaned_posts, 1);
    }
}
