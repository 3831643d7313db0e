//! Integration tests for vaultpress

use std::fs;
use tempfile::TempDir;
use vaultpress::bases::MemoryBaseStore;
use vaultpress::prelude::*;

fn post(id: &str, title: &str, body: &str) -> Document {
    Document::new(Collection::Posts, id, body)
        .with_frontmatter(Frontmatter::titled(title).with_date("2024-05-01"))
}

/// Helper to create a vault on disk
fn create_test_vault() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    for dir in ["posts/road-trip/attachments", "pages", "bases", ".obsidian"] {
        fs::create_dir_all(root.join(dir)).expect("Failed to create dir");
    }
    fs::write(
        root.join("posts/welcome.md"),
        "---\ntitle: Welcome\ndate: 2024-01-01\ntags: [intro]\n---\n\
         Start with the [[road-trip|trip notes]] or read [[Missing Post]].\n",
    )
    .expect("Failed to write welcome.md");
    fs::write(
        root.join("posts/road-trip/index.md"),
        "---\ntitle: Road Trip\ndate: 2024-02-01\n---\n\
         ## Day 1\n\n![[map.png]]\n\nBack to [[welcome]].\n",
    )
    .expect("Failed to write road-trip");
    fs::write(root.join("posts/road-trip/attachments/map.png"), b"png").expect("Failed to write map");
    fs::write(root.join("pages/about.md"), "---\ntitle: About\n---\n![[home.base]]\n")
        .expect("Failed to write about.md");
    fs::write(
        root.join("bases/home.base"),
        "views:\n  - type: table\n    name: Posts\n    filters:\n      and:\n        - file.folder.startsWith(\"posts\")\n    order:\n      - note.title\n      - note.date\n    sort:\n      - property: date\n        direction: DESC\n",
    )
    .expect("Failed to write home.base");
    fs::write(root.join(".obsidian/app.json"), "{}").expect("Failed to write settings");

    temp_dir
}

// ==================== Backlinks ====================

#[test]
fn test_single_backlink_with_excerpt() {
    let corpus = Corpus::new(vec![
        Document::new(Collection::Posts, "a", "See [[b]] for more"),
        Document::new(Collection::Posts, "b", ""),
    ]);
    let site = Site::new(SiteConfig::default(), corpus).unwrap();

    let mentions = site.backlinks("b");
    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].slug, "a");
    assert_eq!(mentions[0].title, "a");
    assert_eq!(mentions[0].excerpt, "See [[b]] for more");
    assert!(site.backlinks("a").is_empty());
}

#[test]
fn test_graph_matches_backlinks() {
    let corpus = Corpus::new(vec![
        post("a", "A", "[[c]]"),
        post("b", "B", "[link](posts/c.md)"),
        post("c", "C", "nothing"),
    ]);
    let site = Site::new(SiteConfig::default(), corpus).unwrap();

    let graph = site.link_graph();
    let sources: Vec<String> = graph.backlinks("c").into_iter().map(|(s, _)| s).collect();
    assert_eq!(sources, vec!["a".to_string(), "b".to_string()]);

    let mut mentioned: Vec<String> = site.backlinks("c").into_iter().map(|m| m.slug).collect();
    mentioned.sort();
    assert_eq!(mentioned, sources);
}

// ==================== Rendering ====================

#[test]
fn test_full_render() {
    let corpus = Corpus::new(vec![post(
        "guide",
        "Guide",
        "%%draft note%%Intro with ==key== ideas and #rust today\n\n\
         > [!tip]\n> Body text\n\n\
         ## Next Steps\n\n\
         [[Other Post|other]] and [jump](#Next%20Steps)\n\n\
         `[[not a link]]`\n",
    )]);
    let site = Site::new(SiteConfig::default(), corpus).unwrap();
    let page = site.render(Collection::Posts, "guide").unwrap();
    let html = &page.html;

    assert!(!html.contains("draft note"));
    assert!(html.contains("<mark>key</mark>"));
    assert!(html.contains("href=\"/posts/tag/rust\""));
    assert!(html.contains("<div class=\"callout callout-tip\">"));
    assert!(html.contains("<h2 id=\"next-steps\">"));
    assert!(html.contains("href=\"/posts/other-post\""));
    assert!(html.contains("href=\"#next-steps\""));
    assert!(html.contains("<code>[[not a link]]</code>"));
    assert_eq!(page.url, "/posts/guide");
}

#[test]
fn test_custom_pipeline() {
    let corpus = Corpus::new(vec![post("a", "A", "==kept== [[b]]")]);
    let pipeline = Pipeline::new().with_pass(vaultpress::parser::passes::Wikilinks);
    let site = Site::new(SiteConfig::default(), corpus)
        .unwrap()
        .with_pipeline(pipeline);

    let page = site.render(Collection::Posts, "a").unwrap();
    assert!(page.html.contains("==kept=="));
    assert!(page.html.contains("class=\"wikilink\""));
}

#[test]
fn test_base_embed_from_memory_store() {
    let corpus = Corpus::new(vec![
        post("first", "First", ""),
        post("second", "Second", ""),
        Document::new(Collection::Pages, "index", "![[home.base|limit=1]]"),
    ]);
    let base = "views:\n  - type: table\n    name: Posts\n    filters:\n      and:\n        - file.folder.startsWith(\"posts\")\n    order:\n      - note.title\n";
    let site = Site::new(SiteConfig::default(), corpus)
        .unwrap()
        .with_base_store(MemoryBaseStore::new().with("home", base));

    let page = site.render(Collection::Pages, "index").unwrap();
    assert_eq!(page.url, "/");
    assert_eq!(page.html.matches("<tr class=\"border-b border-primary-200/60").count(), 1);
    assert!(page.html.contains(">First</td>"));
}

// ==================== Loading ====================

#[test]
fn test_load_vault_from_disk() {
    let vault = create_test_vault();
    let config = SiteConfig::builder()
        .content_root(vault.path())
        .build()
        .expect("Failed to build config");
    let site = Site::load(config).expect("Failed to load site");

    assert_eq!(site.corpus().len(), 3);
    assert_eq!(site.corpus().posts().count(), 2);

    let trip = site.render(Collection::Posts, "road-trip/index").unwrap();
    assert_eq!(trip.url, "/posts/road-trip");
    assert!(trip.html.contains("src=\"/posts/road-trip/map.png\""));

    let mentions = site.backlinks("road-trip");
    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].title, "Welcome");

    let about = site.render(Collection::Pages, "about").unwrap();
    let road = about.html.find(">Road Trip</td>").expect("road trip row");
    let welcome = about.html.find(">Welcome</td>").expect("welcome row");
    assert!(road < welcome, "sorted by date descending");
    assert!(about.html.contains(">2/1/2024</td>"));
}

#[test]
fn test_vault_report_flags_dangling_links() {
    let vault = create_test_vault();
    let config = SiteConfig::builder().content_root(vault.path()).build().unwrap();
    let site = Site::load(config).unwrap();

    let report = site.check();
    assert!(
        report
            .issues
            .iter()
            .any(|issue| issue.message.contains("[[Missing Post]]"))
    );
}
