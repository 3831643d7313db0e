//! The site: a loaded corpus plus everything needed to render it.

use crate::theme::{ThemeProvider, ThemeRegistry};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use vaultpress_bases::{BaseEmbed, BaseStore, DirBaseStore, Item, ItemSource, TableRenderer, list_vault_files};
use vaultpress_core::validation::FrontmatterValidator;
use vaultpress_core::{
    Collection, Corpus, Document, Error, LinkedMention, Result, SiteConfig, ValidationReport,
};
use vaultpress_graph::{LinkGraph, find_backlinks};
use vaultpress_parser::{Pipeline, ReadingTime, TransformContext, calculate_reading_time, parse_document, validate_wikilinks};
use walkdir::WalkDir;

/// Extensions loaded as documents
const DOCUMENT_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// A base placeholder left by the embeds pass: outer div with its config
/// attribute, up to the unindented closing tag
static BASE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="base-embed base-embed--table" data-base-config='([^']*)'>.*?\n</div>"#).unwrap()
});

/// One rendered document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub html: String,
    pub reading_time: ReadingTime,
    pub tags: Vec<String>,
}

/// Loaded content and the collaborators that render it
pub struct Site {
    config: SiteConfig,
    corpus: Corpus,
    bases: Box<dyn BaseStore>,
    pipeline: Pipeline,
    themes: ThemeRegistry,
    file_names: Vec<String>,
}

impl Site {
    /// Site over an already-built corpus, reading bases from the configured directory
    pub fn new(config: SiteConfig, corpus: Corpus) -> Result<Self> {
        config.validate()?;
        let bases = DirBaseStore::new(config.bases_path());
        Ok(Self {
            config,
            corpus,
            bases: Box::new(bases),
            pipeline: Pipeline::standard(),
            themes: ThemeRegistry::new(),
            file_names: Vec::new(),
        })
    }

    /// Load every collection under `config.content_root`.
    ///
    /// Files with broken frontmatter are logged and skipped.
    pub fn load(config: SiteConfig) -> Result<Self> {
        let root = config.content_root.clone();
        if !root.is_dir() {
            return Err(Error::file_not_found(root));
        }

        let mut documents = Vec::new();
        for collection in Collection::ALL {
            let dir = root.join(collection.as_str());
            if dir.is_dir() {
                documents.extend(load_collection(&root, &dir, collection)?);
            }
        }
        let corpus = Corpus::new(documents);
        log::info!("Loaded {} documents from {}", corpus.len(), root.display());

        let file_names = list_vault_files(&root)?;
        Ok(Self::new(config, corpus)?.with_file_names(file_names))
    }

    /// Replace the `.base` file source
    pub fn with_base_store(mut self, store: impl BaseStore + 'static) -> Self {
        self.bases = Box::new(store);
        self
    }

    /// Replace the vault file list files-mode tables show
    pub fn with_file_names(mut self, names: Vec<String>) -> Self {
        self.file_names = names;
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Register an extra theme; select it through `SiteConfig::theme`
    pub fn with_theme(mut self, theme: impl ThemeProvider + 'static) -> Self {
        self.themes.register(theme);
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render a document by collection and id
    pub fn render(&self, collection: Collection, id: &str) -> Result<RenderedPage> {
        let document = self
            .corpus
            .get(collection, id)
            .ok_or_else(|| Error::not_found(format!("{}/{}", collection, id)))?;
        self.render_document(document)
    }

    /// Run the pipeline over `document` and fill in its base tables
    pub fn render_document(&self, document: &Document) -> Result<RenderedPage> {
        let ctx = TransformContext::new(document, &self.corpus, self.bases.as_ref(), &self.config);
        let html = self.pipeline.render_document(&ctx)?;
        Ok(RenderedPage {
            title: document.title().to_string(),
            slug: document.slug().to_string(),
            url: document.url(),
            html: self.resolve_base_embeds(&html),
            reading_time: calculate_reading_time(&document.body),
            tags: document.frontmatter.tags.clone(),
        })
    }

    /// Replace each base placeholder's loading state with its table.
    ///
    /// The outer container and its config attribute are kept.
    pub fn resolve_base_embeds(&self, html: &str) -> String {
        let renderer = TableRenderer::new(self.config.files_table_limit);
        BASE_PLACEHOLDER
            .replace_all(html, |caps: &Captures| {
                let attribute = &caps[1];
                match BaseEmbed::new(attribute).render(&renderer, self) {
                    Some(table) => format!(
                        "<div class=\"base-embed base-embed--table\" data-base-config='{}'>{}</div>",
                        attribute, table
                    ),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// CSS custom properties of the configured theme inside `:root`
    pub fn stylesheet(&self) -> String {
        let palette = self.themes.get(&self.config.theme).palette();
        let body: String = palette
            .css_variables()
            .lines()
            .map(|line| format!("  {}\n", line))
            .collect();
        format!(":root {{\n{}}}\n", body)
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Posts linking to `slug`, with excerpts around the link
    pub fn backlinks(&self, slug: &str) -> Vec<LinkedMention> {
        find_backlinks(&self.corpus, slug, &self.config.excerpt)
    }

    pub fn link_graph(&self) -> LinkGraph {
        LinkGraph::from_corpus(&self.corpus)
    }

    /// Unresolved wikilinks in one document
    pub fn validate_links(&self, document: &Document) -> ValidationReport {
        validate_wikilinks(&document.body, self.corpus.posts()).to_report(&document.id)
    }

    /// Frontmatter and link problems across every document
    pub fn check(&self) -> ValidationReport {
        let validator = FrontmatterValidator::new();
        let mut report = ValidationReport::new();
        for document in self.corpus.documents() {
            report.merge(validator.validate(document));
            report.merge(self.validate_links(document));
        }
        report
    }

    fn is_published(&self, document: &Document) -> bool {
        self.config.include_drafts || !document.frontmatter.draft
    }
}

impl ItemSource for Site {
    fn items(&self, collection: Collection) -> Result<Vec<Item>> {
        let documents: Vec<&Document> = match collection {
            Collection::Posts => self.corpus.visible_posts(self.config.include_drafts),
            other => self
                .corpus
                .collection(other)
                .filter(|d| self.is_published(d))
                .collect(),
        };
        documents.into_iter().map(document_item).collect()
    }

    fn file_names(&self) -> Result<Vec<String>> {
        Ok(self.file_names.clone())
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("content_root", &self.config.content_root)
            .field("documents", &self.corpus.len())
            .field("pipeline", &self.pipeline)
            .field("themes", &self.themes)
            .finish_non_exhaustive()
    }
}

/// Frontmatter fields plus `id`, `url` and the display `title`
fn document_item(document: &Document) -> Result<Item> {
    let mut item = match serde_json::to_value(&document.frontmatter)? {
        Value::Object(map) => map,
        _ => Item::new(),
    };
    item.insert("id".to_string(), Value::String(document.id.clone()));
    item.insert("url".to_string(), Value::String(document.url()));
    item.insert("title".to_string(), Value::String(document.title().to_string()));
    Ok(item)
}

fn load_collection(root: &Path, dir: &Path, collection: Collection) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::other(format!("Failed to walk {}: {}", dir.display(), e)))?;
        let path = entry.path();
        let is_document = entry.file_type().is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext));
        if !is_document {
            continue;
        }

        let Some(id) = document_id(dir, path) else {
            continue;
        };
        let raw = std::fs::read_to_string(path)?;
        match parse_document(collection, &id, &raw) {
            Ok(document) => {
                let relative = path.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| PathBuf::from(path));
                documents.push(document.with_path(relative));
            }
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(documents)
}

/// `posts/trip/index.md` under `posts/` becomes `trip/index`
fn document_id(dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vaultpress_bases::MemoryBaseStore;
    use vaultpress_core::Frontmatter;

    fn post(id: &str, title: &str, body: &str) -> Document {
        Document::new(Collection::Posts, id, body)
            .with_frontmatter(Frontmatter::titled(title).with_date("2024-03-05"))
    }

    fn site(documents: Vec<Document>) -> Site {
        Site::new(SiteConfig::default(), Corpus::new(documents)).unwrap()
    }

    #[test]
    fn test_document_id() {
        let dir = Path::new("content/posts");
        assert_eq!(document_id(dir, Path::new("content/posts/trip/index.md")).as_deref(), Some("trip/index"));
        assert_eq!(document_id(dir, Path::new("content/posts/hello.mdx")).as_deref(), Some("hello"));
        assert_eq!(document_id(dir, Path::new("elsewhere/x.md")), None);
    }

    #[test]
    fn test_render_unknown_document() {
        let err = site(vec![]).render(Collection::Posts, "ghost").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_render_document_page() {
        let site = site(vec![post("a", "Post A", "See [[b]]."), post("b", "Post B", "")]);
        let page = site.render(Collection::Posts, "a").unwrap();
        assert_eq!(page.title, "Post A");
        assert_eq!(page.url, "/posts/a");
        assert_eq!(page.reading_time.minutes, 1);
        assert!(page.html.contains("href=\"/posts/b\""));
    }

    #[test]
    fn test_items_hide_drafts_and_expose_fields() {
        let mut draft = post("draft", "Draft", "");
        draft.frontmatter.draft = true;
        let mut about = Document::new(Collection::Pages, "about", "");
        about.frontmatter.extra.insert("section".into(), Value::String("meta".into()));
        let site = site(vec![post("a", "Post A", ""), draft, about]);

        let posts = site.items(Collection::Posts).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["url"], "/posts/a");
        assert_eq!(posts[0]["date"], "2024-03-05");

        let pages = site.items(Collection::Pages).unwrap();
        assert_eq!(pages[0]["title"], "about");
        assert_eq!(pages[0]["section"], "meta");
    }

    #[test]
    fn test_base_embed_resolved_into_table() {
        let base = "views:\n  - type: table\n    name: Posts\n    filters:\n      and:\n        - file.folder.startsWith(\"posts\")\n    order:\n      - note.title\n";
        let site = site(vec![post("a", "Post A", ""), post("home", "Home", "![[home.base]]")])
            .with_base_store(MemoryBaseStore::new().with("home", base));

        let page = site.render(Collection::Posts, "home").unwrap();
        assert!(page.html.contains("data-base-config='"));
        assert!(page.html.contains("<td class=\"py-2 pr-4 text-primary-900 dark:text-primary-100 whitespace-nowrap\">Post A</td>"));
        assert!(!page.html.contains("Loading base"));
    }

    #[test]
    fn test_unreadable_base_config_shows_error_placeholder() {
        let html = "<div class=\"base-embed base-embed--table\" data-base-config='not json'>\n  <div>loading</div>\n</div>";
        let resolved = site(vec![]).resolve_base_embeds(html);
        assert!(resolved.contains("Failed to load base."));
        assert!(resolved.starts_with("<div class=\"base-embed base-embed--table\" data-base-config='not json'>"));
    }

    #[test]
    fn test_files_mode_uses_file_names() {
        let html = "<div class=\"base-embed base-embed--table\" data-base-config='{\"files\":true}'>\n</div>";
        let site = site(vec![]).with_file_names(vec!["beta".into(), "Alpha".into()]);
        let resolved = site.resolve_base_embeds(html);
        let alpha = resolved.find("Alpha").unwrap();
        let beta = resolved.find("beta").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn test_validate_links_and_check() {
        let site = site(vec![post("a", "Post A", "[[b]] and [[missing]]"), post("b", "Post B", "")]);
        let report = site.validate_links(site.corpus().find_post("a").unwrap());
        assert_eq!(report.total_issues(), 1);
        assert!(site.check().total_issues() >= 1);
    }

    #[test]
    fn test_stylesheet_uses_configured_theme() {
        let config = SiteConfig::builder().theme("oxygen").build().unwrap();
        let site = Site::new(config, Corpus::default()).unwrap();
        let css = site.stylesheet();
        assert!(css.starts_with(":root {\n  --color-primary-50: #f8fafc;\n"));
        assert!(css.contains("  --color-highlight-500: #0ea5e9;\n"));
        assert!(css.ends_with("}\n"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("posts/trip")).unwrap();
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::create_dir_all(root.join("bases")).unwrap();
        fs::write(root.join("posts/hello.md"), "---\ntitle: Hello\ndate: 2024-01-02\n---\nSee [[trip]].").unwrap();
        fs::write(root.join("posts/trip/index.md"), "---\ntitle: Trip\ndate: 2024-01-03\n---\nBack to [[hello]].").unwrap();
        fs::write(root.join("posts/broken.md"), "---\ntitle: [unclosed\n---\nbody").unwrap();
        fs::write(root.join("pages/about.md"), "About me").unwrap();
        fs::write(root.join("bases/home.base"), "views: []").unwrap();

        let config = SiteConfig::builder().content_root(root).build().unwrap();
        let site = Site::load(config).unwrap();

        assert_eq!(site.corpus().len(), 3);
        let trip = site.corpus().find_post("trip").unwrap();
        assert_eq!(trip.id, "trip/index");
        assert_eq!(trip.path.as_deref(), Some(Path::new("posts/trip/index.md")));
        assert_eq!(site.backlinks("trip")[0].slug, "hello");
        assert!(site.file_names().unwrap().contains(&"about".to_string()));
    }

    #[test]
    fn test_load_missing_root() {
        let config = SiteConfig::builder().content_root("/definitely/not/here").build().unwrap();
        assert!(matches!(Site::load(config), Err(Error::FileNotFound { .. })));
    }
}
