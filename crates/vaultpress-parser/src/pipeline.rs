//! Ordered pass list and the Markdown → HTML entry points.

use crate::passes::{
    Callouts, Comments, Embeds, FolderImages, HeadingAnchors, ImageAttributes, ImageCaptions,
    ImageGrids, InlineTags, Marks, StandardLinks, Transform, TransformContext, Wikilinks,
};
use crate::render::to_html;
use crate::tree::{Node, parse_markdown};
use vaultpress_core::Result;

/// A sequence of passes applied in insertion order
pub struct Pipeline {
    passes: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// Pipeline with no passes; renders plain CommonMark
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// The full publishing pipeline.
    ///
    /// Comments go first so commented-out syntax never reaches later passes;
    /// anchors go last so they see every link the others produced.
    pub fn standard() -> Self {
        Self::new()
            .with_pass(Comments)
            .with_pass(Wikilinks)
            .with_pass(FolderImages)
            .with_pass(Embeds)
            .with_pass(ImageCaptions)
            .with_pass(Callouts)
            .with_pass(InlineTags)
            .with_pass(ImageGrids)
            .with_pass(StandardLinks)
            .with_pass(Marks)
            .with_pass(ImageAttributes)
            .with_pass(HeadingAnchors)
    }

    pub fn with_pass(mut self, pass: impl Transform + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Apply every pass to `tree` in order, stopping at the first error
    pub fn run(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()> {
        for pass in &self.passes {
            log::debug!("Applying {} to {}", pass.name(), ctx.document.id);
            pass.apply(tree, ctx).inspect_err(|e| {
                log::warn!("Pass {} failed on {}: {}", pass.name(), ctx.document.id, e);
            })?;
        }
        Ok(())
    }

    /// Parse, transform and render arbitrary Markdown in the context's document
    pub fn render_markdown(&self, markdown: &str, ctx: &TransformContext<'_>) -> Result<String> {
        let mut tree = parse_markdown(markdown);
        self.run(&mut tree, ctx)?;
        Ok(to_html(&tree))
    }

    /// Render the context document's body
    pub fn render_document(&self, ctx: &TransformContext<'_>) -> Result<String> {
        self.render_markdown(&ctx.document.body, ctx)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("passes", &self.pass_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultpress_bases::MemoryBaseStore;
    use vaultpress_core::{Collection, Corpus, Document, SiteConfig};

    fn render(body: &str) -> String {
        let document = Document::new(Collection::Posts, "trip", body);
        let corpus = Corpus::new(vec![document.clone(), Document::new(Collection::Posts, "my-post", "")]);
        let bases = MemoryBaseStore::new();
        let config = SiteConfig::default();
        let ctx = TransformContext::new(&document, &corpus, &bases, &config);
        Pipeline::standard().render_document(&ctx).unwrap()
    }

    #[test]
    fn test_standard_order() {
        assert_eq!(
            Pipeline::standard().pass_names(),
            vec![
                "comments",
                "wikilinks",
                "folder-images",
                "embeds",
                "image-captions",
                "callouts",
                "inline-tags",
                "image-grids",
                "standard-links",
                "marks",
                "image-attributes",
                "heading-anchors",
            ]
        );
    }

    #[test]
    fn test_empty_pipeline_is_commonmark() {
        let document = Document::new(Collection::Posts, "p", "");
        let corpus = Corpus::default();
        let bases = MemoryBaseStore::new();
        let config = SiteConfig::default();
        let ctx = TransformContext::new(&document, &corpus, &bases, &config);
        let html = Pipeline::new().render_markdown("[[x]] ==y==", &ctx).unwrap();
        assert_eq!(html, "<p>[[x]] ==y==</p>\n");
    }

    #[test]
    fn test_full_render() {
        let html = render(
            "## Day One\n\nSee [[My Post]] and #travel ==now== %%hidden%%\n\n> [!tip] Pack light\n> Bring [[#Day One|the list]]\n",
        );
        assert!(html.contains("<h2 id=\"day-one\"><a href=\"#day-one\" class=\"anchor-link\""));
        assert!(html.contains("href=\"/posts/my-post\""));
        assert!(html.contains("href=\"/posts/tag/travel\""));
        assert!(html.contains("<mark>now</mark>"));
        assert!(!html.contains("hidden"));
        assert!(html.contains("Pack light"));
        assert!(html.contains("href=\"#day-one\""));
        assert!(html.contains(">the list</a>"));
        assert!(html.trim_end().ends_with("</div></div>"));
    }

    #[test]
    fn test_code_is_untouched() {
        let html = render("```\n[[My Post]] #tag ==x== %%c%%\n```\n");
        assert_eq!(
            html,
            "<pre><code>[[My Post]] #tag ==x== %%c%%\n</code></pre>\n"
        );
    }

    #[test]
    fn test_images_get_caption_and_lazy_loading() {
        let html = render("![[sunset.png|Dusk]]\n\n![a](a.png \"Shore\")");
        assert!(html.contains("loading=\"lazy\" decoding=\"async\""));
        assert!(html.contains("data-caption=\"Shore\""));
    }
}
