//! Relative image paths are rewritten to where the asset sync publishes them.

use super::embeds::{MediaKind, media_kind};
use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, walk};
use crate::tree::{Node, NodeKind};
use vaultpress_core::{Collection, ContentLayout, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct FolderImages;

impl Transform for FolderImages {
    fn name(&self) -> &'static str {
        "folder-images"
    }

    fn apply(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()> {
        let collection = ctx.document.collection.asset_collection();
        let layout = ctx.document.layout();

        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            let NodeKind::Image { url, .. } = &visit.node.kind else {
                return Flow::Continue;
            };
            if let Some(public) = public_image_url(url, collection, &layout) {
                let mut image = visit.node.clone();
                if let NodeKind::Image { url, .. } = &mut image.kind {
                    *url = public;
                }
                editor.update(visit.path, image);
            }
            Flow::Continue
        });
        editor.commit(tree);
        Ok(())
    }
}

/// Published URL of a relative image, or `None` to leave it alone.
///
/// Absolute and external URLs, media handled by embeds and `.base`
/// references are skipped.
pub fn public_image_url(url: &str, collection: Collection, layout: &ContentLayout) -> Option<String> {
    if url.is_empty() || url.starts_with('/') || url.starts_with("http") {
        return None;
    }
    if matches!(
        media_kind(url),
        Some(MediaKind::Audio | MediaKind::Video | MediaKind::Pdf)
    ) || url.to_ascii_lowercase().ends_with(".base")
    {
        return None;
    }

    let path = url.strip_prefix("./").unwrap_or(url);
    Some(match layout {
        ContentLayout::Folder { slug } => {
            let clean = path
                .strip_prefix("images/")
                .or_else(|| path.strip_prefix("attachments/"))
                .unwrap_or(path);
            format!("/{}/{}/{}", collection, slug, clean)
        }
        ContentLayout::File if path.starts_with("attachments/") => format!("/{}/{}", collection, path),
        ContentLayout::File => format!("/{}/attachments/{}", collection, path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::run_pass_in;
    use crate::render::to_html;

    fn folder(slug: &str) -> ContentLayout {
        ContentLayout::Folder { slug: slug.into() }
    }

    #[test]
    fn test_folder_layout() {
        let layout = folder("trip");
        assert_eq!(
            public_image_url("./images/a.png", Collection::Posts, &layout).as_deref(),
            Some("/posts/trip/a.png")
        );
        assert_eq!(
            public_image_url("attachments/b.jpg", Collection::Posts, &layout).as_deref(),
            Some("/posts/trip/b.jpg")
        );
        assert_eq!(
            public_image_url("nested/c.png", Collection::Docs, &layout).as_deref(),
            Some("/docs/trip/nested/c.png")
        );
    }

    #[test]
    fn test_file_layout() {
        let layout = ContentLayout::File;
        assert_eq!(
            public_image_url("attachments/b.jpg", Collection::Pages, &layout).as_deref(),
            Some("/pages/attachments/b.jpg")
        );
        assert_eq!(
            public_image_url("d.png", Collection::Posts, &layout).as_deref(),
            Some("/posts/attachments/d.png")
        );
    }

    #[test]
    fn test_skipped_urls() {
        let layout = ContentLayout::File;
        for url in ["/abs.png", "https://x.y/a.png", "song.MP3", "clip.mp4", "doc.pdf", "home.base", ""] {
            assert_eq!(public_image_url(url, Collection::Posts, &layout), None, "{}", url);
        }
    }

    #[test]
    fn test_special_pages_use_pages_assets() {
        let tree = run_pass_in(&FolderImages, Collection::Special, "home", "![logo](logo.svg)");
        assert_eq!(
            to_html(&tree),
            "<p><img src=\"/pages/attachments/logo.svg\" alt=\"logo\" /></p>\n"
        );
    }

    #[test]
    fn test_folder_post_from_id() {
        let tree = run_pass_in(&FolderImages, Collection::Posts, "trip/index", "![x](images/x.png)");
        assert!(to_html(&tree).contains("src=\"/posts/trip/x.png\""));
    }
}
