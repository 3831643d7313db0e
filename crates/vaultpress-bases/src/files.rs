//! Vault file enumeration for files-mode tables.

use std::path::Path;
use vaultpress_core::{Error, Result};
use walkdir::WalkDir;

/// Every file name under `root`, as a files-mode base shows them.
///
/// Skips `.obsidian` and anything inside a `bases` directory. Notes lose
/// their `.md` extension, other files keep theirs. Duplicates are kept.
/// Sorted case-insensitively.
pub fn list_vault_files(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(Error::file_not_found(root));
    }

    let mut names = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".obsidian");

    for entry in walker {
        let entry = entry.map_err(|e| Error::other(format!("Failed to walk vault: {}", e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let in_bases = relative
            .parent()
            .is_some_and(|dir| dir.components().any(|c| c.as_os_str() == "bases"));
        if in_bases {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let name = if name.to_ascii_lowercase().ends_with(".md") {
            name[..name.len() - 3].to_string()
        } else {
            name.into_owned()
        };
        names.push(name);
    }

    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    log::debug!("Listed {} vault files under {}", names.len(), root.display());
    Ok(names)
}
