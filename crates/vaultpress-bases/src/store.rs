//! Lookup of `.base` files by name and embed resolution.

use crate::config::{BaseConfig, parse_shallow_config};
use crate::view::parse_base_file;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use vaultpress_core::{Error, Result};

/// Source of `.base` file contents keyed by base name (`home` for `home.base`)
pub trait BaseStore: Send + Sync {
    /// Raw text of the named base file
    fn load(&self, name: &str) -> Result<String>;
}

/// Reads `<dir>/<name>.base` from disk
#[derive(Debug, Clone)]
pub struct DirBaseStore {
    dir: PathBuf,
}

impl DirBaseStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BaseStore for DirBaseStore {
    fn load(&self, name: &str) -> Result<String> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." || name == "." {
            return Err(Error::invalid_path(format!("bad base name: {}", name)));
        }
        let path = self.dir.join(format!("{}.base", name));
        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}

/// In-memory base files, for tests and generated sites
#[derive(Debug, Clone, Default)]
pub struct MemoryBaseStore {
    files: HashMap<String, String>,
}

impl MemoryBaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a base file (builder style)
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(name.into(), text.into());
        self
    }
}

impl BaseStore for MemoryBaseStore {
    fn load(&self, name: &str) -> Result<String> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{}.base", name)))
    }
}

/// Resolve an embed target such as `bases/home.base|view=Recent;limit=5`.
///
/// The base name is the last path segment without `.base` (`home` when
/// empty). Alias parameters after `|` are applied first and win over the
/// file's view settings.
pub fn resolve_base_embed(target: &str, store: &dyn BaseStore) -> Result<BaseConfig> {
    let (path, params) = match target.split_once('|') {
        Some((path, params)) => (path, params),
        None => (target, ""),
    };

    let mut config = BaseConfig::table();
    config.apply_alias_params(params)?;

    let file_name = path.rsplit('/').next().unwrap_or(path);
    let name = strip_base_extension(file_name);
    let name = if name.is_empty() { "home" } else { name };

    let text = store.load(name)?;
    parse_base_file(&text)?.apply_to(&mut config);
    Ok(config)
}

/// Resolve the body of a ```` ```base ```` block.
///
/// Bodies declaring `views:` use the base-file grammar; anything else is
/// read as shallow `key: value` lines.
pub fn resolve_base_block(body: &str) -> Result<BaseConfig> {
    let declares_views = body.lines().any(|l| l.trim_end() == "views:");
    if declares_views {
        let mut config = BaseConfig::table();
        parse_base_file(body)?.apply_to(&mut config);
        Ok(config)
    } else {
        parse_shallow_config(body)
    }
}

fn strip_base_extension(name: &str) -> &str {
    let len = name.len();
    if len >= 5 && name.is_char_boundary(len - 5) && name[len - 5..].eq_ignore_ascii_case(".base") {
        &name[..len - 5]
    } else {
        name
    }
}
