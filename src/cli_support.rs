use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;

use crate::config::{ConfigContext, discover_per_file};
use crate::error::ConfigError;

/// Config for `path`: the global context when one was given, otherwise the
/// per-file discovery result, cached by the directory it was discovered from.
///
/// # Errors
/// Returns an error when per-file discovery fails to read or parse a config.
pub fn resolve_ctx(
    path: &Path,
    global: Option<&Arc<ConfigContext>>,
    cache: &mut HashMap<PathBuf, Arc<ConfigContext>>,
) -> Result<Arc<ConfigContext>, ConfigError> {
    if let Some(ctx) = global {
        return Ok(Arc::clone(ctx));
    }
    let key = if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    };
    if let Some(ctx) = cache.get(&key) {
        return Ok(Arc::clone(ctx));
    }
    let ctx = Arc::new(discover_per_file(path)?);
    cache.insert(key, Arc::clone(&ctx));
    Ok(ctx)
}

/// Expand directories into the files below them (respecting `.gitignore`);
/// explicit files are kept as given.
#[must_use]
pub fn gather_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for p in inputs {
        if p.is_dir() {
            let walker = WalkBuilder::new(p)
                .hidden(false)
                .ignore(true)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .follow_links(false)
                .build();
            for e in walker.flatten() {
                let fp = e.path().to_path_buf();
                if fp.is_file() {
                    files.push(fp);
                }
            }
        } else {
            files.push(p.clone());
        }
    }
    files
}

/// `-d` shorthand: a bare preset name stands for `extends: <name>`.
#[must_use]
pub fn expand_config_data(raw: &str) -> String {
    let is_mapping = raw.contains(": ") || raw.contains(":\n") || raw.ends_with(':');
    if !raw.is_empty() && !is_mapping && !raw.contains('{') {
        format!("extends: {raw}")
    } else {
        raw.to_owned()
    }
}
