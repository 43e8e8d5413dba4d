// src/paths.rs

//! Path helpers for destinations and configured locations
//!
//! Destinations may not exist yet, so normalization here is lexical: `.`
//! components are dropped and `..` pops the previous component. Only
//! [`resolve_existing`] consults the filesystem.

use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `base` and normalize it lexically
pub fn absolutize(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.as_ref().join(path)
    };
    normalize_lexically(&joined)
}

/// Make `path` absolute against the current directory
pub fn absolutize_from_cwd(path: impl AsRef<Path>) -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    let cwd = if cwd.is_absolute() { cwd } else { PathBuf::from("/").join(cwd) };
    absolutize(path, cwd)
}

/// Remove `.` components and fold `..` components without touching the disk
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a drive prefix
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolve symlinks in the longest existing ancestor of `path`
///
/// Components below that ancestor are appended unchanged. Returns `path`
/// itself when no ancestor can be canonicalized.
pub fn resolve_existing(path: &Path) -> PathBuf {
    for ancestor in path.ancestors() {
        if let Ok(resolved) = fs::canonicalize(ancestor) {
            return match path.strip_prefix(ancestor) {
                Ok(rest) if !rest.as_os_str().is_empty() => resolved.join(rest),
                _ => resolved,
            };
        }
    }
    path.to_path_buf()
}

/// Expand a leading `~` and `$VAR` / `${VAR}` references in a path template
///
/// Unknown variables are left verbatim so that the resulting path is still
/// recognizable in diagnostics.
pub fn expand_user_path(template: &str) -> PathBuf {
    let expanded = expand_env_vars(template);
    if expanded == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = expanded
        .strip_prefix("~/")
        .or_else(|| expanded.strip_prefix("~\\"))
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(expanded)
}

fn expand_env_vars(template: &str) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(position) = rest.find('$') {
        output.push_str(&rest[..position]);
        let after = &rest[position + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };
        match env::var(name) {
            Ok(value) if !name.is_empty() => output.push_str(&value),
            _ => output.push_str(&rest[position..position + 1 + consumed]),
        }
        rest = &after[consumed..];
    }
    output.push_str(rest);
    output
}
