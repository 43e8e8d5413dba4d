// src/acquirers/ignores.rs

//! Gitignore rules discovered while walking directories
//!
//! Each directory's `.gitignore` is loaded on first use. A candidate path is
//! checked against the rule files of its ancestors, nearest first, up to the
//! enclosing repository root; the nearest file with a matching rule decides,
//! so negations in deeper files override broader rules above them.

use crate::paths::absolutize_from_cwd;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

const GITIGNORE_FILE: &str = ".gitignore";

#[derive(Debug)]
struct DirectoryRules {
    matcher: Option<Gitignore>,
    repository_root: bool,
}

/// Lazily populated gitignore rule sets keyed by directory
#[derive(Debug, Default)]
pub struct GitignoreRules {
    directories: HashMap<PathBuf, DirectoryRules>,
}

impl GitignoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` is excluded by the nearest applicable rule
    pub fn is_ignored(&mut self, path: &Path, is_dir: bool) -> bool {
        let path = absolutize_from_cwd(path);
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            let rules = self.rules_for(dir);
            if let Some(matcher) = &rules.matcher {
                let matched = matcher.matched_path_or_any_parents(&path, is_dir);
                if matched.is_ignore() {
                    return true;
                }
                if matched.is_whitelist() {
                    return false;
                }
            }
            if rules.repository_root {
                break;
            }
            ancestor = dir.parent();
        }
        false
    }

    fn rules_for(&mut self, dir: &Path) -> &DirectoryRules {
        self.directories
            .entry(dir.to_path_buf())
            .or_insert_with(|| DirectoryRules {
                matcher: load_matcher(dir),
                repository_root: dir.join(".git").exists(),
            })
    }
}

fn load_matcher(dir: &Path) -> Option<Gitignore> {
    let file = dir.join(GITIGNORE_FILE);
    if !file.is_file() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(dir);
    if let Some(e) = builder.add(&file) {
        warn!("Problem reading {}: {}", file.display(), e);
    }
    match builder.build() {
        Ok(matcher) if !matcher.is_empty() => Some(matcher),
        Ok(_) => None,
        Err(e) => {
            warn!("Ignoring invalid {}: {}", file.display(), e);
            None
        }
    }
}
