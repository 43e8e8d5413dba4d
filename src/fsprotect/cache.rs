// src/fsprotect/cache.rs

//! Precomputed protection rules and path verification

use super::rules;
use super::{Protector, Reason, Status};
use crate::config::{self, ProtectionConfig};
use crate::error::{Error, Result};
use crate::paths::{absolutize_from_cwd, expand_user_path, resolve_existing};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Locations and patterns that share one protection reason
#[derive(Debug)]
struct Layer {
    reason: Reason,
    directories: Vec<PathBuf>,
    /// Patterns matched against the whole absolute path
    patterns: GlobSet,
    /// Patterns without a separator, matched against the file name
    name_patterns: GlobSet,
}

/// Outcome of matching one spelling of a path
enum Verdict {
    /// An explicit override switched protection off
    Released,
    Protected(Reason),
    Unmatched,
}

/// Per-directory overrides
#[derive(Debug)]
struct Supercession {
    base: PathBuf,
    ignore: GlobSet,
    protect: GlobSet,
}

/// Immutable protection rule set
#[derive(Debug)]
pub struct ProtectionCache {
    layers: Vec<Layer>,
    disablement: HashSet<OsString>,
    supercessions: Vec<Supercession>,
}

impl ProtectionCache {
    /// Build the cache for the current user
    pub fn from_config(config: &ProtectionConfig) -> Result<Self> {
        let home = dirs::home_dir();
        let app_config = config::user_configuration_directory();
        Self::build(config, home.as_deref(), app_config.as_deref())
    }

    /// Build the cache with explicit home and application configuration
    /// directories
    pub fn build(
        config: &ProtectionConfig,
        home: Option<&Path>,
        app_config_dir: Option<&Path>,
    ) -> Result<Self> {
        let mut layers = Vec::new();

        layers.push(layer(Reason::OsDirectory, rules::os_directories(), &[])?);
        if let Some(home) = home {
            layers.push(layer(
                Reason::PlatformSensitive,
                rules::platform_user_directories(home),
                &[],
            )?);
        }
        let credential_directories = home.map(rules::credential_directories).unwrap_or_default();
        let credential_patterns: Vec<String> =
            rules::CREDENTIAL_PATTERNS.iter().map(|p| p.to_string()).collect();
        layers.push(layer(
            Reason::Credentials,
            credential_directories,
            &credential_patterns,
        )?);
        layers.push(layer(
            Reason::VersionControl,
            Vec::new(),
            &rules::anywhere_patterns(rules::VERSION_CONTROL_DIRECTORIES),
        )?);
        layers.push(layer(
            Reason::Concealment,
            Vec::new(),
            &rules::anywhere_patterns(rules::CONCEALED_DIRECTORIES),
        )?);
        if let Some(dir) = app_config_dir {
            layers.push(layer(Reason::UserConfiguration, vec![dir.to_path_buf()], &[])?);
        }

        let additional_locations = config
            .additional_locations
            .iter()
            .map(|template| absolutize_from_cwd(expand_user_path(template)))
            .collect();
        layers.push(layer(
            Reason::CustomAddition,
            additional_locations,
            &config.additional_patterns,
        )?);

        let disablement = config
            .defaults_disablement
            .iter()
            .map(OsString::from)
            .collect();

        let mut supercessions = Vec::with_capacity(config.rules_supercession.len());
        for (base, rules) in &config.rules_supercession {
            supercessions.push(Supercession {
                base: absolutize_from_cwd(expand_user_path(base)),
                ignore: globset(&rules.ignore)?,
                protect: globset(&rules.protect)?,
            });
        }
        // Deepest base first so nested overrides win
        supercessions.sort_by_key(|s| std::cmp::Reverse(s.base.components().count()));

        debug!(
            "Built protection cache with {} layers and {} supercession blocks",
            layers.len(),
            supercessions.len()
        );
        Ok(Self {
            layers,
            disablement,
            supercessions,
        })
    }

    fn is_disabled(&self, path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => self.disablement.contains(name),
            _ => false,
        })
    }

    fn evaluate(&self, path: &Path) -> Verdict {
        if self.is_disabled(path) {
            trace!("Protection disabled by path component: {}", path.display());
            return Verdict::Released;
        }

        for supercession in &self.supercessions {
            let Ok(relative) = path.strip_prefix(&supercession.base) else {
                continue;
            };
            if supercession.ignore.is_match(relative) {
                return Verdict::Released;
            }
            if supercession.protect.is_match(relative) {
                return Verdict::Protected(Reason::PlatformSensitive);
            }
        }

        let name = path.file_name().map(Path::new);
        for layer in &self.layers {
            if layer.directories.iter().any(|dir| path.starts_with(dir)) {
                return Verdict::Protected(layer.reason);
            }
            let name_match = name.is_some_and(|name| layer.name_patterns.is_match(name));
            if name_match || layer.patterns.is_match(path) {
                return Verdict::Protected(layer.reason);
            }
        }
        Verdict::Unmatched
    }
}

impl Protector for ProtectionCache {
    /// The path as written is checked first; when nothing matches, the
    /// same path with symlinked ancestors resolved gets a second check.
    fn verify(&self, path: &Path) -> Status {
        let path = absolutize_from_cwd(path);
        let verdict = match self.evaluate(&path) {
            Verdict::Unmatched => {
                let resolved = resolve_existing(&path);
                if resolved == path {
                    Verdict::Unmatched
                } else {
                    trace!("Checking {} as {}", path.display(), resolved.display());
                    self.evaluate(&resolved)
                }
            }
            verdict => verdict,
        };
        match verdict {
            Verdict::Protected(reason) => Status::active(path, reason),
            Verdict::Released | Verdict::Unmatched => Status::inactive(path),
        }
    }
}

fn layer(reason: Reason, directories: Vec<PathBuf>, patterns: &[String]) -> Result<Layer> {
    // Resolved spellings let symlinked destinations match too
    let mut resolved_directories = Vec::with_capacity(directories.len());
    for directory in directories {
        let resolved = resolve_existing(&directory);
        if resolved != directory {
            resolved_directories.push(resolved);
        }
        resolved_directories.push(directory);
    }
    let directories = resolved_directories;
    let (bare, qualified): (Vec<String>, Vec<String>) = patterns
        .iter()
        .cloned()
        .partition(|pattern| !pattern.contains('/'));
    Ok(Layer {
        reason,
        directories,
        patterns: globset(&qualified)?,
        name_patterns: globset(&bare)?,
    })
}

fn globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(glob(pattern)?);
    }
    builder.build().map_err(|e| Error::ConfigurationInvalidity {
        location: "protection".to_string(),
        reason: e.to_string(),
    })
}

fn glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .case_insensitive(cfg!(any(windows, target_os = "macos")))
        .build()
        .map_err(|e| Error::ConfigurationInvalidity {
            location: format!("protection pattern '{pattern}'"),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupercessionRules;
    use std::fs;

    fn cache_with(config: ProtectionConfig) -> ProtectionCache {
        ProtectionCache::build(
            &config,
            Some(Path::new("/home/user")),
            Some(Path::new("/home/user/.config/mimeogram")),
        )
        .unwrap()
    }

    #[test]
    fn test_unprotected_project_file() {
        let cache = cache_with(ProtectionConfig::default());
        let status = cache.verify(Path::new("/home/user/project/src/main.rs"));
        assert!(!status.active);
        assert_eq!(status.reason, None);
    }

    #[test]
    fn test_os_directory() {
        let cache = cache_with(ProtectionConfig::default());
        let sample = if cfg!(windows) { "C:\\Windows\\win.ini" } else { "/etc/hosts" };
        let status = cache.verify(Path::new(sample));
        assert!(status.active);
        assert_eq!(status.reason, Some(Reason::OsDirectory));
    }

    #[test]
    #[cfg(unix)]
    fn test_credentials_and_project_layers() {
        let cache = cache_with(ProtectionConfig::default());
        assert_eq!(
            cache.verify(Path::new("/home/user/.ssh/id_ed25519")).reason,
            Some(Reason::Credentials)
        );
        assert_eq!(
            cache.verify(Path::new("/home/user/project/.env")).reason,
            Some(Reason::Credentials)
        );
        assert_eq!(
            cache.verify(Path::new("/home/user/project/.git/config")).reason,
            Some(Reason::VersionControl)
        );
        assert_eq!(
            cache.verify(Path::new("/home/user/project/.vscode/settings.json")).reason,
            Some(Reason::Concealment)
        );
        assert_eq!(
            cache.verify(Path::new("/home/user/.config/mimeogram/general.toml")).reason,
            Some(Reason::UserConfiguration)
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_custom_additions_and_disablement() {
        let cache = cache_with(ProtectionConfig {
            additional_locations: vec!["/custom".to_string()],
            additional_patterns: vec!["*.sqlite".to_string(), "**/generated/**".to_string()],
            defaults_disablement: vec!["node_modules".to_string()],
            ..Default::default()
        });
        let status = cache.verify(Path::new("/custom/x"));
        assert!(status.active);
        assert_eq!(status.reason, Some(Reason::CustomAddition));
        assert!(!cache.verify(Path::new("/custom/node_modules/x")).active);
        assert!(!cache.verify(Path::new("/etc/node_modules/x")).active);
        assert!(cache.verify(Path::new("/home/user/db/app.sqlite")).active);
        assert!(cache.verify(Path::new("/home/user/p/generated/out.rs")).active);
    }

    #[test]
    #[cfg(unix)]
    fn test_supercession_ignore_beats_protect() {
        let mut config = ProtectionConfig::default();
        config.rules_supercession.insert(
            "/home/user/site".to_string(),
            SupercessionRules {
                ignore: vec![".git/hooks/**".to_string()],
                protect: vec!["config/*.toml".to_string(), ".git/**".to_string()],
            },
        );
        let cache = cache_with(config);
        assert!(!cache.verify(Path::new("/home/user/site/.git/hooks/pre-commit")).active);
        let status = cache.verify(Path::new("/home/user/site/config/prod.toml"));
        assert_eq!(status.reason, Some(Reason::PlatformSensitive));
        assert_eq!(
            cache.verify(Path::new("/home/user/site/.git/HEAD")).reason,
            Some(Reason::PlatformSensitive)
        );
        assert!(!cache.verify(Path::new("/home/user/site/index.html")).active);
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinked_destination_keeps_protection() {
        let temp = tempfile::TempDir::new().unwrap();
        let home = temp.path().join("home");
        fs::create_dir_all(home.join(".ssh")).unwrap();
        fs::create_dir(temp.path().join("work")).unwrap();
        std::os::unix::fs::symlink(home.join(".ssh"), temp.path().join("work/keys")).unwrap();

        let cache =
            ProtectionCache::build(&ProtectionConfig::default(), Some(&home), None).unwrap();
        let direct = cache.verify(&home.join(".ssh/authorized_keys"));
        let via_link = cache.verify(&temp.path().join("work/keys/authorized_keys"));
        assert_eq!(direct.reason, Some(Reason::Credentials));
        assert!(via_link.active);
        assert_eq!(via_link.reason, Some(Reason::Credentials));
        assert_eq!(via_link.path, temp.path().join("work/keys/authorized_keys"));
        assert!(!cache.verify(&temp.path().join("work/notes.txt")).active);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = ProtectionCache::build(
            &ProtectionConfig {
                additional_patterns: vec!["a/[b".to_string()],
                ..Default::default()
            },
            None,
            None,
        );
        assert!(matches!(result, Err(Error::ConfigurationInvalidity { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_relative_paths_are_resolved() {
        let cache = cache_with(ProtectionConfig::default());
        let status = cache.verify(Path::new("some/relative/.git/config"));
        assert!(status.path.is_absolute());
        assert!(status.active);
    }
}
