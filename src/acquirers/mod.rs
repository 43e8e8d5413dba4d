// src/acquirers/mod.rs

//! Part acquisition from filesystem paths and HTTP(S) URLs
//!
//! Sources are classified, directories are expanded with a sorted walk, and
//! every resulting location is fetched concurrently. Parts come back in
//! source order. In strict mode the first failure aborts the acquisition;
//! otherwise failures are logged and skipped.

mod ignores;

pub use ignores::GitignoreRules;

use crate::config::AcquirePartsConfig;
use crate::error::{Error, Result};
use crate::parts::Part;
use crate::sniff::sniff;
use futures::future::{join_all, try_join_all};
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into
const SKIPPED_DIRECTORIES: &[&str] = &[".bzr", ".git", ".hg", ".svn"];

/// File names never acquired from directory walks
const SKIPPED_FILES: &[&str] = &[".DS_Store", ".env"];

/// Redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Settings for one acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireOptions {
    pub recurse_directories: bool,
    /// Abort on the first failure instead of skipping it
    pub strict: bool,
    /// Disregard gitignore rules
    pub no_ignores: bool,
    pub http_timeout: Duration,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self::from(&AcquirePartsConfig::default())
    }
}

impl From<&AcquirePartsConfig> for AcquireOptions {
    fn from(config: &AcquirePartsConfig) -> Self {
        Self {
            recurse_directories: config.recurse_directories,
            strict: config.fail_on_invalid,
            no_ignores: config.no_ignores,
            http_timeout: Duration::from_secs(config.http_timeout),
        }
    }
}

/// Where a source string points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(Url),
}

impl Source {
    /// Classify a source string by its URL scheme
    ///
    /// Plain paths, paths with a drive letter, and `file` URLs are
    /// filesystem paths; `http` and `https` are fetched; any other scheme
    /// is rejected.
    pub fn classify(source: &str) -> Result<Self> {
        match Url::parse(source) {
            Err(_) => Ok(Self::Path(PathBuf::from(source))),
            Ok(url) if url.scheme().len() == 1 => Ok(Self::Path(PathBuf::from(source))),
            Ok(url) => match url.scheme() {
                "file" => url
                    .to_file_path()
                    .map(Self::Path)
                    .map_err(|_| Error::LocationInvalidity {
                        location: source.to_string(),
                        reason: "file URL does not name a local path".to_string(),
                    }),
                "http" | "https" => Ok(Self::Url(url)),
                _ => Err(Error::UrlSchemeNoSupport(source.to_string())),
            },
        }
    }
}

/// Acquire parts from `sources`
pub async fn acquire_parts<S: AsRef<str>>(
    options: &AcquireOptions,
    sources: &[S],
) -> Result<Vec<Part>> {
    let mut failures = Vec::new();
    let mut locations = Vec::new();
    for source in sources {
        let source = source.as_ref();
        match Source::classify(source).and_then(|s| expand(options, s)) {
            Ok(expanded) => locations.extend(expanded),
            Err(e) if options.strict => return Err(e),
            Err(e) => failures.push(e),
        }
    }

    let client = if locations.iter().any(|l| matches!(l, Source::Url(_))) {
        Some(http_client(options.http_timeout)?)
    } else {
        None
    };
    let fetches = locations
        .iter()
        .map(|location| acquire_location(client.as_ref(), location));

    let parts = if options.strict {
        try_join_all(fetches).await?
    } else {
        let mut parts = Vec::with_capacity(locations.len());
        for outcome in join_all(fetches).await {
            match outcome {
                Ok(part) => parts.push(part),
                Err(e) => failures.push(e),
            }
        }
        parts
    };

    for failure in &failures {
        warn!("{}", failure.report());
    }
    info!(
        "Acquired {} part(s) from {} source(s)",
        parts.len(),
        sources.len()
    );
    Ok(parts)
}

/// Expand directories into the files they contain
fn expand(options: &AcquireOptions, source: Source) -> Result<Vec<Source>> {
    let Source::Path(path) = source else {
        return Ok(vec![source]);
    };
    let metadata = std::fs::metadata(&path)
        .map_err(|e| Error::acquire(path.display().to_string(), e))?;
    if !metadata.is_dir() {
        return Ok(vec![Source::Path(path)]);
    }
    walk_directory(options, &path).map(|paths| paths.into_iter().map(Source::Path).collect())
}

/// Sorted listing of acquirable files below `root`
fn walk_directory(options: &AcquireOptions, root: &Path) -> Result<Vec<PathBuf>> {
    let max_depth = if options.recurse_directories { usize::MAX } else { 1 };
    let mut gitignore = (!options.no_ignores).then(GitignoreRules::new);

    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if is_always_skipped(entry) {
                debug!("Skipping {}", entry.path().display());
                return false;
            }
            if let Some(rules) = gitignore.as_mut()
                && rules.is_ignored(entry.path(), entry.file_type().is_dir())
            {
                warn!("Ignoring '{}' per gitignore rules", entry.path().display());
                return false;
            }
            true
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::acquire(root.display().to_string(), e))?;
        let file_type = entry.file_type();
        if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
            files.push(entry.into_path());
        }
    }
    debug!("Found {} file(s) under {}", files.len(), root.display());
    Ok(files)
}

fn is_always_skipped(entry: &DirEntry) -> bool {
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    if entry.file_type().is_dir() {
        SKIPPED_DIRECTORIES.contains(&name)
    } else {
        SKIPPED_FILES.contains(&name)
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .user_agent(concat!("mimeogram/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::acquire("HTTP client", e))
}

async fn acquire_location(client: Option<&reqwest::Client>, location: &Source) -> Result<Part> {
    match location {
        Source::Path(path) => acquire_file(path).await,
        Source::Url(url) => {
            let client = client.ok_or_else(|| Error::acquire(url.as_str(), "no HTTP client"))?;
            acquire_url(client, url).await
        }
    }
}

async fn acquire_file(path: &Path) -> Result<Part> {
    let location = path.to_string_lossy().into_owned();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::acquire(&location, e))?;
    let sniffed = sniff(&bytes, &location, None)?;
    debug!("Read {} ({} bytes)", location, bytes.len());
    Ok(Part::new(
        location,
        sniffed.mimetype,
        sniffed.charset,
        sniffed.linesep,
        &sniffed.text,
    ))
}

async fn acquire_url(client: &reqwest::Client, url: &Url) -> Result<Part> {
    let location = url.as_str();
    let response = client
        .get(url.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::acquire(location, e))?;
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::acquire(location, e))?;
    let sniffed = sniff(&bytes, location, content_type.as_deref())?;
    debug!("Fetched {} ({} bytes)", location, bytes.len());
    Ok(Part::new(
        location,
        sniffed.mimetype,
        sniffed.charset,
        sniffed.linesep,
        &sniffed.text,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(recurse: bool, strict: bool) -> AcquireOptions {
        AcquireOptions {
            recurse_directories: recurse,
            strict,
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_sources() {
        assert!(matches!(Source::classify("src/main.rs"), Ok(Source::Path(_))));
        assert!(matches!(Source::classify("C:\\work\\a.txt"), Ok(Source::Path(_))));
        assert!(matches!(
            Source::classify("https://example.com/a.rs"),
            Ok(Source::Url(_))
        ));
        assert!(matches!(
            Source::classify("ftp://host/x"),
            Err(Error::UrlSchemeNoSupport(url)) if url == "ftp://host/x"
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_classify_file_url() {
        assert_eq!(
            Source::classify("file:///tmp/a.txt").unwrap(),
            Source::Path(PathBuf::from("/tmp/a.txt"))
        );
    }

    #[tokio::test]
    async fn test_single_directory_level() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), "b\n").unwrap();
        fs::write(temp.path().join("a.txt"), "a\n").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested/c.txt"), "c\n").unwrap();

        let root = temp.path().to_string_lossy().into_owned();
        let parts = acquire_parts(&options(false, true), &[root.clone()]).await.unwrap();
        let contents: Vec<_> = parts.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["a\n", "b\n"]);

        let parts = acquire_parts(&options(true, true), &[root]).await.unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts[2].location.ends_with("c.txt"));
    }

    #[tokio::test]
    async fn test_always_skipped_entries() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(".git/config"), "[core]\n").unwrap();
        fs::write(temp.path().join(".env"), "SECRET=1\n").unwrap();
        fs::write(temp.path().join("kept.txt"), "ok\n").unwrap();

        let root = temp.path().to_string_lossy().into_owned();
        let parts = acquire_parts(&options(true, true), &[root]).await.unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].location.ends_with("kept.txt"));
    }

    #[tokio::test]
    async fn test_non_strict_skips_failures() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.txt");
        fs::write(&good, "fine\n").unwrap();
        let binary = temp.path().join("image.png");
        fs::write(&binary, b"\x89PNG\r\n\x1a\n\0\0\0").unwrap();

        let sources = vec![
            "ftp://host/x".to_string(),
            temp.path().join("missing.txt").to_string_lossy().into_owned(),
            binary.to_string_lossy().into_owned(),
            good.to_string_lossy().into_owned(),
        ];
        let parts = acquire_parts(&options(false, false), &sources).await.unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].content, "fine\n");
    }

    #[tokio::test]
    async fn test_strict_fails_on_missing_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.txt").to_string_lossy().into_owned();
        let err = acquire_parts(&options(false, true), &[missing]).await.unwrap_err();
        assert!(matches!(err, Error::ContentAcquireFailure { .. }));
    }
}
