//! Artifact discovery
//!
//! The build leaves its packaged output in a known directory. The locator
//! picks the first regular file whose name matches the pattern, in the order
//! the directory listing yields entries. That order is filesystem dependent
//! and deliberately not sorted: when several archives are present, which one
//! is delivered is unspecified.
//!
//! As with shell globbing, names starting with `.` only match a pattern whose
//! file name starts with `.` too, so half-written `.partial.zip` files are
//! never picked up by `*.zip`.

use crate::caption::format_size_mb;
use crate::error::{Error, Result};
use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};

/// The packaged build output selected for delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Location on disk
    pub path: PathBuf,
    /// File name shown to recipients
    pub name: String,
    /// Size at selection time
    pub size_bytes: u64,
}

impl Artifact {
    /// Size in megabytes (`bytes / 1024 / 1024`), unrounded
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }

    /// Read the whole file
    ///
    /// Called once per upload attempt so a retry never sees a half-consumed
    /// stream.
    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read artifact '{}': {}", self.path.display(), e),
            ))
        })
    }
}

/// Characters with glob meaning, rejected outside the file-name component
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// A pattern split into the directory to list and the file-name glob
struct FilePattern {
    dir: PathBuf,
    matcher: GlobMatcher,
    /// Leading-dot names are only eligible when the glob itself starts with `.`
    include_hidden: bool,
}

impl FilePattern {
    fn matches(&self, name: &str) -> bool {
        if name.starts_with('.') && !self.include_hidden {
            return false;
        }
        self.matcher.is_match(name)
    }
}

/// Split a pattern into the directory to list and the file-name glob
///
/// Only the final path component may contain glob syntax.
fn split_pattern(pattern: &str) -> Result<FilePattern> {
    let path = Path::new(pattern);
    let file_pattern = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            Error::config(
                "artifact_glob",
                format!("pattern '{pattern}' has no file name component"),
            )
        })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if dir.to_string_lossy().contains(GLOB_META) {
        return Err(Error::config(
            "artifact_glob",
            format!("pattern '{pattern}' may only use glob syntax in its file name"),
        ));
    }

    let matcher = Glob::new(file_pattern)
        .map_err(|e| Error::config("artifact_glob", format!("invalid pattern '{pattern}': {e}")))?
        .compile_matcher();

    Ok(FilePattern {
        dir,
        matcher,
        include_hidden: file_pattern.starts_with('.'),
    })
}

/// Locate the artifact to deliver
///
/// # Errors
///
/// - [`Error::NoArtifactFound`] when the directory is missing or nothing matches
/// - [`Error::Config`] when the pattern is not a valid glob, or uses glob
///   syntax outside its file name
/// - [`Error::Io`] when the directory cannot be listed
///
/// # Examples
///
/// ```no_run
/// use tg_notify::artifact::locate_artifact;
///
/// # #[tokio::main]
/// # async fn main() -> tg_notify::Result<()> {
/// let artifact = locate_artifact("output/*.zip").await?;
/// println!("{} ({:.2} MB)", artifact.name, artifact.size_mb());
/// # Ok(())
/// # }
/// ```
pub async fn locate_artifact(pattern: &str) -> Result<Artifact> {
    let file_pattern = split_pattern(pattern)?;
    let not_found = || Error::NoArtifactFound {
        pattern: pattern.to_string(),
    };

    let mut entries = match tokio::fs::read_dir(&file_pattern.dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(Error::Io(e)),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !file_pattern.matches(name) {
            continue;
        }

        // follows symlinks, unlike DirEntry::metadata
        let metadata = tokio::fs::metadata(entry.path()).await?;
        if !metadata.is_file() {
            continue;
        }

        let artifact = Artifact {
            path: entry.path(),
            name: name.to_string(),
            size_bytes: metadata.len(),
        };
        tracing::info!(
            artifact = %artifact.name,
            size = %format_size_mb(artifact.size_bytes),
            "Selected artifact"
        );
        return Ok(artifact);
    }

    Err(not_found())
}
