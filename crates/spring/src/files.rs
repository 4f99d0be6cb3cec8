//! Where metadata files live and how their ids are spelled.
//!
//! A class root (an output directory or a JAR) contributes at most one
//! metadata source. The generated `spring-configuration-metadata.json`
//! already contains the merged content of the additional file, so the
//! additional file is only used when nothing was generated.

use crate::error::{Result, SpringError};
use keyscope_api::SourceId;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;
use zip::ZipArchive;

pub const METADATA_DIR: &str = "META-INF";
pub const METADATA_FILE: &str = "spring-configuration-metadata.json";
pub const ADDITIONAL_METADATA_FILE: &str = "additional-spring-configuration-metadata.json";

/// Entry names tried inside a class root, in order.
pub fn candidate_entries() -> [String; 2] {
    [
        format!("{METADATA_DIR}/{METADATA_FILE}"),
        format!("{METADATA_DIR}/{ADDITIONAL_METADATA_FILE}"),
    ]
}

/// True for file names that may hold configuration metadata.
pub fn is_metadata_file_name(name: &str) -> bool {
    name == METADATA_FILE || name == ADDITIONAL_METADATA_FILE
}

/// A parsed [`SourceId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// A plain file, id `file:///...`.
    File(PathBuf),
    /// An entry of a JAR, id `jar:file:///...!/META-INF/...`.
    JarEntry { jar: PathBuf, entry: String },
}

impl SourceLocation {
    pub fn parse(id: &SourceId) -> Result<Self> {
        let raw = id.as_str();
        if let Some(rest) = raw.strip_prefix("jar:") {
            let (jar, entry) = rest
                .split_once("!/")
                .ok_or_else(|| SpringError::UnsupportedSource(raw.to_string()))?;
            return Ok(SourceLocation::JarEntry {
                jar: file_url_to_path(jar, raw)?,
                entry: entry.to_string(),
            });
        }
        if raw.starts_with("file:") {
            return Ok(SourceLocation::File(file_url_to_path(raw, raw)?));
        }
        // Bare paths are accepted for ids typed by hand.
        Ok(SourceLocation::File(PathBuf::from(raw)))
    }

    pub fn to_source_id(&self) -> Result<SourceId> {
        match self {
            SourceLocation::File(path) => Ok(SourceId::new(path_to_file_url(path)?.as_str())),
            SourceLocation::JarEntry { jar, entry } => {
                let url = path_to_file_url(jar)?;
                Ok(SourceId::new(format!("jar:{url}!/{entry}")))
            }
        }
    }

    /// The file on disk whose metadata decides freshness.
    pub fn backing_file(&self) -> &Path {
        match self {
            SourceLocation::File(path) => path,
            SourceLocation::JarEntry { jar, .. } => jar,
        }
    }
}

fn file_url_to_path(url: &str, id: &str) -> Result<PathBuf> {
    Url::parse(url)
        .ok()
        .filter(|u| u.scheme() == "file")
        .and_then(|u| u.to_file_path().ok())
        .ok_or_else(|| SpringError::UnsupportedSource(id.to_string()))
}

fn path_to_file_url(path: &Path) -> Result<Url> {
    let absolute = std::path::absolute(path)?;
    Url::from_file_path(&absolute)
        .map_err(|_| SpringError::UnsupportedSource(absolute.display().to_string()))
}

/// Source id for a metadata file given by path.
pub fn source_id_for_file(path: &Path) -> Result<SourceId> {
    SourceLocation::File(path.to_path_buf()).to_source_id()
}

/// The metadata source of a class root, if it has one.
pub fn metadata_source_in_class_root(root: &Path) -> Option<SourceId> {
    let found = if root.is_dir() {
        candidate_entries()
            .into_iter()
            .map(|entry| root.join(entry))
            .find(|path| path.is_file())
            .map(SourceLocation::File)
    } else if root.extension().and_then(|e| e.to_str()) == Some("jar") {
        find_in_jar(root)
    } else {
        None
    };
    let location = found?;

    match location.to_source_id() {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!("Skipping class root {}: {}", root.display(), e);
            None
        }
    }
}

fn find_in_jar(jar: &Path) -> Option<SourceLocation> {
    let file = File::open(jar).ok()?;
    let mut archive = match ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(e) => {
            tracing::debug!("Not a readable archive {}: {}", jar.display(), e);
            return None;
        }
    };
    candidate_entries()
        .into_iter()
        .find(|entry| archive.by_name(entry).is_ok())
        .map(|entry| SourceLocation::JarEntry {
            jar: jar.to_path_buf(),
            entry,
        })
}
