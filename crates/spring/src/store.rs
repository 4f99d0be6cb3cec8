use crate::error::{Result, SpringError};
use crate::files::SourceLocation;
use keyscope_api::{BoxError, ModificationToken, SourceId, SourceStore};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;
use xxhash_rust::xxh3::xxh3_64;
use zip::ZipArchive;

/// Reads metadata from plain files and from entries of JAR files.
///
/// Freshness comes from the size and mtime of the backing file, so editing
/// any entry of a JAR invalidates every source inside it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSourceStore;

impl FsSourceStore {
    pub fn new() -> Self {
        Self
    }

    fn token_for(location: &SourceLocation) -> Option<ModificationToken> {
        let path = location.backing_file();
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let entry = match location {
            SourceLocation::JarEntry { entry, .. } => entry.as_str(),
            SourceLocation::File(_) => "",
        };
        let key = format!("{}!{}:{}:{}", path.display(), entry, metadata.len(), mtime);
        Some(ModificationToken(xxh3_64(key.as_bytes())))
    }

    fn read_location(location: &SourceLocation) -> Result<Vec<u8>> {
        match location {
            SourceLocation::File(path) => Ok(fs::read(path)?),
            SourceLocation::JarEntry { jar, entry } => read_jar_entry(jar, entry),
        }
    }
}

fn read_jar_entry(jar: &Path, entry: &str) -> Result<Vec<u8>> {
    let file = File::open(jar)?;
    let mut archive = ZipArchive::new(file)?;
    let mut zipped = archive.by_name(entry).map_err(SpringError::Zip)?;
    let mut bytes = Vec::with_capacity(zipped.size() as usize);
    zipped.read_to_end(&mut bytes)?;
    Ok(bytes)
}

impl SourceStore for FsSourceStore {
    fn modification_token(&self, source: &SourceId) -> Option<ModificationToken> {
        let location = SourceLocation::parse(source).ok()?;
        Self::token_for(&location)
    }

    fn read(&self, source: &SourceId) -> std::result::Result<Vec<u8>, BoxError> {
        let location = SourceLocation::parse(source)?;
        Ok(Self::read_location(&location)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{metadata_source_in_class_root, source_id_for_file};
    use crate::test_support::write_jar;

    #[test]
    fn test_plain_file_token_and_read() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("meta.json");
        fs::write(&path, "{}").unwrap();
        let id = source_id_for_file(&path).unwrap();

        let store = FsSourceStore::new();
        let first = store.modification_token(&id).unwrap();
        assert_eq!(store.modification_token(&id), Some(first));
        assert_eq!(store.read(&id).unwrap(), b"{}");

        // a size change always changes the token, whatever the mtime resolution
        fs::write(&path, r#"{"groups": []}"#).unwrap();
        assert_ne!(store.modification_token(&id), Some(first));

        fs::remove_file(&path).unwrap();
        assert_eq!(store.modification_token(&id), None);
        assert!(store.read(&id).is_err());
    }

    #[test]
    fn test_jar_entry_read() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("starter.jar");
        write_jar(
            &jar,
            &[(
                "META-INF/spring-configuration-metadata.json",
                r#"{"properties": [{"name": "demo.enabled"}]}"#,
            )],
        );

        let id = metadata_source_in_class_root(&jar).unwrap();
        let store = FsSourceStore::new();
        assert!(store.modification_token(&id).is_some());
        let bytes = store.read(&id).unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("demo.enabled"));

        let missing = SourceId::new(id.as_str().replace("spring-configuration", "other"));
        assert!(store.read(&missing).is_err());
    }

    #[test]
    fn test_unsupported_ids() {
        let store = FsSourceStore::new();
        assert_eq!(store.modification_token(&SourceId::from("jar:broken")), None);
        assert_eq!(
            store.modification_token(&SourceId::from("/definitely/not/here.json")),
            None
        );
    }
}
