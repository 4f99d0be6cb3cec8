//! A module over real metadata files: a build output directory plus a JAR.

use keyscope_api::{CanonicalName, ProjectId, SourceEnumerator};
use keyscope_core::cache::ReloadCache;
use keyscope_core::features::KeyStatus;
use keyscope_core::service::ModuleMetadata;
use keyscope_spring::{
    ClassRootEnumerator, FsSourceStore, JavaTypeOracle, JsonMetadataParser, TypeRegistry,
};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use zip::write::SimpleFileOptions;

const APP_METADATA: &str = r#"{
    "groups": [{"name": "cache", "type": "a.CacheProperties"}],
    "properties": [
        {"name": "cache.regions", "type": "java.util.Map<java.lang.String,a.Region>"},
        {"name": "app.labels", "type": "java.util.Map<java.lang.String,java.lang.String>"},
        {"name": "app.mode", "type": "a.Mode"}
    ]
}"#;

const STARTER_METADATA: &str = r#"{
    "properties": [
        {"name": "server.port", "type": "java.lang.Integer"},
        {"name": "app.mode", "type": "java.lang.String", "description": "Shadowed declaration."}
    ]
}"#;

const TYPES: &str = r#"{"classes": [
    {"name": "a.Region", "fields": [
        {"name": "timeToLive", "type": "java.time.Duration"},
        {"name": "maxEntries", "type": "long"}
    ]},
    {"name": "a.Mode", "enumConstants": [{"name": "ON_ERROR"}, {"name": "ALWAYS"}]}
]}"#;

fn write_jar(path: &Path, entry: &str, content: &str) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(entry, SimpleFileOptions::default()).unwrap();
    zip.write_all(content.as_bytes()).unwrap();
    zip.finish().unwrap();
}

struct Fixture {
    _temp: tempfile::TempDir,
    metadata_file: std::path::PathBuf,
    jar: std::path::PathBuf,
    module: ModuleMetadata,
}

fn fixture() -> Fixture {
    let temp = tempfile::tempdir().unwrap();
    let classes = temp.path().join("build/classes");
    fs::create_dir_all(classes.join("META-INF")).unwrap();
    let metadata_file = classes.join("META-INF/spring-configuration-metadata.json");
    fs::write(&metadata_file, APP_METADATA).unwrap();

    let jar = temp.path().join("libs/starter.jar");
    fs::create_dir_all(jar.parent().unwrap()).unwrap();
    write_jar(&jar, "META-INF/spring-configuration-metadata.json", STARTER_METADATA);

    let mut enumerator = ClassRootEnumerator::new();
    enumerator.add_module("app", vec![classes, jar.clone()]);
    assert_eq!(enumerator.sources_for("app").len(), 2);

    let oracle = JavaTypeOracle::new(TypeRegistry::from_json_str(TYPES).unwrap());
    let cache = Arc::new(ReloadCache::new(
        ProjectId::new("demo"),
        Arc::new(FsSourceStore::new()),
        Arc::new(JsonMetadataParser),
        Arc::new(oracle),
    ));
    let module = ModuleMetadata::new("app", cache, Arc::new(enumerator));

    Fixture {
        _temp: temp,
        metadata_file,
        jar,
        module,
    }
}

fn inserts(module: &ModuleMetadata, parent: &str, query: &str) -> Vec<String> {
    module
        .suggest_keys(parent, query)
        .iter()
        .map(|s| s.insert_text().to_string())
        .collect()
}

#[test]
fn test_output_directory_wins_over_jar() {
    let f = fixture();
    let item = f.module.lookup("app.mode").unwrap();
    let property = item.as_property().unwrap();
    assert_eq!(property.type_name.as_deref(), Some("a.Mode"));
    assert!(f.module.lookup("server.port").is_some());
}

#[test]
fn test_map_of_beans_completes_below_concrete_key() {
    let f = fixture();
    assert_eq!(
        inserts(&f.module, "cache.regions.eu", ""),
        vec!["max-entries", "time-to-live"]
    );
    assert_eq!(inserts(&f.module, "cache.regions.eu", "ti"), vec!["time-to-live"]);
    // the open key position itself is never offered
    assert!(inserts(&f.module, "cache.regions", "").is_empty());
}

#[test]
fn test_key_checks() {
    let f = fixture();
    assert!(matches!(
        f.module.check_key("cache.regions.eu.time-to-live"),
        KeyStatus::Defined(_)
    ));
    assert!(matches!(
        f.module.check_key("app.labels.team"),
        KeyStatus::BoundByAncestor(p) if p.name == CanonicalName::adapt("app.labels")
    ));
    assert_eq!(f.module.check_key("server.nope"), KeyStatus::Unknown);
}

#[test]
fn test_enum_values() {
    let f = fixture();
    let values: Vec<String> = f
        .module
        .suggest_values("app.mode", "on")
        .into_iter()
        .map(|v| v.value)
        .collect();
    assert_eq!(values, vec!["on-error"]);
}

#[test]
fn test_edits_are_seen_without_module_refresh() {
    let f = fixture();
    assert!(f.module.lookup("app.extra").is_none());

    let edited = APP_METADATA.replace(
        r#"{"name": "app.mode", "type": "a.Mode"}"#,
        r#"{"name": "app.mode", "type": "a.Mode"}, {"name": "app.extra"}"#,
    );
    fs::write(&f.metadata_file, edited).unwrap();
    assert!(f.module.lookup("app.extra").is_some());
    assert!(!f.module.refresh());

    fs::remove_file(&f.jar).unwrap();
    assert!(f.module.lookup("server.port").is_none());
    assert!(f.module.lookup("app.extra").is_some());
}
