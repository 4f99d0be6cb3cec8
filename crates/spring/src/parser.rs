use keyscope_api::{BoxError, ConfigurationMetadata, MetadataParser, SourceId};
use tracing::debug;

/// Parser for `spring-configuration-metadata.json` documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMetadataParser;

impl MetadataParser for JsonMetadataParser {
    fn parse(&self, source: &SourceId, bytes: &[u8]) -> Result<ConfigurationMetadata, BoxError> {
        // Some generators emit a UTF-8 BOM.
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let metadata: ConfigurationMetadata = serde_json::from_slice(bytes)?;
        debug!(
            "Parsed {}: {} groups, {} properties, {} hints",
            source,
            metadata.groups.len(),
            metadata.properties.len(),
            metadata.hints.len()
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let json = br#"{
            "groups": [{"name": "server", "type": "org.example.ServerProperties"}],
            "properties": [{"name": "server.port", "type": "java.lang.Integer", "defaultValue": 8080}],
            "hints": []
        }"#;
        let doc = JsonMetadataParser
            .parse(&SourceId::from("test.json"), json)
            .unwrap();
        assert_eq!(doc.groups.len(), 1);
        assert_eq!(doc.properties[0].name, "server.port");
    }

    #[test]
    fn test_bom_is_ignored() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(b"{}");
        let doc = JsonMetadataParser
            .parse(&SourceId::from("bom.json"), &bytes)
            .unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_malformed_document_fails() {
        assert!(JsonMetadataParser
            .parse(&SourceId::from("bad.json"), b"{\"properties\": [")
            .is_err());
    }
}
