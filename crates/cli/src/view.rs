use keyscope_api::{HintValue, MetadataItem};
use keyscope_core::features::{KeyStatus, KeySuggestion};
use tabled::Tabled;

const MAX_DESCRIPTION: usize = 60;

/// A declared group, property or hint.
#[derive(Tabled)]
pub struct ItemView {
    pub kind: String,
    pub name: String,
    #[tabled(rename = "type")]
    pub type_name: String,
    pub description: String,
}

impl ItemView {
    pub fn from_item(item: &MetadataItem) -> Self {
        let mut kind = item.kind().to_string();
        if let Some(property) = item.as_property()
            && property.deprecation.is_some()
        {
            kind.push_str(" (deprecated)");
        }
        Self {
            kind,
            name: item.name().to_string(),
            type_name: item.type_name().map(shorten_type).unwrap_or_else(|| "-".to_string()),
            description: clip(item.description()),
        }
    }
}

/// A key suggestion with the text it inserts.
#[derive(Tabled)]
pub struct SuggestionView {
    pub insert: String,
    pub kind: String,
    pub description: String,
}

impl SuggestionView {
    pub fn from_suggestion(suggestion: &KeySuggestion) -> Self {
        let kind = match suggestion {
            KeySuggestion::Item { item, .. } => item.kind().to_string(),
            KeySuggestion::Key(_) => "key".to_string(),
        };
        Self {
            insert: suggestion.insert_text().to_string(),
            kind,
            description: clip(suggestion.description()),
        }
    }
}

#[derive(Tabled)]
pub struct ValueView {
    pub value: String,
    pub description: String,
}

impl ValueView {
    pub fn from_value(value: &HintValue) -> Self {
        Self {
            value: value.value.clone(),
            description: clip(value.one_line_description.as_deref()),
        }
    }
}

#[derive(Tabled)]
pub struct KeyView {
    pub key: String,
    pub status: String,
    pub property: String,
}

impl KeyView {
    pub fn from_status(key: &str, status: &KeyStatus) -> Self {
        let (label, property) = match status {
            KeyStatus::Defined(p) => ("defined", p.name.to_string()),
            KeyStatus::BoundByAncestor(p) => ("bound", p.name.to_string()),
            KeyStatus::Unknown => ("unknown", "-".to_string()),
        };
        Self {
            key: key.to_string(),
            status: label.to_string(),
            property,
        }
    }
}

#[derive(Tabled)]
pub struct SourceView {
    pub source: String,
    pub groups: usize,
    pub properties: usize,
    pub hints: usize,
}

fn clip(text: Option<&str>) -> String {
    let Some(text) = text else {
        return "-".to_string();
    };
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= MAX_DESCRIPTION {
        return line.to_string();
    }
    let mut clipped: String = line.chars().take(MAX_DESCRIPTION - 3).collect();
    clipped.push_str("...");
    clipped
}

/// `java.util.Map<java.lang.String,a.b.Region>` becomes `Map<String,Region>`.
pub fn shorten_type(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len());
    let mut word = String::new();
    for c in type_name.chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' || c == '$' {
            word.push(c);
        } else {
            out.push_str(simple_name(&word));
            word.clear();
            out.push(c);
        }
    }
    out.push_str(simple_name(&word));
    out
}

fn simple_name(qualified: &str) -> &str {
    qualified
        .rsplit(['.', '$'])
        .next()
        .unwrap_or(qualified)
}
