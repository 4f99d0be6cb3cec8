//! One-shot commands.

use crate::view::{ItemView, KeyView, SourceView, SuggestionView, ValueView};
use keyscope_api::{CanonicalName, MetadataItem};
use keyscope_core::features::closest_properties;
use keyscope_core::service::ModuleMetadata;
use keyscope_runtime::Workspace;
use tabled::{Table, settings::Style};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn print_table<T: tabled::Tabled>(rows: Vec<T>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty);
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);
}

pub fn stats(workspace: &Workspace) -> CliResult {
    let cache = workspace.cache();
    let rows: Vec<SourceView> = workspace
        .sources()
        .into_iter()
        .filter_map(|id| {
            let index = cache.get(&id)?;
            Some(SourceView {
                source: id.to_string(),
                groups: index.groups().len(),
                properties: index.properties().len(),
                hints: index.hints().len(),
            })
        })
        .collect();
    print_table(rows, "No metadata sources found.");
    Ok(())
}

/// Renders what `lookup` shows for `name`.
pub fn describe(module: &ModuleMetadata, name: &str) -> String {
    let index = module.index();
    let key = CanonicalName::adapt(name);
    let mut rows = Vec::new();
    if let Some(p) = index.property(&key) {
        rows.push(ItemView::from_item(&MetadataItem::Property(p)));
    }
    if let Some(g) = index.group(&key) {
        rows.push(ItemView::from_item(&MetadataItem::Group(g)));
    }
    if let Some(h) = index.hint(&key) {
        rows.push(ItemView::from_item(&MetadataItem::Hint(h)));
    }
    let mut out = if rows.is_empty() {
        format!("Nothing is declared under {}", key)
    } else {
        Table::new(rows).with(Style::sharp()).to_string()
    };
    if let Some(parent) = index.nearest_parent_property(&key) {
        out.push_str(&format!("\nNearest parent property: {}", parent.name));
    }
    out
}

pub fn lookup(module: &ModuleMetadata, name: &str, json: bool) -> CliResult {
    if !json {
        println!("{}", describe(module, name));
        return Ok(());
    }
    let rendered = match module.lookup(name) {
        Some(MetadataItem::Property(p)) => serde_json::to_string_pretty(p.as_ref())?,
        Some(MetadataItem::Group(g)) => serde_json::to_string_pretty(g.as_ref())?,
        Some(MetadataItem::Hint(h)) => serde_json::to_string_pretty(h.as_ref())?,
        None => "null".to_string(),
    };
    println!("{}", rendered);
    Ok(())
}

pub fn complete(module: &ModuleMetadata, parent: &str, query: &str) -> CliResult {
    let rows: Vec<SuggestionView> = module
        .suggest_keys(parent, query)
        .iter()
        .map(SuggestionView::from_suggestion)
        .collect();
    print_table(rows, "No suggestions.");
    Ok(())
}

pub fn values(module: &ModuleMetadata, property: &str, query: &str) -> CliResult {
    let rows: Vec<ValueView> = module
        .suggest_values(property, query)
        .iter()
        .map(ValueView::from_value)
        .collect();
    print_table(rows, "No values.");
    Ok(())
}

/// Checks `keys`, returning the table and the number of unknown keys.
pub fn check_keys(module: &ModuleMetadata, keys: &[String]) -> (String, usize) {
    let mut unknown = 0;
    let mut hints = Vec::new();
    let rows: Vec<KeyView> = keys
        .iter()
        .map(|key| {
            let status = module.check_key(key);
            if !status.is_known() {
                unknown += 1;
                let index = module.index();
                let similar = closest_properties(index.as_ref(), &CanonicalName::adapt(key), 3);
                if !similar.is_empty() {
                    let names: Vec<String> = similar.iter().map(|i| i.name().to_string()).collect();
                    hints.push(format!("{}: did you mean {}?", key, names.join(", ")));
                }
            }
            KeyView::from_status(key, &status)
        })
        .collect();

    let mut out = Table::new(rows).with(Style::sharp()).to_string();
    for hint in hints {
        out.push('\n');
        out.push_str(&hint);
    }
    (out, unknown)
}

pub fn check(module: &ModuleMetadata, keys: &[String]) -> CliResult {
    let (out, unknown) = check_keys(module, keys);
    println!("{}", out);
    if unknown > 0 {
        return Err(format!("{} unknown key(s)", unknown).into());
    }
    Ok(())
}
