//! Canonical configuration property names.
//!
//! A [`CanonicalName`] is the normalized, segment-addressable form of a dotted
//! property key such as `server.servlet-path` or `spring.datasource.hikari[0]`.
//! Two names are equal when their uniform segments are equal, so every relaxed
//! spelling (`servletPath`, `servlet_path`, `SERVLET-PATH`) lands on the same
//! identity.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Uniform key of a segment that stands for "any map key or list index".
pub const INDEX_PLACEHOLDER: &str = "*";

/// Spelling requested when rendering a single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameForm {
    /// The segment as it was written in the source text.
    Original,
    /// Lowercase alphanumerics only. This is the comparison key.
    Uniform,
    /// Kebab case, e.g. `servlet-path`.
    Dashed,
    /// Lower camel case, e.g. `servletPath`.
    Camel,
}

#[derive(Debug, Clone)]
struct Element {
    original: Box<str>,
    uniform: Box<str>,
    indexed: bool,
}

impl Element {
    fn parse(text: &str, bracketed: bool) -> Option<Self> {
        let text = text.trim();
        if bracketed {
            let uniform = if text.is_empty() { INDEX_PLACEHOLDER } else { text };
            return Some(Self {
                original: format!("[{text}]").into(),
                uniform: uniform.into(),
                indexed: true,
            });
        }
        if text.is_empty() {
            return None;
        }
        if text == INDEX_PLACEHOLDER {
            return Some(Self {
                original: text.into(),
                uniform: INDEX_PLACEHOLDER.into(),
                indexed: true,
            });
        }

        let mut uniform: String = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if uniform.is_empty() {
            // Nothing alphanumeric survived; keep the text so the segment stays addressable.
            uniform = text.to_lowercase();
        }
        Some(Self {
            original: text.into(),
            uniform: uniform.into(),
            indexed: false,
        })
    }

    /// Kebab-case spelling. Punctuation-only segments keep their original
    /// text, since dashing would erase them.
    fn dashed(&self) -> Cow<'_, str> {
        if self.uniform.chars().any(char::is_alphanumeric) {
            Cow::Owned(to_dashed(&self.original))
        } else {
            Cow::Borrowed(&self.original)
        }
    }

    fn is_wildcard(&self) -> bool {
        self.indexed && &*self.uniform == INDEX_PLACEHOLDER
    }

    fn render(&self, form: NameForm) -> Cow<'_, str> {
        match form {
            NameForm::Original => Cow::Borrowed(&self.original),
            NameForm::Uniform => Cow::Borrowed(&self.uniform),
            _ if self.indexed => Cow::Owned(format!("[{}]", self.uniform)),
            NameForm::Dashed => self.dashed(),
            NameForm::Camel => Cow::Owned(to_camel(&self.original)),
        }
    }
}

/// Converts a relaxed segment spelling to kebab case.
pub fn to_dashed(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev_lower = false;
    for c in text.chars() {
        if c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn to_camel(text: &str) -> String {
    let dashed = to_dashed(text);
    let mut out = String::with_capacity(dashed.len());
    for (i, part) in dashed.split('-').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Normalized, immutable property name. Cloning is cheap.
#[derive(Clone, Default)]
pub struct CanonicalName {
    elements: Arc<[Element]>,
}

impl CanonicalName {
    /// The name with zero segments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses any relaxed spelling of a dotted key.
    ///
    /// Segments are split on `.` outside of brackets; `[...]` always opens an
    /// indexed segment. Empty segments are skipped and malformed input never
    /// fails: an unclosed bracket simply ends the name.
    pub fn adapt(raw: &str) -> Self {
        let mut elements = Vec::new();
        let mut current = String::new();
        let mut in_bracket = false;

        let mut flush = |text: &mut String, bracketed: bool| {
            if let Some(element) = Element::parse(text, bracketed) {
                elements.push(element);
            }
            text.clear();
        };

        for c in raw.trim().chars() {
            match (c, in_bracket) {
                ('.', false) => flush(&mut current, false),
                ('[', false) => {
                    flush(&mut current, false);
                    in_bracket = true;
                }
                (']', true) => {
                    flush(&mut current, true);
                    in_bracket = false;
                }
                _ => current.push(c),
            }
        }
        if in_bracket || !current.is_empty() {
            flush(&mut current, in_bracket);
        }

        Self {
            elements: elements.into(),
        }
    }

    fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements: elements.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Renders segment `i` in the requested form.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn element(&self, i: usize, form: NameForm) -> Cow<'_, str> {
        self.elements[i].render(form)
    }

    /// Uniform key of segment `i`, the form used for trie addressing.
    pub fn uniform(&self, i: usize) -> &str {
        &self.elements[i].uniform
    }

    pub fn last_element(&self, form: NameForm) -> Option<Cow<'_, str>> {
        self.elements.last().map(|e| e.render(form))
    }

    /// Uniform keys of all segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements.iter().map(|e| &*e.uniform)
    }

    pub fn is_indexed(&self, i: usize) -> bool {
        self.elements.get(i).is_some_and(|e| e.indexed)
    }

    pub fn is_wildcard(&self, i: usize) -> bool {
        self.elements.get(i).is_some_and(Element::is_wildcard)
    }

    pub fn has_wildcard(&self) -> bool {
        self.elements.iter().any(Element::is_wildcard)
    }

    /// The suffix left after dropping the first `k` segments.
    pub fn sub_name(&self, k: usize) -> Self {
        let k = k.min(self.len());
        Self::from_elements(self.elements[k..].to_vec())
    }

    /// The prefix made of the first `n` segments.
    pub fn chop(&self, n: usize) -> Self {
        if n >= self.len() {
            return self.clone();
        }
        Self::from_elements(self.elements[..n].to_vec())
    }

    /// Immediate parent, `None` for the empty name.
    pub fn parent(&self) -> Option<Self> {
        (!self.is_empty()).then(|| self.chop(self.len() - 1))
    }

    /// Appends the segments parsed from `segment`.
    pub fn append(&self, segment: &str) -> Self {
        self.join(&Self::adapt(segment))
    }

    pub fn join(&self, other: &CanonicalName) -> Self {
        let mut elements = self.elements.to_vec();
        elements.extend(other.elements.iter().cloned());
        Self::from_elements(elements)
    }

    /// Appends one wildcard segment.
    pub fn append_placeholder(&self) -> Self {
        let mut elements = self.elements.to_vec();
        elements.push(Element {
            original: INDEX_PLACEHOLDER.into(),
            uniform: INDEX_PLACEHOLDER.into(),
            indexed: true,
        });
        Self::from_elements(elements)
    }

    /// True when `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &CanonicalName) -> bool {
        self.len() < other.len()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|(a, b)| a.uniform == b.uniform)
    }

    pub fn is_parent_of(&self, other: &CanonicalName) -> bool {
        self.len() + 1 == other.len() && self.is_ancestor_of(other)
    }

    /// Strict ancestors, nearest first. The empty name is not included.
    pub fn ancestors(&self) -> impl Iterator<Item = CanonicalName> + '_ {
        (1..self.len()).rev().map(|n| self.chop(n))
    }
}

impl PartialEq for CanonicalName {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.segments().eq(other.segments())
    }
}

impl Eq for CanonicalName {}

impl Hash for CanonicalName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for segment in self.segments() {
            segment.hash(state);
        }
    }
}

impl Ord for CanonicalName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments().cmp(other.segments())
    }
}

impl PartialOrd for CanonicalName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if element.indexed {
                write!(f, "[{}]", element.uniform)?;
            } else {
                if i > 0 {
                    f.write_str(".")?;
                }
                f.write_str(&element.dashed())?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalName({self})")
    }
}

impl From<&str> for CanonicalName {
    fn from(raw: &str) -> Self {
        Self::adapt(raw)
    }
}

impl Serialize for CanonicalName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::adapt(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_relaxed_spellings_are_equal() {
        let dashed = CanonicalName::adapt("server.servlet-path");
        let camel = CanonicalName::adapt("server.servletPath");
        let snake = CanonicalName::adapt("server.servlet_path");
        let upper = CanonicalName::adapt("SERVER.SERVLET_PATH");

        assert_eq!(dashed, camel);
        assert_eq!(dashed, snake);
        assert_eq!(dashed, upper);

        let set: HashSet<_> = [dashed, camel, snake, upper].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_element_forms() {
        let name = CanonicalName::adapt("server.servletPath");
        assert_eq!(name.len(), 2);
        assert_eq!(name.element(1, NameForm::Uniform), "servletpath");
        assert_eq!(name.element(1, NameForm::Dashed), "servlet-path");
        assert_eq!(name.element(1, NameForm::Camel), "servletPath");
        assert_eq!(name.element(1, NameForm::Original), "servletPath");
        assert_eq!(name.to_string(), "server.servlet-path");
    }

    #[test]
    fn test_sub_name_and_ancestry() {
        let name = CanonicalName::adapt("a.b.c.d");
        assert_eq!(name.sub_name(2), CanonicalName::adapt("c.d"));
        assert_eq!(name.sub_name(9), CanonicalName::empty());
        assert_eq!(name.chop(2), CanonicalName::adapt("a.b"));

        let parent = CanonicalName::adapt("a.b");
        assert!(parent.is_ancestor_of(&name));
        assert!(!parent.is_parent_of(&name));
        assert!(CanonicalName::adapt("a.b.c").is_parent_of(&name));
        assert!(!name.is_ancestor_of(&name));
        assert!(CanonicalName::empty().is_ancestor_of(&name));

        let ancestors: Vec<_> = name.ancestors().map(|a| a.to_string()).collect();
        assert_eq!(ancestors, vec!["a.b.c", "a.b", "a"]);
    }

    #[test]
    fn test_brackets_are_indexed_segments() {
        let name = CanonicalName::adapt("spring.profiles[0].name");
        assert_eq!(name.len(), 4);
        assert!(name.is_indexed(2));
        assert_eq!(name.uniform(2), "0");
        assert_eq!(name.to_string(), "spring.profiles[0].name");

        let wild = CanonicalName::adapt("cache.regions[*].ttl");
        assert!(wild.is_wildcard(2));
        assert_eq!(wild, CanonicalName::adapt("cache.regions.*.ttl"));
        assert_eq!(wild, CanonicalName::adapt("cache.regions[].ttl"));
    }

    #[test]
    fn test_empty_and_malformed_input() {
        assert!(CanonicalName::adapt("").is_empty());
        assert!(CanonicalName::adapt("  . ..").is_empty());
        assert_eq!(CanonicalName::adapt("a..b."), CanonicalName::adapt("a.b"));

        let unclosed = CanonicalName::adapt("map[key");
        assert_eq!(unclosed.len(), 2);
        assert_eq!(unclosed.uniform(1), "key");

        let odd = CanonicalName::adapt("---");
        assert_eq!(odd.len(), 1);
        assert_eq!(odd.uniform(0), "---");
        assert_eq!(odd.to_string(), "---");
        assert_eq!(odd.element(0, NameForm::Dashed), "---");
    }

    #[test]
    fn test_display_round_trips() {
        for raw in [
            "---",
            "a.---",
            "-$-.b",
            "a_-b",
            "my.Key_2",
            "server.servletPath",
            "x[0].y",
            "cache.regions.*.ttl",
            "cache.regions[].time-to-live",
        ] {
            let name = CanonicalName::adapt(raw);
            let again = CanonicalName::adapt(&name.to_string());
            assert_eq!(again, name, "round trip of {raw:?}");
            assert_eq!(again.len(), name.len(), "segment count of {raw:?}");
        }
    }

    #[test]
    fn test_append_and_parent() {
        let name = CanonicalName::adapt("logging.level");
        let values = name.append("values");
        assert_eq!(values.to_string(), "logging.level.values");
        assert_eq!(values.parent(), Some(name.clone()));
        assert_eq!(CanonicalName::empty().parent(), None);
        assert_eq!(
            name.append_placeholder(),
            CanonicalName::adapt("logging.level.*")
        );
    }

    #[test]
    fn test_ordering_follows_uniform_segments() {
        let mut names = vec![
            CanonicalName::adapt("server.port"),
            CanonicalName::adapt("server"),
            CanonicalName::adapt("management.port"),
        ];
        names.sort();
        let rendered: Vec<_> = names.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["management.port", "server", "server.port"]);
    }

    #[test]
    fn test_serde_uses_display_form() {
        let name = CanonicalName::adapt("server.servletPath");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"server.servlet-path\"");
        let back: CanonicalName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
