// Link reference map and label normalisation
//
// Labels are compared in normalised form: Unicode lowercase, runs of
// whitespace collapsed to one space, surrounding whitespace trimmed. The map
// keeps the first definition for a label; later definitions are ignored.

use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub destination: String,
    pub title: Option<String>,
}

/// Lookup surface the inline parser resolves reference links against. The
/// driver installs one backed by the collected reference map; embedders of
/// the inline-only entrypoint may supply their own.
pub trait ResolveReference {
    fn resolve(&self, normalized_label: &str) -> Option<LinkReference>;
}

#[derive(Debug, Default)]
pub struct ReferenceMap {
    entries: HashMap<String, LinkReference>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert under the normalised label. First writer wins.
    pub fn insert(&mut self, label: &str, destination: String, title: Option<String>) {
        let key = normalize_label(label);
        self.entries
            .entry(key)
            .or_insert(LinkReference { destination, title });
    }

    pub fn get(&self, label: &str) -> Option<&LinkReference> {
        self.entries.get(&normalize_label(label))
    }
}

impl ResolveReference for ReferenceMap {
    fn resolve(&self, normalized_label: &str) -> Option<LinkReference> {
        self.entries.get(normalized_label).cloned()
    }
}

impl<R: ResolveReference + ?Sized> ResolveReference for Rc<R> {
    fn resolve(&self, normalized_label: &str) -> Option<LinkReference> {
        (**self).resolve(normalized_label)
    }
}

/// A resolver with no definitions, for inline-only parsing without context.
impl ResolveReference for () {
    fn resolve(&self, _normalized_label: &str) -> Option<LinkReference> {
        None
    }
}

/// Unicode lowercase, collapse whitespace runs to a single space, trim.
pub fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_space = false;
    for c in label.chars() {
        if c.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_normalize_label() {
        assert_eq!(normalize_label("  Foo\t \nBar "), "foo bar");
        assert_eq!(normalize_label("ΑΓΩ"), "αγω");
        assert_eq!(normalize_label(""), "");
    }

    #[test]
    fn smoke_test_first_writer_wins() {
        let mut map = ReferenceMap::new();
        map.insert("Foo", "/first".into(), None);
        map.insert("FOO", "/second".into(), Some("t".into()));
        let reference = map.get("foo").expect("definition present");
        assert_eq!(reference.destination, "/first");
        assert_eq!(reference.title, None);
    }

    #[test]
    fn smoke_test_resolver_uses_normalized_key() {
        let mut map = ReferenceMap::new();
        map.insert("Foo Bar", "/url".into(), None);
        assert!(map.resolve("foo bar").is_some());
        assert!(map.resolve("missing").is_none());
    }
}
