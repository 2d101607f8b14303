//! Schema definition: an ordered set of named entries.

use std::fmt::Write as _;

use toml::Value;

use super::descriptor::{Descriptor, Kind, OptionDescriptor};

/// One entry in a [`Schema`].
#[derive(Debug, Clone)]
pub enum Entry {
    /// Resolved from the environment.
    Descriptor(OptionDescriptor),
    /// Resolved recursively into a sub-table.
    Nested(Schema),
    /// Copied into the result as-is.
    Literal(Value),
}

impl From<OptionDescriptor> for Entry {
    fn from(descriptor: OptionDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl<K: Kind> From<Descriptor<K>> for Entry {
    fn from(descriptor: Descriptor<K>) -> Self {
        Self::Descriptor(descriptor.build())
    }
}

impl From<Schema> for Entry {
    fn from(schema: Schema) -> Self {
        Self::Nested(schema)
    }
}

/// A configuration shape: named descriptors, nested schemas and literals.
///
/// Schemas compose: a library can publish its own `Schema` and an
/// application embeds it with [`nested`](Self::nested). Field names must be
/// unique within one level.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Schema {
    entries: Vec<(String, Entry)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field resolved from the environment.
    pub fn field(self, name: impl Into<String>, descriptor: impl Into<OptionDescriptor>) -> Self {
        self.entry(name, Entry::Descriptor(descriptor.into()))
    }

    /// Embeds `schema` as a sub-table under `name`.
    pub fn nested(self, name: impl Into<String>, schema: Schema) -> Self {
        self.entry(name, Entry::Nested(schema))
    }

    /// Adds a fixed value that is copied into the result unchanged.
    pub fn literal(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entry(name, Entry::Literal(value.into()))
    }

    /// Adds any kind of entry.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already defined at this level.
    pub fn entry(mut self, name: impl Into<String>, entry: impl Into<Entry>) -> Self {
        let name = name.into();
        assert!(
            self.get(&name).is_none(),
            "duplicate field `{name}` in schema"
        );
        self.entries.push((name, entry.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
    }

    /// Entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lists every environment variable the schema reads, one `KEY=default`
    /// line each, depth first. Usable as a `.env` template.
    pub fn requirements(&self) -> String {
        let mut out = String::new();
        self.write_requirements(&mut out);
        out
    }

    fn write_requirements(&self, out: &mut String) {
        for (name, entry) in self.iter() {
            match entry {
                Entry::Descriptor(descriptor) => {
                    let key = descriptor.lookup_key(name);
                    let default = descriptor
                        .default_value()
                        .map(display_default)
                        .unwrap_or_default();
                    // Writing to a String cannot fail.
                    let _ = writeln!(out, "{key}={default}");
                }
                Entry::Nested(schema) => schema.write_requirements(out),
                Entry::Literal(_) => {}
            }
        }
    }
}

fn display_default(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
