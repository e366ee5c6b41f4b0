//! Table definitions and the deltas applied to them.
//!
//! Both are plain serde types read from JSON. A definition describes a table
//! as it exists; a delta lists what to add, change and remove.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A table as it currently exists (or should be created).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Logical table name.
    pub name: String,
    /// Physical name, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Schema qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Columns in creation order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Plain indexes by name.
    #[serde(default)]
    pub index: BTreeMap<String, Vec<String>>,
    /// Unique indexes by name.
    #[serde(default)]
    pub unique: BTreeMap<String, Vec<String>>,
}

impl TableDefinition {
    /// Creates a definition with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a plain index.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.index
            .insert(name.into(), columns.iter().map(ToString::to_string).collect());
        self
    }

    /// Adds a unique index.
    #[must_use]
    pub fn unique(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.unique
            .insert(name.into(), columns.iter().map(ToString::to_string).collect());
        self
    }

    /// The physical table name.
    #[must_use]
    pub fn store(&self) -> &str {
        self.store.as_deref().unwrap_or(&self.name)
    }

    /// Looks up a field by its logical name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A single column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Logical field name.
    pub name: String,
    /// Physical column name, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Field kind: `bool`, `int`, `float`, `str`, `list`, `dict` or a raw
    /// column type.
    pub kind: String,
    /// Column default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether NULL is allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub none: Option<bool>,
    /// Keys of a JSON field materialized as their own columns, with kinds.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extract: BTreeMap<String, String>,
    /// Injected fields live inside another column and get no column of their
    /// own.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inject: bool,
}

impl FieldDefinition {
    /// Creates a nullable field of `kind`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Sets the physical column name.
    #[must_use]
    pub fn store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Sets the default.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets nullability.
    #[must_use]
    pub const fn none(mut self, none: bool) -> Self {
        self.none = Some(none);
        self
    }

    /// Adds an extracted key.
    #[must_use]
    pub fn extract(mut self, key: impl Into<String>, kind: impl Into<String>) -> Self {
        self.extract.insert(key.into(), kind.into());
        self
    }

    /// Marks the field as injected.
    #[must_use]
    pub const fn inject(mut self) -> Self {
        self.inject = true;
        self
    }

    /// The physical column name.
    #[must_use]
    pub fn column(&self) -> &str {
        self.store.as_deref().unwrap_or(&self.name)
    }
}

/// Changes to apply to a [`TableDefinition`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableDelta {
    /// New logical name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New physical name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// New schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Field changes.
    #[serde(default)]
    pub fields: FieldsDelta,
    /// Plain index changes.
    #[serde(default)]
    pub index: IndexDelta,
    /// Unique index changes.
    #[serde(default)]
    pub unique: IndexDelta,
}

/// Field additions, changes and removals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldsDelta {
    /// Fields to add.
    #[serde(default)]
    pub add: Vec<FieldDefinition>,
    /// Changes keyed by the field's current logical name.
    #[serde(default)]
    pub change: BTreeMap<String, FieldDelta>,
    /// Logical names of fields to remove.
    #[serde(default)]
    pub remove: Vec<String>,
}

impl FieldsDelta {
    /// Whether there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.change.is_empty() && self.remove.is_empty()
    }
}

/// Changes to one field. Absent attributes stay as they are.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDelta {
    /// New logical name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New physical name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// New kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// New default; `Some(None)` drops the default.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Option<Value>>,
    /// New nullability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub none: Option<bool>,
    /// Replacement extract map, diffed against the current one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<BTreeMap<String, String>>,
}

impl FieldDelta {
    /// Whether the column itself changes.
    #[must_use]
    pub const fn alters_column(&self) -> bool {
        self.name.is_some()
            || self.store.is_some()
            || self.kind.is_some()
            || self.default.is_some()
            || self.none.is_some()
    }
}

/// A present key, even one holding `null`, becomes `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(Some)
}

/// Index additions, renames and removals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexDelta {
    /// Indexes to add, with their columns.
    #[serde(default)]
    pub add: BTreeMap<String, Vec<String>>,
    /// Old name to new name.
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
    /// Indexes to drop.
    #[serde(default)]
    pub remove: Vec<String>,
}

/// What a table migration starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableMigration {
    /// A full definition to create.
    Create(TableDefinition),
    /// Changes to an existing definition.
    Change(TableDelta),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_definition_from_json() {
        let definition: TableDefinition = serde_json::from_value(json!({
            "name": "people",
            "fields": [
                {"name": "id", "kind": "int", "none": false},
                {"name": "meta", "kind": "dict", "extract": {"age": "int"}},
                {"name": "nick", "kind": "str", "inject": true}
            ],
            "unique": {"name": ["id"]}
        }))
        .unwrap();

        assert_eq!(definition.store(), "people");
        assert_eq!(definition.fields.len(), 3);
        assert_eq!(definition.find("id").unwrap().none, Some(false));
        assert_eq!(definition.find("meta").unwrap().extract["age"], "int");
        assert!(definition.find("nick").unwrap().inject);
        assert!(definition.find("nope").is_none());
        assert_eq!(definition.unique["name"], vec!["id"]);
    }

    #[test]
    fn test_default_presence() {
        let delta: FieldDelta = serde_json::from_value(json!({"default": null})).unwrap();
        assert_eq!(delta.default, Some(None));
        assert!(delta.alters_column());

        let delta: FieldDelta = serde_json::from_value(json!({"default": 3})).unwrap();
        assert_eq!(delta.default, Some(Some(json!(3))));

        let delta: FieldDelta = serde_json::from_value(json!({"extract": {"a": "int"}})).unwrap();
        assert_eq!(delta.default, None);
        assert!(!delta.alters_column());
    }

    #[test]
    fn test_delta_defaults() {
        let delta: TableDelta = serde_json::from_value(json!({"name": "persons"})).unwrap();
        assert_eq!(delta.name.as_deref(), Some("persons"));
        assert!(delta.fields.is_empty());
        assert!(delta.index.add.is_empty());
    }

    #[test]
    fn test_builders_match_json() {
        let built = TableDefinition::new("people")
            .field(FieldDefinition::new("id", "int").none(false))
            .field(FieldDefinition::new("meta", "dict").store("_meta").extract("age", "int"))
            .unique("id", &["id"]);
        let parsed: TableDefinition = serde_json::from_value(json!({
            "name": "people",
            "fields": [
                {"name": "id", "kind": "int", "none": false},
                {"name": "meta", "store": "_meta", "kind": "dict", "extract": {"age": "int"}}
            ],
            "unique": {"id": ["id"]}
        }))
        .unwrap();
        assert_eq!(built, parsed);
        assert_eq!(built.fields[1].column(), "_meta");
    }
}
