//! Diffing a table definition against a delta.
//!
//! The result is a [`ChangeSet`] of physical changes: columns and indexes by
//! their stored names, plus any move or rename of the table itself. Every
//! field the delta names is checked before anything is returned, so a bad
//! delta never produces partial output.

use std::collections::BTreeMap;

use relsql_core::{Result, SqlError, TableName};
use serde_json::Value;

use crate::schema::{FieldDefinition, FieldDelta, IndexDelta, TableDefinition, TableDelta};

/// A physical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub store: String,
    /// Field kind.
    pub kind: String,
    /// Default value.
    pub default: Option<Value>,
    /// Whether NULL is allowed.
    pub none: Option<bool>,
}

impl ColumnSpec {
    /// Creates a nullable column without a default.
    #[must_use]
    pub fn new(store: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            kind: kind.into(),
            default: None,
            none: None,
        }
    }

    /// The column for a field.
    #[must_use]
    pub fn of(field: &FieldDefinition) -> Self {
        Self {
            store: field.column().to_string(),
            kind: field.kind.clone(),
            default: field.default.clone(),
            none: field.none,
        }
    }

    /// The sub-column holding extracted `key` of a field stored as `store`.
    #[must_use]
    pub fn extract(store: &str, key: &str, kind: &str) -> Self {
        Self::new(format!("{store}_{key}"), kind)
    }

    /// The field's column followed by its extract columns in key order.
    #[must_use]
    pub fn all_of(field: &FieldDefinition) -> Vec<Self> {
        let store = field.column();
        std::iter::once(Self::of(field))
            .chain(
                field
                    .extract
                    .iter()
                    .map(|(key, kind)| Self::extract(store, key, kind)),
            )
            .collect()
    }
}

/// One column change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    /// New column.
    Add(ColumnSpec),
    /// Column changed from one spec to the other.
    Alter {
        /// Current column.
        from: ColumnSpec,
        /// Target column.
        to: ColumnSpec,
    },
    /// Column removed.
    Drop(ColumnSpec),
}

/// One index change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexChange {
    /// New index.
    Add {
        /// Index name.
        name: String,
        /// Indexed columns.
        columns: Vec<String>,
        /// Whether it is a unique index.
        unique: bool,
    },
    /// Index renamed.
    Rename {
        /// Current name.
        from: String,
        /// New name.
        to: String,
        /// Columns of the index, for dialects that recreate it.
        columns: Vec<String>,
        /// Whether it is a unique index.
        unique: bool,
    },
    /// Index removed.
    Drop {
        /// Index name.
        name: String,
        /// Whether it is a unique index.
        unique: bool,
    },
}

/// The physical changes a delta makes to a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    /// The table as it currently exists.
    pub table: TableName,
    /// Schema to move the table into.
    pub schema: Option<String>,
    /// New physical table name.
    pub rename: Option<String>,
    /// Column changes in add, change, remove order.
    pub columns: Vec<ColumnChange>,
    /// Index changes, plain indexes before unique ones.
    pub indexes: Vec<IndexChange>,
}

impl ChangeSet {
    /// The table once the move and rename are applied.
    #[must_use]
    pub fn target(&self) -> TableName {
        TableName::new(
            self.rename.as_deref().unwrap_or(&self.table.name),
            self.schema.clone().or_else(|| self.table.schema.clone()),
        )
    }

    /// Whether nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schema.is_none()
            && self.rename.is_none()
            && self.columns.is_empty()
            && self.indexes.is_empty()
    }
}

fn lookup<'a>(definition: &'a TableDefinition, name: &str) -> Result<&'a FieldDefinition> {
    definition.find(name).ok_or_else(|| SqlError::UnknownField {
        node: "TABLE",
        field: name.to_string(),
    })
}

fn changed_field(
    field: &FieldDefinition,
    delta: &FieldDelta,
    columns: &mut Vec<ColumnChange>,
) {
    let old_store = field.column();
    let new_store = delta
        .store
        .as_deref()
        .or(field.store.as_deref())
        .or(delta.name.as_deref())
        .unwrap_or(&field.name);

    if delta.alters_column() {
        let from = ColumnSpec::of(field);
        let to = ColumnSpec {
            store: new_store.to_string(),
            kind: delta.kind.clone().unwrap_or_else(|| field.kind.clone()),
            default: delta.default.clone().unwrap_or_else(|| field.default.clone()),
            none: delta.none.or(field.none),
        };
        columns.push(ColumnChange::Alter { from, to });
    }

    match &delta.extract {
        Some(extract) => {
            for (key, kind) in extract {
                match field.extract.get(key) {
                    None => {
                        columns.push(ColumnChange::Add(ColumnSpec::extract(new_store, key, kind)));
                    }
                    Some(current) if current != kind || old_store != new_store => {
                        columns.push(ColumnChange::Alter {
                            from: ColumnSpec::extract(old_store, key, current),
                            to: ColumnSpec::extract(new_store, key, kind),
                        });
                    }
                    Some(_) => {}
                }
            }
            for (key, kind) in &field.extract {
                if !extract.contains_key(key) {
                    columns.push(ColumnChange::Drop(ColumnSpec::extract(old_store, key, kind)));
                }
            }
        }
        None if old_store != new_store => {
            for (key, kind) in &field.extract {
                columns.push(ColumnChange::Alter {
                    from: ColumnSpec::extract(old_store, key, kind),
                    to: ColumnSpec::extract(new_store, key, kind),
                });
            }
        }
        None => {}
    }
}

fn index_changes(
    current: &BTreeMap<String, Vec<String>>,
    delta: &IndexDelta,
    unique: bool,
    indexes: &mut Vec<IndexChange>,
) -> Result<()> {
    let node = if unique { "UNIQUE" } else { "INDEX" };
    let missing = |name: &str| SqlError::UnknownField {
        node,
        field: name.to_string(),
    };

    for (name, columns) in &delta.add {
        indexes.push(IndexChange::Add {
            name: name.clone(),
            columns: columns.clone(),
            unique,
        });
    }
    for (from, to) in &delta.rename {
        let columns = current.get(from).ok_or_else(|| missing(from))?;
        indexes.push(IndexChange::Rename {
            from: from.clone(),
            to: to.clone(),
            columns: columns.clone(),
            unique,
        });
    }
    let mut remove = delta.remove.clone();
    remove.sort();
    for name in remove {
        if !current.contains_key(&name) {
            return Err(missing(&name));
        }
        indexes.push(IndexChange::Drop { name, unique });
    }
    Ok(())
}

/// Computes the physical changes `delta` makes to `definition`.
///
/// # Errors
///
/// [`SqlError::UnknownField`] when the delta changes or removes a field, or
/// renames or removes an index, that the definition does not have.
pub fn diff(definition: &TableDefinition, delta: &TableDelta) -> Result<ChangeSet> {
    let table = TableName::new(definition.store(), definition.schema.clone());

    let schema = delta
        .schema
        .clone()
        .filter(|schema| definition.schema.as_ref() != Some(schema));

    let target = delta
        .store
        .as_deref()
        .or(definition.store.as_deref())
        .or(delta.name.as_deref())
        .unwrap_or(&definition.name);
    let rename = (target != table.name).then(|| target.to_string());

    let mut columns = Vec::new();

    for field in delta.fields.add.iter().filter(|field| !field.inject) {
        columns.extend(ColumnSpec::all_of(field).into_iter().map(ColumnChange::Add));
    }

    for (name, change) in &delta.fields.change {
        let field = lookup(definition, name)?;
        if !field.inject {
            changed_field(field, change, &mut columns);
        }
    }

    for name in &delta.fields.remove {
        let field = lookup(definition, name)?;
        if !field.inject {
            columns.extend(ColumnSpec::all_of(field).into_iter().map(ColumnChange::Drop));
        }
    }

    let mut indexes = Vec::new();
    index_changes(&definition.index, &delta.index, false, &mut indexes)?;
    index_changes(&definition.unique, &delta.unique, true, &mut indexes)?;

    Ok(ChangeSet {
        table,
        schema,
        rename,
        columns,
        indexes,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::FieldsDelta;

    fn people() -> TableDefinition {
        TableDefinition::new("people")
            .field(FieldDefinition::new("id", "int").none(false))
            .field(FieldDefinition::new("name", "str").default_value(json!("")))
            .field(
                FieldDefinition::new("meta", "dict")
                    .extract("a", "int")
                    .extract("b", "str"),
            )
            .field(FieldDefinition::new("nick", "str").inject())
            .index("by_name", &["name"])
    }

    fn change(name: &str, delta: FieldDelta) -> TableDelta {
        TableDelta {
            fields: FieldsDelta {
                change: [(name.to_string(), delta)].into_iter().collect(),
                ..FieldsDelta::default()
            },
            ..TableDelta::default()
        }
    }

    #[test]
    fn test_extract_keys_diffed() {
        let delta = change(
            "meta",
            FieldDelta {
                extract: Some(
                    [("a", "int"), ("c", "float")]
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..FieldDelta::default()
            },
        );
        let changes = diff(&people(), &delta).unwrap();
        assert_eq!(
            changes.columns,
            vec![
                ColumnChange::Add(ColumnSpec::new("meta_c", "float")),
                ColumnChange::Drop(ColumnSpec::new("meta_b", "str")),
            ]
        );
    }

    #[test]
    fn test_extract_kind_change() {
        let delta = change(
            "meta",
            FieldDelta {
                extract: Some(
                    [("a", "str"), ("b", "str")]
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..FieldDelta::default()
            },
        );
        assert_eq!(
            diff(&people(), &delta).unwrap().columns,
            vec![ColumnChange::Alter {
                from: ColumnSpec::new("meta_a", "int"),
                to: ColumnSpec::new("meta_a", "str"),
            }]
        );
    }

    #[test]
    fn test_store_change_renames_extracts() {
        let delta = change(
            "meta",
            FieldDelta {
                store: Some(String::from("info")),
                ..FieldDelta::default()
            },
        );
        let columns = diff(&people(), &delta).unwrap().columns;
        assert_eq!(columns.len(), 3);
        assert_eq!(
            columns[0],
            ColumnChange::Alter {
                from: ColumnSpec::new("meta", "dict"),
                to: ColumnSpec::new("info", "dict"),
            }
        );
        assert_eq!(
            columns[1..],
            [
                ColumnChange::Alter {
                    from: ColumnSpec::new("meta_a", "int"),
                    to: ColumnSpec::new("info_a", "int"),
                },
                ColumnChange::Alter {
                    from: ColumnSpec::new("meta_b", "str"),
                    to: ColumnSpec::new("info_b", "str"),
                },
            ]
        );
    }

    #[test]
    fn test_store_change_with_extract_map() {
        let delta = change(
            "meta",
            FieldDelta {
                store: Some(String::from("info")),
                extract: Some(
                    [("a", "int")]
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..FieldDelta::default()
            },
        );
        let columns = diff(&people(), &delta).unwrap().columns;
        assert_eq!(
            columns[1..],
            [
                ColumnChange::Alter {
                    from: ColumnSpec::new("meta_a", "int"),
                    to: ColumnSpec::new("info_a", "int"),
                },
                ColumnChange::Drop(ColumnSpec::new("meta_b", "str")),
            ]
        );
    }

    #[test]
    fn test_field_alter_carries_unchanged_attributes() {
        let delta = change(
            "name",
            FieldDelta {
                default: Some(None),
                none: Some(false),
                ..FieldDelta::default()
            },
        );
        assert_eq!(
            diff(&people(), &delta).unwrap().columns,
            vec![ColumnChange::Alter {
                from: ColumnSpec {
                    store: String::from("name"),
                    kind: String::from("str"),
                    default: Some(json!("")),
                    none: None,
                },
                to: ColumnSpec {
                    store: String::from("name"),
                    kind: String::from("str"),
                    default: None,
                    none: Some(false),
                },
            }]
        );
    }

    #[test]
    fn test_rename_field_without_store() {
        let delta = change(
            "name",
            FieldDelta {
                name: Some(String::from("label")),
                ..FieldDelta::default()
            },
        );
        let columns = diff(&people(), &delta).unwrap().columns;
        assert!(matches!(
            &columns[0],
            ColumnChange::Alter { from, to } if from.store == "name" && to.store == "label"
        ));
    }

    #[test]
    fn test_add_and_remove() {
        let delta = TableDelta {
            fields: FieldsDelta {
                add: vec![
                    FieldDefinition::new("tags", "list").extract("first", "str"),
                    FieldDefinition::new("ghost", "str").inject(),
                ],
                remove: vec![String::from("meta"), String::from("nick")],
                ..FieldsDelta::default()
            },
            ..TableDelta::default()
        };
        assert_eq!(
            diff(&people(), &delta).unwrap().columns,
            vec![
                ColumnChange::Add(ColumnSpec::new("tags", "list")),
                ColumnChange::Add(ColumnSpec::new("tags_first", "str")),
                ColumnChange::Drop(ColumnSpec::new("meta", "dict")),
                ColumnChange::Drop(ColumnSpec::new("meta_a", "int")),
                ColumnChange::Drop(ColumnSpec::new("meta_b", "str")),
            ]
        );
    }

    #[test]
    fn test_unknown_field() {
        let delta = change("nope", FieldDelta::default());
        assert_eq!(
            diff(&people(), &delta).unwrap_err(),
            SqlError::UnknownField {
                node: "TABLE",
                field: String::from("nope"),
            }
        );

        let delta = TableDelta {
            fields: FieldsDelta {
                remove: vec![String::from("nope")],
                ..FieldsDelta::default()
            },
            ..TableDelta::default()
        };
        assert!(diff(&people(), &delta).is_err());
    }

    #[test]
    fn test_table_rename_and_move() {
        let delta = TableDelta {
            name: Some(String::from("persons")),
            schema: Some(String::from("archive")),
            ..TableDelta::default()
        };
        let changes = diff(&people(), &delta).unwrap();
        assert_eq!(changes.rename.as_deref(), Some("persons"));
        assert_eq!(changes.schema.as_deref(), Some("archive"));
        assert_eq!(
            changes.target(),
            TableName::new("persons", Some(String::from("archive")))
        );

        let mut stored = people();
        stored.store = Some(String::from("tbl_people"));
        let delta = TableDelta {
            name: Some(String::from("persons")),
            ..TableDelta::default()
        };
        let changes = diff(&stored, &delta).unwrap();
        assert!(changes.is_empty());
        assert_eq!(changes.table.name, "tbl_people");
    }

    #[test]
    fn test_indexes() {
        let delta = TableDelta {
            index: IndexDelta {
                add: [(String::from("by_id"), vec![String::from("id")])]
                    .into_iter()
                    .collect(),
                rename: [(String::from("by_name"), String::from("named"))]
                    .into_iter()
                    .collect(),
                ..IndexDelta::default()
            },
            unique: IndexDelta {
                remove: vec![String::from("gone")],
                ..IndexDelta::default()
            },
            ..TableDelta::default()
        };
        let err = diff(&people(), &delta).unwrap_err();
        assert_eq!(err.node(), "UNIQUE");

        let definition = people().unique("gone", &["id"]);
        let changes = diff(&definition, &delta).unwrap();
        assert_eq!(
            changes.indexes,
            vec![
                IndexChange::Add {
                    name: String::from("by_id"),
                    columns: vec![String::from("id")],
                    unique: false,
                },
                IndexChange::Rename {
                    from: String::from("by_name"),
                    to: String::from("named"),
                    columns: vec![String::from("name")],
                    unique: false,
                },
                IndexChange::Drop {
                    name: String::from("gone"),
                    unique: true,
                },
            ]
        );
    }
}
