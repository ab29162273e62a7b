//! Entry-level and field-level diffs between two entry-sets

use std::fmt;

use serde_json::{Map, Value};
use similar::TextDiff;
use synchro_model::entry::ALWAYS_ALLOW;
use synchro_model::parse_entry_value;

/// Maximum recursion depth for field diffs
const MAX_DIFF_DEPTH: usize = 64;

/// Entry fields whose arrays are sets: order does not matter.
const SET_FIELDS: &[&str] = &[ALWAYS_ALLOW];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Added => "+",
            Self::Removed => "-",
            Self::Changed => "~",
            Self::Unchanged => "=",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        })
    }
}

/// One field that differs, by dotted path within the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.old, &self.new) {
            (Some(old), Some(new)) => write!(f, "{}: {} -> {}", self.field, old, new),
            (None, Some(new)) => write!(f, "{}: + {}", self.field, new),
            (Some(old), None) => write!(f, "{}: - {}", self.field, old),
            (None, None) => write!(f, "{}", self.field),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryDiff {
    pub name: String,
    pub kind: DiffKind,
    pub field_changes: Vec<FieldChange>,
}

impl EntryDiff {
    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Unchanged
    }
}

/// Normalize a raw section for comparison.
///
/// Valid entries are replaced by their canonical map so that spelling
/// differences (`disabled` vs `enabled`, type aliases) do not count as
/// changes. Invalid entries are compared as written.
pub fn canonical_section(raw: &Map<String, Value>) -> Map<String, Value> {
    raw.iter()
        .map(|(name, value)| {
            let canonical = match parse_entry_value(value) {
                Ok(entry) => Value::Object(entry.to_canonical_map()),
                Err(_) => value.clone(),
            };
            (name.clone(), canonical)
        })
        .collect()
}

/// Compare the current section with the desired one.
///
/// Results follow the desired order, with removed entries last in their
/// current order.
pub fn diff_sections(current: &Map<String, Value>, desired: &Map<String, Value>) -> Vec<EntryDiff> {
    let mut diffs = Vec::new();

    for (name, new) in desired {
        let diff = match current.get(name) {
            None => EntryDiff {
                name: name.clone(),
                kind: DiffKind::Added,
                field_changes: top_level_fields(new, |v| FieldChange {
                    field: String::new(),
                    old: None,
                    new: Some(v),
                }),
            },
            Some(old) => {
                let mut changes = Vec::new();
                diff_values(old, new, String::new(), &mut changes, 0);
                EntryDiff {
                    name: name.clone(),
                    kind: if changes.is_empty() {
                        DiffKind::Unchanged
                    } else {
                        DiffKind::Changed
                    },
                    field_changes: changes,
                }
            }
        };
        diffs.push(diff);
    }

    for (name, old) in current {
        if !desired.contains_key(name) {
            diffs.push(EntryDiff {
                name: name.clone(),
                kind: DiffKind::Removed,
                field_changes: top_level_fields(old, |v| FieldChange {
                    field: String::new(),
                    old: Some(v),
                    new: None,
                }),
            });
        }
    }

    diffs
}

fn top_level_fields(value: &Value, make: impl Fn(Value) -> FieldChange) -> Vec<FieldChange> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| FieldChange {
                field: key.clone(),
                ..make(v.clone())
            })
            .collect(),
        other => vec![make(other.clone())],
    }
}

fn diff_values(old: &Value, new: &Value, path: String, changes: &mut Vec<FieldChange>, depth: usize) {
    match (old, new) {
        (Value::Object(old_obj), Value::Object(new_obj)) if depth < MAX_DIFF_DEPTH => {
            for (key, old_value) in old_obj {
                let child = child_path(&path, key);
                match new_obj.get(key) {
                    Some(new_value) => diff_values(old_value, new_value, child, changes, depth + 1),
                    None => changes.push(FieldChange {
                        field: child,
                        old: Some(old_value.clone()),
                        new: None,
                    }),
                }
            }
            for (key, new_value) in new_obj {
                if !old_obj.contains_key(key) {
                    changes.push(FieldChange {
                        field: child_path(&path, key),
                        old: None,
                        new: Some(new_value.clone()),
                    });
                }
            }
        }
        (Value::Array(old_items), Value::Array(new_items))
            if SET_FIELDS.contains(&path.as_str()) && same_members(old_items, new_items) => {}
        _ if old != new => changes.push(FieldChange {
            field: path,
            old: Some(old.clone()),
            new: Some(new.clone()),
        }),
        _ => {}
    }
}

fn same_members(a: &[Value], b: &[Value]) -> bool {
    a.iter().all(|item| b.contains(item)) && b.iter().all(|item| a.contains(item))
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Unified diff of two file contents, empty when they are identical.
pub fn text_preview(label: &str, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{label}"), &format!("b/{label}"))
        .to_string()
}
