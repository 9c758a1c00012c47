//! Row identity resolution.
//!
//! A [`RowKey`] describes how a row's stable identity is derived: a field
//! path (dot-separated for nested access) or a key function. Rows carrying
//! a pre-resolved identity tag short-circuit both.
//!
//! A path whose segments cannot be followed (missing field, `null`, a scalar
//! where an object was expected) resolves to no identity. Rows without an
//! identity never match anything during reconciliation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::row::{Row, RowId};
use crate::error::{Result, TableError};

/// A key function. Returning `None` means the row has no identity.
pub type KeyFn = Arc<dyn Fn(&Row) -> Option<RowId> + Send + Sync>;

/// How a row's identity is derived.
#[derive(Clone)]
pub enum RowKey {
    /// A field path; `"a.b.c"` descends nested objects.
    Path(FieldPath),
    /// A user function.
    Function(KeyFn),
}

impl RowKey {
    /// A key read from a (possibly dotted) field path.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(FieldPath::new(path))
    }

    /// A key computed by a function.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Row) -> Option<RowId> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    /// Resolve the identity of `row`.
    pub fn resolve(&self, row: &Row) -> Option<RowId> {
        if let Some(tag) = row.identity_tag() {
            return Some(tag.clone());
        }
        match self {
            Self::Path(path) => path.lookup(row.fields()).and_then(RowId::from_value),
            Self::Function(f) => f(row),
        }
    }
}

impl fmt::Debug for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(&path.raw).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<&str> for RowKey {
    fn from(path: &str) -> Self {
        Self::path(path)
    }
}

impl From<String> for RowKey {
    fn from(path: String) -> Self {
        Self::path(path)
    }
}

/// A pre-split field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Split `path` on `.`.
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Follow the path from `root`. Array segments are numeric indices.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

/// Resolve a row's identity with the host-facing contract.
///
/// Fails with [`TableError::InvalidRow`] when `row` is absent. A present
/// row resolves through its identity tag first; with no key configured it
/// has no identity (`Ok(None)`).
pub fn resolve_identity(row: Option<&Row>, key: Option<&RowKey>) -> Result<Option<RowId>> {
    let row = row.ok_or(TableError::InvalidRow)?;
    if let Some(tag) = row.identity_tag() {
        return Ok(Some(tag.clone()));
    }
    Ok(key.and_then(|key| key.resolve(row)))
}

/// A row found under an identity, with its position in the source list.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    /// The row.
    pub row: Row,
    /// Its index in the list the map was built from.
    pub index: usize,
}

/// Identity → row lookup built from a row list.
///
/// When two rows share an identity the later one wins. Rows without an
/// identity are left out.
#[derive(Debug, Clone, Default)]
pub struct KeysMap {
    entries: HashMap<RowId, KeyEntry>,
}

impl KeysMap {
    /// Index `rows` by identity.
    pub fn build(rows: &[Row], key: &RowKey) -> Self {
        let entries = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                key.resolve(row).map(|id| {
                    (
                        id,
                        KeyEntry {
                            row: row.clone(),
                            index,
                        },
                    )
                })
            })
            .collect();
        Self { entries }
    }

    /// Look up an identity.
    pub fn get(&self, id: &RowId) -> Option<&KeyEntry> {
        self.entries.get(id)
    }

    /// Whether an identity is present.
    pub fn contains(&self, id: &RowId) -> bool {
        self.entries.contains_key(id)
    }

    /// Whether `row`'s identity is present. Rows without identity never are.
    pub fn contains_row(&self, row: &Row, key: &RowKey) -> bool {
        key.resolve(row).is_some_and(|id| self.contains(&id))
    }

    /// Number of distinct identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
