//! Row handles and row identity values.
//!
//! A [`Row`] is a cheap, reference-counted handle to an immutable record.
//! Two handles are "the same row" by reference when they point at the same
//! record ([`Row::ptr_eq`]); they are "the same logical row" when a row key
//! resolves both to equal [`RowId`]s.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::options::TreeProps;

/// Field carrying a pre-resolved identity when rows are loaded from JSON.
pub const IDENTITY_TAG_FIELD: &str = "__KEY__";

/// A resolved row identity.
///
/// Identities compare by their text form, the way object keys do: `1`,
/// `1.0` and `"1"` are the same identity. The variant only records what
/// the value was, for display and serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum RowId {
    /// A boolean field.
    Bool(bool),
    /// An integral number that fits `i64`.
    Int(i64),
    /// A string.
    Text(String),
    /// Anything else (floats, large integers, arrays, objects), kept in
    /// canonical JSON form.
    Other(String),
}

impl RowId {
    /// Convert a JSON value into an identity. `null` has no identity.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64().or_else(|| n.as_f64().and_then(integral)) {
                Some(i) => Self::Int(i),
                None => Self::Other(n.to_string()),
            }),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Some(Self::Other(value.to_string())),
        }
    }

    /// The text form identities are compared by.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Text(s) | Self::Other(s) => Cow::Borrowed(s),
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

impl PartialEq for RowId {
    fn eq(&self, other: &Self) -> bool {
        self.as_key() == other.as_key()
    }
}

impl Eq for RowId {}

impl Hash for RowId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl PartialOrd for RowId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_key().cmp(&other.as_key())
    }
}

impl TryFrom<Value> for RowId {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        Self::from_value(&value).ok_or_else(|| "null is not a row identity".to_string())
    }
}

impl From<RowId> for Value {
    fn from(id: RowId) -> Self {
        match id {
            RowId::Bool(b) => Value::Bool(b),
            RowId::Int(i) => Value::from(i),
            RowId::Text(s) => Value::String(s),
            RowId::Other(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        }
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RowId {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) | Self::Other(s) => f.write_str(s),
        }
    }
}

struct RowRecord {
    fields: Value,
    children: Option<Vec<Row>>,
    lazy: bool,
    identity_tag: Option<RowId>,
}

/// A shared handle to a table row.
///
/// Cloning a `Row` clones the handle, not the record, so clones stay
/// reference-equal to the original.
#[derive(Clone)]
pub struct Row(Arc<RowRecord>);

static_assertions::assert_impl_all!(Row: Send, Sync);

impl Row {
    /// Create a leaf row from its fields.
    pub fn new(fields: Value) -> Self {
        RowBuilder::new(fields).build()
    }

    /// Start building a row with children, a lazy marker or an identity tag.
    pub fn builder(fields: Value) -> RowBuilder {
        RowBuilder::new(fields)
    }

    /// Convert a JSON object into a row, recursively.
    ///
    /// The array under `props.children` becomes the row's children and a
    /// truthy `props.has_children` marks the row lazy. Both keys are removed
    /// from the stored fields. A non-null `__KEY__` field becomes the
    /// identity tag and is kept as a field.
    pub fn from_json(value: Value, props: &TreeProps) -> Self {
        let mut fields = value;
        let mut builder_children = None;
        let mut lazy = false;
        let mut tag = None;

        if let Value::Object(map) = &mut fields {
            if let Some(Value::Array(children)) = map.remove(&props.children) {
                builder_children = Some(
                    children
                        .into_iter()
                        .map(|child| Row::from_json(child, props))
                        .collect(),
                );
            }
            lazy = map.remove(&props.has_children).is_some_and(|flag| is_truthy(&flag));
            tag = map.get(IDENTITY_TAG_FIELD).and_then(RowId::from_value);
        }

        let mut builder = RowBuilder::new(fields).lazy(lazy);
        if let Some(children) = builder_children {
            builder = builder.children(children);
        }
        if let Some(tag) = tag {
            builder = builder.identity_tag(tag);
        }
        builder.build()
    }

    /// Parse a JSON array of rows.
    pub fn list_from_json_str(text: &str, props: &TreeProps) -> Result<Vec<Row>> {
        let values: Vec<Value> = serde_json::from_str(text)?;
        Ok(values.into_iter().map(|v| Row::from_json(v, props)).collect())
    }

    /// The row's fields.
    pub fn fields(&self) -> &Value {
        &self.0.fields
    }

    /// A top-level field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.fields.get(field)
    }

    /// Loaded child rows, if the row has a children collection.
    pub fn children(&self) -> Option<&[Row]> {
        self.0.children.as_deref()
    }

    /// Whether the row has at least one loaded child.
    pub fn has_loaded_children(&self) -> bool {
        self.0.children.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Whether the row's children are not loaded yet.
    pub fn is_lazy(&self) -> bool {
        self.0.lazy
    }

    /// The pre-resolved identity, if any.
    pub fn identity_tag(&self) -> Option<&RowId> {
        self.0.identity_tag.as_ref()
    }

    /// Whether two handles refer to the same record.
    pub fn ptr_eq(a: &Row, b: &Row) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Row");
        s.field("fields", &self.0.fields);
        if let Some(children) = &self.0.children {
            s.field("children", &children.len());
        }
        if self.0.lazy {
            s.field("lazy", &true);
        }
        if let Some(tag) = &self.0.identity_tag {
            s.field("identity_tag", tag);
        }
        s.finish()
    }
}

/// Builder for rows that carry more than fields.
pub struct RowBuilder {
    fields: Value,
    children: Option<Vec<Row>>,
    lazy: bool,
    identity_tag: Option<RowId>,
}

impl RowBuilder {
    fn new(fields: Value) -> Self {
        Self {
            fields,
            children: None,
            lazy: false,
            identity_tag: None,
        }
    }

    /// Attach loaded child rows.
    pub fn children(mut self, children: Vec<Row>) -> Self {
        self.children = Some(children);
        self
    }

    /// Mark the row as having children that are not loaded yet.
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Attach a pre-resolved identity that bypasses key resolution.
    pub fn identity_tag(mut self, id: impl Into<RowId>) -> Self {
        self.identity_tag = Some(id.into());
        self
    }

    /// Finish the row.
    pub fn build(self) -> Row {
        Row(Arc::new(RowRecord {
            fields: self.fields,
            children: self.children,
            lazy: self.lazy,
            identity_tag: self.identity_tag,
        }))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reference-identity set over rows.
#[derive(Default)]
pub(crate) struct RowRefSet(HashSet<usize>);

impl RowRefSet {
    pub(crate) fn from_rows<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Self {
        Self(rows.into_iter().map(Row::addr).collect())
    }

    pub(crate) fn contains(&self, row: &Row) -> bool {
        self.0.contains(&row.addr())
    }

    /// Add `row`; returns whether it was not present yet.
    pub(crate) fn insert(&mut self, row: &Row) -> bool {
        self.0.insert(row.addr())
    }
}

/// Add, remove or flip `row` in `list` by reference.
///
/// `desired` of `None` toggles; `Some(state)` only acts when membership
/// differs from `state`. Returns whether the list changed.
pub(crate) fn toggle_membership(list: &mut Vec<Row>, row: &Row, desired: Option<bool>) -> bool {
    let index = list.iter().position(|r| Row::ptr_eq(r, row));
    let target = desired.unwrap_or(index.is_none());

    match (index, target) {
        (None, true) => {
            list.push(row.clone());
            true
        }
        (Some(i), false) => {
            list.remove(i);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clone_is_reference_equal() {
        let row = Row::new(json!({"id": 1}));
        let clone = row.clone();
        let twin = Row::new(json!({"id": 1}));

        assert!(Row::ptr_eq(&row, &clone));
        assert!(!Row::ptr_eq(&row, &twin));
    }

    #[test]
    fn test_from_json_lifts_tree_fields() {
        let row = Row::from_json(
            json!({
                "id": 1,
                "children": [{"id": 2}, {"id": 3, "hasChildren": true}],
                "__KEY__": "k1"
            }),
            &TreeProps::default(),
        );

        assert!(row.get("children").is_none());
        assert_eq!(row.get("id"), Some(&json!(1)));
        assert_eq!(row.identity_tag(), Some(&RowId::from("k1")));

        let children = row.children().unwrap();
        assert_eq!(children.len(), 2);
        assert!(!children[0].is_lazy());
        assert!(children[1].is_lazy());
        assert!(children[1].get("hasChildren").is_none());
    }

    #[test]
    fn test_from_json_custom_props() {
        let props = TreeProps {
            children: "items".into(),
            has_children: "lazy".into(),
        };
        let row = Row::from_json(json!({"items": [{"id": 2}], "lazy": 1}), &props);
        assert!(row.is_lazy());
        assert!(row.has_loaded_children());
    }

    #[test]
    fn test_row_id_from_value() {
        assert_eq!(RowId::from_value(&json!(null)), None);
        assert_eq!(RowId::from_value(&json!(7)), Some(RowId::Int(7)));
        assert_eq!(RowId::from_value(&json!("7")), Some(RowId::Text("7".into())));
        assert_eq!(RowId::from_value(&json!(2.0)), Some(RowId::Int(2)));
        assert_eq!(RowId::from_value(&json!(1.5)), Some(RowId::Other("1.5".into())));
    }

    #[test]
    fn test_row_id_compares_by_text_form() {
        use std::collections::HashSet;

        assert_eq!(RowId::Int(7), RowId::from("7"));
        assert_eq!(RowId::Bool(true), RowId::from("true"));
        assert_ne!(RowId::Int(7), RowId::from("07"));

        let ids: HashSet<RowId> = [RowId::Int(1), RowId::from("1"), RowId::Int(2)].into_iter().collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&RowId::from_value(&json!(2.0)).unwrap()));
    }

    #[test]
    fn test_row_id_deserialize() {
        let ids: Vec<RowId> = serde_json::from_str(r#"[1, "a", true]"#).unwrap();
        assert_eq!(ids, vec![RowId::Int(1), RowId::from("a"), RowId::Bool(true)]);
        assert!(serde_json::from_str::<RowId>("null").is_err());
    }

    #[test]
    fn test_toggle_membership() {
        let row = Row::new(json!({"id": 1}));
        let mut list = Vec::new();

        assert!(toggle_membership(&mut list, &row, None));
        assert_eq!(list.len(), 1);
        assert!(!toggle_membership(&mut list, &row, Some(true)));
        assert_eq!(list.len(), 1);
        assert!(toggle_membership(&mut list, &row, None));
        assert!(list.is_empty());
        assert!(!toggle_membership(&mut list, &row, Some(false)));
    }
}
