//! Integration tests for the table store's observable behavior.

use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_grid::table::{flatten, FlattenOptions};
use horizon_grid::{
    Column, FixedSide, Row, RowId, RowKey, TableError, TableEvent, TableOptions, TableStore,
    TreeProps,
};
use parking_lot::Mutex;
use serde_json::json;

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn rows(ids: &[&str]) -> Vec<Row> {
    ids.iter().map(|id| Row::new(json!({ "id": id }))).collect()
}

fn ids(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.get("id").and_then(|v| v.as_str()).unwrap_or("?").to_string())
        .collect()
}

struct Recorder {
    events: Arc<Mutex<Vec<TableEvent>>>,
}

impl Recorder {
    fn attach(store: &TableStore) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        store
            .events()
            .connect(move |event: &TableEvent| events_clone.lock().push(event.clone()));
        Self { events }
    }

    fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(TableEvent::name).collect()
    }

    fn clear(&self) {
        self.events.lock().clear();
    }

    fn last_selection(&self) -> Option<Vec<Row>> {
        self.events.lock().iter().rev().find_map(|event| match event {
            TableEvent::SelectionChange { selection } => Some(selection.clone()),
            _ => None,
        })
    }
}

#[test]
fn test_explicit_toggle_is_idempotent() {
    setup();
    let mut store = TableStore::new(TableOptions::default().with_row_key("id"));
    let data = rows(&["a", "b"]);
    store.set_data(data.clone());
    let recorder = Recorder::attach(&store);

    assert!(store.toggle_row_selection(&data[0], Some(true), true));
    assert!(!store.toggle_row_selection(&data[0], Some(true), true));
    assert_eq!(recorder.names(), vec!["select", "selection-change"]);

    recorder.clear();
    assert!(store.toggle_row_expansion(&data[1], Some(true)));
    assert!(!store.toggle_row_expansion(&data[1], Some(true)));
    assert_eq!(recorder.names(), vec!["expand-change"]);
}

#[test]
fn test_rows_never_appear_twice() {
    setup();
    let mut store = TableStore::default();
    let data = rows(&["a", "b"]);
    store.set_data(data.clone());

    for desired in [None, Some(true), Some(true), None, None, Some(false), Some(true)] {
        store.toggle_row_selection(&data[0], desired, false);
        store.toggle_row_expansion(&data[0], desired);
        let selected = store.selection().iter().filter(|r| Row::ptr_eq(r, &data[0])).count();
        let expanded = store
            .expanded_rows()
            .iter()
            .filter(|r| Row::ptr_eq(r, &data[0]))
            .count();
        assert!(selected <= 1);
        assert!(expanded <= 1);
    }
    assert!(store.is_selected(&data[0]));
}

#[test]
fn test_bulk_updates_never_duplicate_rows() {
    setup();
    let mut store = TableStore::new(
        TableOptions::default()
            .with_row_key("id")
            .with_reserve_selection(true),
    );
    let data = rows(&["a", "b"]);
    store.set_data(data.clone());

    let keys = [RowId::from("a"), RowId::from("a"), RowId::from("b"), RowId::from("a")];
    store.set_expand_row_keys(&keys).unwrap();
    assert_eq!(ids(store.expanded_rows()), vec!["a", "b"]);
    store.toggle_row_expansion(&data[0], Some(false));
    assert!(!store.is_row_expanded(&data[0]));

    store.toggle_row_selection(&data[0], Some(true), false);
    store.set_data(vec![data[0].clone(), data[1].clone(), data[0].clone()]);
    assert_eq!(store.selection().len(), 1);
    store.toggle_row_selection(&data[0], Some(false), false);
    assert!(!store.is_selected(&data[0]));
}

#[test]
fn test_identities_match_across_number_and_text() {
    setup();
    let mut store = TableStore::new(TableOptions::default().with_row_key("id"));
    store.set_data_from_json(r#"[{"id": 1}, {"id": 2.0}]"#).unwrap();

    store
        .set_expand_row_keys(&[RowId::from("1"), RowId::Int(2)])
        .unwrap();
    assert_eq!(store.expanded_rows().len(), 2);

    let selected = store.data()[0].clone();
    store.toggle_row_selection(&selected, Some(true), false);
    store.set_data_from_json(r#"[{"id": "1"}, {"id": "2"}]"#).unwrap();
    assert_eq!(store.selection().len(), 1);
    assert!(Row::ptr_eq(&store.selection()[0], &selected));
    assert_eq!(store.expanded_rows().len(), 2);
}

#[test]
fn test_select_all_alternates() {
    setup();
    let mut store = TableStore::default();
    let data = rows(&["a", "b", "c"]);
    store.set_data(data.clone());
    let recorder = Recorder::attach(&store);
    let delay = store.options().toggle_all_delay();
    let mut now = Instant::now();

    for round in 0..4 {
        store.toggle_all_selection_at(now);
        now += delay;
        assert!(store.process_pending(now));
        if round % 2 == 0 {
            assert_eq!(store.selection().len(), 3);
            assert!(store.is_all_selected());
        } else {
            assert!(store.selection().is_empty());
            assert!(!store.is_all_selected());
        }
    }
    assert_eq!(recorder.names().iter().filter(|n| **n == "select-all").count(), 4);
}

#[test]
fn test_select_all_leaves_unselectable_rows_alone() {
    setup();
    let mut store = TableStore::default();
    let data = rows(&["a", "locked", "c"]);
    store.set_data(data.clone());
    store.set_selectable(|row: &Row, _index: usize| row.get("id") != Some(&json!("locked")));

    store.toggle_all_selection();
    store.flush_pending();
    assert_eq!(ids(store.selection()), vec!["a", "c"]);
    assert!(store.is_all_selected());

    store.toggle_all_selection();
    store.flush_pending();
    assert!(store.selection().is_empty());

    // A row selected by hand stays untouched by select-all.
    store.toggle_row_selection(&data[1], Some(true), false);
    store.set_select_on_indeterminate(true);
    store.toggle_all_selection();
    store.flush_pending();
    assert_eq!(ids(store.selection()), vec!["locked", "a", "c"]);
    store.toggle_all_selection();
    store.flush_pending();
    assert_eq!(ids(store.selection()), vec!["locked"]);
}

#[test]
fn test_select_all_with_nothing_selectable_is_never_all_selected() {
    setup();
    let mut store = TableStore::default();
    store.set_data(rows(&["a", "b"]));
    store.set_selectable(|_: &Row, _: usize| false);
    let recorder = Recorder::attach(&store);

    store.toggle_all_selection();
    store.flush_pending();
    assert!(store.selection().is_empty());
    assert!(!store.is_all_selected());
    assert_eq!(recorder.names(), vec!["select-all"]);
}

#[test]
fn test_rapid_select_all_calls_collapse() {
    setup();
    let mut store = TableStore::new(
        TableOptions::default().with_toggle_all_delay(Duration::from_millis(10)),
    );
    store.set_data(rows(&["a", "b"]));
    let recorder = Recorder::attach(&store);
    let start = Instant::now();

    for step in 0..5 {
        store.toggle_all_selection_at(start + Duration::from_millis(step * 2));
    }
    assert!(!store.process_pending(start + Duration::from_millis(12)));
    assert!(store.process_pending(start + Duration::from_millis(18)));
    assert_eq!(recorder.names(), vec!["selection-change", "select-all"]);
    assert!(store.is_all_selected());
}

#[test]
fn test_reconciliation_drops_stale_rows() {
    setup();
    let mut store = TableStore::new(TableOptions::default().with_row_key("id"));
    let old = rows(&["A", "B", "C"]);
    store.set_data(old.clone());
    for row in &old {
        store.toggle_row_selection(row, Some(true), false);
    }
    let recorder = Recorder::attach(&store);

    store.set_data(rows(&["B", "C", "D"]));

    assert_eq!(ids(store.selection()), vec!["B", "C"]);
    assert!(Row::ptr_eq(&store.selection()[0], &old[1]));
    assert!(Row::ptr_eq(&store.selection()[1], &old[2]));
    assert_eq!(recorder.names(), vec!["selection-change"]);
    assert_eq!(ids(&recorder.last_selection().unwrap()), vec!["B", "C"]);
    assert!(!store.is_all_selected());
}

#[test]
fn test_no_op_suppression() {
    setup();
    let mut store = TableStore::new(TableOptions::default().with_row_key("id"));
    let data = rows(&["A", "B"]);
    store.set_data(data.clone());
    let recorder = Recorder::attach(&store);

    store.clear_selection();
    assert!(recorder.names().is_empty());

    store.toggle_row_selection(&data[0], Some(true), false);
    recorder.clear();
    store.set_data(rows(&["A", "B", "C"]));
    assert!(!store.reconcile_after_data_change());
    assert!(recorder.names().is_empty());
}

#[test]
fn test_without_key_replaced_rows_are_dropped() {
    setup();
    let mut store = TableStore::default();
    let data = rows(&["A"]);
    store.set_data(data.clone());
    store.toggle_row_selection(&data[0], Some(true), false);
    store.toggle_row_expansion(&data[0], Some(true));

    store.set_data(rows(&["A"]));
    assert!(store.selection().is_empty());
    assert!(store.expanded_rows().is_empty());
}

#[test]
fn test_function_row_key() {
    setup();
    let mut store = TableStore::default();
    store.set_row_key(Some(RowKey::function(|row: &Row| {
        row.get("code").and_then(|v| v.as_str()).map(|code| RowId::from(code.to_lowercase()))
    })));
    let old = vec![Row::new(json!({"code": "X1"})), Row::new(json!({"code": "Y2"}))];
    store.set_data(old.clone());
    store.toggle_row_selection(&old[1], Some(true), false);

    store.set_data(vec![Row::new(json!({"code": "y2"}))]);
    assert_eq!(store.selection().len(), 1);
    assert!(Row::ptr_eq(&store.selection()[0], &old[1]));
}

#[test]
fn test_column_normalization_example() {
    setup();
    let columns: Vec<Column> = serde_json::from_value(json!([
        {"id": "selection", "type": "selection"},
        {"id": "a"},
        {"id": "b", "fixed": "right"},
        {"id": "c", "fixed": true}
    ]))
    .unwrap();

    let mut store = TableStore::default();
    store.set_columns(columns);
    let layout = store.column_layout();

    let names = |columns: &[Column]| columns.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
    assert_eq!(names(layout.fixed_columns()), vec!["selection", "c"]);
    assert_eq!(layout.fixed_columns()[0].fixed, FixedSide::Left);
    assert_eq!(names(layout.right_fixed_columns()), vec!["b"]);
    assert_eq!(names(layout.leaf_columns()), vec!["a"]);
    assert!(layout.is_complex());
    assert_eq!(names(layout.columns()), vec!["selection", "c", "a", "b"]);
}

#[test]
fn test_lazy_node_traversal() {
    setup();
    let roots = Row::list_from_json_str(
        r#"[{"id": 1, "hasChildren": true, "children": [{"id": 2}]}]"#,
        &TreeProps::default(),
    )
    .unwrap();

    let nodes = flatten(&roots, FlattenOptions::default());
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].row.get("id"), Some(&json!(1)));
    assert_eq!(nodes[0].level, 0);

    let mut store = TableStore::new(TableOptions::default().with_expand_selectable(true));
    store.set_data(roots);
    assert_eq!(store.visible_rows().len(), 1);
}

#[test]
fn test_missing_row_key_leaves_expansion_unchanged() {
    setup();
    let mut store = TableStore::default();
    let data = rows(&["A", "B"]);
    store.set_data(data.clone());
    store.toggle_row_expansion(&data[0], Some(true));

    let err = store.set_expand_row_keys(&[RowId::from("B")]).unwrap_err();
    assert!(matches!(err, TableError::MissingRowKey { .. }));
    assert_eq!(store.expanded_rows().len(), 1);
    assert!(Row::ptr_eq(&store.expanded_rows()[0], &data[0]));

    assert!(matches!(
        store.set_expand_row_keys_adapter(&[RowId::from("B")]),
        Err(TableError::MissingRowKey { .. })
    ));
    assert!(matches!(store.row_identity(None), Err(TableError::InvalidRow)));
}

#[test]
fn test_default_expand_all_expands_top_level_rows() {
    setup();
    let mut store = TableStore::new(
        TableOptions::default()
            .with_row_key("id")
            .with_default_expand_all(true),
    );
    let child = Row::new(json!({"id": "child"}));
    let parent = Row::builder(json!({"id": "parent"})).children(vec![child.clone()]).build();
    store.set_data(vec![parent.clone(), Row::new(json!({"id": "leaf"}))]);

    assert_eq!(ids(store.expanded_rows()), vec!["parent", "leaf"]);
    assert!(!store.is_row_expanded(&child));
    assert!(store.is_tree_expanded(&parent));
}

#[test]
fn test_options_from_toml_drive_store() {
    setup();
    let options = TableOptions::from_toml_str(
        r#"
        rowKey = "meta.uid"
        expandSelectable = true

        [treeProps]
        children = "items"
        hasChildren = "lazy"
        "#,
    )
    .unwrap();
    let mut store = TableStore::new(options);
    store
        .set_data_from_json(
            r#"[
                {"meta": {"uid": "p"}, "items": [{"meta": {"uid": "c"}}]},
                {"meta": {"uid": "q"}, "lazy": true}
            ]"#,
        )
        .unwrap();

    assert_eq!(store.visible_rows().len(), 3);
    store.toggle_all_selection();
    store.flush_pending();
    assert_eq!(store.selection().len(), 3);
    assert!(store.is_all_selected());
}
