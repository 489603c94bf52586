#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn rect(x: f64, y: f64) -> Element {
    Element::new("chart", x, y, 100.0, 80.0)
}

fn child_of(parent: &Element, cell: usize) -> Element {
    Element { parent_id: Some(parent.id), cell_index: Some(cell), ..rect(0.0, 0.0) }
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn geometry_edges_and_centers() {
    let g = Geometry::new(10.0, 20.0, 40.0, 60.0);
    assert_eq!(g.right(), 50.0);
    assert_eq!(g.bottom(), 80.0);
    assert_eq!(g.center_x(), 30.0);
    assert_eq!(g.center_y(), 50.0);
}

#[test]
fn geometry_contains_is_inclusive() {
    let g = Geometry::new(0.0, 0.0, 10.0, 10.0);
    assert!(g.contains(0.0, 0.0));
    assert!(g.contains(10.0, 10.0));
    assert!(!g.contains(10.1, 5.0));
}

#[test]
fn geometry_new_defaults_rank_and_opacity() {
    let g = Geometry::new(1.0, 2.0, 30.0, 40.0);
    assert_eq!(g.z_index, 0);
    assert_eq!(g.opacity, 1.0);
}

// =============================================================
// Element
// =============================================================

#[test]
fn element_new_is_visible_unlocked_top_level() {
    let e = rect(5.0, 6.0);
    assert!(e.visible);
    assert!(!e.locked);
    assert!(e.parent_id.is_none());
    assert!(e.group_id.is_none());
    assert!(!e.is_container());
}

#[test]
fn element_container_carries_cells() {
    let e = Element::container("grid", 0.0, 0.0, 300.0, 200.0, vec![CellMode::Free, CellMode::Fill]);
    assert!(e.is_container());
    let layout = e.container.as_ref().unwrap();
    assert_eq!(layout.cell(1), Some(CellMode::Fill));
    assert_eq!(layout.cell(2), None);
}

#[test]
fn element_serde_roundtrip_keeps_relations() {
    let parent = Element::container("grid", 0.0, 0.0, 300.0, 200.0, vec![CellMode::Fill]);
    let child = child_of(&parent, 0);
    let text = serde_json::to_string(&child).unwrap();
    let back: Element = serde_json::from_str(&text).unwrap();
    assert_eq!(back.id, child.id);
    assert_eq!(back.parent_id, Some(parent.id));
    assert_eq!(back.cell_index, Some(0));
}

#[test]
fn element_serde_omits_empty_relations() {
    let value = serde_json::to_value(rect(0.0, 0.0)).unwrap();
    assert!(value.get("parent_id").is_none());
    assert!(value.get("group_id").is_none());
    assert!(value.get("container").is_none());
}

#[test]
fn cell_mode_serde_snake_case() {
    assert_eq!(serde_json::to_string(&CellMode::Fill).unwrap(), "\"fill\"");
    assert_eq!(serde_json::to_string(&CellMode::Free).unwrap(), "\"free\"");
}

// =============================================================
// ElementPatch
// =============================================================

#[test]
fn patch_default_is_empty() {
    assert!(ElementPatch::default().is_empty());
    assert!(!ElementPatch::position(1.0, 2.0).is_empty());
}

#[test]
fn patch_serializes_only_present_fields() {
    let value = serde_json::to_value(ElementPatch::position(3.0, 4.0)).unwrap();
    assert_eq!(value, json!({"x": 3.0, "y": 4.0}));
}

// =============================================================
// DocStore: basics
// =============================================================

#[test]
fn store_new_is_empty() {
    let store = DocStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}

#[test]
fn store_insert_and_get() {
    let mut store = DocStore::new();
    let e = rect(1.0, 2.0);
    let id = e.id;
    store.insert(e);
    assert!(store.contains(&id));
    assert_eq!(store.get(&id).unwrap().geometry.x, 1.0);
}

#[test]
fn store_iter_preserves_insertion_order() {
    let mut store = DocStore::new();
    let ids: Vec<ElementId> = (0..5)
        .map(|i| {
            let e = rect(f64::from(i), 0.0);
            let id = e.id;
            store.insert(e);
            id
        })
        .collect();
    let seen: Vec<ElementId> = store.iter().map(|e| e.id).collect();
    assert_eq!(seen, ids);
}

#[test]
fn store_replace_keeps_position() {
    let mut store = DocStore::new();
    let a = rect(0.0, 0.0);
    let b = rect(0.0, 0.0);
    let (id_a, id_b) = (a.id, b.id);
    store.insert(a.clone());
    store.insert(b);
    store.insert(Element { kind: "text".into(), ..a });
    let seen: Vec<ElementId> = store.iter().map(|e| e.id).collect();
    assert_eq!(seen, vec![id_a, id_b]);
    assert_eq!(store.get(&id_a).unwrap().kind, "text");
}

#[test]
fn store_load_snapshot_replaces() {
    let mut store = DocStore::new();
    let old = rect(0.0, 0.0);
    let old_id = old.id;
    store.insert(old);
    let fresh = rect(0.0, 0.0);
    let fresh_id = fresh.id;
    store.load_snapshot(vec![fresh]);
    assert!(!store.contains(&old_id));
    assert!(store.contains(&fresh_id));
}

// =============================================================
// DocStore: apply_patch
// =============================================================

#[test]
fn apply_patch_merges_present_fields_only() {
    let mut store = DocStore::new();
    let e = rect(10.0, 20.0);
    let id = e.id;
    store.insert(e);
    assert!(store.apply_patch(&id, &ElementPatch { x: Some(99.0), ..Default::default() }, 10.0));
    let g = store.get(&id).unwrap().geometry;
    assert_eq!(g.x, 99.0);
    assert_eq!(g.y, 20.0);
    assert_eq!(g.width, 100.0);
}

#[test]
fn apply_patch_floors_size() {
    let mut store = DocStore::new();
    let e = rect(0.0, 0.0);
    let id = e.id;
    store.insert(e);
    store.apply_patch(&id, &ElementPatch { width: Some(3.0), height: Some(-20.0), ..Default::default() }, 10.0);
    let g = store.get(&id).unwrap().geometry;
    assert_eq!(g.width, 10.0);
    assert_eq!(g.height, 10.0);
}

#[test]
fn apply_patch_clamps_opacity() {
    let mut store = DocStore::new();
    let e = rect(0.0, 0.0);
    let id = e.id;
    store.insert(e);
    store.apply_patch(&id, &ElementPatch { opacity: Some(1.7), ..Default::default() }, 10.0);
    assert_eq!(store.get(&id).unwrap().geometry.opacity, 1.0);
}

#[test]
fn apply_patch_flags() {
    let mut store = DocStore::new();
    let e = rect(0.0, 0.0);
    let id = e.id;
    store.insert(e);
    let patch = ElementPatch { visible: Some(false), locked: Some(true), ..Default::default() };
    store.apply_patch(&id, &patch, 10.0);
    let e = store.get(&id).unwrap();
    assert!(!e.visible);
    assert!(e.locked);
}

#[test]
fn apply_patch_merges_and_deletes_props() {
    let mut store = DocStore::new();
    let e = Element { props: json!({"title": "old", "color": "red"}), ..rect(0.0, 0.0) };
    let id = e.id;
    store.insert(e);
    let patch = ElementPatch { props: Some(json!({"title": "new", "color": null})), ..Default::default() };
    store.apply_patch(&id, &patch, 10.0);
    assert_eq!(store.get(&id).unwrap().props, json!({"title": "new"}));
}

#[test]
fn apply_patch_props_on_null_bag_creates_object() {
    let mut store = DocStore::new();
    let e = rect(0.0, 0.0);
    let id = e.id;
    store.insert(e);
    let patch = ElementPatch { props: Some(json!({"a": 1})), ..Default::default() };
    store.apply_patch(&id, &patch, 10.0);
    assert_eq!(store.get(&id).unwrap().props, json!({"a": 1}));
}

#[test]
fn apply_patch_unknown_id_returns_false() {
    let mut store = DocStore::new();
    assert!(!store.apply_patch(&Uuid::new_v4(), &ElementPatch::position(1.0, 1.0), 10.0));
}

// =============================================================
// DocStore: relations
// =============================================================

#[test]
fn children_of_top_level_scope() {
    let mut store = DocStore::new();
    let grid = Element::container("grid", 0.0, 0.0, 300.0, 200.0, vec![CellMode::Free]);
    let inner = child_of(&grid, 0);
    let loose = rect(0.0, 0.0);
    let (grid_id, inner_id, loose_id) = (grid.id, inner.id, loose.id);
    store.insert(grid);
    store.insert(inner);
    store.insert(loose);
    assert_eq!(store.children_of(None), vec![grid_id, loose_id]);
    assert_eq!(store.children_of(Some(grid_id)), vec![inner_id]);
}

#[test]
fn descendants_are_transitive() {
    let mut store = DocStore::new();
    let outer = Element::container("grid", 0.0, 0.0, 300.0, 200.0, vec![CellMode::Free]);
    let mid = Element { container: Some(ContainerLayout::new(vec![CellMode::Free])), ..child_of(&outer, 0) };
    let leaf = child_of(&mid, 0);
    let (outer_id, mid_id, leaf_id) = (outer.id, mid.id, leaf.id);
    store.insert(outer);
    store.insert(mid);
    store.insert(leaf);
    let desc = store.descendants(outer_id);
    assert_eq!(desc.len(), 2);
    assert!(desc.contains(&mid_id));
    assert!(desc.contains(&leaf_id));
}

#[test]
fn remove_cascade_removes_subtree_only() {
    let mut store = DocStore::new();
    let outer = Element::container("grid", 0.0, 0.0, 300.0, 200.0, vec![CellMode::Free]);
    let leaf = child_of(&outer, 0);
    let other = rect(0.0, 0.0);
    let (outer_id, other_id) = (outer.id, other.id);
    store.insert(outer);
    store.insert(leaf);
    store.insert(other);
    let removed = store.remove_cascade(&outer_id);
    assert_eq!(removed.len(), 2);
    assert_eq!(removed[0].id, outer_id);
    assert_eq!(store.len(), 1);
    assert!(store.contains(&other_id));
}

#[test]
fn remove_cascade_unknown_is_empty() {
    let mut store = DocStore::new();
    store.insert(rect(0.0, 0.0));
    assert!(store.remove_cascade(&Uuid::new_v4()).is_empty());
    assert_eq!(store.len(), 1);
}

// =============================================================
// DocStore: ordering
// =============================================================

#[test]
fn scope_by_rank_sorts_by_z_index() {
    let mut store = DocStore::new();
    let mut a = rect(0.0, 0.0);
    let mut b = rect(0.0, 0.0);
    a.geometry.z_index = 1;
    b.geometry.z_index = 0;
    let (id_a, id_b) = (a.id, b.id);
    store.insert(a);
    store.insert(b);
    assert_eq!(store.scope_by_rank(None), vec![id_b, id_a]);
}

#[test]
fn paint_order_nests_children_after_container() {
    let mut store = DocStore::new();
    let mut grid = Element::container("grid", 0.0, 0.0, 300.0, 200.0, vec![CellMode::Free]);
    let mut top = rect(0.0, 0.0);
    let inner = child_of(&grid, 0);
    grid.geometry.z_index = 0;
    top.geometry.z_index = 1;
    let (grid_id, top_id, inner_id) = (grid.id, top.id, inner.id);
    store.insert(top);
    store.insert(inner);
    store.insert(grid);
    let order: Vec<ElementId> = store.paint_order().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![grid_id, inner_id, top_id]);
}

// =============================================================
// DocStore: repair helpers
// =============================================================

#[test]
fn floor_sizes_raises_only_undersized() {
    let mut store = DocStore::new();
    let small = Element::new("chart", 0.0, 0.0, 4.0, 50.0);
    let fine = rect(0.0, 0.0);
    let (small_id, fine_id) = (small.id, fine.id);
    store.insert(small);
    store.insert(fine);

    assert_eq!(store.floor_sizes(10.0), vec![small_id]);
    let g = store.get(&small_id).unwrap().geometry;
    assert_eq!((g.width, g.height), (10.0, 50.0));
    assert_eq!(store.get(&fine_id).unwrap().geometry.width, 100.0);
}

#[test]
fn ancestors_nearest_first_and_cycle_safe() {
    let mut store = DocStore::new();
    let outer = Element::container("grid", 0.0, 0.0, 400.0, 400.0, vec![CellMode::Free]);
    let inner = Element { container: Some(ContainerLayout::new(vec![CellMode::Free])), ..child_of(&outer, 0) };
    let leaf = child_of(&inner, 0);
    let (outer_id, inner_id, leaf_id) = (outer.id, inner.id, leaf.id);
    store.insert(outer);
    store.insert(inner);
    store.insert(leaf);
    assert_eq!(store.ancestors(leaf_id), vec![inner_id, outer_id]);
    assert!(store.ancestors(outer_id).is_empty());

    if let Some(e) = store.get_mut(&outer_id) {
        e.parent_id = Some(leaf_id);
    }
    assert_eq!(store.ancestors(leaf_id), vec![inner_id, outer_id]);
}
