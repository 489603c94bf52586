#![allow(clippy::float_cmp)]

use super::*;

fn grid(store: &mut DocStore, cells: Vec<CellMode>) -> ElementId {
    let e = Element::container("grid", 0.0, 0.0, 400.0, 300.0, cells);
    let id = e.id;
    store.insert(e);
    id
}

fn chart(store: &mut DocStore) -> ElementId {
    let e = Element::new("chart", 0.0, 0.0, 50.0, 50.0);
    let id = e.id;
    store.insert(e);
    id
}

fn nested(store: &mut DocStore, parent: ElementId, cell: usize, container: bool) -> ElementId {
    let mut e = if container {
        Element::container("grid", 0.0, 0.0, 100.0, 100.0, vec![CellMode::Free])
    } else {
        Element::new("chart", 0.0, 0.0, 50.0, 50.0)
    };
    e.parent_id = Some(parent);
    e.cell_index = Some(cell);
    let id = e.id;
    store.insert(e);
    id
}

fn target(parent: ElementId, cell: usize) -> DropTarget {
    DropTarget::new(parent, cell, Point::new(100.0, 50.0))
}

// =============================================================
// check_placement: structural
// =============================================================

#[test]
fn unknown_parent_rejected() {
    let store = DocStore::new();
    let ghost = uuid::Uuid::new_v4();
    assert_eq!(
        check_placement(&store, &target(ghost, 0), false, None),
        Err(PlacementError::UnknownParent(ghost))
    );
}

#[test]
fn non_container_parent_rejected() {
    let mut store = DocStore::new();
    let plain = chart(&mut store);
    assert_eq!(
        check_placement(&store, &target(plain, 0), false, None),
        Err(PlacementError::NotAContainer(plain))
    );
}

#[test]
fn cell_out_of_range_rejected() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    assert_eq!(
        check_placement(&store, &target(g, 1), false, None),
        Err(PlacementError::CellOutOfRange { parent: g, cell: 1 })
    );
}

#[test]
fn container_into_itself_rejected() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    assert_eq!(check_placement(&store, &target(g, 0), true, Some(g)), Err(PlacementError::WouldNestInSelf(g)));
}

#[test]
fn container_into_descendant_rejected() {
    let mut store = DocStore::new();
    let outer = grid(&mut store, vec![CellMode::Free]);
    let inner = nested(&mut store, outer, 0, true);
    assert_eq!(
        check_placement(&store, &target(inner, 0), true, Some(outer)),
        Err(PlacementError::WouldNestInSelf(outer))
    );
}

// =============================================================
// check_placement: occupancy
// =============================================================

#[test]
fn free_cell_accepts_many_widgets() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    nested(&mut store, g, 0, false);
    nested(&mut store, g, 0, false);
    assert_eq!(check_placement(&store, &target(g, 0), false, None), Ok(CellMode::Free));
}

#[test]
fn cell_with_container_rejects_anything() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    nested(&mut store, g, 0, true);
    let expected = Err(PlacementError::CellHoldsContainer { parent: g, cell: 0 });
    assert_eq!(check_placement(&store, &target(g, 0), false, None), expected);
    assert_eq!(check_placement(&store, &target(g, 0), true, None), expected);
}

#[test]
fn fill_cell_caps_at_one() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Fill]);
    assert_eq!(check_placement(&store, &target(g, 0), false, None), Ok(CellMode::Fill));
    nested(&mut store, g, 0, false);
    assert_eq!(
        check_placement(&store, &target(g, 0), false, None),
        Err(PlacementError::FillCellOccupied { parent: g, cell: 0 })
    );
}

#[test]
fn container_needs_empty_cell() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    nested(&mut store, g, 0, false);
    assert_eq!(
        check_placement(&store, &target(g, 0), true, None),
        Err(PlacementError::ContainerNeedsEmptyCell { parent: g, cell: 0 })
    );
}

#[test]
fn container_into_empty_cell_accepted() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free, CellMode::Free]);
    nested(&mut store, g, 0, false);
    assert_eq!(check_placement(&store, &target(g, 1), true, None), Ok(CellMode::Free));
}

#[test]
fn incoming_element_not_counted_as_occupant() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Fill]);
    let only = nested(&mut store, g, 0, false);
    assert_eq!(check_placement(&store, &target(g, 0), false, Some(only)), Ok(CellMode::Fill));
}

// =============================================================
// drop_position
// =============================================================

#[test]
fn drop_position_fill_pins_to_origin() {
    let p = drop_position(CellMode::Fill, Point::new(300.0, 300.0), Point::new(100.0, 50.0), 2.0);
    assert_eq!(p, Point::new(0.0, 0.0));
}

#[test]
fn drop_position_free_is_cell_relative() {
    let p = drop_position(CellMode::Free, Point::new(300.0, 150.0), Point::new(100.0, 50.0), 2.0);
    assert_eq!(p, Point::new(100.0, 50.0));
}

// =============================================================
// place
// =============================================================

#[test]
fn place_sets_relation_and_position() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    let c = chart(&mut store);
    assert!(place(&mut store, c, &target(g, 0), Point::new(130.0, 70.0), 1.0));
    let e = store.get(&c).unwrap();
    assert_eq!(e.parent_id, Some(g));
    assert_eq!(e.cell_index, Some(0));
    assert_eq!((e.geometry.x, e.geometry.y), (30.0, 20.0));
}

#[test]
fn place_keeps_both_scopes_dense() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    let c = chart(&mut store);
    let d = chart(&mut store);
    store.get_mut(&c).unwrap().geometry.z_index = 1;
    store.get_mut(&d).unwrap().geometry.z_index = 2;
    nested(&mut store, g, 0, false);
    place(&mut store, c, &target(g, 0), Point::new(100.0, 50.0), 1.0);
    assert!(zorder::is_dense(&store, None));
    assert!(zorder::is_dense(&store, Some(g)));
    assert_eq!(store.get(&c).unwrap().geometry.z_index, 1);
}

#[test]
fn place_into_fill_cell_pins_position() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Fill]);
    let c = chart(&mut store);
    place(&mut store, c, &target(g, 0), Point::new(180.0, 90.0), 1.0);
    let geometry = store.get(&c).unwrap().geometry;
    assert_eq!((geometry.x, geometry.y), (0.0, 0.0));
    assert_eq!((geometry.width, geometry.height), (50.0, 50.0));
}

#[test]
fn place_rejected_changes_nothing() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Fill]);
    nested(&mut store, g, 0, false);
    let c = chart(&mut store);
    assert!(!place(&mut store, c, &target(g, 0), Point::new(180.0, 90.0), 1.0));
    assert_eq!(cell_children(&store, g, 0).len(), 1);
    assert!(store.get(&c).unwrap().parent_id.is_none());
}

#[test]
fn place_locked_is_noop() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    let c = chart(&mut store);
    store.get_mut(&c).unwrap().locked = true;
    assert!(!place(&mut store, c, &target(g, 0), Point::new(180.0, 90.0), 1.0));
}

#[test]
fn place_leaves_group() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    let a = chart(&mut store);
    let b = chart(&mut store);
    group::group(&mut store, &[a, b]).unwrap();
    place(&mut store, a, &target(g, 0), Point::new(100.0, 50.0), 1.0);
    assert!(store.get(&a).unwrap().group_id.is_none());
    assert!(store.get(&b).unwrap().group_id.is_none());
}

// =============================================================
// repair_nesting
// =============================================================

#[test]
fn in_fill_cell_reports_fill_children_only() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Fill, CellMode::Free]);
    let filled = nested(&mut store, g, 0, false);
    let free = nested(&mut store, g, 1, false);
    let top = chart(&mut store);
    assert!(in_fill_cell(&store, store.get(&filled).unwrap()));
    assert!(!in_fill_cell(&store, store.get(&free).unwrap()));
    assert!(!in_fill_cell(&store, store.get(&top).unwrap()));
}

#[test]
fn repair_leaves_valid_nesting_alone() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free, CellMode::Free]);
    nested(&mut store, g, 0, false);
    nested(&mut store, g, 0, false);
    nested(&mut store, g, 1, true);
    assert!(repair_nesting(&mut store).is_empty());
}

#[test]
fn repair_detaches_container_joining_occupied_cell() {
    let mut store = DocStore::new();
    let g = grid(&mut store, vec![CellMode::Free]);
    let first = nested(&mut store, g, 0, false);
    let late = nested(&mut store, g, 0, true);
    assert_eq!(repair_nesting(&mut store), vec![late]);
    assert_eq!(store.get(&first).unwrap().parent_id, Some(g));
    let detached = store.get(&late).unwrap();
    assert_eq!((detached.parent_id, detached.cell_index), (None, None));
}

#[test]
fn repair_clears_stray_cell_index_on_top_level() {
    let mut store = DocStore::new();
    let top = chart(&mut store);
    if let Some(e) = store.get_mut(&top) {
        e.cell_index = Some(2);
    }
    assert_eq!(repair_nesting(&mut store), vec![top]);
    assert!(store.get(&top).unwrap().cell_index.is_none());
}
