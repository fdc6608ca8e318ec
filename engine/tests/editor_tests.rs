//! Editor Tests - Placement, Gravity, and Undo/Redo Round Trips
//!
//! Exercises the public editing API: the footing rule on concrete
//! coordinates, gravity after removals, and property checks over random
//! command sequences (no overlap, no floating groups, exact undo/redo).

use std::collections::HashSet;

use glam::IVec3;
use nanobrick_engine::bricks::{Brick, BrickCatalog, BrickColor, BrickPalette, BrickType, Design};
use nanobrick_engine::config::EditorConfig;
use nanobrick_engine::editor::{CellSnapshot, Editor, EditorState};
use nanobrick_engine::error::{EditorError, PlaceError};
use nanobrick_engine::world::Cell;
use proptest::prelude::*;

const ONE_BY_ONE: u32 = 1;
const TWO_BY_ONE: u32 = 2;
const WHITE: u32 = 1;

fn editor(size: u32, history_limit: usize) -> Editor {
    let catalog = BrickCatalog::from_types([
        BrickType::solid(ONE_BY_ONE, 1, 1, 1),
        BrickType::solid(TWO_BY_ONE, 2, 1, 1),
    ])
    .unwrap();
    let palette = BrickPalette::new([
        BrickColor::new(WHITE, "white", "0xFFFFFF"),
        BrickColor::new(2, "black", "0x000000"),
    ]);
    let config = EditorConfig {
        grid_size: size,
        history_limit,
        ..EditorConfig::default()
    };
    Editor::from_config(&config, catalog, palette)
}

fn cell(e: &Editor, x: i32, y: i32, z: i32) -> Cell {
    e.state().grid().cell_by_index(x, y, z).unwrap()
}

// ============================================================================
// Concrete Scenarios
// ============================================================================

#[test]
fn test_two_by_one_scenario() {
    let mut e = editor(8, 20);
    let first = e.create_brick_object(TWO_BY_ONE, WHITE).unwrap();
    e.build_brick_object(first, cell(&e, 0, 0, 0)).unwrap();
    assert_eq!(
        e.state().occupied_cells(first).unwrap(),
        &[cell(&e, 0, 0, 0), cell(&e, 1, 0, 0)]
    );

    let second = e.create_brick_object(TWO_BY_ONE, WHITE).unwrap();
    // Reject: overlaps (1, 0, 0).
    assert!(!e.state().check_cell_buildable(second, cell(&e, 1, 0, 0)));
    assert_eq!(
        e.build_brick_object(second, cell(&e, 1, 0, 0)),
        Err(EditorError::Placement(PlaceError::Occupied))
    );
    // Accept: resting on the first brick.
    assert!(e.state().check_cell_buildable(second, cell(&e, 0, 1, 0)));
    // Reject: floating at y = 1 with nothing under or over it.
    assert!(!e.state().check_cell_buildable(second, cell(&e, 4, 1, 4)));

    e.build_brick_object(second, cell(&e, 0, 1, 0)).unwrap();
    assert_eq!(e.state().built_count(), 2);
    // The rejected build left no entry.
    assert_eq!(e.history().undo_count(), 2);
}

#[test]
fn test_removing_base_of_three_stack() {
    let mut e = editor(8, 20);
    let ids: Vec<_> = (0..4)
        .map(|y| {
            let id = e.create_brick_object(ONE_BY_ONE, WHITE).unwrap();
            e.build_brick_object(id, cell(&e, 3, y, 3)).unwrap();
            id
        })
        .collect();

    e.remove_brick_object(ids[0]).unwrap();
    let heights: Vec<i32> = ids[1..]
        .iter()
        .map(|&id| e.state().object(id).unwrap().cell().unwrap().y())
        .collect();
    assert_eq!(heights, vec![0, 1, 2]);

    e.undo().unwrap();
    let heights: Vec<i32> = ids
        .iter()
        .map(|&id| e.state().object(id).unwrap().cell().unwrap().y())
        .collect();
    assert_eq!(heights, vec![0, 1, 2, 3]);
}

#[test]
fn test_build_below_floor_then_undo() {
    let mut e = editor(6, 20);
    let base = e.create_brick_object(TWO_BY_ONE, WHITE).unwrap();
    e.build_brick_object(base, cell(&e, 1, 0, 1)).unwrap();
    let top = e.create_brick_object(ONE_BY_ONE, WHITE).unwrap();
    e.build_brick_object(top, cell(&e, 2, 1, 1)).unwrap();
    let before = e.state().snapshot_cells();

    let wedge = e.create_brick_object(ONE_BY_ONE, WHITE).unwrap();
    e.build_brick_object(wedge, cell(&e, 1, -1, 1)).unwrap();
    assert_eq!(e.state().object(wedge).unwrap().cell(), Some(cell(&e, 1, 0, 1)));
    assert_eq!(e.state().object(base).unwrap().cell(), Some(cell(&e, 1, 1, 1)));
    assert_eq!(e.state().object(top).unwrap().cell(), Some(cell(&e, 2, 2, 1)));

    e.undo().unwrap();
    assert_eq!(e.state().snapshot_cells(), before);
}

#[test]
fn test_rejected_design_leaves_session_intact() {
    let mut e = editor(6, 20);
    let id = e.create_brick_object(TWO_BY_ONE, WHITE).unwrap();
    e.build_brick_object(id, cell(&e, 2, 0, 2)).unwrap();
    let before = e.to_design();

    let sunk = Design {
        size: Some(6),
        bricks: vec![Brick::new(1, ONE_BY_ONE, WHITE, IVec3::new(0, -1, 0))],
        colors: vec![],
    };
    assert_eq!(
        e.load_design(&sunk),
        Err(EditorError::Placement(PlaceError::OutOfBounds))
    );

    let stray_pivot = Design {
        size: Some(6),
        bricks: vec![Brick::new(1, ONE_BY_ONE, WHITE, IVec3::new(4, 0, 4)).with_pivot(3, -2)],
        colors: vec![],
    };
    assert_eq!(
        e.load_design(&stray_pivot),
        Err(EditorError::InvalidPivot { x: 3, z: -2 })
    );

    assert_eq!(e.to_design(), before);
    assert_eq!(e.history().undo_count(), 1);
    e.undo().unwrap();
    assert_eq!(e.state().built_count(), 0);
}

#[test]
fn test_misuse_fails_loudly() {
    let mut e = editor(4, 20);
    assert_eq!(e.undo(), Err(EditorError::NothingToUndo));
    assert_eq!(e.redo(), Err(EditorError::NothingToRedo));

    let id = e.create_brick_object(ONE_BY_ONE, WHITE).unwrap();
    assert_eq!(e.remove_brick_object(id), Err(EditorError::NotBuilt(id)));
    e.build_brick_object(id, cell(&e, 0, 0, 0)).unwrap();
    assert_eq!(
        e.build_brick_object(id, cell(&e, 1, 0, 0)),
        Err(EditorError::AlreadyBuilt(id))
    );
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Build {
        wide: bool,
        turns: i32,
        at: (i32, i32, i32),
    },
    Remove(usize),
    Move(usize, (i32, i32, i32)),
    Paint(usize),
}

fn arb_cell() -> impl Strategy<Value = (i32, i32, i32)> {
    (0..5i32, -1..4i32, 0..5i32)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<bool>(), 0..4i32, arb_cell())
            .prop_map(|(wide, turns, at)| Op::Build { wide, turns, at }),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => (any::<usize>(), arb_cell()).prop_map(|(pick, at)| Op::Move(pick, at)),
        1 => any::<usize>().prop_map(Op::Paint),
    ]
}

/// Try one random edit; rejected edits are fine and leave no history.
fn run(e: &mut Editor, op: &Op) {
    let built: Vec<_> = e.state().built_objects().map(|o| o.id()).collect();
    let pick = |i: usize| built.get(i % built.len().max(1)).copied();
    let _ = match *op {
        Op::Build { wide, turns, at } => {
            let type_id = if wide { TWO_BY_ONE } else { ONE_BY_ONE };
            let id = e.set_current_brick(type_id, WHITE).unwrap();
            e.rotate_current(turns).unwrap();
            let target = cell(e, at.0, at.1, at.2);
            e.build_brick_object(id, target)
        }
        Op::Remove(i) => match pick(i) {
            Some(id) => e.remove_brick_object(id),
            None => Ok(()),
        },
        Op::Move(i, at) => match pick(i) {
            Some(id) => {
                let target = cell(e, at.0, at.1, at.2);
                e.move_brick_object(id, target)
            }
            None => Ok(()),
        },
        Op::Paint(i) => match pick(i) {
            Some(id) => e.paint_brick_object(id, 2),
            None => Ok(()),
        },
    };
}

fn assert_no_overlap(state: &EditorState) {
    let mut seen = HashSet::new();
    for object in state.built_objects() {
        let cells = object.occupied_cells().expect("built object has cells");
        for &c in cells {
            assert!(seen.insert(c), "cell {c:?} claimed twice");
            assert!(c.y() >= 0, "built brick below the floor");
            assert_eq!(state.brick_object_at(c), Some(object.id()));
        }
    }
}

/// Every connected group touches the floor; nothing is left floating.
///
/// Checked per group rather than per brick: gravity settles whole groups, so
/// after a removal a brick may rest only on a side neighbour that is itself
/// grounded (see "Floating invariant" in DESIGN.md).
fn assert_nothing_floats(state: &EditorState) {
    for group in state.connected_groups() {
        let grounded = group.iter().any(|&id| {
            state
                .occupied_cells(id)
                .is_some_and(|cells| cells.iter().any(|c| c.y() == 0))
        });
        assert!(grounded, "group {group:?} floats");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn no_overlap_and_nothing_floats(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut e = editor(5, 20);
        for op in &ops {
            run(&mut e, op);
            assert_no_overlap(e.state());
            assert_nothing_floats(e.state());
        }
    }

    #[test]
    fn undo_redo_round_trip(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut e = editor(5, 64);
        let mut states: Vec<CellSnapshot> = vec![e.state().snapshot_cells()];
        for op in &ops {
            let recorded = e.history().undo_count();
            run(&mut e, op);
            if e.history().undo_count() > recorded {
                states.push(e.state().snapshot_cells());
            }
        }

        for expected in states.iter().rev().skip(1) {
            e.undo().unwrap();
            prop_assert_eq!(&e.state().snapshot_cells(), expected);
        }
        prop_assert_eq!(e.undo(), Err(EditorError::NothingToUndo));

        for expected in states.iter().skip(1) {
            e.redo().unwrap();
            prop_assert_eq!(&e.state().snapshot_cells(), expected);
        }
        prop_assert_eq!(e.redo(), Err(EditorError::NothingToRedo));
    }
}
