//! Build-Order Resolver
//!
//! Sequences a finished design into construction levels. Every brick in a
//! level satisfies the footing rule against the bricks of earlier levels
//! only; bricks that never do are reported as unresolved instead of failing
//! the whole run.
//!
//! Algorithm (fixed-point level assignment):
//! 1. Bricks are grouped by anchor height, bottom to top.
//! 2. The first level is the lowest height whose bricks form one connected
//!    cluster. Lower, disconnected heights are deferred to the skipped pool.
//!    If no height is connected, the lowest one is used anyway.
//! 3. Each later height emits the bricks that have footing and skips the rest.
//! 4. After every emission the skipped pool is rescanned until nothing more
//!    becomes buildable; newly buildable bricks are emitted grouped by height.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use glam::{IVec2, IVec3, Vec3};
use serde::Serialize;

use crate::bricks::{Brick, BrickCatalog, BrickPose, Design, Rotation, occupied_cells};
use crate::config::DEFAULT_GRID_SIZE;
use crate::editor::{connected_components, has_footing};
use crate::world::{Cell, Grid};

/// Framing hints for rendering a level. They never affect legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewHints {
    /// Nothing built so far sits above any cell of the level.
    pub top_view: bool,
    /// The level lies left of the model's centre (smaller X).
    pub left: bool,
    /// The level lies on the front half of the model (larger Z).
    pub front: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildLevel {
    /// Anchor height shared by every brick of the level.
    pub y: i32,
    pub bricks: Vec<Brick>,
    pub view: ViewHints,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildOrder {
    pub levels: Vec<BuildLevel>,
    /// Bricks that could not be placed or never gained footing, by id.
    pub unresolved: Vec<Brick>,
}

impl BuildOrder {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Bricks placed across all levels.
    pub fn brick_count(&self) -> usize {
        self.levels.iter().map(|level| level.bricks.len()).sum()
    }
}

/// A brick with its cells worked out.
#[derive(Debug, Clone)]
struct Placed {
    brick: Brick,
    cells: Vec<Cell>,
}

/// Cells a saved brick covers, or `None` if it cannot be placed at all.
fn place(grid: &Grid, catalog: &BrickCatalog, brick: &Brick) -> Option<Vec<Cell>> {
    let brick_type = catalog.get(brick.type_id)?;
    if !brick_type.is_solid(brick.pivot_x, brick.pivot_z) {
        return None;
    }
    let rotation = Rotation::from_degrees(brick.rotation_y)?;
    let anchor = grid.cell_at(brick.anchor()).filter(|cell| !cell.is_below_floor())?;
    let pose = BrickPose::new(brick.pivot_x, brick.pivot_z, rotation);
    occupied_cells(grid, brick_type, pose, anchor)
}

/// True when the bricks form a single face-adjacent cluster.
fn is_connected(bricks: &[Placed]) -> bool {
    let owners: HashMap<Cell, usize> = bricks
        .iter()
        .enumerate()
        .flat_map(|(i, placed)| placed.cells.iter().map(move |&cell| (cell, i)))
        .collect();
    let components = connected_components(0..bricks.len(), &owners, |i| bricks[i].cells.as_slice());
    components.len() <= 1
}

fn centre(cells: impl IntoIterator<Item = IVec3>) -> Option<Vec3> {
    let mut iter = cells.into_iter();
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
    Some((min + max).as_vec3() / 2.0)
}

struct Resolver {
    built: HashSet<IVec3>,
    /// Highest built y per (x, z) column.
    column_tops: HashMap<IVec2, i32>,
    model_centre: Vec3,
    levels: Vec<BuildLevel>,
    skipped: Vec<Placed>,
}

impl Resolver {
    fn has_footing(&self, placed: &Placed) -> bool {
        has_footing(placed.brick.y, &placed.cells, |v| self.built.contains(&v))
    }

    fn view_hints(&self, bricks: &[Placed]) -> ViewHints {
        let cells = || bricks.iter().flat_map(|p| p.cells.iter().map(|c| c.as_ivec3()));
        let covered = cells().any(|v| {
            self.column_tops
                .get(&IVec2::new(v.x, v.z))
                .is_some_and(|&top| top > v.y)
        });
        let level_centre = centre(cells()).unwrap_or(self.model_centre);
        ViewHints {
            top_view: !covered,
            left: level_centre.x < self.model_centre.x,
            front: level_centre.z >= self.model_centre.z,
        }
    }

    fn emit(&mut self, y: i32, bricks: Vec<Placed>) {
        if bricks.is_empty() {
            return;
        }
        let view = self.view_hints(&bricks);
        for v in bricks.iter().flat_map(|p| p.cells.iter().map(|c| c.as_ivec3())) {
            self.built.insert(v);
            let top = self.column_tops.entry(IVec2::new(v.x, v.z)).or_insert(v.y);
            *top = (*top).max(v.y);
        }
        tracing::trace!(level = self.levels.len(), y, bricks = bricks.len(), "level emitted");
        self.levels.push(BuildLevel {
            y,
            bricks: bricks.into_iter().map(|p| p.brick).collect(),
            view,
        });
    }

    /// Emit the buildable part of one height, skip the rest.
    fn process_height(&mut self, y: i32, bricks: Vec<Placed>) {
        let (ready, waiting): (Vec<Placed>, Vec<Placed>) =
            bricks.into_iter().partition(|placed| self.has_footing(placed));
        self.skipped.extend(waiting);
        if !ready.is_empty() {
            self.emit(y, ready);
            self.drain_skipped();
        }
    }

    /// Rescan the skipped pool until it stops shrinking.
    fn drain_skipped(&mut self) {
        loop {
            let pool = std::mem::take(&mut self.skipped);
            let (ready, waiting): (Vec<Placed>, Vec<Placed>) =
                pool.into_iter().partition(|placed| self.has_footing(placed));
            self.skipped = waiting;
            if ready.is_empty() {
                return;
            }

            let mut by_height: BTreeMap<i32, Vec<Placed>> = BTreeMap::new();
            for placed in ready {
                by_height.entry(placed.brick.y).or_default().push(placed);
            }
            for (y, bricks) in by_height {
                self.emit(y, bricks);
            }
        }
    }
}

/// Sequence a design into dependency-respecting build levels.
///
/// Pure: depends only on its inputs and never fails. Bricks with an unknown
/// type, an unsupported rotation, a pivot off their footprint or cells off
/// the design's grid go straight to `unresolved`, as do bricks that never
/// gain footing. A design whose grid is too large leaves every brick
/// unresolved.
pub fn resolve_build_order(design: &Design, catalog: &BrickCatalog) -> BuildOrder {
    let grid = match Grid::lattice(design.size_or(DEFAULT_GRID_SIZE)) {
        Ok(grid) => grid,
        Err(err) => {
            tracing::warn!(error = %err, "design grid rejected");
            let mut unresolved = design.bricks.clone();
            unresolved.sort_by_key(|brick| brick.id);
            return BuildOrder {
                levels: Vec::new(),
                unresolved,
            };
        }
    };

    let mut unresolved = Vec::new();
    let mut by_height: BTreeMap<i32, Vec<Placed>> = BTreeMap::new();
    for brick in &design.bricks {
        match place(&grid, catalog, brick) {
            Some(cells) => by_height.entry(brick.y).or_default().push(Placed {
                brick: brick.clone(),
                cells,
            }),
            None => {
                tracing::warn!(brick = brick.id, type_id = brick.type_id, "brick cannot be placed");
                unresolved.push(brick.clone());
            }
        }
    }

    let model_centre = centre(
        by_height
            .values()
            .flatten()
            .flat_map(|p| p.cells.iter().map(|c| c.as_ivec3())),
    )
    .unwrap_or(Vec3::ZERO);
    let mut resolver = Resolver {
        built: HashSet::new(),
        column_tops: HashMap::new(),
        model_centre,
        levels: Vec::new(),
        skipped: Vec::new(),
    };

    let mut pending: VecDeque<(i32, Vec<Placed>)> = by_height.into_iter().collect();
    let first = pending
        .iter()
        .position(|(_, bricks)| is_connected(bricks))
        .unwrap_or(0);
    let deferred: Vec<(i32, Vec<Placed>)> = pending.drain(..first).collect();
    if !deferred.is_empty() {
        tracing::debug!(heights = deferred.len(), "disconnected base heights deferred");
    }

    if let Some((y, bricks)) = pending.pop_front() {
        resolver.emit(y, bricks);
    }
    resolver
        .skipped
        .extend(deferred.into_iter().flat_map(|(_, bricks)| bricks));
    resolver.drain_skipped();

    for (y, bricks) in pending {
        resolver.process_height(y, bricks);
    }

    unresolved.extend(resolver.skipped.into_iter().map(|p| p.brick));
    unresolved.sort_by_key(|brick| brick.id);
    if !unresolved.is_empty() {
        tracing::warn!(count = unresolved.len(), "bricks left unresolved");
    }

    BuildOrder {
        levels: resolver.levels,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bricks::BrickType;

    fn catalog() -> BrickCatalog {
        BrickCatalog::from_types([
            BrickType::solid(1, 1, 1, 1),
            BrickType::solid(2, 2, 1, 1),
        ])
        .unwrap()
    }

    fn design(bricks: &[(u32, u32, [i32; 3])]) -> Design {
        Design {
            size: Some(8),
            bricks: bricks
                .iter()
                .map(|&(id, type_id, [x, y, z])| Brick::new(id, type_id, 1, IVec3::new(x, y, z)))
                .collect(),
            colors: vec![],
        }
    }

    fn level_ids(order: &BuildOrder) -> Vec<Vec<u32>> {
        order
            .levels
            .iter()
            .map(|level| level.bricks.iter().map(|b| b.id).collect())
            .collect()
    }

    #[test]
    fn test_stack_resolves_bottom_up() {
        let d = design(&[(3, 1, [0, 2, 0]), (1, 1, [0, 0, 0]), (2, 1, [0, 1, 0])]);
        let order = resolve_build_order(&d, &catalog());
        assert_eq!(level_ids(&order), vec![vec![1], vec![2], vec![3]]);
        assert!(order.is_complete());
        assert_eq!(order.brick_count(), 3);
    }

    #[test]
    fn test_support_from_above_resolves_after_the_roof() {
        // The hanging brick at (1, 1, 0) only touches the 2x1 roof above it.
        let d = design(&[
            (1, 1, [0, 0, 0]),
            (2, 1, [0, 1, 0]),
            (3, 1, [1, 1, 0]),
            (4, 2, [0, 2, 0]),
        ]);
        let order = resolve_build_order(&d, &catalog());
        assert_eq!(level_ids(&order), vec![vec![1], vec![2], vec![4], vec![3]]);
        assert_eq!(order.levels[3].y, 1);
        assert!(!order.levels[3].view.top_view);
        assert!(order.levels[2].view.top_view);
    }

    #[test]
    fn test_disconnected_base_is_deferred() {
        let d = design(&[(1, 1, [0, 0, 0]), (2, 1, [4, 0, 4]), (3, 1, [0, 1, 0])]);
        let order = resolve_build_order(&d, &catalog());
        assert_eq!(level_ids(&order), vec![vec![3], vec![1, 2]]);
        assert_eq!(order.levels[1].y, 0);
    }

    #[test]
    fn test_all_heights_disconnected_falls_back_to_lowest() {
        let d = design(&[(1, 1, [0, 0, 0]), (2, 1, [4, 0, 4])]);
        let order = resolve_build_order(&d, &catalog());
        assert_eq!(level_ids(&order), vec![vec![1, 2]]);
    }

    #[test]
    fn test_unresolved_bricks_are_reported() {
        let d = design(&[
            (1, 1, [0, 0, 0]),
            (2, 1, [5, 3, 5]),
            (3, 9, [1, 0, 0]),
            (4, 2, [7, 0, 0]),
        ]);
        let order = resolve_build_order(&d, &catalog());
        assert_eq!(level_ids(&order), vec![vec![1]]);
        let unresolved: Vec<u32> = order.unresolved.iter().map(|b| b.id).collect();
        // Floating, unknown type, and off the edge of the grid.
        assert_eq!(unresolved, vec![2, 3, 4]);
        assert!(!order.is_complete());
    }

    #[test]
    fn test_stray_pivot_is_unresolved() {
        let mut d = design(&[(1, 1, [0, 0, 0]), (2, 1, [0, 1, 0])]);
        d.bricks[1].pivot_x = 3;
        d.bricks[1].pivot_z = -2;
        let order = resolve_build_order(&d, &catalog());
        assert_eq!(level_ids(&order), vec![vec![1]]);
        assert_eq!(order.unresolved[0].id, 2);
    }

    #[test]
    fn test_oversized_grid_leaves_everything_unresolved() {
        let mut d = design(&[(2, 1, [0, 0, 0]), (1, 1, [0, 1, 0])]);
        d.size = Some(3_000_000);
        let order = resolve_build_order(&d, &catalog());
        assert!(order.levels.is_empty());
        let unresolved: Vec<u32> = order.unresolved.iter().map(|b| b.id).collect();
        assert_eq!(unresolved, vec![1, 2]);
    }

    #[test]
    fn test_empty_design() {
        let order = resolve_build_order(&Design::default(), &catalog());
        assert!(order.levels.is_empty());
        assert!(order.is_complete());
    }

    #[test]
    fn test_view_sides() {
        let d = design(&[(1, 2, [0, 0, 0]), (2, 1, [0, 1, 0]), (3, 1, [1, 1, 0])]);
        let order = resolve_build_order(&d, &catalog());
        assert_eq!(level_ids(&order), vec![vec![1], vec![2, 3]]);
        assert!(!order.levels[0].view.left);
        assert!(order.levels[0].view.front);
    }
}
