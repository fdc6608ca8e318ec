//! Connectivity
//!
//! Face-adjacency grouping of built bricks, rigid group shifts, and the
//! gravity pass that drops groups left floating after a removal.

use std::collections::{BTreeSet, HashMap, VecDeque};

use glam::IVec3;

use super::state::EditorState;
use crate::bricks::BrickObjectId;
use crate::error::EditorError;
use crate::world::Cell;

/// Exactly one axis differs, and by exactly one.
pub fn is_face_adjacent(a: Cell, b: Cell) -> bool {
    let d = (a.as_ivec3() - b.as_ivec3()).abs();
    let axes = [d.x, d.y, d.z];
    axes.iter().filter(|&&v| v == 1).count() == 1 && axes.iter().filter(|&&v| v == 0).count() == 2
}

/// Two bricks touch when any pair of their cells is face-adjacent.
pub fn are_adjacent(a: &[Cell], b: &[Cell]) -> bool {
    a.iter().any(|&ca| b.iter().any(|&cb| is_face_adjacent(ca, cb)))
}

#[inline]
pub fn neighbors6(c: IVec3) -> [IVec3; 6] {
    [
        IVec3::new(c.x + 1, c.y, c.z),
        IVec3::new(c.x - 1, c.y, c.z),
        IVec3::new(c.x, c.y + 1, c.z),
        IVec3::new(c.x, c.y - 1, c.z),
        IVec3::new(c.x, c.y, c.z + 1),
        IVec3::new(c.x, c.y, c.z - 1),
    ]
}

/// Everything reachable from `seed` through face-adjacent cells listed in `owners`.
///
/// `owners` is the candidate set: cells outside it never join the group.
pub fn collect_group<'a, K, F>(seed: K, owners: &HashMap<Cell, K>, cells_of: F) -> BTreeSet<K>
where
    K: Copy + Ord,
    F: Fn(K) -> &'a [Cell],
{
    let mut group = BTreeSet::from([seed]);
    let mut queue = VecDeque::from([seed]);

    while let Some(member) = queue.pop_front() {
        for cell in cells_of(member) {
            for neighbor in neighbors6(cell.as_ivec3()) {
                let Some(&owner) = owners.get(&Cell::from_ivec3(neighbor)) else {
                    continue;
                };
                if group.insert(owner) {
                    queue.push_back(owner);
                }
            }
        }
    }

    group
}

/// Partition `members` into connected groups, in order of first member.
pub fn connected_components<'a, K, F>(
    members: impl IntoIterator<Item = K>,
    owners: &HashMap<Cell, K>,
    cells_of: F,
) -> Vec<BTreeSet<K>>
where
    K: Copy + Ord,
    F: Fn(K) -> &'a [Cell],
{
    let mut seen = BTreeSet::new();
    let mut components = Vec::new();
    for member in members {
        if seen.contains(&member) {
            continue;
        }
        let group = collect_group(member, owners, &cells_of);
        seen.extend(group.iter().copied());
        components.push(group);
    }
    components
}

impl EditorState {
    fn cells_of(&self, id: BrickObjectId) -> &[Cell] {
        self.objects
            .get(&id)
            .and_then(|object| object.occupied_cells())
            .unwrap_or(&[])
    }

    fn group_cells(&self, group: &BTreeSet<BrickObjectId>) -> Vec<Cell> {
        group
            .iter()
            .flat_map(|&id| self.cells_of(id).iter().copied())
            .collect()
    }

    /// Built cells at height `min_y` or above, with their owners.
    pub fn candidate_cells_from(&self, min_y: i32) -> HashMap<Cell, BrickObjectId> {
        self.cell_owners
            .iter()
            .filter(|(cell, _)| cell.y() >= min_y)
            .map(|(cell, owner)| (*cell, *owner))
            .collect()
    }

    /// Rigid group that moves together with `seed`.
    pub fn brick_object_group(
        &self,
        seed: BrickObjectId,
        candidates: &HashMap<Cell, BrickObjectId>,
    ) -> BTreeSet<BrickObjectId> {
        collect_group(seed, candidates, |id| self.cells_of(id))
    }

    /// Connected groups over the whole built set.
    pub fn connected_groups(&self) -> Vec<BTreeSet<BrickObjectId>> {
        connected_components(self.built.iter().copied(), &self.cell_owners, |id| {
            self.cells_of(id)
        })
    }

    /// Move every member of `group` by `amount` layers.
    ///
    /// A member whose target leaves the grid stays where it is. If the shifted
    /// group would overlap anything, nothing moves and the conflict is reported.
    /// Returns the members that moved.
    pub fn shift_brick_objects(
        &mut self,
        group: &BTreeSet<BrickObjectId>,
        amount: i32,
    ) -> Result<Vec<BrickObjectId>, EditorError> {
        let delta = IVec3::new(0, amount, 0);
        let mut targets = Vec::new();
        for &id in group {
            if !self.built.contains(&id) {
                continue;
            }
            let Some(object) = self.objects.get(&id) else {
                continue;
            };
            let Some(target) = object.cell().and_then(|cell| self.grid.offset(cell, delta)) else {
                continue;
            };
            if target.is_below_floor() {
                continue;
            }
            let Some(cells) = object.occupied_cells_at(&self.grid, target) else {
                continue;
            };
            targets.push((id, target, cells));
        }

        let moving: BTreeSet<BrickObjectId> = targets.iter().map(|(id, _, _)| *id).collect();
        let mut claimed: HashMap<Cell, BrickObjectId> = self
            .cell_owners
            .iter()
            .filter(|(_, owner)| !moving.contains(owner))
            .map(|(cell, owner)| (*cell, *owner))
            .collect();
        for (id, _, cells) in &targets {
            for cell in cells {
                if claimed.insert(*cell, *id).is_some() {
                    return Err(EditorError::CellConflict {
                        x: cell.x(),
                        y: cell.y(),
                        z: cell.z(),
                    });
                }
            }
        }

        let grid = &self.grid;
        for (id, target, _) in &targets {
            if let Some(object) = self.objects.get_mut(id) {
                object.set_cell(grid, *target);
            }
        }
        self.cell_owners = claimed;

        Ok(targets.into_iter().map(|(id, _, _)| id).collect())
    }

    /// How far a group can drop before hitting the floor or another brick.
    fn fall_distance(&self, group: &BTreeSet<BrickObjectId>) -> i32 {
        let cells = self.group_cells(group);
        let Some(lowest) = cells.iter().map(|c| c.y()).min() else {
            return 0;
        };

        let mut distance = 0;
        while lowest - (distance + 1) >= 0 {
            let step = IVec3::new(0, -(distance + 1), 0);
            let blocked = cells.iter().any(|cell| {
                self.cell_owners
                    .get(&Cell::from_ivec3(cell.as_ivec3() + step))
                    .is_some_and(|owner| !group.contains(owner))
            });
            if blocked {
                break;
            }
            distance += 1;
        }
        distance
    }

    /// Gravity correction: drop every floating group until it lands.
    ///
    /// Groups are settled bottom-up and the pass repeats until nothing moves.
    /// Returns the number of group drops performed.
    pub fn fix_brick_build(&mut self) -> usize {
        let mut drops = 0;
        loop {
            let mut groups = self.connected_groups();
            groups.sort_by_key(|group| {
                self.group_cells(group)
                    .iter()
                    .map(|c| c.y())
                    .min()
                    .unwrap_or(0)
            });

            let mut settled = true;
            for group in &groups {
                let distance = self.fall_distance(group);
                if distance == 0 {
                    continue;
                }
                match self.shift_brick_objects(group, -distance) {
                    Ok(moved) => {
                        tracing::debug!(members = moved.len(), distance, "group dropped");
                        settled = false;
                        drops += 1;
                    }
                    Err(err) => tracing::warn!(%err, "could not drop floating group"),
                }
            }

            if settled {
                return drops;
            }
        }
    }

    /// Build below the floor: lift the group standing on the target columns by
    /// one layer, then place the new brick at `y = 0`.
    pub(crate) fn insert_below_floor(
        &mut self,
        id: BrickObjectId,
        cell: Cell,
    ) -> Result<(), EditorError> {
        let ground = self
            .grid
            .cell_by_index(cell.x(), 0, cell.z())
            .ok_or(crate::error::PlaceError::OutOfBounds)?;
        let footprint = self
            .object_ref(id)?
            .occupied_cells_at(&self.grid, ground)
            .ok_or(crate::error::PlaceError::OutOfBounds)?;

        let candidates = self.candidate_cells_from(0);
        let mut group = BTreeSet::new();
        for cell in &footprint {
            if let Some(&owner) = candidates.get(cell)
                && owner != id
                && !group.contains(&owner)
            {
                group.extend(self.brick_object_group(owner, &candidates));
            }
        }

        if !group.is_empty() {
            let top = self.group_cells(&group).iter().map(|c| c.y()).max().unwrap_or(0);
            if top + 1 >= self.grid.size() as i32 {
                return Err(crate::error::PlaceError::OutOfBounds.into());
            }
            let lifted = self.shift_brick_objects(&group, 1)?;
            tracing::trace!(lifted = lifted.len(), "lifted group for floor insertion");
        }

        if let Err(err) = self.validate_placement(id, ground) {
            if !group.is_empty() {
                self.shift_brick_objects(&group, -1)?;
            }
            return Err(err);
        }

        let grid = &self.grid;
        if let Some(object) = self.objects.get_mut(&id) {
            object.set_cell(grid, ground);
        }
        self.register(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bricks::{BrickCatalog, BrickColor, BrickPalette, BrickType};
    use crate::world::Grid;

    fn state(size: u32) -> EditorState {
        let catalog = BrickCatalog::from_types([
            BrickType::solid(1, 1, 1, 1),
            BrickType::solid(2, 2, 1, 1),
            BrickType::solid(3, 3, 1, 1),
        ])
        .unwrap();
        let palette = BrickPalette::new([BrickColor::new(1, "white", "0xFFFFFF")]);
        EditorState::new(Grid::with_size(size), catalog, palette)
    }

    fn at(s: &EditorState, x: i32, y: i32, z: i32) -> Cell {
        s.grid().cell_by_index(x, y, z).unwrap()
    }

    fn build(s: &mut EditorState, type_id: u32, x: i32, y: i32, z: i32) -> BrickObjectId {
        let id = s.create_brick_object(type_id, 1).unwrap();
        let cell = at(s, x, y, z);
        s.build_brick_object(id, cell).unwrap();
        id
    }

    fn anchor_y(s: &EditorState, id: BrickObjectId) -> i32 {
        s.object(id).unwrap().cell().unwrap().y()
    }

    #[test]
    fn test_face_adjacency() {
        let grid = Grid::with_size(4);
        let c = |x, y, z| grid.cell_by_index(x, y, z).unwrap();
        assert!(is_face_adjacent(c(1, 1, 1), c(2, 1, 1)));
        assert!(is_face_adjacent(c(1, 1, 1), c(1, 0, 1)));
        assert!(!is_face_adjacent(c(1, 1, 1), c(2, 2, 1)), "edge diagonal");
        assert!(!is_face_adjacent(c(1, 1, 1), c(2, 2, 2)), "corner diagonal");
        assert!(!is_face_adjacent(c(1, 1, 1), c(3, 1, 1)), "gap");
        assert!(!is_face_adjacent(c(1, 1, 1), c(1, 1, 1)), "same cell");
        assert!(are_adjacent(&[c(0, 0, 0), c(1, 0, 0)], &[c(2, 0, 0)]));
        assert!(!are_adjacent(&[c(0, 0, 0)], &[c(1, 1, 0)]));
    }

    #[test]
    fn test_groups_split_by_gap() {
        let mut s = state(6);
        let a = build(&mut s, 2, 0, 0, 0);
        let b = build(&mut s, 1, 2, 0, 0);
        let c = build(&mut s, 1, 4, 0, 0);

        let groups = s.connected_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], BTreeSet::from([a, b]));
        assert_eq!(groups[1], BTreeSet::from([c]));
    }

    #[test]
    fn test_group_restricted_to_candidates() {
        let mut s = state(4);
        let base = build(&mut s, 1, 0, 0, 0);
        let mid = build(&mut s, 1, 0, 1, 0);
        let top = build(&mut s, 1, 0, 2, 0);

        let all = s.candidate_cells_from(0);
        assert_eq!(s.brick_object_group(mid, &all), BTreeSet::from([base, mid, top]));

        let upper = s.candidate_cells_from(1);
        assert_eq!(s.brick_object_group(mid, &upper), BTreeSet::from([mid, top]));
    }

    #[test]
    fn test_shift_leaves_out_of_bounds_member() {
        let mut s = state(3);
        let low = build(&mut s, 1, 2, 0, 2);
        let _c0 = build(&mut s, 1, 0, 0, 0);
        let _c1 = build(&mut s, 1, 0, 1, 0);
        let top = build(&mut s, 1, 0, 2, 0);
        let group = BTreeSet::from([low, top]);

        let moved = s.shift_brick_objects(&group, 1).unwrap();
        assert_eq!(moved, vec![low]);
        assert_eq!(anchor_y(&s, low), 1);
        assert_eq!(anchor_y(&s, top), 2);
        assert_eq!(s.brick_object_at(at(&s, 2, 0, 2)), None);
        assert_eq!(s.brick_object_at(at(&s, 2, 1, 2)), Some(low));
    }

    #[test]
    fn test_shift_conflict_moves_nothing() {
        let mut s = state(4);
        let a = build(&mut s, 1, 0, 0, 0);
        let _b = build(&mut s, 1, 0, 1, 0);

        let result = s.shift_brick_objects(&BTreeSet::from([a]), 1);
        assert_eq!(result, Err(EditorError::CellConflict { x: 0, y: 1, z: 0 }));
        assert_eq!(anchor_y(&s, a), 0);
        assert_eq!(s.brick_object_at(at(&s, 0, 0, 0)), Some(a));
    }

    #[test]
    fn test_remove_base_drops_stack() {
        let mut s = state(5);
        let base = build(&mut s, 1, 1, 0, 1);
        let mid = build(&mut s, 1, 1, 1, 1);
        let top = build(&mut s, 1, 1, 2, 1);

        assert_eq!(s.remove_brick_object(base), Ok(1));
        assert_eq!(anchor_y(&s, mid), 0);
        assert_eq!(anchor_y(&s, top), 1);
        assert_eq!(s.brick_object_at(at(&s, 1, 2, 1)), None);
    }

    #[test]
    fn test_gravity_stops_on_other_brick() {
        let mut s = state(6);
        let b0 = build(&mut s, 1, 1, 0, 1);
        let b1 = build(&mut s, 1, 1, 1, 1);
        let b2 = build(&mut s, 1, 1, 2, 1);
        let b3 = build(&mut s, 1, 1, 3, 1);

        assert_eq!(s.remove_brick_object(b1), Ok(1));
        assert_eq!(anchor_y(&s, b0), 0);
        assert_eq!(anchor_y(&s, b2), 1);
        assert_eq!(anchor_y(&s, b3), 2);
    }

    #[test]
    fn test_gravity_drops_beam_onto_stub() {
        let mut s = state(6);
        let base = build(&mut s, 1, 0, 0, 0);
        let l1 = build(&mut s, 1, 0, 1, 0);
        let l2 = build(&mut s, 1, 0, 2, 0);
        let beam = build(&mut s, 3, 0, 3, 0);
        let s0 = build(&mut s, 1, 2, 0, 0);
        let s1 = build(&mut s, 1, 2, 1, 0);
        assert_eq!(s.connected_groups().len(), 2);

        s.remove_brick_object(base).unwrap();
        assert_eq!(anchor_y(&s, l1), 0);
        assert_eq!(anchor_y(&s, l2), 1);
        assert_eq!(anchor_y(&s, beam), 2);
        assert_eq!(anchor_y(&s, s0), 0);
        assert_eq!(anchor_y(&s, s1), 1);
        // The beam now rests on the stub, joining everything into one group.
        assert_eq!(s.connected_groups().len(), 1);
    }

    #[test]
    fn test_insert_below_floor_lifts_group() {
        let mut s = state(4);
        let a = build(&mut s, 1, 1, 0, 1);
        let b = build(&mut s, 1, 1, 1, 1);
        let bystander = build(&mut s, 1, 3, 0, 3);

        let new = s.create_brick_object(1, 1).unwrap();
        let below = s.grid().cell_by_index(1, -1, 1).unwrap();
        s.build_brick_object(new, below).unwrap();

        assert_eq!(anchor_y(&s, new), 0);
        assert_eq!(anchor_y(&s, a), 1);
        assert_eq!(anchor_y(&s, b), 2);
        assert_eq!(anchor_y(&s, bystander), 0);
    }

    #[test]
    fn test_insert_below_floor_rejects_full_column() {
        let mut s = state(3);
        let ids: Vec<_> = (0..3).map(|y| build(&mut s, 1, 0, y, 0)).collect();

        let new = s.create_brick_object(1, 1).unwrap();
        let below = s.grid().cell_by_index(0, -1, 0).unwrap();
        assert!(s.build_brick_object(new, below).is_err());
        for (y, id) in ids.iter().enumerate() {
            assert_eq!(anchor_y(&s, *id), y as i32);
        }
        assert!(!s.is_built(new));
    }

    #[test]
    fn test_insert_below_floor_into_empty_column() {
        let mut s = state(3);
        let new = s.create_brick_object(2, 1).unwrap();
        let below = s.grid().cell_by_index(0, -1, 0).unwrap();
        s.build_brick_object(new, below).unwrap();
        assert_eq!(anchor_y(&s, new), 0);
        assert_eq!(s.brick_object_at(at(&s, 1, 0, 0)), Some(new));
    }
}
