//! Grid Module
//!
//! The discrete N x N x N build lattice.
//!
//! ## Coordinates
//! - `x`, `z` run over `[0, size)`; the grid is centred on the world origin in X/Z.
//! - `y` runs over `[0, size)` plus one extra layer at `y = -1`. That layer only
//!   exists so a host can point "under" the current model to request an insertion
//!   below the floor; no brick ever rests there.
//!
//! Lookups never fail loudly: an out-of-range index returns `None`, which the
//! placement and grouping code uses as a plain "stop here" signal.

use glam::{IVec3, Vec3};

use crate::config::{DEFAULT_CELL_SIZE, MAX_GRID_SIZE};
use crate::error::EditorError;

/// The transient layer below the floor.
pub const BELOW_FLOOR_Y: i32 = -1;

/// One addressable slot of the grid.
///
/// Only the grid hands these out, so two cells with equal coordinates always
/// denote the same physical slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    x: i32,
    y: i32,
    z: i32,
}

impl Cell {
    pub(crate) const fn from_coords(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub(crate) fn from_ivec3(v: IVec3) -> Self {
        Self::from_coords(v.x, v.y, v.z)
    }

    pub const fn x(self) -> i32 {
        self.x
    }

    pub const fn y(self) -> i32 {
        self.y
    }

    pub const fn z(self) -> i32 {
        self.z
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// True for the sentinel layer under the floor.
    pub const fn is_below_floor(self) -> bool {
        self.y < 0
    }
}

/// Bounds-checked cell lattice with precomputed world anchors.
///
/// Sizes are capped at [`MAX_GRID_SIZE`] so the anchor table stays small and
/// coordinate arithmetic cannot overflow.
#[derive(Debug, Clone)]
pub struct Grid {
    size: i32,
    cell_size: Vec3,
    /// World anchor per cell, indexed by [`Grid::slot_index`]. `None` for a
    /// bare lattice, which computes anchors on demand.
    world_positions: Option<Vec<Vec3>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_GRID_SIZE, DEFAULT_CELL_SIZE)
    }
}

impl Grid {
    /// Grid with a world anchor table; sizes above the cap are clamped.
    pub fn new(size: u32, cell_size: Vec3) -> Self {
        if size > MAX_GRID_SIZE {
            tracing::warn!(size, max = MAX_GRID_SIZE, "grid size clamped");
        }
        let mut grid = Self {
            size: size.min(MAX_GRID_SIZE) as i32,
            cell_size,
            world_positions: Some(Vec::new()),
        };
        grid.rebuild();
        grid
    }

    /// Grid with the default cell size.
    pub fn with_size(size: u32) -> Self {
        Self::new(size, DEFAULT_CELL_SIZE)
    }

    /// Bounds checks only, without the world anchor table.
    ///
    /// Used where cells are compared but never drawn, such as sequencing a
    /// saved design.
    pub fn lattice(size: u32) -> Result<Self, EditorError> {
        check_size(size)?;
        Ok(Self {
            size: size as i32,
            cell_size: DEFAULT_CELL_SIZE,
            world_positions: None,
        })
    }

    pub fn size(&self) -> u32 {
        self.size as u32
    }

    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// World extent along X.
    pub fn width(&self) -> f32 {
        self.size as f32 * self.cell_size.x
    }

    /// World extent along Z.
    pub fn depth(&self) -> f32 {
        self.size as f32 * self.cell_size.z
    }

    /// Rebuild the lattice for a new size and report it.
    ///
    /// Bricks are not touched here; whoever owns them re-anchors them. A size
    /// above [`MAX_GRID_SIZE`] is rejected and leaves the grid unchanged.
    pub fn resize(&mut self, new_size: u32) -> Result<u32, EditorError> {
        check_size(new_size)?;
        self.size = new_size as i32;
        self.rebuild();
        Ok(self.size())
    }

    fn rebuild(&mut self) {
        let Some(mut table) = self.world_positions.take() else {
            tracing::trace!(size = self.size, "lattice resized");
            return;
        };
        let edge = self.size as usize;
        table.clear();
        table.reserve((edge + 1) * edge * edge);
        for y in BELOW_FLOOR_Y..self.size {
            for z in 0..self.size {
                for x in 0..self.size {
                    table.push(self.compute_world_position(x, y, z));
                }
            }
        }

        tracing::trace!(size = self.size, cells = table.len(), "grid rebuilt");
        self.world_positions = Some(table);
    }

    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        (0..self.size).contains(&x)
            && (BELOW_FLOOR_Y..self.size).contains(&y)
            && (0..self.size).contains(&z)
    }

    /// The cell at the given indices, or `None` outside the lattice.
    pub fn cell_by_index(&self, x: i32, y: i32, z: i32) -> Option<Cell> {
        if self.contains(x, y, z) {
            Some(Cell::from_coords(x, y, z))
        } else {
            None
        }
    }

    pub fn cell_at(&self, v: IVec3) -> Option<Cell> {
        self.cell_by_index(v.x, v.y, v.z)
    }

    /// Neighbouring cell along an offset, if it is still inside the grid.
    pub fn offset(&self, cell: Cell, delta: IVec3) -> Option<Cell> {
        self.cell_at(cell.as_ivec3() + delta)
    }

    /// World anchor of a cell, as placed by a renderer.
    pub fn world_position(&self, cell: Cell) -> Option<Vec3> {
        let index = self.slot_index(cell)?;
        match &self.world_positions {
            Some(table) => table.get(index).copied(),
            None => Some(self.compute_world_position(cell.x, cell.y, cell.z)),
        }
    }

    /// Inverse of [`Grid::world_position`] for host-supplied coordinates.
    ///
    /// Negative heights clamp to the floor.
    pub fn cell_from_world_position(&self, position: Vec3) -> Option<Cell> {
        let x = ((position.x + self.width() / 2.0) / self.cell_size.x).floor() as i32;
        let y = ((position.y / self.cell_size.y).round() as i32).max(0);
        let z = ((position.z + self.depth() / 2.0) / self.cell_size.z).floor() as i32;
        self.cell_by_index(x, y, z)
    }

    /// All cells a brick may rest in, bottom layer first.
    pub fn resting_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.size).flat_map(move |y| {
            (0..self.size)
                .flat_map(move |z| (0..self.size).map(move |x| Cell::from_coords(x, y, z)))
        })
    }

    fn slot_index(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell.x, cell.y, cell.z) {
            return None;
        }
        let edge = self.size as usize;
        let layer = (cell.y - BELOW_FLOOR_Y) as usize;
        Some((layer * edge + cell.z as usize) * edge + cell.x as usize)
    }

    fn compute_world_position(&self, x: i32, y: i32, z: i32) -> Vec3 {
        let start_x = -(self.width() / 2.0) + self.cell_size.x / 2.0;
        let start_z = -(self.depth() / 2.0) + self.cell_size.z / 2.0;
        Vec3::new(
            start_x + self.cell_size.x * x as f32,
            self.cell_size.y * y as f32,
            start_z + self.cell_size.z * z as f32,
        )
    }
}

fn check_size(size: u32) -> Result<(), EditorError> {
    if size > MAX_GRID_SIZE {
        return Err(EditorError::GridTooLarge {
            size,
            max: MAX_GRID_SIZE,
        });
    }
    Ok(())
}
