//! Occupancy
//!
//! Maps a brick instance (type, pivot, Y rotation, anchor) to the grid cells it
//! covers. Rotation is always a quarter turn about Y, so the transform is an
//! integer swap/negate rather than trigonometry.

use glam::IVec3;

use super::catalog::BrickType;
use crate::world::{Cell, Grid};

/// Quarter-turn rotation about the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Accepts 0, ±90, ±180 and ±270.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::R0),
            90 | -270 => Some(Rotation::R90),
            180 | -180 => Some(Rotation::R180),
            270 | -90 => Some(Rotation::R270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() * 90
    }

    fn quarter_turns(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    /// Rotate further by `quarter_turns` (negative turns the other way).
    pub fn turned(self, quarter_turns: i32) -> Self {
        Self::ALL[(self.quarter_turns() + quarter_turns).rem_euclid(4) as usize]
    }

    pub fn inverse(self) -> Self {
        self.turned(-2 * self.quarter_turns())
    }

    pub fn apply(self, v: IVec3) -> IVec3 {
        match self {
            Rotation::R0 => v,
            Rotation::R90 => IVec3::new(v.z, v.y, -v.x),
            Rotation::R180 => IVec3::new(-v.x, v.y, -v.z),
            Rotation::R270 => IVec3::new(-v.z, v.y, v.x),
        }
    }
}

/// How a brick sits on its anchor: footprint pivot plus Y rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrickPose {
    pub pivot_x: i32,
    pub pivot_z: i32,
    pub rotation: Rotation,
}

impl BrickPose {
    pub fn new(pivot_x: i32, pivot_z: i32, rotation: Rotation) -> Self {
        Self {
            pivot_x,
            pivot_z,
            rotation,
        }
    }
}

/// Anchor-relative offsets of every solid cell, after pivot and rotation.
pub fn footprint_offsets(brick_type: &BrickType, pose: BrickPose) -> Vec<IVec3> {
    let mut offsets = Vec::new();
    for (lx, lz) in brick_type.solid_footprint() {
        for ly in 0..brick_type.height as i32 {
            let local = IVec3::new(lx - pose.pivot_x, ly, lz - pose.pivot_z);
            offsets.push(pose.rotation.apply(local));
        }
    }
    offsets
}

/// Cells covered by a brick anchored at `anchor`.
///
/// All or nothing: if any required cell falls outside the grid the whole
/// brick is rejected with `None`.
pub fn occupied_cells(
    grid: &Grid,
    brick_type: &BrickType,
    pose: BrickPose,
    anchor: Cell,
) -> Option<Vec<Cell>> {
    let base = anchor.as_ivec3();
    footprint_offsets(brick_type, pose)
        .into_iter()
        .map(|offset| grid.cell_at(base + offset))
        .collect()
}
