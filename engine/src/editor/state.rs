//! Editor State
//!
//! Everything one editing session owns: the grid, the catalog and palette,
//! every brick object created so far, and the cell -> owner index of the
//! built ones.
//!
//! Invariants kept by every mutator here:
//! - no cell is claimed by two built objects
//! - every built object rests inside `[0, size)^3`
//! - an object's cached cells match its anchor, pivot and rotation

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::IVec3;

use crate::bricks::{
    BrickCatalog, BrickObject, BrickObjectId, BrickPalette, Design, Rotation,
};
use crate::config::EditorConfig;
use crate::error::{EditorError, PlaceError};
use crate::world::{Cell, Grid};

/// Anchor cell of every built brick object, taken before an edit.
pub type CellSnapshot = BTreeMap<BrickObjectId, Cell>;

#[derive(Debug, Clone)]
pub struct EditorState {
    pub(crate) grid: Grid,
    catalog: BrickCatalog,
    palette: BrickPalette,
    pub(crate) objects: BTreeMap<BrickObjectId, BrickObject>,
    pub(crate) built: BTreeSet<BrickObjectId>,
    pub(crate) cell_owners: HashMap<Cell, BrickObjectId>,
    next_object_id: u32,
    next_brick_id: u32,
}

impl EditorState {
    pub fn new(grid: Grid, catalog: BrickCatalog, palette: BrickPalette) -> Self {
        Self {
            grid,
            catalog,
            palette,
            objects: BTreeMap::new(),
            built: BTreeSet::new(),
            cell_owners: HashMap::new(),
            next_object_id: 1,
            next_brick_id: 1,
        }
    }

    pub fn from_config(config: &EditorConfig, catalog: BrickCatalog, palette: BrickPalette) -> Self {
        Self::new(Grid::new(config.grid_size, config.cell_size), catalog, palette)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn catalog(&self) -> &BrickCatalog {
        &self.catalog
    }

    pub fn palette(&self) -> &BrickPalette {
        &self.palette
    }

    pub fn object(&self, id: BrickObjectId) -> Option<&BrickObject> {
        self.objects.get(&id)
    }

    pub(crate) fn object_ref(&self, id: BrickObjectId) -> Result<&BrickObject, EditorError> {
        self.objects.get(&id).ok_or(EditorError::UnknownObject(id))
    }

    fn object_mut(&mut self, id: BrickObjectId) -> Result<&mut BrickObject, EditorError> {
        self.objects.get_mut(&id).ok_or(EditorError::UnknownObject(id))
    }

    pub fn is_built(&self, id: BrickObjectId) -> bool {
        self.built.contains(&id)
    }

    pub fn built_count(&self) -> usize {
        self.built.len()
    }

    /// Built objects in id order.
    pub fn built_objects(&self) -> impl Iterator<Item = &BrickObject> {
        self.built.iter().filter_map(|id| self.objects.get(id))
    }

    /// The built object claiming `cell`, if any.
    pub fn brick_object_at(&self, cell: Cell) -> Option<BrickObjectId> {
        self.cell_owners.get(&cell).copied()
    }

    /// Cells currently covered by an object, for live highlighting.
    pub fn occupied_cells(&self, id: BrickObjectId) -> Option<&[Cell]> {
        self.objects.get(&id)?.occupied_cells()
    }

    /// Create an unanchored, unbuilt object of the given type and color.
    pub fn create_brick_object(
        &mut self,
        type_id: u32,
        color_id: u32,
    ) -> Result<BrickObjectId, EditorError> {
        let brick_type = self
            .catalog
            .get(type_id)
            .cloned()
            .ok_or(EditorError::UnknownBrickType(type_id))?;
        let color = self
            .palette
            .get(color_id)
            .cloned()
            .ok_or(EditorError::UnknownBrickColor(color_id))?;

        let id = BrickObjectId(self.next_object_id);
        self.next_object_id += 1;
        let brick_id = self.next_brick_id;
        self.next_brick_id += 1;

        self.objects
            .insert(id, BrickObject::new(id, brick_id, brick_type, color));
        Ok(id)
    }

    /// Forget an unbuilt object entirely.
    pub fn discard_brick_object(&mut self, id: BrickObjectId) -> Result<(), EditorError> {
        if self.is_built(id) {
            return Err(EditorError::AlreadyBuilt(id));
        }
        self.objects.remove(&id).ok_or(EditorError::UnknownObject(id))?;
        Ok(())
    }

    /// Turn an unbuilt object by quarter turns; built bricks stay as placed.
    pub fn rotate_brick_object(
        &mut self,
        id: BrickObjectId,
        quarter_turns: i32,
    ) -> Result<Rotation, EditorError> {
        if self.is_built(id) {
            return Err(EditorError::AlreadyBuilt(id));
        }
        let grid = &self.grid;
        let object = self.objects.get_mut(&id).ok_or(EditorError::UnknownObject(id))?;
        let rotation = object.rotation().turned(quarter_turns);
        object.set_rotation(grid, rotation);
        Ok(rotation)
    }

    /// Re-centre an unbuilt object's footprint; `Ok(false)` if the pivot is not a solid cell.
    pub fn set_brick_object_pivot(
        &mut self,
        id: BrickObjectId,
        pivot_x: i32,
        pivot_z: i32,
    ) -> Result<bool, EditorError> {
        if self.is_built(id) {
            return Err(EditorError::AlreadyBuilt(id));
        }
        let grid = &self.grid;
        let object = self.objects.get_mut(&id).ok_or(EditorError::UnknownObject(id))?;
        Ok(object.set_pivot(grid, pivot_x, pivot_z))
    }

    /// Validate and build an object at `cell`.
    ///
    /// A cell on the below-floor layer lifts whatever stands in the way by one
    /// layer and places the object on the floor.
    pub fn build_brick_object(&mut self, id: BrickObjectId, cell: Cell) -> Result<(), EditorError> {
        self.object_ref(id)?;
        if self.is_built(id) {
            return Err(EditorError::AlreadyBuilt(id));
        }
        self.place_validated(id, cell)
    }

    /// Take a built object out of the index without touching anything else.
    pub fn destroy_brick_object(&mut self, id: BrickObjectId) -> Result<(), EditorError> {
        self.object_ref(id)?;
        if !self.is_built(id) {
            return Err(EditorError::NotBuilt(id));
        }
        self.unregister(id);
        Ok(())
    }

    /// Destroy a built object and let whatever it held up settle.
    ///
    /// Returns the number of groups gravity moved.
    pub fn remove_brick_object(&mut self, id: BrickObjectId) -> Result<usize, EditorError> {
        self.destroy_brick_object(id)?;
        Ok(self.fix_brick_build())
    }

    /// Swap an object's color, returning the previous color id.
    pub fn paint_brick_object(
        &mut self,
        id: BrickObjectId,
        color_id: u32,
    ) -> Result<u32, EditorError> {
        let color = self
            .palette
            .get(color_id)
            .cloned()
            .ok_or(EditorError::UnknownBrickColor(color_id))?;
        let object = self.object_mut(id)?;
        Ok(object.set_color(color).id)
    }

    /// Move a built object to a new anchor, then settle the model.
    ///
    /// On rejection the object stays where it was.
    pub fn move_brick_object(&mut self, id: BrickObjectId, cell: Cell) -> Result<(), EditorError> {
        let old_cell = self.object_ref(id)?.cell();
        if !self.is_built(id) {
            return Err(EditorError::NotBuilt(id));
        }
        let Some(old_cell) = old_cell else {
            return Err(EditorError::NotBuilt(id));
        };

        self.unregister(id);
        if let Err(err) = self.place_validated(id, cell) {
            self.restore_brick_object(id, old_cell)?;
            return Err(err);
        }
        self.fix_brick_build();
        Ok(())
    }

    pub fn snapshot_cells(&self) -> CellSnapshot {
        self.built_objects()
            .filter_map(|object| object.cell().map(|cell| (object.id(), cell)))
            .collect()
    }

    /// Put built objects back where a snapshot saw them.
    ///
    /// Only objects whose anchor actually changed are touched. Returns how
    /// many moved.
    pub fn restore_snapshot(&mut self, snapshot: &CellSnapshot) -> Result<usize, EditorError> {
        let moved: Vec<(BrickObjectId, Cell)> = snapshot
            .iter()
            .filter(|(id, cell)| {
                self.built.contains(id)
                    && self.objects.get(id).and_then(|o| o.cell()) != Some(**cell)
            })
            .map(|(id, cell)| (*id, *cell))
            .collect();

        for (id, _) in &moved {
            self.unregister(*id);
        }
        let grid = &self.grid;
        for (id, cell) in &moved {
            if let Some(object) = self.objects.get_mut(id) {
                object.set_cell(grid, *cell);
            }
        }
        for (id, _) in &moved {
            self.register(*id)?;
        }
        Ok(moved.len())
    }

    /// Re-anchor and register an object without the support rule.
    ///
    /// Used to put a previously valid brick back on undo.
    pub(crate) fn restore_brick_object(
        &mut self,
        id: BrickObjectId,
        cell: Cell,
    ) -> Result<(), EditorError> {
        if self.is_built(id) {
            return Err(EditorError::AlreadyBuilt(id));
        }
        let grid = &self.grid;
        let object = self.objects.get_mut(&id).ok_or(EditorError::UnknownObject(id))?;
        object.set_cell(grid, cell);
        self.register(id)
    }

    pub(crate) fn place_validated(&mut self, id: BrickObjectId, cell: Cell) -> Result<(), EditorError> {
        if cell.is_below_floor() {
            return self.insert_below_floor(id, cell);
        }
        self.validate_placement(id, cell)?;
        let grid = &self.grid;
        let object = self.objects.get_mut(&id).ok_or(EditorError::UnknownObject(id))?;
        object.set_cell(grid, cell);
        self.register(id)
    }

    /// Claim every cell of an object in the index.
    pub(crate) fn register(&mut self, id: BrickObjectId) -> Result<(), EditorError> {
        let cells = self
            .occupied_cells(id)
            .ok_or(EditorError::Placement(PlaceError::OutOfBounds))?
            .to_vec();

        if let Some(cell) = cells
            .iter()
            .find(|cell| self.cell_owners.get(cell).is_some_and(|&owner| owner != id))
        {
            return Err(EditorError::CellConflict {
                x: cell.x(),
                y: cell.y(),
                z: cell.z(),
            });
        }

        for cell in cells {
            self.cell_owners.insert(cell, id);
        }
        self.built.insert(id);
        Ok(())
    }

    pub(crate) fn unregister(&mut self, id: BrickObjectId) {
        self.cell_owners.retain(|_, owner| *owner != id);
        self.built.remove(&id);
    }

    fn reindex(&mut self) -> Result<(), EditorError> {
        self.cell_owners.clear();
        let ids: Vec<BrickObjectId> = std::mem::take(&mut self.built).into_iter().collect();
        for id in ids {
            self.register(id)?;
        }
        Ok(())
    }

    /// Replace the session contents with a saved design.
    ///
    /// Colors from the design are added to the palette and the grid takes the
    /// design's size when it records one. The design is loaded into a staged
    /// state first; on any error the session is left exactly as it was.
    pub fn load_design(&mut self, design: &Design) -> Result<Vec<BrickObjectId>, EditorError> {
        let mut grid = self.grid.clone();
        if let Some(size) = design.size {
            grid.resize(size)?;
        }
        let mut palette = self.palette.clone();
        for color in &design.colors {
            palette.insert(color.clone());
        }

        let mut staged = EditorState::new(grid, self.catalog.clone(), palette);
        staged.next_object_id = self.next_object_id;

        let mut ids = Vec::with_capacity(design.bricks.len());
        for brick in &design.bricks {
            let brick_type = staged
                .catalog
                .get(brick.type_id)
                .cloned()
                .ok_or(EditorError::UnknownBrickType(brick.type_id))?;
            let color = staged
                .palette
                .get(brick.color_id)
                .cloned()
                .ok_or(EditorError::UnknownBrickColor(brick.color_id))?;

            let id = BrickObjectId(staged.next_object_id);
            staged.next_object_id += 1;
            let object = BrickObject::from_brick(id, brick.clone(), brick_type, color, &staged.grid)?;
            staged.objects.insert(id, object);
            staged.register(id)?;
            ids.push(id);
        }

        staged.next_brick_id = design.bricks.iter().map(|b| b.id + 1).max().unwrap_or(1);
        *self = staged;
        tracing::debug!(bricks = ids.len(), size = self.grid.size(), "design loaded");
        Ok(ids)
    }

    /// Current built bricks as a saveable design.
    pub fn to_design(&self) -> Design {
        let mut bricks: Vec<_> = self.built_objects().map(|o| o.brick().clone()).collect();
        bricks.sort_by_key(|b| b.id);
        Design {
            size: Some(self.grid.size()),
            bricks,
            colors: self.palette.iter().cloned().collect(),
        }
    }

    /// Resize the grid and translate every built brick by `offset`.
    ///
    /// Fails without changing anything if a brick would leave the new grid.
    pub fn resize_grid(&mut self, new_size: u32, offset: IVec3) -> Result<u32, EditorError> {
        let old_grid = self.grid.clone();
        let snapshot = self.snapshot_cells();
        self.grid.resize(new_size)?;

        let mut fits = true;
        for (id, cell) in &snapshot {
            let target = self.grid.cell_at(cell.as_ivec3() + offset);
            let grid = &self.grid;
            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            match target {
                Some(target) if !target.is_below_floor() => {
                    object.set_cell(grid, target);
                    fits &= object.occupied_cells().is_some();
                }
                _ => fits = false,
            }
        }

        if !fits {
            self.grid = old_grid;
            let grid = &self.grid;
            for (id, cell) in &snapshot {
                if let Some(object) = self.objects.get_mut(id) {
                    object.set_cell(grid, *cell);
                }
            }
            self.refresh_unbuilt();
            self.reindex()?;
            return Err(EditorError::Placement(PlaceError::OutOfBounds));
        }

        self.refresh_unbuilt();
        self.reindex()?;
        Ok(self.grid.size())
    }

    fn refresh_unbuilt(&mut self) {
        let grid = &self.grid;
        for (id, object) in self.objects.iter_mut() {
            if !self.built.contains(id) {
                object.refresh(grid);
            }
        }
    }
}
