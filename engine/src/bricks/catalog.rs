//! Brick Type Catalog
//!
//! Static shape definitions. A type is a `width x depth` footprint bitmap,
//! extruded `height` layers tall.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::MAX_GRID_SIZE;
use crate::error::DesignError;

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickType {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default = "one")]
    pub width: u32,
    #[serde(default = "one")]
    pub depth: u32,
    #[serde(default = "one")]
    pub height: u32,
    /// Row-major solid flags, `arrangement[z * width + x]`.
    #[serde(with = "arrangement_flags")]
    pub arrangement: Vec<bool>,
}

fn one() -> u32 {
    1
}

impl BrickType {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        width: u32,
        depth: u32,
        height: u32,
        arrangement: Vec<bool>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            depth,
            height,
            arrangement,
        }
    }

    /// A fully solid rectangular type.
    pub fn solid(id: u32, width: u32, depth: u32, height: u32) -> Self {
        Self::new(
            id,
            format!("{width}x{depth}"),
            width,
            depth,
            height,
            vec![true; width as usize * depth as usize],
        )
    }

    pub fn is_solid(&self, x: i32, z: i32) -> bool {
        let (Ok(x), Ok(z)) = (u32::try_from(x), u32::try_from(z)) else {
            return false;
        };
        if x >= self.width || z >= self.depth {
            return false;
        }
        let index = z as usize * self.width as usize + x as usize;
        self.arrangement.get(index).copied().unwrap_or(false)
    }

    /// Solid footprint positions `(x, z)` in row-major order.
    pub fn solid_footprint(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let width = self.width as i32;
        (0..self.depth as i32)
            .flat_map(move |z| (0..width).map(move |x| (x, z)))
            .filter(|&(x, z)| self.is_solid(x, z))
    }

    pub fn footprint_area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.depth)
    }

    /// Reject empty or oversized shapes and arrangements of the wrong length.
    ///
    /// No extent may exceed the largest grid, since such a brick could never
    /// be placed.
    pub fn validate(&self) -> Result<(), DesignError> {
        if self.width == 0 || self.depth == 0 || self.height == 0 {
            return Err(DesignError::EmptyBrickType(self.id));
        }
        if [self.width, self.depth, self.height]
            .iter()
            .any(|&extent| extent > MAX_GRID_SIZE)
        {
            return Err(DesignError::OversizedBrickType(self.id));
        }
        let expected = self
            .width
            .checked_mul(self.depth)
            .and_then(|area| usize::try_from(area).ok())
            .ok_or(DesignError::OversizedBrickType(self.id))?;
        if self.arrangement.len() != expected {
            return Err(DesignError::ArrangementSize {
                id: self.id,
                expected,
                actual: self.arrangement.len(),
            });
        }
        Ok(())
    }
}

/// The catalog stores arrangements as integer flags (`> 0` is solid).
mod arrangement_flags {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flags: &[bool], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(flags.iter().map(|&solid| u8::from(solid)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<bool>, D::Error> {
        let raw = Vec::<i64>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|flag| flag > 0).collect())
    }
}

/// All known brick types, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BrickCatalog {
    types: BTreeMap<u32, BrickType>,
}

impl BrickCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting malformed types.
    pub fn from_types(types: impl IntoIterator<Item = BrickType>) -> Result<Self, DesignError> {
        let mut catalog = Self::new();
        for brick_type in types {
            catalog.insert(brick_type)?;
        }
        Ok(catalog)
    }

    /// Parse a JSON array of brick types.
    pub fn from_json_str(json: &str) -> Result<Self, DesignError> {
        let types: Vec<BrickType> = serde_json::from_str(json)?;
        Self::from_types(types)
    }

    pub fn load(path: &Path) -> Result<Self, DesignError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn insert(&mut self, brick_type: BrickType) -> Result<(), DesignError> {
        brick_type.validate()?;
        self.types.insert(brick_type.id, brick_type);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&BrickType> {
        self.types.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BrickType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
