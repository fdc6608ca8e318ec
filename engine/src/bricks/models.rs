//! Persisted Models
//!
//! The serializable save state: bricks, colors and the design that bundles them.

use std::collections::BTreeMap;
use std::path::Path;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::error::DesignError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrickColor {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Translucent bricks render with reduced opacity; occupancy is unaffected.
    #[serde(default)]
    pub is_clear: bool,
    #[serde(default = "default_color_hex")]
    pub color_hex: String,
}

fn default_color_hex() -> String {
    "0xFFFFFF".to_string()
}

impl BrickColor {
    pub fn new(id: u32, name: impl Into<String>, color_hex: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_clear: false,
            color_hex: color_hex.into(),
        }
    }
}

/// One placed brick as stored in a design.
///
/// `rotation_x`, `rotation_z` and `pivot_y` are carried for the host and
/// round-trip untouched; occupancy only looks at `rotation_y` and the X/Z pivot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brick {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(default)]
    pub rotation_x: i32,
    #[serde(default)]
    pub rotation_y: i32,
    #[serde(default)]
    pub rotation_z: i32,
    #[serde(default)]
    pub pivot_x: i32,
    #[serde(default)]
    pub pivot_y: i32,
    #[serde(default)]
    pub pivot_z: i32,
    pub type_id: u32,
    pub color_id: u32,
}

impl Brick {
    pub fn new(id: u32, type_id: u32, color_id: u32, anchor: IVec3) -> Self {
        Self {
            id,
            x: anchor.x,
            y: anchor.y,
            z: anchor.z,
            type_id,
            color_id,
            ..Self::default()
        }
    }

    pub fn with_rotation_y(mut self, degrees: i32) -> Self {
        self.rotation_y = degrees;
        self
    }

    pub fn with_pivot(mut self, pivot_x: i32, pivot_z: i32) -> Self {
        self.pivot_x = pivot_x;
        self.pivot_z = pivot_z;
        self
    }

    pub fn anchor(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    pub(crate) fn set_anchor(&mut self, anchor: IVec3) {
        self.x = anchor.x;
        self.y = anchor.y;
        self.z = anchor.z;
    }
}

/// Complete save state of a model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Design {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    pub bricks: Vec<Brick>,
    pub colors: Vec<BrickColor>,
}

impl Design {
    pub fn from_json_str(json: &str) -> Result<Self, DesignError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, DesignError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, DesignError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), DesignError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Grid size to use for this design, falling back when the file omits it.
    pub fn size_or(&self, fallback: u32) -> u32 {
        self.size.unwrap_or(fallback)
    }

    pub fn color(&self, id: u32) -> Option<&BrickColor> {
        self.colors.iter().find(|c| c.id == id)
    }
}

/// Colors available to the paint tool, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BrickPalette {
    colors: BTreeMap<u32, BrickColor>,
}

impl BrickPalette {
    pub fn new(colors: impl IntoIterator<Item = BrickColor>) -> Self {
        Self {
            colors: colors.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn insert(&mut self, color: BrickColor) {
        self.colors.insert(color.id, color);
    }

    pub fn get(&self, id: u32) -> Option<&BrickColor> {
        self.colors.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BrickColor> {
        self.colors.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_json_field_names() {
        let json = r#"{
            "size": 10,
            "bricks": [
                { "id": 1, "x": 2, "y": 0, "z": 3, "rotationY": -90,
                  "pivotX": 1, "pivotZ": 0, "typeId": 4, "colorId": 9 }
            ],
            "colors": [ { "id": 9, "name": "red", "isClear": true, "colorHex": "0xFF0000" } ]
        }"#;
        let design = Design::from_json_str(json).unwrap();
        assert_eq!(design.size, Some(10));
        let brick = &design.bricks[0];
        assert_eq!(brick.anchor(), IVec3::new(2, 0, 3));
        assert_eq!(brick.rotation_y, -90);
        assert_eq!(brick.pivot_x, 1);
        assert_eq!(brick.rotation_x, 0);
        assert!(design.color(9).unwrap().is_clear);
    }

    #[test]
    fn test_design_round_trip_keeps_integers() {
        let design = Design {
            size: Some(32),
            bricks: vec![
                Brick::new(1, 2, 3, IVec3::new(31, 0, 0))
                    .with_rotation_y(270)
                    .with_pivot(1, 1),
            ],
            colors: vec![BrickColor::new(3, "blue", "0x0000FF")],
        };
        let json = design.to_json_string().unwrap();
        assert_eq!(Design::from_json_str(&json).unwrap(), design);
    }

    #[test]
    fn test_missing_size_falls_back() {
        let design = Design::from_json_str(r#"{ "bricks": [], "colors": [] }"#).unwrap();
        assert_eq!(design.size_or(16), 16);
    }

    #[test]
    fn test_color_defaults() {
        let color: BrickColor = serde_json::from_str(r#"{ "id": 1 }"#).unwrap();
        assert_eq!(color.color_hex, "0xFFFFFF");
        assert!(!color.is_clear);
    }
}
