//! Parts list for printed instructions.

use serde::Serialize;

use crate::bricks::{BrickCatalog, Design};

/// How many bricks of one type and color a design needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsEntry {
    pub color_id: u32,
    pub type_id: u32,
    pub count: usize,
}

/// Bill of materials, grouped by the design's colors in palette order.
///
/// Within a color, larger footprints come first; equal footprints keep the
/// order in which the design first uses them. Bricks whose color is missing
/// from the design's palette are left out.
pub fn parts_list(design: &Design, catalog: &BrickCatalog) -> Vec<PartsEntry> {
    let mut parts = Vec::new();

    for color in &design.colors {
        let mut entries: Vec<PartsEntry> = Vec::new();
        for brick in design.bricks.iter().filter(|b| b.color_id == color.id) {
            match entries.iter_mut().find(|e| e.type_id == brick.type_id) {
                Some(entry) => entry.count += 1,
                None => entries.push(PartsEntry {
                    color_id: color.id,
                    type_id: brick.type_id,
                    count: 1,
                }),
            }
        }

        let area = |type_id: u32| catalog.get(type_id).map_or(0, |t| t.footprint_area());
        entries.sort_by_key(|entry| std::cmp::Reverse(area(entry.type_id)));
        parts.extend(entries);
    }

    let orphans = design
        .bricks
        .iter()
        .filter(|b| design.color(b.color_id).is_none())
        .count();
    if orphans > 0 {
        tracing::warn!(count = orphans, "bricks use colors missing from the design");
    }

    parts
}
