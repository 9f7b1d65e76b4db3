//! # Bill of Materials
//!
//! Per-part metadata, the grouped bill of materials and the JSON manifest
//! that accompanies exported parts.

use crate::layout::{AssemblyLayout, DerivedScalars, LayoutChecks};
use crate::selector::SelectorState;
use mechlogic_core::{Error, PartPose, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Default print material.
pub const DEFAULT_MATERIAL: &str = "PLA";

/// Axles are cut from rod stock rather than printed.
pub const AXLE_MATERIAL: &str = "steel";

/// Kind of a placed part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    SpurGear,
    BevelGear,
    DogClutch,
    ShiftLever,
    Axle,
}

/// Metadata used for the bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartMetadata {
    pub part_id: String,
    pub kind: PartKind,
    pub name: String,
    pub material: String,
    pub count: u32,
    /// Named dimensions in millimetres (tooth counts are stored as numbers).
    pub dimensions: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PartMetadata {
    pub fn new(part_id: impl Into<String>, kind: PartKind, name: impl Into<String>) -> Self {
        Self {
            part_id: part_id.into(),
            kind,
            name: name.into(),
            material: DEFAULT_MATERIAL.to_string(),
            count: 1,
            dimensions: BTreeMap::new(),
            notes: None,
        }
    }

    pub fn with_dimension(mut self, name: &str, value: f64) -> Self {
        self.dimensions.insert(name.to_string(), value);
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One line of the bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    pub kind: PartKind,
    pub name: String,
    pub material: String,
    pub quantity: u32,
    pub part_ids: Vec<String>,
}

/// Group the layout's parts by kind, name and material.
pub fn bill_of_materials(layout: &AssemblyLayout) -> Vec<BomLine> {
    let mut lines: BTreeMap<(PartKind, String, String), BomLine> = BTreeMap::new();
    for (part_id, part) in &layout.parts {
        let meta = &part.metadata;
        let line = lines
            .entry((meta.kind, meta.name.clone(), meta.material.clone()))
            .or_insert_with(|| BomLine {
                kind: meta.kind,
                name: meta.name.clone(),
                material: meta.material.clone(),
                quantity: 0,
                part_ids: Vec::new(),
            });
        line.quantity += meta.count;
        line.part_ids.push(part_id.clone());
    }
    lines.into_values().collect()
}

/// A part entry of the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestPart {
    pub pose: PartPose,
    pub metadata: PartMetadata,
}

/// Machine readable description of a generated assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub generator: String,
    pub version: String,
    pub build_date: String,
    pub element: String,
    pub state: SelectorState,
    pub derived: DerivedScalars,
    pub checks: LayoutChecks,
    pub parts: BTreeMap<String, ManifestPart>,
    pub bill_of_materials: Vec<BomLine>,
}

impl Manifest {
    pub fn new(layout: &AssemblyLayout, build_date: &str) -> Self {
        Self {
            generator: "mechlogic".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_date: build_date.to_string(),
            element: layout.element.clone(),
            state: layout.state,
            derived: layout.derived.clone(),
            checks: layout.checks,
            parts: layout
                .parts
                .iter()
                .map(|(id, part)| {
                    (
                        id.clone(),
                        ManifestPart {
                            pose: part.pose,
                            metadata: part.metadata.clone(),
                        },
                    )
                })
                .collect(),
            bill_of_materials: bill_of_materials(layout),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::other(format!("Failed to serialize manifest: {}", e)))
    }

    /// Write the manifest as pretty JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), parts = self.parts.len(), "Wrote manifest");
        Ok(())
    }
}

/// Manifest JSON for `layout`, stamped with `build_date`.
pub fn to_manifest_json(layout: &AssemblyLayout, build_date: &str) -> Result<String> {
    Manifest::new(layout, build_date).to_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let meta = PartMetadata::new("axle_pivot", PartKind::Axle, "Pivot axle")
            .with_dimension("diameter", 6.0)
            .with_material("steel")
            .with_notes("cut from rod");
        assert_eq!(meta.count, 1);
        assert_eq!(meta.material, "steel");
        assert_eq!(meta.dimensions["diameter"], 6.0);
        assert_eq!(meta.notes.as_deref(), Some("cut from rod"));
    }

    #[test]
    fn test_metadata_json_skips_empty_notes() {
        let meta = PartMetadata::new("gear_a", PartKind::SpurGear, "Selector gear A");
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"kind\":\"spur_gear\""));
        assert!(!json.contains("notes"));
    }
}
