use std::collections::{BTreeSet, HashMap};
use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{AssetRef, MaterialDescriptor};

/// Swappable body part slots on a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartCategory {
    FrontBumper,
    RearBumper,
    SideSkirt,
    Spoiler,
    Wheels,
}

impl PartCategory {
    pub const ALL: [PartCategory; 5] = [
        PartCategory::FrontBumper,
        PartCategory::RearBumper,
        PartCategory::SideSkirt,
        PartCategory::Spoiler,
        PartCategory::Wheels,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            PartCategory::FrontBumper => "Front Bumper",
            PartCategory::RearBumper => "Rear Bumper",
            PartCategory::SideSkirt => "Side Skirt",
            PartCategory::Spoiler => "Spoiler",
            PartCategory::Wheels => "Wheels",
        }
    }

    /// Name given to the child entity that carries the part mesh.
    pub fn attachment_name(self) -> &'static str {
        match self {
            PartCategory::FrontBumper => "FrontBumper",
            PartCategory::RearBumper => "RearBumper",
            PartCategory::SideSkirt => "SideSkirt",
            PartCategory::Spoiler => "Spoiler",
            PartCategory::Wheels => "Wheels",
        }
    }
}

impl fmt::Display for PartCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a tuning operation addresses: one part category, or the paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Part(PartCategory),
    Paint,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Part(category) => write!(f, "{}", category.display_name().to_lowercase()),
            Slot::Paint => f.write_str("paint"),
        }
    }
}

/// Common metadata of everything a player can pick from a catalog.
pub trait CatalogEntry {
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn price(&self) -> f32;
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// A selectable physical component (bumper, skirt, spoiler, wheel set).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartOption {
    pub id: String,
    pub display_name: String,
    pub price: f32,
    /// Free-form tags such as the chassis code ("BMW_G82") or mount point ("Front_Bumper").
    pub compatibility_tags: BTreeSet<String>,
    pub mesh: AssetRef<Mesh>,
    /// Material slots of the part mesh, in order.
    pub material_overrides: Vec<AssetRef<StandardMaterial>>,
    /// Played once when the part is fitted (exhaust note, clunk).
    pub sound: AssetRef<AudioSource>,
}

impl PartOption {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, price: f32) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            price,
            ..default()
        }
    }

    pub fn with_mesh(mut self, mesh: AssetRef<Mesh>) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.compatibility_tags.insert(tag.into());
        self
    }

    pub fn is_compatible_with(&self, tag: &str) -> bool {
        self.compatibility_tags.contains(tag)
    }
}

impl CatalogEntry for PartOption {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn price(&self) -> f32 {
        self.price
    }
}

// ---------------------------------------------------------------------------
// Paints
// ---------------------------------------------------------------------------

/// A selectable finish for the vehicle body.
///
/// Legacy paints swap in a ready-made material; advanced paints drive the
/// layered parameters of [`MaterialDescriptor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintOption {
    pub id: String,
    pub display_name: String,
    pub price: f32,
    /// Material used as-is in legacy mode.
    pub material: AssetRef<StandardMaterial>,
    pub advanced: MaterialDescriptor,
    pub use_legacy_material: bool,
}

impl Default for PaintOption {
    fn default() -> Self {
        Self {
            id: String::new(),
            display_name: String::new(),
            price: 0.0,
            material: AssetRef::null(),
            advanced: MaterialDescriptor::default(),
            use_legacy_material: true,
        }
    }
}

impl PaintOption {
    /// An advanced paint taking id, name and price from its descriptor.
    pub fn advanced(descriptor: MaterialDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            display_name: descriptor.display_name.clone(),
            price: descriptor.price,
            advanced: descriptor,
            use_legacy_material: false,
            ..default()
        }
    }

    pub fn legacy(
        id: impl Into<String>,
        display_name: impl Into<String>,
        price: f32,
        material: AssetRef<StandardMaterial>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            price,
            material,
            ..default()
        }
    }
}

impl CatalogEntry for PaintOption {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn price(&self) -> f32 {
        self.price
    }
}

// ---------------------------------------------------------------------------
// Configuration asset
// ---------------------------------------------------------------------------

/// Every option available for one vehicle model, plus the initial selection.
///
/// Authored as a `*.vehicle.ron` file and treated as read-only once loaded.
#[derive(Asset, TypePath, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub parts: HashMap<PartCategory, Vec<PartOption>>,
    pub paints: Vec<PaintOption>,
    /// Initial part index per category. Missing categories start at 0.
    pub default_parts: HashMap<PartCategory, usize>,
    pub default_paint: usize,
}

impl VehicleConfig {
    pub fn parts(&self, category: PartCategory) -> &[PartOption] {
        self.parts.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn paints(&self) -> &[PaintOption] {
        &self.paints
    }

    pub fn default_part(&self, category: PartCategory) -> usize {
        self.default_parts.get(&category).copied().unwrap_or(0)
    }

    pub fn find_part(&self, category: PartCategory, id: &str) -> Option<usize> {
        find_entry(self.parts(category), id)
    }

    pub fn find_paint(&self, id: &str) -> Option<usize> {
        find_entry(&self.paints, id)
    }

    pub fn with_parts(mut self, category: PartCategory, parts: Vec<PartOption>) -> Self {
        self.parts.insert(category, parts);
        self
    }

    pub fn with_paints(mut self, paints: Vec<PaintOption>) -> Self {
        self.paints = paints;
        self
    }
}

/// Position of the entry with the given id.
pub fn find_entry<T: CatalogEntry>(entries: &[T], id: &str) -> Option<usize> {
    entries.iter().position(|entry| entry.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bumpers() -> Vec<PartOption> {
        vec![
            PartOption::new("stock", "Stock", 0.0),
            PartOption::new("sport", "Sport", 1200.0).with_tag("BMW_G82"),
            PartOption::new("aero", "Aero", 2600.0),
        ]
    }

    #[test]
    fn lookup_by_id() {
        let config = VehicleConfig::default().with_parts(PartCategory::FrontBumper, bumpers());
        assert_eq!(config.find_part(PartCategory::FrontBumper, "aero"), Some(2));
        assert_eq!(config.find_part(PartCategory::FrontBumper, "missing"), None);
        assert_eq!(config.find_part(PartCategory::RearBumper, "aero"), None);
        assert!(config.parts(PartCategory::Spoiler).is_empty());
    }

    #[test]
    fn compatibility_tags() {
        let parts = bumpers();
        assert!(parts[1].is_compatible_with("BMW_G82"));
        assert!(!parts[0].is_compatible_with("BMW_G82"));
    }

    #[test]
    fn paint_defaults_to_legacy_mode() {
        let paint = PaintOption::default();
        assert!(paint.use_legacy_material);

        let advanced = PaintOption::advanced(MaterialDescriptor {
            id: "Pearl_Blue".into(),
            display_name: "Pearl Blue".into(),
            price: 2200.0,
            ..default()
        });
        assert!(!advanced.use_legacy_material);
        assert_eq!(advanced.id, "Pearl_Blue");
        assert_eq!(advanced.price, 2200.0);
    }

    #[test]
    fn config_from_ron() {
        let config: VehicleConfig = ron::from_str(
            r#"(
                parts: {
                    FrontBumper: [
                        (id: "stock", display_name: "Stock"),
                        (id: "sport", display_name: "Sport", price: 1200.0, compatibility_tags: ["Front_Bumper"]),
                    ],
                },
                paints: [
                    (id: "white", display_name: "Alpine White", material: Some("materials/white.glb#Material0")),
                ],
                default_parts: { FrontBumper: 1 },
            )"#,
        )
        .unwrap();

        assert_eq!(config.parts(PartCategory::FrontBumper).len(), 2);
        assert_eq!(config.default_part(PartCategory::FrontBumper), 1);
        assert_eq!(config.default_part(PartCategory::RearBumper), 0);
        assert_eq!(config.default_paint, 0);
        assert!(config.paints[0].use_legacy_material);
        assert_eq!(
            config.paints[0].material.path(),
            Some("materials/white.glb#Material0")
        );
    }

    #[test]
    fn slot_display() {
        assert_eq!(Slot::Part(PartCategory::FrontBumper).to_string(), "front bumper");
        assert_eq!(Slot::Paint.to_string(), "paint");
    }
}
