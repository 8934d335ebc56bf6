use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use bevy::prelude::*;
use bevy_tuning_game::{MaterialDescriptor, MaterialType, PaintOption, TuningError, ValidationError};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::validation::validate_material;
use crate::constants::paths;

// ---------------------------------------------------------------------------
// Built-in table
// ---------------------------------------------------------------------------

/// Starting point for a new finish of the given type.
pub fn default_material_for(material_type: MaterialType) -> MaterialDescriptor {
    let mut m = MaterialDescriptor::new(material_type);
    m.id = format!("Default_{}", material_type.display_name().replace(' ', ""));

    match material_type {
        MaterialType::MetallicPaint => {
            m.display_name = "Default Metallic Paint".into();
            m.base_color.color = LinearRgba::rgb(0.8, 0.8, 0.8);
            m.base_color.metallic_intensity = 0.8;
            m.clear_coat.glossiness = 0.9;
        }
        MaterialType::PearlPaint => {
            m.display_name = "Default Pearl Paint".into();
            m.base_color.color = LinearRgba::rgb(0.9, 0.9, 0.9);
            m.base_color.metallic_intensity = 0.6;
            m.base_color.pearl_shift_intensity = 0.7;
            m.clear_coat.glossiness = 0.95;
        }
        MaterialType::FrozenPaint => {
            m.display_name = "Default Frozen Paint".into();
            m.base_color.color = LinearRgba::rgb(0.95, 0.95, 0.95);
            m.base_color.metallic_intensity = 0.9;
            m.base_color.pearl_shift_intensity = 0.8;
            m.clear_coat.glossiness = 0.98;
        }
        MaterialType::CarbonFiber => {
            m.display_name = "Default Carbon Fiber".into();
            m.carbon_fiber.weave_scale = 1.0;
            m.carbon_fiber.weave_angle = 45.0;
            m.carbon_fiber.gloss = 0.6;
        }
        MaterialType::Glass => {
            m.display_name = "Default Glass".into();
            m.glass.visible_light_transmission = 70.0;
            m.glass.tint_color = LinearRgba::WHITE;
        }
        _ => m.display_name = "Default Paint".into(),
    }

    m
}

fn preset(
    base: MaterialType,
    id: &str,
    display_name: &str,
    price: f32,
    edit: impl FnOnce(&mut MaterialDescriptor),
) -> MaterialDescriptor {
    let mut m = default_material_for(base);
    m.id = id.into();
    m.display_name = display_name.into();
    m.price = price;
    edit(&mut m);
    m
}

/// The finishes every showroom ships with.
pub fn builtin_presets() -> Vec<MaterialDescriptor> {
    vec![
        preset(MaterialType::FrozenPaint, "Frozen_White", "Frozen White Pearl", 2500.0, |m| {
            m.base_color.color = LinearRgba::rgb(0.98, 0.98, 0.98);
            m.base_color.metallic_intensity = 0.95;
            m.base_color.pearl_shift_intensity = 0.9;
            m.base_color.pearl_shift_color = LinearRgba::rgb(0.9, 0.95, 1.0);
        }),
        preset(MaterialType::MetallicPaint, "Metallic_Black", "Metallic Black", 1800.0, |m| {
            m.base_color.color = LinearRgba::rgb(0.05, 0.05, 0.05);
            m.base_color.metallic_intensity = 0.8;
            m.clear_coat.glossiness = 0.85;
        }),
        preset(MaterialType::PearlPaint, "Pearl_Blue", "Pearl Blue", 2200.0, |m| {
            m.base_color.color = LinearRgba::rgb(0.1, 0.2, 0.6);
            m.base_color.metallic_intensity = 0.7;
            m.base_color.pearl_shift_intensity = 0.8;
            m.base_color.pearl_shift_color = LinearRgba::rgb(0.3, 0.4, 0.8);
        }),
        preset(MaterialType::MetallicPaint, "Ruby_Red", "Ruby Red Metallic", 2000.0, |m| {
            m.base_color.color = LinearRgba::rgb(0.8, 0.1, 0.1);
            m.base_color.metallic_intensity = 0.9;
            m.clear_coat.glossiness = 0.9;
        }),
        preset(MaterialType::CarbonFiber, "Carbon_Matte", "Carbon Fiber Matte", 3500.0, |m| {
            m.carbon_fiber.weave_angle = 45.0;
            m.carbon_fiber.gloss = 0.3;
            m.carbon_fiber.resin_tint_intensity = 0.2;
        }),
        preset(MaterialType::CarbonFiber, "Carbon_Gloss", "Carbon Fiber Gloss", 3200.0, |m| {
            m.carbon_fiber.weave_angle = 0.0;
            m.carbon_fiber.gloss = 0.8;
            m.carbon_fiber.resin_tint_intensity = 0.4;
        }),
        preset(MaterialType::Glass, "Glass_Clear", "Clear Glass", 800.0, |m| {
            m.glass.visible_light_transmission = 85.0;
            m.glass.fresnel_edge_darkening = 0.2;
        }),
        preset(MaterialType::Glass, "Glass_Tinted", "20% Tinted Glass", 1200.0, |m| {
            m.glass.visible_light_transmission = 20.0;
            m.glass.tint_color = LinearRgba::rgb(0.1, 0.1, 0.1);
            m.glass.fresnel_edge_darkening = 0.4;
        }),
    ]
}

/// Turn a single-material paint into a neutral solid paint descriptor.
pub fn convert_legacy_paint(paint: &PaintOption) -> MaterialDescriptor {
    let mut m = default_material_for(MaterialType::SolidPaint);
    m.id = paint.id.clone();
    m.display_name = paint.display_name.clone();
    m.price = paint.price;
    m.base_material = paint.material.clone();
    m.base_color.metallic_intensity = 0.1;
    m.clear_coat.glossiness = 0.7;
    m
}

/// Whether a finish suits a given use: `"exterior_body"`, `"aero_parts"` or `"windows"`.
pub fn is_material_type_compatible(material_type: MaterialType, use_case: &str) -> bool {
    match use_case {
        "exterior_body" => material_type.is_paint(),
        "aero_parts" => matches!(
            material_type,
            MaterialType::CarbonFiber | MaterialType::MetallicPaint | MaterialType::SolidPaint
        ),
        "windows" => material_type == MaterialType::Glass,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Named finishes: the built-in table plus user presets, which take precedence.
#[derive(Resource, Clone)]
pub struct MaterialPresets {
    builtin: BTreeMap<String, MaterialDescriptor>,
    user: BTreeMap<String, MaterialDescriptor>,
}

impl Default for MaterialPresets {
    fn default() -> Self {
        Self {
            builtin: builtin_presets()
                .into_iter()
                .map(|m| (m.id.clone(), m))
                .collect(),
            user: BTreeMap::new(),
        }
    }
}

impl MaterialPresets {
    /// Look up a preset by name. Unknown names are an error, with the closest
    /// known name as a suggestion.
    pub fn get(&self, name: &str) -> Result<&MaterialDescriptor, TuningError> {
        self.user
            .get(name)
            .or_else(|| self.builtin.get(name))
            .ok_or_else(|| TuningError::UnknownPreset {
                name: name.to_string(),
                suggestion: self.suggest(name),
            })
    }

    /// Add or replace a user preset, keyed by its id.
    pub fn insert(&mut self, descriptor: MaterialDescriptor) -> Result<(), ValidationError> {
        validate_material(&descriptor)?;
        self.user.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    pub fn remove_user(&mut self, name: &str) -> Option<MaterialDescriptor> {
        self.user.remove(name)
    }

    /// All preset names, sorted, without duplicates.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .builtin
            .keys()
            .chain(self.user.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn user_presets(&self) -> impl Iterator<Item = (&String, &MaterialDescriptor)> {
        self.user.iter()
    }

    fn suggest(&self, name: &str) -> Option<String> {
        let matcher = SkimMatcherV2::default();
        self.names()
            .into_iter()
            .filter_map(|candidate| {
                matcher
                    .fuzzy_match(candidate, name)
                    .map(|score| (score, candidate))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, candidate)| candidate.to_string())
    }
}

// ---------------------------------------------------------------------------
// Disk persistence for user presets
// ---------------------------------------------------------------------------

/// Sanitize a preset name for use as a filename (replace filesystem-invalid chars).
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

fn save_preset_to_disk(dir: &Path, name: &str, descriptor: &MaterialDescriptor) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Failed to create paints directory: {}", e);
        return;
    }

    let path = dir.join(format!(
        "{}{}",
        sanitize_filename(name),
        paths::PAINT_PRESET_EXTENSION
    ));

    match ron::ser::to_string_pretty(descriptor, ron::ser::PrettyConfig::default()) {
        Ok(ron_str) => {
            if let Err(e) = std::fs::write(&path, &ron_str) {
                warn!("Failed to write paint preset '{}': {}", name, e);
            }
        }
        Err(e) => {
            warn!("Failed to serialize paint preset '{}': {}", name, e);
        }
    }
}

/// Load `<dir>/*.paint.ron` as user presets. Invalid files are skipped with a warning.
pub fn load_presets_from_disk(presets: &mut MaterialPresets, dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let fname = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let Some(stem) = fname.strip_suffix(paths::PAINT_PRESET_EXTENSION) else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }

        let Ok(contents) = std::fs::read_to_string(&path) else {
            warn!("Failed to read paint preset file: {:?}", path);
            continue;
        };

        let mut descriptor = match ron::from_str::<MaterialDescriptor>(&contents) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("Failed to parse paint preset '{:?}': {}", path, e);
                continue;
            }
        };
        if descriptor.id.is_empty() {
            descriptor.id = stem.to_string();
        }

        let id = descriptor.id.clone();
        match presets.insert(descriptor) {
            Ok(()) => info!("Loaded paint preset '{}' from disk", id),
            Err(e) => warn!("Rejected paint preset '{:?}': {}", path, e),
        }
    }
}

pub(super) fn init_presets(mut presets: ResMut<MaterialPresets>) {
    load_presets_from_disk(&mut presets, Path::new(paths::PAINTS_DIR));
}

/// Write user presets whose serialized form changed since the last save.
pub(super) fn auto_save_presets(
    presets: Res<MaterialPresets>,
    mut prev_state: Local<HashMap<String, String>>,
) {
    if !presets.is_changed() {
        return;
    }

    for (name, descriptor) in presets.user_presets() {
        let ron_str = ron::to_string(descriptor).unwrap_or_default();
        if prev_state.get(name) != Some(&ron_str) {
            save_preset_to_disk(Path::new(paths::PAINTS_DIR), name, descriptor);
            prev_state.insert(name.clone(), ron_str);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_tuning_game::AssetRef;

    #[test]
    fn builtin_table() {
        let presets = MaterialPresets::default();
        assert_eq!(presets.names().len(), 8);

        let blue = presets.get("Pearl_Blue").unwrap();
        assert_eq!(blue.material_type, MaterialType::PearlPaint);
        assert_eq!(blue.price, 2200.0);
        assert_eq!(blue.base_color.pearl_shift_intensity, 0.8);
        // Inherited from the pearl default
        assert_eq!(blue.clear_coat.glossiness, 0.95);

        let tinted = presets.get("Glass_Tinted").unwrap();
        assert_eq!(tinted.display_name, "20% Tinted Glass");
        assert_eq!(tinted.glass.visible_light_transmission, 20.0);

        for name in presets.names() {
            assert!(validate_material(presets.get(name).unwrap()).is_ok(), "{name}");
        }
    }

    #[test]
    fn unknown_preset_is_an_error_with_suggestion() {
        let presets = MaterialPresets::default();
        match presets.get("Perl_Blue") {
            Err(TuningError::UnknownPreset { name, suggestion }) => {
                assert_eq!(name, "Perl_Blue");
                assert_eq!(suggestion.as_deref(), Some("Pearl_Blue"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        match presets.get("zzzz") {
            Err(TuningError::UnknownPreset { suggestion, .. }) => assert!(suggestion.is_none()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn user_presets_override_builtins() {
        let mut presets = MaterialPresets::default();
        let mut custom = default_material_for(MaterialType::MetallicPaint);
        custom.id = "Ruby_Red".into();
        custom.price = 99.0;
        presets.insert(custom).unwrap();

        assert_eq!(presets.get("Ruby_Red").unwrap().price, 99.0);
        assert_eq!(presets.names().len(), 8);

        presets.remove_user("Ruby_Red");
        assert_eq!(presets.get("Ruby_Red").unwrap().price, 2000.0);
    }

    #[test]
    fn invalid_user_preset_is_rejected() {
        let mut presets = MaterialPresets::default();
        let mut bad = default_material_for(MaterialType::CarbonFiber);
        bad.id = "Bad_Weave".into();
        bad.carbon_fiber.weave_scale = 5.0;
        assert!(presets.insert(bad).is_err());
        assert!(presets.get("Bad_Weave").is_err());
    }

    #[test]
    fn type_defaults() {
        let glass = default_material_for(MaterialType::Glass);
        assert_eq!(glass.id, "Default_GlasswithCeramicTint");
        assert_eq!(glass.display_name, "Default Glass");

        let matte = default_material_for(MaterialType::MattePaint);
        assert_eq!(matte.id, "Default_MattePaint");
        assert_eq!(matte.display_name, "Default Paint");

        let carbon = default_material_for(MaterialType::CarbonFiber);
        assert_eq!(carbon.carbon_fiber.weave_angle, 45.0);
    }

    #[test]
    fn legacy_conversion() {
        let paint = PaintOption::legacy(
            "alpine_white",
            "Alpine White",
            500.0,
            AssetRef::from_path("materials/white.glb#Material0"),
        );
        let desc = convert_legacy_paint(&paint);
        assert_eq!(desc.material_type, MaterialType::SolidPaint);
        assert_eq!(desc.id, "alpine_white");
        assert_eq!(desc.price, 500.0);
        assert_eq!(desc.base_color.metallic_intensity, 0.1);
        assert_eq!(desc.clear_coat.glossiness, 0.7);
        assert_eq!(desc.base_material.path(), Some("materials/white.glb#Material0"));
    }

    #[test]
    fn compatibility() {
        assert!(is_material_type_compatible(MaterialType::PearlPaint, "exterior_body"));
        assert!(!is_material_type_compatible(MaterialType::CarbonFiber, "exterior_body"));
        assert!(is_material_type_compatible(MaterialType::CarbonFiber, "aero_parts"));
        assert!(!is_material_type_compatible(MaterialType::PearlPaint, "aero_parts"));
        assert!(is_material_type_compatible(MaterialType::Glass, "windows"));
        assert!(!is_material_type_compatible(MaterialType::Glass, "interior"));
    }

    #[test]
    fn sanitizes_filenames() {
        assert_eq!(sanitize_filename("Track/Day:Orange"), "Track_Day_Orange");
    }

    #[test]
    fn loads_presets_from_directory() {
        let dir = std::env::temp_dir().join(format!("tuning_presets_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("Track_Orange.paint.ron"),
            "(display_name: \"Track Orange\", material_type: SolidPaint, price: 900.0)",
        )
        .unwrap();
        std::fs::write(dir.join("broken.paint.ron"), "(price: ").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut presets = MaterialPresets::default();
        load_presets_from_disk(&mut presets, &dir);

        let orange = presets.get("Track_Orange").unwrap();
        assert_eq!(orange.display_name, "Track Orange");
        assert_eq!(orange.price, 900.0);
        assert_eq!(presets.names().len(), 9);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
