//! `*.vehicle.ron` loader for [`VehicleConfig`].

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy_tuning_game::{PartCategory, VehicleConfig};

use crate::constants::paths;
use crate::materials::validate_material;

pub struct VehicleConfigPlugin;

impl Plugin for VehicleConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<VehicleConfig>()
            .register_asset_loader(VehicleConfigLoader);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VehicleConfigLoaderError {
    #[error("could not read vehicle config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse vehicle config: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Default, TypePath)]
pub struct VehicleConfigLoader;

impl AssetLoader for VehicleConfigLoader {
    type Asset = VehicleConfig;
    type Settings = ();
    type Error = VehicleConfigLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let config = parse_vehicle_config(&bytes)?;
        for problem in config_problems(&config) {
            warn!("{}: {}", load_context.path(), problem);
        }
        Ok(config)
    }

    fn extensions(&self) -> &[&str] {
        &[paths::VEHICLE_CONFIG_EXTENSION]
    }
}

pub fn parse_vehicle_config(bytes: &[u8]) -> Result<VehicleConfig, VehicleConfigLoaderError> {
    Ok(ron::de::from_bytes(bytes)?)
}

/// Authoring mistakes that do not prevent loading.
///
/// Invalid paints stay in the catalog and are rejected when selected;
/// out-of-range defaults are reported again at initialization.
pub fn config_problems(config: &VehicleConfig) -> Vec<String> {
    let mut problems = Vec::new();

    for paint in config.paints() {
        if let Err(e) = validate_material(&paint.advanced) {
            problems.push(format!("paint '{}' has an invalid finish: {}", paint.id, e));
        }
    }

    for category in PartCategory::ALL {
        let len = config.parts(category).len();
        let default = config.default_part(category);
        if len > 0 && default >= len {
            problems.push(format!(
                "default {} index {} is out of range ({} options)",
                category, default, len
            ));
        }
    }
    if !config.paints().is_empty() && config.default_paint >= config.paints().len() {
        problems.push(format!(
            "default paint index {} is out of range ({} options)",
            config.default_paint,
            config.paints().len()
        ));
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sample_config() {
        let bytes = std::fs::read("assets/vehicles/showroom.vehicle.ron").unwrap();
        let config = parse_vehicle_config(&bytes).unwrap();
        assert_eq!(config.parts(PartCategory::FrontBumper).len(), 3);
        assert!(config.paints().len() >= 3);
        assert!(config_problems(&config).is_empty());
    }

    #[test]
    fn reports_problems_without_failing() {
        let config = parse_vehicle_config(
            br#"(
                parts: { FrontBumper: [(id: "stock", display_name: "Stock")] },
                paints: [
                    (id: "bad", display_name: "Bad", use_legacy_material: false,
                     advanced: (material_type: CarbonFiber, carbon_fiber: (weave_angle: 120.0))),
                ],
                default_parts: { FrontBumper: 4 },
            )"#,
        )
        .unwrap();

        let problems = config_problems(&config);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("weave angle"));
        assert!(problems[1].contains("Front Bumper index 4"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(matches!(
            parse_vehicle_config(b"(parts: "),
            Err(VehicleConfigLoaderError::Ron(_))
        ));
    }
}
