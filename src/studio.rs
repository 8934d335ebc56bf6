//! Showroom-wide lighting and camera controls.

use bevy::camera::Exposure;
use bevy::light::GlobalAmbientLight;
use bevy::post_process::dof::{DepthOfField, DepthOfFieldMode};
use bevy::prelude::*;
use bevy_tuning_game::ValidationError;
use serde::{Deserialize, Serialize};

use crate::constants::{ranges, studio};

/// Marker for directional lights driven by [`StudioLighting`]
#[derive(Component, Default)]
pub struct StudioLight;

/// Marker for cameras driven by [`StudioCamera`]
#[derive(Component, Default)]
pub struct StudioCameraRig;

fn check(field: &'static str, value: f32, (min, max): (f32, f32)) -> Result<(), ValidationError> {
    ValidationError::check(field, value, min, max)
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioLighting {
    /// Multiplier on the base illuminance, 0.1..=3
    pub intensity: f32,
    /// Kelvin, 2700..=6500
    pub color_temperature: f32,
    /// Light yaw around the turntable in degrees, 0..=360
    pub direction: f32,
    /// 0..=1
    pub ambient_contribution: f32,
    /// 0.1..=4
    pub hdr_exposure: f32,
}

impl Default for StudioLighting {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            color_temperature: 5600.0,
            direction: 45.0,
            ambient_contribution: 0.3,
            hdr_exposure: 1.0,
        }
    }
}

impl StudioLighting {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("light intensity", self.intensity, ranges::LIGHT_INTENSITY)?;
        check("color temperature", self.color_temperature, ranges::COLOR_TEMPERATURE)?;
        check("light direction", self.direction, ranges::LIGHT_DIRECTION)?;
        check("ambient contribution", self.ambient_contribution, ranges::UNIT)?;
        check("HDR exposure", self.hdr_exposure, ranges::HDR_EXPOSURE)
    }

    pub fn light_color(&self) -> Color {
        kelvin_to_color(self.color_temperature)
    }

    pub fn light_rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.direction.to_radians(),
            -studio::LIGHT_ELEVATION_DEG.to_radians(),
            0.0,
        )
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioCamera {
    /// f-stops, 1.4..=22
    pub aperture: f32,
    pub iso: f32,
    /// Seconds
    pub shutter_speed: f32,
    /// Centimeters
    pub focus_distance: f32,
    /// 0 disables depth of field
    pub bokeh_intensity: f32,
}

impl Default for StudioCamera {
    fn default() -> Self {
        Self {
            aperture: 8.0,
            iso: 400.0,
            shutter_speed: 0.01,
            focus_distance: 500.0,
            bokeh_intensity: 0.5,
        }
    }
}

impl StudioCamera {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("aperture", self.aperture, ranges::APERTURE)?;
        check("ISO", self.iso, ranges::ISO)?;
        check("shutter speed", self.shutter_speed, ranges::SHUTTER_SPEED)?;
        check("focus distance", self.focus_distance, ranges::FOCUS_DISTANCE)?;
        check("bokeh intensity", self.bokeh_intensity, ranges::UNIT)
    }

    /// EV100 of the physical camera settings, brightened by `hdr_exposure`.
    pub fn ev100(&self, hdr_exposure: f32) -> f32 {
        (self.aperture * self.aperture / self.shutter_speed).log2()
            - (self.iso / 100.0).log2()
            - hdr_exposure.log2()
    }
}

/// Approximate color of a black body at the given temperature.
pub fn kelvin_to_color(kelvin: f32) -> Color {
    let t = kelvin / 100.0;

    let r = if t <= 66.0 {
        255.0
    } else {
        329.698_73 * (t - 60.0).powf(-0.133_204_76)
    };
    let g = if t <= 66.0 {
        99.470_8 * t.ln() - 161.119_57
    } else {
        288.122_16 * (t - 60.0).powf(-0.075_514_846)
    };
    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_73 * (t - 10.0).ln() - 305.044_8
    };

    Color::srgb(
        (r / 255.0).clamp(0.0, 1.0),
        (g / 255.0).clamp(0.0, 1.0),
        (b / 255.0).clamp(0.0, 1.0),
    )
}

fn apply_studio_lighting(
    lighting: Res<StudioLighting>,
    mut lights: Query<(&mut DirectionalLight, &mut Transform), With<StudioLight>>,
    added: Query<(), Added<StudioLight>>,
    mut ambient: ResMut<GlobalAmbientLight>,
) {
    if !lighting.is_changed() && added.is_empty() {
        return;
    }
    if let Err(e) = lighting.validate() {
        warn!("Studio lighting not applied: {}", e);
        return;
    }

    let color = lighting.light_color();
    for (mut light, mut transform) in &mut lights {
        light.color = color;
        light.illuminance = studio::BASE_ILLUMINANCE * lighting.intensity;
        transform.rotation = lighting.light_rotation();
    }

    ambient.color = color;
    ambient.brightness = studio::BASE_AMBIENT_BRIGHTNESS * lighting.ambient_contribution;
}

fn apply_studio_camera(
    camera_settings: Res<StudioCamera>,
    lighting: Res<StudioLighting>,
    cameras: Query<Entity, With<StudioCameraRig>>,
    added: Query<(), Added<StudioCameraRig>>,
    mut commands: Commands,
) {
    if !camera_settings.is_changed() && !lighting.is_changed() && added.is_empty() {
        return;
    }
    if let Err(e) = camera_settings.validate() {
        warn!("Studio camera not applied: {}", e);
        return;
    }

    let ev100 = camera_settings.ev100(lighting.hdr_exposure.clamp(
        ranges::HDR_EXPOSURE.0,
        ranges::HDR_EXPOSURE.1,
    ));

    for entity in &cameras {
        let mut entity_cmds = commands.entity(entity);
        entity_cmds.insert(Exposure { ev100 });

        if camera_settings.bokeh_intensity > 0.0 {
            entity_cmds.insert(DepthOfField {
                mode: DepthOfFieldMode::Bokeh,
                focal_distance: camera_settings.focus_distance / 100.0,
                aperture_f_stops: camera_settings.aperture,
                sensor_height: studio::SENSOR_HEIGHT,
                max_circle_of_confusion_diameter: 64.0 * camera_settings.bokeh_intensity,
                ..default()
            });
        } else {
            entity_cmds.remove::<DepthOfField>();
        }
    }
}

pub struct StudioPlugin;

impl Plugin for StudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StudioLighting>()
            .init_resource::<StudioCamera>()
            .init_resource::<GlobalAmbientLight>()
            .add_systems(Update, (apply_studio_lighting, apply_studio_camera));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(StudioLighting::default().validate().is_ok());
        assert!(StudioCamera::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let lighting = StudioLighting {
            color_temperature: 9000.0,
            ..default()
        };
        assert_eq!(lighting.validate().unwrap_err().field, "color temperature");

        let camera = StudioCamera {
            shutter_speed: 0.5,
            ..default()
        };
        assert_eq!(camera.validate().unwrap_err().field, "shutter speed");
    }

    #[test]
    fn lights_spawned_later_pick_up_current_settings() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StudioPlugin));
        app.world_mut().resource_mut::<StudioLighting>().intensity = 2.0;
        app.update();

        let light = app
            .world_mut()
            .spawn((DirectionalLight::default(), Transform::default(), StudioLight))
            .id();
        app.update();

        let lighting = app.world().resource::<StudioLighting>().clone();
        let directional = app.world().get::<DirectionalLight>(light).unwrap();
        assert_eq!(directional.illuminance, studio::BASE_ILLUMINANCE * 2.0);
        assert_eq!(directional.color, lighting.light_color());
        assert_eq!(
            app.world().get::<Transform>(light).unwrap().rotation,
            lighting.light_rotation()
        );
    }

    #[test]
    fn warm_light_is_red_shifted() {
        let warm = kelvin_to_color(2700.0).to_srgba();
        let cool = kelvin_to_color(6500.0).to_srgba();
        assert_eq!(warm.red, 1.0);
        assert!(warm.blue < 0.6);
        assert!(cool.blue > warm.blue);
    }

    #[test]
    fn ev100_follows_exposure_triangle() {
        let camera = StudioCamera {
            aperture: 8.0,
            iso: 100.0,
            shutter_speed: 1.0 / 64.0,
            ..default()
        };
        // log2(64 * 64) = 12
        assert!((camera.ev100(1.0) - 12.0).abs() < 1e-4);
        // Doubling ISO or HDR exposure each brightens by one stop
        let faster_film = StudioCamera { iso: 200.0, ..camera.clone() };
        assert!((faster_film.ev100(1.0) - 11.0).abs() < 1e-4);
        assert!((camera.ev100(2.0) - 11.0).abs() < 1e-4);
    }
}
