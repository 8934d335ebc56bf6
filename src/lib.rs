//! # Bevy Vehicle Tuning
//!
//! Swappable body parts and layered automotive paint for Bevy vehicles.
//!
//! ## Quick Start
//!
//! ```no_run
//! use avian3d::prelude::PhysicsPlugins;
//! use bevy::prelude::*;
//! use bevy_vehicle_tuning::{TuningPlugin, VehicleTuning};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, PhysicsPlugins::default()))
//!         .add_plugins(TuningPlugin::default())
//!         .add_systems(Startup, spawn_car)
//!         .run();
//! }
//!
//! fn spawn_car(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     let config = asset_server.load("vehicles/showroom.vehicle.ron");
//!     commands.spawn((
//!         Name::new("Car"),
//!         SceneRoot(asset_server.load("models/car.glb#Scene0")),
//!         VehicleTuning::new(config),
//!     ));
//! }
//! ```
//!
//! ## Controls
//!
//! - `1` `2` `3`: front bumper options
//! - `Q` `W` `E`: paint options
//! - `N` / `M`: cycle bumper / paint
//! - Left click: tune the clicked vehicle
//!
//! Bindings are stored in the user config directory and can be edited there.
//!
//! Games that only need the data types and messages should depend on
//! `bevy_tuning_game` instead.

pub mod config;
pub mod constants;
pub mod materials;
pub mod studio;
pub mod tuning;
pub mod ui;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub use bevy_tuning_game::*;

pub use config::{VehicleConfigLoader, VehicleConfigPlugin};
pub use materials::{
    apply_material_layers, material_debug_info, validate_material, AutomotiveMaterialSystem,
    MaterialParameters, MaterialPresets, MaterialsPlugin, MeshMaterialWriter, ParameterTarget,
    UpdateOutcome,
};
pub use studio::{StudioCamera, StudioCameraRig, StudioLight, StudioLighting, StudioPlugin};
pub use tuning::{TuningKeyBindings, TuningState, TuningTarget, VehicleTuner, VehicleTuning};

/// Construction options for [`TuningPlugin`].
#[derive(Debug, Clone)]
pub struct TuningPluginConfig {
    /// Retarget by clicking vehicles (needs avian3d colliders)
    pub click_targeting: bool,
    /// Show the egui tuning window
    pub hud: bool,
    /// Target the first tunable vehicle automatically
    pub auto_find_vehicle: bool,
}

impl Default for TuningPluginConfig {
    fn default() -> Self {
        Self {
            click_targeting: true,
            hud: true,
            auto_find_vehicle: true,
        }
    }
}

/// Bundles config loading, material layering, tuning, studio controls and the HUD.
///
/// Physics is not added here: add `PhysicsPlugins` yourself when
/// `click_targeting` is enabled.
#[derive(Default)]
pub struct TuningPlugin {
    pub config: TuningPluginConfig,
}

impl Plugin for TuningPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin::default());
        }

        app.add_plugins(VehicleConfigPlugin)
            .add_plugins(MaterialsPlugin)
            .add_plugins(tuning::VehicleTuningPlugin {
                auto_find_vehicle: self.config.auto_find_vehicle,
                click_targeting: self.config.click_targeting,
            })
            .add_plugins(StudioPlugin);

        if self.config.hud {
            app.add_plugins(ui::UiPlugin);
        }
    }
}
