use avian3d::prelude::*;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use super::state::VehicleTuning;
use crate::constants::physics;

/// The vehicle that keyboard tuning applies to.
#[derive(Resource, Debug, Clone, Default)]
pub struct TuningTarget {
    pub vehicle: Option<Entity>,
    /// Pick the first tunable vehicle when no target is set
    pub auto_find: bool,
}

/// Drop a despawned target and, with `auto_find`, pick the first vehicle.
pub fn auto_find_target(
    mut target: ResMut<TuningTarget>,
    vehicles: Query<Entity, With<VehicleTuning>>,
) {
    if let Some(vehicle) = target.vehicle {
        if vehicles.contains(vehicle) {
            return;
        }
        target.vehicle = None;
    }

    if !target.auto_find {
        return;
    }

    if let Some(vehicle) = vehicles.iter().next() {
        target.vehicle = Some(vehicle);
        info!("Auto-found target vehicle: {}", vehicle);
    }
}

/// Retarget by clicking a vehicle (or any of its parts).
pub fn handle_click_targeting(
    mouse_button: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    spatial_query: SpatialQuery,
    vehicles: Query<Entity, With<VehicleTuning>>,
    parent_query: Query<&ChildOf>,
    mut target: ResMut<TuningTarget>,
    mut contexts: EguiContexts,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }

    // Don't retarget if clicking on UI
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_pointer_input() || ctx.is_pointer_over_area() {
            return;
        }
    }

    let Ok(window) = window_query.single() else {
        return;
    };
    let Some(cursor_position) = window.cursor_position() else {
        return;
    };
    let Some((camera, camera_transform)) = camera_query.iter().find(|(c, _)| c.is_active) else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor_position) else {
        return;
    };

    let Some(hit) = spatial_query.cast_ray(
        ray.origin,
        ray.direction,
        physics::TARGET_RAY_DISTANCE,
        true,
        &SpatialQueryFilter::default(),
    ) else {
        return;
    };

    if let Some(vehicle) = find_vehicle_root(hit.entity, &vehicles, &parent_query) {
        if target.vehicle != Some(vehicle) {
            target.vehicle = Some(vehicle);
            info!("Tuning target set to {}", vehicle);
        }
    }
}

/// Walk up the parent hierarchy to the entity carrying [`VehicleTuning`].
fn find_vehicle_root(
    entity: Entity,
    vehicles: &Query<Entity, With<VehicleTuning>>,
    parent_query: &Query<&ChildOf>,
) -> Option<Entity> {
    if vehicles.contains(entity) {
        return Some(entity);
    }

    parent_query
        .get(entity)
        .ok()
        .and_then(|child_of| find_vehicle_root(child_of.parent(), vehicles, parent_query))
}
