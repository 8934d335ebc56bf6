//! Showroom binary: two procedural cars on a turntable floor.
//!
//! For using the tuning runtime in your own game, add `TuningPlugin` and put a
//! `VehicleTuning` component on your vehicle entities.

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_vehicle_tuning::{
    AssetRef, MaterialPresets, PaintOption, PartCategory, PartOption, StudioCameraRig,
    StudioLight, TuningPlugin, VehicleConfig, VehicleTuning,
};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Vehicle Tuning Showroom".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(TuningPlugin::default())
        .add_systems(Startup, (setup_showroom, spawn_cars))
        .run();
}

fn setup_showroom(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Name::new("Floor"),
        Mesh3d(meshes.add(Cylinder::new(8.0, 0.1))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.18, 0.18, 0.2),
            perceptual_roughness: 0.6,
            ..default()
        })),
        Transform::from_xyz(0.0, -0.05, 0.0),
        RigidBody::Static,
        Collider::cylinder(8.0, 0.1),
    ));

    commands.spawn((
        Name::new("Key Light"),
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::default(),
        StudioLight,
    ));

    commands.spawn((
        Name::new("Showroom Camera"),
        Camera3d::default(),
        Transform::from_xyz(6.0, 3.0, 8.0).looking_at(Vec3::new(0.0, 0.6, 0.0), Vec3::Y),
        StudioCameraRig,
    ));
}

/// Bumper variants built from primitives so the showroom needs no model files.
fn bumper_options(meshes: &mut Assets<Mesh>) -> Vec<PartOption> {
    let stock = meshes.add(Cuboid::new(1.9, 0.35, 0.2));
    let sport = meshes.add(Cuboid::new(2.0, 0.3, 0.35));
    let aero = meshes.add(Cuboid::new(2.1, 0.2, 0.6));

    vec![
        PartOption::new("stock", "Stock", 0.0)
            .with_mesh(AssetRef::from_handle(stock))
            .with_tag("Front_Bumper"),
        PartOption::new("sport", "Sport", 1200.0)
            .with_mesh(AssetRef::from_handle(sport))
            .with_tag("Front_Bumper"),
        PartOption::new("aero", "Aero Lip", 2600.0)
            .with_mesh(AssetRef::from_handle(aero))
            .with_tag("Front_Bumper"),
    ]
}

fn spoiler_options(meshes: &mut Assets<Mesh>) -> Vec<PartOption> {
    let wing = meshes.add(Cuboid::new(1.7, 0.05, 0.35));
    vec![
        PartOption::new("none", "None", 0.0),
        PartOption::new("wing", "GT Wing", 1800.0).with_mesh(AssetRef::from_handle(wing)),
    ]
}

fn paint_options(
    presets: &MaterialPresets,
    materials: &mut Assets<StandardMaterial>,
) -> Vec<PaintOption> {
    let mut paints = vec![PaintOption::legacy(
        "alpine_white",
        "Alpine White",
        0.0,
        AssetRef::from_handle(materials.add(StandardMaterial {
            base_color: Color::srgb(0.92, 0.92, 0.9),
            perceptual_roughness: 0.3,
            ..default()
        })),
    )];

    for name in ["Ruby_Red", "Pearl_Blue", "Metallic_Black", "Frozen_White", "Carbon_Gloss"] {
        match presets.get(name) {
            Ok(descriptor) => paints.push(PaintOption::advanced(descriptor.clone())),
            Err(e) => warn!("Skipping showroom paint: {}", e),
        }
    }
    paints
}

fn spawn_cars(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut configs: ResMut<Assets<VehicleConfig>>,
    presets: Res<MaterialPresets>,
) {
    let mut config = VehicleConfig::default()
        .with_parts(PartCategory::FrontBumper, bumper_options(&mut meshes))
        .with_parts(PartCategory::Spoiler, spoiler_options(&mut meshes))
        .with_paints(paint_options(&presets, &mut materials));
    config.default_paint = 1;
    let config = configs.add(config);

    let body = meshes.add(Cuboid::new(1.8, 0.6, 4.2));
    let cabin = meshes.add(Cuboid::new(1.5, 0.5, 2.0));
    let glass = materials.add(StandardMaterial {
        base_color: Color::srgba(0.1, 0.12, 0.15, 0.6),
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    for (name, x) in [("Coupe", -1.4), ("Coupe (Track)", 1.4)] {
        commands
            .spawn((
                Name::new(name),
                Mesh3d(body.clone()),
                MeshMaterial3d(materials.add(StandardMaterial::default())),
                Transform::from_xyz(x, 0.5, 0.0).with_scale(Vec3::splat(0.6)),
                RigidBody::Static,
                Collider::cuboid(1.8, 0.6, 4.2),
                VehicleTuning::new(config.clone())
                    .with_socket(
                        PartCategory::FrontBumper,
                        Transform::from_xyz(0.0, -0.15, 2.15),
                    )
                    .with_socket(PartCategory::Spoiler, Transform::from_xyz(0.0, 0.45, -1.9)),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Name::new("Cabin"),
                    Mesh3d(cabin.clone()),
                    MeshMaterial3d(glass.clone()),
                    Transform::from_xyz(0.0, 0.55, -0.2),
                ));
            });
    }

    info!("Showroom ready: 1-3 bumpers, Q/W/E paint, N/M cycle, click a car to target it");
}
