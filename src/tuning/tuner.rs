use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_tuning_game::{
    ModificationComplete, PaintChanged, PaintOption, PartCategory, PartChanged, PartOption, Slot,
    TuningCommand, TuningError, TuningRequest, VehicleConfig, VehicleModifier,
};

use super::state::{TuningState, VehicleTuning};
use crate::materials::{validate_material, MeshMaterialWriter};

/// Drives tunable vehicles: selection, visuals and change notifications.
#[derive(SystemParam)]
pub struct VehicleTuner<'w, 's> {
    commands: Commands<'w, 's>,
    vehicles: Query<'w, 's, (Entity, &'static mut VehicleTuning)>,
    configs: Res<'w, Assets<VehicleConfig>>,
    asset_server: Res<'w, AssetServer>,
    materials: MeshMaterialWriter<'w, 's>,
    part_changed: MessageWriter<'w, PartChanged>,
    paint_changed: MessageWriter<'w, PaintChanged>,
    modification_complete: MessageWriter<'w, ModificationComplete>,
}

impl VehicleTuner<'_, '_> {
    pub fn set_part_by_index(
        &mut self,
        vehicle: Entity,
        category: PartCategory,
        index: usize,
    ) -> Result<(), TuningError> {
        self.change_part(vehicle, category, |state, config| {
            state.select_part(config, category, index).map(|_| ())
        })
    }

    pub fn set_paint_by_index(&mut self, vehicle: Entity, index: usize) -> Result<(), TuningError> {
        self.change_paint(vehicle, |state, config| state.select_paint(config, index).map(|_| ()))
    }

    /// Run one [`TuningCommand`] against a vehicle.
    pub fn execute(&mut self, vehicle: Entity, command: &TuningCommand) -> Result<(), TuningError> {
        match command {
            TuningCommand::SetPartById { category, id } => self.set_part(vehicle, *category, id),
            TuningCommand::SetPartByIndex { category, index } => {
                self.set_part_by_index(vehicle, *category, *index)
            }
            TuningCommand::CycleNextPart { category } => self.cycle_next_part(vehicle, *category),
            TuningCommand::SetPaintById { id } => self.set_paint(vehicle, id),
            TuningCommand::SetPaintByIndex { index } => self.set_paint_by_index(vehicle, *index),
            TuningCommand::CycleNextPaint => self.cycle_next_paint(vehicle),
        }
    }

    /// Apply config defaults to every vehicle whose config has finished loading.
    pub fn initialize_pending(&mut self) {
        let mut pending = Vec::new();
        for (entity, tuning) in &self.vehicles {
            if tuning.initialized {
                continue;
            }
            let Some(config) = self.configs.get(&tuning.config) else {
                continue;
            };
            let parts: Vec<(PartCategory, usize)> = PartCategory::ALL
                .into_iter()
                .filter(|&category| !config.parts(category).is_empty())
                .map(|category| (category, config.default_part(category)))
                .collect();
            let paint = (!config.paints().is_empty()).then_some(config.default_paint);
            pending.push((entity, parts, paint));
        }

        for (vehicle, parts, paint) in pending {
            if let Ok((_, mut tuning)) = self.vehicles.get_mut(vehicle) {
                tuning.initialized = true;
            }
            for (category, index) in parts {
                if let Err(e) = self.set_part_by_index(vehicle, category, index) {
                    warn!("Invalid default {} for {}: {}", category, vehicle, e);
                }
            }
            if let Some(index) = paint {
                if let Err(e) = self.set_paint_by_index(vehicle, index) {
                    warn!("Invalid default paint for {}: {}", vehicle, e);
                }
            }
            info!("Vehicle {} initialized", vehicle);
        }
    }

    // -- Parts ---------------------------------------------------------------

    fn change_part(
        &mut self,
        vehicle: Entity,
        category: PartCategory,
        select: impl FnOnce(&mut TuningState, &VehicleConfig) -> Result<(), TuningError>,
    ) -> Result<(), TuningError> {
        let (part, index, attachment) = {
            let (_, mut tuning) = self
                .vehicles
                .get_mut(vehicle)
                .map_err(|_| TuningError::MissingVehicle(vehicle))?;
            let config = self
                .configs
                .get(&tuning.config)
                .ok_or(TuningError::MissingConfiguration)?;

            select(&mut tuning.state, config)?;
            let index = tuning
                .state
                .part_index(category)
                .ok_or(TuningError::EmptyCatalog {
                    slot: Slot::Part(category),
                })?;
            let part = config.parts(category)[index].clone();

            // Game code may have despawned the attachment
            let attachment = match tuning.attachments.get(&category).copied() {
                Some(entity) if self.commands.get_entity(entity).is_ok() => entity,
                _ => {
                    let socket = tuning.sockets.get(&category).copied().unwrap_or_default();
                    let entity = self
                        .commands
                        .spawn((
                            Name::new(category.attachment_name()),
                            socket,
                            Visibility::default(),
                            ChildOf(vehicle),
                        ))
                        .id();
                    tuning.attachments.insert(category, entity);
                    entity
                }
            };
            (part, index, attachment)
        };

        self.fit_part(attachment, &part);

        info!("{} changed to: {} (Option {})", category, part.display_name, index + 1);
        self.part_changed.write(PartChanged {
            vehicle,
            category,
            id: part.id.clone(),
            display_name: part.display_name.clone(),
        });
        self.modification_complete.write(ModificationComplete {
            vehicle,
            details: format!("{}: {}", category, part.display_name),
        });
        Ok(())
    }

    /// Swap the attachment's mesh and materials, play the fitting sound.
    fn fit_part(&mut self, attachment: Entity, part: &PartOption) {
        let mesh = part.mesh.load(&self.asset_server);
        let material = part
            .material_overrides
            .first()
            .and_then(|m| m.load(&self.asset_server))
            .unwrap_or_default();
        if part.material_overrides.len() > 1 {
            debug!(
                "Part '{}' has {} material overrides, only the first is used",
                part.id,
                part.material_overrides.len()
            );
        }

        let mut entity = self.commands.entity(attachment);
        match mesh {
            Some(mesh) => {
                entity.insert((Mesh3d(mesh), MeshMaterial3d(material), Visibility::Visible));
            }
            None => {
                // Parts without a mesh (e.g. "no spoiler") just hide the slot
                entity.remove::<Mesh3d>().insert(Visibility::Hidden);
            }
        }

        if let Some(sound) = part.sound.load(&self.asset_server) {
            self.commands
                .spawn((AudioPlayer::new(sound), PlaybackSettings::DESPAWN));
        }
    }

    // -- Paint ---------------------------------------------------------------

    fn change_paint(
        &mut self,
        vehicle: Entity,
        select: impl FnOnce(&mut TuningState, &VehicleConfig) -> Result<(), TuningError>,
    ) -> Result<(), TuningError> {
        let (paint, targets) = {
            let (_, mut tuning) = self
                .vehicles
                .get_mut(vehicle)
                .map_err(|_| TuningError::MissingVehicle(vehicle))?;
            let config = self
                .configs
                .get(&tuning.config)
                .ok_or(TuningError::MissingConfiguration)?;

            // Select on a copy so an invalid descriptor leaves the vehicle untouched
            let mut candidate = tuning.state.clone();
            select(&mut candidate, config)?;
            let paint = candidate
                .current_paint(config)
                .cloned()
                .ok_or(TuningError::EmptyCatalog { slot: Slot::Paint })?;
            if !paint.use_legacy_material || paint.material.is_null() {
                validate_material(&paint.advanced)?;
            }

            tuning.state = candidate;
            (paint, tuning.paint_targets_for(vehicle))
        };

        for target in targets {
            if let Err(e) = self.materials.apply_advanced_paint(target, &paint) {
                warn!("Paint '{}' not applied to {}: {}", paint.id, target, e);
            }
        }

        info!("Paint changed to: {}", paint.display_name);
        self.paint_changed.write(PaintChanged {
            vehicle,
            id: paint.id.clone(),
            display_name: paint.display_name.clone(),
        });
        self.modification_complete.write(ModificationComplete {
            vehicle,
            details: format!("Paint: {}", paint.display_name),
        });
        Ok(())
    }
}

impl VehicleModifier for VehicleTuner<'_, '_> {
    fn set_part(&mut self, vehicle: Entity, category: PartCategory, id: &str) -> Result<(), TuningError> {
        self.change_part(vehicle, category, |state, config| {
            state.select_part_by_id(config, category, id).map(|_| ())
        })
    }

    fn set_paint(&mut self, vehicle: Entity, id: &str) -> Result<(), TuningError> {
        self.change_paint(vehicle, |state, config| state.select_paint_by_id(config, id).map(|_| ()))
    }

    fn current_part(&self, vehicle: Entity, category: PartCategory) -> Option<PartOption> {
        let (_, tuning) = self.vehicles.get(vehicle).ok()?;
        let config = self.configs.get(&tuning.config)?;
        tuning.state.current_part(config, category).cloned()
    }

    fn current_paint(&self, vehicle: Entity) -> Option<PaintOption> {
        let (_, tuning) = self.vehicles.get(vehicle).ok()?;
        let config = self.configs.get(&tuning.config)?;
        tuning.state.current_paint(config).cloned()
    }

    fn cycle_next_part(&mut self, vehicle: Entity, category: PartCategory) -> Result<(), TuningError> {
        self.change_part(vehicle, category, |state, config| {
            state.cycle_part(config, category).map(|_| ())
        })
    }

    fn cycle_next_paint(&mut self, vehicle: Entity) -> Result<(), TuningError> {
        self.change_paint(vehicle, |state, config| state.cycle_paint(config).map(|_| ()))
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

pub fn initialize_vehicles(mut tuner: VehicleTuner) {
    tuner.initialize_pending();
}

/// Re-initialize vehicles whose config asset changed on disk, so stored
/// indices never outlive the catalog they point into.
pub fn reload_modified_configs(
    mut events: MessageReader<AssetEvent<VehicleConfig>>,
    mut vehicles: Query<(Entity, &mut VehicleTuning)>,
    mut commands: Commands,
) {
    for event in events.read() {
        let AssetEvent::Modified { id } = event else {
            continue;
        };
        for (entity, mut tuning) in &mut vehicles {
            if tuning.config.id() == *id {
                tuning.state.reset();
                // Initialization respawns attachments for the non-empty categories
                for (_, attachment) in tuning.attachments.drain() {
                    commands.entity(attachment).try_despawn();
                }
                tuning.initialized = false;
                info!("Vehicle config reloaded, re-initializing {}", entity);
            }
        }
    }
}

pub fn apply_tuning_requests(
    mut requests: MessageReader<TuningRequest>,
    mut tuner: VehicleTuner,
) {
    for request in requests.read() {
        if let Err(e) = tuner.execute(request.vehicle, &request.command) {
            warn!("Tuning {:?} on {} failed: {}", request.command, request.vehicle, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{AutomotiveMaterialSystem, MaterialPresets};
    use bevy::ecs::system::RunSystemOnce;
    use bevy_tuning_game::AssetRef;

    const FRONT: PartCategory = PartCategory::FrontBumper;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            AssetPlugin {
                watch_for_changes_override: Some(false),
                ..default()
            },
        ))
        .init_asset::<StandardMaterial>()
        .init_asset::<VehicleConfig>()
        .init_resource::<AutomotiveMaterialSystem>()
        .add_message::<PartChanged>()
        .add_message::<PaintChanged>()
        .add_message::<ModificationComplete>();
        app
    }

    fn spawn_vehicle(app: &mut App) -> Entity {
        let presets = MaterialPresets::default();
        let mut config = VehicleConfig::default()
            .with_parts(
                FRONT,
                vec![
                    PartOption::new("stock", "Stock", 0.0),
                    PartOption::new("sport", "Sport", 1200.0),
                    PartOption::new("aero", "Aero", 2600.0),
                ],
            )
            .with_paints(vec![
                PaintOption::legacy("white", "Alpine White", 0.0, AssetRef::null()),
                PaintOption::advanced(presets.get("Ruby_Red").unwrap().clone()),
            ]);
        config.default_paint = 1;

        let handle = app.world_mut().resource_mut::<Assets<VehicleConfig>>().add(config);
        app.world_mut()
            .spawn((VehicleTuning::new(handle), Mesh3d(Handle::default())))
            .id()
    }

    fn part_names(app: &mut App) -> Vec<String> {
        app.world_mut()
            .run_system_once(|mut reader: MessageReader<PartChanged>| {
                reader.read().map(|m| m.display_name.clone()).collect::<Vec<_>>()
            })
            .unwrap()
    }

    #[test]
    fn initialization_applies_defaults() {
        let mut app = test_app();
        let vehicle = spawn_vehicle(&mut app);
        app.world_mut().run_system_once(initialize_vehicles).unwrap();

        let tuning = app.world().get::<VehicleTuning>(vehicle).unwrap();
        assert!(tuning.initialized);
        assert_eq!(tuning.state.part_index(FRONT), Some(0));
        assert_eq!(tuning.state.paint_index(), Some(1));
        assert_eq!(tuning.state.part_index(PartCategory::Spoiler), None);

        let attachment = tuning.attachments[&FRONT];
        assert_eq!(app.world().get::<ChildOf>(attachment).unwrap().parent(), vehicle);
        assert_eq!(
            app.world().get::<Name>(attachment).unwrap().as_str(),
            "FrontBumper"
        );

        // The body got its own ruby red instance
        let material = app
            .world()
            .get::<MeshMaterial3d<StandardMaterial>>(vehicle)
            .unwrap()
            .0
            .clone();
        let metallic = app
            .world()
            .resource::<Assets<StandardMaterial>>()
            .get(&material)
            .unwrap()
            .metallic;
        assert_eq!(metallic, 0.9);
    }

    #[test]
    fn cycling_through_tuner_notifies() {
        let mut app = test_app();
        let vehicle = spawn_vehicle(&mut app);
        app.world_mut().run_system_once(initialize_vehicles).unwrap();

        let current = app
            .world_mut()
            .run_system_once(move |mut tuner: VehicleTuner| {
                tuner.cycle_next_part(vehicle, FRONT)?;
                tuner.cycle_next_part(vehicle, FRONT)?;
                Ok::<_, TuningError>(tuner.current_part(vehicle, FRONT))
            })
            .unwrap()
            .unwrap();
        assert_eq!(current.unwrap().display_name, "Aero");
        assert_eq!(part_names(&mut app), vec!["Stock", "Sport", "Aero"]);

        let details = app
            .world_mut()
            .run_system_once(|mut reader: MessageReader<ModificationComplete>| {
                reader.read().map(|m| m.details.clone()).collect::<Vec<_>>()
            })
            .unwrap();
        assert!(details.contains(&"Front Bumper: Sport".to_string()));
        assert!(details.contains(&"Front Bumper: Aero".to_string()));
    }

    #[test]
    fn failed_change_does_not_notify() {
        let mut app = test_app();
        let vehicle = spawn_vehicle(&mut app);
        app.world_mut().run_system_once(initialize_vehicles).unwrap();

        let results = app
            .world_mut()
            .run_system_once(move |mut tuner: VehicleTuner| {
                (
                    tuner.set_part(vehicle, FRONT, "widebody"),
                    tuner.cycle_next_part(vehicle, PartCategory::Wheels),
                    tuner.set_paint_by_index(vehicle, 9),
                )
            })
            .unwrap();
        assert!(matches!(results.0, Err(TuningError::UnknownId { .. })));
        assert!(matches!(results.1, Err(TuningError::EmptyCatalog { .. })));
        assert!(matches!(results.2, Err(TuningError::IndexOutOfRange { .. })));

        // Only the initialization change was announced
        assert_eq!(part_names(&mut app), vec!["Stock"]);
        let tuning = app.world().get::<VehicleTuning>(vehicle).unwrap();
        assert_eq!(tuning.state.part_index(FRONT), Some(0));
        assert_eq!(tuning.state.paint_index(), Some(1));
    }

    #[test]
    fn despawned_attachment_is_respawned() {
        let mut app = test_app();
        let vehicle = spawn_vehicle(&mut app);
        app.world_mut().run_system_once(initialize_vehicles).unwrap();

        let old = app.world().get::<VehicleTuning>(vehicle).unwrap().attachments[&FRONT];
        app.world_mut().despawn(old);

        app.world_mut()
            .run_system_once(move |mut tuner: VehicleTuner| tuner.cycle_next_part(vehicle, FRONT))
            .unwrap()
            .unwrap();

        let attachment = app.world().get::<VehicleTuning>(vehicle).unwrap().attachments[&FRONT];
        assert_ne!(attachment, old);
        assert_eq!(app.world().get::<ChildOf>(attachment).unwrap().parent(), vehicle);
        assert_eq!(
            app.world().get::<Name>(attachment).unwrap().as_str(),
            "FrontBumper"
        );
    }

    #[test]
    fn modified_config_resets_and_reinitializes() {
        let mut app = test_app();
        let vehicle = spawn_vehicle(&mut app);
        let handle = app.world().get::<VehicleTuning>(vehicle).unwrap().config.clone();
        app.world_mut()
            .resource_mut::<Assets<VehicleConfig>>()
            .get_mut(&handle)
            .unwrap()
            .parts
            .insert(
                PartCategory::Spoiler,
                vec![PartOption::new("none", "None", 0.0), PartOption::new("wing", "GT Wing", 1800.0)],
            );
        app.world_mut().run_system_once(initialize_vehicles).unwrap();
        app.world_mut()
            .run_system_once(move |mut tuner: VehicleTuner| {
                tuner.cycle_next_part(vehicle, FRONT)?;
                tuner.cycle_next_part(vehicle, FRONT)
            })
            .unwrap()
            .unwrap();

        let tuning = app.world().get::<VehicleTuning>(vehicle).unwrap();
        assert_eq!(tuning.state.part_index(FRONT), Some(2));
        let spoiler = tuning.attachments[&PartCategory::Spoiler];

        // Shrink the bumpers, drop the spoilers, keep one paint
        {
            let mut configs = app.world_mut().resource_mut::<Assets<VehicleConfig>>();
            let config = configs.get_mut(&handle).unwrap();
            config.parts.insert(FRONT, vec![PartOption::new("stock", "Stock", 0.0)]);
            config.parts.remove(&PartCategory::Spoiler);
            config.paints.truncate(1);
            config.default_paint = 0;
        }
        app.world_mut()
            .write_message(AssetEvent::<VehicleConfig>::Modified { id: handle.id() });

        app.world_mut().run_system_once(reload_modified_configs).unwrap();
        let tuning = app.world().get::<VehicleTuning>(vehicle).unwrap();
        assert!(!tuning.initialized);
        assert_eq!(tuning.state, TuningState::default());
        assert!(tuning.attachments.is_empty());
        assert!(app.world().get_entity(spoiler).is_err());

        app.world_mut().run_system_once(initialize_vehicles).unwrap();
        let tuning = app.world().get::<VehicleTuning>(vehicle).unwrap();
        assert!(tuning.initialized);
        assert_eq!(tuning.state.part_index(FRONT), Some(0));
        assert_eq!(tuning.state.part_index(PartCategory::Spoiler), None);
        assert_eq!(tuning.state.paint_index(), Some(0));
        assert_eq!(tuning.attachments.len(), 1);
    }

    #[test]
    fn missing_vehicle_and_config() {
        let mut app = test_app();
        let not_a_vehicle = app.world_mut().spawn_empty().id();
        let unloaded = app
            .world_mut()
            .spawn(VehicleTuning::new(Handle::default()))
            .id();

        let results = app
            .world_mut()
            .run_system_once(move |mut tuner: VehicleTuner| {
                (
                    tuner.cycle_next_paint(not_a_vehicle),
                    tuner.cycle_next_paint(unloaded),
                )
            })
            .unwrap();
        assert_eq!(results.0, Err(TuningError::MissingVehicle(not_a_vehicle)));
        assert_eq!(results.1, Err(TuningError::MissingConfiguration));
    }
}
