//! Layered automotive materials.
//!
//! A [`MaterialDescriptor`] is turned into named parameters
//! ([`MaterialParameters`]) by [`apply_material_layers`], then baked onto a
//! per-mesh [`StandardMaterial`] instance. [`AutomotiveMaterialSystem`]
//! remembers the last descriptor applied to each mesh and skips repeats.

pub mod layers;
pub mod presets;
pub mod validation;

pub use layers::{apply_material_layers, MaterialParameters, ParameterTarget};
pub use presets::{
    builtin_presets, convert_legacy_paint, default_material_for, is_material_type_compatible,
    load_presets_from_disk, MaterialPresets,
};
pub use validation::validate_material;

use std::collections::HashMap;
use std::fmt::Write as _;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_tuning_game::{
    MaterialDescriptor, MaterialType, PaintOption, TuningError, UpdateMaterialParameters,
};

/// Result of a successful parameter update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The full write sequence ran.
    Applied,
    /// The mesh already shows this descriptor; nothing was written.
    Unchanged,
}

/// Change-detection cache: the last descriptor successfully applied per mesh entity.
#[derive(Resource, Default)]
pub struct AutomotiveMaterialSystem {
    cache: HashMap<Entity, MaterialDescriptor>,
}

impl AutomotiveMaterialSystem {
    /// Validate, then apply the descriptor's layers to `params` unless `target`
    /// already shows an equal descriptor and `force` is off.
    ///
    /// The cache is only written after a successful apply.
    pub fn update_parameters(
        &mut self,
        target: Entity,
        params: &mut impl ParameterTarget,
        descriptor: &MaterialDescriptor,
        force: bool,
    ) -> Result<UpdateOutcome, TuningError> {
        validate_material(descriptor)?;

        if !force && self.cache.get(&target) == Some(descriptor) {
            return Ok(UpdateOutcome::Unchanged);
        }

        apply_material_layers(params, descriptor)?;
        self.cache.insert(target, descriptor.clone());
        Ok(UpdateOutcome::Applied)
    }

    pub fn cached(&self, target: Entity) -> Option<&MaterialDescriptor> {
        self.cache.get(&target)
    }

    pub fn forget(&mut self, target: Entity) -> Option<MaterialDescriptor> {
        self.cache.remove(&target)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Marks a mesh whose `MeshMaterial3d` is its own instance.
///
/// `source` is the material the instance is rebuilt from on every apply: the
/// descriptor's base material, or whatever the mesh showed before tuning.
#[derive(Component, Debug, Clone)]
pub struct MaterialInstance {
    pub source: Option<Handle<StandardMaterial>>,
    pub instance: Handle<StandardMaterial>,
}

// ---------------------------------------------------------------------------
// ECS entry points
// ---------------------------------------------------------------------------

/// Writes descriptors and materials onto mesh entities.
#[derive(SystemParam)]
pub struct MeshMaterialWriter<'w, 's> {
    commands: Commands<'w, 's>,
    system: ResMut<'w, AutomotiveMaterialSystem>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    asset_server: Res<'w, AssetServer>,
    meshes: Query<
        'w,
        's,
        (
            Option<&'static MeshMaterial3d<StandardMaterial>>,
            Option<&'static MaterialInstance>,
        ),
        With<Mesh3d>,
    >,
}

impl MeshMaterialWriter<'_, '_> {
    /// Apply a descriptor to a mesh, giving it its own material instance first
    /// when it does not have one yet.
    pub fn update_mesh_material_parameters(
        &mut self,
        entity: Entity,
        descriptor: &MaterialDescriptor,
        force: bool,
    ) -> Result<UpdateOutcome, TuningError> {
        let (current, instance) = self
            .meshes
            .get(entity)
            .map_err(|_| TuningError::MissingMesh(entity))?;

        let mut params = MaterialParameters::default();
        if self
            .system
            .update_parameters(entity, &mut params, descriptor, force)?
            == UpdateOutcome::Unchanged
        {
            return Ok(UpdateOutcome::Unchanged);
        }

        let base = descriptor.base_material.load(&self.asset_server);
        let base_pending = base
            .as_ref()
            .is_some_and(|handle| !self.materials.contains(handle));

        let loaded = |handle: &Handle<StandardMaterial>| self.materials.contains(handle);
        let source = base
            .filter(loaded)
            .or_else(|| instance.and_then(|i| i.source.clone()).filter(loaded))
            .or_else(|| current.map(|m| m.0.clone()).filter(loaded));

        let mut material = source
            .as_ref()
            .and_then(|handle| self.materials.get(handle))
            .cloned()
            .unwrap_or_default();
        params.bake_into(&mut material);

        match instance {
            Some(existing) => {
                let handle = existing.instance.clone();
                if let Some(slot) = self.materials.get_mut(&handle) {
                    *slot = material;
                }
                self.commands.entity(entity).insert((
                    params,
                    MaterialInstance {
                        source,
                        instance: handle,
                    },
                ));
            }
            None => {
                let handle = self.materials.add(material);
                self.commands.entity(entity).insert((
                    params,
                    MeshMaterial3d(handle.clone()),
                    MaterialInstance {
                        source,
                        instance: handle,
                    },
                ));
            }
        }

        if base_pending {
            // Rebuild from the real base once it has loaded
            self.system.forget(entity);
            debug!(
                "Base material of '{}' not loaded yet, {} keeps its previous material",
                descriptor.id, entity
            );
        }

        Ok(UpdateOutcome::Applied)
    }

    /// Legacy paints swap in their ready-made material; everything else goes
    /// through the layered path with a forced update.
    pub fn apply_advanced_paint(
        &mut self,
        entity: Entity,
        paint: &PaintOption,
    ) -> Result<UpdateOutcome, TuningError> {
        if paint.use_legacy_material {
            if let Some(handle) = paint.material.load(&self.asset_server) {
                self.set_material(entity, handle)?;
                return Ok(UpdateOutcome::Applied);
            }
        }
        self.update_mesh_material_parameters(entity, &paint.advanced, true)
    }

    /// Replace a mesh's material outright. Drops any layered state.
    pub fn set_material(
        &mut self,
        entity: Entity,
        handle: Handle<StandardMaterial>,
    ) -> Result<(), TuningError> {
        if !self.meshes.contains(entity) {
            return Err(TuningError::MissingMesh(entity));
        }
        self.system.forget(entity);
        self.commands
            .entity(entity)
            .remove::<(MaterialInstance, MaterialParameters)>()
            .insert(MeshMaterial3d(handle));
        Ok(())
    }

    /// A new material asset with the descriptor's layers baked in.
    pub fn create_material_instance(
        &mut self,
        descriptor: &MaterialDescriptor,
    ) -> Result<Handle<StandardMaterial>, TuningError> {
        validate_material(descriptor)?;
        let mut params = MaterialParameters::default();
        apply_material_layers(&mut params, descriptor)?;

        let mut material = descriptor
            .base_material
            .load(&self.asset_server)
            .and_then(|handle| self.materials.get(&handle).cloned())
            .unwrap_or_default();
        params.bake_into(&mut material);
        Ok(self.materials.add(material))
    }
}

fn handle_update_material_parameters(
    mut messages: MessageReader<UpdateMaterialParameters>,
    mut writer: MeshMaterialWriter,
) {
    for msg in messages.read() {
        match writer.update_mesh_material_parameters(msg.target, &msg.descriptor, msg.force) {
            Ok(UpdateOutcome::Applied) => {
                debug!("Applied material '{}' to {}", msg.descriptor.id, msg.target);
            }
            Ok(UpdateOutcome::Unchanged) => {}
            Err(e) => warn!("Material update for {} skipped: {}", msg.target, e),
        }
    }
}

fn forget_removed_meshes(
    mut removed: RemovedComponents<MaterialParameters>,
    mut system: ResMut<AutomotiveMaterialSystem>,
) {
    for entity in removed.read() {
        system.forget(entity);
    }
}

// ---------------------------------------------------------------------------
// Debug info
// ---------------------------------------------------------------------------

/// Multi-line human readable summary of a descriptor.
pub fn material_debug_info(d: &MaterialDescriptor) -> String {
    let mut info = String::new();
    let _ = writeln!(info, "Material Type: {}", d.material_type.display_name());
    let _ = writeln!(info, "Display Name: {}", d.display_name);
    let _ = writeln!(info, "Price: ${:.2}", d.price);
    let c = d.base_color.color;
    let _ = writeln!(info, "Base Color: R={:.2}, G={:.2}, B={:.2}", c.red, c.green, c.blue);
    let _ = writeln!(info, "Metallic Intensity: {:.2}", d.base_color.metallic_intensity);
    let _ = writeln!(info, "Pearl Shift Intensity: {:.2}", d.base_color.pearl_shift_intensity);
    let _ = writeln!(info, "Clear Coat Glossiness: {:.2}", d.clear_coat.glossiness);

    match d.material_type {
        MaterialType::CarbonFiber => {
            let _ = writeln!(info, "Weave Scale: {:.2}", d.carbon_fiber.weave_scale);
            let _ = writeln!(info, "Weave Angle: {:.1} degrees", d.carbon_fiber.weave_angle);
            let _ = writeln!(info, "Carbon Fiber Gloss: {:.2}", d.carbon_fiber.gloss);
        }
        MaterialType::Glass => {
            let _ = writeln!(
                info,
                "Visible Light Transmission: {:.1}%",
                d.glass.visible_light_transmission
            );
            let _ = writeln!(info, "Fresnel Edge Darkening: {:.2}", d.glass.fresnel_edge_darkening);
        }
        _ => {}
    }

    info
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct MaterialsPlugin;

impl Plugin for MaterialsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutomotiveMaterialSystem>()
            .init_resource::<MaterialPresets>()
            .add_message::<UpdateMaterialParameters>()
            // Disk presets override built-ins
            .add_systems(PreStartup, presets::init_presets)
            .add_systems(
                Update,
                (
                    handle_update_material_parameters,
                    forget_removed_meshes,
                    presets::auto_save_presets,
                ),
            );
    }
}
