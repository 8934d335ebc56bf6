//! # Bevy Tuning Game API
//!
//! Game-facing types for the bevy_vehicle_tuning runtime.
//! This crate contains only types, messages and traits: no systems or plugins.
//!
//! Games depend on this crate to:
//! - Author vehicle catalogs (`VehicleConfig`, `PartOption`, `PaintOption`)
//! - Describe layered finishes (`MaterialDescriptor`)
//! - Send `TuningRequest` / `UpdateMaterialParameters` messages
//! - React to `PartChanged`, `PaintChanged` and `ModificationComplete`
//! - Drive any vehicle implementation through [`VehicleModifier`]

mod asset_ref;
mod catalog;
mod error;
mod material;

pub use asset_ref::*;
pub use catalog::*;
pub use error::*;
pub use material::*;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Request messages (games send these)
// ---------------------------------------------------------------------------

/// A single tuning action.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningCommand {
    SetPartById { category: PartCategory, id: String },
    SetPartByIndex { category: PartCategory, index: usize },
    CycleNextPart { category: PartCategory },
    SetPaintById { id: String },
    SetPaintByIndex { index: usize },
    CycleNextPaint,
}

/// Ask the runtime to apply a [`TuningCommand`] to a vehicle.
#[derive(Message, Debug, Clone)]
pub struct TuningRequest {
    pub vehicle: Entity,
    pub command: TuningCommand,
}

/// Push a material descriptor onto a mesh entity.
///
/// Skipped when the mesh already shows the same descriptor, unless `force` is set.
#[derive(Message, Debug, Clone)]
pub struct UpdateMaterialParameters {
    pub target: Entity,
    pub descriptor: MaterialDescriptor,
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Change notifications (runtime fires these, UI reacts)
// ---------------------------------------------------------------------------

/// Fired after a part was fitted.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct PartChanged {
    pub vehicle: Entity,
    pub category: PartCategory,
    pub id: String,
    pub display_name: String,
}

/// Fired after the paint changed.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct PaintChanged {
    pub vehicle: Entity,
    pub id: String,
    pub display_name: String,
}

/// Human readable summary of any modification, e.g. `"Front Bumper: Sport"`.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct ModificationComplete {
    pub vehicle: Entity,
    pub details: String,
}

// ---------------------------------------------------------------------------
// Vehicle interface
// ---------------------------------------------------------------------------

/// Operations every tunable vehicle implementation supports.
///
/// Mutators return `Ok(())` when the selection changed and the change was
/// announced. On `Err` nothing changed and nothing was announced.
pub trait VehicleModifier {
    fn set_part(&mut self, vehicle: Entity, category: PartCategory, id: &str) -> Result<(), TuningError>;

    fn set_paint(&mut self, vehicle: Entity, id: &str) -> Result<(), TuningError>;

    fn current_part(&self, vehicle: Entity, category: PartCategory) -> Option<PartOption>;

    fn current_paint(&self, vehicle: Entity) -> Option<PaintOption>;

    fn cycle_next_part(&mut self, vehicle: Entity, category: PartCategory) -> Result<(), TuningError>;

    fn cycle_next_paint(&mut self, vehicle: Entity) -> Result<(), TuningError>;
}
