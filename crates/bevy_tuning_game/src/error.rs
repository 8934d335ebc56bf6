use bevy::prelude::Entity;

use crate::Slot;

/// Why a tuning operation did not change anything.
///
/// None of these are fatal: the vehicle simply keeps its previous look.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TuningError {
    #[error("no vehicle configuration is loaded")]
    MissingConfiguration,

    #[error("entity {0} is not a tunable vehicle")]
    MissingVehicle(Entity),

    #[error("entity {0} is not a mesh")]
    MissingMesh(Entity),

    #[error("invalid {slot} index {index} ({len} options)")]
    IndexOutOfRange { slot: Slot, index: usize, len: usize },

    #[error("{slot} id '{id}' not found")]
    UnknownId { slot: Slot, id: String },

    #[error("no {slot} options to cycle through")]
    EmptyCatalog { slot: Slot },

    #[error(transparent)]
    InvalidMaterial(#[from] ValidationError),

    #[error("unknown material type, no parameters applied")]
    UnknownMaterialType,

    #[error("unknown material preset '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownPreset {
        name: String,
        suggestion: Option<String>,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

/// A material or studio parameter outside its documented range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {field}: {value} (expected {min}..={max})")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl ValidationError {
    /// Check `value` against an inclusive range. NaN always fails.
    pub fn check(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), Self> {
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(Self {
                field,
                value,
                min,
                max,
            })
        }
    }
}
