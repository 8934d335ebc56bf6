//! Per-vehicle part and paint selection.
//!
//! [`VehicleTuning`] holds the selection state of one vehicle, [`VehicleTuner`]
//! applies changes to it and announces them. Keyboard shortcuts and click
//! targeting turn player input into [`TuningRequest`]s.

mod input;
mod state;
mod target;
mod tuner;

pub use input::*;
pub use state::*;
pub use target::*;
pub use tuner::*;

use bevy::prelude::*;
use bevy_tuning_game::{ModificationComplete, PaintChanged, PartChanged, TuningRequest};

pub struct VehicleTuningPlugin {
    pub auto_find_vehicle: bool,
    pub click_targeting: bool,
}

impl Default for VehicleTuningPlugin {
    fn default() -> Self {
        Self {
            auto_find_vehicle: true,
            click_targeting: true,
        }
    }
}

impl Plugin for VehicleTuningPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<TuningRequest>()
            .add_message::<PartChanged>()
            .add_message::<PaintChanged>()
            .add_message::<ModificationComplete>()
            .insert_resource(TuningTarget {
                vehicle: None,
                auto_find: self.auto_find_vehicle,
            })
            .insert_resource(TuningKeyBindings::load())
            .add_systems(
                Update,
                (
                    reload_modified_configs,
                    initialize_vehicles,
                    auto_find_target,
                    handle_tuning_keys,
                    apply_tuning_requests,
                )
                    .chain(),
            )
            .add_systems(Update, save_key_bindings);

        if self.click_targeting {
            app.add_systems(
                Update,
                handle_click_targeting
                    .after(auto_find_target)
                    .before(handle_tuning_keys),
            );
        }
    }
}
