use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use bevy_tuning_game::{PartCategory, TuningCommand, TuningRequest};
use serde::{Deserialize, Serialize};

use super::target::TuningTarget;
use crate::constants::paths;

/// Keyboard shortcuts for tuning, persisted to the user config directory.
///
/// The n-th key of `part_options` selects part index n of `part_category`;
/// the n-th key of `paint_options` selects paint index n.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningKeyBindings {
    pub part_category: PartCategory,
    pub part_options: Vec<KeyCode>,
    pub paint_options: Vec<KeyCode>,
    pub cycle_part: Option<KeyCode>,
    pub cycle_paint: Option<KeyCode>,
}

impl Default for TuningKeyBindings {
    fn default() -> Self {
        Self {
            part_category: PartCategory::FrontBumper,
            part_options: vec![KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3],
            paint_options: vec![KeyCode::KeyQ, KeyCode::KeyW, KeyCode::KeyE],
            cycle_part: Some(KeyCode::KeyN),
            cycle_paint: Some(KeyCode::KeyM),
        }
    }
}

impl TuningKeyBindings {
    /// Commands for the keys pressed this frame, in binding order.
    pub fn commands_for(&self, keyboard: &ButtonInput<KeyCode>) -> Vec<TuningCommand> {
        let mut commands = Vec::new();

        for (index, key) in self.part_options.iter().enumerate() {
            if keyboard.just_pressed(*key) {
                commands.push(TuningCommand::SetPartByIndex {
                    category: self.part_category,
                    index,
                });
            }
        }
        for (index, key) in self.paint_options.iter().enumerate() {
            if keyboard.just_pressed(*key) {
                commands.push(TuningCommand::SetPaintByIndex { index });
            }
        }
        if self.cycle_part.is_some_and(|key| keyboard.just_pressed(key)) {
            commands.push(TuningCommand::CycleNextPart {
                category: self.part_category,
            });
        }
        if self.cycle_paint.is_some_and(|key| keyboard.just_pressed(key)) {
            commands.push(TuningCommand::CycleNextPaint);
        }

        commands
    }

    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(paths::CONFIG_DIR_NAME);
            p.push(paths::KEY_BINDINGS_FILE);
            p
        })
    }

    /// Load bindings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(content) => ron::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable key bindings {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            error!("Could not determine config directory");
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {}", e);
                return;
            }
        }

        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    error!("Failed to save key bindings: {}", e);
                } else {
                    info!("Key bindings saved to: {:?}", path);
                }
            }
            Err(e) => error!("Failed to serialize key bindings: {}", e),
        }
    }
}

/// Turn key presses into [`TuningRequest`]s for the target vehicle.
pub fn handle_tuning_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    bindings: Res<TuningKeyBindings>,
    target: Res<TuningTarget>,
    mut contexts: EguiContexts,
    mut requests: MessageWriter<TuningRequest>,
) {
    // Don't handle when UI wants keyboard input
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }

    let commands = bindings.commands_for(&keyboard);
    if commands.is_empty() {
        return;
    }

    let Some(vehicle) = target.vehicle else {
        warn!("No target vehicle set");
        return;
    };

    for command in commands {
        requests.write(TuningRequest { vehicle, command });
    }
}

/// Persist bindings whenever they are edited at runtime.
pub fn save_key_bindings(bindings: Res<TuningKeyBindings>) {
    if bindings.is_changed() && !bindings.is_added() {
        bindings.save();
    }
}
