mod hud;
pub mod theme;

pub use hud::*;
pub use theme::{colors, ThemeApplied, ThemePlugin};

use bevy::prelude::*;

/// Egui overlay: dark theme plus the tuning HUD.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ThemePlugin).add_plugins(HudPlugin);
    }
}
