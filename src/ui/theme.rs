use std::ops::RangeInclusive;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

/// Resource to track if theme has been applied
#[derive(Resource, Default)]
pub struct ThemeApplied(pub bool);

pub struct ThemePlugin;

impl Plugin for ThemePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ThemeApplied>()
            .add_systems(Update, apply_dark_theme);
    }
}

/// Showroom color palette
pub mod colors {
    use bevy_egui::egui::Color32;

    pub const BG_DARKEST: Color32 = Color32::from_rgb(20, 20, 22);
    pub const BG_DARK: Color32 = Color32::from_rgba_premultiplied(25, 25, 28, 235);
    pub const BG_MEDIUM: Color32 = Color32::from_rgb(40, 40, 43);
    pub const BG_LIGHT: Color32 = Color32::from_rgb(50, 50, 53);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(220, 220, 220);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 160, 160);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 120);

    pub const ACCENT_BLUE: Color32 = Color32::from_rgb(86, 156, 214);
    pub const ACCENT_GREEN: Color32 = Color32::from_rgb(78, 201, 176);
    pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(206, 145, 87);

    pub const SELECTION_BG: Color32 = Color32::from_rgb(38, 79, 120);

    pub const WIDGET_BG: Color32 = Color32::from_rgb(50, 50, 53);
    pub const WIDGET_BG_HOVER: Color32 = Color32::from_rgb(60, 60, 65);
    pub const WIDGET_BG_ACTIVE: Color32 = Color32::from_rgb(70, 70, 75);
    pub const WIDGET_BORDER: Color32 = Color32::from_rgb(70, 70, 75);

    pub const STATUS_WARNING: Color32 = Color32::from_rgb(230, 180, 80);
}

/// Uppercase section title inside a panel
pub fn section_header(ui: &mut egui::Ui, title: &str) {
    ui.add_space(4.0);
    ui.label(
        egui::RichText::new(title.to_uppercase())
            .small()
            .strong()
            .color(colors::TEXT_SECONDARY),
    );
}

/// Left-hand label of a two column grid row
pub fn grid_label(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).color(colors::TEXT_MUTED));
}

/// Drag value clamped to `range`. Returns true when the value changed.
pub fn value_slider(ui: &mut egui::Ui, value: &mut f32, range: RangeInclusive<f32>) -> bool {
    let speed = (range.end() - range.start()) / 200.0;
    ui.add(egui::DragValue::new(value).speed(speed).range(range))
        .changed()
}

fn apply_dark_theme(mut contexts: EguiContexts, mut theme_applied: ResMut<ThemeApplied>) {
    if theme_applied.0 {
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.window_margin = egui::Margin::same(8);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);

    style.visuals.window_corner_radius = egui::CornerRadius::same(6);
    style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(4);

    style.visuals.window_fill = colors::BG_DARK;
    style.visuals.window_stroke = egui::Stroke::new(1.0, colors::WIDGET_BORDER);
    style.visuals.panel_fill = colors::BG_DARK;

    style.visuals.widgets.noninteractive.bg_fill = colors::WIDGET_BG;
    style.visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, colors::TEXT_SECONDARY);
    style.visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, colors::BG_LIGHT);

    style.visuals.widgets.inactive.bg_fill = colors::WIDGET_BG;
    style.visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, colors::TEXT_PRIMARY);

    style.visuals.widgets.hovered.bg_fill = colors::WIDGET_BG_HOVER;
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, colors::ACCENT_BLUE);

    style.visuals.widgets.active.bg_fill = colors::WIDGET_BG_ACTIVE;
    style.visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, colors::ACCENT_BLUE);

    style.visuals.selection.bg_fill = colors::SELECTION_BG;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, colors::ACCENT_BLUE);

    style.visuals.extreme_bg_color = colors::BG_DARKEST;
    style.visuals.faint_bg_color = colors::BG_MEDIUM;
    style.visuals.override_text_color = Some(colors::TEXT_PRIMARY);

    ctx.set_style(style);
    theme_applied.0 = true;

    info!("Applied dark showroom theme");
}
