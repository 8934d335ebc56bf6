use std::collections::VecDeque;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use bevy_tuning_game::{
    CatalogEntry, ModificationComplete, PartCategory, TuningCommand, TuningRequest, VehicleConfig,
};

use super::theme::{colors, grid_label, section_header, value_slider};
use crate::constants::ranges;
use crate::studio::{StudioCamera, StudioLighting};
use crate::tuning::{TuningKeyBindings, TuningTarget, VehicleTuning};

const LOG_CAPACITY: usize = 8;

/// Most recent modification summaries, newest last.
#[derive(Resource, Debug, Default)]
pub struct ModificationLog {
    entries: VecDeque<String>,
}

impl ModificationLog {
    pub fn push(&mut self, details: impl Into<String>) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(details.into());
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModificationLog>()
            .add_systems(Update, record_modifications)
            .add_systems(EguiPrimaryContextPass, draw_tuning_hud);
    }
}

fn record_modifications(
    mut events: MessageReader<ModificationComplete>,
    mut log: ResMut<ModificationLog>,
) {
    for event in events.read() {
        log.push(event.details.clone());
    }
}

/// Short label for a key binding ("Digit1" -> "1", "KeyQ" -> "Q").
pub fn key_label(key: KeyCode) -> String {
    let name = format!("{:?}", key);
    name.strip_prefix("Digit")
        .or_else(|| name.strip_prefix("Key"))
        .unwrap_or(&name)
        .to_string()
}

pub fn format_price(price: f32) -> String {
    if price <= 0.0 {
        "Stock".to_string()
    } else {
        format!("${:.0}", price)
    }
}

fn option_label(entry: &impl CatalogEntry, key: Option<&KeyCode>) -> String {
    let mut label = format!("{}  {}", entry.display_name(), format_price(entry.price()));
    if let Some(key) = key {
        label = format!("[{}] {}", key_label(*key), label);
    }
    label
}

fn draw_tuning_hud(
    mut contexts: EguiContexts,
    target: Res<TuningTarget>,
    vehicles: Query<&VehicleTuning>,
    configs: Res<Assets<VehicleConfig>>,
    bindings: Res<TuningKeyBindings>,
    log: Res<ModificationLog>,
    mut lighting: ResMut<StudioLighting>,
    mut camera: ResMut<StudioCamera>,
    mut requests: MessageWriter<TuningRequest>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let mut commands = Vec::new();
    let mut edited_lighting = lighting.clone();
    let mut edited_camera = camera.clone();

    egui::Window::new("Tuning")
        .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
        .resizable(false)
        .collapsible(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            let Some(vehicle) = target.vehicle else {
                ui.colored_label(colors::STATUS_WARNING, "No vehicle targeted");
                return;
            };
            let Ok(tuning) = vehicles.get(vehicle) else {
                ui.colored_label(colors::STATUS_WARNING, "Target is not tunable");
                return;
            };
            let Some(config) = configs.get(&tuning.config) else {
                ui.colored_label(colors::TEXT_MUTED, "Loading configuration...");
                return;
            };

            for category in PartCategory::ALL {
                let parts = config.parts(category);
                if parts.is_empty() {
                    continue;
                }
                section_header(ui, category.display_name());
                let current = tuning.state.part_index(category);
                for (index, part) in parts.iter().enumerate() {
                    let key = (category == bindings.part_category)
                        .then(|| bindings.part_options.get(index))
                        .flatten();
                    if ui
                        .selectable_label(current == Some(index), option_label(part, key))
                        .clicked()
                    {
                        commands.push(TuningCommand::SetPartByIndex { category, index });
                    }
                }
            }

            if !config.paints().is_empty() {
                section_header(ui, "Paint");
                let current = tuning.state.paint_index();
                for (index, paint) in config.paints().iter().enumerate() {
                    let key = bindings.paint_options.get(index);
                    if ui
                        .selectable_label(current == Some(index), option_label(paint, key))
                        .clicked()
                    {
                        commands.push(TuningCommand::SetPaintByIndex { index });
                    }
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Total");
                ui.colored_label(
                    colors::ACCENT_GREEN,
                    format!("${:.0}", tuning.state.total_price(config)),
                );
            });

            let mut hints = Vec::new();
            if let Some(key) = bindings.cycle_part {
                hints.push(format!("{}: next {}", key_label(key), bindings.part_category));
            }
            if let Some(key) = bindings.cycle_paint {
                hints.push(format!("{}: next paint", key_label(key)));
            }
            if !hints.is_empty() {
                ui.label(
                    egui::RichText::new(hints.join("   "))
                        .small()
                        .color(colors::TEXT_MUTED),
                );
            }

            if !log.is_empty() {
                section_header(ui, "Recent");
                for entry in log.entries().rev() {
                    ui.label(egui::RichText::new(entry).small().color(colors::TEXT_SECONDARY));
                }
            }

            ui.add_space(4.0);
            egui::CollapsingHeader::new(
                egui::RichText::new("Studio").color(colors::TEXT_SECONDARY),
            )
            .default_open(false)
            .show(ui, |ui| {
                studio_controls(ui, &mut edited_lighting, &mut edited_camera);
            });
        });

    if edited_lighting != *lighting {
        *lighting = edited_lighting;
    }
    if edited_camera != *camera {
        *camera = edited_camera;
    }

    if let Some(vehicle) = target.vehicle {
        for command in commands {
            requests.write(TuningRequest { vehicle, command });
        }
    }

    Ok(())
}

fn range((min, max): (f32, f32)) -> std::ops::RangeInclusive<f32> {
    min..=max
}

fn studio_controls(ui: &mut egui::Ui, lighting: &mut StudioLighting, camera: &mut StudioCamera) {
    egui::Grid::new("studio_lighting")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            grid_label(ui, "Intensity");
            value_slider(ui, &mut lighting.intensity, range(ranges::LIGHT_INTENSITY));
            ui.end_row();

            grid_label(ui, "Temperature");
            ui.add(
                egui::DragValue::new(&mut lighting.color_temperature)
                    .speed(10.0)
                    .range(range(ranges::COLOR_TEMPERATURE))
                    .suffix(" K"),
            );
            ui.end_row();

            grid_label(ui, "Direction");
            ui.add(
                egui::DragValue::new(&mut lighting.direction)
                    .speed(1.0)
                    .range(range(ranges::LIGHT_DIRECTION))
                    .suffix("°"),
            );
            ui.end_row();

            grid_label(ui, "Ambient");
            value_slider(ui, &mut lighting.ambient_contribution, range(ranges::UNIT));
            ui.end_row();

            grid_label(ui, "HDR exposure");
            value_slider(ui, &mut lighting.hdr_exposure, range(ranges::HDR_EXPOSURE));
            ui.end_row();
        });

    ui.separator();

    egui::Grid::new("studio_camera")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            grid_label(ui, "Aperture");
            ui.add(
                egui::DragValue::new(&mut camera.aperture)
                    .speed(0.1)
                    .range(range(ranges::APERTURE))
                    .prefix("f/"),
            );
            ui.end_row();

            grid_label(ui, "ISO");
            ui.add(
                egui::DragValue::new(&mut camera.iso)
                    .speed(10.0)
                    .range(range(ranges::ISO)),
            );
            ui.end_row();

            grid_label(ui, "Shutter");
            ui.add(
                egui::DragValue::new(&mut camera.shutter_speed)
                    .speed(0.0005)
                    .range(range(ranges::SHUTTER_SPEED))
                    .suffix(" s"),
            );
            ui.end_row();

            grid_label(ui, "Focus");
            ui.add(
                egui::DragValue::new(&mut camera.focus_distance)
                    .speed(5.0)
                    .range(range(ranges::FOCUS_DISTANCE))
                    .suffix(" cm"),
            );
            ui.end_row();

            grid_label(ui, "Bokeh");
            value_slider(ui, &mut camera.bokeh_intensity, range(ranges::UNIT));
            ui.end_row();
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn key_labels_drop_prefixes() {
        assert_eq!(key_label(KeyCode::Digit1), "1");
        assert_eq!(key_label(KeyCode::KeyQ), "Q");
        assert_eq!(key_label(KeyCode::Space), "Space");
    }

    #[test]
    fn prices() {
        assert_eq!(format_price(0.0), "Stock");
        assert_eq!(format_price(1200.0), "$1200");
    }

    #[test]
    fn log_keeps_most_recent_entries() {
        let mut log = ModificationLog::default();
        for i in 0..10 {
            log.push(format!("Paint: {}", i));
        }
        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.entries().next(), Some("Paint: 2"));
        assert_eq!(log.entries().last(), Some("Paint: 9"));
    }

    #[test]
    fn modifications_are_recorded() {
        let mut world = World::new();
        world.init_resource::<ModificationLog>();
        world.init_resource::<Messages<ModificationComplete>>();
        let vehicle = world.spawn_empty().id();
        world.write_message(ModificationComplete {
            vehicle,
            details: "Front Bumper: Sport".into(),
        });

        world.run_system_once(record_modifications).unwrap();

        let log = world.resource::<ModificationLog>();
        assert_eq!(log.entries().collect::<Vec<_>>(), vec!["Front Bumper: Sport"]);
    }
}
