use std::collections::HashMap;

use bevy::prelude::*;
use bevy_tuning_game::{
    find_entry, CatalogEntry, PaintOption, PartCategory, PartOption, Slot, TuningError,
    VehicleConfig,
};

/// Current selection of one vehicle: an index per part category plus the paint.
///
/// Every stored index is valid for the config it was selected against. A
/// category with an empty catalog never has a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TuningState {
    parts: HashMap<PartCategory, usize>,
    paint: Option<usize>,
}

/// Validate `index` against `entries` and return the entry.
fn entry_at<T>(entries: &[T], slot: Slot, index: usize) -> Result<&T, TuningError> {
    entries.get(index).ok_or(TuningError::IndexOutOfRange {
        slot,
        index,
        len: entries.len(),
    })
}

fn index_of<T: CatalogEntry>(entries: &[T], slot: Slot, id: &str) -> Result<usize, TuningError> {
    find_entry(entries, id).ok_or_else(|| TuningError::UnknownId {
        slot,
        id: id.to_string(),
    })
}

fn next_index(current: Option<usize>, len: usize, slot: Slot) -> Result<usize, TuningError> {
    if len == 0 {
        return Err(TuningError::EmptyCatalog { slot });
    }
    Ok(current.map_or(0, |i| (i + 1) % len))
}

impl TuningState {
    pub fn part_index(&self, category: PartCategory) -> Option<usize> {
        self.parts.get(&category).copied()
    }

    pub fn paint_index(&self) -> Option<usize> {
        self.paint
    }

    pub fn reset(&mut self) {
        self.parts.clear();
        self.paint = None;
    }

    // -- Parts ---------------------------------------------------------------

    pub fn select_part<'c>(
        &mut self,
        config: &'c VehicleConfig,
        category: PartCategory,
        index: usize,
    ) -> Result<&'c PartOption, TuningError> {
        let part = entry_at(config.parts(category), Slot::Part(category), index)?;
        self.parts.insert(category, index);
        Ok(part)
    }

    pub fn select_part_by_id<'c>(
        &mut self,
        config: &'c VehicleConfig,
        category: PartCategory,
        id: &str,
    ) -> Result<&'c PartOption, TuningError> {
        let index = index_of(config.parts(category), Slot::Part(category), id)?;
        self.select_part(config, category, index)
    }

    /// Advance to the next part, wrapping to the first. From no selection, selects index 0.
    pub fn cycle_part<'c>(
        &mut self,
        config: &'c VehicleConfig,
        category: PartCategory,
    ) -> Result<&'c PartOption, TuningError> {
        let len = config.parts(category).len();
        let index = next_index(self.part_index(category), len, Slot::Part(category))?;
        self.select_part(config, category, index)
    }

    pub fn current_part<'c>(
        &self,
        config: &'c VehicleConfig,
        category: PartCategory,
    ) -> Option<&'c PartOption> {
        self.part_index(category)
            .and_then(|i| config.parts(category).get(i))
    }

    // -- Paint ---------------------------------------------------------------

    pub fn select_paint<'c>(
        &mut self,
        config: &'c VehicleConfig,
        index: usize,
    ) -> Result<&'c PaintOption, TuningError> {
        let paint = entry_at(config.paints(), Slot::Paint, index)?;
        self.paint = Some(index);
        Ok(paint)
    }

    pub fn select_paint_by_id<'c>(
        &mut self,
        config: &'c VehicleConfig,
        id: &str,
    ) -> Result<&'c PaintOption, TuningError> {
        let index = index_of(config.paints(), Slot::Paint, id)?;
        self.select_paint(config, index)
    }

    pub fn cycle_paint<'c>(&mut self, config: &'c VehicleConfig) -> Result<&'c PaintOption, TuningError> {
        let index = next_index(self.paint, config.paints().len(), Slot::Paint)?;
        self.select_paint(config, index)
    }

    pub fn current_paint<'c>(&self, config: &'c VehicleConfig) -> Option<&'c PaintOption> {
        self.paint.and_then(|i| config.paints().get(i))
    }

    /// Sum of the prices of everything currently selected.
    pub fn total_price(&self, config: &VehicleConfig) -> f32 {
        let parts: f32 = PartCategory::ALL
            .iter()
            .filter_map(|&category| self.current_part(config, category))
            .map(|part| part.price)
            .sum();
        parts + self.current_paint(config).map_or(0.0, |paint| paint.price)
    }
}

/// A tunable vehicle.
///
/// Part meshes are spawned as children named after their category. Paint goes
/// onto `paint_targets`, or onto the vehicle entity itself when that is empty.
#[derive(Component, Debug, Clone)]
pub struct VehicleTuning {
    pub config: Handle<VehicleConfig>,
    pub state: TuningState,
    /// Spawned attachment entity per category
    pub attachments: HashMap<PartCategory, Entity>,
    pub paint_targets: Vec<Entity>,
    /// Local transform of each category's attachment
    pub sockets: HashMap<PartCategory, Transform>,
    /// Set once the defaults from the config have been applied
    pub initialized: bool,
}

impl VehicleTuning {
    pub fn new(config: Handle<VehicleConfig>) -> Self {
        Self {
            config,
            state: TuningState::default(),
            attachments: HashMap::new(),
            paint_targets: Vec::new(),
            sockets: HashMap::new(),
            initialized: false,
        }
    }

    pub fn with_paint_target(mut self, entity: Entity) -> Self {
        self.paint_targets.push(entity);
        self
    }

    pub fn with_socket(mut self, category: PartCategory, transform: Transform) -> Self {
        self.sockets.insert(category, transform);
        self
    }

    /// Entities that receive the paint, given the vehicle entity itself.
    pub fn paint_targets_for(&self, vehicle: Entity) -> Vec<Entity> {
        if self.paint_targets.is_empty() {
            vec![vehicle]
        } else {
            self.paint_targets.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_tuning_game::{AssetRef, MaterialDescriptor};

    const FRONT: PartCategory = PartCategory::FrontBumper;

    fn config() -> VehicleConfig {
        VehicleConfig::default()
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
                PaintOption::advanced(MaterialDescriptor {
                    id: "Pearl_Blue".into(),
                    display_name: "Pearl Blue".into(),
                    price: 2200.0,
                    ..default()
                }),
            ])
    }

    #[test]
    fn set_by_index_then_get_returns_entry() {
        let config = config();
        let mut state = TuningState::default();
        for i in 0..3 {
            let selected = state.select_part(&config, FRONT, i).unwrap().id.clone();
            assert_eq!(state.current_part(&config, FRONT).unwrap().id, selected);
            assert_eq!(selected, config.parts(FRONT)[i].id);
        }
        for i in 0..2 {
            state.select_paint(&config, i).unwrap();
            assert_eq!(state.current_paint(&config), config.paints().get(i));
        }
    }

    #[test]
    fn cycle_walks_and_wraps() {
        let config = config();
        let mut state = TuningState::default();
        state.select_part(&config, FRONT, 0).unwrap();

        assert_eq!(state.cycle_part(&config, FRONT).unwrap().display_name, "Sport");
        assert_eq!(state.cycle_part(&config, FRONT).unwrap().display_name, "Aero");
        assert_eq!(state.part_index(FRONT), Some(2));
        assert_eq!(state.cycle_part(&config, FRONT).unwrap().display_name, "Stock");
        assert_eq!(state.part_index(FRONT), Some(0));
    }

    #[test]
    fn cycle_from_no_selection_starts_at_first() {
        let config = config();
        let mut state = TuningState::default();
        assert_eq!(state.cycle_paint(&config).unwrap().id, "white");
        assert_eq!(state.cycle_paint(&config).unwrap().id, "Pearl_Blue");
        assert_eq!(state.cycle_paint(&config).unwrap().id, "white");
    }

    #[test]
    fn cycle_on_empty_catalog_fails_without_change() {
        let config = config();
        let mut state = TuningState::default();
        state.select_part(&config, FRONT, 1).unwrap();
        let before = state.clone();

        assert_eq!(
            state.cycle_part(&config, PartCategory::Spoiler),
            Err(TuningError::EmptyCatalog {
                slot: Slot::Part(PartCategory::Spoiler)
            })
        );
        assert_eq!(state, before);

        let empty = VehicleConfig::default();
        assert!(state.cycle_paint(&empty).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_id_leaves_state_unchanged() {
        let config = config();
        let mut state = TuningState::default();
        state.select_part(&config, FRONT, 2).unwrap();
        let before = state.clone();

        assert!(matches!(
            state.select_part_by_id(&config, FRONT, "widebody"),
            Err(TuningError::UnknownId { .. })
        ));
        assert!(state.select_paint_by_id(&config, "Chartreuse").is_err());
        assert_eq!(state, before);

        assert_eq!(state.select_part_by_id(&config, FRONT, "sport").unwrap().price, 1200.0);
        assert_eq!(state.part_index(FRONT), Some(1));
    }

    #[test]
    fn out_of_range_index_leaves_state_unchanged() {
        let config = config();
        let mut state = TuningState::default();
        assert_eq!(
            state.select_part(&config, FRONT, 3),
            Err(TuningError::IndexOutOfRange {
                slot: Slot::Part(FRONT),
                index: 3,
                len: 3
            })
        );
        assert_eq!(state.part_index(FRONT), None);
        assert!(state.select_paint(&config, 7).is_err());
        assert_eq!(state.paint_index(), None);
    }

    #[test]
    fn categories_do_not_interact() {
        let config = config().with_parts(
            PartCategory::RearBumper,
            vec![PartOption::new("rear_stock", "Stock", 0.0), PartOption::new("diffuser", "Diffuser", 900.0)],
        );
        let mut state = TuningState::default();
        state.select_part(&config, FRONT, 2).unwrap();
        state.cycle_part(&config, PartCategory::RearBumper).unwrap();
        state.cycle_part(&config, PartCategory::RearBumper).unwrap();

        assert_eq!(state.part_index(FRONT), Some(2));
        assert_eq!(state.part_index(PartCategory::RearBumper), Some(1));
    }

    #[test]
    fn total_price_sums_selection() {
        let config = config();
        let mut state = TuningState::default();
        assert_eq!(state.total_price(&config), 0.0);
        state.select_part(&config, FRONT, 1).unwrap();
        state.select_paint(&config, 1).unwrap();
        assert_eq!(state.total_price(&config), 3400.0);
    }
}
