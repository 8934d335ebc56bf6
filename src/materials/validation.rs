use bevy::prelude::*;
use bevy_tuning_game::{MaterialDescriptor, ValidationError};

use crate::constants::ranges;

fn check(field: &'static str, value: f32, (min, max): (f32, f32)) -> Result<(), ValidationError> {
    ValidationError::check(field, value, min, max)
}

fn check_color(field: &'static str, color: LinearRgba) -> Result<(), ValidationError> {
    for component in [color.red, color.green, color.blue, color.alpha] {
        check(field, component, ranges::NON_NEGATIVE)?;
    }
    Ok(())
}

/// Check every numeric field of a descriptor against its documented range.
///
/// All layers are checked regardless of material type, so a descriptor that is
/// later switched to another type is still valid. Reports the first violation.
pub fn validate_material(d: &MaterialDescriptor) -> Result<(), ValidationError> {
    check("price", d.price, ranges::NON_NEGATIVE)?;

    check("primer roughness", d.primer.roughness, ranges::UNIT)?;

    check_color("base color", d.base_color.color)?;
    check("metallic intensity", d.base_color.metallic_intensity, ranges::UNIT)?;
    check("pearl shift intensity", d.base_color.pearl_shift_intensity, ranges::UNIT)?;
    check_color("pearl shift color", d.base_color.pearl_shift_color)?;

    check("clear coat glossiness", d.clear_coat.glossiness, ranges::UNIT)?;
    check("clear coat roughness", d.clear_coat.roughness, ranges::UNIT)?;
    check("refractive index", d.clear_coat.refractive_index, ranges::REFRACTIVE_INDEX)?;

    check("hydrophobic modifier", d.ceramic.hydrophobic_modifier, ranges::UNIT)?;
    check("durability factor", d.ceramic.durability_factor, ranges::UNIT)?;

    check("carbon fiber weave scale", d.carbon_fiber.weave_scale, ranges::WEAVE_SCALE)?;
    check("carbon fiber weave angle", d.carbon_fiber.weave_angle, ranges::WEAVE_ANGLE)?;
    check("resin tint intensity", d.carbon_fiber.resin_tint_intensity, ranges::UNIT)?;
    check("carbon fiber gloss", d.carbon_fiber.gloss, ranges::UNIT)?;

    check(
        "glass visible light transmission",
        d.glass.visible_light_transmission,
        ranges::VISIBLE_LIGHT_TRANSMISSION,
    )?;
    check_color("glass tint color", d.glass.tint_color)?;
    check("fresnel edge darkening", d.glass.fresnel_edge_darkening, ranges::UNIT)?;
    check("interior reflection", d.glass.interior_reflection, ranges::UNIT)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_tuning_game::MaterialType;

    #[test]
    fn defaults_are_valid() {
        for ty in MaterialType::ALL {
            assert!(validate_material(&MaterialDescriptor::new(ty)).is_ok(), "{ty:?}");
        }
    }

    #[test]
    fn rejects_glossiness_above_one() {
        let mut desc = MaterialDescriptor::new(MaterialType::MetallicPaint);
        desc.clear_coat.glossiness = 1.5;
        let err = validate_material(&desc).unwrap_err();
        assert_eq!(err.field, "clear coat glossiness");
        assert_eq!(err.value, 1.5);
    }

    #[test]
    fn rejects_weave_angle_above_ninety() {
        let mut desc = MaterialDescriptor::new(MaterialType::CarbonFiber);
        desc.carbon_fiber.weave_angle = 120.0;
        let err = validate_material(&desc).unwrap_err();
        assert_eq!(err.field, "carbon fiber weave angle");
    }

    #[test]
    fn rejects_non_finite_and_negative_values() {
        let mut desc = MaterialDescriptor::new(MaterialType::Glass);
        desc.glass.visible_light_transmission = f32::NAN;
        assert!(validate_material(&desc).is_err());

        let mut desc = MaterialDescriptor::new(MaterialType::SolidPaint);
        desc.price = -1.0;
        assert_eq!(validate_material(&desc).unwrap_err().field, "price");

        let mut desc = MaterialDescriptor::new(MaterialType::SolidPaint);
        desc.base_color.color = LinearRgba::rgb(f32::INFINITY, 0.0, 0.0);
        assert_eq!(validate_material(&desc).unwrap_err().field, "base color");
    }

    #[test]
    fn validation_does_not_mutate() {
        let mut desc = MaterialDescriptor::new(MaterialType::PearlPaint);
        desc.clear_coat.refractive_index = 2.0;
        let before = desc.clone();
        assert!(validate_material(&desc).is_err());
        assert_eq!(desc, before);
    }
}
