use std::collections::HashMap;

use bevy::color::Mix;
use bevy::math::Affine2;
use bevy::prelude::*;
use bevy_tuning_game::{MaterialDescriptor, MaterialType, TuningError};

use crate::constants::params;

/// Anything that accepts named material parameters.
pub trait ParameterTarget {
    fn set_scalar(&mut self, name: &'static str, value: f32);
    fn set_vector(&mut self, name: &'static str, value: LinearRgba);
}

/// Per-mesh set of named parameters, the layered state of one material instance.
///
/// Baked onto the mesh's own [`StandardMaterial`] with [`MaterialParameters::bake_into`].
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct MaterialParameters {
    scalars: HashMap<&'static str, f32>,
    vectors: HashMap<&'static str, LinearRgba>,
    writes: usize,
}

impl MaterialParameters {
    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.scalars.get(name).copied()
    }

    pub fn vector(&self, name: &str) -> Option<LinearRgba> {
        self.vectors.get(name).copied()
    }

    /// Total number of parameter writes this set has received.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.vectors.is_empty()
    }

    /// Map the named parameters onto PBR fields. Parameters that are not set
    /// leave the corresponding field untouched.
    pub fn bake_into(&self, material: &mut StandardMaterial) {
        if let Some(color) = self.vector(params::BASE_COLOR) {
            material.base_color = color.into();
        }
        if let Some(metallic) = self.scalar(params::METALLIC_INTENSITY) {
            material.metallic = metallic;
        }
        if let (Some(intensity), Some(shift)) = (
            self.scalar(params::PEARL_SHIFT_INTENSITY),
            self.vector(params::PEARL_SHIFT_COLOR),
        ) {
            material.specular_tint = LinearRgba::WHITE.mix(&shift, intensity).into();
        }

        // The clear coat is the visible top surface
        if let Some(gloss) = self.scalar(params::CLEAR_COAT_GLOSSINESS) {
            material.clearcoat = gloss;
            material.perceptual_roughness = 1.0 - gloss;
        }
        if let Some(roughness) = self.scalar(params::CLEAR_COAT_ROUGHNESS) {
            material.clearcoat_perceptual_roughness = roughness;
        }
        if let Some(ior) = self.scalar(params::REFRACTIVE_INDEX) {
            material.ior = ior;
        }

        // Carbon fiber: weave drives the UV transform of the weave texture
        if let Some(scale) = self.scalar(params::WEAVE_SCALE) {
            let angle = self.scalar(params::WEAVE_ANGLE).unwrap_or(0.0);
            material.uv_transform =
                Affine2::from_scale_angle_translation(Vec2::splat(scale), angle.to_radians(), Vec2::ZERO);
        }
        if let Some(gloss) = self.scalar(params::CARBON_FIBER_GLOSS) {
            material.perceptual_roughness = 1.0 - gloss;
        }

        // Glass
        if let Some(vlt) = self.scalar(params::VISIBLE_LIGHT_TRANSMISSION) {
            material.specular_transmission = vlt / 100.0;
        }
        if let Some(tint) = self.vector(params::GLASS_TINT_COLOR) {
            material.attenuation_color = tint.into();
        }
        if let Some(reflection) = self.scalar(params::INTERIOR_REFLECTION) {
            material.reflectance = reflection;
        }
    }
}

impl ParameterTarget for MaterialParameters {
    fn set_scalar(&mut self, name: &'static str, value: f32) {
        self.scalars.insert(name, value);
        self.writes += 1;
    }

    fn set_vector(&mut self, name: &'static str, value: LinearRgba) {
        self.vectors.insert(name, value);
        self.writes += 1;
    }
}

// ---------------------------------------------------------------------------
// Layer application
// ---------------------------------------------------------------------------

/// Write the parameter layers that apply to the descriptor's material type.
///
/// Returns [`TuningError::UnknownMaterialType`] without writing anything when
/// the type is not recognized.
pub fn apply_material_layers(
    target: &mut impl ParameterTarget,
    descriptor: &MaterialDescriptor,
) -> Result<(), TuningError> {
    match descriptor.material_type {
        MaterialType::MetallicPaint
        | MaterialType::PearlPaint
        | MaterialType::FrozenPaint
        | MaterialType::SolidPaint
        | MaterialType::MattePaint => {
            apply_base_color_layer(target, descriptor);
            apply_clear_coat_layer(target, descriptor);
            if descriptor.ceramic.enabled {
                apply_ceramic_coating_layer(target, descriptor);
            }
        }
        MaterialType::CarbonFiber => apply_carbon_fiber_parameters(target, descriptor),
        MaterialType::Glass => apply_glass_parameters(target, descriptor),
        MaterialType::Unknown => return Err(TuningError::UnknownMaterialType),
    }
    Ok(())
}

fn apply_base_color_layer(target: &mut impl ParameterTarget, d: &MaterialDescriptor) {
    target.set_vector(params::BASE_COLOR, d.base_color.color);
    target.set_scalar(params::METALLIC_INTENSITY, d.base_color.metallic_intensity);
    target.set_scalar(params::PEARL_SHIFT_INTENSITY, d.base_color.pearl_shift_intensity);
    target.set_vector(params::PEARL_SHIFT_COLOR, d.base_color.pearl_shift_color);
}

fn apply_clear_coat_layer(target: &mut impl ParameterTarget, d: &MaterialDescriptor) {
    target.set_scalar(params::CLEAR_COAT_GLOSSINESS, d.clear_coat.glossiness);
    target.set_scalar(params::CLEAR_COAT_ROUGHNESS, d.clear_coat.roughness);
    target.set_scalar(params::REFRACTIVE_INDEX, d.clear_coat.refractive_index);
}

fn apply_ceramic_coating_layer(target: &mut impl ParameterTarget, d: &MaterialDescriptor) {
    target.set_scalar(params::HYDROPHOBIC_MODIFIER, d.ceramic.hydrophobic_modifier);
    target.set_scalar(params::DURABILITY_FACTOR, d.ceramic.durability_factor);
}

fn apply_carbon_fiber_parameters(target: &mut impl ParameterTarget, d: &MaterialDescriptor) {
    target.set_scalar(params::WEAVE_SCALE, d.carbon_fiber.weave_scale);
    target.set_scalar(params::WEAVE_ANGLE, d.carbon_fiber.weave_angle);
    target.set_scalar(params::RESIN_TINT_INTENSITY, d.carbon_fiber.resin_tint_intensity);
    target.set_scalar(params::CARBON_FIBER_GLOSS, d.carbon_fiber.gloss);
}

fn apply_glass_parameters(target: &mut impl ParameterTarget, d: &MaterialDescriptor) {
    target.set_scalar(params::VISIBLE_LIGHT_TRANSMISSION, d.glass.visible_light_transmission);
    target.set_vector(params::GLASS_TINT_COLOR, d.glass.tint_color);
    target.set_scalar(params::FRESNEL_EDGE_DARKENING, d.glass.fresnel_edge_darkening);
    target.set_scalar(params::INTERIOR_REFLECTION, d.glass.interior_reflection);
}
