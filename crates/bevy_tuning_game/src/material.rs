use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::AssetRef;

/// Classification of an automotive finish. Selects which parameter layers get applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    #[default]
    MetallicPaint,
    PearlPaint,
    FrozenPaint,
    CarbonFiber,
    Glass,
    SolidPaint,
    MattePaint,
    /// Any tag this build does not recognize. Nothing is applied for it.
    #[serde(other)]
    Unknown,
}

impl MaterialType {
    pub const ALL: [MaterialType; 7] = [
        MaterialType::MetallicPaint,
        MaterialType::PearlPaint,
        MaterialType::FrozenPaint,
        MaterialType::CarbonFiber,
        MaterialType::Glass,
        MaterialType::SolidPaint,
        MaterialType::MattePaint,
    ];

    /// Paint-family finishes share the base color / clear coat stack.
    pub fn is_paint(self) -> bool {
        matches!(
            self,
            MaterialType::MetallicPaint
                | MaterialType::PearlPaint
                | MaterialType::FrozenPaint
                | MaterialType::SolidPaint
                | MaterialType::MattePaint
        )
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MaterialType::MetallicPaint => "Metallic Paint",
            MaterialType::PearlPaint => "Pearl Paint",
            MaterialType::FrozenPaint => "Frozen Paint",
            MaterialType::CarbonFiber => "Carbon Fiber",
            MaterialType::Glass => "Glass with Ceramic Tint",
            MaterialType::SolidPaint => "Solid Paint",
            MaterialType::MattePaint => "Matte Paint",
            MaterialType::Unknown => "Unknown Material",
        }
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// Layer 1. Validated and stored with the finish, but not written to the
/// material: the clear coat defines the visible surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimerLayer {
    /// 0..=1
    pub roughness: f32,
}

impl Default for PrimerLayer {
    fn default() -> Self {
        Self { roughness: 0.8 }
    }
}

/// Layer 2: pigment and flake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseColorLayer {
    pub color: LinearRgba,
    /// Metallic flake amount, 0..=1
    pub metallic_intensity: f32,
    /// Strength of the angle-dependent color shift, 0..=1
    pub pearl_shift_intensity: f32,
    /// Color seen at grazing angles
    pub pearl_shift_color: LinearRgba,
}

impl Default for BaseColorLayer {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            metallic_intensity: 0.5,
            pearl_shift_intensity: 0.0,
            pearl_shift_color: LinearRgba::rgb(0.75, 0.75, 0.75),
        }
    }
}

/// Layer 3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearCoatLayer {
    /// 0..=1
    pub glossiness: f32,
    /// 0..=1
    pub roughness: f32,
    /// Physically plausible IOR, 1.3..=1.6
    pub refractive_index: f32,
}

impl Default for ClearCoatLayer {
    fn default() -> Self {
        Self {
            glossiness: 0.9,
            roughness: 0.1,
            refractive_index: 1.5,
        }
    }
}

/// Layer 4, optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CeramicCoatingLayer {
    pub enabled: bool,
    /// 0..=1
    pub hydrophobic_modifier: f32,
    /// 0..=1
    pub durability_factor: f32,
}

impl Default for CeramicCoatingLayer {
    fn default() -> Self {
        Self {
            enabled: false,
            hydrophobic_modifier: 0.7,
            durability_factor: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonFiberLayer {
    /// 0.1..=2.0
    pub weave_scale: f32,
    /// Weave direction in degrees, 0..=90
    pub weave_angle: f32,
    /// 0..=1
    pub resin_tint_intensity: f32,
    /// 0 = matte, 1 = gloss
    pub gloss: f32,
}

impl Default for CarbonFiberLayer {
    fn default() -> Self {
        Self {
            weave_scale: 1.0,
            weave_angle: 0.0,
            resin_tint_intensity: 0.3,
            gloss: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlassLayer {
    /// Visible light transmission in percent, 0..=100
    pub visible_light_transmission: f32,
    pub tint_color: LinearRgba,
    /// 0..=1
    pub fresnel_edge_darkening: f32,
    /// 0..=1
    pub interior_reflection: f32,
}

impl Default for GlassLayer {
    fn default() -> Self {
        Self {
            visible_light_transmission: 70.0,
            tint_color: LinearRgba::WHITE,
            fresnel_edge_darkening: 0.3,
            interior_reflection: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Full description of an automotive finish.
///
/// Which layers matter depends on [`MaterialType`]: paint finishes use base
/// color, clear coat and (optionally) ceramic coating; carbon fiber and glass
/// use their own layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDescriptor {
    pub id: String,
    pub display_name: String,
    pub price: f32,
    pub material_type: MaterialType,
    /// Template the per-mesh material instance is derived from.
    pub base_material: AssetRef<StandardMaterial>,
    pub primer: PrimerLayer,
    pub base_color: BaseColorLayer,
    pub clear_coat: ClearCoatLayer,
    pub ceramic: CeramicCoatingLayer,
    pub carbon_fiber: CarbonFiberLayer,
    pub glass: GlassLayer,
}

impl MaterialDescriptor {
    pub fn new(material_type: MaterialType) -> Self {
        Self {
            material_type,
            ..default()
        }
    }
}
