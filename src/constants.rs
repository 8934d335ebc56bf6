//! Centralized constants for the tuning runtime
//!
//! Material parameter names, valid ranges, studio base values and file locations.

/// Named material parameters written by the layering functions.
pub mod params {
    // Base color
    pub const BASE_COLOR: &str = "BaseColor";
    pub const METALLIC_INTENSITY: &str = "MetallicIntensity";
    pub const PEARL_SHIFT_INTENSITY: &str = "PearlShiftIntensity";
    pub const PEARL_SHIFT_COLOR: &str = "PearlShiftColor";

    // Clear coat
    pub const CLEAR_COAT_GLOSSINESS: &str = "ClearCoatGlossiness";
    pub const CLEAR_COAT_ROUGHNESS: &str = "ClearCoatRoughness";
    pub const REFRACTIVE_INDEX: &str = "RefractiveIndex";

    // Ceramic coating
    pub const HYDROPHOBIC_MODIFIER: &str = "HydrophobicModifier";
    pub const DURABILITY_FACTOR: &str = "DurabilityFactor";

    // Carbon fiber
    pub const WEAVE_SCALE: &str = "WeaveScale";
    pub const WEAVE_ANGLE: &str = "WeaveAngle";
    pub const RESIN_TINT_INTENSITY: &str = "ResinTintIntensity";
    pub const CARBON_FIBER_GLOSS: &str = "CarbonFiberGloss";

    // Glass
    pub const VISIBLE_LIGHT_TRANSMISSION: &str = "VisibleLightTransmission";
    pub const GLASS_TINT_COLOR: &str = "GlassTintColor";
    pub const FRESNEL_EDGE_DARKENING: &str = "FresnelEdgeDarkening";
    pub const INTERIOR_REFLECTION: &str = "InteriorReflection";
}

/// Inclusive valid ranges as `(min, max)`.
pub mod ranges {
    pub const UNIT: (f32, f32) = (0.0, 1.0);
    /// Prices and color components only need to be finite and non-negative
    pub const NON_NEGATIVE: (f32, f32) = (0.0, f32::MAX);
    pub const REFRACTIVE_INDEX: (f32, f32) = (1.3, 1.6);
    pub const WEAVE_SCALE: (f32, f32) = (0.1, 2.0);
    pub const WEAVE_ANGLE: (f32, f32) = (0.0, 90.0);
    pub const VISIBLE_LIGHT_TRANSMISSION: (f32, f32) = (0.0, 100.0);

    // Studio lighting
    pub const LIGHT_INTENSITY: (f32, f32) = (0.1, 3.0);
    pub const COLOR_TEMPERATURE: (f32, f32) = (2700.0, 6500.0);
    pub const LIGHT_DIRECTION: (f32, f32) = (0.0, 360.0);
    pub const HDR_EXPOSURE: (f32, f32) = (0.1, 4.0);

    // Studio camera
    pub const APERTURE: (f32, f32) = (1.4, 22.0);
    pub const ISO: (f32, f32) = (100.0, 3200.0);
    pub const SHUTTER_SPEED: (f32, f32) = (1.0 / 4000.0, 1.0 / 30.0);
    /// Centimeters
    pub const FOCUS_DISTANCE: (f32, f32) = (50.0, 2000.0);
}

/// Studio defaults
pub mod studio {
    /// Illuminance of a studio light at intensity 1.0
    pub const BASE_ILLUMINANCE: f32 = 10000.0;
    /// Ambient brightness at full ambient contribution
    pub const BASE_AMBIENT_BRIGHTNESS: f32 = 600.0;
    /// Height of the studio light above the turntable, in degrees
    pub const LIGHT_ELEVATION_DEG: f32 = 50.0;
    /// Full-frame sensor height in meters
    pub const SENSOR_HEIGHT: f32 = 0.024;
}

/// File locations
pub mod paths {
    pub const PAINTS_DIR: &str = "assets/paints";
    pub const PAINT_PRESET_EXTENSION: &str = ".paint.ron";
    pub const VEHICLE_CONFIG_EXTENSION: &str = "vehicle.ron";
    pub const CONFIG_DIR_NAME: &str = "bevy_vehicle_tuning";
    pub const KEY_BINDINGS_FILE: &str = "keybindings.ron";
}

/// Physics-related constants
pub mod physics {
    /// Max distance of the click-to-target ray
    pub const TARGET_RAY_DISTANCE: f32 = 200.0;
}
