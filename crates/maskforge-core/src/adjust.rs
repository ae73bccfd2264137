//! Adjustment parameters
//!
//! Two representations of the same 13 controls:
//!
//! - [`AdjustmentValues`] is the slider domain (mostly -100..100, gamma as a
//!   raw factor) a UI hands over and a layer stores.
//! - [`AdjustmentParams`] is the renderer domain (multipliers, EV) the
//!   adjustment pipeline consumes.

/// The 13 per-layer slider values. Zero (gamma: 1.0) means "no change".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentValues {
    pub brightness: f64,
    pub contrast: f64,
    pub gamma: f64,
    pub exposure: f64,
    pub saturation: f64,
    pub temperature: f64,
    pub tint: f64,
    pub shadows: f64,
    pub highlights: f64,
    pub clarity: f64,
    pub blur: f64,
    pub sharpen: f64,
    pub vignette: f64,
}

impl Default for AdjustmentValues {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            gamma: 1.0,
            exposure: 0.0,
            saturation: 0.0,
            temperature: 0.0,
            tint: 0.0,
            shadows: 0.0,
            highlights: 0.0,
            clarity: 0.0,
            blur: 0.0,
            sharpen: 0.0,
            vignette: 0.0,
        }
    }
}

impl AdjustmentValues {
    /// Convert slider values into renderer parameters.
    pub fn to_params(self) -> AdjustmentParams {
        AdjustmentParams {
            brightness: 1.0 + (self.brightness / 100.0) as f32,
            contrast: 1.0 + (self.contrast / 100.0) as f32,
            gamma: self.gamma as f32,
            exposure: self.exposure as f32,
            saturation: 1.0 + (self.saturation / 100.0) as f32,
            temperature: self.temperature as f32,
            tint: self.tint as f32,
            shadows: self.shadows as f32,
            highlights: self.highlights as f32,
            clarity: self.clarity as f32,
            sharpen: self.sharpen as f32,
            vignette: self.vignette as f32,
            blur: self.blur as f32,
        }
    }
}

/// Renderer-facing adjustment parameters.
///
/// Brightness/contrast/saturation are multipliers (1.0 = no change), gamma
/// is a raw factor (1.0 = no change), exposure is in EV stops, the rest are
/// -100..100 slider amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentParams {
    pub brightness: f32,
    pub contrast: f32,
    pub gamma: f32,
    pub exposure: f32,
    pub saturation: f32,
    pub temperature: f32,
    pub tint: f32,
    pub shadows: f32,
    pub highlights: f32,
    pub clarity: f32,
    pub sharpen: f32,
    pub vignette: f32,
    pub blur: f32,
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            gamma: 1.0,
            exposure: 0.0,
            saturation: 1.0,
            temperature: 0.0,
            tint: 0.0,
            shadows: 0.0,
            highlights: 0.0,
            clarity: 0.0,
            sharpen: 0.0,
            vignette: 0.0,
            blur: 0.0,
        }
    }
}

impl AdjustmentParams {
    /// True when every control is at its identity value, within the same
    /// epsilons the pipeline steps use to skip work.
    pub fn is_default(&self) -> bool {
        (self.brightness - 1.0).abs() < 0.001
            && (self.contrast - 1.0).abs() < 0.001
            && (self.gamma - 1.0).abs() < 0.01
            && self.exposure.abs() < 0.01
            && (self.saturation - 1.0).abs() < 0.001
            && self.temperature.abs() < 0.01
            && self.tint.abs() < 0.01
            && self.shadows.abs() < 0.01
            && self.highlights.abs() < 0.01
            && self.clarity.abs() < 0.01
            && self.sharpen < 0.01
            && self.vignette.abs() < 0.01
            && self.blur < 0.01
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values_map_to_default_params() {
        let params = AdjustmentValues::default().to_params();
        assert!(params.is_default());
        assert_eq!(params, AdjustmentParams::default());
    }

    #[test]
    fn test_slider_conversion() {
        let values = AdjustmentValues {
            brightness: 50.0,
            saturation: -100.0,
            ..AdjustmentValues::default()
        };
        let params = values.to_params();
        assert!((params.brightness - 1.5).abs() < 1e-6);
        assert!(params.saturation.abs() < 1e-6);
        assert!(!params.is_default());
    }

    #[test]
    fn test_is_default_sensitivity() {
        let mut params = AdjustmentParams::default();
        params.vignette = 5.0;
        assert!(!params.is_default());
    }
}
