use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Size transforms: raw metric → marker "area" value
// ---------------------------------------------------------------------------

/// Monotonic transform applied to the sizing metric before normalisation.
///
/// The exponents are tuned per metric so that small differences between
/// blades remain visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeTransform {
    Identity,
    /// `coefficient * v^exponent`
    Power { coefficient: f64, exponent: f64 },
    /// `coefficient / v^exponent`
    InversePower { coefficient: f64, exponent: f64 },
}

impl SizeTransform {
    pub fn power(exponent: f64) -> Self {
        SizeTransform::Power {
            coefficient: 1.0,
            exponent,
        }
    }

    pub fn inverse_power(exponent: f64) -> Self {
        SizeTransform::InversePower {
            coefficient: 1.0,
            exponent,
        }
    }

    pub fn apply(&self, v: f64) -> f64 {
        match *self {
            SizeTransform::Identity => v,
            SizeTransform::Power {
                coefficient,
                exponent,
            } => coefficient * v.powf(exponent),
            SizeTransform::InversePower {
                coefficient,
                exponent,
            } => coefficient / v.powf(exponent),
        }
    }
}

// ---------------------------------------------------------------------------
// Area-proportional scale: transformed value → rendered diameter in points
// ---------------------------------------------------------------------------

/// Rendered marker area is proportional to the transformed value, with the
/// reference maximum mapped to `max_px`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeScale {
    pub max_px: f32,
    pub min_px: f32,
}

impl Default for SizeScale {
    fn default() -> Self {
        Self {
            max_px: 25.0,
            min_px: 4.0,
        }
    }
}

impl SizeScale {
    /// Larger markers of the first lab sheet layouts.
    pub const LEGACY: SizeScale = SizeScale {
        max_px: 40.0,
        min_px: 4.0,
    };

    /// Largest finite, positive value, used as the normalisation reference.
    pub fn reference_max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
        values
            .into_iter()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }

    /// Diameter for `value`. Values that cannot be scaled get `min_px`.
    pub fn diameter(&self, value: f64, reference_max: f64) -> f32 {
        let valid = value.is_finite() && value > 0.0 && reference_max.is_finite() && reference_max > 0.0;
        if !valid {
            return self.min_px;
        }
        let d = self.max_px as f64 * (value / reference_max).sqrt();
        (d as f32).max(self.min_px)
    }
}
