use serde::{Deserialize, Serialize};

use crate::error::{DogboneError, Result};

/// How the relief hole is placed in the corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DogboneType {
    /// Centered on the corner bisector.
    #[default]
    Normal,
    /// Bisector placement pushed out by `minimal_percent` for a tighter fit.
    Minimal,
    /// Pushed off one wall only, chosen by `long_side`.
    Mortise,
}

/// Tool and corner-acceptance settings for one relief pass.
///
/// Lengths are in model units, angles in radians. Missing keys in a stored
/// file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolParameters {
    /// Nominal cutter diameter.
    pub tool_diameter: f64,
    /// Added to the diameter to give the effective cutting diameter.
    pub diameter_offset: f64,
    pub dogbone_type: DogboneType,
    /// Slack applied in `Minimal` mode, in percent of the tool radius.
    pub minimal_percent: f64,
    /// Run each cut up to the body's top face instead of the edge end.
    pub from_top: bool,
    /// In `Mortise` mode, bias the hole toward the longer corner edge.
    pub long_side: bool,
    /// Exclusive lower bound on accepted corner angles.
    pub min_angle_limit: f64,
    /// Exclusive upper bound on accepted corner angles.
    pub max_angle_limit: f64,
}

impl Default for ToolParameters {
    fn default() -> Self {
        Self {
            tool_diameter: 0.25,
            diameter_offset: 0.0,
            dogbone_type: DogboneType::Normal,
            minimal_percent: 10.0,
            from_top: false,
            long_side: true,
            min_angle_limit: 1.0_f64.to_radians(),
            max_angle_limit: 179.0_f64.to_radians(),
        }
    }
}

impl ToolParameters {
    /// Centered dogbones with the given cutter.
    pub fn normal(tool_diameter: f64) -> Self {
        Self {
            tool_diameter,
            ..Self::default()
        }
    }

    /// Minimal dogbones with `percent` slack.
    pub fn minimal(tool_diameter: f64, percent: f64) -> Self {
        Self {
            tool_diameter,
            dogbone_type: DogboneType::Minimal,
            minimal_percent: percent,
            ..Self::default()
        }
    }

    /// Mortise dogbones biased to the long or short side.
    pub fn mortise(tool_diameter: f64, long_side: bool) -> Self {
        Self {
            tool_diameter,
            dogbone_type: DogboneType::Mortise,
            long_side,
            ..Self::default()
        }
    }

    pub fn cutting_diameter(&self) -> f64 {
        self.tool_diameter + self.diameter_offset
    }

    pub fn tool_radius(&self) -> f64 {
        self.cutting_diameter() / 2.0
    }

    /// Multiplicative slack: `1 + percent/100` in `Minimal` mode, else 1.
    pub fn min_percent(&self) -> f64 {
        match self.dogbone_type {
            DogboneType::Minimal => 1.0 + self.minimal_percent / 100.0,
            DogboneType::Normal | DogboneType::Mortise => 1.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let diameter = self.cutting_diameter();
        if !(diameter.is_finite() && diameter > 0.0) {
            return Err(DogboneError::InvalidParameter {
                parameter: "cutting diameter",
                value: diameter,
            });
        }
        if !(self.minimal_percent.is_finite() && self.minimal_percent >= 0.0) {
            return Err(DogboneError::InvalidParameter {
                parameter: "minimal_percent",
                value: self.minimal_percent,
            });
        }
        if !(self.min_angle_limit < self.max_angle_limit) {
            return Err(DogboneError::InvalidParameter {
                parameter: "min_angle_limit",
                value: self.min_angle_limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let p = ToolParameters::default();
        assert_relative_eq!(p.tool_radius(), 0.125);
        assert_relative_eq!(p.min_angle_limit.to_degrees(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.max_angle_limit.to_degrees(), 179.0, epsilon = 1e-12);
        assert_eq!(p.min_percent(), 1.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_min_percent_only_in_minimal_mode() {
        assert_relative_eq!(ToolParameters::minimal(0.25, 10.0).min_percent(), 1.1);
        let mut mortise = ToolParameters::mortise(0.25, false);
        mortise.minimal_percent = 50.0;
        assert_eq!(mortise.min_percent(), 1.0);
        assert!(!mortise.long_side);
    }

    #[test]
    fn test_offset_widens_cut() {
        let p = ToolParameters {
            diameter_offset: 0.01,
            ..ToolParameters::normal(0.25)
        };
        assert_relative_eq!(p.tool_radius(), 0.13);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let p = ToolParameters::normal(0.0);
        assert!(matches!(
            p.validate(),
            Err(DogboneError::InvalidParameter { parameter: "cutting diameter", .. })
        ));
        assert!(ToolParameters::minimal(0.25, -1.0).validate().is_err());
        assert!(ToolParameters::normal(f64::NAN).validate().is_err());

        let inverted = ToolParameters {
            min_angle_limit: 2.0,
            max_angle_limit: 1.0,
            ..ToolParameters::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let p: ToolParameters = serde_json::from_str(r#"{"tool_diameter": 0.5, "dogbone_type": "Mortise"}"#).unwrap();
        assert_eq!(p.tool_diameter, 0.5);
        assert_eq!(p.dogbone_type, DogboneType::Mortise);
        assert_eq!(p.minimal_percent, 10.0);
        assert!(p.long_side);
    }
}
