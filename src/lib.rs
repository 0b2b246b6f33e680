#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "serde")]
use alloc::string::ToString;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod consumption;
pub mod deep_stop;
pub mod he_jump;
pub mod leg;
pub mod pressure;
pub mod rock_bottom;
pub mod stops;

/// Slack added to the gas budget so that float rounding never rejects a
/// level that exactly empties the cylinder.
pub const BUDGET_TOLERANCE_L: f64 = 1e-9;

/// Snapshot of the calculator settings. Engines read it, never write it.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DiveSettings {
    pub sac_lpm: f64,                       // litres per minute at 1 ATA
    pub ascent_rate_mpm: f64,               // m/min
    pub descent_rate_mpm: f64,              // m/min
    pub cylinder_volume_l: f64,             // litres
    pub stress_factor: Option<f64>,         // multiplier on SAC, rock bottom only
    pub delay_min: Option<f64>,             // minutes at the bottom before the ascent starts
}

impl DiveSettings {
    pub fn new(sac_lpm: f64, cylinder_volume_l: f64) -> Self {
        DiveSettings {
            sac_lpm,
            cylinder_volume_l,
            ..Default::default()
        }
    }

    pub fn with_rates(mut self, ascent_rate_mpm: f64, descent_rate_mpm: f64) -> Self {
        self.ascent_rate_mpm = ascent_rate_mpm;
        self.descent_rate_mpm = descent_rate_mpm;
        self
    }

    pub fn with_stress_factor(mut self, stress_factor: f64) -> Self {
        self.stress_factor = Some(stress_factor);
        self
    }

    pub fn with_delay(mut self, delay_min: f64) -> Self {
        self.delay_min = Some(delay_min);
        self
    }

    /// Checks the values every engine divides or multiplies by.
    ///
    /// Rates are not checked here: a rate <= 0 is tolerated and treated as
    /// an instantaneous transit.
    pub fn validate(&self) -> Result<(), GasError> {
        let values = [
            self.sac_lpm,
            self.ascent_rate_mpm,
            self.descent_rate_mpm,
            self.cylinder_volume_l,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GasError::NonFinite);
        }
        if self.sac_lpm <= 0.0 {
            return Err(GasError::NonPositiveSac(self.sac_lpm));
        }
        if self.cylinder_volume_l <= 0.0 {
            return Err(GasError::NonPositiveCylinder(self.cylinder_volume_l));
        }
        if let Some(stress) = self.stress_factor {
            if !stress.is_finite() || stress <= 0.0 {
                return Err(GasError::InvalidStressFactor(stress));
            }
        }
        if let Some(delay) = self.delay_min {
            if !delay.is_finite() || delay < 0.0 {
                return Err(GasError::NegativeDelay(delay));
            }
        }
        Ok(())
    }

    /// Loads a settings document. Missing fields keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, GasError> {
        let settings: DiveSettings = serde_json::from_str(json)
            .map_err(|e| GasError::MalformedSettings(e.to_string()))?;
        settings.validate()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }
}

impl Default for DiveSettings {
    fn default() -> Self {
        DiveSettings {
            sac_lpm: 15.0,
            ascent_rate_mpm: 15.0,
            descent_rate_mpm: 20.0,
            cylinder_volume_l: 24.0,
            stress_factor: None,
            delay_min: Some(2.0),
        }
    }
}

/// A planned stay at a depth. The stated duration includes the transit
/// from the previous level.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Level {
    pub depth_m: f64,
    pub duration_min: f64,
}

impl Level {
    pub fn new(depth_m: f64, duration_min: f64) -> Self {
        Level { depth_m, duration_min }
    }
}

/// A deco or safety stop on the way up to the gas switch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stop {
    pub depth_m: u32,
    pub minutes: u32,
}

impl Stop {
    pub fn new(depth_m: u32, minutes: u32) -> Self {
        Stop { depth_m, minutes }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GasError {
    #[error("depth must not be negative, got {0} m")]
    NegativeDepth(f64),
    #[error("duration must not be negative, got {0} min")]
    NegativeDuration(f64),
    #[error("SAC must be positive, got {0} l/min")]
    NonPositiveSac(f64),
    #[error("cylinder volume must be positive, got {0} l")]
    NonPositiveCylinder(f64),
    #[error("start pressure must be positive, got {0} bar")]
    NonPositiveStartPressure(f64),
    #[error("input is not a finite number")]
    NonFinite,
    #[error("bottom depth {bottom_m} m is shallower than switch depth {switch_m} m")]
    BottomShallowerThanSwitch { bottom_m: u32, switch_m: u32 },
    #[error("at least one diver is required")]
    NoDivers,
    #[error("stress factor must be positive, got {0}")]
    InvalidStressFactor(f64),
    #[error("delay must not be negative, got {0} min")]
    NegativeDelay(f64),
    #[error("gas fractions must be non-negative and sum to at most 1")]
    InvalidGasMix,
    #[error("{required_l:.1} l required but only {available_l:.1} l available")]
    InsufficientGas { required_l: f64, available_l: f64 },
    #[error("malformed settings: {0}")]
    MalformedSettings(alloc::string::String),
}

#[test]
fn test_default_settings_are_valid() {
    assert_eq!(DiveSettings::default().validate(), Ok(()));
}

#[test]
fn test_settings_reject_non_positive_sac() {
    let settings = DiveSettings::new(0.0, 12.0);
    assert_eq!(settings.validate(), Err(GasError::NonPositiveSac(0.0)));
}

#[test]
fn test_settings_reject_nan() {
    let settings = DiveSettings::new(f64::NAN, 12.0);
    assert_eq!(settings.validate(), Err(GasError::NonFinite));
}
