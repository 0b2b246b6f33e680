//! Rock bottom: the gas a team needs to get from the bottom to the first gas
//! switch when something goes wrong at the deepest point of the dive.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use libm::ceil;
use crate::leg::{rock_bottom_legs, Leg};
use crate::pressure::{ata, transit};
use crate::{DiveSettings, GasError, Stop};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RockBottomInputs {
    pub bottom_depth_m: u32,
    pub switch_depth_m: u32,
    pub sac_per_diver_lpm: f64,
    pub divers: u32,
    pub ascent_rate_mpm: f64,
    pub cylinder_volume_l: f64,
    pub stress_factor: Option<f64>,
    pub delay_min: f64,
    pub stops: Vec<Stop>,
}

impl RockBottomInputs {
    /// Two divers, rates, cylinder, stress factor and delay from `settings`.
    pub fn from_settings(settings: &DiveSettings, bottom_depth_m: u32, switch_depth_m: u32, stops: Vec<Stop>) -> Self {
        RockBottomInputs {
            bottom_depth_m,
            switch_depth_m,
            sac_per_diver_lpm: settings.sac_lpm,
            divers: 2,
            ascent_rate_mpm: settings.ascent_rate_mpm,
            cylinder_volume_l: settings.cylinder_volume_l,
            stress_factor: settings.stress_factor,
            delay_min: settings.delay_min.unwrap_or(0.0),
            stops,
        }
    }

    pub fn team_sac_lpm(&self) -> f64 {
        self.sac_per_diver_lpm * self.divers as f64 * self.stress_factor.unwrap_or(1.0)
    }

    fn validate(&self) -> Result<(), GasError> {
        if !self.sac_per_diver_lpm.is_finite()
            || !self.ascent_rate_mpm.is_finite()
            || !self.cylinder_volume_l.is_finite()
        {
            return Err(GasError::NonFinite);
        }
        if self.sac_per_diver_lpm <= 0.0 {
            return Err(GasError::NonPositiveSac(self.sac_per_diver_lpm));
        }
        if self.cylinder_volume_l <= 0.0 {
            return Err(GasError::NonPositiveCylinder(self.cylinder_volume_l));
        }
        if self.divers == 0 {
            return Err(GasError::NoDivers);
        }
        if let Some(stress) = self.stress_factor {
            if !stress.is_finite() || stress <= 0.0 {
                return Err(GasError::InvalidStressFactor(stress));
            }
        }
        if !self.delay_min.is_finite() || self.delay_min < 0.0 {
            return Err(GasError::NegativeDelay(self.delay_min));
        }
        Ok(())
    }
}

/// Operands of `sac × ata × minutes`, kept exact.
///
/// `Display` is a plain `{:.1}` rendering, so a mid-depth ATA of 4.55 may show
/// as "4.5". Callers that need a particular rounding should format the fields
/// themselves.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Formula {
    pub sac_lpm: f64,
    pub ata: f64,
    pub minutes: f64,
}

impl Formula {
    pub fn gas_l(&self) -> f64 {
        self.sac_lpm * self.ata * self.minutes
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} × {:.1} × {:.1}", self.sac_lpm, self.ata, self.minutes)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    pub label: String,
    pub gas_l: u32,       // rounded up, display only
    pub exact_gas_l: f64,
    pub formula: Formula,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RockBottomResult {
    pub total_gas_l: u32,
    pub exact_total_gas_l: f64,
    pub required_bar: u32,
    pub team_sac_lpm: f64,
    pub legs: Vec<Leg>,
    pub segments: Vec<Segment>,
}

fn describe(leg: &Leg, inputs: &RockBottomInputs, team_sac_lpm: f64) -> (String, Formula) {
    match *leg {
        Leg::Move { from_m, to_m } => {
            let time_min = transit(from_m, to_m, team_sac_lpm, inputs.ascent_rate_mpm, inputs.ascent_rate_mpm).time_min;
            let direction = if leg.is_ascent() { "Ascent" } else { "Descent" };
            (
                format!("{direction} {from_m}→{to_m} m"),
                Formula { sac_lpm: team_sac_lpm, ata: ata((from_m + to_m) / 2.0), minutes: time_min },
            )
        }
        Leg::Hold { at_m, minutes } => (
            format!("Stop @ {at_m} m ({minutes} min)"),
            Formula { sac_lpm: team_sac_lpm, ata: ata(at_m), minutes },
        ),
    }
}

/// Gas needed from the bottom up to the switch depth, with a per segment
/// breakdown.
///
/// Segment gas is rounded up for display only; the total sums the exact
/// values and is rounded up once.
pub fn compute_until_switch(inputs: &RockBottomInputs) -> Result<RockBottomResult, GasError> {
    inputs.validate()?;
    let legs = rock_bottom_legs(inputs.bottom_depth_m, inputs.switch_depth_m, &inputs.stops, inputs.delay_min)?;
    let team_sac_lpm = inputs.team_sac_lpm();

    let mut segments = Vec::with_capacity(legs.len());
    let mut total = 0.0;
    for leg in &legs {
        let (label, formula) = describe(leg, inputs, team_sac_lpm);
        let gas = formula.gas_l();
        let shown = ceil(gas) as u32;
        if shown > 0 {
            segments.push(Segment { label, gas_l: shown, exact_gas_l: gas, formula });
        }
        total += gas;
    }

    let total_gas_l = ceil(total) as u32;
    let required_bar = ceil(total_gas_l as f64 / inputs.cylinder_volume_l) as u32;
    tracing::debug!(total_gas_l, required_bar, team_sac_lpm, legs = legs.len(), "rock bottom computed");

    Ok(RockBottomResult {
        total_gas_l,
        exact_total_gas_l: total,
        required_bar,
        team_sac_lpm,
        legs,
        segments,
    })
}

#[test]
fn test_formula_display() {
    let formula = Formula { sac_lpm: 40.0, ata: 4.6, minutes: 2.9 };
    assert_eq!(alloc::string::ToString::to_string(&formula), "40 × 4.6 × 2.9");
}

#[test]
fn test_stress_factor_scales_team_sac() {
    let mut inputs = RockBottomInputs::from_settings(&DiveSettings::new(20.0, 24.0), 40, 21, Vec::new());
    assert_eq!(inputs.team_sac_lpm(), 40.0);
    inputs.stress_factor = Some(1.5);
    assert_eq!(inputs.team_sac_lpm(), 60.0);
}

#[test]
fn test_formula_keeps_exact_ata() {
    let inputs = RockBottomInputs::from_settings(&DiveSettings::new(20.0, 24.0).with_delay(0.0), 50, 21, Vec::new());
    let result = compute_until_switch(&inputs).unwrap();
    let ascent = &result.segments[0];
    assert_eq!(ascent.formula.ata, ata(35.5));
    assert_eq!(ascent.exact_gas_l, ascent.formula.gas_l());
}
