use alloc::vec::Vec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::leg::{leg_gas, level_legs, Leg};
use crate::pressure::{ata, hold_gas, move_gas, net_level_minutes};
use crate::{DiveSettings, GasError, Level, BUDGET_TOLERANCE_L};

/// Outcome of the admission check for one more level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Fit {
    Full,
    Rejected(GasError),
}

impl Fit {
    pub fn is_full(&self) -> bool {
        matches!(self, Fit::Full)
    }
}

/// A planned dive: start pressure, levels and the settings it was built with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsumptionModel {
    pub start_bar: f64,
    pub levels: Vec<Level>,
    pub settings: DiveSettings,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsumptionSummary {
    pub used_liters: f64,
    pub used_bar: f64,
    pub remaining_bar: f64,
}

/// A leg together with what it costs. `ata` is the average ATA for moves.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsumptionLeg {
    pub leg: Leg,
    pub time_min: f64,
    pub gas_l: f64,
    pub ata: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsumptionDetails {
    pub legs: Vec<ConsumptionLeg>,
    pub summary: ConsumptionSummary,
}

// Adds the transit to `level` and the net time spent there.
fn add_level(used_l: f64, last_m: f64, level: &Level, settings: &DiveSettings) -> f64 {
    let mut used = used_l + move_gas(last_m, level.depth_m, settings).gas_l;
    let minutes = net_level_minutes(last_m, level.depth_m, level.duration_min, settings);
    used += hold_gas(level.depth_m, minutes, settings.sac_lpm);
    used
}

/// Total litres used by a profile, descending from the surface.
///
/// The stated level duration includes the transit to the level, so only the
/// remainder is charged at the level's depth.
pub fn compute_used_liters(levels: &[Level], settings: &DiveSettings) -> f64 {
    let mut used = 0.0;
    let mut last = 0.0;
    for level in levels {
        used = add_level(used, last, level, settings);
        last = level.depth_m;
    }
    used
}

fn check_inputs(depth_m: f64, duration_min: f64, start_bar: f64, settings: &DiveSettings) -> Result<(), GasError> {
    settings.validate()?;
    if !start_bar.is_finite() || !depth_m.is_finite() || !duration_min.is_finite() {
        return Err(GasError::NonFinite);
    }
    if start_bar <= 0.0 {
        return Err(GasError::NonPositiveStartPressure(start_bar));
    }
    if depth_m < 0.0 {
        return Err(GasError::NegativeDepth(depth_m));
    }
    if duration_min < 0.0 {
        return Err(GasError::NegativeDuration(duration_min));
    }
    Ok(())
}

fn admit(required_l: f64, start_bar: f64, settings: &DiveSettings) -> Fit {
    let available_l = start_bar * settings.cylinder_volume_l;
    if required_l > available_l + BUDGET_TOLERANCE_L {
        tracing::debug!(required_l, available_l, "level rejected");
        Fit::Rejected(GasError::InsufficientGas { required_l, available_l })
    } else {
        Fit::Full
    }
}

/// Whether a level appended to `levels` still fits in the cylinder.
///
/// Pure: the caller decides whether to append.
pub fn can_add_another_level(
    depth_m: f64,
    duration_min: f64,
    levels: &[Level],
    start_bar: f64,
    settings: &DiveSettings,
) -> Fit {
    if let Err(e) = check_inputs(depth_m, duration_min, start_bar, settings) {
        tracing::debug!(error = ?e, "level rejected");
        return Fit::Rejected(e);
    }

    let used = compute_used_liters(levels, settings);
    let last = levels.last().map_or(0.0, |l| l.depth_m);
    let required = add_level(used, last, &Level::new(depth_m, duration_min), settings);
    admit(required, start_bar, settings)
}

/// Whether a level inserted at `index` fits, counting only the levels before
/// it. An index past the end behaves like appending.
pub fn can_add_level_at(
    index: usize,
    depth_m: f64,
    duration_min: f64,
    levels: &[Level],
    start_bar: f64,
    settings: &DiveSettings,
) -> Fit {
    if index >= levels.len() {
        return can_add_another_level(depth_m, duration_min, levels, start_bar, settings);
    }
    if let Err(e) = check_inputs(depth_m, duration_min, start_bar, settings) {
        tracing::debug!(error = ?e, index, "level rejected");
        return Fit::Rejected(e);
    }

    let mut candidate = levels[..index].to_vec();
    candidate.push(Level::new(depth_m, duration_min));
    admit(compute_used_liters(&candidate, settings), start_bar, settings)
}

pub fn summarize(model: &ConsumptionModel) -> Result<ConsumptionSummary, GasError> {
    model.settings.validate()?;
    let used_liters = compute_used_liters(&model.levels, &model.settings);
    let used_bar = used_liters / model.settings.cylinder_volume_l;
    Ok(ConsumptionSummary {
        used_liters,
        used_bar,
        remaining_bar: model.start_bar - used_bar,
    })
}

/// Breaks the profile into legs with time, gas and ATA per leg.
pub fn derive_details(model: &ConsumptionModel) -> Result<ConsumptionDetails, GasError> {
    let summary = summarize(model)?;
    let legs = level_legs(&model.levels, &model.settings)
        .into_iter()
        .map(|leg| {
            let (gas_l, time_min) = leg_gas(&leg, &model.settings);
            let ata = match leg {
                Leg::Move { from_m, to_m } => ata((from_m + to_m) / 2.0),
                Leg::Hold { at_m, .. } => ata(at_m),
            };
            ConsumptionLeg { leg, time_min, gas_l, ata }
        })
        .collect();

    Ok(ConsumptionDetails { legs, summary })
}

#[test]
fn test_net_time_subtracts_descent() {
    let settings = DiveSettings::new(20.0, 12.0).with_rates(10.0, 20.0);
    // 1 min descent at 2 ATA average, then 9 min at 3 ATA
    let used = compute_used_liters(&[Level::new(20.0, 10.0)], &settings);
    assert!(libm::fabs(used - (20.0 * 2.0 * 1.0 + 20.0 * 3.0 * 9.0)) < 1e-9);
}

#[test]
fn test_zero_start_pressure_is_rejected() {
    let fit = can_add_another_level(10.0, 5.0, &[], 0.0, &DiveSettings::default());
    assert_eq!(fit, Fit::Rejected(GasError::NonPositiveStartPressure(0.0)));
}

#[test]
fn test_insert_rejects_negative_depth() {
    let levels = [Level::new(30.0, 10.0), Level::new(20.0, 10.0)];
    let fit = can_add_level_at(1, -3.0, 5.0, &levels, 200.0, &DiveSettings::default());
    assert_eq!(fit, Fit::Rejected(GasError::NegativeDepth(-3.0)));
}
