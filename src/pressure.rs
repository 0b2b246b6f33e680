#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use libm::fabs;
use crate::DiveSettings;

/// Gas and time spent on a single transit between two depths.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoveGas {
    pub gas_l: f64,
    pub time_min: f64,
}

// seawater, 10 m per bar on top of the 1 bar surface pressure
pub fn ata(depth_m: f64) -> f64 {
    1.0 + depth_m / 10.0
}

pub fn move_gas(from_m: f64, to_m: f64, settings: &DiveSettings) -> MoveGas {
    transit(
        from_m,
        to_m,
        settings.sac_lpm,
        settings.ascent_rate_mpm,
        settings.descent_rate_mpm,
    )
}

/// Gas for moving from `from_m` to `to_m` at the direction's rate.
///
/// The pressure along the way is approximated by the ATA at the average
/// depth. A rate <= 0 counts as an instantaneous transit: zero time, zero gas.
pub fn transit(from_m: f64, to_m: f64, sac_lpm: f64, ascent_rate_mpm: f64, descent_rate_mpm: f64) -> MoveGas {
    if from_m == to_m {
        return MoveGas::default();
    }
    let rate = if to_m < from_m { ascent_rate_mpm } else { descent_rate_mpm };
    let time_min = if rate > 0.0 { fabs(to_m - from_m) / rate } else { 0.0 };
    let gas_l = sac_lpm * ata((from_m + to_m) / 2.0) * time_min;

    MoveGas { gas_l, time_min }
}

pub fn hold_gas(depth_m: f64, minutes: f64, sac_lpm: f64) -> f64 {
    sac_lpm * ata(depth_m) * minutes
}

/// Time left at a level once the transit to it is taken out of the stated
/// duration. Never negative.
pub fn net_level_minutes(from_m: f64, to_m: f64, stated_min: f64, settings: &DiveSettings) -> f64 {
    let transit = move_gas(from_m, to_m, settings);
    f64::max(stated_min - transit.time_min, 0.0)
}

#[test]
fn test_ata_at_surface() {
    assert_eq!(ata(0.0), 1.0);
    assert_eq!(ata(30.0), 4.0);
}

#[test]
fn test_zero_rate_does_not_divide() {
    let settings = DiveSettings::default().with_rates(0.0, -5.0);
    assert_eq!(move_gas(40.0, 10.0, &settings), MoveGas::default());
    assert_eq!(move_gas(10.0, 40.0, &settings), MoveGas::default());
}
