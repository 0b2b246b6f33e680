use alloc::vec::Vec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pressure::{hold_gas, move_gas, net_level_minutes};
use crate::{DiveSettings, GasError, Level, Stop};

/// One phase of a dive profile.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Leg {
    /// Transit between two depths.
    Move { from_m: f64, to_m: f64 },
    /// Stationary period at a depth.
    Hold { at_m: f64, minutes: f64 },
}

impl Leg {
    pub fn is_ascent(&self) -> bool {
        matches!(self, Leg::Move { from_m, to_m } if to_m < from_m)
    }
}

/// Legs for a consumption profile, starting at the surface.
///
/// Hold legs carry the net level time, i.e. the stated duration minus the
/// transit time to reach the level.
pub fn level_legs(levels: &[Level], settings: &DiveSettings) -> Vec<Leg> {
    let mut legs = Vec::with_capacity(levels.len() * 2);
    let mut last = 0.0;
    for level in levels {
        if level.depth_m != last {
            legs.push(Leg::Move { from_m: last, to_m: level.depth_m });
        }
        let minutes = net_level_minutes(last, level.depth_m, level.duration_min, settings);
        if minutes > 0.0 {
            legs.push(Leg::Hold { at_m: level.depth_m, minutes });
        }
        last = level.depth_m;
    }
    tracing::trace!(levels = levels.len(), legs = legs.len(), "built level legs");
    legs
}

/// Stops between the switch and the bottom depth, deepest first.
pub fn corridor_stops(stops: &[Stop], bottom_m: u32, switch_m: u32) -> Vec<Stop> {
    let mut kept: Vec<Stop> = stops
        .iter()
        .copied()
        .filter(|s| (switch_m..=bottom_m).contains(&s.depth_m))
        .collect();
    kept.sort_by(|a, b| b.depth_m.cmp(&a.depth_m));
    kept
}

/// Legs from the bottom up to the first gas switch.
pub fn rock_bottom_legs(bottom_m: u32, switch_m: u32, stops: &[Stop], delay_min: f64) -> Result<Vec<Leg>, GasError> {
    if bottom_m < switch_m {
        return Err(GasError::BottomShallowerThanSwitch { bottom_m, switch_m });
    }

    let mut legs = Vec::new();
    let mut current = bottom_m;

    if delay_min > 0.0 {
        legs.push(Leg::Hold { at_m: bottom_m as f64, minutes: delay_min });
    }

    for stop in corridor_stops(stops, bottom_m, switch_m) {
        if stop.depth_m < current {
            legs.push(Leg::Move { from_m: current as f64, to_m: stop.depth_m as f64 });
        }
        if stop.minutes > 0 {
            legs.push(Leg::Hold { at_m: stop.depth_m as f64, minutes: stop.minutes as f64 });
        }
        current = stop.depth_m;
    }

    if switch_m < current {
        legs.push(Leg::Move { from_m: current as f64, to_m: switch_m as f64 });
    }

    tracing::trace!(bottom_m, switch_m, legs = legs.len(), "built rock bottom legs");
    Ok(legs)
}

/// Gas and time of a consumption leg at the profile SAC.
pub(crate) fn leg_gas(leg: &Leg, settings: &DiveSettings) -> (f64, f64) {
    match *leg {
        Leg::Move { from_m, to_m } => {
            let transit = move_gas(from_m, to_m, settings);
            (transit.gas_l, transit.time_min)
        }
        Leg::Hold { at_m, minutes } => (hold_gas(at_m, minutes, settings.sac_lpm), minutes),
    }
}

#[test]
fn test_stop_at_switch_depth_has_no_trailing_move() {
    let legs = rock_bottom_legs(30, 21, &[Stop::new(21, 2)], 0.0).unwrap();
    assert_eq!(
        legs,
        alloc::vec![
            Leg::Move { from_m: 30.0, to_m: 21.0 },
            Leg::Hold { at_m: 21.0, minutes: 2.0 },
        ]
    );
}

#[test]
fn test_bottom_equal_to_switch_without_stops() {
    let legs = rock_bottom_legs(21, 21, &[], 0.0).unwrap();
    assert!(legs.is_empty());
}
