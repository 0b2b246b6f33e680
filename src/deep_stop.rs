#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use libm::round;

/// Depths offered by the deep stop calculator, 40 to 100 m in 5 m steps.
pub const DEPTH_OPTIONS: [u32; 13] = [40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95, 100];

// absolute pressure of the bottom / 1.35 gives the deep stop pressure
const PRESSURE_RATIO: f64 = 1.35;

/// Pressures are in metres of seawater, 10 m per bar.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeepStop {
    pub max_pressure: u32,
    pub stop_pressure: u32,
    pub deep_stop_m: u32,
}

pub fn compute(depth_m: u32) -> DeepStop {
    let max_pressure = depth_m.saturating_add(10);
    let stop_pressure = round(max_pressure as f64 / PRESSURE_RATIO) as u32;
    DeepStop {
        max_pressure,
        stop_pressure,
        deep_stop_m: stop_pressure.saturating_sub(10),
    }
}

#[test]
fn test_deep_stop_at_50m() {
    // 60 / 1.35 = 44.4
    assert_eq!(compute(50), DeepStop { max_pressure: 60, stop_pressure: 44, deep_stop_m: 34 });
}

#[test]
fn test_deep_stop_saturates() {
    assert_eq!(compute(u32::MAX).max_pressure, u32::MAX);
}
