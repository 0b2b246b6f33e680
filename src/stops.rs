//! Helpers for editing the deco stop list of a rock bottom plan.
//!
//! Suggested stops sit on a 3 m grid: the first one at half the bottom depth
//! (rounded up to the grid), every following one 3 m shallower.

use crate::Stop;

pub const MAX_STOPS: usize = 8;
pub const STOP_GRID_M: u32 = 3;
pub const DEFAULT_STOP_MINUTES: u32 = 1;

pub fn first_stop_depth(bottom_m: u32) -> u32 {
    let half = bottom_m / 2;
    match half % STOP_GRID_M {
        0 => half,
        rem => half - rem + STOP_GRID_M,
    }
}

/// The grid depth below `last_m - 3`. None once there is no room left.
pub fn next_stop_after(last_m: u32) -> Option<u32> {
    let base = last_m.checked_sub(STOP_GRID_M)?;
    Some(base - base % STOP_GRID_M)
}

/// Depth to pre-fill for the next stop, if one more stop fits strictly
/// below the switch depth.
pub fn suggest_next_stop(stops: &[Stop], bottom_m: u32, switch_m: u32) -> Option<Stop> {
    if stops.len() >= MAX_STOPS {
        return None;
    }
    let candidate = match stops.last() {
        None => first_stop_depth(bottom_m),
        Some(last) => next_stop_after(last.depth_m)?,
    };
    (candidate > switch_m && candidate <= bottom_m).then(|| Stop::new(candidate, DEFAULT_STOP_MINUTES))
}

/// A stop is valid when it lies between switch and bottom and the list stays
/// ordered deep to shallow around it. Equal neighbours are allowed.
pub fn is_stop_depth_valid_at(stops: &[Stop], index: usize, bottom_m: u32, switch_m: u32) -> bool {
    let Some(stop) = stops.get(index) else {
        return false;
    };
    if !(switch_m..=bottom_m).contains(&stop.depth_m) {
        return false;
    }
    let deeper_ok = index == 0 || stops[index - 1].depth_m >= stop.depth_m;
    let shallower_ok = stops.get(index + 1).is_none_or(|next| next.depth_m <= stop.depth_m);
    deeper_ok && shallower_ok
}

pub fn has_invalid_stops(stops: &[Stop], bottom_m: u32, switch_m: u32) -> bool {
    (0..stops.len()).any(|i| !is_stop_depth_valid_at(stops, i, bottom_m, switch_m))
}

#[test]
fn test_first_stop_rounds_up_to_grid() {
    assert_eq!(first_stop_depth(50), 27);
    assert_eq!(first_stop_depth(60), 30);
    assert_eq!(first_stop_depth(45), 24);
}

#[test]
fn test_next_stop_aligns_down() {
    assert_eq!(next_stop_after(27), Some(24));
    assert_eq!(next_stop_after(25), Some(21));
    assert_eq!(next_stop_after(2), None);
}
