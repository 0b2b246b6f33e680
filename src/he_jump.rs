//! Helium jump checks for open circuit gas switches on the way up.
//!
//! Two rules apply to a switch from a bottom mix to a deco mix:
//!
//! - one-fifth rule: nitrogen may rise by at most a fifth of the helium drop;
//! - lean to heavy: never switch to a mix with more helium than the current one.

use alloc::collections::BTreeSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use libm::fabs;
use crate::GasError;

const N2_TOLERANCE: f64 = 1e-9;
const CLAMP_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GasMix {
    pub f_o2: f64,
    pub f_he: f64,
}

impl GasMix {
    pub const fn new(f_o2: f64, f_he: f64) -> Self {
        GasMix { f_o2, f_he }
    }

    pub const fn air() -> Self {
        GasMix::new(0.21, 0.0)
    }

    pub const fn oxygen() -> Self {
        GasMix::new(1.0, 0.0)
    }

    /// Builds a mix from whole percentages, e.g. `from_percent(18, 45)`.
    pub fn from_percent(o2: u8, he: u8) -> Result<Self, GasError> {
        let mix = GasMix::new(o2 as f64 / 100.0, he as f64 / 100.0);
        if mix.is_valid() { Ok(mix) } else { Err(GasError::InvalidGasMix) }
    }

    pub fn f_n2(&self) -> f64 {
        1.0 - self.f_o2 - self.f_he
    }

    pub fn is_valid(&self) -> bool {
        self.f_o2 >= 0.0 && self.f_he >= 0.0 && self.f_o2 + self.f_he <= 1.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Violation {
    OneFifthRule,
    LeanToHeavy,
}

/// How the primary recommendation relates to the exact one-fifth boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecommendationNote {
    /// The boundary helium lay outside `[0, 1 - fO2]` and was clamped.
    BoundaryHe,
    /// Clamped to no helium at all, i.e. a nitrox.
    HeZeroNitrox,
    FeasibleRange,
}

impl RecommendationNote {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationNote::BoundaryHe => "BOUNDARY_HE",
            RecommendationNote::HeZeroNitrox => "HE_ZERO_NITROX",
            RecommendationNote::FeasibleRange => "FEASIBLE_RANGE",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrimaryRecommendation {
    pub gas: GasMix,
    pub note: RecommendationNote,
}

/// Full arithmetic of a switch check, so the caller can show its working.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeJumpResult {
    pub from: GasMix,
    pub to: GasMix,
    pub from_n2: f64,
    pub to_n2: f64,
    pub delta_he: f64,
    pub delta_n2: f64,
    pub allowed_delta_n2: f64,
    pub within_one_fifth_rule: bool,
    pub violations: BTreeSet<Violation>,
    pub recommended: Option<PrimaryRecommendation>,
}

impl HeJumpResult {
    pub fn is_safe(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Recommendation {
    /// The direct switch is fine.
    Single(GasMix),
    /// Switch to `first`, then to `second`.
    TwoStep { first: GasMix, second: GasMix },
    NoFeasible,
}

/// Intermediate mixes tried by [`recommend_intermediate`], in tie-break order.
pub const STANDARD_MIXES: [GasMix; 8] = [
    GasMix::new(0.50, 0.00), // Nx50
    GasMix::new(0.80, 0.00), // Nx80
    GasMix::new(1.00, 0.00), // O2
    GasMix::new(0.21, 0.35),
    GasMix::new(0.18, 0.45),
    GasMix::new(0.15, 0.55),
    GasMix::new(0.12, 0.65),
    GasMix::new(0.10, 0.70),
];

fn one_fifth_ok(from: &GasMix, to: &GasMix) -> bool {
    let delta_he = to.f_he - from.f_he;
    let delta_n2 = to.f_n2() - from.f_n2();
    fabs(delta_n2) <= 0.2 * fabs(delta_he) || delta_n2 <= N2_TOLERANCE
}

fn lean_to_heavy(from: &GasMix, to: &GasMix) -> bool {
    from.f_he < to.f_he
}

fn switch_ok(from: &GasMix, to: &GasMix) -> bool {
    one_fifth_ok(from, to) && !lean_to_heavy(from, to)
}

// Helium that puts the switch exactly on the one-fifth boundary at the
// target's oxygen fraction. None if that would mean adding helium.
fn primary_recommendation(from: &GasMix, to: &GasMix) -> Option<PrimaryRecommendation> {
    let he_target = from.f_he + (from.f_o2 - to.f_o2) / 0.8;
    if he_target > from.f_he + N2_TOLERANCE {
        return None;
    }

    let mut he_clamped = he_target.clamp(0.0, f64::max(1.0 - to.f_o2, 0.0));
    let note = if fabs(he_target - he_clamped) > CLAMP_TOLERANCE {
        RecommendationNote::BoundaryHe
    } else if he_clamped <= CLAMP_TOLERANCE {
        // rounding noise around a nitrox boundary
        he_clamped = 0.0;
        RecommendationNote::HeZeroNitrox
    } else {
        RecommendationNote::FeasibleRange
    };

    Some(PrimaryRecommendation { gas: GasMix::new(to.f_o2, he_clamped), note })
}

pub fn check_switch(from: GasMix, to: GasMix) -> HeJumpResult {
    let delta_he = to.f_he - from.f_he;
    let delta_n2 = to.f_n2() - from.f_n2();
    let allowed_delta_n2 = 0.2 * fabs(delta_he);
    let within_one_fifth_rule = fabs(delta_n2) <= allowed_delta_n2 || delta_n2 <= N2_TOLERANCE;

    let mut violations = BTreeSet::new();
    if !within_one_fifth_rule {
        violations.insert(Violation::OneFifthRule);
    }
    if lean_to_heavy(&from, &to) {
        violations.insert(Violation::LeanToHeavy);
    }

    let recommended = if within_one_fifth_rule { None } else { primary_recommendation(&from, &to) };
    tracing::debug!(?violations, ?recommended, "checked gas switch");

    HeJumpResult {
        from,
        to,
        from_n2: from.f_n2(),
        to_n2: to.f_n2(),
        delta_he,
        delta_n2,
        allowed_delta_n2,
        within_one_fifth_rule,
        violations,
        recommended,
    }
}

// Feasible candidate with the smallest L1 distance to `to`. Earlier
// candidates win ties.
fn closest_intermediate<'a>(candidates: &'a [GasMix], from: &GasMix, to: &GasMix) -> Option<&'a GasMix> {
    let distance = |mix: &GasMix| fabs(mix.f_o2 - to.f_o2) + fabs(mix.f_he - to.f_he);
    candidates
        .iter()
        .filter(|mix| mix.is_valid() && switch_ok(from, mix) && switch_ok(mix, to))
        .fold(None::<&GasMix>, |best, mix| match best {
            Some(b) if distance(b) <= distance(mix) => Some(b),
            _ => Some(mix),
        })
}

/// Finds a one or two step route from `from` to `to` that keeps every switch
/// within both rules. The intermediate mix is the standard mix closest to
/// `to`; the first one in [`STANDARD_MIXES`] wins a tie.
pub fn recommend_intermediate(from: GasMix, to: GasMix) -> Recommendation {
    if to.is_valid() && switch_ok(&from, &to) {
        return Recommendation::Single(to);
    }

    match closest_intermediate(&STANDARD_MIXES, &from, &to) {
        Some(first) => {
            tracing::debug!(?first, "intermediate mix found");
            Recommendation::TwoStep { first: *first, second: to }
        }
        None => {
            tracing::debug!("no feasible intermediate mix");
            Recommendation::NoFeasible
        }
    }
}

#[test]
fn test_small_nitrogen_rise_passes() {
    // 21/35 to Nx50: nitrogen rises 0.06, within a fifth of the 0.35 helium drop
    let result = check_switch(GasMix::new(0.21, 0.35), GasMix::new(0.50, 0.0));
    assert!(result.within_one_fifth_rule);
    assert!(result.recommended.is_none());
}

#[test]
fn test_lean_to_heavy_only() {
    let result = check_switch(GasMix::new(0.21, 0.35), GasMix::new(0.18, 0.45));
    assert!(result.within_one_fifth_rule);
    assert_eq!(result.violations.len(), 1);
    assert!(result.violations.contains(&Violation::LeanToHeavy));
}

#[test]
fn test_first_of_equally_close_mixes_wins() {
    let from = GasMix::new(0.25, 0.25);
    let to = GasMix::new(0.50, 0.0);
    let candidates = [GasMix::new(0.25, 0.25), GasMix::new(0.25, 0.25), GasMix::new(0.50, 0.25)];
    let best = closest_intermediate(&candidates, &from, &to);
    assert!(best.is_some_and(|mix| core::ptr::eq(mix, &candidates[0])));
}

#[test]
fn test_closer_mix_beats_earlier_one() {
    let from = GasMix::new(0.25, 0.25);
    let to = GasMix::new(0.50, 0.0);
    // both keep nitrogen at 0.5, the second is half as far from the target
    let candidates = [GasMix::new(0.25, 0.25), GasMix::new(0.375, 0.125)];
    let best = closest_intermediate(&candidates, &from, &to);
    assert!(best.is_some_and(|mix| core::ptr::eq(mix, &candidates[1])));
}
