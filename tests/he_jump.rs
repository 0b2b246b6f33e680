use dive_gas_budget::he_jump::{
    check_switch, recommend_intermediate, GasMix, Recommendation, RecommendationNote, Violation,
    STANDARD_MIXES,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_one_fifth_rule_violation() {
    let from = GasMix::new(0.18, 0.45);
    let to = GasMix::new(0.50, 0.00);
    let result = check_switch(from, to);

    assert!(approx(result.delta_he, -0.45));
    assert!(approx(result.from_n2, 0.37));
    assert!(approx(result.to_n2, 0.50));
    assert!(approx(result.delta_n2, 0.13));
    assert!(approx(result.allowed_delta_n2, 0.09));
    assert!(!result.within_one_fifth_rule);
    assert!(result.violations.contains(&Violation::OneFifthRule));
    assert!(!result.violations.contains(&Violation::LeanToHeavy));
    assert!(!result.is_safe());
}

#[test]
fn test_primary_recommendation_sits_on_the_boundary() {
    let result = check_switch(GasMix::new(0.18, 0.45), GasMix::new(0.50, 0.00));
    let recommended = result.recommended.expect("a primary recommendation");

    assert_eq!(recommended.gas.f_o2, 0.50);
    // 0.45 + (0.18 - 0.50) / 0.8
    assert!(approx(recommended.gas.f_he, 0.05));
    assert_eq!(recommended.note, RecommendationNote::FeasibleRange);
    assert_eq!(recommended.note.as_str(), "FEASIBLE_RANGE");

    let retry = check_switch(GasMix::new(0.18, 0.45), recommended.gas);
    assert!(approx(retry.delta_n2, retry.allowed_delta_n2));
}

#[test]
fn test_out_of_range_target_is_clamped() {
    // an impossible target pushes the boundary helium below zero
    let result = check_switch(GasMix::new(0.18, 0.45), GasMix::new(0.80, -0.5));
    let recommended = result.recommended.expect("a primary recommendation");
    assert_eq!(recommended.gas, GasMix::new(0.80, 0.0));
    assert_eq!(recommended.note, RecommendationNote::BoundaryHe);
}

#[test]
fn test_boundary_on_a_nitrox_drops_helium() {
    // 0.40 + (0.10 - 0.42) / 0.8 = 0, up to rounding
    let result = check_switch(GasMix::new(0.10, 0.40), GasMix::new(0.42, 0.0));
    let recommended = result.recommended.expect("a primary recommendation");
    assert_eq!(recommended.gas.f_o2, 0.42);
    assert_eq!(recommended.gas.f_he, 0.0);
    assert_eq!(recommended.note, RecommendationNote::HeZeroNitrox);
    assert_eq!(recommended.note.as_str(), "HE_ZERO_NITROX");
}

#[test]
fn test_no_recommendation_when_rule_holds() {
    let result = check_switch(GasMix::new(0.18, 0.45), GasMix::new(0.50, 0.10));
    assert!(result.within_one_fifth_rule);
    assert!(result.violations.is_empty());
    assert!(result.recommended.is_none());
}

#[test]
fn test_lean_to_heavy_without_recommendation() {
    // nitrogen drops, helium rises
    let result = check_switch(GasMix::new(0.21, 0.35), GasMix::new(0.10, 0.70));
    assert!(result.within_one_fifth_rule);
    assert_eq!(result.violations.iter().copied().collect::<Vec<_>>(), vec![Violation::LeanToHeavy]);
    assert!(result.recommended.is_none());
}

#[test]
fn test_both_violations() {
    // helium up 0.05, nitrogen up 0.05
    let result = check_switch(GasMix::new(0.30, 0.30), GasMix::new(0.20, 0.35));
    assert_eq!(
        result.violations.iter().copied().collect::<Vec<_>>(),
        vec![Violation::OneFifthRule, Violation::LeanToHeavy]
    );
    // fixing the rule would need even more helium
    assert!(result.recommended.is_none());
}

#[test]
fn test_same_mix_is_a_single_step() {
    for mix in STANDARD_MIXES.iter().chain([GasMix::air(), GasMix::new(0.32, 0.0)].iter()) {
        assert_eq!(recommend_intermediate(*mix, *mix), Recommendation::Single(*mix));
    }
}

#[test]
fn test_safe_switch_is_a_single_step() {
    let to = GasMix::new(0.50, 0.10);
    assert_eq!(recommend_intermediate(GasMix::new(0.18, 0.45), to), Recommendation::Single(to));
}

#[test]
fn test_no_feasible_intermediate() {
    assert_eq!(
        recommend_intermediate(GasMix::new(0.18, 0.45), GasMix::new(0.50, 0.00)),
        Recommendation::NoFeasible
    );
}

#[test]
fn test_invalid_target_routes_through_catalogue() {
    let to = GasMix::new(0.90, 0.20);
    assert!(!to.is_valid());
    assert_eq!(
        recommend_intermediate(GasMix::new(0.18, 0.45), to),
        Recommendation::TwoStep { first: GasMix::new(0.18, 0.45), second: to }
    );
}

#[test]
fn test_gas_mix_validity() {
    // eighths add up exactly
    for o2 in 0..=8u8 {
        for he in 0..=(8 - o2) {
            let mix = GasMix::new(o2 as f64 / 8.0, he as f64 / 8.0);
            assert!(mix.is_valid(), "{o2}/8 {he}/8");
        }
        // one eighth over
        assert!(!GasMix::new(o2 as f64 / 8.0, (9 - o2) as f64 / 8.0).is_valid());
    }
    assert!(!GasMix::new(0.60, 0.50).is_valid());
    assert!(!GasMix::new(-0.1, 0.20).is_valid());
    assert!(!GasMix::new(0.21, -0.01).is_valid());
    assert!(GasMix::from_percent(21, 35).is_ok());
    assert!(GasMix::from_percent(80, 30).is_err());
}
