use dive_gas_budget::{
    leg::Leg,
    rock_bottom::{compute_until_switch, RockBottomInputs},
    DiveSettings, GasError, Stop,
};

fn inputs(bottom_depth_m: u32, switch_depth_m: u32, stops: Vec<Stop>) -> RockBottomInputs {
    RockBottomInputs {
        bottom_depth_m,
        switch_depth_m,
        sac_per_diver_lpm: 20.0,
        divers: 2,
        ascent_rate_mpm: 10.0,
        cylinder_volume_l: 24.0,
        stress_factor: None,
        delay_min: 0.0,
        stops,
    }
}

#[test]
fn test_direct_ascent_to_switch() {
    let result = compute_until_switch(&inputs(50, 21, Vec::new())).unwrap();

    assert_eq!(result.legs, vec![Leg::Move { from_m: 50.0, to_m: 21.0 }]);
    assert_eq!(result.team_sac_lpm, 40.0);
    // 40 l/min * 4.55 ATA * 2.9 min = 527.8 l
    assert!((result.exact_total_gas_l - 527.8).abs() < 1e-9);
    assert_eq!(result.total_gas_l, 528);
    assert_eq!(result.required_bar, 22);

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0];
    assert_eq!(segment.label, "Ascent 50→21 m");
    assert_eq!(segment.gas_l, 528);
    assert_eq!(segment.formula.sac_lpm, 40.0);
    assert!((segment.formula.ata - 4.55).abs() < 1e-12);
    assert!((segment.formula.minutes - 2.9).abs() < 1e-12);
}

#[test]
fn test_stops_are_filtered_and_sorted() {
    let stops = vec![
        Stop::new(24, 2),
        Stop::new(30, 1),
        Stop::new(60, 5), // below the bottom
        Stop::new(9, 3),  // above the switch
        Stop::new(27, 0),
    ];
    let result = compute_until_switch(&inputs(40, 21, stops)).unwrap();

    assert_eq!(
        result.legs,
        vec![
            Leg::Move { from_m: 40.0, to_m: 30.0 },
            Leg::Hold { at_m: 30.0, minutes: 1.0 },
            Leg::Move { from_m: 30.0, to_m: 27.0 },
            Leg::Move { from_m: 27.0, to_m: 24.0 },
            Leg::Hold { at_m: 24.0, minutes: 2.0 },
            Leg::Move { from_m: 24.0, to_m: 21.0 },
        ]
    );
    let labels: Vec<&str> = result.segments.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Ascent 40→30 m",
            "Stop @ 30 m (1 min)",
            "Ascent 30→27 m",
            "Ascent 27→24 m",
            "Stop @ 24 m (2 min)",
            "Ascent 24→21 m",
        ]
    );
}

#[test]
fn test_total_is_rounded_once() {
    let mut plan = inputs(20, 20, vec![Stop::new(20, 1), Stop::new(20, 1)]);
    plan.sac_per_diver_lpm = 1.7;
    plan.divers = 1;
    let result = compute_until_switch(&plan).unwrap();

    // 5.1 l per stop, shown as 6 each, but 10.2 l in total
    let shown: u32 = result.segments.iter().map(|s| s.gas_l).sum();
    assert_eq!(shown, 12);
    assert_eq!(result.total_gas_l, 11);
    assert_eq!(result.required_bar, 1);
}

#[test]
fn test_delay_is_held_at_the_bottom_first() {
    let mut plan = inputs(30, 21, Vec::new());
    plan.delay_min = 2.0;
    let result = compute_until_switch(&plan).unwrap();

    assert_eq!(
        result.legs,
        vec![
            Leg::Hold { at_m: 30.0, minutes: 2.0 },
            Leg::Move { from_m: 30.0, to_m: 21.0 },
        ]
    );
    assert_eq!(result.segments[0].label, "Stop @ 30 m (2 min)");
    assert_eq!(result.segments[0].gas_l, 320);
}

#[test]
fn test_zero_ascent_rate_counts_only_stops() {
    let mut plan = inputs(50, 21, vec![Stop::new(30, 2)]);
    plan.ascent_rate_mpm = 0.0;
    let result = compute_until_switch(&plan).unwrap();

    assert_eq!(result.legs.len(), 3);
    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.total_gas_l, 320);
    assert_eq!(result.required_bar, 14);
}

#[test]
fn test_bottom_shallower_than_switch_is_rejected() {
    let result = compute_until_switch(&inputs(20, 21, Vec::new()));
    assert_eq!(result, Err(GasError::BottomShallowerThanSwitch { bottom_m: 20, switch_m: 21 }));
}

#[test]
fn test_invalid_team_is_rejected() {
    let mut plan = inputs(50, 21, Vec::new());
    plan.divers = 0;
    assert_eq!(compute_until_switch(&plan), Err(GasError::NoDivers));

    let mut plan = inputs(50, 21, Vec::new());
    plan.stress_factor = Some(0.0);
    assert_eq!(compute_until_switch(&plan), Err(GasError::InvalidStressFactor(0.0)));

    let mut plan = inputs(50, 21, Vec::new());
    plan.cylinder_volume_l = 0.0;
    assert_eq!(compute_until_switch(&plan), Err(GasError::NonPositiveCylinder(0.0)));
}

#[test]
fn test_settings_stress_factor_doubles_the_gas() {
    let settings = DiveSettings::new(20.0, 24.0).with_rates(10.0, 20.0).with_delay(0.0);
    let calm = compute_until_switch(&RockBottomInputs::from_settings(&settings, 50, 21, Vec::new())).unwrap();
    let stressed = compute_until_switch(&RockBottomInputs::from_settings(
        &settings.with_stress_factor(2.0),
        50,
        21,
        Vec::new(),
    ))
    .unwrap();

    assert_eq!(calm.total_gas_l, 528);
    assert!((stressed.exact_total_gas_l - 2.0 * calm.exact_total_gas_l).abs() < 1e-9);
}

#[test]
fn test_settings_delay_is_used() {
    let settings = DiveSettings::new(20.0, 24.0).with_rates(10.0, 20.0);
    let plan = RockBottomInputs::from_settings(&settings, 50, 21, Vec::new());
    assert_eq!(plan.delay_min, 2.0);
    let result = compute_until_switch(&plan).unwrap();
    assert_eq!(result.legs[0], Leg::Hold { at_m: 50.0, minutes: 2.0 });
}
