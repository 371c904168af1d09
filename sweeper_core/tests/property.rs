use proptest::prelude::*;
use sweeper_core::{
    CoverageNavigator, Decision, PositionTracker, Sample, SubstanceTable, SurfaceArea,
    TurnDirection, classify,
};

prop_compose! {
    fn geometry()(
        robot_w in 50.0f32..400.0,
        ratio in 1.01f32..20.0,
        height in 10.0f32..5_000.0,
    ) -> (SurfaceArea, f32) {
        (SurfaceArea::new(height, robot_w * ratio), robot_w)
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn coverage_terminates_with_alternating_turns((surface, robot_w) in geometry()) {
        let mut nav = CoverageNavigator::new();
        let bound = (surface.width_mm / robot_w).ceil() as usize;
        let mut odo = 0.0f32;
        let mut turns = Vec::new();

        loop {
            nav.track(odo);
            // overshoot absorbs f32 rounding at large odometer values
            odo += surface.height_mm * 1.01;
            let p = nav.track(odo);
            match nav.on_tick(p, &surface, robot_w) {
                Decision::Turn(plan) => turns.push(plan.direction),
                Decision::Finish => break,
                Decision::Continue => prop_assert!(false, "boundary reading continued"),
            }
            prop_assert!(turns.len() <= bound, "more turns than columns");
        }

        let columns = nav.state().current_column.index() as usize;
        prop_assert!(columns >= 1 && columns <= bound);
        prop_assert_eq!(turns.len(), columns - 1);
        for (i, dir) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 {
                TurnDirection::Clockwise
            } else {
                TurnDirection::CounterClockwise
            };
            prop_assert_eq!(*dir, expected);
        }
    }

    #[test]
    fn tracked_distance_is_monotonic(readings in prop::collection::vec(-1_000.0f32..1_000.0, 1..64)) {
        let mut t = PositionTracker::new();
        let mut last = 0.0f32;
        for r in readings {
            let y = t.update(r);
            prop_assert!(y >= 0.0);
            prop_assert!(y >= last);
            last = y;
        }
    }

    #[test]
    fn unknown_signatures_never_match(
        a in 100.0f32..1_000.0,
        b in 100.0f32..1_000.0,
        c in 100.0f32..1_000.0,
        amount in 0.0f32..1.0e9,
    ) {
        let table = SubstanceTable::builtin();
        prop_assert!(classify(&Sample::new([a, b, c], amount), &table).is_none());
    }
}
