use rstest::rstest;
use sweeper_core::{
    CoverageNavigator, Decision, ManeuverStep, NavState, Parity, Position, SurfaceArea,
    TurnDirection,
};

const ROBOT_W: f32 = 140.0;

/// Drive one column to the boundary and return the navigator's decision.
fn finish_column(nav: &mut CoverageNavigator, surface: &SurfaceArea, odo: &mut f32) -> Decision {
    nav.track(*odo);
    *odo += surface.height_mm;
    let p = nav.track(*odo);
    let d = nav.on_tick(p, surface, ROBOT_W);
    // odometry accumulated by the maneuver itself
    *odo += 2.0 * ROBOT_W;
    d
}

#[rstest]
fn below_boundary_continues() {
    let surface = SurfaceArea::new(1000.0, 560.0);
    let mut nav = CoverageNavigator::new();
    let p = Position {
        x_mm: 0.0,
        y_mm: 999.9,
    };
    assert_eq!(nav.on_tick(p, &surface, ROBOT_W), Decision::Continue);
    assert_eq!(nav.nav_state(), NavState::Scanning);
    assert_eq!(nav.state().current_column.index(), 1);
}

#[rstest]
fn exact_division_gives_four_columns() {
    let surface = SurfaceArea::new(1000.0, 560.0);
    let mut nav = CoverageNavigator::new();
    let mut odo = 0.0;
    let mut directions = Vec::new();

    loop {
        match finish_column(&mut nav, &surface, &mut odo) {
            Decision::Turn(plan) => directions.push(plan.direction),
            Decision::Finish => break,
            Decision::Continue => panic!("boundary must not continue"),
        }
        assert!(directions.len() < 10, "coverage did not terminate");
    }

    assert_eq!(
        directions,
        vec![
            TurnDirection::Clockwise,
            TurnDirection::CounterClockwise,
            TurnDirection::Clockwise,
        ]
    );
    assert_eq!(nav.state().current_column.index(), 4);
    assert!(nav.is_done());
    assert_eq!(nav.nav_state(), NavState::Finished);
    assert!((nav.state().position.x_mm - 560.0).abs() < 1e-3);
}

#[rstest]
#[case(600.0, 4)] // 600 / 140 = 4.28: column count bound
#[case(300.0, 2)]
#[case(150.0, 1)]
fn inexact_width_stops_at_whole_columns(#[case] width: f32, #[case] columns: u32) {
    let surface = SurfaceArea::new(500.0, width);
    let mut nav = CoverageNavigator::new();
    let mut odo = 0.0;
    while let Decision::Turn(_) = finish_column(&mut nav, &surface, &mut odo) {}
    assert!(nav.is_done());
    assert_eq!(nav.state().current_column.index(), columns);
}

#[rstest]
fn turn_resets_column_distance() {
    let surface = SurfaceArea::new(100.0, 560.0);
    let mut nav = CoverageNavigator::new();
    nav.track(50.0);
    let p = nav.track(160.0);
    assert!(matches!(nav.on_tick(p, &surface, ROBOT_W), Decision::Turn(_)));
    assert_eq!(nav.state().position.y_mm, 0.0);

    // First reading after the maneuver becomes the new baseline.
    let p = nav.track(500.0);
    assert_eq!(p.y_mm, 0.0);
    let p = nav.track(530.0);
    assert!((p.y_mm - 30.0).abs() < 1e-4);
    assert!((p.x_mm - ROBOT_W).abs() < 1e-4);
}

#[rstest]
fn plan_is_turn_translate_turn() {
    let surface = SurfaceArea::new(100.0, 560.0);
    let mut nav = CoverageNavigator::new();
    nav.track(0.0);
    let p = nav.track(100.0);
    let Decision::Turn(plan) = nav.on_tick(p, &surface, ROBOT_W) else {
        panic!("expected a turn");
    };
    assert_eq!(plan.from_column, 1);
    assert_eq!(
        plan.steps(),
        [
            ManeuverStep::Turn { angle_deg: 90.0 },
            ManeuverStep::Straight { distance_mm: 140.0 },
            ManeuverStep::Turn { angle_deg: 90.0 },
        ]
    );
}

#[rstest]
fn finished_is_a_sink() {
    let surface = SurfaceArea::new(100.0, 150.0);
    let mut nav = CoverageNavigator::new();
    nav.track(0.0);
    let p = nav.track(100.0);
    assert_eq!(nav.on_tick(p, &surface, ROBOT_W), Decision::Finish);
    let column = nav.state().current_column;
    for y in [0.0, 50.0, 500.0] {
        let p = Position { x_mm: 0.0, y_mm: y };
        assert_eq!(nav.on_tick(p, &surface, ROBOT_W), Decision::Finish);
    }
    assert_eq!(nav.state().current_column, column);
}

#[rstest]
#[case(1, Parity::Odd, TurnDirection::Clockwise)]
#[case(2, Parity::Even, TurnDirection::CounterClockwise)]
#[case(7, Parity::Odd, TurnDirection::Clockwise)]
fn direction_follows_parity(#[case] index: u32, #[case] parity: Parity, #[case] dir: TurnDirection) {
    assert_eq!(TurnDirection::for_column(index), dir);
    assert_eq!(dir.opposite().opposite(), dir);
    let expected = if parity == Parity::Odd {
        TurnDirection::Clockwise
    } else {
        TurnDirection::CounterClockwise
    };
    assert_eq!(expected, dir);
}

#[rstest]
fn nan_first_reading_still_reaches_boundary() {
    let surface = SurfaceArea::new(800.0, 560.0);
    let mut nav = CoverageNavigator::new();
    assert_eq!(nav.track(f32::NAN).y_mm, 0.0);
    assert_eq!(nav.track(10_000.0).y_mm, 0.0);
    let p = nav.track(10_800.0);
    assert_eq!(p.y_mm, 800.0);
    assert!(matches!(nav.on_tick(p, &surface, ROBOT_W), Decision::Turn(_)));
}

#[rstest]
fn column_start_latches_once_after_turn() {
    let surface = SurfaceArea::new(800.0, 560.0);
    let mut nav = CoverageNavigator::new();
    let mut odo = 0.0;
    assert!(matches!(finish_column(&mut nav, &surface, &mut odo), Decision::Turn(_)));

    assert!(nav.mark_column_start(odo));
    assert!(!nav.mark_column_start(odo + 50.0));
    assert_eq!(nav.track(odo + 10.0).y_mm, 10.0);
}
