//! Boustrophedon coverage state machine.
//!
//! The surface is split into columns one robot-width wide. The robot drives a
//! column until its column-relative distance reaches the surface height, then
//! either turns into the next column or finishes:
//!
//! ```text
//! Scanning -> BoundaryCheck -> Turning -> Scanning
//!                           \-> Finished (sink)
//! ```
//!
//! The navigator only decides. Executing a [`TurnPlan`] is the caller's job,
//! since the caller owns the drivetrain.

use crate::config::SurfaceArea;
use crate::position::PositionTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Odd,
    Even,
}

/// Direction of both 90° turns of a column change. Clockwise is a positive
/// angle on the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Clockwise,
    CounterClockwise,
}

impl TurnDirection {
    /// Odd columns turn clockwise, even columns counter-clockwise.
    pub fn for_column(index: u32) -> Self {
        match (Column { index }).parity() {
            Parity::Odd => TurnDirection::Clockwise,
            Parity::Even => TurnDirection::CounterClockwise,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            TurnDirection::Clockwise => TurnDirection::CounterClockwise,
            TurnDirection::CounterClockwise => TurnDirection::Clockwise,
        }
    }

    /// `angle_deg` with this direction's sign applied.
    pub fn signed(self, angle_deg: f32) -> f32 {
        match self {
            TurnDirection::Clockwise => angle_deg.abs(),
            TurnDirection::CounterClockwise => -angle_deg.abs(),
        }
    }
}

/// One pass over the surface height. Index starts at 1 and only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    index: u32,
}

impl Column {
    pub fn first() -> Self {
        Self { index: 1 }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn parity(self) -> Parity {
        if self.index % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    pub fn turn_direction(self) -> TurnDirection {
        TurnDirection::for_column(self.index)
    }

    fn next(self) -> Self {
        Self {
            index: self.index.saturating_add(1),
        }
    }
}

/// `x_mm` is the lateral offset of the current column, `y_mm` the distance
/// travelled in it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x_mm: f32,
    pub y_mm: f32,
}

/// The only mutable run state. Owned by [`CoverageNavigator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageState {
    pub current_column: Column,
    pub position: Position,
    pub done: bool,
}

impl Default for CoverageState {
    fn default() -> Self {
        Self {
            current_column: Column::first(),
            position: Position::default(),
            done: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Scanning,
    BoundaryCheck,
    Turning,
    Finished,
}

/// Single step of a column-change maneuver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManeuverStep {
    Turn { angle_deg: f32 },
    Straight { distance_mm: f32 },
}

/// Column change: turn 90°, translate one robot width, turn 90° again, both
/// turns in the same direction (net 180°).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnPlan {
    pub direction: TurnDirection,
    pub lateral_mm: f32,
    /// Column being left.
    pub from_column: u32,
}

impl TurnPlan {
    pub fn steps(&self) -> [ManeuverStep; 3] {
        let angle_deg = self.direction.signed(90.0);
        [
            ManeuverStep::Turn { angle_deg },
            ManeuverStep::Straight {
                distance_mm: self.lateral_mm,
            },
            ManeuverStep::Turn { angle_deg },
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Continue,
    Turn(TurnPlan),
    Finish,
}

#[derive(Debug, Clone)]
pub struct CoverageNavigator {
    state: CoverageState,
    nav: NavState,
    tracker: PositionTracker,
}

impl Default for CoverageNavigator {
    fn default() -> Self {
        Self {
            state: CoverageState::default(),
            nav: NavState::Scanning,
            tracker: PositionTracker::new(),
        }
    }
}

impl CoverageNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CoverageState {
        &self.state
    }

    pub fn nav_state(&self) -> NavState {
        self.nav
    }

    pub fn is_done(&self) -> bool {
        self.state.done
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    /// Feed a raw odometer reading; returns the updated position.
    pub fn track(&mut self, raw_distance: f32) -> Position {
        if !self.state.done {
            self.state.position.y_mm = self.tracker.update(raw_distance);
        }
        self.state.position
    }

    /// Start the current column at `raw_distance` if its baseline is still
    /// pending. Called once the robot is stationary after a turn maneuver.
    pub fn mark_column_start(&mut self, raw_distance: f32) -> bool {
        !self.state.done && self.tracker.latch(raw_distance)
    }

    /// Decide what to do with the robot at `position`.
    ///
    /// Only `position.y_mm` is taken from the caller; the lateral offset is
    /// the navigator's own bookkeeping.
    pub fn on_tick(
        &mut self,
        position: Position,
        surface: &SurfaceArea,
        robot_width_mm: f32,
    ) -> Decision {
        if self.nav == NavState::Finished {
            return Decision::Finish;
        }
        self.state.position.y_mm = position.y_mm;
        if position.y_mm < surface.height_mm {
            return Decision::Continue;
        }

        self.transition(NavState::BoundaryCheck);
        let column = self.state.current_column;
        let new_x = self.state.position.x_mm + robot_width_mm;
        self.state.position.x_mm = new_x;
        let max_columns = surface.max_columns(robot_width_mm);

        // Both bounds are independent: the column count guards against
        // lateral drift when the width is not an exact multiple.
        if new_x >= surface.width_mm || column.index() >= max_columns {
            self.state.done = true;
            self.transition(NavState::Finished);
            tracing::info!(
                column = column.index(),
                x_mm = new_x,
                max_columns,
                "coverage finished"
            );
            return Decision::Finish;
        }

        self.transition(NavState::Turning);
        let plan = TurnPlan {
            direction: column.turn_direction(),
            lateral_mm: robot_width_mm,
            from_column: column.index(),
        };
        self.state.current_column = column.next();
        self.tracker.reset();
        self.state.position.y_mm = 0.0;
        tracing::debug!(
            from = column.index(),
            to = self.state.current_column.index(),
            direction = ?plan.direction,
            x_mm = new_x,
            "column boundary"
        );
        self.transition(NavState::Scanning);
        Decision::Turn(plan)
    }

    fn transition(&mut self, next: NavState) {
        tracing::trace!(from = ?self.nav, to = ?next, "nav transition");
        self.nav = next;
    }
}
