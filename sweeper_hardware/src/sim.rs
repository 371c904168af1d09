//! Simulated robot.
//!
//! Odometry is integrated from the commanded speed against the injected clock,
//! so on a [`ManualClock`](sweeper_traits::ManualClock) the robot only moves
//! when the control loop sleeps. Maneuvers (`straight`, `turn`) block for their
//! nominal duration by sleeping on the same clock.
//!
//! All handles share one state: clone the robot once per seam.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sweeper_traits::{
    AmountSensor, Clock, Drivetrain, Feedback, HwResult, Odometer, SignatureSensor,
};

use crate::error::HwError;

/// Feedback command as observed by the simulated speaker/light/screen.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEvent {
    AlertOn,
    AlertOff,
    Beep { frequency_hz: u32, duration: Duration },
    Display(String),
    ClearDisplay,
}

#[derive(Debug, Default)]
struct Faults {
    // Fail every odometer read after this many successful ones
    odometer_after: Option<u32>,
    // Fail this many upcoming odometer reads, then recover
    odometer_glitches: u32,
    sensors: bool,
    feedback: bool,
    drive: bool,
    // Refuse stop commands once this many have succeeded
    stop_after: Option<u32>,
}

struct SimState {
    clock: Arc<dyn Clock + Send + Sync>,
    moving: bool,
    speed_mm_s: f32,
    odometer_mm: f32,
    last_update: Instant,
    heading_deg: f32,
    maneuver_speed_mm_s: f32,
    turn_speed_deg_s: f32,
    turns: Vec<f32>,
    straights: Vec<f32>,
    stops: u32,
    odometer_reads: u32,
    samples: VecDeque<([f32; 3], f32)>,
    idle_sample: ([f32; 3], f32),
    feedback: Vec<FeedbackEvent>,
    faults: Faults,
}

impl SimState {
    fn integrate(&mut self) {
        let now = self.clock.now();
        if self.moving {
            let dt = now.saturating_duration_since(self.last_update).as_secs_f32();
            self.odometer_mm += self.speed_mm_s * dt;
        }
        self.last_update = now;
    }

    fn hold(&mut self) {
        self.integrate();
        self.moving = false;
    }

    fn block_for(&mut self, d: Duration) {
        self.clock.sleep(d);
        self.last_update = self.clock.now();
    }
}

/// Shared-state simulated robot implementing every hardware seam.
#[derive(Clone)]
pub struct SimRobot {
    state: Rc<RefCell<SimState>>,
}

impl SimRobot {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let now = clock.now();
        SimRobot {
            state: Rc::new(RefCell::new(SimState {
                clock,
                moving: false,
                speed_mm_s: 0.0,
                odometer_mm: 0.0,
                last_update: now,
                heading_deg: 0.0,
                maneuver_speed_mm_s: 110.0,
                turn_speed_deg_s: 90.0,
                turns: Vec::new(),
                straights: Vec::new(),
                stops: 0,
                odometer_reads: 0,
                samples: VecDeque::new(),
                idle_sample: ([0.0, 0.0, 0.0], 0.0),
                feedback: Vec::new(),
                faults: Faults::default(),
            })),
        }
    }

    /// Speeds used to time blocking maneuvers.
    pub fn with_maneuver_speeds(self, straight_mm_s: f32, turn_deg_s: f32) -> Self {
        {
            let mut s = self.state.borrow_mut();
            s.maneuver_speed_mm_s = straight_mm_s.max(f32::EPSILON);
            s.turn_speed_deg_s = turn_deg_s.max(f32::EPSILON);
        }
        self
    }

    /// Queue a sample returned by the next signature/amount read pair.
    /// The amount read consumes it.
    pub fn queue_sample(&self, signature: [f32; 3], amount: f32) {
        self.state
            .borrow_mut()
            .samples
            .push_back((signature, amount));
    }

    /// Sample reported when the queue is empty (clean water by default).
    pub fn set_idle_sample(&self, signature: [f32; 3], amount: f32) {
        self.state.borrow_mut().idle_sample = (signature, amount);
    }

    pub fn fail_odometer_after(&self, reads: u32) {
        self.state.borrow_mut().faults.odometer_after = Some(reads);
    }

    /// Fail the next `reads` odometer reads with a timeout, then recover.
    pub fn glitch_odometer(&self, reads: u32) {
        self.state.borrow_mut().faults.odometer_glitches = reads;
    }

    pub fn fail_sensors(&self, on: bool) {
        self.state.borrow_mut().faults.sensors = on;
    }

    pub fn fail_feedback(&self, on: bool) {
        self.state.borrow_mut().faults.feedback = on;
    }

    pub fn fail_drive(&self, on: bool) {
        self.state.borrow_mut().faults.drive = on;
    }

    pub fn fail_stop_after(&self, stops: u32) {
        self.state.borrow_mut().faults.stop_after = Some(stops);
    }

    pub fn is_moving(&self) -> bool {
        self.state.borrow().moving
    }

    pub fn odometer_mm(&self) -> f32 {
        let mut s = self.state.borrow_mut();
        s.integrate();
        s.odometer_mm
    }

    pub fn heading_deg(&self) -> f32 {
        self.state.borrow().heading_deg
    }

    /// Every in-place turn commanded so far, in degrees (clockwise positive).
    pub fn turns(&self) -> Vec<f32> {
        self.state.borrow().turns.clone()
    }

    pub fn straights(&self) -> Vec<f32> {
        self.state.borrow().straights.clone()
    }

    pub fn stop_count(&self) -> u32 {
        self.state.borrow().stops
    }

    pub fn feedback_events(&self) -> Vec<FeedbackEvent> {
        self.state.borrow().feedback.clone()
    }

    pub fn beep_count(&self) -> usize {
        self.state
            .borrow()
            .feedback
            .iter()
            .filter(|e| matches!(e, FeedbackEvent::Beep { .. }))
            .count()
    }

    fn feedback_event(&self, ev: FeedbackEvent) -> HwResult<()> {
        let mut s = self.state.borrow_mut();
        if s.faults.feedback {
            return Err(Box::new(HwError::Disconnected("feedback")));
        }
        tracing::trace!(?ev, "sim feedback");
        s.feedback.push(ev);
        Ok(())
    }
}

impl Drivetrain for SimRobot {
    fn drive(&mut self, speed_mm_s: f32, turn_rate_deg_s: f32) -> HwResult<()> {
        let mut s = self.state.borrow_mut();
        if s.faults.drive {
            return Err(Box::new(HwError::Motor("drive refused".into())));
        }
        s.integrate();
        s.moving = true;
        s.speed_mm_s = speed_mm_s;
        tracing::trace!(speed_mm_s, turn_rate_deg_s, "sim drive");
        Ok(())
    }

    fn straight(&mut self, distance_mm: f32) -> HwResult<()> {
        let mut s = self.state.borrow_mut();
        if s.faults.drive {
            return Err(Box::new(HwError::Motor("straight refused".into())));
        }
        s.hold();
        s.odometer_mm += distance_mm.abs();
        s.straights.push(distance_mm);
        let secs = distance_mm.abs() / s.maneuver_speed_mm_s;
        s.block_for(Duration::from_secs_f32(secs));
        Ok(())
    }

    fn turn(&mut self, angle_deg: f32) -> HwResult<()> {
        let mut s = self.state.borrow_mut();
        if s.faults.drive {
            return Err(Box::new(HwError::Motor("turn refused".into())));
        }
        s.hold();
        s.heading_deg = (s.heading_deg + angle_deg).rem_euclid(360.0);
        s.turns.push(angle_deg);
        let secs = angle_deg.abs() / s.turn_speed_deg_s;
        s.block_for(Duration::from_secs_f32(secs));
        Ok(())
    }

    fn stop(&mut self) -> HwResult<()> {
        let mut s = self.state.borrow_mut();
        if let Some(limit) = s.faults.stop_after
            && s.stops >= limit
        {
            return Err(Box::new(HwError::Motor("stop refused".into())));
        }
        s.hold();
        s.stops += 1;
        Ok(())
    }
}

impl Odometer for SimRobot {
    fn distance(&mut self) -> HwResult<f32> {
        let mut s = self.state.borrow_mut();
        if let Some(limit) = s.faults.odometer_after
            && s.odometer_reads >= limit
        {
            return Err(Box::new(HwError::Disconnected("odometer")));
        }
        if s.faults.odometer_glitches > 0 {
            s.faults.odometer_glitches -= 1;
            return Err(Box::new(HwError::Timeout));
        }
        s.odometer_reads += 1;
        s.integrate();
        Ok(s.odometer_mm)
    }
}

impl SignatureSensor for SimRobot {
    fn signature(&mut self) -> HwResult<[f32; 3]> {
        let s = self.state.borrow();
        if s.faults.sensors {
            return Err(Box::new(HwError::Timeout));
        }
        Ok(s.samples.front().copied().unwrap_or(s.idle_sample).0)
    }
}

impl AmountSensor for SimRobot {
    fn amount(&mut self) -> HwResult<f32> {
        let mut s = self.state.borrow_mut();
        if s.faults.sensors {
            return Err(Box::new(HwError::Timeout));
        }
        let idle = s.idle_sample;
        Ok(s.samples.pop_front().unwrap_or(idle).1)
    }
}

impl Feedback for SimRobot {
    fn alert_on(&mut self) -> HwResult<()> {
        self.feedback_event(FeedbackEvent::AlertOn)
    }

    fn alert_off(&mut self) -> HwResult<()> {
        self.feedback_event(FeedbackEvent::AlertOff)
    }

    fn beep(&mut self, frequency_hz: u32, duration: Duration) -> HwResult<()> {
        self.feedback_event(FeedbackEvent::Beep {
            frequency_hz,
            duration,
        })
    }

    fn display(&mut self, message: &str) -> HwResult<()> {
        tracing::info!(message, "sim display");
        self.feedback_event(FeedbackEvent::Display(message.to_string()))
    }

    fn clear_display(&mut self) -> HwResult<()> {
        self.feedback_event(FeedbackEvent::ClearDisplay)
    }
}
