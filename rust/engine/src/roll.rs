//! Per-die roll controller.
//!
//! A [`RollController`] launches its die, watches it every simulation tick
//! until it comes to rest and then reads the face showing up. While in flight
//! it heals the physical edge cases that would otherwise stall a round: dice
//! knocked off the table are put back, dice resting on top of another are
//! nudged off, and dice balanced on an edge receive a corrective torque
//! toward the nearest face. Dice that are not subject to physics (held dice,
//! dice parked between rounds) are eased toward fixed poses instead.

use rand::Rng;
use tracing::{debug, warn};

use crate::dice::{DEFAULT_FACE, Face};
use crate::faces::{WORLD_UP, nearest_face_axis, orientation_for, resolve_face, snap_to_nearest_face};
use crate::impulse::{RollRequest, calculate_impulse};
use crate::math::{Quat, Vec3};
use crate::physics::{BodyState, DieBody, Pose};

/// Edge length of a die.
pub const DIE_SIZE: f32 = 0.8;
/// Half the width and depth of the playing surface.
pub const TABLE_HALF_EXTENT: f32 = 3.0;
/// Maximum height of a die lying directly on the table.
pub const STACK_HEIGHT: f32 = DIE_SIZE * 1.2;

/// Thresholds and gains for the settle watchdog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollTuning {
    /// Extra room past the table edge before a die counts as lost
    pub bounds_margin: f32,
    pub floor_threshold: f32,
    pub recovery_height: f32,
    pub recovery_speed: f32,
    /// Below this linear speed an elevated die is treated as stacked
    pub stack_speed: f32,
    pub stack_nudge: f32,
    pub slow_linear: f32,
    pub slow_angular: f32,
    /// Alignment with world up above which no corrective torque is applied
    pub snap_alignment: f32,
    pub corrective_gain: f32,
    pub settle_linear: f32,
    pub settle_angular: f32,
    /// Seconds in flight before the die is forced onto its nearest face
    pub flight_failsafe: f32,
    /// Pose transition progress per second
    pub transition_speed: f32,
}

impl Default for RollTuning {
    fn default() -> Self {
        Self {
            bounds_margin: 1.0,
            floor_threshold: -1.0,
            recovery_height: 2.0,
            recovery_speed: 1.0,
            stack_speed: 1.0,
            stack_nudge: 1.5,
            slow_linear: 2.0,
            slow_angular: 3.0,
            snap_alignment: 0.99,
            corrective_gain: 2.0,
            settle_linear: 0.1,
            settle_angular: 0.1,
            flight_failsafe: 8.0,
            transition_speed: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollState {
    /// Never rolled since the controller was created
    Idle,
    /// Roll requested; launches on the next tick
    Armed,
    InFlight,
    Settled,
    Held,
    /// Kinematically placed in the tray or on the display line
    Parked,
}

/// Where a die not under physics should sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Wherever it came to rest after its last roll
    Table,
    Tray,
    Display,
}

pub fn tray_position(id: usize) -> Vec3 {
    Vec3::new((id as f32 - 2.0) * 0.9, 0.5, 2.2)
}

pub fn display_position(id: usize) -> Vec3 {
    Vec3::new((id as f32 - 2.0) * 0.9, DIE_SIZE / 2.0, 1.5)
}

/// Pose shown between rounds: on the display line with the default face up.
pub fn display_pose(id: usize) -> Pose {
    Pose::new(display_position(id), orientation_for(DEFAULT_FACE))
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PoseTransition {
    /// Captured from the body on the first tick of the transition
    from: Option<Pose>,
    progress: f32,
}

impl PoseTransition {
    fn start() -> Self {
        Self {
            from: None,
            progress: 0.0,
        }
    }
}

fn pose_of(state: &BodyState) -> Pose {
    Pose::new(state.position, state.orientation)
}

#[derive(Debug, Clone)]
pub struct RollController {
    id: usize,
    state: RollState,
    placement: Placement,
    request: RollRequest,
    flight_time: f32,
    rest: Option<Pose>,
    transition: Option<PoseTransition>,
    tuning: RollTuning,
}

impl RollController {
    pub fn new(id: usize) -> Self {
        Self::with_tuning(id, RollTuning::default())
    }

    pub fn with_tuning(id: usize, tuning: RollTuning) -> Self {
        Self {
            id,
            state: RollState::Idle,
            placement: Placement::Display,
            request: RollRequest::default(),
            flight_time: 0.0,
            rest: None,
            transition: None,
            tuning,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> RollState {
        self.state
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn tuning(&self) -> &RollTuning {
        &self.tuning
    }

    /// True from the roll request until the die settles.
    pub fn is_rolling(&self) -> bool {
        matches!(self.state, RollState::Armed | RollState::InFlight)
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Pose captured when the die last came to rest.
    pub fn rest_pose(&self) -> Option<Pose> {
        self.rest
    }

    pub fn flight_time(&self) -> f32 {
        self.flight_time
    }

    /// Requests a roll. Held dice and dice already rolling ignore the request.
    pub fn arm(&mut self, request: RollRequest) -> bool {
        if matches!(
            self.state,
            RollState::Held | RollState::Armed | RollState::InFlight
        ) {
            return false;
        }
        self.request = request;
        self.state = RollState::Armed;
        self.transition = None;
        true
    }

    /// Moves a settled die into the tray, or a held die back to where it rested.
    pub fn set_held(&mut self, held: bool) {
        match (held, self.state) {
            (true, RollState::Settled) => {
                self.state = RollState::Held;
                self.placement = Placement::Tray;
                self.transition = Some(PoseTransition::start());
            }
            (false, RollState::Held) => {
                self.state = RollState::Settled;
                self.placement = Placement::Table;
                self.transition = Some(PoseTransition::start());
            }
            _ => {}
        }
    }

    /// Sends a settled die to the tray after the last roll of a round.
    pub fn send_to_tray(&mut self) {
        if self.state == RollState::Settled {
            self.state = RollState::Parked;
            self.placement = Placement::Tray;
            self.transition = Some(PoseTransition::start());
        }
    }

    /// Parks the die on the display line, abandoning any roll in progress.
    pub fn park(&mut self) {
        self.state = RollState::Parked;
        self.placement = Placement::Display;
        self.transition = None;
        self.rest = None;
        self.flight_time = 0.0;
    }

    /// Advances the controller by one simulation tick.
    ///
    /// Call after the physics engine has stepped. Returns the face read when
    /// the die settles during this tick.
    pub fn tick<B, R>(&mut self, body: &mut B, dt: f32, rng: &mut R) -> Option<Face>
    where
        B: DieBody + ?Sized,
        R: Rng + ?Sized,
    {
        match self.state {
            RollState::Armed => {
                self.launch(body, rng);
                None
            }
            RollState::InFlight => self.watch(body, dt, rng),
            _ => {
                self.drive_pose(body, dt);
                None
            }
        }
    }

    fn launch<B, R>(&mut self, body: &mut B, rng: &mut R)
    where
        B: DieBody + ?Sized,
        R: Rng + ?Sized,
    {
        let impulse = calculate_impulse(&self.request, self.id, rng);
        let tau = std::f32::consts::TAU;
        let orientation = Quat::from_euler_xyz(
            rng.random::<f32>() * tau,
            rng.random::<f32>() * tau,
            rng.random::<f32>() * tau,
        );
        body.wake();
        body.place(Pose::new(impulse.start_position, orientation));
        body.apply_linear_impulse(impulse.linear);
        body.apply_angular_impulse(impulse.angular);
        body.wake();

        self.state = RollState::InFlight;
        self.placement = Placement::Table;
        self.flight_time = 0.0;
        self.rest = None;
        debug!(die = self.id, intensity = self.request.clamped_intensity(), "die launched");
    }

    fn watch<B, R>(&mut self, body: &mut B, dt: f32, rng: &mut R) -> Option<Face>
    where
        B: DieBody + ?Sized,
        R: Rng + ?Sized,
    {
        let tune = self.tuning;
        self.flight_time += dt.max(0.0);
        let s = body.state();
        let lin = s.linear_speed();
        let ang = s.angular_speed();
        let pos = s.position;

        let limit = TABLE_HALF_EXTENT + tune.bounds_margin;
        if pos.y < tune.floor_threshold || pos.x.abs() > limit || pos.z.abs() > limit {
            let inner = TABLE_HALF_EXTENT - DIE_SIZE;
            let safe = Vec3::new(
                pos.x.clamp(-inner, inner),
                tune.recovery_height,
                pos.z.clamp(-inner, inner),
            );
            debug!(die = self.id, x = pos.x, y = pos.y, z = pos.z, "die out of bounds, recovering");
            body.set_position(safe);
            body.set_linear_velocity(Vec3::new(0.0, -tune.recovery_speed, 0.0));
            body.wake();
            return None;
        }

        if self.flight_time >= tune.flight_failsafe {
            warn!(
                die = self.id,
                seconds = self.flight_time,
                "die did not settle in time, snapping to nearest face"
            );
            let orientation = snap_to_nearest_face(s.orientation);
            let inner = TABLE_HALF_EXTENT - DIE_SIZE;
            body.place(Pose::new(
                Vec3::new(
                    pos.x.clamp(-inner, inner),
                    DIE_SIZE / 2.0,
                    pos.z.clamp(-inner, inner),
                ),
                orientation,
            ));
            let rested = body.state();
            return Some(self.settle(&rested));
        }

        if pos.y > STACK_HEIGHT && lin < tune.stack_speed {
            let nudge = Vec3::new(
                rng.random_range(-tune.stack_nudge..=tune.stack_nudge),
                0.0,
                rng.random_range(-tune.stack_nudge..=tune.stack_nudge),
            );
            debug!(die = self.id, height = pos.y, "die resting on another, nudging");
            body.apply_linear_impulse(nudge);
            return None;
        }

        if lin < tune.slow_linear && ang < tune.slow_angular {
            let (axis, alignment) = nearest_face_axis(s.orientation);
            if alignment < tune.snap_alignment {
                let up_local = s.orientation.inverse().rotate(WORLD_UP);
                let torque = s
                    .orientation
                    .rotate(axis.cross(up_local))
                    * ((1.0 - alignment) * tune.corrective_gain);
                body.apply_angular_impulse(torque);
                return None;
            }
        }

        if lin < tune.settle_linear && ang < tune.settle_angular && pos.y <= STACK_HEIGHT {
            return Some(self.settle(&s));
        }
        None
    }

    fn settle(&mut self, state: &BodyState) -> Face {
        let face = resolve_face(state.orientation);
        self.rest = Some(pose_of(state));
        self.state = RollState::Settled;
        self.placement = Placement::Table;
        debug!(die = self.id, face = %face, seconds = self.flight_time, "die settled");
        face
    }

    fn target_pose(&self) -> Option<Pose> {
        match self.placement {
            Placement::Display => Some(display_pose(self.id)),
            Placement::Tray => {
                let orientation = self.rest.map(|p| p.orientation).unwrap_or(Quat::IDENTITY);
                Some(Pose::new(tray_position(self.id), orientation))
            }
            Placement::Table => self.rest,
        }
    }

    fn drive_pose<B: DieBody + ?Sized>(&mut self, body: &mut B, dt: f32) {
        let Some(target) = self.target_pose() else {
            return;
        };
        if let Some(transition) = self.transition.as_mut() {
            let from = *transition.from.get_or_insert_with(|| pose_of(&body.state()));
            transition.progress = (transition.progress + dt * self.tuning.transition_speed).min(1.0);
            let t = ease_in_out_cubic(transition.progress);
            body.place(Pose::new(
                from.position.lerp(target.position, t),
                from.orientation.slerp(target.orientation, t),
            ));
            if transition.progress >= 1.0 {
                self.transition = None;
            }
            return;
        }
        if self.placement != Placement::Table {
            body.place(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBody;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const DT: f32 = 1.0 / 60.0;

    fn run_until_settled(
        ctl: &mut RollController,
        body: &mut HeadlessBody,
        rng: &mut ChaCha20Rng,
        max_ticks: usize,
    ) -> Option<Face> {
        for _ in 0..max_ticks {
            body.step(DT);
            if let Some(face) = ctl.tick(body, DT, rng) {
                return Some(face);
            }
        }
        None
    }

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn armed_die_launches_then_settles_on_a_face() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut ctl = RollController::new(2);
        let mut body = HeadlessBody::new(Vec3::ZERO);
        assert!(ctl.arm(RollRequest::default()));
        assert_eq!(ctl.state(), RollState::Armed);

        let face = run_until_settled(&mut ctl, &mut body, &mut rng, 60 * 10);
        assert!(face.is_some());
        assert_eq!(ctl.state(), RollState::Settled);
        let rest = ctl.rest_pose().unwrap();
        assert_eq!(resolve_face(rest.orientation), face.unwrap());
        assert!(rest.position.y <= STACK_HEIGHT);
    }

    #[test]
    fn rolling_or_held_dice_refuse_to_arm() {
        let mut ctl = RollController::new(0);
        assert!(ctl.arm(RollRequest::default()));
        assert!(!ctl.arm(RollRequest::default()));

        let mut held = RollController::new(1);
        held.state = RollState::Settled;
        held.rest = Some(Pose::default());
        held.set_held(true);
        assert_eq!(held.state(), RollState::Held);
        assert!(!held.arm(RollRequest::default()));
    }

    #[test]
    fn lost_die_is_brought_back_over_the_table() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut ctl = RollController::new(0);
        ctl.state = RollState::InFlight;
        let mut body = HeadlessBody::new(Vec3::new(9.0, -4.0, -7.5));
        assert!(ctl.tick(&mut body, DT, &mut rng).is_none());
        let s = body.state();
        assert_eq!(s.position.y, 2.0);
        assert!(s.position.x.abs() <= TABLE_HALF_EXTENT);
        assert!(s.position.z.abs() <= TABLE_HALF_EXTENT);
        assert_eq!(s.linear_velocity, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(ctl.state(), RollState::InFlight);
    }

    #[test]
    fn stacked_die_gets_a_lateral_nudge() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut ctl = RollController::new(0);
        ctl.state = RollState::InFlight;
        let mut body = HeadlessBody::new(Vec3::new(0.0, DIE_SIZE * 1.5, 0.0));
        assert!(ctl.tick(&mut body, DT, &mut rng).is_none());
        let v = body.state().linear_velocity;
        assert_eq!(v.y, 0.0);
        assert!(v.x.abs() <= 1.5 && v.z.abs() <= 1.5);
        assert!(v.x != 0.0 || v.z != 0.0);
    }

    #[test]
    fn edge_balanced_die_receives_torque_toward_nearest_face() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut ctl = RollController::new(0);
        ctl.state = RollState::InFlight;
        let mut body = HeadlessBody::new(Vec3::new(0.0, DIE_SIZE / 2.0, 0.0));
        let tilt = Quat::from_axis_angle(Vec3::Z, 0.4);
        body.set_orientation(tilt);

        assert!(ctl.tick(&mut body, DT, &mut rng).is_none());
        let omega = body.state().angular_velocity;
        // Tilted about +Z away from +Y; the fix rotates back about -Z.
        assert!(omega.z < 0.0);
        assert_eq!(ctl.state(), RollState::InFlight);
    }

    #[test]
    fn tilted_resting_die_is_corrected_before_it_settles() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut ctl = RollController::new(0);
        ctl.state = RollState::InFlight;
        let mut body = HeadlessBody::new(Vec3::new(0.0, DIE_SIZE / 2.0, 0.0));
        body.set_orientation(Quat::from_axis_angle(Vec3::Z, 0.5));
        body.wake();

        let face = run_until_settled(&mut ctl, &mut body, &mut rng, 60 * 7);
        assert_eq!(face, Some(Face::Nine));
        let (_, alignment) = nearest_face_axis(ctl.rest_pose().unwrap().orientation);
        assert!(alignment >= 0.99);
    }

    #[test]
    fn failsafe_settles_a_die_that_never_rests() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut ctl = RollController::new(4);
        ctl.state = RollState::InFlight;
        let mut body = HeadlessBody::new(Vec3::new(0.0, 0.4, 0.0));
        let mut settled = None;
        for _ in 0..(60 * 9) {
            // keep it spinning forever
            body.set_angular_velocity(Vec3::new(0.0, 20.0, 0.0));
            if let Some(face) = ctl.tick(&mut body, DT, &mut rng) {
                settled = Some(face);
                break;
            }
        }
        assert!(settled.is_some());
        assert!(ctl.flight_time() >= 8.0 && ctl.flight_time() < 8.1);
        assert_eq!(body.state().angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn held_die_eases_into_the_tray_and_back() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let mut ctl = RollController::new(3);
        let rest = Pose::new(Vec3::new(1.0, DIE_SIZE / 2.0, -1.0), orientation_for(Face::King));
        ctl.state = RollState::Settled;
        ctl.rest = Some(rest);
        let mut body = HeadlessBody::new(rest.position);
        body.set_orientation(rest.orientation);

        ctl.set_held(true);
        ctl.tick(&mut body, 0.1, &mut rng);
        let mid = body.state().position;
        assert!(mid != rest.position && mid != tray_position(3));
        for _ in 0..10 {
            ctl.tick(&mut body, 0.1, &mut rng);
        }
        assert!(!ctl.is_transitioning());
        assert!((body.state().position - tray_position(3)).length() < 1e-5);
        assert_eq!(resolve_face(body.state().orientation), Face::King);

        ctl.set_held(false);
        for _ in 0..11 {
            ctl.tick(&mut body, 0.1, &mut rng);
        }
        assert_eq!(ctl.state(), RollState::Settled);
        assert!((body.state().position - rest.position).length() < 1e-5);
    }

    #[test]
    fn parked_die_sits_ace_up_on_the_display_line() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let mut ctl = RollController::new(0);
        ctl.arm(RollRequest::default());
        ctl.park();
        let mut body = HeadlessBody::new(Vec3::new(2.0, 3.0, 0.0));
        ctl.tick(&mut body, DT, &mut rng);
        assert_eq!(body.state().position, display_position(0));
        assert_eq!(resolve_face(body.state().orientation), Face::Ace);
        assert!(!ctl.is_rolling());
    }
}
