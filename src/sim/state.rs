//! Race state and pod kinematics
//!
//! All state that persists across ticks lives here. Checkpoints are
//! immutable once created; pods are mutated every tick by action
//! application, the scheduler, and finalization.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::normalize_heading;

/// A static circular waypoint.
///
/// Pods pass checkpoints in index order, cyclically, once per lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u32,
    pub pos: DVec2,
}

impl Checkpoint {
    pub fn new(id: u32, pos: DVec2) -> Self {
        Self { id, pos }
    }

    /// Capability view for the collision predicate.
    #[inline]
    pub fn body(&self) -> Body {
        Body::Checkpoint {
            pos: self.pos,
            radius: CHECKPOINT_RADIUS,
        }
    }
}

/// A moving circular body as the collision predicate sees it.
///
/// Checkpoints are immovable (zero effective velocity) and collide at
/// their own radius alone; pods collide at summed radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    Pod { pos: DVec2, vel: DVec2, radius: f64 },
    Checkpoint { pos: DVec2, radius: f64 },
}

impl Body {
    #[inline]
    pub fn pos(&self) -> DVec2 {
        match *self {
            Body::Pod { pos, .. } | Body::Checkpoint { pos, .. } => pos,
        }
    }

    #[inline]
    pub fn vel(&self) -> DVec2 {
        match *self {
            Body::Pod { vel, .. } => vel,
            Body::Checkpoint { .. } => DVec2::ZERO,
        }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        match *self {
            Body::Pod { radius, .. } | Body::Checkpoint { radius, .. } => radius,
        }
    }
}

/// Thrust directive of a single action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Thrust {
    /// Literal engine thrust; expected 0-200 but not validated here
    Value(f64),
    /// Raise the shield: zero thrust, 10x mass for the collision window
    Shield,
    /// One-time high thrust
    Boost,
}

/// External command for one pod for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Absolute point the pod steers toward
    pub target: DVec2,
    pub thrust: Thrust,
}

/// Wire-level pod record: `x y vx vy angle next_cp shield boost_used`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PodSnapshot {
    pub x: i64,
    pub y: i64,
    pub vx: i64,
    pub vy: i64,
    pub angle: f64,
    pub next_cp: usize,
    pub shield: u8,
    pub boosted: bool,
}

/// A player-controlled vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub id: u32,
    pub pos: DVec2,
    pub vel: DVec2,
    /// Facing in degrees, normalized to [0, 360)
    pub angle: f64,
    /// Index of the next checkpoint to reach (cyclic over the route)
    pub next_cp: usize,
    /// Checkpoints passed so far this race
    pub checked: u32,
    /// Ticks remaining before elimination without a checkpoint pass
    pub timeout: i32,
    /// Shield countdown; 4 right after activation
    pub shield: u8,
    /// One-time boost still available
    pub has_boost: bool,
}

impl Pod {
    pub fn new(id: u32, pos: DVec2, angle: f64, next_cp: usize) -> Self {
        Self {
            id,
            pos,
            vel: DVec2::ZERO,
            angle: normalize_heading(angle),
            next_cp,
            checked: 0,
            timeout: TIMEOUT_TICKS,
            shield: 0,
            has_boost: true,
        }
    }

    /// Re-create a pod from its wire record.
    pub fn from_snapshot(id: u32, snap: &PodSnapshot) -> Self {
        Self {
            id,
            pos: DVec2::new(snap.x as f64, snap.y as f64),
            vel: DVec2::new(snap.vx as f64, snap.vy as f64),
            angle: normalize_heading(snap.angle),
            next_cp: snap.next_cp,
            checked: 0,
            timeout: TIMEOUT_TICKS,
            shield: snap.shield,
            has_boost: !snap.boosted,
        }
    }

    /// Wire record of the current state; positions and velocities are
    /// integral after finalization.
    pub fn snapshot(&self) -> PodSnapshot {
        PodSnapshot {
            x: self.pos.x as i64,
            y: self.pos.y as i64,
            vx: self.vel.x as i64,
            vy: self.vel.y as i64,
            angle: self.angle,
            next_cp: self.next_cp,
            shield: self.shield,
            boosted: !self.has_boost,
        }
    }

    /// Capability view for the collision predicate.
    #[inline]
    pub fn body(&self) -> Body {
        Body::Pod {
            pos: self.pos,
            vel: self.vel,
            radius: POD_RADIUS,
        }
    }

    /// Collision mass: 10x while the shield was raised this very tick.
    #[inline]
    pub fn mass(&self) -> f64 {
        if self.shield == SHIELD_TICKS {
            SHIELD_MASS
        } else {
            1.0
        }
    }

    /// Absolute heading from this pod to `p`, degrees in [0, 360).
    ///
    /// Degenerate target (`p` at the pod's own position) keeps the
    /// current facing.
    pub fn angle_to(&self, p: DVec2) -> f64 {
        let d = self.pos.distance(p);
        if d == 0.0 {
            return self.angle;
        }

        let dx = (p.x - self.pos.x) / d;
        let dy = (p.y - self.pos.y) / d;

        // dx can drift a hair outside acos' domain after the division.
        let mut a = dx.clamp(-1.0, 1.0).acos().to_degrees();
        if dy < 0.0 {
            a = 360.0 - a;
        }
        a
    }

    /// Signed shortest rotation toward `p`, degrees; positive is clockwise
    /// in screen coordinates (y down).
    pub fn angle_diff(&self, p: DVec2) -> f64 {
        let a = self.angle_to(p);
        let right = if self.angle <= a {
            a - self.angle
        } else {
            360.0 - self.angle + a
        };
        let left = if self.angle >= a {
            self.angle - a
        } else {
            self.angle + 360.0 - a
        };

        if right < left { right } else { -left }
    }

    /// Turn toward `p`, clamped to the per-tick rotation limit.
    pub fn rotate_toward(&mut self, p: DVec2) {
        let a = self.angle_diff(p).clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG);
        self.angle = normalize_heading(self.angle + a);
    }

    /// Accelerate along the current facing. No-op while shielded.
    pub fn apply_thrust(&mut self, thrust: f64) {
        if self.shield > 0 {
            return;
        }

        let ra = self.angle.to_radians();
        self.vel.x += ra.cos() * thrust;
        self.vel.y += ra.sin() * thrust;
    }

    /// Apply one turn's command: rotate, then thrust.
    ///
    /// Boost always consumes the flag and fires, even if already used;
    /// validation is the caller's concern.
    pub fn apply_action(&mut self, action: &Action) {
        self.rotate_toward(action.target);

        let thrust = match action.thrust {
            Thrust::Boost => {
                self.has_boost = false;
                BOOST_THRUST
            }
            Thrust::Shield => {
                self.shield = SHIELD_TICKS;
                0.0
            }
            Thrust::Value(v) => v,
        };

        self.apply_thrust(thrust);
    }

    /// Linear motion over `dt`, a fraction of one tick.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.pos += self.vel * dt;
    }

    /// Credit the pod's next checkpoint. No velocity change.
    pub fn pass_checkpoint(&mut self, checkpoint_count: usize) {
        self.checked += 1;
        self.timeout = TIMEOUT_TICKS;
        self.next_cp = (self.next_cp + 1) % checkpoint_count;
        log::debug!(
            "pod {} passed checkpoint, {} total, next is {}",
            self.id,
            self.checked,
            self.next_cp
        );
    }

    /// End-of-tick bookkeeping: snap position to integers (ties away from
    /// zero), damp and truncate velocity, run the timeout and shield
    /// countdowns, and latch the race-complete sentinel.
    pub fn finalize(&mut self, checkpoint_goal: u32) {
        self.pos = DVec2::new(self.pos.x.round(), self.pos.y.round());
        self.vel = DVec2::new(
            (self.vel.x * FRICTION).trunc(),
            (self.vel.y * FRICTION).trunc(),
        );
        self.timeout -= 1;
        self.shield = self.shield.saturating_sub(1);

        if self.checked >= checkpoint_goal {
            self.next_cp = 0;
            self.checked = checkpoint_goal;
        }
    }

    /// Whether the pod has passed every checkpoint of every lap.
    #[inline]
    pub fn has_finished(&self, checkpoint_goal: u32) -> bool {
        self.checked >= checkpoint_goal
    }

    /// Whether the pod ran out of ticks between checkpoints.
    #[inline]
    pub fn is_timed_out(&self) -> bool {
        self.timeout <= 0
    }
}

/// Complete race state (deterministic, serializable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    /// Full circuits of the route to complete
    pub laps: u32,
    /// The route, in pass order; never mutated after creation
    pub checkpoints: Vec<Checkpoint>,
    /// Racing pods, fixed order
    pub pods: Vec<Pod>,
    /// Ticks simulated so far
    pub turn: u64,
}

impl RaceState {
    pub fn new(laps: u32, checkpoints: Vec<Checkpoint>) -> Self {
        log::info!(
            "race created: {} laps over {} checkpoints",
            laps,
            checkpoints.len()
        );
        Self {
            laps,
            checkpoints,
            pods: Vec::new(),
            turn: 0,
        }
    }

    /// Total checkpoint passes required to finish the race.
    #[inline]
    pub fn checkpoint_goal(&self) -> u32 {
        self.checkpoints.len() as u32 * self.laps
    }

    /// Seed a pod from its wire record; ids follow insertion order.
    pub fn spawn_pod(&mut self, snap: &PodSnapshot) {
        let id = self.pods.len() as u32;
        self.pods.push(Pod::from_snapshot(id, snap));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pod_at(pos: DVec2, angle: f64) -> Pod {
        Pod::new(0, pos, angle, 0)
    }

    #[test]
    fn test_angle_to_cardinals() {
        let pod = pod_at(DVec2::ZERO, 0.0);
        assert_eq!(pod.angle_to(DVec2::new(1000.0, 0.0)), 0.0);
        assert!((pod.angle_to(DVec2::new(0.0, 1000.0)) - 90.0).abs() < 1e-9);
        assert!((pod.angle_to(DVec2::new(-1000.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((pod.angle_to(DVec2::new(0.0, -1000.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_to_degenerate_target_keeps_facing() {
        let pod = pod_at(DVec2::new(50.0, 50.0), 123.0);
        assert_eq!(pod.angle_to(DVec2::new(50.0, 50.0)), 123.0);
    }

    #[test]
    fn test_rotation_clamped_to_18_degrees() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.rotate_toward(DVec2::new(0.0, 1000.0)); // 90 degrees away
        assert_eq!(pod.angle, 18.0);

        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.rotate_toward(DVec2::new(0.0, -1000.0)); // shorter to turn left
        assert_eq!(pod.angle, 342.0);
    }

    #[test]
    fn test_rotation_small_diff_not_clamped() {
        let mut pod = pod_at(DVec2::ZERO, 85.0);
        pod.rotate_toward(DVec2::new(0.0, 1000.0)); // 5 degrees away
        assert!((pod.angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_wraps_around_zero() {
        let mut pod = pod_at(DVec2::ZERO, 350.0);
        pod.rotate_toward(DVec2::new(1000.0, 500.0)); // target ~26.6 deg, right turn
        assert_eq!(pod.angle, 8.0);
    }

    #[test]
    fn test_thrust_along_facing() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.apply_thrust(100.0);
        assert_eq!(pod.vel, DVec2::new(100.0, 0.0));

        let mut pod = pod_at(DVec2::ZERO, 90.0);
        pod.apply_thrust(100.0);
        assert!(pod.vel.x.abs() < 1e-10);
        assert!((pod.vel.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_thrust_blocked_while_shielded() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.shield = 2;
        pod.apply_thrust(100.0);
        assert_eq!(pod.vel, DVec2::ZERO);
    }

    #[test]
    fn test_shield_action_blocks_thrust_same_tick() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.apply_action(&Action {
            target: DVec2::new(1000.0, 0.0),
            thrust: Thrust::Shield,
        });
        assert_eq!(pod.shield, SHIELD_TICKS);
        assert_eq!(pod.vel, DVec2::ZERO);
    }

    #[test]
    fn test_boost_consumed_and_permissive_reuse() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        let boost = Action {
            target: DVec2::new(1000.0, 0.0),
            thrust: Thrust::Boost,
        };

        pod.apply_action(&boost);
        assert!(!pod.has_boost);
        assert_eq!(pod.vel.x, BOOST_THRUST);

        // A second boost still fires; availability is not validated here.
        pod.apply_action(&boost);
        assert!(!pod.has_boost);
        assert_eq!(pod.vel.x, 2.0 * BOOST_THRUST);
    }

    #[test]
    fn test_finalize_rounds_half_away_from_zero() {
        let mut pod = pod_at(DVec2::new(10.5, -10.5), 0.0);
        pod.finalize(u32::MAX);
        assert_eq!(pod.pos, DVec2::new(11.0, -11.0));
    }

    #[test]
    fn test_finalize_damps_and_truncates_velocity() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.vel = DVec2::new(100.0, -10.0);
        pod.finalize(u32::MAX);
        // 85.0 exactly; -8.5 truncates toward zero.
        assert_eq!(pod.vel, DVec2::new(85.0, -8.0));
    }

    #[test]
    fn test_finalize_countdowns() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.shield = SHIELD_TICKS;
        pod.finalize(u32::MAX);
        assert_eq!(pod.timeout, TIMEOUT_TICKS - 1);
        assert_eq!(pod.shield, SHIELD_TICKS - 1);

        pod.shield = 0;
        pod.finalize(u32::MAX);
        assert_eq!(pod.shield, 0);
    }

    #[test]
    fn test_finalize_race_complete_sentinel() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.next_cp = 2;
        pod.checked = 6;
        pod.finalize(6);
        assert_eq!(pod.next_cp, 0);
        assert_eq!(pod.checked, 6);
        assert!(pod.has_finished(6));
    }

    #[test]
    fn test_pass_checkpoint_wraps_route() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.next_cp = 2;
        pod.timeout = 40;
        pod.pass_checkpoint(3);
        assert_eq!(pod.checked, 1);
        assert_eq!(pod.timeout, TIMEOUT_TICKS);
        assert_eq!(pod.next_cp, 0);
    }

    #[test]
    fn test_timeout_elimination_predicate() {
        let mut pod = pod_at(DVec2::ZERO, 0.0);
        pod.timeout = 1;
        assert!(!pod.is_timed_out());
        pod.finalize(u32::MAX);
        assert!(pod.is_timed_out());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snap = PodSnapshot {
            x: 1200,
            y: -340,
            vx: 55,
            vy: -8,
            angle: 271.0,
            next_cp: 2,
            shield: 3,
            boosted: true,
        };
        let pod = Pod::from_snapshot(7, &snap);
        assert_eq!(pod.snapshot(), snap);
        assert!(!pod.has_boost);
    }

    #[test]
    fn test_checkpoint_goal() {
        let race = RaceState::new(
            3,
            vec![
                Checkpoint::new(0, DVec2::ZERO),
                Checkpoint::new(1, DVec2::new(5000.0, 0.0)),
            ],
        );
        assert_eq!(race.checkpoint_goal(), 6);
    }

    proptest! {
        /// Repeated damping never increases a component's magnitude and
        /// eventually parks the pod.
        #[test]
        fn prop_damping_monotonic(vx in -2000.0..2000.0f64, vy in -2000.0..2000.0f64) {
            let mut pod = pod_at(DVec2::ZERO, 0.0);
            pod.vel = DVec2::new(vx, vy);

            for _ in 0..200 {
                let before = pod.vel;
                pod.finalize(u32::MAX);
                prop_assert!(pod.vel.x.abs() <= before.x.abs());
                prop_assert!(pod.vel.y.abs() <= before.y.abs());
            }
            prop_assert_eq!(pod.vel, DVec2::ZERO);
        }

        /// The facing invariant survives arbitrary rotation sequences.
        #[test]
        fn prop_angle_stays_normalized(
            start in 0.0..360.0f64,
            tx in -20000.0..20000.0f64,
            ty in -20000.0..20000.0f64,
        ) {
            let mut pod = pod_at(DVec2::ZERO, start);
            for _ in 0..30 {
                pod.rotate_toward(DVec2::new(tx, ty));
                prop_assert!(pod.angle >= 0.0 && pod.angle < 360.0);
            }
        }
    }
}
