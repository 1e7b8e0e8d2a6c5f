//! Pairwise time-of-impact detection and impulse response
//!
//! The core of the simulator: given two bodies moving at constant
//! velocity over the remaining sub-interval, find the exact fraction of
//! that interval at which their boundaries first touch, via closed-form
//! relative-motion geometry rather than stepped approximation.

use glam::DVec2;

use super::geom::closest_point_on_line;
use super::state::{Body, Pod};
use crate::consts::MIN_IMPULSE;

/// Which pair of bodies collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Two pods, by index into the race's pod list
    Pods(usize, usize),
    /// A pod reaching its next checkpoint
    Checkpoint(usize),
}

/// An imminent collision; consumed by the scheduler within the same
/// sub-step that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub kind: CollisionKind,
    /// Fraction of the current remaining sub-interval at first touch
    pub t: f64,
}

/// Squared distance between centers at which `a` and `b` count as
/// touching.
///
/// Against a checkpoint only the checkpoint's own radius matters: the pod
/// has to reach inside the ring, not merely graze it.
fn contact_radius_sq(a: &Body, b: &Body) -> f64 {
    match *b {
        Body::Checkpoint { radius, .. } => radius * radius,
        Body::Pod { radius, .. } => {
            let r = a.radius() + radius;
            r * r
        }
    }
}

/// Fraction of the remaining sub-interval at which `a` and `b` first
/// touch, or `None` if they do not within it.
///
/// Works in `a`'s reference frame: project the origin onto the relative
/// trajectory, back the closest point up by the chord half-length to the
/// first-touch point, and convert that distance to a time fraction.
pub fn time_of_impact(a: &Body, b: &Body) -> Option<f64> {
    // No relative motion means no future touching beyond this instant.
    // This also keeps the divisions below away from zero.
    if a.vel() == b.vel() {
        return None;
    }

    let myp = a.pos() - b.pos();
    let dv = a.vel() - b.vel();
    let p = closest_point_on_line(DVec2::ZERO, myp, myp + dv);

    let pdst = p.length_squared();
    let mypdst = myp.distance_squared(p);
    let sr2 = contact_radius_sq(a, b);

    // Closest approach never comes within contact range.
    if pdst >= sr2 {
        return None;
    }

    // Back up along the relative velocity by the chord half-length to the
    // first point of contact.
    let speed = dv.length();
    let backup = (sr2 - pdst).sqrt();
    let p = DVec2::new(p.x - backup * dv.x / speed, p.y - backup * dv.y / speed);

    // The contact point lies behind the start of the trajectory.
    if myp.distance_squared(p) > mypdst {
        return None;
    }

    let dist = myp.distance(p);

    // First touch falls beyond this sub-interval.
    if dist > speed {
        return None;
    }

    Some(dist / speed)
}

/// Elastic pod-pod bounce with the minimum-impulse floor.
///
/// A pod whose shield was raised this tick weighs 10x. The impulse is the
/// projection of the relative velocity onto the center line, scaled by
/// the combined-mass coefficient, floored at `MIN_IMPULSE`, and applied
/// once to both velocities, each scaled by its own mass.
pub fn resolve_pod_bounce(a: &mut Pod, b: &mut Pod) {
    let m1 = a.mass();
    let m2 = b.mass();
    let mcoeff = (m1 + m2) / (m1 * m2);

    let n = a.pos - b.pos;
    let dst2 = n.length_squared();
    let dv = a.vel - b.vel;
    let prod = n.dot(dv);

    let mut f = DVec2::new(n.x * prod / (dst2 * mcoeff), n.y * prod / (dst2 * mcoeff));

    // Weak grazes still shove. An exactly tangential contact has no
    // impulse to rescale.
    let impulse = f.length();
    if impulse > 0.0 && impulse < MIN_IMPULSE {
        f *= MIN_IMPULSE / impulse;
    }

    a.vel -= f / m1;
    b.vel += f / m2;
}
