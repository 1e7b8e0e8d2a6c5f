//! Geometry primitives for the collision predicate
//!
//! The time-of-impact test needs one closed-form tool: the point on an
//! infinite line closest to a query point. Distances come straight from
//! `glam::DVec2`.

use glam::DVec2;

/// Point on the infinite line through `a` and `b` closest to `p`.
///
/// Uses the implicit line form `da*x + db*y = c` with `da = b.y - a.y`,
/// `db = a.x - b.x`. A degenerate line (`a == b`) returns `p` unchanged;
/// callers treat that as a no-relative-motion signal.
pub fn closest_point_on_line(p: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let da = b.y - a.y;
    let db = a.x - b.x;
    let c1 = da * a.x + db * a.y;
    let c2 = -db * p.x + da * p.y;
    let det = da * da + db * db;

    if det == 0.0 {
        return p;
    }

    DVec2::new((da * c1 - db * c2) / det, (da * c2 + db * c1) / det)
}
