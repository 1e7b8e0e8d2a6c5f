//! Deterministic racing simulation
//!
//! All race physics lives here. This module must be pure and deterministic:
//! - One unit-length tick per call, sub-stepped exactly at collisions
//! - Stable enumeration order (by pod index)
//! - No RNG, no platform dependencies
//! - f64 throughout, matching the authoritative engine's doubles

pub mod collision;
pub mod geom;
pub mod state;
pub mod tick;

pub use collision::{Collision, CollisionKind, resolve_pod_bounce, time_of_impact};
pub use geom::closest_point_on_line;
pub use state::{Action, Body, Checkpoint, Pod, PodSnapshot, RaceState, Thrust};
pub use tick::tick;
