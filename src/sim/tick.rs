//! Single-tick scheduler
//!
//! Advances a race by exactly one tick: apply every pod's action, then
//! consume the unit interval collision-by-collision in time order, then
//! finalize every pod once.

use super::collision::{Collision, CollisionKind, resolve_pod_bounce, time_of_impact};
use super::state::{Action, RaceState};

/// Advance `race` by one tick under `actions`.
///
/// `actions[i]` commands `race.pods[i]`; pods without an action coast.
/// Rotation and acceleration land instantaneously at the start of the
/// tick, then continuous motion is resolved against every collision in
/// strict time order.
pub fn tick(race: &mut RaceState, actions: &[Action]) {
    for (pod, action) in race.pods.iter_mut().zip(actions) {
        pod.apply_action(action);
    }

    let goal = race.checkpoint_goal();

    // Elapsed fraction of the tick already resolved.
    let mut t = 0.0;
    while t < 1.0 {
        match earliest_collision(race, t) {
            None => {
                let rest = 1.0 - t;
                for pod in &mut race.pods {
                    pod.advance(rest);
                }
                t = 1.0;
            }
            Some(col) => {
                for pod in &mut race.pods {
                    pod.advance(col.t);
                }
                resolve(race, &col);
                t += col.t;
            }
        }
    }

    for pod in &mut race.pods {
        pod.finalize(goal);
    }
    race.turn += 1;
}

/// Earliest qualifying collision at elapsed fraction `t`, or `None`.
///
/// Enumeration order is fixed for determinism: for each pod in index
/// order, its pairs with higher-indexed pods, then its own next
/// checkpoint. The first discovered minimum wins ties.
fn earliest_collision(race: &RaceState, t: f64) -> Option<Collision> {
    let mut first: Option<Collision> = None;

    for i in 0..race.pods.len() {
        for j in (i + 1)..race.pods.len() {
            let toi = time_of_impact(&race.pods[i].body(), &race.pods[j].body());
            if let Some(tl) = toi {
                if qualifies(t, tl, first.map(|c| c.t)) {
                    first = Some(Collision {
                        kind: CollisionKind::Pods(i, j),
                        t: tl,
                    });
                }
            }
        }

        let cp = &race.checkpoints[race.pods[i].next_cp];
        if let Some(tl) = time_of_impact(&race.pods[i].body(), &cp.body()) {
            if qualifies(t, tl, first.map(|c| c.t)) {
                first = Some(Collision {
                    kind: CollisionKind::Checkpoint(i),
                    t: tl,
                });
            }
        }
    }

    first
}

/// A candidate must land strictly inside the tick and beat the current
/// best; a tie keeps the earlier discovery.
#[inline]
fn qualifies(t: f64, cand: f64, best: Option<f64>) -> bool {
    t + cand < 1.0 && best.map_or(true, |b| cand < b)
}

fn resolve(race: &mut RaceState, col: &Collision) {
    match col.kind {
        CollisionKind::Checkpoint(i) => {
            let count = race.checkpoints.len();
            race.pods[i].pass_checkpoint(count);
        }
        CollisionKind::Pods(i, j) => {
            log::trace!("pods {i} and {j} bounce at +{:.4}", col.t);
            let (head, tail) = race.pods.split_at_mut(j);
            resolve_pod_bounce(&mut head[i], &mut tail[0]);
        }
    }
}
