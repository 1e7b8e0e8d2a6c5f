//! Race setup
//!
//! A race is configured once: lap count plus the ordered checkpoint
//! route. Persisted as JSON for tooling; `build` turns it into the live
//! state the scheduler mutates.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Checkpoint, RaceState};

/// Immutable race setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Full circuits of the route to complete
    pub laps: u32,
    /// Checkpoint centers in pass order, integer map coordinates
    pub route: Vec<(i64, i64)>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            laps: 3,
            route: Vec::new(),
        }
    }
}

impl RaceConfig {
    pub fn new(laps: u32, route: Vec<(i64, i64)>) -> Self {
        Self { laps, route }
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Build the live race state; checkpoint ids follow route order.
    pub fn build(&self) -> RaceState {
        let checkpoints = self
            .route
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Checkpoint::new(i as u32, DVec2::new(x as f64, y as f64)))
            .collect();
        RaceState::new(self.laps, checkpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_race_is_three_laps() {
        assert_eq!(RaceConfig::default().laps, 3);
    }

    #[test]
    fn test_json_round_trip() {
        let config = RaceConfig::new(3, vec![(13500, 7500), (12000, 1300), (10500, 6000)]);
        let json = config.to_json().unwrap();
        assert_eq!(RaceConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_build_lays_out_route() {
        let race = RaceConfig::new(2, vec![(0, 0), (5000, 2500)]).build();
        assert_eq!(race.laps, 2);
        assert_eq!(race.checkpoints.len(), 2);
        assert_eq!(race.checkpoints[1].id, 1);
        assert_eq!(race.checkpoints[1].pos, DVec2::new(5000.0, 2500.0));
        assert_eq!(race.checkpoint_goal(), 4);
        assert!(race.pods.is_empty());
    }
}
