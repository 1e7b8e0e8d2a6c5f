//! Line-oriented turn protocol
//!
//! The external driver speaks whitespace-separated records: an integer
//! checkpoint route and one snapshot per pod at race start, then one
//! action line per pod per turn. After each tick every pod is emitted as
//! `x y vx vy angle next_cp shield boost_used`.

use glam::DVec2;
use thiserror::Error;

use crate::sim::{Action, Pod, PodSnapshot, Thrust};

/// Failure while decoding a protocol line.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("input ended early: expected {0}")]
    UnexpectedEof(&'static str),
    #[error("line {line:?}: expected {expected} fields, got {got}")]
    FieldCount {
        line: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid number {token:?}")]
    InvalidNumber { token: String },
}

fn fields(line: &str, expected: usize) -> Result<Vec<&str>, ProtocolError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != expected {
        return Err(ProtocolError::FieldCount {
            line: line.to_string(),
            expected,
            got: fields.len(),
        });
    }
    Ok(fields)
}

fn num<T: std::str::FromStr>(token: &str) -> Result<T, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::InvalidNumber {
        token: token.to_string(),
    })
}

/// A bare integer line (lap count, checkpoint count, pod count).
pub fn parse_count(line: &str) -> Result<usize, ProtocolError> {
    num(line.trim())
}

/// `x y` — one checkpoint of the route, integer map coordinates.
pub fn parse_route_point(line: &str) -> Result<(i64, i64), ProtocolError> {
    let f = fields(line, 2)?;
    Ok((num(f[0])?, num(f[1])?))
}

/// `x y vx vy angle next_cp shield boost_used` — a pod record.
pub fn parse_snapshot(line: &str) -> Result<PodSnapshot, ProtocolError> {
    let f = fields(line, 8)?;
    Ok(PodSnapshot {
        x: num(f[0])?,
        y: num(f[1])?,
        vx: num(f[2])?,
        vy: num(f[3])?,
        angle: num(f[4])?,
        next_cp: num(f[5])?,
        shield: num(f[6])?,
        boosted: num::<u8>(f[7])? != 0,
    })
}

/// `x y thrust` — one pod's command for this turn. The thrust field is a
/// literal `SHIELD`, `BOOST`, or an integer.
pub fn parse_action(line: &str) -> Result<Action, ProtocolError> {
    let f = fields(line, 3)?;
    let target = DVec2::new(num::<i64>(f[0])? as f64, num::<i64>(f[1])? as f64);
    let thrust = match f[2] {
        "SHIELD" => Thrust::Shield,
        "BOOST" => Thrust::Boost,
        token => Thrust::Value(num::<i64>(token)? as f64),
    };
    Ok(Action { target, thrust })
}

/// Post-tick pod record. Positions and velocities are integral after
/// finalization; the angle stays real.
pub fn format_pod(pod: &Pod) -> String {
    format!(
        "{} {} {} {} {} {} {} {}",
        pod.pos.x as i64,
        pod.pos.y as i64,
        pod.vel.x as i64,
        pod.vel.y as i64,
        pod.angle,
        pod.next_cp,
        pod.shield,
        u8::from(!pod.has_boost)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3\n").unwrap(), 3);
        assert!(parse_count("three").is_err());
    }

    #[test]
    fn test_parse_route_point() {
        assert_eq!(parse_route_point("13500 7500").unwrap(), (13500, 7500));
        assert!(parse_route_point("13500").is_err());
    }

    #[test]
    fn test_parse_snapshot() {
        let snap = parse_snapshot("10353 1986 -5 112 270.5 1 3 1").unwrap();
        assert_eq!(snap.x, 10353);
        assert_eq!(snap.y, 1986);
        assert_eq!(snap.vx, -5);
        assert_eq!(snap.vy, 112);
        assert_eq!(snap.angle, 270.5);
        assert_eq!(snap.next_cp, 1);
        assert_eq!(snap.shield, 3);
        assert!(snap.boosted);
    }

    #[test]
    fn test_parse_action_variants() {
        let a = parse_action("8000 4500 100").unwrap();
        assert_eq!(a.target, DVec2::new(8000.0, 4500.0));
        assert_eq!(a.thrust, Thrust::Value(100.0));

        let a = parse_action("8000 4500 SHIELD").unwrap();
        assert_eq!(a.thrust, Thrust::Shield);

        let a = parse_action("8000 4500 BOOST").unwrap();
        assert_eq!(a.thrust, Thrust::Boost);

        assert!(parse_action("8000 4500 FULLSPEED").is_err());
        assert!(parse_action("8000 4500").is_err());
    }

    #[test]
    fn test_format_pod_matches_snapshot_shape() {
        use glam::DVec2;

        let mut pod = Pod::new(2, DVec2::new(1200.0, -340.0), 271.0, 1);
        pod.vel = DVec2::new(55.0, -8.0);
        pod.shield = 3;
        pod.has_boost = false;

        let line = format_pod(&pod);
        assert_eq!(line, "1200 -340 55 -8 271 1 3 1");

        // The record round-trips back through the snapshot parser.
        let snap = parse_snapshot(&line).unwrap();
        assert_eq!(snap, pod.snapshot());
    }
}
