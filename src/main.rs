//! Pod Race entry point
//!
//! Thin stdin/stdout driver around the simulator. The race is described
//! once, then each turn feeds one action line per pod and prints every
//! pod's post-tick record.
//!
//! Input:
//! - line 1: lap count
//! - line 2: checkpoint count, then one `x y` line per checkpoint
//! - next line: pod count, then one
//!   `x y vx vy angle next_cp shield boost_used` line per pod
//! - per turn until EOF: one `x y thrust` line per pod (thrust is
//!   `SHIELD`, `BOOST`, or an integer)

use std::io::{self, BufRead, Write};

use pod_race::RaceConfig;
use pod_race::protocol::{self, ProtocolError};
use pod_race::sim::tick;

type Lines = io::Lines<io::StdinLock<'static>>;

fn read_line(lines: &mut Lines, expected: &'static str) -> Result<String, Box<dyn std::error::Error>> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(ProtocolError::UnexpectedEof(expected).into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut lines = io::stdin().lock().lines();

    let laps = protocol::parse_count(&read_line(&mut lines, "lap count")?)? as u32;
    let checkpoint_count = protocol::parse_count(&read_line(&mut lines, "checkpoint count")?)?;
    let mut config = RaceConfig::new(laps, Vec::with_capacity(checkpoint_count));
    for _ in 0..checkpoint_count {
        config
            .route
            .push(protocol::parse_route_point(&read_line(&mut lines, "checkpoint")?)?);
    }

    let mut race = config.build();
    let pod_count = protocol::parse_count(&read_line(&mut lines, "pod count")?)?;
    for _ in 0..pod_count {
        race.spawn_pod(&protocol::parse_snapshot(&read_line(&mut lines, "pod snapshot")?)?);
    }
    if pod_count == 0 {
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut actions = Vec::with_capacity(pod_count);

    loop {
        // Clean EOF is only accepted on a turn boundary.
        let first = match lines.next() {
            None => break,
            Some(line) => line?,
        };
        actions.clear();
        actions.push(protocol::parse_action(&first)?);
        for _ in 1..pod_count {
            actions.push(protocol::parse_action(&read_line(&mut lines, "action")?)?);
        }

        tick(&mut race, &actions);

        for pod in &race.pods {
            writeln!(out, "{}", protocol::format_pod(pod))?;
        }
        out.flush()?;
    }

    Ok(())
}
