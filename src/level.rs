//! Level timelines: what spawns when, loaded from JSON
//!
//! A level is a named list of timed events. Positions are fractions of the
//! viewport (0.0 to 1.0), so the same level file works at any window size.
//! `LevelRun` replays a level against the clock: every event fires exactly
//! once, in time order, no matter how uneven the frame times are.

use crate::enemies::EnemyType;
use crate::geometry::{Position, Size};
use crate::powerups::PowerupType;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LevelEventKind {
    SpawnEnemy { enemy: EnemyType },
    SpawnPowerup { powerup: PowerupType },
    PauseScrolling,
    ResumeScrolling,
}

fn default_x() -> f32 {
    1.0
}

fn default_y() -> f32 {
    0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelEvent {
    /// Offset from level start, in milliseconds.
    pub at_millis: u64,
    /// Horizontal position as a viewport fraction; defaults to the right edge.
    #[serde(default = "default_x")]
    pub x: f32,
    /// Vertical position as a viewport fraction; defaults to center.
    #[serde(default = "default_y")]
    pub y: f32,
    #[serde(flatten)]
    pub kind: LevelEventKind,
}

impl LevelEvent {
    pub fn position(&self, viewport: Size) -> Position {
        Position::new(self.x * viewport.width, self.y * viewport.height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub events: Vec<LevelEvent>,
}

impl Level {
    /// Loads a level file, sorting its events into time order.
    pub fn load(path: &Path) -> Result<Level, Box<dyn Error>> {
        let file = File::open(path)?;
        let mut level: Level = serde_json::from_reader(BufReader::new(file))?;
        level.events.sort_by_key(|event| event.at_millis);
        Ok(level)
    }

    /// The opening level, compiled in so the game runs without any data
    /// files on disk.
    pub fn built_in() -> Level {
        let spawn = |at_millis, y, enemy| LevelEvent {
            at_millis,
            x: 1.0,
            y,
            kind: LevelEventKind::SpawnEnemy { enemy },
        };
        let drop = |at_millis, y, powerup| LevelEvent {
            at_millis,
            x: 1.0,
            y,
            kind: LevelEventKind::SpawnPowerup { powerup },
        };

        Level {
            name: "First Contact".to_string(),
            events: vec![
                spawn(2_000, 0.3, EnemyType::Spaceship),
                spawn(4_000, 0.7, EnemyType::Spaceship),
                spawn(7_000, 0.5, EnemyType::Spaceship),
                drop(9_000, 0.4, PowerupType::Energy),
                spawn(11_000, 0.2, EnemyType::Spaceship),
                spawn(11_500, 0.8, EnemyType::Spaceship),
                drop(14_000, 0.6, PowerupType::Weapon),
                spawn(16_000, 0.5, EnemyType::LargeSpaceship),
                drop(20_000, 0.3, PowerupType::Shield),
                spawn(22_000, 0.35, EnemyType::Spaceship),
                spawn(22_000, 0.65, EnemyType::Spaceship),
                drop(25_000, 0.5, PowerupType::Speed),
                spawn(27_000, 0.3, EnemyType::LargeSpaceship),
                spawn(27_000, 0.7, EnemyType::LargeSpaceship),
            ],
        }
    }
}

/// Replays a level against the clock.
pub struct LevelRun {
    level: Level,
    started: Option<Instant>,
    cursor: usize,
}

impl LevelRun {
    pub fn new(mut level: Level) -> Self {
        level.events.sort_by_key(|event| event.at_millis);
        LevelRun {
            level,
            started: None,
            cursor: 0,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn is_started(&self) -> bool {
        self.started.is_some()
    }

    /// All events replayed, nothing left to fire.
    #[allow(dead_code)] // Exposed for tests
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.level.events.len()
    }

    /// Starts (or restarts) the run at `now`.
    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.cursor = 0;
    }

    /// Returns the events due by `now` that have not fired yet and advances
    /// past them. Before `start` this never yields anything.
    pub fn poll(&mut self, now: Instant) -> &[LevelEvent] {
        let Some(started) = self.started else {
            return &[];
        };

        let elapsed = now.duration_since(started);
        let from = self.cursor;
        while self.cursor < self.level.events.len()
            && Duration::from_millis(self.level.events[self.cursor].at_millis) <= elapsed
        {
            self.cursor += 1;
        }
        &self.level.events[from..self.cursor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_event_level() -> Level {
        Level {
            name: "test".to_string(),
            events: vec![
                LevelEvent {
                    at_millis: 1_000,
                    x: 1.0,
                    y: 0.25,
                    kind: LevelEventKind::SpawnEnemy {
                        enemy: EnemyType::Spaceship,
                    },
                },
                LevelEvent {
                    at_millis: 3_000,
                    x: 1.0,
                    y: 0.75,
                    kind: LevelEventKind::SpawnPowerup {
                        powerup: PowerupType::Shield,
                    },
                },
            ],
        }
    }

    #[test]
    fn test_events_fire_once_in_order() {
        let base = Instant::now();
        let mut run = LevelRun::new(two_event_level());
        run.start(base);

        assert!(run.poll(base + Duration::from_millis(500)).is_empty());

        let due = run.poll(base + Duration::from_millis(1_000));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].at_millis, 1_000);

        // Already fired events never repeat
        assert!(run.poll(base + Duration::from_millis(1_500)).is_empty());

        let due = run.poll(base + Duration::from_millis(10_000));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].at_millis, 3_000);
        assert!(run.is_finished());
    }

    #[test]
    fn test_slow_frame_catches_up_in_one_poll() {
        let base = Instant::now();
        let mut run = LevelRun::new(two_event_level());
        run.start(base);

        let due = run.poll(base + Duration::from_millis(5_000));
        assert_eq!(due.len(), 2);
        assert!(due[0].at_millis < due[1].at_millis);
    }

    #[test]
    fn test_poll_before_start_yields_nothing() {
        let base = Instant::now();
        let mut run = LevelRun::new(two_event_level());
        assert!(run.poll(base + Duration::from_millis(10_000)).is_empty());
    }

    #[test]
    fn test_events_are_sorted_on_construction() {
        let mut level = two_event_level();
        level.events.reverse();

        let base = Instant::now();
        let mut run = LevelRun::new(level);
        run.start(base);

        let due = run.poll(base + Duration::from_millis(1_000));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].at_millis, 1_000);
    }

    #[test]
    fn test_fractional_positions_scale_to_viewport() {
        let event = LevelEvent {
            at_millis: 0,
            x: 1.0,
            y: 0.25,
            kind: LevelEventKind::PauseScrolling,
        };

        let position = event.position(Size::new(1280.0, 800.0));
        assert_eq!(position.x, 1280.0);
        assert_eq!(position.y, 200.0);
    }

    #[test]
    fn test_level_json_round_trip() {
        let json = r#"{
            "name": "test",
            "events": [
                { "at_millis": 1000, "y": 0.25, "type": "spawn_enemy", "enemy": "Spaceship" },
                { "at_millis": 2000, "type": "pause_scrolling" },
                { "at_millis": 3000, "x": 0.9, "y": 0.5, "type": "spawn_powerup", "powerup": "Weapon" }
            ]
        }"#;

        let level: Level = serde_json::from_str(json).unwrap();
        assert_eq!(level.events.len(), 3);
        // Omitted coordinates fall back to the right-edge default
        assert_eq!(level.events[0].x, 1.0);
        assert_eq!(
            level.events[0].kind,
            LevelEventKind::SpawnEnemy {
                enemy: EnemyType::Spaceship
            }
        );
        assert_eq!(level.events[1].kind, LevelEventKind::PauseScrolling);
    }
}
