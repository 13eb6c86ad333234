//! Movement profiles for everything that drifts across the screen
//!
//! Every moving entity repositions itself each tick by feeding its own
//! position history through one of these profiles. A profile is a pure
//! function: given the two most recent positions, the spawn position and a
//! speed, it returns the next position. All state lives in the caller's
//! history, so the same `Movement` value can be shared by every entity of a
//! type via a `static` settings table.
//!
//! # Rust Learning Notes
//!
//! The profile set is closed, so this is an enum with a `step()` method rather
//! than boxed closures: variants are const-constructible (usable in `static`
//! tables), `Copy`, and exhaustively matched.

use crate::geometry::Position;

const TWO_PI: f32 = 2.0 * std::f32::consts::PI;

/// A stock motion, selected per entity type by the pool settings tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Movement {
    /// Stay where you are.
    #[allow(dead_code)] // Exposed for tests
    None,
    /// Constant leftward drift at `speed` per tick.
    Left,
    /// Constant rightward drift at `speed` per tick.
    Right,
    /// Leftward drift with a vertical sine offset around the spawn y.
    /// `wavelength` is measured in horizontal pixels travelled from spawn.
    SineLeft { amplitude: f32, wavelength: f32 },
    /// Rightward drift with the same vertical sine offset.
    SineRight { amplitude: f32, wavelength: f32 },
    /// No horizontal motion; bounce vertically, reversing at
    /// `spawn.y - amplitude` and `spawn.y + amplitude`.
    #[allow(dead_code)] // Exposed for tests
    Bobbing { amplitude: f32 },
}

impl Movement {
    /// Computes the next position.
    ///
    /// `last_positions` holds `[previous, current]`. The previous position is
    /// needed by motions that must know the recent travel direction (bobbing
    /// derives "was I going up?" from it).
    pub fn step(
        &self,
        last_positions: [Position; 2],
        start_position: Position,
        speed: f32,
    ) -> Position {
        let [previous, current] = last_positions;

        match *self {
            Movement::None => current,
            Movement::Left => Position::new(current.x - speed, current.y),
            Movement::Right => Position::new(current.x + speed, current.y),
            Movement::SineLeft {
                amplitude,
                wavelength,
            } => {
                let traveled = current.x - start_position.x - speed;
                Position::new(
                    current.x - speed,
                    start_position.y - amplitude * (TWO_PI * traveled / wavelength).sin(),
                )
            }
            Movement::SineRight {
                amplitude,
                wavelength,
            } => {
                let traveled = current.x - start_position.x + speed;
                Position::new(
                    current.x + speed,
                    start_position.y - amplitude * (TWO_PI * traveled / wavelength).sin(),
                )
            }
            Movement::Bobbing { amplitude } => {
                let min = start_position.y - amplitude;
                let max = start_position.y + amplitude;

                // Continue in the direction of the last displacement until an
                // amplitude bound is reached, then turn around
                let mut up = current.y < previous.y;
                if up && current.y <= min {
                    up = false;
                } else if !up && current.y >= max {
                    up = true;
                }

                let new_y = if up {
                    (current.y - speed).max(min)
                } else {
                    (current.y + speed).min(max)
                };

                Position::new(current.x, new_y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(position: Position) -> [Position; 2] {
        [position, position]
    }

    #[test]
    fn test_none_stays_put() {
        let position = Position::new(40.0, 25.0);
        let next = Movement::None.step(history(position), position, 5.0);

        assert_eq!(next, position);
    }

    #[test]
    fn test_left_and_right_drift() {
        let position = Position::new(100.0, 50.0);

        let left = Movement::Left.step(history(position), position, 4.0);
        assert_eq!(left, Position::new(96.0, 50.0));

        let right = Movement::Right.step(history(position), position, 4.0);
        assert_eq!(right, Position::new(104.0, 50.0));
    }

    #[test]
    fn test_sine_left_starts_on_axis() {
        let spawn = Position::new(300.0, 80.0);
        let movement = Movement::SineLeft {
            amplitude: 50.0,
            wavelength: 300.0,
        };

        // After exactly one full wavelength of travel the offset is zero again
        let at_wavelength = Position::new(spawn.x - 294.0, 80.0);
        let next = movement.step(history(at_wavelength), spawn, 6.0);

        assert_eq!(next.x, spawn.x - 300.0);
        assert!((next.y - spawn.y).abs() < 1e-3);
    }

    #[test]
    fn test_sine_left_peaks_at_quarter_wavelength() {
        let spawn = Position::new(0.0, 100.0);
        let movement = Movement::SineLeft {
            amplitude: 40.0,
            wavelength: 200.0,
        };

        // Quarter wavelength leftward: sin(2π * -50/200) = -1, offset = +40
        let current = Position::new(-45.0, 100.0);
        let next = movement.step(history(current), spawn, 5.0);

        assert_eq!(next.x, -50.0);
        assert!((next.y - 140.0).abs() < 1e-3);
    }

    #[test]
    fn test_sine_right_mirrors_sine_left() {
        let spawn = Position::new(0.0, 100.0);
        let movement = Movement::SineRight {
            amplitude: 40.0,
            wavelength: 200.0,
        };

        let current = Position::new(45.0, 100.0);
        let next = movement.step(history(current), spawn, 5.0);

        assert_eq!(next.x, 50.0);
        // sin(2π * 50/200) = 1, offset = -40 (screen y grows downward)
        assert!((next.y - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_bobbing_reverses_at_bounds() {
        let spawn = Position::new(10.0, 100.0);
        let movement = Movement::Bobbing { amplitude: 20.0 };

        // Moving down (current below previous), at the lower bound: reverse up
        let next = movement.step(
            [Position::new(10.0, 118.0), Position::new(10.0, 120.0)],
            spawn,
            3.0,
        );
        assert_eq!(next, Position::new(10.0, 117.0));

        // Moving up, at the upper bound: reverse down
        let next = movement.step(
            [Position::new(10.0, 82.0), Position::new(10.0, 80.0)],
            spawn,
            3.0,
        );
        assert_eq!(next, Position::new(10.0, 83.0));
    }

    #[test]
    fn test_bobbing_clamps_to_amplitude() {
        let spawn = Position::new(10.0, 100.0);
        let movement = Movement::Bobbing { amplitude: 20.0 };

        // One step would overshoot the lower bound; y clamps to spawn + amplitude
        let next = movement.step(
            [Position::new(10.0, 112.0), Position::new(10.0, 118.0)],
            spawn,
            10.0,
        );
        assert_eq!(next.y, 120.0);
    }
}
