//! Powerup pool: animated pickups that drift left until collected
//!
//! All four powerup types share one sprite atlas, stacked as rows of four
//! 188-pixel frames; each type's settings pick its row via the atlas y
//! offset. A powerup loops its animation forever and is removed either by
//! the consumed-callback reporting a pickup or by leaving the screen.

use crate::animation::{AnimatedSprite, FrameGrid, Repeat};
use crate::geometry::{Position, Rect, Size};
use crate::movement::Movement;
use crate::renderer::{FrameContext, ImageHandle, Renderer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupType {
    Energy,
    Shield,
    Weapon,
    Speed,
}

pub struct PowerupSettings {
    /// Row offset into the shared atlas, in source pixels.
    pub atlas_y: f32,
    /// Amount restored (Energy, Shield) or granted per pickup.
    pub value: f32,
    /// How long a timed effect lasts; `None` for instant effects.
    pub duration: Option<Duration>,
}

const FRAME_SIZE: u32 = 188;
const FRAME_COUNT: u32 = 4;
const FRAME_TIME: Duration = Duration::from_millis(50);
const DISPLAY_WIDTH: f32 = 80.0;
const DRIFT_SPEED: f32 = 1.0;
const DRIFT: Movement = Movement::SineLeft {
    amplitude: 10.0,
    wavelength: 80.0,
};

static POWERUP_SETTINGS: [PowerupSettings; 4] = [
    // Energy
    PowerupSettings {
        atlas_y: 0.0,
        value: 10.0,
        duration: None,
    },
    // Shield
    PowerupSettings {
        atlas_y: 188.0,
        value: 10.0,
        duration: None,
    },
    // Weapon
    PowerupSettings {
        atlas_y: 376.0,
        value: 1.0,
        duration: Some(Duration::from_millis(10_000)),
    },
    // Speed
    PowerupSettings {
        atlas_y: 564.0,
        value: 2.0,
        duration: Some(Duration::from_millis(8_000)),
    },
];

impl PowerupType {
    pub fn settings(&self) -> &'static PowerupSettings {
        &POWERUP_SETTINGS[*self as usize]
    }
}

pub struct Powerup {
    sprite: AnimatedSprite,
    kind: PowerupType,
}

impl Powerup {
    pub fn kind(&self) -> PowerupType {
        self.kind
    }

    pub fn area(&self) -> Rect {
        self.sprite.area()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn position(&self) -> Position {
        self.sprite.position()
    }
}

pub struct Powerups {
    atlas: ImageHandle,
    powerups: Vec<Powerup>,
}

impl Powerups {
    pub fn new(atlas: ImageHandle) -> Self {
        Powerups {
            atlas,
            powerups: Vec::new(),
        }
    }

    /// Spawns a powerup centered on `position`, both axes.
    pub fn spawn(&mut self, kind: PowerupType, position: Position) -> Result<&Powerup, String> {
        let size = Size::new(DISPLAY_WIDTH, DISPLAY_WIDTH);
        let top_left = Position::new(
            position.x - size.width / 2.0,
            position.y - size.height / 2.0,
        );

        let grid = FrameGrid::new(FRAME_SIZE, FRAME_SIZE, FRAME_TIME)
            .with_frame_count(FRAME_COUNT)
            .with_atlas_offset(Position::new(0.0, kind.settings().atlas_y));

        let sprite = AnimatedSprite::new(self.atlas, grid, Repeat::Infinite, top_left, size)?;

        self.powerups.push(Powerup { sprite, kind });
        Ok(self.powerups.last().expect("just pushed"))
    }

    pub fn clear(&mut self) {
        self.powerups.clear();
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn query(&self) -> Vec<&Powerup> {
        self.powerups.iter().collect()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn len(&self) -> usize {
        self.powerups.len()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn is_empty(&self) -> bool {
        self.powerups.is_empty()
    }

    /// One lifecycle pass. `consume` inspects each powerup after its drift
    /// step; returning true marks it collected. Collected and off-screen
    /// powerups are compacted out after the pass.
    pub fn update<F>(&mut self, ctx: &FrameContext, mut consume: F)
    where
        F: FnMut(&Powerup) -> bool,
    {
        let mut to_remove = HashSet::new();

        for (index, powerup) in self.powerups.iter_mut().enumerate() {
            powerup.sprite.move_with(DRIFT, DRIFT_SPEED);

            if consume(powerup) || !ctx.is_on_screen(&powerup.area()) {
                to_remove.insert(index);
            } else {
                powerup.sprite.update(ctx.now);
            }
        }

        if !to_remove.is_empty() {
            let mut index = 0;
            self.powerups.retain(|_| {
                let keep = !to_remove.contains(&index);
                index += 1;
                keep
            });
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        for powerup in &self.powerups {
            powerup.sprite.draw(renderer)?;
        }
        Ok(())
    }
}
