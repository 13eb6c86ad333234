//! Explosion pool: fire-and-forget one-shot animations
//!
//! Explosions have no combat state and never move; they exist until their
//! animation reports `finished` and are compacted out on the same pass.
//! The explosion sheet is a single row of 7 frames at 212x212 pixels.

use crate::animation::{AnimatedSprite, FrameGrid, Repeat};
use crate::geometry::{Position, Size};
use crate::renderer::{FrameContext, ImageHandle, Renderer};
use std::collections::HashSet;
use std::time::Duration;

const FRAME_SIZE: u32 = 212;
const FRAME_COUNT: u32 = 7;
const FRAME_TIME: Duration = Duration::from_millis(70);

pub struct Explosions {
    image: ImageHandle,
    explosions: Vec<AnimatedSprite>,
}

impl Explosions {
    pub fn new(image: ImageHandle) -> Self {
        Explosions {
            image,
            explosions: Vec::new(),
        }
    }

    /// Spawns an explosion centered on `position`, scaled relative to the
    /// source frame size.
    ///
    /// A misconfigured sheet fails the spawn and nothing enters the pool;
    /// the caller decides whether that is worth more than a warning.
    pub fn spawn(&mut self, position: Position, scale: f32) -> Result<&AnimatedSprite, String> {
        let width = (self.image.width / FRAME_COUNT) as f32 * scale;
        let height = self.image.height as f32 * scale;

        let explosion = AnimatedSprite::new(
            self.image,
            FrameGrid::new(FRAME_SIZE, FRAME_SIZE, FRAME_TIME).with_frame_count(FRAME_COUNT),
            Repeat::Once,
            Position::new(position.x - width / 2.0, position.y - height / 2.0),
            Size::new(width, height),
        )?;
        self.explosions.push(explosion);
        Ok(self.explosions.last().expect("just pushed"))
    }

    pub fn clear(&mut self) {
        self.explosions.clear();
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn query(&self) -> Vec<&AnimatedSprite> {
        self.explosions.iter().collect()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn len(&self) -> usize {
        self.explosions.len()
    }

    /// Advances every animation and compacts out the finished ones.
    pub fn update(&mut self, ctx: &FrameContext) {
        let mut to_remove = HashSet::new();

        for (index, explosion) in self.explosions.iter_mut().enumerate() {
            explosion.update(ctx.now);

            if explosion.finished() {
                to_remove.insert(index);
            }
        }

        if !to_remove.is_empty() {
            let mut index = 0;
            self.explosions.retain(|_| {
                let keep = !to_remove.contains(&index);
                index += 1;
                keep
            });
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        for explosion in &self.explosions {
            explosion.draw(renderer)?;
        }
        Ok(())
    }
}
