//! Frame-atlas animation on top of the moving sprite
//!
//! An `AnimatedSprite` steps through a grid of equally sized frames cut out
//! of one atlas image. Frames advance on a fixed per-frame duration; each
//! wraparound of the frame index counts as one completed loop, and exhausting
//! the configured repeat count parks the sprite in a terminal `finished`
//! state (no further advance, no further draw).
//!
//! Construction validates the grid against the atlas geometry: a bad frame
//! size or an impossible frame count must fail the spawn, not crash the frame
//! loop later.

use crate::geometry::{Position, Rect, Size};
use crate::movement::Movement;
use crate::renderer::{ImageHandle, Renderer};
use crate::sprite::MovingSprite;
use std::time::{Duration, Instant};

/// How often an animation loops before it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Play through the frames a single time.
    Once,
    /// Loop the given number of times (1 behaves like `Once`).
    #[allow(dead_code)] // Exposed for tests
    Count(u32),
    /// Never finish.
    Infinite,
}

/// Frame layout of an atlas image.
#[derive(Debug, Clone, Copy)]
pub struct FrameGrid {
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_time: Duration,
    /// `None` uses every frame the atlas holds.
    pub frame_count: Option<u32>,
    /// Pixel offset of the grid inside the atlas, for atlases stacking
    /// several animations (the powerup sheet keeps one row per type).
    pub atlas_offset: Position,
}

impl FrameGrid {
    pub fn new(frame_width: u32, frame_height: u32, frame_time: Duration) -> Self {
        FrameGrid {
            frame_width,
            frame_height,
            frame_time,
            frame_count: None,
            atlas_offset: Position::default(),
        }
    }

    pub fn with_frame_count(mut self, frame_count: u32) -> Self {
        self.frame_count = Some(frame_count);
        self
    }

    pub fn with_atlas_offset(mut self, offset: Position) -> Self {
        self.atlas_offset = offset;
        self
    }
}

pub struct AnimatedSprite {
    sprite: MovingSprite,
    atlas: ImageHandle,
    grid: FrameGrid,
    frames_per_row: u32,
    frame_count: u32,
    repeat: Repeat,
    current_frame: u32,
    frame_started: Option<Instant>,
    finished: bool,
}

impl AnimatedSprite {
    /// Validates the grid against the atlas and builds the sprite.
    ///
    /// Fails on a zero frame dimension or a frame count the atlas cannot
    /// hold. A frame size that does not evenly divide the atlas is only a
    /// warning: the truncated last row/column is simply never reached.
    pub fn new(
        atlas: ImageHandle,
        grid: FrameGrid,
        repeat: Repeat,
        position: Position,
        size: Size,
    ) -> Result<Self, String> {
        if grid.frame_width == 0 || grid.frame_height == 0 {
            return Err(format!(
                "invalid frame size {}x{}",
                grid.frame_width, grid.frame_height
            ));
        }

        // Capacity counts only the atlas region below and right of the offset
        let usable_width = atlas.width.saturating_sub(grid.atlas_offset.x as u32);
        let usable_height = atlas.height.saturating_sub(grid.atlas_offset.y as u32);

        if usable_width % grid.frame_width != 0 || usable_height % grid.frame_height != 0 {
            eprintln!(
                "Warning: frame size {}x{} does not evenly divide atlas {}x{}",
                grid.frame_width, grid.frame_height, usable_width, usable_height
            );
        }

        let frames_per_row = usable_width / grid.frame_width;
        let max_frames = frames_per_row * (usable_height / grid.frame_height);
        if max_frames == 0 {
            return Err(format!(
                "atlas {}x{} holds no {}x{} frames at offset ({}, {})",
                atlas.width,
                atlas.height,
                grid.frame_width,
                grid.frame_height,
                grid.atlas_offset.x,
                grid.atlas_offset.y
            ));
        }

        let frame_count = match grid.frame_count {
            None => max_frames,
            Some(count) if count == 0 || count > max_frames => {
                return Err(format!(
                    "invalid frame count {} (atlas holds {})",
                    count, max_frames
                ));
            }
            Some(count) => count,
        };

        Ok(AnimatedSprite {
            sprite: MovingSprite::new(atlas, position, size),
            atlas,
            grid,
            frames_per_row,
            frame_count,
            repeat,
            current_frame: 0,
            frame_started: None,
            finished: false,
        })
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    #[allow(dead_code)] // Frame stepping is internal; exposed for tests
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn position(&self) -> Position {
        self.sprite.position()
    }

    pub fn area(&self) -> Rect {
        self.sprite.area()
    }

    pub fn move_with(&mut self, movement: Movement, speed: f32) {
        self.sprite.move_with(movement, speed);
    }

    /// Advances the frame index by however many whole frame durations have
    /// elapsed, counting loops and latching `finished` when the repeats
    /// run out. The leftover elapsed time carries into the next tick so slow
    /// frames do not stretch the animation.
    pub fn update(&mut self, now: Instant) {
        if self.finished {
            return;
        }

        match self.frame_started {
            None => self.frame_started = Some(now),
            Some(started) => {
                let mut elapsed = now.duration_since(started);

                while elapsed >= self.grid.frame_time {
                    elapsed -= self.grid.frame_time;

                    let previous = self.current_frame;
                    self.current_frame = (self.current_frame + 1) % self.frame_count;

                    // Index decreased: one full loop completed
                    if self.current_frame < previous {
                        match self.repeat {
                            Repeat::Once => {
                                self.finished = true;
                                return;
                            }
                            Repeat::Count(remaining) => {
                                if remaining <= 1 {
                                    self.finished = true;
                                    return;
                                }
                                self.repeat = Repeat::Count(remaining - 1);
                            }
                            Repeat::Infinite => {}
                        }
                    }
                }

                self.frame_started = Some(now - elapsed);
            }
        }

        self.sprite.update(now);
    }

    /// Source rectangle of the current frame inside the atlas.
    fn frame_rect(&self) -> Rect {
        let column = self.current_frame % self.frames_per_row;
        let row = self.current_frame / self.frames_per_row;

        Rect::new(
            self.grid.atlas_offset.x + (column * self.grid.frame_width) as f32,
            self.grid.atlas_offset.y + (row * self.grid.frame_height) as f32,
            self.grid.frame_width as f32,
            self.grid.frame_height as f32,
        )
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        if self.finished {
            return Ok(());
        }

        let node = self.sprite.sprite().node();
        node.push_actions(renderer);
        let result = renderer.draw_image_frame(
            self.atlas,
            self.frame_rect(),
            self.area(),
            node.flip_x,
            node.flip_y,
        );
        node.pop_actions(renderer);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::test_image;

    const FRAME_TIME: Duration = Duration::from_millis(70);

    fn explosion() -> AnimatedSprite {
        // 7 frames in a single row
        AnimatedSprite::new(
            test_image(7 * 212, 212),
            FrameGrid::new(212, 212, FRAME_TIME).with_frame_count(7),
            Repeat::Once,
            Position::new(0.0, 0.0),
            Size::new(106.0, 106.0),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_zero_frame_size() {
        let result = AnimatedSprite::new(
            test_image(100, 100),
            FrameGrid::new(0, 50, FRAME_TIME),
            Repeat::Once,
            Position::default(),
            Size::new(50.0, 50.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_frame_count_beyond_atlas() {
        let result = AnimatedSprite::new(
            test_image(200, 100),
            FrameGrid::new(50, 50, FRAME_TIME).with_frame_count(9),
            Repeat::Once,
            Position::default(),
            Size::new(50.0, 50.0),
        );
        assert!(result.is_err());

        let ok = AnimatedSprite::new(
            test_image(200, 100),
            FrameGrid::new(50, 50, FRAME_TIME).with_frame_count(8),
            Repeat::Once,
            Position::default(),
            Size::new(50.0, 50.0),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_atlas_offset_shrinks_frame_capacity() {
        // Offset leaves a single 200x50 strip below it, so 4 frames fit
        let result = AnimatedSprite::new(
            test_image(200, 100),
            FrameGrid::new(50, 50, FRAME_TIME)
                .with_frame_count(5)
                .with_atlas_offset(Position::new(0.0, 50.0)),
            Repeat::Once,
            Position::default(),
            Size::new(50.0, 50.0),
        );
        assert!(result.is_err());

        let ok = AnimatedSprite::new(
            test_image(200, 100),
            FrameGrid::new(50, 50, FRAME_TIME)
                .with_frame_count(4)
                .with_atlas_offset(Position::new(0.0, 50.0)),
            Repeat::Once,
            Position::default(),
            Size::new(50.0, 50.0),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_rejects_offset_past_the_atlas_edge() {
        let result = AnimatedSprite::new(
            test_image(200, 100),
            FrameGrid::new(50, 50, FRAME_TIME).with_atlas_offset(Position::new(0.0, 100.0)),
            Repeat::Once,
            Position::default(),
            Size::new(50.0, 50.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_frame_count_defaults_to_atlas_capacity() {
        let sprite = AnimatedSprite::new(
            test_image(200, 100),
            FrameGrid::new(50, 50, FRAME_TIME),
            Repeat::Infinite,
            Position::default(),
            Size::new(50.0, 50.0),
        )
        .unwrap();
        assert_eq!(sprite.frame_count, 8);
    }

    #[test]
    fn test_frames_advance_with_elapsed_time() {
        let base = Instant::now();
        let mut sprite = explosion();

        sprite.update(base);
        assert_eq!(sprite.current_frame(), 0);

        sprite.update(base + FRAME_TIME);
        assert_eq!(sprite.current_frame(), 1);

        // Three frame times at once catch up three frames
        sprite.update(base + FRAME_TIME * 4);
        assert_eq!(sprite.current_frame(), 4);
        assert!(!sprite.finished());
    }

    #[test]
    fn test_play_once_finishes_after_full_loop() {
        let base = Instant::now();
        let mut sprite = explosion();

        sprite.update(base);
        sprite.update(base + FRAME_TIME * 7);
        assert!(sprite.finished());

        // No further advance once finished
        let frame = sprite.current_frame();
        sprite.update(base + FRAME_TIME * 20);
        assert_eq!(sprite.current_frame(), frame);
    }

    #[test]
    fn test_repeat_count_loops_then_finishes() {
        let base = Instant::now();
        let mut sprite = AnimatedSprite::new(
            test_image(7 * 212, 212),
            FrameGrid::new(212, 212, FRAME_TIME).with_frame_count(7),
            Repeat::Count(2),
            Position::new(0.0, 0.0),
            Size::new(106.0, 106.0),
        )
        .unwrap();

        sprite.update(base);
        sprite.update(base + FRAME_TIME * 7);
        assert!(!sprite.finished()); // first loop done, one left

        sprite.update(base + FRAME_TIME * 14);
        assert!(sprite.finished());
    }

    #[test]
    fn test_infinite_repeat_never_finishes() {
        let base = Instant::now();
        let mut sprite = AnimatedSprite::new(
            test_image(7 * 212, 212),
            FrameGrid::new(212, 212, FRAME_TIME).with_frame_count(7),
            Repeat::Infinite,
            Position::new(0.0, 0.0),
            Size::new(106.0, 106.0),
        )
        .unwrap();

        sprite.update(base);
        sprite.update(base + FRAME_TIME * 700);
        assert!(!sprite.finished());
    }

    #[test]
    fn test_frame_rect_walks_rows_with_offset() {
        let mut sprite = AnimatedSprite::new(
            test_image(200, 288),
            FrameGrid::new(50, 50, FRAME_TIME).with_atlas_offset(Position::new(0.0, 188.0)),
            Repeat::Infinite,
            Position::default(),
            Size::new(50.0, 50.0),
        )
        .unwrap();

        sprite.current_frame = 5; // second row, second column of a 4-wide grid
        assert_eq!(sprite.frame_rect(), Rect::new(50.0, 238.0, 50.0, 50.0));
    }

    #[test]
    fn test_finished_sprite_draws_nothing() {
        use crate::renderer::test_support::RecordingRenderer;

        let base = Instant::now();
        let mut sprite = explosion();
        sprite.update(base);
        sprite.update(base + FRAME_TIME * 7);
        assert!(sprite.finished());

        let mut renderer = RecordingRenderer::new();
        sprite.draw(&mut renderer).unwrap();
        assert!(renderer.calls.is_empty());
    }
}
