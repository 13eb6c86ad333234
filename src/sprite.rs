//! Sprite layers: still image, then image + motion history
//!
//! `Sprite` puts an image on a `RenderNode` and knows how the display size
//! relates to the source pixels (`scaling`), which is what maps image-space
//! hitboxes into world space. `MovingSprite` adds the position history and
//! facing direction that the movement profiles and projectile mirroring need.
//!
//! The struct nesting replaces the inheritance chain the design started from:
//! each layer owns the one below and re-exposes only what callers use.

use crate::geometry::{Position, Rect, Size};
use crate::movement::Movement;
use crate::render_node::RenderNode;
use crate::renderer::{ImageHandle, Renderer};
use std::time::Instant;

/// Horizontal facing, derived from the sign of the latest x displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionX {
    Left,
    #[default]
    Right,
}

/// Vertical facing, derived from the sign of the latest y displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionY {
    Up,
    #[default]
    Down,
}

/// Derives a display size from a type's configured width and the source
/// image's aspect ratio.
pub fn display_size(image: ImageHandle, width: f32) -> Size {
    Size::new(width, width * image.height as f32 / image.width as f32)
}

/// An image placed on a render node at a display size.
pub struct Sprite {
    node: RenderNode,
    image: ImageHandle,
}

impl Sprite {
    pub fn new(image: ImageHandle, size: Size) -> Self {
        Sprite {
            node: RenderNode::new(size),
            image,
        }
    }

    pub fn node(&self) -> &RenderNode {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut RenderNode {
        &mut self.node
    }

    pub fn position(&self) -> Position {
        self.node.position()
    }

    pub fn size(&self) -> Size {
        self.node.size()
    }

    pub fn area(&self) -> Rect {
        self.node.area()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.node.move_to(x, y);
    }

    /// Display size over source pixel size, per axis. Multiplying an
    /// image-space length by this factor yields world units.
    pub fn scaling(&self) -> Size {
        let source = self.image.size();
        let display = self.node.size();
        Size::new(display.width / source.width, display.height / source.height)
    }

    /// Maps image-space hitbox rectangles into world space.
    ///
    /// Falls back to the full sprite bounds when no sub-rectangles are
    /// configured, so every sprite is collidable without extra setup.
    pub fn hitboxes(&self, image_rects: &[Rect]) -> Vec<Rect> {
        if image_rects.is_empty() {
            return vec![self.area()];
        }

        let scaling = self.scaling();
        let position = self.position();
        image_rects
            .iter()
            .map(|rect| {
                Rect::new(
                    position.x + rect.x * scaling.width,
                    position.y + rect.y * scaling.height,
                    rect.width * scaling.width,
                    rect.height * scaling.height,
                )
            })
            .collect()
    }

    /// Ticks the attached render actions.
    pub fn update(&mut self, now: Instant) {
        self.node.update_actions(now);
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        self.node.push_actions(renderer);
        let result =
            renderer.draw_image(self.image, self.area(), self.node.flip_x, self.node.flip_y);
        self.node.pop_actions(renderer);
        result
    }
}

/// A sprite with last-position memory and facing, repositioned each tick by a
/// movement profile.
pub struct MovingSprite {
    sprite: Sprite,
    start_position: Position,
    last_position: Position,
    direction_x: DirectionX,
    direction_y: DirectionY,
}

impl MovingSprite {
    pub fn new(image: ImageHandle, position: Position, size: Size) -> Self {
        let mut sprite = Sprite::new(image, size);
        sprite.move_to(position.x, position.y);

        MovingSprite {
            sprite,
            start_position: position,
            last_position: position,
            direction_x: DirectionX::default(),
            direction_y: DirectionY::default(),
        }
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn node_mut(&mut self) -> &mut RenderNode {
        self.sprite.node_mut()
    }

    pub fn position(&self) -> Position {
        self.sprite.position()
    }

    pub fn area(&self) -> Rect {
        self.sprite.area()
    }

    /// The position held immediately before the most recent move.
    #[allow(dead_code)] // History is consumed via move_with; exposed for tests
    pub fn last_position(&self) -> Position {
        self.last_position
    }

    /// The spawn anchor the oscillating movement profiles swing around.
    #[allow(dead_code)] // History is consumed via move_with; exposed for tests
    pub fn start_position(&self) -> Position {
        self.start_position
    }

    pub fn direction_x(&self) -> DirectionX {
        self.direction_x
    }

    pub fn direction_y(&self) -> DirectionY {
        self.direction_y
    }

    /// Repositions the sprite, recording the history and updating the facing.
    /// Facing only changes on a non-zero delta along that axis.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let current = self.sprite.position();

        if x != current.x {
            self.direction_x = if x > current.x {
                DirectionX::Right
            } else {
                DirectionX::Left
            };
        }
        if y != current.y {
            self.direction_y = if y > current.y {
                DirectionY::Down
            } else {
                DirectionY::Up
            };
        }

        self.last_position = current;
        self.sprite.move_to(x, y);
    }

    /// Feeds this sprite's own history through a movement profile and
    /// repositions it on the result.
    pub fn move_with(&mut self, movement: Movement, speed: f32) {
        let next = movement.step(
            [self.last_position, self.sprite.position()],
            self.start_position,
            speed,
        );
        self.move_to(next.x, next.y);
    }

    pub fn update(&mut self, now: Instant) {
        self.sprite.update(now);
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        self.sprite.draw(renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::{test_image, DrawCall, RecordingRenderer};

    #[test]
    fn test_display_size_keeps_aspect_ratio() {
        let image = test_image(200, 100);
        let size = display_size(image, 160.0);

        assert_eq!(size, Size::new(160.0, 80.0));
    }

    #[test]
    fn test_scaling_is_display_over_source() {
        let sprite = Sprite::new(test_image(200, 100), Size::new(100.0, 25.0));
        let scaling = sprite.scaling();

        assert_eq!(scaling.width, 0.5);
        assert_eq!(scaling.height, 0.25);
    }

    #[test]
    fn test_hitboxes_fall_back_to_full_bounds() {
        let mut sprite = Sprite::new(test_image(64, 64), Size::new(32.0, 32.0));
        sprite.move_to(10.0, 20.0);

        let hitboxes = sprite.hitboxes(&[]);
        assert_eq!(hitboxes, vec![Rect::new(10.0, 20.0, 32.0, 32.0)]);
    }

    #[test]
    fn test_hitboxes_scale_and_offset_image_rects() {
        // Image is 200x100, displayed at 100x25: scale (0.5, 0.25)
        let mut sprite = Sprite::new(test_image(200, 100), Size::new(100.0, 25.0));
        sprite.move_to(40.0, 80.0);

        let hitboxes = sprite.hitboxes(&[Rect::new(20.0, 40.0, 100.0, 40.0)]);
        assert_eq!(hitboxes, vec![Rect::new(50.0, 90.0, 50.0, 10.0)]);
    }

    #[test]
    fn test_move_to_records_last_position() {
        let mut sprite = MovingSprite::new(
            test_image(64, 64),
            Position::new(5.0, 6.0),
            Size::new(32.0, 32.0),
        );

        sprite.move_to(15.0, 26.0);
        assert_eq!(sprite.last_position(), Position::new(5.0, 6.0));
        assert_eq!(sprite.position(), Position::new(15.0, 26.0));

        sprite.move_to(12.0, 26.0);
        assert_eq!(sprite.last_position(), Position::new(15.0, 26.0));
    }

    #[test]
    fn test_facing_flips_only_on_nonzero_delta() {
        let mut sprite = MovingSprite::new(
            test_image(64, 64),
            Position::new(0.0, 0.0),
            Size::new(32.0, 32.0),
        );
        assert_eq!(sprite.direction_x(), DirectionX::Right);
        assert_eq!(sprite.direction_y(), DirectionY::Down);

        sprite.move_to(-4.0, 0.0);
        assert_eq!(sprite.direction_x(), DirectionX::Left);
        // y delta was zero, vertical facing unchanged
        assert_eq!(sprite.direction_y(), DirectionY::Down);

        sprite.move_to(-4.0, -3.0);
        // x delta was zero, horizontal facing unchanged
        assert_eq!(sprite.direction_x(), DirectionX::Left);
        assert_eq!(sprite.direction_y(), DirectionY::Up);
    }

    #[test]
    fn test_move_with_keeps_spawn_anchor() {
        let mut sprite = MovingSprite::new(
            test_image(64, 64),
            Position::new(100.0, 50.0),
            Size::new(32.0, 32.0),
        );

        sprite.move_with(Movement::Left, 4.0);
        sprite.move_with(Movement::Left, 4.0);

        assert_eq!(sprite.position(), Position::new(92.0, 50.0));
        assert_eq!(sprite.last_position(), Position::new(96.0, 50.0));
        assert_eq!(sprite.start_position(), Position::new(100.0, 50.0));
    }

    #[test]
    fn test_draw_passes_flip_flags() {
        let mut sprite = Sprite::new(test_image(64, 64), Size::new(32.0, 32.0));
        sprite.node_mut().flip_x = true;

        let mut renderer = RecordingRenderer::new();
        sprite.draw(&mut renderer).unwrap();

        assert_eq!(
            renderer.calls,
            vec![DrawCall::Image {
                image: test_image(64, 64),
                dest: Rect::new(0.0, 0.0, 32.0, 32.0),
                flip_x: true,
                flip_y: false,
            }]
        );
    }
}
