//! Rendering capability boundary between the game core and the SDL2 host
//!
//! The core never touches `Canvas<Window>` directly. Everything draws against
//! the `Renderer` trait, which the host implements over SDL2 (see
//! `assets::CanvasRenderer`). This keeps canvas/texture state out of the game
//! objects and lets logic tests run without a window.
//!
//! Images cross this boundary as `ImageHandle`s: an opaque id into the host's
//! texture store plus the source pixel dimensions, which the core needs for
//! aspect-ratio sizing and hitbox scaling.

use crate::geometry::{Position, Rect, Size};
use sdl2::pixels::Color;
use std::time::Instant;

/// A decoded image owned by the host, referenced by the core.
///
/// `width`/`height` are the source pixel dimensions of the decoded image, not
/// the size anything is drawn at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    pub id: usize,
    pub width: u32,
    pub height: u32,
}

impl ImageHandle {
    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }
}

/// Per-tick context captured once by the orchestrator.
///
/// Holding the tick's `now` here means every timing decision inside one tick
/// (fire gates, blink deadlines, animation advance) sees the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub now: Instant,
    pub viewport: Size,
}

impl FrameContext {
    pub fn new(now: Instant, viewport: Size) -> Self {
        FrameContext { now, viewport }
    }

    pub fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height)
    }

    /// Off-screen test used by the pool removal predicates.
    pub fn is_on_screen(&self, area: &Rect) -> bool {
        self.viewport_rect().intersects(area)
    }
}

/// Drawing primitives the core issues against the host.
///
/// Tint and alpha are overlay state pushed/popped by render actions around a
/// single entity's draw call; the backend applies them to whatever is blitted
/// while they are set.
pub trait Renderer {
    /// Blits a whole image into `dest`, optionally mirrored.
    fn draw_image(
        &mut self,
        image: ImageHandle,
        dest: Rect,
        flip_x: bool,
        flip_y: bool,
    ) -> Result<(), String>;

    /// Blits the sub-rectangle `src` (in source pixels) of an atlas into
    /// `dest`, optionally mirrored.
    fn draw_image_frame(
        &mut self,
        image: ImageHandle,
        src: Rect,
        dest: Rect,
        flip_x: bool,
        flip_y: bool,
    ) -> Result<(), String>;

    /// Fills a solid rectangle (background stars, HUD bars).
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), String>;

    /// Draws a small filled circle (star field points).
    fn fill_circle(&mut self, center: Position, radius: f32, color: Color) -> Result<(), String>;

    fn set_tint(&mut self, color: Color);

    fn clear_tint(&mut self);

    fn set_alpha(&mut self, alpha: u8);

    fn clear_alpha(&mut self);
}
