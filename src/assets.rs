//! SDL2 asset loading and the canvas-backed renderer
//!
//! `TextureStore` owns every loaded texture and hands out `ImageHandle`s;
//! the rest of the game never touches SDL types. `CanvasRenderer` is the
//! one place handles are resolved back to textures, and where the tint and
//! alpha overlay state maps onto SDL color and alpha modulation.

use crate::geometry::{Position, Rect};
use crate::renderer::{ImageHandle, Renderer};
use sdl2::image::LoadTexture;
use sdl2::pixels::Color;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};

pub struct TextureStore<'a> {
    textures: Vec<Texture<'a>>,
}

impl<'a> TextureStore<'a> {
    pub fn new() -> Self {
        TextureStore {
            textures: Vec::new(),
        }
    }

    /// Loads a texture from disk and returns its handle.
    pub fn load(
        &mut self,
        texture_creator: &'a TextureCreator<WindowContext>,
        path: &str,
    ) -> Result<ImageHandle, String> {
        let texture = texture_creator
            .load_texture(path)
            .map_err(|e| format!("Failed to load {}: {}", path, e))?;
        let query = texture.query();

        let handle = ImageHandle {
            id: self.textures.len(),
            width: query.width,
            height: query.height,
        };
        self.textures.push(texture);
        Ok(handle)
    }

    fn get_mut(&mut self, handle: ImageHandle) -> Result<&mut Texture<'a>, String> {
        self.textures
            .get_mut(handle.id)
            .ok_or_else(|| format!("Unknown image handle {}", handle.id))
    }
}

fn to_sdl_rect(rect: Rect) -> sdl2::rect::Rect {
    sdl2::rect::Rect::new(
        rect.x.round() as i32,
        rect.y.round() as i32,
        rect.width.round().max(0.0) as u32,
        rect.height.round().max(0.0) as u32,
    )
}

/// Renders one frame onto an SDL canvas. Borrows the canvas and the texture
/// store for the duration of the frame.
pub struct CanvasRenderer<'frame, 'tex> {
    canvas: &'frame mut Canvas<Window>,
    textures: &'frame mut TextureStore<'tex>,
    tint: Option<Color>,
    alpha: Option<u8>,
}

impl<'frame, 'tex> CanvasRenderer<'frame, 'tex> {
    pub fn new(
        canvas: &'frame mut Canvas<Window>,
        textures: &'frame mut TextureStore<'tex>,
    ) -> Self {
        CanvasRenderer {
            canvas,
            textures,
            tint: None,
            alpha: None,
        }
    }

    fn copy(
        &mut self,
        image: ImageHandle,
        src: Option<Rect>,
        dest: Rect,
        flip_x: bool,
        flip_y: bool,
    ) -> Result<(), String> {
        let tint = self.tint;
        let alpha = self.alpha;
        let texture = self.textures.get_mut(image)?;

        match tint {
            Some(color) => texture.set_color_mod(color.r, color.g, color.b),
            None => texture.set_color_mod(255, 255, 255),
        }
        texture.set_alpha_mod(alpha.unwrap_or(255));

        self.canvas.copy_ex(
            texture,
            src.map(to_sdl_rect),
            Some(to_sdl_rect(dest)),
            0.0,
            None,
            flip_x,
            flip_y,
        )
    }
}

impl Renderer for CanvasRenderer<'_, '_> {
    fn draw_image(
        &mut self,
        image: ImageHandle,
        dest: Rect,
        flip_x: bool,
        flip_y: bool,
    ) -> Result<(), String> {
        self.copy(image, None, dest, flip_x, flip_y)
    }

    fn draw_image_frame(
        &mut self,
        image: ImageHandle,
        src: Rect,
        dest: Rect,
        flip_x: bool,
        flip_y: bool,
    ) -> Result<(), String> {
        self.copy(image, Some(src), dest, flip_x, flip_y)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), String> {
        self.canvas.set_draw_color(color);
        self.canvas.fill_rect(Some(to_sdl_rect(rect)))
    }

    fn fill_circle(&mut self, center: Position, radius: f32, color: Color) -> Result<(), String> {
        self.canvas.set_draw_color(color);

        // Horizontal spans, one per scanline; plenty for star-sized circles
        let r = radius.max(0.5);
        let mut dy = -r;
        while dy <= r {
            let half_width = (r * r - dy * dy).max(0.0).sqrt();
            let span = Rect::new(
                center.x - half_width,
                center.y + dy,
                half_width * 2.0,
                1.0,
            );
            self.canvas.fill_rect(Some(to_sdl_rect(span)))?;
            dy += 1.0;
        }
        Ok(())
    }

    fn set_tint(&mut self, color: Color) {
        self.tint = Some(color);
    }

    fn clear_tint(&mut self) {
        self.tint = None;
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = Some(alpha);
    }

    fn clear_alpha(&mut self) {
        self.alpha = None;
    }
}
