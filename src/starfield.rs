//! Scrolling space backgrounds: a star field and an asteroid belt
//!
//! Both layers scroll right to left and wrap around, with per-particle
//! speeds for a cheap parallax effect. They react to the level's pause and
//! resume scrolling events, which is how boss encounters hold the scenery
//! still.

use crate::geometry::{Position, Rect, Size};
use crate::renderer::{FrameContext, ImageHandle, Renderer};
use rand::Rng;
use sdl2::pixels::Color;

struct Star {
    position: Position,
    radius: f32,
    speed: f32,
    brightness: u8,
}

pub struct StarField {
    stars: Vec<Star>,
    scrolling: bool,
}

impl StarField {
    pub fn new(count: usize, viewport: Size) -> Self {
        let mut rng = rand::thread_rng();
        let stars = (0..count)
            .map(|_| Star {
                position: Position::new(
                    rng.gen_range(0.0..viewport.width),
                    rng.gen_range(0.0..viewport.height),
                ),
                radius: rng.gen_range(1.0..3.0),
                speed: rng.gen_range(0.5..3.0),
                brightness: rng.gen_range(100..=255),
            })
            .collect();

        StarField {
            stars,
            scrolling: true,
        }
    }

    pub fn set_scrolling(&mut self, scrolling: bool) {
        self.scrolling = scrolling;
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        if !self.scrolling {
            return;
        }

        let mut rng = rand::thread_rng();
        for star in &mut self.stars {
            star.position.x -= star.speed;
            if star.position.x < -star.radius {
                // Re-enter on the right at a fresh height
                star.position.x = ctx.viewport.width + star.radius;
                star.position.y = rng.gen_range(0.0..ctx.viewport.height);
            }
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        for star in &self.stars {
            let shade = star.brightness;
            renderer.fill_circle(
                star.position,
                star.radius,
                Color::RGB(shade, shade, shade),
            )?;
        }
        Ok(())
    }
}

struct Asteroid {
    position: Position,
    size: Size,
    speed: f32,
}

/// Sparse drifting asteroids behind the action, drawn from one image at
/// random scales.
pub struct AsteroidField {
    image: ImageHandle,
    asteroids: Vec<Asteroid>,
    scrolling: bool,
}

const ASTEROID_MIN_WIDTH: f32 = 24.0;
const ASTEROID_MAX_WIDTH: f32 = 96.0;

impl AsteroidField {
    pub fn new(image: ImageHandle, count: usize, viewport: Size) -> Self {
        let mut rng = rand::thread_rng();
        let aspect = image.height as f32 / image.width as f32;
        let asteroids = (0..count)
            .map(|_| {
                let width = rng.gen_range(ASTEROID_MIN_WIDTH..ASTEROID_MAX_WIDTH);
                Asteroid {
                    position: Position::new(
                        rng.gen_range(0.0..viewport.width),
                        rng.gen_range(0.0..viewport.height),
                    ),
                    size: Size::new(width, width * aspect),
                    speed: rng.gen_range(0.3..1.5),
                }
            })
            .collect();

        AsteroidField {
            image,
            asteroids,
            scrolling: true,
        }
    }

    pub fn set_scrolling(&mut self, scrolling: bool) {
        self.scrolling = scrolling;
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        if !self.scrolling {
            return;
        }

        let mut rng = rand::thread_rng();
        for asteroid in &mut self.asteroids {
            asteroid.position.x -= asteroid.speed;
            if asteroid.position.x < -asteroid.size.width {
                asteroid.position.x = ctx.viewport.width;
                asteroid.position.y = rng.gen_range(0.0..ctx.viewport.height);
            }
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        for asteroid in &self.asteroids {
            let dest = Rect::from_parts(asteroid.position, asteroid.size);
            renderer.draw_image(self.image, dest, false, false)?;
        }
        Ok(())
    }
}
