use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::Color;

mod animation;
mod assets;
mod audio;
mod collision;
mod enemies;
mod explosions;
mod game;
mod geometry;
mod level;
mod movement;
mod player;
mod powerups;
mod projectiles;
mod render_action;
mod render_node;
mod renderer;
mod sprite;
mod starfield;

use assets::{CanvasRenderer, TextureStore};
use audio::NullAudioBackend;
use enemies::EnemyType;
use game::{Game, GameImages, GamePhase, InputState};
use geometry::Size;
use level::Level;
use projectiles::ProjectileType;
use renderer::FrameContext;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

// Window resolution constants
const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 800;

const LEVEL_PATH: &str = "assets/levels/level1.json";

/// Loads the first level from disk, falling back to the built-in one so the
/// game always starts.
fn load_level() -> Level {
    match Level::load(Path::new(LEVEL_PATH)) {
        Ok(level) => level,
        Err(error) => {
            eprintln!(
                "Warning: could not load {}: {} - using built-in level",
                LEVEL_PATH, error
            );
            Level::built_in()
        }
    }
}

fn main() -> Result<(), String> {
    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;
    let _image_context = sdl2::image::init(sdl2::image::InitFlag::PNG)?;

    let window = video_subsystem
        .window("Nova Strike", WINDOW_WIDTH, WINDOW_HEIGHT)
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;

    let mut canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
    canvas.set_blend_mode(sdl2::render::BlendMode::Blend);

    let texture_creator = canvas.texture_creator();
    let mut event_pump = sdl_context.event_pump()?;

    // Load sprite textures
    let mut textures = TextureStore::new();
    let player_image = textures.load(&texture_creator, "assets/sprites/ship.png")?;

    let mut enemy_images = HashMap::new();
    enemy_images.insert(
        EnemyType::Spaceship,
        textures.load(&texture_creator, "assets/sprites/enemy_spaceship.png")?,
    );
    enemy_images.insert(
        EnemyType::LargeSpaceship,
        textures.load(&texture_creator, "assets/sprites/enemy_large_spaceship.png")?,
    );

    let mut projectile_images = HashMap::new();
    projectile_images.insert(
        ProjectileType::Plasma,
        textures.load(&texture_creator, "assets/sprites/plasma_bolt.png")?,
    );
    projectile_images.insert(
        ProjectileType::Ion,
        textures.load(&texture_creator, "assets/sprites/ion_bolt.png")?,
    );

    let images = GameImages {
        player: player_image,
        enemies: enemy_images,
        projectiles: projectile_images,
        powerup_atlas: textures.load(&texture_creator, "assets/sprites/powerups.png")?,
        explosion_atlas: textures.load(&texture_creator, "assets/sprites/explosion.png")?,
        asteroid: textures.load(&texture_creator, "assets/sprites/asteroid.png")?,
    };

    let viewport = Size::new(WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32);
    let mut game = Game::new(images, load_level(), viewport, NullAudioBackend);

    println!("Level: {}", game.level_name());

    'running: loop {
        let mut restart_requested = false;

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::M),
                    ..
                } => game.audio().toggle_mute(),
                Event::KeyDown {
                    keycode: Some(Keycode::B),
                    ..
                } => game.toggle_asteroids(),
                Event::KeyDown {
                    keycode: Some(Keycode::Num1),
                    ..
                } => game.select_primary_weapon(),
                Event::KeyDown {
                    keycode: Some(Keycode::Num2),
                    ..
                } => game.select_secondary_weapon(),
                Event::KeyDown {
                    keycode: Some(Keycode::Return),
                    ..
                } => restart_requested = true,
                _ => {}
            }
        }

        let keyboard = event_pump.keyboard_state();
        let input = InputState {
            up: keyboard.is_scancode_pressed(Scancode::Up)
                || keyboard.is_scancode_pressed(Scancode::W),
            down: keyboard.is_scancode_pressed(Scancode::Down)
                || keyboard.is_scancode_pressed(Scancode::S),
            left: keyboard.is_scancode_pressed(Scancode::Left)
                || keyboard.is_scancode_pressed(Scancode::A),
            right: keyboard.is_scancode_pressed(Scancode::Right)
                || keyboard.is_scancode_pressed(Scancode::D),
            firing: keyboard.is_scancode_pressed(Scancode::Space),
        };

        let ctx = FrameContext::new(Instant::now(), viewport);

        if restart_requested && game.phase() == GamePhase::GameOver {
            game.start(&ctx);
        }

        game.update(&ctx, input);

        canvas.set_draw_color(Color::RGB(4, 4, 16));
        canvas.clear();
        {
            let mut renderer = CanvasRenderer::new(&mut canvas, &mut textures);
            game.draw(&mut renderer)?;
        }
        canvas.present();

        // Cap framerate to ~60 FPS
        std::thread::sleep(std::time::Duration::new(0, 1_000_000_000u32 / 60));
    }

    Ok(())
}
