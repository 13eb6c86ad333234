//! Game orchestration: one update and one draw per frame
//!
//! # Architecture
//!
//! `Game` owns the player, the four object pools, the background layers and
//! the level run, and wires them together in a fixed order each tick:
//!
//! 1. Replay due level events (spawns, scrolling control)
//! 2. Apply player input (steering, firing)
//! 3. Scroll the backgrounds
//! 4. Update enemies, resolving ship-to-ship contact
//! 5. Update projectiles, resolving hits on enemies and the player
//! 6. Update powerups, resolving pickups
//! 7. Update explosions and the player's own effects
//!
//! Collision work happens inside the pools' update callbacks, so every pool
//! makes exactly one pass per frame and removal stays an implementation
//! detail of the pool.

use crate::audio::{AudioBackend, AudioSession};
use crate::collision;
use crate::enemies::{Enemies, EnemyType};
use crate::explosions::Explosions;
use crate::geometry::{Position, Rect, Size};
use crate::level::{Level, LevelEventKind, LevelRun};
use crate::player::{Player, MAX_ENERGY, MAX_SHIELD};
use crate::powerups::Powerups;
use crate::projectiles::{ProjectileSource, ProjectileType, Projectiles};
use crate::renderer::{FrameContext, ImageHandle, Renderer};
use crate::starfield::{AsteroidField, StarField};
use sdl2::pixels::Color;
use std::collections::HashMap;

const STAR_COUNT: usize = 96;
const ASTEROID_COUNT: usize = 12;
const MUSIC_TRACK: &str = "level";

/// Keyboard state relevant to the game, already decoded by the host shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub firing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Running,
    GameOver,
}

/// Every image the game draws, loaded once by the host shell.
pub struct GameImages {
    pub player: ImageHandle,
    pub enemies: HashMap<EnemyType, ImageHandle>,
    pub projectiles: HashMap<ProjectileType, ImageHandle>,
    pub powerup_atlas: ImageHandle,
    pub explosion_atlas: ImageHandle,
    pub asteroid: ImageHandle,
}

pub struct Game<B> {
    player: Player,
    player_image: ImageHandle,
    enemies: Enemies,
    projectiles: Projectiles,
    powerups: Powerups,
    explosions: Explosions,
    stars: StarField,
    asteroids: AsteroidField,
    show_asteroids: bool,
    level: LevelRun,
    audio: AudioSession<B>,
    phase: GamePhase,
    was_firing: bool,
}

impl<B: AudioBackend> Game<B> {
    pub fn new(images: GameImages, level: Level, viewport: Size, backend: B) -> Self {
        let start = Position::new(40.0, viewport.height / 2.0);

        Game {
            player: Player::new(images.player, start),
            player_image: images.player,
            enemies: Enemies::new(images.enemies),
            projectiles: Projectiles::new(images.projectiles),
            powerups: Powerups::new(images.powerup_atlas),
            explosions: Explosions::new(images.explosion_atlas),
            stars: StarField::new(STAR_COUNT, viewport),
            asteroids: AsteroidField::new(images.asteroid, ASTEROID_COUNT, viewport),
            show_asteroids: true,
            level: LevelRun::new(level),
            audio: AudioSession::new(backend),
            phase: GamePhase::Running,
            was_firing: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn level_name(&self) -> &str {
        &self.level.level().name
    }

    pub fn audio(&mut self) -> &mut AudioSession<B> {
        &mut self.audio
    }

    pub fn toggle_asteroids(&mut self) {
        self.show_asteroids = !self.show_asteroids;
    }

    pub fn select_primary_weapon(&mut self) {
        self.player.select_primary_weapon();
    }

    pub fn select_secondary_weapon(&mut self) {
        self.player.select_secondary_weapon();
    }

    /// Starts (or restarts after game over) the current level from the top.
    pub fn start(&mut self, ctx: &FrameContext) {
        self.player = Player::new(self.player_image, Position::new(40.0, ctx.viewport.height / 2.0));
        self.enemies.clear();
        self.projectiles.clear();
        self.powerups.clear();
        self.explosions.clear();
        self.stars.set_scrolling(true);
        self.asteroids.set_scrolling(true);
        self.level.start(ctx.now);
        self.phase = GamePhase::Running;
        self.was_firing = false;
        self.start_music();
    }

    fn start_music(&mut self) {
        if let Err(error) = self.audio.play_music(MUSIC_TRACK) {
            eprintln!("Warning: could not start music: {}", error);
        }
    }

    fn replay_level_events(&mut self, ctx: &FrameContext) {
        // Copy out the due events; spawning needs the pools mutably
        let due: Vec<_> = self.level.poll(ctx.now).to_vec();

        for event in due {
            let position = event.position(ctx.viewport);
            match event.kind {
                LevelEventKind::SpawnEnemy { enemy } => {
                    self.enemies.spawn(enemy, position);
                }
                LevelEventKind::SpawnPowerup { powerup } => {
                    if let Err(error) = self.powerups.spawn(powerup, position) {
                        eprintln!("Warning: could not spawn powerup: {}", error);
                    }
                }
                LevelEventKind::PauseScrolling => {
                    self.stars.set_scrolling(false);
                    self.asteroids.set_scrolling(false);
                }
                LevelEventKind::ResumeScrolling => {
                    self.stars.set_scrolling(true);
                    self.asteroids.set_scrolling(true);
                }
            }
        }
    }

    fn apply_input(&mut self, ctx: &FrameContext, input: InputState) {
        let dx = (input.right as i32 - input.left as i32) as f32;
        let dy = (input.down as i32 - input.up as i32) as f32;
        self.player.steer(dx, dy, ctx.now, ctx.viewport);

        // Non-repeating weapons want a fresh key press per shot
        let triggered = if self.player.allows_perma_fire() {
            input.firing
        } else {
            input.firing && !self.was_firing
        };
        self.was_firing = input.firing;

        if triggered && self.player.shoot(ctx.now, &mut self.projectiles) {
            if let Err(error) = self.audio.play_effect("laser") {
                eprintln!("Warning: could not play effect: {}", error);
            }
        }
    }

    pub fn update(&mut self, ctx: &FrameContext, input: InputState) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        // The first tick only starts the clock; a full reset here would throw
        // away setup (weapon selection) done before the first frame
        if !self.level.is_started() {
            self.level.start(ctx.now);
            self.start_music();
        }

        self.replay_level_events(ctx);
        self.apply_input(ctx, input);

        self.stars.update(ctx);
        self.asteroids.update(ctx);

        self.enemies.update(
            ctx,
            &mut self.projectiles,
            &mut self.explosions,
            |enemy| {
                collision::enemy_vs_player(enemy, &mut self.player, ctx.now);
            },
        );

        self.projectiles.update(ctx, |projectile| match projectile.source() {
            ProjectileSource::Player => {
                collision::projectile_vs_enemies(projectile, &mut self.enemies)
            }
            ProjectileSource::Enemy => {
                collision::projectile_vs_player(projectile, &mut self.player, ctx.now)
            }
        });

        self.powerups.update(ctx, |powerup| {
            collision::powerup_vs_player(powerup, &mut self.player, ctx.now)
        });

        self.explosions.update(ctx);
        self.player.update(ctx);

        if !self.player.is_alive() {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.enemies.clear();
        self.projectiles.clear();
        self.powerups.clear();
        self.player.clear_effects();
        self.audio.stop_music();
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        self.stars.draw(renderer)?;
        if self.show_asteroids {
            self.asteroids.draw(renderer)?;
        }

        self.powerups.draw(renderer)?;
        self.enemies.draw(renderer)?;
        self.projectiles.draw(renderer)?;
        if self.player.is_alive() {
            self.player.draw(renderer)?;
        }
        self.explosions.draw(renderer)?;

        self.draw_hud(renderer)
    }

    /// Energy and shield bars, top-left corner.
    fn draw_hud(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        const BAR_WIDTH: f32 = 200.0;
        const BAR_HEIGHT: f32 = 12.0;

        let energy = (self.player.energy() / MAX_ENERGY).clamp(0.0, 1.0);
        let shield = (self.player.shield() / MAX_SHIELD).clamp(0.0, 1.0);

        renderer.fill_rect(
            Rect::new(16.0, 16.0, BAR_WIDTH, BAR_HEIGHT),
            Color::RGB(40, 40, 40),
        )?;
        renderer.fill_rect(
            Rect::new(16.0, 16.0, BAR_WIDTH * energy, BAR_HEIGHT),
            Color::RGB(80, 220, 80),
        )?;

        renderer.fill_rect(
            Rect::new(16.0, 34.0, BAR_WIDTH, BAR_HEIGHT),
            Color::RGB(40, 40, 40),
        )?;
        renderer.fill_rect(
            Rect::new(16.0, 34.0, BAR_WIDTH * shield, BAR_HEIGHT),
            Color::RGB(80, 140, 240),
        )?;

        Ok(())
    }
}
