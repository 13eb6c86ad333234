//! The player ship: vitals, weapons, pickups, and hurt feedback
//!
//! # Architecture
//!
//! The player is a `MovingSprite` steered by keyboard deltas instead of a
//! movement profile, plus the combat state the pools interact with: energy
//! and shield, a two-slot weapon loadout with per-slot fire gates, timed
//! pickup effects, and a post-hit invincibility window.
//!
//! Hurt feedback runs through `RenderActionState<Vitals>`: taking damage
//! attaches an alpha blink for the invincibility window, and when that blink
//! expires the chain predicate checks the vitals snapshot: if energy is
//! critical, a red tint blink takes over until the next pickup or hit
//! replaces the effect.

use crate::geometry::{Position, Rect, Size};
use crate::powerups::PowerupType;
use crate::projectiles::{fire_gate_open, ProjectileSource, ProjectileType, Projectiles};
use crate::render_action::{AlphaBlinkAction, RenderActionState, TintBlinkAction};
use crate::render_node::RenderAction;
use crate::renderer::{FrameContext, ImageHandle, Renderer};
use crate::sprite::{display_size, MovingSprite};
use sdl2::pixels::Color;
use std::time::{Duration, Instant};

pub const PLAYER_WIDTH: f32 = 256.0;
pub const START_ENERGY: f32 = 25.0;
pub const MAX_ENERGY: f32 = 100.0;
pub const MAX_SHIELD: f32 = 100.0;
pub const BASE_SPEED: f32 = 5.0;
const INVINCIBLE_FOR: Duration = Duration::from_millis(2000);
const LOW_ENERGY: f32 = 10.0;
/// Hitboxes in source-image pixels of the ship artwork.
static PLAYER_HITBOXES: [Rect; 2] = [
    Rect {
        x: 0.0,
        y: 150.0,
        width: 310.0,
        height: 230.0,
    },
    Rect {
        x: 310.0,
        y: 40.0,
        width: 440.0,
        height: 450.0,
    },
];

/// Snapshot of the player's vitals, handed to effect-chain predicates.
#[derive(Debug, Clone, Copy)]
pub struct Vitals {
    pub energy: f32,
    #[allow(dead_code)] // Current predicates only read energy
    pub shield: f32,
}

fn hurt_blink() -> Box<dyn RenderAction> {
    Box::new(AlphaBlinkAction::new(90, 255, Duration::from_millis(100)))
}

fn low_energy_blink() -> Box<dyn RenderAction> {
    Box::new(TintBlinkAction::new(
        Color::RGB(255, 64, 64),
        Duration::from_millis(300),
    ))
}

fn low_energy(vitals: &Vitals) -> bool {
    vitals.energy <= LOW_ENERGY
}

/// Alpha blink for the invincibility window, chained into an open-ended
/// low-energy tint blink.
fn hurt_effect() -> RenderActionState<Vitals> {
    let mut effect = RenderActionState::new(hurt_blink, Some(INVINCIBLE_FOR));
    effect.chain(low_energy, RenderActionState::new(low_energy_blink, None));
    effect
}

pub struct Player {
    sprite: MovingSprite,
    energy: f32,
    shield: f32,
    primary_weapon_active: bool,
    last_shot_primary: Option<Instant>,
    last_shot_secondary: Option<Instant>,
    last_hurt: Option<Instant>,
    weapon_boost_until: Option<Instant>,
    speed_boost: f32,
    speed_boost_until: Option<Instant>,
    effect: Option<RenderActionState<Vitals>>,
}

impl Player {
    pub fn new(image: ImageHandle, position: Position) -> Self {
        let size = display_size(image, PLAYER_WIDTH);

        Player {
            sprite: MovingSprite::new(image, position, size),
            energy: START_ENERGY,
            shield: 0.0,
            primary_weapon_active: true,
            last_shot_primary: None,
            last_shot_secondary: None,
            last_hurt: None,
            weapon_boost_until: None,
            speed_boost: 0.0,
            speed_boost_until: None,
            effect: None,
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn shield(&self) -> f32 {
        self.shield
    }

    pub fn vitals(&self) -> Vitals {
        Vitals {
            energy: self.energy,
            shield: self.shield,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    pub fn position(&self) -> Position {
        self.sprite.position()
    }

    pub fn area(&self) -> Rect {
        self.sprite.area()
    }

    /// World-space hitboxes for collision testing.
    pub fn hitboxes(&self) -> Vec<Rect> {
        self.sprite.sprite().hitboxes(&PLAYER_HITBOXES)
    }

    pub fn intersects(&self, area: &Rect) -> bool {
        self.hitboxes().iter().any(|hitbox| hitbox.intersects(area))
    }

    /// Still inside the post-hit invincibility window at `now`.
    pub fn is_invincible(&self, now: Instant) -> bool {
        match self.last_hurt {
            None => false,
            Some(hurt) => now.duration_since(hurt) < INVINCIBLE_FOR,
        }
    }

    /// Applies incoming damage unless invincible: shield absorbs first, the
    /// remainder drains energy. Opens the invincibility window and starts the
    /// hurt blink.
    pub fn damage(&mut self, amount: f32, now: Instant) {
        if amount <= 0.0 || self.is_invincible(now) {
            return;
        }

        let shield_damage = amount.min(self.shield);
        self.shield -= shield_damage;
        self.energy = (self.energy - (amount - shield_damage)).max(0.0);
        self.last_hurt = Some(now);

        // A fresh hit always restarts the effect chain from the alpha blink.
        // Cancel, not disable: disabling would activate the old chain's tint
        // blink and leave it attached with no owner.
        if let Some(mut previous) = self.effect.take() {
            previous.cancel(self.sprite.node_mut());
        }
        let mut effect = hurt_effect();
        effect.enable(self.sprite.node_mut(), now);
        self.effect = Some(effect);
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn die(&mut self, now: Instant) {
        self.damage(self.energy + self.shield, now);
    }

    #[allow(dead_code)] // Reserved for a weapon indicator in the HUD
    pub fn is_primary_weapon_active(&self) -> bool {
        self.primary_weapon_active
    }

    pub fn select_primary_weapon(&mut self) {
        self.primary_weapon_active = true;
    }

    pub fn select_secondary_weapon(&mut self) {
        self.primary_weapon_active = false;
    }

    fn active_projectile(&self) -> ProjectileType {
        if self.primary_weapon_active {
            ProjectileType::Plasma
        } else {
            ProjectileType::Ion
        }
    }

    /// Whether holding the fire key keeps shooting, a property of the active
    /// projectile type.
    pub fn allows_perma_fire(&self) -> bool {
        self.active_projectile().settings().allow_perma_fire
    }

    fn last_shot(&self) -> Option<Instant> {
        if self.primary_weapon_active {
            self.last_shot_primary
        } else {
            self.last_shot_secondary
        }
    }

    pub fn can_shoot(&self, now: Instant) -> bool {
        let delay = self.active_projectile().fire_delay();
        fire_gate_open(self.last_shot(), delay, now)
    }

    /// Damage multiplier for fired projectiles, reflecting an active weapon
    /// boost.
    fn damage_multiplier(&self, now: Instant) -> f32 {
        match self.weapon_boost_until {
            Some(until) if now < until => 2.0,
            _ => 1.0,
        }
    }

    /// Steering speed in pixels per tick, reflecting an active speed boost.
    pub fn speed(&self, now: Instant) -> f32 {
        match self.speed_boost_until {
            Some(until) if now < until => BASE_SPEED + self.speed_boost,
            _ => BASE_SPEED,
        }
    }

    /// Fires the active weapon if its gate is open. Returns whether a
    /// projectile was spawned.
    pub fn shoot(&mut self, now: Instant, projectiles: &mut Projectiles) -> bool {
        if !self.can_shoot(now) {
            return false;
        }
        let kind = self.active_projectile();

        if self.primary_weapon_active {
            self.last_shot_primary = Some(now);
        } else {
            self.last_shot_secondary = Some(now);
        }

        // Muzzle at the nose of the ship, vertically centered
        let area = self.area();
        let muzzle = Position::new(area.x + area.width, area.y + area.height / 2.0);
        projectiles.spawn(
            kind,
            muzzle,
            ProjectileSource::Player,
            self.damage_multiplier(now),
            1.0,
        );

        true
    }

    /// Moves the ship by a steering delta scaled to the current speed,
    /// clamped so the whole ship stays inside the viewport.
    pub fn steer(&mut self, dx: f32, dy: f32, now: Instant, viewport: Size) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        let speed = self.speed(now);
        let position = self.position();
        let size = self.sprite.sprite().size();
        let x = (position.x + dx * speed).clamp(0.0, viewport.width - size.width);
        let y = (position.y + dy * speed).clamp(0.0, viewport.height - size.height);
        self.sprite.move_to(x, y);
    }

    /// Applies a pickup: instant effects adjust the vitals, timed effects
    /// open (or extend) their boost window.
    pub fn apply_powerup(&mut self, kind: PowerupType, now: Instant) {
        let settings = kind.settings();
        match kind {
            PowerupType::Energy => {
                self.energy = (self.energy + settings.value).min(MAX_ENERGY);
            }
            PowerupType::Shield => {
                self.shield = (self.shield + settings.value).min(MAX_SHIELD);
            }
            PowerupType::Weapon => {
                self.weapon_boost_until = settings.duration.map(|duration| now + duration);
            }
            PowerupType::Speed => {
                self.speed_boost = settings.value;
                self.speed_boost_until = settings.duration.map(|duration| now + duration);
            }
        }
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        let vitals = self.vitals();
        if let Some(effect) = self.effect.as_mut() {
            effect.update(self.sprite.node_mut(), &vitals, ctx.now);
        }
        self.sprite.update(ctx.now);
    }

    pub fn clear_effects(&mut self) {
        if let Some(mut effect) = self.effect.take() {
            effect.cancel(self.sprite.node_mut());
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        self.sprite.draw(renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::test_image;
    use std::collections::HashMap;

    fn player() -> Player {
        Player::new(test_image(750, 500), Position::new(50.0, 300.0))
    }

    fn projectiles() -> Projectiles {
        let mut images = HashMap::new();
        images.insert(ProjectileType::Plasma, test_image(144, 36));
        images.insert(ProjectileType::Ion, test_image(112, 28));
        Projectiles::new(images)
    }

    #[test]
    fn test_damage_opens_invincibility_window() {
        let base = Instant::now();
        let mut player = player();

        player.damage(5.0, base);
        assert_eq!(player.energy(), 20.0);
        assert!(player.is_invincible(base + Duration::from_millis(1999)));
        assert!(!player.is_invincible(base + Duration::from_millis(2000)));
    }

    #[test]
    fn test_damage_during_invincibility_is_ignored() {
        let base = Instant::now();
        let mut player = player();

        player.damage(5.0, base);
        player.damage(100.0, base + Duration::from_millis(500));
        assert_eq!(player.energy(), 20.0);

        player.damage(5.0, base + Duration::from_millis(2000));
        assert_eq!(player.energy(), 15.0);
    }

    #[test]
    fn test_shield_absorbs_before_energy() {
        let base = Instant::now();
        let mut player = player();
        player.apply_powerup(PowerupType::Shield, base);
        assert_eq!(player.shield(), 10.0);

        player.damage(12.0, base);
        assert_eq!(player.shield(), 0.0);
        assert_eq!(player.energy(), START_ENERGY - 2.0);
    }

    #[test]
    fn test_die_drains_everything_in_one_hit() {
        let base = Instant::now();
        let mut player = player();
        player.apply_powerup(PowerupType::Shield, base);

        player.die(base);
        assert_eq!(player.energy(), 0.0);
        assert_eq!(player.shield(), 0.0);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_energy_powerup_clamps_at_max() {
        let base = Instant::now();
        let mut player = player();

        for _ in 0..20 {
            player.apply_powerup(PowerupType::Energy, base);
        }
        assert_eq!(player.energy(), MAX_ENERGY);
    }

    #[test]
    fn test_speed_boost_expires() {
        let base = Instant::now();
        let mut player = player();
        assert_eq!(player.speed(base), BASE_SPEED);

        player.apply_powerup(PowerupType::Speed, base);
        assert_eq!(player.speed(base), BASE_SPEED + 2.0);

        let after = base + Duration::from_millis(8_000);
        assert_eq!(player.speed(after), BASE_SPEED);
    }

    #[test]
    fn test_weapon_boost_doubles_projectile_damage() {
        let base = Instant::now();
        let mut player = player();
        let mut pool = projectiles();

        player.shoot(base, &mut pool);
        player.apply_powerup(PowerupType::Weapon, base);
        player.shoot(base + Duration::from_millis(300), &mut pool);

        let damages: Vec<f32> = pool.query().iter().map(|p| p.damage()).collect();
        assert_eq!(damages, vec![5.0, 10.0]);
    }

    #[test]
    fn test_fire_gate_respects_delay() {
        let base = Instant::now();
        let mut player = player();
        let mut pool = projectiles();

        assert!(player.shoot(base, &mut pool));
        assert!(!player.shoot(base + Duration::from_millis(100), &mut pool));
        assert!(player.shoot(base + Duration::from_millis(250), &mut pool));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_weapon_slots_gate_independently() {
        let base = Instant::now();
        let mut player = player();
        let mut pool = projectiles();

        assert!(player.shoot(base, &mut pool));
        // The secondary slot has its own untouched gate
        player.select_secondary_weapon();
        assert!(player.shoot(base, &mut pool));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_steer_clamps_to_viewport() {
        let base = Instant::now();
        let viewport = Size::new(1280.0, 800.0);
        let mut player = player();

        for _ in 0..500 {
            player.steer(-1.0, -1.0, base, viewport);
        }
        let position = player.position();
        assert_eq!(position.x, 0.0);
        assert_eq!(position.y, 0.0);

        for _ in 0..500 {
            player.steer(1.0, 1.0, base, viewport);
        }
        let area = player.area();
        assert_eq!(area.x + area.width, viewport.width);
        assert_eq!(area.y + area.height, viewport.height);
    }

    #[test]
    fn test_hurt_blink_chains_into_low_energy_blink() {
        let base = Instant::now();
        let mut player = player();

        // Drop energy below the critical threshold, then take a hit
        player.energy = 8.0;
        player.damage(1.0, base);
        assert_eq!(player.sprite.sprite().node().action_count(), 1);

        // The alpha blink expires after the invincibility window; the tint
        // blink takes over because energy is still critical
        let ctx = FrameContext::new(base + Duration::from_millis(2000), Size::new(1280.0, 800.0));
        player.update(&ctx);
        assert_eq!(player.sprite.sprite().node().action_count(), 1);
        assert!(player.effect.as_ref().is_some_and(|e| e.is_enabled()));
    }

    #[test]
    fn test_rehit_at_window_edge_does_not_stack_actions() {
        let base = Instant::now();
        let mut player = player();

        // Critical energy arms the tint-blink successor behind the alpha blink
        player.energy = 8.0;
        player.damage(1.0, base);
        assert_eq!(player.sprite.sprite().node().action_count(), 1);

        // The next hit lands exactly as the invincibility window closes,
        // before any update has retired the old effect: the old chain must be
        // torn down, not handed off, or its tint blink stays attached forever
        player.damage(1.0, base + Duration::from_millis(2000));
        assert_eq!(player.sprite.sprite().node().action_count(), 1);
        assert!(player.effect.as_ref().is_some_and(|e| e.is_enabled()));
    }

    #[test]
    fn test_hurt_blink_ends_cleanly_with_healthy_energy() {
        let base = Instant::now();
        let mut player = player();

        player.damage(1.0, base);
        let ctx = FrameContext::new(base + Duration::from_millis(2000), Size::new(1280.0, 800.0));
        player.update(&ctx);

        assert_eq!(player.sprite.sprite().node().action_count(), 0);
        assert!(player.effect.as_ref().is_some_and(|e| !e.is_enabled()));
    }
}
