//! Enemy pool: type-indexed settings, weapons, damage, and lifecycle
//!
//! Like projectiles, enemies are data-driven: `ENEMY_SETTINGS` fixes each
//! type's size, vitals, movement profile, touch damage, weapon loadout and
//! image-space hitbox rectangles. An `Enemy` instance carries only the
//! mutable combat state (energy, shield, fire timestamps, weapon slot).
//!
//! The default behaviour (drift along the settings movement, shoot whenever
//! the fire gate opens) is all any current type needs; types that want more
//! get their own arm in `Enemy::update`.

use crate::explosions::Explosions;
use crate::geometry::{Position, Rect, Size};
use crate::movement::Movement;
use crate::projectiles::{fire_gate_open, ProjectileSource, ProjectileType, Projectiles};
use crate::renderer::{FrameContext, ImageHandle, Renderer};
use crate::sprite::{display_size, MovingSprite};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyType {
    Spaceship,
    LargeSpaceship,
}

pub struct EnemySettings {
    pub primary_projectile: Option<ProjectileType>,
    pub secondary_projectile: Option<ProjectileType>,
    /// Projectiles fired by this type render at this scale.
    pub projectile_scale: f32,
    /// Offset added to the default muzzle point (left of the enemy,
    /// vertically centered).
    pub muzzle_tweak: Position,
    pub width: f32,
    pub speed: f32,
    pub energy: f32,
    pub shield: f32,
    /// Damage dealt to the player on contact.
    pub touch_damage: f32,
    /// Scales the base damage of this type's projectiles.
    pub projectile_damage_multiplier: f32,
    /// Added on top of the projectile's own fire delay.
    pub extra_fire_delay: Duration,
    pub movement: Movement,
    /// Hitboxes in source-image pixels; empty means full sprite bounds.
    pub hitboxes: &'static [Rect],
}

static ENEMY_SETTINGS: [EnemySettings; 2] = [
    // Spaceship
    EnemySettings {
        primary_projectile: Some(ProjectileType::Plasma),
        secondary_projectile: None,
        projectile_scale: 0.6,
        muzzle_tweak: Position { x: 20.0, y: 37.0 },
        width: 160.0,
        speed: 1.0,
        energy: 10.0,
        shield: 0.0,
        touch_damage: 5.0,
        projectile_damage_multiplier: 0.25,
        extra_fire_delay: Duration::from_millis(1500),
        movement: Movement::SineLeft {
            amplitude: 50.0,
            wavelength: 300.0,
        },
        hitboxes: &[
            Rect {
                x: 0.0,
                y: 200.0,
                width: 748.0,
                height: 552.0,
            },
            Rect {
                x: 748.0,
                y: 0.0,
                width: 686.0,
                height: 752.0,
            },
        ],
    },
    // LargeSpaceship
    EnemySettings {
        primary_projectile: Some(ProjectileType::Plasma),
        secondary_projectile: Some(ProjectileType::Ion),
        projectile_scale: 0.8,
        muzzle_tweak: Position { x: 0.0, y: 0.0 },
        width: 240.0,
        speed: 0.6,
        energy: 30.0,
        shield: 10.0,
        touch_damage: 10.0,
        projectile_damage_multiplier: 0.4,
        extra_fire_delay: Duration::from_millis(2200),
        movement: Movement::SineLeft {
            amplitude: 30.0,
            wavelength: 500.0,
        },
        hitboxes: &[],
    },
];

impl EnemyType {
    pub fn settings(&self) -> &'static EnemySettings {
        &ENEMY_SETTINGS[*self as usize]
    }
}

pub struct Enemy {
    sprite: MovingSprite,
    kind: EnemyType,
    energy: f32,
    shield: f32,
    primary_weapon_active: bool,
    last_shot_primary: Option<Instant>,
    last_shot_secondary: Option<Instant>,
}

impl Enemy {
    fn new(kind: EnemyType, image: ImageHandle, position: Position, size: Size) -> Self {
        let settings = kind.settings();

        Enemy {
            sprite: MovingSprite::new(image, position, size),
            kind,
            energy: settings.energy,
            shield: settings.shield,
            primary_weapon_active: true,
            last_shot_primary: None,
            last_shot_secondary: None,
        }
    }

    pub fn settings(&self) -> &'static EnemySettings {
        self.kind.settings()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn energy(&self) -> f32 {
        self.energy
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn shield(&self) -> f32 {
        self.shield
    }

    pub fn position(&self) -> Position {
        self.sprite.position()
    }

    pub fn area(&self) -> Rect {
        self.sprite.area()
    }

    pub fn touch_damage(&self) -> f32 {
        self.settings().touch_damage
    }

    /// Applies incoming damage: shield absorbs first, the remainder drains
    /// energy, neither goes negative. Non-positive damage is a no-op.
    pub fn damage(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }

        let shield_damage = amount.min(self.shield);
        self.shield -= shield_damage;
        self.energy = (self.energy - (amount - shield_damage)).max(0.0);
    }

    /// World-space hitboxes for collision testing.
    pub fn hitboxes(&self) -> Vec<Rect> {
        self.sprite.sprite().hitboxes(self.settings().hitboxes)
    }

    /// True if any of this enemy's hitboxes intersects `area`.
    pub fn intersects(&self, area: &Rect) -> bool {
        self.hitboxes().iter().any(|hitbox| hitbox.intersects(area))
    }

    pub fn has_weapon(&self) -> bool {
        self.settings().primary_projectile.is_some()
    }

    pub fn has_secondary_weapon(&self) -> bool {
        self.settings().secondary_projectile.is_some()
    }

    pub fn is_primary_weapon_active(&self) -> bool {
        self.primary_weapon_active
    }

    pub fn select_primary_weapon(&mut self) -> bool {
        self.primary_weapon_active = true;
        self.has_weapon()
    }

    pub fn select_secondary_weapon(&mut self) -> bool {
        if self.has_secondary_weapon() {
            self.primary_weapon_active = false;
            return true;
        }
        false
    }

    fn active_projectile(&self) -> Option<ProjectileType> {
        let settings = self.settings();
        if self.primary_weapon_active {
            settings.primary_projectile
        } else {
            settings.secondary_projectile
        }
    }

    fn last_shot(&self) -> Option<Instant> {
        if self.primary_weapon_active {
            self.last_shot_primary
        } else {
            self.last_shot_secondary
        }
    }

    /// Whether the active weapon's fire gate is open at `now`.
    pub fn can_shoot(&self, now: Instant) -> bool {
        match self.active_projectile() {
            None => false,
            Some(kind) => {
                let delay = kind.fire_delay() + self.settings().extra_fire_delay;
                fire_gate_open(self.last_shot(), delay, now)
            }
        }
    }

    /// Fires the active weapon if its gate is open. Returns whether a
    /// projectile was spawned.
    pub fn shoot(&mut self, now: Instant, projectiles: &mut Projectiles) -> bool {
        let Some(kind) = self.active_projectile() else {
            return false;
        };

        let settings = self.settings();
        let delay = kind.fire_delay() + settings.extra_fire_delay;
        if !fire_gate_open(self.last_shot(), delay, now) {
            return false;
        }

        if self.primary_weapon_active {
            self.last_shot_primary = Some(now);
        } else {
            self.last_shot_secondary = Some(now);
        }

        // Default muzzle: just left of the enemy, vertically centered
        let position = self.position();
        let size = self.sprite.sprite().size();
        let projectile_width = kind.settings().width * settings.projectile_scale;
        let muzzle = Position::new(
            position.x - projectile_width + settings.muzzle_tweak.x,
            position.y + size.height / 2.0 + settings.muzzle_tweak.y,
        );

        projectiles.spawn(
            kind,
            muzzle,
            ProjectileSource::Enemy,
            settings.projectile_damage_multiplier,
            settings.projectile_scale,
        );

        true
    }

    /// Default per-tick behaviour: drift along the settings movement and
    /// shoot whenever possible. Types carrying a second weapon alternate
    /// slots shot by shot.
    fn update(&mut self, now: Instant, projectiles: &mut Projectiles) {
        let settings = self.settings();
        self.sprite.move_with(settings.movement, settings.speed);

        if self.can_shoot(now) && self.shoot(now, projectiles) && self.has_secondary_weapon() {
            if self.is_primary_weapon_active() {
                self.select_secondary_weapon();
            } else {
                self.select_primary_weapon();
            }
        }

        self.sprite.update(now);
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        self.sprite.draw(renderer)
    }
}

pub struct Enemies {
    images: HashMap<EnemyType, ImageHandle>,
    enemies: Vec<Enemy>,
}

impl Enemies {
    pub fn new(images: HashMap<EnemyType, ImageHandle>) -> Self {
        Enemies {
            images,
            enemies: Vec::new(),
        }
    }

    /// Display size of a type, derived from its configured width and the
    /// source image aspect ratio.
    pub fn enemy_size(&self, kind: EnemyType) -> Size {
        display_size(self.images[&kind], kind.settings().width)
    }

    /// Spawns an enemy. `position.x` is the leading (left) edge and
    /// `position.y` the vertical center, matching how the level timeline
    /// places spawns on the right viewport border.
    pub fn spawn(&mut self, kind: EnemyType, position: Position) -> &Enemy {
        let size = self.enemy_size(kind);
        let top_left = Position::new(position.x, position.y - size.height / 2.0);

        self.enemies
            .push(Enemy::new(kind, self.images[&kind], top_left, size));
        self.enemies.last().expect("just pushed")
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }

    /// Snapshot of all live enemies.
    #[allow(dead_code)] // Exposed for tests
    pub fn query(&self) -> Vec<&Enemy> {
        self.enemies.iter().collect()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn query_where<F>(&self, predicate: F) -> Vec<&Enemy>
    where
        F: Fn(&Enemy) -> bool,
    {
        self.enemies.iter().filter(|enemy| predicate(enemy)).collect()
    }

    /// Mutable access for damage resolution during the projectile pass.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.enemies.iter_mut()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// One lifecycle pass over the pool.
    ///
    /// An enemy found dead (energy drained by last frame's projectile pass,
    /// or by this frame's callback) spawns an explosion into `explosions` at
    /// detection time and is flagged; off-screen enemies are flagged without
    /// ceremony. Flags are applied in one compaction after the pass.
    pub fn update<F>(
        &mut self,
        ctx: &FrameContext,
        projectiles: &mut Projectiles,
        explosions: &mut Explosions,
        mut test_collision: F,
    ) where
        F: FnMut(&Enemy),
    {
        let mut to_remove = HashSet::new();

        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            if enemy.energy <= 0.0 {
                Self::explode(enemy, explosions);
                to_remove.insert(index);
                continue;
            }

            enemy.update(ctx.now, projectiles);
            test_collision(enemy);

            if enemy.energy <= 0.0 {
                Self::explode(enemy, explosions);
                to_remove.insert(index);
            } else if !ctx.is_on_screen(&enemy.area()) {
                to_remove.insert(index);
            }
        }

        if !to_remove.is_empty() {
            let mut index = 0;
            self.enemies.retain(|_| {
                let keep = !to_remove.contains(&index);
                index += 1;
                keep
            });
        }
    }

    fn explode(enemy: &Enemy, explosions: &mut Explosions) {
        if let Err(error) = explosions.spawn(enemy.area().center(), 0.25) {
            eprintln!("Warning: could not spawn death explosion: {}", error);
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        for enemy in &self.enemies {
            enemy.draw(renderer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::test_image;

    fn images() -> HashMap<EnemyType, ImageHandle> {
        let mut images = HashMap::new();
        images.insert(EnemyType::Spaceship, test_image(1434, 752));
        images.insert(EnemyType::LargeSpaceship, test_image(1200, 600));
        images
    }

    fn explosions() -> Explosions {
        Explosions::new(test_image(7 * 212, 212))
    }

    fn projectiles() -> Projectiles {
        let mut images = HashMap::new();
        images.insert(ProjectileType::Plasma, test_image(144, 36));
        images.insert(ProjectileType::Ion, test_image(112, 28));
        Projectiles::new(images)
    }

    fn ctx_at(now: Instant) -> FrameContext {
        FrameContext::new(now, Size::new(1280.0, 800.0))
    }

    #[test]
    fn test_damage_drains_shield_before_energy() {
        let mut pool = Enemies::new(images());
        pool.spawn(EnemyType::LargeSpaceship, Position::new(500.0, 400.0));

        let enemy = pool.enemies.first_mut().unwrap();
        enemy.shield = 30.0;
        enemy.energy = 50.0;

        enemy.damage(40.0);
        assert_eq!(enemy.shield(), 0.0);
        assert_eq!(enemy.energy(), 40.0);
    }

    #[test]
    fn test_non_positive_damage_is_ignored() {
        let mut pool = Enemies::new(images());
        pool.spawn(EnemyType::Spaceship, Position::new(500.0, 400.0));

        let enemy = pool.enemies.first_mut().unwrap();
        enemy.damage(0.0);
        enemy.damage(-5.0);

        assert_eq!(enemy.energy(), 10.0);
        assert_eq!(enemy.shield(), 0.0);
    }

    #[test]
    fn test_energy_clamps_at_zero() {
        let mut pool = Enemies::new(images());
        pool.spawn(EnemyType::Spaceship, Position::new(500.0, 400.0));

        let enemy = pool.enemies.first_mut().unwrap();
        enemy.damage(1000.0);
        assert_eq!(enemy.energy(), 0.0);
    }

    #[test]
    fn test_fire_gate_rejects_early_second_shot() {
        let base = Instant::now();
        let mut pool = Enemies::new(images());
        let mut projectiles = projectiles();
        pool.spawn(EnemyType::Spaceship, Position::new(500.0, 400.0));

        let enemy = pool.enemies.first_mut().unwrap();
        // Plasma default delay 250ms + 1500ms extra
        assert!(enemy.can_shoot(base));
        assert!(enemy.shoot(base, &mut projectiles));

        let early = base + Duration::from_millis(100);
        assert!(!enemy.can_shoot(early));
        assert!(!enemy.shoot(early, &mut projectiles));

        let late = base + Duration::from_millis(1750);
        assert!(enemy.can_shoot(late));
        assert!(enemy.shoot(late, &mut projectiles));

        assert_eq!(projectiles.len(), 2);
    }

    #[test]
    fn test_can_shoot_and_shoot_agree() {
        let base = Instant::now();
        let mut pool = Enemies::new(images());
        let mut projectiles = projectiles();
        pool.spawn(EnemyType::Spaceship, Position::new(500.0, 400.0));
        let enemy = pool.enemies.first_mut().unwrap();

        enemy.shoot(base, &mut projectiles);

        // Sweep the boundary: the capability check and the call must agree
        // at every sampled instant
        for millis in [1749, 1750, 1751] {
            let now = base + Duration::from_millis(millis);
            assert_eq!(enemy.can_shoot(now), enemy.shoot(now, &mut projectiles));
            // Reset the gate for the next sample
            enemy.last_shot_primary = Some(base);
        }
    }

    #[test]
    fn test_weapon_switching() {
        let mut pool = Enemies::new(images());
        pool.spawn(EnemyType::Spaceship, Position::new(500.0, 400.0));
        pool.spawn(EnemyType::LargeSpaceship, Position::new(500.0, 400.0));

        // Spaceship has no secondary weapon
        let spaceship = &mut pool.enemies[0];
        assert!(!spaceship.select_secondary_weapon());
        assert!(spaceship.is_primary_weapon_active());

        let large = &mut pool.enemies[1];
        assert!(large.select_secondary_weapon());
        assert!(!large.is_primary_weapon_active());
        assert!(large.select_primary_weapon());
    }

    #[test]
    fn test_hitboxes_scale_with_display_size() {
        let mut pool = Enemies::new(images());
        pool.spawn(EnemyType::Spaceship, Position::new(500.0, 400.0));
        let enemy = &pool.enemies[0];

        // Source 1434x752 at width 160: scale is uniform 160/1434
        let scale = 160.0 / 1434.0;
        let hitboxes = enemy.hitboxes();
        assert_eq!(hitboxes.len(), 2);
        assert!((hitboxes[0].width - 748.0 * scale).abs() < 1e-3);
        assert!((hitboxes[1].x - (500.0 + 748.0 * scale)).abs() < 1e-3);
    }

    #[test]
    fn test_dead_enemy_explodes_and_leaves_pool() {
        let base = Instant::now();
        let mut pool = Enemies::new(images());
        let mut projectiles = projectiles();
        let mut explosions = explosions();
        pool.spawn(EnemyType::Spaceship, Position::new(500.0, 400.0));
        pool.spawn(EnemyType::Spaceship, Position::new(500.0, 200.0));

        pool.enemies[0].energy = 0.0;
        pool.update(&ctx_at(base), &mut projectiles, &mut explosions, |_| {});

        assert_eq!(pool.len(), 1);
        assert_eq!(explosions.len(), 1);
    }

    #[test]
    fn test_compaction_removes_each_flagged_index_once() {
        let base = Instant::now();
        let mut pool = Enemies::new(images());
        let mut projectiles = projectiles();
        let mut explosions = explosions();
        for y in [100.0, 200.0, 300.0, 400.0] {
            pool.spawn(EnemyType::Spaceship, Position::new(500.0, y));
        }
        pool.enemies[1].energy = 0.0;
        pool.enemies[3].energy = 0.0;

        pool.update(&ctx_at(base), &mut projectiles, &mut explosions, |_| {});

        // Length shrinks by exactly the number of unique flagged indices
        assert_eq!(pool.len(), 2);
        let live: Vec<f32> = pool.query().iter().map(|enemy| enemy.area().y).collect();
        // Survivors keep their insertion order
        assert!(live[0] < live[1]);
    }

    #[test]
    fn test_enemy_leaves_pool_past_left_edge() {
        let base = Instant::now();
        let mut pool = Enemies::new(images());
        let mut projectiles = projectiles();
        let mut explosions = explosions();

        // Spawn at the right viewport border and march ticks until its
        // movement carries it fully past the left edge
        pool.spawn(EnemyType::Spaceship, Position::new(1280.0, 400.0));

        let mut ticks = 0;
        while !pool.is_empty() {
            ticks += 1;
            assert!(ticks < 3000, "enemy never left the screen");
            let now = base + Duration::from_millis(16 * ticks);
            pool.update(&ctx_at(now), &mut projectiles, &mut explosions, |_| {});
        }

        assert!(pool.query().is_empty());
    }
}
