//! Projectile pool: everything fired by the player or an enemy
//!
//! Projectile behaviour is data-driven: `PROJECTILE_SETTINGS` is indexed by
//! `ProjectileType` and fixes speed, damage, fire delay and, per source,
//! the movement profile, so a plasma bolt drifts right when the player fires
//! it and left when an enemy does. Damage is computed once at spawn time from
//! the shooter's multiplier; a projectile never needs to look back at whoever
//! fired it.

use crate::geometry::{Position, Rect, Size};
use crate::movement::Movement;
use crate::renderer::{FrameContext, ImageHandle, Renderer};
use crate::sprite::{display_size, DirectionX, DirectionY, MovingSprite};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileType {
    Plasma,
    Ion,
}

/// Who fired a projectile. Doubles as the index into the per-source movement
/// pair in the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileSource {
    Player,
    Enemy,
}

pub struct ProjectileSettings {
    /// Whether holding the fire key keeps shooting. Weak early weapons want
    /// deliberate single shots; the fire delay still applies either way.
    pub allow_perma_fire: bool,
    pub width: f32,
    pub speed: f32,
    pub damage: f32,
    /// `None` falls back to `DEFAULT_FIRE_DELAY`.
    pub fire_delay: Option<Duration>,
    /// Movement per source: `[from player, from enemy]`.
    pub movement: [Movement; 2],
}

pub const DEFAULT_FIRE_DELAY: Duration = Duration::from_millis(250);

static PROJECTILE_SETTINGS: [ProjectileSettings; 2] = [
    // Plasma
    ProjectileSettings {
        allow_perma_fire: false,
        width: 72.0,
        speed: 16.0,
        damage: 5.0,
        fire_delay: None,
        movement: [Movement::Right, Movement::Left],
    },
    // Ion
    ProjectileSettings {
        allow_perma_fire: true,
        width: 56.0,
        speed: 20.0,
        damage: 8.0,
        fire_delay: Some(Duration::from_millis(180)),
        movement: [
            Movement::SineRight {
                amplitude: 6.0,
                wavelength: 120.0,
            },
            Movement::SineLeft {
                amplitude: 6.0,
                wavelength: 120.0,
            },
        ],
    },
];

impl ProjectileType {
    pub fn settings(&self) -> &'static ProjectileSettings {
        &PROJECTILE_SETTINGS[*self as usize]
    }

    /// Minimum delay between shots of this type, before any per-shooter
    /// extra delay.
    pub fn fire_delay(&self) -> Duration {
        self.settings().fire_delay.unwrap_or(DEFAULT_FIRE_DELAY)
    }
}

/// Shared fire-gate arithmetic: every shooter's `can_shoot` and `shoot` must
/// agree for the same instant, so both go through this one comparison.
pub(crate) fn fire_gate_open(last_shot: Option<Instant>, delay: Duration, now: Instant) -> bool {
    match last_shot {
        None => true,
        Some(last) => now.duration_since(last) >= delay,
    }
}

pub struct Projectile {
    sprite: MovingSprite,
    kind: ProjectileType,
    source: ProjectileSource,
    damage: f32,
}

impl Projectile {
    pub fn source(&self) -> ProjectileSource {
        self.source
    }

    /// Damage this projectile deals on hit, multipliers already applied.
    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn area(&self) -> Rect {
        self.sprite.area()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn position(&self) -> Position {
        self.sprite.position()
    }

    /// Projectile artwork points right and down; mirror it to match the
    /// current travel direction.
    fn sync_flip(&mut self) {
        let flip_x = self.sprite.direction_x() == DirectionX::Left;
        let flip_y = self.sprite.direction_y() == DirectionY::Up;
        let node = self.sprite.node_mut();
        node.flip_x = flip_x;
        node.flip_y = flip_y;
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        self.sprite.draw(renderer)
    }
}

pub struct Projectiles {
    images: HashMap<ProjectileType, ImageHandle>,
    projectiles: Vec<Projectile>,
}

impl Projectiles {
    pub fn new(images: HashMap<ProjectileType, ImageHandle>) -> Self {
        Projectiles {
            images,
            projectiles: Vec::new(),
        }
    }

    /// Spawns a projectile.
    ///
    /// `position.x` is the leading (left) edge of the projectile and
    /// `position.y` its vertical center, which is how muzzle points are
    /// naturally expressed by shooters.
    ///
    /// `damage_multiplier` folds the shooter's damage bonus or handicap into
    /// the stored per-hit damage; `scale` shrinks the artwork for shooters
    /// rendered below full size.
    pub fn spawn(
        &mut self,
        kind: ProjectileType,
        position: Position,
        source: ProjectileSource,
        damage_multiplier: f32,
        scale: f32,
    ) -> &Projectile {
        let image = self.images[&kind];
        let settings = kind.settings();
        let size = display_size(image, settings.width);
        let size = Size::new(size.width * scale, size.height * scale);
        let top_left = Position::new(position.x, position.y - size.height / 2.0);

        let projectile = Projectile {
            sprite: MovingSprite::new(image, top_left, size),
            kind,
            source,
            damage: settings.damage * damage_multiplier,
        };
        self.projectiles.push(projectile);

        self.projectiles.last().expect("just pushed")
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    /// Snapshot of all live projectiles.
    #[allow(dead_code)] // Hits resolve through update callbacks; exposed for tests
    pub fn query(&self) -> Vec<&Projectile> {
        self.projectiles.iter().collect()
    }

    #[allow(dead_code)] // Hits resolve through update callbacks; exposed for tests
    pub fn query_where<F>(&self, predicate: F) -> Vec<&Projectile>
    where
        F: Fn(&Projectile) -> bool,
    {
        self.projectiles
            .iter()
            .filter(|projectile| predicate(projectile))
            .collect()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Advances every projectile, reports each to the collision callback,
    /// then compacts.
    ///
    /// The callback returns true when the projectile hit something and is
    /// spent. Removal (hit or off-screen) is collected into an index set
    /// during the pass and applied once at the end, so indices and iteration
    /// order stay stable while callbacks run.
    pub fn update<F>(&mut self, ctx: &FrameContext, mut test_collision: F)
    where
        F: FnMut(&Projectile) -> bool,
    {
        let mut to_remove = HashSet::new();

        for (index, projectile) in self.projectiles.iter_mut().enumerate() {
            let settings = projectile.kind.settings();
            let movement = settings.movement[projectile.source as usize];
            projectile.sprite.move_with(movement, settings.speed);
            projectile.sync_flip();

            let handled = test_collision(projectile);

            if handled || !ctx.is_on_screen(&projectile.area()) {
                to_remove.insert(index);
            } else {
                projectile.sprite.update(ctx.now);
            }
        }

        if !to_remove.is_empty() {
            let mut index = 0;
            self.projectiles.retain(|_| {
                let keep = !to_remove.contains(&index);
                index += 1;
                keep
            });
        }
    }

    /// Draws live projectiles in insertion order (later spawns on top).
    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        for projectile in &self.projectiles {
            projectile.draw(renderer)?;
        }
        Ok(())
    }
}
