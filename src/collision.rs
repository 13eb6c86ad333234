//! Collision resolution between the pools and the player
//!
//! Each function here is called from inside a pool's update callback and
//! returns whether the collision was handled, which is what tells the pool
//! to retire the colliding object. Hit testing always goes through the
//! owners' hitboxes, so sprites with configured sub-rectangles are not
//! punished for their transparent corners.

use crate::enemies::{Enemies, Enemy};
use crate::geometry::Rect;
use crate::player::Player;
use crate::powerups::Powerup;
use crate::projectiles::{Projectile, ProjectileSource};
use std::time::Instant;

fn any_intersection(a: &[Rect], b: &[Rect]) -> bool {
    a.iter().any(|ra| b.iter().any(|rb| ra.intersects(rb)))
}

/// Resolves a player projectile against the enemy pool.
///
/// When the projectile overlaps several enemies in the same tick, only the
/// leftmost one (smallest bounding-box x) takes the damage; one projectile
/// never wipes a whole column. Returns whether anything was hit.
pub fn projectile_vs_enemies(projectile: &Projectile, enemies: &mut Enemies) -> bool {
    if projectile.source() != ProjectileSource::Player {
        return false;
    }

    let area = projectile.area();
    let target = enemies
        .iter_mut()
        .filter(|enemy| enemy.intersects(&area))
        .min_by(|a, b| a.area().x.total_cmp(&b.area().x));

    match target {
        Some(enemy) => {
            enemy.damage(projectile.damage());
            true
        }
        None => false,
    }
}

/// Resolves an enemy projectile against the player. Invincible or dead
/// players are not hit, and the projectile flies on.
pub fn projectile_vs_player(projectile: &Projectile, player: &mut Player, now: Instant) -> bool {
    if projectile.source() != ProjectileSource::Enemy {
        return false;
    }
    if !player.is_alive() || player.is_invincible(now) {
        return false;
    }
    if !player.intersects(&projectile.area()) {
        return false;
    }

    player.damage(projectile.damage(), now);
    true
}

/// Resolves ship-to-ship contact: the player takes the enemy's touch damage
/// once per invincibility window; the enemy is unharmed.
pub fn enemy_vs_player(enemy: &Enemy, player: &mut Player, now: Instant) -> bool {
    if !player.is_alive() || player.is_invincible(now) {
        return false;
    }
    if !any_intersection(&enemy.hitboxes(), &player.hitboxes()) {
        return false;
    }

    player.damage(enemy.touch_damage(), now);
    true
}

/// Resolves a pickup: a dead player collects nothing. Returns whether the
/// powerup was consumed.
pub fn powerup_vs_player(powerup: &Powerup, player: &mut Player, now: Instant) -> bool {
    if !player.is_alive() || !player.intersects(&powerup.area()) {
        return false;
    }

    player.apply_powerup(powerup.kind(), now);
    true
}
