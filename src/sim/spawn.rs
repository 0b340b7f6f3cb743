//! Ship spawning and placement

use glam::{Vec2, Vec3};
use rand::Rng;

use super::state::{ShipId, Sway, Team, Turret, World, Ship};

/// Turret pivot in hull space: on the foredeck, above the waterline
const TURRET_MOUNT: Vec3 = Vec3::new(0.0, 1.5, 2.0);

/// Opening fleet positions, before placement search
fn fleet_anchor(i: u32) -> Vec2 {
    Vec2::new((i as f32 + 1.0) * -24.0, (i as f32 - 1.0) * 18.0)
}

/// Search for a point at least `min_distance` (plus hull radius) away from
/// the player and every enemy.
///
/// Each rejected candidate is pushed further out in a random direction. If
/// no attempt succeeds, the last candidate is returned anyway.
pub fn find_safe_spawn(world: &mut World, start: Vec2, min_distance: f32, max_attempts: u32) -> Vec2 {
    let mut candidate = start;
    for attempt in 0..max_attempts {
        if is_clear(world, candidate, min_distance) {
            return candidate;
        }
        let rng = world.rng();
        let a = rng.random_range(0.0..std::f32::consts::TAU);
        let r = min_distance + attempt as f32 * 100.0 + rng.random_range(0.0..50.0);
        candidate += Vec2::new(a.cos(), a.sin()) * r;
    }
    log::debug!(
        "Spawn search exhausted {} attempts, using ({:.1}, {:.1})",
        max_attempts,
        candidate.x,
        candidate.y
    );
    candidate
}

/// Whether `point` keeps `min_distance` from every ship
pub fn is_clear(world: &World, point: Vec2, min_distance: f32) -> bool {
    world
        .player
        .iter()
        .chain(world.enemies.iter())
        .all(|s| s.planar().distance(point) >= min_distance + s.radius)
}

fn build_ship(world: &mut World, team: Team, at: Vec2, health: u32) -> Option<Ship> {
    let Some(hull) = world.hull else {
        log::warn!("No hull metrics; skipping {:?} spawn", team);
        return None;
    };
    let id = ShipId(world.next_entity_id());
    let sway_tuning = world.tuning.sway.clone();
    let sway = Sway::random(&sway_tuning, world.rng());
    let float_y = world.tuning.float_height;
    let mut ship = Ship::new(id, team, Vec3::new(at.x, float_y, at.y), health, hull.radius, sway);
    ship.turret = Some(Turret::new(TURRET_MOUNT));
    Some(ship)
}

/// Spawn the player at the origin. Replaces any previous player.
pub fn spawn_player(world: &mut World) -> Option<ShipId> {
    let health = world.tuning.player_health;
    let mut ship = build_ship(world, Team::Player, Vec2::ZERO, health)?;
    ship.shoot_cooldown = world.tuning.player_cooldown;
    let id = ship.id;
    world.player = Some(ship);
    log::info!("Player spawned ({:?})", id);
    Some(id)
}

/// Fresh enemy reload time in `[enemy_cooldown_min, enemy_cooldown_max)`.
/// A collapsed or inverted range yields the minimum.
pub fn roll_enemy_cooldown(world: &mut World) -> f32 {
    let (lo, hi) = (world.tuning.enemy_cooldown_min, world.tuning.enemy_cooldown_max);
    if hi > lo {
        world.rng().random_range(lo..hi)
    } else {
        lo
    }
}

/// Spawn an enemy near (x, z), moved to a safe spot first
pub fn spawn_enemy_at(world: &mut World, x: f32, z: f32) -> Option<ShipId> {
    let min_distance = world.tuning.spawn_min_distance;
    let attempts = world.tuning.spawn_max_attempts;
    let at = find_safe_spawn(world, Vec2::new(x, z), min_distance, attempts);
    let health = world.tuning.enemy_health;
    let mut ship = build_ship(world, Team::Enemy, at, health)?;
    ship.shoot_cooldown = roll_enemy_cooldown(world);
    let id = ship.id;
    world.enemies.push(ship);
    log::info!("Enemy spawned ({:?}) at ({:.1}, {:.1})", id, at.x, at.y);
    Some(id)
}

/// Player plus the opening enemy fleet
pub fn populate(world: &mut World) {
    spawn_player(world);
    for i in 0..world.tuning.enemy_count {
        let anchor = fleet_anchor(i);
        spawn_enemy_at(world, anchor.x, anchor.y);
    }
}
