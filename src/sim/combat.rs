//! Cannon fire, shell flight, damage and death
//!
//! Shots are rejected rather than faulted; every cosmetic consequence is
//! emitted as an [`Effect`] and never affects whether a shot happens.

use std::fmt;

use glam::Vec3;

use super::effects::{Effect, IMPACT_RIPPLE_RADIUS, IMPACT_RIPPLE_STRENGTH};
use super::state::{Projectile, ShipId, SinkingShip, Team, World};
use crate::consts::{WATER_LEVEL, WORLD_BOUND};

/// Seconds between smoke puffs behind a shell in flight
const SMOKE_TRAIL_INTERVAL: f32 = 0.4;
/// Sinking hulls descend this fast
const SINK_SPEED: f32 = 0.6;
const SINK_ROLL_RATE: f32 = 0.6;
const SINK_PITCH_RATE: f32 = 0.25;

/// Why a shot did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireRejected {
    /// No ship with that id on the board
    UnknownShip,
    Dead,
    CoolingDown,
    NoTurret,
}

impl fmt::Display for FireRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            FireRejected::UnknownShip => "unknown ship",
            FireRejected::Dead => "ship is dead",
            FireRejected::CoolingDown => "gun is cooling down",
            FireRejected::NoTurret => "ship has no turret",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for FireRejected {}

/// Fire the ship's gun. Returns the new projectile id.
pub fn fire(world: &mut World, shooter: ShipId) -> Result<u32, FireRejected> {
    let now = world.time;
    let barrel = world.tuning.barrel_length();

    let (pivot, muzzle, dir, team) = {
        let ship = world.ship(shooter).ok_or(FireRejected::UnknownShip)?;
        if ship.dead {
            return Err(FireRejected::Dead);
        }
        if !ship.can_fire(now) {
            return Err(FireRejected::CoolingDown);
        }
        let (pivot, dir) = ship.turret_pose().ok_or(FireRejected::NoTurret)?;
        (pivot, pivot + dir * barrel, dir, ship.team)
    };

    let tuning = &world.tuning;
    let speed = match team {
        Team::Player => tuning.projectile_speed,
        Team::Enemy => tuning.projectile_speed * tuning.enemy_speed_factor,
    };
    let damage = tuning.projectile_damage;
    let (recoil_duration, recoil_amount) = (tuning.recoil_duration, tuning.recoil_amount);
    let flash_scale = tuning.model_scale;
    let shake = tuning.camera.shake_intensity;
    let smoke_scale = 0.9 * tuning.model_scale;

    if let Some(ship) = world.ship_mut(shooter) {
        ship.last_shot_time = now;
        if let Some(turret) = ship.turret.as_mut() {
            turret.recoil.kick(recoil_duration, recoil_amount);
        }
    }

    let id = world.next_entity_id();
    world.projectiles.push(Projectile {
        id,
        pos: muzzle,
        vel: dir * speed,
        owner: shooter,
        owner_team: team,
        damage,
        age: 0.0,
    });

    world.emit(Effect::MuzzleFlash {
        pos: muzzle,
        scale: flash_scale,
    });
    world.emit(Effect::ShellEject {
        pos: pivot + Vec3::new(0.2, 0.1, -0.2),
        dir,
    });
    world.emit(Effect::Smoke {
        pos: muzzle,
        dir: -dir * 0.5,
        life: 0.9,
        scale: smoke_scale,
    });
    if team == Team::Player {
        world.emit(Effect::CameraShake { intensity: shake });
    }

    Ok(id)
}

/// Ship the projectile is touching, if any.
/// Player shells hit enemies only; enemy shells hit the player and other
/// enemies but never the ship that fired them.
fn find_target(world: &World, p: &Projectile, hit_radius: f32) -> Option<ShipId> {
    let touches = |pos: Vec3, radius: f32| {
        let rsum = radius + hit_radius;
        p.pos.distance_squared(pos) <= rsum * rsum
    };

    if p.owner_team != Team::Player {
        if let Some(player) = world.player.as_ref() {
            if !player.dead && player.id != p.owner && touches(player.pos, player.radius) {
                return Some(player.id);
            }
        }
    }

    world
        .enemies
        .iter()
        .filter(|e| !e.dead && e.id != p.owner)
        .find(|e| touches(e.pos, e.radius))
        .map(|e| e.id)
}

/// Apply a shell hit to a ship
fn resolve_hit(world: &mut World, target: ShipId, p: &Projectile) {
    let Some(ship) = world.ship_mut(target) else {
        return;
    };
    let emptied = ship.apply_damage(p.damage);
    let (count, scale, debris) = if ship.team == Team::Player { (3, 1.6, 5) } else { (4, 1.3, 6) };

    world.emit(Effect::Splash {
        pos: p.pos,
        count,
        scale,
    });
    world.emit(Effect::Debris {
        pos: p.pos,
        count: debris,
    });

    if emptied {
        handle_ship_death(world, target);
    } else if p.owner_team == Team::Player {
        world.score += world.tuning.hit_score;
    }
}

/// Move every shell and resolve what it ran into
pub fn advance(world: &mut World, dt: f32) {
    let gravity = world.tuning.projectile_gravity;
    let max_age = world.tuning.projectile_max_age;
    let hit_radius = world.tuning.projectile_radius;

    let in_flight = std::mem::take(&mut world.projectiles);
    let mut kept = Vec::with_capacity(in_flight.len());

    for mut p in in_flight {
        let prev_age = p.age;
        p.age += dt;
        p.vel.y -= gravity * dt;
        p.pos += p.vel * dt;

        if p.age > max_age || p.pos.length() > WORLD_BOUND {
            continue;
        }

        if let Some(target) = find_target(world, &p, hit_radius) {
            resolve_hit(world, target, &p);
            continue;
        }

        if p.pos.y <= WATER_LEVEL {
            world.emit(Effect::Splash {
                pos: p.pos,
                count: 5,
                scale: 1.8,
            });
            world.emit(Effect::Ripple {
                x: p.pos.x,
                z: p.pos.z,
                radius: IMPACT_RIPPLE_RADIUS,
                strength: IMPACT_RIPPLE_STRENGTH,
            });
            continue;
        }

        if (prev_age / SMOKE_TRAIL_INTERVAL).floor() != (p.age / SMOKE_TRAIL_INTERVAL).floor() {
            world.emit(Effect::Smoke {
                pos: p.pos,
                dir: -p.vel.normalize_or_zero(),
                life: 0.6,
                scale: 0.6,
            });
        }
        kept.push(p);
    }

    world.projectiles = kept;
}

/// Destroy a ship. Only the first call for a ship has any effect.
///
/// Enemies leave the roster immediately and start sinking; rewards are
/// granted now. The player's death ends the game and its hull stays visible
/// while it sinks. Returns whether anything happened.
pub fn handle_ship_death(world: &mut World, id: ShipId) -> bool {
    let Some(ship) = world.ship(id) else {
        return false;
    };
    if ship.dead {
        return false;
    }
    let (pos, team) = (ship.pos, ship.team);

    match team {
        Team::Enemy => {
            let Some(idx) = world.enemies.iter().position(|e| e.id == id) else {
                return false;
            };
            let mut ship = world.enemies.remove(idx);
            ship.dead = true;
            world.score += world.tuning.kill_score;
            world.kills += 1;
            let duration = world.tuning.enemy_sink_duration;
            world.sinking.push(SinkingShip {
                ship,
                timer: 0.0,
                duration,
            });
            world.emit(Effect::Splash {
                pos,
                count: 6,
                scale: 2.4,
            });
            world.emit(Effect::Debris { pos, count: 16 });
            log::info!("Enemy {:?} destroyed (kills: {}, score: {})", id, world.kills, world.score);
        }
        Team::Player => {
            let duration = world.tuning.player_sink_duration;
            let Some(player) = world.player.as_mut() else {
                return false;
            };
            player.dead = true;
            let hull = player.clone();
            world.sinking.push(SinkingShip {
                ship: hull,
                timer: 0.0,
                duration,
            });
            world.game_over = true;
            world.emit(Effect::Splash {
                pos,
                count: 10,
                scale: 3.2,
            });
            world.emit(Effect::Debris { pos, count: 30 });
            log::info!("Player sunk - game over (score: {}, kills: {})", world.score, world.kills);
        }
    }

    world.emit(Effect::ShipDestroyed { ship: id, pos });
    true
}

/// Play sinking animations and drop finished hulls
pub fn update_sinking(world: &mut World, dt: f32) {
    world.sinking.retain_mut(|s| {
        s.timer += dt;
        s.ship.pos.y -= SINK_SPEED * dt;
        s.ship.roll += SINK_ROLL_RATE * dt;
        s.ship.pitch += SINK_PITCH_RATE * dt;
        s.timer < s.duration
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawn::{spawn_enemy_at, spawn_player};
    use crate::tuning::Tuning;

    const DT: f32 = 1.0 / 60.0;

    /// Player at the origin, one enemy dead ahead at `distance`
    fn duel(tuning: Tuning, distance: f32) -> (World, ShipId, ShipId) {
        let mut world = World::new(tuning, 77);
        let player = spawn_player(&mut world).expect("player");
        let enemy = spawn_enemy_at(&mut world, 0.0, 5000.0).expect("enemy");
        let float_y = world.tuning.float_height;
        let e = world.ship_mut(enemy).expect("enemy");
        e.pos = Vec3::new(0.0, float_y, distance);
        e.base_float_y = float_y;
        (world, player, enemy)
    }

    /// Run shells until none are left in flight
    fn settle(world: &mut World) {
        for _ in 0..1000 {
            if world.projectiles.is_empty() {
                return;
            }
            world.time += DT;
            advance(world, DT);
        }
    }

    #[test]
    fn test_fire_spawns_projectile_and_effects() {
        let (mut world, player, _) = duel(Tuning::classic(), 60.0);
        let id = fire(&mut world, player).expect("shot");
        assert_eq!(world.projectiles.len(), 1);
        let p = &world.projectiles[0];
        assert_eq!(p.id, id);
        assert_eq!(p.owner, player);
        assert!((p.vel.length() - world.tuning.projectile_speed).abs() < 1e-3);
        assert!(world.effects.iter().any(|e| matches!(e, Effect::MuzzleFlash { .. })));
        assert!(world.effects.iter().any(|e| matches!(e, Effect::CameraShake { .. })));
        let recoil = world.player.as_ref().and_then(|p| p.turret).map(|t| t.recoil.offset());
        assert!(recoil.unwrap_or_default() > 0.0);
    }

    #[test]
    fn test_fire_rejections() {
        let (mut world, player, enemy) = duel(Tuning::classic(), 60.0);
        assert_eq!(fire(&mut world, ShipId(999)), Err(FireRejected::UnknownShip));

        fire(&mut world, player).expect("first shot");
        assert_eq!(fire(&mut world, player), Err(FireRejected::CoolingDown));
        world.time += world.tuning.player_cooldown;
        assert!(fire(&mut world, player).is_ok());

        world.ship_mut(enemy).expect("enemy").turret = None;
        assert_eq!(fire(&mut world, enemy), Err(FireRejected::NoTurret));

        world.ship_mut(enemy).expect("enemy").dead = true;
        assert_eq!(fire(&mut world, enemy), Err(FireRejected::Dead));
    }

    #[test]
    fn test_projectile_never_hits_owner() {
        let (mut world, _, enemy) = duel(Tuning::classic(), 60.0);
        let owner = world.ship(enemy).expect("enemy").clone();
        // A shell sitting inside its own ship
        world.projectiles.push(Projectile {
            id: 500,
            pos: owner.pos,
            vel: Vec3::new(0.0, 0.0, 0.01),
            owner: enemy,
            owner_team: Team::Enemy,
            damage: 100,
            age: 0.0,
        });
        advance(&mut world, DT);
        assert_eq!(world.ship(enemy).expect("enemy").health, owner.max_health);
        assert_eq!(world.projectiles.len(), 1);

        // Player shells never touch the player
        let player = world.player.clone().expect("player");
        world.projectiles.clear();
        world.projectiles.push(Projectile {
            id: 501,
            pos: player.pos,
            vel: Vec3::new(0.0, 0.0, 0.01),
            owner: player.id,
            owner_team: Team::Player,
            damage: 100,
            age: 0.0,
        });
        advance(&mut world, DT);
        assert_eq!(world.player.as_ref().expect("player").health, player.max_health);
    }

    #[test]
    fn test_enemy_shell_damages_player() {
        let (mut world, player, enemy) = duel(Tuning::classic(), 60.0);
        world.ship_mut(enemy).expect("enemy").aim_turret_at(Vec3::ZERO);
        fire(&mut world, enemy).expect("shot");
        settle(&mut world);
        let p = world.ship(player).expect("player");
        assert_eq!(p.health, p.max_health - world.tuning.projectile_damage);
        // enemy hits on the player do not score
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_enemy_shell_hits_other_enemy_and_kill_still_rewards() {
        let (mut world, _, shooter) = duel(Tuning::classic(), 60.0);
        let victim = spawn_enemy_at(&mut world, 0.0, -5000.0).expect("second enemy");
        let float_y = world.tuning.float_height;
        let at = Vec3::new(200.0, float_y, 0.0);
        {
            let v = world.ship_mut(victim).expect("victim");
            v.pos = at;
            v.base_float_y = float_y;
        }
        let damage = world.tuning.projectile_damage;
        let enemy_shell = |id| Projectile {
            id,
            pos: at,
            vel: Vec3::new(0.0, 0.0, 0.01),
            owner: shooter,
            owner_team: Team::Enemy,
            damage,
            age: 0.0,
        };

        // A glancing hit from an enemy damages but does not score
        world.projectiles.push(enemy_shell(600));
        advance(&mut world, DT);
        let v = world.ship(victim).expect("victim");
        assert_eq!(v.health, v.max_health - damage);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.score, 0);

        // The killing blow pays out kill rewards regardless of who fired
        world.ship_mut(victim).expect("victim").health = damage;
        world.projectiles.push(enemy_shell(601));
        advance(&mut world, DT);
        assert!(world.ship(victim).is_none_or(|v| v.dead));
        assert!(world.sinking.iter().any(|s| s.ship.id == victim));
        assert_eq!(world.kills, 1);
        assert_eq!(world.score, world.tuning.kill_score);
        assert!(world.ship(shooter).is_some_and(|s| !s.dead));
    }

    #[test]
    fn test_projectile_expiry_and_water() {
        let mut world = World::new(Tuning::classic(), 1);
        world.projectiles.push(Projectile {
            id: 1,
            pos: Vec3::new(0.0, 50.0, 0.0),
            vel: Vec3::ZERO,
            owner: ShipId(42),
            owner_team: Team::Enemy,
            damage: 1,
            age: world.tuning.projectile_max_age,
        });
        world.projectiles.push(Projectile {
            id: 2,
            pos: Vec3::new(0.0, 0.3, 0.0),
            vel: Vec3::new(0.0, -30.0, 0.0),
            owner: ShipId(42),
            owner_team: Team::Enemy,
            damage: 1,
            age: 0.0,
        });
        world.projectiles.push(Projectile {
            id: 3,
            pos: Vec3::new(WORLD_BOUND, 10.0, 0.0),
            vel: Vec3::new(10.0, 0.0, 0.0),
            owner: ShipId(42),
            owner_team: Team::Enemy,
            damage: 1,
            age: 0.0,
        });
        advance(&mut world, DT);
        assert!(world.projectiles.is_empty());
        assert!(world.effects.iter().any(|e| matches!(e, Effect::Ripple { .. })));
    }

    #[test]
    fn test_death_is_idempotent() {
        let (mut world, _, enemy) = duel(Tuning::classic(), 60.0);
        let score = world.score;
        assert!(handle_ship_death(&mut world, enemy));
        assert!(!handle_ship_death(&mut world, enemy));
        assert!(world.enemies.is_empty());
        assert_eq!(world.kills, 1);
        assert_eq!(world.score, score + world.tuning.kill_score);
        assert_eq!(world.sinking.len(), 1);
    }

    #[test]
    fn test_player_death_sets_game_over() {
        let (mut world, player, _) = duel(Tuning::classic(), 60.0);
        assert!(handle_ship_death(&mut world, player));
        assert!(!handle_ship_death(&mut world, player));
        assert!(world.game_over);
        // hull stays on the board, dead, while it sinks
        assert!(world.player.as_ref().is_some_and(|p| p.dead));
        assert_eq!(world.sinking.len(), 1);
        assert_eq!(world.sinking[0].duration, world.tuning.player_sink_duration);
        assert_eq!(world.kills, 0);
    }

    #[test]
    fn test_sinking_removed_after_duration() {
        let (mut world, _, enemy) = duel(Tuning::classic(), 60.0);
        handle_ship_death(&mut world, enemy);
        let duration = world.tuning.enemy_sink_duration;
        let y0 = world.sinking[0].ship.pos.y;
        let steps = (duration / DT).floor() as usize - 1;
        for _ in 0..steps {
            update_sinking(&mut world, DT);
        }
        assert_eq!(world.sinking.len(), 1);
        assert!(world.sinking[0].ship.pos.y < y0);
        assert!(world.sinking[0].opacity() < 0.1);
        for _ in 0..3 {
            update_sinking(&mut world, DT);
        }
        assert!(world.sinking.is_empty());
    }

    #[test]
    fn test_twenty_five_shots_sink_enemy() {
        let tuning = Tuning {
            player_health: 50_000,
            enemy_health: 5_000,
            projectile_damage: 200,
            ..Tuning::classic()
        };
        let (mut world, player, enemy) = duel(tuning, 80.0);
        world.ship_mut(player).expect("player").aim_turret_at(Vec3::new(0.0, 0.0, 80.0));
        let cooldown = world.tuning.player_cooldown;

        for shot in 0..25 {
            let score_before = world.score;
            world.time += cooldown;
            fire(&mut world, player).expect("shot");
            settle(&mut world);

            if shot < 24 {
                let e = world.ship(enemy).expect("enemy still afloat");
                assert_eq!(e.health, 5_000 - 200 * (shot + 1));
                assert_eq!(world.score, score_before + world.tuning.hit_score);
            } else {
                assert_eq!(world.score, score_before + world.tuning.kill_score);
            }
        }

        assert!(world.ship(enemy).is_none());
        assert!(world.enemies.is_empty());
        assert_eq!(world.kills, 1);
        assert_eq!(world.sinking.len(), 1);
        let sunk = &world.sinking[0];
        assert_eq!(sunk.ship.id, enemy);
        assert_eq!(sunk.ship.health, 0);
        assert_eq!(sunk.duration, world.tuning.enemy_sink_duration);
        assert!(!world.game_over);
    }
}
