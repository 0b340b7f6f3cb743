//! Ship controllers
//!
//! Player helm (thrust/turn with acceleration), enemy pursuit AI, and the
//! buoyancy sway and recoil every hull gets each frame.

use glam::Vec3;

use super::{combat, spawn};
use super::effects::{Effect, WAKE_RIPPLE_RADIUS, WAKE_RIPPLE_STRENGTH};
use super::state::{Ship, ShipId, World};
use super::tick::FrameInput;
use crate::consts::WATER_LEVEL;
use crate::tuning::SwayTuning;
use crate::{angle_delta, planar_distance, yaw_toward};

/// Ships slower than this leave no wake
const WAKE_MIN_SPEED: f32 = 0.1;

/// Bob the hull and emit a splash when it dips through the threshold
pub fn apply_sway(ship: &mut Ship, t: f32, tuning: &SwayTuning, effects: &mut Vec<Effect>) {
    let (offset, roll, pitch) = ship.sway.sample(t);
    ship.pos.y = ship.base_float_y + offset;
    ship.roll = roll;
    ship.pitch = pitch;

    let threshold = -ship.sway.amp * tuning.splash_threshold_factor;
    let crossed = ship.sway.prev_offset > threshold && offset <= threshold;
    if crossed && t - ship.sway.last_splash > tuning.splash_cooldown {
        effects.push(Effect::Splash {
            pos: Vec3::new(ship.pos.x, WATER_LEVEL, ship.pos.z),
            count: 6,
            scale: 1.76,
        });
        ship.sway.last_splash = t;
    }
    ship.sway.prev_offset = offset;
}

fn wake(ship: &Ship, effects: &mut Vec<Effect>) {
    if ship.velocity.abs() > WAKE_MIN_SPEED {
        effects.push(Effect::Ripple {
            x: ship.pos.x,
            z: ship.pos.z,
            radius: WAKE_RIPPLE_RADIUS,
            strength: WAKE_RIPPLE_STRENGTH,
        });
    }
}

fn update_recoil(ship: &mut Ship, dt: f32) {
    if let Some(turret) = ship.turret.as_mut() {
        turret.recoil.update(dt);
    }
}

/// Step `value` toward zero by `amount` without crossing it
fn decay_toward_zero(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else if value < 0.0 {
        (value + amount).min(0.0)
    } else {
        0.0
    }
}

/// Drive the player's ship from the helm keys and aim its gun
pub fn update_player(world: &mut World, input: &FrameInput, aim_point: Option<Vec3>, dt: f32) {
    if world.game_over {
        return;
    }
    let t = world.time;
    let tuning = &world.tuning;
    let Some(ship) = world.player.as_mut() else {
        return;
    };
    if ship.dead {
        return;
    }

    // Thrust
    if input.forward {
        ship.velocity += tuning.player_accel * dt;
    } else if input.back {
        ship.velocity -= tuning.player_accel * dt;
    } else {
        ship.velocity = decay_toward_zero(ship.velocity, tuning.player_decel * dt);
    }
    ship.velocity = ship
        .velocity
        .clamp(-tuning.player_speed * 0.5, tuning.player_speed);
    ship.pos += ship.forward() * ship.velocity * dt;

    // Rudder
    if input.left {
        ship.angular_velocity += tuning.player_turn_accel * dt;
    } else if input.right {
        ship.angular_velocity -= tuning.player_turn_accel * dt;
    } else {
        ship.angular_velocity = decay_toward_zero(ship.angular_velocity, tuning.player_turn_decel * dt);
    }
    ship.angular_velocity = ship
        .angular_velocity
        .clamp(-tuning.player_turn, tuning.player_turn);
    ship.yaw = crate::normalize_angle(ship.yaw + ship.angular_velocity * dt);

    if let Some(target) = aim_point {
        ship.aim_turret_at(target);
    }

    update_recoil(ship, dt);
    apply_sway(ship, t, &tuning.sway, &mut world.effects);
    wake(ship, &mut world.effects);
}

/// Pursue the player, keep distance from allies and fire when in range.
/// Does nothing without a player.
pub fn update_enemies(world: &mut World, dt: f32) {
    let Some(player) = world.player.as_ref() else {
        return;
    };
    let player_pos = player.pos;
    let player_alive = !player.dead;
    let t = world.time;

    // Positions at the start of the pass, for avoidance
    let fleet: Vec<(ShipId, Vec3)> = world
        .enemies
        .iter()
        .filter(|e| !e.dead)
        .map(|e| (e.id, e.pos))
        .collect();

    let tuning = &world.tuning;
    let mut ready = Vec::new();

    for (i, enemy) in world.enemies.iter_mut().enumerate() {
        if enemy.dead {
            continue;
        }
        let dist = planar_distance(enemy.pos, player_pos);

        // Turn toward the player at a capped rate
        let bearing = angle_delta(enemy.yaw, yaw_toward(enemy.pos, player_pos));
        let max_turn = tuning.enemy_turn_speed * dt;
        enemy.yaw = crate::normalize_angle(enemy.yaw + bearing.clamp(-max_turn, max_turn));

        enemy.aim_turret_at(player_pos);
        update_recoil(enemy, dt);

        let avoid_dist = enemy.radius * 2.5;
        if dist > enemy.radius * 3.0 {
            let mut avoid = Vec3::ZERO;
            for (other_id, other_pos) in &fleet {
                if *other_id == enemy.id {
                    continue;
                }
                let away = (enemy.pos - *other_pos).with_y(0.0);
                let d = away.length();
                if d < avoid_dist && d > 0.001 {
                    avoid += away / d * (avoid_dist - d) * 0.5;
                }
            }
            enemy.velocity = tuning.enemy_move_speed;
            enemy.pos += enemy.forward() * tuning.enemy_move_speed * dt + avoid * dt;
        } else {
            // Close enough: idle drift
            enemy.velocity = 0.0;
            let k = i as f32;
            enemy.pos.x += (t * 0.5 + k).sin() * 3.0 * dt;
            enemy.pos.z += (t * 0.4 + k).cos() * 3.0 * dt;
        }

        apply_sway(enemy, t, &tuning.sway, &mut world.effects);
        wake(enemy, &mut world.effects);

        if player_alive && dist <= tuning.enemy_shoot_range && enemy.can_fire(t) {
            ready.push(enemy.id);
        }
    }

    for id in ready {
        if combat::fire(world, id).is_ok() {
            let cooldown = spawn::roll_enemy_cooldown(world);
            if let Some(enemy) = world.ship_mut(id) {
                enemy.shoot_cooldown = cooldown;
            }
        }
    }
}

/// Demo helm: steer toward the nearest enemy, aim at it, fire when in range.
/// Returns the aim point, or `None` when there is nothing to fight.
pub fn autopilot(world: &World, input: &mut FrameInput) -> Option<Vec3> {
    let player = world.player.as_ref().filter(|p| !p.dead)?;
    let target = world.nearest_enemy(player.pos, 0.0)?;
    let range = world.tuning.enemy_shoot_range;

    let bearing = angle_delta(player.yaw, yaw_toward(player.pos, target.pos));
    let dist = planar_distance(player.pos, target.pos);
    input.left = bearing > 0.1;
    input.right = bearing < -0.1;
    input.forward = dist > range * 0.5;
    input.back = false;
    input.fire = dist <= range;
    Some(target.pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Team;
    use crate::tuning::Tuning;

    fn world() -> World {
        World::with_fleet(Tuning::classic(), 21)
    }

    #[test]
    fn test_player_accelerates_and_clamps() {
        let mut world = world();
        let input = FrameInput {
            forward: true,
            ..Default::default()
        };
        for _ in 0..600 {
            world.time += 1.0 / 60.0;
            update_player(&mut world, &input, None, 1.0 / 60.0);
        }
        let player = world.player.as_ref().expect("player");
        assert!((player.velocity - world.tuning.player_speed).abs() < 1e-4);
        assert!(player.pos.z > 100.0);
    }

    #[test]
    fn test_player_reverse_is_half_speed() {
        let mut world = world();
        let input = FrameInput {
            back: true,
            ..Default::default()
        };
        for _ in 0..600 {
            update_player(&mut world, &input, None, 1.0 / 60.0);
        }
        let player = world.player.as_ref().expect("player");
        assert!((player.velocity + world.tuning.player_speed * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_player_coasts_to_stop() {
        let mut world = world();
        if let Some(p) = world.player.as_mut() {
            p.velocity = 5.0;
            p.angular_velocity = -0.5;
        }
        for _ in 0..120 {
            update_player(&mut world, &FrameInput::default(), None, 1.0 / 60.0);
        }
        let player = world.player.as_ref().expect("player");
        assert_eq!(player.velocity, 0.0);
        assert_eq!(player.angular_velocity, 0.0);
    }

    #[test]
    fn test_turn_rate_clamped() {
        let mut world = world();
        let input = FrameInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..600 {
            update_player(&mut world, &input, None, 1.0 / 60.0);
        }
        let player = world.player.as_ref().expect("player");
        assert!(player.angular_velocity <= world.tuning.player_turn + 1e-6);
    }

    #[test]
    fn test_game_over_freezes_helm() {
        let mut world = world();
        world.game_over = true;
        let before = world.player.clone();
        let input = FrameInput {
            forward: true,
            ..Default::default()
        };
        update_player(&mut world, &input, None, 0.1);
        assert_eq!(world.player, before);
    }

    #[test]
    fn test_splash_rate_limited() {
        let tuning = SwayTuning::default();
        let mut world = world();
        let mut ship = world.player.take().expect("player");
        ship.sway.freq = 60.0;
        ship.sway.phase = 0.0;
        let mut effects = Vec::new();
        // Very fast bobbing: many crossings inside one cooldown window
        let mut t = 0.0;
        while t < tuning.splash_cooldown {
            apply_sway(&mut ship, t, &tuning, &mut effects);
            t += 0.005;
        }
        let splashes = effects
            .iter()
            .filter(|e| matches!(e, Effect::Splash { .. }))
            .count();
        assert!(splashes <= 1);
    }

    #[test]
    fn test_enemies_noop_without_player() {
        let mut world = world();
        world.player = None;
        let before = world.enemies.clone();
        update_enemies(&mut world, 0.1);
        assert_eq!(world.enemies, before);
        assert!(world.effects.is_empty());
    }

    #[test]
    fn test_enemy_turn_capped_and_closes_in() {
        let mut world = world();
        world.enemies.truncate(1);
        let enemy = &mut world.enemies[0];
        enemy.pos = Vec3::new(0.0, 1.0, -500.0);
        enemy.yaw = 0.0;
        let start = planar_distance(enemy.pos, Vec3::ZERO);
        let dt = 1.0 / 60.0;
        update_enemies(&mut world, dt);
        let enemy = &world.enemies[0];
        assert!(enemy.yaw.abs() <= world.tuning.enemy_turn_speed * dt + 1e-5);
        for _ in 0..600 {
            world.time += dt;
            update_enemies(&mut world, dt);
        }
        assert!(planar_distance(world.enemies[0].pos, Vec3::ZERO) < start);
    }

    #[test]
    fn test_enemy_fires_in_range() {
        let mut world = world();
        world.enemies.truncate(1);
        world.enemies[0].pos = Vec3::new(0.0, 1.0, 150.0);
        world.time = 10.0;
        update_enemies(&mut world, 1.0 / 60.0);
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles[0].owner_team, Team::Enemy);
        let t = &world.tuning;
        let cd = world.enemies[0].shoot_cooldown;
        assert!(cd >= t.enemy_cooldown_min && cd < t.enemy_cooldown_max);
    }

    #[test]
    fn test_autopilot_targets_nearest() {
        let mut world = world();
        let nearest = world.enemies[0].id;
        world.enemies[0].pos = Vec3::new(10.0, 1.0, 30.0);
        for e in world.enemies.iter_mut().skip(1) {
            e.pos.x -= 2000.0;
        }
        let mut input = FrameInput::default();
        let aim = autopilot(&world, &mut input).expect("target");
        assert_eq!(aim, world.ship(nearest).expect("enemy").pos);
        assert!(input.fire);
    }
}
