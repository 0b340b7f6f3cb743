//! Positional de-overlap between ship circles
//!
//! A cheap correction, not an impulse solver: positions move, velocities are
//! left alone. Passes run in priority order:
//! 1. ships vs the island (only the ship moves)
//! 2. enemies vs the player (the player never moves)
//! 3. enemy pairs (both move by half the overlap)

use glam::Vec2;
use rand::Rng;

use super::state::{Ship, World};

/// Random nudge for ships whose centres coincide
fn jitter(world: &mut World) -> Vec2 {
    let rng = world.rng();
    Vec2::new(rng.random_range(0.01..0.11), rng.random_range(0.01..0.11))
}

/// How far `mover` must travel (along the returned vector) to sit `desired`
/// away from `anchor`, or `None` when already clear
fn correction(world: &mut World, mover: Vec2, anchor: Vec2, desired: f32) -> Option<Vec2> {
    let delta = mover - anchor;
    let dist = delta.length();
    if dist >= desired {
        return None;
    }
    if dist > 0.0 {
        return Some(delta / dist * (desired - dist));
    }
    // coincident: the full separation goes along the nudge direction
    Some(jitter(world).normalize() * desired)
}

fn shift(ship: &mut Ship, by: Vec2) {
    ship.pos.x += by.x;
    ship.pos.z += by.y;
}

/// Resolve every overlap for this frame
pub fn resolve(world: &mut World) {
    let margin = world.tuning.separation_margin;

    if let Some(obstacle) = world.obstacle {
        if let Some(p) = world.player.as_ref().filter(|p| !p.dead).map(|p| (p.planar(), p.radius)) {
            if let Some(push) = correction(world, p.0, obstacle.center, obstacle.radius + p.1 + margin) {
                if let Some(player) = world.player.as_mut() {
                    shift(player, push);
                }
            }
        }
        for i in 0..world.enemies.len() {
            let e = &world.enemies[i];
            if e.dead {
                continue;
            }
            let (at, radius) = (e.planar(), e.radius);
            if let Some(push) = correction(world, at, obstacle.center, obstacle.radius + radius + margin) {
                shift(&mut world.enemies[i], push);
            }
        }
    }

    if let Some((anchor, player_radius)) = world
        .player
        .as_ref()
        .filter(|p| !p.dead)
        .map(|p| (p.planar(), p.radius))
    {
        for i in 0..world.enemies.len() {
            let e = &world.enemies[i];
            if e.dead {
                continue;
            }
            let (at, radius) = (e.planar(), e.radius);
            if let Some(push) = correction(world, at, anchor, player_radius + radius + margin) {
                shift(&mut world.enemies[i], push);
            }
        }
    }

    let n = world.enemies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&world.enemies[i], &world.enemies[j]);
            if a.dead || b.dead {
                continue;
            }
            let desired = a.radius + b.radius + margin;
            let (pa, pb) = (a.planar(), b.planar());
            let Some(push) = correction(world, pa, pb, desired) else {
                continue;
            };
            let (head, tail) = world.enemies.split_at_mut(j);
            shift(&mut head[i], push * 0.5);
            shift(&mut tail[0], -push * 0.5);
        }
    }
}
