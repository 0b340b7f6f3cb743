//! Pooled cosmetic particles
//!
//! Splashes, smoke, muzzle flashes, splinters and shell casings. Spawned from
//! the tick's effect intents, recycled through a [`Pool`] when they expire.
//! Uses its own RNG stream so particle settings never change gameplay.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::effects::Effect;
use super::pool::{Handle, Pool};
use crate::consts::DEBRIS_GRAVITY;

/// Default cap on live particles
pub const DEFAULT_MAX_PARTICLES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Splash,
    Smoke,
    MuzzleFlash,
    /// Falls under gravity
    Debris,
    /// Falls under gravity
    Shell,
}

impl ParticleKind {
    fn gravity_scale(self) -> f32 {
        match self {
            ParticleKind::Debris => 0.6,
            ParticleKind::Shell => 0.8,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec3,
    pub vel: Vec3,
    pub age: f32,
    pub max_life: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    /// Sprite rotation speed (radians per second)
    pub spin: f32,
    pub rotation: f32,
}

impl Particle {
    /// Normalized age in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.age / self.max_life).clamp(0.0, 1.0)
    }

    /// Current size along the scale curve
    pub fn scale(&self) -> f32 {
        self.start_scale + (self.end_scale - self.start_scale) * self.progress()
    }

    pub fn opacity(&self) -> f32 {
        1.0 - self.progress()
    }
}

/// Every live particle plus its RNG
#[derive(Debug, Clone)]
pub struct Particles {
    pool: Pool<Particle>,
    rng: Pcg32,
    enabled: bool,
}

impl Particles {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            pool: Pool::with_capacity(capacity),
            rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            enabled: true,
        }
    }

    /// Apply quality/particle settings
    pub fn configure(&mut self, max_particles: usize) {
        self.enabled = max_particles > 0;
        self.pool.set_capacity(max_particles);
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Live particles with the handle that stays stable for their lifetime
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Particle)> {
        self.pool.iter()
    }

    pub fn clear(&mut self) {
        self.pool.clear();
    }

    fn push(&mut self, particle: Particle) {
        // Full pool: the effect is simply thinner
        let kind = particle.kind;
        if self.pool.insert(particle).is_none() {
            log::trace!("Particle pool full, dropping {:?}", kind);
        }
    }

    /// Spawn particles for the visual intents of a tick
    pub fn spawn_from(&mut self, effects: &[Effect], muzzle_flash_duration: f32, shell_eject_speed: f32) {
        if !self.enabled {
            return;
        }
        for effect in effects {
            match *effect {
                Effect::Splash { pos, count, scale } => self.splash(pos, count, scale),
                Effect::MuzzleFlash { pos, scale } => self.push(Particle {
                    kind: ParticleKind::MuzzleFlash,
                    pos,
                    vel: Vec3::ZERO,
                    age: 0.0,
                    max_life: muzzle_flash_duration,
                    start_scale: scale,
                    end_scale: scale,
                    spin: 0.0,
                    rotation: 0.0,
                }),
                Effect::ShellEject { pos, dir } => self.shell(pos, dir, shell_eject_speed),
                Effect::Smoke {
                    pos,
                    dir,
                    life,
                    scale,
                } => self.smoke(pos, dir, life, scale),
                Effect::Debris { pos, count } => self.debris(pos, count),
                Effect::CameraShake { .. }
                | Effect::Ripple { .. }
                | Effect::ShipDestroyed { .. } => {}
            }
        }
    }

    fn splash(&mut self, pos: Vec3, count: u32, scale: f32) {
        for _ in 0..count {
            let r = &mut self.rng;
            let offset = Vec3::new(r.random_range(-0.7..0.7), 0.02, r.random_range(-0.7..0.7));
            let s = scale * r.random_range(0.6..1.8);
            let particle = Particle {
                kind: ParticleKind::Splash,
                pos: pos + offset,
                vel: Vec3::new(
                    r.random_range(-1.2..1.2),
                    r.random_range(1.2..2.8),
                    r.random_range(-1.2..1.2),
                ),
                age: 0.0,
                max_life: r.random_range(0.45..1.05),
                start_scale: s,
                end_scale: s * 2.2,
                spin: r.random_range(-3.0..3.0),
                rotation: 0.0,
            };
            self.push(particle);
        }
    }

    fn smoke(&mut self, pos: Vec3, dir: Vec3, life: f32, scale: f32) {
        let r = &mut self.rng;
        let vel = dir * 6.0 * r.random_range(0.6..1.4)
            + Vec3::new(r.random_range(-0.5..0.5), r.random_range(0.0..0.3), r.random_range(-0.5..0.5));
        self.push(Particle {
            kind: ParticleKind::Smoke,
            pos,
            vel,
            age: 0.0,
            max_life: life,
            start_scale: scale,
            end_scale: scale,
            spin: 0.0,
            rotation: 0.0,
        });
    }

    fn debris(&mut self, pos: Vec3, count: u32) {
        for _ in 0..count {
            let r = &mut self.rng;
            let particle = Particle {
                kind: ParticleKind::Debris,
                pos,
                vel: Vec3::new(
                    r.random_range(-2.5..2.5),
                    r.random_range(1.0..6.0),
                    r.random_range(-2.5..2.5),
                ),
                age: 0.0,
                max_life: r.random_range(0.8..1.6),
                start_scale: 1.0,
                end_scale: 1.0,
                spin: 0.0,
                rotation: 0.0,
            };
            self.push(particle);
        }
    }

    fn shell(&mut self, pos: Vec3, dir: Vec3, eject_speed: f32) {
        let r = &mut self.rng;
        // Thrown sideways (perpendicular to the barrel on the water plane) and up
        let perp = Vec3::new(-dir.z, 0.0, dir.x).normalize_or_zero();
        let side = if r.random_bool(0.5) { -1.0 } else { 1.0 };
        let eject = perp * r.random_range(0.8..1.3) * side + Vec3::new(0.0, r.random_range(0.6..1.2), 0.2);
        let particle = Particle {
            kind: ParticleKind::Shell,
            pos,
            vel: eject * eject_speed * r.random_range(0.7..1.3),
            age: 0.0,
            max_life: r.random_range(1.2..2.0),
            start_scale: 1.0,
            end_scale: 1.0,
            spin: r.random_range(-8.0..8.0),
            rotation: 0.0,
        };
        self.push(particle);
    }

    /// Advance and expire particles
    pub fn update(&mut self, dt: f32) {
        self.pool.retain(|p| {
            p.age += dt;
            p.pos += p.vel * dt;
            p.vel.y -= DEBRIS_GRAVITY * p.kind.gravity_scale() * dt;
            p.rotation += p.spin * dt;
            p.age < p.max_life
        });
    }
}
