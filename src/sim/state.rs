//! World state and entity types
//!
//! Everything the per-frame update mutates lives in `World`, which is owned
//! by the frame loop and passed explicitly to every system.

use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::Effect;
use super::particles::Particles;
use crate::tuning::{SwayTuning, Tuning};
use crate::forward_from_yaw;

/// Stable ship identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(pub u32);

/// Which side a ship fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Player,
    Enemy,
}

/// Gun recoil animation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Recoil {
    pub t: f32,
    pub duration: f32,
    pub amount: f32,
}

impl Recoil {
    /// Restart the kick
    pub fn kick(&mut self, duration: f32, amount: f32) {
        *self = Self {
            t: 0.0,
            duration,
            amount,
        };
    }

    pub fn update(&mut self, dt: f32) {
        if self.duration <= 0.0 {
            return;
        }
        if self.t < self.duration {
            self.t += dt;
        } else {
            *self = Self::default();
        }
    }

    /// How far the gun is pushed back along its barrel right now
    pub fn offset(&self) -> f32 {
        if self.duration <= 0.0 || self.t >= self.duration {
            return 0.0;
        }
        self.amount * (1.0 - self.t / self.duration)
    }
}

/// Deck gun mounted on a hull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turret {
    /// Aim angle relative to the hull heading
    pub aim: f32,
    /// Pivot in hull space
    pub mount: Vec3,
    pub recoil: Recoil,
}

impl Turret {
    pub fn new(mount: Vec3) -> Self {
        Self {
            aim: 0.0,
            mount,
            recoil: Recoil::default(),
        }
    }
}

/// Per-ship buoyancy oscillation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sway {
    pub amp: f32,
    pub freq: f32,
    pub phase: f32,
    pub roll_amp: f32,
    pub pitch_amp: f32,
    pub prev_offset: f32,
    pub last_splash: f32,
}

impl Sway {
    /// Randomize amplitude, frequency and phase so a fleet never bobs in lockstep
    pub fn random(tuning: &SwayTuning, rng: &mut impl Rng) -> Self {
        Self {
            amp: tuning.base_amplitude * rng.random_range(0.75..1.35),
            freq: tuning.base_freq * rng.random_range(0.8..1.4),
            phase: rng.random_range(0.0..std::f32::consts::TAU),
            roll_amp: tuning.roll_amp,
            pitch_amp: tuning.pitch_amp,
            prev_offset: 0.0,
            last_splash: f32::NEG_INFINITY,
        }
    }

    /// (vertical offset, roll, pitch) at simulation time `t`
    pub fn sample(&self, t: f32) -> (f32, f32, f32) {
        let a = t * self.freq + self.phase;
        (a.sin() * self.amp, a.cos() * self.roll_amp, a.sin() * self.pitch_amp)
    }
}

/// A ship, player or enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: ShipId,
    pub team: Team,
    pub pos: Vec3,
    /// Heading about +Y (0 faces +Z)
    pub yaw: f32,
    pub roll: f32,
    pub pitch: f32,
    /// Forward speed in units per second
    pub velocity: f32,
    /// Turn rate in radians per second
    pub angular_velocity: f32,
    pub health: u32,
    pub max_health: u32,
    /// Collision radius on the water plane
    pub radius: f32,
    /// Resting height the sway oscillates around
    pub base_float_y: f32,
    pub turret: Option<Turret>,
    pub sway: Sway,
    pub last_shot_time: f32,
    pub shoot_cooldown: f32,
    pub dead: bool,
}

impl Ship {
    pub fn new(id: ShipId, team: Team, pos: Vec3, max_health: u32, radius: f32, sway: Sway) -> Self {
        Self {
            id,
            team,
            pos,
            yaw: 0.0,
            roll: 0.0,
            pitch: 0.0,
            velocity: 0.0,
            angular_velocity: 0.0,
            health: max_health,
            max_health,
            radius: radius.max(f32::EPSILON),
            base_float_y: pos.y,
            turret: None,
            sway,
            last_shot_time: f32::NEG_INFINITY,
            shoot_cooldown: 0.0,
            dead: false,
        }
    }

    /// Hull orientation (heading, then pitch, then roll)
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw)
    }

    /// Remaining health in [0, 1]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    /// Subtract damage, saturating at zero.
    /// Returns true when this hit emptied the health bar.
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        let before = self.health;
        self.health = self.health.saturating_sub(damage).min(self.max_health);
        before > 0 && self.health == 0
    }

    /// Whether the gun may fire at simulation time `now`
    pub fn can_fire(&self, now: f32) -> bool {
        !self.dead && now - self.last_shot_time >= self.shoot_cooldown
    }

    /// Turret pivot and barrel direction in world space, recoil included
    pub fn turret_pose(&self) -> Option<(Vec3, Vec3)> {
        let turret = self.turret.as_ref()?;
        let hull = self.rotation();
        let gun = hull * Quat::from_rotation_y(turret.aim);
        let dir = (gun * Vec3::Z).normalize();
        let mount = turret.mount - Vec3::Z * turret.recoil.offset();
        Some((self.pos + hull * mount, dir))
    }

    /// Point the turret at a world position (yaw only)
    pub fn aim_turret_at(&mut self, target: Vec3) {
        let yaw = crate::yaw_toward(self.pos, target);
        let hull_yaw = self.yaw;
        if let Some(turret) = self.turret.as_mut() {
            turret.aim = crate::normalize_angle(yaw - hull_yaw);
        }
    }

    /// Position on the water plane
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.z)
    }
}

/// A cannonball in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec3,
    pub vel: Vec3,
    pub owner: ShipId,
    pub owner_team: Team,
    pub damage: u32,
    /// Seconds since it left the barrel
    pub age: f32,
}

/// A destroyed ship playing its sinking animation
#[derive(Debug, Clone, PartialEq)]
pub struct SinkingShip {
    pub ship: Ship,
    pub timer: f32,
    pub duration: f32,
}

impl SinkingShip {
    /// Fade-out for the renderer
    pub fn opacity(&self) -> f32 {
        (1.0 - self.timer / self.duration).max(0.0)
    }
}

/// Hull dimensions measured from a loaded model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullMetrics {
    pub radius: f32,
}

impl HullMetrics {
    /// Radius from the horizontal extent of a bounding box, or `fallback`
    /// when the box is degenerate
    pub fn from_bounds(min: Vec3, max: Vec3, fallback: f32) -> Self {
        let size = max - min;
        let radius = size.x.max(size.z) * 0.5;
        if radius.is_finite() && radius > 0.01 {
            Self { radius }
        } else {
            Self { radius: fallback }
        }
    }
}

/// Static circular obstacle (the island)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f32,
}

/// The whole simulated battle
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    /// Seed of the current battle
    pub seed: u64,
    /// Simulation clock in seconds
    pub time: f32,
    pub score: u64,
    pub kills: u32,
    pub game_over: bool,
    pub player: Option<Ship>,
    /// Active enemy roster (dead enemies are moved to `sinking`)
    pub enemies: Vec<Ship>,
    pub projectiles: Vec<Projectile>,
    pub sinking: Vec<SinkingShip>,
    /// Cosmetic particles (not gameplay-affecting)
    pub particles: Particles,
    /// Intents emitted during the current tick
    pub effects: Vec<Effect>,
    /// Measured hull of the ship model; `None` until the model is available
    pub hull: Option<HullMetrics>,
    pub obstacle: Option<Obstacle>,
    rng: Pcg32,
    next_id: u32,
}

impl World {
    /// Empty world (no ships yet) with the fallback hull
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let hull = HullMetrics {
            radius: tuning.default_ship_radius(),
        };
        let obstacle = (tuning.obstacle_radius > 0.0).then(|| Obstacle {
            center: Vec2::new(tuning.obstacle_x, tuning.obstacle_z),
            radius: tuning.obstacle_radius,
        });
        Self {
            particles: Particles::new(super::particles::DEFAULT_MAX_PARTICLES, seed),
            tuning,
            seed,
            time: 0.0,
            score: 0,
            kills: 0,
            game_over: false,
            player: None,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            sinking: Vec::new(),
            effects: Vec::new(),
            hull: Some(hull),
            obstacle,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// New world with the player and the opening enemy fleet
    pub fn with_fleet(tuning: Tuning, seed: u64) -> Self {
        let mut world = Self::new(tuning, seed);
        super::spawn::populate(&mut world);
        world
    }

    /// Tear down every live entity and start a fresh battle
    pub fn restart(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.time = 0.0;
        self.score = 0;
        self.kills = 0;
        self.game_over = false;
        self.player = None;
        self.enemies.clear();
        self.projectiles.clear();
        self.sinking.clear();
        self.particles.clear();
        self.effects.clear();
        super::spawn::populate(self);
        log::info!("Battle restarted with seed: {}", seed);
    }

    /// Record the measured hull (or `None` if the model failed to load)
    pub fn set_hull(&mut self, hull: Option<HullMetrics>) {
        if hull.is_none() {
            log::warn!("Ship model unavailable; ships will not spawn");
        }
        self.hull = hull;
    }

    /// Renderer report on the ship model: bounds when it loaded, `None` when it
    /// failed. The battle is rebuilt with the same seed so every hull uses the
    /// new metrics.
    pub fn reload_hull(&mut self, bounds: Option<(Vec3, Vec3)>) {
        let fallback = self.tuning.default_ship_radius();
        let hull = bounds.map(|(min, max)| HullMetrics::from_bounds(min, max, fallback));
        if let Some(h) = hull {
            log::info!("Ship model loaded, hull radius {:.1}", h.radius);
        }
        self.set_hull(hull);
        self.restart(self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Gameplay RNG
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Hand the intents of the last tick to the presentation layer
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn player_alive(&self) -> bool {
        self.player.as_ref().is_some_and(|p| !p.dead)
    }

    pub fn player_id(&self) -> Option<ShipId> {
        self.player.as_ref().map(|p| p.id)
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.player
            .as_ref()
            .filter(|p| p.id == id)
            .or_else(|| self.enemies.iter().find(|e| e.id == id))
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        if self.player.as_ref().is_some_and(|p| p.id == id) {
            return self.player.as_mut();
        }
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Live enemies nearest-first relative to `from`
    pub fn nearest_enemy(&self, from: Vec3, min_distance: f32) -> Option<&Ship> {
        self.enemies
            .iter()
            .filter(|e| !e.dead)
            .map(|e| (e, e.pos.distance_squared(from)))
            .filter(|(_, d2)| *d2 >= min_distance * min_distance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(e, _)| e)
    }
}
