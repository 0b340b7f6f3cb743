//! Camera rig
//!
//! Three exclusive modes: chase (with an optional lock-on), first person
//! from the bow, and a free-flying debug camera. Chase and first person
//! blend toward a desired pose every frame; free fly integrates the user's
//! velocity directly. A decaying shake is layered on top in every mode.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effects::Effect;
use super::state::{Ship, ShipId, World};
use super::tick::FrameInput;
use crate::consts::WATER_LEVEL;
use crate::tuning::CameraTuning;

/// Look target height above a hull
const LOOK_HEIGHT: f32 = 1.2;
/// Lock-on eye is pulled this far behind the midpoint
const LOCKON_PULLBACK: f32 = 6.0;
const FREE_FLY_PITCH_LIMIT: f32 = 85.0 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    Follow,
    FirstPerson,
    FreeFly,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::Follow => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::FreeFly,
            CameraMode::FreeFly => CameraMode::Follow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shake {
    /// Time since the shake started
    pub t: f32,
    pub duration: f32,
    pub intensity: f32,
    /// Offset applied to the eye this frame
    pub offset: Vec3,
}

impl Shake {
    fn idle(duration: f32) -> Self {
        Self {
            t: duration,
            duration,
            intensity: 0.0,
            offset: Vec3::ZERO,
        }
    }

    pub fn active(&self) -> bool {
        self.t < self.duration
    }
}

/// Frame-rate independent blend factor for a per-60Hz-frame `rate`
pub fn smoothing(rate: f32, dt: f32) -> f32 {
    1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(dt * 60.0)
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    pub mode: CameraMode,
    /// Smoothed eye position, before shake
    pub position: Vec3,
    pub look_at: Vec3,
    pub shake: Shake,
    pub shake_enabled: bool,
    pub lock_on: bool,
    pub lock_target: Option<ShipId>,
    /// Free-fly heading
    pub yaw: f32,
    pub pitch: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    tuning: CameraTuning,
    rng: Pcg32,
}

impl CameraRig {
    pub fn new(tuning: CameraTuning, seed: u64) -> Self {
        Self {
            mode: CameraMode::Follow,
            position: Vec3::new(0.0, tuning.height, -tuning.distance),
            look_at: Vec3::new(0.0, LOOK_HEIGHT, 0.0),
            shake: Shake::idle(tuning.shake_duration),
            shake_enabled: true,
            lock_on: false,
            lock_target: None,
            yaw: 0.0,
            pitch: 0.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 3000.0,
            tuning,
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_ca4e),
        }
    }

    pub fn tuning(&self) -> &CameraTuning {
        &self.tuning
    }

    /// Back to the chase camera, snapped behind the player
    pub fn reset(&mut self, world: &World) {
        self.mode = CameraMode::Follow;
        self.lock_on = false;
        self.lock_target = None;
        self.shake = Shake::idle(self.tuning.shake_duration);
        if let Some(player) = world.player.as_ref() {
            self.position = self.follow_eye(player);
            self.look_at = player.pos + Vec3::Y * LOOK_HEIGHT;
        }
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        if self.mode != CameraMode::Follow {
            self.lock_on = false;
            self.lock_target = None;
        }
        if self.mode == CameraMode::FreeFly {
            // Continue looking where the previous mode was looking
            let dir = (self.look_at - self.position).normalize_or_zero();
            if dir != Vec3::ZERO {
                self.yaw = dir.x.atan2(dir.z);
                self.pitch = dir.y.asin().clamp(-FREE_FLY_PITCH_LIMIT, FREE_FLY_PITCH_LIMIT);
            }
        }
        log::debug!("Camera mode: {:?}", self.mode);
    }

    fn acquire(&self, world: &World) -> Option<ShipId> {
        let player = world.player.as_ref()?;
        world
            .nearest_enemy(player.pos, self.tuning.lockon_min_distance)
            .map(|e| e.id)
    }

    /// Toggle lock-on. Only valid in chase mode and with a candidate target.
    pub fn toggle_lock_on(&mut self, world: &World) {
        if self.lock_on {
            self.lock_on = false;
            self.lock_target = None;
            return;
        }
        if self.mode != CameraMode::Follow {
            return;
        }
        self.lock_target = self.acquire(world);
        self.lock_on = self.lock_target.is_some();
    }

    fn live_target<'w>(&self, world: &'w World) -> Option<&'w Ship> {
        let id = self.lock_target?;
        world.enemies.iter().find(|e| e.id == id && !e.dead)
    }

    /// Live lock-on target, if any
    pub fn target<'w>(&self, world: &'w World) -> Option<&'w Ship> {
        if !self.lock_on {
            return None;
        }
        self.live_target(world)
    }

    fn follow_eye(&self, player: &Ship) -> Vec3 {
        let offset = Quat::from_rotation_y(player.yaw) * Vec3::new(0.0, self.tuning.height, -self.tuning.distance);
        player.pos + offset
    }

    /// Camera-space basis for free fly: (forward, right)
    fn free_basis(&self) -> (Vec3, Vec3) {
        let rot = Quat::from_euler(EulerRot::YXZ, self.yaw, -self.pitch, 0.0);
        let forward = rot * Vec3::Z;
        let right = rot * Vec3::NEG_X;
        (forward, right)
    }

    /// Advance the rig one frame. `effects` are this frame's intents.
    pub fn update(&mut self, world: &World, input: &FrameInput, effects: &[Effect], dt: f32) {
        for effect in effects {
            if let Effect::CameraShake { intensity } = *effect {
                self.shake.t = 0.0;
                self.shake.duration = self.tuning.shake_duration;
                self.shake.intensity = intensity;
            }
        }

        if self.lock_on && self.live_target(world).is_none() {
            self.lock_target = self.acquire(world);
            self.lock_on = self.lock_target.is_some();
            if !self.lock_on {
                log::debug!("Lock-on target lost");
            }
        }

        match self.mode {
            CameraMode::Follow => self.update_follow(world, dt),
            CameraMode::FirstPerson => self.update_first_person(world, dt),
            CameraMode::FreeFly => self.update_free_fly(input, dt),
        }

        self.update_shake(dt);
    }

    fn update_follow(&mut self, world: &World, dt: f32) {
        let Some(player) = world.player.as_ref() else {
            return;
        };
        if let Some(target) = self.target(world) {
            let mid = (player.pos + target.pos) * 0.5;
            let dir = (target.pos - player.pos).with_y(0.0).normalize_or_zero();
            let desired = mid + Vec3::Y * self.tuning.height * 0.6 - dir * LOCKON_PULLBACK;
            let a = smoothing(self.tuning.lockon_smooth, dt);
            self.position = self.position.lerp(desired, a);
            self.look_at = target.pos + Vec3::Y * LOOK_HEIGHT;
        } else {
            let desired = self.follow_eye(player);
            let a = smoothing(self.tuning.follow_lerp, dt);
            self.position = self.position.lerp(desired, a);
            self.look_at = player.pos + Vec3::Y * LOOK_HEIGHT;
        }
    }

    fn update_first_person(&mut self, world: &World, dt: f32) {
        let Some(player) = world.player.as_ref() else {
            return;
        };
        let forward = player.forward();
        let eye = player.pos + forward * self.tuning.first_person_forward + Vec3::Y * self.tuning.first_person_height;
        let a = smoothing(self.tuning.first_person_lerp, dt);
        self.position = self.position.lerp(eye, a);
        self.look_at = self.position + forward * 10.0;
    }

    fn update_free_fly(&mut self, input: &FrameInput, dt: f32) {
        let look = self.tuning.free_fly_look;
        self.yaw = crate::normalize_angle(self.yaw - input.look_delta.x * look);
        self.pitch = (self.pitch - input.look_delta.y * look).clamp(-FREE_FLY_PITCH_LIMIT, FREE_FLY_PITCH_LIMIT);

        let (forward, right) = self.free_basis();
        let mut velocity = Vec3::ZERO;
        if input.forward {
            velocity += forward;
        }
        if input.back {
            velocity -= forward;
        }
        if input.right {
            velocity += right;
        }
        if input.left {
            velocity -= right;
        }
        if input.ascend {
            velocity += Vec3::Y;
        }
        if input.descend {
            velocity -= Vec3::Y;
        }
        self.position += velocity.normalize_or_zero() * self.tuning.free_fly_speed * dt;
        self.look_at = self.position + forward;
    }

    fn update_shake(&mut self, dt: f32) {
        if !self.shake.active() {
            self.shake.offset = Vec3::ZERO;
            return;
        }
        self.shake.t += dt;
        let p = (1.0 - self.shake.t / self.shake.duration).max(0.0);
        let amount = self.shake.intensity * p;
        let r = &mut self.rng;
        let jitter = Vec3::new(
            r.random_range(-0.5..0.5),
            r.random_range(-0.5..0.5),
            r.random_range(-0.5..0.5),
        );
        self.shake.offset = if self.shake_enabled { jitter * amount } else { Vec3::ZERO };
    }

    /// Rendered eye position (smoothed pose plus shake)
    pub fn eye(&self) -> Vec3 {
        self.position + self.shake.offset
    }

    pub fn fov_radians(&self) -> f32 {
        self.tuning.fov_deg.to_radians()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.look_at, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view_matrix()
    }

    /// World-space ray (origin, unit direction) through a point in NDC
    pub fn ray_from_ndc(&self, ndc: Vec2) -> (Vec3, Vec3) {
        let inv = self.view_projection().inverse();
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        (near, (far - near).normalize_or_zero())
    }

    /// Where the cursor ray meets the water plane
    pub fn aim_point(&self, ndc: Vec2) -> Option<Vec3> {
        let (origin, dir) = self.ray_from_ndc(ndc);
        if dir.y.abs() < 1e-6 {
            return None;
        }
        let t = (WATER_LEVEL - origin.y) / dir.y;
        (t > 0.0).then(|| origin + dir * t)
    }

    /// Pixel position of a world point, or `None` when it is behind the eye
    pub fn world_to_screen(&self, point: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height))
    }
}
