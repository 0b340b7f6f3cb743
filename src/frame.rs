//! Snapshots for the renderer
//!
//! The renderer owns meshes, materials and the water shader. It is configured
//! once from `RenderConfig`, then each frame it receives a `RenderFrame`: a
//! plain-data view of the battle as JSON. It only moves things.

use glam::Vec3;
use serde::Serialize;

use crate::sim::{CameraMode, Handle, CameraRig, Effect, Obstacle, ParticleKind, Ship, ShipId, Team, World};
use crate::settings::{Settings, WaterLook};
use crate::water::{RippleDrop, RippleWindow};

/// Presentation settings, sent at startup and whenever they change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderConfig {
    pub water: WaterLook,
    /// Cells per side of the GPU ripple grid
    pub ripple_resolution: usize,
    pub max_particles: usize,
    pub reduced_motion: bool,
}

impl RenderConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            water: settings.water.clone(),
            ripple_resolution: settings.quality.ripple_resolution(),
            max_particles: settings.max_particles(),
            reduced_motion: settings.reduced_motion,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipView {
    pub id: ShipId,
    pub team: Team,
    pub pos: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    /// Turret angle relative to the hull
    pub turret_aim: f32,
    /// Barrel pushed back by recoil
    pub recoil: f32,
    pub health: f32,
    pub opacity: f32,
}

impl ShipView {
    fn of(ship: &Ship, opacity: f32) -> Self {
        let (turret_aim, recoil) = ship
            .turret
            .as_ref()
            .map(|t| (t.aim, t.recoil.offset()))
            .unwrap_or_default();
        Self {
            id: ship.id,
            team: ship.team,
            pos: ship.pos,
            yaw: ship.yaw,
            pitch: ship.pitch,
            roll: ship.roll,
            turret_aim,
            recoil,
            health: ship.health_fraction(),
            opacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleView {
    /// Stable for the particle's lifetime; the renderer keys instances on it
    pub handle: Handle,
    pub kind: ParticleKind,
    pub pos: Vec3,
    pub scale: f32,
    pub opacity: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraView {
    pub mode: CameraMode,
    pub eye: Vec3,
    pub look_at: Vec3,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub time: f32,
    pub ships: Vec<ShipView>,
    pub projectiles: Vec<Vec3>,
    pub particles: Vec<ParticleView>,
    pub camera: CameraView,
    pub water: RippleWindow,
    /// Impulses for the ripple pass, already in window UVs
    pub ripples: Vec<RippleDrop>,
    pub obstacle: Option<Obstacle>,
    /// Intents since the previous frame
    pub effects: Vec<Effect>,
}

impl RenderFrame {
    /// Snapshot the world. `effects` are the intents drained for this frame.
    pub fn capture(world: &World, camera: &CameraRig, water: &RippleWindow, effects: Vec<Effect>) -> Self {
        let live = world.player.iter().chain(&world.enemies).filter(|s| !s.dead);
        let ships = live
            .map(|s| ShipView::of(s, 1.0))
            .chain(world.sinking.iter().map(|s| ShipView::of(&s.ship, s.opacity())))
            .collect();
        let particles = world
            .particles
            .iter()
            .map(|(handle, p)| ParticleView {
                handle,
                kind: p.kind,
                pos: p.pos,
                scale: p.scale(),
                opacity: p.opacity(),
                rotation: p.rotation,
            })
            .collect();
        Self {
            time: world.time,
            ships,
            projectiles: world.projectiles.iter().map(|p| p.pos).collect(),
            particles,
            camera: CameraView {
                mode: camera.mode,
                eye: camera.eye(),
                look_at: camera.look_at,
                fov_deg: camera.tuning().fov_deg,
                near: camera.near,
                far: camera.far,
            },
            water: *water,
            ripples: water.drops(&effects),
            obstacle: world.obstacle,
            effects,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combat;
    use crate::tuning::Tuning;

    #[test]
    fn test_frame_lists_live_and_sinking_ships() {
        let mut world = World::with_fleet(Tuning::classic(), 8);
        let victim = world.enemies[0].id;
        combat::handle_ship_death(&mut world, victim);
        let camera = CameraRig::new(world.tuning.camera.clone(), 8);
        let effects = world.drain_effects();
        let frame = RenderFrame::capture(&world, &camera, &RippleWindow::default(), effects);

        assert_eq!(frame.ships.len(), 1 + world.enemies.len() + 1);
        let sinking = frame.ships.iter().find(|s| s.id == victim).expect("sinking hull");
        assert!((sinking.opacity - 1.0).abs() < 1e-6);
        assert!(frame.effects.iter().any(|e| matches!(e, Effect::ShipDestroyed { .. })));
    }

    #[test]
    fn test_particle_handles_stay_stable_between_frames() {
        let mut world = World::with_fleet(Tuning::classic(), 8);
        let camera = CameraRig::new(world.tuning.camera.clone(), 8);
        let splash = [Effect::Splash {
            pos: Vec3::new(5.0, 0.2, 5.0),
            count: 3,
            scale: 1.0,
        }];
        world.particles.spawn_from(&splash, 0.1, 4.0);
        let before = RenderFrame::capture(&world, &camera, &RippleWindow::default(), Vec::new());
        world.particles.update(0.05);
        let after = RenderFrame::capture(&world, &camera, &RippleWindow::default(), Vec::new());

        assert_eq!(before.particles.len(), 3);
        let handles = |f: &RenderFrame| f.particles.iter().map(|p| p.handle).collect::<Vec<_>>();
        assert_eq!(handles(&before), handles(&after));
        assert_ne!(before.particles[0].pos, after.particles[0].pos);

        let json: serde_json::Value = serde_json::from_str(&after.to_json().unwrap()).unwrap();
        assert!(json["particles"][0]["handle"]["generation"].is_number());
    }

    #[test]
    fn test_frame_carries_ripples_inside_window() {
        let world = World::with_fleet(Tuning::classic(), 8);
        let camera = CameraRig::new(world.tuning.camera.clone(), 8);
        let effects = vec![
            Effect::Ripple {
                x: 0.0,
                z: 0.0,
                radius: 0.03,
                strength: 0.05,
            },
            Effect::Ripple {
                x: 2000.0,
                z: 0.0,
                radius: 0.03,
                strength: 0.05,
            },
        ];
        let frame = RenderFrame::capture(&world, &camera, &RippleWindow::default(), effects);
        assert_eq!(frame.ripples.len(), 1);
        assert_eq!(frame.ripples[0].uv, glam::Vec2::splat(0.5));
        assert_eq!(frame.effects.len(), 2);
    }

    #[test]
    fn test_render_config_follows_settings() {
        let mut settings = Settings::default();
        settings.quality = crate::settings::QualityPreset::High;
        settings.water.opacity = 0.4;
        settings.particles = false;
        let config = RenderConfig::from_settings(&settings);
        assert_eq!(config.ripple_resolution, 512);
        assert_eq!(config.max_particles, 0);

        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(json["water"]["surface_color"], "#006994");
        assert!((json["water"]["opacity"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_frame_json_shape() {
        let world = World::with_fleet(Tuning::classic(), 8);
        let camera = CameraRig::new(world.tuning.camera.clone(), 8);
        let frame = RenderFrame::capture(&world, &camera, &RippleWindow::default(), vec![Effect::CameraShake { intensity: 0.06 }]);
        let json: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["camera"]["mode"], "follow");
        assert_eq!(json["effects"][0]["kind"], "camera_shake");
        assert_eq!(json["ships"][0]["team"], "Player");
        assert!(json["ships"][0]["pos"].is_array());
    }
}
