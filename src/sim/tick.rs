//! Fixed timestep simulation tick
//!
//! One frame of the battle, in a fixed order:
//! input → controllers → combat → sinking → separation → camera → particles.

use glam::Vec2;

use super::camera::{CameraMode, CameraRig};
use super::{combat, separation, ship};
use super::state::World;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Helm (or free-fly camera) keys
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Free-fly only
    pub ascend: bool,
    pub descend: bool,
    /// Cursor position in NDC, if the mouse is over the canvas
    pub aim_ndc: Option<Vec2>,
    /// Mouse movement since the previous tick (pixels)
    pub look_delta: Vec2,
    pub fire: bool,
    pub toggle_lock_on: bool,
    pub cycle_camera: bool,
    pub restart: bool,
    /// Demo mode: the player's ship fights on its own
    pub autopilot: bool,
}

impl FrameInput {
    /// Same input with the helm keys released
    fn without_helm(&self) -> Self {
        Self {
            forward: false,
            back: false,
            left: false,
            right: false,
            ascend: false,
            descend: false,
            ..self.clone()
        }
    }
}

/// Seed for the battle that follows `seed`
fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407)
}

/// Advance the battle by one timestep
pub fn tick(world: &mut World, camera: &mut CameraRig, input: &FrameInput, dt: f32) {
    if input.restart {
        world.restart(next_seed(world.seed));
        camera.reset(world);
    }

    // Intents from this tick start here; earlier ones are still waiting for
    // the renderer
    let first = world.effects.len();
    world.time += dt;

    if input.cycle_camera {
        camera.cycle_mode();
    }
    if input.toggle_lock_on {
        camera.toggle_lock_on(world);
    }

    let mut helm = if camera.mode == CameraMode::FreeFly {
        input.without_helm()
    } else {
        input.clone()
    };

    let aim = if input.autopilot && !world.game_over {
        ship::autopilot(world, &mut helm)
    } else {
        input.aim_ndc.and_then(|ndc| camera.aim_point(ndc))
    };

    ship::update_player(world, &helm, aim, dt);
    if helm.fire && !world.game_over {
        if let Some(id) = world.player_id() {
            if let Err(reason) = combat::fire(world, id) {
                log::trace!("Player shot rejected: {}", reason);
            }
        }
    }

    ship::update_enemies(world, dt);
    combat::advance(world, dt);
    combat::update_sinking(world, dt);
    separation::resolve(world);

    camera.update(world, input, &world.effects[first..], dt);
    let tuning = &world.tuning;
    world
        .particles
        .spawn_from(&world.effects[first..], tuning.muzzle_flash_duration, tuning.shell_eject_speed);
    world.particles.update(dt);
}
