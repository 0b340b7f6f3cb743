//! Presentation intents emitted by gameplay
//!
//! Systems never spawn visuals directly. They push an `Effect` and carry on;
//! after gameplay mutation is done the particle pool, the camera rig and the
//! water consume the list, and the renderer receives it with the frame.

use glam::Vec3;
use serde::Serialize;

use super::state::ShipId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Spray of water sprites
    Splash { pos: Vec3, count: u32, scale: f32 },
    /// Short additive flash at a muzzle
    MuzzleFlash { pos: Vec3, scale: f32 },
    /// Spent casing thrown sideways from a turret
    ShellEject { pos: Vec3, dir: Vec3 },
    /// Smoke puff drifting along `dir`
    Smoke {
        pos: Vec3,
        dir: Vec3,
        life: f32,
        scale: f32,
    },
    /// Splinters flying from an impact
    Debris { pos: Vec3, count: u32 },
    /// Restart the camera shake
    CameraShake { intensity: f32 },
    /// Impulse for the water height field (world XZ)
    Ripple { x: f32, z: f32, radius: f32, strength: f32 },
    /// A ship was destroyed
    ShipDestroyed { ship: ShipId, pos: Vec3 },
}

/// Ripple radius/strength (in window UV units) for a moving hull
pub const WAKE_RIPPLE_RADIUS: f32 = 0.02;
pub const WAKE_RIPPLE_STRENGTH: f32 = 0.05;
/// Ripple for a shell hitting the water
pub const IMPACT_RIPPLE_RADIUS: f32 = 0.03;
pub const IMPACT_RIPPLE_STRENGTH: f32 = 0.08;
