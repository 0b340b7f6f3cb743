//! Broadside - naval combat on a rippling sea
//!
//! Core modules:
//! - `sim`: Seeded simulation (ships, cannon fire, separation, camera rig)
//! - `water`: Ripple window and reference height field
//! - `platform`: Browser/native platform abstraction (input, storage)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `hud` / `frame`: Plain-data snapshots for the DOM and the renderer

pub mod best_score;
pub mod frame;
pub mod hud;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod water;

pub use best_score::BestScore;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Frame deltas are clamped to this before feeding the accumulator
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Projectiles farther than this from the origin are discarded
    pub const WORLD_BOUND: f32 = 3000.0;
    /// Height of the water plane projectiles splash into
    pub const WATER_LEVEL: f32 = 0.2;

    /// Downward acceleration for debris and shell casings
    pub const DEBRIS_GRAVITY: f32 = 9.8;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed rotation that takes `from` onto `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let d = to - from;
    d.sin().atan2(d.cos())
}

/// Heading angle (about +Y) pointing from `from` toward `to` on the XZ plane.
/// Zero yaw faces +Z.
#[inline]
pub fn yaw_toward(from: Vec3, to: Vec3) -> f32 {
    (to.x - from.x).atan2(to.z - from.z)
}

/// Unit forward vector on the XZ plane for a heading
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Horizontal distance between two points, ignoring height
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    (a.x - b.x).hypot(a.z - b.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_delta_wraps() {
        let d = angle_delta(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-4);
        let d = angle_delta(0.0, FRAC_PI_2);
        assert!((d - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_toward_matches_forward() {
        let from = Vec3::new(3.0, 0.0, -2.0);
        let to = Vec3::new(-7.0, 5.0, 11.0);
        let yaw = yaw_toward(from, to);
        let dir = (to - from).with_y(0.0).normalize();
        assert!((forward_from_yaw(yaw) - dir).length() < 1e-5);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(2.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        // either end of the boundary is acceptable for an odd multiple of PI
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((normalize_angle(-0.5) + 0.5).abs() < 1e-6);
    }
}
