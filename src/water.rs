//! Ripple height field
//!
//! The renderer runs the wave equation on the GPU inside a square window that
//! trails the player. This module owns that window and maps ripple impulses to
//! the UVs the shader uses. `RippleField` is a CPU version of the same
//! simulation for tests and the headless build.

use glam::Vec2;
use serde::Serialize;

use crate::sim::Effect;

/// Side of the simulation window in world units
pub const RIPPLE_WINDOW_SIZE: f32 = 300.0;
/// Per-frame lerp of the window centre toward the player
pub const RIPPLE_WINDOW_FOLLOW: f32 = 0.05;
/// Velocity damping per step
pub const RIPPLE_DAMPING: f32 = 0.985;

/// World-space square the ripple texture covers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RippleWindow {
    pub center: Vec2,
    pub size: f32,
}

impl Default for RippleWindow {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            size: RIPPLE_WINDOW_SIZE,
        }
    }
}

/// A ripple impulse in window UV space, ready for the GPU drop pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RippleDrop {
    pub uv: Vec2,
    /// Radius in UV units
    pub radius: f32,
    pub strength: f32,
}

impl RippleWindow {
    /// Drift the window toward `target` (world XZ)
    pub fn follow(&mut self, target: Vec2) {
        self.center = self.center.lerp(target, RIPPLE_WINDOW_FOLLOW);
    }

    /// Texture UV of a world XZ point, `None` outside the window
    pub fn to_uv(&self, x: f32, z: f32) -> Option<Vec2> {
        let uv = (Vec2::new(x, z) - self.center) / self.size + Vec2::splat(0.5);
        let inside = (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y);
        inside.then_some(uv)
    }

    /// Map the ripple intents that land inside the window
    pub fn drops(&self, effects: &[Effect]) -> Vec<RippleDrop> {
        effects
            .iter()
            .filter_map(|effect| match *effect {
                Effect::Ripple {
                    x,
                    z,
                    radius,
                    strength,
                } if radius > 0.0 => self.to_uv(x, z).map(|uv| RippleDrop { uv, radius, strength }),
                _ => None,
            })
            .collect()
    }
}

/// Height/velocity grid, double buffered like the render targets
#[derive(Debug, Clone)]
pub struct RippleField {
    res: usize,
    height: Vec<f32>,
    velocity: Vec<f32>,
    back: Vec<f32>,
}

impl RippleField {
    pub fn new(res: usize) -> Self {
        let res = res.max(2);
        Self {
            res,
            height: vec![0.0; res * res],
            velocity: vec![0.0; res * res],
            back: vec![0.0; res * res],
        }
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.res + x
    }

    /// Height at a grid cell
    pub fn height(&self, x: usize, y: usize) -> f32 {
        self.height[self.idx(x.min(self.res - 1), y.min(self.res - 1))]
    }

    /// One wave equation step. Edges clamp, like a clamp-to-edge texture.
    pub fn step(&mut self) {
        let n = self.res;
        for y in 0..n {
            for x in 0..n {
                let i = self.idx(x, y);
                let avg = (self.height(x.saturating_sub(1), y)
                    + self.height(x + 1, y)
                    + self.height(x, y.saturating_sub(1))
                    + self.height(x, y + 1))
                    * 0.25;
                let v = (self.velocity[i] + (avg - self.height[i]) * 2.0) * RIPPLE_DAMPING;
                self.velocity[i] = v;
                self.back[i] = self.height[i] + v;
            }
        }
        std::mem::swap(&mut self.height, &mut self.back);
    }

    /// Raised-cosine bump centred at `center` (UV), `radius` in UV units
    pub fn add_drop(&mut self, center: Vec2, radius: f32, strength: f32) {
        if radius <= 0.0 {
            return;
        }
        let max = (self.res - 1) as f32;
        // only the cells under the bump's bounding square
        let lo = ((center - Vec2::splat(radius)) * max).floor().max(Vec2::ZERO);
        let hi = ((center + Vec2::splat(radius)) * max).ceil().min(Vec2::splat(max));
        if lo.x > hi.x || lo.y > hi.y {
            return;
        }
        for y in lo.y as usize..=hi.y as usize {
            for x in lo.x as usize..=hi.x as usize {
                let uv = Vec2::new(x as f32, y as f32) / max;
                let d = uv.distance(center);
                if d < radius {
                    let i = self.idx(x, y);
                    self.height[i] += strength * 0.5 * (1.0 + (std::f32::consts::PI * d / radius).cos());
                }
            }
        }
    }

    /// Sum of squared heights and velocities
    pub fn energy(&self) -> f32 {
        self.height
            .iter()
            .zip(&self.velocity)
            .map(|(h, v)| h * h + v * v)
            .sum()
    }
}

/// Window plus field, fed by `Effect::Ripple` intents
#[derive(Debug, Clone)]
pub struct Water {
    pub window: RippleWindow,
    pub field: RippleField,
}

impl Water {
    pub fn new(res: usize) -> Self {
        Self {
            window: RippleWindow::default(),
            field: RippleField::new(res),
        }
    }

    /// Step the surface and drag the window toward the player
    pub fn update(&mut self, player: Option<Vec2>) {
        self.field.step();
        if let Some(p) = player {
            self.window.follow(p);
        }
    }

    /// Turn ripple intents into drops. Returns how many landed in the window.
    pub fn apply(&mut self, effects: &[Effect]) -> usize {
        let drops = self.window.drops(effects);
        for drop in &drops {
            self.field.add_drop(drop.uv, drop.radius, drop.strength);
        }
        drops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_mapping() {
        let window = RippleWindow {
            center: Vec2::new(100.0, -50.0),
            size: 300.0,
        };
        assert_eq!(window.to_uv(100.0, -50.0), Some(Vec2::splat(0.5)));
        assert_eq!(window.to_uv(-50.0, 100.0), Some(Vec2::new(0.0, 1.0)));
        assert!(window.to_uv(260.0, -50.0).is_none());
    }

    #[test]
    fn test_window_trails_target() {
        let mut window = RippleWindow::default();
        window.follow(Vec2::new(100.0, 0.0));
        assert!((window.center.x - 5.0).abs() < 1e-5);
        for _ in 0..500 {
            window.follow(Vec2::new(100.0, 0.0));
        }
        assert!((window.center.x - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_drop_is_cosine_bump() {
        let mut field = RippleField::new(65);
        field.add_drop(Vec2::splat(0.5), 0.1, 0.08);
        // full strength at the centre, nothing outside the radius
        assert!((field.height(32, 32) - 0.08).abs() < 1e-6);
        assert_eq!(field.height(0, 0), 0.0);
        assert!(field.height(34, 32) < field.height(33, 32));
    }

    #[test]
    fn test_edge_drop_matches_full_scan() {
        let mut field = RippleField::new(33);
        field.add_drop(Vec2::new(0.02, 0.97), 0.2, 0.05);
        let inv = 1.0 / 32.0;
        for y in 0..33 {
            for x in 0..33 {
                let d = Vec2::new(x as f32 * inv, y as f32 * inv).distance(Vec2::new(0.02, 0.97));
                let expected = if d < 0.2 {
                    0.05 * 0.5 * (1.0 + (std::f32::consts::PI * d / 0.2).cos())
                } else {
                    0.0
                };
                assert!((field.height(x, y) - expected).abs() < 1e-6, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_window_drops_in_uv() {
        let window = RippleWindow {
            center: Vec2::new(30.0, 0.0),
            size: 300.0,
        };
        let effects = [
            Effect::Ripple {
                x: 30.0,
                z: 75.0,
                radius: 0.02,
                strength: 0.04,
            },
            Effect::Ripple {
                x: -400.0,
                z: 0.0,
                radius: 0.02,
                strength: 0.04,
            },
        ];
        let drops = window.drops(&effects);
        assert_eq!(drops.len(), 1);
        assert!((drops[0].uv - Vec2::new(0.5, 0.75)).length() < 1e-6);
        assert_eq!(drops[0].strength, 0.04);
    }

    #[test]
    fn test_step_spreads_and_damps() {
        let mut field = RippleField::new(64);
        field.add_drop(Vec2::splat(0.5), 0.05, 0.1);
        field.step();
        let early = field.energy();
        assert!(field.height(40, 32) == 0.0);
        for _ in 0..400 {
            field.step();
        }
        assert!(field.height(40, 32) != 0.0);
        assert!(field.energy() < early);
    }

    #[test]
    fn test_only_ripples_inside_window_apply() {
        let mut water = Water::new(32);
        let effects = [
            Effect::Ripple {
                x: 0.0,
                z: 0.0,
                radius: 0.03,
                strength: 0.05,
            },
            Effect::Ripple {
                x: 900.0,
                z: 0.0,
                radius: 0.03,
                strength: 0.05,
            },
            Effect::CameraShake { intensity: 0.1 },
        ];
        assert_eq!(water.apply(&effects), 1);
        assert!(water.field.energy() > 0.0);
    }
}
