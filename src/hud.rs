//! HUD state
//!
//! Everything the DOM overlay shows, derived from the world and the camera.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::sim::{CameraRig, World};

/// Lock-on marker height above the target's centre
const LOCKON_MARKER_HEIGHT: f32 = 15.0;

/// Health bar colour band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Critical,
    Damaged,
    Healthy,
}

impl HealthBand {
    pub fn from_percent(pct: f32) -> Self {
        if pct < 33.0 {
            HealthBand::Critical
        } else if pct < 66.0 {
            HealthBand::Damaged
        } else {
            HealthBand::Healthy
        }
    }

    /// CSS colour of the bar
    pub fn color(&self) -> &'static str {
        match self {
            HealthBand::Critical => "#ff4433",
            HealthBand::Damaged => "#ffb84d",
            HealthBand::Healthy => "#29a329",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub enemies: usize,
    pub kills: u32,
    /// Player health in percent, `None` without a player
    pub health_pct: Option<f32>,
    pub health_band: Option<HealthBand>,
    /// Lock-on marker in pixels, `None` when hidden
    pub lockon: Option<Vec2>,
    pub game_over: bool,
}

impl HudSnapshot {
    /// `viewport` is the canvas size in pixels
    pub fn capture(world: &World, camera: &CameraRig, viewport: Vec2) -> Self {
        let health_pct = world
            .player
            .as_ref()
            .map(|p| p.health_fraction().max(0.0) * 100.0);
        let lockon = camera.target(world).and_then(|target| {
            let marker = target.pos + Vec3::Y * LOCKON_MARKER_HEIGHT;
            camera.world_to_screen(marker, viewport.x, viewport.y)
        });
        Self {
            score: world.score,
            enemies: world.enemies.len(),
            kills: world.kills,
            health_pct,
            health_band: health_pct.map(HealthBand::from_percent),
            lockon,
            game_over: world.game_over,
        }
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    pub fn enemies_text(&self) -> String {
        format!("Enemies: {}", self.enemies)
    }

    pub fn kills_text(&self) -> String {
        format!("Kills: {}", self.kills)
    }
}

/// Text for the game over screen: (final score, ships destroyed, best score)
pub fn game_over_lines(score: u64, kills: u32, best: u64) -> [String; 3] {
    [
        format!("Final Score: {}", score),
        format!("Ships Destroyed: {}", kills),
        format!("High Score: {}", best),
    ]
}
