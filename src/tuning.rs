//! Data-driven game balance
//!
//! Every number that shapes how a battle plays lives here so it can be
//! swapped per deployment. Two presets ship with the game: `classic` (small
//! hulls, quick fights) and `massive` (large hulls, long engagements).

use serde::{Deserialize, Serialize};

/// Sway (buoyancy bobbing) tuning shared by all ships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwayTuning {
    pub base_amplitude: f32,
    pub base_freq: f32,
    pub roll_amp: f32,
    pub pitch_amp: f32,
    /// Splash when the offset dips below `-amplitude * factor`
    pub splash_threshold_factor: f32,
    /// Minimum seconds between two splashes of the same ship
    pub splash_cooldown: f32,
}

impl Default for SwayTuning {
    fn default() -> Self {
        Self {
            base_amplitude: 0.35,
            base_freq: 1.2,
            roll_amp: 0.08,
            pitch_amp: 0.05,
            splash_threshold_factor: 0.5,
            splash_cooldown: 0.25,
        }
    }
}

/// Camera rig tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Vertical field of view in degrees
    pub fov_deg: f32,
    pub distance: f32,
    pub height: f32,
    /// Per-frame (at 60 Hz) blend toward the follow position
    pub follow_lerp: f32,
    /// Per-frame (at 60 Hz) blend while locked on
    pub lockon_smooth: f32,
    /// Enemies closer than this are not lock-on candidates
    pub lockon_min_distance: f32,
    pub first_person_lerp: f32,
    /// Eye height above the deck in first person
    pub first_person_height: f32,
    /// Eye offset toward the bow in first person
    pub first_person_forward: f32,
    /// Free-fly speed in units per second
    pub free_fly_speed: f32,
    /// Free-fly look sensitivity in radians per pixel
    pub free_fly_look: f32,
    pub shake_intensity: f32,
    pub shake_duration: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            fov_deg: 55.0,
            distance: 30.0,
            height: 7.0,
            follow_lerp: 0.12,
            lockon_smooth: 0.14,
            lockon_min_distance: 8.0,
            first_person_lerp: 0.35,
            first_person_height: 4.0,
            first_person_forward: 6.0,
            free_fly_speed: 40.0,
            free_fly_look: 0.003,
            shake_intensity: 0.06,
            shake_duration: 0.12,
        }
    }
}

/// Gameplay balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub model_scale: f32,

    // === Ships ===
    pub player_health: u32,
    pub enemy_health: u32,
    /// Hull radius before model scaling (used when the mesh gives no bounds)
    pub ship_radius: f32,
    /// Height of the hull origin above the water plane
    pub float_height: f32,
    pub player_speed: f32,
    pub player_turn: f32,
    pub player_accel: f32,
    pub player_decel: f32,
    pub player_turn_accel: f32,
    pub player_turn_decel: f32,
    pub enemy_turn_speed: f32,
    pub enemy_move_speed: f32,

    // === Guns ===
    pub player_cooldown: f32,
    pub enemy_shoot_range: f32,
    pub enemy_cooldown_min: f32,
    pub enemy_cooldown_max: f32,
    pub projectile_radius: f32,
    pub projectile_speed: f32,
    /// Enemy shells leave the barrel slightly slower
    pub enemy_speed_factor: f32,
    pub projectile_damage: u32,
    /// Downward acceleration of shells (0 = flat trajectory)
    pub projectile_gravity: f32,
    pub projectile_max_age: f32,
    pub recoil_amount: f32,
    pub recoil_duration: f32,
    pub muzzle_flash_duration: f32,
    pub shell_eject_speed: f32,

    // === Scoring ===
    pub hit_score: u64,
    pub kill_score: u64,

    // === Death ===
    pub enemy_sink_duration: f32,
    pub player_sink_duration: f32,

    // === World ===
    pub separation_margin: f32,
    pub spawn_min_distance: f32,
    pub spawn_max_attempts: u32,
    pub enemy_count: u32,
    pub obstacle_x: f32,
    pub obstacle_z: f32,
    /// Radius of the island; zero disables it
    pub obstacle_radius: f32,

    pub sway: SwayTuning,
    pub camera: CameraTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::classic()
    }
}

impl Tuning {
    /// Small hulls, short fights
    pub fn classic() -> Self {
        let model_scale = 4.0;
        Self {
            model_scale,
            player_health: 12_000,
            enemy_health: 900,
            ship_radius: 5.0,
            float_height: 1.0,
            player_speed: 28.0,
            player_turn: 3.2,
            player_accel: 40.0,
            player_decel: 20.0,
            player_turn_accel: 2.0,
            player_turn_decel: 1.0,
            enemy_turn_speed: 2.2,
            enemy_move_speed: 8.0,
            player_cooldown: 0.35,
            enemy_shoot_range: 240.0,
            enemy_cooldown_min: 1.0,
            enemy_cooldown_max: 2.4,
            projectile_radius: 0.18,
            projectile_speed: 80.0,
            enemy_speed_factor: 0.98,
            projectile_damage: 30,
            projectile_gravity: 0.0,
            projectile_max_age: 6.0,
            recoil_amount: 0.22 * model_scale,
            recoil_duration: 0.12,
            muzzle_flash_duration: 0.08,
            shell_eject_speed: 6.0,
            hit_score: 10,
            kill_score: 400,
            enemy_sink_duration: 3.0,
            player_sink_duration: 4.0,
            separation_margin: 2.0,
            spawn_min_distance: 60.0,
            spawn_max_attempts: 12,
            enemy_count: 4,
            obstacle_x: 100.0,
            obstacle_z: -10.0,
            obstacle_radius: 60.0,
            sway: SwayTuning::default(),
            camera: CameraTuning::default(),
        }
    }

    /// Large hulls, long engagements, wide spacing
    pub fn massive() -> Self {
        Self {
            player_health: 50_000,
            enemy_health: 5_000,
            projectile_damage: 200,
            separation_margin: 50.0,
            spawn_min_distance: 400.0,
            sway: SwayTuning {
                base_amplitude: 0.04,
                base_freq: 1.4,
                roll_amp: 0.02,
                pitch_amp: 0.012,
                splash_threshold_factor: 0.6,
                splash_cooldown: 0.28,
            },
            ..Self::classic()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classic" | "small" => Some(Self::classic()),
            "massive" | "large" => Some(Self::massive()),
            _ => None,
        }
    }

    /// Parse overrides; missing fields keep their classic values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Collision radius of a hull without mesh bounds
    pub fn default_ship_radius(&self) -> f32 {
        self.ship_radius * self.model_scale
    }

    /// Distance from the turret pivot to the muzzle
    pub fn barrel_length(&self) -> f32 {
        1.6 + self.model_scale * 0.12
    }
}
