//! Player preferences
//!
//! Persisted in LocalStorage, separate from the best score.

use serde::{Deserialize, Serialize};

use crate::platform::storage;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Next preset in the in-game cycle (wraps)
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 150,
            QualityPreset::Medium => 500,
            QualityPreset::High => 1500,
        }
    }

    /// Cells per side of the ripple simulation grid
    pub fn ripple_resolution(&self) -> usize {
        match self {
            QualityPreset::Low => 128,
            QualityPreset::Medium => 256,
            QualityPreset::High => 512,
        }
    }
}

/// Water surface look, handed to the renderer untouched via `RenderConfig`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterLook {
    pub surface_color: String,
    pub trough_color: String,
    pub peak_color: String,
    pub opacity: f32,
    pub waves_amplitude: f32,
    pub waves_frequency: f32,
    pub waves_speed: f32,
    pub distortion_scale: f32,
    pub fresnel_power: f32,
}

impl Default for WaterLook {
    fn default() -> Self {
        Self {
            surface_color: "#006994".to_string(),
            trough_color: "#001a33".to_string(),
            peak_color: "#4db8e8".to_string(),
            opacity: 0.7,
            waves_amplitude: 0.0,
            waves_frequency: 0.95,
            waves_speed: 0.3,
            distortion_scale: 4.5,
            fresnel_power: 4.0,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Camera shake when firing
    pub screen_shake: bool,
    /// Splashes, smoke, debris
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,

    pub water: WaterLook,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            particles: true,
            reduced_motion: false,
            water: WaterLook::default(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "broadside_settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn load() -> Self {
        match storage::load_json::<Settings>(Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if storage::save_json(Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}
