//! Keyboard/mouse state folded into per-frame simulation input

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::FrameInput;

/// Toggle lock-on
pub const LOCKON_KEY: &str = "l";
/// Cycle camera modes
pub const CAMERA_KEY: &str = "c";
/// Restart the battle
pub const RESTART_KEY: &str = "r";
/// Toggle autopilot (demo mode)
pub const AUTOPILOT_KEY: &str = "p";

/// Raw input accumulated between simulation ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashSet<String>,
    /// Mouse position in normalized device coordinates
    mouse_ndc: Option<Vec2>,
    /// Mouse movement since the last tick, in pixels
    look_delta: Vec2,
    fire: bool,
    toggle_lock_on: bool,
    cycle_camera: bool,
    restart: bool,
    autopilot: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed (`KeyboardEvent.key`)
    pub fn key_down(&mut self, key: &str) {
        let key = key.to_lowercase();
        // Ignore auto-repeat for toggles
        if !self.keys.contains(&key) {
            match key.as_str() {
                LOCKON_KEY => self.toggle_lock_on = true,
                CAMERA_KEY => self.cycle_camera = true,
                RESTART_KEY => self.restart = true,
                AUTOPILOT_KEY => {
                    self.autopilot = !self.autopilot;
                    log::info!("Autopilot: {}", self.autopilot);
                }
                _ => {}
            }
        }
        self.keys.insert(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.remove(&key.to_lowercase());
    }

    /// Mouse moved to client position (x, y) in a viewport of (w, h) pixels
    pub fn mouse_move(&mut self, x: f32, y: f32, w: f32, h: f32, movement: Vec2) {
        if w > 0.0 && h > 0.0 {
            self.mouse_ndc = Some(Vec2::new((x / w) * 2.0 - 1.0, -(y / h) * 2.0 + 1.0));
        }
        self.look_delta += movement;
    }

    /// Mouse button pressed; the primary button fires
    pub fn mouse_down(&mut self, button: i16) {
        if button == 0 {
            self.fire = true;
        }
    }

    /// Request a restart (HUD button)
    pub fn request_restart(&mut self) {
        self.restart = true;
    }

    fn held(&self, names: &[&str]) -> bool {
        names.iter().any(|k| self.keys.contains(*k))
    }

    /// Build the input for the next tick
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            forward: self.held(&["w", "arrowup"]),
            back: self.held(&["s", "arrowdown"]),
            left: self.held(&["a", "arrowleft"]),
            right: self.held(&["d", "arrowright"]),
            ascend: self.held(&["e"]),
            descend: self.held(&["q"]),
            aim_ndc: self.mouse_ndc,
            look_delta: self.look_delta,
            fire: self.fire,
            toggle_lock_on: self.toggle_lock_on,
            cycle_camera: self.cycle_camera,
            restart: self.restart,
            autopilot: self.autopilot,
        }
    }

    /// Clear one-shot inputs after they were processed by a tick
    pub fn clear_one_shots(&mut self) {
        self.fire = false;
        self.toggle_lock_on = false;
        self.cycle_camera = false;
        self.restart = false;
        self.look_delta = Vec2::ZERO;
    }
}
