//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key and mouse state folded into per-frame input)
//! - Storage (LocalStorage on web, nothing natively)

pub mod input;
pub mod storage;

pub use input::InputState;
