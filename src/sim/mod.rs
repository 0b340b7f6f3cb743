//! Deterministic battle simulation
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (gameplay and cosmetics on separate streams)
//! - Stable iteration order (roster order, ids from a counter)
//! - No rendering or platform dependencies

pub mod camera;
pub mod combat;
pub mod effects;
pub mod particles;
pub mod pool;
pub mod separation;
pub mod ship;
pub mod spawn;
pub mod state;
pub mod tick;

pub use camera::{CameraMode, CameraRig};
pub use combat::FireRejected;
pub use effects::Effect;
pub use particles::{Particle, ParticleKind, Particles};
pub use pool::{Handle, Pool};
pub use state::{
    HullMetrics, Obstacle, Projectile, Ship, ShipId, SinkingShip, Team, Turret, World,
};
pub use tick::{FrameInput, tick};
