//! Impulse2D - a 2D rigid-body collision and resolution engine
//!
//! Core modules:
//! - `physics`: shapes, broad/narrow phase, contact lifecycle, impulse solver
//! - `world`: entity update loop that drives the physics pipeline
//!
//! The simulation is single-threaded and deterministic: one [`World::step`]
//! per tick with an explicit delta-time, and bodies iterated in stable
//! insertion order. Note that sequential-impulse resolution is not
//! permutation-invariant - reordering bodies can change results, which is
//! inherent to the method.
//!
//! [`World::step`]: world::World::step

pub mod physics;
pub mod world;

pub use physics::{
    Aabb, Collider, CollisionEvent, CollisionEventKind, Contact, PhysicsEngine, PhysicsMaterial,
    PhysicsSettings, RigidBody, Shape, SpatialGrid, Transform,
};
pub use world::{Body, World};

use glam::Vec2;

/// Engine tuning constants
pub mod consts {
    /// Default spatial-grid cell size (world units)
    pub const CELL_SIZE: f32 = 50.0;
    /// Default gravity acceleration magnitude (world units/s², applied -y)
    pub const GRAVITY: f32 = 981.0;
    /// Default mass for dynamic bodies
    pub const DEFAULT_MASS: f32 = 1000.0;
    /// Penetration left uncorrected to avoid resolution jitter
    pub const PENETRATION_SLOP: f32 = 0.01;
    /// Fraction of remaining penetration corrected per solve
    pub const CORRECTION_PERCENT: f32 = 0.8;
    /// Default solver iteration count
    pub const SOLVER_ITERATIONS: u32 = 1;
    /// Distances below this are treated as degenerate geometry
    pub const GEOM_EPSILON: f32 = 1e-4;
}

/// Convert degrees to radians
#[inline]
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}

/// Rotate a vector by an angle in radians
#[inline]
pub fn rotate_radians(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// Rotate a vector by an angle in degrees (transform rotations are degrees)
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    rotate_radians(v, degrees_to_radians(degrees))
}
