//! Transforms and rigid-body dynamic state
//!
//! Integration takes an explicit delta-time so steps are independently
//! testable with arbitrary fixed deltas.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider::Collider;
use super::material::PhysicsMaterial;
use crate::consts;

/// Position, rotation and size of a body.
///
/// Mutated only by integration ([`World::step`]) and by the solver's
/// positional correction.
///
/// [`World::step`]: crate::world::World::step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    pub size: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            size: Vec2::splat(20.0),
        }
    }
}

impl Transform {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }
}

/// Per-body dynamic state: velocity, mass, material and exactly one collider.
///
/// A body is immovable when `is_static` is set or its mass is non-positive;
/// both cases produce an inverse mass of zero in the solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub velocity: Vec2,
    pub mass: f32,
    pub is_static: bool,
    pub use_gravity: bool,
    pub material: PhysicsMaterial,
    pub collider: Collider,
}

impl RigidBody {
    /// A dynamic body with default mass and material
    pub fn new(collider: Collider) -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass: consts::DEFAULT_MASS,
            is_static: false,
            use_gravity: true,
            material: PhysicsMaterial::default(),
            collider,
        }
    }

    /// An immovable body (walls, floors)
    pub fn fixed(collider: Collider) -> Self {
        Self {
            mass: 0.0,
            is_static: true,
            use_gravity: false,
            ..Self::new(collider)
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn without_gravity(mut self) -> Self {
        self.use_gravity = false;
        self
    }

    /// Inverse mass: zero for static or non-positive-mass bodies
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        if self.is_static || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Advance velocity by one step: gravity, then friction damping.
    ///
    /// Static bodies are a no-op. Friction scales the horizontal velocity by
    /// `1 - friction` per step (exponential decay at a fixed timestep).
    pub fn integrate(&mut self, gravity: Vec2, dt: f32) {
        if self.is_static {
            return;
        }
        if self.use_gravity {
            self.velocity += gravity * dt;
        }
        self.velocity.x *= 1.0 - self.material.friction;
    }

    /// Add an instantaneous velocity change
    pub fn add_force(&mut self, force: Vec2) {
        self.velocity += force;
    }

    /// Zero the velocity
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }
}
