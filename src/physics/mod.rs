//! Collision detection and resolution
//!
//! The pipeline runs once per tick:
//! 1. Broad phase: rebuild the spatial hash from enabled colliders
//! 2. Narrow phase: exact shape-pair tests on deduplicated candidate pairs
//! 3. Contact lifecycle: enter/exit transitions diffed from pair snapshots
//! 4. Resolution: sequential impulses plus positional correction

pub mod body;
pub mod collider;
pub mod engine;
pub mod grid;
pub mod material;
pub mod narrow;

pub use body::{RigidBody, Transform};
pub use collider::{Aabb, Collider, Shape};
pub use engine::{CollisionEvent, CollisionEventKind, PhysicsEngine, PhysicsSettings};
pub use grid::SpatialGrid;
pub use material::PhysicsMaterial;
pub use narrow::{Contact, collide};
