//! Surface materials: friction and restitution

use serde::{Deserialize, Serialize};

/// Contact surface properties.
///
/// `friction` is a passive per-step damping coefficient between 0 (none) and
/// 1 (full stop), applied during rigid-body integration rather than as a
/// contact impulse. `restitution` is the fraction of relative normal velocity
/// preserved after impact; contacts combine it with `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.1,
            restitution: 0.0,
        }
    }
}

impl PhysicsMaterial {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }

    /// High-restitution preset
    pub fn bouncy() -> Self {
        Self::new(0.1, 0.8)
    }

    /// No damping, no bounce
    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }
}
