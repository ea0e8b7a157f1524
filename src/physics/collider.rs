//! Collider shapes and world-space bounds
//!
//! Shapes are a closed enum; every supported pair combination is enumerated
//! in [`narrow`](super::narrow) rather than dispatched through virtual calls.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Transform;
use crate::rotate_degrees;

/// Axis-aligned bounding box used for broad-phase pruning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing every point (empty input yields a zero box)
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = points.first().copied().unwrap_or(Vec2::ZERO);
        let mut max = min;
        for p in &points[1.min(points.len())..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Broad-phase overlap test (touching edges count as overlapping)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Collider geometry in body-local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle {
        radius: f32,
    },
    /// Rectangle centered on the transform position; rotation comes from
    /// the owning transform (degrees)
    Box {
        width: f32,
        height: f32,
    },
    /// Convex polygon, vertices in local space around the transform position
    Polygon {
        vertices: Vec<Vec2>,
    },
}

impl Shape {
    /// World-space bounds, accounting for rotation where applicable
    pub fn bounds(&self, transform: &Transform) -> Aabb {
        let pos = transform.position;
        match self {
            Shape::Circle { radius } => Aabb::from_center_half(pos, Vec2::splat(*radius)),
            Shape::Box { width, height } => {
                Aabb::from_points(&box_corners(pos, *width, *height, transform.rotation))
            }
            Shape::Polygon { vertices } => Aabb::from_points(&world_vertices(vertices, transform)),
        }
    }
}

/// A shape plus its enabled flag.
///
/// Colliders only exist inside a [`RigidBody`](super::body::RigidBody), which
/// in turn lives in a body owning a [`Transform`] - a collider without a
/// transform is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    pub enabled: bool,
}

impl Collider {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            enabled: true,
        }
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(Shape::Circle { radius })
    }

    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(Shape::Box { width, height })
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        Self::new(Shape::Polygon { vertices })
    }
}

/// The four corners of a rotated box, in world space
pub fn box_corners(center: Vec2, width: f32, height: f32, rotation_degrees: f32) -> [Vec2; 4] {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let local = [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ];
    local.map(|corner| center + rotate_degrees(corner, rotation_degrees))
}

/// Polygon vertices transformed into world space (rotate, then translate)
pub fn world_vertices(vertices: &[Vec2], transform: &Transform) -> Vec<Vec2> {
    vertices
        .iter()
        .map(|v| transform.position + rotate_degrees(*v, transform.rotation))
        .collect()
}
