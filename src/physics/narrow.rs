//! Narrow-phase shape-pair tests
//!
//! Every supported pair combination is enumerated in [`collide`]: circle vs
//! circle in closed form, box vs box via SAT over the boxes' edge normals,
//! and the polygon family via general SAT. The contact normal is unit length
//! and always points from shape A toward shape B; pairs evaluated through a
//! swapped helper flip the normal to preserve that convention.
//!
//! Degenerate geometry (coincident centers, zero-length edges) resolves to a
//! documented fallback direction instead of producing NaN.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Transform;
use super::collider::{Shape, box_corners, world_vertices};
use crate::consts::GEOM_EPSILON;
use crate::rotate_degrees;

/// Unit direction used when centers coincide and no normal can be derived
pub const DEGENERATE_NORMAL: Vec2 = Vec2::NEG_Y;

/// Result of a narrow-phase test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Unit separation normal, pointing from shape A toward shape B
    pub normal: Vec2,
    /// Overlap depth along the normal, never negative
    pub penetration: f32,
    /// Approximate contact point (midpoint of centers for SAT pairs)
    pub point: Option<Vec2>,
}

impl Contact {
    /// The same contact seen from the other body
    fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Exact overlap test between two shapes in world space.
///
/// Rejects on world AABBs first, then dispatches on the shape-kind pair.
/// Returns `None` when the shapes do not overlap.
pub fn collide(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Option<Contact> {
    if !a.bounds(ta).overlaps(&b.bounds(tb)) {
        return None;
    }

    match (a, b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(ta.position, *ra, tb.position, *rb)
        }
        (Shape::Circle { radius }, Shape::Box { width, height }) => {
            box_circle(tb.position, *width, *height, tb.rotation, ta.position, *radius)
                .map(Contact::flipped)
        }
        (Shape::Box { width, height }, Shape::Circle { radius }) => {
            box_circle(ta.position, *width, *height, ta.rotation, tb.position, *radius)
        }
        (
            Shape::Box {
                width: wa,
                height: ha,
            },
            Shape::Box {
                width: wb,
                height: hb,
            },
        ) => {
            let ca = box_corners(ta.position, *wa, *ha, ta.rotation);
            let cb = box_corners(tb.position, *wb, *hb, tb.rotation);
            // A rectangle has two unique edge normals; the other two are
            // their negations and add nothing to the axis set.
            let mut axes = edge_normals(&ca, 2);
            axes.extend(edge_normals(&cb, 2));
            sat_contact(&ca, ta.position, &cb, tb.position, &axes)
        }
        (Shape::Circle { radius }, Shape::Polygon { vertices }) => polygon_circle(
            &world_vertices(vertices, tb),
            tb.position,
            ta.position,
            *radius,
        )
        .map(Contact::flipped),
        (Shape::Polygon { vertices }, Shape::Circle { radius }) => polygon_circle(
            &world_vertices(vertices, ta),
            ta.position,
            tb.position,
            *radius,
        ),
        (Shape::Box { width, height }, Shape::Polygon { vertices }) => {
            let ca = box_corners(ta.position, *width, *height, ta.rotation);
            let vb = world_vertices(vertices, tb);
            let mut axes = edge_normals(&ca, 2);
            axes.extend(edge_normals(&vb, vb.len()));
            sat_contact(&ca, ta.position, &vb, tb.position, &axes)
        }
        (Shape::Polygon { vertices }, Shape::Box { width, height }) => {
            let va = world_vertices(vertices, ta);
            let cb = box_corners(tb.position, *width, *height, tb.rotation);
            let mut axes = edge_normals(&va, va.len());
            axes.extend(edge_normals(&cb, 2));
            sat_contact(&va, ta.position, &cb, tb.position, &axes)
        }
        (Shape::Polygon { vertices: va }, Shape::Polygon { vertices: vb }) => {
            let wa = world_vertices(va, ta);
            let wb = world_vertices(vb, tb);
            let mut axes = edge_normals(&wa, wa.len());
            axes.extend(edge_normals(&wb, wb.len()));
            sat_contact(&wa, ta.position, &wb, tb.position, &axes)
        }
    }
}

/// Closed-form circle vs circle test
fn circle_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<Contact> {
    let d = ca.distance(cb);
    let r = ra + rb;
    if d >= r {
        return None;
    }
    let normal = if d > GEOM_EPSILON {
        (cb - ca) / d
    } else {
        DEGENERATE_NORMAL
    };
    Some(Contact {
        normal,
        penetration: r - d,
        point: Some(ca + normal * ra),
    })
}

/// Box vs circle (OBB closest-point test).
///
/// The returned normal points from the box (A) toward the circle (B).
fn box_circle(
    box_center: Vec2,
    width: f32,
    height: f32,
    rotation_degrees: f32,
    circle_center: Vec2,
    radius: f32,
) -> Option<Contact> {
    // Work in the box's local frame: un-rotate the circle center, clamp to
    // the half-extents for the closest point.
    let local = rotate_degrees(circle_center - box_center, -rotation_degrees);
    let half = Vec2::new(width / 2.0, height / 2.0);
    let closest_local = local.clamp(-half, half);
    let delta = local - closest_local;
    let dist_sq = delta.length_squared();
    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > GEOM_EPSILON {
        rotate_degrees(delta / dist, rotation_degrees)
    } else {
        // Circle center embedded in the box: fall back to the center-to-center
        // direction, then to the fixed degenerate direction.
        let to_circle = circle_center - box_center;
        if to_circle.length_squared() > GEOM_EPSILON * GEOM_EPSILON {
            to_circle.normalize()
        } else {
            DEGENERATE_NORMAL
        }
    };
    let point = box_center + rotate_degrees(closest_local, rotation_degrees);
    Some(Contact {
        normal,
        penetration: radius - dist,
        point: Some(point),
    })
}

/// Polygon vs circle via closest point on the polygon boundary.
///
/// The returned normal points from the polygon (A) toward the circle (B).
fn polygon_circle(
    verts: &[Vec2],
    poly_center: Vec2,
    circle_center: Vec2,
    radius: f32,
) -> Option<Contact> {
    if verts.len() < 3 {
        return None;
    }

    let mut best = verts[0];
    let mut best_dist_sq = f32::INFINITY;
    for i in 0..verts.len() {
        let cp = closest_point_on_segment(circle_center, verts[i], verts[(i + 1) % verts.len()]);
        let d2 = cp.distance_squared(circle_center);
        if d2 < best_dist_sq {
            best_dist_sq = d2;
            best = cp;
        }
    }

    let dist = best_dist_sq.sqrt();
    let inside = point_in_convex(circle_center, verts);
    if !inside && dist >= radius {
        return None;
    }

    let normal = if dist > GEOM_EPSILON {
        let outward = (circle_center - best) / dist;
        // With the center inside, the boundary lies outward of the center
        if inside { -outward } else { outward }
    } else {
        let to_circle = circle_center - poly_center;
        if to_circle.length_squared() > GEOM_EPSILON * GEOM_EPSILON {
            to_circle.normalize()
        } else {
            DEGENERATE_NORMAL
        }
    };
    let penetration = if inside { radius + dist } else { radius - dist };
    Some(Contact {
        normal,
        penetration,
        point: Some(best),
    })
}

/// Separating Axis Theorem over an explicit candidate-axis list.
///
/// Returns the minimum-overlap axis as the contact normal, signed so that
/// moving B along it by the penetration separates the pair (A toward B).
fn sat_contact(
    verts_a: &[Vec2],
    center_a: Vec2,
    verts_b: &[Vec2],
    center_b: Vec2,
    axes: &[Vec2],
) -> Option<Contact> {
    let mut depth = f32::INFINITY;
    let mut normal = DEGENERATE_NORMAL;

    for &axis in axes {
        let (min_a, max_a) = project(verts_a, axis);
        let (min_b, max_b) = project(verts_b, axis);
        // Escape distances for pushing B along +axis and -axis. Taking the
        // smaller one keeps the translation minimal even when one interval
        // contains the other.
        let forward = max_a - min_b;
        let backward = max_b - min_a;
        let overlap = forward.min(backward);
        if overlap <= 0.0 {
            return None;
        }
        if overlap < depth {
            depth = overlap;
            normal = if forward <= backward { axis } else { -axis };
        }
    }
    if !depth.is_finite() {
        // Every candidate edge was degenerate
        return None;
    }

    Some(Contact {
        normal,
        penetration: depth,
        // Midpoint of centers, a deliberate single-point simplification
        point: Some((center_a + center_b) * 0.5),
    })
}

/// Outward edge normals for up to `limit` edges; zero-length edges are skipped
fn edge_normals(verts: &[Vec2], limit: usize) -> Vec<Vec2> {
    let mut axes = Vec::with_capacity(limit.min(verts.len()));
    for i in 0..limit.min(verts.len()) {
        let edge = verts[(i + 1) % verts.len()] - verts[i];
        let len = edge.length();
        if len < GEOM_EPSILON {
            continue;
        }
        axes.push(Vec2::new(-edge.y, edge.x) / len);
    }
    axes
}

/// Project vertices onto an axis, returning (min, max)
fn project(verts: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for v in verts {
        let p = v.dot(axis);
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < GEOM_EPSILON * GEOM_EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Convex containment: the point is on the same side of every edge
fn point_in_convex(p: Vec2, verts: &[Vec2]) -> bool {
    let mut has_pos = false;
    let mut has_neg = false;
    for i in 0..verts.len() {
        let a = verts[i];
        let b = verts[(i + 1) % verts.len()];
        let cross = (b - a).perp_dot(p - a);
        if cross > GEOM_EPSILON {
            has_pos = true;
        }
        if cross < -GEOM_EPSILON {
            has_neg = true;
        }
        if has_pos && has_neg {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Transform {
        Transform::new(Vec2::new(x, y))
    }

    fn square_poly(half: f32) -> Shape {
        Shape::Polygon {
            vertices: vec![
                Vec2::new(-half, -half),
                Vec2::new(half, -half),
                Vec2::new(half, half),
                Vec2::new(-half, half),
            ],
        }
    }

    #[test]
    fn test_circle_circle_overlap() {
        // radius 10 at (0,0) vs radius 10 at (15,0): penetration 5, normal +x
        let a = Shape::Circle { radius: 10.0 };
        let b = Shape::Circle { radius: 10.0 };
        let contact = collide(&a, &at(0.0, 0.0), &b, &at(15.0, 0.0)).unwrap();
        assert!((contact.penetration - 5.0).abs() < 1e-5);
        assert!((contact.normal - Vec2::X).length() < 1e-5);
        assert!((contact.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_circle_touching_is_miss() {
        let a = Shape::Circle { radius: 10.0 };
        let b = Shape::Circle { radius: 10.0 };
        assert!(collide(&a, &at(0.0, 0.0), &b, &at(20.0, 0.0)).is_none());
        assert!(collide(&a, &at(0.0, 0.0), &b, &at(25.0, 0.0)).is_none());
    }

    #[test]
    fn test_circle_circle_coincident_centers_fallback() {
        let a = Shape::Circle { radius: 10.0 };
        let b = Shape::Circle { radius: 10.0 };
        let contact = collide(&a, &at(0.0, 0.0), &b, &at(0.0, 0.0)).unwrap();
        assert_eq!(contact.normal, DEGENERATE_NORMAL);
        assert!((contact.penetration - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_box_normal_points_a_to_b() {
        // Circle left of the box; the contact normal must point at the box
        let circle = Shape::Circle { radius: 5.0 };
        let b = Shape::Box {
            width: 20.0,
            height: 20.0,
        };
        let contact = collide(&circle, &at(-14.0, 0.0), &b, &at(0.0, 0.0)).unwrap();
        assert!((contact.penetration - 1.0).abs() < 1e-4);
        assert!((contact.normal - Vec2::X).length() < 1e-4);
    }

    #[test]
    fn test_box_circle_rotated() {
        // 20x10 box rotated 90 degrees acts as 10x20
        let b = Shape::Box {
            width: 20.0,
            height: 10.0,
        };
        let circle = Shape::Circle { radius: 5.0 };
        let tb = at(0.0, 0.0).with_rotation(90.0);
        let contact = collide(&b, &tb, &circle, &at(9.0, 0.0)).unwrap();
        assert!((contact.penetration - 1.0).abs() < 1e-4);
        assert!((contact.normal - Vec2::X).length() < 1e-4);
    }

    #[test]
    fn test_circle_embedded_in_box_fallback() {
        let circle = Shape::Circle { radius: 4.0 };
        let b = Shape::Box {
            width: 20.0,
            height: 20.0,
        };
        // Coincident centers: fixed fallback, flipped for the circle-first pair
        let contact = collide(&circle, &at(0.0, 0.0), &b, &at(0.0, 0.0)).unwrap();
        assert_eq!(contact.normal, -DEGENERATE_NORMAL);
        assert!((contact.penetration - 4.0).abs() < 1e-5);
        assert!(contact.normal.is_finite());
    }

    #[test]
    fn test_box_box_mtv() {
        let a = Shape::Box {
            width: 10.0,
            height: 10.0,
        };
        let b = a.clone();
        let contact = collide(&a, &at(0.0, 0.0), &b, &at(8.0, 0.0)).unwrap();
        assert!((contact.penetration - 2.0).abs() < 1e-4);
        assert!((contact.normal - Vec2::X).length() < 1e-4);
    }

    #[test]
    fn test_box_box_separated() {
        let a = Shape::Box {
            width: 10.0,
            height: 10.0,
        };
        let b = a.clone();
        assert!(collide(&a, &at(0.0, 0.0), &b, &at(20.0, 0.0)).is_none());
    }

    #[test]
    fn test_box_box_rotated_hit() {
        let a = Shape::Box {
            width: 10.0,
            height: 10.0,
        };
        let b = a.clone();
        let tb = at(10.5, 0.0).with_rotation(45.0);
        let contact = collide(&a, &at(0.0, 0.0), &b, &tb).unwrap();
        assert!(contact.normal.x > 0.9);
        assert!(contact.penetration > 0.0);
    }

    #[test]
    fn test_box_box_separating_axis_is_diagonal() {
        // AABBs overlap, but the rotated box's diagonal axis separates them
        let a = Shape::Box {
            width: 10.0,
            height: 10.0,
        };
        let b = a.clone();
        let tb = at(9.0, 9.0).with_rotation(45.0);
        assert!(collide(&a, &at(0.0, 0.0), &b, &tb).is_none());
    }

    #[test]
    fn test_polygon_polygon_overlap() {
        let a = square_poly(5.0);
        let b = square_poly(5.0);
        let contact = collide(&a, &at(0.0, 0.0), &b, &at(8.0, 0.0)).unwrap();
        assert!((contact.penetration - 2.0).abs() < 1e-4);
        assert!((contact.normal - Vec2::X).length() < 1e-4);
        // Contact point is the midpoint of the two centers
        assert!((contact.point.unwrap() - Vec2::new(4.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_polygon_polygon_separated() {
        let a = square_poly(5.0);
        let b = square_poly(5.0);
        assert!(collide(&a, &at(0.0, 0.0), &b, &at(20.0, 0.0)).is_none());
    }

    #[test]
    fn test_triangle_triangle() {
        let tri = Shape::Polygon {
            vertices: vec![Vec2::new(-5.0, -5.0), Vec2::new(5.0, -5.0), Vec2::new(0.0, 5.0)],
        };
        let contact = collide(&tri, &at(0.0, 0.0), &tri.clone(), &at(4.0, 0.0)).unwrap();
        assert!(contact.normal.x > 0.0);
        assert!(contact.penetration > 0.0);
        assert!(collide(&tri, &at(0.0, 0.0), &tri.clone(), &at(40.0, 0.0)).is_none());
    }

    #[test]
    fn test_circle_polygon() {
        let circle = Shape::Circle { radius: 3.0 };
        let poly = square_poly(5.0);
        // Touching exactly: miss
        assert!(collide(&circle, &at(8.0, 0.0), &poly, &at(0.0, 0.0)).is_none());
        // Overlapping by 0.5, normal from circle toward polygon (-x)
        let contact = collide(&circle, &at(7.5, 0.0), &poly, &at(0.0, 0.0)).unwrap();
        assert!((contact.penetration - 0.5).abs() < 1e-4);
        assert!((contact.normal - Vec2::NEG_X).length() < 1e-4);
    }

    #[test]
    fn test_circle_center_inside_polygon() {
        let poly = square_poly(5.0);
        let circle = Shape::Circle { radius: 2.0 };
        let contact = collide(&poly, &at(0.0, 0.0), &circle, &at(4.0, 0.0)).unwrap();
        // Nearest edge is x=5, one unit away: penetration = radius + 1
        assert!((contact.penetration - 3.0).abs() < 1e-4);
        assert!((contact.normal - Vec2::X).length() < 1e-4);
    }

    #[test]
    fn test_box_polygon() {
        let b = Shape::Box {
            width: 10.0,
            height: 10.0,
        };
        let poly = square_poly(5.0);
        let contact = collide(&b, &at(0.0, 0.0), &poly, &at(8.0, 0.0)).unwrap();
        assert!((contact.penetration - 2.0).abs() < 1e-4);
        assert!((contact.normal - Vec2::X).length() < 1e-4);
    }

    #[test]
    fn test_aabb_prereject() {
        let a = Shape::Circle { radius: 1.0 };
        let b = square_poly(1.0);
        assert!(collide(&a, &at(0.0, 0.0), &b, &at(100.0, 100.0)).is_none());
    }
}
