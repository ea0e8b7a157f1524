//! Per-tick physics pipeline and contact solver
//!
//! One [`PhysicsEngine::step`] per tick: rebuild the broad-phase grid, run
//! narrow-phase tests on deduplicated candidate pairs, diff the contact set
//! against the previous tick for enter/exit events, then resolve confirmed
//! contacts with sequential impulses and positional correction.

use std::collections::{BTreeSet, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider::Aabb;
use super::grid::SpatialGrid;
use super::narrow::{self, Contact};
use crate::consts;
use crate::world::Body;

/// Tunable pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsSettings {
    /// Gravity acceleration applied to bodies with `use_gravity`
    pub gravity: Vec2,
    /// Broad-phase cell size (world units)
    pub cell_size: f32,
    /// Solver passes over the confirmed contacts; more passes improve
    /// stacking stability
    pub solver_iterations: u32,
    /// Fraction of remaining penetration corrected per solve, below 1 to
    /// avoid overshoot
    pub correction_percent: f32,
    /// Penetration tolerance left uncorrected to avoid jitter
    pub slop: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -consts::GRAVITY),
            cell_size: consts::CELL_SIZE,
            solver_iterations: consts::SOLVER_ITERATIONS,
            correction_percent: consts::CORRECTION_PERCENT,
            slop: consts::PENETRATION_SLOP,
        }
    }
}

/// Contact lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEventKind {
    /// First tick the pair overlaps
    Enter,
    /// First tick the pair no longer overlaps
    Exit,
}

/// An enter/exit transition for an unordered body pair, fired once per
/// transition per tick. `a < b` by body id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub kind: CollisionEventKind,
    pub a: u32,
    pub b: u32,
}

/// A confirmed contact, by body slice index
struct ContactPair {
    a: usize,
    b: usize,
    contact: Contact,
}

/// Orchestrates the per-tick pipeline over a slice of bodies.
///
/// Contact state is tracked as two pair-set snapshots (previous tick and
/// current tick) diffed exactly once per tick, independent of the solver
/// iteration count. `BTreeSet` keeps event order deterministic.
pub struct PhysicsEngine {
    settings: PhysicsSettings,
    grid: SpatialGrid,
    active_pairs: BTreeSet<(u32, u32)>,
    events: Vec<CollisionEvent>,
}

impl PhysicsEngine {
    pub fn new(settings: PhysicsSettings) -> Self {
        let grid = SpatialGrid::new(settings.cell_size);
        Self {
            settings,
            grid,
            active_pairs: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut PhysicsSettings {
        &mut self.settings
    }

    /// Events from the most recent step, cleared on the next one
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Whether the unordered pair was in contact after the last step
    pub fn in_contact(&self, a: u32, b: u32) -> bool {
        self.active_pairs.contains(&ordered_pair(a, b))
    }

    /// Drop all contact state involving a removed body id.
    ///
    /// Removal is not a separation: no Exit event will fire for the pairs.
    pub fn forget(&mut self, id: u32) {
        self.active_pairs.retain(|&(a, b)| a != id && b != id);
    }

    /// Run one tick of the collision pipeline.
    ///
    /// Bodies without a rigid body or with a disabled collider are silently
    /// excluded. Velocities and positions are mutated in place.
    pub fn step(&mut self, bodies: &mut [Body]) {
        self.events.clear();

        // Broad phase: every body with an enabled collider, with its bounds
        let active: Vec<(usize, Aabb)> = bodies
            .iter()
            .enumerate()
            .filter_map(|(index, body)| {
                let rb = body.rigidbody.as_ref()?;
                if !rb.collider.enabled {
                    return None;
                }
                Some((index, rb.collider.shape.bounds(&body.transform)))
            })
            .collect();
        self.grid.rebuild(active.iter().copied());
        log::trace!("broad phase: {} active bodies", active.len());

        // Narrow phase with unordered-pair de-duplication
        let mut tested: HashSet<(u32, u32)> = HashSet::new();
        let mut current: BTreeSet<(u32, u32)> = BTreeSet::new();
        let mut contacts: Vec<ContactPair> = Vec::new();
        for &(ia, bounds_a) in &active {
            for ib in self.grid.query(&bounds_a, ia) {
                let key = ordered_pair(bodies[ia].id, bodies[ib].id);
                if !tested.insert(key) {
                    continue;
                }
                let (body_a, body_b) = (&bodies[ia], &bodies[ib]);
                let (Some(rb_a), Some(rb_b)) = (&body_a.rigidbody, &body_b.rigidbody) else {
                    continue;
                };
                if let Some(contact) = narrow::collide(
                    &rb_a.collider.shape,
                    &body_a.transform,
                    &rb_b.collider.shape,
                    &body_b.transform,
                ) {
                    current.insert(key);
                    contacts.push(ContactPair {
                        a: ia,
                        b: ib,
                        contact,
                    });
                }
            }
        }
        log::trace!(
            "narrow phase: {} contacts from {} tested pairs",
            contacts.len(),
            tested.len()
        );

        // Contact lifecycle: diff against the previous tick, exactly once
        for &(a, b) in current.difference(&self.active_pairs) {
            self.events.push(CollisionEvent {
                kind: CollisionEventKind::Enter,
                a,
                b,
            });
        }
        for &(a, b) in self.active_pairs.difference(&current) {
            self.events.push(CollisionEvent {
                kind: CollisionEventKind::Exit,
                a,
                b,
            });
        }
        self.active_pairs = current;

        // Resolution
        for _ in 0..self.settings.solver_iterations {
            for pair in &contacts {
                self.resolve(bodies, pair);
            }
        }
    }

    /// Apply the impulse and positional correction for one contact
    fn resolve(&self, bodies: &mut [Body], pair: &ContactPair) {
        let (body_a, body_b) = pair_mut(bodies, pair.a, pair.b);
        let (Some(rb_a), Some(rb_b)) = (&mut body_a.rigidbody, &mut body_b.rigidbody) else {
            return;
        };

        let inv_a = rb_a.inv_mass();
        let inv_b = rb_b.inv_mass();
        let total_inv_mass = inv_a + inv_b;
        if total_inv_mass == 0.0 {
            // Two immovable bodies never interact
            return;
        }

        let normal = pair.contact.normal;

        // Impulse: only when the bodies are approaching along the normal
        let vn = (rb_b.velocity - rb_a.velocity).dot(normal);
        if vn <= 0.0 {
            let restitution = rb_a.material.restitution.min(rb_b.material.restitution);
            let j = -(1.0 + restitution) * vn / total_inv_mass;
            rb_a.velocity -= normal * j * inv_a;
            rb_b.velocity += normal * j * inv_b;
        }

        // Positional correction: resolve a fraction of the penetration
        // beyond the slop, mass-weighted
        let correction = (pair.contact.penetration - self.settings.slop).max(0.0)
            / total_inv_mass
            * self.settings.correction_percent;
        body_a.transform.position -= normal * correction * inv_a;
        body_b.transform.position += normal * correction * inv_b;
    }
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new(PhysicsSettings::default())
    }
}

#[inline]
fn ordered_pair(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Mutable references to two distinct slice elements
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        let (second, first) = (&mut left[j], &mut right[0]);
        (first, second)
    }
}
