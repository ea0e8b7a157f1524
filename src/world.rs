//! Entity update loop
//!
//! A [`World`] owns the body list and the physics engine and advances both
//! with one [`World::step`] per tick. Bodies iterate in stable insertion
//! order, which keeps the simulation deterministic for a fixed delta-time.

use serde::{Deserialize, Serialize};

pub use crate::physics::body::Transform;
use crate::physics::body::RigidBody;
use crate::physics::collider::Aabb;
use crate::physics::engine::{CollisionEvent, PhysicsEngine, PhysicsSettings};

/// A simulated entity: a transform, an optional rigid body, and a tag.
///
/// Capabilities are composed per body rather than inherited: a body without
/// a rigid body is inert scenery the physics pass skips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    /// Stable unique id, assigned by [`World::add`] (0 until added)
    pub id: u32,
    pub tag: String,
    pub transform: Transform,
    pub rigidbody: Option<RigidBody>,
}

impl Body {
    pub fn new(tag: impl Into<String>, transform: Transform) -> Self {
        Self {
            id: 0,
            tag: tag.into(),
            transform,
            rigidbody: None,
        }
    }

    pub fn with_rigidbody(mut self, rigidbody: RigidBody) -> Self {
        self.rigidbody = Some(rigidbody);
        self
    }

    /// World-space bounds of the collider, if any
    pub fn bounds(&self) -> Option<Aabb> {
        self.rigidbody
            .as_ref()
            .map(|rb| rb.collider.shape.bounds(&self.transform))
    }
}

/// The simulation set plus its physics engine
pub struct World {
    bodies: Vec<Body>,
    engine: PhysicsEngine,
    next_id: u32,
}

impl World {
    pub fn new(settings: PhysicsSettings) -> Self {
        Self {
            bodies: Vec::new(),
            engine: PhysicsEngine::new(settings),
            next_id: 1,
        }
    }

    /// Add a body, assigning its id
    pub fn add(&mut self, mut body: Body) -> u32 {
        body.id = self.next_id;
        self.next_id += 1;
        let id = body.id;
        self.bodies.push(body);
        id
    }

    /// Remove a body from the simulation set.
    ///
    /// Contact state involving the body is dropped without firing Exit
    /// events - removal is not a separation.
    pub fn remove(&mut self, id: u32) -> Option<Body> {
        let index = self.bodies.iter().position(|b| b.id == id)?;
        self.engine.forget(id);
        Some(self.bodies.remove(index))
    }

    pub fn body(&self, id: u32) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn body_mut(&mut self, id: u32) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// First body with the given tag, in insertion order
    pub fn find_by_tag(&self, tag: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.tag == tag)
    }

    /// All bodies in insertion order
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn settings(&self) -> &PhysicsSettings {
        self.engine.settings()
    }

    pub fn settings_mut(&mut self) -> &mut PhysicsSettings {
        self.engine.settings_mut()
    }

    /// Enter/exit events from the most recent step
    pub fn events(&self) -> &[CollisionEvent] {
        self.engine.events()
    }

    /// Whether the unordered pair was in contact after the last step
    pub fn in_contact(&self, a: u32, b: u32) -> bool {
        self.engine.in_contact(a, b)
    }

    /// Advance the simulation by one tick of `dt` seconds.
    ///
    /// Integrates every rigid body (gravity, friction damping), advances
    /// transforms by velocity, then runs the collision pipeline.
    pub fn step(&mut self, dt: f32) {
        let gravity = self.engine.settings().gravity;
        for body in &mut self.bodies {
            if let Some(rb) = body.rigidbody.as_mut() {
                rb.integrate(gravity, dt);
                body.transform.position += rb.velocity * dt;
            }
        }
        self.engine.step(&mut self.bodies);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(PhysicsSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsMaterial;
    use crate::physics::collider::Collider;
    use glam::Vec2;

    fn ball(x: f32, y: f32) -> Body {
        Body::new("ball", Transform::new(Vec2::new(x, y))).with_rigidbody(
            RigidBody::new(Collider::circle(5.0))
                .with_mass(1.0)
                .with_material(PhysicsMaterial::frictionless())
                .without_gravity(),
        )
    }

    #[test]
    fn test_add_assigns_stable_ids() {
        let mut world = World::default();
        let a = world.add(ball(0.0, 0.0));
        let b = world.add(ball(100.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(world.body(a).unwrap().id, a);
        assert_eq!(world.bodies().len(), 2);
    }

    #[test]
    fn test_find_by_tag() {
        let mut world = World::default();
        world.add(ball(0.0, 0.0));
        let wall_id = world.add(Body::new("wall", Transform::new(Vec2::new(50.0, 0.0))));
        assert_eq!(world.find_by_tag("wall").unwrap().id, wall_id);
        assert!(world.find_by_tag("missing").is_none());
    }

    #[test]
    fn test_step_advances_transform_by_velocity() {
        let mut world = World::default();
        world.settings_mut().gravity = Vec2::ZERO;
        let mut body = ball(0.0, 0.0);
        body.rigidbody.as_mut().unwrap().velocity = Vec2::new(60.0, -30.0);
        let id = world.add(body);

        world.step(0.5);
        let pos = world.body(id).unwrap().transform.position;
        assert!((pos - Vec2::new(30.0, -15.0)).length() < 1e-4);
    }

    #[test]
    fn test_gravity_pulls_bodies_down() {
        let mut world = World::default();
        let mut body = ball(0.0, 100.0);
        body.rigidbody.as_mut().unwrap().use_gravity = true;
        let id = world.add(body);

        let start_y = 100.0;
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        let body = world.body(id).unwrap();
        assert!(body.transform.position.y < start_y);
        assert!(body.rigidbody.as_ref().unwrap().velocity.y < 0.0);
    }

    #[test]
    fn test_remove_drops_contact_state_without_exit() {
        let mut world = World::default();
        world.settings_mut().gravity = Vec2::ZERO;
        let a = world.add(ball(-4.0, 0.0));
        let b = world.add(ball(4.0, 0.0));

        world.step(1.0 / 120.0);
        assert!(world.in_contact(a, b));

        assert!(world.remove(a).is_some());
        assert!(!world.in_contact(a, b));
        world.step(1.0 / 120.0);
        // No Exit fires for the removed pair
        assert!(world.events().is_empty());
        assert!(world.body(a).is_none());
    }

    #[test]
    fn test_ball_bounces_off_static_wall() {
        // A frictionless, perfectly bouncy ball heading at a static wall
        // reverses its horizontal velocity
        let mut world = World::default();
        world.settings_mut().gravity = Vec2::ZERO;

        let mut moving = ball(-30.0, 0.0);
        {
            let rb = moving.rigidbody.as_mut().unwrap();
            rb.velocity = Vec2::new(120.0, 0.0);
            rb.material = PhysicsMaterial::new(0.0, 1.0);
        }
        let id = world.add(moving);
        world.add(
            Body::new("wall", Transform::new(Vec2::new(0.0, 0.0))).with_rigidbody(
                RigidBody::fixed(Collider::rect(10.0, 200.0))
                    .with_material(PhysicsMaterial::new(0.0, 1.0)),
            ),
        );

        let mut bounced = false;
        for _ in 0..120 {
            world.step(1.0 / 120.0);
            let v = world.body(id).unwrap().rigidbody.as_ref().unwrap().velocity;
            if v.x < 0.0 {
                bounced = true;
                break;
            }
        }
        assert!(bounced);
        let v = world.body(id).unwrap().rigidbody.as_ref().unwrap().velocity;
        assert!((v.x - (-120.0)).abs() < 1.0);
    }

    #[test]
    fn test_settings_roundtrip_json() {
        let settings = PhysicsSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: PhysicsSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cell_size, settings.cell_size);
        assert_eq!(back.solver_iterations, settings.solver_iterations);
        assert_eq!(back.gravity, settings.gravity);
    }
}
