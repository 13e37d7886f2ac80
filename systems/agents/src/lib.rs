#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous enemy agents that hunt the nearest tank through the maze.
//!
//! An [`agent::EnemyAgent`] periodically picks the closest tank within its
//! detection range, asks the pathfinder for a route to that tank's cell and
//! glides from cell center to cell center along the cached route. The
//! [`manager::AgentManager`] owns the population, spawns new agents on a
//! timer and arbitrates collisions between agents, projectiles and tanks.
//!
//! Tanks are not owned by this crate. They are reached through the
//! [`Combatant`] trait, which is also the only way this crate mutates state
//! it does not own: scores go up and projectiles are removed from their
//! owner's collection when a hit is resolved.

use tank_arena_core::{ProjectileId, Rect};
use tank_arena_system_projectiles::Projectile;

pub mod agent;
pub mod manager;

pub use agent::{EnemyAgent, MovementPhase};
pub use manager::AgentManager;

/// A human-controlled tank as seen by the agent systems.
///
/// Players are always passed as a `[P; 2]` array indexed by
/// [`tank_arena_core::PlayerId::index`].
pub trait Combatant {
    /// Bounding box of the tank in pixel space.
    fn bounds(&self) -> Rect;

    /// Adds one point to the tank's score and returns the new score.
    fn award_point(&mut self) -> u32;

    /// Live projectiles fired by the tank.
    fn projectiles(&self) -> &[Projectile];

    /// Removes a projectile from the tank's collection, returning it if present.
    fn remove_projectile(&mut self, projectile: ProjectileId) -> Option<Projectile>;
}
