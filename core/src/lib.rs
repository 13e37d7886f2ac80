#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tank Arena combat simulation.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pathfinding, projectile and agent systems, and whatever external
//! collaborators drive the round. The frame loop submits [`Command`] values,
//! the world executes them through its `apply` entry point, and the systems
//! report what happened by pushing [`Event`] values into a caller-owned sink.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod grid;

pub use config::{
    AgentConfig, ArenaConfig, ConfigError, MatchConfig, PlayfieldConfig, ProjectileConfig,
    SpawnConfig,
};
pub use grid::{CellState, GridError, OccupancyGrid};

/// Cell edge length used by the maze generator when none is configured.
pub const DEFAULT_CELL_SIZE: f32 = 53.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh round on the provided maze.
    Reset {
        /// Occupancy grid produced by the maze generator for the new round.
        grid: OccupancyGrid,
        /// Validated tank spawn points, one per player.
        spawn_points: [Vec2; 2],
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a tank fire a projectile along its facing angle.
    Fire {
        /// Player whose tank pulls the trigger.
        player: PlayerId,
    },
    /// Places a tank and sets its facing, as decided by the external controller.
    SetTankPose {
        /// Player whose tank is repositioned.
        player: PlayerId,
        /// New center of the tank in pixel space.
        center: Vec2,
        /// Facing angle in degrees, counter-clockwise from the positive x axis.
        angle_degrees: f32,
    },
    /// Drives a tank for one frame: turns first, then moves along the new facing.
    ///
    /// Each axis of the motion is cancelled on its own when it would push the
    /// tank into a wall or the opposing tank.
    DriveTank {
        /// Player whose tank is driven.
        player: PlayerId,
        /// Direction along the facing in which the tank travels.
        throttle: Throttle,
        /// Direction in which the tank rotates before moving.
        turn: Turn,
    },
}

/// Longitudinal input of a [`Command::DriveTank`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Throttle {
    /// The tank does not move.
    #[default]
    Idle,
    /// The tank moves along its facing.
    Forward,
    /// The tank moves against its facing.
    Reverse,
}

impl Throttle {
    /// Multiplier applied to the facing vector.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Idle => 0.0,
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// Rotational input of a [`Command::DriveTank`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Turn {
    /// The facing is kept.
    #[default]
    Straight,
    /// Counter-clockwise on screen.
    Left,
    /// Clockwise on screen.
    Right,
}

impl Turn {
    /// Multiplier applied to the rotation speed.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Straight => 0.0,
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }
}

/// Events reported by the world and its systems while processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a new round started and all transient state was cleared.
    RoundReset,
    /// Confirms that an enemy agent entered the maze.
    AgentSpawned {
        /// Identifier assigned to the new agent.
        agent: AgentId,
        /// Cell whose center the agent occupies.
        cell: CellCoord,
    },
    /// Confirms that an enemy agent was removed from the population.
    AgentDestroyed {
        /// Identifier of the removed agent.
        agent: AgentId,
        /// What killed the agent.
        cause: AgentDeath,
    },
    /// Reports that an agent's hit-box overlapped a tank.
    MeleeHit {
        /// Agent that touched the tank.
        agent: AgentId,
        /// Player whose tank was touched.
        touched: PlayerId,
    },
    /// Reports that a player's score was incremented.
    ScoreAwarded {
        /// Player that received the point.
        player: PlayerId,
        /// Score after the increment.
        score: u32,
    },
    /// Confirms that a tank fired a projectile.
    ProjectileFired {
        /// Player owning the projectile.
        player: PlayerId,
        /// Identifier of the new projectile within its owner's collection.
        projectile: ProjectileId,
    },
    /// Reports that a projectile reflected off a wall.
    ProjectileBounced {
        /// Player owning the projectile.
        player: PlayerId,
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Reports that a projectile left its owner's collection.
    ProjectileRemoved {
        /// Player that owned the projectile.
        player: PlayerId,
        /// Identifier of the removed projectile.
        projectile: ProjectileId,
        /// Why the projectile was destroyed.
        reason: ProjectileRemoval,
    },
    /// Announces that a player reached the winning score.
    MatchWon {
        /// Player that won the match.
        player: PlayerId,
    },
}

/// Reason an enemy agent was removed from the population.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentDeath {
    /// A projectile hit the agent.
    Shot {
        /// Player owning the projectile.
        by: PlayerId,
        /// Projectile that struck the agent.
        projectile: ProjectileId,
    },
    /// The agent rammed a tank.
    Rammed {
        /// Player whose tank was touched.
        touched: PlayerId,
    },
}

/// Reason a projectile was destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileRemoval {
    /// The projectile left the playfield rectangle.
    OutOfBounds,
    /// The projectile outlived its lifetime.
    Expired,
    /// The projectile struck the tank that fired it.
    HitOwnTank,
    /// The projectile struck the opposing tank.
    HitOpponent,
    /// The projectile struck an enemy agent.
    HitAgent(AgentId),
}

/// One of the two human-controlled tanks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerId {
    /// First player, stored at index zero.
    One,
    /// Second player, stored at index one.
    Two,
}

impl PlayerId {
    /// Both players in storage order.
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// Index of the player within a two-element player array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// The opposing player.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

/// Unique identifier assigned to an enemy agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a projectile, unique within its owner's collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single maze cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell containing the provided pixel-space point, if the point is not
    /// left of or above the origin.
    #[must_use]
    pub fn containing(point: Vec2, cell_size: f32) -> Option<Self> {
        if !(cell_size > 0.0) || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let column = (point.x / cell_size).floor();
        let row = (point.y / cell_size).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }
        Some(Self::new(column as u32, row as u32))
    }

    /// Pixel-space center of the cell.
    #[must_use]
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(
            self.column as f32 * cell_size + cell_size * 0.5,
            self.row as f32 * cell_size + cell_size * 0.5,
        )
    }

    /// Straight-line distance between two cells measured in cells.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f32 {
        let columns = self.column.abs_diff(other.column) as f32;
        let rows = self.row.abs_diff(other.row) as f32;
        columns.hypot(rows)
    }
}

/// Axis-aligned rectangle in pixel space.
///
/// Overlap follows the half-open convention: rectangles that merely share
/// an edge do not intersect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    /// Builds a rectangle from its upper-left corner and size.
    #[must_use]
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Builds a rectangle of the provided size centered on a point.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::from_min_size(center - size * 0.5, size)
    }

    /// Smallest x coordinate covered by the rectangle.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.min.x
    }

    /// Largest x coordinate covered by the rectangle.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.max.x
    }

    /// Smallest y coordinate covered by the rectangle.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.min.y
    }

    /// Largest y coordinate covered by the rectangle.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Midpoint of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Reports whether the two rectangles overlap with a non-zero area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_into_cells() {
        let cell = CellCoord::containing(Vec2::new(106.0, 52.9), 53.0);
        assert_eq!(cell, Some(CellCoord::new(2, 0)));
        assert_eq!(CellCoord::containing(Vec2::new(-1.0, 10.0), 53.0), None);
        assert_eq!(CellCoord::containing(Vec2::new(1.0, 1.0), 0.0), None);
    }

    #[test]
    fn center_lies_in_the_middle_of_the_cell() {
        let center = CellCoord::new(1, 2).center(10.0);
        assert_eq!(center, Vec2::new(15.0, 25.0));
        assert_eq!(CellCoord::containing(center, 10.0), Some(CellCoord::new(1, 2)));
    }

    #[test]
    fn euclidean_distance_is_diagonal_aware() {
        let origin = CellCoord::new(0, 0);
        assert!((origin.euclidean_distance(CellCoord::new(3, 4)) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn touching_rectangles_do_not_intersect() {
        let left = Rect::from_min_size(Vec2::ZERO, Vec2::splat(10.0));
        let touching = Rect::from_min_size(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        let overlapping = Rect::from_min_size(Vec2::new(9.5, 9.5), Vec2::splat(10.0));

        assert!(!left.intersects(&touching));
        assert!(left.intersects(&overlapping));
        assert!(overlapping.intersects(&left));
    }

    #[test]
    fn from_center_is_symmetric() {
        let rect = Rect::from_center(Vec2::new(100.0, 100.0), Vec2::splat(10.0));
        assert_eq!(rect.left(), 95.0);
        assert_eq!(rect.right(), 105.0);
        assert_eq!(rect.top(), 95.0);
        assert_eq!(rect.bottom(), 105.0);
        assert_eq!(rect.center(), Vec2::new(100.0, 100.0));
        assert!(rect.contains(Vec2::new(105.0, 95.0)));
    }

    #[test]
    fn players_pair_up() {
        assert_eq!(PlayerId::One.other(), PlayerId::Two);
        assert_eq!(PlayerId::Two.other().index(), 0);
        assert_eq!(PlayerId::ALL.map(PlayerId::index), [0, 1]);
    }
}
