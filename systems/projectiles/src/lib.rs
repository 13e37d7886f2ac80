#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile kinematics: straight-line flight, expiry and wall reflection.
//!
//! A [`Projectile`] only knows how to move and how to bounce. Deciding when
//! a projectile dies is the job of the collection that owns it, which runs
//! [`advance_all`] once per tick and drops every projectile whose [`Fate`]
//! ended its flight.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use tank_arena_core::{ProjectileConfig, ProjectileId, ProjectileRemoval, Rect};
use tracing::trace;

/// A single bullet travelling through the maze.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    id: ProjectileId,
    position: Vec2,
    direction: Vec2,
    created_at: Duration,
    lifetime: Duration,
    speed: f32,
    radius: f32,
}

impl Projectile {
    /// Creates a projectile travelling along `direction`, which is normalised.
    #[must_use]
    pub fn new(
        id: ProjectileId,
        position: Vec2,
        direction: Vec2,
        created_at: Duration,
        config: &ProjectileConfig,
    ) -> Self {
        Self {
            id,
            position,
            direction: direction.normalize_or_zero(),
            created_at,
            lifetime: config.lifetime(),
            speed: config.speed,
            radius: config.radius,
        }
    }

    /// Identifier within the owner's collection.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Current center in pixel space.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Unit direction of travel.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Simulation time at which the projectile was fired.
    #[must_use]
    pub const fn created_at(&self) -> Duration {
        self.created_at
    }

    /// Moves the projectile one tick along its direction.
    pub fn advance(&mut self) {
        self.position += self.direction * self.speed;
    }

    /// Square hit-box centered on the projectile.
    #[must_use]
    pub fn hit_box(&self) -> Rect {
        Rect::from_center(self.position, Vec2::splat(self.radius * 2.0))
    }

    /// Reports whether strictly more than the lifetime has elapsed since firing.
    #[must_use]
    pub fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) > self.lifetime
    }

    /// Reports whether the center left the playfield rectangle.
    #[must_use]
    pub fn is_outside(&self, playfield: &Rect) -> bool {
        !playfield.contains(self.position)
    }

    /// Reflects the projectile off an overlapping wall.
    ///
    /// Each axis is resolved independently: when the direction of travel
    /// shows that the hit-box crossed the wall edge facing it, the projectile
    /// is moved back so that its hit-box touches that edge from outside and
    /// the axis component is inverted. Afterwards both components receive
    /// independent noise in `[-jitter, jitter]` and the direction is
    /// normalised again. Speed is unaffected.
    pub fn bounce<R>(&mut self, wall: &Rect, jitter: f32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let hit_box = self.hit_box();

        if self.direction.x > 0.0
            && hit_box.right() >= wall.left()
            && hit_box.left() < wall.left()
        {
            self.position.x = wall.left() - self.radius;
            self.direction.x = -self.direction.x;
        } else if self.direction.x < 0.0
            && hit_box.left() <= wall.right()
            && hit_box.right() > wall.right()
        {
            self.position.x = wall.right() + self.radius;
            self.direction.x = -self.direction.x;
        }

        if self.direction.y > 0.0 && hit_box.bottom() >= wall.top() && hit_box.top() < wall.top() {
            self.position.y = wall.top() - self.radius;
            self.direction.y = -self.direction.y;
        } else if self.direction.y < 0.0
            && hit_box.top() <= wall.bottom()
            && hit_box.bottom() > wall.bottom()
        {
            self.position.y = wall.bottom() + self.radius;
            self.direction.y = -self.direction.y;
        }

        if jitter > 0.0 {
            self.direction.x += rng.gen_range(-jitter..=jitter);
            self.direction.y += rng.gen_range(-jitter..=jitter);
        }

        let normalized = self.direction.normalize_or_zero();
        if normalized != Vec2::ZERO {
            self.direction = normalized;
        }
    }
}

/// Everything a projectile can run into during one tick.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<'a> {
    /// Rectangle the projectile must stay inside.
    pub playfield: Rect,
    /// Bounding box of the tank that fired the projectile.
    pub own_tank: Rect,
    /// Bounding box of the opposing tank.
    pub opponent_tank: Rect,
    /// Maze wall rectangles, tested in order.
    pub walls: &'a [Rect],
    /// Noise bound applied to the direction after a bounce.
    pub bounce_jitter: f32,
}

/// Outcome of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fate {
    /// The projectile keeps flying undisturbed.
    Flying,
    /// The projectile reflected off a wall and keeps flying.
    Bounced,
    /// The projectile's flight ended and it must leave its owner's collection.
    Removed(ProjectileRemoval),
}

/// Moves a projectile one tick and resolves what it ran into.
///
/// Checks run in a fixed order: playfield bounds, lifetime, the firing tank,
/// the opposing tank and finally the first overlapping wall.
pub fn step<R>(
    projectile: &mut Projectile,
    now: Duration,
    surroundings: &Surroundings<'_>,
    rng: &mut R,
) -> Fate
where
    R: Rng + ?Sized,
{
    projectile.advance();

    if projectile.is_outside(&surroundings.playfield) {
        return Fate::Removed(ProjectileRemoval::OutOfBounds);
    }
    if projectile.is_expired(now) {
        return Fate::Removed(ProjectileRemoval::Expired);
    }

    let hit_box = projectile.hit_box();
    if hit_box.intersects(&surroundings.own_tank) {
        return Fate::Removed(ProjectileRemoval::HitOwnTank);
    }
    if hit_box.intersects(&surroundings.opponent_tank) {
        return Fate::Removed(ProjectileRemoval::HitOpponent);
    }

    match surroundings
        .walls
        .iter()
        .find(|wall| hit_box.intersects(wall))
    {
        Some(wall) => {
            projectile.bounce(wall, surroundings.bounce_jitter, rng);
            trace!(projectile = projectile.id.get(), "projectile bounced");
            Fate::Bounced
        }
        None => Fate::Flying,
    }
}

/// Steps every projectile of one owner and drops those whose flight ended.
///
/// The fate of each projectile is appended to `out` in collection order.
/// Removal happens in a single pass after all projectiles moved.
pub fn advance_all<R>(
    projectiles: &mut Vec<Projectile>,
    now: Duration,
    surroundings: &Surroundings<'_>,
    rng: &mut R,
    out: &mut Vec<(ProjectileId, Fate)>,
) where
    R: Rng + ?Sized,
{
    let first = out.len();
    for projectile in projectiles.iter_mut() {
        let fate = step(projectile, now, surroundings, rng);
        out.push((projectile.id, fate));
    }

    let ended = &out[first..];
    projectiles.retain(|projectile| {
        !ended
            .iter()
            .any(|(id, fate)| *id == projectile.id && matches!(fate, Fate::Removed(_)))
    });
}
