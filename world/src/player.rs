use std::time::Duration;

use glam::Vec2;
use tank_arena_core::{
    PlayerId, PlayfieldConfig, ProjectileConfig, ProjectileId, Rect, Throttle, Turn,
};
use tank_arena_system_agents::Combatant;
use tank_arena_system_projectiles::Projectile;

/// Human-controlled tank together with its score and live projectiles.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    center: Vec2,
    angle_degrees: f32,
    size: f32,
    score: u32,
    projectiles: Vec<Projectile>,
    last_shot_at: Option<Duration>,
    next_projectile: u32,
}

impl Player {
    pub(crate) fn new(id: PlayerId, center: Vec2, size: f32) -> Self {
        Self {
            id,
            center,
            angle_degrees: 0.0,
            size,
            score: 0,
            projectiles: Vec::new(),
            last_shot_at: None,
            next_projectile: 0,
        }
    }

    /// Identifier of the player owning the tank.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Center of the tank in pixel space.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Facing angle in degrees, counter-clockwise from the positive x axis.
    #[must_use]
    pub const fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    /// Unit vector the barrel points along. Screen y grows downward.
    #[must_use]
    pub fn facing(&self) -> Vec2 {
        let radians = self.angle_degrees.to_radians();
        Vec2::new(radians.cos(), -radians.sin())
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Simulation time of the most recent accepted shot.
    #[must_use]
    pub const fn last_shot_at(&self) -> Option<Duration> {
        self.last_shot_at
    }

    pub(crate) fn set_pose(&mut self, center: Vec2, angle_degrees: f32) {
        self.center = center;
        self.angle_degrees = angle_degrees;
    }

    /// Turns, then moves along the new facing one axis at a time. An axis
    /// whose displacement would overlap a wall or `opponent` is cancelled.
    pub(crate) fn drive(
        &mut self,
        throttle: Throttle,
        turn: Turn,
        playfield: &PlayfieldConfig,
        walls: &[Rect],
        opponent: Rect,
    ) {
        self.angle_degrees =
            (self.angle_degrees + turn.sign() * playfield.rotate_speed).rem_euclid(360.0);

        let step = self.facing() * (throttle.sign() * playfield.tank_speed);
        let size = Vec2::splat(self.size);
        let blocked = |center: Vec2| {
            let moved = Rect::from_center(center, size);
            moved.intersects(&opponent) || walls.iter().any(|wall| wall.intersects(&moved))
        };

        for offset in [Vec2::new(step.x, 0.0), Vec2::new(0.0, step.y)] {
            if offset == Vec2::ZERO {
                continue;
            }
            let candidate = self.center + offset;
            if !blocked(candidate) {
                self.center = candidate;
            }
        }
    }

    /// Starts a new round on `spawn`, keeping the facing.
    pub(crate) fn reset(&mut self, spawn: Vec2) {
        self.center = spawn;
        self.score = 0;
        self.projectiles.clear();
        self.last_shot_at = None;
        self.next_projectile = 0;
    }

    /// Fires from the muzzle unless the cooldown is running or the
    /// magazine of live projectiles is full.
    pub(crate) fn fire(
        &mut self,
        now: Duration,
        config: &ProjectileConfig,
    ) -> Option<ProjectileId> {
        if let Some(last) = self.last_shot_at {
            if now.saturating_sub(last) < config.fire_cooldown() {
                return None;
            }
        }
        if self.projectiles.len() >= config.max_per_player {
            return None;
        }

        let direction = self.facing();
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        self.projectiles.push(Projectile::new(
            id,
            self.center + direction * config.muzzle_offset,
            direction,
            now,
            config,
        ));
        self.last_shot_at = Some(now);
        Some(id)
    }

    pub(crate) fn projectiles_mut(&mut self) -> &mut Vec<Projectile> {
        &mut self.projectiles
    }
}

impl Combatant for Player {
    fn bounds(&self) -> Rect {
        Rect::from_center(self.center, Vec2::splat(self.size))
    }

    fn award_point(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        self.score
    }

    fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    fn remove_projectile(&mut self, projectile: ProjectileId) -> Option<Projectile> {
        let index = self
            .projectiles
            .iter()
            .position(|candidate| candidate.id() == projectile)?;
        Some(self.projectiles.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(PlayerId::One, Vec2::new(100.0, 100.0), 40.0)
    }

    #[test]
    fn facing_points_up_the_screen_at_ninety_degrees() {
        let mut player = player();
        player.set_pose(Vec2::new(100.0, 100.0), 90.0);
        let facing = player.facing();
        assert!(facing.x.abs() < 1e-6);
        assert!((facing.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn fire_spawns_projectile_at_the_muzzle() {
        let mut player = player();
        let config = ProjectileConfig::default();

        let fired = player.fire(Duration::from_secs(1), &config);

        assert_eq!(fired, Some(ProjectileId::new(0)));
        let projectile = &player.projectiles()[0];
        assert_eq!(projectile.position(), Vec2::new(126.0, 100.0));
        assert_eq!(projectile.direction(), Vec2::X);
        assert_eq!(projectile.created_at(), Duration::from_secs(1));
        assert!(!projectile.hit_box().intersects(&player.bounds()));
    }

    #[test]
    fn fire_honours_cooldown_and_magazine() {
        let mut player = player();
        let config = ProjectileConfig::default();

        assert!(player.fire(Duration::ZERO, &config).is_some());
        assert_eq!(player.fire(Duration::from_millis(499), &config), None);
        assert!(player.fire(Duration::from_millis(500), &config).is_some());
        assert!(player.fire(Duration::from_millis(1_000), &config).is_some());
        assert_eq!(player.fire(Duration::from_secs(60), &config), None);
        assert_eq!(player.projectiles().len(), 3);
        assert_eq!(player.last_shot_at(), Some(Duration::from_millis(1_000)));
    }

    #[test]
    fn drive_turns_before_moving_and_wraps_the_angle() {
        let mut player = player();
        let playfield = PlayfieldConfig::default();
        let opponent = Rect::from_center(Vec2::new(500.0, 500.0), Vec2::splat(40.0));

        player.drive(Throttle::Idle, Turn::Right, &playfield, &[], opponent);
        assert_eq!(player.angle_degrees(), 355.0);
        assert_eq!(player.center(), Vec2::new(100.0, 100.0));

        player.drive(Throttle::Forward, Turn::Left, &playfield, &[], opponent);
        assert_eq!(player.angle_degrees(), 0.0);
        assert_eq!(player.center(), Vec2::new(103.0, 100.0));

        player.drive(Throttle::Reverse, Turn::Straight, &playfield, &[], opponent);
        assert_eq!(player.center(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn drive_cancels_only_the_blocked_axis() {
        let mut player = player();
        player.set_pose(Vec2::new(100.0, 100.0), 315.0);
        let playfield = PlayfieldConfig::default();
        let wall = Rect::from_min_size(Vec2::new(121.0, 0.0), Vec2::new(10.0, 200.0));
        let opponent = Rect::from_center(Vec2::new(500.0, 500.0), Vec2::splat(40.0));

        player.drive(Throttle::Forward, Turn::Straight, &playfield, &[wall], opponent);

        assert_eq!(player.center().x, 100.0);
        assert!(player.center().y > 102.0);
    }

    #[test]
    fn reset_clears_round_state_but_keeps_facing() {
        let mut player = player();
        player.set_pose(Vec2::new(50.0, 50.0), 45.0);
        let _ = player.fire(Duration::ZERO, &ProjectileConfig::default());
        let _ = player.award_point();

        player.reset(Vec2::new(300.0, 200.0));

        assert_eq!(player.center(), Vec2::new(300.0, 200.0));
        assert_eq!(player.angle_degrees(), 45.0);
        assert_eq!(player.score(), 0);
        assert!(player.projectiles().is_empty());
        assert_eq!(player.last_shot_at(), None);
    }
}
