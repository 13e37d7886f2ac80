//! A single enemy agent: target acquisition, cached path and cell-to-cell motion.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use tank_arena_core::{AgentConfig, AgentId, CellCoord, Event, OccupancyGrid, PlayerId, Rect};
use tank_arena_system_pathfinding::find_path;
use tracing::{debug, trace};

use crate::Combatant;

/// Whether an agent is parked on a cell center or gliding toward the next one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovementPhase {
    /// The agent rests and will pop the next path cell on its next update.
    Idle,
    /// The agent travels toward the center of the cell it is entering.
    Moving {
        /// Pixel-space center of the destination cell.
        target: Vec2,
    },
}

/// Autonomous unit that chases the nearest tank.
#[derive(Clone, Debug)]
pub struct EnemyAgent {
    id: AgentId,
    position: Vec2,
    angle_degrees: f32,
    cell: CellCoord,
    path: VecDeque<CellCoord>,
    phase: MovementPhase,
    last_path_at: Option<Duration>,
    target: Option<PlayerId>,
    last_melee_at: Option<Duration>,
    size: f32,
    speed: f32,
    detection_range: f32,
    recompute_interval: Duration,
}

impl EnemyAgent {
    /// Creates an idle agent standing on the center of `cell`.
    #[must_use]
    pub fn new(id: AgentId, cell: CellCoord, grid: &OccupancyGrid, config: &AgentConfig) -> Self {
        Self {
            id,
            position: grid.cell_center(cell),
            angle_degrees: 0.0,
            cell,
            path: VecDeque::new(),
            phase: MovementPhase::Idle,
            last_path_at: None,
            target: None,
            last_melee_at: None,
            size: config.size,
            speed: config.speed,
            detection_range: config.detection_range,
            recompute_interval: config.recompute_interval(),
        }
    }

    /// Identifier of the agent.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Current center in pixel space.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Facing angle in degrees, counter-clockwise from the positive x axis.
    ///
    /// Only used for rendering.
    #[must_use]
    pub const fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    /// Cell the agent stands on, or the cell it is entering while moving.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Remaining cells of the cached route, front first.
    #[must_use]
    pub fn path(&self) -> &VecDeque<CellCoord> {
        &self.path
    }

    /// Current movement phase.
    #[must_use]
    pub const fn phase(&self) -> MovementPhase {
        self.phase
    }

    /// Player chosen by the most recent target acquisition.
    #[must_use]
    pub const fn target(&self) -> Option<PlayerId> {
        self.target
    }

    /// Simulation time of the most recent successful melee hit.
    #[must_use]
    pub const fn last_melee_at(&self) -> Option<Duration> {
        self.last_melee_at
    }

    /// Square hit-box centered on the agent.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, Vec2::splat(self.size))
    }

    /// Runs one simulation tick: refreshes the route when due, moves, then
    /// checks for contact with the tanks.
    pub fn update<P>(
        &mut self,
        now: Duration,
        grid: &OccupancyGrid,
        players: &mut [P; 2],
        out: &mut Vec<Event>,
    ) where
        P: Combatant,
    {
        if self.path_refresh_due(now) {
            self.refresh_path(grid, players);
            self.last_path_at = Some(now);
        }
        self.advance(grid);
        let _ = self.melee(now, players, out);
    }

    /// Selects the nearest tank strictly within the detection range.
    #[must_use]
    pub fn nearest_player<P>(&self, players: &[P; 2]) -> Option<PlayerId>
    where
        P: Combatant,
    {
        let mut nearest = None;
        let mut best = self.detection_range;
        for (player, id) in players.iter().zip(PlayerId::ALL) {
            let distance = self.position.distance(player.bounds().center());
            if distance < best {
                best = distance;
                nearest = Some(id);
            }
        }
        nearest
    }

    /// Re-acquires a target and replaces the cached route unconditionally.
    ///
    /// Without a target in range the route is dropped and the agent holds
    /// its position once it reaches the cell it is entering.
    pub fn refresh_path<P>(&mut self, grid: &OccupancyGrid, players: &[P; 2])
    where
        P: Combatant,
    {
        self.target = self.nearest_player(players);
        let Some(target) = self.target else {
            self.path.clear();
            return;
        };

        let goal = players[target.index()].bounds().center();
        self.path = match grid.cell_containing(goal) {
            Some(goal_cell) => find_path(grid, self.cell, goal_cell).into(),
            None => VecDeque::new(),
        };
        trace!(
            agent = self.id.get(),
            ?target,
            steps = self.path.len(),
            "agent path refreshed"
        );
    }

    /// Moves the agent toward the next cell center by at most `speed` pixels.
    ///
    /// An idle agent first pops the next cell of its route and turns to face
    /// it. When the remaining distance is within one step the agent lands
    /// exactly on the cell center and becomes idle again.
    pub fn advance(&mut self, grid: &OccupancyGrid) {
        if self.phase == MovementPhase::Idle {
            if let Some(next) = self.path.pop_front() {
                let target = grid.cell_center(next);
                let delta = target - self.position;
                if delta != Vec2::ZERO {
                    self.angle_degrees = (-delta.y).atan2(delta.x).to_degrees();
                }
                self.cell = next;
                self.phase = MovementPhase::Moving { target };
            }
        }

        if let MovementPhase::Moving { target } = self.phase {
            let delta = target - self.position;
            let distance = delta.length();
            if distance > self.speed {
                self.position += delta / distance * self.speed;
            } else {
                self.position = target;
                self.phase = MovementPhase::Idle;
            }
        }
    }

    /// Tests the agent against every tank and credits the opponent of the
    /// first tank touched.
    ///
    /// Returns the touched player. Contact is not rate limited: an agent that
    /// keeps touching a tank scores on every call.
    pub fn melee<P>(
        &mut self,
        now: Duration,
        players: &mut [P; 2],
        out: &mut Vec<Event>,
    ) -> Option<PlayerId>
    where
        P: Combatant,
    {
        let bounds = self.bounds();
        let touched = players
            .iter()
            .zip(PlayerId::ALL)
            .find(|(player, _)| player.bounds().intersects(&bounds))
            .map(|(_, id)| id)?;

        let credited = touched.other();
        let score = players[credited.index()].award_point();
        self.last_melee_at = Some(now);
        debug!(agent = self.id.get(), ?touched, ?credited, score, "agent touched a tank");
        out.push(Event::MeleeHit {
            agent: self.id,
            touched,
        });
        out.push(Event::ScoreAwarded {
            player: credited,
            score,
        });
        Some(touched)
    }

    fn path_refresh_due(&self, now: Duration) -> bool {
        self.last_path_at
            .map_or(true, |last| now.saturating_sub(last) > self.recompute_interval)
    }
}
