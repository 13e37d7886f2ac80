#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state for Tank Arena.

use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tank_arena_core::{
    ArenaConfig, Command, Event, OccupancyGrid, PlayerId, ProjectileRemoval, Rect,
    DEFAULT_CELL_SIZE,
};
use tank_arena_system_agents::{AgentManager, Combatant};
use tank_arena_system_projectiles::{advance_all, Fate, Surroundings};
use tracing::{debug, info};

mod player;
mod walls;

pub use player::Player;

/// ChaCha stream used for projectile bounce jitter; spawning draws from stream zero.
const BOUNCE_STREAM: u64 = 1;

/// Represents the authoritative Tank Arena world state.
#[derive(Debug)]
pub struct World {
    config: ArenaConfig,
    clock: Duration,
    players: [Player; 2],
    walls: Vec<Rect>,
    agents: AgentManager<ChaCha8Rng>,
    rng: ChaCha8Rng,
    winner: Option<PlayerId>,
}

impl World {
    /// Creates a world waiting for its first [`Command::Reset`].
    ///
    /// Until then the maze has no cells, so agents never spawn.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        rng.set_stream(BOUNCE_STREAM);
        let grid = OccupancyGrid::empty(DEFAULT_CELL_SIZE);
        let tank_size = config.playfield.tank_size;

        Self {
            walls: walls::wall_rects(&grid, &config.playfield),
            agents: AgentManager::new(
                grid,
                config.agents.clone(),
                config.spawning.clone(),
                ChaCha8Rng::seed_from_u64(config.rng_seed),
            ),
            players: PlayerId::ALL.map(|id| Player::new(id, Vec2::ZERO, tank_size)),
            clock: Duration::ZERO,
            rng,
            winner: None,
            config,
        }
    }

    fn reset(
        &mut self,
        grid: OccupancyGrid,
        spawn_points: [Vec2; 2],
        out_events: &mut Vec<Event>,
    ) {
        self.clock = Duration::ZERO;
        self.winner = None;
        self.walls = walls::wall_rects(&grid, &self.config.playfield);
        for (player, spawn) in self.players.iter_mut().zip(spawn_points) {
            player.reset(spawn);
        }
        info!(
            columns = grid.columns(),
            rows = grid.rows(),
            walls = self.walls.len(),
            "round reset"
        );
        self.agents.reset(grid);
        out_events.push(Event::RoundReset);
    }

    fn sweep_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let playfield = self.config.playfield.bounds();
        let mut fates = Vec::new();

        for owner in PlayerId::ALL {
            let surroundings = Surroundings {
                playfield,
                own_tank: self.players[owner.index()].bounds(),
                opponent_tank: self.players[owner.other().index()].bounds(),
                walls: &self.walls,
                bounce_jitter: self.config.projectiles.bounce_jitter,
            };
            fates.clear();
            advance_all(
                self.players[owner.index()].projectiles_mut(),
                self.clock,
                &surroundings,
                &mut self.rng,
                &mut fates,
            );

            for &(projectile, fate) in &fates {
                let reason = match fate {
                    Fate::Flying => continue,
                    Fate::Bounced => {
                        out_events.push(Event::ProjectileBounced {
                            player: owner,
                            projectile,
                        });
                        continue;
                    }
                    Fate::Removed(reason) => reason,
                };
                out_events.push(Event::ProjectileRemoved {
                    player: owner,
                    projectile,
                    reason,
                });

                let credited = match reason {
                    ProjectileRemoval::HitOwnTank => owner.other(),
                    ProjectileRemoval::HitOpponent => owner,
                    _ => continue,
                };
                let score = self.players[credited.index()].award_point();
                debug!(?owner, ?credited, ?reason, score, "tank hit");
                out_events.push(Event::ScoreAwarded {
                    player: credited,
                    score,
                });
            }
        }
    }

    fn check_for_winner(&mut self, out_events: &mut Vec<Event>) {
        let max_score = self.config.match_rules.max_score;
        let Some(player) = PlayerId::ALL
            .into_iter()
            .find(|id| self.players[id.index()].score() >= max_score)
        else {
            return;
        };

        self.winner = Some(player);
        info!(
            ?player,
            first = self.players[0].score(),
            second = self.players[1].score(),
            "match won"
        );
        out_events.push(Event::MatchWon { player });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once a player has won, `Tick`, `Fire` and `DriveTank` are ignored until the
/// next `Reset`.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Reset { grid, spawn_points } => world.reset(grid, spawn_points, out_events),
        Command::Tick { dt } => {
            if world.winner.is_some() {
                return;
            }
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            world.agents.update(world.clock, &mut world.players, out_events);
            world.sweep_projectiles(out_events);
            world.check_for_winner(out_events);
        }
        Command::Fire { player } => {
            if world.winner.is_some() {
                return;
            }
            let tank = &mut world.players[player.index()];
            if let Some(projectile) = tank.fire(world.clock, &world.config.projectiles) {
                out_events.push(Event::ProjectileFired { player, projectile });
            }
        }
        Command::SetTankPose {
            player,
            center,
            angle_degrees,
        } => world.players[player.index()].set_pose(center, angle_degrees),
        Command::DriveTank {
            player,
            throttle,
            turn,
        } => {
            if world.winner.is_some() {
                return;
            }
            let opponent = world.players[player.other().index()].bounds();
            world.players[player.index()].drive(
                throttle,
                turn,
                &world.config.playfield,
                &world.walls,
                opponent,
            );
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use tank_arena_core::{AgentId, ArenaConfig, CellCoord, OccupancyGrid, PlayerId, Rect};
    use tank_arena_system_agents::{Combatant, EnemyAgent, MovementPhase};
    use tank_arena_system_projectiles::Projectile;

    use super::{Player, World};

    /// Simulation time elapsed since the current round started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &ArenaConfig {
        &world.config
    }

    /// Maze of the current round.
    #[must_use]
    pub fn grid(world: &World) -> &OccupancyGrid {
        world.agents.grid()
    }

    /// Border strips followed by one rectangle per blocked cell.
    #[must_use]
    pub fn walls(world: &World) -> &[Rect] {
        &world.walls
    }

    /// Tank owned by the provided player.
    #[must_use]
    pub fn player(world: &World, player: PlayerId) -> &Player {
        &world.players[player.index()]
    }

    /// Scores of both players in storage order.
    #[must_use]
    pub fn scores(world: &World) -> [u32; 2] {
        PlayerId::ALL.map(|id| world.players[id.index()].score())
    }

    /// Live projectiles fired by the provided player.
    #[must_use]
    pub fn projectiles(world: &World, player: PlayerId) -> &[Projectile] {
        world.players[player.index()].projectiles()
    }

    /// Winner of the match, once decided.
    #[must_use]
    pub fn winner(world: &World) -> Option<PlayerId> {
        world.winner
    }

    /// Live enemy agents in spawn order.
    #[must_use]
    pub fn agents(world: &World) -> &[EnemyAgent] {
        world.agents.agents()
    }

    /// Captures a read-only view of the enemy agents.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        let mut snapshots: Vec<AgentSnapshot> = world
            .agents
            .agents()
            .iter()
            .map(|agent| AgentSnapshot {
                id: agent.id(),
                position: agent.position(),
                angle_degrees: agent.angle_degrees(),
                cell: agent.cell(),
                target: agent.target(),
                next_hop: agent.path().front().copied(),
                moving: matches!(agent.phase(), MovementPhase::Moving { .. }),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        AgentView { snapshots }
    }

    /// Read-only snapshot describing all agents within the maze.
    #[derive(Clone, Debug)]
    pub struct AgentView {
        snapshots: Vec<AgentSnapshot>,
    }

    impl AgentView {
        /// Iterator over the captured agent snapshots ordered by identifier.
        pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<AgentSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single agent's state used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct AgentSnapshot {
        /// Unique identifier assigned to the agent.
        pub id: AgentId,
        /// Center of the agent in pixel space.
        pub position: Vec2,
        /// Facing angle in degrees.
        pub angle_degrees: f32,
        /// Cell the agent stands on or is entering.
        pub cell: CellCoord,
        /// Player the agent is hunting, if any is in range.
        pub target: Option<PlayerId>,
        /// Next cell of the cached route, if any.
        pub next_hop: Option<CellCoord>,
        /// Indicates whether the agent is between two cell centers.
        pub moving: bool,
    }
}
