//! Population control and collision arbitration for enemy agents.

use std::time::Duration;

use rand::{seq::SliceRandom, Rng};
use tank_arena_core::{
    AgentConfig, AgentDeath, AgentId, CellCoord, Event, OccupancyGrid, PlayerId, ProjectileId,
    ProjectileRemoval, Rect, SpawnConfig,
};
use tracing::debug;

use crate::{agent::EnemyAgent, Combatant};

/// Owns the enemy population of the current round.
///
/// The random source is injected so that spawn placement is reproducible.
#[derive(Debug)]
pub struct AgentManager<R> {
    grid: OccupancyGrid,
    agents: Vec<EnemyAgent>,
    agent_config: AgentConfig,
    spawn_config: SpawnConfig,
    last_spawn_at: Duration,
    next_id: u32,
    rng: R,
}

impl<R> AgentManager<R>
where
    R: Rng,
{
    /// Creates an empty population operating on `grid`.
    #[must_use]
    pub fn new(
        grid: OccupancyGrid,
        agent_config: AgentConfig,
        spawn_config: SpawnConfig,
        rng: R,
    ) -> Self {
        Self {
            grid,
            agents: Vec::new(),
            agent_config,
            spawn_config,
            last_spawn_at: Duration::ZERO,
            next_id: 0,
            rng,
        }
    }

    /// Drops every agent and installs the maze of a new round.
    pub fn reset(&mut self, grid: OccupancyGrid) {
        self.grid = grid;
        self.agents.clear();
        self.last_spawn_at = Duration::ZERO;
        self.next_id = 0;
    }

    /// Maze the agents navigate.
    #[must_use]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Live agents in no particular order.
    #[must_use]
    pub fn agents(&self) -> &[EnemyAgent] {
        &self.agents
    }

    /// Runs one tick: collision sweep, spawn timer, then every agent's update.
    pub fn update<P>(&mut self, now: Duration, players: &mut [P; 2], out: &mut Vec<Event>)
    where
        P: Combatant,
    {
        let _ = self.sweep_collisions(now, players, out);

        if now.saturating_sub(self.last_spawn_at) >= self.spawn_config.interval() {
            let _ = self.spawn(players, out);
            self.last_spawn_at = now;
        }

        for agent in &mut self.agents {
            agent.update(now, &self.grid, players, out);
        }
    }

    /// Resolves at most one agent death.
    ///
    /// Agents are scanned in turn. For each agent the projectiles of both
    /// players are tested first, then contact with the tanks. The first hit
    /// found removes the agent, credits the score and ends the sweep, so a
    /// single call never kills more than one agent.
    pub fn sweep_collisions<P>(
        &mut self,
        now: Duration,
        players: &mut [P; 2],
        out: &mut Vec<Event>,
    ) -> Option<(AgentId, AgentDeath)>
    where
        P: Combatant,
    {
        for index in 0..self.agents.len() {
            let bounds = self.agents[index].bounds();
            if let Some((owner, projectile)) = projectile_hit(&bounds, players) {
                let agent = self.agents.remove(index).id();
                let shooter = &mut players[owner.index()];
                let _ = shooter.remove_projectile(projectile);
                let score = shooter.award_point();
                let cause = AgentDeath::Shot {
                    by: owner,
                    projectile,
                };
                debug!(agent = agent.get(), ?owner, score, "agent shot down");
                out.push(Event::ProjectileRemoved {
                    player: owner,
                    projectile,
                    reason: ProjectileRemoval::HitAgent(agent),
                });
                out.push(Event::AgentDestroyed { agent, cause });
                out.push(Event::ScoreAwarded {
                    player: owner,
                    score,
                });
                return Some((agent, cause));
            }

            if let Some(touched) = self.agents[index].melee(now, players, out) {
                let agent = self.agents.remove(index).id();
                let cause = AgentDeath::Rammed { touched };
                debug!(agent = agent.get(), ?touched, "agent destroyed on contact");
                out.push(Event::AgentDestroyed { agent, cause });
                return Some((agent, cause));
            }
        }
        None
    }

    /// Adds an agent on a randomly chosen free cell away from both tanks.
    ///
    /// Nothing happens while the population cap is reached or when the maze
    /// has no free cell at all.
    pub fn spawn<P>(&mut self, players: &[P; 2], out: &mut Vec<Event>) -> Option<AgentId>
    where
        P: Combatant,
    {
        if self.at_capacity() {
            debug!(population = self.agents.len(), "spawn skipped at capacity");
            return None;
        }
        let Some(cell) = self.find_spawn_cell(players) else {
            debug!("spawn skipped, maze has no free cell");
            return None;
        };
        Some(self.insert_agent(cell, out))
    }

    /// Adds an agent on a specific free cell, subject to the population cap.
    pub fn spawn_at(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> Option<AgentId> {
        if self.at_capacity() || !self.grid.is_free(cell) {
            return None;
        }
        Some(self.insert_agent(cell, out))
    }

    /// Picks a spawn cell.
    ///
    /// Candidates are free cells whose center lies at least the configured
    /// clearance away from both tank centers; one is chosen uniformly at
    /// random. Without candidates the first free cell in row-major order is
    /// used.
    pub fn find_spawn_cell<P>(&mut self, players: &[P; 2]) -> Option<CellCoord>
    where
        P: Combatant,
    {
        let tanks = [players[0].bounds().center(), players[1].bounds().center()];
        let clearance = self.spawn_config.min_clearance;
        let candidates: Vec<CellCoord> = self
            .grid
            .free_cells()
            .filter(|cell| {
                let center = self.grid.cell_center(*cell);
                tanks.iter().all(|tank| tank.distance(center) >= clearance)
            })
            .collect();

        candidates
            .choose(&mut self.rng)
            .copied()
            .or_else(|| self.grid.free_cells().next())
    }

    fn at_capacity(&self) -> bool {
        self.agents.len() >= self.spawn_config.max_agents
    }

    fn insert_agent(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> AgentId {
        let agent = AgentId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.agents
            .push(EnemyAgent::new(agent, cell, &self.grid, &self.agent_config));
        debug!(agent = agent.get(), ?cell, "agent spawned");
        out.push(Event::AgentSpawned { agent, cell });
        agent
    }
}

fn projectile_hit<P>(bounds: &Rect, players: &[P; 2]) -> Option<(PlayerId, ProjectileId)>
where
    P: Combatant,
{
    players.iter().zip(PlayerId::ALL).find_map(|(player, owner)| {
        player
            .projectiles()
            .iter()
            .find(|projectile| projectile.hit_box().intersects(bounds))
            .map(|projectile| (owner, projectile.id()))
    })
}
