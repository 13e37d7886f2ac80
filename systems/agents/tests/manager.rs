use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tank_arena_core::{
    AgentConfig, AgentDeath, AgentId, CellCoord, Event, OccupancyGrid, PlayerId, ProjectileConfig,
    ProjectileId, ProjectileRemoval, Rect, SpawnConfig,
};
use tank_arena_system_agents::{AgentManager, Combatant, MovementPhase};
use tank_arena_system_projectiles::Projectile;

const CELL: f32 = 53.0;

#[derive(Debug)]
struct Tank {
    bounds: Rect,
    score: u32,
    projectiles: Vec<Projectile>,
}

impl Tank {
    fn at(center: Vec2) -> Self {
        Self {
            bounds: Rect::from_center(center, Vec2::splat(40.0)),
            score: 0,
            projectiles: Vec::new(),
        }
    }

    fn parked() -> Self {
        Self::at(Vec2::new(5_000.0, 5_000.0))
    }

    fn with_projectile(mut self, id: u32, position: Vec2) -> Self {
        self.projectiles.push(Projectile::new(
            ProjectileId::new(id),
            position,
            Vec2::X,
            Duration::ZERO,
            &ProjectileConfig::default(),
        ));
        self
    }
}

impl Combatant for Tank {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn award_point(&mut self) -> u32 {
        self.score += 1;
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

fn manager(grid: OccupancyGrid, spawning: SpawnConfig) -> AgentManager<ChaCha8Rng> {
    AgentManager::new(
        grid,
        AgentConfig::default(),
        spawning,
        ChaCha8Rng::seed_from_u64(0x5eed),
    )
}

fn open_grid() -> OccupancyGrid {
    OccupancyGrid::open(10, 10, CELL).expect("open grid")
}

fn spawning(max_agents: usize) -> SpawnConfig {
    SpawnConfig {
        max_agents,
        ..SpawnConfig::default()
    }
}

#[test]
fn spawn_at_capacity_leaves_population_unchanged() {
    let mut manager = manager(open_grid(), spawning(2));
    let players = [Tank::parked(), Tank::parked()];
    let mut events = Vec::new();

    assert!(manager.spawn(&players, &mut events).is_some());
    assert!(manager.spawn(&players, &mut events).is_some());
    assert_eq!(manager.agents().len(), 2);

    events.clear();
    assert_eq!(manager.spawn(&players, &mut events), None);
    assert_eq!(manager.agents().len(), 2);
    assert!(events.is_empty());
    assert_eq!(manager.spawn_at(CellCoord::new(5, 5), &mut events), None);
}

#[test]
fn spawn_cells_keep_clear_of_both_tanks() {
    let grid = OccupancyGrid::open(4, 1, CELL).expect("open grid");
    let tank = CellCoord::new(0, 0).center(CELL);
    let mut manager = manager(grid, spawning(64));
    let players = [Tank::at(tank), Tank::at(tank)];
    let mut events = Vec::new();

    for _ in 0..32 {
        let _ = manager.spawn(&players, &mut events);
    }

    assert_eq!(manager.agents().len(), 32);
    for agent in manager.agents() {
        assert!(
            agent.cell() == CellCoord::new(2, 0) || agent.cell() == CellCoord::new(3, 0),
            "{:?} is too close to a tank",
            agent.cell()
        );
    }
}

#[test]
fn spawn_falls_back_to_first_free_cell() {
    let grid = OccupancyGrid::from_ascii("#...", CELL).expect("layout");
    let mut manager = manager(
        grid,
        SpawnConfig {
            min_clearance: 10_000.0,
            ..SpawnConfig::default()
        },
    );
    let players = [Tank::at(Vec2::new(100.0, 26.5)), Tank::parked()];
    let mut events = Vec::new();

    let agent = manager.spawn(&players, &mut events);

    assert_eq!(agent, Some(AgentId::new(0)));
    assert_eq!(
        events,
        vec![Event::AgentSpawned {
            agent: AgentId::new(0),
            cell: CellCoord::new(1, 0)
        }]
    );
}

#[test]
fn maze_without_free_cells_degrades_to_no_op() {
    let grid = OccupancyGrid::from_ascii("###\n###", CELL).expect("layout");
    let mut manager = manager(grid, spawning(10));
    let mut players = [Tank::parked(), Tank::parked()];
    let mut events = Vec::new();

    assert_eq!(manager.spawn(&players, &mut events), None);
    for tick in 0..=600_u64 {
        manager.update(Duration::from_millis(tick * 16), &mut players, &mut events);
    }

    assert!(manager.agents().is_empty());
    assert!(events.is_empty());

    let mut empty = self::manager(OccupancyGrid::empty(CELL), spawning(10));
    empty.update(Duration::from_secs(10), &mut players, &mut events);
    assert!(empty.agents().is_empty());
}

#[test]
fn projectile_hit_kills_once_and_credits_the_shooter() {
    let mut manager = manager(open_grid(), spawning(10));
    let mut events = Vec::new();
    let agent = manager
        .spawn_at(CellCoord::new(2, 2), &mut events)
        .expect("free cell");
    let agent_center = CellCoord::new(2, 2).center(CELL);
    let mut players = [
        Tank::parked().with_projectile(7, agent_center + Vec2::new(-4.0, 0.0)),
        Tank::parked(),
    ];
    events.clear();

    let outcome = manager.sweep_collisions(Duration::from_secs(1), &mut players, &mut events);

    let cause = AgentDeath::Shot {
        by: PlayerId::One,
        projectile: ProjectileId::new(7),
    };
    assert_eq!(outcome, Some((agent, cause)));
    assert_eq!(
        events,
        vec![
            Event::ProjectileRemoved {
                player: PlayerId::One,
                projectile: ProjectileId::new(7),
                reason: ProjectileRemoval::HitAgent(agent),
            },
            Event::AgentDestroyed { agent, cause },
            Event::ScoreAwarded {
                player: PlayerId::One,
                score: 1
            },
        ]
    );
    assert!(manager.agents().is_empty());
    assert!(players[0].projectiles.is_empty());

    events.clear();
    assert_eq!(
        manager.sweep_collisions(Duration::from_secs(1), &mut players, &mut events),
        None
    );
    assert!(events.is_empty());
    assert_eq!(players[0].score, 1);
    assert_eq!(players[1].score, 0);
}

#[test]
fn one_kill_is_resolved_per_sweep() {
    let mut manager = manager(open_grid(), spawning(10));
    let mut events = Vec::new();
    let first = manager
        .spawn_at(CellCoord::new(2, 2), &mut events)
        .expect("free cell");
    let second = manager
        .spawn_at(CellCoord::new(6, 6), &mut events)
        .expect("free cell");
    let mut players = [
        Tank::parked().with_projectile(1, CellCoord::new(2, 2).center(CELL)),
        Tank::parked().with_projectile(1, CellCoord::new(6, 6).center(CELL)),
    ];

    let now = Duration::from_secs(3);
    let kill = manager.sweep_collisions(now, &mut players, &mut events);
    assert_eq!(kill.map(|(agent, _)| agent), Some(first));
    assert_eq!(manager.agents().len(), 1);
    assert_eq!((players[0].score, players[1].score), (1, 0));

    let kill = manager.sweep_collisions(now, &mut players, &mut events);
    assert_eq!(kill.map(|(agent, _)| agent), Some(second));
    assert!(manager.agents().is_empty());
    assert_eq!((players[0].score, players[1].score), (1, 1));
}

#[test]
fn tick_kills_before_spawning_and_moves_agents_last() {
    let grid = OccupancyGrid::open(6, 6, CELL).expect("open grid");
    let mut manager = manager(grid, spawning(1));
    let mut events = Vec::new();
    let doomed = manager
        .spawn_at(CellCoord::new(2, 2), &mut events)
        .expect("free cell");
    let doomed_center = CellCoord::new(2, 2).center(CELL);
    // Tank two touches the agent, so an early agent update would ram it.
    let mut players = [
        Tank::parked().with_projectile(3, doomed_center),
        Tank::at(doomed_center + Vec2::new(20.0, 0.0)),
    ];
    events.clear();

    manager.update(Duration::from_millis(5_000), &mut players, &mut events);

    let destroyed = events
        .iter()
        .position(|event| matches!(event, Event::AgentDestroyed { agent, .. } if *agent == doomed))
        .expect("agent shot in the sweep");
    let spawned = events
        .iter()
        .position(|event| matches!(event, Event::AgentSpawned { .. }))
        .expect("spawn slot freed by the kill");
    assert!(destroyed < spawned);
    assert!(!events.iter().any(|event| matches!(event, Event::MeleeHit { .. })));
    assert_eq!((players[0].score, players[1].score), (1, 0));

    let Event::AgentSpawned { agent, cell } = events[spawned] else {
        unreachable!("position matched a spawn event");
    };
    let [newcomer] = manager.agents() else {
        panic!("expected exactly one agent, got {:?}", manager.agents());
    };
    assert_eq!(newcomer.id(), agent);
    assert_eq!(newcomer.target(), Some(PlayerId::Two));
    assert!(matches!(newcomer.phase(), MovementPhase::Moving { .. }));
    assert_ne!(newcomer.position(), cell.center(CELL));
}

#[test]
fn sweep_removes_agent_touching_a_tank_and_credits_the_other_player() {
    let mut manager = manager(open_grid(), spawning(10));
    let mut events = Vec::new();
    let agent = manager
        .spawn_at(CellCoord::new(4, 4), &mut events)
        .expect("free cell");
    let mut players = [
        Tank::at(CellCoord::new(4, 4).center(CELL) + Vec2::new(12.0, 0.0)),
        Tank::parked(),
    ];
    events.clear();

    let outcome = manager.sweep_collisions(Duration::from_secs(2), &mut players, &mut events);

    let cause = AgentDeath::Rammed {
        touched: PlayerId::One,
    };
    assert_eq!(outcome, Some((agent, cause)));
    assert_eq!(
        events,
        vec![
            Event::MeleeHit {
                agent,
                touched: PlayerId::One
            },
            Event::ScoreAwarded {
                player: PlayerId::Two,
                score: 1
            },
            Event::AgentDestroyed { agent, cause },
        ]
    );
    assert_eq!((players[0].score, players[1].score), (0, 1));
}

#[test]
fn spawn_timer_fires_on_each_full_interval() {
    let mut manager = manager(open_grid(), spawning(10));
    let mut players = [Tank::parked(), Tank::parked()];
    let mut events = Vec::new();

    manager.update(Duration::from_millis(4_999), &mut players, &mut events);
    assert!(manager.agents().is_empty());

    manager.update(Duration::from_millis(5_000), &mut players, &mut events);
    assert_eq!(manager.agents().len(), 1);

    manager.update(Duration::from_millis(9_999), &mut players, &mut events);
    assert_eq!(manager.agents().len(), 1);

    manager.update(Duration::from_millis(10_000), &mut players, &mut events);
    assert_eq!(manager.agents().len(), 2);

    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::AgentSpawned { .. }))
        .count();
    assert_eq!(spawned, 2);
}

#[test]
fn agent_chases_tank_down_a_corridor_and_rams_it() {
    let grid = OccupancyGrid::from_ascii(
        "
        ########
        #......#
        ########
        ",
        CELL,
    )
    .expect("layout");
    let mut manager = manager(
        grid,
        SpawnConfig {
            interval_ms: 1_000_000,
            ..SpawnConfig::default()
        },
    );
    let mut events = Vec::new();
    let agent = manager
        .spawn_at(CellCoord::new(1, 1), &mut events)
        .expect("free cell");
    let mut players = [
        Tank::at(CellCoord::new(6, 1).center(CELL)),
        Tank::parked(),
    ];

    let rammed = Event::AgentDestroyed {
        agent,
        cause: AgentDeath::Rammed {
            touched: PlayerId::One,
        },
    };
    for tick in 1..=1_000_u64 {
        manager.update(Duration::from_millis(tick * 16), &mut players, &mut events);
        if events.contains(&rammed) {
            break;
        }
    }

    assert!(events.contains(&rammed), "agent never reached the tank");
    assert!(manager.agents().is_empty());
    // The contact tick scores through the agent's own update, the next
    // sweep scores again and removes the agent.
    assert_eq!((players[0].score, players[1].score), (0, 2));
}

#[test]
fn reset_clears_population_and_installs_new_maze() {
    let mut manager = manager(open_grid(), spawning(10));
    let mut events = Vec::new();
    let _ = manager.spawn_at(CellCoord::new(1, 1), &mut events);

    let replacement = OccupancyGrid::open(3, 3, CELL).expect("open grid");
    manager.reset(replacement.clone());

    assert!(manager.agents().is_empty());
    assert_eq!(manager.grid(), &replacement);
    assert_eq!(
        manager.spawn_at(CellCoord::new(1, 1), &mut events),
        Some(AgentId::new(0))
    );
}
