//! Tunable parameters of the combat simulation.
//!
//! Every section deserialises from TOML with per-field defaults, so a file
//! only needs to mention the values it overrides:
//!
//! ```toml
//! rng_seed = 7
//!
//! [spawning]
//! max_agents = 4
//! ```

use std::time::Duration;

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

use crate::Rect;

/// Errors raised while loading an [`ArenaConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed into the configuration schema.
    #[error("failed to parse arena configuration")]
    Parse(#[from] toml::de::Error),
    /// A value parsed correctly but cannot drive the simulation.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable description of the constraint.
        reason: &'static str,
    },
}

/// Complete configuration of a match.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Playfield dimensions and tank geometry.
    pub playfield: PlayfieldConfig,
    /// Enemy agent behaviour.
    pub agents: AgentConfig,
    /// Enemy spawn cadence and placement.
    pub spawning: SpawnConfig,
    /// Projectile kinematics and firing rules.
    pub projectiles: ProjectileConfig,
    /// Win condition.
    pub match_rules: MatchConfig,
    /// Seed for every random draw made by the simulation.
    pub rng_seed: u64,
}

impl ArenaConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("playfield.width", self.playfield.width)?;
        positive("playfield.height", self.playfield.height)?;
        positive("playfield.tank_size", self.playfield.tank_size)?;
        non_negative("playfield.border_thickness", self.playfield.border_thickness)?;
        positive("playfield.tank_speed", self.playfield.tank_speed)?;
        positive("playfield.rotate_speed", self.playfield.rotate_speed)?;
        positive("agents.size", self.agents.size)?;
        positive("agents.speed", self.agents.speed)?;
        non_negative("agents.detection_range", self.agents.detection_range)?;
        non_zero("agents.recompute_interval_ms", self.agents.recompute_interval_ms)?;
        non_zero("spawning.interval_ms", self.spawning.interval_ms)?;
        non_negative("spawning.min_clearance", self.spawning.min_clearance)?;
        positive("projectiles.radius", self.projectiles.radius)?;
        positive("projectiles.speed", self.projectiles.speed)?;
        non_zero("projectiles.lifetime_ms", self.projectiles.lifetime_ms)?;
        non_negative("projectiles.bounce_jitter", self.projectiles.bounce_jitter)?;
        non_negative("projectiles.muzzle_offset", self.projectiles.muzzle_offset)?;
        if self.match_rules.max_score == 0 {
            return Err(ConfigError::Invalid {
                field: "match_rules.max_score",
                reason: "must be at least one",
            });
        }
        Ok(())
    }
}

/// Playfield dimensions and tank geometry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayfieldConfig {
    /// Width of the playfield in pixels.
    pub width: f32,
    /// Height of the playfield in pixels.
    pub height: f32,
    /// Thickness of the four wall strips lining the playfield edges.
    pub border_thickness: f32,
    /// Edge length of a tank's square bounding box.
    pub tank_size: f32,
    /// Pixels a tank travels per drive command at full throttle.
    pub tank_speed: f32,
    /// Degrees a tank turns per drive command at full turn input.
    pub rotate_speed: f32,
}

impl PlayfieldConfig {
    /// Rectangle projectiles must stay inside.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_min_size(Vec2::ZERO, Vec2::new(self.width, self.height))
    }
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            border_thickness: 10.0,
            tank_size: 40.0,
            tank_speed: 3.0,
            rotate_speed: 5.0,
        }
    }
}

/// Enemy agent behaviour.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Edge length of an agent's square hit-box.
    pub size: f32,
    /// Pixels travelled per tick while moving between cells.
    pub speed: f32,
    /// Players farther away than this are ignored.
    pub detection_range: f32,
    /// Simulated time between target and path refreshes.
    pub recompute_interval_ms: u64,
}

impl AgentConfig {
    /// Recompute interval as a [`Duration`].
    #[must_use]
    pub const fn recompute_interval(&self) -> Duration {
        Duration::from_millis(self.recompute_interval_ms)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            size: 10.0,
            speed: 1.0,
            detection_range: 350.0,
            recompute_interval_ms: 400,
        }
    }
}

/// Enemy spawn cadence and placement.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnConfig {
    /// Simulated time between spawn attempts.
    pub interval_ms: u64,
    /// Population cap; spawning is skipped while it is reached.
    pub max_agents: usize,
    /// Minimum pixel distance between a spawn cell's center and every tank.
    pub min_clearance: f32,
}

impl SpawnConfig {
    /// Spawn interval as a [`Duration`].
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            max_agents: 10,
            min_clearance: 100.0,
        }
    }
}

/// Projectile kinematics and firing rules.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectileConfig {
    /// Half the edge length of a projectile's square hit-box.
    pub radius: f32,
    /// Pixels travelled per tick.
    pub speed: f32,
    /// Simulated time after which a projectile expires.
    pub lifetime_ms: u64,
    /// Bound of the symmetric noise added to each direction component on a bounce.
    pub bounce_jitter: f32,
    /// Live projectiles a single tank may own.
    pub max_per_player: usize,
    /// Minimum simulated time between two shots of the same tank.
    pub fire_cooldown_ms: u64,
    /// Distance from the tank center at which projectiles appear.
    pub muzzle_offset: f32,
}

impl ProjectileConfig {
    /// Lifetime as a [`Duration`].
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    /// Fire cooldown as a [`Duration`].
    #[must_use]
    pub const fn fire_cooldown(&self) -> Duration {
        Duration::from_millis(self.fire_cooldown_ms)
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            speed: 3.0,
            lifetime_ms: 5_000,
            bounce_jitter: 0.05,
            max_per_player: 3,
            fire_cooldown_ms: 500,
            muzzle_offset: 26.0,
        }
    }
}

/// Win condition.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Score that ends the match.
    pub max_score: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { max_score: 20 }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a positive number",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a finite, non-negative number",
        })
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero",
        })
    } else {
        Ok(())
    }
}
