//! Configuration System
//!
//! Three tiers, from simplest to most explicit:
//! - Level 1: Preset - one-liner
//! - Level 2: Stage Override - builder closures per stage
//! - Level 3: YAML - versioned schema with overrides
//!
//! # Examples
//!
//! ```rust,ignore
//! use refminer_core::config::{MinerConfig, Preset};
//!
//! // Level 1
//! let config = MinerConfig::preset(Preset::Fast).build()?;
//!
//! // Level 2
//! let config = MinerConfig::preset(Preset::Balanced)
//!     .mapper(|c| c.similarity_floor(0.6).time_budget_ms(500))
//!     .build()?;
//!
//! // Level 3
//! let config = MinerConfig::from_yaml("refminer.yaml")?;
//! ```
//!
//! Thresholds and budgets are empirically tuned values; every one of them is a
//! field here rather than a constant in the algorithms.

pub mod error;
pub mod io;
pub mod miner_config;
pub mod preset;
pub mod provenance;
pub mod stage_configs;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use miner_config::MinerConfig;
pub use preset::Preset;
pub use provenance::{ConfigProvenance, ConfigSource};
pub use stage_configs::{ClassifierConfig, MapperConfig, MatcherConfig, ParallelConfig};
pub use validation::Validatable;
