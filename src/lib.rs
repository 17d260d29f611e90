pub mod app;
pub mod competitors;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::BattleConfig, ResolvedConfig};

pub use competitors::Competitor;
pub use core::battle::{BattleEngine, BattleReport};
pub use core::organ::{Organ, OrganKind, OrganType};
pub use core::policy::{PolicyReport, SubmissionPolicy, Violation};
pub use core::runner::{Receiver, SimulationHandle};
pub use core::simulation::Simulation;
pub use core::turn::{Creature, Turn};
pub use core::world::World;
pub use domain::model::{Appearance, Direction, Settings, Snapshot, SpeciesId, Tile};
pub use utils::error::{BattleError, Result};
