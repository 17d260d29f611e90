pub mod battle;
pub mod organ;
pub mod policy;
pub(crate) mod resident;
pub mod runner;
pub mod simulation;
pub mod turn;
pub mod world;

pub use crate::domain::model::{Settings, Snapshot};
pub use crate::domain::ports::{ConfigProvider, SnapshotListener, Storage};
pub use crate::utils::error::Result;
