//! Terminal front end: scoreboard, world view and control panel.

pub mod control_panel;
pub mod terminal;

pub use control_panel::{ControlPanel, ControlState, PanelCommand, Reply, SimulationControl};
pub use terminal::{ScoreBoard, WorldView};
