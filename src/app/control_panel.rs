use crate::competitors::{self, Competitor};
use crate::core::runner::SimulationHandle;
use crate::domain::model::Snapshot;
use crate::domain::ports::SnapshotListener;
use crate::domain::rules::{DEFAULT_INTERVAL_MS, MAX_INTERVAL_MS};
use crate::utils::error::{BattleError, Result};
use crate::utils::validation::validate_range;
use std::str::FromStr;
use std::time::Duration;

/// What the control panel can ask of a simulation.
pub trait SimulationControl {
    fn reset(&self, competitors: Vec<Competitor>, interval: Duration) -> Result<()>;
    fn set_interval(&self, interval: Duration) -> Result<()>;
    fn start(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
}

impl SimulationControl for SimulationHandle {
    fn reset(&self, competitors: Vec<Competitor>, interval: Duration) -> Result<()> {
        SimulationHandle::reset(self, competitors, interval)
    }

    fn set_interval(&self, interval: Duration) -> Result<()> {
        SimulationHandle::set_interval(self, interval)
    }

    fn start(&self) -> Result<()> {
        SimulationHandle::start(self)
    }

    fn pause(&self) -> Result<()> {
        SimulationHandle::pause(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    NoneChosen,
    Ready,
    Running,
    GameOver,
}

/// 每個狀態下哪些按鈕可以按
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buttons {
    pub start: bool,
    pub pause: bool,
    pub choose: bool,
    pub same: bool,
}

impl ControlState {
    pub fn buttons(self) -> Buttons {
        match self {
            ControlState::NoneChosen => Buttons {
                start: false,
                pause: false,
                choose: true,
                same: false,
            },
            ControlState::Ready => Buttons {
                start: true,
                pause: false,
                choose: true,
                same: true,
            },
            ControlState::Running => Buttons {
                start: false,
                pause: true,
                choose: false,
                same: false,
            },
            ControlState::GameOver => Buttons {
                start: false,
                pause: false,
                choose: true,
                same: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// Competitor names; `all` picks everyone, empty picks no one.
    Choose(Vec<String>),
    Same,
    Start,
    Pause,
    Interval(u64),
    Help,
    Quit,
}

impl FromStr for PanelCommand {
    type Err = BattleError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("").to_lowercase();
        let rest: Vec<String> = words
            .flat_map(|word| word.split(','))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        match verb.as_str() {
            "choose" | "c" => {
                if rest.iter().any(|name| name.eq_ignore_ascii_case("none")) {
                    Ok(PanelCommand::Choose(Vec::new()))
                } else {
                    Ok(PanelCommand::Choose(rest))
                }
            }
            "all" => Ok(PanelCommand::Choose(vec!["all".to_string()])),
            "none" => Ok(PanelCommand::Choose(Vec::new())),
            "same" => Ok(PanelCommand::Same),
            "start" | "s" => Ok(PanelCommand::Start),
            "pause" | "p" => Ok(PanelCommand::Pause),
            "interval" | "i" => {
                let value = rest.first().ok_or_else(|| BattleError::MissingConfigError {
                    field: "interval".to_string(),
                })?;
                let millis = value.parse::<u64>().map_err(|_| BattleError::InvalidConfigValueError {
                    field: "interval".to_string(),
                    value: value.clone(),
                    reason: "Expected milliseconds".to_string(),
                })?;
                validate_range("interval", millis, 0, MAX_INTERVAL_MS)?;
                Ok(PanelCommand::Interval(millis))
            }
            "help" | "h" | "?" => Ok(PanelCommand::Help),
            "quit" | "q" | "exit" => Ok(PanelCommand::Quit),
            other => Err(BattleError::InvalidConfigValueError {
                field: "command".to_string(),
                value: other.to_string(),
                reason: "Unknown command, try 'help'".to_string(),
            }),
        }
    }
}

pub const HELP: &str = concat!(
    "commands: choose <names|all|none>, all, none, same, ",
    "start, pause, interval <ms>, quit"
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Done,
    /// The button for this command is disabled in the current state.
    Disabled(&'static str),
    Help,
    Quit,
}

/// 控制面板：選參賽者、開始、暫停、調整速度
pub struct ControlPanel<C: SimulationControl> {
    simulation: C,
    chosen: Vec<Competitor>,
    interval: Duration,
    state: ControlState,
}

impl<C: SimulationControl> ControlPanel<C> {
    pub fn new(simulation: C) -> Self {
        Self {
            simulation,
            chosen: Vec::new(),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            state: ControlState::NoneChosen,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn chosen(&self) -> &[Competitor] {
        &self.chosen
    }

    pub fn simulation(&self) -> &C {
        &self.simulation
    }

    pub fn into_inner(self) -> C {
        self.simulation
    }

    pub fn apply(&mut self, command: PanelCommand) -> Result<Reply> {
        let buttons = self.state.buttons();
        match command {
            PanelCommand::Choose(names) => {
                if !buttons.choose {
                    return Ok(Reply::Disabled("choose"));
                }
                self.choose(competitors::select(&names)?)?;
            }
            PanelCommand::Same => {
                if !buttons.same {
                    return Ok(Reply::Disabled("same"));
                }
                self.simulation.reset(self.chosen.clone(), self.interval)?;
                self.state = ControlState::Ready;
            }
            PanelCommand::Start => {
                if !buttons.start {
                    return Ok(Reply::Disabled("start"));
                }
                self.state = ControlState::Running;
                self.simulation.start()?;
            }
            PanelCommand::Pause => {
                if !buttons.pause {
                    return Ok(Reply::Disabled("pause"));
                }
                self.simulation.pause()?;
                self.state = ControlState::Ready;
            }
            PanelCommand::Interval(millis) => {
                self.interval = Duration::from_millis(millis);
                self.simulation.set_interval(self.interval)?;
            }
            PanelCommand::Help => return Ok(Reply::Help),
            PanelCommand::Quit => return Ok(Reply::Quit),
        }
        Ok(Reply::Done)
    }

    /// Choosing no one still clears the world.
    pub fn choose(&mut self, chosen: Vec<Competitor>) -> Result<()> {
        self.state = if chosen.is_empty() {
            ControlState::NoneChosen
        } else {
            ControlState::Ready
        };
        self.chosen = chosen;
        self.simulation.reset(self.chosen.clone(), self.interval)
    }
}

impl<C: SimulationControl> SnapshotListener for ControlPanel<C> {
    fn initialize(&mut self, _snapshot: &Snapshot) {}

    fn changed(&mut self, snapshot: &Snapshot) {
        if snapshot.game_over {
            self.state = ControlState::GameOver;
        }
    }
}
