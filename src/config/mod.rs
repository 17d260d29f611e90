pub mod cli;
pub mod toml_config;

use crate::competitors::{self, Competitor};
use crate::core::ConfigProvider;
use crate::domain::model::Settings;
use crate::utils::error::{BattleError, Result};
use crate::utils::validation::{self, Validate};
use std::time::Duration;
use toml_config::BattleConfig;

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bug-battle")]
#[command(about = "Artificial-life battles between competing bug designs")]
pub struct CliConfig {
    /// Path to a TOML battle configuration
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a battle headless and report the result
    Run(RunArgs),
    /// Watch a battle in the terminal and control it interactively
    Watch(WatchArgs),
    /// List the registered competitors
    List,
}

/// 對戰設定，命令列優先於設定檔
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct MatchArgs {
    /// Competitors to enter, comma separated, or `all`
    #[arg(long, value_delimiter = ',')]
    pub competitors: Vec<String>,

    #[arg(long)]
    pub width: Option<usize>,

    /// Seed for a reproducible battle
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub matchup: MatchArgs,

    #[arg(long)]
    pub max_turns: Option<u64>,

    /// Directory for report.json and history.csv
    #[arg(short, long)]
    pub output: Option<String>,

    /// Log the scoreboard every N turns
    #[arg(long)]
    pub report_every: Option<u64>,

    /// Draw the final world
    #[arg(long)]
    pub render: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    pub monitor: Option<bool>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub matchup: MatchArgs,

    /// Milliseconds between turns
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Draw the world every turn, not just the scoreboard
    #[arg(long)]
    pub show_world: bool,
}

/// Settings after merging the config file with command-line overrides.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub name: String,
    pub settings: Settings,
    pub competitors: Vec<String>,
    pub output_path: Option<String>,
    pub monitor: bool,
    pub report_every: u64,
}

impl ResolvedConfig {
    pub const DEFAULT_REPORT_EVERY: u64 = 100;

    pub fn from_file(file: Option<&BattleConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();
        let competitors = if file.competitors.selected.is_empty() {
            vec!["all".to_string()]
        } else {
            file.competitors.selected.clone()
        };
        Self {
            name: file.name().to_string(),
            settings: file.settings(),
            competitors,
            output_path: file.output_path().map(str::to_string),
            monitor: file.monitoring_enabled(),
            report_every: file.report_every().unwrap_or(Self::DEFAULT_REPORT_EVERY),
        }
    }

    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.settings.interval = Duration::from_millis(interval_ms);
    }

    /// 依名稱找出參賽者，至少要有一位
    pub fn competitors(&self) -> Result<Vec<Competitor>> {
        let chosen = competitors::select(&self.competitors)?;
        if chosen.is_empty() {
            return Err(BattleError::ConfigError {
                message: "no competitors selected".to_string(),
            });
        }
        Ok(chosen)
    }
}

#[cfg(feature = "cli")]
impl ResolvedConfig {
    fn apply_matchup(&mut self, matchup: &MatchArgs) {
        if !matchup.competitors.is_empty() {
            self.competitors = matchup.competitors.clone();
        }
        if let Some(width) = matchup.width {
            self.settings.world_width = width;
        }
        if matchup.seed.is_some() {
            self.settings.seed = matchup.seed;
        }
    }

    pub fn for_run(file: Option<&BattleConfig>, args: &RunArgs) -> Self {
        let mut config = Self::from_file(file);
        config.apply_matchup(&args.matchup);
        if args.max_turns.is_some() {
            config.settings.max_turns = args.max_turns;
        }
        if args.output.is_some() {
            config.output_path = args.output.clone();
        }
        if let Some(every) = args.report_every {
            config.report_every = every;
        }
        if let Some(monitor) = args.monitor {
            config.monitor = monitor;
        }
        config
    }

    pub fn for_watch(file: Option<&BattleConfig>, args: &WatchArgs) -> Self {
        let mut config = Self::from_file(file);
        config.apply_matchup(&args.matchup);
        if let Some(interval_ms) = args.interval_ms {
            config.set_interval_ms(interval_ms);
        }
        config
    }
}

impl ConfigProvider for ResolvedConfig {
    fn settings(&self) -> Settings {
        self.settings.clone()
    }

    fn competitor_names(&self) -> &[String] {
        &self.competitors
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }
}

impl Validate for ResolvedConfig {
    fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        validation::validate_unique_names("competitors", &self.competitors)?;
        validation::validate_range("report_every", self.report_every, 1, u64::MAX)?;
        if let Some(path) = &self.output_path {
            validation::validate_path("output", path)?;
        }
        Ok(())
    }
}
