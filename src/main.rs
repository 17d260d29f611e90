use anyhow::Context;
use bug_battle::app::control_panel::HELP;
use bug_battle::app::{ControlPanel, PanelCommand, Reply, ScoreBoard, WorldView};
use bug_battle::app::terminal::render_world;
use bug_battle::config::{Command, RunArgs, WatchArgs};
use bug_battle::core::runner::dispatch;
use bug_battle::core::{ConfigProvider, SnapshotListener};
use bug_battle::utils::error::ErrorSeverity;
use bug_battle::utils::{logger, validation::Validate};
use bug_battle::{
    competitors, BattleConfig, BattleEngine, BattleError, CliConfig, Competitor, LocalStorage,
    ResolvedConfig, SimulationHandle,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🐞 Starting bug-battle");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入 TOML 配置
    let file = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match BattleConfig::load(path) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists, is valid TOML and passes validation");
                    exit_for(&e);
                }
            }
        }
        None => None,
    };

    let outcome = match &cli.command {
        Command::List => {
            list();
            Ok(())
        }
        Command::Run(args) => run(file.as_ref(), args).await,
        Command::Watch(args) => watch(file.as_ref(), args).await,
    };

    if let Err(e) = outcome {
        match e.downcast_ref::<BattleError>() {
            Some(battle) => exit_for(battle),
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// 根據錯誤嚴重程度決定退出碼
fn exit_for(e: &BattleError) -> ! {
    tracing::error!(
        "❌ Battle failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn list() {
    println!("🐛 Registered competitors:");
    for competitor in competitors::roster() {
        println!("  {:<14} {}", competitor.name, competitor.group());
    }
}

fn display_summary(config: &ResolvedConfig, chosen: &[Competitor]) {
    let settings = config.settings();
    println!("📋 {}", config.name);
    println!(
        "  Competitors: {}",
        chosen.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
    );
    println!("  World: {}x{}", settings.world_width, settings.world_width);
    if let Some(seed) = settings.seed {
        println!("  Seed: {}", seed);
    }
    if let Some(max_turns) = settings.max_turns {
        println!("  Max Turns: {}", max_turns);
    }
    if let Some(path) = config.output_path() {
        println!("  Output: {}", path);
    }
    println!();
}

async fn run(file: Option<&BattleConfig>, args: &RunArgs) -> anyhow::Result<()> {
    let config = ResolvedConfig::for_run(file, args);
    config.validate()?;
    let chosen = config.competitors()?;
    display_summary(&config, &chosen);

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let output = config.output_path().map(str::to_string);
    let storage = LocalStorage::new(output.clone().unwrap_or_else(|| ".".to_string()));
    let mut engine = BattleEngine::new(config.settings(), chosen, storage)
        .with_monitoring(config.monitor)
        .with_report_every(config.report_every)
        .with_output(output.is_some());

    let report = engine.run().await?;

    if args.render {
        let snapshot = engine.snapshot();
        print!("{}", render_world(snapshot.world_width, &snapshot.tiles));
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing battle report")?
        );
    } else {
        match &report.winner {
            Some(winner) => println!("🏆 {} wins after {} turns", winner, report.turns),
            None if report.game_over => println!("💀 No survivors after {} turns", report.turns),
            None => println!("⏱️ No winner after {} turns", report.turns),
        }
        for (entrant, count) in report.entrants.iter().zip(&report.counts) {
            println!("  {:<14} {:8}", entrant.name, count);
        }
    }

    if let Some(path) = output {
        println!("📁 Output saved to: {}", path);
    }
    Ok(())
}

async fn watch(file: Option<&BattleConfig>, args: &WatchArgs) -> anyhow::Result<()> {
    let config = ResolvedConfig::for_watch(file, args);
    config.validate()?;
    let chosen = config.competitors()?;

    let handle = SimulationHandle::spawn(config.settings());
    let mut receiver = handle.receiver();
    let mut panel = ControlPanel::new(handle).with_interval(config.settings.interval);
    let mut board = ScoreBoard::new(std::io::stdout(), true);
    let mut view = args.show_world.then(|| WorldView::new(std::io::stdout(), true));

    panel.choose(chosen)?;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading commands from stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<PanelCommand>().and_then(|command| panel.apply(command)) {
                    Ok(Reply::Done) => {}
                    Ok(Reply::Disabled(button)) => {
                        println!("'{}' is not available right now", button)
                    }
                    Ok(Reply::Help) => println!("{}", HELP),
                    Ok(Reply::Quit) => break,
                    Err(e) => println!("❌ {}", e.user_friendly_message()),
                }
            }
            snapshot = receiver.next() => {
                let Some(snapshot) = snapshot else {
                    break;
                };
                let mut listeners: Vec<&mut dyn SnapshotListener> = vec![&mut board, &mut panel];
                if let Some(view) = view.as_mut() {
                    listeners.push(view);
                }
                dispatch(&snapshot, &mut listeners);
            }
        }
    }

    tracing::info!("👋 Shutting down");
    panel.into_inner().shutdown().await?;
    Ok(())
}
