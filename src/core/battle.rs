use crate::competitors::Competitor;
use crate::core::simulation::Simulation;
use crate::domain::model::{Entrant, Settings, Snapshot};
use crate::domain::ports::Storage;
use crate::domain::rules::DEFAULT_MAX_TURNS;
use crate::utils::error::{BattleError, Result};
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

pub const REPORT_FILE: &str = "report.json";
pub const HISTORY_FILE: &str = "history.csv";

/// 一場無畫面對戰的結果
#[derive(Debug, Clone, Serialize)]
pub struct BattleReport {
    pub winner: Option<String>,
    pub turns: u64,
    pub game_over: bool,
    pub entrants: Vec<Entrant>,
    pub counts: Vec<usize>,
    pub finished_at: DateTime<Utc>,
}

impl BattleReport {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            winner: snapshot.winner().map(|entrant| entrant.name.clone()),
            turns: snapshot.turn_count,
            game_over: snapshot.game_over,
            entrants: snapshot.entrants.clone(),
            counts: snapshot.counts.clone(),
            finished_at: Utc::now(),
        }
    }
}

/// Runs a whole match without a front end, as fast as the machine allows.
pub struct BattleEngine<S: Storage> {
    simulation: Simulation,
    competitors: Vec<Competitor>,
    max_turns: u64,
    storage: S,
    write_output: bool,
    report_every: u64,
    monitor: Option<SystemMonitor>,
}

impl<S: Storage> BattleEngine<S> {
    pub fn new(settings: Settings, competitors: Vec<Competitor>, storage: S) -> Self {
        Self {
            max_turns: settings.max_turns.unwrap_or(DEFAULT_MAX_TURNS),
            simulation: Simulation::new(settings),
            competitors,
            storage,
            write_output: false,
            report_every: 0,
            monitor: None,
        }
    }

    /// 啟用系統監控
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        let monitor = SystemMonitor::new(enabled);
        self.monitor = monitor.is_enabled().then_some(monitor);
        self
    }

    /// Log the scoreboard every `turns` turns. Zero turns it off.
    pub fn with_report_every(mut self, turns: u64) -> Self {
        self.report_every = turns;
        self
    }

    /// Write `report.json` and `history.csv` through the storage when done.
    pub fn with_output(mut self, enabled: bool) -> Self {
        self.write_output = enabled;
        self
    }

    /// Current state of the match, e.g. to draw the final world.
    pub fn snapshot(&self) -> Snapshot {
        self.simulation.snapshot()
    }

    pub async fn run(&mut self) -> Result<BattleReport> {
        if self.competitors.is_empty() {
            return Err(BattleError::SimulationError {
                message: "no competitors selected".to_string(),
            });
        }

        tracing::info!(
            "🚀 Starting battle: {} (limit {} turns)",
            self.competitors
                .iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
                .join(" vs "),
            self.max_turns
        );

        self.simulation.reset(self.competitors.clone(), Duration::ZERO);
        self.simulation.start();

        let mut history = vec![(0, self.simulation.counts())];
        while !self.simulation.is_game_over() && self.simulation.turn_count() < self.max_turns {
            self.simulation.step();
            let turn = self.simulation.turn_count();
            history.push((turn, self.simulation.counts()));

            if self.report_every > 0 && turn % self.report_every == 0 {
                self.log_scoreboard();
                if let Some(monitor) = &self.monitor {
                    monitor.log_stats(turn);
                }
            }
            // 讓出執行緒，避免長時間佔住 runtime
            if turn % 64 == 0 {
                tokio::task::yield_now().await;
            }
        }

        let snapshot = self.simulation.snapshot();
        let report = BattleReport::from_snapshot(&snapshot);
        match &report.winner {
            Some(winner) => tracing::info!("🏆 {} wins after {} turns", winner, report.turns),
            None if report.game_over => {
                tracing::info!("💀 Everyone died after {} turns", report.turns)
            }
            None => tracing::info!("⏱️ Turn limit reached after {} turns", report.turns),
        }

        if self.write_output {
            self.save(&report, &history).await?;
        }
        if let Some(monitor) = &self.monitor {
            monitor.log_final_stats();
        }

        Ok(report)
    }

    fn log_scoreboard(&self) {
        let board = self
            .competitors
            .iter()
            .zip(self.simulation.counts())
            .map(|(competitor, count)| format!("{}={}", competitor.name, count))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!("🐛 Turn {}: {}", self.simulation.turn_count(), board);
    }

    async fn save(&self, report: &BattleReport, history: &[(u64, Vec<usize>)]) -> Result<()> {
        let json = serde_json::to_vec_pretty(report)?;
        self.storage.write_file(REPORT_FILE, &json).await?;

        let csv = history_csv(&self.competitors, history)?;
        tracing::debug!("Writing census history ({} bytes)", csv.len());
        self.storage.write_file(HISTORY_FILE, &csv).await?;

        tracing::info!("💾 Saved {} and {}", REPORT_FILE, HISTORY_FILE);
        Ok(())
    }
}

/// One row per turn: the turn number then each competitor's population.
fn history_csv(competitors: &[Competitor], history: &[(u64, Vec<usize>)]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["turn".to_string()];
    header.extend(competitors.iter().map(|c| c.name.to_string()));
    writer.write_record(&header)?;

    for (turn, counts) in history {
        let mut row = vec![turn.to_string()];
        row.extend(counts.iter().map(|count| count.to_string()));
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| BattleError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitors;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                BattleError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn settings(max_turns: u64) -> Settings {
        Settings {
            world_width: 15,
            seed: Some(7),
            max_turns: Some(max_turns),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_run_stops_at_turn_limit() {
        let storage = MockStorage::default();
        let mut engine = BattleEngine::new(
            settings(10),
            competitors::roster(),
            storage.clone(),
        );

        let report = engine.run().await.unwrap();

        assert!(report.turns <= 10);
        assert_eq!(report.entrants.len(), 3);
        assert_eq!(report.counts.len(), 3);
        assert!(storage.get_file(REPORT_FILE).await.is_none());
    }

    #[tokio::test]
    async fn test_single_competitor_wins() {
        let chosen = competitors::select(&["SuperPlant".to_string()]).unwrap();
        let mut engine = BattleEngine::new(settings(50), chosen, MockStorage::default());

        let report = engine.run().await.unwrap();

        assert!(report.game_over);
        assert_eq!(report.turns, 1);
        assert_eq!(report.winner.as_deref(), Some("SuperPlant"));
    }

    #[tokio::test]
    async fn test_output_written_through_storage() {
        let storage = MockStorage::default();
        let mut engine = BattleEngine::new(settings(5), competitors::roster(), storage.clone())
            .with_output(true)
            .with_report_every(1);

        let report = engine.run().await.unwrap();

        let json = storage.get_file(REPORT_FILE).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["turns"], report.turns);

        let csv = String::from_utf8(storage.get_file(HISTORY_FILE).await.unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("turn,Hunter,SuperPlant,BugKilla"));
        assert_eq!(lines.count() as u64, report.turns + 1);
    }

    #[tokio::test]
    async fn test_no_competitors_is_an_error() {
        let mut engine = BattleEngine::new(settings(5), Vec::new(), MockStorage::default());
        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, BattleError::SimulationError { .. }));
    }
}
