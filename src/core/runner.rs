//! Runs a [`Simulation`] on its own task. The front end talks to it through
//! a [`SimulationHandle`] (commands in) and watches the latest [`Snapshot`]
//! (snapshots out). Slow consumers simply skip intermediate snapshots.

use crate::competitors::Competitor;
use crate::core::simulation::Simulation;
use crate::domain::model::{Settings, Snapshot};
use crate::domain::ports::SnapshotListener;
use crate::utils::error::{BattleError, Result};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};

const IDLE_POLL: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub enum Command {
    Reset {
        competitors: Vec<Competitor>,
        interval: Duration,
    },
    SetInterval(Duration),
    Start,
    Pause,
    Shutdown,
}

pub struct SimulationHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Option<Snapshot>>,
    task: JoinHandle<()>,
}

impl SimulationHandle {
    pub fn spawn(settings: Settings) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (outbox, snapshots) = watch::channel(None);
        let simulation = Simulation::new(settings);
        let task = tokio::spawn(run(simulation, inbox, outbox));
        Self {
            commands,
            snapshots,
            task,
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| BattleError::SimulationError {
                message: "simulation task has stopped".to_string(),
            })
    }

    pub fn reset(&self, competitors: Vec<Competitor>, interval: Duration) -> Result<()> {
        self.send(Command::Reset {
            competitors,
            interval,
        })
    }

    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        self.send(Command::SetInterval(interval))
    }

    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn receiver(&self) -> Receiver {
        Receiver {
            snapshots: self.snapshots.clone(),
        }
    }

    /// 通知模擬工作結束並等待它停止
    pub async fn shutdown(self) -> Result<()> {
        // The task may already be gone; that is fine.
        let _ = self.commands.send(Command::Shutdown);
        self.task.await.map_err(|e| BattleError::SimulationError {
            message: format!("simulation task failed: {}", e),
        })
    }
}

async fn run(
    mut simulation: Simulation,
    mut inbox: mpsc::UnboundedReceiver<Command>,
    outbox: watch::Sender<Option<Snapshot>>,
) {
    tracing::debug!("simulation task started");
    loop {
        if simulation.is_running() && !simulation.is_game_over() {
            let start = Instant::now();
            simulation = match step_blocking(simulation).await {
                Ok(simulation) => simulation,
                Err(e) => {
                    tracing::error!("❌ Simulation turn failed: {}", e);
                    break;
                }
            };
            outbox.send_replace(Some(simulation.snapshot()));

            let wait = simulation.interval().saturating_sub(start.elapsed());
            if wait.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(wait).await;
            }
        } else {
            match tokio::time::timeout(IDLE_POLL, inbox.recv()).await {
                Ok(Some(command)) => {
                    if !apply(&mut simulation, command, &outbox) {
                        break;
                    }
                }
                Ok(None) => break,
                Err(_) => continue,
            }
        }

        if !drain(&mut simulation, &mut inbox, &outbox) {
            break;
        }
    }
    tracing::debug!("simulation task stopped");
}

/// 世界回合是純計算，放到 blocking 執行緒上跑，不佔用 runtime 的 worker
async fn step_blocking(mut simulation: Simulation) -> std::result::Result<Simulation, JoinError> {
    tokio::task::spawn_blocking(move || {
        simulation.step();
        simulation
    })
    .await
}

/// Apply every queued command. Returns false once the task should stop.
fn drain(
    simulation: &mut Simulation,
    inbox: &mut mpsc::UnboundedReceiver<Command>,
    outbox: &watch::Sender<Option<Snapshot>>,
) -> bool {
    loop {
        match inbox.try_recv() {
            Ok(command) => {
                if !apply(simulation, command, outbox) {
                    return false;
                }
            }
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

fn apply(
    simulation: &mut Simulation,
    command: Command,
    outbox: &watch::Sender<Option<Snapshot>>,
) -> bool {
    tracing::debug!(?command, "simulation command");
    match command {
        Command::Reset {
            competitors,
            interval,
        } => {
            simulation.reset(competitors, interval);
            outbox.send_replace(Some(simulation.snapshot()));
        }
        Command::SetInterval(interval) => simulation.set_interval(interval),
        Command::Start => simulation.start(),
        Command::Pause => simulation.pause(),
        Command::Shutdown => return false,
    }
    true
}

/// Receives the newest snapshot published by the simulation task.
#[derive(Clone)]
pub struct Receiver {
    snapshots: watch::Receiver<Option<Snapshot>>,
}

impl Receiver {
    /// Wait for a snapshot newer than the last one seen. `None` once the
    /// simulation task has stopped.
    pub async fn next(&mut self) -> Option<Snapshot> {
        loop {
            self.snapshots.changed().await.ok()?;
            if let Some(snapshot) = self.snapshots.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
    }

    /// Wait for the next snapshot and hand it to every listener.
    pub async fn dispatch_next(
        &mut self,
        listeners: &mut [&mut dyn SnapshotListener],
    ) -> Option<Snapshot> {
        let snapshot = self.next().await?;
        dispatch(&snapshot, listeners);
        Some(snapshot)
    }
}

/// 第 0 回合代表新比賽，其餘都是更新
pub fn dispatch(snapshot: &Snapshot, listeners: &mut [&mut dyn SnapshotListener]) {
    for listener in listeners.iter_mut() {
        if snapshot.turn_count == 0 {
            listener.initialize(snapshot);
        } else {
            listener.changed(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitors;

    #[derive(Default)]
    struct Recorder {
        initialized: usize,
        changed: usize,
    }

    impl SnapshotListener for Recorder {
        fn initialize(&mut self, _snapshot: &Snapshot) {
            self.initialized += 1;
        }

        fn changed(&mut self, _snapshot: &Snapshot) {
            self.changed += 1;
        }
    }

    fn snapshot(turn_count: u64) -> Snapshot {
        Snapshot {
            turn_count,
            tps: 0.0,
            game_over: false,
            world_width: 3,
            entrants: Vec::new(),
            counts: Vec::new(),
            tiles: Vec::new(),
        }
    }

    #[test]
    fn test_dispatch_initializes_on_turn_zero() {
        let mut recorder = Recorder::default();
        dispatch(&snapshot(0), &mut [&mut recorder]);
        dispatch(&snapshot(1), &mut [&mut recorder]);
        dispatch(&snapshot(2), &mut [&mut recorder]);
        assert_eq!(recorder.initialized, 1);
        assert_eq!(recorder.changed, 2);
    }

    #[tokio::test]
    async fn test_reset_publishes_initial_snapshot() {
        let handle = SimulationHandle::spawn(Settings {
            world_width: 10,
            seed: Some(1),
            ..Settings::default()
        });
        let mut receiver = handle.receiver();
        handle
            .reset(competitors::roster(), Duration::from_millis(1))
            .unwrap();

        let mut recorder = Recorder::default();
        let first = receiver.dispatch_next(&mut [&mut recorder]).await.unwrap();
        assert_eq!(first.turn_count, 0);
        assert_eq!(first.entrants.len(), 3);
        assert_eq!(recorder.initialized, 1);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_advances_turns_until_paused() {
        let handle = SimulationHandle::spawn(Settings {
            world_width: 10,
            seed: Some(2),
            ..Settings::default()
        });
        let mut receiver = handle.receiver();
        handle
            .reset(competitors::roster(), Duration::ZERO)
            .unwrap();
        handle.start().unwrap();

        let mut latest = receiver.next().await.unwrap();
        while latest.turn_count < 3 && !latest.game_over {
            latest = receiver.next().await.unwrap();
        }
        assert!(latest.turn_count >= 1);

        handle.pause().unwrap();
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_receiver_ends_after_shutdown() {
        let handle = SimulationHandle::spawn(Settings {
            world_width: 5,
            ..Settings::default()
        });
        let mut receiver = handle.receiver();
        handle.shutdown().await.unwrap();
        assert!(receiver.next().await.is_none());
    }

    #[tokio::test]
    async fn test_large_world_leaves_runtime_responsive() {
        let handle = SimulationHandle::spawn(Settings {
            world_width: 120,
            seed: Some(4),
            ..Settings::default()
        });
        let mut receiver = handle.receiver();
        handle.reset(competitors::roster(), Duration::ZERO).unwrap();
        assert_eq!(receiver.next().await.unwrap().turn_count, 0);
        handle.start().unwrap();

        // Same single-threaded runtime as the simulation task.
        let ticks = tokio::time::timeout(Duration::from_secs(10), async {
            let mut ticks = 0;
            for _ in 0..5 {
                tokio::time::sleep(Duration::from_millis(1)).await;
                ticks += 1;
            }
            ticks
        })
        .await;
        assert_eq!(ticks.ok(), Some(5));

        let latest = receiver.next().await.unwrap();
        assert!(latest.turn_count >= 1);
        handle.shutdown().await.unwrap();
    }
}
