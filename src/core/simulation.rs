use crate::competitors::Competitor;
use crate::core::world::World;
use crate::domain::model::{Entrant, Settings, Snapshot, SpeciesId};
use std::time::{Duration, Instant};

/// 比賽狀態：世界、參賽者、回合數與速度
pub struct Simulation {
    settings: Settings,
    world: World,
    competitors: Vec<Competitor>,
    interval: Duration,
    running: bool,
    game_over: bool,
    turn_count: u64,
    tps: f64,
    last_start: Option<Instant>,
}

impl Simulation {
    pub fn new(settings: Settings) -> Self {
        let mut world = World::new(settings.world_width, settings.seed);
        world.set_plant_growth_probability(settings.plant_growth_probability);
        Self {
            interval: settings.interval,
            world,
            settings,
            competitors: Vec::new(),
            running: false,
            game_over: false,
            turn_count: 0,
            tps: 0.0,
            last_start: None,
        }
    }

    /// Stop, clear the world and seed a new match with `competitors`.
    pub fn reset(&mut self, competitors: Vec<Competitor>, interval: Duration) {
        self.competitors = competitors;
        self.set_interval(interval);
        self.running = false;
        self.game_over = false;
        self.last_start = None;
        self.turn_count = 0;
        self.tps = 0.0;

        if let Some(seed) = self.settings.seed {
            self.world.reseed(seed);
        }
        self.world.reset();
        self.world
            .grow_initial_plants(self.settings.initial_plant_probability);
        for (index, competitor) in self.competitors.iter().enumerate() {
            self.world.populate(
                SpeciesId(index),
                competitor.spawn,
                self.settings.creatures_per_competitor,
                self.settings.start_strength,
            );
        }

        tracing::info!(
            "🐞 New match: {} competitor(s) on a {}x{} world",
            self.competitors.len(),
            self.world.width(),
            self.world.width()
        );
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&mut self) {
        self.last_start = None;
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn turn_count(&self) -> u64 {
        self.turn_count
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }

    /// Play one world turn.
    pub fn step(&mut self) {
        self.calculate_tps(Instant::now());
        self.world.do_turn();
        self.turn_count += 1;
        self.check_win();
        tracing::debug!(turn = self.turn_count, tps = self.tps, "turn complete");
    }

    fn calculate_tps(&mut self, start: Instant) {
        match self.last_start {
            Some(last) => {
                let elapsed = start.duration_since(last).as_secs_f64();
                if elapsed > 0.0 {
                    let latest = 1.0 / elapsed;
                    self.tps = (0.8 * self.tps + latest) / 1.8;
                }
            }
            None => self.tps = 4.0,
        }
        self.last_start = Some(start);
    }

    /// 只剩一個（或沒有）物種存活時比賽結束
    fn check_win(&mut self) {
        if self.competitors.is_empty() {
            return;
        }
        let live = self
            .counts()
            .into_iter()
            .filter(|count| *count > 0)
            .count();
        if live <= 1 {
            self.game_over = true;
            tracing::info!("🏁 Game over after {} turns", self.turn_count);
        }
    }

    pub fn counts(&self) -> Vec<usize> {
        self.world.census(self.competitors.len())
    }

    pub fn entrants(&self) -> Vec<Entrant> {
        self.competitors
            .iter()
            .enumerate()
            .map(|(index, competitor)| competitor.entrant(index))
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turn_count: self.turn_count,
            tps: self.tps,
            game_over: self.game_over,
            world_width: self.world.width(),
            entrants: self.entrants(),
            counts: self.counts(),
            tiles: self.world.tiles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitors;

    fn settings() -> Settings {
        Settings {
            world_width: 20,
            seed: Some(42),
            ..Settings::default()
        }
    }

    #[test]
    fn test_reset_populates_and_stops() {
        let mut sim = Simulation::new(settings());
        let chosen =
            competitors::select(&["Hunter".to_string(), "SuperPlant".to_string()]).unwrap();
        sim.reset(chosen, Duration::from_millis(100));

        assert!(!sim.is_running());
        assert_eq!(sim.turn_count(), 0);
        assert_eq!(sim.interval(), Duration::from_millis(100));
        let counts = sim.counts();
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|c| *c >= 1 && *c <= 3));

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.entrants[0].name, "Hunter");
        assert_eq!(snapshot.tiles.len(), 400);
    }

    #[test]
    fn test_first_turn_reports_four_tps() {
        let mut sim = Simulation::new(settings());
        sim.reset(competitors::roster(), Duration::ZERO);
        sim.start();
        sim.step();
        assert_eq!(sim.tps(), 4.0);
        assert_eq!(sim.turn_count(), 1);
    }

    #[test]
    fn test_single_competitor_wins_immediately() {
        let mut sim = Simulation::new(settings());
        sim.reset(competitors::select(&["Hunter".to_string()]).unwrap(), Duration::ZERO);
        sim.start();
        sim.step();
        assert!(sim.is_game_over());
        assert_eq!(sim.snapshot().winner().map(|e| e.name.clone()), Some("Hunter".to_string()));
    }

    #[test]
    fn test_same_seed_same_battle() {
        let run = || {
            let mut sim = Simulation::new(settings());
            sim.reset(competitors::roster(), Duration::ZERO);
            sim.start();
            for _ in 0..25 {
                sim.step();
            }
            sim.snapshot()
        };
        let first = run();
        let second = run();
        assert_eq!(first.tiles, second.tiles);
        assert_eq!(first.counts, second.counts);
    }

    #[test]
    fn test_no_competitors_never_ends() {
        let mut sim = Simulation::new(settings());
        sim.reset(Vec::new(), Duration::ZERO);
        sim.start();
        sim.step();
        assert!(!sim.is_game_over());
    }
}
