//! Framework constants. Competitors may read these but the framework owns them.

pub const MAX_STRENGTH: i64 = 2000;
pub const MAINTENANCE_COST: i64 = 20;
pub const MAX_ORGANS: usize = 10;

pub const START_STRENGTH: i64 = 1500;
pub const CREATURES_PER_COMPETITOR: usize = 3;
pub const INITIAL_PLANT_PROBABILITY: f64 = 0.12;
pub const PLANT_GROWTH_PROBABILITY: f64 = 0.01;

/// 植物出生時自帶的能量，剛好付清光合腺體和繁殖器官
pub const PLANT_SEED_ENERGY: i64 = 300;

pub const POISON_RESERVOIR_CAPACITY: i64 = 1000;
pub const POISON_DAMAGE_MULTIPLIER: i64 = 4;
pub const SPIKES_DEFENSIVE_DAMAGE: i64 = 200;

pub const DEFAULT_WORLD_WIDTH: usize = 100;
pub const MIN_WORLD_WIDTH: usize = 3;
pub const DEFAULT_INTERVAL_MS: u64 = 250;
pub const MAX_INTERVAL_MS: u64 = 1000;
/// Headless battles stop here when no turn limit is configured.
pub const DEFAULT_MAX_TURNS: u64 = 5000;

/// 毒滴每回合蒸發一半（無條件進位）
pub fn poison_dissipation(volume: i64) -> i64 {
    if volume <= 0 {
        0
    } else {
        (volume + 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poison_dissipation_rounds_up() {
        assert_eq!(poison_dissipation(0), 0);
        assert_eq!(poison_dissipation(1), 1);
        assert_eq!(poison_dissipation(5), 3);
        assert_eq!(poison_dissipation(1000), 500);
    }
}
