use crate::domain::rules;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const COLOURS: [&str; 32] = [
    "#e6194b", "#0082c8", "#f58231", "#911eb4", "#46f0f0", "#f032e6", "#fabebe", "#008080",
    "#e6beff", "#aa6e28", "#800000", "#aaffc3", "#808000", "#ffd8b1", "#000080", "#808080",
    "#e6194b", "#0082c8", "#f58231", "#911eb4", "#46f0f0", "#f032e6", "#fabebe", "#008080",
    "#e6beff", "#aa6e28", "#800000", "#aaffc3", "#808000", "#ffd8b1", "#000080", "#808080",
];
pub const EMPTY_COLOUR: &str = "#fffac8";
pub const PLANT_COLOUR: &str = "#d2f53c";
pub const POISON_COLOUR: &str = "black";

pub fn colour_for(index: usize) -> &'static str {
    COLOURS[index % COLOURS.len()]
}

/// 八個方位，世界邊界會環繞
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub fn dx(self) -> isize {
        match self {
            Direction::N | Direction::S => 0,
            Direction::NE | Direction::E | Direction::SE => 1,
            Direction::SW | Direction::W | Direction::NW => -1,
        }
    }

    pub fn dy(self) -> isize {
        match self {
            Direction::E | Direction::W => 0,
            Direction::SE | Direction::S | Direction::SW => 1,
            Direction::N | Direction::NE | Direction::NW => -1,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::NE => Direction::SW,
            Direction::E => Direction::W,
            Direction::SE => Direction::NW,
            Direction::S => Direction::N,
            Direction::SW => Direction::NE,
            Direction::W => Direction::E,
            Direction::NW => Direction::SE,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Direction {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Index of a competitor within the current match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatureId(pub(crate) u64);

/// What a creature-type sensor reports about a neighbouring cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Appearance {
    Soil,
    Plant,
    Species(SpeciesId),
}

impl Appearance {
    pub fn is_soil(self) -> bool {
        self == Appearance::Soil
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "species", rename_all = "lowercase")]
pub enum Tile {
    Empty,
    Plant,
    Poison,
    Species(usize),
}

impl Tile {
    pub fn colour(self) -> &'static str {
        match self {
            Tile::Empty => EMPTY_COLOUR,
            Tile::Plant => PLANT_COLOUR,
            Tile::Poison => POISON_COLOUR,
            Tile::Species(index) => colour_for(index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub world_width: usize,
    pub interval: Duration,
    pub initial_plant_probability: f64,
    pub plant_growth_probability: f64,
    pub start_strength: i64,
    pub creatures_per_competitor: usize,
    pub max_turns: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: rules::DEFAULT_WORLD_WIDTH,
            interval: Duration::from_millis(rules::DEFAULT_INTERVAL_MS),
            initial_plant_probability: rules::INITIAL_PLANT_PROBABILITY,
            plant_growth_probability: rules::PLANT_GROWTH_PROBABILITY,
            start_strength: rules::START_STRENGTH,
            creatures_per_competitor: rules::CREATURES_PER_COMPETITOR,
            max_turns: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub name: String,
    pub group: String,
    pub colour: String,
}

/// 模擬狀態的快照，送給各個畫面更新用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn_count: u64,
    pub tps: f64,
    pub game_over: bool,
    pub world_width: usize,
    pub entrants: Vec<Entrant>,
    pub counts: Vec<usize>,
    pub tiles: Vec<Tile>,
}

impl Snapshot {
    /// The only surviving entrant, once the match is decided.
    pub fn winner(&self) -> Option<&Entrant> {
        if !self.game_over {
            return None;
        }
        let mut alive = self
            .entrants
            .iter()
            .zip(&self.counts)
            .filter(|(_, count)| **count > 0);
        match (alive.next(), alive.next()) {
            (Some((entrant, _)), None) => Some(entrant),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_cancels_offset() {
        for d in Direction::ALL {
            assert_eq!(d.dx() + d.opposite().dx(), 0);
            assert_eq!(d.dy() + d.opposite().dy(), 0);
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn test_north_is_up() {
        assert_eq!((Direction::N.dx(), Direction::N.dy()), (0, -1));
        assert_eq!((Direction::SE.dx(), Direction::SE.dy()), (1, 1));
        assert_eq!((Direction::W.dx(), Direction::W.dy()), (-1, 0));
    }

    #[test]
    fn test_winner_requires_single_survivor() {
        let entrant = |name: &str| Entrant {
            name: name.to_string(),
            group: "Test".to_string(),
            colour: colour_for(0).to_string(),
        };
        let mut snapshot = Snapshot {
            turn_count: 10,
            tps: 4.0,
            game_over: true,
            world_width: 3,
            entrants: vec![entrant("A"), entrant("B")],
            counts: vec![0, 4],
            tiles: vec![Tile::Empty; 9],
        };
        assert_eq!(snapshot.winner().map(|e| e.name.as_str()), Some("B"));

        snapshot.counts = vec![0, 0];
        assert!(snapshot.winner().is_none());

        snapshot.counts = vec![1, 4];
        snapshot.game_over = false;
        assert!(snapshot.winner().is_none());
    }

    #[test]
    fn test_tile_serializes_with_species_index() {
        let json = serde_json::to_string(&Tile::Species(2)).unwrap();
        assert_eq!(json, r#"{"kind":"species","species":2}"#);
        assert_eq!(Tile::Plant.colour(), PLANT_COLOUR);
    }
}
