//! Lab 6 entry, Brown & Gillingham.
//!
//! `BugKilla` hunts: it only picks fights it can see it will win, eats
//! plants, and runs from anything stronger. When it is nearly full it bears
//! a `MiniBugKilla`, a stationary nest that photosynthesises and keeps
//! hatching new hunters.

use crate::competitors::Competitor;
use crate::core::organ::{
    Cilia, CreatureTypeSensor, EnergySensor, Organ, OrganType, PhotoGland, Propagator, Spikes,
};
use crate::core::turn::{Creature, Turn};
use crate::domain::model::{Appearance, Direction};
use crate::domain::rules::MAX_STRENGTH;

const SPIKES_THRESHOLD: i64 = 600;
const NEST_LEAVES: usize = 4;

pub fn competitor() -> Competitor {
    Competitor {
        name: "BugKilla",
        module: module_path!(),
        spawn,
    }
}

fn spawn() -> Box<dyn Creature> {
    Box::new(BugKilla::new())
}

fn nearly_full(turn: &Turn<'_>) -> bool {
    turn.strength() * 10 >= MAX_STRENGTH * 9
}

#[derive(Debug, Default)]
pub struct BugKilla {
    cilia: Option<Organ<Cilia>>,
    type_sensor: Option<Organ<CreatureTypeSensor>>,
    energy_sensor: Option<Organ<EnergySensor>>,
    womb: Option<Organ<Propagator>>,
    spikes: Option<Organ<Spikes>>,
}

#[derive(Debug, Clone, Copy)]
struct Kit {
    cilia: Organ<Cilia>,
    eyes: Organ<CreatureTypeSensor>,
    gauge: Organ<EnergySensor>,
    womb: Organ<Propagator>,
}

impl BugKilla {
    pub fn new() -> Self {
        Self::default()
    }

    fn kit(&self) -> Option<Kit> {
        Some(Kit {
            cilia: self.cilia?,
            eyes: self.type_sensor?,
            gauge: self.energy_sensor?,
            womb: self.womb?,
        })
    }

    fn create_organs(&mut self, turn: &mut Turn<'_>) {
        if self.cilia.is_none() && turn.strength() > Cilia::creation_cost() {
            self.cilia = turn.grow::<Cilia>();
        }
        if self.type_sensor.is_none() && turn.strength() > CreatureTypeSensor::creation_cost() {
            self.type_sensor = turn.grow::<CreatureTypeSensor>();
        }
        if self.energy_sensor.is_none() && turn.strength() > EnergySensor::creation_cost() {
            self.energy_sensor = turn.grow::<EnergySensor>();
        }
        if self.womb.is_none() && turn.strength() > Propagator::creation_cost() {
            self.womb = turn.grow::<Propagator>();
        }
    }

    fn reproduce_if_able(&self, turn: &mut Turn<'_>, kit: Kit) -> bool {
        if !nearly_full(turn) {
            return false;
        }
        for direction in Direction::ALL {
            let nursery = turn.sense_type(kit.eyes, direction);
            if matches!(nursery, Appearance::Soil | Appearance::Plant) {
                let energy = turn.strength() / 2;
                return turn.give_birth(kit.womb, energy, direction, Box::new(MiniBugKilla::new()));
            }
        }
        false
    }

    /// 先找植物吃，再找打得贏的對手；看到更強的就往反方向逃
    fn hunt(&self, turn: &mut Turn<'_>, kit: Kit) {
        let mut threat = None;
        for direction in Direction::ALL {
            let seen = turn.sense_type(kit.eyes, direction);
            match seen {
                Appearance::Plant => {
                    turn.move_in_direction(kit.cilia, direction);
                    return;
                }
                Appearance::Species(_) if !turn.is_kin(seen) => {
                    let theirs = turn.sense_energy(kit.gauge, direction);
                    if turn.strength() > theirs {
                        turn.move_in_direction(kit.cilia, direction);
                        return;
                    }
                    threat.get_or_insert(direction);
                }
                _ => {}
            }
        }

        let direction = match threat {
            Some(danger) => danger.opposite(),
            None => turn.random_direction(),
        };
        turn.move_in_direction(kit.cilia, direction);
    }
}

impl Creature for BugKilla {
    fn do_turn(&mut self, turn: &mut Turn<'_>) {
        let Some(kit) = self.kit() else {
            self.create_organs(turn);
            return;
        };
        if self.spikes.is_none() && turn.strength() > SPIKES_THRESHOLD {
            self.spikes = turn.grow::<Spikes>();
        }
        if !self.reproduce_if_able(turn, kit) {
            self.hunt(turn, kit);
        }
    }
}

/// Stationary nest. Counted as a `BugKilla`.
#[derive(Debug, Default)]
pub struct MiniBugKilla {
    womb: Option<Organ<Propagator>>,
    leaves: usize,
}

impl MiniBugKilla {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Creature for MiniBugKilla {
    fn do_turn(&mut self, turn: &mut Turn<'_>) {
        if self.womb.is_none() && turn.strength() > Propagator::creation_cost() {
            self.womb = turn.grow::<Propagator>();
        }
        while self.leaves < NEST_LEAVES && turn.strength() > PhotoGland::creation_cost() {
            if turn.grow::<PhotoGland>().is_none() {
                break;
            }
            self.leaves += 1;
        }
        if let Some(womb) = self.womb {
            if nearly_full(turn) {
                let energy = turn.strength() / 2;
                let direction = turn.random_direction();
                turn.give_birth(womb, energy, direction, Box::new(BugKilla::new()));
            }
        }
    }
}
