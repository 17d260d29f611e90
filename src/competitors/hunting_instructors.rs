//! An example multi-type competitor: a main creature (`Hunter`) and a helper
//! (`LittleHunter`). Here the helper behaves exactly like the hunter; a real
//! strategy would give helpers their own behaviour and choose which to bear
//! based on what the creature sees.

use crate::competitors::Competitor;
use crate::core::organ::{Cilia, CreatureTypeSensor, Organ, OrganType, Propagator};
use crate::core::turn::{Creature, Turn};
use crate::domain::model::{Appearance, Direction};
use crate::domain::rules::MAX_STRENGTH;

pub fn competitor() -> Competitor {
    Competitor {
        name: "Hunter",
        module: module_path!(),
        spawn,
    }
}

fn spawn() -> Box<dyn Creature> {
    Box::new(Hunter::new())
}

/// Grows one cilia, one type sensor and one womb. Each turn it reproduces if
/// strong enough, then attacks the first non-kin creature it sees; if there
/// is none it wanders in a random direction. Babies are `LittleHunter`s.
#[derive(Debug, Default)]
pub struct Hunter {
    cilia: Option<Organ<Cilia>>,
    type_sensor: Option<Organ<CreatureTypeSensor>>,
    womb: Option<Organ<Propagator>>,
}

impl Hunter {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_organs(&mut self, turn: &mut Turn<'_>) {
        if self.cilia.is_none() && turn.strength() > Cilia::creation_cost() {
            self.cilia = turn.grow::<Cilia>();
        }
        if self.type_sensor.is_none() && turn.strength() > CreatureTypeSensor::creation_cost() {
            self.type_sensor = turn.grow::<CreatureTypeSensor>();
        }
        if self.womb.is_none() && turn.strength() > Propagator::creation_cost() {
            self.womb = turn.grow::<Propagator>();
        }
    }

    fn reproduce_if_able(
        &self,
        turn: &mut Turn<'_>,
        sensor: Organ<CreatureTypeSensor>,
        womb: Organ<Propagator>,
    ) {
        if turn.strength() * 10 < MAX_STRENGTH * 9 {
            return;
        }
        for direction in Direction::ALL {
            let nursery = turn.sense_type(sensor, direction);
            if matches!(nursery, Appearance::Soil | Appearance::Plant) {
                let energy = turn.strength() / 2;
                turn.give_birth(womb, energy, direction, Box::new(LittleHunter::new()));
                break;
            }
        }
    }

    fn find_someone_to_attack(
        &self,
        turn: &mut Turn<'_>,
        sensor: Organ<CreatureTypeSensor>,
        cilia: Organ<Cilia>,
    ) -> bool {
        for direction in Direction::ALL {
            let victim = turn.sense_type(sensor, direction);
            if !victim.is_soil() && !turn.is_kin(victim) {
                turn.move_in_direction(cilia, direction);
                return true;
            }
        }
        false
    }
}

impl Creature for Hunter {
    fn do_turn(&mut self, turn: &mut Turn<'_>) {
        match (self.cilia, self.type_sensor, self.womb) {
            (Some(cilia), Some(sensor), Some(womb)) => {
                self.reproduce_if_able(turn, sensor, womb);
                if !self.find_someone_to_attack(turn, sensor, cilia) {
                    let direction = turn.random_direction();
                    turn.move_in_direction(cilia, direction);
                }
            }
            _ => self.create_organs(turn),
        }
    }
}

/// Helper creature. Counted as a `Hunter` because a hunter bore it.
#[derive(Debug, Default)]
pub struct LittleHunter(Hunter);

impl LittleHunter {
    pub fn new() -> Self {
        Self(Hunter::new())
    }
}

impl Creature for LittleHunter {
    fn do_turn(&mut self, turn: &mut Turn<'_>) {
        self.0.do_turn(turn)
    }
}
