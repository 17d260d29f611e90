//! An example single-type competitor.

use crate::competitors::Competitor;
use crate::core::organ::{Organ, OrganType, PhotoGland, Propagator};
use crate::core::turn::{Creature, Turn};
use crate::domain::rules::MAX_ORGANS;

pub fn competitor() -> Competitor {
    Competitor {
        name: "SuperPlant",
        module: module_path!(),
        spawn,
    }
}

fn spawn() -> Box<dyn Creature> {
    Box::new(SuperPlant::new())
}

/// Grows one womb and fills every other organ slot with leaves. Once fully
/// grown it spends its strength on as many babies as it can afford, each
/// dropped in a random direction.
#[derive(Debug, Default)]
pub struct SuperPlant {
    womb: Option<Organ<Propagator>>,
    leaf_count: usize,
    all_leaves_grown: bool,
}

impl SuperPlant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enough for a baby to grow its own womb and first leaf.
    pub fn minimum_baby_strength() -> i64 {
        Propagator::creation_cost() + PhotoGland::creation_cost() + 1
    }

    fn grow_organs(&mut self, turn: &mut Turn<'_>) {
        if self.womb.is_none() && turn.strength() > Propagator::creation_cost() {
            self.womb = turn.grow::<Propagator>();
        }
        while self.leaf_count < MAX_ORGANS - 1 && turn.strength() > PhotoGland::creation_cost() {
            if turn.grow::<PhotoGland>().is_none() {
                break;
            }
            self.leaf_count += 1;
        }
        if self.leaf_count == MAX_ORGANS - 1 {
            self.all_leaves_grown = true;
        }
    }

    fn make_babies(&self, turn: &mut Turn<'_>, womb: Organ<Propagator>) {
        let baby = Self::minimum_baby_strength();
        while turn.strength() > baby + Propagator::use_cost() {
            let before = turn.strength();
            let direction = turn.random_direction();
            turn.give_birth(womb, baby, direction, Box::new(SuperPlant::new()));
            if turn.strength() >= before {
                break;
            }
        }
    }
}

impl Creature for SuperPlant {
    fn do_turn(&mut self, turn: &mut Turn<'_>) {
        match self.womb {
            Some(womb) if self.all_leaves_grown => self.make_babies(turn, womb),
            _ => self.grow_organs(turn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_baby_strength() {
        assert_eq!(SuperPlant::minimum_baby_strength(), 301);
    }
}
