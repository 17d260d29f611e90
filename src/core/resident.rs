//! Framework-private state of everything that occupies a cell, and combat.

use crate::core::organ::{OrganKind, OrganState};
use crate::core::turn::Creature;
use crate::domain::model::{Appearance, CreatureId, SpeciesId, Tile};
use crate::domain::rules::{MAINTENANCE_COST, MAX_ORGANS, MAX_STRENGTH, PLANT_SEED_ENERGY};
use std::fmt;

pub(crate) enum Mind {
    Soil,
    Plant,
    PoisonDrop,
    /// `brain` is only `None` while the creature is taking its turn.
    Bug {
        species: SpeciesId,
        brain: Option<Box<dyn Creature>>,
    },
}

impl fmt::Debug for Mind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mind::Soil => f.write_str("Soil"),
            Mind::Plant => f.write_str("Plant"),
            Mind::PoisonDrop => f.write_str("PoisonDrop"),
            Mind::Bug { species, brain } => f
                .debug_struct("Bug")
                .field("species", species)
                .field("thinking", &brain.is_none())
                .finish(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Resident {
    pub(crate) id: CreatureId,
    pub(crate) mind: Mind,
    strength: i64,
    alive: bool,
    organs: Vec<OrganState>,
    cloaked: bool,
    poisonous: bool,
}

impl Resident {
    fn with_mind(id: CreatureId, mind: Mind) -> Self {
        Self {
            id,
            mind,
            strength: 0,
            alive: true,
            organs: Vec::new(),
            cloaked: false,
            poisonous: false,
        }
    }

    pub(crate) fn soil(id: CreatureId) -> Self {
        Self::with_mind(id, Mind::Soil)
    }

    /// 新植物：先給能量，再長出光合腺體與繁殖器官，剛好用完
    pub(crate) fn plant(id: CreatureId) -> Self {
        let mut plant = Self::with_mind(id, Mind::Plant);
        plant.feed(PLANT_SEED_ENERGY);
        plant.add_organ(OrganKind::PhotoGland);
        plant.add_organ(OrganKind::Propagator);
        plant
    }

    /// A drop pays for its poison once; afterwards it ignores energy costs.
    pub(crate) fn poison_drop(id: CreatureId, volume: i64) -> Self {
        let mut drop = Self::with_mind(id, Mind::PoisonDrop);
        drop.feed(1 + volume);
        if let Some(gland) = drop.add_organ(OrganKind::PoisonGland) {
            drop.organs[gland].fill(volume.max(0));
        }
        drop.strength -= volume;
        drop
    }

    pub(crate) fn bug(id: CreatureId, species: SpeciesId, brain: Box<dyn Creature>) -> Self {
        Self::with_mind(
            id,
            Mind::Bug {
                species,
                brain: Some(brain),
            },
        )
    }

    pub(crate) fn strength(&self) -> i64 {
        self.strength
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn is_cloaked(&self) -> bool {
        self.cloaked
    }

    pub(crate) fn species(&self) -> Option<SpeciesId> {
        match self.mind {
            Mind::Bug { species, .. } => Some(species),
            _ => None,
        }
    }

    pub(crate) fn organ_count(&self) -> usize {
        self.organs.len()
    }

    pub(crate) fn organ(&self, index: usize, kind: OrganKind) -> Option<&OrganState> {
        self.organs.get(index).filter(|organ| organ.kind == kind)
    }

    pub(crate) fn organ_mut(&mut self, index: usize, kind: OrganKind) -> Option<&mut OrganState> {
        self.organs.get_mut(index).filter(|organ| organ.kind == kind)
    }

    pub(crate) fn fights_back(&self) -> bool {
        !matches!(self.mind, Mind::Soil | Mind::Plant)
    }

    pub(crate) fn feed(&mut self, energy: i64) {
        if matches!(self.mind, Mind::Soil) {
            return;
        }
        if self.alive {
            self.strength += energy;
        }
    }

    pub(crate) fn expend(&mut self, energy: i64) {
        if matches!(self.mind, Mind::Soil | Mind::PoisonDrop) {
            return;
        }
        self.strength -= energy;
        if self.strength < 0 {
            self.die();
        }
    }

    pub(crate) fn die(&mut self) {
        if matches!(self.mind, Mind::Soil) {
            return;
        }
        self.strength = 0;
        self.alive = false;
    }

    pub(crate) fn cap_strength(&mut self) {
        self.strength = self.strength.min(MAX_STRENGTH);
    }

    pub(crate) fn metabolic_cycle(&mut self) {
        let cloaked = self.cloaked;
        let mut upkeep = Vec::with_capacity(self.organs.len());
        for organ in &mut self.organs {
            organ.new_turn();
            upkeep.push(organ.kind.maintenance_cost(cloaked));
        }
        for cost in upkeep {
            self.expend(cost);
        }
        self.expend(MAINTENANCE_COST);
    }

    /// 器官費用一定要付，但超過上限就不會真的長出來
    pub(crate) fn add_organ(&mut self, kind: OrganKind) -> Option<usize> {
        self.expend(kind.creation_cost());
        if kind == OrganKind::PoisonGland {
            self.poisonous = true;
        }
        if self.organs.len() < MAX_ORGANS {
            self.organs.push(OrganState::new(kind));
            Some(self.organs.len() - 1)
        } else {
            None
        }
    }

    pub(crate) fn would_be_alive_after_use(&mut self, kind: OrganKind) -> bool {
        self.expend(kind.use_cost());
        self.alive
    }

    pub(crate) fn defensive_damage(&self) -> i64 {
        self.organs.iter().map(OrganState::defensive_damage).sum()
    }

    pub(crate) fn apparent_strength(&self) -> i64 {
        if self.cloaked {
            0
        } else {
            self.strength
        }
    }

    pub(crate) fn appearance(&self) -> Appearance {
        if self.cloaked {
            return Appearance::Soil;
        }
        match self.mind {
            Mind::Soil | Mind::PoisonDrop => Appearance::Soil,
            Mind::Plant => Appearance::Plant,
            Mind::Bug { species, .. } => Appearance::Species(species),
        }
    }

    pub(crate) fn appears_poisonous(&self) -> bool {
        self.poisonous && !self.cloaked
    }

    pub(crate) fn cloak(&mut self) {
        self.cloaked = true;
    }

    pub(crate) fn uncloak(&mut self) {
        self.cloaked = false;
    }

    pub(crate) fn tile(&self) -> Tile {
        match self.mind {
            Mind::Soil => Tile::Empty,
            Mind::Plant => Tile::Plant,
            Mind::PoisonDrop => Tile::Poison,
            Mind::Bug { species, .. } => Tile::Species(species.0),
        }
    }
}

/// Resolve a fight. Returns `(winner, loser)`; the loser is already dead.
pub(crate) fn attack(mut attacker: Resident, mut defender: Resident) -> (Resident, Resident) {
    let attacker_wins = if !defender.fights_back() {
        true
    } else if !attacker.fights_back() {
        false
    } else {
        attacker.strength() > defender.strength()
    };

    if attacker_wins {
        attacker.feed(defender.strength() - defender.defensive_damage());
        defender.die();
        (attacker, defender)
    } else {
        defender.feed(attacker.strength() - attacker.defensive_damage());
        attacker.die();
        (defender, attacker)
    }
}
