//! The competitor-facing API.
//!
//! A competitor is any type implementing [`Creature`]. Once per world turn
//! the framework calls [`Creature::do_turn`] with a [`Turn`], which is the
//! only way a creature can look at or change the world. Everything the
//! framework keeps for itself (strength bookkeeping, location, combat,
//! the census) is crate-private and cannot be reached from here.

use crate::core::organ::{
    Cilia, Cloaking, CreatureTypeSensor, EnergySensor, LifeSensor, Organ, OrganKind, OrganType,
    PoisonGland, PoisonSensor, Propagator,
};
use crate::core::resident::Resident;
use crate::core::world::World;
use crate::domain::model::{Appearance, CreatureId, Direction, SpeciesId};
use rand::rngs::StdRng;

/// Behaviour of a competitor creature.
///
/// Helper types born from a creature (via [`Turn::give_birth`]) always
/// belong to the parent's species, so a multi-type strategy is counted as
/// one competitor.
pub trait Creature: Send {
    fn do_turn(&mut self, turn: &mut Turn<'_>);
}

pub(crate) enum Offspring {
    Plant,
    Bug(Box<dyn Creature>),
}

pub struct Turn<'w> {
    world: &'w mut World,
    me: CreatureId,
    location: Option<usize>,
    species: Option<SpeciesId>,
}

impl<'w> Turn<'w> {
    pub(crate) fn new(
        world: &'w mut World,
        me: CreatureId,
        location: usize,
        species: Option<SpeciesId>,
    ) -> Self {
        Self {
            world,
            me,
            location: Some(location),
            species,
        }
    }

    /// Where the acting creature is now, if it is still in the world.
    pub(crate) fn location(&self) -> Option<usize> {
        self.location.filter(|&index| self.world.is_at(self.me, index))
    }

    fn host(&self) -> Option<&Resident> {
        let index = self.location()?;
        Some(self.world.resident(index))
    }

    fn host_mut(&mut self) -> Option<&mut Resident> {
        let index = self.location()?;
        Some(self.world.resident_mut(index))
    }

    /// 確認器官存在且種類正確，再付使用費用
    fn use_organ(&mut self, index: usize, kind: OrganKind) -> Option<usize> {
        let location = self.location()?;
        let host = self.world.resident_mut(location);
        host.organ(index, kind)?;
        if host.would_be_alive_after_use(kind) {
            Some(location)
        } else {
            None
        }
    }

    pub fn strength(&self) -> i64 {
        self.host().map(Resident::strength).unwrap_or(0)
    }

    pub fn is_alive(&self) -> bool {
        self.host().is_some_and(Resident::is_alive)
    }

    pub fn is_cloaked(&self) -> bool {
        self.host().is_some_and(Resident::is_cloaked)
    }

    pub fn species(&self) -> Option<SpeciesId> {
        self.species
    }

    /// True if `appearance` is a member of the acting creature's species.
    pub fn is_kin(&self, appearance: Appearance) -> bool {
        matches!(
            (appearance, self.species),
            (Appearance::Species(other), Some(mine)) if other == mine
        )
    }

    pub fn organ_count(&self) -> usize {
        self.host().map(Resident::organ_count).unwrap_or(0)
    }

    pub fn random_direction(&mut self) -> Direction {
        Direction::random(self.world.rng())
    }

    pub fn rng(&mut self) -> &mut StdRng {
        self.world.rng()
    }

    /// Grow an organ, paying its creation cost. Returns `None` when the
    /// creature already carries the maximum number of organs (the cost is
    /// still paid) or has left the world.
    pub fn grow<K: OrganType>(&mut self) -> Option<Organ<K>> {
        let host = self.host_mut()?;
        let index = host.add_organ(K::KIND)?;
        tracing::trace!(organ = %K::KIND, strength = host.strength(), "organ grown");
        Some(Organ::new(index))
    }

    /// Move one cell, attacking whatever occupies it. Each attempt pays the
    /// use cost; only the first attempt in a turn actually moves.
    pub fn move_in_direction(&mut self, cilia: Organ<Cilia>, direction: Direction) -> bool {
        let Some(location) = self.use_organ(cilia.index(), OrganKind::Cilia) else {
            return false;
        };
        let host = self.world.resident_mut(location);
        let Some(organ) = host.organ_mut(cilia.index(), OrganKind::Cilia) else {
            return false;
        };
        if organ.uses_this_turn() != 0 {
            return false;
        }
        organ.used_once();

        let (target, winner) = self.world.move_resident(location, direction);
        if winner == self.me {
            self.location = Some(target);
            true
        } else {
            self.location = None;
            false
        }
    }

    fn sense<T>(
        &mut self,
        index: usize,
        kind: OrganKind,
        direction: Direction,
        default: T,
        read: impl FnOnce(&Resident) -> T,
    ) -> T {
        match self.use_organ(index, kind) {
            Some(location) => {
                let target = self.world.offset(location, direction);
                read(self.world.resident(target))
            }
            None => default,
        }
    }

    pub fn sense_energy(&mut self, sensor: Organ<EnergySensor>, direction: Direction) -> i64 {
        self.sense(
            sensor.index(),
            OrganKind::EnergySensor,
            direction,
            0,
            Resident::apparent_strength,
        )
    }

    pub fn sense_type(
        &mut self,
        sensor: Organ<CreatureTypeSensor>,
        direction: Direction,
    ) -> Appearance {
        self.sense(
            sensor.index(),
            OrganKind::CreatureTypeSensor,
            direction,
            Appearance::Soil,
            Resident::appearance,
        )
    }

    pub fn sense_life(&mut self, sensor: Organ<LifeSensor>, direction: Direction) -> bool {
        self.sense(sensor.index(), OrganKind::LifeSensor, direction, false, |target| {
            !target.appearance().is_soil()
        })
    }

    pub fn sense_poison(&mut self, sensor: Organ<PoisonSensor>, direction: Direction) -> bool {
        self.sense(
            sensor.index(),
            OrganKind::PoisonSensor,
            direction,
            false,
            Resident::appears_poisonous,
        )
    }

    /// Spend `energy` on a child of this creature's species and drop it
    /// beside the parent, where it fights for the cell. Returns true if the
    /// child ended up in the world.
    pub fn give_birth(
        &mut self,
        womb: Organ<Propagator>,
        energy: i64,
        direction: Direction,
        child: Box<dyn Creature>,
    ) -> bool {
        if self.species.is_none() {
            return false;
        }
        self.give_birth_to(womb, energy, direction, Offspring::Bug(child))
    }

    pub(crate) fn give_birth_to(
        &mut self,
        womb: Organ<Propagator>,
        energy: i64,
        direction: Direction,
        offspring: Offspring,
    ) -> bool {
        if energy < 0 {
            return false;
        }
        let Some(host) = self.host_mut() else {
            return false;
        };
        if host.organ(womb.index(), OrganKind::Propagator).is_none() {
            return false;
        }
        host.expend(energy);
        if !host.would_be_alive_after_use(OrganKind::Propagator) {
            return false;
        }
        let Some(location) = self.location() else {
            return false;
        };

        let id = self.world.next_id();
        let mut child = match offspring {
            Offspring::Plant => Resident::plant(id),
            Offspring::Bug(brain) => match self.species {
                Some(species) => Resident::bug(id, species, brain),
                None => return false,
            },
        };
        child.feed(energy);
        let (_, winner) = self.world.drop_beside(location, child, direction);
        winner == id
    }

    pub fn cloak(&mut self, cloaking: Organ<Cloaking>) -> bool {
        match self.use_organ(cloaking.index(), OrganKind::Cloaking) {
            Some(location) => {
                self.world.resident_mut(location).cloak();
                true
            }
            None => false,
        }
    }

    pub fn uncloak(&mut self, cloaking: Organ<Cloaking>) {
        if let Some(host) = self.host_mut() {
            if host.organ(cloaking.index(), OrganKind::Cloaking).is_some() {
                host.uncloak();
            }
        }
    }

    /// Move up to `amount` of the creature's own strength into the gland.
    pub fn add_poison(&mut self, gland: Organ<PoisonGland>, amount: i64) {
        if amount <= 0 {
            return;
        }
        let Some(host) = self.host_mut() else {
            return;
        };
        if host.organ(gland.index(), OrganKind::PoisonGland).is_none() {
            return;
        }
        let amount = host.strength().min(amount).max(0);
        host.expend(amount);
        if let Some(organ) = host.organ_mut(gland.index(), OrganKind::PoisonGland) {
            organ.fill(amount);
        }
    }

    pub fn remove_poison(&mut self, gland: Organ<PoisonGland>, amount: i64) {
        if let Some(organ) = self
            .host_mut()
            .and_then(|host| host.organ_mut(gland.index(), OrganKind::PoisonGland))
        {
            organ.drain(amount);
        }
    }

    pub fn poison_volume(&self, gland: Organ<PoisonGland>) -> i64 {
        self.host()
            .and_then(|host| host.organ(gland.index(), OrganKind::PoisonGland))
            .map(|organ| organ.reservoir())
            .unwrap_or(0)
    }

    /// 從腺體取出毒液，在旁邊留下一滴毒
    pub fn drop_poison(&mut self, gland: Organ<PoisonGland>, direction: Direction, volume: i64) {
        if volume <= 0 {
            return;
        }
        let Some(location) = self.location() else {
            return;
        };
        let Some(organ) = self
            .world
            .resident_mut(location)
            .organ_mut(gland.index(), OrganKind::PoisonGland)
        else {
            return;
        };
        let volume = organ.reservoir().min(volume);
        organ.drain(volume);

        let id = self.world.next_id();
        let drop = Resident::poison_drop(id, volume);
        self.world.drop_beside(location, drop, direction);
    }
}
