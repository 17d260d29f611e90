//! Organs a creature can grow, their cost table, and the typed handles
//! competitors use to operate them.

use crate::domain::rules::{
    POISON_DAMAGE_MULTIPLIER, POISON_RESERVOIR_CAPACITY, SPIKES_DEFENSIVE_DAMAGE,
};
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrganKind {
    Cilia,
    PhotoGland,
    Propagator,
    Cloaking,
    EnergySensor,
    CreatureTypeSensor,
    LifeSensor,
    PoisonSensor,
    PoisonGland,
    Spikes,
}

impl OrganKind {
    pub const fn creation_cost(self) -> i64 {
        match self {
            OrganKind::Cilia => 100,
            OrganKind::PhotoGland => 250,
            OrganKind::Propagator => 50,
            OrganKind::Cloaking => 500,
            OrganKind::EnergySensor | OrganKind::CreatureTypeSensor => 100,
            OrganKind::LifeSensor | OrganKind::PoisonSensor => 50,
            OrganKind::PoisonGland => 500,
            OrganKind::Spikes => 100,
        }
    }

    /// 使用一次的花費；沒有主動功能的器官為 0
    pub const fn use_cost(self) -> i64 {
        match self {
            OrganKind::Cilia => 20,
            OrganKind::Propagator | OrganKind::Cloaking => 100,
            OrganKind::EnergySensor | OrganKind::CreatureTypeSensor => 2,
            OrganKind::LifeSensor | OrganKind::PoisonSensor => 1,
            OrganKind::PhotoGland | OrganKind::PoisonGland | OrganKind::Spikes => 0,
        }
    }

    /// Per-turn upkeep. Negative values produce energy.
    pub const fn maintenance_cost(self, host_cloaked: bool) -> i64 {
        match self {
            OrganKind::Cilia => 10,
            OrganKind::PhotoGland => -150,
            OrganKind::Propagator => 5,
            OrganKind::Cloaking => {
                if host_cloaked {
                    10 + 100
                } else {
                    10
                }
            }
            OrganKind::EnergySensor | OrganKind::CreatureTypeSensor => 10,
            OrganKind::LifeSensor | OrganKind::PoisonSensor => 5,
            OrganKind::PoisonGland => 20,
            OrganKind::Spikes => 5,
        }
    }
}

impl fmt::Display for OrganKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrganState {
    pub(crate) kind: OrganKind,
    uses_this_turn: u32,
    reservoir: i64,
}

impl OrganState {
    pub(crate) fn new(kind: OrganKind) -> Self {
        Self {
            kind,
            uses_this_turn: 0,
            reservoir: 0,
        }
    }

    pub(crate) fn new_turn(&mut self) {
        self.uses_this_turn = 0;
    }

    pub(crate) fn used_once(&mut self) {
        self.uses_this_turn += 1;
    }

    pub(crate) fn uses_this_turn(&self) -> u32 {
        self.uses_this_turn
    }

    pub(crate) fn defensive_damage(&self) -> i64 {
        match self.kind {
            OrganKind::Spikes => SPIKES_DEFENSIVE_DAMAGE,
            OrganKind::PoisonGland => self.reservoir * POISON_DAMAGE_MULTIPLIER,
            _ => 0,
        }
    }

    pub(crate) fn reservoir(&self) -> i64 {
        self.reservoir
    }

    pub(crate) fn fill(&mut self, amount: i64) {
        self.reservoir = (self.reservoir + amount).min(POISON_RESERVOIR_CAPACITY);
    }

    pub(crate) fn drain(&mut self, amount: i64) {
        if amount > 0 {
            self.reservoir = (self.reservoir - amount).max(0);
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Marker for organ kinds a creature can grow.
pub trait OrganType: sealed::Sealed {
    const KIND: OrganKind;

    fn creation_cost() -> i64 {
        Self::KIND.creation_cost()
    }

    fn use_cost() -> i64 {
        Self::KIND.use_cost()
    }
}

macro_rules! organ_types {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name;

            impl sealed::Sealed for $name {}

            impl OrganType for $name {
                const KIND: OrganKind = OrganKind::$name;
            }
        )*
    };
}

organ_types!(
    /// Moves the host one cell per turn, attacking whatever is there.
    Cilia,
    /// Photosynthesis: negative upkeep.
    PhotoGland,
    /// Gives birth to children of the host's species.
    Propagator,
    Cloaking,
    EnergySensor,
    CreatureTypeSensor,
    LifeSensor,
    PoisonSensor,
    PoisonGland,
    Spikes,
);

/// Handle to an organ grown by the acting creature.
///
/// Handles are only meaningful for the creature that grew them. Using a
/// handle on any other creature is harmless: the operation does nothing and
/// sensors return their default reading.
pub struct Organ<K> {
    index: usize,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Organ<K> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            _kind: PhantomData,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl<K> Clone for Organ<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Organ<K> {}

impl<K> PartialEq for Organ<K> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<K> Eq for Organ<K> {}

impl<K: OrganType> fmt::Debug for Organ<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Organ<{}>#{}", K::KIND, self.index)
    }
}
