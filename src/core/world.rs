//! The square, edge-wrapping world and its turn cycle.

use crate::core::organ::{Organ, OrganKind, Propagator};
use crate::core::resident::{attack, Mind, Resident};
use crate::core::turn::{Creature, Offspring, Turn};
use crate::domain::model::{CreatureId, Direction, SpeciesId, Tile};
use crate::domain::rules::{self, MAX_STRENGTH};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Plants grow their photo gland first, so the propagator is always second.
const PLANT_PROPAGATOR: usize = 1;

pub struct World {
    width: usize,
    cells: Vec<Resident>,
    rng: StdRng,
    next_id: u64,
    plant_growth_probability: f64,
}

impl World {
    pub fn new(width: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut world = Self {
            width,
            cells: Vec::new(),
            rng,
            next_id: 0,
            plant_growth_probability: rules::PLANT_GROWTH_PROBABILITY,
        };
        world.reset();
        world
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn set_plant_growth_probability(&mut self, probability: f64) {
        self.plant_growth_probability = probability;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub(crate) fn next_id(&mut self) -> CreatureId {
        self.next_id += 1;
        CreatureId(self.next_id)
    }

    pub(crate) fn new_soil(&mut self) -> Resident {
        let id = self.next_id();
        Resident::soil(id)
    }

    /// 整個世界重新鋪滿泥土
    pub fn reset(&mut self) {
        let size = self.width * self.width;
        let mut cells = Vec::with_capacity(size);
        for _ in 0..size {
            cells.push(self.new_soil());
        }
        self.cells = cells;
    }

    pub(crate) fn place(&mut self, resident: Resident, index: usize) {
        self.cells[index] = resident;
    }

    pub(crate) fn resident(&self, index: usize) -> &Resident {
        &self.cells[index]
    }

    pub(crate) fn resident_mut(&mut self, index: usize) -> &mut Resident {
        &mut self.cells[index]
    }

    pub(crate) fn is_at(&self, id: CreatureId, index: usize) -> bool {
        self.cells.get(index).is_some_and(|resident| resident.id == id)
    }

    /// Swap in `replacement` if `id` still occupies `index`.
    pub(crate) fn replace(&mut self, id: CreatureId, index: usize, replacement: Resident) -> bool {
        if self.is_at(id, index) {
            self.place(replacement, index);
            true
        } else {
            false
        }
    }

    pub fn offset(&self, start: usize, direction: Direction) -> usize {
        let width = self.width as isize;
        let x = (start as isize % width + direction.dx()).rem_euclid(width);
        let y = (start as isize / width + direction.dy()).rem_euclid(width);
        (y * width + x) as usize
    }

    /// 移動者離開原位（補上泥土），再攻擊目標格，勝者佔據目標格
    pub(crate) fn move_resident(
        &mut self,
        start: usize,
        direction: Direction,
    ) -> (usize, CreatureId) {
        let soil = self.new_soil();
        let mover = std::mem::replace(&mut self.cells[start], soil);
        let target = self.offset(start, direction);
        let winner = self.launch_attack(target, mover);
        (target, winner)
    }

    pub(crate) fn drop_beside(
        &mut self,
        origin: usize,
        child: Resident,
        direction: Direction,
    ) -> (usize, CreatureId) {
        let target = self.offset(origin, direction);
        let winner = self.launch_attack(target, child);
        (target, winner)
    }

    fn launch_attack(&mut self, battleground: usize, attacker: Resident) -> CreatureId {
        let soil = self.new_soil();
        let defender = std::mem::replace(&mut self.cells[battleground], soil);
        let (winner, loser) = attack(attacker, defender);
        tracing::trace!(winner = ?winner.id, loser = ?loser.id, battleground, "fight");
        let winner_id = winner.id;
        self.place(winner, battleground);
        winner_id
    }

    pub fn grow_initial_plants(&mut self, probability: f64) {
        for index in 0..self.cells.len() {
            if self.rng.gen::<f64>() < probability {
                let id = self.next_id();
                self.place(Resident::plant(id), index);
            }
        }
    }

    /// Drop `count` fresh creatures of a species at random cells, possibly
    /// on top of creatures that were already there.
    pub fn populate(
        &mut self,
        species: SpeciesId,
        spawn: fn() -> Box<dyn Creature>,
        count: usize,
        start_strength: i64,
    ) {
        if self.cells.is_empty() {
            return;
        }
        for _ in 0..count {
            let id = self.next_id();
            let mut creature = Resident::bug(id, species, spawn());
            creature.feed(start_strength);
            let index = self.rng.gen_range(0..self.cells.len());
            self.place(creature, index);
        }
    }

    /// 一個世界回合：先代謝，再讓回合開始時在場的每位居民各行動一次，最後清走死者
    pub fn do_turn(&mut self) {
        for resident in &mut self.cells {
            resident.metabolic_cycle();
        }

        let roster: Vec<(usize, CreatureId)> = self
            .cells
            .iter()
            .enumerate()
            .map(|(index, resident)| (index, resident.id))
            .collect();

        for (index, id) in roster {
            if !self.is_at(id, index) || !self.cells[index].is_alive() {
                continue;
            }
            if let Some(location) = self.act(index) {
                if self.is_at(id, location) {
                    self.cells[location].cap_strength();
                }
            }
        }

        self.sweep_dead();
    }

    fn act(&mut self, index: usize) -> Option<usize> {
        match self.cells[index].mind {
            Mind::Soil => {
                if self.rng.gen::<f64>() < self.plant_growth_probability {
                    let soil = self.cells[index].id;
                    let id = self.next_id();
                    self.replace(soil, index, Resident::plant(id));
                    return None;
                }
                Some(index)
            }
            Mind::Plant => {
                let strength = self.cells[index].strength();
                if strength > MAX_STRENGTH {
                    let id = self.cells[index].id;
                    let direction = Direction::random(&mut self.rng);
                    let mut turn = Turn::new(self, id, index, None);
                    turn.give_birth_to(
                        Organ::<Propagator>::new(PLANT_PROPAGATOR),
                        strength / 2,
                        direction,
                        Offspring::Plant,
                    );
                    return turn.location();
                }
                Some(index)
            }
            Mind::PoisonDrop => {
                let drop = &mut self.cells[index];
                if let Some(gland) = drop.organ_mut(0, OrganKind::PoisonGland) {
                    let volume = gland.reservoir();
                    gland.drain(rules::poison_dissipation(volume));
                    if gland.reservoir() <= 0 {
                        drop.die();
                    }
                }
                Some(index)
            }
            Mind::Bug { .. } => self.bug_turn(index),
        }
    }

    fn bug_turn(&mut self, index: usize) -> Option<usize> {
        let id = self.cells[index].id;
        let species = self.cells[index].species();
        let brain = match &mut self.cells[index].mind {
            Mind::Bug { brain, .. } => brain.take(),
            _ => None,
        };
        let Some(mut brain) = brain else {
            return Some(index);
        };

        let location = {
            let mut turn = Turn::new(self, id, index, species);
            brain.do_turn(&mut turn);
            turn.location()
        };

        if let Some(location) = location {
            if let Mind::Bug { brain: slot, .. } = &mut self.cells[location].mind {
                *slot = Some(brain);
            }
        }
        location
    }

    fn sweep_dead(&mut self) {
        for index in 0..self.cells.len() {
            if !self.cells[index].is_alive() {
                let soil = self.new_soil();
                self.place(soil, index);
            }
        }
    }

    /// 每個物種目前存活的數量
    pub fn census(&self, species_count: usize) -> Vec<usize> {
        let mut counts = vec![0; species_count];
        for resident in &self.cells {
            if let Some(species) = resident.species() {
                if resident.is_alive() && species.0 < species_count {
                    counts[species.0] += 1;
                }
            }
        }
        counts
    }

    pub fn tiles(&self) -> Vec<Tile> {
        self.cells.iter().map(Resident::tile).collect()
    }

    pub fn tile_at(&self, index: usize) -> Option<Tile> {
        self.cells.get(index).map(Resident::tile)
    }

    pub fn strength_at(&self, index: usize) -> Option<i64> {
        self.cells.get(index).map(Resident::strength)
    }

    pub fn plant_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|resident| matches!(resident.mind, Mind::Plant))
            .count()
    }
}
