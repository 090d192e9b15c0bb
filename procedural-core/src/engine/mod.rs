//! Simulation top loop.
//!
//! [`Simulation`] owns the level, the avatar, the adversary list and the
//! in-flight projectiles, and advances them in a fixed order each tick:
//!
//! 1. pending level advance (auto-advance from the previous tick)
//! 2. avatar update (movement, facing, melee)
//! 3. concealment predicate
//! 4. adversaries in list order
//! 5. projectiles against the avatar
//! 6. death / level-clear bookkeeping
//! 7. checksum on cadence
//!
//! Nothing in a tick blocks or fails. Presentation collaborators read the
//! accessors and drain events between ticks.

pub mod config;

pub use config::{ConfigError, SimConfig};

use glam::Vec2;
use tracing::{debug, info};

use crate::checksum::{world_hash, ChecksumRecord, ChecksumVerifier};
use crate::combat::Projectile;
use crate::constants::CONCEAL_REVEAL_RADIUS;
use crate::entity::{Entity, EntityId, PerkKind};
use crate::events::{EventLog, SimEvent};
use crate::generation::{Biome, Level, LevelManager, SeedHierarchy, WorldSeed};
use crate::monster::{Adversary, AdversaryContext};
use crate::player::{Avatar, AvatarContext, PlayerInput};
use crate::world::{world_to_tile, TileGrid, TilePos};

pub struct Simulation {
    config: SimConfig,
    levels: LevelManager,
    seeds: SeedHierarchy,
    biome: Biome,
    grid: TileGrid,
    avatar: Avatar,
    adversaries: Vec<Adversary>,
    projectiles: Vec<Projectile>,
    tick: u64,
    checksums: ChecksumVerifier,
    events: EventLog,
    avatar_concealed: bool,
    cleared: bool,
    death_reported: bool,
    pending_advance: bool,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let levels = LevelManager::new(WorldSeed::new(config.root_seed));
        let Level {
            seeds,
            biome,
            grid,
            avatar_tile,
            adversaries,
            ..
        } = levels.build(&config);
        let checksums = ChecksumVerifier::new(config.checksum_interval);

        Ok(Self {
            config,
            levels,
            seeds,
            biome,
            grid,
            avatar: Avatar::spawn(avatar_tile),
            adversaries,
            projectiles: Vec::new(),
            tick: 0,
            checksums,
            events: EventLog::default(),
            avatar_concealed: false,
            cleared: false,
            death_reported: false,
            pending_advance: false,
        })
    }

    /// Advance one tick. Returns the checksum record if one was due.
    pub fn step(&mut self, input: &PlayerInput) -> Option<ChecksumRecord> {
        if self.pending_advance {
            self.advance();
        }
        self.tick += 1;

        let mut ctx = AvatarContext {
            input,
            grid: &mut self.grid,
            others: &mut self.adversaries,
            events: &mut self.events,
        };
        self.avatar.update(&mut ctx);

        self.avatar_concealed = self.compute_concealment();
        self.update_adversaries();
        self.update_projectiles();
        self.bookkeep();

        self.checksums
            .observe(self.tick, self.avatar.entity.pos, &self.adversaries, &self.grid)
    }

    /// Run a batch of inputs, collecting emitted checksum records
    pub fn run<'a>(
        &mut self,
        inputs: impl IntoIterator<Item = &'a PlayerInput>,
    ) -> Vec<ChecksumRecord> {
        inputs.into_iter().filter_map(|input| self.step(input)).collect()
    }

    fn compute_concealment(&self) -> bool {
        let avatar = &self.avatar;
        if !avatar.entity.is_alive() || avatar.sprinting || avatar.attacked_this_tick {
            return false;
        }
        let (x, y) = world_to_tile(avatar.entity.pos);
        if !self.grid.conceals(x, y) {
            return false;
        }
        !self.adversaries.iter().any(|a| {
            a.is_alive() && a.entity.pos.distance(avatar.entity.pos) <= CONCEAL_REVEAL_RADIUS
        })
    }

    fn update_adversaries(&mut self) {
        let allies: Vec<Vec2> = self
            .adversaries
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| a.entity.pos)
            .collect();
        for adv in self.adversaries.iter_mut() {
            let mut ctx = AdversaryContext {
                target: &mut self.avatar.entity,
                target_concealed: self.avatar_concealed,
                grid: &mut self.grid,
                allies: &allies,
                projectiles: &mut self.projectiles,
                events: &mut self.events,
            };
            adv.update(&mut ctx);
        }
    }

    fn update_projectiles(&mut self) {
        let mut kills = Vec::new();
        for projectile in self.projectiles.iter_mut() {
            projectile.step(&mut self.avatar.entity, &mut self.events, &mut kills);
        }
        self.projectiles.retain(Projectile::is_active);
    }

    fn bookkeep(&mut self) {
        if !self.avatar.entity.is_alive() {
            if !self.death_reported {
                self.death_reported = true;
                self.events.push(SimEvent::AvatarDied);
                info!(
                    tick = self.tick,
                    levels_completed = self.levels.levels_completed,
                    "avatar died"
                );
            }
            return;
        }
        if !self.cleared && self.adversaries.iter().all(|a| !a.is_alive()) {
            self.cleared = true;
            self.events.push(SimEvent::LevelCleared {
                levels_completed: self.levels.levels_completed,
            });
            info!(
                tick = self.tick,
                levels_completed = self.levels.levels_completed,
                "level cleared"
            );
            if self.config.auto_advance {
                self.pending_advance = true;
            }
        }
    }

    /// Rebuild the current level and drop transient state. Returns the
    /// avatar's spawn tile.
    fn load_level(&mut self) -> TilePos {
        let level = self.levels.build(&self.config);
        self.seeds = level.seeds;
        self.biome = level.biome;
        self.grid = level.grid;
        self.adversaries = level.adversaries;
        self.projectiles.clear();
        self.avatar_concealed = false;
        self.cleared = false;
        self.death_reported = false;
        self.pending_advance = false;
        level.avatar_tile
    }

    /// Move to the next level. The avatar keeps its perks and pool maxima.
    pub fn advance(&mut self) {
        self.levels.advance();
        let tile = self.load_level();
        self.avatar.relocate(tile);
        debug!(tick = self.tick, ?tile, "avatar relocated");
    }

    /// Back to the first level with a fresh avatar, tick counter and
    /// checksum stream. Equivalent to a new simulation with the same config.
    pub fn restart(&mut self) {
        self.levels.restart();
        let tile = self.load_level();
        self.avatar = Avatar::spawn(tile);
        self.tick = 0;
        self.checksums.clear();
        self.events.clear();
    }

    pub fn grant_avatar_perk(&mut self, kind: PerkKind) {
        self.avatar.entity.apply_perk(kind);
        debug!(?kind, "avatar perk granted");
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Current world fingerprint, regardless of cadence
    pub fn state_hash(&self) -> u64 {
        world_hash(self.avatar.entity.pos, &self.adversaries, &self.grid)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        if id == EntityId::AVATAR {
            return Some(&self.avatar.entity);
        }
        self.adversaries.iter().find(|a| a.id() == id).map(|a| &a.entity)
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id == EntityId::AVATAR {
            return Some(&mut self.avatar.entity);
        }
        self.adversaries
            .iter_mut()
            .find(|a| a.id() == id)
            .map(|a| &mut a.entity)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn level_manager(&self) -> &LevelManager {
        &self.levels
    }

    pub fn levels_completed(&self) -> u32 {
        self.levels.levels_completed
    }

    pub fn seeds(&self) -> &SeedHierarchy {
        &self.seeds
    }

    pub fn biome(&self) -> Biome {
        self.biome
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn adversaries(&self) -> &[Adversary] {
        &self.adversaries
    }

    pub fn live_adversaries(&self) -> usize {
        self.adversaries.iter().filter(|a| a.is_alive()).count()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn avatar_concealed(&self) -> bool {
        self.avatar_concealed
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn checksum_records(&self) -> &[ChecksumRecord] {
        self.checksums.records()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}
