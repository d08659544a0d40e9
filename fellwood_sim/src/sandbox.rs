// In-memory host for tests, benches and headless runs.
//
// `Sandbox` implements the three collaborator traits on top of one
// `VoxelWorld` per `WorldId` plus a table of actors. It records every
// observable side effect (natural breaks, leaf break intents, cosmetic
// effects) in order so tests can assert on exactly what the core asked the
// host to do.
//
// Hooks that stand in for other plugins:
// - `veto(pos)`: the leaf break intent at `pos` is vetoed
// - `suppress_drops(pos)`: the intent is allowed but drops are cancelled
//
// `player_break()` plays the host's part of a manual break: notify the sim,
// then break the origin itself and wear the tool by one point, whatever the
// sim decided.
//
// See also: `host.rs` for the traits, `world.rs` for the grid.

use crate::host::{ActorAccess, BlockAccess, BreakSignals, BreakVerdict, Effect, Inventory, ItemStack};
use crate::material::Material;
use crate::sim::{BreakOutcome, FellingSim};
use crate::types::{ActorId, BlockPos, WorldId};
use crate::world::VoxelWorld;
use std::collections::{BTreeMap, BTreeSet};

/// Default grid size of the sandbox's first world.
pub const DEFAULT_SIZE: (u32, u32, u32) = (32, 48, 32);

/// Permission granted to actors built with `Actor::new()`.
pub const DEFAULT_PERMISSION: &str = "fellwood.use";

/// A block the host broke as if mined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NaturalBreak {
    pub pos: BlockPos,
    pub material: Material,
    pub drops: bool,
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub online: bool,
    pub sneaking: bool,
    pub permissions: BTreeSet<String>,
    pub inventory: Inventory,
}

impl Actor {
    /// Online, sneaking, holding the default permission.
    pub fn new(inventory: Inventory) -> Self {
        Self {
            online: true,
            sneaking: true,
            permissions: BTreeSet::from([DEFAULT_PERMISSION.to_string()]),
            inventory,
        }
    }

    pub fn with_main_hand(item: ItemStack) -> Self {
        Self::new(Inventory::with_main_hand(item))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Sandbox {
    worlds: BTreeMap<WorldId, VoxelWorld>,
    actors: BTreeMap<ActorId, Actor>,
    vetoed: BTreeSet<BlockPos>,
    silent: BTreeSet<BlockPos>,
    natural_breaks: Vec<NaturalBreak>,
    leaf_signals: Vec<(ActorId, BlockPos)>,
    effects: Vec<(BlockPos, Effect)>,
}

impl Sandbox {
    /// One empty world, `WorldId(0)`, of `DEFAULT_SIZE`.
    pub fn new() -> Self {
        let (x, y, z) = DEFAULT_SIZE;
        Self::default().with_world(WorldId(0), VoxelWorld::new(x, y, z))
    }

    pub fn with_world(mut self, id: WorldId, world: VoxelWorld) -> Self {
        self.add_world(id, world);
        self
    }

    pub fn add_world(&mut self, id: WorldId, world: VoxelWorld) {
        self.worlds.insert(id, world);
    }

    pub fn world(&self, id: WorldId) -> Option<&VoxelWorld> {
        self.worlds.get(&id)
    }

    pub fn world_mut(&mut self, id: WorldId) -> Option<&mut VoxelWorld> {
        self.worlds.get_mut(&id)
    }

    /// Material at `pos`; `Air` in unknown worlds and out of bounds.
    pub fn get(&self, pos: BlockPos) -> Material {
        self.worlds
            .get(&pos.world)
            .map_or(Material::Air, |w| w.get(pos.x, pos.y, pos.z))
    }

    pub fn set(&mut self, pos: BlockPos, material: Material) {
        if let Some(world) = self.worlds.get_mut(&pos.world) {
            world.set(pos.x, pos.y, pos.z, material);
        }
    }

    pub fn is_waterlogged(&self, pos: BlockPos) -> bool {
        self.worlds
            .get(&pos.world)
            .is_some_and(|w| w.is_waterlogged(pos.x, pos.y, pos.z))
    }

    pub fn count(&self, world: WorldId, material: Material) -> usize {
        self.worlds.get(&world).map_or(0, |w| w.count(material))
    }

    // -----------------------------------------------------------------------
    // Actors
    // -----------------------------------------------------------------------

    pub fn add_actor(&mut self, id: ActorId, actor: Actor) {
        self.actors.insert(id, actor);
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn set_online(&mut self, id: ActorId, online: bool) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.online = online;
        }
    }

    pub fn set_sneaking(&mut self, id: ActorId, sneaking: bool) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.sneaking = sneaking;
        }
    }

    pub fn grant_permission(&mut self, id: ActorId, permission: &str) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.permissions.insert(permission.to_string());
        }
    }

    pub fn revoke_permissions(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.permissions.clear();
        }
    }

    // -----------------------------------------------------------------------
    // Other-plugin hooks and observation
    // -----------------------------------------------------------------------

    pub fn veto(&mut self, pos: BlockPos) {
        self.vetoed.insert(pos);
    }

    pub fn suppress_drops(&mut self, pos: BlockPos) {
        self.silent.insert(pos);
    }

    pub fn natural_breaks(&self) -> &[NaturalBreak] {
        &self.natural_breaks
    }

    /// Every leaf break intent raised, in order, vetoed or not.
    pub fn leaf_signals(&self) -> &[(ActorId, BlockPos)] {
        &self.leaf_signals
    }

    pub fn effects(&self) -> &[(BlockPos, Effect)] {
        &self.effects
    }

    /// An actor mines the block at `pos` by hand.
    pub fn player_break(&mut self, sim: &mut FellingSim, actor: ActorId, pos: BlockPos) -> BreakOutcome {
        let outcome = sim.on_trunk_broken(self, actor, pos);
        self.break_naturally(pos, true);
        if let Some(tool) = self
            .actors
            .get_mut(&actor)
            .and_then(|a| a.inventory.main_hand_mut())
            .filter(|t| t.material.max_durability() > 0)
        {
            tool.damage += 1;
        }
        outcome
    }
}

impl BlockAccess for Sandbox {
    fn block(&self, pos: BlockPos) -> Material {
        self.get(pos)
    }

    fn set_block(&mut self, pos: BlockPos, material: Material) {
        self.set(pos, material);
        if let Some(world) = self.worlds.get_mut(&pos.world) {
            world.set_waterlogged(pos.x, pos.y, pos.z, false);
        }
    }

    fn break_naturally(&mut self, pos: BlockPos, drops: bool) {
        let material = self.get(pos);
        self.natural_breaks.push(NaturalBreak { pos, material, drops });
        self.set_block(pos, Material::Air);
    }

    fn set_waterlogged(&mut self, pos: BlockPos, waterlogged: bool) {
        if let Some(world) = self.worlds.get_mut(&pos.world) {
            world.set_waterlogged(pos.x, pos.y, pos.z, waterlogged);
        }
    }

    fn spawn_effect(&mut self, pos: BlockPos, effect: Effect) {
        self.effects.push((pos, effect));
    }
}

impl ActorAccess for Sandbox {
    fn is_online(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|a| a.online)
    }

    fn is_sneaking(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|a| a.sneaking)
    }

    fn has_permission(&self, actor: ActorId, permission: &str) -> bool {
        self.actors
            .get(&actor)
            .is_some_and(|a| a.permissions.contains(permission))
    }

    fn inventory(&self, actor: ActorId) -> Option<&Inventory> {
        self.actors.get(&actor).map(|a| &a.inventory)
    }

    fn inventory_mut(&mut self, actor: ActorId) -> Option<&mut Inventory> {
        self.actors.get_mut(&actor).map(|a| &mut a.inventory)
    }
}

impl BreakSignals for Sandbox {
    fn leaf_break_intent(&mut self, actor: ActorId, pos: BlockPos) -> BreakVerdict {
        self.leaf_signals.push((actor, pos));
        if self.vetoed.contains(&pos) {
            BreakVerdict::Veto
        } else {
            BreakVerdict::Allow {
                drops: !self.silent.contains(&pos),
            }
        }
    }
}
