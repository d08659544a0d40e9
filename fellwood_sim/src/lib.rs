// fellwood_sim: tree felling core.
//
// A player breaks one trunk block with an axe; this crate expands the break
// to the whole connected trunk, removes it a few blocks per tick, cascades
// leaf decay outward from the felled trunk, and optionally replants a
// sapling where the tree stood. It has no server, plugin or rendering
// dependencies: the world, the actors and the veto signals are reached
// through the traits in `host.rs`, and time only advances when the caller
// drives `FellingSim::step()`.
//
// Module overview:
// - `sim.rs`:        `FellingSim`: entry point, session bookkeeping, tick loop.
// - `event.rs`:      `EventQueue` (min-heap of scheduled work) + narrative `SimEvent`s.
// - `collector.rs`:  Bounded breadth-first trunk collection.
// - `felling.rs`:    `FellingSession` state machine + original-material snapshot.
// - `durability.rs`: Tool tagging and the "all" durability policy.
// - `leaf_decay.rs`: `LeafDecayJob` cascade state machine.
// - `leaves.rs`:     Trunk → leaf palette mapping and the allowed-leaf filter.
// - `replant.rs`:    Sapling mapping, soil rules, anchor/footprint selection.
// - `species.rs`:    `Species` table, per-species limits, mushroom detection.
// - `config.rs`:     `FellingConfig` / `LeafMappingDoc`, serde documents.
// - `rules.rs`:      `Rules`, config compiled into lookup sets.
// - `material.rs`:   `Material` identities and their predicates.
// - `host.rs`:       Collaborator traits + `Inventory` / `ItemStack`.
// - `world.rs`:      Dense voxel grid used by the sandbox host.
// - `sandbox.rs`:    In-memory `Host` implementation for tests and benches.
// - `types.rs`:      `BlockPos`, `ColumnKey`, IDs, `SessionToken`, neighbor offsets.
//
// **Critical constraint: single coordination thread.** Every mutation of
// world state happens inside `on_trunk_broken()` or `step()`, both of which
// take `&mut self` and `&mut` host. Nothing here spawns threads or blocks.

pub mod collector;
pub mod config;
pub mod durability;
pub mod event;
pub mod felling;
pub mod host;
pub mod leaf_decay;
pub mod leaves;
pub mod material;
pub mod replant;
pub mod rules;
pub mod sandbox;
pub mod sim;
pub mod species;
pub mod types;
pub mod world;
