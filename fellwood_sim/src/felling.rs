// Felling sessions: multi-tick removal of a collected trunk.
//
// A `FellingSession` owns the full collected sequence (origin first), the
// snapshot of every block's material taken before anything was removed,
// and a cursor into the to-break suffix (everything after the origin, which
// the host breaks itself). `FellingSim` drives it with one `advance()` per
// scheduled `FellingStep` event:
//
// - actor offline                → `Abandoned` (nothing broken this step)
// - suffix already exhausted     → `Completed`
// - otherwise break the next `blocks_per_step` entries, skipping any that
//   are no longer trunk-typed   → `Continue`
//
// Completion is therefore reported on the step after the last break, which
// gives the host one interval for drops to settle before post-processing.
// The cursor only moves forward: an index is never processed twice.
//
// `abandon()` and `complete()` consume the session and perform its exit
// side effects on the tool (tag cleared; durability charged on completion
// only). An abandoned session returns nothing, so leaf decay and replant
// can never run for it.
//
// See also: `sim.rs` for the scheduling and post-processing hand-off,
// `durability.rs` for the tool token.

use crate::durability;
use crate::host::{ActorAccess, BlockAccess};
use crate::material::Material;
use crate::rules::DurabilityParams;
use crate::types::{ActorId, BlockPos, SessionId, SessionToken};
use rustc_hash::FxHashMap;

/// Pre-removal material of every block in a felled sequence.
#[derive(Clone, Debug, Default)]
pub struct OriginalMaterials {
    materials: FxHashMap<BlockPos, Material>,
}

impl OriginalMaterials {
    pub fn capture<W: BlockAccess + ?Sized>(world: &W, blocks: &[BlockPos]) -> Self {
        Self {
            materials: blocks.iter().map(|&pos| (pos, world.block(pos))).collect(),
        }
    }

    pub fn get(&self, pos: BlockPos) -> Option<Material> {
        self.materials.get(&pos).copied()
    }
}

/// Result of one `FellingSession::advance()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStep {
    Continue,
    Completed,
    Abandoned,
}

/// What a completed session hands to post-processing.
#[derive(Clone, Debug)]
pub struct FelledTree {
    pub actor: ActorId,
    /// Full sequence, origin first.
    pub blocks: Vec<BlockPos>,
    pub originals: OriginalMaterials,
    /// Extra durability charged to the tool.
    pub durability_charged: u32,
}

#[derive(Clone, Debug)]
pub struct FellingSession {
    pub id: SessionId,
    pub actor: ActorId,
    pub token: SessionToken,
    blocks: Vec<BlockPos>,
    originals: OriginalMaterials,
    /// Index into `blocks[1..]` of the next block to break.
    cursor: usize,
    pub blocks_per_step: u32,
    pub interval_ticks: u64,
}

impl FellingSession {
    pub fn new(
        id: SessionId,
        actor: ActorId,
        token: SessionToken,
        blocks: Vec<BlockPos>,
        originals: OriginalMaterials,
        blocks_per_step: u32,
        interval_ticks: u64,
    ) -> Self {
        Self {
            id,
            actor,
            token,
            blocks,
            originals,
            cursor: 0,
            blocks_per_step: blocks_per_step.max(1),
            interval_ticks: interval_ticks.max(1),
        }
    }

    pub fn origin(&self) -> Option<BlockPos> {
        self.blocks.first().copied()
    }

    pub fn blocks(&self) -> &[BlockPos] {
        &self.blocks
    }

    pub fn originals(&self) -> &OriginalMaterials {
        &self.originals
    }

    fn to_break(&self) -> &[BlockPos] {
        self.blocks.get(1..).unwrap_or(&[])
    }

    /// Blocks not yet processed, in break order.
    pub fn remaining(&self) -> &[BlockPos] {
        &self.to_break()[self.cursor..]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Run one scheduled step.
    pub fn advance<H, F>(&mut self, host: &mut H, is_trunk: F) -> SessionStep
    where
        H: BlockAccess + ActorAccess + ?Sized,
        F: Fn(Material) -> bool,
    {
        if !host.is_online(self.actor) {
            return SessionStep::Abandoned;
        }
        if self.remaining().is_empty() {
            return SessionStep::Completed;
        }
        for _ in 0..self.blocks_per_step {
            let Some(&pos) = self.remaining().first() else {
                break;
            };
            self.cursor += 1;
            if is_trunk(host.block(pos)) {
                host.break_naturally(pos, true);
            } else {
                log::trace!("{}: {} changed underfoot, skipped", self.id, pos);
            }
        }
        SessionStep::Continue
    }

    /// Tear down without post-processing.
    pub fn abandon<A: ActorAccess + ?Sized>(self, host: &mut A) {
        durability::clear_tag(host, self.actor, self.token);
    }

    /// Charge the tool, clear its tag and hand the felled tree on.
    pub fn complete<A: ActorAccess + ?Sized>(self, host: &mut A, params: &DurabilityParams) -> FelledTree {
        let charged = durability::charge(host, self.actor, self.token, self.blocks.len(), params);
        durability::clear_tag(host, self.actor, self.token);
        FelledTree {
            actor: self.actor,
            blocks: self.blocks,
            originals: self.originals,
            durability_charged: charged,
        }
    }
}
