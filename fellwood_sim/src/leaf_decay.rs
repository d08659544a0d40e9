// Leaf decay cascade.
//
// A `LeafDecayJob` removes the leaves around a felled trunk in breadth-first
// waves, a fixed number per batch, one batch per scheduled
// `LeafDecayBatch` event. It is seeded with the neighbors of every felled
// trunk block at depth 0, each remembering the trunk block it came from.
// A candidate is queued only if it is leaf-typed, passes the job's
// `LeafFilter`, lies within `max_distance_squared` of its originating trunk
// block, has depth ≤ `max_depth`, and has not been visited in this job.
//
// Per dequeued entry:
// - no longer a permitted leaf → skipped (does not count toward the batch)
// - break intent vetoed        → skipped, no expansion from it
// - otherwise removed (with or without drops, per the verdict), counted,
//   and its neighbors queued at depth + 1 with the same origin.
//
// The job finishes when its queue is empty. There is no other cancellation;
// depth, distance and the visited set bound the cascade.
//
// See also: `leaves.rs` for `LeafFilter`, `rules.rs` for `DecayParams`,
// `sim.rs` for scheduling.

use crate::host::{BlockAccess, BreakSignals, BreakVerdict};
use crate::leaves::LeafFilter;
use crate::material::Material;
use crate::rules::DecayParams;
use crate::types::{ActorId, BlockPos, DecayJobId, neighbors};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LeafEntry {
    pos: BlockPos,
    depth: u32,
    /// Trunk block whose neighborhood seeded this branch of the cascade.
    origin: BlockPos,
}

/// Whether a job has more work after a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Finished,
}

#[derive(Clone, Debug)]
pub struct LeafDecayJob {
    pub id: DecayJobId,
    /// Actor the break intents are attributed to.
    pub actor: ActorId,
    queue: VecDeque<LeafEntry>,
    visited: FxHashSet<BlockPos>,
    filter: LeafFilter,
    params: DecayParams,
    removed: usize,
}

impl LeafDecayJob {
    /// Seed a job from the neighbors of `trunk`. Returns `None` when decay
    /// is disabled (`max_depth == 0`) or nothing qualified.
    pub fn start<W: BlockAccess + ?Sized>(
        id: DecayJobId,
        actor: ActorId,
        world: &W,
        trunk: &[BlockPos],
        filter: LeafFilter,
        params: DecayParams,
    ) -> Option<Self> {
        if params.max_depth == 0 {
            return None;
        }
        let mut job = Self {
            id,
            actor,
            queue: VecDeque::new(),
            visited: FxHashSet::default(),
            filter,
            params,
            removed: 0,
        };
        for &log in trunk {
            for n in neighbors(log, params.connectivity) {
                job.enqueue(world, n, 0, log);
            }
        }
        if job.queue.is_empty() {
            return None;
        }
        log::trace!("{id}: seeded {} leaves", job.queue.len());
        Some(job)
    }

    fn qualifies<W: BlockAccess + ?Sized>(&self, world: &W, pos: BlockPos) -> bool {
        let material = world.block(pos);
        material.is_leaf() && self.filter.permits(material)
    }

    fn enqueue<W: BlockAccess + ?Sized>(&mut self, world: &W, pos: BlockPos, depth: u32, origin: BlockPos) {
        if depth > self.params.max_depth
            || !self.qualifies(world, pos)
            || origin.distance_squared(pos) > self.params.max_distance_squared
        {
            return;
        }
        if self.visited.insert(pos) {
            self.queue.push_back(LeafEntry { pos, depth, origin });
        }
    }

    /// Remove up to `batch_size` leaves.
    pub fn run_batch<H: BlockAccess + BreakSignals + ?Sized>(&mut self, host: &mut H) -> JobStatus {
        let mut processed = 0;
        while processed < self.params.batch_size {
            let Some(entry) = self.queue.pop_front() else {
                break;
            };
            if !self.qualifies(&*host, entry.pos) {
                continue;
            }
            match host.leaf_break_intent(self.actor, entry.pos) {
                BreakVerdict::Veto => continue,
                BreakVerdict::Allow { drops: true } => host.break_naturally(entry.pos, true),
                BreakVerdict::Allow { drops: false } => host.set_block(entry.pos, Material::Air),
            }
            self.removed += 1;
            processed += 1;

            let next = entry.depth + 1;
            if next <= self.params.max_depth {
                for n in neighbors(entry.pos, self.params.connectivity) {
                    self.enqueue(&*host, n, next, entry.origin);
                }
            }
        }
        if self.queue.is_empty() {
            JobStatus::Finished
        } else {
            JobStatus::Pending
        }
    }

    /// Leaves removed so far.
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Entries still queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn interval_ticks(&self) -> u64 {
        self.params.batch_interval_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Sandbox;
    use crate::types::{Connectivity, WorldId};
    use std::collections::BTreeSet;

    const W: WorldId = WorldId(0);
    const ACTOR: ActorId = ActorId(1);

    fn params(max_depth: u32, max_distance: i64, batch_size: u32) -> DecayParams {
        DecayParams {
            max_depth,
            batch_interval_ticks: 2,
            batch_size,
            max_distance_squared: max_distance * max_distance,
            connectivity: Connectivity::Faces,
        }
    }

    fn run_to_end(job: &mut LeafDecayJob, sandbox: &mut Sandbox) -> usize {
        let mut batches = 0;
        while job.run_batch(sandbox) == JobStatus::Pending {
            batches += 1;
            assert!(batches < 10_000);
        }
        batches + 1
    }

    /// A felled trunk position (now air) at x = 2 with a line of leaves
    /// running east from it.
    fn leaf_line(length: i32) -> (Sandbox, BlockPos) {
        let mut sandbox = Sandbox::new();
        let trunk = BlockPos::new(W, 2, 5, 2);
        for dx in 1..=length {
            sandbox.set(trunk.offset(dx, 0, 0), Material::OakLeaves);
        }
        (sandbox, trunk)
    }

    #[test]
    fn depth_bounds_cascade() {
        let (mut sandbox, trunk) = leaf_line(10);
        let mut job =
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], LeafFilter::Any, params(2, 100, 50))
                .unwrap();
        run_to_end(&mut job, &mut sandbox);
        // Depths 0, 1, 2.
        assert_eq!(job.removed(), 3);
        assert_eq!(sandbox.get(trunk.offset(3, 0, 0)), Material::Air);
        assert_eq!(sandbox.get(trunk.offset(4, 0, 0)), Material::OakLeaves);
    }

    #[test]
    fn distance_bounds_cascade() {
        let (mut sandbox, trunk) = leaf_line(10);
        let mut job =
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], LeafFilter::Any, params(20, 4, 50))
                .unwrap();
        run_to_end(&mut job, &mut sandbox);
        assert_eq!(job.removed(), 4);
        for dx in 1..=10 {
            let pos = trunk.offset(dx, 0, 0);
            let removed = sandbox.get(pos) == Material::Air;
            assert_eq!(removed, trunk.distance_squared(pos) <= 16, "dx = {dx}");
        }
    }

    #[test]
    fn batches_respect_size() {
        let (mut sandbox, trunk) = leaf_line(10);
        let mut job =
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], LeafFilter::Any, params(20, 100, 3))
                .unwrap();
        assert_eq!(job.run_batch(&mut sandbox), JobStatus::Pending);
        assert_eq!(job.removed(), 3);
        assert_eq!(run_to_end(&mut job, &mut sandbox), 3);
        assert_eq!(job.removed(), 10);
    }

    #[test]
    fn filter_excludes_foreign_leaves() {
        let (mut sandbox, trunk) = leaf_line(3);
        sandbox.set(trunk.offset(0, 1, 0), Material::BirchLeaves);
        let filter = LeafFilter::Only(BTreeSet::from([Material::OakLeaves]));
        let mut job =
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], filter, params(5, 10, 50))
                .unwrap();
        run_to_end(&mut job, &mut sandbox);
        assert_eq!(job.removed(), 3);
        assert_eq!(sandbox.get(trunk.offset(0, 1, 0)), Material::BirchLeaves);
    }

    #[test]
    fn veto_stops_expansion() {
        let (mut sandbox, trunk) = leaf_line(5);
        sandbox.veto(trunk.offset(2, 0, 0));
        let mut job =
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], LeafFilter::Any, params(10, 10, 50))
                .unwrap();
        run_to_end(&mut job, &mut sandbox);
        assert_eq!(job.removed(), 1);
        assert_eq!(sandbox.get(trunk.offset(2, 0, 0)), Material::OakLeaves);
        assert_eq!(sandbox.get(trunk.offset(3, 0, 0)), Material::OakLeaves);
    }

    #[test]
    fn suppressed_drops_remove_silently() {
        let (mut sandbox, trunk) = leaf_line(2);
        sandbox.suppress_drops(trunk.offset(1, 0, 0));
        let mut job =
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], LeafFilter::Any, params(5, 10, 50))
                .unwrap();
        run_to_end(&mut job, &mut sandbox);
        assert_eq!(job.removed(), 2);
        let breaks = sandbox.natural_breaks();
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].pos, trunk.offset(2, 0, 0));
        assert_eq!(sandbox.leaf_signals(), &[(ACTOR, trunk.offset(1, 0, 0)), (ACTOR, trunk.offset(2, 0, 0))]);
    }

    #[test]
    fn breadth_order_by_depth() {
        // Two branches of different lengths; depth-1 leaves of both go before
        // any depth-2 leaf.
        let mut sandbox = Sandbox::new();
        let trunk = BlockPos::new(W, 8, 5, 8);
        for d in 1..=3 {
            sandbox.set(trunk.offset(d, 0, 0), Material::OakLeaves);
            sandbox.set(trunk.offset(-d, 0, 0), Material::OakLeaves);
        }
        let mut job =
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], LeafFilter::Any, params(5, 10, 50))
                .unwrap();
        run_to_end(&mut job, &mut sandbox);
        let distances: Vec<u32> = sandbox
            .leaf_signals()
            .iter()
            .map(|(_, p)| p.horizontal_distance(trunk))
            .collect();
        assert_eq!(distances, vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn nothing_to_seed_yields_no_job() {
        let sandbox = Sandbox::new();
        let trunk = BlockPos::new(W, 2, 2, 2);
        assert!(
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], LeafFilter::Any, params(5, 4, 20))
                .is_none()
        );
        let (sandbox, trunk) = leaf_line(3);
        assert!(
            LeafDecayJob::start(DecayJobId(0), ACTOR, &sandbox, &[trunk], LeafFilter::Any, params(0, 4, 20))
                .is_none()
        );
    }
}
