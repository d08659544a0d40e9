// Bounded breadth-first trunk collection.
//
// Starting from the broken block, walks every connected trunk-typed block
// (6- or 26-connectivity) and returns them in breadth-first order. Three
// limits apply together:
// - `max_blocks`: traversal stops as soon as the result reaches the cap;
//   anything still queued is dropped.
// - horizontal radius: Chebyshev distance on x/z from the origin.
// - vertical radius: |dy| from the origin.
// A radius of 0 means that axis is unlimited.
//
// Ties within one breadth layer are broken by `types::neighbors()` order.
// That order is observable: the felling session removes blocks in exactly
// the sequence returned here.
//
// The origin is normally the first element. If it is not trunk-typed (the
// rules changed underfoot) the result is empty and callers substitute the
// singleton origin, see `collect_or_origin()`.
//
// See also: `rules.rs` for `Rules::collect_params()`, which merges the
// global cap with the species limits.

use crate::host::BlockAccess;
use crate::material::Material;
use crate::types::{BlockPos, Connectivity, neighbors};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Limits for one traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectParams {
    pub max_blocks: u32,
    pub connectivity: Connectivity,
    /// 0 means unlimited.
    pub max_horizontal_radius: u32,
    /// 0 means unlimited.
    pub max_vertical_radius: u32,
}

impl CollectParams {
    pub fn unlimited_radius(max_blocks: u32, connectivity: Connectivity) -> Self {
        Self {
            max_blocks,
            connectivity,
            max_horizontal_radius: 0,
            max_vertical_radius: 0,
        }
    }

    fn within_radius(&self, origin: BlockPos, pos: BlockPos) -> bool {
        (self.max_horizontal_radius == 0
            || origin.horizontal_distance(pos) <= self.max_horizontal_radius)
            && (self.max_vertical_radius == 0
                || origin.vertical_distance(pos) <= self.max_vertical_radius)
    }
}

/// Collect the trunk connected to `origin`, in breadth-first order.
pub fn collect<W, F>(world: &W, origin: BlockPos, params: &CollectParams, is_trunk: F) -> Vec<BlockPos>
where
    W: BlockAccess + ?Sized,
    F: Fn(Material) -> bool,
{
    let cap = params.max_blocks as usize;
    let accept = |pos: BlockPos| is_trunk(world.block(pos)) && params.within_radius(origin, pos);

    let mut result = Vec::new();
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(origin);
    queue.push_back(origin);

    while result.len() < cap {
        let Some(pos) = queue.pop_front() else {
            break;
        };
        if !accept(pos) {
            continue;
        }
        result.push(pos);
        for n in neighbors(pos, params.connectivity) {
            if accept(n) && visited.insert(n) {
                queue.push_back(n);
            }
        }
    }

    log::trace!("collected {} trunk blocks from {}", result.len(), origin);
    result
}

/// `collect()`, with an empty result replaced by the singleton origin.
pub fn collect_or_origin<W, F>(
    world: &W,
    origin: BlockPos,
    params: &CollectParams,
    is_trunk: F,
) -> Vec<BlockPos>
where
    W: BlockAccess + ?Sized,
    F: Fn(Material) -> bool,
{
    let result = collect(world, origin, params, is_trunk);
    if result.is_empty() {
        vec![origin]
    } else {
        result
    }
}
