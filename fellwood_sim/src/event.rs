// Scheduled work and narrative events.
//
// The sim is a discrete event simulation: multi-tick work schedules its next
// unit into a priority queue ordered by `(tick, sequence)`, and
// `FellingSim::step()` pops and runs them in order. Empty ticks cost
// nothing.
//
// This file defines two related but distinct concepts:
// - `ScheduledEvent`: internal queue entries that drive sessions, decay jobs
//   and deferred replants. Each refers to its target by ID; if the target
//   is gone when the event fires, the event is a no-op. That is the only
//   cancellation mechanism.
// - `SimEvent`: narrative output for whatever UI, messaging or metrics layer
//   sits above the core (action-bar notices, counters).
//
// See also: `sim.rs` for the loop that processes scheduled events,
// `types.rs` for the IDs.
//
// **Critical constraint: determinism.** Two events at the same tick fire in
// scheduling order. The `(tick, sequence)` key is a total order.

use crate::material::Material;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// ---------------------------------------------------------------------------
// Internal scheduled events (priority queue)
// ---------------------------------------------------------------------------

/// Work scheduled for a future tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub tick: u64,
    /// Tiebreak within a tick; lower fires first.
    pub sequence: u64,
    pub kind: ScheduledEventKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEventKind {
    /// Break the next block(s) of a felling session.
    FellingStep { session: SessionId },
    /// Run one batch of a leaf decay job.
    LeafDecayBatch { job: DecayJobId },
    /// Place a planned sapling.
    Replant { replant: ReplantId },
}

// Min-heap: lowest (tick, sequence) fires first. BinaryHeap is a max-heap,
// so the ordering is reversed.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.sequence == other.sequence
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .tick
            .cmp(&self.tick)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue of scheduled events.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, tick: u64, kind: ScheduledEventKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(ScheduledEvent {
            tick,
            sequence,
            kind,
        });
    }

    pub fn peek_tick(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.tick)
    }

    /// Pop the next event if its tick is <= `up_to_tick`.
    pub fn pop_if_ready(&mut self, up_to_tick: u64) -> Option<ScheduledEvent> {
        if self.heap.peek().is_some_and(|e| e.tick <= up_to_tick) {
            self.heap.pop()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Narrative events (output)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A multi-block felling began.
    FellingStarted {
        session: SessionId,
        actor: ActorId,
        origin: BlockPos,
        blocks: usize,
    },
    /// Every block of a session was processed and post-processing ran.
    FellingCompleted {
        session: SessionId,
        actor: ActorId,
        blocks: usize,
        durability_charged: u32,
    },
    /// The actor went offline mid-session; nothing further happens for it.
    FellingAbandoned {
        session: SessionId,
        actor: ActorId,
        processed: usize,
    },
    /// A second felling was refused because one is still running. Throttled
    /// per actor.
    FellingAlreadyRunning { actor: ActorId },
    /// The break was handled as a single block (no multi-block felling).
    SingleBreak { actor: ActorId, origin: BlockPos },
    LeafDecayFinished { job: DecayJobId, removed: usize },
    SaplingPlanted {
        replant: ReplantId,
        sapling: Material,
        placed: usize,
    },
}
