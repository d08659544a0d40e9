// Felling simulation state and tick loop.
//
// `FellingSim` owns everything that outlives a single call: the compiled
// `Rules`, the event queue, in-flight felling sessions, leaf decay jobs,
// pending replant plans, the set of actors with an active session, and the
// PRNG that mints session tokens. World state is never owned here; every
// entry point takes the host (`&mut H where H: Host`).
//
// ## Entry point
//
// `on_trunk_broken(host, actor, origin)` is called when an actor breaks a
// block, before the host removes it. The host breaks the origin itself
// afterwards, whatever the outcome. Gating, in order:
//
//   1. origin is trunk-typed
//   2. main-hand item is an allowed axe
//   3. the tool has at least the configured remaining durability
//   4. the actor's posture satisfies the sneak mode
//
// Any failure → `Ignored`. Otherwise the trunk is collected (species-aware
// limits, see `Rules::collect_params()`) and the original materials are
// snapshotted. Then:
//
// - permission + felling enabled:
//   - actor already has a session → `Rejected` (throttled notice event)
//   - sweep effect at the origin
//   - sequence of one block → single-break post-processing
//   - tool cannot be tagged → single-break post-processing (origin only)
//   - otherwise a `FellingSession` starts; its first step fires one break
//     interval later
// - otherwise → single-break post-processing on the origin
//
// Single-break post-processing is leaf decay only. Replant follows only a
// completed session.
//
// ## Scheduling
//
// `step(host, target_tick)` advances the clock, running scheduled events in
// `(tick, sequence)` order. Deferred work always lands on a strictly later
// tick than the one that scheduled it. Sessions and decay jobs keep the
// pacing they captured at start; reloading rules affects new work only,
// apart from material classification and durability policy, which are read
// when used.
//
// See also: `felling.rs`, `leaf_decay.rs`, `replant.rs` for the per-tick
// state machines, `event.rs` for the queue, `host.rs` for the traits.
//
// **Critical constraint: determinism.** Maps are `BTreeMap` and session
// tokens come from the seeded `TokenRng`. Given the same seed, rules, host
// and call sequence, the outcome is identical.

use crate::collector::collect_or_origin;
use crate::config::{ConfigError, FellingConfig, LeafMappingDoc};
use crate::durability;
use crate::event::{EventQueue, ScheduledEventKind, SimEvent, SimEventKind};
use crate::felling::{FellingSession, OriginalMaterials, SessionStep};
use crate::host::{Effect, Host};
use crate::leaf_decay::{JobStatus, LeafDecayJob};
use crate::replant::{self, ReplantPlan};
use crate::rules::Rules;
use crate::species::detect_species;
use crate::types::{ActorId, BlockPos, DecayJobId, ReplantId, SessionId, SessionToken};
use fellwood_prng::TokenRng;
use std::collections::BTreeMap;

/// What `on_trunk_broken()` decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakOutcome {
    /// Not a felling break; nothing scheduled.
    Ignored,
    /// The actor already has a felling in progress.
    Rejected,
    /// Handled as a single block; leaf decay may follow.
    SingleBreak { decay_job: Option<DecayJobId> },
    /// A multi-block session started.
    Felling { session: SessionId, blocks: usize },
}

/// Narrative events produced while advancing.
pub struct StepResult {
    pub events: Vec<SimEvent>,
}

pub struct FellingSim {
    tick: u64,
    rng: TokenRng,
    rules: Rules,
    event_queue: EventQueue,
    sessions: BTreeMap<SessionId, FellingSession>,
    /// At most one session per actor.
    active_actors: BTreeMap<ActorId, SessionId>,
    decay_jobs: BTreeMap<DecayJobId, LeafDecayJob>,
    replants: BTreeMap<ReplantId, ReplantPlan>,
    last_rejection_notice: BTreeMap<ActorId, u64>,
    next_id: u64,
    /// Events raised by `on_trunk_broken()`, returned by the next `step()`.
    pending_events: Vec<SimEvent>,
}

impl FellingSim {
    /// A sim with default rules.
    pub fn new(seed: u64) -> Self {
        Self::with_rules(seed, Rules::default())
    }

    pub fn with_rules(seed: u64, rules: Rules) -> Self {
        Self {
            tick: 0,
            rng: TokenRng::new(seed),
            rules,
            event_queue: EventQueue::new(),
            sessions: BTreeMap::new(),
            active_actors: BTreeMap::new(),
            decay_jobs: BTreeMap::new(),
            replants: BTreeMap::new(),
            last_rejection_notice: BTreeMap::new(),
            next_id: 0,
            pending_events: Vec::new(),
        }
    }

    pub fn with_config(seed: u64, config: &FellingConfig, leaves: &LeafMappingDoc) -> Self {
        Self::with_rules(seed, Rules::compile(config, leaves))
    }

    /// Build from the two JSON documents.
    pub fn from_json(seed: u64, config_json: &str, leaves_json: &str) -> Result<Self, ConfigError> {
        let config = FellingConfig::from_json(config_json)?;
        let leaves = LeafMappingDoc::from_json(leaves_json)?;
        Ok(Self::with_config(seed, &config, &leaves))
    }

    /// Swap in freshly compiled rules. Takes effect between ticks.
    pub fn reload(&mut self, rules: Rules) {
        log::info!("felling rules reloaded at tick {}", self.tick);
        self.rules = rules;
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn is_felling(&self, actor: ActorId) -> bool {
        self.active_actors.contains_key(&actor)
    }

    pub fn session(&self, id: SessionId) -> Option<&FellingSession> {
        self.sessions.get(&id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn decay_job(&self, id: DecayJobId) -> Option<&LeafDecayJob> {
        self.decay_jobs.get(&id)
    }

    pub fn active_decay_jobs(&self) -> usize {
        self.decay_jobs.len()
    }

    pub fn pending_replants(&self) -> usize {
        self.replants.len()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn emit(&mut self, kind: SimEventKind) {
        self.pending_events.push(SimEvent {
            tick: self.tick,
            kind,
        });
    }

    // -----------------------------------------------------------------------
    // Entry point
    // -----------------------------------------------------------------------

    /// An actor is breaking the trunk-typed block at `origin`.
    pub fn on_trunk_broken<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        actor: ActorId,
        origin: BlockPos,
    ) -> BreakOutcome {
        if !self.passes_gates(&*host, actor, origin) {
            return BreakOutcome::Ignored;
        }

        let rules = &self.rules;
        let species = detect_species(&*host, origin);
        let params = rules.collect_params(species);
        let sequence = collect_or_origin(&*host, origin, &params, |m| rules.is_trunk(m));
        let originals = OriginalMaterials::capture(&*host, &sequence);
        log::debug!(
            "{actor:?} broke {origin} ({species:?}): {} trunk blocks",
            sequence.len()
        );

        let permitted = host.has_permission(actor, &self.rules.permission);
        if !(permitted && self.rules.timber_enabled) {
            return self.single_break(host, actor, origin, &originals);
        }

        if self.active_actors.contains_key(&actor) {
            self.notify_already_running(actor);
            return BreakOutcome::Rejected;
        }

        host.spawn_effect(origin, Effect::Sweep);
        if sequence.len() <= 1 {
            return self.single_break(host, actor, origin, &originals);
        }

        let token = SessionToken::new_v4(&mut self.rng);
        if !durability::tag_tool(host, actor, token) {
            log::debug!("{actor:?}: tool cannot be tagged, falling back to a single break");
            return self.single_break(host, actor, origin, &originals);
        }

        let id = SessionId(self.next_id());
        let blocks = sequence.len();
        let session = FellingSession::new(
            id,
            actor,
            token,
            sequence,
            originals,
            self.rules.blocks_per_step,
            self.rules.break_interval_ticks,
        );
        self.event_queue.schedule(
            self.tick + session.interval_ticks,
            ScheduledEventKind::FellingStep { session: id },
        );
        self.sessions.insert(id, session);
        self.active_actors.insert(actor, id);
        self.emit(SimEventKind::FellingStarted {
            session: id,
            actor,
            origin,
            blocks,
        });
        BreakOutcome::Felling {
            session: id,
            blocks,
        }
    }

    fn passes_gates<H: Host + ?Sized>(&self, host: &H, actor: ActorId, origin: BlockPos) -> bool {
        if !self.rules.is_trunk(host.block(origin)) {
            return false;
        }
        let Some(tool) = host.inventory(actor).and_then(|inv| inv.main_hand()) else {
            return false;
        };
        self.rules.is_allowed_axe(tool.material)
            && self.rules.has_min_durability(tool)
            && self.rules.sneak_mode.allows(host.is_sneaking(actor))
    }

    fn notify_already_running(&mut self, actor: ActorId) {
        let cooldown = self.rules.rejection_notice_cooldown_ticks;
        let due = self
            .last_rejection_notice
            .get(&actor)
            .is_none_or(|&last| self.tick.saturating_sub(last) >= cooldown);
        if due {
            self.last_rejection_notice.insert(actor, self.tick);
            self.emit(SimEventKind::FellingAlreadyRunning { actor });
        }
    }

    fn single_break<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        actor: ActorId,
        origin: BlockPos,
        originals: &OriginalMaterials,
    ) -> BreakOutcome {
        self.emit(SimEventKind::SingleBreak { actor, origin });
        let decay_job = self.start_leaf_decay(&*host, actor, &[origin], originals);
        BreakOutcome::SingleBreak { decay_job }
    }

    // -----------------------------------------------------------------------
    // Post-processing
    // -----------------------------------------------------------------------

    fn start_leaf_decay<H: Host + ?Sized>(
        &mut self,
        host: &H,
        actor: ActorId,
        blocks: &[BlockPos],
        originals: &OriginalMaterials,
    ) -> Option<DecayJobId> {
        if !self.rules.leaves_decay_enabled {
            return None;
        }
        let &origin = blocks.first()?;
        let origin_material = originals.get(origin).unwrap_or_else(|| host.block(origin));
        let filter = self.rules.leaf_mapping.filter_for(origin_material);
        let id = DecayJobId(self.next_id);
        let job = LeafDecayJob::start(id, actor, host, blocks, filter, self.rules.decay)?;
        self.next_id += 1;
        self.event_queue
            .schedule(self.tick + 1, ScheduledEventKind::LeafDecayBatch { job: id });
        self.decay_jobs.insert(id, job);
        Some(id)
    }

    fn schedule_replant<H: Host + ?Sized>(
        &mut self,
        host: &H,
        blocks: &[BlockPos],
        originals: &OriginalMaterials,
    ) -> Option<ReplantId> {
        if !self.rules.replant_enabled {
            return None;
        }
        let rules = &self.rules;
        let plan = replant::plan(host, blocks, originals, |s| rules.is_sapling_allowed(s))?;
        let id = ReplantId(self.next_id());
        let delay = self.rules.replant_delay_ticks.max(1);
        self.event_queue
            .schedule(self.tick + delay, ScheduledEventKind::Replant { replant: id });
        self.replants.insert(id, plan);
        Some(id)
    }

    // -----------------------------------------------------------------------
    // Tick loop
    // -----------------------------------------------------------------------

    /// Advance to `target_tick`, processing every scheduled event up to and
    /// including it.
    pub fn step<H: Host + ?Sized>(&mut self, host: &mut H, target_tick: u64) -> StepResult {
        while self.tick < target_tick {
            self.tick = self
                .event_queue
                .peek_tick()
                .map_or(target_tick, |t| t.clamp(self.tick, target_tick));
            while let Some(event) = self.event_queue.pop_if_ready(self.tick) {
                self.process_event(host, event.kind);
            }
        }
        self.tick = self.tick.max(target_tick);
        StepResult {
            events: std::mem::take(&mut self.pending_events),
        }
    }

    fn process_event<H: Host + ?Sized>(&mut self, host: &mut H, kind: ScheduledEventKind) {
        match kind {
            ScheduledEventKind::FellingStep { session } => self.process_felling_step(host, session),
            ScheduledEventKind::LeafDecayBatch { job } => self.process_decay_batch(host, job),
            ScheduledEventKind::Replant { replant } => {
                let Some(plan) = self.replants.remove(&replant) else {
                    return;
                };
                let placed = replant::commit(host, &plan);
                log::trace!("{replant}: placed {placed} {}", plan.sapling);
                self.emit(SimEventKind::SaplingPlanted {
                    replant,
                    sapling: plan.sapling,
                    placed,
                });
            }
        }
    }

    fn process_felling_step<H: Host + ?Sized>(&mut self, host: &mut H, id: SessionId) {
        let rules = &self.rules;
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        match session.advance(host, |m| rules.is_trunk(m)) {
            SessionStep::Continue => {
                let next = self.tick + session.interval_ticks;
                self.event_queue
                    .schedule(next, ScheduledEventKind::FellingStep { session: id });
            }
            SessionStep::Abandoned => {
                let Some(session) = self.sessions.remove(&id) else {
                    return;
                };
                self.active_actors.remove(&session.actor);
                let actor = session.actor;
                let processed = session.cursor();
                session.abandon(host);
                log::debug!("{id}: {actor:?} went offline after {processed} blocks");
                self.emit(SimEventKind::FellingAbandoned {
                    session: id,
                    actor,
                    processed,
                });
            }
            SessionStep::Completed => {
                let Some(session) = self.sessions.remove(&id) else {
                    return;
                };
                self.active_actors.remove(&session.actor);
                let felled = session.complete(host, &self.rules.durability);
                self.emit(SimEventKind::FellingCompleted {
                    session: id,
                    actor: felled.actor,
                    blocks: felled.blocks.len(),
                    durability_charged: felled.durability_charged,
                });
                self.start_leaf_decay(&*host, felled.actor, &felled.blocks, &felled.originals);
                self.schedule_replant(&*host, &felled.blocks, &felled.originals);
            }
        }
    }

    fn process_decay_batch<H: Host + ?Sized>(&mut self, host: &mut H, id: DecayJobId) {
        let Some(job) = self.decay_jobs.get_mut(&id) else {
            return;
        };
        match job.run_batch(host) {
            JobStatus::Pending => {
                let next = self.tick + job.interval_ticks();
                self.event_queue
                    .schedule(next, ScheduledEventKind::LeafDecayBatch { job: id });
            }
            JobStatus::Finished => {
                let removed = job.removed();
                self.decay_jobs.remove(&id);
                self.emit(SimEventKind::LeafDecayFinished { job: id, removed });
            }
        }
    }
}
