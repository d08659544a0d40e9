// Compiled felling rules.
//
// `Rules::compile()` turns the two configuration documents into the lookup
// structures the hot paths use: the trunk material set (union of the enabled
// category entries), the allowed axe set, per-species limits, the leaf
// mapping, the sapling allow-list, and the clamped scalar parameters.
//
// Name resolution goes through `Material::from_name`. Unknown names and
// malformed entries are configuration anomalies: logged at `debug` and
// skipped, never fatal. Scalar values are clamped into range here so that
// nothing downstream has to re-check them.
//
// Two category quirks carried from the on-disk format:
// - `MANGROVE_ROOTS` is a log unless the logs map sets it explicitly.
// - `MUDDY_MANGROVE_ROOTS` is never a log, whatever the logs map says.
//
// `FellingSim` holds one `Rules` and swaps it wholesale on reload. Sessions
// and decay jobs copy the scalar parameters they need when they start, so a
// reload does not change the pacing of work already in flight.
//
// See also: `config.rs` for the documents, `species.rs` for `SpeciesLimit`,
// `leaves.rs` for `LeafMapping`.

use crate::collector::CollectParams;
use crate::config::{DurabilityMode, FellingConfig, LeafMappingDoc, SneakMode};
use crate::host::ItemStack;
use crate::leaves::LeafMapping;
use crate::material::{Material, VANILLA_AXES};
use crate::species::{Species, SpeciesLimit};
use crate::types::Connectivity;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};

/// Leaf decay parameters after clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecayParams {
    /// Maximum cascade depth; 0 disables decay.
    pub max_depth: u32,
    pub batch_interval_ticks: u64,
    pub batch_size: u32,
    pub max_distance_squared: i64,
    pub connectivity: Connectivity,
}

/// Tool requirements and wear.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurabilityParams {
    pub min_remaining: u32,
    pub mode: DurabilityMode,
    pub multiplier: f64,
}

#[derive(Clone, Debug)]
pub struct Rules {
    trunk: FxHashSet<Material>,
    allowed_axes: FxHashSet<Material>,
    species_limits: BTreeMap<Species, SpeciesLimit>,
    pub leaf_mapping: LeafMapping,
    /// `None` means every sapling may be planted.
    allowed_saplings: Option<BTreeSet<Material>>,

    pub timber_enabled: bool,
    pub leaves_decay_enabled: bool,
    pub replant_enabled: bool,
    pub connectivity: Connectivity,
    pub max_blocks: u32,
    pub sneak_mode: SneakMode,
    pub break_interval_ticks: u64,
    pub blocks_per_step: u32,
    pub rejection_notice_cooldown_ticks: u64,
    pub permission: String,
    pub decay: DecayParams,
    pub durability: DurabilityParams,
    pub replant_delay_ticks: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self::compile(&FellingConfig::default(), &LeafMappingDoc::default())
    }
}

fn resolve(name: &str, context: &str) -> Option<Material> {
    let material = Material::from_name(name);
    if material.is_none() {
        log::debug!("ignoring unknown material in {context}: {name}");
    }
    material
}

fn load_category(entries: &BTreeMap<String, bool>, context: &str, into: &mut FxHashSet<Material>) {
    for (name, &enabled) in entries {
        if !enabled {
            continue;
        }
        if let Some(m) = resolve(name, context) {
            into.insert(m);
        }
    }
}

/// `Some(enabled)` if the logs map names `material` explicitly.
fn explicit_entry(entries: &BTreeMap<String, bool>, material: Material) -> Option<bool> {
    entries
        .iter()
        .find(|(name, _)| Material::from_name(name) == Some(material))
        .map(|(_, &enabled)| enabled)
}

fn clamp_u32(value: i64, min: u32) -> u32 {
    value.clamp(min as i64, u32::MAX as i64) as u32
}

impl Rules {
    pub fn compile(config: &FellingConfig, leaves: &LeafMappingDoc) -> Self {
        let categories = &config.categories;
        let mut trunk = FxHashSet::default();
        load_category(&categories.logs, "categories.logs", &mut trunk);
        if explicit_entry(&categories.logs, Material::MangroveRoots).is_none() {
            trunk.insert(Material::MangroveRoots);
        }
        trunk.remove(&Material::MuddyMangroveRoots);
        load_category(&categories.stripped_logs, "categories.stripped_logs", &mut trunk);
        load_category(&categories.woods, "categories.woods", &mut trunk);
        load_category(&categories.stripped_woods, "categories.stripped_woods", &mut trunk);
        load_category(&categories.fences, "categories.fences", &mut trunk);
        load_category(&categories.additions, "categories.additions", &mut trunk);

        let mut allowed_axes: FxHashSet<Material> = config
            .tools
            .allowed_axes
            .iter()
            .filter_map(|name| resolve(name, "tools.allowed_axes"))
            .collect();
        if allowed_axes.is_empty() {
            allowed_axes.extend(VANILLA_AXES);
        }

        let saplings: BTreeSet<Material> = config
            .replant
            .saplings
            .iter()
            .filter_map(|name| resolve(name, "replant.saplings"))
            .collect();
        let allowed_saplings = (!saplings.is_empty()).then_some(saplings);

        for key in config.species_limits.keys() {
            if Species::from_config_key(key).is_none() {
                log::debug!("ignoring unknown species in species_limits: {key}");
            }
        }
        let species_limits = Species::ALL
            .into_iter()
            .map(|species| {
                let overrides = config
                    .species_limits
                    .iter()
                    .find(|(key, _)| Species::from_config_key(key) == Some(species))
                    .map(|(_, o)| o);
                (species, SpeciesLimit::build(species, overrides))
            })
            .collect();

        let mut leaf_mapping = LeafMapping::new();
        for (trunk_name, leaf_names) in &leaves.log_to_leaves {
            let Some(trunk_material) = resolve(trunk_name, "log_to_leaves") else {
                continue;
            };
            if leaf_names.is_empty() {
                continue;
            }
            leaf_mapping.extend(
                trunk_material,
                leaf_names
                    .iter()
                    .filter_map(|name| resolve(name, "log_to_leaves")),
            );
        }

        let connectivity = Connectivity::from_include_diagonals(config.include_diagonals);
        let decay_cfg = &config.leaves_decay;
        let max_distance = decay_cfg.max_distance.max(1) as i64;

        Self {
            trunk,
            allowed_axes,
            species_limits,
            leaf_mapping,
            allowed_saplings,
            timber_enabled: config.timber_enabled,
            leaves_decay_enabled: config.leaves_decay_enabled,
            replant_enabled: config.replant_enabled,
            connectivity,
            max_blocks: clamp_u32(config.max_blocks as i64, 1),
            sneak_mode: config.sneak_mode,
            break_interval_ticks: config.break_interval_ticks.max(1) as u64,
            blocks_per_step: clamp_u32(config.blocks_per_step as i64, 1),
            rejection_notice_cooldown_ticks: config.rejection_notice_cooldown_ticks,
            permission: config.permission.clone(),
            decay: DecayParams {
                max_depth: clamp_u32(decay_cfg.decay_radius as i64, 0),
                batch_interval_ticks: decay_cfg.batch_interval_ticks.max(1) as u64,
                batch_size: clamp_u32(decay_cfg.batch_size as i64, 1),
                max_distance_squared: max_distance * max_distance,
                connectivity,
            },
            durability: DurabilityParams {
                min_remaining: clamp_u32(config.tools.min_remaining_durability as i64, 0),
                mode: config.tools.durability_mode,
                multiplier: config.tools.durability_multiplier,
            },
            replant_delay_ticks: config.replant.delay_ticks,
        }
    }

    pub fn is_trunk(&self, material: Material) -> bool {
        self.trunk.contains(&material)
    }

    pub fn is_allowed_axe(&self, material: Material) -> bool {
        self.allowed_axes.contains(&material)
    }

    /// Damageable tools must have at least the configured remaining
    /// durability; items that do not wear always pass.
    pub fn has_min_durability(&self, tool: &ItemStack) -> bool {
        tool.remaining_durability()
            .is_none_or(|remaining| remaining >= self.durability.min_remaining)
    }

    pub fn is_sapling_allowed(&self, sapling: Material) -> bool {
        self.allowed_saplings
            .as_ref()
            .is_none_or(|set| set.contains(&sapling))
    }

    pub fn species_limit(&self, species: Species) -> Option<&SpeciesLimit> {
        self.species_limits.get(&species)
    }

    /// Traversal limits for a tree of `species`. The tighter of the global
    /// and species caps wins; positive species radii apply. A disabled
    /// species limit contributes nothing.
    pub fn collect_params(&self, species: Option<Species>) -> CollectParams {
        let mut params = CollectParams::unlimited_radius(self.max_blocks, self.connectivity);
        let Some(limit) = species
            .and_then(|s| self.species_limit(s))
            .filter(|limit| limit.enabled)
        else {
            return params;
        };
        if limit.max_blocks > 0 && (limit.max_blocks as u32) < self.max_blocks {
            params.max_blocks = limit.max_blocks as u32;
        }
        params.max_horizontal_radius = limit.max_horizontal_radius;
        params.max_vertical_radius = limit.max_vertical_radius;
        params
    }
}
