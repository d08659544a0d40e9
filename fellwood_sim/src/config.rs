// Data-driven felling configuration.
//
// Two serde documents, both loaded from JSON:
// - `FellingConfig`: feature toggles, caps, radii, intervals, batch sizes,
//   tool and durability parameters, the material category maps and the
//   per-species limit overrides.
// - `LeafMappingDoc`: `{"log_to_leaves": {"OAK_LOG": ["OAK_LEAVES", ...]}}`,
//   the trunk → leaf palette table, kept in its own document so it can be
//   edited independently.
//
// Every field has a default (`#[serde(default)]` on each struct), so a
// partial document loads with the rest filled in. Field names are
// snake_case; the kebab-case spellings of the on-disk format are accepted
// as aliases. Values are stored as written: clamping, name resolution and
// anomaly logging happen in `Rules::compile()`. The one exception is map
// entries (categories, species limits, leaf palettes) whose value has the
// wrong shape: those are dropped here with a debug log, one entry at a
// time. The only load failures are I/O and malformed JSON (`ConfigError`).
//
// See also: `rules.rs` which compiles these documents into lookup sets,
// `species.rs` for `SpeciesLimit` built from `SpeciesLimitOverride`.

use crate::material::Material;
use crate::species::Species;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a configuration document. Content anomalies (unknown
/// material names, out-of-range numbers) are not errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

fn read_document(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserializes a JSON object one entry at a time. Entries whose value does
/// not convert to `T` are logged and dropped; the rest of the map loads.
fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(parsed) => Some((key, parsed)),
            Err(err) => {
                log::debug!("skipping malformed config entry {key:?}: {err}");
                None
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Enumerated settings
// ---------------------------------------------------------------------------

/// Which posture enables felling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SneakMode {
    /// Only while sneaking.
    #[default]
    SneakingOnly,
    /// Only while not sneaking.
    StandingOnly,
    Always,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SneakModeRepr {
    Code(i64),
    Name(String),
    Other(IgnoredAny),
}

/// Accepts the mode name (snake or kebab case, any letter case) or the
/// numeric code `0`/`1`/`2`. Anything unrecognized reads as `SneakingOnly`.
impl<'de> Deserialize<'de> for SneakMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mode = match SneakModeRepr::deserialize(deserializer)? {
            SneakModeRepr::Code(0) => Some(SneakMode::SneakingOnly),
            SneakModeRepr::Code(1) => Some(SneakMode::StandingOnly),
            SneakModeRepr::Code(2) => Some(SneakMode::Always),
            SneakModeRepr::Code(_) | SneakModeRepr::Other(_) => None,
            SneakModeRepr::Name(name) => match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                "sneaking_only" | "sneak_only" => Some(SneakMode::SneakingOnly),
                "standing_only" | "not_sneaking" => Some(SneakMode::StandingOnly),
                "always" => Some(SneakMode::Always),
                _ => None,
            },
        };
        Ok(mode.unwrap_or_else(|| {
            log::debug!("unrecognized sneak mode, using sneaking_only");
            SneakMode::SneakingOnly
        }))
    }
}

impl SneakMode {
    pub fn allows(self, sneaking: bool) -> bool {
        match self {
            SneakMode::SneakingOnly => sneaking,
            SneakMode::StandingOnly => !sneaking,
            SneakMode::Always => true,
        }
    }
}

/// How a completed felling charges the tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DurabilityMode {
    /// Only the natural cost of the first break.
    #[default]
    First,
    /// Scaled by the number of blocks felled.
    All,
}

impl Serialize for DurabilityMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            DurabilityMode::First => "first",
            DurabilityMode::All => "all",
        })
    }
}

/// Anything other than `all` (case-insensitive) reads as `first`.
impl<'de> Deserialize<'de> for DurabilityMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s.trim().eq_ignore_ascii_case("all") {
            DurabilityMode::All
        } else {
            DurabilityMode::First
        })
    }
}

// ---------------------------------------------------------------------------
// Nested parameter groups
// ---------------------------------------------------------------------------

/// Leaf decay cascade parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafDecayConfig {
    /// Maximum cascade depth. 0 disables decay.
    #[serde(alias = "decay-radius")]
    pub decay_radius: i32,
    #[serde(alias = "batch-interval-ticks")]
    pub batch_interval_ticks: i64,
    /// Leaves removed per batch.
    #[serde(alias = "batch-size")]
    pub batch_size: i32,
    /// Euclidean distance (in blocks) from the originating trunk block.
    #[serde(alias = "max-distance")]
    pub max_distance: i32,
}

impl Default for LeafDecayConfig {
    fn default() -> Self {
        Self {
            decay_radius: 5,
            batch_interval_ticks: 2,
            batch_size: 20,
            max_distance: 4,
        }
    }
}

/// Which tools may fell and what felling costs them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Material names. Empty means the six vanilla axes.
    #[serde(alias = "allowed-axes")]
    pub allowed_axes: Vec<String>,
    /// Tools with less remaining durability than this cannot fell.
    #[serde(alias = "min-remaining-durability")]
    pub min_remaining_durability: i32,
    #[serde(alias = "durability-mode")]
    pub durability_mode: DurabilityMode,
    #[serde(alias = "durability-multiplier")]
    pub durability_multiplier: f64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            allowed_axes: Vec::new(),
            min_remaining_durability: 10,
            durability_mode: DurabilityMode::First,
            durability_multiplier: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplantConfig {
    /// Sapling allow-list by material name. Empty means every sapling.
    pub saplings: Vec<String>,
    /// Delay between felling completion and placement.
    #[serde(alias = "delay-ticks")]
    pub delay_ticks: u64,
}

impl Default for ReplantConfig {
    fn default() -> Self {
        Self {
            saplings: Vec::new(),
            delay_ticks: 2,
        }
    }
}

/// Trunk material categories. Each map is material name → enabled; the
/// union of enabled entries across all six maps is the trunk set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    #[serde(deserialize_with = "lenient_map")]
    pub logs: BTreeMap<String, bool>,
    #[serde(alias = "stripped-logs", deserialize_with = "lenient_map")]
    pub stripped_logs: BTreeMap<String, bool>,
    #[serde(deserialize_with = "lenient_map")]
    pub woods: BTreeMap<String, bool>,
    #[serde(alias = "stripped-woods", deserialize_with = "lenient_map")]
    pub stripped_woods: BTreeMap<String, bool>,
    #[serde(deserialize_with = "lenient_map")]
    pub fences: BTreeMap<String, bool>,
    #[serde(deserialize_with = "lenient_map")]
    pub additions: BTreeMap<String, bool>,
}

fn category(materials: &[Material], enabled: bool) -> BTreeMap<String, bool> {
    materials
        .iter()
        .map(|m| (m.name().to_string(), enabled))
        .collect()
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        use Material::*;
        Self {
            logs: category(
                &[
                    OakLog, SpruceLog, BirchLog, JungleLog, AcaciaLog, DarkOakLog, MangroveLog,
                    CherryLog, PaleOakLog, CrimsonStem, WarpedStem,
                ],
                true,
            ),
            stripped_logs: category(
                &[
                    StrippedOakLog,
                    StrippedSpruceLog,
                    StrippedBirchLog,
                    StrippedJungleLog,
                    StrippedAcaciaLog,
                    StrippedDarkOakLog,
                    StrippedMangroveLog,
                    StrippedCherryLog,
                    StrippedPaleOakLog,
                    StrippedCrimsonStem,
                    StrippedWarpedStem,
                ],
                true,
            ),
            woods: category(
                &[
                    OakWood, SpruceWood, BirchWood, JungleWood, AcaciaWood, DarkOakWood,
                    MangroveWood, CherryWood, PaleOakWood, CrimsonHyphae, WarpedHyphae,
                ],
                true,
            ),
            stripped_woods: category(
                &[
                    StrippedOakWood,
                    StrippedSpruceWood,
                    StrippedBirchWood,
                    StrippedJungleWood,
                    StrippedAcaciaWood,
                    StrippedDarkOakWood,
                    StrippedMangroveWood,
                    StrippedCherryWood,
                    StrippedPaleOakWood,
                    StrippedCrimsonHyphae,
                    StrippedWarpedHyphae,
                ],
                true,
            ),
            // Listed but off by default.
            fences: category(
                &[
                    OakFence,
                    SpruceFence,
                    BirchFence,
                    JungleFence,
                    AcaciaFence,
                    DarkOakFence,
                    MangroveFence,
                    CherryFence,
                    PaleOakFence,
                    CrimsonFence,
                    WarpedFence,
                ],
                false,
            ),
            additions: category(&[MushroomStem, BrownMushroomBlock, RedMushroomBlock], true),
        }
    }
}

/// Optional per-species overrides. Unset fields keep the species default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesLimitOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(alias = "max-blocks", skip_serializing_if = "Option::is_none")]
    pub max_blocks: Option<i32>,
    #[serde(alias = "max-horizontal-radius", skip_serializing_if = "Option::is_none")]
    pub max_horizontal_radius: Option<i32>,
    #[serde(alias = "max-vertical-radius", skip_serializing_if = "Option::is_none")]
    pub max_vertical_radius: Option<i32>,
}

// ---------------------------------------------------------------------------
// Top-level documents
// ---------------------------------------------------------------------------

/// All felling tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FellingConfig {
    /// Multi-block felling. When off, only leaf decay follows a trunk break.
    #[serde(alias = "enable-timber")]
    pub timber_enabled: bool,
    #[serde(alias = "enable-leaves-decay")]
    pub leaves_decay_enabled: bool,
    #[serde(alias = "enable-replant")]
    pub replant_enabled: bool,
    /// 26-connectivity instead of 6 for both traversals.
    #[serde(alias = "include-diagonals")]
    pub include_diagonals: bool,
    /// Global cap on blocks collected per felling.
    #[serde(alias = "max-blocks")]
    pub max_blocks: i32,
    #[serde(alias = "sneak-mode")]
    pub sneak_mode: SneakMode,
    /// Ticks between felling steps.
    #[serde(alias = "break-interval-ticks")]
    pub break_interval_ticks: i64,
    /// Blocks broken per felling step.
    #[serde(alias = "blocks-per-step")]
    pub blocks_per_step: i32,
    /// Minimum ticks between two "felling already running" notices for the
    /// same actor.
    #[serde(alias = "rejection-notice-cooldown-ticks")]
    pub rejection_notice_cooldown_ticks: u64,
    /// Permission an actor needs for multi-block felling.
    pub permission: String,
    #[serde(alias = "leaves-decay")]
    pub leaves_decay: LeafDecayConfig,
    pub tools: ToolsConfig,
    pub replant: ReplantConfig,
    pub categories: CategoriesConfig,
    /// Keyed by species config key, e.g. `"dark_oak"` or `"dark-oak"`.
    #[serde(alias = "species-limits", deserialize_with = "lenient_map")]
    pub species_limits: BTreeMap<String, SpeciesLimitOverride>,
}

impl Default for FellingConfig {
    fn default() -> Self {
        Self {
            timber_enabled: true,
            leaves_decay_enabled: true,
            replant_enabled: true,
            include_diagonals: true,
            max_blocks: 1024,
            sneak_mode: SneakMode::SneakingOnly,
            break_interval_ticks: 2,
            blocks_per_step: 1,
            rejection_notice_cooldown_ticks: 18,
            permission: "fellwood.use".to_string(),
            leaves_decay: LeafDecayConfig::default(),
            tools: ToolsConfig::default(),
            replant: ReplantConfig::default(),
            categories: CategoriesConfig::default(),
            species_limits: BTreeMap::new(),
        }
    }
}

impl FellingConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&read_document(path)?)
    }
}

/// Trunk material name → leaf material names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafMappingDoc {
    #[serde(alias = "log-to-leaves", deserialize_with = "lenient_map")]
    pub log_to_leaves: BTreeMap<String, Vec<String>>,
}

impl Default for LeafMappingDoc {
    /// Every trunk variant of a species maps to that species' leaves. Oak
    /// also sheds azalea leaves, since azalea trees grow oak logs.
    fn default() -> Self {
        use Material::*;
        let palettes: [(Species, &[Material]); 9] = [
            (Species::Oak, &[OakLeaves, AzaleaLeaves, FloweringAzaleaLeaves]),
            (Species::Spruce, &[SpruceLeaves]),
            (Species::Birch, &[BirchLeaves]),
            (Species::Jungle, &[JungleLeaves]),
            (Species::Acacia, &[AcaciaLeaves]),
            (Species::DarkOak, &[DarkOakLeaves]),
            (Species::Mangrove, &[MangroveLeaves]),
            (Species::Cherry, &[CherryLeaves]),
            (Species::PaleOak, &[PaleOakLeaves]),
        ];
        let mut log_to_leaves = BTreeMap::new();
        for (species, leaves) in palettes {
            let names: Vec<String> = leaves.iter().map(|m| m.name().to_string()).collect();
            for &trunk in Material::ALL {
                if Species::of_material(trunk) == Some(species) {
                    log_to_leaves.insert(trunk.name().to_string(), names.clone());
                }
            }
        }
        Self { log_to_leaves }
    }
}

impl LeafMappingDoc {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&read_document(path)?)
    }
}
