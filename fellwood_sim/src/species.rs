// Tree species: a data table, not a type hierarchy.
//
// Every species behaves identically during felling; they differ only in the
// default limits applied to the collector (enabled flag, max block count,
// horizontal and vertical radius). `Species::defaults()` is that table.
// `SpeciesLimit` is the configuration-derived override, rebuilt in full on
// every reload by `rules.rs` and read-only afterwards.
//
// Species are identified from the broken block's material. Mushroom stems
// are shared by both huge-mushroom species, so a stem is resolved by looking
// for a cap nearby: first straight up the stem, then in a 7×7 area over five
// layers starting at the stem's own level.
//
// See also: `rules.rs` for how limits combine with the global cap,
// `config.rs` for the override document (`SpeciesLimitOverride`).

use crate::config::SpeciesLimitOverride;
use crate::host::BlockAccess;
use crate::material::Material;
use crate::types::BlockPos;
use serde::{Deserialize, Serialize};

/// How far up a mushroom stem the cap search goes.
const MUSHROOM_STEM_SCAN: i32 = 6;
/// Horizontal radius of the fallback cap search around a stem.
const MUSHROOM_CAP_RADIUS: i32 = 3;
/// Number of layers (dy = 0..LAYERS) in the fallback cap search.
const MUSHROOM_CAP_LAYERS: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Mangrove,
    Jungle,
    Spruce,
    Oak,
    PaleOak,
    DarkOak,
    Birch,
    Acacia,
    Cherry,
    MushroomBrown,
    MushroomRed,
    Warped,
    Crimson,
}

/// Immutable per-species defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeciesDefaults {
    pub enabled: bool,
    /// `-1` means uncapped.
    pub max_blocks: i32,
    pub horizontal_radius: i32,
    pub vertical_radius: i32,
}

const fn defaults(enabled: bool, max_blocks: i32, h: i32, v: i32) -> SpeciesDefaults {
    SpeciesDefaults {
        enabled,
        max_blocks,
        horizontal_radius: h,
        vertical_radius: v,
    }
}

impl Species {
    pub const ALL: [Species; 13] = [
        Species::Mangrove,
        Species::Jungle,
        Species::Spruce,
        Species::Oak,
        Species::PaleOak,
        Species::DarkOak,
        Species::Birch,
        Species::Acacia,
        Species::Cherry,
        Species::MushroomBrown,
        Species::MushroomRed,
        Species::Warped,
        Species::Crimson,
    ];

    pub const fn defaults(self) -> SpeciesDefaults {
        match self {
            Species::Mangrove => defaults(true, 128, 9, 32),
            Species::Jungle => defaults(true, -1, 8, 32),
            Species::Spruce => defaults(true, -1, 5, 30),
            Species::Oak => defaults(true, -1, 6, 24),
            Species::PaleOak => defaults(true, -1, 5, 16),
            Species::DarkOak => defaults(true, -1, 6, 12),
            Species::Birch => defaults(true, -1, 2, 12),
            Species::Acacia => defaults(true, -1, 8, 12),
            Species::Cherry => defaults(true, -1, 9, 12),
            Species::MushroomBrown => defaults(true, -1, 4, 12),
            Species::MushroomRed => defaults(true, -1, 2, 12),
            Species::Warped => defaults(true, -1, 6, 32),
            Species::Crimson => defaults(true, -1, 6, 32),
        }
    }

    /// Key under `species_limits` in the configuration document.
    pub const fn config_key(self) -> &'static str {
        match self {
            Species::Mangrove => "mangrove",
            Species::Jungle => "jungle",
            Species::Spruce => "spruce",
            Species::Oak => "oak",
            Species::PaleOak => "pale_oak",
            Species::DarkOak => "dark_oak",
            Species::Birch => "birch",
            Species::Acacia => "acacia",
            Species::Cherry => "cherry",
            Species::MushroomBrown => "mushroom_brown",
            Species::MushroomRed => "mushroom_red",
            Species::Warped => "warped",
            Species::Crimson => "crimson",
        }
    }

    /// Accepts the snake-case key or its kebab-case spelling.
    pub fn from_config_key(key: &str) -> Option<Self> {
        let normalized = key.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|s| s.config_key() == normalized)
    }

    /// Direct material → species lookup. Mushroom stems are ambiguous and
    /// return `None`; see `detect_species`.
    pub fn of_material(material: Material) -> Option<Self> {
        use Material::*;
        let species = match material {
            MangroveLog | StrippedMangroveLog | MangroveWood | StrippedMangroveWood
            | MangroveRoots | MuddyMangroveRoots => Species::Mangrove,
            JungleLog | StrippedJungleLog | JungleWood | StrippedJungleWood => Species::Jungle,
            SpruceLog | StrippedSpruceLog | SpruceWood | StrippedSpruceWood => Species::Spruce,
            OakLog | StrippedOakLog | OakWood | StrippedOakWood => Species::Oak,
            PaleOakLog | StrippedPaleOakLog | PaleOakWood | StrippedPaleOakWood => {
                Species::PaleOak
            }
            DarkOakLog | StrippedDarkOakLog | DarkOakWood | StrippedDarkOakWood => {
                Species::DarkOak
            }
            BirchLog | StrippedBirchLog | BirchWood | StrippedBirchWood => Species::Birch,
            AcaciaLog | StrippedAcaciaLog | AcaciaWood | StrippedAcaciaWood => Species::Acacia,
            CherryLog | StrippedCherryLog | CherryWood | StrippedCherryWood => Species::Cherry,
            BrownMushroomBlock => Species::MushroomBrown,
            RedMushroomBlock => Species::MushroomRed,
            WarpedStem | StrippedWarpedStem | WarpedHyphae | StrippedWarpedHyphae => {
                Species::Warped
            }
            CrimsonStem | StrippedCrimsonStem | CrimsonHyphae | StrippedCrimsonHyphae => {
                Species::Crimson
            }
            _ => return None,
        };
        Some(species)
    }

    fn is_mushroom(self) -> bool {
        matches!(self, Species::MushroomBrown | Species::MushroomRed)
    }
}

/// Identify the species of the block at `pos`, resolving mushroom stems by
/// searching for an adjacent cap.
pub fn detect_species<W: BlockAccess + ?Sized>(world: &W, pos: BlockPos) -> Option<Species> {
    let material = world.block(pos);
    if let Some(species) = Species::of_material(material) {
        return Some(species);
    }
    if material == Material::MushroomStem {
        return detect_mushroom_species(world, pos);
    }
    None
}

fn detect_mushroom_species<W: BlockAccess + ?Sized>(world: &W, stem: BlockPos) -> Option<Species> {
    let mushroom_at = |pos: BlockPos| Species::of_material(world.block(pos)).filter(|s| s.is_mushroom());

    // Straight up the stem until something that is not stem.
    for dy in 1..=MUSHROOM_STEM_SCAN {
        let candidate = stem.offset(0, dy, 0);
        if let Some(species) = mushroom_at(candidate) {
            return Some(species);
        }
        if world.block(candidate) != Material::MushroomStem {
            break;
        }
    }

    for dy in 0..MUSHROOM_CAP_LAYERS {
        for dx in -MUSHROOM_CAP_RADIUS..=MUSHROOM_CAP_RADIUS {
            for dz in -MUSHROOM_CAP_RADIUS..=MUSHROOM_CAP_RADIUS {
                if dx == 0 && dy == 0 && dz == 0 {
                    continue;
                }
                if let Some(species) = mushroom_at(stem.offset(dx, dy, dz)) {
                    return Some(species);
                }
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Configured limits
// ---------------------------------------------------------------------------

/// Configuration-derived limits for one species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesLimit {
    pub enabled: bool,
    /// `-1` means uncapped; values below 1 are normalized to `-1`.
    pub max_blocks: i32,
    /// 0 means no horizontal limit.
    pub max_horizontal_radius: u32,
    /// 0 means no vertical limit.
    pub max_vertical_radius: u32,
}

impl SpeciesLimit {
    /// Defaults for `species`, with `overrides` applied on top.
    pub fn build(species: Species, overrides: Option<&SpeciesLimitOverride>) -> Self {
        let d = species.defaults();
        let mut enabled = d.enabled;
        let mut max_blocks = d.max_blocks;
        let mut horizontal = d.horizontal_radius.max(0);
        let mut vertical = d.vertical_radius.max(0);

        if let Some(o) = overrides {
            enabled = o.enabled.unwrap_or(enabled);
            max_blocks = o.max_blocks.unwrap_or(max_blocks);
            if let Some(h) = o.max_horizontal_radius {
                horizontal = h.max(0);
            }
            if let Some(v) = o.max_vertical_radius {
                vertical = v.max(0);
            }
        }

        Self {
            enabled,
            max_blocks: if max_blocks < 1 { -1 } else { max_blocks },
            max_horizontal_radius: horizontal as u32,
            max_vertical_radius: vertical as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Sandbox;
    use crate::types::WorldId;

    const W: WorldId = WorldId(0);

    #[test]
    fn every_species_has_a_round_trippable_key() {
        for species in Species::ALL {
            assert_eq!(Species::from_config_key(species.config_key()), Some(species));
        }
        assert_eq!(Species::from_config_key("Dark-Oak"), Some(Species::DarkOak));
        assert_eq!(Species::from_config_key("baobab"), None);
    }

    #[test]
    fn material_lookup_covers_variants() {
        assert_eq!(Species::of_material(Material::StrippedOakWood), Some(Species::Oak));
        assert_eq!(
            Species::of_material(Material::MuddyMangroveRoots),
            Some(Species::Mangrove)
        );
        assert_eq!(Species::of_material(Material::WarpedHyphae), Some(Species::Warped));
        assert_eq!(Species::of_material(Material::MushroomStem), None);
        assert_eq!(Species::of_material(Material::Stone), None);
    }

    #[test]
    fn mangrove_defaults_are_capped() {
        let d = Species::Mangrove.defaults();
        assert_eq!(d.max_blocks, 128);
        assert_eq!(d.horizontal_radius, 9);
        assert_eq!(Species::Birch.defaults().max_blocks, -1);
    }

    #[test]
    fn limit_normalizes_non_positive_cap() {
        let o = SpeciesLimitOverride {
            max_blocks: Some(0),
            ..Default::default()
        };
        assert_eq!(SpeciesLimit::build(Species::Mangrove, Some(&o)).max_blocks, -1);
    }

    #[test]
    fn limit_overrides_apply_and_clamp() {
        let o = SpeciesLimitOverride {
            enabled: Some(false),
            max_blocks: Some(40),
            max_horizontal_radius: Some(-3),
            max_vertical_radius: Some(7),
        };
        let limit = SpeciesLimit::build(Species::Oak, Some(&o));
        assert!(!limit.enabled);
        assert_eq!(limit.max_blocks, 40);
        assert_eq!(limit.max_horizontal_radius, 0);
        assert_eq!(limit.max_vertical_radius, 7);
    }

    #[test]
    fn limit_without_override_uses_defaults() {
        let limit = SpeciesLimit::build(Species::Spruce, None);
        assert!(limit.enabled);
        assert_eq!(limit.max_blocks, -1);
        assert_eq!(limit.max_horizontal_radius, 5);
        assert_eq!(limit.max_vertical_radius, 30);
    }

    #[test]
    fn stem_resolves_via_cap_above() {
        let mut sandbox = Sandbox::new();
        let stem = BlockPos::new(W, 5, 1, 5);
        for dy in 0..3 {
            sandbox.set(stem.offset(0, dy, 0), Material::MushroomStem);
        }
        sandbox.set(stem.offset(0, 3, 0), Material::RedMushroomBlock);
        assert_eq!(detect_species(&sandbox, stem), Some(Species::MushroomRed));
    }

    #[test]
    fn stem_resolves_via_nearby_cap() {
        let mut sandbox = Sandbox::new();
        let stem = BlockPos::new(W, 8, 1, 8);
        sandbox.set(stem, Material::MushroomStem);
        // Something other than stem directly above stops the upward scan.
        sandbox.set(stem.offset(0, 1, 0), Material::Stone);
        sandbox.set(stem.offset(3, 4, -3), Material::BrownMushroomBlock);
        assert_eq!(detect_species(&sandbox, stem), Some(Species::MushroomBrown));
    }

    #[test]
    fn stem_without_cap_is_unknown() {
        let mut sandbox = Sandbox::new();
        let stem = BlockPos::new(W, 8, 1, 8);
        sandbox.set(stem, Material::MushroomStem);
        // Outside the 7×7 search area.
        sandbox.set(stem.offset(4, 1, 0), Material::BrownMushroomBlock);
        // Above the five searched layers.
        sandbox.set(stem.offset(1, 5, 0), Material::RedMushroomBlock);
        assert_eq!(detect_species(&sandbox, stem), None);
    }
}
