// Block and item material identities.
//
// `Material` is a closed enum of every block or item identity the felling
// core reasons about: trunk blocks of every tree species (plain, stripped,
// "wood"/"hyphae"), wooden fences, mangrove roots, mushroom blocks, leaves,
// saplings and their nether/mangrove equivalents, soils, fluids, passable
// ground cover, and the tools that can fell. Anything the core never needs
// to distinguish is left to the host.
//
// Each variant has a canonical upper-snake name (`OAK_LOG`), which is what
// configuration documents use. `Material::from_name` is lenient the same way
// the configuration files are: case-insensitive, with an optional
// `minecraft:` namespace.
//
// See also: `rules.rs` which resolves configuration names through
// `from_name`, `species.rs` for the material → species table, `replant.rs`
// for the trunk → sapling table and the soil sets.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! materials {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// A block or item identity.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Material {
            $($variant),*
        }

        impl Material {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Material] = &[$(Material::$variant),*];

            /// Canonical upper-snake name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Material::$variant => $name),*
                }
            }
        }
    };
}

materials! {
    Air => "AIR",
    CaveAir => "CAVE_AIR",
    VoidAir => "VOID_AIR",
    Water => "WATER",
    BubbleColumn => "BUBBLE_COLUMN",
    Lava => "LAVA",
    Stone => "STONE",
    Sand => "SAND",
    Gravel => "GRAVEL",

    // Soils.
    Dirt => "DIRT",
    GrassBlock => "GRASS_BLOCK",
    Podzol => "PODZOL",
    CoarseDirt => "COARSE_DIRT",
    RootedDirt => "ROOTED_DIRT",
    Mycelium => "MYCELIUM",
    MossBlock => "MOSS_BLOCK",
    Farmland => "FARMLAND",
    Mud => "MUD",
    CrimsonNylium => "CRIMSON_NYLIUM",
    WarpedNylium => "WARPED_NYLIUM",
    Netherrack => "NETHERRACK",

    // Passable ground cover.
    ShortGrass => "SHORT_GRASS",
    Fern => "FERN",
    DeadBush => "DEAD_BUSH",
    Snow => "SNOW",
    Vine => "VINE",

    // Overworld trunks.
    OakLog => "OAK_LOG",
    StrippedOakLog => "STRIPPED_OAK_LOG",
    OakWood => "OAK_WOOD",
    StrippedOakWood => "STRIPPED_OAK_WOOD",
    SpruceLog => "SPRUCE_LOG",
    StrippedSpruceLog => "STRIPPED_SPRUCE_LOG",
    SpruceWood => "SPRUCE_WOOD",
    StrippedSpruceWood => "STRIPPED_SPRUCE_WOOD",
    BirchLog => "BIRCH_LOG",
    StrippedBirchLog => "STRIPPED_BIRCH_LOG",
    BirchWood => "BIRCH_WOOD",
    StrippedBirchWood => "STRIPPED_BIRCH_WOOD",
    JungleLog => "JUNGLE_LOG",
    StrippedJungleLog => "STRIPPED_JUNGLE_LOG",
    JungleWood => "JUNGLE_WOOD",
    StrippedJungleWood => "STRIPPED_JUNGLE_WOOD",
    AcaciaLog => "ACACIA_LOG",
    StrippedAcaciaLog => "STRIPPED_ACACIA_LOG",
    AcaciaWood => "ACACIA_WOOD",
    StrippedAcaciaWood => "STRIPPED_ACACIA_WOOD",
    DarkOakLog => "DARK_OAK_LOG",
    StrippedDarkOakLog => "STRIPPED_DARK_OAK_LOG",
    DarkOakWood => "DARK_OAK_WOOD",
    StrippedDarkOakWood => "STRIPPED_DARK_OAK_WOOD",
    MangroveLog => "MANGROVE_LOG",
    StrippedMangroveLog => "STRIPPED_MANGROVE_LOG",
    MangroveWood => "MANGROVE_WOOD",
    StrippedMangroveWood => "STRIPPED_MANGROVE_WOOD",
    MangroveRoots => "MANGROVE_ROOTS",
    MuddyMangroveRoots => "MUDDY_MANGROVE_ROOTS",
    CherryLog => "CHERRY_LOG",
    StrippedCherryLog => "STRIPPED_CHERRY_LOG",
    CherryWood => "CHERRY_WOOD",
    StrippedCherryWood => "STRIPPED_CHERRY_WOOD",
    PaleOakLog => "PALE_OAK_LOG",
    StrippedPaleOakLog => "STRIPPED_PALE_OAK_LOG",
    PaleOakWood => "PALE_OAK_WOOD",
    StrippedPaleOakWood => "STRIPPED_PALE_OAK_WOOD",

    // Nether stems.
    CrimsonStem => "CRIMSON_STEM",
    StrippedCrimsonStem => "STRIPPED_CRIMSON_STEM",
    CrimsonHyphae => "CRIMSON_HYPHAE",
    StrippedCrimsonHyphae => "STRIPPED_CRIMSON_HYPHAE",
    WarpedStem => "WARPED_STEM",
    StrippedWarpedStem => "STRIPPED_WARPED_STEM",
    WarpedHyphae => "WARPED_HYPHAE",
    StrippedWarpedHyphae => "STRIPPED_WARPED_HYPHAE",
    NetherWartBlock => "NETHER_WART_BLOCK",
    WarpedWartBlock => "WARPED_WART_BLOCK",
    Shroomlight => "SHROOMLIGHT",

    // Huge mushrooms.
    MushroomStem => "MUSHROOM_STEM",
    BrownMushroomBlock => "BROWN_MUSHROOM_BLOCK",
    RedMushroomBlock => "RED_MUSHROOM_BLOCK",

    // Fences.
    OakFence => "OAK_FENCE",
    SpruceFence => "SPRUCE_FENCE",
    BirchFence => "BIRCH_FENCE",
    JungleFence => "JUNGLE_FENCE",
    AcaciaFence => "ACACIA_FENCE",
    DarkOakFence => "DARK_OAK_FENCE",
    MangroveFence => "MANGROVE_FENCE",
    CherryFence => "CHERRY_FENCE",
    PaleOakFence => "PALE_OAK_FENCE",
    CrimsonFence => "CRIMSON_FENCE",
    WarpedFence => "WARPED_FENCE",

    // Leaves.
    OakLeaves => "OAK_LEAVES",
    SpruceLeaves => "SPRUCE_LEAVES",
    BirchLeaves => "BIRCH_LEAVES",
    JungleLeaves => "JUNGLE_LEAVES",
    AcaciaLeaves => "ACACIA_LEAVES",
    DarkOakLeaves => "DARK_OAK_LEAVES",
    MangroveLeaves => "MANGROVE_LEAVES",
    CherryLeaves => "CHERRY_LEAVES",
    PaleOakLeaves => "PALE_OAK_LEAVES",
    AzaleaLeaves => "AZALEA_LEAVES",
    FloweringAzaleaLeaves => "FLOWERING_AZALEA_LEAVES",

    // Saplings and their equivalents.
    OakSapling => "OAK_SAPLING",
    SpruceSapling => "SPRUCE_SAPLING",
    BirchSapling => "BIRCH_SAPLING",
    JungleSapling => "JUNGLE_SAPLING",
    AcaciaSapling => "ACACIA_SAPLING",
    DarkOakSapling => "DARK_OAK_SAPLING",
    CherrySapling => "CHERRY_SAPLING",
    PaleOakSapling => "PALE_OAK_SAPLING",
    MangrovePropagule => "MANGROVE_PROPAGULE",
    CrimsonFungus => "CRIMSON_FUNGUS",
    WarpedFungus => "WARPED_FUNGUS",

    // Tools.
    WoodenAxe => "WOODEN_AXE",
    StoneAxe => "STONE_AXE",
    IronAxe => "IRON_AXE",
    GoldenAxe => "GOLDEN_AXE",
    DiamondAxe => "DIAMOND_AXE",
    NetheriteAxe => "NETHERITE_AXE",
    DiamondPickaxe => "DIAMOND_PICKAXE",
    Shears => "SHEARS",
    Stick => "STICK",
}

/// The six vanilla axes, used when no axe allow-list is configured.
pub const VANILLA_AXES: [Material; 6] = [
    Material::WoodenAxe,
    Material::StoneAxe,
    Material::IronAxe,
    Material::GoldenAxe,
    Material::DiamondAxe,
    Material::NetheriteAxe,
];

impl Material {
    /// Resolve a configuration name. Case-insensitive; a leading
    /// `minecraft:` namespace is ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        let bare = match trimmed.split_once(':') {
            Some((ns, rest)) if ns.eq_ignore_ascii_case("minecraft") => rest,
            _ => trimmed,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(bare))
    }

    pub fn is_air(self) -> bool {
        matches!(self, Self::Air | Self::CaveAir | Self::VoidAir)
    }

    /// Leaf-typed blocks are recognised by name, so any `*_LEAVES` or
    /// `*_LEAF` identity qualifies without a separate list.
    pub fn is_leaf(self) -> bool {
        let name = self.name();
        name.ends_with("_LEAVES") || name.ends_with("_LEAF")
    }

    /// Water or a bubble column: only a waterloggable sapling may replace it.
    pub fn is_water_like(self) -> bool {
        matches!(self, Self::Water | Self::BubbleColumn)
    }

    /// Blocks an entity can walk through without collision.
    pub fn is_passable(self) -> bool {
        self.is_air()
            || self.is_water_like()
            || matches!(
                self,
                Self::ShortGrass
                    | Self::Fern
                    | Self::DeadBush
                    | Self::Snow
                    | Self::Vine
                    | Self::OakSapling
                    | Self::SpruceSapling
                    | Self::BirchSapling
                    | Self::JungleSapling
                    | Self::AcaciaSapling
                    | Self::DarkOakSapling
                    | Self::CherrySapling
                    | Self::PaleOakSapling
                    | Self::MangrovePropagule
                    | Self::CrimsonFungus
                    | Self::WarpedFungus
            )
    }

    /// Maximum durability of a damageable item; 0 for everything else.
    pub fn max_durability(self) -> u32 {
        match self {
            Self::WoodenAxe => 59,
            Self::StoneAxe => 131,
            Self::IronAxe => 250,
            Self::GoldenAxe => 32,
            Self::DiamondAxe | Self::DiamondPickaxe => 1561,
            Self::NetheriteAxe => 2031,
            Self::Shears => 238,
            _ => 0,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Serialized by canonical name so event logs and fixtures read like the
// configuration files.
impl Serialize for Material {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Material {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Material::from_name(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown material `{s}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = Material::ALL.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn from_name_is_lenient() {
        assert_eq!(Material::from_name("OAK_LOG"), Some(Material::OakLog));
        assert_eq!(Material::from_name("oak_log"), Some(Material::OakLog));
        assert_eq!(
            Material::from_name("minecraft:Stripped_Oak_Log"),
            Some(Material::StrippedOakLog)
        );
        assert_eq!(Material::from_name(" birch_leaves "), Some(Material::BirchLeaves));
        assert_eq!(Material::from_name("other:oak_log"), None);
        assert_eq!(Material::from_name("PLASTIC_LOG"), None);
    }

    #[test]
    fn leaf_detection_by_name() {
        assert!(Material::OakLeaves.is_leaf());
        assert!(Material::FloweringAzaleaLeaves.is_leaf());
        assert!(!Material::NetherWartBlock.is_leaf());
        assert!(!Material::OakLog.is_leaf());
    }

    #[test]
    fn passability() {
        assert!(Material::Air.is_passable());
        assert!(Material::ShortGrass.is_passable());
        assert!(Material::Water.is_passable());
        assert!(!Material::Stone.is_passable());
        assert!(!Material::OakLog.is_passable());
    }

    #[test]
    fn durability_only_for_tools() {
        assert_eq!(Material::IronAxe.max_durability(), 250);
        assert_eq!(Material::OakLog.max_durability(), 0);
        assert_eq!(Material::Stick.max_durability(), 0);
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&Material::DarkOakLog).unwrap();
        assert_eq!(json, "\"DARK_OAK_LOG\"");
        let back: Material = serde_json::from_str("\"dark_oak_log\"").unwrap();
        assert_eq!(back, Material::DarkOakLog);
        assert!(serde_json::from_str::<Material>("\"NOPE\"").is_err());
    }
}
