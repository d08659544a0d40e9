// Replant planning: where a felled tree grows back.
//
// After a felling session completes, `plan()` looks at every felled block's
// *original* material (from the pre-removal snapshot, since the live blocks
// are air by now) and maps it to a sapling through a fixed table:
// each species' log/wood variants → its sapling, mangrove variants and roots
// → propagule, nether stems/hyphae → fungus. Candidates are dropped when
// unmapped, excluded by the sapling allow-list, or not plantable right now.
//
// Anchor: lowest y, ties broken by `ColumnKey` order (x, then z, then world).
//
// Footprint: all plantable candidates mapped to the anchor's sapling are
// grouped by column, keeping the lowest per column. If at least four columns
// exist, the first column in `ColumnKey` order whose +x, +z and +x+z
// neighbors are also present, all within one block of its elevation, yields
// a 2×2 footprint. Otherwise the anchor alone is planted.
//
// Plantability: the block below must be a soil compatible with the sapling
// (fungus, propagule and overworld sets differ) and the target must be air
// or passable. Water and bubble columns are accepted only for the mangrove
// propagule, which is then placed waterlogged.
//
// `commit()` runs after a short delay and re-checks every target.
//
// See also: `sim.rs` for the deferred `Replant` event, `felling.rs` for
// `OriginalMaterials`.

use crate::felling::OriginalMaterials;
use crate::host::BlockAccess;
use crate::material::Material;
use crate::types::{BlockPos, ColumnKey};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

const OVERWORLD_SOILS: &[Material] = &[
    Material::Dirt,
    Material::GrassBlock,
    Material::Podzol,
    Material::CoarseDirt,
    Material::RootedDirt,
    Material::Mycelium,
    Material::MossBlock,
    Material::Farmland,
    Material::Mud,
    Material::MuddyMangroveRoots,
];

const MANGROVE_SOILS: &[Material] = &[
    Material::Mud,
    Material::MuddyMangroveRoots,
    Material::RootedDirt,
    Material::Dirt,
    Material::GrassBlock,
    Material::Podzol,
    Material::MangroveRoots,
];

const FUNGUS_SOILS: &[Material] = &[
    Material::CrimsonNylium,
    Material::WarpedNylium,
    Material::Netherrack,
];

/// The sapling a trunk material regrows as.
pub fn sapling_for(trunk: Material) -> Option<Material> {
    use Material::*;
    let sapling = match trunk {
        OakLog | StrippedOakLog | OakWood | StrippedOakWood => OakSapling,
        PaleOakLog | StrippedPaleOakLog | PaleOakWood | StrippedPaleOakWood => PaleOakSapling,
        SpruceLog | StrippedSpruceLog | SpruceWood | StrippedSpruceWood => SpruceSapling,
        BirchLog | StrippedBirchLog | BirchWood | StrippedBirchWood => BirchSapling,
        JungleLog | StrippedJungleLog | JungleWood | StrippedJungleWood => JungleSapling,
        AcaciaLog | StrippedAcaciaLog | AcaciaWood | StrippedAcaciaWood => AcaciaSapling,
        DarkOakLog | StrippedDarkOakLog | DarkOakWood | StrippedDarkOakWood => DarkOakSapling,
        CherryLog | StrippedCherryLog | CherryWood | StrippedCherryWood => CherrySapling,
        MangroveLog | StrippedMangroveLog | MangroveWood | StrippedMangroveWood
        | MangroveRoots | MuddyMangroveRoots => MangrovePropagule,
        CrimsonStem | StrippedCrimsonStem | CrimsonHyphae | StrippedCrimsonHyphae => {
            CrimsonFungus
        }
        WarpedStem | StrippedWarpedStem | WarpedHyphae | StrippedWarpedHyphae => WarpedFungus,
        _ => return None,
    };
    Some(sapling)
}

fn is_suitable_soil(soil: Material, sapling: Material) -> bool {
    let soils = match sapling {
        Material::CrimsonFungus | Material::WarpedFungus => FUNGUS_SOILS,
        Material::MangrovePropagule => MANGROVE_SOILS,
        _ => OVERWORLD_SOILS,
    };
    soils.contains(&soil)
}

/// Whether `sapling` could be placed at `pos` right now.
pub fn can_plant_at<W: BlockAccess + ?Sized>(world: &W, pos: BlockPos, sapling: Material) -> bool {
    if !is_suitable_soil(world.block(pos.below()), sapling) {
        return false;
    }
    let current = world.block(pos);
    if current.is_water_like() {
        return sapling == Material::MangrovePropagule;
    }
    current.is_air() || world.is_passable(pos)
}

/// A decided placement: one sapling, one or four targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplantPlan {
    pub sapling: Material,
    pub targets: SmallVec<[BlockPos; 4]>,
}

fn original_at<W: BlockAccess + ?Sized>(world: &W, originals: &OriginalMaterials, pos: BlockPos) -> Material {
    originals.get(pos).unwrap_or_else(|| world.block(pos))
}

/// Decide where to replant a felled tree, if anywhere.
pub fn plan<W, F>(
    world: &W,
    blocks: &[BlockPos],
    originals: &OriginalMaterials,
    sapling_allowed: F,
) -> Option<ReplantPlan>
where
    W: BlockAccess + ?Sized,
    F: Fn(Material) -> bool,
{
    let mut best: Option<(BlockPos, Material)> = None;
    for &pos in blocks {
        let Some(sapling) = sapling_for(original_at(world, originals, pos)) else {
            continue;
        };
        if !sapling_allowed(sapling) || !can_plant_at(world, pos, sapling) {
            continue;
        }
        let better = best.is_none_or(|(b, _)| (pos.y, pos.column()) < (b.y, b.column()));
        if better {
            best = Some((pos, sapling));
        }
    }
    let (anchor, sapling) = best?;

    let mut columns: BTreeMap<ColumnKey, BlockPos> = BTreeMap::new();
    for &pos in blocks {
        if sapling_for(original_at(world, originals, pos)) != Some(sapling)
            || !can_plant_at(world, pos, sapling)
        {
            continue;
        }
        columns
            .entry(pos.column())
            .and_modify(|lowest| {
                if pos.y < lowest.y {
                    *lowest = pos;
                }
            })
            .or_insert(pos);
    }

    let targets = match find_footprint(&columns) {
        Some(footprint) => SmallVec::from_buf(footprint),
        None => SmallVec::from_slice(&[anchor]),
    };
    Some(ReplantPlan { sapling, targets })
}

/// First 2×2 group of columns (anchor, +x, +z, +x+z) whose elevations are
/// within one block of the anchor's.
fn find_footprint(columns: &BTreeMap<ColumnKey, BlockPos>) -> Option<[BlockPos; 4]> {
    if columns.len() < 4 {
        return None;
    }
    columns.iter().find_map(|(&key, &origin)| {
        let east = *columns.get(&key.offset(1, 0))?;
        let south = *columns.get(&key.offset(0, 1))?;
        let south_east = *columns.get(&key.offset(1, 1))?;
        [east, south, south_east]
            .iter()
            .all(|other| origin.vertical_distance(*other) <= 1)
            .then_some([origin, east, south, south_east])
    })
}

/// Place the planned saplings, re-checking each target. Returns how many
/// were placed.
pub fn commit<W: BlockAccess + ?Sized>(world: &mut W, plan: &ReplantPlan) -> usize {
    let mut placed = 0;
    for &target in &plan.targets {
        if !can_plant_at(&*world, target, plan.sapling) {
            log::trace!("replant target {} no longer plantable", target);
            continue;
        }
        let was_water = world.block(target).is_water_like();
        world.set_block(target, plan.sapling);
        if plan.sapling == Material::MangrovePropagule {
            world.set_waterlogged(target, was_water);
        }
        placed += 1;
    }
    placed
}
