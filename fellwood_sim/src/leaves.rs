// Trunk → leaf palette mapping and the allowed-leaf filter.
//
// `LeafMapping` is compiled from `LeafMappingDoc` on every reload and never
// mutated afterwards. A leaf decay job asks it once, at job start, for the
// filter to apply: the palette mapped from the origin block's original
// material, or no filter at all if that material has no (or an empty)
// palette.
//
// Felled blocks other than the origin could only widen the filter with a
// palette identical to the origin's, which adds nothing, so the origin's
// palette is the complete filter. Mixed-species trunks therefore never
// decay a foreign species' leaves.
//
// See also: `leaf_decay.rs` which applies the filter, `rules.rs` which
// builds the mapping.

use crate::material::Material;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Which leaf materials a decay job may remove.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafFilter {
    /// Every leaf-typed block qualifies.
    Any,
    Only(BTreeSet<Material>),
}

impl LeafFilter {
    pub fn permits(&self, material: Material) -> bool {
        match self {
            LeafFilter::Any => true,
            LeafFilter::Only(set) => set.contains(&material),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LeafMapping {
    palettes: FxHashMap<Material, BTreeSet<Material>>,
}

impl LeafMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add leaves to a trunk material's palette.
    pub fn extend(&mut self, trunk: Material, leaves: impl IntoIterator<Item = Material>) {
        self.palettes.entry(trunk).or_default().extend(leaves);
    }

    pub fn palette(&self, trunk: Material) -> Option<&BTreeSet<Material>> {
        self.palettes.get(&trunk).filter(|set| !set.is_empty())
    }

    /// Filter for a decay job whose origin was originally `origin`.
    pub fn filter_for(&self, origin: Material) -> LeafFilter {
        match self.palette(origin) {
            Some(set) => LeafFilter::Only(set.clone()),
            None => LeafFilter::Any,
        }
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}
