// Collaborator boundary: world, actors, inventories and break signals.
//
// The felling core owns no world state. Everything it reads or writes goes
// through three traits the host implements:
//
// - `BlockAccess`:  read/write block materials, natural breaks (with or
//                   without drops), the waterlogged flag, cosmetic effects.
// - `ActorAccess`:  online/sneaking/permission queries and mutable access to
//                   an actor's `Inventory`.
// - `BreakSignals`: the per-leaf break intent other systems may veto or
//                   strip of drops.
//
// `Host` is the union of the three, with a blanket impl, so sim entry points
// take a single `&mut H where H: Host`.
//
// `Inventory` and `ItemStack` are concrete because the core needs exactly one
// capability from them that hosts must not approximate: locating "the tool
// carrying this session token" by scanning slots, since other code may move
// the item between ticks.
//
// See also: `sandbox.rs` for the reference implementation, `durability.rs`
// for the token lookup in use.

use crate::material::Material;
use crate::types::{ActorId, BlockPos};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Items and inventories
// ---------------------------------------------------------------------------

/// One item stack: material, accumulated damage and string metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: Material,
    /// Durability already consumed.
    pub damage: u32,
    /// Persistent string metadata. `None` when the stack cannot carry any.
    tags: Option<BTreeMap<String, String>>,
}

impl ItemStack {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            damage: 0,
            tags: if material.is_air() {
                None
            } else {
                Some(BTreeMap::new())
            },
        }
    }

    /// A stack whose metadata writes always fail.
    pub fn without_metadata(material: Material) -> Self {
        Self {
            material,
            damage: 0,
            tags: None,
        }
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn can_carry_metadata(&self) -> bool {
        self.tags.is_some()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }

    /// Returns `false` if the stack cannot carry metadata.
    pub fn set_tag(&mut self, key: &str, value: String) -> bool {
        match self.tags.as_mut() {
            Some(tags) => {
                tags.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn remove_tag(&mut self, key: &str) -> Option<String> {
        self.tags.as_mut()?.remove(key)
    }

    /// Remaining durability, or `None` for items that do not wear.
    pub fn remaining_durability(&self) -> Option<u32> {
        let max = self.material.max_durability();
        (max > 0).then(|| max.saturating_sub(self.damage))
    }
}

/// Where an item lives in an inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotRef {
    Slot(usize),
    OffHand,
}

/// Numbered storage slots, a selected hotbar slot (the main hand) and an
/// off-hand.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
    selected: usize,
    off_hand: Option<ItemStack>,
}

impl Inventory {
    /// Standard player layout: 9 hotbar slots + 27 storage slots.
    pub const PLAYER_SLOTS: usize = 36;

    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
            selected: 0,
            off_hand: None,
        }
    }

    /// A player inventory holding `item` in the first hotbar slot, selected.
    pub fn with_main_hand(item: ItemStack) -> Self {
        let mut inv = Self::new(Self::PLAYER_SLOTS);
        inv.slots[0] = Some(item);
        inv
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Select a hotbar slot. Out-of-range indices are ignored.
    pub fn select(&mut self, slot: usize) {
        if slot < self.slots.len() {
            self.selected = slot;
        }
    }

    pub fn main_hand(&self) -> Option<&ItemStack> {
        self.get(SlotRef::Slot(self.selected))
    }

    pub fn main_hand_mut(&mut self) -> Option<&mut ItemStack> {
        self.get_mut(SlotRef::Slot(self.selected))
    }

    pub fn get(&self, slot: SlotRef) -> Option<&ItemStack> {
        match slot {
            SlotRef::Slot(i) => self.slots.get(i)?.as_ref(),
            SlotRef::OffHand => self.off_hand.as_ref(),
        }
    }

    pub fn get_mut(&mut self, slot: SlotRef) -> Option<&mut ItemStack> {
        match slot {
            SlotRef::Slot(i) => self.slots.get_mut(i)?.as_mut(),
            SlotRef::OffHand => self.off_hand.as_mut(),
        }
    }

    /// Replace the contents of a slot, returning what was there.
    pub fn set(&mut self, slot: SlotRef, item: Option<ItemStack>) -> Option<ItemStack> {
        match slot {
            SlotRef::Slot(i) => match self.slots.get_mut(i) {
                Some(cell) => std::mem::replace(cell, item),
                None => item,
            },
            SlotRef::OffHand => std::mem::replace(&mut self.off_hand, item),
        }
    }

    /// Move whatever is in `from` into `to`, swapping contents.
    pub fn swap(&mut self, from: SlotRef, to: SlotRef) {
        let a = self.set(from, None);
        let b = self.set(to, a);
        self.set(from, b);
    }

    /// Every stack held, off-hand first, then slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.off_hand.iter().chain(self.slots.iter().flatten())
    }

    /// Locate the stack whose metadata `key` equals `value`. The off-hand is
    /// checked first, then storage slots in index order.
    pub fn find_tagged(&self, key: &str, value: &str) -> Option<SlotRef> {
        if self
            .off_hand
            .as_ref()
            .is_some_and(|item| item.tag(key) == Some(value))
        {
            return Some(SlotRef::OffHand);
        }
        self.slots
            .iter()
            .position(|cell| cell.as_ref().is_some_and(|item| item.tag(key) == Some(value)))
            .map(SlotRef::Slot)
    }
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Purely cosmetic effects the core asks the host to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Played at the origin block when a felling starts.
    Sweep,
}

/// Answer to a leaf break intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakVerdict {
    /// Remove the block; `drops` is false when another system suppressed
    /// item drops.
    Allow { drops: bool },
    /// Leave the block in place.
    Veto,
}

/// Spatial world state.
pub trait BlockAccess {
    fn block(&self, pos: BlockPos) -> Material;

    fn set_block(&mut self, pos: BlockPos, material: Material);

    /// Remove a block the way a player break would, spawning its drops when
    /// `drops` is true.
    fn break_naturally(&mut self, pos: BlockPos, drops: bool);

    fn set_waterlogged(&mut self, pos: BlockPos, waterlogged: bool);

    fn is_passable(&self, pos: BlockPos) -> bool {
        self.block(pos).is_passable()
    }

    fn spawn_effect(&mut self, _pos: BlockPos, _effect: Effect) {}
}

/// Actor presence, posture, permissions and inventory.
pub trait ActorAccess {
    fn is_online(&self, actor: ActorId) -> bool;

    fn is_sneaking(&self, actor: ActorId) -> bool;

    fn has_permission(&self, actor: ActorId, permission: &str) -> bool;

    fn inventory(&self, actor: ActorId) -> Option<&Inventory>;

    fn inventory_mut(&mut self, actor: ActorId) -> Option<&mut Inventory>;
}

/// Per-block break intents other systems may veto.
pub trait BreakSignals {
    fn leaf_break_intent(&mut self, actor: ActorId, pos: BlockPos) -> BreakVerdict;
}

/// Everything the felling core needs from its host.
pub trait Host: BlockAccess + ActorAccess + BreakSignals {}

impl<T: BlockAccess + ActorAccess + BreakSignals + ?Sized> Host for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_cannot_carry_metadata() {
        let mut air = ItemStack::new(Material::Air);
        assert!(!air.can_carry_metadata());
        assert!(!air.set_tag("k", "v".into()));
    }

    #[test]
    fn tags_round_trip() {
        let mut axe = ItemStack::new(Material::IronAxe);
        assert!(axe.set_tag("k", "v".into()));
        assert_eq!(axe.tag("k"), Some("v"));
        assert_eq!(axe.remove_tag("k"), Some("v".to_string()));
        assert_eq!(axe.tag("k"), None);
    }

    #[test]
    fn remaining_durability() {
        let axe = ItemStack::new(Material::IronAxe).with_damage(40);
        assert_eq!(axe.remaining_durability(), Some(210));
        assert_eq!(ItemStack::new(Material::Stick).remaining_durability(), None);
    }

    #[test]
    fn find_tagged_checks_off_hand_first() {
        let mut tagged = ItemStack::new(Material::IronAxe);
        tagged.set_tag("k", "t".into());
        let mut inv = Inventory::with_main_hand(tagged.clone());
        assert_eq!(inv.find_tagged("k", "t"), Some(SlotRef::Slot(0)));

        inv.set(SlotRef::OffHand, Some(tagged));
        assert_eq!(inv.find_tagged("k", "t"), Some(SlotRef::OffHand));
        assert_eq!(inv.find_tagged("k", "other"), None);
    }

    #[test]
    fn find_tagged_follows_moved_item() {
        let mut tagged = ItemStack::new(Material::DiamondAxe);
        tagged.set_tag("k", "t".into());
        let mut inv = Inventory::with_main_hand(tagged);
        inv.swap(SlotRef::Slot(0), SlotRef::Slot(17));
        assert!(inv.main_hand().is_none());
        assert_eq!(inv.find_tagged("k", "t"), Some(SlotRef::Slot(17)));
    }
}
