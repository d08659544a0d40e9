// Tool tagging and durability accounting for felling sessions.
//
// When a session starts, a fresh `SessionToken` is written into the main-hand
// tool's metadata under `FELLING_TAG_KEY`. From then on the session never
// refers to a slot index: every later access (the completion charge, clearing
// the tag) locates the tool with `Inventory::find_tagged()`, because other
// code may move the item between ticks. If the tool is gone, those accesses
// quietly do nothing.
//
// Wear policy:
// - `First`: the host's natural break already charged the first block; the
//   session charges nothing extra.
// - `All`: intended total = round(blocks × multiplier). One point was already
//   charged naturally, so the extra is `total - 1`, capped so the tool keeps
//   at least 1 durability point.
//
// See also: `felling.rs` for the session that carries the token, `host.rs`
// for `Inventory::find_tagged()`.

use crate::config::DurabilityMode;
use crate::host::{ActorAccess, ItemStack};
use crate::rules::DurabilityParams;
use crate::types::{ActorId, SessionToken};

/// Metadata key under which an active session's token is stored.
pub const FELLING_TAG_KEY: &str = "active_felling_id";

/// Tag the actor's main-hand tool with `token`. Returns `false` when there
/// is no main-hand item or it cannot carry metadata.
pub fn tag_tool<A: ActorAccess + ?Sized>(host: &mut A, actor: ActorId, token: SessionToken) -> bool {
    let Some(tool) = host
        .inventory_mut(actor)
        .and_then(|inv| inv.main_hand_mut())
    else {
        return false;
    };
    if tool.material.is_air() {
        return false;
    }
    tool.set_tag(FELLING_TAG_KEY, token.to_string())
}

/// Find the tool carrying `token`, wherever it has moved to.
pub fn tagged_tool_mut<A: ActorAccess + ?Sized>(
    host: &mut A,
    actor: ActorId,
    token: SessionToken,
) -> Option<&mut ItemStack> {
    let inventory = host.inventory_mut(actor)?;
    let slot = inventory.find_tagged(FELLING_TAG_KEY, &token.to_string())?;
    inventory.get_mut(slot)
}

/// Remove the session tag from whichever item carries it.
pub fn clear_tag<A: ActorAccess + ?Sized>(host: &mut A, actor: ActorId, token: SessionToken) {
    if let Some(tool) = tagged_tool_mut(host, actor, token) {
        tool.remove_tag(FELLING_TAG_KEY);
    }
}

/// Extra damage the `All` policy intends for `broken` blocks, before the
/// keep-one-point cap.
pub fn extra_cost(broken: usize, multiplier: f64) -> u32 {
    let target = (broken as f64 * multiplier.max(0.0)).round();
    let natural = if broken > 0 { 1.0 } else { 0.0 };
    (target - natural).max(0.0) as u32
}

/// Charge the tagged tool for a completed felling of `broken` blocks.
/// Returns the damage actually applied.
pub fn charge<A: ActorAccess + ?Sized>(
    host: &mut A,
    actor: ActorId,
    token: SessionToken,
    broken: usize,
    params: &DurabilityParams,
) -> u32 {
    if params.mode != DurabilityMode::All {
        return 0;
    }
    let extra = extra_cost(broken, params.multiplier);
    if extra == 0 {
        return 0;
    }
    let Some(tool) = tagged_tool_mut(host, actor, token) else {
        log::debug!("tagged tool for {actor:?} not found; no durability charged");
        return 0;
    };
    let Some(remaining) = tool.remaining_durability() else {
        return 0;
    };
    let applied = extra.min(remaining.saturating_sub(1));
    tool.damage += applied;
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Inventory, SlotRef};
    use crate::material::Material;
    use crate::sandbox::{Actor, Sandbox};
    use fellwood_prng::TokenRng;

    const ACTOR: ActorId = ActorId(1);

    fn all(multiplier: f64) -> DurabilityParams {
        DurabilityParams {
            min_remaining: 0,
            mode: DurabilityMode::All,
            multiplier,
        }
    }

    fn setup(tool: ItemStack) -> (Sandbox, SessionToken) {
        let mut sandbox = Sandbox::new();
        sandbox.add_actor(ACTOR, Actor::with_main_hand(tool));
        let token = SessionToken::new_v4(&mut TokenRng::new(3));
        (sandbox, token)
    }

    #[test]
    fn extra_cost_subtracts_natural_break() {
        assert_eq!(extra_cost(5, 0.5), 2);
        assert_eq!(extra_cost(1, 0.5), 0);
        assert_eq!(extra_cost(0, 3.0), 0);
        assert_eq!(extra_cost(10, 1.0), 9);
        assert_eq!(extra_cost(10, -2.0), 0);
    }

    #[test]
    fn charge_applies_to_moved_tool() {
        let (mut sandbox, token) = setup(ItemStack::new(Material::IronAxe));
        assert!(tag_tool(&mut sandbox, ACTOR, token));
        let inv = sandbox.inventory_mut(ACTOR).unwrap();
        inv.swap(SlotRef::Slot(0), SlotRef::OffHand);

        assert_eq!(charge(&mut sandbox, ACTOR, token, 5, &all(0.5)), 2);
        let inv = sandbox.inventory(ACTOR).unwrap();
        assert_eq!(inv.get(SlotRef::OffHand).unwrap().damage, 2);
    }

    #[test]
    fn charge_keeps_one_point() {
        let worn = ItemStack::new(Material::GoldenAxe).with_damage(29);
        let (mut sandbox, token) = setup(worn);
        assert!(tag_tool(&mut sandbox, ACTOR, token));
        assert_eq!(charge(&mut sandbox, ACTOR, token, 40, &all(1.0)), 2);
        let tool = sandbox.inventory(ACTOR).unwrap().main_hand().unwrap();
        assert_eq!(tool.remaining_durability(), Some(1));
    }

    #[test]
    fn first_mode_charges_nothing() {
        let (mut sandbox, token) = setup(ItemStack::new(Material::IronAxe));
        assert!(tag_tool(&mut sandbox, ACTOR, token));
        let params = DurabilityParams {
            mode: DurabilityMode::First,
            ..all(1.0)
        };
        assert_eq!(charge(&mut sandbox, ACTOR, token, 50, &params), 0);
    }

    #[test]
    fn missing_tool_charges_nothing() {
        let (mut sandbox, token) = setup(ItemStack::new(Material::IronAxe));
        assert!(tag_tool(&mut sandbox, ACTOR, token));
        sandbox.inventory_mut(ACTOR).unwrap().set(SlotRef::Slot(0), None);
        assert_eq!(charge(&mut sandbox, ACTOR, token, 50, &all(1.0)), 0);
    }

    #[test]
    fn tag_fails_without_metadata() {
        let (mut sandbox, token) = setup(ItemStack::without_metadata(Material::IronAxe));
        assert!(!tag_tool(&mut sandbox, ACTOR, token));
    }

    #[test]
    fn tag_fails_with_empty_hand() {
        let mut sandbox = Sandbox::new();
        sandbox.add_actor(ACTOR, Actor::new(Inventory::new(Inventory::PLAYER_SLOTS)));
        let token = SessionToken::new_v4(&mut TokenRng::new(3));
        assert!(!tag_tool(&mut sandbox, ACTOR, token));
    }

    #[test]
    fn clear_tag_removes_only_the_token() {
        let (mut sandbox, token) = setup(ItemStack::new(Material::IronAxe));
        assert!(tag_tool(&mut sandbox, ACTOR, token));
        assert!(tagged_tool_mut(&mut sandbox, ACTOR, token).is_some());
        clear_tag(&mut sandbox, ACTOR, token);
        assert!(tagged_tool_mut(&mut sandbox, ACTOR, token).is_none());
        let tool = sandbox.inventory(ACTOR).unwrap().main_hand().unwrap();
        assert!(tool.can_carry_metadata());
    }
}
