use log;
use thiserror::Error;

use crate::inventory::InventoryState;
use crate::items::{GearSlotSet, ItemInstance};
use crate::models::{GearSlotId, ItemInstanceId, ItemLocation};
use crate::signals::{Signal, SignalQueue};
use std::collections::HashMap;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EquipError {
    #[error("item {0} is not known to the HUD")]
    ItemNotFound(ItemInstanceId),
    #[error("item {item_id} cannot be worn in {slot_name}")]
    SlotMismatch { item_id: ItemInstanceId, slot_name: String },
    #[error("items inside a container cannot be equipped directly")]
    ItemInContainer,
}

/// What the character is wearing: gear slot id to the item occupying it. An
/// item spanning several slots appears under each of them.
#[derive(Clone, Debug, Default)]
pub struct PaperDoll {
    slots: HashMap<GearSlotId, ItemInstanceId>,
}

impl PaperDoll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn item_in_slot(&self, gear_slot_id: &str) -> Option<&ItemInstanceId> {
        self.slots.get(gear_slot_id)
    }

    /// Distinct items occupying any of the given slots.
    pub fn items_in_slots(&self, gear_slot_ids: &[GearSlotId]) -> Vec<ItemInstanceId> {
        let mut found = Vec::new();
        for slot in gear_slot_ids {
            if let Some(item_id) = self.slots.get(slot) {
                if !found.contains(item_id) {
                    found.push(item_id.clone());
                }
            }
        }
        found
    }

    /// Takes an item off the doll wherever it appears, returning the vacated
    /// slot ids.
    pub fn remove_item(&mut self, item_id: &str) -> Vec<GearSlotId> {
        let vacated: Vec<GearSlotId> = self
            .slots
            .iter()
            .filter(|(_, occupant)| occupant.as_str() == item_id)
            .map(|(slot, _)| slot.clone())
            .collect();
        for slot in &vacated {
            self.slots.remove(slot);
        }
        vacated
    }

    pub fn place(&mut self, item_id: &ItemInstanceId, gear_slot_ids: &[GearSlotId]) {
        for slot in gear_slot_ids {
            self.slots.insert(slot.clone(), item_id.clone());
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Rebuilds the doll from item locations after a resync.
    pub fn rebuild(&mut self, state: &InventoryState) {
        self.clear();
        for (item_id, gear_slot_ids) in state.equipped_items() {
            self.place(&item_id, &gear_slot_ids);
        }
    }
}

/// Whether the dragged item can go into the named gear slot. The item must not
/// be inside a container, and one of its gear slot sets has to name exactly
/// `slot_name`, compared case-insensitively.
pub fn can_equip(item: &ItemInstance, slot_name: &str) -> bool {
    matching_gear_slot_set(item, slot_name).is_some() && !item.location.is_in_container()
}

/// The first gear slot set naming `slot_name`. Equipping through that slot
/// occupies the whole set.
pub fn matching_gear_slot_set<'a>(item: &'a ItemInstance, slot_name: &str) -> Option<&'a GearSlotSet> {
    let def = item.def.as_ref()?;
    def.gear_slot_sets
        .iter()
        .find(|set| set.gear_slots.iter().any(|slot| slot.id.eq_ignore_ascii_case(slot_name)))
}

/// Every slot named by any of the item's sets, for drag highlighting.
pub fn highlightable_slots(item: &ItemInstance) -> Vec<GearSlotId> {
    let Some(def) = &item.def else {
        return Vec::new();
    };
    let mut slots = Vec::new();
    for set in &def.gear_slot_sets {
        for slot in &set.gear_slots {
            if !slots.contains(&slot.id) {
                slots.push(slot.id.clone());
            }
        }
    }
    slots
}

/// Lights up the paper-doll slots the dragged item could land in.
pub fn highlight_slots_for_drag(signals: &mut SignalQueue, item: &ItemInstance) {
    let gear_slot_ids = highlightable_slots(item);
    if !gear_slot_ids.is_empty() {
        signals.push(Signal::HighlightGearSlots { gear_slot_ids });
    }
}

pub fn dehighlight_slots(signals: &mut SignalQueue) {
    signals.push(Signal::DehighlightGearSlots);
}

/// Result of a locally-applied equip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquipOutcome {
    pub will_equip_to: Vec<GearSlotId>,
    /// Items pushed off the doll, in the order they were found.
    pub displaced: Vec<ItemInstanceId>,
}

/// Resolves dropping `item_id` onto the paper-doll slot `slot_name`.
///
/// The item takes over every slot in its matching set. Whatever was worn there
/// comes off: the first displaced item returns to the dragged item's origin
/// (its inventory slot, if it had one), any further displaced items take the
/// first free inventory slots. The host is told through an `EquipItem` signal
/// so it can mirror the change to the server.
pub fn equip_item(
    state: &mut InventoryState,
    doll: &mut PaperDoll,
    signals: &mut SignalQueue,
    item_id: &str,
    slot_name: &str,
) -> Result<EquipOutcome, EquipError> {
    let item = state
        .item(item_id)
        .cloned()
        .ok_or_else(|| EquipError::ItemNotFound(item_id.to_string()))?;
    if item.location.is_in_container() {
        return Err(EquipError::ItemInContainer);
    }
    let will_equip_to: Vec<GearSlotId> = matching_gear_slot_set(&item, slot_name)
        .ok_or_else(|| EquipError::SlotMismatch {
            item_id: item_id.to_string(),
            slot_name: slot_name.to_string(),
        })?
        .gear_slots
        .iter()
        .map(|slot| slot.id.clone())
        .collect();

    let displaced = doll.items_in_slots(&will_equip_to);
    let origin = item.location.clone();

    // Vacate the origin and the target slots.
    match &origin {
        ItemLocation::Inventory(data) => {
            state.clear_inventory_slot(data.position);
        }
        ItemLocation::Equipped(_) => {
            doll.remove_item(item_id);
        }
        // Rejected above.
        ItemLocation::InContainer(_) => {}
    }
    for displaced_id in &displaced {
        doll.remove_item(displaced_id);
    }

    // Wear the item.
    doll.place(&item.id, &will_equip_to);
    if let Some(entry) = state.item_mut(item_id) {
        entry.location = ItemLocation::equipped(will_equip_to.clone());
    }

    // Re-home the displaced items: the first one inherits the origin slot,
    // the rest scan for free slots.
    let mut origin_slot = origin.inventory_position();
    for displaced_id in &displaced {
        let position = match origin_slot.take() {
            Some(position) => position,
            None => state.first_available_slot(),
        };
        state.set_inventory_slot(position, displaced_id.clone());
        if let Some(entry) = state.item_mut(displaced_id) {
            entry.location = ItemLocation::inventory(position);
        }
    }

    let prev_equipped_item_id = displaced.first().cloned();
    signals.push(Signal::EquipItem {
        item_id: item.id.clone(),
        will_equip_to: will_equip_to.clone(),
        prev_equipped_item_id,
    });
    log::info!(
        "[Equipment] Equipped {} to {:?} (displaced {})",
        item.id,
        will_equip_to,
        displaced.len()
    );

    Ok(EquipOutcome { will_equip_to, displaced })
}
