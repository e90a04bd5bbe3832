use log;

use crate::containers::ContainerIndex;
use crate::items::{self, ItemFragment, ItemInstance};
use crate::models::{ContainerId, DrawerId, ItemInstanceId, ItemLocation, SlotIndex};
use std::collections::{BTreeMap, HashMap};

/// Everything the character owns, flattened. `items` is keyed by instance id;
/// `slot_map` indexes the top-level inventory grid; `containers` indexes drawer
/// contents. The slot maps are projections of `item.location` and every
/// mutation path keeps them in step.
#[derive(Clone, Debug, Default)]
pub struct InventoryState {
    pub items: HashMap<ItemInstanceId, ItemInstance>,
    pub slot_map: BTreeMap<SlotIndex, ItemInstanceId>,
    pub containers: ContainerIndex,
}

impl InventoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, id: &str) -> Option<&ItemInstance> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut ItemInstance> {
        self.items.get_mut(id)
    }

    pub fn item_id_in_slot(&self, position: SlotIndex) -> Option<&ItemInstanceId> {
        self.slot_map.get(&position)
    }

    pub fn item_in_slot(&self, position: SlotIndex) -> Option<&ItemInstance> {
        self.slot_map.get(&position).and_then(|id| self.items.get(id))
    }

    /// First empty top-level slot, scanning up from 0.
    pub fn first_available_slot(&self) -> SlotIndex {
        items::first_available_slot(0, &self.slot_map)
    }

    /// Highest occupied top-level slot. Drives how far the inventory grid must
    /// extend to show everything.
    pub fn highest_occupied_slot(&self) -> Option<SlotIndex> {
        self.slot_map.last_key_value().map(|(slot, _)| *slot)
    }

    pub fn set_inventory_slot(
        &mut self,
        position: SlotIndex,
        item_id: ItemInstanceId,
    ) -> Option<ItemInstanceId> {
        self.slot_map.insert(position, item_id)
    }

    pub fn clear_inventory_slot(&mut self, position: SlotIndex) -> Option<ItemInstanceId> {
        self.slot_map.remove(&position)
    }

    /// Ids of every item currently equipped, with the gear slots each occupies.
    /// The paper doll rebuilds itself from this after a resync.
    pub fn equipped_items(&self) -> Vec<(ItemInstanceId, Vec<String>)> {
        self.items
            .values()
            .filter_map(|item| {
                item.location
                    .equipped_gear_slots()
                    .map(|slots| (item.id.clone(), slots.to_vec()))
            })
            .collect()
    }

    /// Replaces all local state with a fresh snapshot from the item service.
    /// This is the recovery path when an optimistic move is rejected: throw the
    /// local guess away and absorb the server's truth wholesale.
    pub fn resync(&mut self, fragments: &[ItemFragment]) {
        self.items.clear();
        self.slot_map.clear();
        self.containers.clear();
        for fragment in fragments {
            self.ingest(fragment, None);
        }
        log::info!(
            "[Inventory] Resynced {} items ({} in top-level slots)",
            self.items.len(),
            self.slot_map.len()
        );
    }

    /// Flattens one fragment (and, for containers, everything inside it) into
    /// the maps. `enclosing` names the container and drawer the fragment was
    /// listed under, which the wire's bare contained-position needs to become a
    /// full location.
    fn ingest(&mut self, fragment: &ItemFragment, enclosing: Option<(&ContainerId, &DrawerId)>) {
        let Some(location) = fragment.resolve_location(enclosing.map(|(_, drawer)| drawer)) else {
            log::error!("[Inventory] Item {} has no usable location, skipping", fragment.id);
            return;
        };
        let instance = fragment.to_instance(location);
        if instance.is_container() {
            self.containers.register_container(&instance);
        }

        match &instance.location {
            ItemLocation::Inventory(data) => {
                if let Some(previous) = self.slot_map.insert(data.position, instance.id.clone()) {
                    log::warn!(
                        "[Inventory] Slot {} reported for both {} and {}",
                        data.position,
                        previous,
                        instance.id
                    );
                }
            }
            ItemLocation::InContainer(data) => {
                let Some((container_id, _)) = enclosing else {
                    // resolve_location already rejected this case.
                    return;
                };
                if let Err(err) = self.containers.set_slot(
                    container_id,
                    &data.drawer_id,
                    data.position,
                    instance.id.clone(),
                ) {
                    log::error!("[Inventory] Could not place {}: {}", instance.id, err);
                    return;
                }
            }
            ItemLocation::Equipped(_) => {}
        }
        self.items.insert(instance.id.clone(), instance);

        if let Some(drawers) = &fragment.container_drawers {
            for drawer in drawers {
                for contained in &drawer.contained_items {
                    self.ingest(contained, Some((&fragment.id, &drawer.id)));
                }
            }
        }
    }
}
