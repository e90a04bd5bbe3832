use log;
use thiserror::Error;

use crate::items::ItemInstance;
use crate::models::{ContainerId, DrawerId, ItemInstanceId, SlotIndex};
use std::collections::{BTreeMap, HashMap};

/// Occupancy rollup for one drawer, shown in the drawer header and consulted by
/// drop validation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DrawerTotals {
    pub item_count: u32,
    pub mass: f32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerIndexError {
    #[error("container {0} is not in the index")]
    UnknownContainer(ContainerId),
    #[error("container {container_id} has no drawer {drawer_id}")]
    UnknownDrawer { container_id: ContainerId, drawer_id: DrawerId },
}

/// Slot occupancy for the drawers of a single container item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerRecord {
    drawers: HashMap<DrawerId, BTreeMap<SlotIndex, ItemInstanceId>>,
}

impl ContainerRecord {
    pub fn drawer(&self, drawer_id: &str) -> Option<&BTreeMap<SlotIndex, ItemInstanceId>> {
        self.drawers.get(drawer_id)
    }

    pub fn drawer_ids(&self) -> impl Iterator<Item = &DrawerId> {
        self.drawers.keys()
    }

    /// Every item held anywhere in this container, across all drawers.
    pub fn occupant_ids(&self) -> impl Iterator<Item = &ItemInstanceId> {
        self.drawers.values().flat_map(|slots| slots.values())
    }
}

/// Flat index of every open-able container the HUD knows about, keyed by the
/// container item's id, then drawer id, then slot. This is the only place
/// drawer contents are tracked; moving an item updates the one affected slot
/// here instead of rewriting a nested item tree.
#[derive(Clone, Debug, Default)]
pub struct ContainerIndex {
    containers: HashMap<ContainerId, ContainerRecord>,
}

impl ContainerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.containers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.containers.contains_key(container_id)
    }

    /// Seeds empty drawer maps for a container item so later slot writes can
    /// tell an unknown drawer apart from an empty one. Re-registering resets
    /// the container's slots.
    pub fn register_container(&mut self, item: &ItemInstance) {
        let Some(drawer_defs) = &item.drawers else {
            log::error!("[Containers] {} registered as a container but has no drawers", item.id);
            return;
        };
        let mut record = ContainerRecord::default();
        for def in drawer_defs {
            record.drawers.insert(def.id.clone(), BTreeMap::new());
        }
        self.containers.insert(item.id.clone(), record);
    }

    pub fn unregister_container(&mut self, container_id: &str) -> Option<ContainerRecord> {
        self.containers.remove(container_id)
    }

    pub fn record(&self, container_id: &str) -> Option<&ContainerRecord> {
        self.containers.get(container_id)
    }

    pub fn drawer(
        &self,
        container_id: &str,
        drawer_id: &str,
    ) -> Option<&BTreeMap<SlotIndex, ItemInstanceId>> {
        self.containers.get(container_id).and_then(|record| record.drawer(drawer_id))
    }

    pub fn item_at(&self, container_id: &str, drawer_id: &str, slot: SlotIndex) -> Option<&ItemInstanceId> {
        self.drawer(container_id, drawer_id).and_then(|slots| slots.get(&slot))
    }

    /// Puts `item_id` into the slot, returning whatever was there before.
    pub fn set_slot(
        &mut self,
        container_id: &str,
        drawer_id: &str,
        slot: SlotIndex,
        item_id: ItemInstanceId,
    ) -> Result<Option<ItemInstanceId>, ContainerIndexError> {
        let slots = self.drawer_mut(container_id, drawer_id)?;
        Ok(slots.insert(slot, item_id))
    }

    /// Empties the slot, returning the evicted occupant if there was one.
    pub fn clear_slot(
        &mut self,
        container_id: &str,
        drawer_id: &str,
        slot: SlotIndex,
    ) -> Result<Option<ItemInstanceId>, ContainerIndexError> {
        let slots = self.drawer_mut(container_id, drawer_id)?;
        Ok(slots.remove(&slot))
    }

    /// True when any item sitting anywhere inside this container is itself a
    /// container. Nesting stops at one level, so this gates dropping the
    /// container into another one.
    pub fn holds_a_container(
        &self,
        container_id: &str,
        items: &HashMap<ItemInstanceId, ItemInstance>,
    ) -> bool {
        let Some(record) = self.containers.get(container_id) else {
            return false;
        };
        record
            .occupant_ids()
            .any(|id| items.get(id).map(|item| item.is_container()).unwrap_or(false))
    }

    /// Sums unit counts and mass over a drawer's occupants. Items with missing
    /// stats contribute nothing rather than their -1 sentinels.
    pub fn drawer_totals(
        &self,
        container_id: &str,
        drawer_id: &str,
        items: &HashMap<ItemInstanceId, ItemInstance>,
    ) -> DrawerTotals {
        let mut totals = DrawerTotals::default();
        let Some(slots) = self.drawer(container_id, drawer_id) else {
            return totals;
        };
        for id in slots.values() {
            let Some(item) = items.get(id) else {
                log::error!("[Containers] Drawer {} holds unknown item {}", drawer_id, id);
                continue;
            };
            totals.item_count += item.unit_count().max(0) as u32;
            totals.mass += item.total_mass().max(0.0);
        }
        totals
    }

    /// Highest occupied slot index in the drawer, if anything is in it. Drives
    /// how many rows the drawer grid renders.
    pub fn highest_occupied_slot(&self, container_id: &str, drawer_id: &str) -> Option<SlotIndex> {
        self.drawer(container_id, drawer_id)
            .and_then(|slots| slots.last_key_value().map(|(slot, _)| *slot))
    }

    fn drawer_mut(
        &mut self,
        container_id: &str,
        drawer_id: &str,
    ) -> Result<&mut BTreeMap<SlotIndex, ItemInstanceId>, ContainerIndexError> {
        let record = self
            .containers
            .get_mut(container_id)
            .ok_or_else(|| ContainerIndexError::UnknownContainer(container_id.to_string()))?;
        record.drawers.get_mut(drawer_id).ok_or_else(|| ContainerIndexError::UnknownDrawer {
            container_id: container_id.to_string(),
            drawer_id: drawer_id.to_string(),
        })
    }
}
