use log;
use serde::{Serialize, Deserialize};

use crate::models::{
    ContainerId, DrawerId, GearSlotId, ItemInstanceId, ItemLocation, SlotIndex,
};
use std::collections::BTreeMap;

/// Stack hash the server sends for items that do not stack at all.
pub const EMPTY_STACK_HASH: &str = "00000000000000000000000000000000";

// --- Item Enums and Structs ---

/// Broad item classification as reported by the item's static definition.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemType {
    Substance,
    Alloy,
    Weapon,
    Armor,
    Ammo,
    Consumable,
    Deployable,
    Block,
}

/// One gear slot named by a gear slot set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GearSlotRef {
    pub id: GearSlotId,
}

/// A set of gear slots an item occupies simultaneously when equipped. An item
/// with several sets can be worn in several configurations (e.g. either hand).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GearSlotSet {
    #[serde(default)]
    pub gear_slots: Vec<GearSlotRef>,
}

/// Static (per-definition) item data. Shared by every instance of the item.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemStaticDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: String,
    pub item_type: ItemType,
    #[serde(default)]
    pub gear_slot_sets: Vec<GearSlotSet>,
    #[serde(default)]
    pub is_vox: bool,
}

/// Per-instance rollup stats. Absent on a few server-side placeholder items,
/// so every read goes through the sentinel getters below.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    pub unit_count: u32,
    pub total_mass: f32,
    /// 0.0 ..= 1.0 on the wire; `quality_pct` scales it for display.
    pub quality: f32,
}

/// Declared capacity limits for one drawer. Negative values mean unlimited.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrawerCaps {
    pub max_item_count: i32,
    pub max_item_mass: f32,
}

impl DrawerCaps {
    pub fn unlimited() -> Self {
        DrawerCaps { max_item_count: -1, max_item_mass: -1.0 }
    }

    pub fn count_is_unlimited(&self) -> bool {
        self.max_item_count < 0
    }

    pub fn mass_is_unlimited(&self) -> bool {
        self.max_item_mass < 0.0
    }
}

/// One drawer a container item exposes, contents not included. What currently
/// sits in the drawer lives in the container index, never here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DrawerDef {
    pub id: DrawerId,
    pub caps: DrawerCaps,
}

/// A single item instance as the HUD tracks it. `location` is the source of
/// truth for where the item is; the inventory slot map, the container index and
/// the paper doll are projections that must be kept in agreement with it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ItemInstance {
    pub id: ItemInstanceId,
    pub stack_hash: String,
    pub given_name: Option<String>,
    pub def: Option<ItemStaticDef>,
    pub stats: Option<ItemStats>,
    pub location: ItemLocation,
    /// `Some` iff the item is a container. Empty drawer list still counts.
    pub drawers: Option<Vec<DrawerDef>>,
    /// Permission mask restricting what the local character may do with the
    /// item. `None` means unrestricted.
    pub user_permissions: Option<u32>,
}

impl ItemInstance {
    pub fn is_container(&self) -> bool {
        self.drawers.is_some()
    }

    pub fn is_vox(&self) -> bool {
        self.def.as_ref().map(|d| d.is_vox).unwrap_or(false)
    }

    /// Substances and alloys feed the vox; everything else does not.
    pub fn is_crafting_item(&self) -> bool {
        match &self.def {
            Some(def) => matches!(def.item_type, ItemType::Substance | ItemType::Alloy),
            None => {
                log::error!("[Items] Item {} has no static definition", self.id);
                false
            }
        }
    }

    pub fn is_stacked(&self) -> bool {
        match &self.stats {
            Some(stats) => stats.unit_count > 1 || self.stack_hash != EMPTY_STACK_HASH,
            None => false,
        }
    }

    /// Units in the stack, or -1 when the stats block is missing.
    pub fn unit_count(&self) -> i32 {
        match &self.stats {
            Some(stats) => stats.unit_count as i32,
            None => -1,
        }
    }

    /// Total mass of the stack, or -1 when the stats block is missing.
    pub fn total_mass(&self) -> f32 {
        match &self.stats {
            Some(stats) => stats.total_mass,
            None => -1.0,
        }
    }

    /// Quality scaled to 0..100 for display, or -1 when stats are missing.
    pub fn quality_pct(&self) -> f32 {
        match &self.stats {
            Some(stats) => stats.quality * 100.0,
            None => -1.0,
        }
    }

    /// Top-level inventory slot, or -1 when the item is anywhere else.
    pub fn inventory_position(&self) -> i32 {
        match self.location.inventory_position() {
            Some(position) => position as i32,
            None => -1,
        }
    }

    pub fn has_inventory_position(&self) -> bool {
        self.inventory_position() > -1
    }

    pub fn definition_id(&self) -> Option<&str> {
        match &self.def {
            Some(def) => Some(def.id.as_str()),
            None => {
                log::error!("[Items] Item {} has no static definition", self.id);
                None
            }
        }
    }

    pub fn definition_name(&self) -> Option<&str> {
        match &self.def {
            Some(def) => Some(def.name.as_str()),
            None => {
                log::error!("[Items] Item {} has no static definition", self.id);
                None
            }
        }
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.def.as_ref().map(|d| d.icon_url.as_str())
    }

    /// Display name, falling back to the definition name when the instance has
    /// not been renamed.
    pub fn display_name(&self) -> &str {
        if let Some(name) = &self.given_name {
            return name.as_str();
        }
        self.def.as_ref().map(|d| d.name.as_str()).unwrap_or("")
    }

    /// Identity used when collapsing visually-identical tiles. Stackable and
    /// crafting items share one tile per definition, everything else gets its
    /// own tile per instance.
    pub fn map_id(&self) -> String {
        match &self.def {
            Some(def) if self.is_crafting_item() || self.is_stacked() => {
                format!("{}{}", def.name, def.id)
            }
            Some(_) => self.id.clone(),
            None => {
                log::error!("[Items] Item {} has no static definition", self.id);
                self.id.clone()
            }
        }
    }

    /// Id of the container this item exposes. Only valid for container items.
    pub fn container_id(&self) -> Option<ContainerId> {
        if self.is_container() {
            Some(self.id.clone())
        } else {
            log::error!("[Items] {} requested a container id and is not a container", self.id);
            None
        }
    }
}

/// Key used to group identical stacks into one visual pile.
pub fn stack_group_id(stack_hash: &str, stack_group_counter: u32) -> String {
    format!("{}:{}", stack_hash, stack_group_counter)
}

/// Scans upward from `start_with` for the first slot with nothing in it.
pub fn first_available_slot(
    start_with: SlotIndex,
    slot_map: &BTreeMap<SlotIndex, ItemInstanceId>,
) -> SlotIndex {
    let mut slot = start_with;
    while slot_map.contains_key(&slot) {
        slot += 1;
    }
    slot
}

/// Display text for a PascalCase gear slot id, "LeftHand" becomes "Left Hand".
pub fn prettify_slot_name(slot_name: &str) -> String {
    let mut pretty = String::with_capacity(slot_name.len() + 4);
    for (i, ch) in slot_name.chars().enumerate() {
        if i == 0 {
            pretty.extend(ch.to_uppercase());
            continue;
        }
        if ch.is_uppercase() {
            pretty.push(' ');
        }
        pretty.push(ch);
    }
    pretty
}

// --- Wire fragments ---
// Snapshot payloads arrive in the nested shape the item service reports:
// container items carry their drawers and the drawers carry their items.
// `InventoryState::resync` flattens this into the slot maps and the container
// index; nothing nested is kept around afterwards.

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct InventoryPositionFragment {
    pub position: SlotIndex,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ContainerPositionFragment {
    pub position: SlotIndex,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct EquippedFragment {
    #[serde(rename = "gearSlotIDs", default)]
    pub gear_slot_ids: Vec<GearSlotId>,
}

/// Location as reported by the item service: three parallel nullable fields,
/// at most one populated.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocationFragment {
    #[serde(default)]
    pub inventory: Option<InventoryPositionFragment>,
    #[serde(default)]
    pub in_container: Option<ContainerPositionFragment>,
    #[serde(default)]
    pub equipped: Option<EquippedFragment>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDrawersFragment {
    pub id: DrawerId,
    pub stats: DrawerCaps,
    #[serde(default)]
    pub contained_items: Vec<ItemFragment>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PermissibleHolderFragment {
    pub user_permissions: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ItemFragment {
    pub id: ItemInstanceId,
    #[serde(default)]
    pub stack_hash: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub static_definition: Option<ItemStaticDef>,
    #[serde(default)]
    pub stats: Option<ItemStatsFragment>,
    #[serde(default)]
    pub location: LocationFragment,
    #[serde(default)]
    pub container_drawers: Option<Vec<ContainerDrawersFragment>>,
    #[serde(default)]
    pub permissible_holder: Option<PermissibleHolderFragment>,
}

/// Stats arrive nested one level down (`stats.item.unitCount` on the wire).
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ItemStatsFragment {
    #[serde(default)]
    pub item: Option<ItemStats>,
}

impl ItemFragment {
    /// Collapses the nullable location trio into the HUD's tagged form.
    /// `drawer_id` is the drawer this fragment was listed under, if any; the
    /// wire only reports a bare position for contained items.
    pub fn resolve_location(&self, drawer_id: Option<&DrawerId>) -> Option<ItemLocation> {
        if let Some(inv) = &self.location.inventory {
            return Some(ItemLocation::inventory(inv.position));
        }
        if let Some(contained) = &self.location.in_container {
            let drawer_id = match drawer_id {
                Some(id) => id.clone(),
                None => {
                    log::error!(
                        "[Items] Item {} reports a container location outside any drawer",
                        self.id
                    );
                    return None;
                }
            };
            return Some(ItemLocation::in_container(drawer_id, contained.position));
        }
        if let Some(equipped) = &self.location.equipped {
            return Some(ItemLocation::equipped(equipped.gear_slot_ids.clone()));
        }
        None
    }

    /// Engine-side instance with the structural nesting stripped off. Drawer
    /// contents are flattened separately by the resync walk.
    pub fn to_instance(&self, location: ItemLocation) -> ItemInstance {
        let drawers = self.container_drawers.as_ref().map(|drawers| {
            drawers
                .iter()
                .map(|d| DrawerDef { id: d.id.clone(), caps: d.stats })
                .collect()
        });
        ItemInstance {
            id: self.id.clone(),
            stack_hash: if self.stack_hash.is_empty() {
                EMPTY_STACK_HASH.to_string()
            } else {
                self.stack_hash.clone()
            },
            given_name: self.given_name.clone(),
            def: self.static_definition.clone(),
            stats: self.stats.as_ref().and_then(|s| s.item),
            location,
            drawers,
            user_permissions: self.permissible_holder.as_ref().map(|p| p.user_permissions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_item(id: &str) -> ItemInstance {
        ItemInstance {
            id: id.to_string(),
            stack_hash: EMPTY_STACK_HASH.to_string(),
            given_name: None,
            def: None,
            stats: None,
            location: ItemLocation::inventory(0),
            drawers: None,
            user_permissions: None,
        }
    }

    fn defined_item(id: &str, name: &str, item_type: ItemType) -> ItemInstance {
        let mut item = bare_item(id);
        item.def = Some(ItemStaticDef {
            id: format!("def-{}", name),
            name: name.to_string(),
            description: String::new(),
            icon_url: String::new(),
            item_type,
            gear_slot_sets: Vec::new(),
            is_vox: false,
        });
        item
    }

    #[test]
    fn sentinel_getters_report_minus_one_without_stats() {
        let item = bare_item("i1");
        assert_eq!(item.unit_count(), -1);
        assert_eq!(item.total_mass(), -1.0);
        assert_eq!(item.quality_pct(), -1.0);
    }

    #[test]
    fn quality_scales_to_percent() {
        let mut item = bare_item("i1");
        item.stats = Some(ItemStats { unit_count: 1, total_mass: 2.5, quality: 0.87 });
        assert!((item.quality_pct() - 87.0).abs() < 1e-4);
        assert_eq!(item.unit_count(), 1);
    }

    #[test]
    fn inventory_position_sentinel() {
        let mut item = bare_item("i1");
        assert_eq!(item.inventory_position(), 0);
        assert!(item.has_inventory_position());
        item.location = ItemLocation::in_container("d0".to_string(), 3);
        assert_eq!(item.inventory_position(), -1);
        assert!(!item.has_inventory_position());
    }

    #[test]
    fn stacked_detection_uses_count_and_hash() {
        let mut item = bare_item("i1");
        item.stats = Some(ItemStats { unit_count: 1, total_mass: 1.0, quality: 1.0 });
        assert!(!item.is_stacked());
        item.stats = Some(ItemStats { unit_count: 4, total_mass: 4.0, quality: 1.0 });
        assert!(item.is_stacked());
        item.stats = Some(ItemStats { unit_count: 1, total_mass: 1.0, quality: 1.0 });
        item.stack_hash = "abc123".to_string();
        assert!(item.is_stacked());
    }

    #[test]
    fn map_id_groups_stacks_by_definition() {
        let mut stacked = defined_item("i1", "Iron", ItemType::Substance);
        stacked.stats = Some(ItemStats { unit_count: 9, total_mass: 9.0, quality: 0.5 });
        assert_eq!(stacked.map_id(), "Irondef-Iron");

        let unique = defined_item("i2", "Sword", ItemType::Weapon);
        assert_eq!(unique.map_id(), "i2");
    }

    #[test]
    fn first_available_slot_skips_occupied() {
        let mut slots = BTreeMap::new();
        slots.insert(0, "a".to_string());
        slots.insert(1, "b".to_string());
        slots.insert(3, "c".to_string());
        assert_eq!(first_available_slot(0, &slots), 2);
        assert_eq!(first_available_slot(3, &slots), 4);
    }

    #[test]
    fn fragment_location_resolution() {
        let json = r#"{
            "id": "item-1",
            "stackHash": "",
            "location": { "inventory": { "position": 7 } }
        }"#;
        let fragment: ItemFragment = serde_json::from_str(json).unwrap();
        assert_eq!(fragment.resolve_location(None), Some(ItemLocation::inventory(7)));

        let nested = r#"{
            "id": "item-2",
            "location": { "inContainer": { "position": 2 } }
        }"#;
        let fragment: ItemFragment = serde_json::from_str(nested).unwrap();
        let drawer = "drawer-0".to_string();
        assert_eq!(
            fragment.resolve_location(Some(&drawer)),
            Some(ItemLocation::in_container("drawer-0".to_string(), 2))
        );
        // A contained location with no enclosing drawer cannot be placed.
        assert_eq!(fragment.resolve_location(None), None);
    }

    #[test]
    fn fragment_to_instance_strips_nesting() {
        let json = r#"{
            "id": "box-1",
            "stackHash": "",
            "staticDefinition": {
                "id": "def-box", "name": "Box", "itemType": "Deployable"
            },
            "stats": { "item": { "unitCount": 1, "totalMass": 3.0, "quality": 1.0 } },
            "location": { "inventory": { "position": 0 } },
            "containerDrawers": [
                {
                    "id": "drawer-0",
                    "stats": { "maxItemCount": 10, "maxItemMass": -1 },
                    "containedItems": [
                        { "id": "inner-1", "location": { "inContainer": { "position": 0 } } }
                    ]
                }
            ]
        }"#;
        let fragment: ItemFragment = serde_json::from_str(json).unwrap();
        let location = fragment.resolve_location(None).unwrap();
        let instance = fragment.to_instance(location);
        assert!(instance.is_container());
        let drawers = instance.drawers.as_ref().unwrap();
        assert_eq!(drawers.len(), 1);
        assert_eq!(drawers[0].id, "drawer-0");
        assert_eq!(drawers[0].caps.max_item_count, 10);
        assert!(drawers[0].caps.mass_is_unlimited());
        // The nested item is reachable from the fragment, not the instance.
        assert_eq!(fragment.container_drawers.as_ref().unwrap()[0].contained_items.len(), 1);
    }

    #[test]
    fn slot_names_prettify() {
        assert_eq!(prettify_slot_name("LeftHand"), "Left Hand");
        assert_eq!(prettify_slot_name("primaryHandWeapon"), "Primary Hand Weapon");
        assert_eq!(prettify_slot_name("Head"), "Head");
        assert_eq!(prettify_slot_name(""), "");
    }
}
