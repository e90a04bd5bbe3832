use serde::{Serialize, Deserialize};

// --- Identifier aliases ---
// The game services hand out opaque string ids (base-64-ish tokens). The HUD never
// inspects them, it only keys maps and echoes them back over the wire.

pub type ItemInstanceId = String;
/// A container's id is the instance id of the item that owns the drawers.
pub type ContainerId = String;
pub type DrawerId = String;
pub type GearSlotId = String;
pub type CharacterId = String;
pub type EntityId = String;

/// Slot index inside a drawer or the top-level inventory grid, row-major from 0.
pub type SlotIndex = u32;

// --- Item permission bits ---
// Mirrors the server's ItemPermissions mask. The HUD only ever tests a couple of
// these, but the full set is kept so masks coming off the wire stay readable.

pub const PERM_TRASH: u32 = 1 << 0;
pub const PERM_TRADE: u32 = 1 << 1;
pub const PERM_DROP: u32 = 1 << 2;
pub const PERM_GROUND: u32 = 1 << 3;
pub const PERM_INVENTORY: u32 = 1 << 4;
pub const PERM_EQUIPMENT: u32 = 1 << 5;
pub const PERM_ADD_CONTENTS: u32 = 1 << 6;
pub const PERM_REMOVE_CONTENTS: u32 = 1 << 7;
pub const PERM_VIEW_CONTENTS: u32 = 1 << 8;

// --- Data structs for ItemLocation variants ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InventoryLocationData {
    pub position: SlotIndex,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContainerLocationData {
    /// The drawer holding the item. Which container the drawer belongs to is
    /// tracked by the drawer index, not duplicated here.
    pub drawer_id: DrawerId,
    pub position: SlotIndex,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EquippedLocationData {
    /// Every gear slot the item occupies while worn (a greatsword fills both hands).
    pub gear_slot_ids: Vec<GearSlotId>,
}

/// Where an item instance currently lives, from the HUD's point of view.
/// Exactly one variant applies at a time; moving an item always rewrites this
/// alongside the slot maps that index it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ItemLocation {
    Inventory(InventoryLocationData),
    InContainer(ContainerLocationData),
    Equipped(EquippedLocationData),
}

impl ItemLocation {
    pub fn inventory(position: SlotIndex) -> Self {
        ItemLocation::Inventory(InventoryLocationData { position })
    }

    pub fn in_container(drawer_id: DrawerId, position: SlotIndex) -> Self {
        ItemLocation::InContainer(ContainerLocationData { drawer_id, position })
    }

    pub fn equipped(gear_slot_ids: Vec<GearSlotId>) -> Self {
        ItemLocation::Equipped(EquippedLocationData { gear_slot_ids })
    }

    pub fn is_inventory(&self) -> bool {
        matches!(self, ItemLocation::Inventory(_))
    }

    pub fn is_in_container(&self) -> bool {
        matches!(self, ItemLocation::InContainer(_))
    }

    pub fn is_equipped(&self) -> bool {
        matches!(self, ItemLocation::Equipped(_))
    }

    /// Slot index if the item sits in the top-level inventory.
    pub fn inventory_position(&self) -> Option<SlotIndex> {
        match self {
            ItemLocation::Inventory(data) => Some(data.position),
            _ => None,
        }
    }

    /// Slot index if the item sits inside a container drawer.
    pub fn container_position(&self) -> Option<SlotIndex> {
        match self {
            ItemLocation::InContainer(data) => Some(data.position),
            _ => None,
        }
    }

    pub fn equipped_gear_slots(&self) -> Option<&[GearSlotId]> {
        match self {
            ItemLocation::Equipped(data) => Some(&data.gear_slot_ids),
            _ => None,
        }
    }
}

/// One endpoint of a drag gesture, as the drag layer reports it. Unlike
/// `ItemLocation`, a drawer endpoint spells out the full container path from
/// the top-level inventory down, because validation and the wire both need to
/// know the terminal container.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum TransferZone {
    Inventory {
        position: SlotIndex,
    },
    Drawer {
        /// Container ids from the outermost container down to the one holding
        /// the drawer. One entry for a top-level container, two when nested.
        container_path: Vec<ContainerId>,
        drawer_id: DrawerId,
        position: SlotIndex,
    },
    PaperDoll {
        gear_slot_ids: Vec<GearSlotId>,
    },
}

impl TransferZone {
    pub fn is_paper_doll(&self) -> bool {
        matches!(self, TransferZone::PaperDoll { .. })
    }

    pub fn container_path(&self) -> Option<&[ContainerId]> {
        match self {
            TransferZone::Drawer { container_path, .. } => Some(container_path),
            _ => None,
        }
    }

    /// The container whose drawer this zone points into: the last id on the
    /// path.
    pub fn terminal_container(&self) -> Option<&ContainerId> {
        match self {
            TransferZone::Drawer { container_path, .. } => container_path.last(),
            _ => None,
        }
    }

    pub fn drawer_id(&self) -> Option<&DrawerId> {
        match self {
            TransferZone::Drawer { drawer_id, .. } => Some(drawer_id),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<SlotIndex> {
        match self {
            TransferZone::Inventory { position } => Some(*position),
            TransferZone::Drawer { position, .. } => Some(*position),
            TransferZone::PaperDoll { .. } => None,
        }
    }

    /// The item location an item sitting in this zone would carry.
    pub fn as_location(&self) -> ItemLocation {
        match self {
            TransferZone::Inventory { position } => ItemLocation::inventory(*position),
            TransferZone::Drawer { drawer_id, position, .. } => {
                ItemLocation::in_container(drawer_id.clone(), *position)
            }
            TransferZone::PaperDoll { gear_slot_ids } => {
                ItemLocation::equipped(gear_slot_ids.clone())
            }
        }
    }
}
