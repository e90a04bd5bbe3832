use serde::{Serialize, Deserialize};

use crate::items::ItemInstance;
use crate::models::{CharacterId, EntityId, GearSlotId, TransferZone};

// --- Wire constants ---

/// Id token the item service reads as "no entity".
pub const NULL_ENTITY_ID: &str = "0000000000000000000000";
/// Sent in every move request; vox slotting goes through its own endpoint.
pub const VOX_SLOT_INVALID: &str = "Invalid";
/// Stack moves always transfer the whole stack.
pub const WHOLE_STACK: i32 = -1;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3F {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Euler3f {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

/// Location kind tag the move endpoint expects.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveLocation {
    Inventory,
    Container,
    Ground,
}

/// One endpoint of a move request. Which fields are present depends on the
/// kind of endpoint; absent fields are omitted from the JSON entirely.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MoveItemRequestLocation {
    #[serde(rename = "entityID")]
    pub entity_id: EntityId,
    #[serde(rename = "characterID", default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<CharacterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(rename = "containerID", default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(rename = "drawerID", default, skip_serializing_if = "Option::is_none")]
    pub drawer_id: Option<String>,
    #[serde(rename = "gearSlotIDs", default, skip_serializing_if = "Option::is_none")]
    pub gear_slot_ids: Option<Vec<GearSlotId>>,
    #[serde(rename = "worldPosition", default, skip_serializing_if = "Option::is_none")]
    pub world_position: Option<Vec3F>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Euler3f>,
    pub location: MoveLocation,
    #[serde(rename = "voxSlot")]
    pub vox_slot: String,
}

impl MoveItemRequestLocation {
    fn character_endpoint(character_id: &str, location: MoveLocation) -> Self {
        MoveItemRequestLocation {
            entity_id: NULL_ENTITY_ID.to_string(),
            character_id: Some(character_id.to_string()),
            position: None,
            container_id: None,
            drawer_id: None,
            gear_slot_ids: Some(Vec::new()),
            world_position: None,
            rotation: None,
            location,
            vox_slot: VOX_SLOT_INVALID.to_string(),
        }
    }
}

/// One item move as the batch move endpoint takes it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MoveItemRequest {
    #[serde(rename = "moveItemID")]
    pub move_item_id: String,
    #[serde(rename = "stackHash")]
    pub stack_hash: String,
    #[serde(rename = "unitCount")]
    pub unit_count: i32,
    pub to: MoveItemRequestLocation,
    pub from: MoveItemRequestLocation,
}

/// Move request dropping `item` from the inventory onto the ground.
pub fn move_to_world_position(
    item: &ItemInstance,
    character_id: &str,
    world_position: Vec3F,
    rotation: Euler3f,
) -> MoveItemRequest {
    let to = MoveItemRequestLocation {
        entity_id: NULL_ENTITY_ID.to_string(),
        character_id: None,
        position: None,
        container_id: None,
        drawer_id: None,
        gear_slot_ids: None,
        world_position: Some(world_position),
        rotation: Some(rotation),
        location: MoveLocation::Ground,
        vox_slot: VOX_SLOT_INVALID.to_string(),
    };
    let mut from = MoveItemRequestLocation::character_endpoint(character_id, MoveLocation::Inventory);
    from.position = Some(item.inventory_position());
    from.container_id = Some(NULL_ENTITY_ID.to_string());
    MoveItemRequest {
        move_item_id: item.id.clone(),
        stack_hash: item.stack_hash.clone(),
        unit_count: WHOLE_STACK,
        to,
        from,
    }
}

/// Move request placing `item` into a top-level inventory slot.
pub fn move_to_inventory_position(
    item: &ItemInstance,
    character_id: &str,
    position: i32,
) -> MoveItemRequest {
    let mut to = MoveItemRequestLocation::character_endpoint(character_id, MoveLocation::Inventory);
    to.position = Some(position);
    to.container_id = Some(NULL_ENTITY_ID.to_string());
    let mut from = MoveItemRequestLocation::character_endpoint(character_id, MoveLocation::Inventory);
    from.position = Some(item.inventory_position());
    from.container_id = Some(NULL_ENTITY_ID.to_string());
    MoveItemRequest {
        move_item_id: item.id.clone(),
        stack_hash: item.stack_hash.clone(),
        unit_count: WHOLE_STACK,
        to,
        from,
    }
}

/// Move request between any mix of inventory, drawer and paper-doll endpoints.
/// The wire only carries the terminal container of a nested path; drawers of a
/// worn or nested container resolve server-side through that id.
pub fn move_to_container_position(
    item: &ItemInstance,
    character_id: &str,
    from_zone: &TransferZone,
    to_zone: &TransferZone,
) -> MoveItemRequest {
    let from_position = item
        .location
        .container_position()
        .or(item.location.inventory_position())
        .map(|p| p as i32)
        .or(from_zone.position().map(|p| p as i32))
        .unwrap_or(-1);

    let mut to = MoveItemRequestLocation::character_endpoint(
        character_id,
        zone_location_kind(to_zone),
    );
    to.position = to_zone.position().map(|p| p as i32);
    to.container_id = to_zone.terminal_container().cloned();
    to.drawer_id = to_zone.drawer_id().cloned();

    let mut from = MoveItemRequestLocation::character_endpoint(
        character_id,
        zone_location_kind(from_zone),
    );
    from.position = Some(from_position);
    from.container_id = from_zone.terminal_container().cloned();
    from.drawer_id = from_zone.drawer_id().cloned();
    if let TransferZone::PaperDoll { gear_slot_ids } = from_zone {
        from.gear_slot_ids = Some(gear_slot_ids.clone());
    }

    MoveItemRequest {
        move_item_id: item.id.clone(),
        stack_hash: item.stack_hash.clone(),
        unit_count: WHOLE_STACK,
        to,
        from,
    }
}

fn zone_location_kind(zone: &TransferZone) -> MoveLocation {
    match zone {
        TransferZone::Drawer { .. } => MoveLocation::Container,
        TransferZone::Inventory { .. } | TransferZone::PaperDoll { .. } => MoveLocation::Inventory,
    }
}

/// JSON body for the batch move endpoint.
pub fn encode_requests(requests: &[MoveItemRequest]) -> serde_json::Result<String> {
    serde_json::to_string(requests)
}

// --- Responses ---

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct FieldCode {
    #[serde(rename = "Code", default)]
    pub code: u32,
    #[serde(rename = "Message", default)]
    pub message: String,
}

#[derive(Deserialize, Default)]
struct MoveItemsBody {
    #[serde(rename = "FieldCodes", default)]
    field_codes: Vec<FieldCode>,
}

/// Outcome of a batch move call, after the transport layer has run it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveItemsOutcome {
    pub ok: bool,
    pub field_codes: Vec<FieldCode>,
}

impl MoveItemsOutcome {
    pub fn success() -> Self {
        MoveItemsOutcome { ok: true, field_codes: Vec::new() }
    }

    /// Builds an outcome from the transport's status flag and raw body. A
    /// body that does not parse still produces a failed outcome, just without
    /// server detail.
    pub fn from_response(ok: bool, body: &str) -> Self {
        if ok {
            return Self::success();
        }
        let parsed: MoveItemsBody = serde_json::from_str(body).unwrap_or_default();
        MoveItemsOutcome { ok: false, field_codes: parsed.field_codes }
    }

    pub fn first_error_message(&self) -> Option<&str> {
        self.field_codes.first().map(|f| f.message.as_str())
    }
}
