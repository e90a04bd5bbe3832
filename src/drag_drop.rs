use log;
use thiserror::Error;

use crate::containers::{ContainerIndexError, DrawerTotals};
use crate::equipment::PaperDoll;
use crate::inventory::InventoryState;
use crate::items::{DrawerCaps, ItemInstance};
use crate::models::{
    ContainerId, DrawerId, ItemInstanceId, TransferZone, PERM_ADD_CONTENTS,
};
use crate::signals::{Signal, SignalQueue, Toast};
use crate::webapi::{self, Euler3f, MoveItemRequest, MoveItemsOutcome, Vec3F};

/// Typed drag payload: which item is being dragged and the zone it came from.
/// Hosts build one of these when a drag starts instead of smuggling loose
/// fields through the drag event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferDescriptor {
    pub item_id: ItemInstanceId,
    pub zone: TransferZone,
}

impl TransferDescriptor {
    pub fn from_inventory(item_id: impl Into<ItemInstanceId>, position: u32) -> Self {
        TransferDescriptor { item_id: item_id.into(), zone: TransferZone::Inventory { position } }
    }

    pub fn from_drawer(
        item_id: impl Into<ItemInstanceId>,
        container_path: Vec<ContainerId>,
        drawer_id: impl Into<DrawerId>,
        position: u32,
    ) -> Self {
        TransferDescriptor {
            item_id: item_id.into(),
            zone: TransferZone::Drawer {
                container_path,
                drawer_id: drawer_id.into(),
                position,
            },
        }
    }

    pub fn from_paper_doll(item_id: impl Into<ItemInstanceId>, gear_slot_ids: Vec<String>) -> Self {
        TransferDescriptor { item_id: item_id.into(), zone: TransferZone::PaperDoll { gear_slot_ids } }
    }
}

/// One reason a drop into a container was refused. A single drop can fail for
/// several of these at once; validation reports all of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementDenial {
    #[error("equipped items cannot go into a container")]
    EquippedItem,
    #[error("a container can only be nested one level")]
    DoubleNestedContainer,
    #[error("a container cannot go inside itself")]
    ContainerInsideItself,
    #[error("{name} already contains a container")]
    AlreadyHoldsContainer { name: String },
    #[error("missing the add-contents permission for this container")]
    NoAddPermission,
    #[error("the drawer cannot hold any more items")]
    MaxItemCount,
    #[error("the drawer cannot hold any more mass")]
    MaxItemMass,
    #[error("an equipped item can only be dropped on an empty inventory slot")]
    SwapWithEquipped,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("item {0} is not known to the HUD")]
    ItemNotFound(ItemInstanceId),
    #[error("container {0} is not known to the HUD")]
    ContainerNotFound(ContainerId),
    #[error("container {container_id} has no drawer named {drawer_id}")]
    DrawerNotFound { container_id: ContainerId, drawer_id: DrawerId },
    #[error("a drawer endpoint needs at least one container on its path")]
    EmptyContainerPath,
    #[error("equip targets are handled by the paper doll, not the drop engine")]
    PaperDollDropTarget,
    #[error("items can only be dropped on the ground from the top-level inventory")]
    GroundDropFromInventoryOnly,
    #[error("placement rejected for {} reason(s)", .0.len())]
    Rejected(Vec<PlacementDenial>),
    #[error(transparent)]
    Index(#[from] ContainerIndexError),
}

/// What a successfully resolved drop produced. The state is already updated;
/// `requests` still have to be sent to the server by the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DropOutcome {
    pub requests: Vec<MoveItemRequest>,
    /// The occupant that traded places with the dragged item, if any.
    pub swapped_item_id: Option<ItemInstanceId>,
}

/// Checks whether the dragged item may land in a container drawer. Returns
/// every reason it may not; an empty list means the drop is allowed. Only
/// called for drawer targets, inventory targets accept anything.
///
/// Capacity is checked against the drawer's declared caps with the displaced
/// occupant credited first, so a swap that nets zero change passes. Moves
/// within the same container path skip the capacity check entirely.
pub fn verify_container_slot(
    state: &InventoryState,
    drag_item: &ItemInstance,
    drag_zone: &TransferZone,
    drop_item: Option<&ItemInstance>,
    drop_container_path: &[ContainerId],
    container_permissions: Option<u32>,
    drawer_caps: &DrawerCaps,
    drawer_current: DrawerTotals,
) -> Vec<PlacementDenial> {
    let mut denials = Vec::new();

    if drag_zone.is_paper_doll() {
        denials.push(PlacementDenial::EquippedItem);
    }

    if drag_item.is_container() && drop_container_path.len() > 1 {
        denials.push(PlacementDenial::DoubleNestedContainer);
    }

    let putting_in_self =
        drop_container_path.last().map(|id| id == &drag_item.id).unwrap_or(false);
    if putting_in_self {
        denials.push(PlacementDenial::ContainerInsideItself);
    }

    if !putting_in_self
        && drag_item.is_container()
        && state.containers.holds_a_container(&drag_item.id, &state.items)
    {
        denials.push(PlacementDenial::AlreadyHoldsContainer {
            name: drag_item.display_name().to_string(),
        });
    }

    let permitted = match container_permissions {
        None => true,
        Some(mask) => mask & PERM_ADD_CONTENTS != 0,
    };
    if !permitted {
        denials.push(PlacementDenial::NoAddPermission);
    }

    let same_container = drag_zone.container_path() == Some(drop_container_path);
    if !same_container {
        if !drawer_caps.count_is_unlimited() {
            let displaced = drop_item.map(|item| item.unit_count().max(0)).unwrap_or(0);
            let projected = drawer_current.item_count as i32 - displaced + drag_item.unit_count().max(0);
            if projected > drawer_caps.max_item_count {
                denials.push(PlacementDenial::MaxItemCount);
            }
        }
        if !drawer_caps.mass_is_unlimited() {
            let displaced = drop_item.map(|item| item.total_mass().max(0.0)).unwrap_or(0.0);
            let projected = drawer_current.mass - displaced + drag_item.total_mass().max(0.0);
            if projected > drawer_caps.max_item_mass {
                denials.push(PlacementDenial::MaxItemMass);
            }
        }
    }

    denials
}

fn denial_toast(denial: &PlacementDenial) -> Toast {
    match denial {
        PlacementDenial::EquippedItem => {
            Toast::error("Try this", "Try moving the equipped item to the inventory first")
        }
        PlacementDenial::DoubleNestedContainer => {
            Toast::error("Darn!", "A container can only be nested one level")
        }
        PlacementDenial::ContainerInsideItself => {
            Toast::error("Silly!", "You can't put a container inside of itself")
        }
        PlacementDenial::AlreadyHoldsContainer { name } => {
            Toast::error("Darn!", format!("{} already contains a container inside.", name))
        }
        PlacementDenial::NoAddPermission => {
            Toast::error("You can't do that", "You don't have permission to add items to this container")
        }
        PlacementDenial::MaxItemCount => {
            Toast::error("You can't do that", "You have reached the max amount of items in this drawer")
        }
        PlacementDenial::MaxItemMass => {
            Toast::error("You can't do that", "You have reached the max amount of mass in this drawer")
        }
        PlacementDenial::SwapWithEquipped => {
            Toast::error("Try this", "Drop the equipped item on an empty inventory slot")
        }
    }
}

fn zone_wire_position(zone: &TransferZone) -> i32 {
    zone.position().map(|p| p as i32).unwrap_or(-1)
}

/// Resolves a drop gesture end to end: validates the target, swaps or places
/// locally (optimistic), and returns the move requests the host must send.
/// On rejection the state is untouched and a toast is queued per reason.
pub fn resolve_drop(
    state: &mut InventoryState,
    doll: &mut PaperDoll,
    signals: &mut SignalQueue,
    character_id: &str,
    drag: &TransferDescriptor,
    drop_zone: &TransferZone,
) -> Result<DropOutcome, TransferError> {
    if drop_zone.is_paper_doll() {
        return Err(TransferError::PaperDollDropTarget);
    }
    if drag.zone == *drop_zone {
        return Ok(DropOutcome::default());
    }
    if matches!(&drag.zone, TransferZone::Drawer { container_path, .. } if container_path.is_empty()) {
        return Err(TransferError::EmptyContainerPath);
    }

    let drag_item = state
        .item(&drag.item_id)
        .cloned()
        .ok_or_else(|| TransferError::ItemNotFound(drag.item_id.clone()))?;

    // Whatever already sits in the drop slot.
    let drop_item_id = match drop_zone {
        TransferZone::Inventory { position } => state.item_id_in_slot(*position).cloned(),
        TransferZone::Drawer { container_path, drawer_id, position } => {
            let container_id =
                container_path.last().ok_or(TransferError::EmptyContainerPath)?;
            state.containers.item_at(container_id, drawer_id, *position).cloned()
        }
        TransferZone::PaperDoll { .. } => None,
    };
    if drop_item_id.as_deref() == Some(drag.item_id.as_str()) {
        // Dropped back onto itself.
        return Ok(DropOutcome::default());
    }
    let drop_item = match &drop_item_id {
        Some(id) => Some(lookup_item(state, id)?),
        None => None,
    };

    // An equipped item can leave the doll only into an empty inventory slot.
    if drag.zone.is_paper_doll() && drop_item.is_some() {
        let denials = vec![PlacementDenial::SwapWithEquipped];
        for denial in &denials {
            signals.toast(denial_toast(denial));
        }
        return Err(TransferError::Rejected(denials));
    }

    if let TransferZone::Drawer { container_path, drawer_id, .. } = drop_zone {
        let container_id = container_path.last().ok_or(TransferError::EmptyContainerPath)?;
        let container_item = state
            .item(container_id)
            .ok_or_else(|| TransferError::ContainerNotFound(container_id.clone()))?;
        let caps = container_item
            .drawers
            .as_ref()
            .and_then(|drawers| drawers.iter().find(|d| &d.id == drawer_id))
            .map(|d| d.caps)
            .ok_or_else(|| TransferError::DrawerNotFound {
                container_id: container_id.clone(),
                drawer_id: drawer_id.clone(),
            })?;
        let permissions = container_item.user_permissions;
        let current = state.containers.drawer_totals(container_id, drawer_id, &state.items);

        let denials = verify_container_slot(
            state,
            &drag_item,
            &drag.zone,
            drop_item.as_ref(),
            container_path,
            permissions,
            &caps,
            current,
        );
        if !denials.is_empty() {
            for denial in &denials {
                signals.toast(denial_toast(denial));
            }
            return Err(TransferError::Rejected(denials));
        }
    }

    // Build the wire requests from the pre-move state; the builders read the
    // items' current locations for the from side.
    let both_inventory = matches!(
        (&drag.zone, drop_zone),
        (TransferZone::Inventory { .. }, TransferZone::Inventory { .. })
    );
    let mut requests = Vec::new();
    if both_inventory {
        requests.push(webapi::move_to_inventory_position(
            &drag_item,
            character_id,
            zone_wire_position(drop_zone),
        ));
        if let Some(swap) = &drop_item {
            requests.push(webapi::move_to_inventory_position(
                swap,
                character_id,
                zone_wire_position(&drag.zone),
            ));
        }
    } else {
        requests.push(webapi::move_to_container_position(
            &drag_item,
            character_id,
            &drag.zone,
            drop_zone,
        ));
        if let Some(swap) = &drop_item {
            requests.push(webapi::move_to_container_position(
                swap,
                character_id,
                drop_zone,
                &drag.zone,
            ));
        }
    }

    // Optimistic bookkeeping: vacate the origin (or hand it to the swap
    // partner), fill the target, rewrite both locations.
    match &drag.zone {
        TransferZone::Inventory { position } => match &drop_item_id {
            Some(swap_id) => {
                state.set_inventory_slot(*position, swap_id.clone());
            }
            None => {
                state.clear_inventory_slot(*position);
            }
        },
        TransferZone::Drawer { container_path, drawer_id, position } => {
            let container_id = container_path.last().ok_or(TransferError::EmptyContainerPath)?;
            match &drop_item_id {
                Some(swap_id) => {
                    state.containers.set_slot(container_id, drawer_id, *position, swap_id.clone())?;
                }
                None => {
                    state.containers.clear_slot(container_id, drawer_id, *position)?;
                }
            }
        }
        TransferZone::PaperDoll { .. } => {
            doll.remove_item(&drag.item_id);
        }
    }

    match drop_zone {
        TransferZone::Inventory { position } => {
            state.set_inventory_slot(*position, drag.item_id.clone());
        }
        TransferZone::Drawer { container_path, drawer_id, position } => {
            let container_id = container_path.last().ok_or(TransferError::EmptyContainerPath)?;
            state.containers.set_slot(container_id, drawer_id, *position, drag.item_id.clone())?;
        }
        TransferZone::PaperDoll { .. } => {}
    }

    if let Some(entry) = state.item_mut(&drag.item_id) {
        entry.location = drop_zone.as_location();
    }
    if let Some(swap_id) = &drop_item_id {
        if let Some(entry) = state.item_mut(swap_id) {
            entry.location = drag.zone.as_location();
        }
    }

    log::info!(
        "[DragDrop] Moved {} ({} request(s), swap: {})",
        drag.item_id,
        requests.len(),
        drop_item_id.is_some()
    );

    Ok(DropOutcome { requests, swapped_item_id: drop_item_id })
}

fn lookup_item(state: &InventoryState, id: &str) -> Result<ItemInstance, TransferError> {
    state.item(id).cloned().ok_or_else(|| TransferError::ItemNotFound(id.to_string()))
}

/// Throws an inventory item onto the ground at a world position. The item (and
/// for containers, everything inside it) leaves local tracking immediately;
/// the returned request tells the server.
pub fn drop_on_ground(
    state: &mut InventoryState,
    character_id: &str,
    item_id: &str,
    world_position: Vec3F,
    rotation: Euler3f,
) -> Result<MoveItemRequest, TransferError> {
    let item = state
        .item(item_id)
        .cloned()
        .ok_or_else(|| TransferError::ItemNotFound(item_id.to_string()))?;
    let Some(position) = item.location.inventory_position() else {
        return Err(TransferError::GroundDropFromInventoryOnly);
    };

    let request = webapi::move_to_world_position(&item, character_id, world_position, rotation);

    state.clear_inventory_slot(position);
    state.items.remove(item_id);
    // A container takes its contents with it, including any containers nested
    // one level down.
    let mut pending = vec![item_id.to_string()];
    while let Some(container_id) = pending.pop() {
        let Some(record) = state.containers.unregister_container(&container_id) else {
            continue;
        };
        for occupant_id in record.occupant_ids() {
            if let Some(occupant) = state.items.remove(occupant_id) {
                if occupant.is_container() {
                    pending.push(occupant.id);
                }
            }
        }
    }

    log::info!("[DragDrop] Dropped {} on the ground", item_id);
    Ok(request)
}

/// Feeds the server's answer to a batch move back into the engine. Success
/// needs nothing, the optimistic state already matches. Failure means the
/// local guess is wrong in an unknown way, so the player gets a toast and the
/// host is asked to resync from the server.
pub fn apply_move_result(signals: &mut SignalQueue, outcome: &MoveItemsOutcome) {
    if outcome.ok {
        log::debug!("[DragDrop] Server confirmed batch move");
        return;
    }
    let text = outcome
        .first_error_message()
        .unwrap_or("An unknown error occurred")
        .to_string();
    signals.toast(Toast::error("Darn!", text));
    signals.push(Signal::ResyncRequested);
    log::warn!("[DragDrop] Batch move failed, requesting resync");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{DrawerDef, ItemStaticDef, ItemStats, ItemType, EMPTY_STACK_HASH};
    use crate::models::ItemLocation;
    use crate::webapi::MoveLocation;

    fn item(id: &str, location: ItemLocation) -> ItemInstance {
        ItemInstance {
            id: id.to_string(),
            stack_hash: EMPTY_STACK_HASH.to_string(),
            given_name: None,
            def: Some(ItemStaticDef {
                id: format!("def-{}", id),
                name: id.to_string(),
                description: String::new(),
                icon_url: String::new(),
                item_type: ItemType::Substance,
                gear_slot_sets: Vec::new(),
                is_vox: false,
            }),
            stats: Some(ItemStats { unit_count: 1, total_mass: 1.0, quality: 1.0 }),
            drawers: None,
            user_permissions: None,
            location,
        }
    }

    fn container(id: &str, location: ItemLocation, caps: DrawerCaps) -> ItemInstance {
        let mut c = item(id, location);
        c.drawers = Some(vec![DrawerDef { id: "d0".to_string(), caps }]);
        c
    }

    struct Fixture {
        state: InventoryState,
        doll: PaperDoll,
        signals: SignalQueue,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                state: InventoryState::new(),
                doll: PaperDoll::new(),
                signals: SignalQueue::new(),
            }
        }

        fn add(&mut self, item: ItemInstance) {
            match &item.location {
                ItemLocation::Inventory(data) => {
                    self.state.set_inventory_slot(data.position, item.id.clone());
                }
                ItemLocation::Equipped(data) => {
                    let slots = data.gear_slot_ids.clone();
                    self.doll.place(&item.id, &slots);
                }
                ItemLocation::InContainer(_) => {}
            }
            if item.is_container() {
                self.state.containers.register_container(&item);
            }
            self.state.items.insert(item.id.clone(), item);
        }

        fn put_in_drawer(&mut self, container_id: &str, slot: u32, mut item: ItemInstance) {
            item.location = ItemLocation::in_container("d0".to_string(), slot);
            self.state
                .containers
                .set_slot(container_id, "d0", slot, item.id.clone())
                .unwrap();
            self.state.items.insert(item.id.clone(), item);
        }

        fn resolve(
            &mut self,
            drag: &TransferDescriptor,
            drop_zone: &TransferZone,
        ) -> Result<DropOutcome, TransferError> {
            resolve_drop(&mut self.state, &mut self.doll, &mut self.signals, "char-1", drag, drop_zone)
        }
    }

    fn drawer_zone(container_id: &str, position: u32) -> TransferZone {
        TransferZone::Drawer {
            container_path: vec![container_id.to_string()],
            drawer_id: "d0".to_string(),
            position,
        }
    }

    #[test]
    fn move_to_empty_inventory_slot() {
        let mut fx = Fixture::new();
        fx.add(item("apple", ItemLocation::inventory(0)));

        let drag = TransferDescriptor::from_inventory("apple", 0);
        let outcome = fx.resolve(&drag, &TransferZone::Inventory { position: 5 }).unwrap();

        assert_eq!(outcome.requests.len(), 1);
        assert_eq!(outcome.swapped_item_id, None);
        assert_eq!(outcome.requests[0].to.position, Some(5));
        assert_eq!(fx.state.item_id_in_slot(0), None);
        assert_eq!(fx.state.item_id_in_slot(5), Some(&"apple".to_string()));
        assert_eq!(fx.state.item("apple").unwrap().location, ItemLocation::inventory(5));
        assert!(fx.signals.is_empty());
    }

    #[test]
    fn swap_two_inventory_items() {
        let mut fx = Fixture::new();
        fx.add(item("apple", ItemLocation::inventory(0)));
        fx.add(item("stone", ItemLocation::inventory(5)));

        let drag = TransferDescriptor::from_inventory("apple", 0);
        let outcome = fx.resolve(&drag, &TransferZone::Inventory { position: 5 }).unwrap();

        assert_eq!(outcome.swapped_item_id, Some("stone".to_string()));
        assert_eq!(outcome.requests.len(), 2);
        // Dragged item first, swap partner second.
        assert_eq!(outcome.requests[0].move_item_id, "apple");
        assert_eq!(outcome.requests[1].move_item_id, "stone");
        assert_eq!(outcome.requests[1].to.position, Some(0));

        assert_eq!(fx.state.item_id_in_slot(0), Some(&"stone".to_string()));
        assert_eq!(fx.state.item_id_in_slot(5), Some(&"apple".to_string()));
        assert_eq!(fx.state.item("stone").unwrap().location, ItemLocation::inventory(0));
    }

    #[test]
    fn move_from_inventory_into_drawer() {
        let mut fx = Fixture::new();
        fx.add(container("box", ItemLocation::inventory(3), DrawerCaps::unlimited()));
        fx.add(item("apple", ItemLocation::inventory(0)));

        let drag = TransferDescriptor::from_inventory("apple", 0);
        let outcome = fx.resolve(&drag, &drawer_zone("box", 2)).unwrap();

        assert_eq!(outcome.requests.len(), 1);
        let request = &outcome.requests[0];
        assert_eq!(request.to.location, MoveLocation::Container);
        assert_eq!(request.to.container_id.as_deref(), Some("box"));
        assert_eq!(request.to.drawer_id.as_deref(), Some("d0"));
        assert_eq!(request.from.location, MoveLocation::Inventory);

        assert_eq!(fx.state.item_id_in_slot(0), None);
        assert_eq!(fx.state.containers.item_at("box", "d0", 2), Some(&"apple".to_string()));
        assert_eq!(
            fx.state.item("apple").unwrap().location,
            ItemLocation::in_container("d0".to_string(), 2)
        );
    }

    #[test]
    fn move_from_drawer_back_to_inventory() {
        let mut fx = Fixture::new();
        fx.add(container("box", ItemLocation::inventory(3), DrawerCaps::unlimited()));
        fx.put_in_drawer("box", 1, item("apple", ItemLocation::inventory(0)));

        let drag = TransferDescriptor::from_drawer("apple", vec!["box".to_string()], "d0", 1);
        let outcome = fx.resolve(&drag, &TransferZone::Inventory { position: 7 }).unwrap();

        assert_eq!(outcome.requests[0].from.location, MoveLocation::Container);
        assert_eq!(outcome.requests[0].from.position, Some(1));
        assert_eq!(outcome.requests[0].to.position, Some(7));
        assert_eq!(fx.state.containers.item_at("box", "d0", 1), None);
        assert_eq!(fx.state.item_id_in_slot(7), Some(&"apple".to_string()));
    }

    #[test]
    fn swap_between_two_containers() {
        let mut fx = Fixture::new();
        fx.add(container("box-a", ItemLocation::inventory(0), DrawerCaps::unlimited()));
        fx.add(container("box-b", ItemLocation::inventory(1), DrawerCaps::unlimited()));
        fx.put_in_drawer("box-a", 0, item("apple", ItemLocation::inventory(9)));
        fx.put_in_drawer("box-b", 4, item("stone", ItemLocation::inventory(9)));

        let drag = TransferDescriptor::from_drawer("apple", vec!["box-a".to_string()], "d0", 0);
        let outcome = fx.resolve(&drag, &drawer_zone("box-b", 4)).unwrap();

        assert_eq!(outcome.swapped_item_id, Some("stone".to_string()));
        assert_eq!(fx.state.containers.item_at("box-b", "d0", 4), Some(&"apple".to_string()));
        assert_eq!(fx.state.containers.item_at("box-a", "d0", 0), Some(&"stone".to_string()));
        assert_eq!(
            fx.state.item("stone").unwrap().location,
            ItemLocation::in_container("d0".to_string(), 0)
        );
    }

    #[test]
    fn inverse_drop_restores_the_mapping() {
        let mut fx = Fixture::new();
        fx.add(container("box", ItemLocation::inventory(3), DrawerCaps::unlimited()));
        fx.add(item("apple", ItemLocation::inventory(0)));

        let into = TransferDescriptor::from_inventory("apple", 0);
        fx.resolve(&into, &drawer_zone("box", 2)).unwrap();
        let back = TransferDescriptor::from_drawer("apple", vec!["box".to_string()], "d0", 2);
        fx.resolve(&back, &TransferZone::Inventory { position: 0 }).unwrap();

        assert_eq!(fx.state.item_id_in_slot(0), Some(&"apple".to_string()));
        assert_eq!(fx.state.containers.item_at("box", "d0", 2), None);
        assert_eq!(fx.state.item("apple").unwrap().location, ItemLocation::inventory(0));
        assert!(fx.signals.is_empty());
    }

    #[test]
    fn drop_onto_itself_is_a_no_op() {
        let mut fx = Fixture::new();
        fx.add(item("apple", ItemLocation::inventory(0)));

        let drag = TransferDescriptor::from_inventory("apple", 0);
        let outcome = fx.resolve(&drag, &TransferZone::Inventory { position: 0 }).unwrap();
        assert_eq!(outcome, DropOutcome::default());
        assert_eq!(fx.state.item_id_in_slot(0), Some(&"apple".to_string()));
    }

    #[test]
    fn unknown_item_is_an_error() {
        let mut fx = Fixture::new();
        let drag = TransferDescriptor::from_inventory("ghost", 0);
        let err = fx.resolve(&drag, &TransferZone::Inventory { position: 1 }).unwrap_err();
        assert_eq!(err, TransferError::ItemNotFound("ghost".to_string()));
    }

    #[test]
    fn nested_container_drop_is_refused() {
        let mut fx = Fixture::new();
        fx.add(container("outer", ItemLocation::inventory(0), DrawerCaps::unlimited()));
        fx.add(container("inner", ItemLocation::inventory(1), DrawerCaps::unlimited()));
        fx.add(container("bag", ItemLocation::inventory(2), DrawerCaps::unlimited()));

        // Dropping a container one level down is fine; two levels is not.
        let nested_path = TransferZone::Drawer {
            container_path: vec!["outer".to_string(), "inner".to_string()],
            drawer_id: "d0".to_string(),
            position: 0,
        };
        let drag = TransferDescriptor::from_inventory("bag", 2);
        let err = fx.resolve(&drag, &nested_path).unwrap_err();
        match err {
            TransferError::Rejected(denials) => {
                assert!(denials.contains(&PlacementDenial::DoubleNestedContainer));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        // One toast per denial.
        assert_eq!(fx.signals.len(), 1);
        // Nothing moved.
        assert_eq!(fx.state.item_id_in_slot(2), Some(&"bag".to_string()));
    }

    #[test]
    fn container_cannot_enter_itself() {
        let mut fx = Fixture::new();
        fx.add(container("bag", ItemLocation::inventory(0), DrawerCaps::unlimited()));

        let drag = TransferDescriptor::from_inventory("bag", 0);
        let err = fx.resolve(&drag, &drawer_zone("bag", 0)).unwrap_err();
        assert_eq!(
            err,
            TransferError::Rejected(vec![PlacementDenial::ContainerInsideItself])
        );
    }

    #[test]
    fn container_holding_a_container_stays_out() {
        let mut fx = Fixture::new();
        fx.add(container("bag", ItemLocation::inventory(0), DrawerCaps::unlimited()));
        fx.add(container("chest", ItemLocation::inventory(1), DrawerCaps::unlimited()));
        fx.put_in_drawer("bag", 0, container("pouch", ItemLocation::inventory(9), DrawerCaps::unlimited()));

        let drag = TransferDescriptor::from_inventory("bag", 0);
        let err = fx.resolve(&drag, &drawer_zone("chest", 0)).unwrap_err();
        assert_eq!(
            err,
            TransferError::Rejected(vec![PlacementDenial::AlreadyHoldsContainer {
                name: "bag".to_string()
            }])
        );
    }

    #[test]
    fn equipped_item_cannot_enter_container() {
        let mut fx = Fixture::new();
        fx.add(container("box", ItemLocation::inventory(0), DrawerCaps::unlimited()));
        fx.add(item("helm", ItemLocation::equipped(vec!["Head".to_string()])));

        let drag = TransferDescriptor::from_paper_doll("helm", vec!["Head".to_string()]);
        let err = fx.resolve(&drag, &drawer_zone("box", 0)).unwrap_err();
        assert_eq!(err, TransferError::Rejected(vec![PlacementDenial::EquippedItem]));
    }

    #[test]
    fn missing_add_permission_is_refused() {
        let mut fx = Fixture::new();
        let mut locked = container("box", ItemLocation::inventory(0), DrawerCaps::unlimited());
        locked.user_permissions = Some(crate::models::PERM_VIEW_CONTENTS);
        fx.add(locked);
        fx.add(item("apple", ItemLocation::inventory(1)));

        let drag = TransferDescriptor::from_inventory("apple", 1);
        let err = fx.resolve(&drag, &drawer_zone("box", 0)).unwrap_err();
        assert_eq!(err, TransferError::Rejected(vec![PlacementDenial::NoAddPermission]));
    }

    #[test]
    fn permission_mask_with_add_bit_passes() {
        let mut fx = Fixture::new();
        let mut box_item = container("box", ItemLocation::inventory(0), DrawerCaps::unlimited());
        box_item.user_permissions = Some(PERM_ADD_CONTENTS);
        fx.add(box_item);
        fx.add(item("apple", ItemLocation::inventory(1)));

        let drag = TransferDescriptor::from_inventory("apple", 1);
        assert!(fx.resolve(&drag, &drawer_zone("box", 0)).is_ok());
    }

    #[test]
    fn full_drawer_refuses_by_count() {
        let mut fx = Fixture::new();
        let caps = DrawerCaps { max_item_count: 2, max_item_mass: -1.0 };
        fx.add(container("box", ItemLocation::inventory(0), caps));
        fx.put_in_drawer("box", 0, item("a", ItemLocation::inventory(9)));
        fx.put_in_drawer("box", 1, item("b", ItemLocation::inventory(9)));
        fx.add(item("apple", ItemLocation::inventory(1)));

        let drag = TransferDescriptor::from_inventory("apple", 1);
        let err = fx.resolve(&drag, &drawer_zone("box", 3)).unwrap_err();
        assert_eq!(err, TransferError::Rejected(vec![PlacementDenial::MaxItemCount]));
    }

    #[test]
    fn stack_units_count_toward_drawer_cap() {
        let mut fx = Fixture::new();
        let caps = DrawerCaps { max_item_count: 5, max_item_mass: -1.0 };
        fx.add(container("box", ItemLocation::inventory(0), caps));
        let mut ore = item("ore", ItemLocation::inventory(9));
        ore.stats = Some(ItemStats { unit_count: 4, total_mass: 4.0, quality: 1.0 });
        fx.put_in_drawer("box", 0, ore);
        let mut coal = item("coal", ItemLocation::inventory(1));
        coal.stats = Some(ItemStats { unit_count: 2, total_mass: 2.0, quality: 1.0 });
        fx.add(coal);

        // 4 units held + 2 incoming > 5 allowed.
        let drag = TransferDescriptor::from_inventory("coal", 1);
        let err = fx.resolve(&drag, &drawer_zone("box", 1)).unwrap_err();
        assert_eq!(err, TransferError::Rejected(vec![PlacementDenial::MaxItemCount]));
    }

    #[test]
    fn swap_crediting_displaced_occupant_passes_caps() {
        let mut fx = Fixture::new();
        let caps = DrawerCaps { max_item_count: 2, max_item_mass: 10.0 };
        fx.add(container("box", ItemLocation::inventory(0), caps));
        fx.put_in_drawer("box", 0, item("a", ItemLocation::inventory(9)));
        fx.put_in_drawer("box", 1, item("b", ItemLocation::inventory(9)));
        fx.add(item("apple", ItemLocation::inventory(1)));

        // Dropping onto an occupied slot nets zero change.
        let drag = TransferDescriptor::from_inventory("apple", 1);
        let outcome = fx.resolve(&drag, &drawer_zone("box", 1)).unwrap();
        assert_eq!(outcome.swapped_item_id, Some("b".to_string()));
        assert_eq!(fx.state.item_id_in_slot(1), Some(&"b".to_string()));
    }

    #[test]
    fn heavy_item_refused_by_mass() {
        let mut fx = Fixture::new();
        let caps = DrawerCaps { max_item_count: -1, max_item_mass: 5.0 };
        fx.add(container("box", ItemLocation::inventory(0), caps));
        let mut anvil = item("anvil", ItemLocation::inventory(1));
        anvil.stats = Some(ItemStats { unit_count: 1, total_mass: 40.0, quality: 1.0 });
        fx.add(anvil);

        let drag = TransferDescriptor::from_inventory("anvil", 1);
        let err = fx.resolve(&drag, &drawer_zone("box", 0)).unwrap_err();
        assert_eq!(err, TransferError::Rejected(vec![PlacementDenial::MaxItemMass]));
    }

    #[test]
    fn moves_within_one_container_skip_caps() {
        let mut fx = Fixture::new();
        // The drawer is already over its declared cap; rearranging inside it
        // must still work.
        let caps = DrawerCaps { max_item_count: 1, max_item_mass: 1.0 };
        fx.add(container("box", ItemLocation::inventory(0), caps));
        fx.put_in_drawer("box", 0, item("a", ItemLocation::inventory(9)));
        fx.put_in_drawer("box", 1, item("b", ItemLocation::inventory(9)));

        let drag = TransferDescriptor::from_drawer("a", vec!["box".to_string()], "d0", 0);
        let outcome = fx.resolve(&drag, &drawer_zone("box", 5)).unwrap();
        assert_eq!(outcome.swapped_item_id, None);
        assert_eq!(fx.state.containers.item_at("box", "d0", 5), Some(&"a".to_string()));
        assert_eq!(fx.state.containers.item_at("box", "d0", 0), None);
    }

    #[test]
    fn several_denials_report_together() {
        let mut fx = Fixture::new();
        let caps = DrawerCaps { max_item_count: 0, max_item_mass: -1.0 };
        let mut locked = container("chest", ItemLocation::inventory(0), caps);
        locked.user_permissions = Some(0);
        fx.add(locked);
        fx.add(container("bag", ItemLocation::inventory(1), DrawerCaps::unlimited()));
        fx.put_in_drawer("bag", 0, container("pouch", ItemLocation::inventory(9), DrawerCaps::unlimited()));

        let drag = TransferDescriptor::from_inventory("bag", 1);
        let err = fx.resolve(&drag, &drawer_zone("chest", 0)).unwrap_err();
        match err {
            TransferError::Rejected(denials) => {
                assert_eq!(denials.len(), 3);
                assert!(denials.contains(&PlacementDenial::NoAddPermission));
                assert!(denials.contains(&PlacementDenial::MaxItemCount));
                assert!(denials
                    .iter()
                    .any(|d| matches!(d, PlacementDenial::AlreadyHoldsContainer { .. })));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        // Toast per reason.
        assert_eq!(fx.signals.len(), 3);
    }

    #[test]
    fn unequip_to_empty_inventory_slot() {
        let mut fx = Fixture::new();
        fx.add(item("helm", ItemLocation::equipped(vec!["Head".to_string()])));

        let drag = TransferDescriptor::from_paper_doll("helm", vec!["Head".to_string()]);
        let outcome = fx.resolve(&drag, &TransferZone::Inventory { position: 2 }).unwrap();

        assert_eq!(outcome.requests.len(), 1);
        assert_eq!(
            outcome.requests[0].from.gear_slot_ids,
            Some(vec!["Head".to_string()])
        );
        assert_eq!(fx.doll.item_in_slot("Head"), None);
        assert_eq!(fx.state.item_id_in_slot(2), Some(&"helm".to_string()));
        assert_eq!(fx.state.item("helm").unwrap().location, ItemLocation::inventory(2));
    }

    #[test]
    fn unequip_onto_occupied_slot_is_refused() {
        let mut fx = Fixture::new();
        fx.add(item("helm", ItemLocation::equipped(vec!["Head".to_string()])));
        fx.add(item("apple", ItemLocation::inventory(2)));

        let drag = TransferDescriptor::from_paper_doll("helm", vec!["Head".to_string()]);
        let err = fx.resolve(&drag, &TransferZone::Inventory { position: 2 }).unwrap_err();
        assert_eq!(err, TransferError::Rejected(vec![PlacementDenial::SwapWithEquipped]));
        assert_eq!(fx.doll.item_in_slot("Head"), Some(&"helm".to_string()));
    }

    #[test]
    fn ground_drop_removes_item_and_contents() {
        let mut fx = Fixture::new();
        fx.add(container("bag", ItemLocation::inventory(0), DrawerCaps::unlimited()));
        fx.put_in_drawer("bag", 0, item("apple", ItemLocation::inventory(9)));

        let request = drop_on_ground(
            &mut fx.state,
            "char-1",
            "bag",
            Vec3F { x: 10.0, y: 0.0, z: -4.0 },
            Euler3f::default(),
        )
        .unwrap();

        assert_eq!(request.to.location, MoveLocation::Ground);
        assert_eq!(request.to.world_position.map(|p| p.x), Some(10.0));
        assert!(fx.state.item("bag").is_none());
        assert!(fx.state.item("apple").is_none());
        assert_eq!(fx.state.item_id_in_slot(0), None);
        assert!(!fx.state.containers.contains("bag"));
    }

    #[test]
    fn ground_drop_from_drawer_is_refused() {
        let mut fx = Fixture::new();
        fx.add(container("box", ItemLocation::inventory(0), DrawerCaps::unlimited()));
        fx.put_in_drawer("box", 0, item("apple", ItemLocation::inventory(9)));

        let err = drop_on_ground(
            &mut fx.state,
            "char-1",
            "apple",
            Vec3F::default(),
            Euler3f::default(),
        )
        .unwrap_err();
        assert_eq!(err, TransferError::GroundDropFromInventoryOnly);
        assert!(fx.state.item("apple").is_some());
    }

    #[test]
    fn failed_move_result_toasts_and_resyncs() {
        let mut signals = SignalQueue::new();
        let outcome = MoveItemsOutcome::from_response(
            false,
            r#"{ "FieldCodes": [ { "Code": 7, "Message": "Inventory is locked" } ] }"#,
        );
        apply_move_result(&mut signals, &outcome);

        let drained = signals.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(
            &drained[0],
            Signal::Toast(t) if t.text == "Inventory is locked" && t.title == "Darn!"
        ));
        assert_eq!(drained[1], Signal::ResyncRequested);
    }

    #[test]
    fn confirmed_move_result_is_silent() {
        let mut signals = SignalQueue::new();
        apply_move_result(&mut signals, &MoveItemsOutcome::success());
        assert!(signals.is_empty());
    }
}
