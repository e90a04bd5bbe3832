//! Headless engine for an RPG client's heads-up display. The rendering layer
//! stays outside; this crate owns the state and the rules: the inventory and
//! its containers, drag-and-drop validation and reconciliation against the
//! remote item-move service, the equipment paper doll, grid layout arithmetic,
//! crafting job status, chat rooms and the warband card, and the health bar
//! value feed.
//!
//! The host drives everything through [`Hud`]: feed snapshots and events in,
//! drain [`Signal`]s out, and ship the returned wire requests to the server.

pub mod chat;
pub mod containers;
pub mod crafting;
pub mod drag_drop;
pub mod equipment;
pub mod filter;
pub mod inventory;
pub mod items;
pub mod layout;
pub mod models;
pub mod player_status;
pub mod signals;
pub mod social;
pub mod webapi;

pub use drag_drop::{DropOutcome, TransferDescriptor, TransferError};
pub use models::{ItemLocation, TransferZone};
pub use signals::{Signal, SignalQueue, Toast};

use crate::chat::ChatState;
use crate::crafting::JobState;
use crate::equipment::{EquipError, EquipOutcome, PaperDoll};
use crate::inventory::InventoryState;
use crate::items::ItemFragment;
use crate::layout::{BodyDimensions, GridShape, SlotGrid, DEFAULT_GUTTER_WIDTH};
use crate::models::CharacterId;
use crate::player_status::PlayerStatus;
use crate::social::WarbandRoster;
use crate::webapi::{Euler3f, MoveItemRequest, MoveItemsOutcome, Vec3F};

/// Identity of the character this HUD renders, threaded into every wire
/// request the engine builds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientContext {
    pub character_id: CharacterId,
}

impl ClientContext {
    pub fn new(character_id: impl Into<CharacterId>) -> Self {
        ClientContext { character_id: character_id.into() }
    }
}

/// The whole HUD. Widgets share one inventory truth and one signal queue;
/// each otherwise keeps to its own field.
#[derive(Clone, Debug)]
pub struct Hud {
    pub context: ClientContext,
    pub inventory: InventoryState,
    pub paper_doll: PaperDoll,
    pub inventory_grid: SlotGrid,
    pub vox_job: JobState,
    pub chat: ChatState,
    pub warband: WarbandRoster,
    pub status: PlayerStatus,
    pub signals: SignalQueue,
}

impl Hud {
    pub fn new(context: ClientContext) -> Self {
        Hud {
            context,
            inventory: InventoryState::new(),
            paper_doll: PaperDoll::new(),
            inventory_grid: SlotGrid::new(),
            vox_job: JobState::new(),
            chat: ChatState::new(),
            warband: WarbandRoster::new(),
            status: PlayerStatus::new(),
            signals: SignalQueue::new(),
        }
    }

    // --- Inventory ---

    /// Absorbs a full item snapshot and rebuilds the paper doll from it.
    pub fn resync(&mut self, fragments: &[ItemFragment]) {
        self.inventory.resync(fragments);
        self.paper_doll.rebuild(&self.inventory);
    }

    /// (Re)measures the top-level inventory grid. The grid is sized for
    /// whichever is larger: the requested minimum or the highest occupied
    /// slot.
    pub fn measure_inventory(
        &mut self,
        body: &BodyDimensions,
        slot_dimensions: f32,
        min_slots: u32,
    ) -> GridShape {
        let needed = self
            .inventory
            .highest_occupied_slot()
            .map(|slot| slot.saturating_add(1))
            .unwrap_or(0)
            .max(min_slots);
        self.inventory_grid
            .measure_inventory(body, slot_dimensions, needed, DEFAULT_GUTTER_WIDTH)
    }

    /// Strips empty trailing inventory rows, keeping at least `min_rows`.
    pub fn prune_inventory_rows(&mut self, min_rows: u32) -> u32 {
        self.inventory_grid
            .prune_rows(self.inventory.highest_occupied_slot(), min_rows)
    }

    // --- Drag and drop ---

    /// A drag began; paper-doll slots the item could land in light up.
    pub fn drag_started(&mut self, item_id: &str) {
        match self.inventory.item(item_id) {
            Some(item) => {
                let item = item.clone();
                equipment::highlight_slots_for_drag(&mut self.signals, &item);
            }
            None => log::warn!("[Hud] Drag started for unknown item {}", item_id),
        }
    }

    /// The drag ended (drop or cancel); highlights come down.
    pub fn drag_ended(&mut self) {
        equipment::dehighlight_slots(&mut self.signals);
    }

    /// Resolves a drop. On success the local state is already updated and the
    /// returned requests must be sent to the item-move service.
    pub fn drop_item(
        &mut self,
        drag: &TransferDescriptor,
        drop_zone: &TransferZone,
    ) -> Result<DropOutcome, TransferError> {
        drag_drop::resolve_drop(
            &mut self.inventory,
            &mut self.paper_doll,
            &mut self.signals,
            &self.context.character_id,
            drag,
            drop_zone,
        )
    }

    /// Throws an inventory item onto the ground.
    pub fn drop_on_ground(
        &mut self,
        item_id: &str,
        world_position: Vec3F,
        rotation: Euler3f,
    ) -> Result<MoveItemRequest, TransferError> {
        drag_drop::drop_on_ground(
            &mut self.inventory,
            &self.context.character_id,
            item_id,
            world_position,
            rotation,
        )
    }

    /// Feeds the item-move service's answer back in. A failure toasts and
    /// raises [`Signal::ResyncRequested`]; the host then calls
    /// [`resync`](Self::resync) with fresh truth.
    pub fn report_move_result(&mut self, outcome: &MoveItemsOutcome) {
        drag_drop::apply_move_result(&mut self.signals, outcome);
    }

    // --- Equipment ---

    /// Equips an inventory or worn item to the gear slot it was dropped on.
    pub fn equip(&mut self, item_id: &str, slot_name: &str) -> Result<EquipOutcome, EquipError> {
        equipment::equip_item(
            &mut self.inventory,
            &mut self.paper_doll,
            &mut self.signals,
            item_id,
            slot_name,
        )
    }

    // --- Crafting ---

    /// Asks the host to run a vox status query and feed the report back.
    pub fn request_vox_refresh(&mut self) {
        self.signals.push(Signal::VoxStatusRefreshRequested);
    }

    // --- Signals ---

    /// Hands every pending signal to the host, oldest first.
    pub fn take_signals(&mut self) -> Vec<Signal> {
        self.signals.drain()
    }
}
