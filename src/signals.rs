use crate::models::{GearSlotId, ItemInstanceId};
use std::collections::VecDeque;

/// Visual weight of a transient notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// A transient notification for the player. The host renders and times these;
/// the engine only decides when one is warranted and what it says.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub text: String,
}

impl Toast {
    pub fn error(title: &str, text: impl Into<String>) -> Self {
        Toast { kind: ToastKind::Error, title: title.to_string(), text: text.into() }
    }

    pub fn success(title: &str, text: impl Into<String>) -> Self {
        Toast { kind: ToastKind::Success, title: title.to_string(), text: text.into() }
    }
}

/// Outbound message from the engine to whatever is hosting it. Replaces the
/// stringly-keyed event bus the widgets used to share: every message is a
/// variant, every payload is typed, and delivery is an explicit drain instead
/// of ambient listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Toast(Toast),
    /// Local state can no longer be trusted; re-fetch the full snapshot.
    ResyncRequested,
    /// Light up the paper-doll slots a dragged item could equip into.
    HighlightGearSlots { gear_slot_ids: Vec<GearSlotId> },
    DehighlightGearSlots,
    /// An equip was resolved locally; the host must tell the server.
    EquipItem {
        item_id: ItemInstanceId,
        will_equip_to: Vec<GearSlotId>,
        /// Item that was displaced off the doll, if the slots were taken.
        prev_equipped_item_id: Option<ItemInstanceId>,
    },
    /// The crafting widget wants a fresh vox status report.
    VoxStatusRefreshRequested,
}

/// FIFO of pending signals. The host drains it once per frame (or per event)
/// and reacts; the engine never blocks on delivery.
#[derive(Clone, Debug, Default)]
pub struct SignalQueue {
    queue: VecDeque<Signal>,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: Signal) {
        self.queue.push_back(signal);
    }

    pub fn toast(&mut self, toast: Toast) {
        self.push(Signal::Toast(toast));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes and returns all pending signals, oldest first.
    pub fn drain(&mut self) -> Vec<Signal> {
        self.queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_in_order() {
        let mut queue = SignalQueue::new();
        queue.toast(Toast::error("Darn!", "first"));
        queue.push(Signal::ResyncRequested);
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert!(queue.is_empty());
        assert!(matches!(&drained[0], Signal::Toast(t) if t.text == "first"));
        assert_eq!(drained[1], Signal::ResyncRequested);
    }
}
