use log;

use crate::models::SlotIndex;

// --- Grid tuning constants ---
// Slot tiles render at a fixed size with a 2px frame on each side; the gutter
// covers the section padding plus the scrollbar track.

pub const DEFAULT_GUTTER_WIDTH: f32 = 65.0;
pub const SLOT_FRAME_PX: f32 = 4.0;

/// Measured pixel size of a scrolling grid's body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyDimensions {
    pub width: f32,
    pub height: f32,
}

/// Computed shape of a slot grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridShape {
    pub slots_per_row: u32,
    pub row_count: u32,
    pub slot_count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowsAndSlots {
    pub row_count: u32,
    pub slot_count: u32,
}

/// How many slot tiles fit on one row of the measured body. A body narrower
/// than the gutter yields zero; callers must not divide by it blindly.
pub fn slots_per_row(body: &BodyDimensions, slot_dimensions: f32, gutter: f32) -> u32 {
    let fit = ((body.width - gutter) / (slot_dimensions + SLOT_FRAME_PX)).floor();
    if fit <= 0.0 {
        0
    } else {
        fit as u32
    }
}

/// Rows and slots needed to cover the body height and hold at least
/// `min_slots`, padded out to whole rows. When the requirement already lands
/// on a row boundary this adds one more full row so the grid always has spare
/// slots to drag into.
pub fn calc_rows(
    body: &BodyDimensions,
    slot_dimensions: f32,
    min_slots: u32,
    slots_per_row: u32,
) -> RowsAndSlots {
    if slots_per_row == 0 {
        log::warn!("[Layout] calc_rows called with zero slots per row");
        return RowsAndSlots::default();
    }
    let min_rows = (body.height / (slot_dimensions + SLOT_FRAME_PX)).ceil().max(0.0) as u32;
    let slots_to_fit = min_slots.max(min_rows.saturating_mul(slots_per_row));
    let slot_count = (slots_per_row - (slots_to_fit % slots_per_row)).saturating_add(slots_to_fit);
    RowsAndSlots { row_count: slot_count / slots_per_row, slot_count }
}

/// Full shape for the top-level inventory grid.
pub fn calc_row_and_slots(
    body: &BodyDimensions,
    slot_dimensions: f32,
    min_slots: u32,
    gutter: f32,
) -> GridShape {
    let per_row = slots_per_row(body, slot_dimensions, gutter);
    let rows = calc_rows(body, slot_dimensions, min_slots, per_row);
    GridShape { slots_per_row: per_row, row_count: rows.row_count, slot_count: rows.slot_count }
}

/// Shape for a container drawer: just enough rows to reach the highest
/// occupied slot, minimum one row. Unlike the inventory grid the trailing row
/// is not padded out, the slot count stops right after the last occupant.
pub fn calc_rows_for_container(
    body: &BodyDimensions,
    slot_dimensions: f32,
    highest_occupied: Option<SlotIndex>,
    gutter: f32,
) -> GridShape {
    let per_row = slots_per_row(body, slot_dimensions, gutter);
    let slots_needed = highest_occupied.unwrap_or(0).saturating_add(1);
    if per_row == 0 {
        log::warn!("[Layout] calc_rows_for_container called with zero slots per row");
        return GridShape::default();
    }
    let row_count = if slots_needed > per_row {
        slots_needed.div_ceil(per_row)
    } else {
        1
    };
    let slot_count = per_row.max(slots_needed);
    GridShape { slots_per_row: per_row, row_count, slot_count }
}

/// Splits a flat stat list into `columns` side-by-side columns, filling each
/// top to bottom before the next. With `pad_last` the final column is topped up
/// with blank entries so every column renders the same number of lines.
pub fn split_stat_columns<T: Clone + Default>(
    stats: &[T],
    columns: u32,
    pad_last: bool,
) -> Vec<Vec<T>> {
    if columns == 0 {
        log::warn!("[Layout] split_stat_columns called with zero columns");
        return Vec::new();
    }
    let columns = columns as usize;
    let per_column = stats.len().div_ceil(columns);
    let mut grids = Vec::with_capacity(columns);
    for index in 0..columns {
        let start = (per_column * index).min(stats.len());
        let end = (per_column * (index + 1)).min(stats.len());
        let mut column: Vec<T> = stats[start..end].to_vec();
        if pad_last && index + 1 == columns {
            let missing = per_column * columns - stats.len();
            column.extend(std::iter::repeat_with(T::default).take(missing));
        }
        grids.push(column);
    }
    grids
}

/// Row bookkeeping for one scrolling grid. Starts empty, takes a shape on the
/// first measurement, and recomputes from scratch whenever the body is
/// measured again (user-added rows do not survive a resize).
#[derive(Clone, Debug, Default)]
pub struct SlotGrid {
    shape: Option<GridShape>,
}

impl SlotGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.shape.is_some()
    }

    /// Current shape; all zeroes before the first measurement.
    pub fn shape(&self) -> GridShape {
        self.shape.unwrap_or_default()
    }

    /// (Re)computes the grid for the top-level inventory body.
    pub fn measure_inventory(
        &mut self,
        body: &BodyDimensions,
        slot_dimensions: f32,
        min_slots: u32,
        gutter: f32,
    ) -> GridShape {
        let shape = calc_row_and_slots(body, slot_dimensions, min_slots, gutter);
        self.shape = Some(shape);
        shape
    }

    /// (Re)computes the grid for a container drawer.
    pub fn measure_drawer(
        &mut self,
        body: &BodyDimensions,
        slot_dimensions: f32,
        highest_occupied: Option<SlotIndex>,
        gutter: f32,
    ) -> GridShape {
        let shape = calc_rows_for_container(body, slot_dimensions, highest_occupied, gutter);
        self.shape = Some(shape);
        shape
    }

    /// Appends one empty row. The add button is always enabled.
    pub fn add_row(&mut self) -> GridShape {
        let Some(shape) = self.shape.as_mut() else {
            log::warn!("[Layout] add_row before the grid was measured");
            return GridShape::default();
        };
        shape.row_count = shape.row_count.saturating_add(1);
        shape.slot_count = shape.row_count.saturating_mul(shape.slots_per_row);
        *shape
    }

    /// Whether the trailing row holds nothing and may be removed.
    pub fn can_remove_row(&self, highest_occupied: Option<SlotIndex>) -> bool {
        let Some(shape) = self.shape else {
            return false;
        };
        if shape.row_count <= 1 {
            return false;
        }
        match highest_occupied {
            None => true,
            Some(highest) => highest < (shape.row_count - 1).saturating_mul(shape.slots_per_row),
        }
    }

    /// Removes the trailing row if it is empty. Returns false (and leaves the
    /// shape alone) when an occupant sits in it or only one row remains.
    pub fn remove_row(&mut self, highest_occupied: Option<SlotIndex>) -> bool {
        if !self.can_remove_row(highest_occupied) {
            return false;
        }
        if let Some(shape) = self.shape.as_mut() {
            shape.row_count -= 1;
            shape.slot_count = shape.row_count.saturating_mul(shape.slots_per_row);
        }
        true
    }

    /// Strips empty trailing rows down to `min_rows` (never below one row).
    /// Returns how many rows were dropped.
    pub fn prune_rows(&mut self, highest_occupied: Option<SlotIndex>, min_rows: u32) -> u32 {
        let floor = min_rows.max(1);
        let mut removed = 0;
        while self.shape.map(|s| s.row_count > floor).unwrap_or(false)
            && self.remove_row(highest_occupied)
        {
            removed += 1;
        }
        removed
    }
}
