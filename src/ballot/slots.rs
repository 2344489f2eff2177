//! Deterministic slot-walk over a page's layout.
//!
//! Layout slots are consumed positionally, in a fixed order shared by
//! the validator (count and size checks) and the frame assembler
//! (paste positions): one highlight slot per state, then per option
//! area a base slot plus the group's character slots when the bound
//! option carries a write-in sub-group, then one slot per counter
//! area, then `max_sels` blocks of `1 + max_chars` slots per review
//! area.

use crate::ballot::model::{GroupDef, PageDef};
use crate::foundation::core::opt_index;

/// Slot positions of one option area.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AreaSlots {
    /// Base slot holding the option sprite.
    pub(crate) base: usize,
    /// First character slot, when the area owns any.
    pub(crate) chars_start: usize,
    /// Number of character slots.
    pub(crate) chars_len: usize,
}

/// Slot positions of one review area.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReviewSlots {
    /// First slot of block 0.
    pub(crate) start: usize,
    /// Slots per block (`1 + max_chars`).
    pub(crate) block_len: usize,
    /// Number of blocks (`max_sels`).
    pub(crate) blocks: usize,
}

/// Resolved slot positions for every renderable element of a page.
#[derive(Debug, Clone)]
pub(crate) struct SlotWalk {
    /// Per option area, in page order.
    pub(crate) option_areas: Vec<AreaSlots>,
    /// Base slot per counter area, in page order.
    pub(crate) counter_areas: Vec<usize>,
    /// Per review area, in page order.
    pub(crate) review_areas: Vec<ReviewSlots>,
    /// Total slots the layout must provide.
    pub(crate) total: usize,
}

/// Walk a page, tolerating out-of-range group/option indices.
///
/// Unknown indices contribute zero extra slots; the validator flags
/// them separately, so a defensive walk keeps both callers total.
pub(crate) fn walk_page(groups: &[GroupDef], page: &PageDef) -> SlotWalk {
    let mut cursor = page.states.len();

    let mut option_areas = Vec::with_capacity(page.option_areas.len());
    for area in &page.option_areas {
        let base = cursor;
        cursor += 1;
        let chars_len = area_char_slots(groups, area.group_i, area.option_i);
        let chars_start = cursor;
        cursor += chars_len;
        option_areas.push(AreaSlots {
            base,
            chars_start,
            chars_len,
        });
    }

    let mut counter_areas = Vec::with_capacity(page.counter_areas.len());
    for _ in &page.counter_areas {
        counter_areas.push(cursor);
        cursor += 1;
    }

    let mut review_areas = Vec::with_capacity(page.review_areas.len());
    for area in &page.review_areas {
        let (blocks, block_len) = match opt_index(area.group_i).and_then(|g| groups.get(g)) {
            Some(group) => (group.max_sels as usize, 1 + group.max_chars as usize),
            None => (0, 1),
        };
        review_areas.push(ReviewSlots {
            start: cursor,
            block_len,
            blocks,
        });
        cursor += blocks * block_len;
    }

    SlotWalk {
        option_areas,
        counter_areas,
        review_areas,
        total: cursor,
    }
}

/// Character slots owned by an option area.
///
/// Present only when the area's option is explicitly bound (rotation
/// never assigns write-in options) and carries a write-in sub-group.
fn area_char_slots(groups: &[GroupDef], group_i: i32, option_i: i32) -> usize {
    let Some(group) = opt_index(group_i).and_then(|g| groups.get(g)) else {
        return 0;
    };
    let Some(option) = opt_index(option_i).and_then(|o| group.options.get(o)) else {
        return 0;
    };
    if option.writein_group_i == -1 {
        0
    } else {
        group.max_chars as usize
    }
}
