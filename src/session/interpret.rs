//! Pure application of a bound action to the selection state.
//!
//! Every mutation the action carries is applied in a fixed order
//! (clears, then ref ops, then the area op); the returned [`Outcome`]
//! is the one governing feedback, chosen by the fixed priority of the
//! highest-ranked operation present. All indices were proven in range
//! at load time, so application is total.

use crate::ballot::model::{ActionDef, BallotDef, PageDef, SelectOp, SequenceDef};
use crate::foundation::core::opt_index;
use crate::session::selection::SelectionState;

/// Classification of an applied action, selecting its feedback
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation succeeded, or the action carried no operation.
    Default,
    /// A toggle removed an existing selection.
    ToggleOff,
    /// An idempotent operation changed nothing.
    NoEffect,
    /// The operation was rejected because the group is at capacity.
    Full,
    /// A pop found no characters to drop.
    Empty,
}

/// Apply one action's mutations and classify the governing outcome.
pub(crate) fn apply_action(
    def: &BallotDef,
    page: &PageDef,
    action: &ActionDef,
    sels: &mut SelectionState,
) -> Outcome {
    for group_i in &action.clear_group_is {
        if let Some(g) = opt_index(*group_i) {
            sels.clear(g);
        }
    }

    let mut ref_outcome = None;
    if let Some(op) = action.option_op {
        for option_ref in &action.option_refs {
            if let (Some(g), Some(o)) = (
                opt_index(option_ref.group_i),
                opt_index(option_ref.option_i),
            ) {
                ref_outcome = Some(apply_op(def, op, g, o, sels));
            }
        }
    }

    let mut area_outcome = None;
    if let Some(op) = action.option_area_op
        && let Some(area) = opt_index(action.option_area_i).and_then(|i| page.option_areas.get(i))
        && let (Some(g), Some(o)) = (opt_index(area.group_i), opt_index(area.option_i))
    {
        area_outcome = Some(apply_op(def, op, g, o, sels));
    }

    area_outcome.or(ref_outcome).unwrap_or(Outcome::Default)
}

/// Apply one operator to one (group, option) pair.
pub(crate) fn apply_op(
    def: &BallotDef,
    op: SelectOp,
    group_i: usize,
    option_i: usize,
    sels: &mut SelectionState,
) -> Outcome {
    let capacity = def.model.groups[group_i].max_sels as usize;
    match op {
        SelectOp::Add => {
            if sels.selected(group_i, option_i) {
                Outcome::NoEffect
            } else if sels.count(group_i) >= capacity {
                Outcome::Full
            } else {
                sels.push(group_i, option_i);
                Outcome::Default
            }
        }
        SelectOp::Remove => {
            if !sels.selected(group_i, option_i) {
                Outcome::NoEffect
            } else {
                sels.remove(group_i, option_i);
                Outcome::Default
            }
        }
        SelectOp::Toggle => {
            if sels.selected(group_i, option_i) {
                sels.remove(group_i, option_i);
                Outcome::ToggleOff
            } else if sels.count(group_i) >= capacity {
                Outcome::Full
            } else {
                sels.push(group_i, option_i);
                Outcome::Default
            }
        }
        SelectOp::Append => {
            if sels.count(group_i) >= capacity {
                Outcome::Full
            } else {
                sels.push(group_i, option_i);
                Outcome::Default
            }
        }
        // Pre-validates room for two characters before appending one.
        SelectOp::Append2 => {
            if sels.count(group_i) + 2 > capacity {
                Outcome::Full
            } else {
                sels.push(group_i, option_i);
                Outcome::Default
            }
        }
        SelectOp::Pop => {
            if sels.count(group_i) == 0 {
                Outcome::Empty
            } else {
                sels.pop(group_i);
                Outcome::Default
            }
        }
    }
}

/// Feedback sequence an outcome selects on an action.
pub(crate) fn feedback(action: &ActionDef, outcome: Outcome) -> &SequenceDef {
    match outcome {
        Outcome::Default => &action.default_feedback,
        Outcome::ToggleOff => &action.toggle_off_feedback,
        Outcome::NoEffect => &action.no_effect_feedback,
        Outcome::Full => &action.full_feedback,
        Outcome::Empty => &action.empty_feedback,
    }
}
