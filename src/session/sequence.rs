//! Pure resolution of audio sequences into clip playlists.
//!
//! A segment resolves to zero or more clip picks depending on its
//! kind and the dynamic context: the state's or action's current
//! option and the live selection state. Resolution never mutates
//! anything and is total over validated input; an empty sequence is
//! valid silence.

use crate::ballot::model::{BallotDef, OptionDef, SegmentKind, SequenceDef};
use crate::foundation::core::{ClipIndex, opt_index};
use crate::session::selection::SelectionState;
use smallvec::SmallVec;

/// Playlist produced by one sequence resolution.
pub(crate) type Playlist = SmallVec<[ClipIndex; 8]>;

/// Dynamic context a sequence resolves against.
#[derive(Clone, Copy)]
pub(crate) struct ResolveCtx<'a> {
    pub(crate) def: &'a BallotDef,
    /// Current option of the owning state, when it designates one.
    pub(crate) state_option: Option<(usize, usize)>,
    /// Current option of the acting action, when it designates one.
    pub(crate) action_option: Option<(usize, usize)>,
    pub(crate) sels: &'a SelectionState,
}

/// Resolve a sequence into an ordered clip playlist.
pub(crate) fn resolve_sequence(seq: &SequenceDef, ctx: &ResolveCtx<'_>) -> Playlist {
    let mut out = Playlist::new();
    for segment in &seq.segments {
        let clip_i = segment.clip_i as usize;
        match segment.kind {
            SegmentKind::Clip => out.push(ClipIndex(clip_i)),
            SegmentKind::Option => {
                if let Some((g, o)) = explicit_ref(ctx.def, segment.group_i, segment.option_i) {
                    let option = &ctx.def.model.groups[g].options[o];
                    out.push(ClipIndex(option.clip_i as usize + clip_i));
                }
            }
            SegmentKind::StateOption => current_option(ctx, ctx.state_option, clip_i, &mut out),
            SegmentKind::ActionOption => current_option(ctx, ctx.action_option, clip_i, &mut out),
            SegmentKind::OptionSelected => {
                if let Some((g, o)) = explicit_ref(ctx.def, segment.group_i, segment.option_i) {
                    out.push(selected_pick(ctx, g, o, clip_i));
                }
            }
            SegmentKind::StateOptionSelected => {
                if let Some((g, o)) = ctx.state_option {
                    out.push(selected_pick(ctx, g, o, clip_i));
                }
            }
            SegmentKind::ActionOptionSelected => {
                if let Some((g, o)) = ctx.action_option {
                    out.push(selected_pick(ctx, g, o, clip_i));
                }
            }
            SegmentKind::GroupSelections => {
                if let Some(g) = explicit_group(ctx.def, segment.group_i) {
                    for &o in ctx.sels.group(g) {
                        let option = &ctx.def.model.groups[g].options[o];
                        out.push(ClipIndex(option.clip_i as usize + clip_i));
                        expand_writein(ctx, option, &mut out);
                    }
                }
            }
            SegmentKind::SelectionCount => {
                if let Some(g) = explicit_group(ctx.def, segment.group_i) {
                    out.push(ClipIndex(clip_i + ctx.sels.count(g)));
                }
            }
            SegmentKind::MaxSels => {
                if let Some(g) = explicit_group(ctx.def, segment.group_i) {
                    out.push(ClipIndex(clip_i + ctx.def.model.groups[g].max_sels as usize));
                }
            }
        }
    }
    out
}

/// Resolve a current-option segment: the option's clip range entry,
/// then the attached write-in's selected characters in order.
fn current_option(
    ctx: &ResolveCtx<'_>,
    current: Option<(usize, usize)>,
    offset: usize,
    out: &mut Playlist,
) {
    let Some((g, o)) = current else {
        return;
    };
    let option = &ctx.def.model.groups[g].options[o];
    out.push(ClipIndex(option.clip_i as usize + offset));
    expand_writein(ctx, option, out);
}

/// Base clip of each selected character of the option's write-in
/// sub-group, in selection order.
fn expand_writein(ctx: &ResolveCtx<'_>, option: &OptionDef, out: &mut Playlist) {
    let Some(w) = opt_index(option.writein_group_i) else {
        return;
    };
    for &c in ctx.sels.group(w) {
        let child = &ctx.def.model.groups[w].options[c];
        out.push(ClipIndex(child.clip_i as usize));
    }
}

fn selected_pick(ctx: &ResolveCtx<'_>, group_i: usize, option_i: usize, clip_i: usize) -> ClipIndex {
    ClipIndex(clip_i + usize::from(ctx.sels.selected(group_i, option_i)))
}

fn explicit_ref(def: &BallotDef, group_i: i32, option_i: i32) -> Option<(usize, usize)> {
    let g = explicit_group(def, group_i)?;
    let o = opt_index(option_i).filter(|o| *o < def.model.groups[g].options.len())?;
    Some((g, o))
}

fn explicit_group(def: &BallotDef, group_i: i32) -> Option<usize> {
    opt_index(group_i).filter(|g| *g < def.model.groups.len())
}
