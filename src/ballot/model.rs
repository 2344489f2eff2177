//! Boundary schema of a ballot definition.
//!
//! These are the authored, serde-facing structures consumed by the
//! validator. Cross-references are plain integer indices into flat
//! collections; `-1` is the documented "absent" sentinel on every
//! index field that permits it. Nothing here is trusted until
//! [`crate::schema::validate`] has passed.

use crate::foundation::core::RectDef;
use serde::{Deserialize, Serialize};

/// Root container: behavioral model plus video and audio asset tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotDef {
    /// Groups, pages and the global idle timeout.
    pub model: ModelDef,
    /// Layouts and sprite table.
    pub video: VideoDef,
    /// Clip table.
    pub audio: AudioDef,
}

/// Behavioral half of a ballot definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDef {
    /// Contests and write-in character sets.
    pub groups: Vec<GroupDef>,
    /// Screens the voter navigates.
    pub pages: Vec<PageDef>,
    /// Idle timeout in milliseconds; `0` disables the idle timer.
    #[serde(default)]
    pub timeout_ms: u32,
}

/// Discriminates the two uses of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// A contest whose options are candidates or answers.
    Contest,
    /// A character set whose options are write-in characters.
    WriteIn,
}

/// A contest or a write-in character set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDef {
    /// Contest or write-in.
    pub kind: GroupKind,
    /// Selection capacity. For a write-in group this is the maximum
    /// character count, auto-copied from the owning contest's
    /// `max_chars` during normalization.
    pub max_sels: u32,
    /// Maximum write-in length of a contest; `0` on write-in groups.
    #[serde(default)]
    pub max_chars: u32,
    /// Selectable choices.
    pub options: Vec<OptionDef>,
}

/// One selectable choice within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDef {
    /// Sprite shown while unselected; `-1` on write-in group options.
    pub unsel_sprite_i: i32,
    /// Sprite shown while selected.
    pub sel_sprite_i: i32,
    /// Base of this option's per-option clip range.
    pub clip_i: i32,
    /// Write-in sub-group attached to this contest option, or `-1`.
    #[serde(default = "none_index")]
    pub writein_group_i: i32,
}

fn none_index() -> i32 {
    -1
}

/// One screen/program unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDef {
    /// Page-level key bindings, consulted after state-level ones.
    #[serde(default)]
    pub key_bindings: Vec<KeyBindingDef>,
    /// Bound positionally to the page layout's target rectangles.
    #[serde(default)]
    pub target_bindings: Vec<TargetBindingDef>,
    /// Sub-modes of the page; index 0 is the page's initial state.
    pub states: Vec<StateDef>,
    /// Rendered, touchable option regions.
    #[serde(default)]
    pub option_areas: Vec<OptionAreaDef>,
    /// Selection counters.
    #[serde(default)]
    pub counter_areas: Vec<CounterAreaDef>,
    /// Review-page selection readouts.
    #[serde(default)]
    pub review_areas: Vec<ReviewAreaDef>,
}

/// Physical key press mapped to an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindingDef {
    /// Hardware key code.
    pub key: u32,
    /// Effect of the key press.
    pub action: ActionDef,
}

/// Touch on `layout.targets[i]` mapped to an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetBindingDef {
    /// Effect of the touch.
    pub action: ActionDef,
}

/// A sub-mode within a page, e.g. which option is highlighted.
///
/// The state's highlight slot is `layout.slots[state_i]` by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDef {
    /// Highlight sprite pasted into the state's slot, or `-1`.
    #[serde(default = "none_index")]
    pub sprite_i: i32,
    /// Option area providing the state's "current option" for
    /// sequence resolution, or `-1`.
    #[serde(default = "none_index")]
    pub option_area_i: i32,
    /// Played on state entry.
    #[serde(default)]
    pub entry_sequence: SequenceDef,
    /// State-level key bindings, consulted before page-level ones.
    #[serde(default)]
    pub key_bindings: Vec<KeyBindingDef>,
    /// Played when the idle timer fires in this state.
    #[serde(default)]
    pub timeout_sequence: SequenceDef,
    /// Timeout transition target page, or `-1`.
    #[serde(default = "none_index")]
    pub timeout_page_i: i32,
    /// Timeout transition target state, or `-1`.
    #[serde(default = "none_index")]
    pub timeout_state_i: i32,
}

impl Default for StateDef {
    fn default() -> Self {
        Self {
            sprite_i: -1,
            option_area_i: -1,
            entry_sequence: SequenceDef::default(),
            key_bindings: Vec::new(),
            timeout_sequence: SequenceDef::default(),
            timeout_page_i: -1,
            timeout_state_i: -1,
        }
    }
}

/// Selection operators applied by actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectOp {
    /// Select an option of a contest group.
    Add,
    /// Deselect an option of a contest group.
    Remove,
    /// Select or deselect depending on current membership.
    Toggle,
    /// Append a character to a write-in group.
    Append,
    /// Append a character after pre-validating room for two.
    Append2,
    /// Drop the last character of a write-in group.
    Pop,
}

/// An effect bound to an input event.
///
/// Every mutation the action names is applied (clears, then ref ops,
/// then the area op); the feedback sequence is chosen by the outcome of
/// the highest-priority operation present: area op, else ref op, else
/// the clears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDef {
    /// Transition target page, or `-1` to stay on the current page.
    #[serde(default = "none_index")]
    pub next_page_i: i32,
    /// Transition target state, or `-1` to stay in the current state.
    #[serde(default = "none_index")]
    pub next_state_i: i32,
    /// Groups whose selections are unconditionally emptied first.
    #[serde(default)]
    pub clear_group_is: Vec<i32>,
    /// Operator applied to each of `option_refs`, if present.
    #[serde(default)]
    pub option_op: Option<SelectOp>,
    /// Explicit operands of `option_op`.
    #[serde(default)]
    pub option_refs: Vec<OptionRef>,
    /// Operator applied to the option bound to `option_area_i`.
    #[serde(default)]
    pub option_area_op: Option<SelectOp>,
    /// Option area operand and the action's "current option" context
    /// for sequence resolution, or `-1`.
    #[serde(default = "none_index")]
    pub option_area_i: i32,
    /// Played when the governing outcome is `Default`.
    #[serde(default)]
    pub default_feedback: SequenceDef,
    /// Played when a toggle removed a selection.
    #[serde(default)]
    pub toggle_off_feedback: SequenceDef,
    /// Played when an idempotent operation had no effect.
    #[serde(default)]
    pub no_effect_feedback: SequenceDef,
    /// Played when the operation was rejected at capacity.
    #[serde(default)]
    pub full_feedback: SequenceDef,
    /// Played when a pop found no characters to drop.
    #[serde(default)]
    pub empty_feedback: SequenceDef,
}

impl Default for ActionDef {
    fn default() -> Self {
        Self {
            next_page_i: -1,
            next_state_i: -1,
            clear_group_is: Vec::new(),
            option_op: None,
            option_refs: Vec::new(),
            option_area_op: None,
            option_area_i: -1,
            default_feedback: SequenceDef::default(),
            toggle_off_feedback: SequenceDef::default(),
            no_effect_feedback: SequenceDef::default(),
            full_feedback: SequenceDef::default(),
            empty_feedback: SequenceDef::default(),
        }
    }
}

/// (group, option) index pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptionRef {
    /// Group index.
    pub group_i: i32,
    /// Option index within the group.
    pub option_i: i32,
}

/// A rendered, touchable region bound to one option.
///
/// Owns one base slot, plus `group.max_chars` character slots when the
/// bound option carries a write-in sub-group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptionAreaDef {
    /// Group index.
    pub group_i: i32,
    /// Bound option, or `-1` until rotation assignment fills it.
    pub option_i: i32,
}

/// Displays how many selections a group holds.
///
/// Pastes `sprites[sprite_i + n]` where `n` is the selection count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CounterAreaDef {
    /// Group index.
    pub group_i: i32,
    /// Base of the count sprite range (`max_sels + 1` sprites).
    pub sprite_i: i32,
}

/// Review readout for a group's selections.
///
/// Owns `max_sels` blocks of `1 + max_chars` slots each.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReviewAreaDef {
    /// Group index.
    pub group_i: i32,
    /// Cursor sprite shown in the first empty block, or `-1`.
    pub cursor_sprite_i: i32,
}

/// An ordered, context-resolved list of audio clip picks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceDef {
    /// Segments resolved in order; an empty list is valid silence.
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
}

/// Resolution rule of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// `clips[clip_i]`.
    Clip,
    /// `clips[option.clip_i + clip_i]` for an explicit option ref.
    Option,
    /// Like `Option`, for the state's current option; a write-in
    /// sub-group additionally plays each selected character's base clip.
    StateOption,
    /// Like `StateOption`, for the action's current option.
    ActionOption,
    /// `clips[clip_i + 1]` when the explicit ref is selected, else
    /// `clips[clip_i]`.
    OptionSelected,
    /// Like `OptionSelected`, for the state's current option.
    StateOptionSelected,
    /// Like `OptionSelected`, for the action's current option.
    ActionOptionSelected,
    /// `clips[option.clip_i + clip_i]` for each selected option of the
    /// group, in selection order, expanding write-in sub-groups.
    GroupSelections,
    /// `clips[clip_i + n]`, `n` = selection count of the group.
    SelectionCount,
    /// `clips[clip_i + group.max_sels]`.
    MaxSels,
}

/// One clip pick rule inside a sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentDef {
    /// Resolution rule.
    pub kind: SegmentKind,
    /// Clip index or per-option clip offset, depending on `kind`.
    #[serde(default)]
    pub clip_i: i32,
    /// Group context, or `-1` where the kind does not use it.
    #[serde(default = "none_index")]
    pub group_i: i32,
    /// Option context, or `-1` where the kind does not use it.
    #[serde(default = "none_index")]
    pub option_i: i32,
}

/// Visual half of a ballot definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDef {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// One layout per page, positionally.
    pub layouts: Vec<LayoutDef>,
    /// Sprite table.
    pub sprites: Vec<ImageDef>,
}

/// Screen background plus interactive geometry for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDef {
    /// Full-canvas background image.
    pub screen: ImageDef,
    /// Touch targets; pairwise non-overlapping.
    #[serde(default)]
    pub targets: Vec<RectDef>,
    /// Sprite slots; pairwise non-overlapping, consumed by the
    /// fixed slot-walk order.
    #[serde(default)]
    pub slots: Vec<RectDef>,
}

/// A rectangular pixel array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDef {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Packed pixels, exactly `width * height` entries.
    pub pixels: Vec<u32>,
}

impl ImageDef {
    pub(crate) fn size(&self) -> crate::foundation::core::SpriteSize {
        crate::foundation::core::SpriteSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Audible half of a ballot definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDef {
    /// Sample rate shared by all clips.
    pub sample_rate: u32,
    /// Clip table.
    pub clips: Vec<ClipDef>,
}

/// One playable audio clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDef {
    /// Signed 16-bit mono samples.
    pub samples: Vec<i16>,
}
