//! Scrutin is a deterministic runtime engine for declarative ballot
//! definitions driving accessible audio/video voting terminals.
//!
//! A ballot definition is a fully data-driven kiosk program: pages,
//! sub-states, sprite/slot geometry, key and touch bindings, bounded
//! per-group selection state, and context-resolved audio sequences.
//! The engine has two duties:
//!
//! - Load a [`Ballot`] and exhaustively validate it against the full
//!   cross-reference contract before any of it is trusted
//! - Execute it deterministically through a [`Session`]: resolve input
//!   events into actions, mutate selections, choose feedback audio,
//!   and drive page/state transitions
//!
//! Rendering, audio playback, input hardware, and the physical clock
//! are external collaborators; a session emits [`Effects`] toward
//! them and never performs I/O itself.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub(crate) mod ballot;
pub(crate) mod foundation;
pub(crate) mod normalize;
pub(crate) mod schema;
pub(crate) mod session;

pub use crate::foundation::core::{ClipIndex, Point, Rect, RectDef, SpriteSize};
pub use crate::foundation::error::{ScrutinError, ScrutinResult};

pub use crate::ballot::definition::Ballot;
pub use crate::ballot::model::{
    ActionDef, AudioDef, BallotDef, ClipDef, CounterAreaDef, GroupDef, GroupKind, ImageDef,
    KeyBindingDef, LayoutDef, ModelDef, OptionAreaDef, OptionDef, OptionRef, PageDef,
    ReviewAreaDef, SegmentDef, SegmentKind, SelectOp, SequenceDef, StateDef, TargetBindingDef,
    VideoDef,
};
pub use crate::normalize::pass::{RotationError, RotationFill, RotationPlan, apply_rotation};
pub use crate::schema::validate::{PathElem, Violation, Violations, validate_ballot};
pub use crate::session::Outcome;
pub use crate::session::machine::{
    Effects, Frame, IdleTimeoutPolicy, Session, SessionOpts, SpritePaste, TimerCmd,
};
pub use crate::session::selection::SelectionState;
