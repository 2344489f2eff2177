//! Page/state-machine executor for one terminal session.
//!
//! A [`Session`] holds the current (page, state) pair and the
//! per-session selection state, consumes discrete input events, and
//! emits [`Effects`]: clips to queue, a frame to draw, and a timer
//! command. The caller owns the physical clock; input and the idle
//! deadline are first-to-occur-wins, with the loser cancelled by the
//! timer command carried on every result.

use crate::ballot::definition::Ballot;
use crate::ballot::model::{ActionDef, BallotDef, PageDef};
use crate::ballot::slots::{SlotWalk, walk_page};
use crate::foundation::core::{ClipIndex, Point, opt_index};
use crate::foundation::error::{ScrutinError, ScrutinResult};
use crate::session::interpret::{apply_action, feedback};
use crate::session::selection::SelectionState;
use crate::session::sequence::{ResolveCtx, resolve_sequence};
use std::sync::Arc;

/// Reading of a state whose timeout targets are both `-1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdleTimeoutPolicy {
    /// Play the timeout sequence, stay in the state, re-arm.
    #[default]
    AnnounceAndHold,
    /// Never arm the idle timer for such states.
    Disarm,
}

/// Options controlling session behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOpts {
    /// How to treat states with no timeout transition target.
    pub idle_policy: IdleTimeoutPolicy,
}

/// Timer instruction for the caller's clock after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCmd {
    /// (Re)arm the idle timer for this many milliseconds.
    Arm(u32),
    /// Cancel any armed timer.
    Disarm,
}

/// One sprite drawn into one layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpritePaste {
    /// Sprite table index.
    pub sprite_i: usize,
    /// Slot index within the page's layout.
    pub slot_i: usize,
}

/// Complete draw instruction for the active state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Layout (== page) to show as background.
    pub layout_i: usize,
    /// Sprites over the background, in paint order.
    pub pastes: Vec<SpritePaste>,
}

/// Instructions emitted toward the rendering, audio, and clock
/// collaborators after one event.
#[derive(Debug, Clone)]
pub struct Effects {
    /// Clips to queue for sequential playback.
    pub playback: Vec<ClipIndex>,
    /// Redraw instruction; `None` when the event was discarded.
    pub frame: Option<Frame>,
    /// Timer instruction replacing any previously armed deadline.
    pub timer: TimerCmd,
}

/// One terminal session executing a validated ballot.
///
/// All processing is synchronous and deterministic; independent
/// sessions share the [`Ballot`] read-only.
pub struct Session {
    ballot: Arc<Ballot>,
    opts: SessionOpts,
    walks: Vec<SlotWalk>,
    page_i: usize,
    state_i: usize,
    selections: SelectionState,
}

impl Session {
    /// Create a session over a validated ballot.
    ///
    /// Fails when the ballot still has rotation-unfilled option areas;
    /// the machine never runs against an unresolved definition.
    pub fn new(ballot: Arc<Ballot>, opts: SessionOpts) -> ScrutinResult<Self> {
        if !ballot.rotation_resolved() {
            return Err(ScrutinError::session(
                "ballot has rotation-unfilled option areas",
            ));
        }
        let def = ballot.def();
        let walks = def
            .model
            .pages
            .iter()
            .map(|page| walk_page(&def.model.groups, page))
            .collect();
        let selections = SelectionState::new(def.model.groups.len());
        Ok(Self {
            ballot,
            opts,
            walks,
            page_i: 0,
            state_i: 0,
            selections,
        })
    }

    /// (Re)start the ballot: fresh selections, enter page 0, state 0.
    #[tracing::instrument(skip(self))]
    pub fn begin(&mut self) -> Effects {
        self.selections = SelectionState::new(self.ballot.def().model.groups.len());
        let ballot = self.ballot.clone();
        let mut playback = Vec::new();
        self.enter(ballot.def(), 0, 0, &mut playback);
        self.emit(playback)
    }

    /// Current (page, state) location.
    pub fn location(&self) -> (usize, usize) {
        (self.page_i, self.state_i)
    }

    /// Live selection state, e.g. for casting at the final page.
    pub fn selections(&self) -> &SelectionState {
        &self.selections
    }

    /// Handle a key press.
    ///
    /// State-level bindings are consulted before page-level ones; an
    /// unbound key is discarded without error.
    pub fn press(&mut self, key: u32) -> Effects {
        let ballot = self.ballot.clone();
        let def = ballot.def();
        let page = &def.model.pages[self.page_i];
        let state = &page.states[self.state_i];
        let action = state
            .key_bindings
            .iter()
            .chain(&page.key_bindings)
            .find(|b| b.key == key)
            .map(|b| &b.action);
        match action {
            Some(action) => self.run_action(def, action),
            None => self.discard(),
        }
    }

    /// Handle a touch at a canvas point.
    ///
    /// The first layout target containing the point selects the
    /// page's positional target binding; a miss is discarded.
    pub fn touch(&mut self, point: Point) -> Effects {
        let ballot = self.ballot.clone();
        let def = ballot.def();
        let layout = &def.video.layouts[self.page_i];
        let page = &def.model.pages[self.page_i];
        let hit = layout.targets.iter().position(|t| t.contains(point));
        match hit {
            Some(target_i) => {
                let action = &page.target_bindings[target_i].action;
                self.run_action(def, action)
            }
            None => self.discard(),
        }
    }

    /// Handle the caller's idle timer firing.
    ///
    /// Plays the state's timeout sequence, then transitions per the
    /// state's timeout targets (staying put when both are `-1`).
    pub fn timeout(&mut self) -> Effects {
        let ballot = self.ballot.clone();
        let def = ballot.def();
        let page = &def.model.pages[self.page_i];
        let state = &page.states[self.state_i];

        let mut playback = Vec::new();
        let ctx = ResolveCtx {
            def,
            state_option: self.state_option(def),
            action_option: None,
            sels: &self.selections,
        };
        playback.extend(resolve_sequence(&state.timeout_sequence, &ctx));

        if let Some((page_i, state_i)) =
            transition_target(self.page_i, state.timeout_page_i, state.timeout_state_i)
        {
            self.enter(def, page_i, state_i, &mut playback);
        }
        self.emit(playback)
    }

    fn run_action(&mut self, def: &BallotDef, action: &ActionDef) -> Effects {
        let page = &def.model.pages[self.page_i];
        let outcome = apply_action(def, page, action, &mut self.selections);

        let mut playback = Vec::new();
        let ctx = ResolveCtx {
            def,
            state_option: self.state_option(def),
            action_option: area_option(page, action.option_area_i),
            sels: &self.selections,
        };
        playback.extend(resolve_sequence(feedback(action, outcome), &ctx));

        if let Some((page_i, state_i)) =
            transition_target(self.page_i, action.next_page_i, action.next_state_i)
        {
            self.enter(def, page_i, state_i, &mut playback);
        }
        self.emit(playback)
    }

    /// Enter a state: update the location and queue its entry
    /// sequence. A self-goto is a real re-entry and replays the
    /// entry sequence (the repeat-prompt behavior).
    fn enter(&mut self, def: &BallotDef, page_i: usize, state_i: usize, playback: &mut Vec<ClipIndex>) {
        self.page_i = page_i;
        self.state_i = state_i;
        let state = &def.model.pages[page_i].states[state_i];
        let ctx = ResolveCtx {
            def,
            state_option: self.state_option(def),
            action_option: None,
            sels: &self.selections,
        };
        playback.extend(resolve_sequence(&state.entry_sequence, &ctx));
    }

    fn emit(&self, playback: Vec<ClipIndex>) -> Effects {
        Effects {
            playback,
            frame: Some(self.frame()),
            timer: self.timer_cmd(),
        }
    }

    /// Discarded input: no sound, no redraw, timer re-armed as the
    /// original event loop did on every event.
    fn discard(&self) -> Effects {
        Effects {
            playback: Vec::new(),
            frame: None,
            timer: self.timer_cmd(),
        }
    }

    fn timer_cmd(&self) -> TimerCmd {
        let def = self.ballot.def();
        if def.model.timeout_ms == 0 {
            return TimerCmd::Disarm;
        }
        let state = &def.model.pages[self.page_i].states[self.state_i];
        let untargeted = state.timeout_page_i == -1 && state.timeout_state_i == -1;
        if untargeted && self.opts.idle_policy == IdleTimeoutPolicy::Disarm {
            TimerCmd::Disarm
        } else {
            TimerCmd::Arm(def.model.timeout_ms)
        }
    }

    /// Current option designated by the active state's option area.
    fn state_option(&self, def: &BallotDef) -> Option<(usize, usize)> {
        let page = &def.model.pages[self.page_i];
        let state = &page.states[self.state_i];
        area_option(page, state.option_area_i)
    }

    /// Assemble the full draw instruction for the active state.
    fn frame(&self) -> Frame {
        let def = self.ballot.def();
        let page = &def.model.pages[self.page_i];
        let walk = &self.walks[self.page_i];
        let mut pastes = Vec::new();

        let state = &page.states[self.state_i];
        if let Some(sprite_i) = opt_index(state.sprite_i) {
            pastes.push(SpritePaste {
                sprite_i,
                slot_i: self.state_i,
            });
        }

        for (i, area) in page.option_areas.iter().enumerate() {
            let (Some(g), Some(o)) = (opt_index(area.group_i), opt_index(area.option_i)) else {
                continue;
            };
            let option = &def.model.groups[g].options[o];
            let slots = &walk.option_areas[i];
            let sprite_i = if self.selections.selected(g, o) {
                opt_index(option.sel_sprite_i)
            } else {
                opt_index(option.unsel_sprite_i)
            };
            if let Some(sprite_i) = sprite_i {
                pastes.push(SpritePaste {
                    sprite_i,
                    slot_i: slots.base,
                });
            }
            if slots.chars_len > 0
                && let Some(w) = opt_index(option.writein_group_i)
            {
                let chars = self.selections.group(w);
                for (j, &c) in chars.iter().take(slots.chars_len).enumerate() {
                    if let Some(sprite_i) = opt_index(def.model.groups[w].options[c].sel_sprite_i) {
                        pastes.push(SpritePaste {
                            sprite_i,
                            slot_i: slots.chars_start + j,
                        });
                    }
                }
            }
        }

        for (i, area) in page.counter_areas.iter().enumerate() {
            let Some(g) = opt_index(area.group_i) else {
                continue;
            };
            pastes.push(SpritePaste {
                sprite_i: area.sprite_i as usize + self.selections.count(g),
                slot_i: walk.counter_areas[i],
            });
        }

        for (i, area) in page.review_areas.iter().enumerate() {
            let Some(g) = opt_index(area.group_i) else {
                continue;
            };
            let group = &def.model.groups[g];
            let slots = &walk.review_areas[i];
            let sels = self.selections.group(g);
            for block in 0..slots.blocks {
                let base = slots.start + block * slots.block_len;
                if let Some(&o) = sels.get(block) {
                    let option = &group.options[o];
                    if let Some(sprite_i) = opt_index(option.sel_sprite_i) {
                        pastes.push(SpritePaste {
                            sprite_i,
                            slot_i: base,
                        });
                    }
                    if let Some(w) = opt_index(option.writein_group_i) {
                        let chars = self.selections.group(w);
                        for (j, &c) in chars.iter().take(slots.block_len - 1).enumerate() {
                            if let Some(sprite_i) =
                                opt_index(def.model.groups[w].options[c].sel_sprite_i)
                            {
                                pastes.push(SpritePaste {
                                    sprite_i,
                                    slot_i: base + 1 + j,
                                });
                            }
                        }
                    }
                } else if block == sels.len()
                    && let Some(cursor) = opt_index(area.cursor_sprite_i)
                {
                    pastes.push(SpritePaste {
                        sprite_i: cursor,
                        slot_i: base,
                    });
                }
            }
        }

        Frame {
            layout_i: self.page_i,
            pastes,
        }
    }
}

/// Current option designated by a state's or action's option area.
fn area_option(page: &PageDef, option_area_i: i32) -> Option<(usize, usize)> {
    let area = opt_index(option_area_i).and_then(|i| page.option_areas.get(i))?;
    Some((opt_index(area.group_i)?, opt_index(area.option_i)?))
}

/// Resolve transition sentinels against the current page.
///
/// `(-1, -1)` stays without re-entry; a bare state targets the current
/// page; a bare page (rejected by the validator) enters its state 0.
fn transition_target(current_page: usize, page_i: i32, state_i: i32) -> Option<(usize, usize)> {
    match (opt_index(page_i), opt_index(state_i)) {
        (None, None) => None,
        (Some(p), Some(s)) => Some((p, s)),
        (None, Some(s)) => Some((current_page, s)),
        (Some(p), None) => Some((p, 0)),
    }
}
