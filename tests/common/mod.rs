//! Shared fixture: a miniature two-page ballot with one contest
//! (candidate A plus a write-in) and the write-in's character group.
//!
//! Page 0 is the contest page: option areas for A and the write-in,
//! a selection counter, and a review readout. Page 1 is the write-in
//! entry page: one option area per character, a character review line
//! with a cursor, and keys for append/pop/accept.
#![allow(dead_code)]

use scrutin::{
    ActionDef, AudioDef, BallotDef, ClipDef, CounterAreaDef, GroupDef, GroupKind, ImageDef,
    KeyBindingDef, LayoutDef, ModelDef, OptionAreaDef, OptionDef, OptionRef, PageDef, RectDef,
    ReviewAreaDef, SegmentDef, SegmentKind, SelectOp, SequenceDef, StateDef, TargetBindingDef,
    VideoDef,
};

pub const KEY_ADD_A: u32 = 100;
pub const KEY_COUNT: u32 = 5;
pub const KEY_CHAR_0: u32 = 1;
pub const KEY_CHAR_1: u32 = 2;
pub const KEY_READ: u32 = 3;
pub const KEY_POP: u32 = 8;
pub const KEY_ACCEPT: u32 = 9;

pub const CLIP_DEFAULT: i32 = 4;
pub const CLIP_TOGGLE_OFF: i32 = 5;
pub const CLIP_FULL: i32 = 6;
pub const CLIP_NO_EFFECT: i32 = 7;
pub const CLIP_TIMEOUT: i32 = 8;
pub const CLIP_ENTRY_P1: i32 = 9;

pub fn image(width: u32, height: u32) -> ImageDef {
    ImageDef {
        width,
        height,
        pixels: vec![0; (width * height) as usize],
    }
}

pub fn rect(left: u32, top: u32, width: u32, height: u32) -> RectDef {
    RectDef {
        left,
        top,
        width,
        height,
    }
}

fn clip_seg(clip_i: i32) -> SequenceDef {
    SequenceDef {
        segments: vec![SegmentDef {
            kind: SegmentKind::Clip,
            clip_i,
            group_i: -1,
            option_i: -1,
        }],
    }
}

fn key(key: u32, action: ActionDef) -> KeyBindingDef {
    KeyBindingDef { key, action }
}

fn ref_op(op: SelectOp, group_i: i32, option_i: i32) -> ActionDef {
    ActionDef {
        option_op: Some(op),
        option_refs: vec![OptionRef { group_i, option_i }],
        default_feedback: clip_seg(CLIP_DEFAULT),
        no_effect_feedback: clip_seg(CLIP_NO_EFFECT),
        full_feedback: clip_seg(CLIP_FULL),
        empty_feedback: clip_seg(CLIP_NO_EFFECT),
        ..ActionDef::default()
    }
}

pub fn ballot_def() -> BallotDef {
    let contest = GroupDef {
        kind: GroupKind::Contest,
        max_sels: 1,
        max_chars: 2,
        options: vec![
            OptionDef {
                unsel_sprite_i: 0,
                sel_sprite_i: 1,
                clip_i: 0,
                writein_group_i: -1,
            },
            OptionDef {
                unsel_sprite_i: 2,
                sel_sprite_i: 3,
                clip_i: 1,
                writein_group_i: 1,
            },
        ],
    };
    let characters = GroupDef {
        kind: GroupKind::WriteIn,
        max_sels: 2,
        max_chars: 0,
        options: vec![
            OptionDef {
                unsel_sprite_i: -1,
                sel_sprite_i: 4,
                clip_i: 2,
                writein_group_i: -1,
            },
            OptionDef {
                unsel_sprite_i: -1,
                sel_sprite_i: 5,
                clip_i: 3,
                writein_group_i: -1,
            },
        ],
    };

    let contest_page = PageDef {
        key_bindings: vec![
            key(KEY_ADD_A, ref_op(SelectOp::Add, 0, 0)),
            key(
                KEY_COUNT,
                ActionDef {
                    default_feedback: SequenceDef {
                        segments: vec![SegmentDef {
                            kind: SegmentKind::SelectionCount,
                            clip_i: CLIP_DEFAULT,
                            group_i: 0,
                            option_i: -1,
                        }],
                    },
                    ..ActionDef::default()
                },
            ),
        ],
        target_bindings: vec![
            TargetBindingDef {
                action: ActionDef {
                    option_area_op: Some(SelectOp::Toggle),
                    option_area_i: 0,
                    default_feedback: clip_seg(CLIP_DEFAULT),
                    toggle_off_feedback: clip_seg(CLIP_TOGGLE_OFF),
                    full_feedback: clip_seg(CLIP_FULL),
                    ..ActionDef::default()
                },
            },
            TargetBindingDef {
                action: ActionDef {
                    next_page_i: 1,
                    next_state_i: 0,
                    ..ActionDef::default()
                },
            },
        ],
        states: vec![StateDef {
            option_area_i: 0,
            entry_sequence: SequenceDef {
                segments: vec![SegmentDef {
                    kind: SegmentKind::StateOption,
                    clip_i: 0,
                    group_i: -1,
                    option_i: -1,
                }],
            },
            timeout_sequence: clip_seg(CLIP_TIMEOUT),
            timeout_page_i: 0,
            timeout_state_i: 0,
            ..StateDef::default()
        }],
        option_areas: vec![
            OptionAreaDef {
                group_i: 0,
                option_i: 0,
            },
            OptionAreaDef {
                group_i: 0,
                option_i: 1,
            },
        ],
        counter_areas: vec![CounterAreaDef {
            group_i: 0,
            sprite_i: 6,
        }],
        review_areas: vec![ReviewAreaDef {
            group_i: 0,
            cursor_sprite_i: -1,
        }],
    };

    let writein_page = PageDef {
        key_bindings: vec![
            key(KEY_CHAR_0, ref_op(SelectOp::Append, 1, 0)),
            key(KEY_CHAR_1, ref_op(SelectOp::Append, 1, 1)),
            key(KEY_POP, ref_op(SelectOp::Pop, 1, 0)),
            key(KEY_ACCEPT, {
                let mut accept = ref_op(SelectOp::Add, 0, 1);
                accept.next_page_i = 0;
                accept.next_state_i = 0;
                accept
            }),
            key(
                KEY_READ,
                ActionDef {
                    default_feedback: SequenceDef {
                        segments: vec![SegmentDef {
                            kind: SegmentKind::GroupSelections,
                            clip_i: 0,
                            group_i: 1,
                            option_i: -1,
                        }],
                    },
                    ..ActionDef::default()
                },
            ),
        ],
        target_bindings: vec![],
        states: vec![StateDef {
            entry_sequence: clip_seg(CLIP_ENTRY_P1),
            ..StateDef::default()
        }],
        option_areas: vec![
            OptionAreaDef {
                group_i: 1,
                option_i: 0,
            },
            OptionAreaDef {
                group_i: 1,
                option_i: 1,
            },
        ],
        counter_areas: vec![],
        review_areas: vec![ReviewAreaDef {
            group_i: 1,
            cursor_sprite_i: 8,
        }],
    };

    let contest_layout = LayoutDef {
        screen: image(100, 100),
        targets: vec![rect(0, 50, 10, 10), rect(20, 50, 10, 10)],
        slots: vec![
            rect(0, 0, 10, 10),  // state highlight
            rect(12, 0, 10, 10), // option area A
            rect(24, 0, 10, 10), // option area write-in
            rect(36, 0, 5, 5),   // write-in character 0
            rect(42, 0, 5, 5),   // write-in character 1
            rect(48, 0, 7, 7),   // counter
            rect(60, 0, 10, 10), // review block 0
            rect(72, 0, 5, 5),   // review character 0
            rect(78, 0, 5, 5),   // review character 1
        ],
    };
    let writein_layout = LayoutDef {
        screen: image(100, 100),
        targets: vec![],
        slots: vec![
            rect(0, 0, 5, 5),  // state highlight
            rect(10, 0, 5, 5), // character key 0
            rect(20, 0, 5, 5), // character key 1
            rect(30, 0, 5, 5), // review character line, block 0
            rect(40, 0, 5, 5), // review character line, block 1
        ],
    };

    BallotDef {
        model: ModelDef {
            groups: vec![contest, characters],
            pages: vec![contest_page, writein_page],
            timeout_ms: 15_000,
        },
        video: VideoDef {
            width: 100,
            height: 100,
            layouts: vec![contest_layout, writein_layout],
            sprites: vec![
                image(10, 10), // 0: A unselected
                image(10, 10), // 1: A selected
                image(10, 10), // 2: write-in unselected
                image(10, 10), // 3: write-in selected
                image(5, 5),   // 4: character 0
                image(5, 5),   // 5: character 1
                image(7, 7),   // 6: counter zero
                image(7, 7),   // 7: counter one
                image(5, 5),   // 8: cursor
            ],
        },
        audio: AudioDef {
            sample_rate: 8000,
            clips: (0..10).map(|_| ClipDef { samples: vec![0] }).collect(),
        },
    }
}
