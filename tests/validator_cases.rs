//! Validator soundness: a consistent ballot passes, and each
//! deliberately broken invariant is reported by name.

mod common;

use common::ballot_def;
use scrutin::{
    Ballot, GroupKind, OptionDef, SegmentDef, SegmentKind, SelectOp, validate_ballot,
};

#[test]
fn consistent_ballot_validates() {
    validate_ballot(&ballot_def()).unwrap();
    let ballot = Ballot::new(ballot_def()).unwrap();
    assert!(ballot.rotation_resolved());
    assert_eq!(ballot.timeout_ms(), 15_000);
}

#[test]
fn rejects_writein_capacity_mismatch() {
    let mut def = ballot_def();
    def.model.groups[1].max_sels = 3;
    let err = validate_ballot(&def).unwrap_err();
    assert!(
        err.to_string()
            .contains("max_sels 3 must equal the contest's max_chars 2")
    );
}

#[test]
fn rejects_writein_option_with_unsel_sprite() {
    let mut def = ballot_def();
    def.model.groups[1].options[0].unsel_sprite_i = 4;
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.to_string().contains("unsel_sprite_i == -1"));
}

#[test]
fn rejects_option_area_census_mismatch() {
    let mut def = ballot_def();
    def.model.pages[0].option_areas.remove(0);
    let err = validate_ballot(&def).unwrap_err();
    assert!(
        err.to_string()
            .contains("option area count 1 must equal option count 2")
    );
}

#[test]
fn rejects_unbound_writein_option() {
    let mut def = ballot_def();
    def.model.pages[0].option_areas[1].option_i = -1;
    let err = validate_ballot(&def).unwrap_err();
    assert!(
        err.to_string()
            .contains("must be bound by an option area")
    );
}

#[test]
fn rejects_option_sprite_size_mismatch() {
    let mut def = ballot_def();
    def.video.sprites[1] = common::image(9, 9);
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.to_string().contains("is 9x9 but"));
}

#[test]
fn rejects_counter_sprite_range_overflow() {
    let mut def = ballot_def();
    def.model.pages[0].counter_areas[0].sprite_i = 9;
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.to_string().contains("count sprite range"));
}

#[test]
fn rejects_operator_on_wrong_group_kind() {
    let mut def = ballot_def();
    // Appending to a contest group is an authoring error.
    def.model.pages[0].key_bindings[0].action.option_op = Some(SelectOp::Append);
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.to_string().contains("does not apply to a Contest group"));
}

#[test]
fn rejects_state_option_offset_escaping_clip_range() {
    let mut def = ballot_def();
    // Closure is over every option of the state's group: the write-in
    // option's clip base (1) pushes 1 + 9 past the 10-clip table.
    def.model.pages[0].states[0].entry_sequence.segments[0].clip_i = 9;
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.to_string().contains("out of clip range 10"));
}

#[test]
fn rejects_transition_to_missing_state() {
    let mut def = ballot_def();
    def.model.pages[0].target_bindings[1].action.next_state_i = 5;
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.to_string().contains("target state 5"));
}

#[test]
fn rejects_segment_with_bad_option_ref() {
    let mut def = ballot_def();
    def.model.pages[0].key_bindings[1]
        .action
        .default_feedback
        .segments[0] = SegmentDef {
        kind: SegmentKind::OptionSelected,
        clip_i: 0,
        group_i: 0,
        option_i: 9,
    };
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.to_string().contains("invalid (group_i 0, option_i 9)"));
}

#[test]
fn rejects_contest_group_masquerading_as_writein_target() {
    let mut def = ballot_def();
    def.model.groups[1].kind = GroupKind::Contest;
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.to_string().contains("must reference a write-in group"));
}

#[test]
fn collects_violations_across_components() {
    let mut def = ballot_def();
    def.video.sprites[1] = common::image(9, 9);
    def.model.pages[0].target_bindings[1].action.next_state_i = 5;
    def.model.groups[0].options.push(OptionDef {
        unsel_sprite_i: 50,
        sel_sprite_i: 50,
        clip_i: 0,
        writein_group_i: -1,
    });
    let err = validate_ballot(&def).unwrap_err();
    assert!(err.violations.len() >= 3);
}
