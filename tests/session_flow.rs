//! End-to-end session drive: navigation, selection feedback, write-in
//! entry, frame assembly, and the input/timeout protocol.

mod common;

use common::*;
use scrutin::{
    Ballot, ClipIndex, IdleTimeoutPolicy, Point, Session, SessionOpts, SpritePaste, TimerCmd,
};
use std::sync::Arc;

fn session() -> Session {
    let ballot = Arc::new(Ballot::new(ballot_def()).unwrap());
    Session::new(ballot, SessionOpts::default()).unwrap()
}

fn clips(playback: &[ClipIndex]) -> Vec<usize> {
    playback.iter().map(|c| c.0).collect()
}

fn paste(sprite_i: usize, slot_i: usize) -> SpritePaste {
    SpritePaste { sprite_i, slot_i }
}

#[test]
fn begin_enters_page_zero_state_zero() {
    let mut s = session();
    let fx = s.begin();
    assert_eq!(s.location(), (0, 0));
    // Entry resolves the state's current option (candidate A, clip base 0).
    assert_eq!(clips(&fx.playback), vec![0]);
    assert_eq!(fx.timer, TimerCmd::Arm(15_000));

    let frame = fx.frame.unwrap();
    assert_eq!(frame.layout_i, 0);
    assert_eq!(
        frame.pastes,
        vec![paste(0, 1), paste(2, 2), paste(6, 5)],
        "unselected option sprites plus the zero counter"
    );
}

#[test]
fn add_full_toggle_walk_the_outcome_table() {
    let mut s = session();
    s.begin();

    // Select A.
    let fx = s.press(KEY_ADD_A);
    assert_eq!(clips(&fx.playback), vec![CLIP_DEFAULT as usize]);
    assert_eq!(s.selections().group(0), &[0]);
    let frame = fx.frame.unwrap();
    assert_eq!(
        frame.pastes,
        vec![paste(1, 1), paste(2, 2), paste(7, 5), paste(1, 6)],
        "A selected, counter at one, review shows A"
    );

    // Counter readout offsets by the selection count.
    let fx = s.press(KEY_COUNT);
    assert_eq!(clips(&fx.playback), vec![CLIP_DEFAULT as usize + 1]);

    // Re-adding is idempotent.
    let fx = s.press(KEY_ADD_A);
    assert_eq!(clips(&fx.playback), vec![CLIP_NO_EFFECT as usize]);
    assert_eq!(s.selections().group(0), &[0]);

    // Toggling the selected option off through its touch target.
    let fx = s.touch(Point::new(5.0, 55.0));
    assert_eq!(clips(&fx.playback), vec![CLIP_TOGGLE_OFF as usize]);
    assert_eq!(s.selections().count(0), 0);

    // Toggling it back on.
    let fx = s.touch(Point::new(5.0, 55.0));
    assert_eq!(clips(&fx.playback), vec![CLIP_DEFAULT as usize]);
    assert_eq!(s.selections().group(0), &[0]);
}

#[test]
fn unbound_input_is_discarded_silently() {
    let mut s = session();
    s.begin();
    let fx = s.press(42);
    assert!(fx.playback.is_empty());
    assert!(fx.frame.is_none());
    assert_eq!(fx.timer, TimerCmd::Arm(15_000));

    let fx = s.touch(Point::new(95.0, 95.0));
    assert!(fx.playback.is_empty());
    assert!(fx.frame.is_none());
    assert_eq!(s.location(), (0, 0));
}

#[test]
fn writein_entry_appends_pops_and_accepts() {
    let mut s = session();
    s.begin();

    // Navigate to the write-in page.
    let fx = s.touch(Point::new(25.0, 55.0));
    assert_eq!(s.location(), (1, 0));
    assert_eq!(clips(&fx.playback), vec![CLIP_ENTRY_P1 as usize]);

    // Type both characters.
    let fx = s.press(KEY_CHAR_0);
    assert_eq!(clips(&fx.playback), vec![CLIP_DEFAULT as usize]);
    // One character typed: its sprite on the review line, cursor next.
    let frame = fx.frame.unwrap();
    assert_eq!(
        frame.pastes,
        vec![paste(4, 1), paste(4, 3), paste(8, 4)],
        "character key selected, review character, cursor"
    );

    let fx = s.press(KEY_CHAR_1);
    assert_eq!(clips(&fx.playback), vec![CLIP_DEFAULT as usize]);
    assert_eq!(s.selections().group(1), &[0, 1]);
    // The line is full: no cursor.
    let frame = fx.frame.unwrap();
    assert_eq!(
        frame.pastes,
        vec![paste(4, 1), paste(5, 2), paste(4, 3), paste(5, 4)]
    );

    // A third character is rejected at capacity.
    let fx = s.press(KEY_CHAR_0);
    assert_eq!(clips(&fx.playback), vec![CLIP_FULL as usize]);
    assert_eq!(s.selections().group(1), &[0, 1]);

    // Reading back plays the characters' base clips in order.
    let fx = s.press(KEY_READ);
    assert_eq!(clips(&fx.playback), vec![2, 3]);

    // Drop the second character, then accept.
    let fx = s.press(KEY_POP);
    assert_eq!(clips(&fx.playback), vec![CLIP_DEFAULT as usize]);
    assert_eq!(s.selections().group(1), &[0]);

    let fx = s.press(KEY_ACCEPT);
    assert_eq!(s.location(), (0, 0));
    // Accept feedback, then the contest page's entry sequence.
    assert_eq!(clips(&fx.playback), vec![CLIP_DEFAULT as usize, 0]);
    assert_eq!(s.selections().group(0), &[1]);

    // Contest page shows the accepted write-in with its characters.
    let frame = fx.frame.unwrap();
    assert_eq!(
        frame.pastes,
        vec![
            paste(0, 1), // A unselected
            paste(3, 2), // write-in selected
            paste(4, 3), // typed character in the area
            paste(7, 5), // counter at one
            paste(3, 6), // review block: write-in
            paste(4, 7), // review block: character
        ]
    );
}

#[test]
fn pop_on_empty_line_reports_empty() {
    let mut s = session();
    s.begin();
    s.touch(Point::new(25.0, 55.0));
    let fx = s.press(KEY_POP);
    assert_eq!(clips(&fx.playback), vec![CLIP_NO_EFFECT as usize]);
}

#[test]
fn timeout_announces_and_reenters_the_state() {
    let mut s = session();
    s.begin();
    let fx = s.timeout();
    // Timeout sequence, then the re-entered state's entry sequence.
    assert_eq!(
        clips(&fx.playback),
        vec![CLIP_TIMEOUT as usize, 0],
        "self-targeted timeout replays the prompt"
    );
    assert_eq!(s.location(), (0, 0));
    assert_eq!(fx.timer, TimerCmd::Arm(15_000));
}

#[test]
fn untargeted_timeout_holds_by_default_and_disarms_by_policy() {
    let mut s = session();
    s.begin();
    s.touch(Point::new(25.0, 55.0));
    // The write-in page's state has no timeout target.
    let fx = s.timeout();
    assert!(fx.playback.is_empty());
    assert_eq!(s.location(), (1, 0));
    assert_eq!(fx.timer, TimerCmd::Arm(15_000));

    let ballot = Arc::new(Ballot::new(ballot_def()).unwrap());
    let mut s = Session::new(
        ballot,
        SessionOpts {
            idle_policy: IdleTimeoutPolicy::Disarm,
        },
    )
    .unwrap();
    s.begin();
    let fx = s.touch(Point::new(25.0, 55.0));
    assert_eq!(fx.timer, TimerCmd::Disarm);
}

#[test]
fn begin_resets_selections() {
    let mut s = session();
    s.begin();
    s.press(KEY_ADD_A);
    assert_eq!(s.selections().count(0), 1);
    s.begin();
    assert_eq!(s.selections().count(0), 0);
    assert_eq!(s.location(), (0, 0));
}

#[test]
fn arbitrary_event_storms_never_break_capacity_or_crash() {
    let mut s = session();
    s.begin();

    // Deterministic LCG over keys (bound and unbound) and touch points.
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    for _ in 0..2000 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let roll = (seed >> 33) as u32;
        match roll % 4 {
            0 => {
                let keys = [
                    KEY_ADD_A, KEY_COUNT, KEY_CHAR_0, KEY_CHAR_1, KEY_POP, KEY_ACCEPT, KEY_READ,
                    77, 78,
                ];
                s.press(keys[(roll / 4) as usize % keys.len()]);
            }
            1 => {
                let x = f64::from((roll / 4) % 100);
                let y = f64::from((roll / 7) % 100);
                s.touch(Point::new(x, y));
            }
            2 => {
                s.timeout();
            }
            _ => {
                s.press(roll % 256);
            }
        }
        assert!(s.selections().count(0) <= 1);
        assert!(s.selections().count(1) <= 2);
    }
}
