//! Shuttle latch behavior of the direction arbiter.
//!
//! Electrical convention throughout: end switches are active-low (level
//! `false` = pressed); the switching-enable input reads `true` when
//! switching is disabled (pulled-up input, enable switch open).

use std::sync::atomic::Ordering;

use throttle_core::DirectionArbiter;
use throttle_core::mocks::LevelInput;

struct Rig {
    arbiter: DirectionArbiter,
    sw1: std::sync::Arc<std::sync::atomic::AtomicBool>,
    sw2: std::sync::Arc<std::sync::atomic::AtomicBool>,
    enable: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

fn rig() -> Rig {
    let (sw1_in, sw1) = LevelInput::new(true); // released
    let (sw2_in, sw2) = LevelInput::new(true); // released
    let (en_in, enable) = LevelInput::new(false); // switching enabled
    Rig {
        arbiter: DirectionArbiter::switch_based(sw1_in, sw2_in, en_in),
        sw1,
        sw2,
        enable,
    }
}

#[test]
fn pass_through_never_reverses() {
    let mut arbiter = DirectionArbiter::pass_through();
    for _ in 0..3 {
        assert!(!arbiter.should_reverse().unwrap());
    }
    assert!(!arbiter.is_reversed());
}

#[test]
fn shuttle_sequence_flips_and_clears_the_latch() {
    let mut r = rig();

    // Idle: nothing pressed, latch stays normal.
    assert!(!r.arbiter.should_reverse().unwrap());
    assert!(!r.arbiter.is_reversed());

    // Switch 1 pressed: latch flips and the same cycle reports reversal.
    r.sw1.store(false, Ordering::Relaxed);
    assert!(r.arbiter.should_reverse().unwrap());
    assert!(r.arbiter.is_reversed());

    // Switch 1 released again: latch holds.
    r.sw1.store(true, Ordering::Relaxed);
    assert!(r.arbiter.should_reverse().unwrap());

    // While reversed, switch 1 is ignored entirely.
    r.sw1.store(false, Ordering::Relaxed);
    assert!(r.arbiter.should_reverse().unwrap());
    r.sw1.store(true, Ordering::Relaxed);

    // Switch 2 pressed: latch clears, same cycle reports normal.
    r.sw2.store(false, Ordering::Relaxed);
    assert!(!r.arbiter.should_reverse().unwrap());
    assert!(!r.arbiter.is_reversed());

    // And released: stays normal.
    r.sw2.store(true, Ordering::Relaxed);
    assert!(!r.arbiter.should_reverse().unwrap());
}

#[test]
fn switch_2_is_ignored_while_normal() {
    let mut r = rig();
    r.sw2.store(false, Ordering::Relaxed);
    assert!(!r.arbiter.should_reverse().unwrap());
    assert!(!r.arbiter.is_reversed());
}

#[test]
fn disabled_switching_bypasses_but_preserves_the_latch() {
    let mut r = rig();

    // Get into the reversed state first.
    r.sw1.store(false, Ordering::Relaxed);
    assert!(r.arbiter.should_reverse().unwrap());
    r.sw1.store(true, Ordering::Relaxed);

    // Disable switching: reversal is suppressed, latch untouched.
    r.enable.store(true, Ordering::Relaxed);
    assert!(!r.arbiter.should_reverse().unwrap());
    assert!(r.arbiter.is_reversed());

    // Even a pressed switch 2 cannot clear the latch while disabled.
    r.sw2.store(false, Ordering::Relaxed);
    assert!(!r.arbiter.should_reverse().unwrap());
    assert!(r.arbiter.is_reversed());
    r.sw2.store(true, Ordering::Relaxed);

    // Re-enable: the preserved latch applies again.
    r.enable.store(false, Ordering::Relaxed);
    assert!(r.arbiter.should_reverse().unwrap());
}
