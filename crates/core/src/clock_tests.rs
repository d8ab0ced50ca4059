// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances_instant_and_epoch_together() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    let ms0 = clock.epoch_ms();

    clock.advance(Duration::from_secs(30));

    assert_eq!(clock.now(), t0 + Duration::from_secs(30));
    assert_eq!(clock.epoch_ms(), ms0 + 30_000);
}

#[test]
fn fake_clock_epoch_ms_can_be_pinned_to_a_literal() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(0);
    assert_eq!(clock.epoch_ms(), 0);
    clock.advance(Duration::from_secs(1));
    assert_eq!(clock.epoch_ms(), 1000);
}

#[test]
fn system_clock_epoch_ms_is_plausible() {
    let clock = SystemClock;
    // Any time after 2020-01-01 in ms.
    assert!(clock.epoch_ms() > 1_577_836_800_000);
}
