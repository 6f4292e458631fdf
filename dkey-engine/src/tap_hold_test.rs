use super::*;

const U: u16 = 0x18;

fn media_u() -> u16 {
    key_range::layer_tap(3, U).unwrap()
}

fn started() -> TapHold {
    let mut t = TapHold::default();
    t.start(2, 5, media_u(), 1000, 200);
    t
}

#[test]
fn release_before_timeout_is_tap() {
    let mut t = started();
    assert!(t.is_waiting());
    assert_eq!(t.wait_until(), 1200);

    assert_eq!(
        t.key_switch(ScanKey::new(2, 5, false), 1199),
        Resolution::Tap {
            row: 2,
            column: 5,
            tap: U
        }
    );
    assert_eq!(t, TapHold::Idle);
    assert_eq!(t.wait_until(), u64::MAX);
}

#[test]
fn release_after_timeout_is_hold() {
    let mut t = started();
    assert_eq!(
        t.key_switch(ScanKey::new(2, 5, false), 1200),
        Resolution::Hold {
            row: 2,
            column: 5,
            layer: 3
        }
    );
    assert!(!t.is_waiting());
}

#[test]
fn other_key_down_is_hold() {
    let mut t = started();
    assert_eq!(
        t.key_switch(ScanKey::new(0, 0, false), 1010),
        Resolution::Undecided
    );
    assert!(t.is_waiting());

    assert_eq!(
        t.key_switch(ScanKey::new(0, 0, true), 1020),
        Resolution::Hold {
            row: 2,
            column: 5,
            layer: 3
        }
    );
    assert_eq!(t.key_switch(ScanKey::new(2, 5, false), 1030), Resolution::Undecided);
}

#[test]
fn timer_expired() {
    let mut t = started();
    assert_eq!(t.timer_expired(1100), Resolution::Undecided);
    assert!(t.is_waiting());
    assert_eq!(
        t.timer_expired(1250),
        Resolution::Hold {
            row: 2,
            column: 5,
            layer: 3
        }
    );
    assert_eq!(t.timer_expired(1300), Resolution::Undecided);

    let mut t = started();
    t.clear();
    assert_eq!(t.timer_expired(5000), Resolution::Undecided);
}
