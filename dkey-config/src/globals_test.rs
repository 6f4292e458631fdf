use dkey_common::{
    globals,
    unicode_mode::{ModeSelection, UnicodeMode},
};

use super::spec::*;

#[test]
fn unicode_mode() {
    let mut g = GlobalProp::new_default("unicode_mode").unwrap();
    assert_eq!(g.default_name(), Some("unicode_mode"));

    g.set_values(&["macos"]).unwrap();
    assert_eq!(
        g.serialize(),
        [globals::UNICODE_MODE, UnicodeMode::MacOs.as_u16()]
    );

    assert!(g.set_values(&["linux", "macos"]).is_err());
    assert_eq!(
        g.set_values(&["beos"]).unwrap_err(),
        "Invalid unicode mode 'beos'; expected linux, macos, windows or wincompose"
    );
}

#[test]
fn unicode_modes() {
    let mut g = GlobalProp::new_default("unicode_modes").unwrap();
    g.set_values(&["linux", "wincompose", "macos"]).unwrap();
    assert_eq!(
        g.serialize(),
        [globals::UNICODE_MODES, ModeSelection::default().serialize()]
    );

    assert_eq!(
        g.set_values(&["linux", "linux"]).unwrap_err(),
        "Duplicate unicode mode 'linux'"
    );
}

#[test]
fn tap_hold_timeout() {
    let mut g = GlobalProp::new_default("tap_hold_timeout").unwrap();
    assert_eq!(
        g.serialize(),
        [globals::TAP_HOLD_TIMEOUT, globals::DEFAULT_TAP_HOLD_TIMEOUT]
    );

    g.set_values(&["150"]).unwrap();
    assert_eq!(g.serialize(), [globals::TAP_HOLD_TIMEOUT, 150]);

    assert_eq!(
        g.set_values(&["soon"]).unwrap_err(),
        "Invalid milliseconds 'soon'; expected 0 to 65535"
    );
    assert!(g.set_values(&["1", "2"]).is_err());
}

#[test]
fn unknown_global() {
    assert_eq!(
        GlobalProp::new_default("debounce").unwrap_err(),
        "Invalid global 'debounce'"
    );
}
