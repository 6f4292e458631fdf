use super::*;

#[test]
fn layers() {
    let base = layer_leds(0);
    assert!(base.is_on(1));
    assert!(!base.is_on(2));
    assert!(!base.is_on(3));

    assert_eq!(layer_leds(1), Leds(0b010));
    assert_eq!(layer_leds(2), Leds(0b011));
    assert_eq!(layer_leds(3), Leds(0b100));
    assert_eq!(layer_leds(6), Leds(0b111));
    assert_eq!(layer_leds(7), Leds(0));
}

#[test]
fn modes() {
    assert!(mode_leds(UnicodeMode::Linux).is_on(4));
    assert!(mode_leds(UnicodeMode::WinCompose).is_on(5));
    assert_eq!(
        mode_leds(UnicodeMode::Windows),
        mode_leds(UnicodeMode::WinCompose)
    );
    assert!(mode_leds(UnicodeMode::MacOs).is_on(6));
    assert!(!mode_leds(UnicodeMode::MacOs).is_on(0));

    let all = layer_leds(0).union(mode_leds(UnicodeMode::MacOs));
    assert_eq!(all, Leds(0b100001));
}
