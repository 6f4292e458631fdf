use embassy_sync::blocking_mutex::raw::NoopRawMutex;

use crate::report::{KeyEvent, ReportChannel};

use super::*;

extern crate std;

use std::vec::Vec;

use InputStep::{Press, Release};

fn taps(codes: &[u16]) -> Vec<InputStep> {
    codes.iter().flat_map(|c| [Press(*c), Release(*c)]).collect()
}

const D0: u16 = BASIC_0;
const D2: u16 = BASIC_1 + 1;
const D3: u16 = BASIC_1 + 2;
const D8: u16 = BASIC_1 + 7;
const HEX_A: u16 = BASIC_A;
const HEX_C: u16 = BASIC_A + 2;
const HEX_D: u16 = BASIC_A + 3;
const HEX_E: u16 = BASIC_A + 4;

#[test]
fn linux() {
    let mut expect = std::vec![Press(LEFT_CTRL), Press(LEFT_SHIFT), Press(U), Release(U)];
    expect.extend([Release(LEFT_SHIFT), Release(LEFT_CTRL)]);
    expect.extend(taps(&[D2, D0, HEX_A, HEX_C, SPACE]));

    assert_eq!(sequence(UnicodeMode::Linux, 0x20ac).as_slice(), expect.as_slice());
}

#[test]
fn wincompose_leading_zero_for_letter() {
    let mut expect = taps(&[RIGHT_ALT, U]);
    expect.extend(taps(&[D0, HEX_E, D8, ENTER]));
    assert_eq!(
        sequence(UnicodeMode::WinCompose, 0xe8).as_slice(),
        expect.as_slice()
    );

    let mut expect = taps(&[RIGHT_ALT, U]);
    expect.extend(taps(&[D3, D0, D2, ENTER]));
    assert_eq!(
        sequence(UnicodeMode::WinCompose, 0x302).as_slice(),
        expect.as_slice()
    );
}

#[test]
fn windows_digits_from_keypad() {
    let kp8 = KP_1 + 7;
    let kp2 = KP_1 + 1;

    let mut expect = std::vec![Press(LEFT_ALT)];
    expect.extend(taps(&[KP_PLUS, HEX_E, kp8]));
    expect.push(Release(LEFT_ALT));
    assert_eq!(sequence(UnicodeMode::Windows, 0xe8).as_slice(), expect.as_slice());

    let mut expect = std::vec![Press(LEFT_ALT)];
    expect.extend(taps(&[KP_PLUS, kp2, KP_0, HEX_A, HEX_C]));
    expect.push(Release(LEFT_ALT));
    assert_eq!(
        sequence(UnicodeMode::Windows, 0x20ac).as_slice(),
        expect.as_slice()
    );
}

#[test]
fn longest_sequences_fit() {
    for mode in [
        UnicodeMode::Linux,
        UnicodeMode::WinCompose,
        UnicodeMode::Windows,
        UnicodeMode::MacOs,
    ] {
        let steps = sequence(mode, 0x10ffff);
        assert!(matches!(steps.last(), Some(Release(_))), "{:?}", mode);
        let presses = steps.iter().filter(|s| matches!(s, Press(_))).count();
        assert_eq!(presses * 2, steps.len(), "{:?}", mode);
    }
    assert_eq!(sequence(UnicodeMode::Linux, 0x10ffff).len(), 20);
    assert_eq!(sequence(UnicodeMode::MacOs, 0x10ffff).len(), 18);
}

#[test]
fn macos_utf16() {
    let mut expect = std::vec![Press(LEFT_ALT)];
    expect.extend(taps(&[D0, D0, HEX_E, D8]));
    expect.push(Release(LEFT_ALT));
    assert_eq!(sequence(UnicodeMode::MacOs, 0xe8).as_slice(), expect.as_slice());

    // U+1F600 is d83d de00
    let mut expect = std::vec![Press(LEFT_ALT)];
    expect.extend(taps(&[HEX_D, D8, D3, HEX_D, HEX_D, HEX_E, D0, D0]));
    expect.push(Release(LEFT_ALT));
    assert_eq!(
        sequence(UnicodeMode::MacOs, 0x1f600).as_slice(),
        expect.as_slice()
    );
}

#[derive(Default)]
struct FailingTransport {
    calls: usize,
    fail_on: usize,
    sent: Vec<(u16, bool)>,
}

impl FailingTransport {
    fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            ..Default::default()
        }
    }
}

impl HostTransport for FailingTransport {
    fn keystroke(&mut self, code: u16, is_down: bool) -> Result<(), TransportError> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(TransportError::Disconnected);
        }
        self.sent.push((code, is_down));
        Ok(())
    }

    fn modifiers(&mut self, _bits: u8) -> Result<(), TransportError> {
        Ok(())
    }

    fn unicode(&mut self, _scalar: u32) -> Result<(), TransportError> {
        Ok(())
    }
}

#[test]
fn failed_keystroke_releases_held_keys() {
    let mut transport = UnicodeKeystrokes::new(FailingTransport::new(4), UnicodeMode::Linux);

    assert_eq!(transport.unicode(0xe8), Err(TransportError::Disconnected));
    assert_eq!(
        transport.inner().sent,
        [
            (LEFT_CTRL, true),
            (LEFT_SHIFT, true),
            (U, true),
            (U, false),
            (LEFT_SHIFT, false),
            (LEFT_CTRL, false),
        ]
    );
}

#[test]
fn failed_press_is_not_released() {
    let mut transport = UnicodeKeystrokes::new(FailingTransport::new(2), UnicodeMode::Windows);

    assert_eq!(transport.unicode(0xe8), Err(TransportError::Disconnected));
    assert_eq!(
        transport.inner().sent,
        [(LEFT_ALT, true), (LEFT_ALT, false)]
    );
}

#[test]
fn keystroke_adapter() {
    let channel = ReportChannel::<NoopRawMutex, 32>::default();
    let mut transport = UnicodeKeystrokes::new(&channel, UnicodeMode::Linux);

    transport.unicode_mode(UnicodeMode::WinCompose).unwrap();
    assert_eq!(transport.mode(), UnicodeMode::WinCompose);
    assert_eq!(
        channel.try_receive(),
        Some(KeyEvent::UnicodeMode(UnicodeMode::WinCompose))
    );

    transport.unicode(0x302).unwrap();
    let mut events = Vec::new();
    while let Some(e) = channel.try_receive() {
        events.push(e);
    }
    let expected: Vec<_> = sequence(UnicodeMode::WinCompose, 0x302)
        .iter()
        .map(|s| match s {
            Press(c) => KeyEvent::Key(*c, true),
            Release(c) => KeyEvent::Key(*c, false),
        })
        .collect();
    assert_eq!(events, expected);
}
