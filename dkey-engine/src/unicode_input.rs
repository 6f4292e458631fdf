use dkey_common::{
    keycodes::key_range::{BASIC_0, BASIC_1, BASIC_A},
    unicode_mode::UnicodeMode,
};

use crate::report::{HostTransport, TransportError};

const LEFT_CTRL: u16 = 0xe0;
const LEFT_SHIFT: u16 = 0xe1;
const LEFT_ALT: u16 = 0xe2;
const RIGHT_ALT: u16 = 0xe6;
const U: u16 = 0x18;
const ENTER: u16 = 0x28;
const SPACE: u16 = 0x2c;
const KP_PLUS: u16 = 0x57;
const KP_1: u16 = 0x59;
const KP_0: u16 = 0x62;

/// Linux mode with a six digit scalar is the longest sequence at 20 steps.
pub const MAX_STEPS: usize = 32;

/// Keys held at once by any sequence: ctrl, shift and `u` in Linux mode.
const MAX_HELD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputStep {
    Press(u16),
    Release(u16),
}

pub type Steps = heapless::Vec<InputStep, MAX_STEPS>;

struct Builder {
    steps: Steps,
    keypad_digits: bool,
}

impl Builder {
    fn new(mode: UnicodeMode) -> Self {
        Self {
            steps: Steps::new(),
            keypad_digits: mode == UnicodeMode::Windows,
        }
    }

    fn push(&mut self, step: InputStep) -> &mut Self {
        let pushed = self.steps.push(step).is_ok();
        debug_assert!(pushed, "unicode input sequence exceeds MAX_STEPS");
        self
    }

    fn press(&mut self, code: u16) -> &mut Self {
        self.push(InputStep::Press(code))
    }

    fn release(&mut self, code: u16) -> &mut Self {
        self.push(InputStep::Release(code))
    }

    fn tap(&mut self, code: u16) -> &mut Self {
        self.press(code).release(code)
    }

    fn hex_digit(&mut self, digit: u32) -> &mut Self {
        if self.keypad_digits {
            self.tap(keypad_hex_key(digit))
        } else {
            self.tap(hex_key(digit))
        }
    }

    /// Hex digits without leading zeros. A leading zero is added when the first digit is a
    /// letter and `letter_needs_zero` is set.
    fn hex(&mut self, n: u32, letter_needs_zero: bool) -> &mut Self {
        let mut started = false;
        for shift in (0..8).rev() {
            let digit = (n >> (shift * 4)) & 0xf;
            if !started && digit == 0 && shift != 0 {
                continue;
            }
            if !started && letter_needs_zero && digit > 9 {
                self.hex_digit(0);
            }
            started = true;
            self.hex_digit(digit);
        }
        self
    }

    fn hex4(&mut self, n: u16) -> &mut Self {
        for shift in (0..4).rev() {
            self.hex_digit(((n >> (shift * 4)) & 0xf) as u32);
        }
        self
    }
}

fn hex_key(digit: u32) -> u16 {
    match digit {
        0 => BASIC_0,
        1..=9 => BASIC_1 + digit as u16 - 1,
        _ => BASIC_A + digit as u16 - 10,
    }
}

/// Alt+keypad entry only accepts digits from the keypad. Letters come from the main block.
fn keypad_hex_key(digit: u32) -> u16 {
    match digit {
        0 => KP_0,
        1..=9 => KP_1 + digit as u16 - 1,
        _ => hex_key(digit),
    }
}

/// The key presses a host in `mode` needs to receive to type `scalar`.
pub fn sequence(mode: UnicodeMode, scalar: u32) -> Steps {
    let mut b = Builder::new(mode);
    match mode {
        UnicodeMode::Linux => {
            b.press(LEFT_CTRL)
                .press(LEFT_SHIFT)
                .tap(U)
                .release(LEFT_SHIFT)
                .release(LEFT_CTRL)
                .hex(scalar, false)
                .tap(SPACE);
        }
        UnicodeMode::WinCompose => {
            b.tap(RIGHT_ALT).tap(U).hex(scalar, true).tap(ENTER);
        }
        UnicodeMode::Windows => {
            b.press(LEFT_ALT)
                .tap(KP_PLUS)
                .hex(scalar, false)
                .release(LEFT_ALT);
        }
        UnicodeMode::MacOs => {
            b.press(LEFT_ALT);
            if let Some(c) = char::from_u32(scalar) {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    b.hex4(*unit);
                }
            }
            b.release(LEFT_ALT);
        }
    }
    b.steps
}

/// Adapts a transport that can only send key codes into a full [HostTransport] by typing each
/// Unicode scalar with the host's input method.
pub struct UnicodeKeystrokes<T: HostTransport> {
    inner: T,
    mode: UnicodeMode,
}

impl<T: HostTransport> UnicodeKeystrokes<T> {
    pub fn new(inner: T, mode: UnicodeMode) -> Self {
        Self { inner, mode }
    }

    pub fn mode(&self) -> UnicodeMode {
        self.mode
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn release_held(&mut self, held: &[u16]) {
        for code in held.iter().rev() {
            if let Err(err) = self.inner.keystroke(*code, false) {
                crate::warn!("release of {} failed: {:?}", code, err);
                self.inner.clear();
                return;
            }
        }
    }
}

impl<T: HostTransport> HostTransport for UnicodeKeystrokes<T> {
    fn keystroke(&mut self, code: u16, is_down: bool) -> Result<(), TransportError> {
        self.inner.keystroke(code, is_down)
    }

    fn modifiers(&mut self, bits: u8) -> Result<(), TransportError> {
        self.inner.modifiers(bits)
    }

    /// On a failed keystroke every key the sequence left pressed is released before the error
    /// is returned.
    fn unicode(&mut self, scalar: u32) -> Result<(), TransportError> {
        let mut held = heapless::Vec::<u16, MAX_HELD>::new();
        for step in sequence(self.mode, scalar) {
            let result = match step {
                InputStep::Press(code) => self.inner.keystroke(code, true).map(|_| {
                    let pushed = held.push(code).is_ok();
                    debug_assert!(pushed, "more than MAX_HELD keys held");
                }),
                InputStep::Release(code) => self.inner.keystroke(code, false).map(|_| {
                    held.retain(|c| *c != code);
                }),
            };
            if let Err(err) = result {
                self.release_held(&held);
                return Err(err);
            }
        }
        Ok(())
    }

    fn unicode_mode(&mut self, mode: UnicodeMode) -> Result<(), TransportError> {
        self.mode = mode;
        self.inner.unicode_mode(mode)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
#[path = "unicode_input_test.rs"]
mod test;
