//! Status LEDs: the active layer shown on LEDs 1–3 and the Unicode input mode on LEDs 4–6.

use dkey_common::unicode_mode::UnicodeMode;

/// LED states, bit 0 is LED 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Leds(pub u8);

impl Leds {
    pub fn is_on(&self, led: u8) -> bool {
        led >= 1 && self.0 & 1 << (led - 1) != 0
    }

    pub fn union(self, other: Leds) -> Leds {
        Leds(self.0 | other.0)
    }
}

/// Layer `n` lights LEDs 1–3 with `n + 1` in binary. Layers past 6 light nothing.
pub fn layer_leds(layer: u16) -> Leds {
    if layer > 6 {
        Leds(0)
    } else {
        Leds(layer as u8 + 1)
    }
}

pub fn mode_leds(mode: UnicodeMode) -> Leds {
    match mode {
        UnicodeMode::Linux => Leds(1 << 3),
        UnicodeMode::WinCompose | UnicodeMode::Windows => Leds(1 << 4),
        UnicodeMode::MacOs => Leds(1 << 5),
    }
}

#[cfg(test)]
#[path = "indicators_test.rs"]
mod test;
