use dkey_common::keycodes::{key_range, modifier_bits};

/// Held count for each of the eight modifiers. Two keys bound to the same modifier keep it held
/// until both are released.
#[derive(Default)]
pub struct Modifiers {
    counts: [u8; 8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotHeld(pub u16);

impl Modifiers {
    /// Returns true if the modifier byte changed.
    pub fn press(&mut self, code: u16) -> bool {
        let i = (code - key_range::MODIFIER_MIN) as usize;
        self.counts[i] = self.counts[i].saturating_add(1);
        self.counts[i] == 1
    }

    pub fn release(&mut self, code: u16) -> Result<bool, NotHeld> {
        let i = (code - key_range::MODIFIER_MIN) as usize;
        match self.counts[i] {
            0 => Err(NotHeld(code)),
            n => {
                self.counts[i] = n - 1;
                Ok(n == 1)
            }
        }
    }

    pub fn bits(&self) -> u8 {
        self.counts
            .iter()
            .enumerate()
            .fold(0, |bits, (i, c)| if *c > 0 { bits | 1 << i } else { bits })
    }

    pub fn shift_held(&self) -> bool {
        self.bits() & modifier_bits::SHIFT != 0
    }

    pub fn clear(&mut self) {
        self.counts = Default::default();
    }
}

#[cfg(test)]
#[path = "modifiers_test.rs"]
mod test;
