/// How the host operating system expects a Unicode code point to be typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum UnicodeMode {
    Linux = 0,
    MacOs = 1,
    Windows = 2,
    WinCompose = 3,
}

pub const UNICODE_MODE_COUNT: usize = 4;

impl UnicodeMode {
    pub const ALL: [UnicodeMode; UNICODE_MODE_COUNT] = [
        UnicodeMode::Linux,
        UnicodeMode::MacOs,
        UnicodeMode::Windows,
        UnicodeMode::WinCompose,
    ];

    pub fn from_u16(n: u16) -> Option<Self> {
        Self::ALL.get(n as usize).copied()
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            UnicodeMode::Linux => "linux",
            UnicodeMode::MacOs => "macos",
            UnicodeMode::Windows => "windows",
            UnicodeMode::WinCompose => "wincompose",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// The input mode to start in for a detected host. An unsure detection is treated as Linux.
    pub fn for_host(host: HostOs) -> Self {
        match host {
            HostOs::Unsure | HostOs::Linux => UnicodeMode::Linux,
            HostOs::Windows => UnicodeMode::WinCompose,
            HostOs::MacOs | HostOs::Ios => UnicodeMode::MacOs,
        }
    }
}

/// Result of host OS detection, supplied by the firmware framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostOs {
    Unsure,
    Linux,
    Windows,
    MacOs,
    Ios,
}

/// Ordered set of input modes that `uc_next` / `uc_prev` cycle through.
///
/// Serialized as one word holding up to four nibbles, first mode in the lowest nibble. Each
/// nibble is the mode plus one; a zero nibble ends the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeSelection {
    modes: [UnicodeMode; UNICODE_MODE_COUNT],
    len: u8,
}

impl Default for ModeSelection {
    fn default() -> Self {
        let mut sel = Self::empty();
        sel.push(UnicodeMode::Linux);
        sel.push(UnicodeMode::WinCompose);
        sel.push(UnicodeMode::MacOs);
        sel
    }
}

impl ModeSelection {
    pub const fn empty() -> Self {
        Self {
            modes: [UnicodeMode::Linux; UNICODE_MODE_COUNT],
            len: 0,
        }
    }

    /// Append `mode` unless already present. Returns false if it was not added.
    pub fn push(&mut self, mode: UnicodeMode) -> bool {
        if self.contains(mode) || self.len as usize >= UNICODE_MODE_COUNT {
            return false;
        }
        self.modes[self.len as usize] = mode;
        self.len += 1;
        true
    }

    pub fn contains(&self, mode: UnicodeMode) -> bool {
        self.as_slice().contains(&mode)
    }

    pub fn as_slice(&self) -> &[UnicodeMode] {
        &self.modes[..self.len as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The mode after `current`; wraps around. A mode outside the selection moves to the first.
    pub fn next(&self, current: UnicodeMode) -> UnicodeMode {
        let modes = self.as_slice();
        match modes.iter().position(|m| *m == current) {
            Some(i) => modes[(i + 1) % modes.len()],
            None => modes.first().copied().unwrap_or(current),
        }
    }

    pub fn prev(&self, current: UnicodeMode) -> UnicodeMode {
        let modes = self.as_slice();
        match modes.iter().position(|m| *m == current) {
            Some(i) => modes[(i + modes.len() - 1) % modes.len()],
            None => modes.last().copied().unwrap_or(current),
        }
    }

    pub fn serialize(&self) -> u16 {
        self.as_slice()
            .iter()
            .rev()
            .fold(0, |acc, m| (acc << 4) | (m.as_u16() + 1))
    }

    pub fn deserialize(mut word: u16) -> Option<Self> {
        let mut sel = Self::empty();
        while word != 0 {
            let mode = UnicodeMode::from_u16((word & 0xf).checked_sub(1)?)?;
            if !sel.push(mode) {
                return None;
            }
            word >>= 4;
        }
        Some(sel)
    }
}

#[cfg(test)]
#[path = "unicode_mode_test.rs"]
mod test;
