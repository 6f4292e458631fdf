#![no_std]
pub mod globals;
pub mod keycodes;
pub mod unicode_mode;

/// Version of the binary keymap layout shared by `dkey-config` and `dkey-engine`.
pub const PROTOCOL_VERSION: u16 = 1;

/// Combine two little-endian words into a u32 (low word first).
pub fn u32_from_u16(lo: u16, hi: u16) -> u32 {
    u16::from_le(lo) as u32 | ((u16::from_le(hi) as u32) << 16)
}

/// Split a u32 into two little-endian words (low word first).
pub fn u32_to_u16(n: u32) -> [u16; 2] {
    [(n as u16).to_le(), ((n >> 16) as u16).to_le()]
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod test;
