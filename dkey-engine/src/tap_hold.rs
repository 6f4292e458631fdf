use dkey_common::keycodes::key_range;

use TapHold::*;

use crate::scan::ScanKey;

/// How a pending layer-tap key was decided.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Resolution {
    Undecided,
    Tap { row: usize, column: usize, tap: u16 },
    Hold { row: usize, column: usize, layer: u16 },
}

/// A layer-tap key waiting to be decided. Released before `timeout` it is a tap; held past it
/// or interrupted by another key-down it is a hold.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum TapHold {
    #[default]
    Idle,
    Wait {
        row: usize,
        column: usize,
        started: u64,
        timeout: u16,
        code: u16,
    },
}

impl TapHold {
    pub(crate) fn start(&mut self, row: usize, column: usize, code: u16, now: u64, timeout: u16) {
        debug_assert!(matches!(self, Idle));
        *self = Wait {
            row,
            column,
            started: now,
            timeout,
            code,
        };
    }

    pub(crate) fn is_waiting(&self) -> bool {
        matches!(self, Wait { .. })
    }

    pub(crate) fn wait_until(&self) -> u64 {
        match self {
            Wait {
                started, timeout, ..
            } => started.saturating_add(*timeout as u64),
            Idle => u64::MAX,
        }
    }

    /// Decide the pending key for the event `scan_key` arriving at `now`. Key-ups of other
    /// positions leave it undecided.
    pub(crate) fn key_switch(&mut self, scan_key: ScanKey, now: u64) -> Resolution {
        let Wait { row, column, .. } = *self else {
            return Resolution::Undecided;
        };
        if now >= self.wait_until() {
            return self.resolve(false);
        }
        if scan_key.row() == row && scan_key.column() == column {
            if scan_key.is_down() {
                Resolution::Undecided
            } else {
                self.resolve(true)
            }
        } else if scan_key.is_down() {
            self.resolve(false)
        } else {
            Resolution::Undecided
        }
    }

    pub(crate) fn timer_expired(&mut self, now: u64) -> Resolution {
        if self.is_waiting() && now >= self.wait_until() {
            self.resolve(false)
        } else {
            Resolution::Undecided
        }
    }

    fn resolve(&mut self, tap: bool) -> Resolution {
        let Wait {
            row, column, code, ..
        } = *self
        else {
            return Resolution::Undecided;
        };
        *self = Idle;
        let (layer, tap_code) = key_range::layer_tap_parts(code);
        if tap {
            Resolution::Tap {
                row,
                column,
                tap: tap_code,
            }
        } else {
            Resolution::Hold { row, column, layer }
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Idle;
    }
}

#[cfg(test)]
#[path = "tap_hold_test.rs"]
mod test;
