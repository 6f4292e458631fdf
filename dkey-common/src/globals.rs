/// Index of the initial [crate::unicode_mode::UnicodeMode].
pub const UNICODE_MODE: u16 = 0;
/// Index of the [crate::unicode_mode::ModeSelection] cycled by `uc_next` / `uc_prev`.
pub const UNICODE_MODES: u16 = 1;
/// Index of the layer-tap hold timeout in milliseconds.
pub const TAP_HOLD_TIMEOUT: u16 = 2;

pub const GLOBALS_COUNT: usize = 3;

pub const DEFAULT_TAP_HOLD_TIMEOUT: u16 = 200;
