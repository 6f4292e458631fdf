pub mod key_range {
    pub const MAX_LAYER_N: u16 = 0xff;

    pub const TRANSPARENT: u16 = 0;

    pub const LAYER: u16 = 0x600;
    pub const TOGGLE: u16 = 0x700;
    pub const ONESHOT: u16 = 0x900;
    pub const LAYERS_LAST: u16 = ONESHOT + MAX_LAYER_N;

    pub const BASIC_MIN: u16 = 0x4;
    pub const BASIC_A: u16 = 0x4;
    pub const BASIC_1: u16 = 0x1e;
    pub const BASIC_0: u16 = 0x27;
    pub const BASIC_MAX: u16 = 0xff;
    pub const MODIFIER_MIN: u16 = 0xe0;
    pub const MODIFIER_MAX: u16 = 0xe7;

    /// A basic key sent with shift held: `SHIFTED | usage`.
    pub const SHIFTED: u16 = 0x100;
    pub const SHIFTED_MIN: u16 = SHIFTED + BASIC_MIN;
    pub const SHIFTED_MAX: u16 = SHIFTED + BASIC_MAX;

    pub const LAYER_MIN: u16 = LAYER;
    pub const LAYER_MAX: u16 = LAYER_MIN + MAX_LAYER_N;
    pub const TOGGLE_MIN: u16 = TOGGLE;
    pub const TOGGLE_MAX: u16 = TOGGLE_MIN + MAX_LAYER_N;
    pub const ONESHOT_MIN: u16 = ONESHOT;
    pub const ONESHOT_MAX: u16 = ONESHOT_MIN + MAX_LAYER_N;

    pub const UNICODE_MIN: u16 = 0x1000;
    pub const UNICODE_MAX: u16 = 0x1fff;

    pub const COMMAND_MIN: u16 = UNICODE_MAX + 1;
    pub const COMMAND_MAX: u16 = COMMAND_MIN + 0xff;

    pub const CMD_UNICODE_MODE_NEXT: u16 = COMMAND_MIN;
    pub const CMD_UNICODE_MODE_PREV: u16 = COMMAND_MIN + 1;

    /// Tap for a basic key, hold for a momentary layer: `LAYER_TAP | layer << 8 | usage`.
    pub const LAYER_TAP: u16 = 0x3000;
    pub const LAYER_TAP_MIN: u16 = LAYER_TAP;
    pub const LAYER_TAP_MAX: u16 = 0x3fff;
    pub const MAX_LAYER_TAP_LAYER: u16 = 0xf;

    pub fn base_code(code: u16) -> u16 {
        code & 0xff00
    }

    pub fn is_layer(code: u16) -> bool {
        matches!(code, LAYER_MIN..=LAYERS_LAST)
            && matches!(base_code(code), LAYER | TOGGLE | ONESHOT)
    }

    pub fn is_unicode(code: u16) -> bool {
        matches!(code, UNICODE_MIN..=UNICODE_MAX)
    }

    pub fn is_modifier(code: u16) -> bool {
        matches!(code, MODIFIER_MIN..=MODIFIER_MAX)
    }

    pub fn is_layer_tap(code: u16) -> bool {
        matches!(code, LAYER_TAP_MIN..=LAYER_TAP_MAX)
    }

    /// The layer-tap code for `layer` and the basic key `tap`. `None` if the layer is above
    /// [MAX_LAYER_TAP_LAYER] or `tap` is not a plain keystroke.
    pub fn layer_tap(layer: u16, tap: u16) -> Option<u16> {
        if layer > MAX_LAYER_TAP_LAYER || !matches!(tap, BASIC_MIN..=BASIC_MAX) || is_modifier(tap)
        {
            return None;
        }
        Some(LAYER_TAP | layer << 8 | tap)
    }

    /// The `(layer, tap)` pair of a layer-tap code.
    pub fn layer_tap_parts(code: u16) -> (u16, u16) {
        ((code >> 8) & MAX_LAYER_TAP_LAYER, code & 0xff)
    }

    pub fn is_keystroke(code: u16) -> bool {
        matches!(code, BASIC_MIN..=BASIC_MAX | SHIFTED_MIN..=SHIFTED_MAX)
    }

    /// The modifier bit of a modifier usage: `lctrl` is bit 0, `rgui` bit 7.
    pub fn modifier_bit(code: u16) -> u8 {
        1 << (code - MODIFIER_MIN)
    }
}

pub mod modifier_bits {
    pub const LEFT_CTRL: u8 = 0x01;
    pub const LEFT_SHIFT: u8 = 0x02;
    pub const LEFT_ALT: u8 = 0x04;
    pub const LEFT_GUI: u8 = 0x08;
    pub const RIGHT_CTRL: u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT: u8 = 0x40;
    pub const RIGHT_GUI: u8 = 0x80;

    pub const SHIFT: u8 = LEFT_SHIFT | RIGHT_SHIFT;
}

#[cfg(test)]
#[path = "keycodes_test.rs"]
mod test;
