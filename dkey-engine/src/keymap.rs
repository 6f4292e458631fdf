use core::cmp::Ordering;

use dkey_common::{
    globals,
    keycodes::key_range,
    u32_from_u16,
    unicode_mode::{ModeSelection, UnicodeMode},
    PROTOCOL_VERSION,
};

use crate::{
    overrides::{OverrideError, OverrideTable},
    unicode::{SymbolError, UnicodeTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    OutOfSpace,
    VersionMismatch,
    RowColMismatch,
    Corrupt,
    UnknownSymbol(u16),
    UnknownLayer(u16),
    InvalidScalar(u32),
    DuplicateOverride { layer: u16, keycode: u16 },
}

impl core::fmt::Display for LoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LoadError::OutOfSpace => write!(f, "keymap does not fit"),
            LoadError::VersionMismatch => write!(f, "keymap protocol version mismatch"),
            LoadError::RowColMismatch => write!(f, "keymap matrix size mismatch"),
            LoadError::Corrupt => write!(f, "keymap is corrupt"),
            LoadError::UnknownSymbol(id) => write!(f, "unknown unicode symbol {}", id),
            LoadError::UnknownLayer(n) => write!(f, "unknown layer {}", n),
            LoadError::InvalidScalar(n) => write!(f, "{:#x} is not a unicode scalar value", n),
            LoadError::DuplicateOverride { layer, keycode } => write!(
                f,
                "duplicate override for keycode {:#x} on layer {}",
                keycode, layer
            ),
        }
    }
}

/// A loaded keymap: layers, the Unicode symbol table, layer-scoped overrides and global
/// settings.
pub struct Keymap<const ROWS: usize, const COLS: usize, const LAYOUT_MAX: usize> {
    mapping: [u16; LAYOUT_MAX],
    layer_count: usize,
    symbols: UnicodeTable,
    overrides: OverrideTable,
    unicode_mode: UnicodeMode,
    unicode_modes: ModeSelection,
    tap_hold_timeout: u16,
}

#[derive(Debug)]
pub struct Layer<'l, const ROWS: usize, const COLS: usize>(&'l [u16]);

impl<const ROWS: usize, const COLS: usize> Layer<'_, ROWS, COLS> {
    pub fn get(&self, row: usize, column: usize) -> u16 {
        if self.is_dense() {
            *self.0.get(row * COLS + column).unwrap_or(&0u16)
        } else {
            search_code(self.0, row, column)
        }
    }

    fn is_dense(&self) -> bool {
        self.0.len() == ROWS * COLS
    }

    fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        let step = if self.is_dense() { 1 } else { 2 };
        self.0.iter().skip(step - 1).step_by(step).copied()
    }
}

impl<const ROWS: usize, const COLS: usize, const LAYOUT_MAX: usize> Default
    for Keymap<ROWS, COLS, LAYOUT_MAX>
{
    fn default() -> Self {
        Self {
            mapping: [0; LAYOUT_MAX],
            layer_count: 0,
            symbols: Default::default(),
            overrides: Default::default(),
            unicode_mode: UnicodeMode::Linux,
            unicode_modes: Default::default(),
            tap_hold_timeout: globals::DEFAULT_TAP_HOLD_TIMEOUT,
        }
    }
}

fn next(iter: &mut impl Iterator<Item = u16>) -> Result<u16, LoadError> {
    iter.next().ok_or(LoadError::Corrupt)
}

impl<const ROWS: usize, const COLS: usize, const LAYOUT_MAX: usize>
    Keymap<ROWS, COLS, LAYOUT_MAX>
{
    /// Load a compiled keymap. The format is as follows:
    ///
    /// protocol version
    /// row_count (high byte), column_count (low byte) should match `ROWS` and `COLS`
    /// layer count, symbol count, override count, globals word count
    /// globals as (index, value) pairs
    /// layer positions (layer count + 1), layers
    /// symbols as (low, high) words of the scalar
    /// overrides as (layer, keycode, unshifted, shifted)
    ///
    /// Layer positions mark the index in codes where the layers start.
    /// Layers are dense if every entry has a value; size == ROWS * COLS
    /// Layers are sparse if size < ROWS * COLS in which case it is a list of ordered tuples where
    /// the first byte is the row, second is the column and the next word is the value
    ///
    /// Every symbol and layer referenced by a layer or override must exist. On error the keymap
    /// is left empty.
    pub fn load(&mut self, iter: impl IntoIterator<Item = u16>) -> Result<(), LoadError> {
        self.clear();
        let result = self.read(&mut iter.into_iter());
        if let Err(err) = &result {
            crate::error!("keymap load failed: {:?}", err);
            self.clear();
        }
        result
    }

    fn read(&mut self, iter: &mut impl Iterator<Item = u16>) -> Result<(), LoadError> {
        if next(iter)? != PROTOCOL_VERSION {
            return Err(LoadError::VersionMismatch);
        }
        {
            let n = next(iter)?;
            if (n >> 8) as usize != ROWS || (n & 0xff) as usize != COLS {
                return Err(LoadError::RowColMismatch);
            }
        }

        let layer_count = next(iter)? as usize;
        let symbol_count = next(iter)?;
        let override_count = next(iter)?;
        let mut globals_count = next(iter)?;

        if layer_count == 0 || layer_count > key_range::MAX_LAYER_N as usize + 1 {
            crate::error!("corrupt keymap: layer_count {} is out-of-range", layer_count);
            return Err(LoadError::Corrupt);
        }

        while globals_count != 0 {
            if globals_count < 2 {
                crate::error!("corrupt keymap: globals_count is wrong");
                return Err(LoadError::Corrupt);
            }
            globals_count -= 2;
            let i = next(iter)?;
            let v = next(iter)?;
            match i {
                globals::UNICODE_MODE => {
                    self.unicode_mode = UnicodeMode::from_u16(v).ok_or(LoadError::Corrupt)?;
                }
                globals::UNICODE_MODES => {
                    self.unicode_modes = ModeSelection::deserialize(v).ok_or(LoadError::Corrupt)?;
                }
                globals::TAP_HOLD_TIMEOUT => self.tap_hold_timeout = v,
                _ => return Err(LoadError::Corrupt),
            }
        }

        self.read_layers(iter, layer_count)?;

        for _ in 0..symbol_count {
            let lo = next(iter)?;
            let hi = next(iter)?;
            self.symbols
                .register(u32_from_u16(lo, hi))
                .map_err(|err| match err {
                    SymbolError::InvalidScalar(n) => LoadError::InvalidScalar(n),
                    SymbolError::TableFull => LoadError::OutOfSpace,
                })?;
        }

        for n in 0..layer_count as u16 {
            if let Some(layer) = self.layer(n) {
                for code in layer.codes() {
                    self.check_code(code)?;
                }
            }
        }

        for _ in 0..override_count {
            let layer = next(iter)?;
            let keycode = next(iter)?;
            let unshifted = next(iter)?;
            let shifted = next(iter)?;
            if layer as usize >= self.layer_count {
                return Err(LoadError::UnknownLayer(layer));
            }
            self.check_code(keycode)?;
            self.check_code(unshifted)?;
            self.check_code(shifted)?;
            self.overrides
                .register(layer, keycode, unshifted, shifted)
                .map_err(|err| match err {
                    OverrideError::DuplicateOverride { layer, keycode } => {
                        LoadError::DuplicateOverride { layer, keycode }
                    }
                    OverrideError::TableFull => LoadError::OutOfSpace,
                })?;
        }

        if iter.next().is_some() {
            crate::error!("corrupt keymap: trailing data");
            return Err(LoadError::Corrupt);
        }

        Ok(())
    }

    fn read_layers(
        &mut self,
        iter: &mut impl Iterator<Item = u16>,
        layer_count: usize,
    ) -> Result<(), LoadError> {
        let dir_len = layer_count + 1;
        if dir_len > LAYOUT_MAX {
            return Err(LoadError::OutOfSpace);
        }

        let mut p = dir_len;
        for i in 0..dir_len {
            let n = next(iter)? as usize;
            if (i == 0 && n != dir_len) || n < p {
                crate::error!("corrupt keymap: layer {} index is invalid", i);
                return Err(LoadError::Corrupt);
            }
            if n > LAYOUT_MAX {
                crate::error!("keymap too big: LAYOUT_MAX is {}", LAYOUT_MAX);
                return Err(LoadError::OutOfSpace);
            }
            self.mapping[i] = n as u16;
            p = n;
        }

        for t in self.mapping[dir_len..p].iter_mut() {
            *t = next(iter)?;
        }

        self.layer_count = layer_count;

        for n in 0..layer_count {
            let layer = &self.mapping[self.mapping[n] as usize..self.mapping[n + 1] as usize];
            if layer.len() != ROWS * COLS && !valid_sparse::<ROWS, COLS>(layer) {
                crate::error!("corrupt keymap: layer {} is malformed", n);
                return Err(LoadError::Corrupt);
            }
        }

        Ok(())
    }

    fn check_code(&self, code: u16) -> Result<(), LoadError> {
        if key_range::is_unicode(code) {
            self.symbols
                .lookup_code(code)
                .map_err(|err| LoadError::UnknownSymbol(err.0))?;
        } else if key_range::is_layer(code) {
            let n = code - key_range::base_code(code);
            if n as usize >= self.layer_count {
                return Err(LoadError::UnknownLayer(n));
            }
        } else if key_range::is_layer_tap(code) {
            let (n, _) = key_range::layer_tap_parts(code);
            if n as usize >= self.layer_count {
                return Err(LoadError::UnknownLayer(n));
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.layer_count = 0;
        self.symbols.clear();
        self.overrides.clear();
        self.unicode_mode = UnicodeMode::Linux;
        self.unicode_modes = Default::default();
        self.tap_hold_timeout = globals::DEFAULT_TAP_HOLD_TIMEOUT;
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    pub fn layer(&self, layer_num: u16) -> Option<Layer<'_, ROWS, COLS>> {
        let idx = layer_num as usize;
        if idx >= self.layer_count {
            return None;
        }
        let s = self.mapping[idx] as usize;
        let e = self.mapping[idx + 1] as usize;
        self.mapping.get(s..e).map(Layer)
    }

    /// The code bound to a position on `layer`, or [key_range::TRANSPARENT].
    pub fn code(&self, layer: u16, row: usize, column: usize) -> u16 {
        self.layer(layer)
            .map(|l| l.get(row, column))
            .unwrap_or(key_range::TRANSPARENT)
    }

    /// The code for a position when `active` is the resolved layer. Transparent positions fall
    /// through to the base layer.
    pub fn find_code(&self, active: u16, row: usize, column: usize) -> u16 {
        match self.code(active, row, column) {
            key_range::TRANSPARENT if active != 0 => self.code(0, row, column),
            code => code,
        }
    }

    pub fn symbols(&self) -> &UnicodeTable {
        &self.symbols
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn unicode_mode(&self) -> UnicodeMode {
        self.unicode_mode
    }

    pub fn unicode_modes(&self) -> &ModeSelection {
        &self.unicode_modes
    }

    /// Milliseconds a layer-tap key must be held to act as its layer.
    pub fn tap_hold_timeout(&self) -> u16 {
        self.tap_hold_timeout
    }

    #[cfg(test)]
    pub(crate) fn clear_symbols(&mut self) {
        self.symbols.clear();
    }
}

fn valid_sparse<const ROWS: usize, const COLS: usize>(layer: &[u16]) -> bool {
    if layer.len() % 2 != 0 || layer.len() >= ROWS * COLS {
        return false;
    }
    let mut prev = None;
    for pair in layer.chunks_exact(2) {
        let pos = pair[0];
        if (pos >> 8) as usize >= ROWS || (pos & 0xff) as usize >= COLS {
            return false;
        }
        if prev.is_some_and(|p| p >= pos) {
            return false;
        }
        prev = Some(pos);
    }
    true
}

fn search_code(codes: &[u16], row: usize, column: usize) -> u16 {
    let pos = (row as u16) << 8 | (column as u16);
    let (mut lo, mut hi) = (0, codes.len() / 2);
    while lo < hi {
        let mid = (lo + hi) / 2;
        match codes[mid * 2].cmp(&pos) {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => return codes[mid * 2 + 1],
        }
    }
    key_range::TRANSPARENT
}

#[cfg(test)]
#[path = "keymap_test.rs"]
mod test;
