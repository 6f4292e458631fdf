use dkey_common::keycodes::key_range;

pub const MAX_SYMBOLS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownSymbol(pub u16);

impl core::fmt::Display for UnknownSymbol {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown unicode symbol {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SymbolError {
    InvalidScalar(u32),
    TableFull,
}

/// Symbol id to Unicode scalar. Ids are handed out in registration order and never reused until
/// the table is cleared.
#[derive(Default)]
pub struct UnicodeTable {
    scalars: heapless::Vec<u32, MAX_SYMBOLS>,
}

impl UnicodeTable {
    pub fn register(&mut self, scalar: u32) -> Result<u16, SymbolError> {
        if char::from_u32(scalar).is_none() {
            return Err(SymbolError::InvalidScalar(scalar));
        }
        let id = self.scalars.len() as u16;
        self.scalars
            .push(scalar)
            .map_err(|_| SymbolError::TableFull)?;
        Ok(id)
    }

    pub fn lookup(&self, id: u16) -> Result<u32, UnknownSymbol> {
        self.scalars
            .get(id as usize)
            .copied()
            .ok_or(UnknownSymbol(id))
    }

    /// Look up the scalar for a key code in the Unicode range.
    pub fn lookup_code(&self, code: u16) -> Result<u32, UnknownSymbol> {
        if !key_range::is_unicode(code) {
            return Err(UnknownSymbol(code));
        }
        self.lookup(code - key_range::UNICODE_MIN)
    }

    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }

    pub fn clear(&mut self) {
        self.scalars.clear();
    }
}

#[cfg(test)]
#[path = "unicode_test.rs"]
mod test;
