use heapless::FnvIndexMap;

pub const MAX_OVERRIDES: usize = 256;

/// The pair of codes a key produces on the override's layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Override {
    pub unshifted: u16,
    pub shifted: u16,
}

impl Override {
    pub fn new(unshifted: u16, shifted: u16) -> Self {
        Self { unshifted, shifted }
    }

    pub fn select(&self, shift_held: bool) -> u16 {
        if shift_held {
            self.shifted
        } else {
            self.unshifted
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverrideError {
    DuplicateOverride { layer: u16, keycode: u16 },
    TableFull,
}

impl core::fmt::Display for OverrideError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OverrideError::DuplicateOverride { layer, keycode } => write!(
                f,
                "duplicate override for keycode {:#x} on layer {}",
                keycode, layer
            ),
            OverrideError::TableFull => write!(f, "override table full"),
        }
    }
}

#[derive(Default)]
pub struct OverrideTable {
    map: FnvIndexMap<u32, Override, MAX_OVERRIDES>,
}

fn key(layer: u16, keycode: u16) -> u32 {
    (layer as u32) << 16 | keycode as u32
}

impl OverrideTable {
    pub fn register(
        &mut self,
        layer: u16,
        keycode: u16,
        unshifted: u16,
        shifted: u16,
    ) -> Result<(), OverrideError> {
        let k = key(layer, keycode);
        if self.map.contains_key(&k) {
            return Err(OverrideError::DuplicateOverride { layer, keycode });
        }
        self.map
            .insert(k, Override::new(unshifted, shifted))
            .map_err(|_| OverrideError::TableFull)?;
        Ok(())
    }

    /// The override for `keycode` scoped to `active_layer`. Overrides scoped to any other layer are
    /// inert.
    pub fn resolve(&self, active_layer: u16, keycode: u16) -> Option<&Override> {
        self.map.get(&key(active_layer, keycode))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Override)> {
        self.map
            .iter()
            .map(|(k, o)| ((*k >> 16) as u16, *k as u16, o))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
#[path = "overrides_test.rs"]
mod test;
