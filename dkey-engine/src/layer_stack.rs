pub const LAYER_STACK_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerState {
    Inactive,
    Held,
    ArmedOneShot,
    ToggledOn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerError {
    StackFull,
    NotHeld(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    layer: u16,
    state: LayerState,
}

/// Activated layers in push order. The base layer 0 is implicit and never stored.
#[derive(Default)]
pub struct LayerStack {
    entries: heapless::Vec<Entry, LAYER_STACK_SIZE>,
}

impl LayerStack {
    /// The most recently pushed layer, or the base layer when nothing is active.
    pub fn active_layer(&self) -> u16 {
        self.entries.last().map(|e| e.layer).unwrap_or(0)
    }

    /// State of the most recent activation of `layer`.
    pub fn state(&self, layer: u16) -> LayerState {
        self.entries
            .iter()
            .rfind(|e| e.layer == layer)
            .map(|e| e.state)
            .unwrap_or(LayerState::Inactive)
    }

    pub fn momentary_down(&mut self, layer: u16) -> Result<(), LayerError> {
        self.push(layer, LayerState::Held)
    }

    /// Remove the most recent held activation of `layer` wherever it sits in the stack.
    pub fn momentary_up(&mut self, layer: u16) -> Result<(), LayerError> {
        if self.remove_last(|e| e.layer == layer && e.state == LayerState::Held) {
            Ok(())
        } else {
            Err(LayerError::NotHeld(layer))
        }
    }

    /// Arm `layer` for the next output key. Returns false, doing nothing, if `layer` is already
    /// active in any way.
    pub fn oneshot_down(&mut self, layer: u16) -> Result<bool, LayerError> {
        if self.state(layer) != LayerState::Inactive {
            return Ok(false);
        }
        self.push(layer, LayerState::ArmedOneShot)?;
        Ok(true)
    }

    /// Pop every armed one-shot. Returns true if any were armed.
    pub fn consume_oneshot(&mut self) -> bool {
        let len = self.entries.len();
        self.entries.retain(|e| e.state != LayerState::ArmedOneShot);
        len != self.entries.len()
    }

    /// Flip `layer` between inactive and toggled on. A layer that is held or armed is left alone.
    pub fn toggle_down(&mut self, layer: u16) -> Result<(), LayerError> {
        match self.state(layer) {
            LayerState::Inactive => self.push(layer, LayerState::ToggledOn),
            LayerState::ToggledOn => {
                self.remove_last(|e| e.layer == layer && e.state == LayerState::ToggledOn);
                Ok(())
            }
            LayerState::Held | LayerState::ArmedOneShot => Ok(()),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, layer: u16, state: LayerState) -> Result<(), LayerError> {
        self.entries
            .push(Entry { layer, state })
            .map_err(|_| LayerError::StackFull)
    }

    fn remove_last(&mut self, f: impl Fn(&Entry) -> bool) -> bool {
        if let Some(i) = self.entries.iter().rposition(f) {
            self.entries.remove(i);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[path = "layer_stack_test.rs"]
mod test;
