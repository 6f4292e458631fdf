use core::{
    mem,
    ops::{Deref, DerefMut},
};

use dkey_common::{
    keycodes::key_range,
    unicode_mode::{HostOs, UnicodeMode},
};
use embassy_futures::select::{select, Either};
use embassy_sync::{
    blocking_mutex::raw::{NoopRawMutex, RawMutex},
    signal::Signal,
};

use crate::{
    indicators::{self, Leds},
    keymap::{Keymap, LoadError},
    layer_stack::{LayerError, LayerStack},
    modifiers::Modifiers,
    report::HostTransport,
    scan::{ScanChannel, ScanKey},
    tap_hold::{Resolution, TapHold},
};

/// The outcome of one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// A modifier key changed state; holds the new modifier byte.
    UpdateModifiers(u8),
    NoEmit,
    EmitKeystroke(u16, bool),
    /// A layer-tap key released before its timeout; the key was pressed and released.
    EmitTap(u16),
    EmitUnicode(u32),
    /// The Unicode symbol was missing from the table so nothing was sent.
    Dropped,
    /// The event did not fit the current key state and was discarded.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComposeError {
    InvalidEventSequence { row: usize, column: usize },
    OutOfMatrix { row: usize, column: usize },
    UnknownSymbol(u16),
    Layer(LayerError),
}

impl core::fmt::Display for ComposeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ComposeError::InvalidEventSequence { row, column } => {
                write!(f, "invalid event sequence at {},{}", row, column)
            }
            ComposeError::OutOfMatrix { row, column } => {
                write!(f, "key {},{} is outside the matrix", row, column)
            }
            ComposeError::UnknownSymbol(code) => write!(f, "unknown unicode symbol {:#x}", code),
            ComposeError::Layer(LayerError::StackFull) => write!(f, "layer stack full"),
            ComposeError::Layer(LayerError::NotHeld(n)) => write!(f, "layer {} is not held", n),
        }
    }
}

/// What a position did on key-down; the key-up undoes exactly this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pressed {
    Released,
    Inert,
    Modifier(u16),
    Layer(u16),
    Keystroke(u16),
    TapHold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMessage {
    ClearAll,
    TimerExpired,
    Exit,
}

#[derive(Default)]
pub struct ControlSignal(Signal<NoopRawMutex, ControlMessage>);
impl ControlSignal {
    pub fn clear_all(&self) {
        self.0.signal(ControlMessage::ClearAll);
    }

    pub fn timer_expired(&self) {
        self.0.signal(ControlMessage::TimerExpired);
    }

    pub fn exit(&self) {
        self.0.signal(ControlMessage::Exit);
    }

    pub async fn wait(&self) -> ControlMessage {
        self.0.wait().await
    }
}

/// Clears the host modifiers for as long as it lives. Dropping it sends the saved modifiers
/// again, so they come back however the emission in between ends.
struct ModifierSuspension<'t, T: HostTransport> {
    transport: &'t mut T,
    saved: u8,
}

impl<'t, T: HostTransport> ModifierSuspension<'t, T> {
    fn new(transport: &'t mut T, saved: u8) -> Self {
        if saved != 0 {
            if let Err(err) = transport.modifiers(0) {
                crate::warn!("clear modifiers failed: {:?}", err);
            }
        }
        Self { transport, saved }
    }
}

impl<T: HostTransport> Deref for ModifierSuspension<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: HostTransport> DerefMut for ModifierSuspension<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: HostTransport> Drop for ModifierSuspension<'_, T> {
    fn drop(&mut self) {
        if self.saved != 0 {
            if let Err(err) = self.transport.modifiers(self.saved) {
                crate::error!("restore modifiers failed: {:?}", err);
            }
        }
    }
}

/// Turns matrix key events into keystrokes and Unicode emissions using a loaded [Keymap].
///
/// The composer owns all mutable key state: the layer stack, the held modifiers and what each
/// pressed position did on key-down.
pub struct Composer<
    const ROWS: usize,
    const COLS: usize,
    const LAYOUT_MAX: usize,
    T: HostTransport,
> {
    keymap: Keymap<ROWS, COLS, LAYOUT_MAX>,
    layers: LayerStack,
    modifiers: Modifiers,
    pressed: [[Pressed; COLS]; ROWS],
    tap_hold: TapHold,
    now: u64,
    unicode_mode: UnicodeMode,
    transport: T,
}

impl<const ROWS: usize, const COLS: usize, const LAYOUT_MAX: usize, T: HostTransport>
    Composer<ROWS, COLS, LAYOUT_MAX, T>
{
    pub fn new(transport: T) -> Self {
        Self {
            keymap: Keymap::default(),
            layers: LayerStack::default(),
            modifiers: Modifiers::default(),
            pressed: [[Pressed::Released; COLS]; ROWS],
            tap_hold: TapHold::default(),
            now: 0,
            unicode_mode: UnicodeMode::Linux,
            transport,
        }
    }

    /// Replace the keymap. All held state is released first; on error the composer is left
    /// with an empty keymap.
    pub fn load_keymap(&mut self, iter: impl IntoIterator<Item = u16>) -> Result<(), LoadError> {
        self.clear_all();
        self.keymap.load(iter)?;
        self.set_unicode_mode(self.keymap.unicode_mode());
        Ok(())
    }

    pub fn host_detected(&mut self, host: HostOs) {
        crate::debug!("host detected {:?}", host);
        self.set_unicode_mode(UnicodeMode::for_host(host));
    }

    pub fn keymap(&self) -> &Keymap<ROWS, COLS, LAYOUT_MAX> {
        &self.keymap
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn active_layer(&self) -> u16 {
        self.layers.active_layer()
    }

    pub fn modifier_bits(&self) -> u8 {
        self.modifiers.bits()
    }

    pub fn unicode_mode(&self) -> UnicodeMode {
        self.unicode_mode
    }

    pub fn leds(&self) -> Leds {
        indicators::layer_leds(self.active_layer()).union(indicators::mode_leds(self.unicode_mode))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Forget every pressed key, layer and modifier and tell the host to release everything.
    pub fn clear_all(&mut self) {
        self.pressed = [[Pressed::Released; COLS]; ROWS];
        self.tap_hold.clear();
        self.layers.clear();
        self.modifiers.clear();
        self.transport.clear();
    }

    /// Handle key events and control messages until [ControlMessage::Exit]. `clock` returns
    /// the current time in milliseconds. Signal [ControlSignal::timer_expired] at
    /// [Self::wait_until] to decide a held layer-tap key before the next key event.
    pub async fn run<M: RawMutex, const N: usize>(
        &mut self,
        scan_channel: &ScanChannel<M, N>,
        control: &ControlSignal,
        clock: impl Fn() -> u64,
    ) -> ControlMessage {
        loop {
            let event = select(scan_channel.receive(), control.wait()).await;
            let now = clock();
            match event {
                Either::First(scan_key) => {
                    self.handle_at(scan_key, now);
                }
                Either::Second(ControlMessage::TimerExpired) => self.check_time(now),
                Either::Second(ControlMessage::ClearAll) => self.clear_all(),
                Either::Second(ControlMessage::Exit) => return ControlMessage::Exit,
            }
        }
    }

    /// When a pending layer-tap key turns into a hold, or `u64::MAX` if none is pending.
    pub fn wait_until(&self) -> u64 {
        self.tap_hold.wait_until()
    }

    /// Decide a pending layer-tap key whose timeout has passed at `now`.
    pub fn check_time(&mut self, now: u64) {
        self.now = now;
        if let Resolution::Hold { row, column, layer } = self.tap_hold.timer_expired(now) {
            if let Err(err) = self.hold(row, column, layer) {
                crate::warn!("layer-tap hold failed: {:?}", err);
            }
        }
    }

    /// [Self::handle] for an event that happened at `now` milliseconds.
    pub fn handle_at(&mut self, scan_key: ScanKey, now: u64) -> Action {
        self.now = now;
        self.handle(scan_key)
    }

    /// Process one debounced key event. Errors are logged here and never stop the composer.
    pub fn handle(&mut self, scan_key: ScanKey) -> Action {
        match self.try_handle(scan_key) {
            Ok(action) => action,
            Err(ComposeError::UnknownSymbol(code)) => {
                crate::error!("unknown unicode symbol {}; keystroke dropped", code);
                Action::Dropped
            }
            Err(err) => {
                crate::warn!("ignored {:?}: {:?}", scan_key, err);
                Action::Ignored
            }
        }
    }

    fn try_handle(&mut self, scan_key: ScanKey) -> Result<Action, ComposeError> {
        let (row, column) = (scan_key.row(), scan_key.column());
        if row >= ROWS || column >= COLS {
            return Err(ComposeError::OutOfMatrix { row, column });
        }
        match self.tap_hold.key_switch(scan_key, self.now) {
            Resolution::Undecided => {}
            Resolution::Tap { row, column, tap } => return Ok(self.tap(row, column, tap)),
            Resolution::Hold { row, column, layer } => self.hold(row, column, layer)?,
        }
        if scan_key.is_down() {
            self.key_down(row, column)
        } else {
            self.key_up(row, column)
        }
    }

    fn key_down(&mut self, row: usize, column: usize) -> Result<Action, ComposeError> {
        if self.pressed[row][column] != Pressed::Released {
            return Err(ComposeError::InvalidEventSequence { row, column });
        }
        self.pressed[row][column] = Pressed::Inert;

        let active = self.layers.active_layer();
        let code = self.keymap.find_code(active, row, column);

        if key_range::is_modifier(code) {
            return Ok(self.modifier_down(row, column, code));
        }

        let code = match self.keymap.overrides().resolve(active, code) {
            Some(o) => o.select(self.modifiers.shift_held()),
            None => code,
        };

        match code {
            key_range::TRANSPARENT => Ok(Action::NoEmit),
            c if key_range::is_modifier(c) => Ok(self.modifier_down(row, column, c)),
            c if key_range::is_layer(c) => {
                self.layer_down(c)?;
                self.pressed[row][column] = Pressed::Layer(c);
                Ok(Action::NoEmit)
            }
            c if key_range::is_layer_tap(c) => {
                self.pressed[row][column] = Pressed::TapHold;
                let timeout = self.keymap.tap_hold_timeout();
                self.tap_hold.start(row, column, c, self.now, timeout);
                Ok(Action::NoEmit)
            }
            key_range::CMD_UNICODE_MODE_NEXT => {
                let mode = self.keymap.unicode_modes().next(self.unicode_mode);
                self.set_unicode_mode(mode);
                Ok(Action::NoEmit)
            }
            key_range::CMD_UNICODE_MODE_PREV => {
                let mode = self.keymap.unicode_modes().prev(self.unicode_mode);
                self.set_unicode_mode(mode);
                Ok(Action::NoEmit)
            }
            c if key_range::is_unicode(c) => {
                let result = self.emit_unicode(c);
                self.layers.consume_oneshot();
                result
            }
            c if key_range::is_keystroke(c) => {
                self.pressed[row][column] = Pressed::Keystroke(c);
                self.report_keystroke(c, true);
                self.layers.consume_oneshot();
                Ok(Action::EmitKeystroke(c, true))
            }
            c => {
                crate::debug!("no action for code {}", c);
                Ok(Action::NoEmit)
            }
        }
    }

    fn key_up(&mut self, row: usize, column: usize) -> Result<Action, ComposeError> {
        match mem::replace(&mut self.pressed[row][column], Pressed::Released) {
            Pressed::Released => Err(ComposeError::InvalidEventSequence { row, column }),
            Pressed::Inert | Pressed::TapHold => Ok(Action::NoEmit),
            Pressed::Modifier(code) => {
                let changed = self
                    .modifiers
                    .release(code)
                    .map_err(|_| ComposeError::InvalidEventSequence { row, column })?;
                Ok(self.modifiers_changed(changed))
            }
            Pressed::Layer(code) => {
                if key_range::base_code(code) == key_range::LAYER {
                    self.layers
                        .momentary_up(code - key_range::LAYER)
                        .map_err(ComposeError::Layer)?;
                }
                Ok(Action::NoEmit)
            }
            Pressed::Keystroke(code) => {
                self.report_keystroke(code, false);
                Ok(Action::EmitKeystroke(code, false))
            }
        }
    }

    fn modifier_down(&mut self, row: usize, column: usize, code: u16) -> Action {
        self.pressed[row][column] = Pressed::Modifier(code);
        let changed = self.modifiers.press(code);
        self.modifiers_changed(changed)
    }

    fn layer_down(&mut self, code: u16) -> Result<(), ComposeError> {
        let base = key_range::base_code(code);
        let layer = code - base;
        match base {
            key_range::LAYER => self.layers.momentary_down(layer),
            key_range::TOGGLE => self.layers.toggle_down(layer),
            _ => self.layers.oneshot_down(layer).map(|_| ()),
        }
        .map_err(ComposeError::Layer)
    }

    fn tap(&mut self, row: usize, column: usize, tap: u16) -> Action {
        self.pressed[row][column] = Pressed::Released;
        self.report_keystroke(tap, true);
        self.report_keystroke(tap, false);
        self.layers.consume_oneshot();
        Action::EmitTap(tap)
    }

    fn hold(&mut self, row: usize, column: usize, layer: u16) -> Result<(), ComposeError> {
        self.layers
            .momentary_down(layer)
            .map_err(ComposeError::Layer)?;
        self.pressed[row][column] = Pressed::Layer(key_range::LAYER + layer);
        Ok(())
    }

    fn emit_unicode(&mut self, code: u16) -> Result<Action, ComposeError> {
        let scalar = self
            .keymap
            .symbols()
            .lookup_code(code)
            .map_err(|_| ComposeError::UnknownSymbol(code))?;

        let mut transport = ModifierSuspension::new(&mut self.transport, self.modifiers.bits());
        if let Err(err) = transport.unicode(scalar) {
            crate::warn!("unicode {} not sent: {:?}", scalar, err);
        }
        Ok(Action::EmitUnicode(scalar))
    }

    fn modifiers_changed(&mut self, changed: bool) -> Action {
        let bits = self.modifiers.bits();
        if changed {
            if let Err(err) = self.transport.modifiers(bits) {
                crate::warn!("modifiers not sent: {:?}", err);
            }
        }
        Action::UpdateModifiers(bits)
    }

    fn report_keystroke(&mut self, code: u16, is_down: bool) {
        if let Err(err) = self.transport.keystroke(code, is_down) {
            crate::warn!("keystroke {} not sent: {:?}", code, err);
        }
    }

    fn set_unicode_mode(&mut self, mode: UnicodeMode) {
        crate::info!("unicode mode {}", mode.name());
        self.unicode_mode = mode;
        if let Err(err) = self.transport.unicode_mode(mode) {
            crate::warn!("unicode mode not sent: {:?}", err);
        }
    }
}

#[cfg(test)]
#[path = "composer_test.rs"]
mod test;
