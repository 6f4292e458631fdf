use dkey_common::unicode_mode::UnicodeMode;
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Reports were lost; the host has been told to release everything.
    Overflow,
    Disconnected,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportError::Overflow => write!(f, "report buffer overflow"),
            TransportError::Disconnected => write!(f, "host disconnected"),
        }
    }
}

/// The host side of the engine. Implementations turn these calls into HID reports.
pub trait HostTransport {
    /// Press or release a key code. Codes in the shifted range are sent with shift.
    fn keystroke(&mut self, code: u16, is_down: bool) -> Result<(), TransportError>;

    /// Replace the modifier byte sent to the host.
    fn modifiers(&mut self, bits: u8) -> Result<(), TransportError>;

    /// Type one Unicode scalar using the current input mode.
    fn unicode(&mut self, scalar: u32) -> Result<(), TransportError>;

    fn unicode_mode(&mut self, _mode: UnicodeMode) -> Result<(), TransportError> {
        Ok(())
    }

    /// Release everything on the host.
    fn clear(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    Key(u16, bool),
    Modifiers(u8),
    Unicode(u32),
    UnicodeMode(UnicodeMode),
    Clear,
}

/// Bounded queue of [KeyEvent]s for a USB report task to drain.
pub struct ReportChannel<M: RawMutex, const N: usize>(Channel<M, KeyEvent, N>);

impl<M: RawMutex, const N: usize> Default for ReportChannel<M, N> {
    fn default() -> Self {
        Self(Channel::new())
    }
}

impl<M: RawMutex, const N: usize> ReportChannel<M, N> {
    pub async fn receive(&self) -> KeyEvent {
        self.0.receive().await
    }

    pub fn try_receive(&self) -> Option<KeyEvent> {
        self.0.try_receive().ok()
    }

    pub fn report(&self, message: KeyEvent) -> Result<(), TransportError> {
        if self.0.try_send(message).is_err() {
            crate::warn!("report buffer full; clearing");
            self.clear_reports();
            let _ = self.0.try_send(KeyEvent::Clear);
            return Err(TransportError::Overflow);
        }
        Ok(())
    }

    fn clear_reports(&self) {
        self.0.clear();
    }
}

impl<M: RawMutex, const N: usize> HostTransport for &ReportChannel<M, N> {
    fn keystroke(&mut self, code: u16, is_down: bool) -> Result<(), TransportError> {
        self.report(KeyEvent::Key(code, is_down))
    }

    fn modifiers(&mut self, bits: u8) -> Result<(), TransportError> {
        self.report(KeyEvent::Modifiers(bits))
    }

    fn unicode(&mut self, scalar: u32) -> Result<(), TransportError> {
        self.report(KeyEvent::Unicode(scalar))
    }

    fn unicode_mode(&mut self, mode: UnicodeMode) -> Result<(), TransportError> {
        self.report(KeyEvent::UnicodeMode(mode))
    }

    fn clear(&mut self) {
        self.clear_reports();
        let _ = self.report(KeyEvent::Clear);
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod test;
