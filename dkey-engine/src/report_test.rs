use embassy_sync::blocking_mutex::raw::NoopRawMutex;

use super::*;

#[test]
fn transport_reports_in_order() {
    let channel = ReportChannel::<NoopRawMutex, 8>::default();
    let mut transport = &channel;

    transport.modifiers(2).unwrap();
    transport.keystroke(0x104, true).unwrap();
    transport.unicode(0x20ac).unwrap();
    transport.unicode_mode(UnicodeMode::MacOs).unwrap();

    assert_eq!(channel.try_receive(), Some(KeyEvent::Modifiers(2)));
    assert_eq!(channel.try_receive(), Some(KeyEvent::Key(0x104, true)));
    assert_eq!(channel.try_receive(), Some(KeyEvent::Unicode(0x20ac)));
    assert_eq!(
        channel.try_receive(),
        Some(KeyEvent::UnicodeMode(UnicodeMode::MacOs))
    );
    assert_eq!(channel.try_receive(), None);
}

#[test]
fn overflow_clears() {
    let channel = ReportChannel::<NoopRawMutex, 2>::default();
    let mut transport = &channel;

    transport.keystroke(4, true).unwrap();
    transport.keystroke(5, true).unwrap();
    assert_eq!(
        transport.keystroke(6, true),
        Err(TransportError::Overflow)
    );

    assert_eq!(channel.try_receive(), Some(KeyEvent::Clear));
    assert_eq!(channel.try_receive(), None);
}

#[test]
fn clear_drops_pending() {
    let channel = ReportChannel::<NoopRawMutex, 4>::default();
    let mut transport = &channel;

    transport.keystroke(4, true).unwrap();
    transport.clear();

    assert_eq!(channel.try_receive(), Some(KeyEvent::Clear));
    assert_eq!(channel.try_receive(), None);
}
