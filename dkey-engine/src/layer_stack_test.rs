use super::*;

const DK: u16 = 1;
const SYM: u16 = 2;
const MEDIA: u16 = 3;

#[test]
fn base_when_empty() {
    let stack = LayerStack::default();
    assert_eq!(stack.active_layer(), 0);
    assert_eq!(stack.state(SYM), LayerState::Inactive);
}

#[test]
fn last_pushed_wins() {
    let mut stack = LayerStack::default();
    stack.momentary_down(SYM).unwrap();
    assert_eq!(stack.active_layer(), SYM);
    assert_eq!(stack.state(SYM), LayerState::Held);

    assert_eq!(stack.oneshot_down(DK), Ok(true));
    assert_eq!(stack.active_layer(), DK);

    assert!(stack.consume_oneshot());
    assert_eq!(stack.active_layer(), SYM);
    assert!(!stack.consume_oneshot());

    stack.momentary_up(SYM).unwrap();
    assert_eq!(stack.active_layer(), 0);
}

#[test]
fn out_of_order_release() {
    let mut stack = LayerStack::default();
    stack.momentary_down(SYM).unwrap();
    stack.momentary_down(MEDIA).unwrap();

    stack.momentary_up(SYM).unwrap();
    assert_eq!(stack.active_layer(), MEDIA);
    assert_eq!(stack.state(SYM), LayerState::Inactive);

    stack.momentary_up(MEDIA).unwrap();
    assert_eq!(stack.active_layer(), 0);

    assert_eq!(stack.momentary_up(MEDIA), Err(LayerError::NotHeld(MEDIA)));
}

#[test]
fn momentary_up_only_removes_held() {
    let mut stack = LayerStack::default();
    stack.toggle_down(SYM).unwrap();
    assert_eq!(stack.momentary_up(SYM), Err(LayerError::NotHeld(SYM)));
    assert_eq!(stack.state(SYM), LayerState::ToggledOn);
}

#[test]
fn oneshot_ignored_when_active() {
    let mut stack = LayerStack::default();
    assert_eq!(stack.oneshot_down(DK), Ok(true));
    assert_eq!(stack.oneshot_down(DK), Ok(false));
    assert_eq!(stack.state(DK), LayerState::ArmedOneShot);

    stack.consume_oneshot();
    stack.momentary_down(DK).unwrap();
    assert_eq!(stack.oneshot_down(DK), Ok(false));
    assert!(!stack.consume_oneshot());
    assert_eq!(stack.active_layer(), DK);
}

#[test]
fn toggle() {
    let mut stack = LayerStack::default();
    stack.toggle_down(MEDIA).unwrap();
    assert_eq!(stack.state(MEDIA), LayerState::ToggledOn);
    assert_eq!(stack.active_layer(), MEDIA);

    stack.momentary_down(SYM).unwrap();
    stack.toggle_down(SYM).unwrap();
    assert_eq!(stack.state(SYM), LayerState::Held);

    stack.toggle_down(MEDIA).unwrap();
    assert_eq!(stack.state(MEDIA), LayerState::Inactive);
    assert_eq!(stack.active_layer(), SYM);

    stack.clear();
    assert!(stack.is_empty());
    assert_eq!(stack.active_layer(), 0);
}

#[test]
fn full() {
    let mut stack = LayerStack::default();
    for _ in 0..LAYER_STACK_SIZE {
        stack.momentary_down(SYM).unwrap();
    }
    assert_eq!(stack.momentary_down(MEDIA), Err(LayerError::StackFull));
    assert_eq!(stack.oneshot_down(DK), Err(LayerError::StackFull));
    assert_eq!(stack.active_layer(), SYM);
}
