use super::*;

extern crate std;

const SYM: u16 = 2;
const CIRC: u16 = 0x123;
const U0302: u16 = 0x1000;

#[test]
fn resolve_only_on_scope_layer() {
    let mut table = OverrideTable::default();
    table.register(SYM, CIRC, CIRC, U0302).unwrap();

    let o = table.resolve(SYM, CIRC).unwrap();
    assert_eq!(o.select(false), CIRC);
    assert_eq!(o.select(true), U0302);

    assert!(table.resolve(0, CIRC).is_none());
    assert!(table.resolve(1, CIRC).is_none());
    assert!(table.resolve(SYM, 0x04).is_none());
}

#[test]
fn duplicate() {
    let mut table = OverrideTable::default();
    table.register(1, 0x14, 0x14, 0x1001).unwrap();
    table.register(2, 0x14, 0x14, 0x1002).unwrap();

    assert_eq!(
        table.register(1, 0x14, 0x04, 0x05),
        Err(OverrideError::DuplicateOverride {
            layer: 1,
            keycode: 0x14
        })
    );
    assert_eq!(table.len(), 2);
    assert_eq!(table.resolve(1, 0x14), Some(&Override::new(0x14, 0x1001)));
}

#[test]
fn iterate() {
    let mut table = OverrideTable::default();
    table.register(3, 0x20, 0x21, 0x22).unwrap();

    let all: std::vec::Vec<_> = table.iter().collect();
    assert_eq!(all, [(3, 0x20, &Override::new(0x21, 0x22))]);

    table.clear();
    assert!(table.is_empty());
}
