use super::*;

#[test]
fn register_and_lookup() {
    let mut table = UnicodeTable::default();
    assert!(table.is_empty());

    assert_eq!(table.register(0x20ac), Ok(0));
    assert_eq!(table.register(0x0302), Ok(1));
    assert_eq!(table.len(), 2);

    assert_eq!(table.lookup(0), Ok(0x20ac));
    assert_eq!(table.lookup(1), Ok(0x0302));
    assert_eq!(table.lookup(2), Err(UnknownSymbol(2)));

    assert_eq!(table.lookup_code(key_range::UNICODE_MIN + 1), Ok(0x0302));
    assert_eq!(table.lookup_code(0x04), Err(UnknownSymbol(0x04)));
}

#[test]
fn rejects_non_scalars() {
    let mut table = UnicodeTable::default();
    assert_eq!(
        table.register(0xd800),
        Err(SymbolError::InvalidScalar(0xd800))
    );
    assert_eq!(
        table.register(0x110000),
        Err(SymbolError::InvalidScalar(0x110000))
    );
    assert!(table.is_empty());
}

#[test]
fn full_table() {
    let mut table = UnicodeTable::default();
    for i in 0..MAX_SYMBOLS as u32 {
        assert_eq!(table.register(0x2000 + i), Ok(i as u16));
    }
    assert_eq!(table.register(0x41), Err(SymbolError::TableFull));

    table.clear();
    assert_eq!(table.lookup(0), Err(UnknownSymbol(0)));
}
