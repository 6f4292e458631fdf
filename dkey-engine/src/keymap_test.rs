use std::{vec, vec::Vec};

use dkey_common::u32_to_u16;

use super::*;

extern crate std;

const A: u16 = 0x04;
const B: u16 = 0x05;
const EURO: u32 = 0x20ac;

#[derive(Default)]
struct Bin {
    rows_cols: u16,
    globals: Vec<u16>,
    layers: Vec<Vec<u16>>,
    symbols: Vec<u32>,
    overrides: Vec<[u16; 4]>,
}

impl Bin {
    fn new() -> Self {
        Self {
            rows_cols: 0x0103,
            layers: vec![vec![A, key_range::LAYER + 1, 0], vec![0x0002, 0x1000]],
            symbols: vec![EURO],
            overrides: vec![[1, A, A, 0x1000]],
            ..Default::default()
        }
    }

    fn build(&self) -> Vec<u16> {
        let mut out = vec![
            PROTOCOL_VERSION,
            self.rows_cols,
            self.layers.len() as u16,
            self.symbols.len() as u16,
            self.overrides.len() as u16,
            self.globals.len() as u16,
        ];
        out.extend_from_slice(&self.globals);
        let mut offset = self.layers.len() as u16 + 1;
        out.push(offset);
        for l in self.layers.iter() {
            offset += l.len() as u16;
            out.push(offset);
        }
        for l in self.layers.iter() {
            out.extend_from_slice(l);
        }
        for s in self.symbols.iter() {
            out.extend_from_slice(&u32_to_u16(*s));
        }
        for o in self.overrides.iter() {
            out.extend_from_slice(o);
        }
        out
    }
}

type Map = Keymap<1, 3, 100>;

fn load(bin: &Bin) -> (Map, Result<(), LoadError>) {
    let mut map = Map::default();
    let result = map.load(bin.build());
    (map, result)
}

#[test]
fn load_layers_symbols_overrides() {
    let mut bin = Bin::new();
    bin.globals = vec![
        globals::UNICODE_MODE,
        UnicodeMode::MacOs.as_u16(),
        globals::UNICODE_MODES,
        0x43,
        globals::TAP_HOLD_TIMEOUT,
        150,
    ];
    let (map, result) = load(&bin);
    result.unwrap();

    assert_eq!(map.layer_count(), 2);
    assert_eq!(map.code(0, 0, 0), A);
    assert_eq!(map.code(1, 0, 0), 0);
    assert_eq!(map.code(1, 0, 2), 0x1000);
    assert_eq!(map.code(5, 0, 0), 0);

    assert_eq!(map.find_code(1, 0, 0), A);
    assert_eq!(map.find_code(1, 0, 1), key_range::LAYER + 1);
    assert_eq!(map.find_code(1, 0, 2), 0x1000);
    assert_eq!(map.find_code(0, 0, 2), 0);

    assert_eq!(map.symbols().lookup(0), Ok(EURO));
    assert_eq!(
        map.overrides().resolve(1, A).map(|o| o.select(true)),
        Some(0x1000)
    );
    assert!(map.overrides().resolve(0, A).is_none());

    assert_eq!(map.unicode_mode(), UnicodeMode::MacOs);
    assert_eq!(
        map.unicode_modes().as_slice(),
        &[UnicodeMode::Windows, UnicodeMode::WinCompose]
    );
    assert_eq!(map.tap_hold_timeout(), 150);
}

#[test]
fn defaults_without_globals() {
    let (map, result) = load(&Bin::new());
    result.unwrap();
    assert_eq!(map.unicode_mode(), UnicodeMode::Linux);
    assert_eq!(map.unicode_modes(), &ModeSelection::default());
    assert_eq!(map.tap_hold_timeout(), globals::DEFAULT_TAP_HOLD_TIMEOUT);
}

#[test]
fn sparse_search() {
    let mut bin = Bin::new();
    bin.rows_cols = 0x0203;
    bin.layers = vec![
        vec![A, B, 0x06, 0x07, 0x08, 0x09],
        vec![0x0000, 0x1e, 0x0102, 0x1f],
        vec![],
    ];
    bin.overrides = vec![];
    let mut map = Keymap::<2, 3, 100>::default();
    map.load(bin.build()).unwrap();

    assert_eq!(map.code(0, 1, 2), 0x09);
    assert_eq!(map.code(1, 0, 0), 0x1e);
    assert_eq!(map.code(1, 1, 2), 0x1f);
    assert_eq!(map.code(1, 0, 1), 0);
    assert_eq!(map.code(1, 1, 1), 0);
    assert_eq!(map.find_code(2, 1, 1), 0x08);
}

#[test]
fn version_and_size() {
    let mut data = Bin::new().build();
    data[0] = PROTOCOL_VERSION + 1;
    assert_eq!(Map::default().load(data), Err(LoadError::VersionMismatch));

    let mut bin = Bin::new();
    bin.rows_cols = 0x0104;
    assert_eq!(load(&bin).1, Err(LoadError::RowColMismatch));

    let mut map = Keymap::<1, 3, 6>::default();
    assert_eq!(map.load(Bin::new().build()), Err(LoadError::OutOfSpace));
}

#[test]
fn corrupt() {
    let mut data = Bin::new().build();
    data.pop();
    assert_eq!(Map::default().load(data), Err(LoadError::Corrupt));

    let mut data = Bin::new().build();
    data.push(0);
    assert_eq!(Map::default().load(data), Err(LoadError::Corrupt));

    let mut bin = Bin::new();
    bin.layers[1] = vec![0x0002, 0x1000, 0x0001, A];
    assert_eq!(load(&bin).1, Err(LoadError::Corrupt));

    let mut bin = Bin::new();
    bin.globals = vec![globals::UNICODE_MODE, 9];
    assert_eq!(load(&bin).1, Err(LoadError::Corrupt));

    let mut bin = Bin::new();
    bin.layers = vec![];
    bin.overrides = vec![];
    assert_eq!(load(&bin).1, Err(LoadError::Corrupt));
}

#[test]
fn unknown_references() {
    let mut bin = Bin::new();
    bin.layers[1] = vec![0x0002, 0x1001];
    let (map, result) = load(&bin);
    assert_eq!(result, Err(LoadError::UnknownSymbol(1)));
    assert_eq!(map.layer_count(), 0);
    assert!(map.symbols().is_empty());

    let mut bin = Bin::new();
    bin.overrides = vec![[0, A, A, 0x1003]];
    assert_eq!(load(&bin).1, Err(LoadError::UnknownSymbol(3)));

    let mut bin = Bin::new();
    bin.layers[0][1] = key_range::ONESHOT + 2;
    assert_eq!(load(&bin).1, Err(LoadError::UnknownLayer(2)));

    let mut bin = Bin::new();
    bin.overrides = vec![[4, A, A, B]];
    assert_eq!(load(&bin).1, Err(LoadError::UnknownLayer(4)));

    let mut bin = Bin::new();
    bin.layers[0][1] = key_range::layer_tap(1, B).unwrap();
    load(&bin).1.unwrap();
    bin.layers[0][1] = key_range::layer_tap(3, B).unwrap();
    assert_eq!(load(&bin).1, Err(LoadError::UnknownLayer(3)));
}

#[test]
fn invalid_symbols_and_overrides() {
    let mut bin = Bin::new();
    bin.symbols = vec![EURO, 0xdfff];
    assert_eq!(load(&bin).1, Err(LoadError::InvalidScalar(0xdfff)));

    let mut bin = Bin::new();
    bin.overrides.push([1, A, B, B]);
    let (map, result) = load(&bin);
    assert_eq!(
        result,
        Err(LoadError::DuplicateOverride {
            layer: 1,
            keycode: A
        })
    );
    assert!(map.overrides().is_empty());
}

#[test]
fn compiled_config() {
    let data = dkey_config::text_to_binary(
        r#"
[global]
unicode_mode = wincompose

[matrix:2x3]

0x00 = a b c
0x10 = d e f

[unicode]
euro = 20ac

[main]

c = layer(sym)
f = oneshot(sym)

[sym]

a = u(euro)
b = unicode(00e9)

[overrides:main]

a = a u(euro)
"#,
    )
    .unwrap();

    let mut map = Keymap::<2, 3, 100>::default();
    map.load(data).unwrap();

    assert_eq!(map.unicode_mode(), UnicodeMode::WinCompose);
    assert_eq!(map.layer_count(), 2);
    assert_eq!(map.code(0, 0, 2), key_range::LAYER + 1);
    assert_eq!(map.code(0, 1, 2), key_range::ONESHOT + 1);

    let euro = map.code(1, 0, 0);
    assert_eq!(map.symbols().lookup_code(euro), Ok(EURO));
    assert_eq!(map.symbols().lookup_code(map.code(1, 0, 1)), Ok(0xe9));
    assert_eq!(map.find_code(1, 1, 2), key_range::ONESHOT + 1);

    let o = map.overrides().resolve(0, A).unwrap();
    assert_eq!(o.unshifted, A);
    assert_eq!(o.shifted, euro);
}
