use std::collections::HashMap;

use lazy_static::lazy_static;

pub mod spec {
    use dkey_common::{
        globals,
        unicode_mode::{ModeSelection, UnicodeMode},
    };

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum GlobalType {
        UnicodeMode(UnicodeMode),
        UnicodeModes(ModeSelection),
        Millis(u16),
    }
    use GlobalType::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct GlobalProp {
        pub index: u16,
        pub spec: GlobalType,
    }

    fn parse_mode(name: &str) -> Result<UnicodeMode, String> {
        UnicodeMode::from_name(name).ok_or_else(|| {
            format!("Invalid unicode mode '{name}'; expected linux, macos, windows or wincompose")
        })
    }

    impl GlobalProp {
        pub fn new_default(name: &str) -> Result<GlobalProp, String> {
            super::DEFAULTS
                .get(name)
                .ok_or_else(|| format!("Invalid global '{}'", name))
                .copied()
        }

        pub fn default_name(&self) -> Option<&'static str> {
            super::INDEX_TO_NAME.get(self.index as usize).copied()
        }

        pub(crate) fn set_values(&mut self, values: &[&str]) -> Result<(), String> {
            match self.spec {
                UnicodeMode(ref mut mode) => match values {
                    [name] => *mode = parse_mode(name)?,
                    _ => return Err("Only one value may be assigned".into()),
                },
                UnicodeModes(ref mut sel) => {
                    let mut new_sel = ModeSelection::empty();
                    for name in values {
                        if !new_sel.push(parse_mode(name)?) {
                            return Err(format!("Duplicate unicode mode '{name}'"));
                        }
                    }
                    *sel = new_sel;
                }
                Millis(ref mut ms) => match values {
                    [n] => {
                        *ms = n
                            .parse()
                            .map_err(|_| format!("Invalid milliseconds '{n}'; expected 0 to 65535"))?
                    }
                    _ => return Err("Only one value may be assigned".into()),
                },
            }
            Ok(())
        }

        pub fn serialize(self) -> [u16; 2] {
            match self.spec {
                UnicodeMode(mode) => [self.index, mode.as_u16()],
                UnicodeModes(sel) => [self.index, sel.serialize()],
                Millis(ms) => [self.index, ms],
            }
        }
    }

    pub(super) const GLOBALS: [GlobalProp; 3] = [
        GlobalProp {
            index: globals::UNICODE_MODE,
            spec: GlobalType::UnicodeMode(UnicodeMode::Linux),
        },
        GlobalProp {
            index: globals::UNICODE_MODES,
            spec: GlobalType::UnicodeModes(ModeSelection::empty()),
        },
        GlobalProp {
            index: globals::TAP_HOLD_TIMEOUT,
            spec: GlobalType::Millis(globals::DEFAULT_TAP_HOLD_TIMEOUT),
        },
    ];
}

lazy_static! {
    pub static ref INDEX_TO_NAME: [&'static str; 3] =
        ["unicode_mode", "unicode_modes", "tap_hold_timeout"];
    pub static ref DEFAULTS: HashMap<&'static str, spec::GlobalProp> = {
        let mut m = HashMap::new();
        for (k, v) in INDEX_TO_NAME.iter().zip(spec::GLOBALS.iter()) {
            m.insert(*k, *v);
        }
        m
    };
}

#[cfg(test)]
#[path = "globals_test.rs"]
mod test;
