use std::collections::HashMap;

use dkey_common::keycodes::key_range;
use lazy_static::lazy_static;

const DASH_USCORE: [char; 2] = ['_', '-'];

pub struct KeycodeDesc {
    pub name: &'static str,
    pub code: u16,
}

lazy_static! {
    static ref ACTION_NAMES: HashMap<&'static str, u16> = {
        let mut m = HashMap::new();
        m.insert("layer", key_range::LAYER);
        m.insert("toggle", key_range::TOGGLE);
        m.insert("oneshot", key_range::ONESHOT);
        m
    };
    static ref SHIFT_KEY_NAMES: HashMap<char, char> = {
        let mut m = HashMap::new();
        let mut n = '\0';
        for c in r#"`~-_=+[{]}\|;:'",<.>/?1!2@3#4$5%6^7&8*9(0)"#.chars() {
            if n == '\0' {
                n = c;
            } else {
                m.insert(c, n);
                n = '\0';
            }
        }
        m
    };
    static ref KEY_DESCS: Vec<KeycodeDesc> = {
        let mut v = Vec::new();
        let mut ins = |names: &'static str, code: u16| {
            for name in names.split('/') {
                v.push(KeycodeDesc { name, code });
            }
        };
        ins("Transparent/trans/noop", key_range::TRANSPARENT);
        for (i, names) in r#"
A B C D E F G H I J K L M N O P Q R S T U V W X Y Z
1 2 3 4 5 6 7 8 9 0
Return/Enter/ent
Escape/esc
Backspace/bksp
Tab
Spacebar/space/spc
Dash/-/minus/mins
Equals/=/equal/eql
LeftBrace/[/lbrc
RightBrace/]/rbrc
Backslash/\/bsls
NonUsHash
Semicolon/;/scln
Apostrophe/'/quote/quot
GraveAccent/`/grave/grv
Comma/,/comm
Period/./dot
Forwardslash/slsh
CapsLock
F1 F2 F3 F4 F5 F6 F7 F8 F9 F10 F11 F12
Printscreen/print
ScrollLock
Pause
Insert
Home Pageup/pgup Delete/del End Pagedown/pgdn
Right Left Down Up
KpNumLock
KpForwardslash KpStar KpDash KpPlus KpEnter
Kp1 Kp2 Kp3 Kp4 Kp5 Kp6 Kp7 Kp8 Kp9 Kp0
KpPeriod
NonUsBackslash
Application/app
Power
KpEquals
F13 F14 F15 F16 F17 F18 F19 F20 F21 F22 F23 F24
Execute
Help
Menu/mnu
Select
Stop
Again Undo
Cut Copy Paste
Find
Mute
VolumeUp VolumeDown
"#
        .split_whitespace()
        .enumerate()
        {
            ins(names, (i + 4) as u16);
        }

        for (i, names) in r#"
Leftcontrol/lctrl/lc/lctl
Leftshift/lshift/ls
Leftalt/lalt/la
LeftGui/leftmeta/lgui/lg
Rightcontrol/rctrl/rc/rctl
Rightshift/rshift/rs
Rightalt/altgr/ralt/ra
RightGui/rightmeta/rgui/rg
Media_PlayPause/mply
Media_StopCD
Media_PreviousSong/mprv
Media_NextSong/mnxt
Media_EjectCD
Media_VolumeUp
Media_VolumeDown
Media_Mute
"#
        .split_whitespace()
        .enumerate()
        {
            ins(names, key_range::MODIFIER_MIN + i as u16);
        }
        v.push(KeycodeDesc { name: "/", code: 0x38 });

        for (names, base) in [
            ("Exclaim/exlm/!", "1"),
            ("At/@", "2"),
            ("Hash/#", "3"),
            ("Dollar/dlr/$", "4"),
            ("Percent/perc/%", "5"),
            ("Circumflex/circ/^", "6"),
            ("Ampersand/ampr/&", "7"),
            ("Asterisk/astr/*", "8"),
            ("LeftParen/lprn/(", "9"),
            ("RightParen/rprn/)", "0"),
            ("Underscore/unds/_", "-"),
            ("Plus/+", "="),
            ("LeftCurly/lcbr/{", "["),
            ("RightCurly/rcbr/}", "]"),
            ("Pipe/|", "\\"),
            ("Colon/coln/:", ";"),
            ("DoubleQuote/dquo/\"", "'"),
            ("Tilde/tild/~", "`"),
            ("LessThan/labk/<", ","),
            ("GreaterThan/rabk/>", "."),
            ("Question/ques/?", "/"),
        ] {
            let code = v.iter().find(|d| d.name == base).map(|d| d.code).unwrap_or(0);
            for name in names.split('/') {
                v.push(KeycodeDesc { name, code: key_range::SHIFTED | code });
            }
        }

        v.push(KeycodeDesc { name: "uc_next", code: key_range::CMD_UNICODE_MODE_NEXT });
        v.push(KeycodeDesc { name: "uc_prev", code: key_range::CMD_UNICODE_MODE_PREV });
        v
    };
    static ref KEY_NAMES: HashMap<String, u16> = {
        let mut m = HashMap::new();
        for d in KEY_DESCS.iter() {
            let k = normalize(d.name);
            if m.insert(k, d.code).is_some() {
                panic!("key already added {}", d.name);
            }
        }
        m
    };
}

fn normalize(name: &str) -> String {
    if name.chars().count() == 1 {
        name.to_lowercase()
    } else {
        name.replace(DASH_USCORE, "").to_lowercase()
    }
}

pub fn unshifted_char_code(c: char) -> char {
    match c {
        'A'..='Z' => c.to_ascii_lowercase(),
        c => *SHIFT_KEY_NAMES.get(&c).unwrap_or(&c),
    }
}

pub fn key_code(name: &str) -> Option<u16> {
    let name = if name.len() > 1 && name.starts_with('\\') {
        &name[1..]
    } else {
        name
    };
    KEY_NAMES.get(normalize(name).as_str()).copied()
}

pub fn action_code(name: &str) -> Option<u16> {
    ACTION_NAMES.get(name).copied()
}

pub fn keycodes_iter() -> impl Iterator<Item = &'static KeycodeDesc> {
    KEY_DESCS.iter()
}

/// The preferred name for `code`; the first name registered for it.
pub fn code_name(code: u16) -> Option<&'static str> {
    KEY_DESCS.iter().find(|d| d.code == code).map(|d| d.name)
}

#[cfg(test)]
#[path = "keycodes_test.rs"]
mod test;
