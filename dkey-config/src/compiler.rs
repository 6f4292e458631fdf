use std::{
    collections::{BTreeMap, HashMap},
    ops::Range,
};

use dkey_common::{keycodes::key_range, u32_to_u16, PROTOCOL_VERSION};

use crate::{globals::spec::GlobalProp, keycodes, ConfigError};

type Result<T> = core::result::Result<T, ConfigError>;
type NameRange = Range<usize>;

const TOO_MANY_RHS: &str = "Only one value may be assigned";
const TOO_MANY_MULTI_ALIAS_RHS: &str =
    "Only one value may be assigned to an multi-positioned alias";
const TOO_MANY_ROWS: &str = "Too many rows";
const TOO_MANY_COLS: &str = "Too many keys in row";
const UNKNOWN_ACTION: &str = "Unknown action/keycode";
const MISSING_MATRIX: &str = "Missing [matrix:RxC] section";

const MAX_LAYERS: usize = key_range::MAX_LAYER_N as usize + 1;
const MAX_SYMBOLS: usize = (key_range::UNICODE_MAX - key_range::UNICODE_MIN) as usize + 1;

/// A whitespace separated word of a line. Parentheses extend a word to the matching `)`.
#[derive(Debug, Clone, PartialEq)]
struct Word<'source> {
    text: &'source str,
    span: NameRange,
}

#[derive(Debug)]
enum Line<'source> {
    Section {
        name: Word<'source>,
        suffix: Option<Word<'source>>,
        span: NameRange,
    },
    Assignment {
        left: Word<'source>,
        right: Vec<Word<'source>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section<'source> {
    None,
    Global,
    Matrix,
    Aliases,
    Unicode,
    Layer(&'source str),
    Overrides(&'source str),
}

/// A compiled keymap configuration.
pub struct KeymapConfig<'source> {
    pub source: &'source str,
    pub row_count: u8,
    pub col_count: u8,
    pub matrix_map: HashMap<String, Vec<u16>>,
    globals: BTreeMap<u16, u16>,
    layers: HashMap<String, ConfigLayer>,
    symbols: Vec<Option<u32>>,
    named_symbols: HashMap<&'source str, u16>,
    anonymous_symbols: HashMap<u32, u16>,
    overrides: BTreeMap<(u16, u16), (u16, u16)>,
}

#[derive(Debug)]
pub struct ConfigLayer {
    codes: HashMap<u16, u16>,
    index: u16,
}

/// A registered Unicode symbol and the name it was defined with, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolDesc<'c> {
    pub code: u16,
    pub scalar: u32,
    pub name: Option<&'c str>,
}

struct Parser<'source> {
    config: KeymapConfig<'source>,
    section: Section<'source>,
    symbol_refs: HashMap<&'source str, NameRange>,
}

fn invalid_section_char(c: char) -> bool {
    !matches!(c, '-' | '_' | '.') && !c.is_alphanumeric()
}

fn error_span(message: impl Into<String>, range: NameRange) -> ConfigError {
    ConfigError::new(message.into(), range)
}

/// The text before any unescaped `#`.
fn strip_comment(text: &str) -> &str {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '#' => return &text[..i],
            _ => {}
        }
    }
    text
}

/// Index of the first `=` outside parentheses that is not escaped.
fn find_assignment(text: &str) -> Option<usize> {
    let mut escaped = false;
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_words(text: &str, offset: usize) -> Result<Vec<Word<'_>>> {
    let mut words = Vec::new();
    let mut start = None;
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                start.get_or_insert(i);
            }
            '(' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ')' if depth > 0 => depth -= 1,
            ')' => return Err(error_span("Unmatched ')'", offset + i..offset + i + 1)),
            _ if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    words.push(Word {
                        text: &text[s..i],
                        span: offset + s..offset + i,
                    });
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        if depth > 0 {
            return Err(error_span("Missing ')'", offset + s..offset + text.len()));
        }
        words.push(Word {
            text: &text[s..],
            span: offset + s..offset + text.len(),
        });
    }
    Ok(words)
}

fn read_section(text: &str, offset: usize) -> Result<Line<'_>> {
    let span = offset..offset + text.len();
    let Some(inner) = text
        .strip_prefix('[')
        .and_then(|t| t.trim_end().strip_suffix(']'))
    else {
        return Err(error_span("missing ']'", span));
    };
    let inner_start = offset + 1;
    let (name, suffix) = match inner.split_once(':') {
        Some((name, suffix)) => (
            name,
            Some(Word {
                text: suffix,
                span: inner_start + name.len() + 1..inner_start + inner.len(),
            }),
        ),
        None => (inner, None),
    };
    if name.is_empty() || name.contains(invalid_section_char) {
        return Err(error_span(
            "Invalid section name",
            inner_start..inner_start + name.len(),
        ));
    }
    Ok(Line::Section {
        name: Word {
            text: name,
            span: inner_start..inner_start + name.len(),
        },
        suffix,
        span,
    })
}

fn read_lines(source: &str) -> Result<Vec<Line<'_>>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in source.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();

        let text = strip_comment(raw);
        let trimmed = text.trim_start();
        let start = line_start + text.len() - trimmed.len();
        let trimmed = trimmed.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('[') {
            lines.push(read_section(trimmed, start)?);
            continue;
        }

        let Some(eq) = find_assignment(trimmed) else {
            return Err(error_span("Missing =", start..start + trimmed.len()));
        };

        let mut left = split_words(&trimmed[..eq], start)?;
        let right = split_words(&trimmed[eq + 1..], start + eq + 1)?;
        if left.len() != 1 {
            return Err(error_span("Expected one name before =", start..start + eq));
        }
        if right.is_empty() {
            return Err(error_span("Missing RHS", start + eq..start + eq + 1));
        }
        lines.push(Line::Assignment {
            left: left.remove(0),
            right,
        });
    }
    Ok(lines)
}

/// Parse a hex scalar with an optional `U+` prefix.
fn parse_scalar(text: &str, span: NameRange) -> Result<u32> {
    let hex = text
        .strip_prefix("U+")
        .or_else(|| text.strip_prefix("u+"))
        .unwrap_or(text);
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|n| char::from_u32(*n).is_some())
        .ok_or_else(|| error_span(format!("Invalid unicode scalar '{}'", text), span))
}

/// A matrix position written as `0xRC` or `0xRRCC`.
pub fn key_position(name: &str) -> Option<u16> {
    if let Some(name) = name.strip_prefix("0x") {
        if let Ok(pos) = u16::from_str_radix(name, 16) {
            return Some(match name.len() {
                2 => (pos & 0xf0) << 4 | (pos & 0xf),
                3..=4 => pos,
                _ => return None,
            });
        }
    }
    None
}

impl<'source> Parser<'source> {
    fn new(source: &'source str) -> Self {
        Self {
            config: KeymapConfig::new(source),
            section: Section::None,
            symbol_refs: Default::default(),
        }
    }

    fn parse_lines(&mut self) -> Result<()> {
        let lines = read_lines(self.config.source)?;
        self.config.scan_layer_names(&lines)?;
        for line in lines {
            match line {
                Line::Section { name, suffix, span } => {
                    self.section = self.open_section(name, suffix, span)?;
                }
                Line::Assignment { left, right } => self.assign(left, right)?,
            }
        }
        Ok(())
    }

    fn open_section(
        &mut self,
        name: Word<'source>,
        suffix: Option<Word<'source>>,
        span: NameRange,
    ) -> Result<Section<'source>> {
        let section = match name.text {
            "global" => Section::Global,
            "unicode" => Section::Unicode,
            "matrix" => {
                let suffix = suffix.clone().unwrap_or(Word {
                    text: "",
                    span: span.clone(),
                });
                self.parse_matrix_size(&suffix)?;
                return Ok(Section::Matrix);
            }
            "aliases" => Section::Aliases,
            "overrides" => {
                return match suffix {
                    Some(layer) if !layer.text.is_empty() => Ok(Section::Overrides(layer.text)),
                    _ => Err(error_span("expected [overrides:layer]", span)),
                };
            }
            layer => Section::Layer(layer),
        };
        if let Some(suffix) = suffix {
            return Err(error_span("suffix not allowed here", suffix.span));
        }
        if matches!(section, Section::Layer(_) | Section::Aliases) && self.config.row_count == 0 {
            return Err(error_span(
                "[matrix:RxC] must come before aliases and layers",
                span,
            ));
        }
        Ok(section)
    }

    fn parse_matrix_size(&mut self, suffix: &Word) -> Result<()> {
        if self.config.row_count != 0 {
            return Err(error_span("Duplicate [matrix] section", suffix.span.clone()));
        }
        if let Some((rows, cols)) = suffix.text.split_once('x') {
            if let (Ok(rows), Ok(cols)) = (rows.parse::<u8>(), cols.parse::<u8>()) {
                if rows != 0 && cols != 0 {
                    self.config.row_count = rows;
                    self.config.col_count = cols;
                    return Ok(());
                }
            }
        }
        Err(error_span(
            "expected [matrix:RxC] where R and C are row column size",
            suffix.span.clone(),
        ))
    }

    fn assign(&mut self, left: Word<'source>, right: Vec<Word<'source>>) -> Result<()> {
        match self.section {
            Section::None => Err(error_span("expected a [section] first", left.span)),
            Section::Global => self.assign_global(&left, &right),
            Section::Matrix => self.assign_matrix(&left, &right),
            Section::Aliases => {
                assert_one_value(&right, TOO_MANY_RHS)?;
                if self.config.assign_aliases(left.text, right[0].text) {
                    Ok(())
                } else {
                    Err(error_span("Unknown key name", left.span))
                }
            }
            Section::Unicode => {
                assert_one_value(&right, TOO_MANY_RHS)?;
                let scalar = parse_scalar(right[0].text, right[0].span.clone())?;
                self.define_symbol(&left, scalar)
            }
            Section::Layer(name) => self.assign_layer(name, &left, &right),
            Section::Overrides(name) => self.assign_override(name, &left, &right),
        }
    }

    fn assign_global(&mut self, left: &Word, right: &[Word]) -> Result<()> {
        let mut prop =
            GlobalProp::new_default(left.text).map_err(|e| error_span(e, left.span.clone()))?;
        let values: Vec<&str> = right.iter().map(|w| w.text).collect();
        prop.set_values(&values)
            .map_err(|e| error_span(e, value_span(right)))?;
        let [index, value] = prop.serialize();
        self.config.globals.insert(index, value);
        Ok(())
    }

    fn assign_matrix(&mut self, left: &Word, right: &[Word]) -> Result<()> {
        let mut pos = key_position(left.text)
            .ok_or_else(|| error_span("Invalid key position", left.span.clone()))?;
        if (pos >> 8) as u8 >= self.config.row_count {
            return Err(error_span(TOO_MANY_ROWS, left.span.clone()));
        }
        for value in right {
            if (pos & 0xff) as u8 >= self.config.col_count {
                return Err(error_span(TOO_MANY_COLS, value.span.clone()));
            }
            self.config.assign_position_name(pos, value.text);
            if let Some(code) = keycodes::key_code(value.text) {
                self.config.assign_one_layer_code("main", pos, code);
            }
            pos += 1;
        }
        Ok(())
    }

    fn assign_layer(
        &mut self,
        name: &str,
        left: &Word<'source>,
        right: &[Word<'source>],
    ) -> Result<()> {
        let alias_value = self.config.get_aliases(left.text).cloned();

        let keypos = match &alias_value {
            Some(list) if list.len() == 1 => list.first().copied(),
            Some(_) => None,
            None => key_position(left.text),
        };

        if let Some(mut keypos) = keypos {
            if (keypos >> 8) as u8 >= self.config.row_count {
                return Err(error_span(TOO_MANY_ROWS, left.span.clone()));
            }
            for value in right {
                if (keypos & 0xff) as u8 >= self.config.col_count {
                    return Err(error_span(TOO_MANY_COLS, value.span.clone()));
                }
                let code = self.read_action(value)?;
                self.config.assign_one_layer_code(name, keypos, code);
                keypos += 1;
            }
            Ok(())
        } else if let Some(positions) = alias_value {
            assert_one_value(right, TOO_MANY_MULTI_ALIAS_RHS)?;
            let code = self.read_action(&right[0])?;
            for pos in positions {
                self.config.assign_one_layer_code(name, pos, code);
            }
            Ok(())
        } else {
            Err(error_span(
                format!("Unknown key position '{}'", left.text),
                left.span.clone(),
            ))
        }
    }

    fn assign_override(
        &mut self,
        name: &str,
        left: &Word<'source>,
        right: &[Word<'source>],
    ) -> Result<()> {
        let base = self.read_action(left)?;
        let (unshifted, shifted) = match right {
            [shifted] => (base, self.read_action(shifted)?),
            [unshifted, shifted] => (self.read_action(unshifted)?, self.read_action(shifted)?),
            _ => {
                return Err(error_span(
                    "Expected one or two values",
                    right[2].span.start..value_span(right).end,
                ))
            }
        };
        let layer = self.get_layer_index(name, left.span.clone())?;
        if self
            .config
            .overrides
            .insert((layer, base), (unshifted, shifted))
            .is_some()
        {
            return Err(error_span(
                format!("Duplicate override for '{}'", left.text),
                left.span.clone(),
            ));
        }
        Ok(())
    }

    fn read_action(&mut self, word: &Word<'source>) -> Result<u16> {
        let name = word.text;

        if let Some(code) = keycodes::key_code(name) {
            return Ok(code);
        }

        if let Some((func, rest)) = name.split_once('(') {
            let Some(arg) = rest.strip_suffix(')') else {
                return Err(error_span(UNKNOWN_ACTION, word.span.clone()));
            };
            let arg_start = word.span.start + func.len() + 1 + (arg.len() - arg.trim_start().len());
            let arg = arg.trim();
            let arg_span = arg_start..arg_start + arg.len();

            if let Some(base_code) = keycodes::action_code(func) {
                return Ok(base_code + self.get_layer_index(arg, arg_span)?);
            }
            return match func {
                "layer_tap" | "lt" => self.layer_tap(arg, arg_span),
                "unicode" => {
                    let scalar = parse_scalar(arg, arg_span.clone())?;
                    self.anonymous_symbol(scalar, arg_span)
                }
                "u" if !arg.is_empty() => self.named_symbol(arg, arg_span),
                "u" => Err(error_span("Missing name", word.span.clone())),
                _ => Err(error_span(UNKNOWN_ACTION, word.span.clone())),
            };
        }

        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_ascii() {
                return self.anonymous_symbol(c as u32, word.span.clone());
            }
        }

        Err(error_span(UNKNOWN_ACTION, word.span.clone()))
    }

    fn layer_tap(&self, arg: &str, span: NameRange) -> Result<u16> {
        let Some((layer, tap)) = arg.split_once(',') else {
            return Err(error_span("Expected layer_tap(layer, key)", span));
        };
        let layer_span = span.start..span.start + layer.trim_end().len();
        let tap_start = span.start + layer.len() + 1 + (tap.len() - tap.trim_start().len());
        let tap = tap.trim();
        let tap_span = tap_start..tap_start + tap.len();

        let layer = self.get_layer_index(layer.trim_end(), layer_span.clone())?;
        if layer > key_range::MAX_LAYER_TAP_LAYER {
            return Err(error_span(
                "Layer-tap layer must be one of the first 16 layers",
                layer_span,
            ));
        }
        keycodes::key_code(tap)
            .and_then(|code| key_range::layer_tap(layer, code))
            .ok_or_else(|| error_span("Layer-tap key must be a basic key", tap_span))
    }

    fn get_layer_index(&self, name: &str, span: NameRange) -> Result<u16> {
        self.config
            .get_layer_index(name)
            .ok_or_else(|| error_span(format!("Unknown layer name {}", name), span))
    }

    fn add_symbol(&mut self, scalar: Option<u32>, span: NameRange) -> Result<u16> {
        if self.config.symbols.len() >= MAX_SYMBOLS {
            return Err(error_span("Too many unicode symbols", span));
        }
        self.config.symbols.push(scalar);
        Ok((self.config.symbols.len() - 1) as u16)
    }

    fn anonymous_symbol(&mut self, scalar: u32, span: NameRange) -> Result<u16> {
        let id = match self.config.anonymous_symbols.get(&scalar) {
            Some(id) => *id,
            None => {
                let id = self.add_symbol(Some(scalar), span)?;
                self.config.anonymous_symbols.insert(scalar, id);
                id
            }
        };
        Ok(key_range::UNICODE_MIN + id)
    }

    fn named_symbol(&mut self, name: &'source str, span: NameRange) -> Result<u16> {
        let id = match self.config.named_symbols.get(name) {
            Some(id) => *id,
            None => {
                let id = self.add_symbol(None, span.clone())?;
                self.config.named_symbols.insert(name, id);
                self.symbol_refs.insert(name, span);
                id
            }
        };
        Ok(key_range::UNICODE_MIN + id)
    }

    fn define_symbol(&mut self, name: &Word<'source>, scalar: u32) -> Result<()> {
        match self.config.named_symbols.get(name.text) {
            Some(&id) => {
                let slot = &mut self.config.symbols[id as usize];
                if slot.is_some() {
                    return Err(error_span(
                        format!("Duplicate symbol '{}'", name.text),
                        name.span.clone(),
                    ));
                }
                *slot = Some(scalar);
            }
            None => {
                let id = self.add_symbol(Some(scalar), name.span.clone())?;
                self.config.named_symbols.insert(name.text, id);
            }
        }
        Ok(())
    }

    fn build_config(self) -> Result<KeymapConfig<'source>> {
        if self.config.row_count == 0 {
            return Err(MISSING_MATRIX.into());
        }
        let unresolved = self
            .config
            .named_symbols
            .iter()
            .filter(|(_, id)| self.config.symbols[**id as usize].is_none())
            .filter_map(|(name, _)| self.symbol_refs.get(name).map(|span| (*name, span)))
            .min_by_key(|(_, span)| span.start);
        if let Some((name, span)) = unresolved {
            return Err(error_span(
                format!("Unknown symbol '{}'", name),
                span.clone(),
            ));
        }
        Ok(self.config)
    }
}

fn assert_one_value(right: &[Word], msg: &str) -> Result<()> {
    match right.get(1) {
        Some(extra) => Err(error_span(msg, extra.span.start..value_span(right).end)),
        None => Ok(()),
    }
}

fn value_span(right: &[Word]) -> NameRange {
    match (right.first(), right.last()) {
        (Some(first), Some(last)) => first.span.start..last.span.end,
        _ => 0..0,
    }
}

impl<'source> KeymapConfig<'source> {
    fn new(source: &'source str) -> Self {
        let mut layers: HashMap<String, ConfigLayer> = Default::default();
        layers.insert("main".into(), ConfigLayer::new(0));

        Self {
            source,
            row_count: 0,
            col_count: 0,
            matrix_map: Default::default(),
            globals: Default::default(),
            layers,
            symbols: Default::default(),
            named_symbols: Default::default(),
            anonymous_symbols: Default::default(),
            overrides: Default::default(),
        }
    }

    /// The keymap binary loaded by the engine.
    pub fn serialize(&self) -> Vec<u16> {
        let rows = self.row_count as usize;
        let cols = self.col_count as usize;

        let mut out = vec![
            PROTOCOL_VERSION,
            (self.row_count as u16) << 8 | self.col_count as u16,
            self.layers.len() as u16,
            self.symbols.len() as u16,
            self.overrides.len() as u16,
            (self.globals.len() * 2) as u16,
        ];

        for (index, value) in self.globals.iter() {
            out.push(*index);
            out.push(*value);
        }

        let dir_base = out.len();
        out.resize(dir_base + self.layers.len() + 1, 0);
        for (i, layer) in self.layers_by_index().into_iter().enumerate() {
            out[dir_base + i] = (out.len() - dir_base) as u16;
            out.append(&mut layer.serialize(rows, cols));
        }
        out[dir_base + self.layers.len()] = (out.len() - dir_base) as u16;

        for scalar in self.symbols.iter() {
            out.extend_from_slice(&u32_to_u16(scalar.unwrap_or_default()));
        }

        for ((layer, keycode), (unshifted, shifted)) in self.overrides.iter() {
            out.extend_from_slice(&[*layer, *keycode, *unshifted, *shifted]);
        }

        out
    }

    fn layers_by_index(&self) -> Vec<&ConfigLayer> {
        let mut layers = self.layers.values().collect::<Vec<_>>();
        layers.sort_by_key(|l| l.index);
        layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer names in index order.
    pub fn layer_names(&self) -> Vec<&str> {
        let mut names = self
            .layers
            .iter()
            .map(|(name, l)| (l.index, name.as_str()))
            .collect::<Vec<_>>();
        names.sort();
        names.into_iter().map(|(_, name)| name).collect()
    }

    pub fn symbols(&self) -> impl Iterator<Item = SymbolDesc<'_>> {
        self.symbols.iter().enumerate().map(|(id, scalar)| {
            let id = id as u16;
            SymbolDesc {
                code: key_range::UNICODE_MIN + id,
                scalar: scalar.unwrap_or_default(),
                name: self
                    .named_symbols
                    .iter()
                    .find(|(_, i)| **i == id)
                    .map(|(name, _)| *name),
            }
        })
    }

    pub fn global(&self, index: u16) -> Option<u16> {
        self.globals.get(&index).copied()
    }

    pub fn override_for(&self, layer: &str, keycode: u16) -> Option<(u16, u16)> {
        let layer = self.get_layer_index(layer)?;
        self.overrides.get(&(layer, keycode)).copied()
    }

    pub fn code_at(&self, name: &str, rowcol: u16) -> u16 {
        if let Some(layer) = self.layers.get(name) {
            return layer.code_at(rowcol);
        }
        0
    }

    fn assign_aliases(&mut self, key: &str, value: &str) -> bool {
        if let Some(pos) = key_position(key) {
            self.assign_position_name(pos, value);
            return true;
        }
        if let Some(positions) = self.get_aliases(key) {
            let positions = positions.clone();
            for pos in positions {
                self.assign_position_name(pos, value);
            }
            return true;
        }
        false
    }

    fn assign_position_name(&mut self, pos: u16, name: &str) {
        let name = match keycodes::key_code(name) {
            Some(code) => format!("{code:04X}"),
            None => name.into(),
        };
        self.matrix_map.entry(name).or_default().push(pos);
    }

    pub fn get_aliases(&self, name: &str) -> Option<&Vec<u16>> {
        if let Some(code) = keycodes::key_code(name) {
            self.matrix_map.get(format!("{code:04X}").as_str())
        } else {
            self.matrix_map.get(name)
        }
    }

    fn assign_one_layer_code(&mut self, name: &str, pos: u16, code: u16) {
        if let Some(layer) = self.layers.get_mut(name) {
            layer.set_code(pos, code);
        }
    }

    fn new_layer(&mut self, name: &str) {
        let index = self.layers.len() as u16;
        self.layers.insert(name.into(), ConfigLayer::new(index));
    }

    fn get_layer_index(&self, name: &str) -> Option<u16> {
        self.layers.get(name).map(|l| l.index)
    }

    /// Give every layer an index in order of first appearance so actions may refer to layers
    /// defined further down.
    fn scan_layer_names(&mut self, lines: &[Line]) -> Result<()> {
        for line in lines {
            let Line::Section { name, suffix, span } = line else {
                continue;
            };
            let layer = match (name.text, suffix) {
                ("global" | "matrix" | "aliases" | "unicode", _) => continue,
                ("overrides", Some(suffix)) if !suffix.text.is_empty() => suffix.text,
                ("overrides", _) => continue,
                (layer, _) => layer,
            };
            if !self.layers.contains_key(layer) {
                if self.layers.len() >= MAX_LAYERS {
                    return Err(error_span("Too many layers", span.clone()));
                }
                self.new_layer(layer);
            }
        }
        Ok(())
    }
}

impl ConfigLayer {
    fn new(index: u16) -> Self {
        Self {
            codes: Default::default(),
            index,
        }
    }

    /// Dense when at least half the positions are bound, otherwise sorted `(position, code)`
    /// pairs.
    fn serialize(&self, row_count: usize, col_count: usize) -> Vec<u16> {
        let mut codes = self
            .codes
            .iter()
            .filter(|(_, v)| **v != key_range::TRANSPARENT)
            .map(|(k, v)| (*k, *v))
            .collect::<Vec<_>>();
        if codes.len() * 2 >= row_count * col_count {
            let mut bin = vec![0; row_count * col_count];
            for (k, v) in codes {
                bin[(k >> 8) as usize * col_count + (k & 0xff) as usize] = v;
            }
            bin
        } else {
            codes.sort_by_key(|k| k.0);
            codes.into_iter().flat_map(|(k, v)| [k, v]).collect()
        }
    }

    pub fn code_at(&self, pos: u16) -> u16 {
        *self.codes.get(&pos).unwrap_or(&0)
    }

    fn set_code(&mut self, pos: u16, code: u16) {
        self.codes.insert(pos, code);
    }
}

pub fn compile(source: &str) -> Result<KeymapConfig<'_>> {
    let mut parser = Parser::new(source);

    parser.parse_lines()?;
    parser.build_config()
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod test;
