// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Physical key to note bindings.
//!
//! The keyboard is laid out as eight white-key slots and eight black-key
//! slots. Each black slot sits between white slot `i` and `i + 1`; slots
//! with no sharp between them (E-F, B-C) can never be bound.

use std::collections::HashMap;

use thiserror::Error;

use super::Note;

/// Number of slots in each row
pub const SLOTS: usize = 8;

/// Notes carried by the white-key slots
pub const WHITE_NOTES: [Note; SLOTS] = [
    Note::C,
    Note::D,
    Note::E,
    Note::F,
    Note::G,
    Note::A,
    Note::B,
    Note::CHigh,
];

/// Notes carried by the black-key slots (`None` = no black key there)
pub const BLACK_NOTES: [Option<Note>; SLOTS] = [
    Some(Note::Cs),
    Some(Note::Ds),
    None,
    Some(Note::Fs),
    Some(Note::Gs),
    Some(Note::As),
    None,
    None,
];

/// Default white keys (home row)
pub const DEFAULT_WHITE_KEYS: [char; SLOTS] = ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k'];

/// Default black keys (upper row)
pub const DEFAULT_BLACK_KEYS: [Option<char>; SLOTS] =
    [Some('w'), Some('e'), None, Some('t'), Some('y'), Some('u'), None, None];

/// Key color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyColor {
    White,
    Black,
}

/// A bound key on the piano
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySlot {
    /// Physical key (lowercase)
    pub key: char,
    /// Note played by the key
    pub note: Note,
    /// Row the key sits in
    pub color: KeyColor,
    /// Slot index within its row (0-7)
    pub index: usize,
}

/// Key map validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyMapError {
    #[error("expected {expected} {row} key slots, got {actual}")]
    WrongSlotCount {
        row: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("white key slot {0} must be bound")]
    UnboundWhiteKey(usize),
    #[error("black key slot {0} has no note and must be left empty")]
    NoBlackNote(usize),
    #[error("key '{0}' is bound more than once")]
    Duplicate(char),
    #[error("key '{0}' is not a printable character")]
    NotPrintable(char),
}

/// Immutable mapping from physical keys to notes
#[derive(Debug, Clone)]
pub struct KeyMap {
    white: Vec<KeySlot>,
    black: Vec<KeySlot>,
    lookup: HashMap<char, KeySlot>,
}

impl KeyMap {
    /// Build a key map from white and black slot assignments
    pub fn new(white: &[char], black: &[Option<char>]) -> Result<Self, KeyMapError> {
        if white.len() != SLOTS {
            return Err(KeyMapError::WrongSlotCount {
                row: "white",
                expected: SLOTS,
                actual: white.len(),
            });
        }
        if black.len() != SLOTS {
            return Err(KeyMapError::WrongSlotCount {
                row: "black",
                expected: SLOTS,
                actual: black.len(),
            });
        }

        let mut map = Self {
            white: Vec::with_capacity(SLOTS),
            black: Vec::new(),
            lookup: HashMap::new(),
        };

        for (index, (&key, &note)) in white.iter().zip(WHITE_NOTES.iter()).enumerate() {
            map.bind(KeySlot {
                key: key.to_ascii_lowercase(),
                note,
                color: KeyColor::White,
                index,
            })?;
        }

        for (index, (key, note)) in black.iter().zip(BLACK_NOTES.iter()).enumerate() {
            match (key, note) {
                (Some(key), Some(note)) => map.bind(KeySlot {
                    key: key.to_ascii_lowercase(),
                    note: *note,
                    color: KeyColor::Black,
                    index,
                })?,
                (Some(_), None) => return Err(KeyMapError::NoBlackNote(index)),
                (None, _) => {}
            }
        }

        Ok(map)
    }

    /// Parse slot strings as they appear in configuration; an empty
    /// string leaves the slot unbound
    pub fn from_strings(white: &[String], black: &[String]) -> Result<Self, KeyMapError> {
        let white_keys = white
            .iter()
            .enumerate()
            .map(|(i, s)| parse_slot(s)?.ok_or(KeyMapError::UnboundWhiteKey(i)))
            .collect::<Result<Vec<_>, _>>()?;
        let black_keys = black
            .iter()
            .map(|s| parse_slot(s))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&white_keys, &black_keys)
    }

    fn bind(&mut self, slot: KeySlot) -> Result<(), KeyMapError> {
        if slot.key.is_control() || slot.key.is_whitespace() {
            return Err(KeyMapError::NotPrintable(slot.key));
        }
        if self.lookup.insert(slot.key, slot).is_some() {
            return Err(KeyMapError::Duplicate(slot.key));
        }
        match slot.color {
            KeyColor::White => self.white.push(slot),
            KeyColor::Black => self.black.push(slot),
        }
        Ok(())
    }

    /// Look up the note bound to a key (case-insensitive)
    pub fn note_for(&self, key: char) -> Option<Note> {
        self.slot(key).map(|s| s.note)
    }

    /// Look up the full slot for a key (case-insensitive)
    pub fn slot(&self, key: char) -> Option<&KeySlot> {
        self.lookup.get(&key.to_ascii_lowercase())
    }

    /// White keys in slot order
    pub fn white_keys(&self) -> &[KeySlot] {
        &self.white
    }

    /// Bound black keys in slot order
    pub fn black_keys(&self) -> &[KeySlot] {
        &self.black
    }

    /// All bound keys
    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.white.iter().chain(self.black.iter()).map(|s| s.key)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self {
            white: Vec::with_capacity(SLOTS),
            black: Vec::new(),
            lookup: HashMap::new(),
        };
        for (index, (&key, &note)) in DEFAULT_WHITE_KEYS.iter().zip(WHITE_NOTES.iter()).enumerate() {
            let slot = KeySlot { key, note, color: KeyColor::White, index };
            map.lookup.insert(key, slot);
            map.white.push(slot);
        }
        for (index, (key, note)) in DEFAULT_BLACK_KEYS.iter().zip(BLACK_NOTES.iter()).enumerate() {
            if let (Some(key), Some(note)) = (key, note) {
                let slot = KeySlot { key: *key, note: *note, color: KeyColor::Black, index };
                map.lookup.insert(*key, slot);
                map.black.push(slot);
            }
        }
        map
    }
}

fn parse_slot(s: &str) -> Result<Option<char>, KeyMapError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => Ok(Some(c)),
        (Some(c), Some(_)) => Err(KeyMapError::NotPrintable(c)),
    }
}
