// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Piano keyboard widget.
//!
//! White keys are drawn side by side; black keys overlap the top rows
//! between neighbouring white keys. The same geometry is used for mouse
//! hit-testing.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
};

use crate::music::keymap::SLOTS;
use crate::music::{KeyColor, KeyMap, KeySlot};

/// Width of a white key, including its right-hand gap
pub const WHITE_WIDTH: u16 = 6;
/// Width of a black key
pub const BLACK_WIDTH: u16 = 4;
/// Offset of a black key from the left edge of the white key before it
pub const BLACK_OFFSET: u16 = 4;
/// Height of the whole keyboard
pub const KEY_HEIGHT: u16 = 5;
/// Height of a black key
pub const BLACK_HEIGHT: u16 = 3;

/// Total width of the keyboard
pub const fn piano_width() -> u16 {
    WHITE_WIDTH * SLOTS as u16
}

/// Screen rectangle of a key, before clipping
fn key_rect(area: Rect, slot: &KeySlot) -> Rect {
    let index = slot.index as u16;
    match slot.color {
        KeyColor::White => Rect::new(
            area.x + index * WHITE_WIDTH,
            area.y,
            WHITE_WIDTH - 1,
            KEY_HEIGHT,
        ),
        KeyColor::Black => Rect::new(
            area.x + index * WHITE_WIDTH + BLACK_OFFSET,
            area.y,
            BLACK_WIDTH,
            BLACK_HEIGHT,
        ),
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Key drawn at a terminal cell. Black keys sit on top of white keys.
pub fn key_at(area: Rect, keymap: &KeyMap, column: u16, row: u16) -> Option<char> {
    if !contains(area, column, row) {
        return None;
    }
    keymap
        .black_keys()
        .iter()
        .chain(keymap.white_keys().iter())
        .find(|slot| contains(key_rect(area, slot).intersection(area), column, row))
        .map(|slot| slot.key)
}

/// Piano keyboard widget
pub struct PianoWidget<'a> {
    keymap: &'a KeyMap,
    held: &'a [char],
    block: Option<Block<'a>>,
}

impl<'a> PianoWidget<'a> {
    /// Create a widget highlighting the held keys
    pub fn new(keymap: &'a KeyMap, held: &'a [char]) -> Self {
        Self {
            keymap,
            held,
            block: None,
        }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn is_held(&self, key: char) -> bool {
        self.held.contains(&key)
    }

    fn render_key(&self, area: Rect, slot: &KeySlot, buf: &mut Buffer) {
        let rect = key_rect(area, slot).intersection(area);
        if rect.is_empty() {
            return;
        }

        let held = self.is_held(slot.key);
        let (bg, fg) = match (slot.color, held) {
            (_, true) => (Color::Yellow, Color::Black),
            (KeyColor::White, false) => (Color::White, Color::Black),
            (KeyColor::Black, false) => (Color::Black, Color::White),
        };
        buf.set_style(rect, Style::default().bg(bg).fg(fg));
        if rect.width < 2 {
            return;
        }

        // key on the bottom row, note name above it; labels stay inside the key
        let room = (rect.width - 1) as usize;
        let bottom = rect.y + rect.height - 1;
        let label = slot.key.to_ascii_uppercase().to_string();
        buf.set_stringn(rect.x + 1, bottom, &label, room, Style::default().add_modifier(Modifier::BOLD));
        if rect.height > 1 && slot.color == KeyColor::White {
            buf.set_stringn(rect.x + 1, bottom - 1, slot.note.name(), room, Style::default());
        }
    }
}

impl Widget for PianoWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        for slot in self.keymap.white_keys() {
            self.render_key(area, slot, buf);
        }
        for slot in self.keymap.black_keys() {
            self.render_key(area, slot, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(2, 1, piano_width(), KEY_HEIGHT)
    }

    #[test]
    fn test_white_key_hits() {
        let keymap = KeyMap::default();
        assert_eq!(key_at(area(), &keymap, 2, 5), Some('a'));
        assert_eq!(key_at(area(), &keymap, 8, 5), Some('s'));
        assert_eq!(key_at(area(), &keymap, 2 + 7 * WHITE_WIDTH, 4), Some('k'));
    }

    #[test]
    fn test_black_key_overlaps_white() {
        let keymap = KeyMap::default();
        // top rows between C and D belong to C#
        assert_eq!(key_at(area(), &keymap, 2 + BLACK_OFFSET, 1), Some('w'));
        // the same column below the black key is D's
        assert_eq!(key_at(area(), &keymap, 2 + BLACK_OFFSET + 2, 5), Some('s'));
    }

    #[test]
    fn test_missing_black_key_falls_through() {
        let keymap = KeyMap::default();
        // no black key between E and F
        assert_eq!(key_at(area(), &keymap, 2 + 2 * WHITE_WIDTH + BLACK_OFFSET, 1), Some('d'));
    }

    #[test]
    fn test_gap_and_outside() {
        let keymap = KeyMap::default();
        // gap column right of C, below black keys
        assert_eq!(key_at(area(), &keymap, 2 + WHITE_WIDTH - 1, 5), None);
        assert_eq!(key_at(area(), &keymap, 0, 0), None);
        assert_eq!(key_at(area(), &keymap, 2, 6), None);
    }

    #[test]
    fn test_render_highlights_held_keys() {
        let keymap = KeyMap::default();
        let held = ['s'];
        let rect = Rect::new(0, 0, piano_width(), KEY_HEIGHT);
        let mut buf = Buffer::empty(rect);
        PianoWidget::new(&keymap, &held).render(rect, &mut buf);

        assert_eq!(buf[(0, 4)].bg, Color::White);
        assert_eq!(buf[(0, 4)].symbol(), " ");
        assert_eq!(buf[(1, 4)].symbol(), "A");
        assert_eq!(buf[(1, 3)].symbol(), "C");
        assert_eq!(buf[(WHITE_WIDTH, 4)].bg, Color::Yellow);
        assert_eq!(buf[(BLACK_OFFSET, 0)].bg, Color::Black);
        assert_eq!(buf[(BLACK_OFFSET + 1, 2)].symbol(), "W");
    }

    #[test]
    fn test_render_clips_to_small_area() {
        let keymap = KeyMap::default();
        let rect = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(rect);
        PianoWidget::new(&keymap, &[]).render(rect, &mut buf);
        assert_eq!(buf[(0, 0)].bg, Color::White);
    }

    #[test]
    fn test_clipped_key_labels_stay_inside() {
        let keymap = KeyMap::default();
        let screen = Rect::new(0, 0, 20, KEY_HEIGHT);
        let mut buf = Buffer::empty(screen);

        // D is cut down to a single column at x = 6
        let area = Rect::new(0, 0, WHITE_WIDTH + 1, KEY_HEIGHT);
        PianoWidget::new(&keymap, &[]).render(area, &mut buf);

        assert_eq!(buf[(WHITE_WIDTH, 4)].bg, Color::White);
        assert_eq!(buf[(WHITE_WIDTH, 4)].symbol(), " ");
        assert_eq!(buf[(WHITE_WIDTH + 1, 4)].symbol(), " ");
        assert_eq!(buf[(WHITE_WIDTH + 1, 3)].symbol(), " ");
    }

    #[test]
    fn test_note_name_truncated_to_key() {
        let keymap = KeyMap::default();
        let screen = Rect::new(0, 0, piano_width() + 4, KEY_HEIGHT);
        let mut buf = Buffer::empty(screen);

        // C+ keeps two columns, room for one character of its name
        let area = Rect::new(0, 0, 7 * WHITE_WIDTH + 2, KEY_HEIGHT);
        PianoWidget::new(&keymap, &[]).render(area, &mut buf);

        assert_eq!(buf[(7 * WHITE_WIDTH + 1, 3)].symbol(), "C");
        assert_eq!(buf[(7 * WHITE_WIDTH + 2, 3)].symbol(), " ");
    }
}
