// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the piano.
//!
//! Provides a ratatui-based terminal interface with the status lines,
//! a clickable piano keyboard and a help overlay.

pub mod piano;

pub use piano::PianoWidget;

use std::collections::BTreeMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::control::{format_shortcut, Feedback, KeyboardController};
use crate::engine::{PlaybackEngine, Status};
use crate::music::KeyMap;

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// UI-only state
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl UiState {
    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Apply dispatcher feedback. Returns false when the app should exit.
    pub fn apply(&mut self, feedback: Feedback) -> bool {
        match feedback {
            Feedback::None => {}
            Feedback::Message(msg) => self.set_status(msg),
            Feedback::ToggleHelp => self.show_help = !self.show_help,
            Feedback::Quit => return false,
        }
        true
    }
}

/// Terminal UI application
pub struct App {
    /// UI state
    state: UiState,
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
    /// Terminal reports key releases
    key_releases: bool,
    /// Where the keyboard was last drawn
    piano_area: Rect,
}

impl App {
    /// Set up the terminal
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let key_releases = supports_keyboard_enhancement().unwrap_or(false);
        if key_releases {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            tracing::warn!("terminal does not report key releases; notes end on their own");
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            state: UiState::default(),
            terminal,
            frame_rate: 60,
            running: true,
            key_releases,
            piano_area: Rect::default(),
        })
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Check if the terminal reports key releases
    pub fn reports_key_releases(&self) -> bool {
        self.key_releases
    }

    /// Show a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.state.set_status(message);
    }

    /// Apply dispatcher feedback
    pub fn apply(&mut self, feedback: Feedback) {
        if !self.state.apply(feedback) {
            self.quit();
        }
    }

    /// Piano key drawn at a terminal cell
    pub fn key_at(&self, keymap: &KeyMap, column: u16, row: u16) -> Option<char> {
        piano::key_at(self.piano_area, keymap, column, row)
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, engine: &PlaybackEngine, keyboard: &KeyboardController) -> io::Result<()> {
        self.state.clear_expired_status();

        let status = engine.status();
        let held = engine.held_keys();
        let keymap = engine.keymap();
        let state = &self.state;
        let mut piano_area = self.piano_area;

        self.terminal.draw(|frame| {
            let area = frame.area();

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(4),                      // Status
                    Constraint::Length(piano::KEY_HEIGHT + 2),  // Piano
                    Constraint::Min(0),                         // Padding
                    Constraint::Length(1),                      // Status bar
                ])
                .split(area);

            render_status(frame, chunks[0], &status);

            let block = Block::default().borders(Borders::ALL).title(" Piano ");
            piano_area = block.inner(chunks[1]);
            frame.render_widget(PianoWidget::new(keymap, &held).block(block), chunks[1]);

            render_status_bar(frame, chunks[3], state);

            if state.show_help {
                render_help_overlay(frame, area, keyboard, keymap);
            }
        })?;

        self.piano_area = piano_area;
        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        if self.key_releases {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the status lines
fn render_status(frame: &mut Frame, area: Rect, status: &Status) {
    let block = Block::default().borders(Borders::ALL).title(" Status ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let on = |flag: bool, color: Color| {
        if flag {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let mut settings = vec![
        Span::styled(status.octave_text(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(status.volume_text(), Style::default().fg(Color::Magenta)),
        Span::raw("  "),
        Span::styled(status.sustain_text(), on(status.sustain, Color::Green)),
        Span::raw("  "),
        Span::styled(status.recording_text(), on(status.recording, Color::Red)),
    ];
    if status.replaying {
        settings.push(Span::raw("  "));
        settings.push(Span::styled(
            "▶ REPLAY",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(
            status.playing_text(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(settings),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg, Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " z/x: Octave | ↑/↓: Volume | m: Sustain | r: Record | p: Play | v: Export | ?: Help | Esc: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Help entries grouped by category, sorted for display
pub fn help_entries(
    keyboard: &KeyboardController,
    keymap: &KeyMap,
) -> Vec<(String, Vec<(String, String)>)> {
    let mut grouped: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();

    for (category, bindings) in keyboard.bindings_by_category() {
        let mut entries: Vec<(String, String)> = bindings
            .iter()
            .map(|b| (format_shortcut(&b.shortcut), b.description.clone()))
            .collect();
        entries.sort();
        grouped.insert(category, entries);
    }

    let white: String = keymap
        .white_keys()
        .iter()
        .map(|slot| slot.key.to_ascii_uppercase())
        .collect();
    let black: String = keymap
        .black_keys()
        .iter()
        .map(|slot| slot.key.to_ascii_uppercase())
        .collect();
    grouped.insert(
        "Keys".to_string(),
        vec![
            (white, "White keys C to C+".to_string()),
            (black, "Black keys".to_string()),
        ],
    );

    grouped.into_iter().collect()
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect, keyboard: &KeyboardController, keymap: &KeyMap) {
    let entries = help_entries(keyboard, keymap);
    let rows: usize = entries.iter().map(|(_, e)| e.len() + 2).sum();

    // Calculate centered area
    let width = 50.min(area.width.saturating_sub(4));
    let height = (rows as u16 + 1).min(area.height.saturating_sub(2));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let mut lines = Vec::new();
    for (category, bindings) in entries {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            category,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (shortcut, description) in bindings {
            lines.push(Line::from(format!("  {:<12}{}", shortcut, description)));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
