//! Input descriptors passed from the host to `Grid::handle_input`.

use gridkit_core::EditSession;

use crate::clipboard::ClipboardTicket;
use crate::value::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, meta: false };

    pub fn shift() -> Self {
        Self { shift: true, ..Self::NONE }
    }

    pub fn command() -> Self {
        Self { ctrl: true, ..Self::NONE }
    }

    /// Ctrl and Cmd are interchangeable for shortcuts.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    Enter,
    Escape,
    F2,
    Delete,
    Backspace,
    Home,
    End,
    Char(char),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Click on a body cell, in visual coordinates.
    CellClick { row: usize, col: usize, modifiers: Modifiers },
    CellDoubleClick { row: usize, col: usize },
    /// Click on a visible column header.
    HeaderClick { col: usize, modifiers: Modifiers },
    /// Key press with focus on the grid body.
    Key { key: Key, modifiers: Modifiers },
    /// Key press inside the open cell editor. `text` is the editor's
    /// current content, used on commit.
    EditorKey { key: Key, modifiers: Modifiers, text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    Handled,
    Ignored,
    /// Write `text` to the platform clipboard, then call
    /// `Grid::complete_copy` or `Grid::complete_cut` with the ticket.
    WriteClipboard { ticket: ClipboardTicket, text: String },
    /// Read the platform clipboard, then call `Grid::complete_paste`.
    ReadClipboard { ticket: ClipboardTicket },
}

/// What the grid is currently doing with input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMode<'a> {
    Idle,
    Editing(&'a EditSession<Value>),
    FilterMenuOpen(&'a str),
}
