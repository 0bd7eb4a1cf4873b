//! Input handling: clicks and key presses mapped onto grid operations.
//!
//! Clipboard shortcuts don't touch the platform clipboard here. They return
//! `WriteClipboard`/`ReadClipboard` outcomes carrying a ticket, and the host
//! completes them through `complete_copy`/`complete_cut`/`complete_paste`.

use gridkit_core::{CellPos, Selection};

use crate::grid::Grid;
use crate::input::{InputEvent, InputOutcome, Key, Modifiers};

fn handled(done: bool) -> InputOutcome {
    if done {
        InputOutcome::Handled
    } else {
        InputOutcome::Ignored
    }
}

impl Grid {
    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        match event {
            InputEvent::CellClick { row, col, modifiers } => self.on_cell_click(row, col, modifiers),
            InputEvent::CellDoubleClick { row, col } => handled(self.begin_edit(row, col)),
            InputEvent::HeaderClick { col, modifiers } => {
                self.close_filter_menu();
                let Some(key) = self.visible_column(col).map(|c| c.key.clone()) else {
                    return InputOutcome::Ignored;
                };
                handled(self.toggle_sort(&key, modifiers.shift))
            }
            InputEvent::Key { key, modifiers } => self.on_key(key, modifiers),
            InputEvent::EditorKey { key, modifiers, text } => self.on_editor_key(key, modifiers, &text),
        }
    }

    fn on_cell_click(&mut self, row: usize, col: usize, modifiers: Modifiers) -> InputOutcome {
        self.close_filter_menu();
        if !self.editing.is_editing(row, col) {
            self.cancel_edit();
        }
        let active = if modifiers.shift {
            self.extend_selection(row, col)
        } else {
            self.select_cell(row, col)
        };
        handled(active == Some(CellPos::new(row, col)))
    }

    /// Keys while the grid body has focus.
    fn on_key(&mut self, key: Key, modifiers: Modifiers) -> InputOutcome {
        if self.filter_menu.is_some() {
            return handled(key == Key::Escape && self.close_filter_menu());
        }
        if self.editing.is_active() {
            // The editor owns keys while open; only Escape reaches the grid.
            return handled(key == Key::Escape && self.cancel_edit());
        }

        let shift = modifiers.shift;
        if modifiers.is_command() {
            return self.on_shortcut(key, shift);
        }

        let moved = match key {
            Key::ArrowUp if shift => self.navigate(|s| s.shift_move_up()),
            Key::ArrowUp => self.navigate(|s| s.move_up()),
            Key::ArrowDown if shift => self.navigate(|s| s.shift_move_down()),
            Key::ArrowDown => self.navigate(|s| s.move_down()),
            Key::ArrowLeft if shift => self.navigate(|s| s.shift_move_left()),
            Key::ArrowLeft => self.navigate(|s| s.move_left()),
            Key::ArrowRight if shift => self.navigate(|s| s.shift_move_right()),
            Key::ArrowRight => self.navigate(|s| s.move_right()),
            Key::Tab if shift => self.navigate(|s| s.move_prev()),
            Key::Tab => self.navigate(|s| s.move_next()),
            Key::Home if shift => self.navigate(|s| s.shift_move_to_row_start()),
            Key::Home => self.navigate(|s| s.move_to_row_start()),
            Key::End if shift => self.navigate(|s| s.shift_move_to_row_end()),
            Key::End => self.navigate(|s| s.move_to_row_end()),
            Key::Enter | Key::F2 => {
                let Some(pos) = self.selection.active() else {
                    return InputOutcome::Ignored;
                };
                return handled(self.begin_edit(pos.row, pos.col));
            }
            Key::Delete | Key::Backspace => {
                return handled(self.clear_selected_cells() > 0);
            }
            Key::Escape | Key::Char(_) => return InputOutcome::Ignored,
        };
        handled(moved)
    }

    /// Ctrl/Cmd shortcuts.
    fn on_shortcut(&mut self, key: Key, shift: bool) -> InputOutcome {
        match key {
            Key::Home if shift => handled(self.navigate(|s| s.shift_move_to_start())),
            Key::Home => handled(self.navigate(|s| s.move_to_start())),
            Key::End if shift => handled(self.navigate(|s| s.shift_move_to_end())),
            Key::End => handled(self.navigate(|s| s.move_to_end())),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'z' if shift => handled(self.redo().is_some()),
                'z' => handled(self.undo().is_some()),
                'y' => handled(self.redo().is_some()),
                'a' => handled(self.select_all().is_some()),
                'c' => match self.begin_copy() {
                    Some((ticket, text)) => InputOutcome::WriteClipboard { ticket, text },
                    None => InputOutcome::Ignored,
                },
                'x' => match self.begin_cut() {
                    Some((ticket, text)) => InputOutcome::WriteClipboard { ticket, text },
                    None => InputOutcome::Ignored,
                },
                'v' => match self.begin_paste() {
                    Some(ticket) => InputOutcome::ReadClipboard { ticket },
                    None => InputOutcome::Ignored,
                },
                _ => InputOutcome::Ignored,
            },
            _ => InputOutcome::Ignored,
        }
    }

    /// Keys inside the open editor.
    fn on_editor_key(&mut self, key: Key, modifiers: Modifiers, text: &str) -> InputOutcome {
        if !self.editing.is_active() {
            return InputOutcome::Ignored;
        }
        match key {
            Key::Enter => {
                if self.commit_edit_text(text) {
                    self.navigate(|s| s.move_down());
                }
                InputOutcome::Handled
            }
            Key::Tab => {
                if self.commit_edit_text(text) {
                    if modifiers.shift {
                        self.navigate(|s| s.move_prev());
                    } else {
                        self.navigate(|s| s.move_next());
                    }
                }
                InputOutcome::Handled
            }
            Key::Escape => handled(self.cancel_edit()),
            _ => InputOutcome::Ignored,
        }
    }

    /// Run a selection move. True if the selection changed.
    fn navigate<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Selection) -> Option<CellPos>,
    {
        let before = (self.selection.active(), self.selection.range());
        self.update_selection(f);
        (self.selection.active(), self.selection.range()) != before
    }
}
