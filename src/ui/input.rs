//! Input handling for the TUI.
//!
//! Keystrokes go either to the search box or to list navigation, depending on
//! whether the search box has focus.

use crate::app::{App, MAX_SEARCH_LENGTH};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    // Raw mode swallows SIGINT, so Ctrl+C arrives as a key.
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.search_mode {
        handle_search_input(app, code);
        return Action::Continue;
    }

    handle_browse_input(app, code, modifiers)
}

fn handle_browse_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let page = app.viewport_rows.max(1);

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(1),
        KeyCode::PageDown => app.nav_down(page),
        KeyCode::PageUp => app.nav_up(page),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.nav_down(page / 2)
        }
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => app.nav_up(page / 2),
        KeyCode::End | KeyCode::Char('G') => app.nav_down(usize::MAX),
        KeyCode::Home | KeyCode::Char('g') => app.nav_up(usize::MAX),
        KeyCode::Char('/') => {
            app.search_mode = true;
        }
        KeyCode::Char('f') | KeyCode::Char(' ') => app.toggle_favorite(),
        KeyCode::Char('r') => {
            // Manual retry after a failed page or an empty first load.
            if app.list.is_search_mode() {
                app.set_status("Clear the search to load more characters");
            } else if app.list.is_exhausted() {
                app.set_status("End of catalog");
            } else if app.list.maybe_fetch_next_page() {
                app.set_status("Loading more characters...");
            }
        }
        KeyCode::Esc => {
            if app.list.is_search_mode() || !app.search_input.is_empty() {
                app.search_input.clear();
                app.edit_search();
                app.commit_search();
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.search_mode = false;
        }
        KeyCode::Enter => {
            app.search_mode = false;
            app.commit_search();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.edit_search();
        }
        KeyCode::Char(c) => {
            if app.search_input.len() >= MAX_SEARCH_LENGTH {
                app.set_status(format!(
                    "Search query at max length ({} chars)",
                    MAX_SEARCH_LENGTH
                ));
                return;
            }
            app.search_input.push(c);
            app.edit_search();
        }
        _ => {}
    }
}
