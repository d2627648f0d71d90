use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if app.list.is_fetching() {
        let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
        if app.list.is_search_mode() {
            Cow::Owned(format!("{} Searching...", spinner))
        } else {
            Cow::Owned(format!("{} Loading page {}...", spinner, next_page(app)))
        }
    } else if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.search_mode {
        Cow::Borrowed("Type to search | ESC leave | ENTER search now")
    } else if app.list.is_search_mode() {
        Cow::Borrowed("[/]edit search [ESC]clear search [f]avorite [j/k]move [q]uit")
    } else {
        Cow::Borrowed("[/]search [f]avorite [j/k]move [PgDn/End]jump [r]etry [q]uit")
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}

fn next_page(app: &App) -> u32 {
    if app.list.items().is_empty() {
        1
    } else {
        app.list.cursor() + 1
    }
}
