use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the search box
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let border_style = if app.search_mode {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let line = if app.search_input.is_empty() && !app.search_mode {
        Line::from(Span::styled(
            "Press / to search by name",
            Style::default().fg(Color::DarkGray),
        ))
    } else if app.search_mode {
        Line::from(format!("{}_", app.search_input))
    } else {
        Line::from(app.search_input.as_str())
    };

    let title = match app.list.committed_term() {
        Some(term) => format!("Search: {}", term),
        None => "Search".to_string(),
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(paragraph, area);
}
