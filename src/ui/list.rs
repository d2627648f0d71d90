use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use roster::catalog::Character;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Columns reserved for the species/status suffix.
const DETAIL_WIDTH: usize = 28;

/// Truncate `s` to at most `max` display columns, ending in `...` when cut.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return ".".repeat(max);
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 3 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

fn detail(character: &Character) -> String {
    match (character.species.is_empty(), character.status.is_empty()) {
        (false, false) => format!("{} · {}", character.species, character.status),
        (false, true) => character.species.clone(),
        (true, false) => character.status.clone(),
        (true, true) => String::new(),
    }
}

/// Render the character list panel
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    app.viewport_rows = area.height.saturating_sub(2) as usize;

    let view = app.list.view();
    let name_width = (area.width as usize)
        .saturating_sub(4)
        .saturating_sub(DETAIL_WIDTH)
        .max(8);

    let items: Vec<ListItem> = if view.items.is_empty() {
        let msg = if view.is_fetching {
            "Loading..."
        } else if app.list.is_search_mode() {
            "No characters match"
        } else {
            "No characters loaded. Press r to retry"
        };
        vec![ListItem::new(Span::styled(
            msg,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        view.items
            .iter()
            .map(|entry| {
                let mut spans = Vec::with_capacity(3);
                if entry.is_favorite {
                    spans.push(Span::styled("★ ", Style::default().fg(Color::Yellow)));
                } else {
                    spans.push(Span::raw("  "));
                }
                spans.push(Span::raw(format!(
                    "{:<width$}",
                    truncate_to_width(&entry.character.name, name_width),
                    width = name_width
                )));
                spans.push(Span::styled(
                    format!(" {}", truncate_to_width(&detail(entry.character), DETAIL_WIDTH)),
                    Style::default().fg(Color::Gray),
                ));
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let title = if app.list.is_search_mode() {
        format!("Results ({})", view.items.len())
    } else if app.list.is_exhausted() {
        format!("Characters ({}, all loaded)", view.items.len())
    } else {
        format!("Characters ({})", view.items.len())
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !view.items.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_to_width("Rick Sanchez", 20), "Rick Sanchez");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Rick Sanchez", 8), "Rick ...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK char is two columns wide.
        let out = truncate_to_width("日本語テキスト", 9);
        assert!(out.width() <= 9);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_tiny_width() {
        assert_eq!(truncate_to_width("Morty", 2), "..");
    }

    #[test]
    fn test_detail_formats() {
        let mut c = Character::new(1, "Rick");
        assert_eq!(detail(&c), "");
        c.species = "Human".into();
        assert_eq!(detail(&c), "Human");
        c.status = "Alive".into();
        assert_eq!(detail(&c), "Human · Alive");
    }
}
