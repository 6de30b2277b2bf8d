use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, Wrap};

use crate::app::AppState;
use crate::ui::components::bordered;

pub const DATE_FORMAT: &str = "%-d %b %Y";

fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Placeholder shown instead of an empty table.
pub fn placeholder(loading: bool, any_loaded: bool, empty_text: &str) -> &str {
    if loading {
        "Loading data..."
    } else if any_loaded {
        "No matches"
    } else {
        empty_text
    }
}

pub fn render_books_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let block = bordered("Books", &app.theme);
    if app.books.visible.is_empty() {
        let text = placeholder(app.books.loading, !app.books.all.is_empty(), "No books registered yet");
        let p = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }
    let per_page = app.rows_per_page.max(1);
    let start = (app.books.selected / per_page) * per_page;
    let end = (start + per_page).min(app.books.visible.len());

    let rows = app.books.visible[start..end].iter().enumerate().map(|(i, b)| {
        let style = if start + i == app.books.selected {
            Style::default().fg(app.theme.highlight_fg).bg(app.theme.highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let available = if b.available == 0 {
            Cell::from(b.available.to_string()).style(Style::default().fg(app.theme.danger))
        } else {
            Cell::from(b.available.to_string())
        };
        Row::new(vec![
            Cell::from(b.title.clone()),
            Cell::from(b.author.clone()),
            Cell::from(or_dash(b.isbn.as_deref())),
            Cell::from(b.stock.to_string()),
            available,
        ])
        .style(style)
    });

    let widths = [
        Constraint::Percentage(38),
        Constraint::Percentage(26),
        Constraint::Length(15),
        Constraint::Length(6),
        Constraint::Length(6),
    ];
    let header = Row::new(vec!["TITLE", "AUTHOR", "ISBN", "STOCK", "AVAIL"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths).header(header).block(block).column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_book_details(f: &mut Frame, area: Rect, app: &AppState) {
    let block = bordered("Details", &app.theme);
    let Some(book) = app.books.current() else {
        f.render_widget(block, area);
        return;
    };
    let label = Style::default().fg(app.theme.muted);
    let lines = vec![
        Line::from(Span::styled(book.title.clone(), Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))),
        Line::raw(format!("by {}", book.author)),
        Line::raw(""),
        Line::from(vec![Span::styled("ISBN: ", label), Span::raw(or_dash(book.isbn.as_deref()))]),
        Line::from(vec![
            Span::styled("Copies: ", label),
            Span::raw(format!("{} available of {}", book.available, book.stock)),
        ]),
        Line::from(vec![Span::styled("Cover: ", label), Span::raw(or_dash(book.cover_image.as_deref()))]),
        Line::from(vec![
            Span::styled("Added: ", label),
            Span::raw(book.created_at.format(DATE_FORMAT).to_string()),
            Span::styled("  Updated: ", label),
            Span::raw(book.updated_at.format(DATE_FORMAT).to_string()),
        ]),
        Line::raw(""),
        Line::raw(or_dash(book.description.as_deref())),
    ];
    let p = Paragraph::new(lines)
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(p, area);
}

pub fn render_book_owners(f: &mut Frame, area: Rect, app: &AppState) {
    let owners = app.books.current().map(|b| b.owners.as_slice()).unwrap_or(&[]);
    let block = bordered(&format!("Owners ({})", owners.len()), &app.theme);

    let rows = owners.iter().map(|o| {
        let status = if o.is_available {
            Cell::from("available").style(Style::default().fg(app.theme.accent))
        } else {
            Cell::from("borrowed").style(Style::default().fg(app.theme.danger))
        };
        Row::new(vec![
            Cell::from(o.user_name.clone()),
            status,
            Cell::from(or_dash(o.location.as_deref())),
        ])
    });
    let widths = [Constraint::Percentage(40), Constraint::Length(10), Constraint::Percentage(40)];
    let header = Row::new(vec!["OWNER", "STATUS", "LOCATION"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));
    let table = Table::new(rows, widths).header(header).block(block).column_spacing(1);
    f.render_widget(table, area);
}
