use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use crate::api::Role;
use crate::app::{AppState, Theme};
use crate::ui::books::{DATE_FORMAT, placeholder};
use crate::ui::components::bordered;

fn role_badge(role: Role, theme: &Theme) -> Cell<'static> {
    let style = match role {
        Role::Admin => Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        Role::User => Style::default().fg(theme.muted),
    };
    Cell::from(format!("[{}]", role.as_str())).style(style)
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let block = bordered("Users", &app.theme);
    if app.users.visible.is_empty() {
        let text = placeholder(app.users.loading, !app.users.all.is_empty(), "No users registered yet");
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
    let start = (app.users.selected / per_page) * per_page;
    let end = (start + per_page).min(app.users.visible.len());

    let rows = app.users.visible[start..end].iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.users.selected {
            Style::default().fg(app.theme.highlight_fg).bg(app.theme.highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            role_badge(u.role, &app.theme),
        ])
        .style(style)
    });

    let widths = [Constraint::Percentage(35), Constraint::Percentage(45), Constraint::Length(8)];
    let header = Row::new(vec!["NAME", "EMAIL", "ROLE"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths).header(header).block(block).column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let block = bordered("Details", &app.theme);
    let Some(user) = app.users.current() else {
        f.render_widget(block, area);
        return;
    };
    let label = Style::default().fg(app.theme.muted);
    let lines = vec![
        Line::from(Span::styled(user.name.clone(), Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))),
        Line::raw(user.email.clone()),
        Line::raw(""),
        Line::from(vec![Span::styled("Role: ", label), Span::raw(user.role.describe())]),
        Line::from(vec![Span::styled("Books in collection: ", label), Span::raw(user.counts.user_books.to_string())]),
        Line::from(vec![Span::styled("Borrows: ", label), Span::raw(user.counts.borrows.to_string())]),
        Line::from(vec![
            Span::styled("Joined: ", label),
            Span::raw(user.created_at.format(DATE_FORMAT).to_string()),
        ]),
    ];
    let p = Paragraph::new(lines).style(Style::default().fg(app.theme.text)).block(block);
    f.render_widget(p, area);
}
