pub mod acquisition;
pub mod books;
pub mod components;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::app::{ActiveTab, AppState, InputMode};
use crate::session::Gate;
use crate::ui::components::{bordered, centered_rect};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    render_header(f, root[0], app);

    match app.gate.clone() {
        Gate::LoginRequired => {
            render_gate(
                f,
                root[1],
                app,
                "Login required",
                vec![
                    "No session found.".to_string(),
                    String::new(),
                    "Start with --user-id <id> --role ADMIN [--token <token>],".to_string(),
                    "or set LENDING_ADMIN_USER_ID / LENDING_ADMIN_ROLE.".to_string(),
                ],
            );
        }
        Gate::AccessDenied(session) => {
            let who = session.user_id;
            render_gate(
                f,
                root[1],
                app,
                "Access denied",
                vec![
                    format!("Signed in as {who}, who is not an administrator."),
                    String::new(),
                    "Only ADMIN accounts may use this dashboard. L: log out".to_string(),
                ],
            );
        }
        Gate::Authorized(_) => render_dashboard(f, root[1], app),
    }

    components::render_status_bar(f, root[2], app);

    if app.workflow.is_open() {
        acquisition::render_acquisition(f, f.area(), app);
    }
    if let Some(state) = app.modal.clone() {
        components::render_modal(f, f.area(), app, &state);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(format!("[{label}]"), Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(format!(" {label} "))
        }
    };
    let mut spans = vec![
        tab("Books", app.active_tab == ActiveTab::Books),
        Span::raw(" "),
        tab("Users", app.active_tab == ActiveTab::Users),
    ];
    match app.input_mode {
        InputMode::SearchBooks => spans.push(Span::raw(format!("   Search books: {}_", app.search_query))),
        InputMode::SearchUsers => spans.push(Span::raw(format!("   Search users: {}_", app.search_query))),
        InputMode::Normal | InputMode::Modal => {
            spans.push(Span::styled(
                "   n: add  e: edit  d: delete  r: role  /: search  ?: help  q: quit",
                Style::default().fg(app.theme.muted),
            ));
        }
    }
    let p = Paragraph::new(Line::from(spans))
        .block(bordered("lending-admin", &app.theme))
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)].as_ref())
        .split(area);

    match app.active_tab {
        ActiveTab::Books => {
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(13), Constraint::Min(4)].as_ref())
                .split(body[1]);
            books::render_books_table(f, body[0], app);
            books::render_book_details(f, right[0], app);
            books::render_book_owners(f, right[1], app);
        }
        ActiveTab::Users => {
            users::render_users_table(f, body[0], app);
            users::render_user_details(f, body[1], app);
        }
    }
}

fn render_gate(f: &mut Frame, area: Rect, app: &AppState, title: &str, body: Vec<String>) {
    let width = 64u16.min(area.width.saturating_sub(2)).max(30);
    let rect = centered_rect(width, body.len() as u16 + 4, area);
    let mut lines: Vec<Line> = body.into_iter().map(Line::raw).collect();
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("q: quit", Style::default().fg(app.theme.muted))));
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(bordered(title, &app.theme).border_style(Style::default().fg(app.theme.danger)));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
