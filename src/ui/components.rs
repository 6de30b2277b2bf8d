//! Shared UI components (status bar, modal helpers, draft forms).
//!
//! Small building blocks reused by the books/users screens and the
//! acquisition dialog.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, Confirm, InputMode, ModalState, Theme};
use crate::workflow::{DraftField, DraftForm, FormSlot};

/// Render the bottom status bar with mode and counts.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::SearchBooks => "SEARCH(books)",
        InputMode::SearchUsers => "SEARCH(users)",
        InputMode::Modal => "MODAL",
    };
    let mode = if app.workflow.is_open() { "ADD BOOK" } else { mode };
    let mut msg = format!(
        "mode: {mode}  books:{}/{}  users:{}/{}",
        app.books.visible.len(),
        app.books.all.len(),
        app.users.visible.len(),
        app.users.all.len(),
    );
    if app.books.loading || app.users.loading {
        msg.push_str("  loading...");
    }
    if !app.search_query.is_empty() {
        msg.push_str(&format!("  filter:\"{}\"", app.search_query));
    }
    if let Some(session) = app.gate.session() {
        msg.push_str(&format!("  user:{}", session.user_id));
    }
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn bordered(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let min_w = 44u16.min(max_w);
    let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
    let max_h = area.height.saturating_sub(6).max(5);
    let height = (approx_lines + 4).min(max_h).max(5);
    let rect = centered_rect(min_w, height, area);
    let lines = vec![
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::from(Span::styled("Enter / Esc: close", Style::default().fg(app.theme.muted))),
    ];
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(bordered("Info", &app.theme));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

fn yes_no(choice: Confirm, theme: &Theme) -> Line<'static> {
    let on = Style::default().fg(theme.highlight_fg).add_modifier(Modifier::REVERSED | Modifier::BOLD);
    let off = Style::default().fg(theme.text);
    let (yes, no) = match choice {
        Confirm::Yes => (on, off),
        Confirm::No => (off, on),
    };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(" Yes ", yes),
        Span::raw("   "),
        Span::styled(" No ", no),
    ])
}

/// Render a yes/no confirmation.
pub fn render_confirm_modal(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    title: &str,
    question: String,
    choice: Confirm,
) {
    let width = 56u16.min(area.width.saturating_sub(4)).max(30);
    let rect = centered_rect(width, 8, area);
    let lines = vec![
        Line::raw(question),
        Line::raw(""),
        yes_no(choice, &app.theme),
        Line::raw(""),
        Line::from(Span::styled(
            "Left/Right: choose  Enter: confirm  y/n  Esc: cancel",
            Style::default().fg(app.theme.muted),
        )),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(bordered(title, &app.theme).border_style(Style::default().fg(app.theme.danger)));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Lines for a draft form: five labelled fields, then the two buttons.
pub fn draft_form_lines(form: &DraftForm, theme: &Theme, back_label: &str) -> Vec<Line<'static>> {
    let focused = Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(theme.text);
    let mut lines = Vec::new();

    for field in DraftField::ALL {
        let is_focus = form.slot() == FormSlot::Field(field);
        let marker = if is_focus { "▶ " } else { "  " };
        let cursor = if is_focus && !form.is_busy() { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<12}", field.label()), if is_focus { focused } else { normal }),
            Span::raw(format!("{}{cursor}", form.draft.field(field))),
        ]));
    }
    lines.push(Line::raw(""));

    let button = |label: &str, slot: FormSlot| {
        let style = if form.slot() == slot {
            focused.add_modifier(Modifier::REVERSED)
        } else {
            normal
        };
        Span::styled(format!(" {label} "), style)
    };
    let save_label = if form.is_busy() { "Saving..." } else { "Save" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        button(save_label, FormSlot::Save),
        Span::raw("   "),
        button(back_label, FormSlot::Back),
    ]));

    if let Some(err) = &form.error {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(theme.danger))));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Tab/Up/Down: move  Enter: activate  Ctrl+s: save  Esc: close",
        Style::default().fg(theme.muted),
    )));
    lines
}

/// Render the edit form for an existing book.
pub fn render_edit_modal(f: &mut Frame, area: Rect, app: &AppState, stock: u32, form: &DraftForm) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let rect = centered_rect(width, 16, area);
    let mut lines = draft_form_lines(form, &app.theme, "Back");
    lines.insert(
        5,
        Line::from(vec![
            Span::styled(format!("  {:<12}", "Stock"), Style::default().fg(app.theme.text)),
            Span::raw(format!("{stock}  (+/- on Save)")),
        ]),
    );
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(bordered("Edit book", &app.theme));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the help modal, listing the configured key for each action.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(40);
    let height = 24u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let entries: [(&str, KeyAction); 15] = [
        ("Add book", KeyAction::AddBook),
        ("Edit book", KeyAction::EditBook),
        ("Delete book", KeyAction::DeleteBook),
        ("Change user role", KeyAction::ToggleRole),
        ("Edit / change role", KeyAction::EnterAction),
        ("Refresh listing", KeyAction::Refresh),
        ("Search", KeyAction::StartSearch),
        ("Switch tab", KeyAction::SwitchTab),
        ("Move up", KeyAction::MoveUp),
        ("Move down", KeyAction::MoveDown),
        ("Page up", KeyAction::PageUp),
        ("Page down", KeyAction::PageDown),
        ("Help", KeyAction::OpenHelp),
        ("Log out", KeyAction::Logout),
        ("Quit", KeyAction::Quit),
    ];

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Dashboard", Style::default().add_modifier(Modifier::BOLD))),
        Line::raw(""),
    ];
    for (label, action) in entries {
        lines.push(Line::from(vec![
            Span::raw(format!("{label:>20}: ")),
            Span::styled(
                app.keymap.keys_for(action).join(", "),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Dialogs", Style::default().add_modifier(Modifier::BOLD))));
    for (label, keys) in [
        ("Move focus", "Tab, Shift+Tab, Up, Down"),
        ("Activate", "Enter"),
        ("Save form", "Ctrl+s"),
        ("Close", "Esc"),
    ] {
        lines.push(Line::from(vec![
            Span::raw(format!("{label:>20}: ")),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(bordered("Help", &app.theme));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Dispatch to the renderer of the open modal.
pub fn render_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    match state {
        ModalState::ConfirmDelete { title, choice, .. } => render_confirm_modal(
            f,
            area,
            app,
            "Delete book",
            format!("Delete \"{title}\"? This cannot be undone."),
            *choice,
        ),
        ModalState::ConfirmRoleChange { name, role, choice, .. } => render_confirm_modal(
            f,
            area,
            app,
            "Change role",
            format!("Change {name}'s role to {}?", role.describe()),
            *choice,
        ),
        ModalState::EditBook { stock, form, .. } => render_edit_modal(f, area, app, *stock, form),
        ModalState::Info { message } => render_info_modal(f, area, app, message),
        ModalState::Help { scroll } => render_help_modal(f, area, app, *scroll),
    }
}
