//! Rendering of the add-book dialog, one view per workflow mode.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::app::{AppState, Theme};
use crate::ui::components::{bordered, centered_rect, draft_form_lines};
use crate::workflow::{AcquisitionMethod, IsbnQuery, Mode, QuerySlot};

pub fn render_acquisition(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let (title, lines, height) = match app.workflow.mode() {
        Mode::Closed => return,
        Mode::ChoosingMethod { selected } => ("Add book", method_lines(*selected, theme), 10),
        Mode::IsbnSearch(query) => ("Add book: search by ISBN", query_lines(query, theme), 11),
        Mode::ManualEntry(form) => ("Add book: manual entry", draft_form_lines(form, theme, "Back"), 15),
        Mode::ReviewResult(form) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    "Review the result before saving.",
                    Style::default().fg(theme.muted),
                )),
                Line::raw(""),
            ];
            lines.extend(draft_form_lines(form, theme, "Search again"));
            ("Add book: review result", lines, 17)
        }
    };

    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let rect = centered_rect(width, height, area);
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(bordered(title, theme).border_style(Style::default().fg(theme.title)));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

fn method_lines(selected: AcquisitionMethod, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::raw("How do you want to add the book?"), Line::raw("")];
    for method in AcquisitionMethod::ALL {
        let is_selected = method == selected;
        let style = if is_selected {
            Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let marker = if is_selected { "▶ " } else { "  " };
        lines.push(Line::from(Span::styled(format!("{marker}{}", method.label()), style)));
        lines.push(Line::from(Span::styled(format!("    {}", method.hint()), Style::default().fg(theme.muted))));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Up/Down: choose  Enter: continue  Esc: close",
        Style::default().fg(theme.muted),
    )));
    lines
}

fn query_lines(query: &IsbnQuery, theme: &Theme) -> Vec<Line<'static>> {
    let focused = Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(theme.text);
    let disabled = Style::default().fg(theme.muted);

    let input_focus = query.slot() == QuerySlot::Input;
    let cursor = if input_focus && !query.is_busy() { "_" } else { "" };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(if input_focus { "▶ ISBN: " } else { "  ISBN: " }, if input_focus { focused } else { normal }),
            Span::raw(format!("{}{cursor}", query.isbn)),
        ]),
        Line::raw(""),
    ];

    let search_label = if query.is_busy() { " Searching... " } else { " Search " };
    let search_style = match (query.slot() == QuerySlot::Search, query.can_search()) {
        (true, _) => focused.add_modifier(Modifier::REVERSED),
        (false, true) => normal,
        (false, false) => disabled,
    };
    let back_style = if query.slot() == QuerySlot::Back {
        focused.add_modifier(Modifier::REVERSED)
    } else {
        normal
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(search_label, search_style),
        Span::raw("   "),
        Span::styled(" Back ", back_style),
    ]));

    if let Some(err) = &query.error {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(theme.danger))));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Tab: move  Enter: search  Esc: close",
        Style::default().fg(theme.muted),
    )));
    lines
}
