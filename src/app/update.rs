use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::CatalogApi;
use crate::app::keymap::KeyAction;
use crate::app::{ActiveTab, AppState, Confirm, InputMode, ModalState};
use crate::dispatch::{Completion, Envelope, Outcome, Request, Worker};
use crate::search::{apply_search, filter_books, filter_users, search_mode_for};
use crate::session::Gate;
use crate::ui;
use crate::workflow::{AcquisitionMethod, FormSlot, Mode, QuerySlot, Settled};

pub const MSG_BOOK_ADDED: &str = "Book added";
pub const MSG_FETCH_BOOKS_FAILED: &str = "Failed to fetch books";
pub const MSG_FETCH_USERS_FAILED: &str = "Failed to fetch users";
pub const MSG_DELETE_FAILED: &str = "Failed to delete book";
pub const MSG_ROLE_CHANGE_FAILED: &str = "Failed to change user role";
pub const MSG_UPDATE_FAILED: &str = "Failed to update book";

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut AppState,
    worker: &Worker,
) -> Result<()> {
    app.mount();

    loop {
        for envelope in std::mem::take(&mut app.outbox) {
            worker.submit(envelope);
        }
        for completion in worker.drain() {
            apply_completion(app, completion);
        }

        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if handle_key(app, key) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Execute every queued request on the current thread until the outbox is empty.
pub fn run_inline(app: &mut AppState, api: &dyn CatalogApi) {
    while !app.outbox.is_empty() {
        for envelope in std::mem::take(&mut app.outbox) {
            let completion = envelope.execute(api);
            apply_completion(app, completion);
        }
    }
}

/// Route a backend answer to whoever is waiting for it.
pub fn apply_completion(app: &mut AppState, completion: Completion) {
    let Completion { ticket, outcome } = completion;
    if !app.gate.is_authorized() {
        debug!("discarding #{} received after logout", ticket.0);
        return;
    }
    match outcome {
        Outcome::Books(result) => {
            if app.books.latest != Some(ticket) {
                debug!("discarding superseded book listing #{}", ticket.0);
                return;
            }
            app.books.loading = false;
            match result {
                Ok(books) => {
                    app.books.all = books;
                    filter_books(app);
                }
                Err(e) => {
                    warn!("fetching books failed: {e}");
                    app.info(e.user_message(MSG_FETCH_BOOKS_FAILED));
                }
            }
        }
        Outcome::Users(result) => {
            if app.users.latest != Some(ticket) {
                debug!("discarding superseded user listing #{}", ticket.0);
                return;
            }
            app.users.loading = false;
            match result {
                Ok(users) => {
                    app.users.all = users;
                    filter_users(app);
                }
                Err(e) => {
                    warn!("fetching users failed: {e}");
                    app.info(e.user_message(MSG_FETCH_USERS_FAILED));
                }
            }
        }
        Outcome::Lookup(result) => {
            app.workflow.apply_lookup(ticket, result);
        }
        Outcome::Created(result) => match app.workflow.apply_created(ticket, result) {
            Settled::Saved => {
                app.refresh_books();
                app.info(MSG_BOOK_ADDED);
            }
            Settled::Stale { saved: true } => app.refresh_books(),
            Settled::Rejected(msg) => warn!("creating book failed: {msg}"),
            Settled::Stale { saved: false } => {}
        },
        Outcome::Updated(result) => {
            if app.edit_pending != Some(ticket) {
                if result.is_ok() {
                    app.refresh_books();
                }
                return;
            }
            app.edit_pending = None;
            match result {
                Ok(()) => {
                    if matches!(app.modal, Some(ModalState::EditBook { .. })) {
                        app.close_modal();
                    }
                    app.refresh_books();
                }
                Err(e) => {
                    if let Some(ModalState::EditBook { form, .. }) = &mut app.modal {
                        form.pending = None;
                        form.error = Some(e.user_message(MSG_UPDATE_FAILED));
                    }
                }
            }
        }
        Outcome::Deleted(result) => match result {
            Ok(()) => app.refresh_books(),
            Err(e) => app.info(e.user_message(MSG_DELETE_FAILED)),
        },
        Outcome::RoleChanged(result) => match result {
            Ok(()) => app.refresh_users(),
            Err(e) => app.info(e.user_message(MSG_ROLE_CHANGE_FAILED)),
        },
    }
}

/// Handle one key press. Returns `true` when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.gate {
        Gate::LoginRequired => return app.keymap.resolve(&key) == Some(KeyAction::Quit),
        Gate::AccessDenied(_) => {
            match app.keymap.resolve(&key) {
                Some(KeyAction::Quit) => return true,
                Some(KeyAction::Logout) => app.logout(),
                _ => {}
            }
            return false;
        }
        Gate::Authorized(_) => {}
    }

    if app.modal.is_some() {
        handle_modal_key(app, key);
        return false;
    }
    if app.workflow.is_open() {
        handle_workflow_key(app, key);
        return false;
    }

    match app.input_mode {
        InputMode::SearchBooks | InputMode::SearchUsers => {
            handle_search_key(app, key.code);
            false
        }
        InputMode::Normal | InputMode::Modal => handle_normal_key(app, key),
    }
}

fn handle_search_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.search_query.clear();
            apply_search(app);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.search_query.pop();
            apply_search(app);
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            apply_search(app);
        }
        _ => {}
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> bool {
    let Some(action) = app.keymap.resolve(&key) else {
        return false;
    };
    match action {
        KeyAction::Quit => return true,
        KeyAction::SwitchTab => {
            app.active_tab = match app.active_tab {
                ActiveTab::Books => ActiveTab::Users,
                ActiveTab::Users => ActiveTab::Books,
            };
            if !app.search_query.is_empty() {
                app.search_query.clear();
                filter_books(app);
                filter_users(app);
            }
        }
        KeyAction::StartSearch => {
            app.search_query.clear();
            app.input_mode = search_mode_for(app.active_tab);
        }
        KeyAction::AddBook => {
            if app.active_tab == ActiveTab::Books {
                app.workflow.open();
            }
        }
        KeyAction::EditBook => {
            if app.active_tab == ActiveTab::Books {
                app.begin_edit_selected();
            }
        }
        KeyAction::DeleteBook => {
            if app.active_tab == ActiveTab::Books {
                app.confirm_delete_selected();
            }
        }
        KeyAction::ToggleRole => {
            if app.active_tab == ActiveTab::Users {
                app.confirm_role_change_selected();
            }
        }
        KeyAction::EnterAction => match app.active_tab {
            ActiveTab::Books => app.begin_edit_selected(),
            ActiveTab::Users => app.confirm_role_change_selected(),
        },
        KeyAction::Refresh => match app.active_tab {
            ActiveTab::Books => app.refresh_books(),
            ActiveTab::Users => app.refresh_users(),
        },
        KeyAction::OpenHelp => app.open_modal(ModalState::Help { scroll: 0 }),
        KeyAction::Logout => app.logout(),
        KeyAction::MoveUp => move_selection(app, -1),
        KeyAction::MoveDown => move_selection(app, 1),
        KeyAction::PageUp => move_selection(app, -(app.rows_per_page.max(1) as isize)),
        KeyAction::PageDown => move_selection(app, app.rows_per_page.max(1) as isize),
        KeyAction::Ignore => {}
    }
    false
}

fn move_selection(app: &mut AppState, delta: isize) {
    let (selected, len) = match app.active_tab {
        ActiveTab::Books => (&mut app.books.selected, app.books.visible.len()),
        ActiveTab::Users => (&mut app.users.selected, app.users.visible.len()),
    };
    if len == 0 {
        *selected = 0;
        return;
    }
    let next = (*selected as isize + delta).clamp(0, len as isize - 1);
    *selected = next as usize;
}

fn handle_workflow_key(app: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.workflow.cancel();
        return;
    }
    let save_shortcut = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s');

    match app.workflow.mode().clone() {
        Mode::Closed => {}
        Mode::ChoosingMethod { selected } => match key.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                let other = match selected {
                    AcquisitionMethod::IsbnSearch => AcquisitionMethod::Manual,
                    AcquisitionMethod::Manual => AcquisitionMethod::IsbnSearch,
                };
                app.workflow.select(other);
            }
            KeyCode::Char('i') => app.workflow.choose(AcquisitionMethod::IsbnSearch),
            KeyCode::Char('m') => app.workflow.choose(AcquisitionMethod::Manual),
            KeyCode::Enter => app.workflow.choose(selected),
            _ => {}
        },
        Mode::IsbnSearch(query) => match key.code {
            KeyCode::Tab | KeyCode::Down => {
                if let Some(q) = app.workflow.query_mut() {
                    q.focus_next();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(q) = app.workflow.query_mut() {
                    q.focus_prev();
                }
            }
            KeyCode::Enter => match query.slot() {
                QuerySlot::Input | QuerySlot::Search => submit_lookup(app),
                QuerySlot::Back => app.workflow.back(),
            },
            KeyCode::Backspace => {
                if let Some(q) = app.workflow.query_mut() {
                    q.backspace();
                }
            }
            KeyCode::Char(c) => {
                if let Some(q) = app.workflow.query_mut() {
                    q.input(c);
                }
            }
            _ => {}
        },
        Mode::ManualEntry(form) | Mode::ReviewResult(form) => {
            if save_shortcut {
                submit_draft(app);
                return;
            }
            match key.code {
                KeyCode::Tab | KeyCode::Down => {
                    if let Some(f) = app.workflow.form_mut() {
                        f.focus_next();
                    }
                }
                KeyCode::BackTab | KeyCode::Up => {
                    if let Some(f) = app.workflow.form_mut() {
                        f.focus_prev();
                    }
                }
                KeyCode::Enter => match form.slot() {
                    FormSlot::Field(_) => {
                        if let Some(f) = app.workflow.form_mut() {
                            f.focus_next();
                        }
                    }
                    FormSlot::Save => submit_draft(app),
                    FormSlot::Back => {
                        if !form.is_busy() {
                            app.workflow.back();
                        }
                    }
                },
                KeyCode::Backspace => {
                    if let Some(f) = app.workflow.form_mut() {
                        f.backspace();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(f) = app.workflow.form_mut() {
                        f.input(c);
                    }
                }
                _ => {}
            }
        }
    }
}

fn submit_lookup(app: &mut AppState) {
    match app.workflow.submit_lookup(&mut app.tickets) {
        Ok(Some(envelope)) => app.outbox.push(envelope),
        Ok(None) => {}
        Err(e) => debug!("lookup not sent: {e}"),
    }
}

fn submit_draft(app: &mut AppState) {
    match app.workflow.submit_draft(&mut app.tickets) {
        Ok(Some(envelope)) => app.outbox.push(envelope),
        Ok(None) => {}
        Err(e) => debug!("book not sent: {e}"),
    }
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) {
    let code = key.code;
    match &mut app.modal {
        Some(ModalState::ConfirmDelete { book_id, choice, .. }) => match code {
            KeyCode::Esc | KeyCode::Char('n') => app.close_modal(),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                *choice = choice.toggled();
            }
            KeyCode::Char('y') => {
                let id = book_id.clone();
                app.close_modal();
                app.dispatch(Request::DeleteBook { id });
            }
            KeyCode::Enter => {
                let confirmed = (*choice == Confirm::Yes).then(|| book_id.clone());
                app.close_modal();
                if let Some(id) = confirmed {
                    app.dispatch(Request::DeleteBook { id });
                }
            }
            _ => {}
        },
        Some(ModalState::ConfirmRoleChange { user_id, role, choice, .. }) => match code {
            KeyCode::Esc | KeyCode::Char('n') => app.close_modal(),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                *choice = choice.toggled();
            }
            KeyCode::Char('y') => {
                let request = Request::ChangeRole { user_id: user_id.clone(), role: *role };
                app.close_modal();
                app.dispatch(request);
            }
            KeyCode::Enter => {
                let confirmed = (*choice == Confirm::Yes)
                    .then(|| Request::ChangeRole { user_id: user_id.clone(), role: *role });
                app.close_modal();
                if let Some(request) = confirmed {
                    app.dispatch(request);
                }
            }
            _ => {}
        },
        Some(ModalState::EditBook { book_id, stock, form }) => {
            let save = key.modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('s');
            let slot = form.slot();
            match code {
                KeyCode::Esc => {
                    app.edit_pending = None;
                    app.close_modal();
                }
                _ if save || (code == KeyCode::Enter && slot == FormSlot::Save) => {
                    if form.is_busy() {
                        return;
                    }
                    match form.draft.validate_update(*stock) {
                        Ok(update) => {
                            let request = Request::UpdateBook { id: book_id.clone(), update };
                            let ticket = app.tickets.issue();
                            form.pending = Some(ticket);
                            form.error = None;
                            app.edit_pending = Some(ticket);
                            app.outbox.push(Envelope { ticket, request });
                        }
                        Err(e) => form.error = Some(e.to_string()),
                    }
                }
                KeyCode::Enter if slot == FormSlot::Back => {
                    app.edit_pending = None;
                    app.close_modal();
                }
                KeyCode::Enter | KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char('+') if slot == FormSlot::Save => *stock = stock.saturating_add(1),
                KeyCode::Char('-') if slot == FormSlot::Save => *stock = stock.saturating_sub(1),
                KeyCode::Char(c) => form.input(c),
                _ => {}
            }
        }
        Some(ModalState::Info { .. }) => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter) {
                app.close_modal();
            }
        }
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => app.close_modal(),
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CatalogBook, LibraryUser, MockCatalogApi, Role, UserCounts};
    use crate::app::Theme;
    use crate::app::keymap::Keymap;
    use crate::dispatch::Ticket;
    use crate::error::AppError;
    use crate::session::Session;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;

    fn press(app: &mut AppState, code: KeyCode) -> bool {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut AppState, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn book(id: &str, title: &str) -> CatalogBook {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        CatalogBook {
            id: id.into(),
            title: title.into(),
            author: "Someone".into(),
            isbn: None,
            description: None,
            cover_image: None,
            stock: 1,
            available: 1,
            created_at: at,
            updated_at: at,
            owners: Vec::new(),
        }
    }

    fn user(id: &str, role: Role) -> LibraryUser {
        LibraryUser {
            id: id.into(),
            name: format!("user {id}"),
            email: format!("{id}@example.org"),
            role,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            counts: UserCounts::default(),
        }
    }

    fn admin_app() -> AppState {
        let session = Session::from_parts("admin-1", Some("ADMIN"), None);
        let mut app = AppState::new(Gate::resolve(session), Theme::dark(), Keymap::default());
        app.books.all = vec![book("b1", "Dune")];
        app.users.all = vec![user("u1", Role::User)];
        filter_books(&mut app);
        filter_users(&mut app);
        app
    }

    #[test]
    fn declined_delete_never_reaches_the_backend() {
        let mut app = admin_app();
        // no expectations: any backend call panics
        let api = MockCatalogApi::new();

        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.modal, Some(ModalState::ConfirmDelete { .. })));
        press(&mut app, KeyCode::Enter);
        assert!(app.modal.is_none());

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
        assert!(app.outbox.is_empty());
        run_inline(&mut app, &api);
    }

    #[test]
    fn confirmed_delete_calls_backend_once_and_reloads() {
        let mut app = admin_app();
        let mut api = MockCatalogApi::new();
        api.expect_delete_book().with(eq("b1")).times(1).returning(|_| Ok(()));
        api.expect_list_books().times(1).returning(|| Ok(Vec::new()));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);
        run_inline(&mut app, &api);

        assert!(app.books.visible.is_empty());
        assert!(!app.books.loading);
    }

    #[test]
    fn failed_delete_shows_server_message() {
        let mut app = admin_app();
        let mut api = MockCatalogApi::new();
        api.expect_delete_book().times(1).returning(|_| {
            Err(AppError::Request { status: 409, message: Some("Book is borrowed".into()) })
        });

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        run_inline(&mut app, &api);

        assert_eq!(app.modal, Some(ModalState::Info { message: "Book is borrowed".into() }));
    }

    #[test]
    fn role_change_requires_confirmation() {
        let mut app = admin_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_tab, ActiveTab::Users);

        let mut api = MockCatalogApi::new();
        api.expect_change_role()
            .with(eq("u1"), eq(Role::Admin))
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_list_users().times(1).returning(|| Ok(vec![user("u1", Role::Admin)]));

        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.outbox.is_empty());

        press(&mut app, KeyCode::Enter);
        match &app.modal {
            Some(ModalState::ConfirmRoleChange { role, choice, .. }) => {
                assert_eq!(*role, Role::Admin);
                assert_eq!(*choice, Confirm::No);
            }
            other => panic!("unexpected modal {other:?}"),
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        run_inline(&mut app, &api);

        assert_eq!(app.users.visible[0].role, Role::Admin);
    }

    #[test]
    fn manual_create_closes_dialog_and_refetches_once() {
        let mut app = admin_app();
        let mut api = MockCatalogApi::new();
        api.expect_create_book()
            .withf(|b| b.title == "Bumi" && b.author == "Tere Liye" && b.isbn.is_none())
            .times(1)
            .returning(|_| Ok(()));
        api.expect_list_books()
            .times(1)
            .returning(|| Ok(vec![book("b1", "Dune"), book("b2", "Bumi")]));

        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.workflow.mode(), Mode::ManualEntry(_)));

        type_str(&mut app, "Bumi");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "Tere Liye");
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(app.outbox.len(), 1);
        run_inline(&mut app, &api);

        assert_eq!(*app.workflow.mode(), Mode::Closed);
        assert_eq!(app.books.visible.len(), 2);
        assert_eq!(app.modal, Some(ModalState::Info { message: MSG_BOOK_ADDED.into() }));
    }

    #[test]
    fn blank_isbn_stays_local() {
        let mut app = admin_app();
        let api = MockCatalogApi::new();

        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        run_inline(&mut app, &api);

        match app.workflow.mode() {
            Mode::IsbnSearch(q) => assert_eq!(q.error.as_deref(), Some(crate::workflow::MSG_ISBN_REQUIRED)),
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn lookup_answer_after_cancel_is_discarded() {
        let mut app = admin_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "9786020332956");
        press(&mut app, KeyCode::Enter);
        let in_flight = std::mem::take(&mut app.outbox);
        assert_eq!(in_flight.len(), 1);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);

        let mut api = MockCatalogApi::new();
        api.expect_lookup_isbn().times(1).returning(|_| {
            Ok(crate::api::BookMetadata { title: "Bumi".into(), ..Default::default() })
        });
        for envelope in in_flight {
            let completion = envelope.execute(&api);
            apply_completion(&mut app, completion);
        }

        assert!(matches!(app.workflow.mode(), Mode::IsbnSearch(q) if q.isbn.is_empty()));
    }

    #[test]
    fn older_listing_answer_loses_to_newer() {
        let mut app = admin_app();
        app.refresh_books();
        let first = std::mem::take(&mut app.outbox);
        app.refresh_books();
        let second = std::mem::take(&mut app.outbox);

        let mut api = MockCatalogApi::new();
        let mut calls = 0;
        api.expect_list_books().times(2).returning(move || {
            calls += 1;
            if calls == 1 { Ok(vec![book("new", "Newer")]) } else { Ok(vec![book("old", "Older")]) }
        });

        for envelope in second.into_iter().chain(first) {
            let completion = envelope.execute(&api);
            apply_completion(&mut app, completion);
        }
        assert_eq!(app.books.visible.len(), 1);
        assert_eq!(app.books.visible[0].id, "new");
    }

    #[test]
    fn edit_saves_with_stock_and_reloads() {
        let mut app = admin_app();
        let mut api = MockCatalogApi::new();
        api.expect_update_book()
            .withf(|id, u| id == "b1" && u.book.title == "Dune Messiah" && u.stock == 1)
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_list_books().times(1).returning(|| Ok(vec![book("b1", "Dune Messiah")]));

        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, " Messiah");
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        run_inline(&mut app, &api);

        assert!(app.modal.is_none());
        assert!(app.edit_pending.is_none());
        assert_eq!(app.books.visible[0].title, "Dune Messiah");
    }

    #[test]
    fn gate_screens_only_quit_or_logout() {
        let mut app = AppState::new(Gate::LoginRequired, Theme::dark(), Keymap::default());
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert!(!app.workflow.is_open());
        assert!(press(&mut app, KeyCode::Char('q')));

        let member = Session::from_parts("u9", Some("USER"), None);
        let mut app = AppState::new(Gate::resolve(member), Theme::dark(), Keymap::default());
        app.mount();
        assert!(app.outbox.is_empty());
        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.gate, Gate::LoginRequired);
    }

    #[test]
    fn answers_arriving_after_logout_are_ignored() {
        let mut app = admin_app();
        app.mount();
        let pending = std::mem::take(&mut app.outbox);
        app.logout();

        apply_completion(&mut app, Completion { ticket: Ticket(90), outcome: Outcome::Deleted(Ok(())) });
        apply_completion(&mut app, Completion { ticket: Ticket(91), outcome: Outcome::Updated(Ok(())) });
        apply_completion(
            &mut app,
            Completion {
                ticket: Ticket(92),
                outcome: Outcome::RoleChanged(Err(AppError::Network("reset".into()))),
            },
        );
        for envelope in pending {
            let outcome = match envelope.request {
                Request::FetchBooks => Outcome::Books(Ok(vec![book("b9", "Bumi")])),
                _ => Outcome::Users(Ok(vec![user("u9", Role::Admin)])),
            };
            apply_completion(&mut app, Completion { ticket: envelope.ticket, outcome });
        }

        assert!(app.outbox.is_empty());
        assert!(app.modal.is_none());
        assert!(app.books.all.is_empty());
        assert!(app.users.all.is_empty());
        assert!(!press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn login_screen_quits_with_rebound_key() {
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("lending_admin_quit_{}_{nonce}.conf", std::process::id()));
        std::fs::write(&path, "Quit = x\n").unwrap();
        let keymap = Keymap::from_file(&path.to_string_lossy()).unwrap();
        let _ = std::fs::remove_file(&path);

        let mut app = AppState::new(Gate::LoginRequired, Theme::dark(), keymap);
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert!(press(&mut app, KeyCode::Char('x')));
    }

    #[test]
    fn search_filters_live_and_escape_restores() {
        let mut app = admin_app();
        app.books.all.push(book("b2", "Bumi"));
        filter_books(&mut app);

        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "bum");
        assert_eq!(app.books.visible.len(), 1);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.books.visible.len(), 2);
    }
}
