use crate::api::{CatalogBook, LibraryUser};
use crate::app::{ActiveTab, AppState, InputMode};

fn book_matches(b: &CatalogBook, q: &str) -> bool {
    b.title.to_lowercase().contains(q)
        || b.author.to_lowercase().contains(q)
        || b.isbn.as_deref().unwrap_or("").to_lowercase().contains(q)
        || b.owners.iter().any(|o| o.user_name.to_lowercase().contains(q))
}

fn user_matches(u: &LibraryUser, q: &str) -> bool {
    u.name.to_lowercase().contains(q)
        || u.email.to_lowercase().contains(q)
        || u.role.as_str().to_lowercase().contains(q)
}

/// Recompute the visible book rows from the full listing and the query.
pub fn filter_books(app: &mut AppState) {
    let q = app.search_query.to_lowercase();
    app.books.visible = if q.is_empty() {
        app.books.all.clone()
    } else {
        app.books.all.iter().filter(|b| book_matches(b, &q)).cloned().collect()
    };
    app.books.clamp_selection();
}

/// Recompute the visible user rows from the full listing and the query.
pub fn filter_users(app: &mut AppState) {
    let q = app.search_query.to_lowercase();
    app.users.visible = if q.is_empty() {
        app.users.all.clone()
    } else {
        app.users.all.iter().filter(|u| user_matches(u, &q)).cloned().collect()
    };
    app.users.clamp_selection();
}

/// Apply the query to the listing being searched and jump to the first hit.
pub fn apply_search(app: &mut AppState) {
    match app.input_mode {
        InputMode::SearchBooks => {
            filter_books(app);
            app.books.selected = 0;
        }
        InputMode::SearchUsers => {
            filter_users(app);
            app.users.selected = 0;
        }
        InputMode::Normal | InputMode::Modal => {}
    }
}

/// Search mode for the active tab.
pub fn search_mode_for(tab: ActiveTab) -> InputMode {
    match tab {
        ActiveTab::Books => InputMode::SearchBooks,
        ActiveTab::Users => InputMode::SearchUsers,
    }
}
