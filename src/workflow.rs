//! Book-acquisition workflow.
//!
//! Adding a book goes through one dialog with three mutually exclusive input
//! modes: manual entry, ISBN search, and review of a search result before
//! saving. [`AcquisitionWorkflow`] owns that dialog's state as a single
//! [`Mode`] value; it performs no IO itself. Operations that need the backend
//! return an [`Envelope`] for the caller to dispatch, and the answer comes back
//! through [`AcquisitionWorkflow::apply_lookup`] or
//! [`AcquisitionWorkflow::apply_created`].
//!
//! A result is only applied if the request that produced it is still the
//! pending one of the current mode. Anything else is stale (the admin
//! navigated away or cancelled) and is dropped.
//!
use reqwest::Url;
use tracing::debug;

use crate::api::{BookMetadata, BookUpdate, NewBook};
use crate::dispatch::{Envelope, Request, Ticket, TicketSeq};
use crate::error::AppError;

pub const MSG_ISBN_REQUIRED: &str = "ISBN must not be empty";
pub const MSG_TITLE_AUTHOR_REQUIRED: &str = "Title and author are required";
pub const MSG_COVER_URL_INVALID: &str = "Cover URL must be an http(s) URL";
pub const MSG_LOOKUP_NOT_FOUND: &str = "Book not found";
pub const MSG_LOOKUP_FAILED: &str = "Failed to search for book";
pub const MSG_SAVE_REJECTED: &str = "Failed to save book";
pub const MSG_SAVE_FAILED: &str = "An error occurred while saving the book";

/// Editable fields of a draft, in form order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Author,
    Isbn,
    Description,
    CoverImage,
}

impl DraftField {
    pub const ALL: [DraftField; 5] = [
        DraftField::Title,
        DraftField::Author,
        DraftField::Isbn,
        DraftField::Description,
        DraftField::CoverImage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Title => "Title *",
            DraftField::Author => "Author *",
            DraftField::Isbn => "ISBN",
            DraftField::Description => "Description",
            DraftField::CoverImage => "Cover URL",
        }
    }
}

/// Unsaved, client-local book data. Empty strings mean "not provided".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub description: String,
    pub cover_image: String,
}

impl DraftBook {
    pub fn from_metadata(meta: BookMetadata) -> Self {
        Self {
            title: meta.title,
            author: meta.author,
            isbn: meta.isbn.unwrap_or_default(),
            description: meta.description.unwrap_or_default(),
            cover_image: meta.cover_image.unwrap_or_default(),
        }
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Author => &self.author,
            DraftField::Isbn => &self.isbn,
            DraftField::Description => &self.description,
            DraftField::CoverImage => &self.cover_image,
        }
    }

    pub fn field_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Title => &mut self.title,
            DraftField::Author => &mut self.author,
            DraftField::Isbn => &mut self.isbn,
            DraftField::Description => &mut self.description,
            DraftField::CoverImage => &mut self.cover_image,
        }
    }

    /// Check required fields and build the create payload.
    pub fn validate(&self) -> Result<NewBook, AppError> {
        if self.title.trim().is_empty() || self.author.trim().is_empty() {
            return Err(AppError::validation(MSG_TITLE_AUTHOR_REQUIRED));
        }
        let cover = self.cover_image.trim();
        if !cover.is_empty() {
            let ok = Url::parse(cover)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !ok {
                return Err(AppError::validation(MSG_COVER_URL_INVALID));
            }
        }
        let isbn = self.isbn.trim();
        Ok(NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: (!isbn.is_empty()).then(|| isbn.to_string()),
            description: self.description.clone(),
            cover_image: cover.to_string(),
        })
    }

    /// Same checks as [`validate`](Self::validate), for an edit of an existing record.
    pub fn validate_update(&self, stock: u32) -> Result<BookUpdate, AppError> {
        Ok(BookUpdate { book: self.validate()?, stock })
    }
}

/// Focusable slot inside a draft form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormSlot {
    Field(DraftField),
    Save,
    /// "Back" in manual entry, "Search again" when reviewing a lookup result.
    Back,
}

const FORM_SLOTS: [FormSlot; 7] = [
    FormSlot::Field(DraftField::Title),
    FormSlot::Field(DraftField::Author),
    FormSlot::Field(DraftField::Isbn),
    FormSlot::Field(DraftField::Description),
    FormSlot::Field(DraftField::CoverImage),
    FormSlot::Save,
    FormSlot::Back,
];

/// A draft plus the form state around it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftForm {
    pub draft: DraftBook,
    pub focus: usize,
    pub error: Option<String>,
    pub pending: Option<Ticket>,
}

impl DraftForm {
    pub fn new(draft: DraftBook) -> Self {
        Self { draft, ..Self::default() }
    }

    pub fn slot(&self) -> FormSlot {
        FORM_SLOTS[self.focus.min(FORM_SLOTS.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FORM_SLOTS.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FORM_SLOTS.len() - 1) % FORM_SLOTS.len();
    }

    pub fn input(&mut self, c: char) {
        if let FormSlot::Field(field) = self.slot() {
            self.draft.field_mut(field).push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let FormSlot::Field(field) = self.slot() {
            self.draft.field_mut(field).pop();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

/// Focusable slot of the ISBN search form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuerySlot {
    Input,
    Search,
    Back,
}

const QUERY_SLOTS: [QuerySlot; 3] = [QuerySlot::Input, QuerySlot::Search, QuerySlot::Back];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IsbnQuery {
    pub isbn: String,
    pub focus: usize,
    pub error: Option<String>,
    pub pending: Option<Ticket>,
}

impl IsbnQuery {
    pub fn slot(&self) -> QuerySlot {
        QUERY_SLOTS[self.focus.min(QUERY_SLOTS.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % QUERY_SLOTS.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + QUERY_SLOTS.len() - 1) % QUERY_SLOTS.len();
    }

    /// Typing replaces any previous error.
    pub fn input(&mut self, c: char) {
        if self.slot() == QuerySlot::Input {
            self.isbn.push(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if self.slot() == QuerySlot::Input {
            self.isbn.pop();
            self.error = None;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// The search control is enabled only with a non-blank ISBN and nothing in flight.
    pub fn can_search(&self) -> bool {
        !self.is_busy() && !self.isbn.trim().is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquisitionMethod {
    IsbnSearch,
    Manual,
}

impl AcquisitionMethod {
    pub const ALL: [AcquisitionMethod; 2] = [AcquisitionMethod::IsbnSearch, AcquisitionMethod::Manual];

    pub fn label(self) -> &'static str {
        match self {
            AcquisitionMethod::IsbnSearch => "Search by ISBN",
            AcquisitionMethod::Manual => "Manual input",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            AcquisitionMethod::IsbnSearch => "Look the book up automatically from its ISBN",
            AcquisitionMethod::Manual => "Type in the book information yourself",
        }
    }
}

/// Which part of the dialog is showing. Exactly one at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Closed,
    ChoosingMethod {
        selected: AcquisitionMethod,
    },
    ManualEntry(DraftForm),
    IsbnSearch(IsbnQuery),
    ReviewResult(DraftForm),
}

/// How a create answer was settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settled {
    /// Saved; the dialog closed and the listing should be refreshed.
    Saved,
    /// Backend rejected or failed; the draft stays open with this message.
    Rejected(String),
    /// Nobody was waiting for this answer anymore.
    Stale { saved: bool },
}

#[derive(Debug, Default)]
pub struct AcquisitionWorkflow {
    mode: Mode,
}

impl AcquisitionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.mode, Mode::Closed)
    }

    /// Start a fresh dialog. Does nothing when one is already open.
    pub fn open(&mut self) {
        if !self.is_open() {
            self.mode = Mode::ChoosingMethod { selected: AcquisitionMethod::IsbnSearch };
        }
    }

    /// Close the dialog and drop every draft.
    pub fn cancel(&mut self) {
        self.mode = Mode::Closed;
    }

    /// Move the highlighted method while choosing.
    pub fn select(&mut self, method: AcquisitionMethod) {
        if let Mode::ChoosingMethod { selected } = &mut self.mode {
            *selected = method;
        }
    }

    pub fn choose(&mut self, method: AcquisitionMethod) {
        if !matches!(self.mode, Mode::ChoosingMethod { .. }) {
            return;
        }
        self.mode = match method {
            AcquisitionMethod::IsbnSearch => Mode::IsbnSearch(IsbnQuery::default()),
            AcquisitionMethod::Manual => Mode::ManualEntry(DraftForm::default()),
        };
    }

    /// Leave the current input mode without saving.
    pub fn back(&mut self) {
        match &self.mode {
            Mode::ManualEntry(_) => {
                self.mode = Mode::ChoosingMethod { selected: AcquisitionMethod::Manual }
            }
            Mode::IsbnSearch(_) => {
                self.mode = Mode::ChoosingMethod { selected: AcquisitionMethod::IsbnSearch }
            }
            Mode::ReviewResult(_) => self.search_again(),
            Mode::Closed | Mode::ChoosingMethod { .. } => {}
        }
    }

    /// Throw away a reviewed result and go back to an empty ISBN search.
    pub fn search_again(&mut self) {
        if matches!(self.mode, Mode::ReviewResult(_)) {
            self.mode = Mode::IsbnSearch(IsbnQuery::default());
        }
    }

    pub fn query_mut(&mut self) -> Option<&mut IsbnQuery> {
        match &mut self.mode {
            Mode::IsbnSearch(q) => Some(q),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut DraftForm> {
        match &mut self.mode {
            Mode::ManualEntry(f) | Mode::ReviewResult(f) => Some(f),
            _ => None,
        }
    }

    /// Start an ISBN lookup.
    ///
    /// Returns `Ok(None)` when there is nothing to do (wrong mode or a
    /// lookup already in flight) and a validation error for a blank ISBN.
    pub fn submit_lookup(&mut self, seq: &mut TicketSeq) -> Result<Option<Envelope>, AppError> {
        let Mode::IsbnSearch(query) = &mut self.mode else {
            return Ok(None);
        };
        if query.is_busy() {
            return Ok(None);
        }
        let isbn = query.isbn.trim().to_string();
        if isbn.is_empty() {
            query.error = Some(MSG_ISBN_REQUIRED.to_string());
            return Err(AppError::validation(MSG_ISBN_REQUIRED));
        }
        let ticket = seq.issue();
        query.pending = Some(ticket);
        query.error = None;
        Ok(Some(Envelope { ticket, request: Request::LookupIsbn(isbn) }))
    }

    /// Apply a lookup answer. Returns whether it was applied.
    pub fn apply_lookup(&mut self, ticket: Ticket, result: Result<BookMetadata, AppError>) -> bool {
        let Mode::IsbnSearch(query) = &mut self.mode else {
            debug!("discarding lookup #{} received outside isbn search", ticket.0);
            return false;
        };
        if query.pending != Some(ticket) {
            debug!("discarding stale lookup #{}", ticket.0);
            return false;
        }
        match result {
            Ok(meta) => {
                self.mode = Mode::ReviewResult(DraftForm::new(DraftBook::from_metadata(meta)));
            }
            Err(err) => {
                let fallback = match err {
                    AppError::Request { .. } => MSG_LOOKUP_NOT_FOUND,
                    _ => MSG_LOOKUP_FAILED,
                };
                query.pending = None;
                query.error = Some(err.user_message(fallback));
            }
        }
        true
    }

    /// Validate the current draft and start the create call.
    ///
    /// Returns `Ok(None)` when no draft form is showing or a save is already
    /// in flight; a validation error leaves the form untouched apart from
    /// its inline message.
    pub fn submit_draft(&mut self, seq: &mut TicketSeq) -> Result<Option<Envelope>, AppError> {
        let Some(form) = self.form_mut() else {
            return Ok(None);
        };
        if form.is_busy() {
            return Ok(None);
        }
        let book = match form.draft.validate() {
            Ok(book) => book,
            Err(err) => {
                form.error = Some(err.to_string());
                return Err(err);
            }
        };
        let ticket = seq.issue();
        form.pending = Some(ticket);
        form.error = None;
        Ok(Some(Envelope { ticket, request: Request::CreateBook(book) }))
    }

    /// Apply a create answer.
    pub fn apply_created(&mut self, ticket: Ticket, result: Result<(), AppError>) -> Settled {
        let waiting = self.form_mut().is_some_and(|f| f.pending == Some(ticket));
        if !waiting {
            debug!("create #{} settled after the dialog moved on", ticket.0);
            return Settled::Stale { saved: result.is_ok() };
        }
        match result {
            Ok(()) => {
                self.mode = Mode::Closed;
                Settled::Saved
            }
            Err(err) => {
                let fallback = match err {
                    AppError::Request { .. } => MSG_SAVE_REJECTED,
                    _ => MSG_SAVE_FAILED,
                };
                let message = err.user_message(fallback);
                if let Some(form) = self.form_mut() {
                    form.pending = None;
                    form.error = Some(message.clone());
                }
                Settled::Rejected(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut DraftForm, field: DraftField, text: &str) {
        form.focus = DraftField::ALL.iter().position(|f| *f == field).unwrap();
        for c in text.chars() {
            form.input(c);
        }
    }

    fn dune() -> BookMetadata {
        BookMetadata {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            isbn: Some("9780441013593".into()),
            description: None,
            cover_image: None,
        }
    }

    fn searching(wf: &mut AcquisitionWorkflow, isbn: &str) {
        wf.open();
        wf.choose(AcquisitionMethod::IsbnSearch);
        for c in isbn.chars() {
            wf.query_mut().unwrap().input(c);
        }
    }

    #[test]
    fn open_starts_at_choosing_method() {
        let mut wf = AcquisitionWorkflow::new();
        assert_eq!(wf.mode(), &Mode::Closed);
        wf.open();
        assert!(matches!(wf.mode(), Mode::ChoosingMethod { .. }));
    }

    #[test]
    fn blank_isbn_is_rejected_without_request() {
        for input in ["", "   ", "\t"] {
            let mut wf = AcquisitionWorkflow::new();
            let mut seq = TicketSeq::default();
            searching(&mut wf, input);
            let err = wf.submit_lookup(&mut seq).unwrap_err();
            assert!(err.is_validation());
            match wf.mode() {
                Mode::IsbnSearch(q) => {
                    assert_eq!(q.error.as_deref(), Some(MSG_ISBN_REQUIRED));
                    assert!(q.pending.is_none());
                }
                other => panic!("unexpected mode {other:?}"),
            }
        }
    }

    #[test]
    fn lookup_sends_trimmed_isbn_and_blocks_duplicates() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        searching(&mut wf, " 9780441013593 ");
        let env = wf.submit_lookup(&mut seq).unwrap().unwrap();
        assert_eq!(env.request, Request::LookupIsbn("9780441013593".into()));
        assert_eq!(wf.submit_lookup(&mut seq).unwrap(), None);
    }

    #[test]
    fn successful_lookup_moves_to_review_with_exact_fields() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        searching(&mut wf, "9780441013593");
        let env = wf.submit_lookup(&mut seq).unwrap().unwrap();
        assert!(wf.apply_lookup(env.ticket, Ok(dune())));
        match wf.mode() {
            Mode::ReviewResult(form) => {
                assert_eq!(form.draft.title, "Dune");
                assert_eq!(form.draft.author, "Frank Herbert");
                assert_eq!(form.draft.isbn, "9780441013593");
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn failed_lookup_keeps_isbn_and_shows_server_message() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        searching(&mut wf, "123");
        let env = wf.submit_lookup(&mut seq).unwrap().unwrap();
        let err = AppError::Request { status: 404, message: Some("Buku tidak ditemukan".into()) };
        assert!(wf.apply_lookup(env.ticket, Err(err)));
        match wf.mode() {
            Mode::IsbnSearch(q) => {
                assert_eq!(q.isbn, "123");
                assert_eq!(q.error.as_deref(), Some("Buku tidak ditemukan"));
                assert!(!q.is_busy());
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn failed_lookup_falls_back_by_error_kind() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        searching(&mut wf, "123");
        let env = wf.submit_lookup(&mut seq).unwrap().unwrap();
        wf.apply_lookup(env.ticket, Err(AppError::Network("timeout".into())));
        assert!(matches!(wf.mode(), Mode::IsbnSearch(q) if q.error.as_deref() == Some(MSG_LOOKUP_FAILED)));

        let env = wf.submit_lookup(&mut seq).unwrap().unwrap();
        wf.apply_lookup(env.ticket, Err(AppError::Request { status: 502, message: None }));
        assert!(matches!(wf.mode(), Mode::IsbnSearch(q) if q.error.as_deref() == Some(MSG_LOOKUP_NOT_FOUND)));
    }

    #[test]
    fn lookup_arriving_after_cancel_is_discarded() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        searching(&mut wf, "9780441013593");
        let env = wf.submit_lookup(&mut seq).unwrap().unwrap();
        wf.cancel();
        assert!(!wf.apply_lookup(env.ticket, Ok(dune())));
        assert_eq!(wf.mode(), &Mode::Closed);
    }

    #[test]
    fn lookup_from_an_earlier_search_is_discarded() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        searching(&mut wf, "111");
        let first = wf.submit_lookup(&mut seq).unwrap().unwrap();
        wf.back();
        wf.choose(AcquisitionMethod::IsbnSearch);
        assert!(!wf.apply_lookup(first.ticket, Ok(dune())));
        assert!(matches!(wf.mode(), Mode::IsbnSearch(q) if q.isbn.is_empty()));
    }

    #[test]
    fn blank_title_or_author_never_produces_a_request() {
        for (title, author) in [("", "Frank Herbert"), ("Dune", "  "), (" ", "\t")] {
            let mut wf = AcquisitionWorkflow::new();
            let mut seq = TicketSeq::default();
            wf.open();
            wf.choose(AcquisitionMethod::Manual);
            let form = wf.form_mut().unwrap();
            type_into(form, DraftField::Title, title);
            type_into(form, DraftField::Author, author);
            let err = wf.submit_draft(&mut seq).unwrap_err();
            assert_eq!(err, AppError::validation(MSG_TITLE_AUTHOR_REQUIRED));
            assert!(!wf.form_mut().unwrap().is_busy());
        }
    }

    #[test]
    fn invalid_cover_url_is_a_validation_error() {
        let draft = DraftBook {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            cover_image: "cover.jpg".into(),
            ..DraftBook::default()
        };
        assert_eq!(draft.validate().unwrap_err(), AppError::validation(MSG_COVER_URL_INVALID));
    }

    #[test]
    fn successful_create_closes_and_clears() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        wf.open();
        wf.choose(AcquisitionMethod::Manual);
        let form = wf.form_mut().unwrap();
        type_into(form, DraftField::Title, "Dune");
        type_into(form, DraftField::Author, "Frank Herbert");
        let env = wf.submit_draft(&mut seq).unwrap().unwrap();
        match &env.request {
            Request::CreateBook(book) => {
                assert_eq!(book.isbn, None);
                assert_eq!(book.cover_image, "");
            }
            other => panic!("unexpected request {other:?}"),
        }
        assert_eq!(wf.submit_draft(&mut seq).unwrap(), None);
        assert_eq!(wf.apply_created(env.ticket, Ok(())), Settled::Saved);
        assert_eq!(wf.mode(), &Mode::Closed);

        wf.open();
        assert!(matches!(wf.mode(), Mode::ChoosingMethod { .. }));
    }

    #[test]
    fn rejected_create_keeps_draft_and_mode() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        searching(&mut wf, "9780441013593");
        let env = wf.submit_lookup(&mut seq).unwrap().unwrap();
        wf.apply_lookup(env.ticket, Ok(dune()));
        let env = wf.submit_draft(&mut seq).unwrap().unwrap();
        let err = AppError::Request { status: 409, message: Some("Buku sudah ada".into()) };
        assert_eq!(wf.apply_created(env.ticket, Err(err)), Settled::Rejected("Buku sudah ada".into()));
        match wf.mode() {
            Mode::ReviewResult(form) => {
                assert_eq!(form.draft.title, "Dune");
                assert_eq!(form.error.as_deref(), Some("Buku sudah ada"));
                assert!(!form.is_busy());
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn create_settling_after_navigation_is_stale() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        wf.open();
        wf.choose(AcquisitionMethod::Manual);
        let form = wf.form_mut().unwrap();
        type_into(form, DraftField::Title, "Dune");
        type_into(form, DraftField::Author, "Frank Herbert");
        let env = wf.submit_draft(&mut seq).unwrap().unwrap();
        wf.back();
        assert_eq!(wf.apply_created(env.ticket, Ok(())), Settled::Stale { saved: true });
        assert!(matches!(wf.mode(), Mode::ChoosingMethod { .. }));
    }

    #[test]
    fn switching_modes_never_carries_data_over() {
        let mut wf = AcquisitionWorkflow::new();
        wf.open();
        wf.choose(AcquisitionMethod::Manual);
        let form = wf.form_mut().unwrap();
        type_into(form, DraftField::Title, "Half typed");
        type_into(form, DraftField::Isbn, "978");
        wf.back();
        wf.choose(AcquisitionMethod::IsbnSearch);
        assert!(matches!(wf.mode(), Mode::IsbnSearch(q) if q.isbn.is_empty() && q.error.is_none()));
        wf.back();
        wf.choose(AcquisitionMethod::Manual);
        assert!(matches!(wf.mode(), Mode::ManualEntry(f) if f.draft == DraftBook::default()));
    }

    #[test]
    fn search_again_discards_reviewed_draft() {
        let mut wf = AcquisitionWorkflow::new();
        let mut seq = TicketSeq::default();
        searching(&mut wf, "9780441013593");
        let env = wf.submit_lookup(&mut seq).unwrap().unwrap();
        wf.apply_lookup(env.ticket, Ok(dune()));
        wf.search_again();
        assert_eq!(wf.mode(), &Mode::IsbnSearch(IsbnQuery::default()));
    }

    #[test]
    fn typing_clears_isbn_error() {
        let mut q = IsbnQuery { error: Some("x".into()), ..IsbnQuery::default() };
        q.input('9');
        assert!(q.error.is_none());
        assert!(q.can_search());
    }
}
