//! Request dispatch between the UI thread and the backend.
//!
//! The UI never blocks on the network. State transitions emit [`Envelope`]s,
//! which a [`Worker`] runs on background threads and answers with
//! [`Completion`]s. Each envelope carries a [`Ticket`] so the receiver can tell
//! a current answer from a stale one.
//!
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::debug;

use crate::api::{BookMetadata, BookUpdate, CatalogApi, CatalogBook, LibraryUser, NewBook, Role};
use crate::error::Result;

/// Identifier of a dispatched request. Later tickets compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Monotonic ticket source.
#[derive(Debug, Default)]
pub struct TicketSeq {
    next: u64,
}

impl TicketSeq {
    pub fn issue(&mut self) -> Ticket {
        self.next += 1;
        Ticket(self.next)
    }
}

/// One backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    FetchBooks,
    FetchUsers,
    LookupIsbn(String),
    CreateBook(NewBook),
    UpdateBook { id: String, update: BookUpdate },
    DeleteBook { id: String },
    ChangeRole { user_id: String, role: Role },
}

impl Request {
    /// Run the call against `api`, blocking the current thread.
    pub fn execute(&self, api: &dyn CatalogApi) -> Outcome {
        match self {
            Request::FetchBooks => Outcome::Books(api.list_books()),
            Request::FetchUsers => Outcome::Users(api.list_users()),
            Request::LookupIsbn(isbn) => Outcome::Lookup(api.lookup_isbn(isbn)),
            Request::CreateBook(book) => Outcome::Created(api.create_book(book)),
            Request::UpdateBook { id, update } => Outcome::Updated(api.update_book(id, update)),
            Request::DeleteBook { id } => Outcome::Deleted(api.delete_book(id)),
            Request::ChangeRole { user_id, role } => {
                Outcome::RoleChanged(api.change_role(user_id, *role))
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Request::FetchBooks => "fetch books",
            Request::FetchUsers => "fetch users",
            Request::LookupIsbn(_) => "isbn lookup",
            Request::CreateBook(_) => "create book",
            Request::UpdateBook { .. } => "update book",
            Request::DeleteBook { .. } => "delete book",
            Request::ChangeRole { .. } => "change role",
        }
    }
}

/// Answer to a [`Request`], variant for variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Books(Result<Vec<CatalogBook>>),
    Users(Result<Vec<LibraryUser>>),
    Lookup(Result<BookMetadata>),
    Created(Result<()>),
    Updated(Result<()>),
    Deleted(Result<()>),
    RoleChanged(Result<()>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub ticket: Ticket,
    pub request: Request,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

impl Envelope {
    pub fn execute(self, api: &dyn CatalogApi) -> Completion {
        let outcome = self.request.execute(api);
        Completion { ticket: self.ticket, outcome }
    }
}

/// Runs envelopes on background threads and collects their completions.
///
/// Every request gets its own thread, so a slow lookup never holds up a
/// delete; completions arrive in whatever order the backend answers.
pub struct Worker {
    api: Arc<dyn CatalogApi>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Worker {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        let (tx, rx) = channel();
        Self { api, tx, rx }
    }

    pub fn submit(&self, envelope: Envelope) {
        debug!("dispatch #{} {}", envelope.ticket.0, envelope.request.label());
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let completion = envelope.execute(api.as_ref());
            // receiver is gone only when the app is shutting down
            let _ = tx.send(completion);
        });
    }

    /// Completions that arrived since the last call, without blocking.
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }

    /// Block until one completion arrives or `timeout` passes.
    pub fn wait(&self, timeout: std::time::Duration) -> Option<Completion> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCatalogApi;
    use std::time::Duration;

    #[test]
    fn tickets_increase() {
        let mut seq = TicketSeq::default();
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
    }

    #[test]
    fn request_maps_to_matching_api_call() {
        let mut api = MockCatalogApi::new();
        api.expect_delete_book()
            .withf(|id| id == "b7")
            .times(1)
            .returning(|_| Ok(()));
        let outcome = Request::DeleteBook { id: "b7".into() }.execute(&api);
        assert_eq!(outcome, Outcome::Deleted(Ok(())));
    }

    #[test]
    fn worker_delivers_completion_with_ticket() {
        let mut api = MockCatalogApi::new();
        api.expect_list_users().times(1).returning(|| Ok(vec![]));
        let worker = Worker::new(Arc::new(api));
        worker.submit(Envelope { ticket: Ticket(9), request: Request::FetchUsers });
        let completion = worker.wait(Duration::from_secs(5)).expect("completion");
        assert_eq!(completion.ticket, Ticket(9));
        assert_eq!(completion.outcome, Outcome::Users(Ok(vec![])));
    }
}
