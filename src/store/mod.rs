//! Client-side state store for the book catalog
//!
//! The store owns the book collection plus the transient form state (open
//! modal, selection, draft, errors) and routes every write through the book
//! service. Local state only changes once the service has answered, and the
//! service's representation of a book always wins over what was sent.
//!
//! `BookStore` is a cheap handle: clones share the same state. The lock is
//! released before any request goes out, so a slow request never blocks
//! field edits or other operations.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use state::{InFlight, ModalKind, Operation, StoreSnapshot};
use state::StoreState;

use crate::{
    error::{AppError, AppResult},
    models::{BookField, BookId, BookRecord},
    services::BookApi,
};

/// Shared store handle, passed to whatever renders it
pub struct BookStore<A> {
    api: Arc<A>,
    state: Arc<Mutex<StoreState>>,
}

/// Holds an operation's in-flight flag for the lifetime of its request.
///
/// The flag is cleared either by `complete` once the response has been
/// applied, or on drop if the request future is abandoned before the service
/// answers.
struct InFlightGuard {
    state: Arc<Mutex<StoreState>>,
    op: Operation,
    armed: bool,
}

impl InFlightGuard {
    /// Take the flag for `op`; fails with `Busy` if it is already taken.
    /// Must be called without the state lock held.
    fn acquire(state: &Arc<Mutex<StoreState>>, op: Operation) -> AppResult<Self> {
        state.lock().expect("Store mutex poisoned").begin(op)?;
        Ok(Self {
            state: Arc::clone(state),
            op,
            armed: true,
        })
    }

    /// Clear the flag under a lock the caller already holds
    fn complete(mut self, state: &mut StoreState) {
        state.finish(self.op);
        self.armed = false;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("{} request abandoned before the service answered", self.op.name());
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .finish(self.op);
        }
    }
}

impl<A> Clone for BookStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: BookApi> BookStore<A> {
    pub fn new(api: A) -> Self {
        Self::from_arc(Arc::new(api))
    }

    pub fn from_arc(api: Arc<A>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("Store mutex poisoned")
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state().view.clone()
    }

    /// Replace the local collection with the service's.
    ///
    /// On failure the previous collection is kept and the error recorded.
    /// A response that arrives after a newer list request was issued is
    /// discarded.
    pub async fn load_all(&self) -> AppResult<()> {
        let request = self.state().begin_list();
        let result = self.api.list().await;

        let mut state = self.state();
        if !state.is_latest_list(request) {
            tracing::warn!("Discarding stale book list response #{}", request);
            return result.map(|_| ());
        }

        match result {
            Ok(books) => {
                tracing::info!("Loaded {} books", books.len());
                state.view.books = books;
                state.clear_error();
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Failed to load books: {}", err);
                state.record_error(&err);
                Err(err)
            }
        }
    }

    /// Fetch one book for the detail view
    pub async fn load_detail(&self, id: BookId) -> AppResult<BookRecord> {
        let request = self.state().begin_detail();
        let result = self.api.get(id).await;

        let mut state = self.state();
        let latest = state.is_latest_detail(request);
        match result {
            Ok(record) => {
                if latest {
                    state.view.detail = Some(record.clone());
                    state.clear_error();
                }
                Ok(record)
            }
            Err(err) => {
                tracing::warn!("Failed to load book {}: {}", id, err);
                if latest {
                    state.view.detail = None;
                    state.record_error(&err);
                }
                Err(err)
            }
        }
    }

    pub fn clear_detail(&self) {
        self.state().view.detail = None;
    }

    /// Open a form. Edit and delete forms work on a copy of `record`;
    /// passing `None` for them leaves the selection empty.
    pub fn open_modal(&self, kind: ModalKind, record: Option<&BookRecord>) {
        tracing::debug!("Opening {:?} form", kind);
        self.state().open_modal(kind, record);
    }

    /// Open a form on the book with the given identifier from the collection
    pub fn open_modal_for(&self, kind: ModalKind, id: BookId) -> AppResult<()> {
        let mut state = self.state();
        let record = state
            .view
            .books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| AppError::InvalidState(format!("Book {} is not in the collection", id)))?;
        state.open_modal(kind, Some(&record));
        Ok(())
    }

    pub fn close_modal(&self) {
        self.state().close_modal();
    }

    pub fn update_draft_field(&self, field: BookField, value: impl Into<String>) {
        self.state().update_draft_field(field, value.into());
    }

    pub fn update_selection_field(&self, field: BookField, value: impl Into<String>) {
        self.state().update_selection_field(field, value.into());
    }

    /// Check the draft and refresh the field errors
    pub fn validate_draft(&self) -> bool {
        self.state().validate_draft()
    }

    /// Check the selection and refresh the field errors
    pub fn validate_selection(&self) -> bool {
        self.state().validate_selection()
    }

    /// Forget the last service error
    pub fn dismiss_error(&self) {
        self.state().clear_error();
    }

    /// Submit the draft from the add form.
    ///
    /// Nothing is sent unless the draft validates. On success the record
    /// returned by the service is appended and the form closed.
    pub async fn create_record(&self) -> AppResult<BookRecord> {
        let (draft, epoch) = {
            let mut state = self.state();
            if state.view.modal != ModalKind::Add {
                return Err(AppError::InvalidState("The add form is not open".to_string()));
            }
            if !state.validate_draft() {
                return Err(AppError::Validation(state.view.field_errors.clone()));
            }
            (state.view.draft.clone(), state.modal_epoch())
        };
        let guard = InFlightGuard::acquire(&self.state, Operation::Create)?;

        let result = self.api.create(&draft).await;

        let mut state = self.state();
        guard.complete(&mut state);
        match result {
            Ok(record) => {
                tracing::info!("Created book {} ({})", record.id, record.title);
                state.view.books.push(record.clone());
                state.clear_error();
                state.close_modal_since(epoch);
                Ok(record)
            }
            Err(err) => {
                tracing::warn!("Failed to create book: {}", err);
                state.record_error(&err);
                Err(err)
            }
        }
    }

    /// Submit the edited selection.
    ///
    /// On success the matching book is replaced by the service's version and
    /// the form closed. A response carrying a different identifier than the
    /// one sent is treated as a failed update: the collection is left alone
    /// and the form stays open.
    pub async fn update_record(&self) -> AppResult<BookRecord> {
        let (selection, epoch) = {
            let mut state = self.state();
            if state.view.selection.is_none() {
                return Err(AppError::NoSelection);
            }
            if !state.validate_selection() {
                return Err(AppError::Validation(state.view.field_errors.clone()));
            }
            let selection = state.view.selection.clone().ok_or(AppError::NoSelection)?;
            (selection, state.modal_epoch())
        };
        let guard = InFlightGuard::acquire(&self.state, Operation::Update)?;

        let result = self.api.update(&selection).await.and_then(|record| {
            if record.id == selection.id {
                Ok(record)
            } else {
                Err(AppError::UnexpectedResponse(format!(
                    "update of book {} answered with book {}",
                    selection.id, record.id
                )))
            }
        });

        let mut state = self.state();
        guard.complete(&mut state);
        match result {
            Ok(record) => {
                if !state.replace_book(record.clone()) {
                    tracing::warn!("Updated book {} is no longer in the collection", record.id);
                }
                tracing::info!("Updated book {}", record.id);
                state.clear_error();
                state.close_modal_since(epoch);
                Ok(record)
            }
            Err(err) => {
                tracing::warn!("Failed to update book {}: {}", selection.id, err);
                state.record_error(&err);
                Err(err)
            }
        }
    }

    /// Delete the selected book.
    ///
    /// On success it is removed from the collection by identifier and the
    /// form closed.
    pub async fn delete_record(&self) -> AppResult<BookId> {
        let (id, epoch) = {
            let mut state = self.state();
            let id = state.view.selection.as_ref().map(|book| book.id).ok_or(AppError::NoSelection)?;
            (id, state.modal_epoch())
        };
        let guard = InFlightGuard::acquire(&self.state, Operation::Delete)?;

        let result = self.api.delete(id).await;

        let mut state = self.state();
        guard.complete(&mut state);
        match result {
            Ok(()) => {
                if !state.remove_book(id) {
                    tracing::warn!("Deleted book {} was not in the collection", id);
                }
                tracing::info!("Deleted book {}", id);
                state.clear_error();
                state.close_modal_since(epoch);
                Ok(id)
            }
            Err(err) => {
                tracing::warn!("Failed to delete book {}: {}", id, err);
                state.record_error(&err);
                Err(err)
            }
        }
    }
}
