//! Store state and the read-only snapshot handed to views

use crate::{
    error::{AppError, AppResult},
    models::{BookDraft, BookField, BookFields, BookId, BookRecord},
    validation::{validate_book, FieldErrors},
};

/// Which form the view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModalKind {
    #[default]
    None,
    Add,
    Edit,
    Delete,
}

impl ModalKind {
    /// Edit and delete forms act on a selected book
    pub fn targets_record(self) -> bool {
        matches!(self, ModalKind::Edit | ModalKind::Delete)
    }
}

/// Service-calling operations guarded against double submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Operations currently waiting on the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl InFlight {
    fn slot(&mut self, op: Operation) -> &mut bool {
        match op {
            Operation::Create => &mut self.create,
            Operation::Update => &mut self.update,
            Operation::Delete => &mut self.delete,
        }
    }
}

/// Everything a view may render. Views only ever see copies of this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub books: Vec<BookRecord>,
    /// Working copy of the book targeted by the edit or delete form
    pub selection: Option<BookRecord>,
    pub draft: BookDraft,
    pub modal: ModalKind,
    /// Last service failure, ready for display
    pub error: Option<String>,
    pub field_errors: FieldErrors,
    /// Book shown on the detail view
    pub detail: Option<BookRecord>,
    pub in_flight: InFlight,
}

/// Mutable state behind the store's lock
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) view: StoreSnapshot,
    /// Bumped on every modal open or close
    modal_epoch: u64,
    latest_list_request: u64,
    latest_detail_request: u64,
}

impl StoreState {
    pub(crate) fn modal_epoch(&self) -> u64 {
        self.modal_epoch
    }

    pub(crate) fn open_modal(&mut self, kind: ModalKind, record: Option<&BookRecord>) {
        if kind == ModalKind::None {
            self.close_modal();
            return;
        }

        self.modal_epoch += 1;
        self.view.modal = kind;
        self.view.field_errors = FieldErrors::default();
        self.view.draft = BookDraft::default();
        self.view.selection = if kind.targets_record() {
            if record.is_none() {
                tracing::warn!("Opened {:?} form without a book; selection is empty", kind);
            }
            record.cloned()
        } else {
            None
        };
    }

    pub(crate) fn close_modal(&mut self) {
        self.modal_epoch += 1;
        self.view.modal = ModalKind::None;
        self.view.selection = None;
        self.view.draft = BookDraft::default();
        self.view.field_errors = FieldErrors::default();
    }

    /// Close the modal only if nothing reopened or closed it since `epoch`
    pub(crate) fn close_modal_since(&mut self, epoch: u64) {
        if self.modal_epoch == epoch {
            self.close_modal();
        } else {
            tracing::debug!("Modal changed while the request was pending; leaving it open");
        }
    }

    pub(crate) fn update_draft_field(&mut self, field: BookField, value: String) {
        self.view.draft.set_field(field, value);
    }

    pub(crate) fn update_selection_field(&mut self, field: BookField, value: String) {
        match self.view.selection.as_mut() {
            Some(selection) => selection.set_field(field, value),
            None => tracing::debug!("Ignoring {} update: no book selected", field),
        }
    }

    pub(crate) fn validate_draft(&mut self) -> bool {
        self.view.field_errors = validate_book(&self.view.draft);
        self.view.field_errors.is_empty()
    }

    /// An empty selection never validates
    pub(crate) fn validate_selection(&mut self) -> bool {
        self.view.field_errors = match &self.view.selection {
            Some(selection) => validate_book(selection),
            None => FieldErrors::default(),
        };
        self.view.selection.is_some() && self.view.field_errors.is_empty()
    }

    pub(crate) fn begin(&mut self, op: Operation) -> AppResult<()> {
        let slot = self.view.in_flight.slot(op);
        if *slot {
            tracing::warn!("Ignoring {} request: previous one still pending", op.name());
            return Err(AppError::Busy(op.name()));
        }
        *slot = true;
        Ok(())
    }

    pub(crate) fn finish(&mut self, op: Operation) {
        *self.view.in_flight.slot(op) = false;
    }

    pub(crate) fn begin_list(&mut self) -> u64 {
        self.latest_list_request += 1;
        self.latest_list_request
    }

    pub(crate) fn is_latest_list(&self, request: u64) -> bool {
        request == self.latest_list_request
    }

    pub(crate) fn begin_detail(&mut self) -> u64 {
        self.latest_detail_request += 1;
        self.latest_detail_request
    }

    pub(crate) fn is_latest_detail(&self, request: u64) -> bool {
        request == self.latest_detail_request
    }

    pub(crate) fn record_error(&mut self, err: &AppError) {
        self.view.error = Some(err.user_message());
    }

    pub(crate) fn clear_error(&mut self) {
        self.view.error = None;
    }

    /// Swap in the service's version of a book; returns false if it is gone
    pub(crate) fn replace_book(&mut self, record: BookRecord) -> bool {
        match self.view.books.iter_mut().find(|book| book.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Drop a book by identifier; returns false if it was not present
    pub(crate) fn remove_book(&mut self, id: BookId) -> bool {
        let before = self.view.books.len();
        self.view.books.retain(|book| book.id != id);
        if self.view.detail.as_ref().is_some_and(|book| book.id == id) {
            self.view.detail = None;
        }
        self.view.books.len() != before
    }
}
