//! Book Catalog Client
//!
//! Client-side state for a book catalog: the collection of books, the
//! add/edit/delete forms and their validation, all kept in step with a remote
//! REST book service.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use models::{BookDraft, BookField, BookFields, BookId, BookRecord, PublicationYear};
pub use services::{BookApi, HttpBookApi};
pub use store::{BookStore, ModalKind, StoreSnapshot};

/// Store wired to the HTTP book service
pub type HttpBookStore = BookStore<HttpBookApi>;
