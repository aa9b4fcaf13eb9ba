//! Data models for the book catalog

pub mod book;

// Re-export commonly used types
pub use book::{BookDraft, BookField, BookFields, BookId, BookRecord, PublicationYear};
