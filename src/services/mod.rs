//! External services consumed by the catalog

pub mod books;

pub use books::{BookApi, HttpBookApi};

#[cfg(test)]
pub use books::MockBookApi;
