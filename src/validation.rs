//! Required-field validation for book forms

use std::collections::BTreeMap;
use std::fmt;

use validator::{Validate, ValidationError};

use crate::models::BookField;

/// Rule shared by every required book field: non-empty once trimmed
pub fn not_blank<T: AsRef<str> + ?Sized>(value: &T) -> Result<(), ValidationError> {
    if value.as_ref().trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Field-keyed messages for display next to the inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<BookField, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: BookField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: BookField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BookField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn insert(&mut self, field: BookField) {
        self.0.insert(field, format!("{} is required", field.label()));
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join(", "))
    }
}

/// Check every required field of a draft or record.
///
/// Returns a fresh mapping each time; an empty mapping means the value may be
/// submitted.
pub fn validate_book<T: Validate>(value: &T) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if let Err(report) = value.validate() {
        for name in report.field_errors().keys() {
            match BookField::from_name(&name.to_string()) {
                Some(field) => errors.insert(field),
                None => tracing::warn!("Ignoring validation error on unknown field {}", name),
            }
        }
    }
    errors
}
