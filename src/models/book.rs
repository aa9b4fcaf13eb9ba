//! Book record model

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Identifier assigned by the book service
pub type BookId = u64;

/// Editable fields of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BookField {
    Title,
    Author,
    Year,
}

impl BookField {
    pub const ALL: [BookField; 3] = [BookField::Title, BookField::Author, BookField::Year];

    /// Key used in field-error mappings
    pub fn name(self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Year => "year",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Label shown next to the input
    pub fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
        }
    }
}

impl fmt::Display for BookField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Publication year, kept as text.
///
/// Older revisions of the service send the year as a JSON number; it is
/// accepted and its digits are kept exactly as received. Outgoing payloads
/// always carry a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PublicationYear(String);

impl PublicationYear {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PublicationYear {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicationYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PublicationYear {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PublicationYear {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for PublicationYear {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawYear {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawYear::deserialize(deserializer)? {
            RawYear::Text(text) => Self(text),
            RawYear::Number(number) => Self(number.to_string()),
        })
    }
}

/// A book as stored by the book service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookRecord {
    /// Service-assigned identifier, immutable once created
    #[serde(rename = "SSID")]
    pub id: BookId,
    #[serde(rename = "Title")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: String,
    #[serde(rename = "Author")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub author: String,
    #[serde(rename = "Year")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub year: PublicationYear,
}

/// A book being written in the "add" form, before the service assigns an id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookDraft {
    #[serde(rename = "Title")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: String,
    #[serde(rename = "Author")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub author: String,
    #[serde(rename = "Year")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub year: PublicationYear,
}

/// Field access shared by drafts and records, used for form binding
pub trait BookFields {
    fn field(&self, field: BookField) -> &str;
    fn set_field(&mut self, field: BookField, value: String);
}

impl BookFields for BookRecord {
    fn field(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => self.year.as_str(),
        }
    }

    fn set_field(&mut self, field: BookField, value: String) {
        match field {
            BookField::Title => self.title = value,
            BookField::Author => self.author = value,
            BookField::Year => self.year = PublicationYear(value),
        }
    }
}

impl BookFields for BookDraft {
    fn field(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => self.year.as_str(),
        }
    }

    fn set_field(&mut self, field: BookField, value: String) {
        match field {
            BookField::Title => self.title = value,
            BookField::Author => self.author = value,
            BookField::Year => self.year = PublicationYear(value),
        }
    }
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<PublicationYear>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.into(),
        }
    }
}
