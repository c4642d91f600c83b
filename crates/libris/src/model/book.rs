use crate::error::{LibError, LibResult};
use crate::{FromRow, Record};
use serde::{Deserialize, Serialize};

/// Payload for adding a title to the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(table = "books", rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub genre: Option<String>,
    pub isbn_no: String,
    #[serde(rename = "numofPages")]
    #[record(column = "numofPages")]
    pub num_of_pages: i32,
    pub total_number_of_copies: i32,
}

impl NewBook {
    pub fn validate(&self) -> LibResult<()> {
        if self.title.trim().is_empty() {
            return Err(LibError::validation("title is required"));
        }
        if self.author.trim().is_empty() {
            return Err(LibError::validation("author is required"));
        }
        if self.isbn_no.trim().is_empty() {
            return Err(LibError::validation("isbnNo is required"));
        }
        if self.num_of_pages <= 0 {
            return Err(LibError::validation("numofPages must be positive"));
        }
        if self.total_number_of_copies < 0 {
            return Err(LibError::validation(
                "totalNumberOfCopies cannot be negative",
            ));
        }
        Ok(())
    }
}

/// A catalogued book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record, FromRow)]
#[serde(rename_all = "camelCase")]
#[record(table = "books", rename_all = "camelCase")]
pub struct Book {
    #[record(id)]
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub genre: Option<String>,
    pub isbn_no: String,
    #[serde(rename = "numofPages")]
    #[record(column = "numofPages")]
    pub num_of_pages: i32,
    pub total_number_of_copies: i32,
    pub available_number_of_copies: i32,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_number_of_copies > 0
    }
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase", default)]
#[record(table = "books", rename_all = "camelCase", partial)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub genre: Option<String>,
    pub isbn_no: Option<String>,
    #[serde(rename = "numofPages")]
    #[record(column = "numofPages")]
    pub num_of_pages: Option<i32>,
    pub total_number_of_copies: Option<i32>,
}

impl BookPatch {
    pub fn validate(&self) -> LibResult<()> {
        let blank = |s: &Option<String>| s.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.title) || blank(&self.author) || blank(&self.isbn_no) {
            return Err(LibError::validation(
                "title, author and isbnNo cannot be blank",
            ));
        }
        if self.num_of_pages.is_some_and(|n| n <= 0) {
            return Err(LibError::validation("numofPages must be positive"));
        }
        if self.total_number_of_copies.is_some_and(|n| n < 0) {
            return Err(LibError::validation(
                "totalNumberOfCopies cannot be negative",
            ));
        }
        Ok(())
    }
}
