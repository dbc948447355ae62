use crate::core::collection::{load_records, save_records};
use crate::core::store::StoreOptions;
use crate::domain::model::{Book, FieldIssue};
use crate::utils::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSortKey {
    Title,
    Author,
    SerialNumber,
}

impl std::str::FromStr for BookSortKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "serial" | "serial_number" => Ok(Self::SerialNumber),
            other => Err(CatalogError::ValidationError {
                message: format!("unknown sort key '{}' (title, author, serial)", other),
            }),
        }
    }
}

/// In-memory book collection backed by a flat file.
///
/// Serial numbers are caller-supplied and never checked for uniqueness;
/// lookups return the first match.
#[derive(Debug)]
pub struct BookStore {
    path: PathBuf,
    options: StoreOptions,
    books: Vec<Book>,
    load_issues: Vec<FieldIssue>,
}

impl BookStore {
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self> {
        let path = path.into();
        let loaded = load_records::<Book>(&path, options.policy)?;

        tracing::info!("📚 Loaded {} books from {}", loaded.records.len(), path.display());

        Ok(Self {
            path,
            options,
            books: loaded.records,
            load_issues: loaded.issues,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn load_issues(&self) -> &[FieldIssue] {
        &self.load_issues
    }

    pub fn find_by_serial(&self, serial_number: i64) -> Option<&Book> {
        self.books.iter().find(|b| b.serial_number == serial_number)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.title == title)
    }

    /// Case-insensitive substring match on the title.
    pub fn search_title(&self, fragment: &str) -> Vec<&Book> {
        let fragment = fragment.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&fragment))
            .collect()
    }

    /// Case-insensitive substring match on the author.
    pub fn search_author(&self, fragment: &str) -> Vec<&Book> {
        let fragment = fragment.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.author.to_lowercase().contains(&fragment))
            .collect()
    }

    /// Sorted copy of the collection; the store keeps its own order.
    pub fn sorted_by(&self, key: BookSortKey) -> Vec<Book> {
        let mut books = self.books.clone();
        match key {
            BookSortKey::Title => books.sort_by_cached_key(|b| b.title.to_lowercase()),
            BookSortKey::Author => books.sort_by_cached_key(|b| b.author.to_lowercase()),
            BookSortKey::SerialNumber => books.sort_by_key(|b| b.serial_number),
        }
        books
    }

    /// Appends and rewrites the file.
    pub fn add(&mut self, book: Book) -> Result<()> {
        tracing::debug!("Added book {} ({})", book.serial_number, book.title);
        self.books.push(book);
        self.save()
    }

    pub fn remove(&mut self, serial_number: i64) -> Result<Option<Book>> {
        let Some(index) = self
            .books
            .iter()
            .position(|b| b.serial_number == serial_number)
        else {
            return Ok(None);
        };
        let removed = self.books.remove(index);
        tracing::debug!("Removed book {} ({})", removed.serial_number, removed.title);

        self.persist_if_auto()?;
        Ok(Some(removed))
    }

    /// Sets the checked-out flag. Returns `false` when no book has the serial.
    pub fn set_checked_out(&mut self, serial_number: i64, checked_out: bool) -> Result<bool> {
        let Some(book) = self
            .books
            .iter_mut()
            .find(|b| b.serial_number == serial_number)
        else {
            return Ok(false);
        };
        book.checked_out = checked_out;

        self.persist_if_auto()?;
        Ok(true)
    }

    pub fn save(&self) -> Result<()> {
        save_records(&self.path, &self.books)
    }

    fn persist_if_auto(&self) -> Result<()> {
        if self.options.auto_persist {
            self.save()?;
        }
        Ok(())
    }
}
