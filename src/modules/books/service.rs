use std::sync::Arc;

use uuid::Uuid;

use super::models::{Book, NewBook};
use super::repository::{BookRepository, RepositoryError};

/// Stateless orchestration layer between the HTTP handlers and the
/// repository.
///
/// Performs no transformation of its own; it exists so the handlers depend
/// on the [`BookRepository`] capability interface rather than a concrete
/// backend, which keeps the persistence layer substitutable in tests.
#[derive(Clone)]
pub struct BooksService {
    repository: Arc<dyn BookRepository>,
}

impl BooksService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    pub async fn add_book(&self, book: NewBook) -> Result<Book, RepositoryError> {
        self.repository.store_book(book).await
    }

    pub async fn get_books(&self) -> Result<Vec<Book>, RepositoryError> {
        self.repository.get_books().await
    }

    pub async fn find_book_by_uuid(&self, uuid: Uuid) -> Result<Option<Book>, RepositoryError> {
        self.repository.find_book_by_uuid(uuid).await
    }
}
