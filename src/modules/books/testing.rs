//! In-memory repository fakes shared by the books module tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::models::{Book, NewBook};
use super::repository::{BookRepository, RepositoryError};

/// Repository fake backed by a vector, mimicking the store's id assignment
/// and soft-delete visibility rules.
pub struct InMemoryBookRepository {
    books: RwLock<Vec<Book>>,
    next_id: AtomicI64,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn store_book(&self, book: NewBook) -> Result<Book, RepositoryError> {
        let now = Utc::now();
        let stored = Book {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            uuid: book.uuid,
            title: book.title,
            author: book.author,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.books.write().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_book_by_uuid(&self, uuid: Uuid) -> Result<Option<Book>, RepositoryError> {
        Ok(self
            .books
            .read()
            .unwrap()
            .iter()
            .find(|book| book.uuid == uuid && book.deleted_at.is_none())
            .cloned())
    }

    async fn get_books(&self) -> Result<Vec<Book>, RepositoryError> {
        Ok(self
            .books
            .read()
            .unwrap()
            .iter()
            .filter(|book| book.deleted_at.is_none())
            .cloned()
            .collect())
    }
}

/// Repository fake whose every operation fails with a store error.
pub struct FailingBookRepository;

#[async_trait]
impl BookRepository for FailingBookRepository {
    async fn store_book(&self, _book: NewBook) -> Result<Book, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolClosed))
    }

    async fn find_book_by_uuid(&self, _uuid: Uuid) -> Result<Option<Book>, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolClosed))
    }

    async fn get_books(&self) -> Result<Vec<Book>, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolClosed))
    }
}
