use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Book, NewBook};

/// Errors surfaced by the persistence layer.
///
/// Store errors pass through unmodified; absence of a row is never an error.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence capabilities the books service depends on.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book and return the persisted row carrying the
    /// store-assigned id and timestamps.
    async fn store_book(&self, book: NewBook) -> Result<Book, RepositoryError>;

    /// Look up a book by its external identifier. A missing row is
    /// `Ok(None)`; `Err` is reserved for genuine store failures.
    async fn find_book_by_uuid(&self, uuid: Uuid) -> Result<Option<Book>, RepositoryError>;

    /// All non-deleted books, in unspecified store order.
    async fn get_books(&self) -> Result<Vec<Book>, RepositoryError>;
}

/// PostgreSQL-backed book repository.
#[derive(Clone)]
pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn store_book(&self, book: NewBook) -> Result<Book, RepositoryError> {
        let row = sqlx::query_as::<_, Book>(
            "INSERT INTO books (uuid, title, author)
             VALUES ($1, $2, $3)
             RETURNING id, uuid, title, author, created_at, updated_at, deleted_at",
        )
        .bind(book.uuid)
        .bind(&book.title)
        .bind(&book.author)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_book_by_uuid(&self, uuid: Uuid) -> Result<Option<Book>, RepositoryError> {
        // fetch_optional: absence is an empty result, not an error condition
        let row = sqlx::query_as::<_, Book>(
            "SELECT id, uuid, title, author, created_at, updated_at, deleted_at
             FROM books
             WHERE uuid = $1 AND deleted_at IS NULL",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_books(&self) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT id, uuid, title, author, created_at, updated_at, deleted_at
             FROM books
             WHERE deleted_at IS NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
