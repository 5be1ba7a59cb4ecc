use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted book row.
///
/// `id` is the store-assigned primary key and never leaves the process;
/// `uuid` is the external identifier clients address books by.
#[derive(Debug, Clone, FromRow)]
pub struct Book {
    pub id: i64,
    pub uuid: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; rows with a value here are invisible to reads.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields required to insert a new book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub uuid: Uuid,
    pub title: String,
    pub author: String,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
}

/// Wire representation of a book; `id` carries the external uuid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: String,
    pub title: String,
    pub author: String,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.uuid.to_string(),
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_exposes_uuid_not_internal_id() {
        let uuid = Uuid::new_v4();
        let book = Book {
            id: 42,
            uuid,
            title: "Mega Man Man".to_string(),
            author: "Bill the Bill".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        let response = BookResponse::from(&book);
        assert_eq!(response.id, uuid.to_string());
        assert_eq!(response.title, "Mega Man Man");
        assert_eq!(response.author, "Bill the Bill");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("id").is_some());
        assert!(json.get("uuid").is_none());
    }
}
