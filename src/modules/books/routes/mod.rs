use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use bookshelf_http::error::AppError;

use super::models::{BookResponse, CreateBookRequest, NewBook};
use super::service::BooksService;

/// Build the books router; mounted by the HTTP facade at the module's base path
pub fn router(service: BooksService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{bookId}", get(get_book))
        .with_state(service)
}

/// List all books
/// (GET /books)
async fn list_books(
    State(service): State<BooksService>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let books = service.get_books().await.map_err(anyhow::Error::from)?;

    Ok(Json(books.iter().map(BookResponse::from).collect()))
}

/// Add a new book
/// (POST /books)
///
/// The server, not the client, assigns the external identifier.
async fn create_book(
    State(service): State<BooksService>,
    Json(request): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let mut details = Vec::new();
    if request.title.trim().is_empty() {
        details.push(json!({"field": "title", "error": "must not be empty"}));
    }
    if request.author.trim().is_empty() {
        details.push(json!({"field": "author", "error": "must not be empty"}));
    }
    if !details.is_empty() {
        return Err(AppError::validation(details, "title and author are required"));
    }

    let book = NewBook {
        uuid: Uuid::new_v4(),
        title: request.title,
        author: request.author,
    };

    let created = service.add_book(book).await.map_err(anyhow::Error::from)?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(&created))))
}

/// Get details of a specific book
/// (GET /books/{bookId})
async fn get_book(
    State(service): State<BooksService>,
    Path(book_id): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let uuid = Uuid::parse_str(&book_id)
        .map_err(|_| AppError::bad_request(format!("'{book_id}' is not a valid book id")))?;

    let book = service
        .find_book_by_uuid(uuid)
        .await
        .map_err(anyhow::Error::from)?;

    match book {
        Some(book) => Ok(Json(BookResponse::from(&book))),
        None => Err(AppError::not_found(format!("book '{uuid}' does not exist"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::modules::books::testing::{FailingBookRepository, InMemoryBookRepository};

    fn app() -> Router {
        let service = BooksService::new(Arc::new(InMemoryBookRepository::new()));
        Router::new().nest("/books", router(service))
    }

    fn failing_app() -> Router {
        let service = BooksService::new(Arc::new(FailingBookRepository));
        Router::new().nest("/books", router(service))
    }

    fn post_book(title: &str, author: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/books")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"title": title, "author": author}).to_string(),
            ))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn create_book_returns_201_with_fresh_uuid() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_book("Mega Man Man", "Bill the Bill"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let first = json_body(response).await;
        assert_eq!(first["title"], "Mega Man Man");
        assert_eq!(first["author"], "Bill the Bill");
        let first_id = Uuid::parse_str(first["id"].as_str().unwrap()).unwrap();

        let response = app
            .oneshot(post_book("Mega Man Man", "Bill the Bill"))
            .await
            .unwrap();
        let second = json_body(response).await;
        let second_id = Uuid::parse_str(second["id"].as_str().unwrap()).unwrap();

        assert_ne!(first_id, second_id);
    }

    #[tokio::test]
    async fn created_book_is_retrievable_by_its_id() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_book("Mega Man Man", "Bill the Bill"))
            .await
            .unwrap();
        let created = json_body(response).await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = app.oneshot(get(&format!("/books/{id}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let fetched = json_body(response).await;
        assert_eq!(fetched["id"], id.as_str());
        assert_eq!(fetched["title"], "Mega Man Man");
        assert_eq!(fetched["author"], "Bill the Bill");
    }

    #[tokio::test]
    async fn repeated_get_returns_identical_content() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_book("Mega Man Man", "Bill the Bill"))
            .await
            .unwrap();
        let created = json_body(response).await;
        let uri = format!("/books/{}", created["id"].as_str().unwrap());

        let first = json_body(app.clone().oneshot(get(&uri)).await.unwrap()).await;
        let second = json_body(app.oneshot(get(&uri)).await.unwrap()).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_uuid_returns_404() {
        let app = app();

        let response = app
            .oneshot(get(&format!("/books/{}", Uuid::new_v4())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn malformed_uuid_returns_400() {
        let app = app();

        let response = app.oneshot(get("/books/not-a-uuid")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn list_returns_every_inserted_book() {
        let app = app();
        let data = [
            ("Mega She She", "Bull the Bull"),
            ("Bending noses", "Marty mac Smart"),
            ("Bending noses second edition", "Marty mac Smart"),
        ];

        for (title, author) in data {
            let response = app.clone().oneshot(post_book(title, author)).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app.oneshot(get("/books")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let books = body.as_array().unwrap();
        assert_eq!(books.len(), data.len());

        // Order is unspecified; match on title/author pairs instead
        for (title, author) in data {
            assert!(books
                .iter()
                .any(|book| book["title"] == title && book["author"] == author));
        }
    }

    #[tokio::test]
    async fn list_is_empty_before_any_insert() {
        let app = app();

        let response = app.oneshot(get("/books")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        let app = app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/books")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"title": "Mega Man Man"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn blank_title_or_author_is_rejected() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_book("", "Bill the Bill"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app.oneshot(post_book("Mega Man Man", "  ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn store_failure_maps_to_500() {
        let app = failing_app();

        let response = app.clone().oneshot(get("/books")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app
            .clone()
            .oneshot(post_book("Mega Man Man", "Bill the Bill"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app
            .oneshot(get(&format!("/books/{}", Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "internal_error");
    }
}
