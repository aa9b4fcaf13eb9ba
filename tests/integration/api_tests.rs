//! Store and HTTP client tests against an in-process book service

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use book_catalog::{
    error::GENERIC_ERROR_MESSAGE, AppError, BookApi, BookDraft, BookField, BookId, BookRecord,
    HttpBookApi, HttpBookStore, ModalKind,
};

type ApiError = (StatusCode, Json<Value>);

/// In-memory stand-in for the books REST service
#[derive(Clone)]
struct MockCatalog {
    books: Arc<Mutex<Vec<BookRecord>>>,
    next_id: Arc<AtomicU64>,
}

impl MockCatalog {
    fn with_books(books: Vec<BookRecord>) -> Self {
        let next = books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        Self {
            books: Arc::new(Mutex::new(books)),
            next_id: Arc::new(AtomicU64::new(next)),
        }
    }

    fn router(self) -> Router {
        Router::new()
            .route("/api/books/", get(list_books).post(create_book))
            .route(
                "/api/books/:id",
                get(get_book).put(update_book).delete(delete_book),
            )
            .with_state(self)
    }
}

fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Book not found"})))
}

async fn list_books(State(catalog): State<MockCatalog>) -> Json<Vec<BookRecord>> {
    Json(catalog.books.lock().unwrap().clone())
}

async fn get_book(
    State(catalog): State<MockCatalog>,
    Path(id): Path<BookId>,
) -> Result<Json<BookRecord>, ApiError> {
    let books = catalog.books.lock().unwrap();
    books
        .iter()
        .find(|b| b.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn create_book(
    State(catalog): State<MockCatalog>,
    Json(draft): Json<BookDraft>,
) -> Json<BookRecord> {
    let record = BookRecord {
        id: catalog.next_id.fetch_add(1, Ordering::SeqCst),
        title: draft.title.trim().to_string(),
        author: draft.author.trim().to_string(),
        year: draft.year,
    };
    catalog.books.lock().unwrap().push(record.clone());
    Json(record)
}

async fn update_book(
    State(catalog): State<MockCatalog>,
    Path(id): Path<BookId>,
    Json(mut record): Json<BookRecord>,
) -> Result<Json<BookRecord>, ApiError> {
    let mut books = catalog.books.lock().unwrap();
    let slot = books.iter_mut().find(|b| b.id == id).ok_or_else(not_found)?;
    record.id = id;
    record.title = record.title.trim().to_string();
    *slot = record.clone();
    Ok(Json(record))
}

async fn delete_book(
    State(catalog): State<MockCatalog>,
    Path(id): Path<BookId>,
) -> Result<Json<Value>, ApiError> {
    let mut books = catalog.books.lock().unwrap();
    let before = books.len();
    books.retain(|b| b.id != id);
    if books.len() == before {
        return Err(not_found());
    }
    Ok(Json(json!({"message": "Book deleted successfully"})))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn book(id: BookId, title: &str, author: &str, year: &str) -> BookRecord {
    BookRecord {
        id,
        title: title.to_string(),
        author: author.to_string(),
        year: year.into(),
    }
}

async fn store_for(catalog: MockCatalog) -> HttpBookStore {
    let url = serve(catalog.router()).await;
    HttpBookStore::new(HttpBookApi::new(url).expect("Failed to build client"))
}

#[tokio::test]
async fn test_load_all() {
    let catalog = MockCatalog::with_books(vec![
        book(1, "金閣寺", "三島由紀夫", "1955"),
        book(2, "Dune", "Frank Herbert", "1965"),
    ]);
    let store = store_for(catalog).await;

    store.load_all().await.expect("Failed to load books");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.books.len(), 2);
    assert_eq!(snapshot.books[0].author, "三島由紀夫");
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_add_edit_delete_round() {
    let catalog = MockCatalog::with_books(vec![book(1, "A", "X", "1999")]);
    let store = store_for(catalog.clone()).await;
    store.load_all().await.unwrap();

    // Add
    store.open_modal(ModalKind::Add, None);
    store.update_draft_field(BookField::Title, "  Dune ");
    store.update_draft_field(BookField::Author, "Frank Herbert");
    store.update_draft_field(BookField::Year, "1965");
    let created = store.create_record().await.expect("Failed to create book");
    assert_eq!(created.id, 2);
    // The service's normalized title wins over the submitted one
    assert_eq!(created.title, "Dune");
    assert_eq!(store.snapshot().books.len(), 2);
    assert_eq!(store.snapshot().modal, ModalKind::None);

    // Edit
    store.open_modal_for(ModalKind::Edit, 1).unwrap();
    store.update_selection_field(BookField::Title, "B");
    assert!(store.validate_selection());
    store.update_record().await.expect("Failed to update book");
    assert_eq!(store.snapshot().books[0], book(1, "B", "X", "1999"));

    // Delete
    store.open_modal_for(ModalKind::Delete, 2).unwrap();
    store.delete_record().await.expect("Failed to delete book");
    assert_eq!(store.snapshot().books, vec![book(1, "B", "X", "1999")]);

    // Local state agrees with the service
    assert_eq!(*catalog.books.lock().unwrap(), store.snapshot().books);
}

#[tokio::test]
async fn test_missing_book_message_is_surfaced() {
    let store = store_for(MockCatalog::with_books(vec![])).await;

    let err = store.load_detail(99).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Api { status, .. } if status == StatusCode::NOT_FOUND
    ));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.error.as_deref(), Some("Book not found"));
    assert!(snapshot.detail.is_none());
}

#[tokio::test]
async fn test_update_of_vanished_book_keeps_modal_open() {
    let catalog = MockCatalog::with_books(vec![book(1, "A", "X", "1999")]);
    let store = store_for(catalog.clone()).await;
    store.load_all().await.unwrap();

    // Someone else deletes it behind our back
    catalog.books.lock().unwrap().clear();

    store.open_modal_for(ModalKind::Edit, 1).unwrap();
    store.update_selection_field(BookField::Author, "Y");
    assert!(store.update_record().await.is_err());

    let snapshot = store.snapshot();
    assert_eq!(snapshot.modal, ModalKind::Edit);
    assert_eq!(snapshot.books, vec![book(1, "A", "X", "1999")]);
    assert_eq!(snapshot.error.as_deref(), Some("Book not found"));
}

#[tokio::test]
async fn test_unexplained_failure_is_generic() {
    let router = Router::new().route(
        "/api/books/",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = serve(router).await;
    let store = HttpBookStore::new(HttpBookApi::new(url).unwrap());

    assert!(store.load_all().await.is_err());
    assert_eq!(store.snapshot().error.as_deref(), Some(GENERIC_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_numeric_year_from_service() {
    let router = Router::new().route(
        "/api/books/",
        get(|| async {
            Json(json!([{"SSID": 1, "Title": "金閣寺", "Author": "三島由紀夫", "Year": 1955}]))
        }),
    );
    let url = serve(router).await;
    let api = HttpBookApi::new(url).unwrap();

    let books = api.list().await.expect("Failed to list books");
    assert_eq!(books[0].year.as_str(), "1955");
}

#[tokio::test]
async fn test_unreachable_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpBookStore::new(HttpBookApi::new(format!("http://{}", addr)).unwrap());
    let err = store.load_all().await.unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
    assert_eq!(store.snapshot().error.as_deref(), Some(GENERIC_ERROR_MESSAGE));
}
