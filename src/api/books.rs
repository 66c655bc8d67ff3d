//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookPage, BookQuery, CreateBook, RemovedBook, UpdateBook},
    AppState,
};

use super::AuthenticatedUser;

/// GET /book — list books with search, sorting, and pagination
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.books.find_all(&query).await?;
    Ok(Json(page))
}

/// GET /book/:id — get a single book
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.find_one(id).await?;
    Ok(Json(book))
}

/// POST /book — create a book
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(input): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /book/:id — partially update a book
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(input): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update(id, input).await?;
    Ok(Json(updated))
}

/// DELETE /book/:id — soft-delete a book (idempotent)
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RemovedBook>> {
    let removed = state.services.books.remove(id).await?;
    Ok(Json(removed))
}

/// GET /book-csv — export the same page as CSV
pub async fn export_csv(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<impl IntoResponse> {
    let csv = state.services.books.export_csv(&query).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=books.csv",
            ),
        ],
        csv,
    ))
}
