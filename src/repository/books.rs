//! Books repository for database operations.
//!
//! Every write resolves author and publisher by exact name (find-or-create)
//! inside the same transaction as the book row, so partial state is never
//! visible. Author/publisher names carry no uniqueness constraint; racing
//! writers may create duplicate rows, and lookup picks the lowest id.

use chrono::Utc;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::book::{
        order_by_clause, page_bounds, Book, BookPage, BookQuery, BookRow, CreateBook, PageMeta,
        RemovedBook, UpdateBook,
    },
};

const BOOK_FROM: &str = "FROM books b \
     JOIN authors a ON a.id = b.author_id \
     JOIN publishers p ON p.id = b.publisher_id";

const BOOK_COLUMNS: &str = "b.id, b.title, b.description, b.file_cover, b.available, b.deleted, \
     a.name AS author, p.name AS publisher, b.created_at, b.updated_at";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get a non-deleted book by id, denormalized
    pub async fn find_one(&self, id: i32) -> AppResult<Book> {
        Self::fetch_book(&self.pool, id).await
    }

    /// Fetch the denormalized view of a non-deleted book through any
    /// executor, so writes can build their response inside the transaction.
    async fn fetch_book<'a, E>(executor: E, id: i32) -> AppResult<Book>
    where
        E: sqlx::Executor<'a, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} {BOOK_FROM} WHERE b.id = $1 AND b.deleted = FALSE"
        );

        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Count all book rows, including soft-deleted ones. Used by the seeder.
    pub async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    // =========================================================================
    // SEARCH / PAGINATION
    // =========================================================================

    /// List non-deleted books with substring search, sorting, and pagination.
    ///
    /// `query` matches title OR description OR author name via SQL LIKE.
    /// Sort keys are whitelisted in [`order_by_clause`]; skip/limit are
    /// validated integers, so the formatted SQL carries no user text.
    pub async fn find_all(&self, query: &BookQuery) -> AppResult<BookPage> {
        let (skip, limit) = page_bounds(query.skip, query.limit)?;

        let order_by = order_by_clause(query.sort1.as_deref(), query.sort2.as_deref())?;
        let pattern = query.query.as_ref().map(|q| format!("%{}%", q));

        let mut where_sql = String::from("b.deleted = FALSE");
        if pattern.is_some() {
            where_sql.push_str(
                " AND (b.title LIKE $1 OR b.description LIKE $1 OR a.name LIKE $1)",
            );
        }

        let count_sql = format!("SELECT COUNT(*) {BOOK_FROM} WHERE {where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref p) = pattern {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let select_sql = format!(
            "SELECT {BOOK_COLUMNS} {BOOK_FROM} WHERE {where_sql} {order_by} LIMIT {limit} OFFSET {skip}"
        );
        let mut select_query = sqlx::query_as::<_, BookRow>(&select_sql);
        if let Some(ref p) = pattern {
            select_query = select_query.bind(p);
        }
        let rows = select_query.fetch_all(&self.pool).await?;

        Ok(BookPage {
            data: rows.into_iter().map(Book::from).collect(),
            meta: PageMeta { total, skip, limit },
        })
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Create a book, resolving author and publisher by name in the same
    /// transaction. Commits or rolls back as one unit.
    pub async fn create(&self, input: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let author_id = Self::find_or_create_author(&mut tx, &input.author).await?;
        let publisher_id = Self::find_or_create_publisher(&mut tx, &input.publisher).await?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (
                title, description, file_cover, available, deleted,
                author_id, publisher_id, created_at, updated_at
            ) VALUES ($1, $2, $3, TRUE, FALSE, $4, $5, $6, $6)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.file_cover)
        .bind(author_id)
        .bind(publisher_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // Build the response from the transaction's own state
        let book = Self::fetch_book(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(book)
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Partially update a non-deleted book. Provided author/publisher names
    /// are resolved via find-or-create and re-point the foreign key; absent
    /// fields are left unchanged. NULL binds fall through COALESCE, so a
    /// provided empty string still overwrites.
    pub async fn update(&self, id: i32, input: &UpdateBook) -> AppResult<Book> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let existing: Option<i32> =
            sqlx::query_scalar("SELECT id FROM books WHERE id = $1 AND deleted = FALSE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if existing.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let author_id = match &input.author {
            Some(name) => Some(Self::find_or_create_author(&mut tx, name).await?),
            None => None,
        };
        let publisher_id = match &input.publisher {
            Some(name) => Some(Self::find_or_create_publisher(&mut tx, name).await?),
            None => None,
        };

        sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($1::text, title),
                description = COALESCE($2::text, description),
                file_cover = COALESCE($3::text, file_cover),
                author_id = COALESCE($4, author_id),
                publisher_id = COALESCE($5, publisher_id),
                updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.file_cover)
        .bind(author_id)
        .bind(publisher_id)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let book = Self::fetch_book(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(book)
    }

    // =========================================================================
    // DELETE (soft)
    // =========================================================================

    /// Flag a book as deleted. Idempotent: succeeds and returns `{id}` even
    /// when the row does not exist or is already deleted. Author and
    /// publisher rows are never touched.
    pub async fn remove(&self, id: i32) -> AppResult<RemovedBook> {
        let now = Utc::now();

        sqlx::query("UPDATE books SET deleted = TRUE, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(RemovedBook { id })
    }

    // =========================================================================
    // AUTHORS / PUBLISHERS (find-or-create by name)
    // =========================================================================

    /// Insert author if no exact name match exists, or return the existing id.
    async fn find_or_create_author(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> AppResult<i32> {
        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM authors WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(id) = existing {
            Ok(id)
        } else {
            let id = sqlx::query_scalar::<_, i32>(
                "INSERT INTO authors (name) VALUES ($1) RETURNING id",
            )
            .bind(name)
            .fetch_one(&mut **tx)
            .await?;
            Ok(id)
        }
    }

    /// Insert publisher if no exact name match exists, or return the existing id.
    async fn find_or_create_publisher(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> AppResult<i32> {
        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM publishers WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(id) = existing {
            Ok(id)
        } else {
            let id = sqlx::query_scalar::<_, i32>(
                "INSERT INTO publishers (name) VALUES ($1) RETURNING id",
            )
            .bind(name)
            .fetch_one(&mut **tx)
            .await?;
            Ok(id)
        }
    }
}
