//! Book catalog service: validation, repository delegation, CSV rendering

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookPage, BookQuery, CreateBook, RemovedBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a book after validating required fields
    pub async fn create(&self, input: CreateBook) -> AppResult<Book> {
        input.validate()?;
        self.repository.books.create(&input).await
    }

    /// List books with search, sorting, and pagination
    pub async fn find_all(&self, query: &BookQuery) -> AppResult<BookPage> {
        self.repository.books.find_all(query).await
    }

    /// Get a single non-deleted book
    pub async fn find_one(&self, id: i32) -> AppResult<Book> {
        self.repository.books.find_one(id).await
    }

    /// Partially update a book
    pub async fn update(&self, id: i32, input: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &input).await
    }

    /// Soft-delete a book (idempotent)
    pub async fn remove(&self, id: i32) -> AppResult<RemovedBook> {
        self.repository.books.remove(id).await
    }

    /// Render the same page `find_all` would return as CSV text
    pub async fn export_csv(&self, query: &BookQuery) -> AppResult<String> {
        let page = self.find_all(query).await?;
        Ok(render_csv(&page.data))
    }
}

/// Render books as CSV: text fields double-quoted with embedded quotes
/// doubled, `available` as an unquoted boolean token. Header line ends with
/// a newline; rows are newline-joined with no trailing newline.
pub fn render_csv(books: &[Book]) -> String {
    let mut out = String::from("title,description,author,publisher,available\n");

    let rows: Vec<String> = books
        .iter()
        .map(|book| {
            format!(
                "{},{},{},{},{}",
                csv_field(&book.title),
                csv_field(book.description.as_deref().unwrap_or("")),
                csv_field(&book.author),
                csv_field(&book.publisher),
                book.available
            )
        })
        .collect();

    out.push_str(&rows.join("\n"));
    out
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn book(title: &str, description: Option<&str>, author: &str, publisher: &str) -> Book {
        Book {
            id: 1,
            title: title.to_string(),
            description: description.map(String::from),
            author: author.to_string(),
            publisher: publisher.to_string(),
            file_cover: None,
            available: true,
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn renders_header_for_empty_page() {
        assert_eq!(
            render_csv(&[]),
            "title,description,author,publisher,available\n"
        );
    }

    #[test]
    fn quotes_every_text_field() {
        let csv = render_csv(&[book("A", Some("desc"), "Jane", "Press")]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, r#""A","desc","Jane","Press",true"#);
    }

    #[test]
    fn doubles_embedded_quotes() {
        let csv = render_csv(&[book(r#"He said "hi""#, None, "Jane", "Press")]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(r#""He said ""hi""","#));
    }

    #[test]
    fn missing_description_renders_empty_quoted_field() {
        let csv = render_csv(&[book("A", None, "Jane", "Press")]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, r#""A","","Jane","Press",true"#);
    }

    #[test]
    fn rows_are_newline_joined_without_trailing_newline() {
        let csv = render_csv(&[
            book("A", None, "X", "P"),
            book("B", None, "Y", "Q"),
        ]);
        assert_eq!(csv.lines().count(), 3);
        assert!(!csv.ends_with('\n'));
    }
}
