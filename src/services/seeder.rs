//! Demo data seeding, run best-effort at startup.
//!
//! Creates the default login (`user`/`pass`) and a handful of demo books.
//! Failures are reported by the caller and never abort startup.

use serde::Deserialize;

use crate::{
    error::AppResult,
    models::book::CreateBook,
    repository::Repository,
    services::auth::AuthService,
};

const DEMO_BOOKS: &str = include_str!("../../seed/books.json");

const DEFAULT_USERNAME: &str = "user";
const DEFAULT_PASSWORD: &str = "pass";

#[derive(Debug, Deserialize)]
struct SeedBook {
    title: String,
    #[serde(default)]
    description: Option<String>,
    author: String,
    publisher: String,
    #[serde(default)]
    file_cover: Option<String>,
}

/// Seed the default user and demo books if the database looks empty
pub async fn run(repository: &Repository) -> AppResult<()> {
    seed_default_user(repository).await?;
    seed_books(repository).await?;
    Ok(())
}

async fn seed_default_user(repository: &Repository) -> AppResult<()> {
    if repository
        .users
        .get_by_username(DEFAULT_USERNAME)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let hash = AuthService::hash_password(DEFAULT_PASSWORD)?;
    repository.users.create(DEFAULT_USERNAME, &hash).await?;
    tracing::info!("Default user created");
    Ok(())
}

async fn seed_books(repository: &Repository) -> AppResult<()> {
    let count = repository.books.count().await?;
    if count > 5 {
        tracing::debug!("Database already seeded with books");
        return Ok(());
    }

    let books: Vec<SeedBook> = serde_json::from_str(DEMO_BOOKS)
        .map_err(|e| crate::error::AppError::Internal(format!("Invalid seed data: {}", e)))?;

    let total = books.len();
    for book in books {
        repository
            .books
            .create(&CreateBook {
                title: book.title,
                description: book.description,
                author: book.author,
                publisher: book.publisher,
                file_cover: book.file_cover,
            })
            .await?;
    }

    tracing::info!("Seeded {} demo books", total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_books_parse() {
        let books: Vec<SeedBook> = serde_json::from_str(DEMO_BOOKS).unwrap();
        assert!(books.len() >= 6);
        for book in &books {
            assert!(!book.title.is_empty());
            assert!(!book.author.is_empty());
            assert!(!book.publisher.is_empty());
        }
    }
}
