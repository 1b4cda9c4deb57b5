//! Books repository for catalog database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, category, title, author, edition, isbn, publication, status
             FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books, optionally narrowed by category and/or title substring
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut sql = String::from(
            "SELECT id, category, title, author, edition, isbn, publication, status
             FROM books WHERE 1=1",
        );
        if query.category.is_some() {
            sql.push_str(" AND category = $1");
        }
        if query.title.is_some() {
            let idx = if query.category.is_some() { 2 } else { 1 };
            sql.push_str(&format!(" AND title ILIKE ${}", idx));
        }
        sql.push_str(" ORDER BY id");

        let mut q = sqlx::query_as::<_, Book>(&sql);
        if let Some(ref category) = query.category {
            q = q.bind(category);
        }
        if let Some(ref title) = query.title {
            q = q.bind(format!("%{}%", title));
        }

        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Insert a new book; status always starts Available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (category, title, author, edition, isbn, publication, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'Available')
            RETURNING id, category, title, author, edition, isbn, publication, status
            "#,
        )
        .bind(&book.category)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.edition)
        .bind(&book.isbn)
        .bind(&book.publication)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update bibliographic fields. The status column is deliberately
    /// untouched: only the loan ledger writes it.
    pub async fn update(&self, id: i64, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET category = $1, title = $2, author = $3, edition = $4, isbn = $5, publication = $6
            WHERE id = $7
            RETURNING id, category, title, author, edition, isbn, publication, status
            "#,
        )
        .bind(&book.category)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.edition)
        .bind(&book.isbn)
        .bind(&book.publication)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }
}
