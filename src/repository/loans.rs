//! Loan ledger repository.
//!
//! The only writer of `books.status`. Borrow and return each run in a
//! single transaction with row locks, so the availability check and the
//! limit check cannot race concurrent attempts on the same book or
//! patron: both writes commit together or not at all.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{
        book::BookStatus,
        loan::{Loan, LoanDetails, LoanHistoryQuery, ReturnStatus},
        patron::PatronType,
    },
};

const LOAN_COLUMNS: &str =
    "id, patron_id, patron_type, book_id, date_borrowed, date_returned, return_status, condition, fine";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(&format!("SELECT {} FROM loans WHERE id = $1", LOAN_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Record a borrow: flip the book to Borrowed and insert the ledger
    /// entry atomically. Returns the new loan id.
    ///
    /// Lock order is patron row then book row, the same on every code
    /// path that touches both.
    pub async fn borrow(
        &self,
        patron_id: i64,
        patron_type: PatronType,
        book_id: i64,
        now: DateTime<Utc>,
        policy: &LoansConfig,
    ) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        // Serializes the limit check against concurrent borrows by the
        // same patron.
        let patron: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM patrons WHERE id = $1 AND patron_type = $2 FOR UPDATE",
        )
        .bind(patron_id)
        .bind(patron_type)
        .fetch_optional(&mut *tx)
        .await?;

        if patron.is_none() {
            return Err(AppError::NotFound(format!(
                "{} with id {} not found",
                patron_type, patron_id
            )));
        }

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans
             WHERE patron_id = $1 AND patron_type = $2 AND date_returned IS NULL",
        )
        .bind(patron_id)
        .bind(patron_type)
        .fetch_one(&mut *tx)
        .await?;

        if open_loans >= policy.max_active {
            return Err(AppError::LimitExceeded(format!(
                "Cannot borrow more than {} books at a time",
                policy.max_active
            )));
        }

        // Serializes availability against concurrent borrows of the
        // same book.
        let status: Option<BookStatus> =
            sqlx::query_scalar("SELECT status FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?;

        match status {
            None => {
                return Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    book_id
                )))
            }
            Some(BookStatus::Borrowed) => {
                return Err(AppError::BookUnavailable(
                    "Book is not available".to_string(),
                ))
            }
            Some(BookStatus::Available) => {}
        }

        sqlx::query("UPDATE books SET status = $1 WHERE id = $2")
            .bind(BookStatus::Borrowed)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        let loan_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO loans (patron_id, patron_type, book_id, date_borrowed, return_status, condition, fine)
            VALUES ($1, $2, $3, $4, $5, '-', 0)
            RETURNING id
            "#,
        )
        .bind(patron_id)
        .bind(patron_type)
        .bind(book_id)
        .bind(now)
        .bind(ReturnStatus::Active)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(loan_id)
    }

    /// Close a loan: fix its terminal status and fine, record the
    /// condition note, and flip the book back to Available atomically.
    ///
    /// `expected_book_id`, when given, must match the ledger entry;
    /// a mismatch rejects the request before any write.
    pub async fn close(
        &self,
        loan_id: i64,
        expected_book_id: Option<i64>,
        now: DateTime<Utc>,
        condition: &str,
        policy: &LoansConfig,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan: Option<Loan> = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {} FROM loans WHERE id = $1 FOR UPDATE",
            LOAN_COLUMNS
        ))
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?;

        let loan = loan
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if !loan.is_open() {
            return Err(AppError::InvalidLoanState(
                "Loan is already returned".to_string(),
            ));
        }

        if let Some(expected) = expected_book_id {
            if expected != loan.book_id {
                return Err(AppError::Validation(format!(
                    "Loan {} is for book {}, not book {}",
                    loan_id, loan.book_id, expected
                )));
            }
        }

        let (status, fine) = if policy.is_late(loan.date_borrowed, now) {
            (ReturnStatus::ReturnedLate, policy.fine_for(loan.date_borrowed, now))
        } else {
            (ReturnStatus::Returned, rust_decimal::Decimal::ZERO)
        };

        let closed = sqlx::query_as::<_, Loan>(&format!(
            r#"
            UPDATE loans
            SET return_status = $1, date_returned = $2, condition = $3, fine = $4
            WHERE id = $5
            RETURNING {}
            "#,
            LOAN_COLUMNS
        ))
        .bind(status)
        .bind(now)
        .bind(condition)
        .bind(fine)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        // Lock order: loan row first, then its book row.
        sqlx::query("UPDATE books SET status = $1 WHERE id = $2")
            .bind(BookStatus::Available)
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(closed)
    }

    /// Count a patron's open loans (Active or Overdue)
    pub async fn count_open_for_patron(
        &self,
        patron_id: i64,
        patron_type: PatronType,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans
             WHERE patron_id = $1 AND patron_type = $2 AND date_returned IS NULL",
        )
        .bind(patron_id)
        .bind(patron_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Borrowing history joined with book details, insertion order.
    /// Overdue status and accruing fines are derived at read time.
    pub async fn history(
        &self,
        query: &LoanHistoryQuery,
        now: DateTime<Utc>,
        policy: &LoansConfig,
    ) -> AppResult<Vec<LoanDetails>> {
        let mut sql = String::from(
            r#"
            SELECT l.id, l.patron_id, l.patron_type, l.book_id,
                   l.date_borrowed, l.date_returned, l.return_status, l.condition, l.fine,
                   b.title, b.author, b.category
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE 1=1
            "#,
        );

        let mut idx = 0;
        let mut next = || {
            idx += 1;
            idx
        };
        if query.patron_id.is_some() {
            sql.push_str(&format!(" AND l.patron_id = ${}", next()));
        }
        if query.patron_type.is_some() {
            sql.push_str(&format!(" AND l.patron_type = ${}", next()));
        }
        if query.title.is_some() {
            sql.push_str(&format!(" AND b.title ILIKE ${}", next()));
        }
        if query.category.is_some() {
            sql.push_str(&format!(" AND b.category = ${}", next()));
        }
        sql.push_str(" ORDER BY l.id");

        let mut q = sqlx::query(&sql);
        if let Some(patron_id) = query.patron_id {
            q = q.bind(patron_id);
        }
        if let Some(patron_type) = query.patron_type {
            q = q.bind(patron_type);
        }
        if let Some(ref title) = query.title {
            q = q.bind(format!("%{}%", title));
        }
        if let Some(ref category) = query.category {
            q = q.bind(category);
        }

        let rows = q.fetch_all(&self.pool).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let loan = Loan {
                id: row.get("id"),
                patron_id: row.get("patron_id"),
                patron_type: row.get("patron_type"),
                book_id: row.get("book_id"),
                date_borrowed: row.get("date_borrowed"),
                date_returned: row.get("date_returned"),
                return_status: row.get("return_status"),
                condition: row.get("condition"),
                fine: row.get("fine"),
            };
            result.push(LoanDetails {
                return_status: loan.derived_status(policy, now),
                fine: loan.accrued_fine(policy, now),
                due_date: policy.due_date(loan.date_borrowed),
                id: loan.id,
                patron_id: loan.patron_id,
                patron_type: loan.patron_type,
                book_id: loan.book_id,
                title: row.get("title"),
                author: row.get("author"),
                category: row.get("category"),
                date_borrowed: loan.date_borrowed,
                date_returned: loan.date_returned,
                condition: loan.condition,
            });
        }

        Ok(result)
    }

    /// Count all open loans
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE date_returned IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count open loans past their due date
    pub async fn count_overdue(&self, now: DateTime<Utc>, policy: &LoansConfig) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE date_returned IS NULL AND date_borrowed < $1",
        )
        .bind(now - chrono::Duration::days(policy.period_days))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Open-loan counts grouped by book category
    pub async fn open_by_category(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT b.category AS label, COUNT(*) AS value
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.date_returned IS NULL
            GROUP BY b.category
            ORDER BY value DESC, label
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("label"), row.get("value")))
            .collect())
    }
}
