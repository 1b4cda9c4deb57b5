//! Library statistics service

use chrono::Utc;

use crate::{
    api::stats::{BookStats, LoanStats, PatronStats, StatEntry, StatsResponse},
    config::LoansConfig,
    error::AppResult,
    models::{book::BookStatus, patron::PatronType},
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    policy: LoansConfig,
}

impl StatsService {
    pub fn new(repository: Repository, policy: LoansConfig) -> Self {
        Self { repository, policy }
    }

    /// Aggregate library statistics. Pure derived read, no side effects.
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let pool = &self.repository.pool;
        let now = Utc::now();

        let total_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;

        let borrowed_books: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE status = $1")
                .bind(BookStatus::Borrowed)
                .fetch_one(pool)
                .await?;

        let open_loans = self.repository.loans.count_open().await?;
        let overdue_loans = self.repository.loans.count_overdue(now, &self.policy).await?;

        let open_by_category = self
            .repository
            .loans
            .open_by_category()
            .await?
            .into_iter()
            .map(|(label, value)| StatEntry { label, value })
            .collect();

        let students = self
            .repository
            .patrons
            .count_by_type(PatronType::Student)
            .await?;
        let instructors = self
            .repository
            .patrons
            .count_by_type(PatronType::Instructor)
            .await?;

        Ok(StatsResponse {
            books: BookStats {
                total: total_books,
                available: total_books - borrowed_books,
                borrowed: borrowed_books,
            },
            loans: LoanStats {
                open: open_loans,
                overdue: overdue_loans,
                open_by_category,
            },
            patrons: PatronStats {
                total: students + instructors,
                students,
                instructors,
            },
        })
    }
}
