//! Loan ledger service: borrow eligibility, returns, and reporting views

use chrono::Utc;

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::{
        loan::{Loan, LoanDetails, LoanHistoryQuery},
        patron::PatronType,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
    policy: LoansConfig,
}

impl LedgerService {
    pub fn new(repository: Repository, policy: LoansConfig) -> Self {
        Self { repository, policy }
    }

    /// Borrow a book for a patron. Fails with LimitExceeded when the
    /// patron is at the open-loan cap, BookUnavailable when the book is
    /// out; either way no state changes. Returns the new loan id.
    pub async fn borrow_book(
        &self,
        patron_id: i64,
        patron_type: PatronType,
        book_id: i64,
    ) -> AppResult<i64> {
        let loan_id = self
            .repository
            .loans
            .borrow(patron_id, patron_type, book_id, Utc::now(), &self.policy)
            .await?;

        tracing::info!(
            patron_id,
            %patron_type,
            book_id,
            loan_id,
            "book borrowed"
        );

        Ok(loan_id)
    }

    /// Return a borrowed book, recording its condition. Late returns
    /// close as ReturnedLate with the accrued fine.
    pub async fn return_book(
        &self,
        loan_id: i64,
        book_id: Option<i64>,
        condition: &str,
    ) -> AppResult<Loan> {
        let condition = if condition.trim().is_empty() {
            "-"
        } else {
            condition.trim()
        };

        let loan = self
            .repository
            .loans
            .close(loan_id, book_id, Utc::now(), condition, &self.policy)
            .await?;

        tracing::info!(
            loan_id,
            book_id = loan.book_id,
            status = %loan.return_status,
            fine = %loan.fine,
            "book returned"
        );

        Ok(loan)
    }

    /// Look up a single ledger entry
    pub async fn get_loan(&self, loan_id: i64) -> AppResult<Loan> {
        self.repository.loans.get_by_id(loan_id).await
    }

    /// Count of a patron's open (Active or Overdue) loans
    pub async fn active_loan_count(
        &self,
        patron_id: i64,
        patron_type: PatronType,
    ) -> AppResult<i64> {
        // Verify the patron exists so a bad id is a 404, not a zero
        self.repository.patrons.get_by_id(patron_id).await?;
        self.repository
            .loans
            .count_open_for_patron(patron_id, patron_type)
            .await
    }

    /// Borrowing history with derived overdue status applied
    pub async fn loan_history(&self, query: &LoanHistoryQuery) -> AppResult<Vec<LoanDetails>> {
        self.repository
            .loans
            .history(query, Utc::now(), &self.policy)
            .await
    }

    /// A single patron's history
    pub async fn patron_history(
        &self,
        patron_id: i64,
        patron_type: PatronType,
    ) -> AppResult<Vec<LoanDetails>> {
        self.repository.patrons.get_by_id(patron_id).await?;
        let query = LoanHistoryQuery {
            patron_id: Some(patron_id),
            patron_type: Some(patron_type),
            ..Default::default()
        };
        self.loan_history(&query).await
    }
}
