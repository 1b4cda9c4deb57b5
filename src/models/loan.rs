//! Loan ledger entry model and derived-status rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::config::LoansConfig;

use super::patron::PatronType;

/// Lifecycle status of a loan.
///
/// `Overdue` is derived at read time from elapsed time; storage keeps
/// `Active` until the loan closes. `Returned` and `ReturnedLate` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum ReturnStatus {
    Active,
    Overdue,
    Returned,
    #[sqlx(rename = "Returned Late")]
    #[serde(rename = "Returned Late")]
    ReturnedLate,
}

impl ReturnStatus {
    pub fn is_open(self) -> bool {
        matches!(self, ReturnStatus::Active | ReturnStatus::Overdue)
    }
}

impl std::fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnStatus::Active => write!(f, "Active"),
            ReturnStatus::Overdue => write!(f, "Overdue"),
            ReturnStatus::Returned => write!(f, "Returned"),
            ReturnStatus::ReturnedLate => write!(f, "Returned Late"),
        }
    }
}

/// Loan ledger entry. Append-only: closed loans are never modified or
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub patron_id: i64,
    pub patron_type: PatronType,
    pub book_id: i64,
    pub date_borrowed: DateTime<Utc>,
    pub date_returned: Option<DateTime<Utc>>,
    pub return_status: ReturnStatus,
    pub condition: String,
    #[schema(value_type = String)]
    pub fine: Decimal,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.date_returned.is_none()
    }

    /// Status as externally observed. An open loan past its due date is
    /// presented as `Overdue` regardless of what storage says; closed
    /// loans report their stored terminal status.
    pub fn derived_status(&self, policy: &LoansConfig, now: DateTime<Utc>) -> ReturnStatus {
        if self.is_open() {
            if policy.is_late(self.date_borrowed, now) {
                ReturnStatus::Overdue
            } else {
                ReturnStatus::Active
            }
        } else {
            self.return_status
        }
    }

    /// Fine as externally observed: accruing for overdue open loans,
    /// fixed once the loan closes.
    pub fn accrued_fine(&self, policy: &LoansConfig, now: DateTime<Utc>) -> Decimal {
        if self.is_open() {
            policy.fine_for(self.date_borrowed, now)
        } else {
            self.fine
        }
    }
}

/// Loan joined with its book for reporting
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub patron_id: i64,
    pub patron_type: PatronType,
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub date_borrowed: DateTime<Utc>,
    pub date_returned: Option<DateTime<Utc>>,
    pub return_status: ReturnStatus,
    pub due_date: DateTime<Utc>,
    pub condition: String,
    #[schema(value_type = String)]
    pub fine: Decimal,
}

/// History filters. Without a patron filter the full ledger is
/// returned in insertion order.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LoanHistoryQuery {
    pub patron_id: Option<i64>,
    pub patron_type: Option<PatronType>,
    /// Case-insensitive substring match on the book title
    pub title: Option<String>,
    /// Exact book category match
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn policy() -> LoansConfig {
        LoansConfig::default()
    }

    fn open_loan(borrowed: DateTime<Utc>) -> Loan {
        Loan {
            id: 1,
            patron_id: 7,
            patron_type: PatronType::Student,
            book_id: 3,
            date_borrowed: borrowed,
            date_returned: None,
            return_status: ReturnStatus::Active,
            condition: "-".to_string(),
            fine: dec!(0),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_open_loan_within_period_is_active() {
        let loan = open_loan(t0());
        let now = t0() + Duration::days(6);
        assert_eq!(loan.derived_status(&policy(), now), ReturnStatus::Active);
        assert_eq!(loan.accrued_fine(&policy(), now), dec!(0));
    }

    #[test]
    fn test_open_loan_at_due_date_is_active() {
        let loan = open_loan(t0());
        let now = t0() + Duration::days(7);
        assert_eq!(loan.derived_status(&policy(), now), ReturnStatus::Active);
    }

    #[test]
    fn test_open_loan_past_due_date_is_overdue() {
        let loan = open_loan(t0());
        let now = t0() + Duration::days(7) + Duration::seconds(1);
        assert_eq!(loan.derived_status(&policy(), now), ReturnStatus::Overdue);
        assert_eq!(loan.accrued_fine(&policy(), now), dec!(10.00));
    }

    #[test]
    fn test_overdue_fine_accrues_while_open() {
        let loan = open_loan(t0());
        let now = t0() + Duration::days(12);
        assert_eq!(loan.derived_status(&policy(), now), ReturnStatus::Overdue);
        assert_eq!(loan.accrued_fine(&policy(), now), dec!(50.00));
    }

    #[test]
    fn test_closed_loan_keeps_stored_status_and_fine() {
        let mut loan = open_loan(t0());
        loan.date_returned = Some(t0() + Duration::days(9));
        loan.return_status = ReturnStatus::ReturnedLate;
        loan.fine = dec!(20.00);
        // Long after closing, status and fine stay fixed
        let now = t0() + Duration::days(400);
        assert_eq!(
            loan.derived_status(&policy(), now),
            ReturnStatus::ReturnedLate
        );
        assert_eq!(loan.accrued_fine(&policy(), now), dec!(20.00));
    }

    #[test]
    fn test_returned_on_time_never_becomes_overdue() {
        let mut loan = open_loan(t0());
        loan.date_returned = Some(t0() + Duration::days(2));
        loan.return_status = ReturnStatus::Returned;
        let now = t0() + Duration::days(30);
        assert_eq!(loan.derived_status(&policy(), now), ReturnStatus::Returned);
    }
}
