//! Data models for Shelfmark

pub mod book;
pub mod loan;
pub mod patron;

// Re-export commonly used types
pub use book::{Book, BookStatus};
pub use loan::{Loan, LoanDetails, ReturnStatus};
pub use patron::{Claims, Patron, PatronType, Role};
