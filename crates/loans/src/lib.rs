//! Loan workflow: authorized temporary removals that reserve availability
//! without touching existence rows or the movement ledger.

pub mod engine;
pub mod loan;

pub use engine::{LoanEngine, NewLoanLine};
pub use loan::{Loan, LoanLine, LoanLineStatus, LoanStatus};
