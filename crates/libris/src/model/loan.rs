use super::text_enum;
use crate::error::{LibError, LibResult};
use crate::{FromRow, Record};
use chrono::{DateTime, Duration, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanKind {
    Borrow,
    Return,
}

text_enum!(LoanKind {
    Borrow => "borrow",
    Return => "return",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Pending,
    Completed,
    Overdue,
}

text_enum!(LoanStatus {
    Pending => "pending",
    Completed => "completed",
    Overdue => "overdue",
});

/// Request to lend a book to a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub book_id: i64,
    pub user_id: i64,
}

/// A borrow transaction, open (`pending`) until the book comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record, FromRow)]
#[serde(rename_all = "camelCase")]
#[record(table = "transactions", rename_all = "camelCase")]
pub struct Loan {
    #[record(id)]
    pub transaction_id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub transaction_type: LoanKind,
    pub status: LoanStatus,
    pub transaction_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub late_fees: Option<i64>,
}

/// Partial update of a loan (e.g. extending the due date).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase", default)]
#[record(table = "transactions", rename_all = "camelCase", partial)]
pub struct LoanPatch {
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<LoanStatus>,
    pub late_fees: Option<i64>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Pending
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.due_date < now
    }
}

/// Loan period and late-fee rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    pub loan_period: Duration,
    pub late_fee_per_day: i64,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            loan_period: Duration::days(Self::DEFAULT_LOAN_DAYS),
            late_fee_per_day: Self::DEFAULT_LATE_FEE,
        }
    }
}

impl LoanPolicy {
    pub const DEFAULT_LOAN_DAYS: i64 = 30;
    pub const DEFAULT_LATE_FEE: i64 = 5;
    /// Longest loan period accepted, ten years.
    pub const MAX_LOAN_DAYS: i64 = 3650;

    /// Fails with [`LibError::Validation`] unless `loan_days` is in `1..=MAX_LOAN_DAYS` and
    /// the fee is non-negative.
    pub fn new(loan_days: i64, late_fee_per_day: i64) -> LibResult<Self> {
        if !(1..=Self::MAX_LOAN_DAYS).contains(&loan_days) {
            return Err(LibError::validation(format!(
                "loan period must be between 1 and {} days, got {loan_days}",
                Self::MAX_LOAN_DAYS
            )));
        }
        if late_fee_per_day < 0 {
            return Err(LibError::validation("late fee per day cannot be negative"));
        }
        let loan_period = TimeDelta::try_days(loan_days)
            .ok_or_else(|| LibError::validation(format!("loan period of {loan_days} days")))?;
        Ok(Self {
            loan_period,
            late_fee_per_day,
        })
    }

    /// `issued` plus the loan period; out of the representable date range is a
    /// [`LibError::Validation`].
    pub fn due_date(&self, issued: DateTime<Utc>) -> LibResult<DateTime<Utc>> {
        issued
            .checked_add_signed(self.loan_period)
            .ok_or_else(|| LibError::validation(format!("due date for a loan issued {issued} overflows")))
    }

    /// Status and fee for a loan due at `due` that came back at `returned`.
    ///
    /// Any started day past the due date counts as a full overdue day.
    pub fn settle(&self, due: DateTime<Utc>, returned: DateTime<Utc>) -> (LoanStatus, Option<i64>) {
        if returned <= due {
            return (LoanStatus::Completed, None);
        }
        const DAY: i64 = 24 * 60 * 60;
        let late_secs = (returned - due).num_seconds();
        let days = ((late_secs + DAY - 1) / DAY).max(1);
        (
            LoanStatus::Overdue,
            Some(days.saturating_mul(self.late_fee_per_day)),
        )
    }
}
