use super::{BookRepository, MemberRepository, Repository, Table, repo_event, repo_warn};
use crate::error::{LibError, LibResult};
use crate::executor::Executor;
use crate::filter::WhereExpr;
use crate::model::{Loan, LoanKind, LoanPatch, LoanPolicy, LoanStatus, NewLoan};
use crate::page::{Page, PageRequest};
use crate::record::{Record, Row};
use crate::value::Value;
use chrono::{DateTime, Utc};

/// Borrow transactions. Issuing and receiving keep the book's available copies in step.
#[derive(Debug, Clone)]
pub struct LoanRepository<E> {
    table: Table<E>,
    policy: LoanPolicy,
}

impl<E: Executor> LoanRepository<E> {
    pub fn new(exec: E) -> Self {
        Self::with_policy(exec, LoanPolicy::default())
    }

    pub fn with_policy(exec: E, policy: LoanPolicy) -> Self {
        Self {
            table: Table::new(exec),
            policy,
        }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    pub fn executor(&self) -> &E {
        &self.table.exec
    }

    fn books(&self) -> BookRepository<&E> {
        BookRepository::new(&self.table.exec)
    }

    /// Lend a copy now.
    pub async fn issue(&self, request: &NewLoan) -> LibResult<Loan> {
        self.issue_at(request, Utc::now()).await
    }

    /// Lend a copy as of `now`.
    ///
    /// Fails with [`LibError::NotFound`] for an unknown book or member and with
    /// [`LibError::Conflict`] when no copy is available.
    pub async fn issue_at(&self, request: &NewLoan, now: DateTime<Utc>) -> LibResult<Loan> {
        let books = self.books();
        if books.get_by_id(request.book_id).await?.is_none() {
            return Err(LibError::not_found(format!("book {}", request.book_id)));
        }
        let members = MemberRepository::new(&self.table.exec);
        if members.get_by_id(request.user_id).await?.is_none() {
            return Err(LibError::not_found(format!("member {}", request.user_id)));
        }

        let due = self.policy.due_date(now)?;
        books.checkout(request.book_id).await?;

        let row = Row::new()
            .with(Loan::COL_BOOK_ID.name(), request.book_id)
            .with(Loan::COL_USER_ID.name(), request.user_id)
            .with(Loan::COL_TRANSACTION_TYPE.name(), LoanKind::Borrow)
            .with(Loan::COL_STATUS.name(), LoanStatus::Pending)
            .with(Loan::COL_TRANSACTION_DATE.name(), now)
            .with(Loan::COL_DUE_DATE.name(), due)
            .with(Loan::COL_RETURN_DATE.name(), Value::Null)
            .with(Loan::COL_LATE_FEES.name(), Value::Null);

        match self.table.insert(row, Loan::COL_TRANSACTION_ID).await {
            Ok(loan) => {
                repo_event!(
                    transaction_id = loan.transaction_id,
                    book_id = loan.book_id,
                    user_id = loan.user_id,
                    "loan issued"
                );
                Ok(loan)
            }
            Err(err) => {
                // Put the copy back; the insert error is the one worth reporting.
                if let Err(_undo) = books.checkin(request.book_id).await {
                    repo_warn!(book_id = request.book_id, error = %_undo, "copy not restocked after failed issue");
                }
                Err(err)
            }
        }
    }

    /// Take a book back now.
    pub async fn receive(&self, transaction_id: i64) -> LibResult<Loan> {
        self.receive_at(transaction_id, Utc::now()).await
    }

    /// Close a pending loan as of `now`: return the copy to stock, then settle status and
    /// fee and stamp the return date.
    ///
    /// The copy goes back first, so a lost race on the book's count leaves the loan open and
    /// the call can be retried.
    pub async fn receive_at(&self, transaction_id: i64, now: DateTime<Utc>) -> LibResult<Loan> {
        let Some(mut loan) = self.get_by_id(transaction_id).await? else {
            return Err(LibError::not_found(format!("loan {transaction_id}")));
        };
        if !loan.is_open() {
            return Err(LibError::conflict(format!(
                "loan {transaction_id} is already closed"
            )));
        }

        let books = self.books();
        let restocked = match books.checkin(loan.book_id).await {
            Ok(_) => true,
            // The book may have been removed from the catalogue while on loan.
            Err(LibError::NotFound(_)) => {
                repo_event!(book_id = loan.book_id, "returned book no longer exists");
                false
            }
            Err(err) => return Err(err),
        };

        let (status, fee) = self.policy.settle(loan.due_date, now);
        let set = Row::new()
            .with(Loan::COL_STATUS.name(), status)
            .with(Loan::COL_TRANSACTION_TYPE.name(), LoanKind::Return)
            .with(Loan::COL_RETURN_DATE.name(), now)
            .with(Loan::COL_LATE_FEES.name(), fee);
        let guard = WhereExpr::eq(Loan::COL_TRANSACTION_ID, transaction_id)
            .and_also(WhereExpr::eq(Loan::COL_STATUS, LoanStatus::Pending));
        let closed = self.table.update_where(&set, &guard).await.map(|n| n > 0);
        if !matches!(closed, Ok(true)) {
            // The loan stays open, so the copy comes back off the shelf.
            if restocked {
                if let Err(_undo) = books.checkout(loan.book_id).await {
                    repo_warn!(book_id = loan.book_id, error = %_undo, "copy not taken back after failed return");
                }
            }
            closed?;
            return Err(LibError::conflict(format!(
                "loan {transaction_id} was closed concurrently"
            )));
        }

        loan.status = status;
        loan.transaction_type = LoanKind::Return;
        loan.return_date = Some(now);
        loan.late_fees = fee;
        repo_event!(transaction_id, status = %status, fee = ?fee, "loan received");
        Ok(loan)
    }

    /// Pending loans whose due date is before `now`.
    pub async fn due_list(&self, now: DateTime<Utc>, req: &PageRequest) -> LibResult<Page<Loan>> {
        let filter = WhereExpr::eq(Loan::COL_STATUS, LoanStatus::Pending)
            .and_also(WhereExpr::lt(Loan::COL_DUE_DATE, now));
        self.table.page(&filter, req).await
    }
}

/// `u<id>` filters by member, `b<id>` by book. Anything else matches nothing.
fn search_filter(term: &str) -> Option<WhereExpr<Loan>> {
    let term = term.to_ascii_lowercase();
    let (column, id) = if let Some(id) = term.strip_prefix('u') {
        (Loan::COL_USER_ID, id)
    } else if let Some(id) = term.strip_prefix('b') {
        (Loan::COL_BOOK_ID, id)
    } else {
        return None;
    };
    let id: i64 = id.trim().parse().ok()?;
    Some(WhereExpr::eq(column, id))
}

impl<E: Executor> Repository for LoanRepository<E> {
    type Item = Loan;
    type New = NewLoan;
    type Patch = LoanPatch;

    async fn create(&self, data: &NewLoan) -> LibResult<Loan> {
        self.issue(data).await
    }

    async fn update(&self, id: i64, patch: &LoanPatch) -> LibResult<Option<Loan>> {
        if patch.late_fees.is_some_and(|fee| fee < 0) {
            return Err(LibError::validation("late fees cannot be negative"));
        }
        self.table
            .update_by_id(Loan::COL_TRANSACTION_ID, id, &patch.to_row())
            .await
    }

    async fn delete(&self, id: i64) -> LibResult<Option<Loan>> {
        self.table.delete_by_id(Loan::COL_TRANSACTION_ID, id).await
    }

    async fn get_by_id(&self, id: i64) -> LibResult<Option<Loan>> {
        self.table.find(Loan::COL_TRANSACTION_ID, id).await
    }

    async fn list(&self, req: &PageRequest) -> LibResult<Page<Loan>> {
        let filter = match req.search_term() {
            None => WhereExpr::all(),
            Some(term) => match search_filter(term) {
                Some(filter) => filter,
                None => {
                    req.validate()?;
                    return Ok(Page::new(Vec::new(), req, 0));
                }
            },
        };
        self.table.page(&filter, req).await
    }
}
