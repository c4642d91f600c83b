//! Repository behaviour against a scripted executor: the SQL each operation issues and how
//! replies are interpreted.

mod common;

use common::*;
use libris::{
    BookPatch, BookRepository, ExecResult, LibError, LoanKind, LoanRepository, LoanStatus,
    MemberRepository, NewBook, NewLoan, NewMember, PageRequest, Repository, Value,
};

fn dune() -> NewBook {
    NewBook {
        title: "Dune".into(),
        author: "Frank Herbert".into(),
        publisher: Some("Chilton".into()),
        genre: None,
        isbn_no: "9780441013593".into(),
        num_of_pages: 412,
        total_number_of_copies: 3,
    }
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

#[tokio::test]
async fn book_create_on_mysql_reads_back_by_last_insert_id() {
    let exec = ScriptedExecutor::mysql(vec![
        Reply::Exec(ExecResult::inserted(1, 7)),
        rows(vec![book_row(7, 3, 3)]),
    ]);
    let repo = BookRepository::new(&exec);

    let book = repo.create(&dune()).await.unwrap();
    assert_eq!(book.id, 7);
    assert_eq!(book.available_number_of_copies, 3);

    assert_eq!(
        exec.sql(),
        [
            "INSERT INTO `books` (`title`, `author`, `publisher`, `genre`, `isbnNo`, `numofPages`, \
             `totalNumberOfCopies`, `availableNumberOfCopies`) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            "SELECT * FROM books WHERE (`id` = ?) LIMIT 1 OFFSET 0",
        ]
    );
    let values = exec.values(0);
    assert_eq!(values[3], Value::Null);
    assert_eq!(values[7], Value::Int(3));
}

#[tokio::test]
async fn book_create_on_postgres_uses_returning() {
    let exec = ScriptedExecutor::postgres(vec![rows(vec![book_row(1, 3, 3)])]);
    let repo = BookRepository::new(&exec);

    let book = repo.create(&dune()).await.unwrap();
    assert_eq!(book.id, 1);
    assert_eq!(
        exec.sql(),
        [
            r#"INSERT INTO "books" ("title", "author", "publisher", "genre", "isbnNo", "numofPages", "totalNumberOfCopies", "availableNumberOfCopies") VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *"#
        ]
    );
}

#[tokio::test]
async fn book_create_without_insert_id_fails() {
    let exec = ScriptedExecutor::mysql(vec![affected(1)]);
    let err = BookRepository::new(&exec).create(&dune()).await.unwrap_err();
    assert!(matches!(err, LibError::Other(_)));
}

#[tokio::test]
async fn invalid_book_never_reaches_the_executor() {
    let exec = ScriptedExecutor::mysql(vec![]);
    let mut book = dune();
    book.title = "  ".into();
    let err = BookRepository::new(&exec).create(&book).await.unwrap_err();
    assert!(matches!(err, LibError::Validation(_)));
    assert!(exec.sql().is_empty());
}

#[tokio::test]
async fn book_list_counts_then_selects_window() {
    let exec = ScriptedExecutor::mysql(vec![count(11), rows(vec![book_row(1, 3, 3)])]);
    let repo = BookRepository::new(&exec);

    let page = repo
        .list(&PageRequest::new(10, 10).with_search("dune"))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.pagination.total, 11);
    assert!(!page.pagination.has_next);
    assert!(page.pagination.has_previous);

    assert_eq!(
        exec.sql(),
        [
            "SELECT COUNT(*) AS `count` FROM books WHERE ((`title` LIKE ?) OR (`isbnNo` LIKE ?))",
            "SELECT * FROM books WHERE ((`title` LIKE ?) OR (`isbnNo` LIKE ?)) LIMIT 10 OFFSET 10",
        ]
    );
    assert_eq!(exec.values(1), [Value::from("%dune%"), Value::from("%dune%")]);
}

#[tokio::test]
async fn book_list_past_the_end_skips_select() {
    let exec = ScriptedExecutor::mysql(vec![count(3)]);
    let page = BookRepository::new(&exec)
        .list(&PageRequest::new(20, 10))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.pagination.total, 3);
    assert_eq!(exec.sql(), ["SELECT COUNT(*) AS `count` FROM books"]);
}

#[tokio::test]
async fn book_list_rejects_zero_limit() {
    let exec = ScriptedExecutor::mysql(vec![]);
    let err = BookRepository::new(&exec)
        .list(&PageRequest::new(0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, LibError::InvalidPage(_)));
}

#[tokio::test]
async fn empty_patch_only_rereads() {
    let exec = ScriptedExecutor::mysql(vec![rows(vec![book_row(4, 1, 1)])]);
    let book = BookRepository::new(&exec)
        .update(4, &BookPatch::default())
        .await
        .unwrap();
    assert_eq!(book.map(|b| b.id), Some(4));
    assert_eq!(exec.sql().len(), 1);
}

#[tokio::test]
async fn raising_total_raises_available() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![book_row(1, 2, 5)]),
        affected(1),
        rows(vec![book_row(1, 3, 6)]),
    ]);
    let patch = BookPatch {
        total_number_of_copies: Some(6),
        ..Default::default()
    };
    let book = BookRepository::new(&exec)
        .update(1, &patch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(book.available_number_of_copies, 3);

    assert_eq!(
        exec.sql()[1],
        "UPDATE books SET `totalNumberOfCopies` = ?, `availableNumberOfCopies` = ? \
         WHERE ((`id` = ?) AND (`availableNumberOfCopies` = ?) AND (`totalNumberOfCopies` = ?))"
    );
    assert_eq!(
        exec.values(1),
        [Value::Int(6), Value::Int(3), Value::Int(1), Value::Int(2), Value::Int(5)]
    );
    assert_eq!(exec.remaining(), 0);
}

#[tokio::test]
async fn total_change_racing_a_checkout_conflicts() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![book_row(1, 1, 2)]),
        affected(0),
        rows(vec![book_row(1, 0, 2)]),
    ]);
    let patch = BookPatch {
        total_number_of_copies: Some(3),
        ..Default::default()
    };
    let err = BookRepository::new(&exec).update(1, &patch).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(exec.remaining(), 0);
}

#[tokio::test]
async fn unchanged_total_is_not_a_conflict() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![book_row(1, 1, 2)]),
        affected(0),
        rows(vec![book_row(1, 1, 2)]),
    ]);
    let patch = BookPatch {
        total_number_of_copies: Some(2),
        ..Default::default()
    };
    let book = BookRepository::new(&exec).update(1, &patch).await.unwrap();
    assert_eq!(book.map(|b| b.available_number_of_copies), Some(1));
}

#[tokio::test]
async fn total_below_copies_on_loan_is_a_conflict() {
    let exec = ScriptedExecutor::mysql(vec![rows(vec![book_row(1, 1, 5)])]);
    let patch = BookPatch {
        total_number_of_copies: Some(3),
        ..Default::default()
    };
    let err = BookRepository::new(&exec).update(1, &patch).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(exec.remaining(), 0);
}

#[tokio::test]
async fn update_of_missing_book_is_none() {
    let exec = ScriptedExecutor::mysql(vec![none()]);
    let patch = BookPatch {
        title: Some("Children of Dune".into()),
        ..Default::default()
    };
    assert_eq!(BookRepository::new(&exec).update(9, &patch).await.unwrap(), None);
}

#[tokio::test]
async fn checkout_is_guarded_on_the_count_it_read() {
    let exec = ScriptedExecutor::mysql(vec![rows(vec![book_row(3, 2, 2)]), affected(1)]);
    let book = BookRepository::new(&exec).checkout(3).await.unwrap();
    assert_eq!(book.available_number_of_copies, 1);
    assert_eq!(
        exec.sql()[1],
        "UPDATE books SET `availableNumberOfCopies` = ? WHERE ((`id` = ?) AND (`availableNumberOfCopies` = ?))"
    );
    assert_eq!(exec.values(1), [Value::Int(1), Value::Int(3), Value::Int(2)]);
}

#[tokio::test]
async fn checkout_conflicts() {
    // nothing on the shelf
    let exec = ScriptedExecutor::mysql(vec![rows(vec![book_row(3, 0, 2)])]);
    assert!(BookRepository::new(&exec).checkout(3).await.unwrap_err().is_conflict());
    assert_eq!(exec.sql().len(), 1);

    // lost the race
    let exec = ScriptedExecutor::mysql(vec![rows(vec![book_row(3, 1, 2)]), affected(0)]);
    assert!(BookRepository::new(&exec).checkout(3).await.unwrap_err().is_conflict());

    // unknown book
    let exec = ScriptedExecutor::mysql(vec![none()]);
    assert!(BookRepository::new(&exec).checkout(3).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn checkin_with_full_shelf_conflicts() {
    let exec = ScriptedExecutor::mysql(vec![rows(vec![book_row(3, 2, 2)])]);
    assert!(BookRepository::new(&exec).checkin(3).await.unwrap_err().is_conflict());
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[tokio::test]
async fn member_delete_returns_previous_row() {
    let exec = ScriptedExecutor::mysql(vec![rows(vec![member_row(9)]), affected(1)]);
    let member = MemberRepository::new(&exec).delete(9).await.unwrap().unwrap();
    assert_eq!(member.username, "ada");
    assert_eq!(exec.sql()[1], "DELETE FROM users WHERE (`userId` = ?)");
}

#[tokio::test]
async fn member_delete_of_missing_row_issues_no_delete() {
    let exec = ScriptedExecutor::mysql(vec![none()]);
    assert_eq!(MemberRepository::new(&exec).delete(9).await.unwrap(), None);
    assert_eq!(exec.sql().len(), 1);
}

#[tokio::test]
async fn member_with_bad_email_is_rejected() {
    let exec = ScriptedExecutor::mysql(vec![]);
    let new = NewMember {
        username: "ada".into(),
        email: "not-an-email".into(),
        role: Default::default(),
    };
    let err = MemberRepository::new(&exec).create(&new).await.unwrap_err();
    assert!(matches!(err, LibError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

const REQUEST: NewLoan = NewLoan {
    book_id: 3,
    user_id: 9,
};

#[tokio::test]
async fn issue_checks_out_and_records_a_pending_borrow() {
    let now = at(1, 10);
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![book_row(3, 2, 2)]),
        rows(vec![member_row(9)]),
        rows(vec![book_row(3, 2, 2)]),
        affected(1),
        Reply::Exec(ExecResult::inserted(1, 55)),
        rows(vec![loan_row(55, 3, 9, now, at(31, 10))]),
    ]);
    let loan = LoanRepository::new(&exec).issue_at(&REQUEST, now).await.unwrap();

    assert_eq!(loan.transaction_id, 55);
    assert_eq!(loan.status, LoanStatus::Pending);
    assert_eq!(loan.transaction_type, LoanKind::Borrow);
    assert!(loan.is_open());

    let sql = exec.sql();
    assert_eq!(
        sql[4],
        "INSERT INTO `transactions` (`bookId`, `userId`, `transactionType`, `status`, \
         `transactionDate`, `dueDate`, `returnDate`, `lateFees`) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    );
    assert_eq!(
        exec.values(4),
        [
            Value::Int(3),
            Value::Int(9),
            Value::from("borrow"),
            Value::from("pending"),
            Value::Timestamp(now),
            Value::Timestamp(at(31, 10)),
            Value::Null,
            Value::Null,
        ]
    );
    assert_eq!(exec.remaining(), 0);
}

#[tokio::test]
async fn issue_to_unknown_member_touches_nothing() {
    let exec = ScriptedExecutor::mysql(vec![rows(vec![book_row(3, 2, 2)]), none()]);
    let err = LoanRepository::new(&exec)
        .issue_at(&REQUEST, at(1, 10))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(exec.sql().iter().all(|s| s.starts_with("SELECT")));
}

#[tokio::test]
async fn issue_with_no_copies_is_a_conflict() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![book_row(3, 0, 2)]),
        rows(vec![member_row(9)]),
        rows(vec![book_row(3, 0, 2)]),
    ]);
    let err = LoanRepository::new(&exec)
        .issue_at(&REQUEST, at(1, 10))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn due_date_overflow_fails_before_checkout() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![book_row(3, 2, 2)]),
        rows(vec![member_row(9)]),
    ]);
    let err = LoanRepository::new(&exec)
        .issue_at(&REQUEST, chrono::DateTime::<chrono::Utc>::MAX_UTC)
        .await
        .unwrap_err();
    assert!(matches!(err, LibError::Validation(_)));
    assert_eq!(exec.sql().len(), 2);
}

#[tokio::test]
async fn failed_insert_puts_the_copy_back() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![book_row(3, 2, 2)]),
        rows(vec![member_row(9)]),
        rows(vec![book_row(3, 2, 2)]),
        affected(1),
        Reply::Fail("connection reset".into()),
        rows(vec![book_row(3, 1, 2)]),
        affected(1),
    ]);
    let err = LoanRepository::new(&exec)
        .issue_at(&REQUEST, at(1, 10))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "connection reset");
    assert_eq!(exec.remaining(), 0);
    assert_eq!(exec.values(6), [Value::Int(2), Value::Int(3), Value::Int(1)]);
}

#[tokio::test]
async fn failed_restock_keeps_the_insert_error() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![book_row(3, 2, 2)]),
        rows(vec![member_row(9)]),
        rows(vec![book_row(3, 2, 2)]),
        affected(1),
        Reply::Fail("connection reset".into()),
        Reply::Fail("connection closed".into()),
    ]);
    let err = LoanRepository::new(&exec)
        .issue_at(&REQUEST, at(1, 10))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "connection reset");
    assert_eq!(exec.remaining(), 0);
}

#[tokio::test]
async fn late_return_is_settled_with_fee() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![loan_row(55, 3, 9, at(1, 0), at(2, 0))]),
        rows(vec![book_row(3, 1, 2)]),
        affected(1),
        affected(1),
    ]);
    let returned = at(4, 12);
    let loan = LoanRepository::new(&exec)
        .receive_at(55, returned)
        .await
        .unwrap();

    // 2.5 days late rounds up to 3 days at the default 5 per day
    assert_eq!(loan.status, LoanStatus::Overdue);
    assert_eq!(loan.late_fees, Some(15));
    assert_eq!(loan.return_date, Some(returned));
    assert_eq!(loan.transaction_type, LoanKind::Return);

    assert_eq!(
        exec.values(2),
        [Value::Int(2), Value::Int(3), Value::Int(1)]
    );
    assert_eq!(
        exec.sql()[3],
        "UPDATE transactions SET `status` = ?, `transactionType` = ?, `returnDate` = ?, \
         `lateFees` = ? WHERE ((`transactionId` = ?) AND (`status` = ?))"
    );
    assert_eq!(
        exec.values(3),
        [
            Value::from("overdue"),
            Value::from("return"),
            Value::Timestamp(returned),
            Value::Int(15),
            Value::Int(55),
            Value::from("pending"),
        ]
    );
    assert_eq!(exec.remaining(), 0);
}

#[tokio::test]
async fn on_time_return_has_no_fee() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![loan_row(55, 3, 9, at(1, 0), at(20, 0))]),
        rows(vec![book_row(3, 1, 2)]),
        affected(1),
        affected(1),
    ]);
    let loan = LoanRepository::new(&exec).receive_at(55, at(5, 0)).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Completed);
    assert_eq!(loan.late_fees, None);
    assert_eq!(exec.values(3)[3], Value::Null);
}

#[tokio::test]
async fn lost_checkin_race_leaves_the_loan_open_for_a_retry() {
    let exec = ScriptedExecutor::mysql(vec![
        // first attempt: the book's count moves under us
        rows(vec![loan_row(55, 3, 9, at(1, 0), at(20, 0))]),
        rows(vec![book_row(3, 1, 2)]),
        affected(0),
        // retry
        rows(vec![loan_row(55, 3, 9, at(1, 0), at(20, 0))]),
        rows(vec![book_row(3, 0, 2)]),
        affected(1),
        affected(1),
    ]);
    let repo = LoanRepository::new(&exec);

    let err = repo.receive_at(55, at(5, 0)).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(exec.sql().iter().all(|s| !s.starts_with("UPDATE transactions")));

    let loan = repo.receive_at(55, at(5, 0)).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Completed);
    assert_eq!(exec.values(5), [Value::Int(1), Value::Int(3), Value::Int(0)]);
    assert!(exec.sql()[6].starts_with("UPDATE transactions SET"));
    assert_eq!(exec.remaining(), 0);
}

#[tokio::test]
async fn loan_closed_concurrently_takes_the_copy_back() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![loan_row(55, 3, 9, at(1, 0), at(20, 0))]),
        rows(vec![book_row(3, 1, 2)]),
        affected(1),
        affected(0),
        rows(vec![book_row(3, 2, 2)]),
        affected(1),
    ]);
    let err = LoanRepository::new(&exec)
        .receive_at(55, at(5, 0))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(exec.remaining(), 0);
    assert_eq!(exec.values(5), [Value::Int(1), Value::Int(3), Value::Int(2)]);
}

#[tokio::test]
async fn return_of_deleted_book_still_closes_the_loan() {
    let exec = ScriptedExecutor::mysql(vec![
        rows(vec![loan_row(55, 3, 9, at(1, 0), at(20, 0))]),
        none(),
        affected(1),
    ]);
    let loan = LoanRepository::new(&exec).receive_at(55, at(5, 0)).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Completed);
    assert_eq!(exec.remaining(), 0);
}

#[tokio::test]
async fn closed_loan_cannot_be_received_again() {
    let closed = loan_row(55, 3, 9, at(1, 0), at(20, 0)).with("status", "completed");
    let exec = ScriptedExecutor::mysql(vec![rows(vec![closed])]);
    let err = LoanRepository::new(&exec).receive_at(55, at(5, 0)).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(exec.sql().len(), 1);
}

#[tokio::test]
async fn due_list_filters_pending_and_past_due() {
    let exec = ScriptedExecutor::mysql(vec![
        count(1),
        rows(vec![loan_row(55, 3, 9, at(1, 0), at(2, 0))]),
    ]);
    let page = LoanRepository::new(&exec)
        .due_list(at(10, 0), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(
        exec.sql()[0],
        "SELECT COUNT(*) AS `count` FROM transactions WHERE ((`status` = ?) AND (`dueDate` < ?))"
    );
    assert_eq!(exec.values(0), [Value::from("pending"), Value::Timestamp(at(10, 0))]);
}

#[tokio::test]
async fn loan_search_by_member_prefix() {
    let exec = ScriptedExecutor::mysql(vec![count(0)]);
    let page = LoanRepository::new(&exec)
        .list(&PageRequest::default().with_search("U9"))
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 0);
    assert_eq!(
        exec.sql(),
        ["SELECT COUNT(*) AS `count` FROM transactions WHERE (`userId` = ?)"]
    );
}

#[tokio::test]
async fn loan_search_without_prefix_matches_nothing() {
    let exec = ScriptedExecutor::mysql(vec![]);
    let page = LoanRepository::new(&exec)
        .list(&PageRequest::default().with_search("dune"))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert!(exec.sql().is_empty());
}

// ---------------------------------------------------------------------------
// Logging wrapper
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tracing_executor_is_transparent() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let exec = libris::TracingExecutor::new(ScriptedExecutor::mysql(vec![rows(vec![
        book_row(3, 1, 1),
    ])]))
    .max_sql_length(16);
    let repo = BookRepository::new(exec);
    let book = repo.get_by_id(3).await.unwrap();
    assert_eq!(book.map(|b| b.title), Some("Dune".to_string()));
    assert_eq!(repo.executor().inner().sql().len(), 1);
}
