//! Scripted executor and row fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use libris::{Dialect, ExecResult, Executor, LibError, LibResult, Query, Row, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

pub enum Reply {
    Rows(Vec<Row>),
    Exec(ExecResult),
    Fail(String),
}

/// Answers queries from a fixed script, in order, and records what it was asked.
pub struct ScriptedExecutor {
    dialect: Dialect,
    replies: Mutex<VecDeque<Reply>>,
    log: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedExecutor {
    pub fn new(dialect: Dialect, replies: Vec<Reply>) -> Self {
        Self {
            dialect,
            replies: Mutex::new(replies.into()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn mysql(replies: Vec<Reply>) -> Self {
        Self::new(Dialect::MySql, replies)
    }

    pub fn postgres(replies: Vec<Reply>) -> Self {
        Self::new(Dialect::Postgres, replies)
    }

    pub fn sql(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn values(&self, idx: usize) -> Vec<Value> {
        self.log.lock().unwrap()[idx].1.clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    fn next(&self, query: &Query) -> LibResult<Reply> {
        libris::executor::ensure_dialect(self.dialect, query)?;
        assert_eq!(
            query.placeholder_count(),
            query.values().len(),
            "placeholders and values disagree in {}",
            query.sql()
        );
        self.log
            .lock()
            .unwrap()
            .push((query.sql().to_string(), query.values().to_vec()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Fail(msg)) => Err(LibError::Other(msg)),
            Some(reply) => Ok(reply),
            None => panic!("unexpected query: {}", query.sql()),
        }
    }
}

impl Executor for ScriptedExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn fetch_all(&self, query: &Query) -> LibResult<Vec<Row>> {
        match self.next(query)? {
            Reply::Rows(rows) => Ok(rows),
            _ => panic!("expected a row reply for {}", query.sql()),
        }
    }

    async fn execute(&self, query: &Query) -> LibResult<ExecResult> {
        match self.next(query)? {
            Reply::Exec(result) => Ok(result),
            _ => panic!("expected an exec reply for {}", query.sql()),
        }
    }
}

pub fn rows(rows: Vec<Row>) -> Reply {
    Reply::Rows(rows)
}

pub fn none() -> Reply {
    Reply::Rows(Vec::new())
}

pub fn affected(n: u64) -> Reply {
    Reply::Exec(ExecResult::affected(n))
}

pub fn count(n: i64) -> Reply {
    Reply::Rows(vec![Row::new().with("count", n)])
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub fn book_row(id: i64, available: i32, total: i32) -> Row {
    Row::new()
        .with("id", id)
        .with("title", "Dune")
        .with("author", "Frank Herbert")
        .with("publisher", "Chilton")
        .with("genre", Value::Null)
        .with("isbnNo", "9780441013593")
        .with("numofPages", 412)
        .with("totalNumberOfCopies", total)
        .with("availableNumberOfCopies", available)
}

pub fn member_row(id: i64) -> Row {
    Row::new()
        .with("userId", id)
        .with("username", "ada")
        .with("email", "ada@example.com")
        .with("role", "user")
}

pub fn loan_row(id: i64, book_id: i64, user_id: i64, issued: DateTime<Utc>, due: DateTime<Utc>) -> Row {
    Row::new()
        .with("transactionId", id)
        .with("bookId", book_id)
        .with("userId", user_id)
        .with("transactionType", "borrow")
        .with("status", "pending")
        .with("transactionDate", issued)
        .with("dueDate", due)
        .with("returnDate", Value::Null)
        .with("lateFees", Value::Null)
}
