use super::{Repository, Table, repo_event};
use crate::error::{LibError, LibResult};
use crate::executor::Executor;
use crate::filter::WhereExpr;
use crate::model::{Book, BookPatch, NewBook};
use crate::page::{Page, PageRequest};
use crate::record::{Record, Row};

/// Books, with copy accounting for loans.
#[derive(Debug, Clone)]
pub struct BookRepository<E> {
    table: Table<E>,
}

impl<E: Executor> BookRepository<E> {
    pub fn new(exec: E) -> Self {
        Self {
            table: Table::new(exec),
        }
    }

    pub fn executor(&self) -> &E {
        &self.table.exec
    }

    pub fn into_executor(self) -> E {
        self.table.exec
    }

    async fn require(&self, id: i64) -> LibResult<Book> {
        self.table
            .find(Book::COL_ID, id)
            .await?
            .ok_or_else(|| LibError::not_found(format!("book {id}")))
    }

    /// Move the available count from the value read in `book` to `next`. The UPDATE is
    /// guarded on the old value, so a concurrent writer turns this into a conflict.
    async fn swap_available(&self, book: &Book, next: i32) -> LibResult<()> {
        let set = Row::new().with(Book::COL_AVAILABLE_NUMBER_OF_COPIES.name(), next);
        let guard = WhereExpr::eq(Book::COL_ID, book.id).and_also(WhereExpr::eq(
            Book::COL_AVAILABLE_NUMBER_OF_COPIES,
            book.available_number_of_copies,
        ));
        match self.table.update_where(&set, &guard).await? {
            0 => Err(LibError::conflict(format!(
                "book {} was modified concurrently",
                book.id
            ))),
            _ => Ok(()),
        }
    }

    /// Take one copy off the shelf.
    pub async fn checkout(&self, id: i64) -> LibResult<Book> {
        let mut book = self.require(id).await?;
        if !book.is_available() {
            return Err(LibError::conflict(format!(
                "no copies of book {id} are available"
            )));
        }
        let next = book.available_number_of_copies - 1;
        self.swap_available(&book, next).await?;
        repo_event!(book_id = id, available = next, "checked out");
        book.available_number_of_copies = next;
        Ok(book)
    }

    /// Put one copy back on the shelf.
    pub async fn checkin(&self, id: i64) -> LibResult<Book> {
        let mut book = self.require(id).await?;
        if book.available_number_of_copies >= book.total_number_of_copies {
            return Err(LibError::conflict(format!(
                "all copies of book {id} are already in stock"
            )));
        }
        let next = book.available_number_of_copies + 1;
        self.swap_available(&book, next).await?;
        repo_event!(book_id = id, available = next, "checked in");
        book.available_number_of_copies = next;
        Ok(book)
    }
}

fn search_filter(req: &PageRequest) -> WhereExpr<Book> {
    match req.search_term() {
        Some(term) => WhereExpr::or(vec![
            WhereExpr::contains(Book::COL_TITLE, term),
            WhereExpr::contains(Book::COL_ISBN_NO, term),
        ]),
        None => WhereExpr::all(),
    }
}

impl<E: Executor> Repository for BookRepository<E> {
    type Item = Book;
    type New = NewBook;
    type Patch = BookPatch;

    async fn create(&self, data: &NewBook) -> LibResult<Book> {
        data.validate()?;
        let mut row = data.to_row();
        row.push(
            Book::COL_AVAILABLE_NUMBER_OF_COPIES.name(),
            data.total_number_of_copies,
        );
        let book = self.table.insert(row, Book::COL_ID).await?;
        repo_event!(book_id = book.id, "book created");
        Ok(book)
    }

    /// Changing the total shifts the available count by the same amount; a total below the
    /// number of copies on loan is a [`LibError::Conflict`]. That UPDATE is guarded on both
    /// counts as read, so a concurrent checkout or checkin is a conflict too.
    async fn update(&self, id: i64, patch: &BookPatch) -> LibResult<Option<Book>> {
        patch.validate()?;
        let Some(total) = patch.total_number_of_copies else {
            return self.table.update_by_id(Book::COL_ID, id, &patch.to_row()).await;
        };

        let Some(current) = self.table.find(Book::COL_ID, id).await? else {
            return Ok(None);
        };
        let on_loan = current.total_number_of_copies - current.available_number_of_copies;
        if total < on_loan {
            return Err(LibError::conflict(format!(
                "book {id} has {on_loan} copies on loan, cannot reduce total to {total}"
            )));
        }
        let mut set = patch.to_row();
        set.push(Book::COL_AVAILABLE_NUMBER_OF_COPIES.name(), total - on_loan);
        let guard = WhereExpr::eq(Book::COL_ID, id)
            .and_also(WhereExpr::eq(
                Book::COL_AVAILABLE_NUMBER_OF_COPIES,
                current.available_number_of_copies,
            ))
            .and_also(WhereExpr::eq(
                Book::COL_TOTAL_NUMBER_OF_COPIES,
                current.total_number_of_copies,
            ));
        let changed = self.table.update_where(&set, &guard).await?;
        let Some(after) = self.table.find(Book::COL_ID, id).await? else {
            return Ok(None);
        };
        // MySQL reports 0 rows for an UPDATE that changes nothing; only moved counts conflict.
        if changed == 0
            && (after.available_number_of_copies != current.available_number_of_copies
                || after.total_number_of_copies != current.total_number_of_copies)
        {
            return Err(LibError::conflict(format!(
                "book {id} was modified concurrently"
            )));
        }
        repo_event!(book_id = id, total, available = after.available_number_of_copies, "book restocked");
        Ok(Some(after))
    }

    async fn delete(&self, id: i64) -> LibResult<Option<Book>> {
        let book = self.table.delete_by_id(Book::COL_ID, id).await?;
        repo_event!(book_id = id, deleted = book.is_some(), "book delete");
        Ok(book)
    }

    async fn get_by_id(&self, id: i64) -> LibResult<Option<Book>> {
        self.table.find(Book::COL_ID, id).await
    }

    async fn list(&self, req: &PageRequest) -> LibResult<Page<Book>> {
        self.table.page(&search_filter(req), req).await
    }
}
