use super::{Repository, Table, repo_event};
use crate::error::LibResult;
use crate::executor::Executor;
use crate::filter::WhereExpr;
use crate::model::{Member, MemberPatch, NewMember};
use crate::page::{Page, PageRequest};
use crate::record::Record;

/// Library members (the `users` table).
#[derive(Debug, Clone)]
pub struct MemberRepository<E> {
    table: Table<E>,
}

impl<E: Executor> MemberRepository<E> {
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
}

fn search_filter(req: &PageRequest) -> WhereExpr<Member> {
    match req.search_term() {
        Some(term) => WhereExpr::or(vec![
            WhereExpr::contains(Member::COL_USERNAME, term),
            WhereExpr::contains(Member::COL_EMAIL, term),
        ]),
        None => WhereExpr::all(),
    }
}

impl<E: Executor> Repository for MemberRepository<E> {
    type Item = Member;
    type New = NewMember;
    type Patch = MemberPatch;

    async fn create(&self, data: &NewMember) -> LibResult<Member> {
        data.validate()?;
        let member = self.table.insert(data.to_row(), Member::COL_USER_ID).await?;
        repo_event!(user_id = member.user_id, role = %member.role, "member created");
        Ok(member)
    }

    async fn update(&self, id: i64, patch: &MemberPatch) -> LibResult<Option<Member>> {
        patch.validate()?;
        self.table
            .update_by_id(Member::COL_USER_ID, id, &patch.to_row())
            .await
    }

    async fn delete(&self, id: i64) -> LibResult<Option<Member>> {
        let member = self.table.delete_by_id(Member::COL_USER_ID, id).await?;
        repo_event!(user_id = id, deleted = member.is_some(), "member delete");
        Ok(member)
    }

    async fn get_by_id(&self, id: i64) -> LibResult<Option<Member>> {
        self.table.find(Member::COL_USER_ID, id).await
    }

    async fn list(&self, req: &PageRequest) -> LibResult<Page<Member>> {
        self.table.page(&search_filter(req), req).await
    }
}
