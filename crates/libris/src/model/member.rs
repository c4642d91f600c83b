use super::text_enum;
use crate::error::{LibError, LibResult};
use crate::{FromRow, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    #[default]
    User,
}

text_enum!(MemberRole {
    Admin => "admin",
    User => "user",
});

/// Payload for registering a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[record(table = "users")]
pub struct NewMember {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
}

impl NewMember {
    pub fn validate(&self) -> LibResult<()> {
        if self.username.trim().is_empty() {
            return Err(LibError::validation("username is required"));
        }
        validate_email(&self.email)
    }
}

pub(crate) fn validate_email(email: &str) -> LibResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(LibError::validation(format!("invalid email: {email:?}"))),
    }
}

/// A registered library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record, FromRow)]
#[serde(rename_all = "camelCase")]
#[record(table = "users", rename_all = "camelCase")]
pub struct Member {
    #[record(id)]
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: MemberRole,
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Record)]
#[serde(default)]
#[record(table = "users", partial)]
pub struct MemberPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<MemberRole>,
}

impl MemberPatch {
    pub fn validate(&self) -> LibResult<()> {
        if self.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(LibError::validation("username cannot be blank"));
        }
        match &self.email {
            Some(email) => validate_email(email),
            None => Ok(()),
        }
    }
}

impl Member {
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}
