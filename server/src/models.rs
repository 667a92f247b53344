//! Wire-level records served by the API and the request payloads that
//! create them.
//!
//! Payload fields are all optional so that presence can be checked by the
//! handlers and reported as a `400 {message}` instead of a deserializer
//! rejection.

use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author_id: u64,
}

/// Validated fields for a user that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub author_id: u64,
}

impl Record for User {
    type Draft = UserDraft;

    fn id(&self) -> u64 {
        self.id
    }

    fn assign(id: u64, draft: UserDraft) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
        }
    }
}

impl Record for Post {
    type Draft = PostDraft;

    fn id(&self) -> u64 {
        self.id
    }

    fn assign(id: u64, draft: PostDraft) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            author_id: draft.author_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CreateUser {
    /// Returns `None` when either field is absent or empty.
    pub fn into_draft(self) -> Option<UserDraft> {
        Some(UserDraft {
            name: present(self.name)?,
            email: present(self.email)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<AuthorId>,
}

impl CreatePost {
    pub fn into_draft(self) -> Option<PostDraft> {
        Some(PostDraft {
            title: present(self.title)?,
            content: present(self.content)?,
            author_id: self.author_id?.resolve()?,
        })
    }
}

/// `authorId` as sent by clients: form posts carry it as a string, API
/// callers send a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AuthorId {
    Number(i64),
    Fraction(f64),
    Text(String),
}

impl AuthorId {
    /// Resolves to a positive id, read like `parseInt`: fractions are
    /// truncated, and text contributes its leading digits after optional
    /// whitespace.
    fn resolve(self) -> Option<u64> {
        let id = match self {
            AuthorId::Number(n) => u64::try_from(n).ok(),
            AuthorId::Fraction(f) if f.is_finite() && f >= 1.0 && f < u64::MAX as f64 => {
                Some(f.trunc() as u64)
            }
            AuthorId::Fraction(_) => None,
            AuthorId::Text(text) => parse_id(&text),
        };
        id.filter(|id| *id != 0)
    }
}

/// Reads an id the way `parseInt` would: optional leading whitespace, then
/// digits; trailing garbage is ignored. Negative or digit-less input is `None`.
pub fn parse_id(text: &str) -> Option<u64> {
    let digits: String = text
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
    pub environment: String,
    /// Response time as ISO-8601 UTC with millisecond precision.
    pub timestamp: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RootDocument {
    pub message: String,
    pub version: String,
    pub environment: String,
    pub endpoints: Vec<String>,
}

/// Error body shared by every non-2xx response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
