//! In-process record storage behind a repository port.
//!
//! Handlers only see `Arc<dyn Repository<R>>`; the in-memory adapter is
//! wired in once at startup and lives until the process exits.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{Post, User};

/// A stored row with a server-assigned id.
pub trait Record: Clone + Send + Sync + 'static {
    /// Validated input that becomes a record once it has an id.
    type Draft: Send + 'static;

    fn id(&self) -> u64;

    fn assign(id: u64, draft: Self::Draft) -> Self;
}

#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// All records in insertion order.
    async fn list(&self) -> Vec<R>;

    async fn get_by_id(&self, id: u64) -> Option<R>;

    /// Assigns the next id to `draft` and stores it.
    async fn insert(&self, draft: R::Draft) -> R;
}

#[derive(Debug)]
struct Table<R> {
    rows: Vec<R>,
    next_id: u64,
}

/// Vec-backed repository with a strictly monotonic id counter.
///
/// The counter starts one past the highest seeded id, so without deletions
/// ids match the `count + 1` scheme clients expect.
#[derive(Debug)]
pub struct InMemoryRepository<R> {
    table: RwLock<Table<R>>,
}

impl<R: Record> InMemoryRepository<R> {
    pub fn empty() -> Self {
        Self::seeded(Vec::new())
    }

    pub fn seeded(rows: Vec<R>) -> Self {
        let next_id = rows.iter().map(Record::id).max().unwrap_or(0) + 1;
        Self {
            table: RwLock::new(Table { rows, next_id }),
        }
    }
}

impl<R: Record> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl<R: Record> Repository<R> for InMemoryRepository<R> {
    async fn list(&self) -> Vec<R> {
        self.table.read().await.rows.clone()
    }

    async fn get_by_id(&self, id: u64) -> Option<R> {
        let table = self.table.read().await;
        table.rows.iter().find(|row| row.id() == id).cloned()
    }

    async fn insert(&self, draft: R::Draft) -> R {
        let mut table = self.table.write().await;
        let record = R::assign(table.next_id, draft);
        table.next_id += 1;
        table.rows.push(record.clone());
        record
    }
}

pub fn seed_users() -> Vec<User> {
    [
        (1, "John Doe", "john@example.com"),
        (2, "Jane Smith", "jane@example.com"),
        (3, "Bob Johnson", "bob@example.com"),
    ]
    .into_iter()
    .map(|(id, name, email)| User {
        id,
        name: name.to_string(),
        email: email.to_string(),
    })
    .collect()
}

pub fn seed_posts() -> Vec<Post> {
    [
        (1, "First Post", "This is the first post content", 1),
        (2, "Second Post", "This is the second post content", 2),
        (3, "Third Post", "This is the third post content", 1),
    ]
    .into_iter()
    .map(|(id, title, content, author_id)| Post {
        id,
        title: title.to_string(),
        content: content.to_string(),
        author_id,
    })
    .collect()
}
