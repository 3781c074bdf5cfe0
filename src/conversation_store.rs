use crate::db_types::{Conversation, PENDING_CONVERSATION_ID};

use sqlx::postgres::PgPoolOptions;
use time::OffsetDateTime;
use sqlx::{Pool, Postgres};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Default)]
pub struct MemoryTable {
    next_id: i32,
    rows: Vec<Conversation>,
}

/// The agent id → conversation id mapping used to continue a multi-turn dialogue with a
/// relevance.ai agent.  Rows are cleared when a call ends.
#[derive(Clone)]
pub enum ConversationStore {
    Postgres(Pool<Postgres>),
    Memory(Arc<Mutex<MemoryTable>>),
}

impl ConversationStore {
    /// Connect to Postgres and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("conversation store migrations applied");
        Ok(Self::Postgres(pool))
    }

    pub fn memory() -> Self {
        Self::Memory(Arc::new(Mutex::new(MemoryTable::default())))
    }

    /// Store a row for `agent_id` whose conversation id is not yet known.
    pub async fn insert_pending(&self, agent_id: &str) -> Result<Conversation, StoreError> {
        let conversation = match self {
            Self::Postgres(pool) => {
                sqlx::query_as::<_, Conversation>(
                    "
                    insert into conversations (
                      relevance_agent_id,
                      relevance_conversation_id
                    ) values (
                      $1,
                      $2
                    )
                    returning *
                    ",
                )
                .bind(agent_id)
                .bind(PENDING_CONVERSATION_ID)
                .fetch_one(pool)
                .await?
            }
            Self::Memory(table) => {
                let mut table = lock(table);
                table.next_id += 1;
                let conversation = Conversation {
                    id: table.next_id,
                    relevance_agent_id: agent_id.to_string(),
                    relevance_conversation_id: PENDING_CONVERSATION_ID.to_string(),
                    created: OffsetDateTime::now_utc(),
                };
                table.rows.push(conversation.clone());
                conversation
            }
        };
        debug!(
            conversation=%conversation,
            created=%conversation.created,
            "stored pending conversation"
        );
        Ok(conversation)
    }

    /// All rows, ordered by conversation id descending.
    pub async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        match self {
            Self::Postgres(pool) => Ok(sqlx::query_as::<_, Conversation>(
                "
                select *
                from conversations
                order by relevance_conversation_id desc, id
                ",
            )
            .fetch_all(pool)
            .await?),
            Self::Memory(table) => {
                let mut rows = lock(table).rows.clone();
                rows.sort_by(|a, b| {
                    b.relevance_conversation_id
                        .cmp(&a.relevance_conversation_id)
                        .then(a.id.cmp(&b.id))
                });
                Ok(rows)
            }
        }
    }

    /// The conversation id to continue, if any row already has one.  Walking the rows in their
    /// default (descending) order, the last non-pending id wins.
    pub async fn active_conversation_id(&self) -> Result<Option<String>, StoreError> {
        match self {
            Self::Postgres(pool) => Ok(sqlx::query_scalar::<_, String>(
                "
                select relevance_conversation_id
                from conversations
                where relevance_conversation_id <> $1
                order by relevance_conversation_id asc
                limit 1
                ",
            )
            .bind(PENDING_CONVERSATION_ID)
            .fetch_optional(pool)
            .await?),
            Self::Memory(_) => Ok(self
                .list()
                .await?
                .into_iter()
                .filter(|c| !c.is_pending())
                .last()
                .map(|c| c.relevance_conversation_id)),
        }
    }

    /// Give every pending row the conversation id relevance.ai returned.
    pub async fn assign_conversation_id(&self, conversation_id: &str) -> Result<u64, StoreError> {
        let updated = match self {
            Self::Postgres(pool) => sqlx::query(
                "
                update conversations
                set relevance_conversation_id = $1
                where relevance_conversation_id = $2
                ",
            )
            .bind(conversation_id)
            .bind(PENDING_CONVERSATION_ID)
            .execute(pool)
            .await?
            .rows_affected(),
            Self::Memory(table) => {
                let mut table = lock(table);
                let mut updated = 0;
                for row in table.rows.iter_mut().filter(|c| c.is_pending()) {
                    row.relevance_conversation_id = conversation_id.to_string();
                    updated += 1;
                }
                updated
            }
        };
        debug!(conversation_id, updated, "assigned conversation id");
        Ok(updated)
    }

    pub async fn remove_all(&self) -> Result<u64, StoreError> {
        let removed = match self {
            Self::Postgres(pool) => sqlx::query("delete from conversations")
                .execute(pool)
                .await?
                .rows_affected(),
            Self::Memory(table) => {
                let mut table = lock(table);
                let removed = table.rows.len() as u64;
                table.rows.clear();
                removed
            }
        };
        info!("All {removed} conversation records have been deleted.");
        Ok(removed)
    }
}

fn lock(table: &Mutex<MemoryTable>) -> MutexGuard<'_, MemoryTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}
