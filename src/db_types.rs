use std::fmt;
use time::OffsetDateTime;

/// Conversation id stored until relevance.ai hands back a real one.
pub const PENDING_CONVERSATION_ID: &str = "1234";

#[derive(sqlx::FromRow, Clone, Debug, PartialEq)]
pub struct Conversation {
    pub id: i32,
    pub relevance_agent_id: String,
    pub relevance_conversation_id: String,
    pub created: OffsetDateTime,
}

impl Conversation {
    pub fn is_pending(&self) -> bool {
        self.relevance_conversation_id == PENDING_CONVERSATION_ID
    }
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Relevance Conversation ID {} with Relevance Agent ID {}",
            self.relevance_conversation_id, self.relevance_agent_id
        )
    }
}
