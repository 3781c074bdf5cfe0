use crate::conversation_store::ConversationStore;
use crate::relevance::RelevanceClient;

pub struct AppState {
    pub store: ConversationStore,
    pub relevance: RelevanceClient,
}
