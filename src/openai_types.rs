use serde::{Deserialize, Serialize};

/// Incoming OpenAI-style chat completion request.  `model` carries the relevance agent id.
#[derive(Deserialize, Debug)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<OpenAIMessage>,
    #[serde(default)]
    pub stream: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Deserialize, Debug)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessageContent {
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter(|p| p.kind == "text")
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<&str>>()
                .join(" "),
        }
    }
}

impl ChatCompletionRequest {
    /// Text of the most recent `user` message, if it has any.
    pub fn latest_user_content(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .and_then(|m| m.content.as_ref())
            .map(MessageContent::text)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct StreamChoice {
    pub index: u32,
    pub delta: StreamDelta,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct StreamDelta {
    pub content: String,
    pub role: &'static str,
}
