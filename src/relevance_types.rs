use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AgentMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug)]
pub struct TriggerPayload {
    pub message: AgentMessage,
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct TriggerResponse {
    pub conversation_id: String,
    #[serde(default)]
    pub job_info: JobInfo,
}

#[derive(Deserialize, Default, Debug)]
pub struct JobInfo {
    #[serde(default)]
    pub studio_id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Body of `GET /studios/{studio_id}/async_poll/{job_id}`.
#[derive(Deserialize, Debug)]
pub struct PollStatus {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub updates: Vec<PollUpdate>,
}

#[derive(Deserialize, Debug)]
pub struct PollUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub output: Option<ChainOutput>,
}

#[derive(Deserialize, Debug)]
pub struct ChainOutput {
    #[serde(default)]
    pub output: AgentOutput,
}

/// Output object of a successful agent chain; the reply text lives under `answer`.
#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct AgentOutput(pub Map<String, Value>);

impl AgentOutput {
    pub fn answer(&self) -> &str {
        self.0.get("answer").and_then(Value::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PollStatus {
    pub fn is_complete(&self) -> bool {
        self.kind == "complete"
    }

    /// Output of the first `chain-success` update, if the job produced one.
    pub fn chain_success(self) -> Option<AgentOutput> {
        self.updates
            .into_iter()
            .find(|u| u.kind == "chain-success")
            .and_then(|u| u.output)
            .map(|o| o.output)
    }
}
