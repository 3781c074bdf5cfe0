use serde::Deserialize;

/// Envelope of a VAPI server message webhook.  Only the fields we act on are modelled; the raw
/// body is echoed back untouched.
#[derive(Deserialize, Debug)]
pub struct ServerMessageEnvelope {
    #[serde(default)]
    pub message: Option<ServerMessage>,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum ServerMessage {
    StatusUpdate {
        #[serde(default)]
        status: Option<CallStatus>,
        #[serde(rename = "endedReason", default)]
        ended_reason: Option<String>,
    },
    EndOfCallReport {
        #[serde(rename = "endedReason", default)]
        ended_reason: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    InProgress,
    Ended,
    #[serde(other)]
    Other,
}

impl ServerMessageEnvelope {
    /// Interpret a webhook body; anything we don't recognise reads as no message.
    pub fn from_value(value: &serde_json::Value) -> Option<ServerMessage> {
        serde_json::from_value::<Self>(value.clone())
            .ok()
            .and_then(|envelope| envelope.message)
    }
}
