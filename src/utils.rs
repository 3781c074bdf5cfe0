use crate::openai_types::{ChatCompletionChunk, StreamChoice, StreamDelta};

use time::OffsetDateTime;
use uuid::Uuid;

pub const SSE_DONE: &str = "[DONE]";

/// Split a finished agent answer into one OpenAI-style streaming chunk per word.  Every chunk
/// shares the same id and creation time, the way a real token stream would.
pub fn answer_to_chunks(answer: &str, model: &str) -> Vec<ChatCompletionChunk> {
    let id = format!("chatcmpl-{}", Uuid::new_v4().simple());
    let created = OffsetDateTime::now_utc().unix_timestamp();
    answer
        .split_whitespace()
        .map(|word| ChatCompletionChunk {
            id: id.clone(),
            object: "chat.completion.chunk",
            created,
            model: model.to_string(),
            choices: vec![StreamChoice {
                index: 0,
                delta: StreamDelta {
                    content: format!("{word} "),
                    role: "assistant",
                },
            }],
        })
        .collect()
}

/// Event-stream frames for an answer: `data: {chunk}\n\n` per word, then `data: [DONE]\n\n`.
pub fn answer_to_sse_frames(answer: &str, model: &str) -> Result<Vec<String>, serde_json::Error> {
    let mut frames = answer_to_chunks(answer, model)
        .iter()
        .map(|chunk| serde_json::to_string(chunk).map(|json| sse_frame(&json)))
        .collect::<Result<Vec<String>, _>>()?;
    frames.push(sse_frame(SSE_DONE));
    Ok(frames)
}

fn sse_frame(data: &str) -> String {
    format!("data: {data}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_chunk_per_word_with_trailing_space() {
        let chunks = answer_to_chunks("  Hello   there,\nfriend ", "agent-1");
        let words: Vec<&str> = chunks
            .iter()
            .map(|c| c.choices[0].delta.content.as_str())
            .collect();
        assert_eq!(words, vec!["Hello ", "there, ", "friend "]);
        assert!(chunks.iter().all(|c| c.id == chunks[0].id));
        assert!(chunks.iter().all(|c| c.model == "agent-1"));
        assert_eq!(chunks[0].choices[0].delta.role, "assistant");
    }

    #[test]
    fn chunk_serializes_like_openai_delta() {
        let chunk = answer_to_chunks("Hi", "agent-1").remove(0);
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["object"], "chat.completion.chunk");
        assert_eq!(
            value["choices"],
            serde_json::json!([{ "index": 0, "delta": { "content": "Hi ", "role": "assistant" } }])
        );
    }

    #[test]
    fn frames_use_spaced_data_prefix() {
        let frames = answer_to_sse_frames("Hi you", "agent-1").unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[0].starts_with("data: {\"id\":\"chatcmpl-"));
        assert!(frames[0].ends_with("\"content\":\"Hi \",\"role\":\"assistant\"}}]}\n\n"));
        assert!(frames[1].starts_with("data: {"));
        assert_eq!(frames[2], "data: [DONE]\n\n");
    }

    #[test]
    fn empty_answer_only_signals_done() {
        assert!(answer_to_chunks("", "agent-1").is_empty());
        assert_eq!(
            answer_to_sse_frames(" \n ", "agent-1").unwrap(),
            vec!["data: [DONE]\n\n"]
        );
    }
}
