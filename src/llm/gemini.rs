//! Google Gemini provider over the `generativelanguage` REST API.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::LLMError;
use super::provider::GenerativeModel;
use super::types::{Chunk, ChunkStream, GenerateRequest, Role};
use crate::sse_parser::SseEventStream;

/// Gemini provider.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    #[must_use]
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn post(&self, url: &str, request: &GenerateRequest) -> Result<reqwest::Response, LLMError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&to_request(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::Api {
                status,
                message: error_message(&body),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerativeModel for GeminiProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<String, LLMError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let response = self.post(&url, &request).await?;
        let body: Response = response.json().await?;

        let text = body
            .into_chunks()
            .into_iter()
            .filter_map(|chunk| match chunk {
                Chunk::Text(text) => Some(text),
                Chunk::Reasoning(_) => None,
            })
            .collect::<String>();

        if text.is_empty() {
            return Err(LLMError::InvalidResponse(
                "response contained no text".to_string(),
            ));
        }
        Ok(text)
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<ChunkStream, LLMError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, request.model
        );
        let response = self.post(&url, &request).await?;
        let events = SseEventStream::new(response.bytes_stream());

        Ok(Box::pin(GeminiStreamAdapter::new(events)))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<RequestGenerationConfig>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestGenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
    include_thoughts: bool,
}

#[derive(Deserialize, Default)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

impl Response {
    /// Text parts of the first candidate, tagged by kind.
    fn into_chunks(self) -> Vec<Chunk> {
        self.candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| {
                let text = part.text.filter(|t| !t.is_empty())?;
                Some(if part.thought {
                    Chunk::Reasoning(text)
                } else {
                    Chunk::Text(text)
                })
            })
            .collect()
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn to_request(request: &GenerateRequest) -> Request {
    let contents = request
        .contents
        .iter()
        .map(|turn| Content {
            role: Some(
                match turn.role {
                    Role::User => "user",
                    Role::Model => "model",
                }
                .to_string(),
            ),
            parts: vec![Part {
                text: Some(turn.text.clone()),
                thought: false,
            }],
        })
        .collect();

    let system_instruction = request.config.system_instruction.as_ref().map(|text| Content {
        role: None,
        parts: vec![Part {
            text: Some(text.clone()),
            thought: false,
        }],
    });

    let generation_config = request.config.reasoning.map(|reasoning| RequestGenerationConfig {
        thinking_config: ThinkingConfig {
            thinking_budget: reasoning.budget,
            include_thoughts: true,
        },
    });

    Request {
        contents,
        system_instruction,
        generation_config,
    }
}

/// Pull the human-readable message out of a Gemini error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Decode one streamed SSE payload into chunks.
fn decode_event(data: &str) -> Result<Vec<Chunk>, LLMError> {
    let response: Response = serde_json::from_str(data)
        .map_err(|e| LLMError::InvalidResponse(format!("malformed stream event: {e}")))?;

    if let Some(error) = response.error {
        return Err(LLMError::Api {
            status: error.code,
            message: error.message,
        });
    }
    Ok(response.into_chunks())
}

// ============================================================================
// Streaming
// ============================================================================

/// Adapter that converts Gemini SSE events into tagged chunks.
struct GeminiStreamAdapter<S> {
    inner: SseEventStream<S>,
    queued: VecDeque<Chunk>,
    done: bool,
}

impl<S> GeminiStreamAdapter<S> {
    fn new(inner: SseEventStream<S>) -> Self {
        Self {
            inner,
            queued: VecDeque::new(),
            done: false,
        }
    }
}

impl<S> Stream for GeminiStreamAdapter<S>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
{
    type Item = Result<Chunk, LLMError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(chunk) = self.queued.pop_front() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if self.done {
                return Poll::Ready(None);
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if event.data.trim().is_empty() {
                        continue;
                    }
                    match decode_event(&event.data) {
                        Ok(chunks) => self.queued.extend(chunks),
                        Err(e) => {
                            self.done = true;
                            return Poll::Ready(Some(Err(e)));
                        }
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(LLMError::Request(e))));
                }
                Poll::Ready(None) => {
                    self.done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{GenerationConfig, ReasoningConfig, Turn};
    use serde_json::json;

    #[test]
    fn request_carries_turns_instruction_and_budget() {
        let request = GenerateRequest::new(
            "gemini-2.5-flash",
            vec![Turn::user("hi"), Turn::model("hello"), Turn::user("help")],
            GenerationConfig {
                system_instruction: Some("be careful".to_string()),
                reasoning: Some(ReasoningConfig { budget: 24576 }),
            },
        );

        let body = serde_json::to_value(to_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hi"}]},
                    {"role": "model", "parts": [{"text": "hello"}]},
                    {"role": "user", "parts": [{"text": "help"}]},
                ],
                "systemInstruction": {"parts": [{"text": "be careful"}]},
                "generationConfig": {
                    "thinkingConfig": {"thinkingBudget": 24576, "includeThoughts": true}
                }
            })
        );
    }

    #[test]
    fn request_omits_absent_config() {
        let request = GenerateRequest::single("gemini-1.5-flash", "prompt", None);
        let body = serde_json::to_value(to_request(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn decode_event_tags_thought_parts() {
        let data = r#"{"candidates":[{"content":{"role":"model","parts":[
            {"text":"Considering symptoms","thought":true},
            {"text":"Please call emergency services."}
        ]}}]}"#;

        assert_eq!(decode_event(data).unwrap(), vec![
            Chunk::Reasoning("Considering symptoms".to_string()),
            Chunk::Text("Please call emergency services.".to_string()),
        ]);
    }

    #[test]
    fn decode_event_skips_empty_parts_and_candidates() {
        assert!(decode_event(r#"{"candidates":[]}"#).unwrap().is_empty());
        assert!(
            decode_event(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#)
                .unwrap()
                .is_empty()
        );
        assert!(decode_event(r#"{"candidates":[{"finishReason":"STOP"}]}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn decode_event_surfaces_inline_errors() {
        let err = decode_event(r#"{"error":{"code":503,"message":"overloaded"}}"#).unwrap_err();
        assert!(matches!(err, LLMError::Api { status: 503, ref message } if message == "overloaded"));
    }

    #[test]
    fn decode_event_rejects_malformed_json() {
        assert!(matches!(
            decode_event("{not json"),
            Err(LLMError::InvalidResponse(_))
        ));
    }

    #[test]
    fn error_message_prefers_structured_body() {
        assert_eq!(
            error_message(r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#),
            "API key not valid"
        );
        assert_eq!(error_message("gateway down"), "gateway down");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = GeminiProvider::new(
            Client::new(),
            "key".to_string(),
            "http://localhost:9/v1beta/".to_string(),
        );
        assert_eq!(provider.base_url, "http://localhost:9/v1beta");
    }
}
