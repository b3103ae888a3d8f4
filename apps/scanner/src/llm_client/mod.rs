/// LLM Client: the single point of entry for all generative-AI calls in the scanner.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: gemini-2.0-flash at temperature 0.2 (hardcoded, not configurable)
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// The model used for all LLM calls in the scanner.
pub const MODEL: &str = "gemini-2.0-flash";
const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 2048;
/// One retry on transient failure, no backoff schedule.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Timeouts, connection failures, 429 and 5xx are worth one more attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Parse(_) | LlmError::EmptyContent => false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl LlmResponse {
    /// Extracts the text of the first candidate's first text part.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single LLM client used by the enrichment adapter.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_base: Option<String>, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            api_base: api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, MODEL)
    }

    /// Makes a raw call to the model, returning the full response object.
    /// A transient failure is retried once after a short fixed pause.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: "application/json",
            },
        };

        let mut attempt = 1;
        loop {
            match self.send(&request_body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        "LLM call attempt {}/{} failed ({}), retrying after {}ms...",
                        attempt,
                        MAX_ATTEMPTS,
                        e,
                        RETRY_DELAY.as_millis()
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, request_body: &GenerateRequest<'_>) -> Result<LlmResponse, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;
        if let Some(usage) = &llm_response.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        Ok(llm_response)
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        parse_json_lenient(text)
    }
}

/// Parses model output as JSON, tolerating code fences and prose around a single object.
pub fn parse_json_lenient<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(first_err) => match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str(&text[start..=end]).map_err(LlmError::Parse)
            }
            _ => Err(LlmError::Parse(first_err)),
        },
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Reads one HTTP request: headers plus a `content-length` body.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return;
                }
            }
        }
    }

    /// Local server answering every request with `status` and `body`, or never
    /// answering when `status` is `None`. Returns its base URL.
    async fn stub_server(status: Option<u16>, body: &'static str, hits: Arc<AtomicUsize>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let hits = hits.clone();
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    hits.fetch_add(1, Ordering::SeqCst);
                    let Some(status) = status else {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        return;
                    };
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    fn client(base: String, timeout: Duration) -> LlmClient {
        LlmClient::new("test-key".to_string(), Some(base), timeout).unwrap()
    }

    const API_ERROR: &str = r#"{"error": {"message": "stub failure"}}"#;

    #[tokio::test]
    async fn test_server_error_is_retried_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = stub_server(Some(500), API_ERROR, hits.clone()).await;

        let err = client(base, Duration::from_secs(5)).call("hi", "sys").await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 500, ref message } if message == "stub failure"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = stub_server(Some(429), API_ERROR, hits.clone()).await;

        let err = client(base, Duration::from_secs(5)).call("hi", "sys").await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 429, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_bad_request_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = stub_server(Some(400), API_ERROR, hits.clone()).await;

        let err = client(base, Duration::from_secs(5)).call("hi", "sys").await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 400, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = stub_server(None, "", hits.clone()).await;

        let err = client(base, Duration::from_millis(200)).call("hi", "sys").await.unwrap_err();

        assert!(matches!(err, LlmError::Http(ref e) if e.is_timeout()));
        assert!(err.is_transient());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_call_json_reads_candidate_text() {
        let hits = Arc::new(AtomicUsize::new(0));
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "```json\n{\"name\": \"Jane\"}\n```"}]}}]}"#;
        let base = stub_server(Some(200), body, hits.clone()).await;

        let value: Value = client(base, Duration::from_secs(5))
            .call_json("hi", "sys")
            .await
            .unwrap();

        assert_eq!(value["name"], "Jane");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_lenient_extracts_embedded_object() {
        let value: Value =
            parse_json_lenient("Sure! Here is the data: {\"name\": \"Jane\"} Hope it helps.").unwrap();
        assert_eq!(value["name"], "Jane");
    }

    #[test]
    fn test_parse_json_lenient_rejects_garbage() {
        let result: Result<Value, _> = parse_json_lenient("no json here");
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_response_text_reads_first_part() {
        let body = r#"{
            "candidates": [{"content": {"parts": [{"text": "{\"skills\": []}"}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        }"#;
        let response: LlmResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("{\"skills\": []}"));
        assert_eq!(response.usage_metadata.unwrap().prompt_token_count, 12);
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let response: LlmResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_transient_classification() {
        let rate_limited = LlmError::Api {
            status: 429,
            message: "slow down".to_string(),
        };
        let bad_request = LlmError::Api {
            status: 400,
            message: "bad".to_string(),
        };
        assert!(rate_limited.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!LlmError::EmptyContent.is_transient());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sys" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: "application/json",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = LlmClient::new(
            "key".to_string(),
            Some("http://localhost:9999/".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
