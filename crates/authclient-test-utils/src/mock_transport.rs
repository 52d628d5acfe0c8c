// Scripted HTTP transport.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use authclient_core::{AuthClientError, Result};
use authclient_oauth2::{HttpRequest, HttpResponse, HttpTransport};

pub const JSON: &str = "application/json; charset=utf-8";
pub const FORM: &str = "application/x-www-form-urlencoded";
pub const HTML: &str = "text/html; charset=utf-8";

/// One queued reply: an HTTP response, or a network failure.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Reply(HttpResponse),
    Fail(String),
}

/// Answers each request with the next scripted response, in order.
///
/// An exhausted queue fails the request with `AuthClientError::Transport`.
#[derive(Debug, Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: u16, content_type: Option<&str>, body: impl Into<String>) -> &Self {
        self.enqueue(ScriptedResponse::Reply(HttpResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }))
    }

    /// Queue a 200 response with a JSON body.
    pub fn push_json(&self, body: serde_json::Value) -> &Self {
        self.push(200, Some(JSON), body.to_string())
    }

    /// Queue a 200 response with the given content type.
    pub fn push_text(&self, content_type: &str, body: impl Into<String>) -> &Self {
        self.push(200, Some(content_type), body)
    }

    pub fn push_status(&self, status: u16, body: impl Into<String>) -> &Self {
        self.push(status, Some(JSON), body)
    }

    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        self.enqueue(ScriptedResponse::Fail(message.into()))
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no request #{index} was sent"))
    }

    /// Scripted responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    fn enqueue(&self, response: ScriptedResponse) -> &Self {
        self.queue.lock().unwrap().push_back(response);
        self
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let description = format!("{} {}", request.method, request.url);
        self.requests.lock().unwrap().push(request);
        match self.queue.lock().unwrap().pop_front() {
            Some(ScriptedResponse::Reply(response)) => Ok(response),
            Some(ScriptedResponse::Fail(message)) => {
                Err(AuthClientError::Transport(format!("{description}: {message}")))
            }
            None => Err(AuthClientError::Transport(format!(
                "{description}: no scripted response left"
            ))),
        }
    }
}
