//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{FailureKind, TransportError};
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Replays queued outcomes in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: TransportResponse) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, kind: FailureKind) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(kind, format!("scripted {}", kind))));
        self
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new(FailureKind::Network, "script exhausted")))
    }
}

pub fn html(body: &str) -> TransportResponse {
    TransportResponse {
        status: 200,
        final_url: "https://duckduckgo.com/".to_string(),
        content_type: Some("text/html; charset=UTF-8".to_string()),
        body: body.to_string(),
    }
}

pub fn json(body: &str) -> TransportResponse {
    TransportResponse {
        status: 200,
        final_url: "https://duckduckgo.com/i.js".to_string(),
        content_type: Some("application/json; charset=UTF-8".to_string()),
        body: body.to_string(),
    }
}
