//! Mock implementations for testing
//!
//! Provides a scripted transport so the session and service layers can be
//! exercised without a live Wialon account.

use crate::client::WialonTransport;
use crate::error::{Result, WialonError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded remote call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub svc: String,
    pub params: Value,
    pub sid: Option<String>,
}

/// Scripted transport: responses are played back per service name in FIFO
/// order, and every call is recorded for assertions.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<Vec<(String, VecDeque<Value>)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Create an empty mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for one service name (builder style)
    pub fn with_response(self, svc: &str, response: Value) -> Self {
        self.push_response(svc, response);
        self
    }

    /// Queue a response for one service name
    pub fn push_response(&self, svc: &str, response: Value) {
        let mut responses = self.responses.lock().unwrap();
        if let Some((_, queue)) = responses.iter_mut().find(|(name, _)| name == svc) {
            queue.push_back(response);
        } else {
            responses.push((svc.to_string(), VecDeque::from([response])));
        }
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made to one service name
    pub fn calls_to(&self, svc: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.svc == svc)
            .collect()
    }
}

#[async_trait]
impl WialonTransport for MockTransport {
    async fn execute(&self, svc: &str, params: &Value, sid: Option<&str>) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            svc: svc.to_string(),
            params: params.clone(),
            sid: sid.map(str::to_string),
        });

        let mut responses = self.responses.lock().unwrap();
        responses
            .iter_mut()
            .find(|(name, _)| name == svc)
            .and_then(|(_, queue)| queue.pop_front())
            .ok_or_else(|| WialonError::transport(format!("no scripted response for {svc}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn responses_play_back_in_fifo_order_per_service() {
        let transport = MockTransport::new()
            .with_response("svc/a", json!(1))
            .with_response("svc/a", json!(2));

        tokio_test::block_on(async {
            let first = transport.execute("svc/a", &json!({}), None).await.unwrap();
            let second = transport.execute("svc/a", &json!({}), None).await.unwrap();
            assert_eq!((first, second), (json!(1), json!(2)));

            // an exhausted queue reads as a wire failure
            assert!(transport.execute("svc/a", &json!({}), None).await.is_err());
        });

        assert_eq!(transport.calls_to("svc/a").len(), 3);
    }
}
