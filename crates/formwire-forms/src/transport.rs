//! Carrying submissions to the server
//!
//! [`Transport`] is the seam between the controllers and the network. The
//! `http` feature provides a reqwest-backed implementation; tests and
//! non-HTTP hosts bring their own.

use crate::error::{RequestError, TransportError};
use crate::payload::Payload;
use async_trait::async_trait;
use formwire_core::HttpMethod;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One outgoing submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
	pub method: HttpMethod,
	pub url: String,
	pub payload: Payload,
	/// Extra headers, the anti-forgery header among them.
	pub headers: Vec<(String, String)>,
}

impl SubmitRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(n, _)| n.eq_ignore_ascii_case(name))
			.map(|(_, v)| v.as_str())
	}
}

/// The server's answer: status code and JSON body (`Null` when the body
/// is not JSON).
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
	pub status: u16,
	pub body: Value,
}

impl Reply {
	pub fn new(status: u16, body: Value) -> Self {
		Self { status, body }
	}

	pub fn ok(body: Value) -> Self {
		Self::new(200, body)
	}

	/// 2xx statuses count as success.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
	/// Sends `request`. Failure statuses are `Ok` replies; `Err` means no
	/// reply was obtained.
	async fn send(&self, request: SubmitRequest) -> Result<Reply, TransportError>;
}

/// Submits a plain key/value map without a form controller.
///
/// Resolves with the JSON body on success and rejects with the JSON error
/// body otherwise.
#[derive(Debug, Clone)]
pub struct FormRequest {
	data: Payload,
	headers: Vec<(String, String)>,
	transport: Arc<dyn Transport>,
}

impl FormRequest {
	pub fn new(transport: Arc<dyn Transport>, data: Payload) -> Self {
		Self {
			data,
			headers: Vec::new(),
			transport,
		}
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}

	pub fn data(&self) -> &Payload {
		&self.data
	}

	pub async fn post(&self, url: &str) -> Result<Value, RequestError> {
		self.submit(HttpMethod::Post, url).await
	}

	pub async fn put(&self, url: &str) -> Result<Value, RequestError> {
		self.submit(HttpMethod::Put, url).await
	}

	pub async fn patch(&self, url: &str) -> Result<Value, RequestError> {
		self.submit(HttpMethod::Patch, url).await
	}

	pub async fn delete(&self, url: &str) -> Result<Value, RequestError> {
		self.submit(HttpMethod::Delete, url).await
	}

	pub async fn submit(&self, method: HttpMethod, url: &str) -> Result<Value, RequestError> {
		let request = SubmitRequest {
			method,
			url: url.to_string(),
			payload: self.data.clone(),
			headers: self.headers.clone(),
		};
		let reply = self.transport.send(request).await?;
		if reply.is_success() {
			Ok(reply.body)
		} else {
			Err(RequestError::Rejected {
				status: reply.status,
				body: reply.body,
			})
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use parking_lot::Mutex;
	use rstest::rstest;
	use serde_json::json;

	#[derive(Debug)]
	struct Canned {
		reply: Reply,
		seen: Mutex<Vec<SubmitRequest>>,
	}

	#[async_trait]
	impl Transport for Canned {
		async fn send(&self, request: SubmitRequest) -> Result<Reply, TransportError> {
			self.seen.lock().push(request);
			Ok(self.reply.clone())
		}
	}

	fn canned(status: u16, body: Value) -> Arc<Canned> {
		Arc::new(Canned {
			reply: Reply::new(status, body),
			seen: Mutex::new(Vec::new()),
		})
	}

	#[rstest]
	#[case(200, true)]
	#[case(204, true)]
	#[case(302, false)]
	#[case(422, false)]
	#[case(500, false)]
	fn test_reply_success(#[case] status: u16, #[case] expected: bool) {
		assert_eq!(Reply::new(status, Value::Null).is_success(), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_form_request_resolves_with_body() {
		// Arrange
		let transport = canned(200, json!({"id": 3}));
		let data: Payload = [("name", "Widget")].into_iter().collect();
		let request = FormRequest::new(transport.clone(), data).with_header("X-CSRF-TOKEN", "t");

		// Act
		let body = request.patch("/items/3").await.unwrap();

		// Assert
		assert_eq!(body, json!({"id": 3}));
		let seen = transport.seen.lock();
		assert_eq!(seen[0].method, HttpMethod::Patch);
		assert_eq!(seen[0].url, "/items/3");
		assert_eq!(seen[0].header("x-csrf-token"), Some("t"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_form_request_rejects_with_error_body() {
		let transport = canned(422, json!({"errors": {"name": ["Required"]}}));
		let request = FormRequest::new(transport, Payload::new());

		let err = request.post("/items").await.unwrap_err();

		assert!(matches!(err, RequestError::Rejected { status: 422, .. }));
		assert_eq!(err.body(), Some(&json!({"errors": {"name": ["Required"]}})));
	}
}
