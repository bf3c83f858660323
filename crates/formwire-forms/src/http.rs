//! reqwest transport
//!
//! Bodies are URL-encoded with list values repeated as `name[]`. GET
//! submissions carry the payload in the query string instead.

use crate::error::TransportError;
use crate::transport::{Reply, SubmitRequest, Transport};
use async_trait::async_trait;
use formwire_core::HttpMethod;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};

/// Sends submissions with a [`reqwest::Client`].
///
/// Relative action URLs are resolved against the base URL.
///
/// ```no_run
/// # #[cfg(feature = "http")]
/// # fn main() -> Result<(), formwire_forms::TransportError> {
/// use formwire_forms::http::ReqwestTransport;
///
/// let transport = ReqwestTransport::new("https://shop.test/")?;
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "http"))]
/// # fn main() {}
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: Client,
	base: Url,
}

impl ReqwestTransport {
	pub fn new(base: &str) -> Result<Self, TransportError> {
		Self::with_client(Client::new(), base)
	}

	pub fn with_client(client: Client, base: &str) -> Result<Self, TransportError> {
		let base = Url::parse(base).map_err(|e| TransportError::InvalidUrl {
			url: base.to_string(),
			message: e.to_string(),
		})?;
		Ok(Self { client, base })
	}

	fn resolve(&self, url: &str) -> Result<Url, TransportError> {
		self.base.join(url).map_err(|e| TransportError::InvalidUrl {
			url: url.to_string(),
			message: e.to_string(),
		})
	}

	/// Builds the request without sending it.
	pub fn build_request(&self, request: &SubmitRequest) -> Result<reqwest::Request, TransportError> {
		let mut url = self.resolve(&request.url)?;
		let pairs = request.payload.to_pairs();

		let mut builder = if request.method == HttpMethod::Get {
			if !pairs.is_empty() {
				url.query_pairs_mut().extend_pairs(&pairs);
			}
			self.client.get(url)
		} else {
			let body = serde_urlencoded::to_string(&pairs)?;
			self.client
				.request(method(request.method), url)
				.header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=UTF-8")
				.body(body)
		};

		builder = builder
			.header(ACCEPT, "application/json")
			.header("X-Requested-With", "XMLHttpRequest");
		for (name, value) in &request.headers {
			let name = HeaderName::from_bytes(name.as_bytes())
				.map_err(|e| TransportError::Encode(format!("header `{name}`: {e}")))?;
			let value = HeaderValue::from_str(value)
				.map_err(|e| TransportError::Encode(format!("header `{name}`: {e}")))?;
			builder = builder.header(name, value);
		}

		Ok(builder.build()?)
	}
}

fn method(method: HttpMethod) -> Method {
	match method {
		HttpMethod::Get => Method::GET,
		HttpMethod::Post => Method::POST,
		HttpMethod::Put => Method::PUT,
		HttpMethod::Patch => Method::PATCH,
		HttpMethod::Delete => Method::DELETE,
	}
}

#[async_trait]
impl Transport for ReqwestTransport {
	async fn send(&self, request: SubmitRequest) -> Result<Reply, TransportError> {
		let built = self.build_request(&request)?;
		tracing::debug!(method = %request.method, url = %built.url(), "sending submission");

		let response = self.client.execute(built).await?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await?;
		let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
			tracing::debug!(status, len = bytes.len(), "response body is not JSON");
			serde_json::Value::Null
		});
		Ok(Reply::new(status, body))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::payload::Payload;
	use rstest::{fixture, rstest};

	#[fixture]
	fn transport() -> ReqwestTransport {
		ReqwestTransport::new("https://shop.test/app/").unwrap()
	}

	fn request(method: HttpMethod, url: &str) -> SubmitRequest {
		let mut payload = Payload::new();
		payload.push("name", "Blue Widget");
		payload.push("tags", "a");
		payload.push("tags", "b");
		SubmitRequest {
			method,
			url: url.to_string(),
			payload,
			headers: vec![("X-CSRF-TOKEN".to_string(), "tok".to_string())],
		}
	}

	#[rstest]
	fn test_post_body_is_urlencoded(transport: ReqwestTransport) {
		let built = transport.build_request(&request(HttpMethod::Post, "items")).unwrap();

		let body = built.body().and_then(|b| b.as_bytes()).unwrap();
		assert_eq!(*built.method(), Method::POST);
		assert_eq!(built.url().as_str(), "https://shop.test/app/items");
		assert_eq!(
			std::str::from_utf8(body).unwrap(),
			"name=Blue+Widget&tags%5B%5D=a&tags%5B%5D=b"
		);
		assert_eq!(built.headers()["x-csrf-token"], "tok");
	}

	#[rstest]
	fn test_get_moves_payload_to_query(transport: ReqwestTransport) {
		let built = transport.build_request(&request(HttpMethod::Get, "/search")).unwrap();

		assert!(built.body().is_none());
		assert_eq!(
			built.url().as_str(),
			"https://shop.test/search?name=Blue+Widget&tags%5B%5D=a&tags%5B%5D=b"
		);
	}

	#[rstest]
	fn test_invalid_header_is_encode_error(transport: ReqwestTransport) {
		let mut req = request(HttpMethod::Delete, "items/1");
		req.headers.push(("Bad Header".to_string(), "x".to_string()));

		assert!(matches!(
			transport.build_request(&req),
			Err(TransportError::Encode(_))
		));
	}

	#[rstest]
	fn test_invalid_base() {
		assert!(matches!(
			ReqwestTransport::new("not a url"),
			Err(TransportError::InvalidUrl { .. })
		));
	}
}
