//! Anti-forgery token handling
//!
//! The token is read from a page meta tag (`csrf-token` by default). Ajax
//! submissions carry it in a request header, native submissions in a hidden
//! field prepended to the payload.

use crate::page::PageHost;
use formwire_conf::CsrfSettings;
use regex::Regex;
use std::sync::LazyLock;

static META_TAG: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?is)<meta\s[^>]*>"#).expect("Invalid meta tag regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?i)([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid attribute regex")
});

/// The token published by the page, if any. Empty content counts as none.
pub fn page_token(page: &dyn PageHost, settings: &CsrfSettings) -> Option<String> {
	page.meta_content(&settings.meta_name)
		.map(|t| t.trim().to_string())
		.filter(|t| !t.is_empty())
}

/// The `(header, token)` pair for an ajax request.
pub fn header(page: &dyn PageHost, settings: &CsrfSettings) -> Option<(String, String)> {
	match page_token(page, settings) {
		Some(token) => Some((settings.header_name.clone(), token)),
		None => {
			tracing::debug!(meta = %settings.meta_name, "no anti-forgery token on page, header omitted");
			None
		}
	}
}

/// The `(field, token)` pair for a native submission. A page without a
/// token is a configuration error and is logged.
pub fn hidden_field(page: &dyn PageHost, settings: &CsrfSettings) -> Option<(String, String)> {
	match page_token(page, settings) {
		Some(token) => Some((settings.field_name.clone(), token)),
		None => {
			tracing::warn!(
				meta = %settings.meta_name,
				"anti-forgery token not found, native submission will not carry it"
			);
			None
		}
	}
}

/// Extracts `content` of the first `<meta name="{name}">` in `html`.
///
/// For page hosts that only have the rendered markup at hand.
///
/// ```
/// use formwire_forms::csrf::meta_content_from_html;
///
/// let html = r#"<head><meta name="csrf-token" content="abc123"></head>"#;
/// assert_eq!(meta_content_from_html(html, "csrf-token").as_deref(), Some("abc123"));
/// assert_eq!(meta_content_from_html(html, "other"), None);
/// ```
pub fn meta_content_from_html(html: &str, name: &str) -> Option<String> {
	META_TAG.find_iter(html).find_map(|tag| {
		let mut tag_name = None;
		let mut content = None;
		for cap in ATTRIBUTE.captures_iter(tag.as_str()) {
			let value = cap.get(2).or_else(|| cap.get(3)).map(|m| m.as_str());
			match cap[1].to_ascii_lowercase().as_str() {
				"name" => tag_name = value,
				"content" => content = value,
				_ => {}
			}
		}
		(tag_name == Some(name)).then(|| content.unwrap_or_default().to_string())
	})
}
