//! Locale selection from the request path

/// Picks the locale named by the first path segment when it is supported,
/// otherwise the first supported locale.
///
/// `supported` must not be empty; an empty list yields `"en"`.
///
/// # Examples
///
/// ```
/// use formwire_i18n::resolve_locale;
///
/// let supported = ["en", "de"];
/// assert_eq!(resolve_locale("/de/users/5/edit", &supported), "de");
/// assert_eq!(resolve_locale("/fr/users", &supported), "en");
/// assert_eq!(resolve_locale("/", &supported), "en");
/// ```
pub fn resolve_locale<S: AsRef<str>>(path: &str, supported: &[S]) -> String {
	let Some(fallback) = supported.first() else {
		tracing::warn!("no supported locales configured, using \"en\"");
		return "en".to_string();
	};

	let segment = path
		.split(['?', '#'])
		.next()
		.unwrap_or_default()
		.split('/')
		.find(|s| !s.is_empty());

	match segment {
		Some(seg) if supported.iter().any(|s| s.as_ref() == seg) => seg.to_string(),
		_ => fallback.as_ref().to_string(),
	}
}
