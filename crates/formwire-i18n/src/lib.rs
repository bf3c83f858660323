//! Internationalization for formwire
//!
//! Messages live in nested JSON bundles, one per two-letter locale, and are
//! addressed by dotted keys. Dialog texts follow the shape
//! `<domain>.<langKey|default>.<verb>.<field>`; validation messages live
//! below `validation.`.
//!
//! ```
//! use formwire_i18n::{Translator, resolve_locale};
//!
//! let locale = resolve_locale("/de/posts/3", &["en", "de"]);
//! let translator = Translator::bundled().with_locale(&locale);
//!
//! let title = translator.lookup("confirm", Some("post"), "delete", "title", &[] as &[(&str, &str)]);
//! assert_eq!(title, "Löschen");
//! ```

pub mod bundled;
pub mod catalog;
pub mod locale;
pub mod translator;

pub use catalog::MessageCatalog;
pub use locale::resolve_locale;
pub use translator::Translator;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
	#[error("locale bundle `{locale}` is not valid JSON: {source}")]
	InvalidJson {
		locale: String,
		#[source]
		source: serde_json::Error,
	},
	#[error("locale bundle `{0}` must be a JSON object")]
	NotAnObject(String),
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}
