//! Locale bundles shipped with the crate

use crate::MessageCatalog;

pub const EN: &str = include_str!("../locales/en.json");
pub const DE: &str = include_str!("../locales/de.json");

/// `(locale, json)` pairs of every bundled locale.
pub const BUNDLES: [(&str, &str); 2] = [("en", EN), ("de", DE)];

/// The bundled catalogs. A bundle that fails to parse is logged and left
/// out.
pub fn catalogs() -> Vec<MessageCatalog> {
	BUNDLES
		.iter()
		.filter_map(|(locale, json)| match MessageCatalog::from_json(locale, json) {
			Ok(catalog) => Some(catalog),
			Err(err) => {
				tracing::warn!(locale, error = %err, "bundled locale failed to load");
				None
			}
		})
		.collect()
}
