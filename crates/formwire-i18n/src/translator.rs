//! Localized lookups against a set of catalogs

use crate::{CatalogError, MessageCatalog, bundled};
use formwire_core::text::{humanize, interpolate, title_case};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Resolves message keys for the active locale.
///
/// Lookups try the active locale first and then the fallback locale. A key
/// that neither knows is returned verbatim and logged.
#[derive(Debug, Clone)]
pub struct Translator {
	catalogs: HashMap<String, MessageCatalog>,
	locale: String,
	fallback: String,
}

impl Default for Translator {
	fn default() -> Self {
		Self::bundled()
	}
}

impl Translator {
	/// An empty translator. Add catalogs with [`Translator::add_catalog`].
	pub fn new(locale: impl Into<String>, fallback: impl Into<String>) -> Self {
		Self {
			catalogs: HashMap::new(),
			locale: locale.into(),
			fallback: fallback.into(),
		}
	}

	/// A translator over the bundled `en` and `de` catalogs, set to `en`.
	pub fn bundled() -> Self {
		let mut translator = Self::new("en", "en");
		for catalog in bundled::catalogs() {
			translator.add_catalog(catalog);
		}
		translator
	}

	/// Adds a catalog, merging it over an existing one for the same locale.
	pub fn add_catalog(&mut self, catalog: MessageCatalog) {
		match self.catalogs.get_mut(catalog.locale()) {
			Some(existing) => existing.merge(catalog),
			None => {
				self.catalogs.insert(catalog.locale().to_string(), catalog);
			}
		}
	}

	pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
		self.add_catalog(catalog);
		self
	}

	/// Loads `<locale>.json` from `dir` for each locale, merging over what
	/// is already known. Missing files are skipped.
	pub fn load_dir<S: AsRef<str>>(&mut self, dir: &Path, locales: &[S]) -> Result<usize, CatalogError> {
		let mut loaded = 0;
		for locale in locales {
			let locale = locale.as_ref();
			let path = dir.join(format!("{locale}.json"));
			if !path.is_file() {
				tracing::debug!(path = %path.display(), "no locale file, skipped");
				continue;
			}
			let json = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
				path: path.clone(),
				source,
			})?;
			self.add_catalog(MessageCatalog::from_json(locale, &json)?);
			loaded += 1;
		}
		Ok(loaded)
	}

	pub fn locale(&self) -> &str {
		&self.locale
	}

	pub fn fallback(&self) -> &str {
		&self.fallback
	}

	/// Switches the active locale. Unknown locales are logged and ignored.
	pub fn set_locale(&mut self, locale: &str) -> bool {
		if !self.catalogs.contains_key(locale) {
			tracing::warn!(locale, "unsupported locale, keeping {}", self.locale);
			return false;
		}
		self.locale = locale.to_string();
		true
	}

	pub fn with_locale(mut self, locale: &str) -> Self {
		self.set_locale(locale);
		self
	}

	/// The raw message for `key`, if any catalog has it.
	pub fn get(&self, key: &str) -> Option<&str> {
		[&self.locale, &self.fallback]
			.into_iter()
			.filter_map(|l| self.catalogs.get(l.as_str()))
			.find_map(|c| c.get(key))
	}

	pub fn has(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// The interpolated message for `key`, or `None` if it is unknown.
	pub fn try_translate<K, V>(&self, key: &str, params: &[(K, V)]) -> Option<String>
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		self.get(key).map(|m| interpolate(m, params))
	}

	/// The interpolated message for `key`. Unknown keys come back verbatim.
	pub fn translate<K, V>(&self, key: &str, params: &[(K, V)]) -> String
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		self.try_translate(key, params).unwrap_or_else(|| {
			tracing::warn!(key, locale = %self.locale, "missing translation");
			key.to_string()
		})
	}

	/// Looks up `<domain>.<lang_key>.<verb>.<field>`, falling back to
	/// `<domain>.default.<verb>.<field>`.
	pub fn try_lookup<K, V>(
		&self,
		domain: &str,
		lang_key: Option<&str>,
		verb: &str,
		field: &str,
		params: &[(K, V)],
	) -> Option<String>
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let specific = lang_key
			.filter(|k| !k.is_empty())
			.and_then(|k| self.try_translate(&format!("{domain}.{k}.{verb}.{field}"), params));
		specific.or_else(|| self.try_translate(&format!("{domain}.default.{verb}.{field}"), params))
	}

	/// Like [`Translator::try_lookup`], returning the default key verbatim
	/// when nothing matches.
	///
	/// # Examples
	///
	/// ```
	/// use formwire_i18n::Translator;
	///
	/// let t = Translator::bundled();
	/// let content = t.lookup("confirm", Some("user"), "delete", "content", &[("name", "Bob")]);
	/// assert_eq!(content, "Do you really want to delete Bob ?");
	/// ```
	pub fn lookup<K, V>(
		&self,
		domain: &str,
		lang_key: Option<&str>,
		verb: &str,
		field: &str,
		params: &[(K, V)],
	) -> String
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		self.try_lookup(domain, lang_key, verb, field, params)
			.unwrap_or_else(|| {
				let key = format!("{domain}.default.{verb}.{field}");
				tracing::warn!(key = %key, locale = %self.locale, "missing translation");
				key
			})
	}

	/// A field label: `input.<lang_key>.<name>` or the title-cased name,
	/// with ` *` appended for required fields.
	pub fn field_label(&self, lang_key: Option<&str>, name: &str, required: bool) -> String {
		let label = lang_key
			.and_then(|k| self.get(&format!("input.{k}.{name}")))
			.map(str::to_string)
			.unwrap_or_else(|| title_case(&humanize(name)));
		if required { format!("{label} *") } else { label }
	}

	/// A localized validation message.
	///
	/// Tries `validation.<lang_key>.<key>` and then `validation.<key>`.
	/// `{attribute}` becomes `validation.attributes.<attribute_field>` when
	/// that exists. Returns `None` when no template is known.
	pub fn validation_message(
		&self,
		lang_key: Option<&str>,
		key: &str,
		attribute_field: &str,
		params: &[(String, String)],
	) -> Option<String> {
		let template = lang_key
			.and_then(|k| self.get(&format!("validation.{k}.{key}")))
			.or_else(|| self.get(&format!("validation.{key}")))?;

		let attribute = self.get(&format!("validation.attributes.{attribute_field}"));
		let params: Vec<(&str, &str)> = params
			.iter()
			.map(|(k, v)| match (k.as_str(), attribute) {
				("attribute", Some(a)) => (k.as_str(), a),
				_ => (k.as_str(), v.as_str()),
			})
			.collect();
		Some(interpolate(template, &params))
	}
}
