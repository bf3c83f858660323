//! The settings consumed by forms, fields and dialogs

use crate::SettingsError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Texts of the fallback error notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDefault {
	pub title: String,
	pub message: String,
	pub accept: String,
}

impl Default for ErrorDefault {
	fn default() -> Self {
		Self {
			title: "Sorry!".to_string(),
			message: "An unknown error occurred! Please try again later.".to_string(),
			accept: "Ok!".to_string(),
		}
	}
}

/// Where the anti-forgery token comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfSettings {
	/// Name of the page meta tag holding the token.
	pub meta_name: String,
	/// Request header carrying the token on ajax submissions.
	pub header_name: String,
	/// Hidden field carrying the token on native submissions.
	pub field_name: String,
}

impl Default for CsrfSettings {
	fn default() -> Self {
		Self {
			meta_name: "csrf-token".to_string(),
			header_name: "X-CSRF-TOKEN".to_string(),
			field_name: "_token".to_string(),
		}
	}
}

/// Global form settings.
///
/// # Examples
///
/// ```
/// use formwire_conf::FormsSettings;
/// use std::time::Duration;
///
/// let settings = FormsSettings::default();
/// assert_eq!(settings.validation_delay(), Duration::from_millis(100));
/// assert_eq!(settings.fallback_locale(), "en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsSettings {
	pub validation_delay_ms: u64,
	pub alert_duration_ms: u64,
	pub event_name: String,
	pub loading_content: String,
	pub alert_error: bool,
	/// The first entry is the fallback locale.
	pub supported_locales: Vec<String>,
	pub error_default: ErrorDefault,
	pub csrf: CsrfSettings,
}

impl Default for FormsSettings {
	fn default() -> Self {
		Self {
			validation_delay_ms: 100,
			alert_duration_ms: 3000,
			event_name: "ajaxForm".to_string(),
			loading_content: r#"<i class="fa fa-fw fa-circle-o-notch fa-spin"></i>"#.to_string(),
			alert_error: true,
			supported_locales: vec!["en".to_string(), "de".to_string()],
			error_default: ErrorDefault::default(),
			csrf: CsrfSettings::default(),
		}
	}
}

impl FormsSettings {
	pub fn validation_delay(&self) -> Duration {
		Duration::from_millis(self.validation_delay_ms)
	}

	pub fn alert_duration(&self) -> Duration {
		Duration::from_millis(self.alert_duration_ms)
	}

	/// The first supported locale.
	pub fn fallback_locale(&self) -> &str {
		self.supported_locales
			.first()
			.map(String::as_str)
			.unwrap_or("en")
	}

	/// Checks constraints serde cannot express.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.event_name.trim().is_empty() {
			return Err(SettingsError::invalid("event_name", "must not be empty"));
		}
		if self.supported_locales.is_empty() {
			return Err(SettingsError::invalid(
				"supported_locales",
				"at least one locale is required",
			));
		}
		if let Some(bad) = self
			.supported_locales
			.iter()
			.find(|l| l.len() != 2 || !l.chars().all(|c| c.is_ascii_lowercase()))
		{
			return Err(SettingsError::invalid(
				"supported_locales",
				format!("`{bad}` is not a two-letter lower-case language code"),
			));
		}
		let header = &self.csrf.header_name;
		if header.is_empty()
			|| !header
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
		{
			return Err(SettingsError::invalid(
				"csrf.header_name",
				format!("`{header}` is not a valid header name"),
			));
		}
		Ok(())
	}

	/// The settings as a TOML document.
	pub fn to_toml(&self) -> Result<String, SettingsError> {
		toml::to_string_pretty(self).map_err(|e| SettingsError::Serialize(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults_are_valid() {
		assert!(FormsSettings::default().validate().is_ok());
	}

	#[rstest]
	#[case(vec![], "supported_locales")]
	#[case(vec!["english".to_string()], "supported_locales")]
	#[case(vec!["EN".to_string()], "supported_locales")]
	fn test_invalid_locales(#[case] locales: Vec<String>, #[case] key: &str) {
		let settings = FormsSettings {
			supported_locales: locales,
			..Default::default()
		};

		let err = settings.validate().unwrap_err();

		assert!(matches!(err, SettingsError::Invalid { key: k, .. } if k == key));
	}

	#[rstest]
	fn test_invalid_header_name() {
		let mut settings = FormsSettings::default();
		settings.csrf.header_name = "X CSRF".to_string();

		assert!(settings.validate().is_err());
	}

	#[rstest]
	fn test_toml_round_trips_through_deserialize() {
		let settings = FormsSettings::default();

		let text = settings.to_toml().unwrap();
		let parsed: FormsSettings = toml::from_str(&text).unwrap();

		assert_eq!(parsed, settings);
		assert!(text.contains("[csrf]"));
	}

	#[rstest]
	fn test_partial_sections_keep_defaults() {
		let parsed: FormsSettings = toml::from_str("[csrf]\nheader_name = \"X-XSRF\"\n").unwrap();

		assert_eq!(parsed.csrf.header_name, "X-XSRF");
		assert_eq!(parsed.csrf.meta_name, "csrf-token");
		assert_eq!(parsed.validation_delay_ms, 100);
	}
}
