//! Settings for formwire
//!
//! [`FormsSettings`] holds the global knobs: validation delay, alert
//! duration, event base name, loading indicator markup, fallback error
//! texts, supported locales and anti-forgery token names. Values are merged
//! from built-in defaults, an optional TOML file and `FORMWIRE_*`
//! environment variables, in that order.
//!
//! ```no_run
//! use formwire_conf::SettingsBuilder;
//! use std::path::Path;
//!
//! let settings = SettingsBuilder::standard(Some(Path::new("formwire.toml")))
//!     .build()
//!     .unwrap();
//! println!("debouncing for {:?}", settings.validation_delay());
//! ```

pub mod builder;
pub mod settings;
pub mod sources;

pub use builder::SettingsBuilder;
pub use settings::{CsrfSettings, ErrorDefault, FormsSettings};
pub use sources::{ConfigSource, SourceError};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error(transparent)]
	Source(#[from] SourceError),

	#[error("invalid settings: {0}")]
	Deserialize(String),

	#[error("invalid value for `{key}`: {message}")]
	Invalid { key: String, message: String },

	#[error("failed to serialize settings: {0}")]
	Serialize(String),
}

impl SettingsError {
	pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Invalid {
			key: key.into(),
			message: message.into(),
		}
	}
}
