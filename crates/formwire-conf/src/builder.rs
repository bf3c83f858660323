//! Merging sources into [`FormsSettings`]

use crate::sources::{ConfigSource, EnvSource, TomlFileSource};
use crate::{FormsSettings, SettingsError};
use serde_json::{Map, Value};
use std::path::Path;

/// Collects sources and merges them over the built-in defaults.
///
/// # Examples
///
/// ```
/// use formwire_conf::SettingsBuilder;
/// use formwire_conf::sources::MemorySource;
///
/// let settings = SettingsBuilder::new()
///     .add_source(MemorySource::new(10).set("event_name", "orderForm"))
///     .build()
///     .unwrap();
/// assert_eq!(settings.event_name, "orderForm");
/// assert_eq!(settings.alert_duration_ms, 3000);
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Defaults, then `path` if given, then `FORMWIRE_*` variables.
	pub fn standard(path: Option<&Path>) -> Self {
		let builder = Self::new();
		let builder = match path {
			Some(p) => builder.add_source(TomlFileSource::new(p)),
			None => builder,
		};
		builder.add_source(EnvSource::new())
	}

	pub fn build(mut self) -> Result<FormsSettings, SettingsError> {
		let defaults = serde_json::to_value(FormsSettings::default())
			.map_err(|e| SettingsError::Serialize(e.to_string()))?;
		let mut merged = defaults.clone();

		self.sources.sort_by_key(|s| s.priority());
		for source in &self.sources {
			tracing::debug!(source = %source.description(), "loading settings source");
			let values = source.load()?;
			let mut overlay = Map::new();
			overlay.extend(values);
			let mut overlay = Value::Object(overlay);
			drop_unknown("", &mut overlay, &defaults);
			deep_merge(&mut merged, overlay);
		}

		let settings: FormsSettings =
			serde_json::from_value(merged).map_err(|e| SettingsError::Deserialize(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}
}

/// Removes (and logs) keys of `overlay` that `template` does not know.
fn drop_unknown(prefix: &str, overlay: &mut Value, template: &Value) {
	let (Value::Object(over), Value::Object(known)) = (overlay, template) else {
		return;
	};
	over.retain(|key, value| {
		let path = if prefix.is_empty() {
			key.clone()
		} else {
			format!("{prefix}.{key}")
		};
		match known.get(key) {
			Some(child) => {
				drop_unknown(&path, value, child);
				true
			}
			None => {
				tracing::warn!(key = %path, "unknown setting, ignored");
				false
			}
		}
	});
}

fn deep_merge(base: &mut Value, overlay: Value) {
	match (base, overlay) {
		(Value::Object(base_map), Value::Object(over_map)) => {
			for (key, value) in over_map {
				match base_map.get_mut(&key) {
					Some(existing) => deep_merge(existing, value),
					None => {
						base_map.insert(key, value);
					}
				}
			}
		}
		(slot, value) => *slot = value,
	}
}
