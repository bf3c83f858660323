//! Configuration sources
//!
//! Each source yields a map of top-level keys to JSON values. Nested
//! settings (`csrf.header_name`) are JSON objects below their top-level key.

use crate::settings::FormsSettings;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// A provider of raw settings values.
pub trait ConfigSource: Send + Sync {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Higher priorities override lower ones.
	fn priority(&self) -> u8;

	fn description(&self) -> String;
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error reading {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("TOML error in {}: {source}", path.display())]
	Toml {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Parse error: {0}")]
	Parse(String),
}

/// Settings from a TOML file. A missing optional file yields nothing.
pub struct TomlFileSource {
	path: PathBuf,
	required: bool,
}

impl TomlFileSource {
	/// # Examples
	///
	/// ```
	/// use formwire_conf::sources::{ConfigSource, TomlFileSource};
	///
	/// let source = TomlFileSource::new("does-not-exist.toml");
	/// assert!(source.load().unwrap().is_empty());
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// Fails on a missing file instead of yielding nothing.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.required && !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
			path: self.path.clone(),
			source,
		})?;
		let table: toml::Table = toml::from_str(&content).map_err(|source| SourceError::Toml {
			path: self.path.clone(),
			source,
		})?;
		let value = serde_json::to_value(table).map_err(|e| SourceError::Parse(e.to_string()))?;

		match value {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Err(SourceError::Parse("Expected table at root".to_string())),
		}
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Settings from environment variables.
///
/// With the default prefix `FORMWIRE_`, `FORMWIRE_VALIDATION_DELAY_MS=250`
/// sets `validation_delay_ms` and `FORMWIRE_CSRF__HEADER_NAME=X-XSRF` sets
/// `csrf.header_name`. A setting that holds text takes the raw value
/// verbatim. Other values that parse as JSON (numbers, booleans, arrays)
/// are taken as such; `supported_locales` also accepts a comma-separated
/// list.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	pub fn new() -> Self {
		Self {
			prefix: "FORMWIRE_".to_string(),
			vars: None,
		}
	}

	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Reads from the given pairs instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			prefix: "FORMWIRE_".to_string(),
			vars: Some(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn parse_value(path: &[String], raw: &str, defaults: &Value) -> Value {
		let pointer = format!("/{}", path.join("/"));
		if let Some(Value::String(_)) = defaults.pointer(&pointer) {
			return Value::String(raw.to_string());
		}
		let trimmed = raw.trim();
		if pointer == "/supported_locales" && !trimmed.starts_with('[') {
			return Value::Array(
				trimmed
					.split(',')
					.map(str::trim)
					.filter(|s| !s.is_empty())
					.map(|s| Value::String(s.to_string()))
					.collect(),
			);
		}
		match serde_json::from_str::<Value>(trimmed) {
			Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Array(_))) => v,
			_ => Value::String(raw.to_string()),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let vars = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let defaults = serde_json::to_value(FormsSettings::default()).unwrap_or(Value::Null);
		let mut config: IndexMap<String, Value> = IndexMap::new();
		for (key, raw) in vars {
			let Some(rest) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let path: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
			if path.iter().any(String::is_empty) {
				tracing::warn!(variable = %key, "malformed settings variable, ignored");
				continue;
			}
			let leaf = Self::parse_value(&path, &raw, &defaults);

			let Some((head, tail)) = path.split_first() else {
				continue;
			};
			if tail.is_empty() {
				config.insert(head.clone(), leaf);
				continue;
			}
			let slot = config
				.entry(head.clone())
				.or_insert_with(|| Value::Object(Map::new()));
			insert_path(slot, tail, leaf);
		}
		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

fn insert_path(target: &mut Value, path: &[String], leaf: Value) {
	if !target.is_object() {
		*target = Value::Object(Map::new());
	}
	let Value::Object(map) = target else {
		return;
	};
	match path {
		[] => {}
		[last] => {
			map.insert(last.clone(), leaf);
		}
		[first, rest @ ..] => {
			let child = map
				.entry(first.clone())
				.or_insert_with(|| Value::Object(Map::new()));
			insert_path(child, rest, leaf);
		}
	}
}

/// Fixed values, mostly for programmatic overrides and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	values: IndexMap<String, Value>,
	priority: u8,
}

impl MemorySource {
	pub fn new(priority: u8) -> Self {
		Self {
			values: IndexMap::new(),
			priority,
		}
	}

	pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.insert(key.into(), value.into());
		self
	}
}

impl ConfigSource for MemorySource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		self.priority
	}

	fn description(&self) -> String {
		format!("In-memory values ({} keys)", self.values.len())
	}
}
