//! Command implementations, kept apart from argument parsing for testing.

use anyhow::Context;
use formwire_conf::sources::{EnvSource, TomlFileSource};
use formwire_conf::{FormsSettings, SettingsBuilder};
use formwire_i18n::bundled;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const SETTINGS_FILE: &str = "formwire.toml";

/// Files handled by [`publish`].
#[derive(Debug, Default)]
pub(crate) struct PublishReport {
	pub written: Vec<PathBuf>,
	pub skipped: Vec<PathBuf>,
}

/// Writes `lang/<locale>.json` for every bundled locale and a default
/// settings file below `out`. Existing files are kept unless `force`.
pub(crate) fn publish(out: &Path, force: bool) -> anyhow::Result<PublishReport> {
	let lang = out.join("lang");
	fs::create_dir_all(&lang).with_context(|| format!("failed to create {}", lang.display()))?;

	let mut files: Vec<(PathBuf, String)> = bundled::BUNDLES
		.iter()
		.map(|(locale, json)| (lang.join(format!("{locale}.json")), json.to_string()))
		.collect();
	let settings = FormsSettings::default().to_toml()?;
	files.push((out.join(SETTINGS_FILE), settings));

	let mut report = PublishReport::default();
	for (path, content) in files {
		if path.exists() && !force {
			tracing::debug!(path = %path.display(), "keeping existing file");
			report.skipped.push(path);
			continue;
		}
		fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
		tracing::info!(path = %path.display(), "published");
		report.written.push(path);
	}
	Ok(report)
}

/// Loads `file` over the defaults, optionally followed by the environment.
pub(crate) fn check(file: &Path, env: bool) -> anyhow::Result<FormsSettings> {
	let mut builder = SettingsBuilder::new().add_source(TomlFileSource::new(file).required());
	if env {
		builder = builder.add_source(EnvSource::new());
	}
	builder
		.build()
		.with_context(|| format!("{} is not a valid settings file", file.display()))
}
