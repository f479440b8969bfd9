// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::config::layer::{LoaderConfigLayer, LogFormat, LoggingConfigLayer};
use crate::error::ConfigError;

/// Default prefix for environment variables.
pub const ENV_PREFIX: &str = "ESPOWER_LOADER";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<LoaderConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<LoaderConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(LoaderConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `espower-loader.toml` in the current directory.
	pub fn workspace() -> Self {
		Self::new("espower-loader.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<LoaderConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(LoaderConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: LoaderConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `<PREFIX>_SOURCEMAPS`, `<PREFIX>_SOURCES_CONTENT`,
/// `<PREFIX>_LOG_LEVEL`, `<PREFIX>_LOG_FORMAT` with prefix `ESPOWER_LOADER`.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	pub fn new() -> Self {
		Self::with_prefix(ENV_PREFIX)
	}

	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	fn key(&self, field: &str) -> String {
		format!("{}_{}", self.prefix, field)
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<LoaderConfigLayer, ConfigError> {
		debug!(prefix = %self.prefix, "loading environment variables");

		let level = env_var(&self.key("LOG_LEVEL"));
		let format = env_var(&self.key("LOG_FORMAT"))
			.map(|v| v.parse::<LogFormat>())
			.transpose()?;
		let logging = (level.is_some() || format.is_some())
			.then_some(LoggingConfigLayer { level, format });

		Ok(LoaderConfigLayer {
			sourcemaps: env_bool(&self.key("SOURCEMAPS"))?,
			sources_content: env_bool(&self.key("SOURCES_CONTENT"))?,
			logging,
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
	match env_var(name) {
		Some(v) => parse_bool(&v)
			.map(Some)
			.ok_or_else(|| ConfigError::invalid_value(name, format!("expected a boolean, got '{v}'"))),
		None => Ok(None),
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_parse_bool() {
		assert_eq!(parse_bool("TRUE"), Some(true));
		assert_eq!(parse_bool("1"), Some(true));
		assert_eq!(parse_bool("off"), Some(false));
		assert_eq!(parse_bool("maybe"), None);
	}

	#[test]
	fn test_precedence_order() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_missing_toml_file_is_skipped() {
		let dir = tempfile::tempdir().unwrap();
		let source = TomlSource::new(dir.path().join("missing.toml"));
		assert_eq!(source.load().unwrap(), LoaderConfigLayer::default());
	}

	#[test]
	fn test_toml_file_is_loaded() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "sources_content = false").unwrap();
		writeln!(file, "[logging]").unwrap();
		writeln!(file, "level = \"espower_sourcemap=trace\"").unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.sources_content, Some(false));
		assert_eq!(
			layer.logging.unwrap().level,
			Some("espower_sourcemap=trace".to_string())
		);
	}

	#[test]
	fn test_invalid_toml_reports_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "sourcemaps = \"sometimes\"").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_source_reads_prefixed_vars() {
		let source = EnvSource::with_prefix("ESPOWER_LOADER_TEST_READ");
		std::env::set_var("ESPOWER_LOADER_TEST_READ_SOURCEMAPS", "false");
		std::env::set_var("ESPOWER_LOADER_TEST_READ_LOG_FORMAT", "json");

		let layer = source.load().unwrap();
		assert_eq!(layer.sourcemaps, Some(false));
		assert!(layer.sources_content.is_none());
		let logging = layer.logging.unwrap();
		assert_eq!(logging.format, Some(LogFormat::Json));
		assert!(logging.level.is_none());

		std::env::remove_var("ESPOWER_LOADER_TEST_READ_SOURCEMAPS");
		std::env::remove_var("ESPOWER_LOADER_TEST_READ_LOG_FORMAT");
	}

	#[test]
	fn test_env_source_rejects_bad_bool() {
		let source = EnvSource::with_prefix("ESPOWER_LOADER_TEST_BAD");
		std::env::set_var("ESPOWER_LOADER_TEST_BAD_SOURCES_CONTENT", "perhaps");

		let err = source.load().unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));

		std::env::remove_var("ESPOWER_LOADER_TEST_BAD_SOURCES_CONTENT");
	}

	#[test]
	fn test_env_source_empty() {
		let layer = EnvSource::with_prefix("ESPOWER_LOADER_TEST_UNSET").load().unwrap();
		assert_eq!(layer, LoaderConfigLayer::default());
	}
}
