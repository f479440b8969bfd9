// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loader configuration.
//!
//! Layered configuration from multiple sources with standard precedence:
//! 1. Environment variables (`ESPOWER_LOADER_*`)
//! 2. Config file (`espower-loader.toml`)
//! 3. Built-in defaults

pub mod layer;
pub mod sources;

use std::path::PathBuf;

use tracing::{debug, info};

pub use layer::{LoaderConfigLayer, LogFormat, LoggingConfig, LoggingConfigLayer};
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, ENV_PREFIX};

use crate::error::ConfigError;

/// Fully resolved loader configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
	/// Produce and compose source maps. When false no map work runs.
	pub sourcemaps: bool,
	/// Carry embedded original source content into composed maps.
	pub sources_content: bool,
	pub logging: LoggingConfig,
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			sourcemaps: true,
			sources_content: true,
			logging: LoggingConfig::default(),
		}
	}
}

/// Load configuration from defaults and environment.
pub fn load_config() -> Result<LoaderConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource::new())])
}

/// Load configuration with a config file between defaults and environment.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<LoaderConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<LoaderConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = LoaderConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	Ok(finalize(merged))
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: LoaderConfigLayer) -> LoaderConfig {
	let defaults = LoaderConfig::default();
	let config = LoaderConfig {
		sourcemaps: layer.sourcemaps.unwrap_or(defaults.sourcemaps),
		sources_content: layer.sources_content.unwrap_or(defaults.sources_content),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	info!(
		sourcemaps = config.sourcemaps,
		sources_content = config.sources_content,
		log_level = %config.logging.level,
		"Loader configuration loaded"
	);

	config
}
