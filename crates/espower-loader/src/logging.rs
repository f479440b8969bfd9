// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup for hosts that do not install their own.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install a global fmt subscriber.
///
/// Fails if a global subscriber is already set, which is the normal case when
/// the host build tool configured tracing itself.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
	let builder = tracing_subscriber::fmt()
		.with_env_filter(env_filter(config))
		.with_writer(std::io::stderr);

	match config.format {
		LogFormat::Compact => builder.compact().finish().try_init(),
		LogFormat::Pretty => builder.pretty().finish().try_init(),
		LogFormat::Json => builder.json().finish().try_init(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_init_fails() {
		let config = LoggingConfig::default();
		let _ = init_logging(&config);
		assert!(init_logging(&config).is_err());
	}

	#[test]
	fn filter_uses_configured_level() {
		let config = LoggingConfig {
			level: "espower_sourcemap=trace".to_string(),
			format: LogFormat::Compact,
		};
		if std::env::var("RUST_LOG").is_err() {
			assert_eq!(
				env_filter(&config).max_level_hint(),
				Some(tracing_subscriber::filter::LevelFilter::TRACE)
			);
		}
	}
}
