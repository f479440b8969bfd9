// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the loader.

use std::path::PathBuf;

use espower_sourcemap::SourceMapError;
use thiserror::Error;

use crate::instrument::InstrumentError;

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors that can occur while loading a file.
#[derive(Debug, Error)]
pub enum LoaderError {
	/// The source map attached to the file could not be decoded.
	#[error("failed to decode incoming source map: {0}")]
	InputMap(#[source] SourceMapError),

	/// The instrumentation stage rejected the source.
	#[error(transparent)]
	Instrumentation(#[from] InstrumentError),

	/// The instrumentation stage returned a map that could not be decoded.
	#[error("failed to decode instrumentation source map: {0}")]
	StageMap(#[source] SourceMapError),

	/// The stage map was generated for a different buffer.
	#[error("instrumentation source map describes {actual}, expected {expected}")]
	BufferMismatch {
		/// Buffer the loader produced.
		expected: String,
		/// Buffer named by the stage map.
		actual: String,
	},

	/// The stage map points past the end of the instrumented code.
	#[error(
		"instrumentation source map references generated line {line}, but the instrumented code has {lines} lines"
	)]
	GeneratedLineOutOfRange {
		/// Highest generated line in the stage map.
		line: u32,
		/// Lines in the instrumented code.
		lines: u32,
	},

	/// Failed to serialize the composed map.
	#[error("failed to encode composed source map: {0}")]
	Encode(#[source] SourceMapError),
}

impl LoaderError {
	/// Whether this error means the stage map and instrumented code disagree.
	///
	/// These indicate an integration bug rather than bad input.
	pub fn is_precondition_violation(&self) -> bool {
		matches!(
			self,
			Self::BufferMismatch { .. } | Self::GeneratedLineOutOfRange { .. }
		)
	}
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// I/O error reading config file
	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Invalid value
	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
}

impl ConfigError {
	/// Create an invalid value error
	pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			key: key.into(),
			message: message.into(),
		}
	}
}
