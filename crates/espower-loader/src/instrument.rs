// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The instrumentation stage consumed by the loader.
//!
//! The AST rewriting that inserts recorder calls lives outside this crate.
//! The loader only needs instrumented text and a v3 map from that text back
//! to the code it was given.

use espower_sourcemap::{Position, SourceMap, SourceMapError};
use thiserror::Error;

/// Output of an instrumentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrumented {
	/// Instrumented code.
	pub code: String,
	/// v3 JSON map from `code` to the code that was instrumented.
	pub map: String,
}

impl Instrumented {
	/// Pair instrumented code with an already built map.
	pub fn from_map(code: impl Into<String>, map: &SourceMap) -> Result<Self, SourceMapError> {
		Ok(Self {
			code: code.into(),
			map: map.to_json_string()?,
		})
	}
}

/// Failure reported by the instrumentation stage, e.g. unparseable code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to instrument {file}: {message}")]
pub struct InstrumentError {
	/// File being instrumented.
	pub file: String,
	/// Description from the instrumenter.
	pub message: String,
	/// Where in the input the failure was detected, if known.
	pub position: Option<Position>,
}

impl InstrumentError {
	pub fn new(file: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			file: file.into(),
			message: message.into(),
			position: None,
		}
	}

	pub fn at(mut self, position: Position) -> Self {
		self.position = Some(position);
		self
	}
}

/// An instrumentation pass over intermediate source text.
///
/// Implementations must be shareable across threads; the host may load many
/// files at once through a single loader.
pub trait Instrumenter: Send + Sync {
	/// Instrument `source`, which the host identifies as `file`.
	fn instrument(&self, source: &str, file: &str) -> Result<Instrumented, InstrumentError>;
}

impl<F> Instrumenter for F
where
	F: Fn(&str, &str) -> Result<Instrumented, InstrumentError> + Send + Sync,
{
	fn instrument(&self, source: &str, file: &str) -> Result<Instrumented, InstrumentError> {
		self(source, file)
	}
}
