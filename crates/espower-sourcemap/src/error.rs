// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map decoding and construction.

use espower_sourcemap_core::{CoreError, Position};
use thiserror::Error;

/// Errors that can occur while decoding or assembling a source map.
#[derive(Debug, Error)]
pub enum SourceMapError {
	#[error("Invalid source map JSON: {0}")]
	InvalidSourceMapJson(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidSourceMapVersion(u32),

	#[error("Invalid VLQ character: {0}")]
	InvalidVlqChar(char),

	#[error("Truncated VLQ value in segment {0:?}")]
	TruncatedVlq(String),

	#[error("VLQ value overflows 32 bits in segment {0:?}")]
	VlqOverflow(String),

	#[error("Invalid segment {segment:?}: expected 1, 4 or 5 fields, got {fields}")]
	InvalidSegmentLength { segment: String, fields: usize },

	#[error("Negative {field} ({value}) at generated line {line}")]
	NegativeValue {
		field: &'static str,
		value: i64,
		line: u32,
	},

	#[error("Invalid source index: {0}")]
	InvalidSourceIndex(u32),

	#[error("Invalid name index: {0}")]
	InvalidNameIndex(u32),

	#[error("Segments are not ordered by generated position: {current} follows {previous}")]
	UnorderedSegments { previous: Position, current: Position },

	#[error("Invalid position: {0}")]
	InvalidPosition(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, SourceMapError>;
