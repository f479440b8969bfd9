// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for core source map values.

use thiserror::Error;

/// Errors raised when constructing core values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	#[error("invalid position: line must be at least 1, got {line}")]
	InvalidLine { line: u32 },

	#[error("invalid position: line {line} is out of range")]
	LineOverflow { line: u64 },

	#[error("invalid position '{0}': expected line:column")]
	Malformed(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
