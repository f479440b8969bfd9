// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Line/column positions within a text buffer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// A position in a text buffer.
///
/// Lines are 1-indexed and columns are 0-indexed. Ordering is line-major,
/// then column-major, which is the order segments are stored in a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
	/// Line (1-indexed).
	pub line: u32,
	/// Column (0-indexed).
	pub column: u32,
}

impl Position {
	/// Create a position, rejecting line 0.
	pub fn new(line: u32, column: u32) -> Result<Self> {
		if line == 0 {
			return Err(CoreError::InvalidLine { line });
		}
		Ok(Self { line, column })
	}

	/// Create a position from a 0-indexed line as found in the mappings wire format.
	pub fn from_zero_based(line: u32, column: u32) -> Result<Self> {
		let line = u64::from(line) + 1;
		let line = u32::try_from(line).map_err(|_| CoreError::LineOverflow { line })?;
		Ok(Self { line, column })
	}

	/// The 0-indexed line used by the mappings wire format.
	pub fn zero_based_line(&self) -> u32 {
		self.line.saturating_sub(1)
	}
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.line, self.column)
	}
}

impl FromStr for Position {
	type Err = CoreError;

	/// Parse `line:column`.
	fn from_str(s: &str) -> Result<Self> {
		let malformed = || CoreError::Malformed(s.to_string());
		let (line, column) = s.split_once(':').ok_or_else(malformed)?;
		let line: u32 = line.trim().parse().map_err(|_| malformed())?;
		let column: u32 = column.trim().parse().map_err(|_| malformed())?;
		Self::new(line, column)
	}
}
