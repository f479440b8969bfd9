// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Mapping segments.

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Where a generated position came from.
///
/// `source` and `name` index into the owning map's `sources` and `names`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginalLocation {
	/// Index into the sources array.
	pub source: u32,
	/// Position in the original source.
	pub position: Position,
	/// Optional index into the names array.
	pub name: Option<u32>,
}

/// One generated-to-original association.
///
/// A segment without an original location marks generated code that has no
/// counterpart in any source. It ends the range of the previous segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
	/// Position in the generated buffer.
	pub generated: Position,
	/// Original location, if this segment is mapped.
	pub original: Option<OriginalLocation>,
}

impl Segment {
	/// A segment mapped to an original source position.
	pub fn mapped(generated: Position, source: u32, original: Position, name: Option<u32>) -> Self {
		Self {
			generated,
			original: Some(OriginalLocation {
				source,
				position: original,
				name,
			}),
		}
	}

	/// A generated-only segment.
	pub fn unmapped(generated: Position) -> Self {
		Self {
			generated,
			original: None,
		}
	}

	pub fn is_mapped(&self) -> bool {
		self.original.is_some()
	}
}
