// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decoded mappings and the `mappings` string codec.
//!
//! Segments are kept in one flat vector sorted by generated position, with a
//! per-line offset table so the segments of any generated line are a slice.

use espower_sourcemap_core::{CoreError, OriginalLocation, Position, Segment};

use crate::error::{Result, SourceMapError};
use crate::vlq::{decode_vlq_segment, encode_vlq};

/// Container for decoded segments with efficient per-line lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mappings {
	/// Segments sorted by generated line, then generated column.
	segments: Vec<Segment>,
	/// `line_offsets[n]` is the number of segments on generated lines `<= n`.
	line_offsets: Vec<usize>,
}

impl Mappings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build from segments, rejecting any that go backwards in generated position.
	pub fn from_segments(segments: Vec<Segment>) -> Result<Self> {
		for pair in segments.windows(2) {
			if pair[1].generated < pair[0].generated {
				return Err(SourceMapError::UnorderedSegments {
					previous: pair[0].generated,
					current: pair[1].generated,
				});
			}
		}
		Ok(Self::from_sorted(segments))
	}

	/// Build from segments already sorted by generated position.
	pub(crate) fn from_sorted(segments: Vec<Segment>) -> Self {
		let last_line = segments.last().map_or(0, |s| s.generated.line as usize);
		let mut line_offsets = Vec::with_capacity(last_line + 1);
		let mut idx = 0;
		for line in 0..=last_line {
			while idx < segments.len() && segments[idx].generated.line as usize <= line {
				idx += 1;
			}
			line_offsets.push(idx);
		}

		Self {
			segments,
			line_offsets,
		}
	}

	/// All segments on a generated line (1-indexed).
	pub fn line(&self, line: u32) -> &[Segment] {
		let line = line as usize;
		if line == 0 || line >= self.line_offsets.len() {
			return &[];
		}
		&self.segments[self.line_offsets[line - 1]..self.line_offsets[line]]
	}

	/// Find the segment covering a generated position.
	///
	/// Returns the segment on the same line with the greatest generated column
	/// at or before `position.column`. When several segments share that column
	/// the last one wins.
	pub fn find(&self, position: Position) -> Option<&Segment> {
		let line_segments = self.line(position.line);

		// Find the closest segment at or before the given column
		let idx = line_segments.partition_point(|s| s.generated.column <= position.column);

		if idx == 0 {
			// Column is before all segments on this line
			None
		} else {
			Some(&line_segments[idx - 1])
		}
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
		self.segments.iter()
	}

	/// Highest generated line that carries a segment, or 0 when empty.
	pub fn last_line(&self) -> u32 {
		self.segments.last().map_or(0, |s| s.generated.line)
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	pub(crate) fn into_segments(self) -> Vec<Segment> {
		self.segments
	}
}

impl<'a> IntoIterator for &'a Mappings {
	type Item = &'a Segment;
	type IntoIter = std::slice::Iter<'a, Segment>;

	fn into_iter(self) -> Self::IntoIter {
		self.segments.iter()
	}
}

fn non_negative(field: &'static str, value: i64, line: u32) -> Result<u32> {
	u32::try_from(value).map_err(|_| SourceMapError::NegativeValue { field, value, line })
}

/// Decode a VLQ-encoded mappings string into structured form.
///
/// The mappings string format:
/// - Lines are separated by semicolons (;)
/// - Segments within a line are separated by commas (,)
/// - Each segment contains 1, 4, or 5 VLQ-encoded values
///
/// Segments that appear out of column order within a line are stably sorted,
/// so duplicates keep their relative order.
pub fn decode_mappings(mappings: &str) -> Result<Mappings> {
	let mut segments = Vec::new();

	// State for relative decoding (values are delta-encoded)
	let mut prev_source = 0i64;
	let mut prev_original_line = 0i64;
	let mut prev_original_column = 0i64;
	let mut prev_name = 0i64;

	for (line_idx, line) in mappings.split(';').enumerate() {
		let zero_based_line = u32::try_from(line_idx).map_err(|_| CoreError::LineOverflow {
			line: line_idx as u64,
		})?;
		let display_line = zero_based_line.saturating_add(1);
		let line_start = segments.len();
		let mut generated_column = 0i64;
		let mut in_order = true;

		for segment in line.split(',') {
			if segment.is_empty() {
				continue;
			}

			let values = decode_vlq_segment(segment)?;
			if !matches!(values.len(), 1 | 4 | 5) {
				return Err(SourceMapError::InvalidSegmentLength {
					segment: segment.to_string(),
					fields: values.len(),
				});
			}

			generated_column += values[0];
			let column = non_negative("generated column", generated_column, display_line)?;
			let generated = Position::from_zero_based(zero_based_line, column)?;

			let original = if values.len() >= 4 {
				prev_source += values[1];
				prev_original_line += values[2];
				prev_original_column += values[3];

				let name = if values.len() == 5 {
					prev_name += values[4];
					Some(non_negative("name index", prev_name, display_line)?)
				} else {
					None
				};

				Some(OriginalLocation {
					source: non_negative("source index", prev_source, display_line)?,
					position: Position::from_zero_based(
						non_negative("original line", prev_original_line, display_line)?,
						non_negative("original column", prev_original_column, display_line)?,
					)?,
					name,
				})
			} else {
				None
			};

			if segments[line_start..]
				.last()
				.is_some_and(|last: &Segment| last.generated.column > column)
			{
				in_order = false;
			}

			segments.push(Segment {
				generated,
				original,
			});
		}

		if !in_order {
			segments[line_start..].sort_by_key(|s| s.generated.column);
		}
	}

	Ok(Mappings::from_sorted(segments))
}

/// Encode segments (sorted by generated position) into a mappings string.
pub fn encode_mappings<'a>(segments: impl IntoIterator<Item = &'a Segment>) -> String {
	let mut out = String::new();

	let mut current_line = 1u32;
	let mut prev_generated_column = 0i64;
	let mut prev_source = 0i64;
	let mut prev_original_line = 0i64;
	let mut prev_original_column = 0i64;
	let mut prev_name = 0i64;
	let mut first_on_line = true;

	for segment in segments {
		while current_line < segment.generated.line {
			out.push(';');
			current_line += 1;
			prev_generated_column = 0;
			first_on_line = true;
		}

		if !first_on_line {
			out.push(',');
		}
		first_on_line = false;

		let column = i64::from(segment.generated.column);
		encode_vlq(column - prev_generated_column, &mut out);
		prev_generated_column = column;

		if let Some(original) = &segment.original {
			let source = i64::from(original.source);
			let line = i64::from(original.position.zero_based_line());
			let column = i64::from(original.position.column);

			encode_vlq(source - prev_source, &mut out);
			encode_vlq(line - prev_original_line, &mut out);
			encode_vlq(column - prev_original_column, &mut out);
			prev_source = source;
			prev_original_line = line;
			prev_original_column = column;

			if let Some(name) = original.name {
				let name = i64::from(name);
				encode_vlq(name - prev_name, &mut out);
				prev_name = name;
			}
		}
	}

	out
}
