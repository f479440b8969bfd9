// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map parsing, serialization and position lookup.
//!
//! Implements the Source Map v3 JSON format. A [`SourceMap`] is immutable once
//! constructed: every index it holds has been checked against its `sources`
//! and `names`, and its segments are ordered by generated position.

use std::str::FromStr;

use espower_sourcemap_core::{CoreError, Position, Segment};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceMapError};
use crate::mappings::{decode_mappings, encode_mappings, Mappings};

/// The only source map version this crate reads and writes.
pub const SOURCE_MAP_VERSION: u32 = 3;

/// Raw source map JSON structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
	version: u32,
	#[serde(default)]
	file: Option<String>,
	#[serde(default)]
	source_root: Option<String>,
	sources: Vec<String>,
	#[serde(default)]
	sources_content: Option<Vec<Option<String>>>,
	#[serde(default)]
	names: Vec<String>,
	mappings: String,
}

/// Borrowed view written out by [`SourceMap::to_json_string`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMapRef<'a> {
	version: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	file: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	source_root: Option<&'a str>,
	sources: &'a [String],
	#[serde(skip_serializing_if = "Option::is_none")]
	sources_content: Option<&'a [Option<String>]>,
	names: &'a [String],
	mappings: String,
}

/// Parsed source map ready for lookups and composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
	/// Generated file name.
	file: Option<String>,
	/// Root path prepended to source filenames.
	source_root: Option<String>,
	/// List of original source file paths.
	sources: Vec<String>,
	/// Embedded source content, one slot per source.
	sources_content: Vec<Option<String>>,
	/// List of original identifiers (function/variable names).
	names: Vec<String>,
	/// Decoded segments for position lookup.
	mappings: Mappings,
}

/// Components of a source map, validated by [`SourceMap::from_parts`].
#[derive(Debug, Clone, Default)]
pub struct SourceMapParts {
	pub file: Option<String>,
	pub source_root: Option<String>,
	pub sources: Vec<String>,
	pub sources_content: Vec<Option<String>>,
	pub names: Vec<String>,
	pub segments: Vec<Segment>,
}

/// Original position information from a source map lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition {
	/// Original source file path (source root applied).
	pub source: String,
	/// Line in the original source (1-indexed).
	pub line: u32,
	/// Column in the original source (0-indexed).
	pub column: u32,
	/// Original identifier name if available.
	pub name: Option<String>,
	/// Original source content if embedded.
	pub source_content: Option<String>,
}

impl OriginalPosition {
	pub fn position(&self) -> Position {
		Position {
			line: self.line,
			column: self.column,
		}
	}

	/// Context lines around this position, when the source content is embedded.
	pub fn context(&self, context_lines: usize) -> Option<(Vec<String>, String, Vec<String>)> {
		self.source_content
			.as_deref()
			.map(|content| extract_context(content, self.line as usize, context_lines))
	}
}

impl SourceMap {
	/// Parse a source map from JSON bytes.
	pub fn from_slice(data: &[u8]) -> Result<Self> {
		let raw: RawSourceMap = serde_json::from_slice(data)?;
		Self::from_raw(raw)
	}

	/// Parse a source map from an already deserialized JSON value.
	pub fn from_value(value: serde_json::Value) -> Result<Self> {
		let raw: RawSourceMap = serde_json::from_value(value)?;
		Self::from_raw(raw)
	}

	fn from_raw(raw: RawSourceMap) -> Result<Self> {
		if raw.version != SOURCE_MAP_VERSION {
			return Err(SourceMapError::InvalidSourceMapVersion(raw.version));
		}

		let mappings = decode_mappings(&raw.mappings)?;

		Self::from_parts(SourceMapParts {
			file: raw.file,
			source_root: raw.source_root,
			sources: raw.sources,
			sources_content: raw.sources_content.unwrap_or_default(),
			names: raw.names,
			segments: mappings.into_segments(),
		})
	}

	/// Assemble a source map, checking ordering and every source/name index.
	///
	/// `sources_content` may be shorter than `sources`; missing slots mean no
	/// embedded content. Extra slots are discarded.
	pub fn from_parts(parts: SourceMapParts) -> Result<Self> {
		let SourceMapParts {
			file,
			source_root,
			sources,
			mut sources_content,
			names,
			segments,
		} = parts;

		for segment in &segments {
			if segment.generated.line == 0 {
				return Err(CoreError::InvalidLine { line: 0 }.into());
			}
			let Some(original) = &segment.original else {
				continue;
			};
			if original.source as usize >= sources.len() {
				return Err(SourceMapError::InvalidSourceIndex(original.source));
			}
			if original.position.line == 0 {
				return Err(CoreError::InvalidLine { line: 0 }.into());
			}
			if let Some(name) = original.name {
				if name as usize >= names.len() {
					return Err(SourceMapError::InvalidNameIndex(name));
				}
			}
		}

		let mappings = Mappings::from_segments(segments)?;
		sources_content.resize(sources.len(), None);

		Ok(Self {
			file,
			source_root,
			sources,
			sources_content,
			names,
			mappings,
		})
	}

	/// Assemble from parts the caller guarantees are valid.
	pub(crate) fn from_trusted(parts: SourceMapParts) -> Self {
		let SourceMapParts {
			file,
			source_root,
			sources,
			mut sources_content,
			names,
			segments,
		} = parts;
		sources_content.resize(sources.len(), None);

		Self {
			file,
			source_root,
			sources,
			sources_content,
			names,
			mappings: Mappings::from_sorted(segments),
		}
	}

	/// Serialize to v3 JSON.
	pub fn to_json_string(&self) -> Result<String> {
		Ok(serde_json::to_string(&self.as_raw())?)
	}

	/// Serialize to a v3 JSON value.
	pub fn to_value(&self) -> Result<serde_json::Value> {
		Ok(serde_json::to_value(self.as_raw())?)
	}

	fn as_raw(&self) -> RawSourceMapRef<'_> {
		RawSourceMapRef {
			version: SOURCE_MAP_VERSION,
			file: self.file.as_deref(),
			source_root: self.source_root.as_deref(),
			sources: &self.sources,
			sources_content: self
				.has_sources_content()
				.then_some(self.sources_content.as_slice()),
			names: &self.names,
			mappings: self.encoded_mappings(),
		}
	}

	/// The VLQ `mappings` string for this map.
	pub fn encoded_mappings(&self) -> String {
		encode_mappings(&self.mappings)
	}

	/// Find the segment covering a generated position (floor match on its line).
	pub fn lookup(&self, generated: Position) -> Option<&Segment> {
		self.mappings.find(generated)
	}

	/// Lookup the original position for a generated line (1-indexed) and column (0-indexed).
	///
	/// Returns None if no segment covers the position or the covering segment
	/// is generated-only.
	pub fn original_position_for(&self, line: u32, column: u32) -> Option<OriginalPosition> {
		let segment = self.lookup(Position { line, column })?;
		let original = segment.original?;

		Some(OriginalPosition {
			source: self.resolved_source(original.source)?,
			line: original.position.line,
			column: original.position.column,
			name: original.name.and_then(|idx| self.name(idx)).map(str::to_string),
			source_content: self.source_content(original.source).map(str::to_string),
		})
	}

	/// Source path at `index` with the source root applied.
	pub fn resolved_source(&self, index: u32) -> Option<String> {
		self.sources
			.get(index as usize)
			.map(|source| self.resolve_source_path(source))
	}

	/// Resolve a source path with the source root if present.
	fn resolve_source_path(&self, source: &str) -> String {
		match &self.source_root {
			Some(root) if !root.is_empty() => {
				let root = root.trim_end_matches('/');
				format!("{}/{}", root, source)
			}
			_ => source.to_string(),
		}
	}

	pub fn name(&self, index: u32) -> Option<&str> {
		self.names.get(index as usize).map(String::as_str)
	}

	pub fn source_content(&self, index: u32) -> Option<&str> {
		self.sources_content
			.get(index as usize)
			.and_then(|c| c.as_deref())
	}

	/// Return a copy whose single source is renamed to `source`.
	///
	/// Maps with zero or several sources are returned unchanged, since there
	/// is no unambiguous source to relabel.
	pub fn relabel_source(&self, source: &str) -> SourceMap {
		let mut relabelled = self.clone();
		if let [only] = relabelled.sources.as_mut_slice() {
			*only = source.to_string();
			relabelled.source_root = None;
		}
		relabelled
	}

	/// Return a copy with all embedded source content removed.
	pub fn without_sources_content(&self) -> SourceMap {
		let mut stripped = self.clone();
		stripped.sources_content.iter_mut().for_each(|c| *c = None);
		stripped
	}

	pub fn file(&self) -> Option<&str> {
		self.file.as_deref()
	}

	pub fn source_root(&self) -> Option<&str> {
		self.source_root.as_deref()
	}

	pub fn sources(&self) -> &[String] {
		&self.sources
	}

	pub fn sources_content(&self) -> &[Option<String>] {
		&self.sources_content
	}

	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn segments(&self) -> &[Segment] {
		self.mappings.segments()
	}

	pub fn mappings(&self) -> &Mappings {
		&self.mappings
	}

	/// Check if this source map has embedded source content.
	pub fn has_sources_content(&self) -> bool {
		self.sources_content.iter().any(|c| c.is_some())
	}

	/// Get the number of source files in this source map.
	pub fn source_count(&self) -> usize {
		self.sources.len()
	}

	/// Get the number of identifier names in this source map.
	pub fn name_count(&self) -> usize {
		self.names.len()
	}

	/// Get the number of segments in this source map.
	pub fn mapping_count(&self) -> usize {
		self.mappings.len()
	}
}

impl FromStr for SourceMap {
	type Err = SourceMapError;

	fn from_str(data: &str) -> Result<Self> {
		Self::from_slice(data.as_bytes())
	}
}

/// Extract source context lines around a given line number.
///
/// Returns (pre_context, context_line, post_context).
pub fn extract_context(
	source_content: &str,
	line: usize,
	context_lines: usize,
) -> (Vec<String>, String, Vec<String>) {
	let lines: Vec<&str> = source_content.lines().collect();

	// Line is 1-indexed, convert to 0-indexed
	let line_idx = line.saturating_sub(1);

	if line_idx >= lines.len() {
		return (Vec::new(), String::new(), Vec::new());
	}

	let context_line = lines[line_idx].to_string();

	let pre_start = line_idx.saturating_sub(context_lines);
	let pre_context: Vec<String> = lines[pre_start..line_idx]
		.iter()
		.map(|s| s.to_string())
		.collect();

	let post_end = (line_idx + 1 + context_lines).min(lines.len());
	let post_context: Vec<String> = lines[(line_idx + 1)..post_end]
		.iter()
		.map(|s| s.to_string())
		.collect();

	(pre_context, context_line, post_context)
}
