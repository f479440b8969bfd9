// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Incremental source map construction.

use std::collections::HashMap;

use espower_sourcemap_core::{Position, Segment};

use crate::sourcemap::{SourceMap, SourceMapParts};

/// Builds a [`SourceMap`] by interning sources and names as segments are added.
///
/// Segments may be added in any order; [`SourceMapBuilder::build`] sorts them
/// stably by generated position, so segments sharing a generated position
/// keep the order they were added in.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
	file: Option<String>,
	source_root: Option<String>,
	sources: Vec<String>,
	sources_content: Vec<Option<String>>,
	source_index: HashMap<String, u32>,
	names: Vec<String>,
	name_index: HashMap<String, u32>,
	segments: Vec<Segment>,
}

impl SourceMapBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the generated file name.
	pub fn file(mut self, file: impl Into<String>) -> Self {
		self.file = Some(file.into());
		self
	}

	pub fn source_root(mut self, root: impl Into<String>) -> Self {
		self.source_root = Some(root.into());
		self
	}

	pub fn set_file(&mut self, file: Option<&str>) {
		self.file = file.map(str::to_string);
	}

	/// Intern a source path, returning its index.
	pub fn add_source(&mut self, source: &str) -> u32 {
		if let Some(&idx) = self.source_index.get(source) {
			return idx;
		}
		let idx = self.sources.len() as u32;
		self.sources.push(source.to_string());
		self.sources_content.push(None);
		self.source_index.insert(source.to_string(), idx);
		idx
	}

	/// Attach embedded content to a previously added source.
	pub fn set_source_content(&mut self, source: u32, content: &str) {
		if let Some(slot) = self.sources_content.get_mut(source as usize) {
			*slot = Some(content.to_string());
		}
	}

	/// Intern an identifier name, returning its index.
	pub fn add_name(&mut self, name: &str) -> u32 {
		if let Some(&idx) = self.name_index.get(name) {
			return idx;
		}
		let idx = self.names.len() as u32;
		self.names.push(name.to_string());
		self.name_index.insert(name.to_string(), idx);
		idx
	}

	/// Add a segment mapping `generated` to `original` in `source`.
	pub fn add_mapping(
		&mut self,
		generated: Position,
		source: &str,
		original: Position,
		name: Option<&str>,
	) -> &mut Self {
		let source = self.add_source(source);
		let name = name.map(|n| self.add_name(n));
		self.segments
			.push(Segment::mapped(generated, source, original, name));
		self
	}

	/// Add a generated-only segment.
	pub fn add_unmapped(&mut self, generated: Position) -> &mut Self {
		self.segments.push(Segment::unmapped(generated));
		self
	}

	pub fn segment_count(&self) -> usize {
		self.segments.len()
	}

	pub fn build(mut self) -> SourceMap {
		self.segments.sort_by_key(|s| s.generated);

		SourceMap::from_trusted(SourceMapParts {
			file: self.file,
			source_root: self.source_root,
			sources: self.sources,
			sources_content: self.sources_content,
			names: self.names,
			segments: self.segments,
		})
	}
}
