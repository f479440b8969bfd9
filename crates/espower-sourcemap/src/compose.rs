// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Composition of chained source maps.
//!
//! Given an incoming map (original -> intermediate) and a stage map
//! (intermediate -> instrumented), [`compose`] produces one map from the
//! instrumented buffer straight back to the original sources. The
//! intermediate buffer disappears from the chain.
//!
//! Each stage segment is resolved on its own: the intermediate position it
//! points at is floor-matched against the incoming map's segments on the same
//! intermediate line, and the column offset into the matched segment is carried
//! over to the original column. Segments that cannot be resolved are dropped,
//! so a debugger falls back to the nearest preceding mapping instead of a
//! wrong one.

use espower_sourcemap_core::{Position, Segment};
use tracing::{debug, instrument, trace};

use crate::builder::SourceMapBuilder;
use crate::sourcemap::SourceMap;

/// Options controlling composition output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
	/// Carry embedded source content from the incoming map.
	pub sources_content: bool,
}

impl Default for ComposeOptions {
	fn default() -> Self {
		Self {
			sources_content: true,
		}
	}
}

/// An intermediate position resolved through the incoming map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resolved {
	source: u32,
	position: Position,
	name: Option<u32>,
}

/// Resolve an intermediate position against the incoming map.
fn resolve(incoming: &SourceMap, intermediate: Position) -> Option<Resolved> {
	let matched = incoming.lookup(intermediate)?;
	let original = matched.original?;

	// Floor match guarantees the matched column is not past the query
	let delta = intermediate.column - matched.generated.column;
	let column = original.position.column.checked_add(delta)?;

	Some(Resolved {
		source: original.source,
		position: Position {
			line: original.position.line,
			column,
		},
		name: original.name,
	})
}

/// Compose `stage` (intermediate -> instrumented) onto `incoming`
/// (original -> intermediate).
pub fn compose(incoming: &SourceMap, stage: &SourceMap) -> SourceMap {
	compose_with(incoming, stage, ComposeOptions::default())
}

/// Compose with explicit options.
#[instrument(
	skip_all,
	fields(
		incoming_segments = incoming.mapping_count(),
		stage_segments = stage.mapping_count()
	)
)]
pub fn compose_with(incoming: &SourceMap, stage: &SourceMap, options: ComposeOptions) -> SourceMap {
	let mut builder = SourceMapBuilder::new();
	builder.set_file(stage.file());

	let mut dropped = 0usize;

	for segment in stage.segments() {
		let Some(location) = segment.original else {
			builder.add_unmapped(segment.generated);
			continue;
		};

		let Some(resolved) = resolve(incoming, location.position) else {
			trace!(
				generated = %segment.generated,
				intermediate = %location.position,
				"No incoming mapping covers intermediate position"
			);
			dropped += 1;
			continue;
		};

		let Some(source) = incoming.resolved_source(resolved.source) else {
			dropped += 1;
			continue;
		};

		let name = resolved
			.name
			.and_then(|idx| incoming.name(idx))
			.or_else(|| location.name.and_then(|idx| stage.name(idx)));

		builder.add_mapping(segment.generated, &source, resolved.position, name);

		if options.sources_content {
			if let Some(content) = incoming.source_content(resolved.source) {
				let idx = builder.add_source(&source);
				builder.set_source_content(idx, content);
			}
		}
	}

	debug!(
		emitted = builder.segment_count(),
		dropped, "Composed source map"
	);

	builder.build()
}

/// Compose when the incoming map may be absent.
///
/// Without an incoming map the intermediate buffer is the original source,
/// so the stage map is returned with its source relabelled to `original_file`.
pub fn compose_optional(
	incoming: Option<&SourceMap>,
	stage: &SourceMap,
	original_file: &str,
	options: ComposeOptions,
) -> SourceMap {
	match incoming {
		Some(incoming) => compose_with(incoming, stage, options),
		None => {
			debug!(original_file, "No incoming source map, relabelling stage map");
			let relabelled = stage.relabel_source(original_file);
			if options.sources_content {
				relabelled
			} else {
				relabelled.without_sources_content()
			}
		}
	}
}

/// Segments of `composed` paired with their resolved original positions.
///
/// Convenience for comparing maps by what they resolve to rather than by
/// their internal indices.
pub fn resolved_triples(map: &SourceMap) -> Vec<(Position, Option<(String, Position)>)> {
	map.segments()
		.iter()
		.map(|segment: &Segment| {
			let original = segment.original.and_then(|o| {
				map.resolved_source(o.source)
					.map(|source| (source, o.position))
			});
			(segment.generated, original)
		})
		.collect()
}
