// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The host-facing loader pipeline.
//!
//! One call per file: decode the map the previous pipeline stage attached,
//! run the instrumenter, then compose the instrumenter's map onto the
//! incoming one so the emitted map points at the original sources.

use std::borrow::Cow;

use espower_sourcemap::{compose_optional, ComposeOptions, SourceMap};
use tracing::{debug, instrument, warn};

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::instrument::Instrumenter;

/// Source map handed over by the previous pipeline stage.
#[derive(Debug, Clone, Copy)]
pub enum InputMap<'a> {
	/// v3 JSON text, decoded by the loader.
	Json(&'a str),
	/// An already decoded map.
	Decoded(&'a SourceMap),
}

/// A single file to load.
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
	/// Intermediate source text produced by earlier stages.
	pub source: &'a str,
	/// Path the host identifies the file by.
	pub resource_path: &'a str,
	/// Map from `source` back to the original file, if earlier stages made one.
	pub input_map: Option<InputMap<'a>>,
}

impl<'a> LoadRequest<'a> {
	pub fn new(source: &'a str, resource_path: &'a str) -> Self {
		Self {
			source,
			resource_path,
			input_map: None,
		}
	}

	pub fn with_input_map(mut self, input_map: InputMap<'a>) -> Self {
		self.input_map = Some(input_map);
		self
	}
}

/// Instrumented code and the map back to the original sources.
#[derive(Debug, Clone)]
pub struct LoadOutput {
	pub code: String,
	/// `None` when source maps are disabled.
	pub map: Option<SourceMap>,
}

impl LoadOutput {
	/// The output map as v3 JSON text.
	pub fn map_json(&self) -> Result<Option<String>> {
		self.map
			.as_ref()
			.map(|map| map.to_json_string().map_err(LoaderError::Encode))
			.transpose()
	}
}

/// Instruments files and composes their source maps.
///
/// Holds no per-file state, so one loader can serve concurrent loads.
#[derive(Debug)]
pub struct Loader<I> {
	instrumenter: I,
	config: LoaderConfig,
}

impl<I: Instrumenter> Loader<I> {
	pub fn new(instrumenter: I, config: LoaderConfig) -> Self {
		Self {
			instrumenter,
			config,
		}
	}

	pub fn config(&self) -> &LoaderConfig {
		&self.config
	}

	/// Load one file.
	///
	/// A malformed incoming map fails before the instrumenter runs. An
	/// instrumentation failure is returned as is and nothing is composed.
	#[instrument(
		skip_all,
		fields(resource = request.resource_path, sourcemaps = self.config.sourcemaps)
	)]
	pub fn load(&self, request: LoadRequest<'_>) -> Result<LoadOutput> {
		let incoming = if self.config.sourcemaps {
			decode_input_map(request.input_map)?
		} else {
			None
		};

		let instrumented = self
			.instrumenter
			.instrument(request.source, request.resource_path)?;

		if !self.config.sourcemaps {
			debug!("Source maps disabled, skipping composition");
			return Ok(LoadOutput {
				code: instrumented.code,
				map: None,
			});
		}

		let stage: SourceMap = instrumented.map.parse().map_err(|e| {
			warn!(error = %e, "Failed to decode instrumentation source map");
			LoaderError::StageMap(e)
		})?;
		verify_stage_map(&stage, &instrumented.code, request.resource_path)?;

		let options = ComposeOptions {
			sources_content: self.config.sources_content,
		};
		let map = compose_optional(incoming.as_deref(), &stage, request.resource_path, options);

		debug!(
			composed = incoming.is_some(),
			segments = map.mapping_count(),
			"Loaded file"
		);

		Ok(LoadOutput {
			code: instrumented.code,
			map: Some(map),
		})
	}

	/// Load one file and report the outcome through a completion callback.
	///
	/// The callback receives either an error, or the code with its map.
	pub fn run<F, R>(&self, request: LoadRequest<'_>, callback: F) -> R
	where
		F: FnOnce(Option<LoaderError>, Option<String>, Option<SourceMap>) -> R,
	{
		match self.load(request) {
			Ok(output) => callback(None, Some(output.code), output.map),
			Err(e) => callback(Some(e), None, None),
		}
	}
}

fn decode_input_map(input: Option<InputMap<'_>>) -> Result<Option<Cow<'_, SourceMap>>> {
	match input {
		None => Ok(None),
		Some(InputMap::Decoded(map)) => Ok(Some(Cow::Borrowed(map))),
		Some(InputMap::Json(json)) => match json.parse::<SourceMap>() {
			Ok(map) => Ok(Some(Cow::Owned(map))),
			Err(e) => {
				warn!(error = %e, "Failed to decode incoming source map");
				Err(LoaderError::InputMap(e))
			}
		},
	}
}

/// Check that the stage map describes the buffer the instrumenter returned.
fn verify_stage_map(stage: &SourceMap, code: &str, resource_path: &str) -> Result<()> {
	if let Some(file) = stage.file() {
		if file != resource_path {
			return Err(LoaderError::BufferMismatch {
				expected: resource_path.to_string(),
				actual: file.to_string(),
			});
		}
	}

	let lines = u32::try_from(code.split('\n').count()).unwrap_or(u32::MAX);
	let last_line = stage.mappings().last_line();
	if last_line > lines {
		return Err(LoaderError::GeneratedLineOutOfRange {
			line: last_line,
			lines,
		});
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::instrument::{InstrumentError, Instrumented};
	use espower_sourcemap::{Position, SourceMapBuilder};

	const INCOMING: &str = r#"{
		"version": 3,
		"file": "input.js",
		"sources": ["input.ts"],
		"sourcesContent": ["let a: number = 1"],
		"names": [],
		"mappings": "AAAA,IAAI"
	}"#;

	fn pos(line: u32, column: u32) -> Position {
		Position::new(line, column).unwrap()
	}

	/// Prefixes one recorder line and maps the input line down by one.
	fn prefixing_instrumenter(source: &str, file: &str) -> std::result::Result<Instrumented, InstrumentError> {
		if source.contains("syntax error") {
			return Err(InstrumentError::new(file, "Unexpected token").at(pos(1, 0)));
		}
		let mut builder = SourceMapBuilder::new().file(file);
		builder.add_unmapped(pos(1, 0));
		builder.add_mapping(pos(2, 0), file, pos(1, 0), None);
		builder.add_mapping(pos(2, 4), file, pos(1, 4), Some("a"));
		let code = format!("var _rec = new Recorder();\n{source}\n");
		Ok(Instrumented::from_map(code, &builder.build()).unwrap())
	}

	fn loader() -> Loader<impl Instrumenter> {
		Loader::new(prefixing_instrumenter, LoaderConfig::default())
	}

	#[test]
	fn composes_onto_incoming_map() {
		let request = LoadRequest::new("var a = 1", "input.js").with_input_map(InputMap::Json(INCOMING));
		let output = loader().load(request).unwrap();

		assert!(output.code.starts_with("var _rec"));
		let map = output.map.unwrap();
		assert_eq!(map.file(), Some("input.js"));
		assert_eq!(map.sources(), ["input.ts".to_string()]);
		assert_eq!(map.sources_content(), [Some("let a: number = 1".to_string())]);

		let original = map.original_position_for(2, 4).unwrap();
		assert_eq!(original.source, "input.ts");
		assert_eq!(original.position(), pos(1, 4));
		assert_eq!(original.name.as_deref(), Some("a"));
		assert!(map.original_position_for(1, 0).is_none());
	}

	#[test]
	fn decoded_input_map_is_borrowed() {
		let incoming: SourceMap = INCOMING.parse().unwrap();
		let request =
			LoadRequest::new("var a = 1", "input.js").with_input_map(InputMap::Decoded(&incoming));
		let map = loader().load(request).unwrap().map.unwrap();
		assert_eq!(map.original_position_for(2, 0).unwrap().source, "input.ts");
	}

	#[test]
	fn absent_input_map_returns_stage_map() {
		let output = loader().load(LoadRequest::new("var a = 1", "input.js")).unwrap();
		let stage: SourceMap = prefixing_instrumenter("var a = 1", "input.js")
			.unwrap()
			.map
			.parse()
			.unwrap();
		assert_eq!(output.map, Some(stage));
	}

	#[test]
	fn malformed_input_map_skips_instrumentation() {
		let instrumenter = |_: &str, file: &str| -> std::result::Result<Instrumented, InstrumentError> {
			Err(InstrumentError::new(file, "must not run"))
		};
		let loader = Loader::new(instrumenter, LoaderConfig::default());
		let request =
			LoadRequest::new("var a = 1", "input.js").with_input_map(InputMap::Json("{\"version\": 3,"));

		let err = loader.load(request).unwrap_err();
		assert!(matches!(err, LoaderError::InputMap(_)));
	}

	#[test]
	fn instrumentation_error_is_propagated() {
		let request = LoadRequest::new("syntax error", "input.js").with_input_map(InputMap::Json(INCOMING));
		let err = loader().load(request).unwrap_err();

		match &err {
			LoaderError::Instrumentation(e) => {
				assert_eq!(e.file, "input.js");
				assert_eq!(e.position, Some(pos(1, 0)));
			}
			other => panic!("unexpected error: {other}"),
		}
		assert_eq!(err.to_string(), "failed to instrument input.js: Unexpected token");
		assert!(!err.is_precondition_violation());
	}

	#[test]
	fn undecodable_stage_map() {
		let instrumenter = |source: &str, _: &str| -> std::result::Result<Instrumented, InstrumentError> {
			Ok(Instrumented {
				code: source.to_string(),
				map: r#"{"version": 3, "sources": [], "names": [], "mappings": "A$"}"#.to_string(),
			})
		};
		let loader = Loader::new(instrumenter, LoaderConfig::default());
		let err = loader.load(LoadRequest::new("x", "input.js")).unwrap_err();
		assert!(matches!(err, LoaderError::StageMap(_)));
	}

	#[test]
	fn stage_map_for_another_buffer() {
		let instrumenter = |source: &str, _: &str| -> std::result::Result<Instrumented, InstrumentError> {
			let mut builder = SourceMapBuilder::new().file("stale.js");
			builder.add_mapping(pos(1, 0), "stale.js", pos(1, 0), None);
			Ok(Instrumented::from_map(source, &builder.build()).unwrap())
		};
		let loader = Loader::new(instrumenter, LoaderConfig::default());
		let err = loader.load(LoadRequest::new("var a = 1", "input.js")).unwrap_err();

		assert!(err.is_precondition_violation());
		assert_eq!(
			err.to_string(),
			"instrumentation source map describes stale.js, expected input.js"
		);
	}

	#[test]
	fn stage_map_past_end_of_code() {
		let instrumenter = |source: &str, file: &str| -> std::result::Result<Instrumented, InstrumentError> {
			let mut builder = SourceMapBuilder::new();
			builder.add_mapping(pos(3, 0), file, pos(1, 0), None);
			Ok(Instrumented::from_map(source, &builder.build()).unwrap())
		};
		let loader = Loader::new(instrumenter, LoaderConfig::default());
		let err = loader.load(LoadRequest::new("one\ntwo", "input.js")).unwrap_err();

		assert!(matches!(
			err,
			LoaderError::GeneratedLineOutOfRange { line: 3, lines: 2 }
		));
	}

	#[test]
	fn disabled_sourcemaps_skip_all_map_work() {
		let config = LoaderConfig {
			sourcemaps: false,
			..LoaderConfig::default()
		};
		let loader = Loader::new(prefixing_instrumenter, config);
		// Even a malformed incoming map is ignored
		let request =
			LoadRequest::new("var a = 1", "input.js").with_input_map(InputMap::Json("not json"));

		let output = loader.load(request).unwrap();
		assert!(output.map.is_none());
		assert_eq!(output.map_json().unwrap(), None);
		assert!(output.code.ends_with("var a = 1\n"));
	}

	#[test]
	fn sources_content_can_be_dropped() {
		let config = LoaderConfig {
			sources_content: false,
			..LoaderConfig::default()
		};
		let loader = Loader::new(prefixing_instrumenter, config);
		let request = LoadRequest::new("var a = 1", "input.js").with_input_map(InputMap::Json(INCOMING));

		let map = loader.load(request).unwrap().map.unwrap();
		assert!(!map.has_sources_content());
		assert!(!map.to_json_string().unwrap().contains("sourcesContent"));
	}

	#[test]
	fn run_reports_through_callback() {
		let loader = loader();

		let request = LoadRequest::new("var a = 1", "input.js").with_input_map(InputMap::Json(INCOMING));
		let sources = loader.run(request, |err, code, map| {
			assert!(err.is_none());
			assert!(code.is_some());
			map.map(|m| m.sources().to_vec())
		});
		assert_eq!(sources, Some(vec!["input.ts".to_string()]));

		let request = LoadRequest::new("syntax error", "input.js");
		loader.run(request, |err, code, map| {
			assert!(matches!(err, Some(LoaderError::Instrumentation(_))));
			assert!(code.is_none());
			assert!(map.is_none());
		});
	}

	#[test]
	fn concurrent_loads_share_one_loader() {
		let loader = loader();
		let incoming: SourceMap = INCOMING.parse().unwrap();

		let maps: Vec<SourceMap> = std::thread::scope(|scope| {
			let handles: Vec<_> = (0..8)
				.map(|_| {
					scope.spawn(|| {
						let request = LoadRequest::new("var a = 1", "input.js")
							.with_input_map(InputMap::Decoded(&incoming));
						loader.load(request).unwrap().map.unwrap()
					})
				})
				.collect();
			handles.into_iter().map(|h| h.join().unwrap()).collect()
		});

		assert!(maps.windows(2).all(|w| w[0] == w[1]));
	}
}
