// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map codec and multi-stage composition for espower instrumentation.
//!
//! This crate provides functionality for:
//! - Parsing and serializing JavaScript source maps (v3)
//! - Encoding and decoding Base64 VLQ mappings
//! - Looking up original positions for generated code
//! - Composing an incoming map with a later stage's map so the final
//!   instrumented code resolves straight back to the original source
//!
//! # Example
//!
//! ```
//! use espower_sourcemap::{compose, Position, SourceMap, SourceMapBuilder};
//!
//! // Map emitted by the dialect compiler (coffee -> js)
//! let incoming: SourceMap = r#"{
//!     "version": 3,
//!     "sources": ["fixture.coffee"],
//!     "names": [],
//!     "mappings": "AAAA,IAAA;;AAAA,IAAA,GAAO;;AACP,MAAA,CAAO,IAAP,EAAa,CAAb"
//! }"#.parse().unwrap();
//!
//! // Map emitted by the instrumentation pass (js -> instrumented js)
//! let mut stage = SourceMapBuilder::new();
//! stage.add_mapping(
//!     Position::new(28, 32).unwrap(),
//!     "fixture.js",
//!     Position::new(5, 7).unwrap(),
//!     None,
//! );
//!
//! let composed = compose(&incoming, &stage.build());
//! let original = composed.original_position_for(28, 32).unwrap();
//! assert_eq!(original.source, "fixture.coffee");
//! assert_eq!((original.line, original.column), (2, 7));
//! ```

pub mod builder;
pub mod compose;
pub mod error;
pub mod mappings;
pub mod sourcemap;
pub mod vlq;

// Re-export main types
pub use builder::SourceMapBuilder;
pub use compose::{compose, compose_optional, compose_with, resolved_triples, ComposeOptions};
pub use error::{Result, SourceMapError};
pub use espower_sourcemap_core::{OriginalLocation, Position, Segment};
pub use mappings::{decode_mappings, encode_mappings, Mappings};
pub use sourcemap::{extract_context, OriginalPosition, SourceMap, SourceMapParts, SOURCE_MAP_VERSION};
pub use vlq::{decode_vlq_segment, encode_vlq, encode_vlq_segment};
