// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build loader that instruments assertions and keeps source maps intact.
//!
//! The loader sits after other transforms in a build pipeline. It receives
//! already transformed code plus the map emitted by the previous stage, runs
//! an [`Instrumenter`] over the code, and composes the instrumenter's map onto
//! the incoming one. Stack traces and debuggers then point at the original
//! sources rather than the intermediate buffer.
//!
//! # Example
//!
//! ```
//! use espower_loader::{
//!     InputMap, InstrumentError, Instrumented, LoadRequest, Loader, LoaderConfig,
//! };
//! use espower_sourcemap::{Position, SourceMapBuilder};
//!
//! let instrumenter = |source: &str, file: &str| -> Result<Instrumented, InstrumentError> {
//!     let mut map = SourceMapBuilder::new().file(file);
//!     map.add_mapping(Position::new(1, 0).unwrap(), file, Position::new(1, 0).unwrap(), None);
//!     Instrumented::from_map(source, &map.build())
//!         .map_err(|e| InstrumentError::new(file, e.to_string()))
//! };
//!
//! let loader = Loader::new(instrumenter, LoaderConfig::default());
//! let incoming = r#"{"version":3,"sources":["app.ts"],"names":[],"mappings":"AAAA"}"#;
//! let request = LoadRequest::new("assert(ok)", "app.js").with_input_map(InputMap::Json(incoming));
//!
//! let output = loader.load(request).unwrap();
//! let original = output.map.unwrap().original_position_for(1, 0).unwrap();
//! assert_eq!(original.source, "app.ts");
//! ```

pub mod config;
pub mod error;
pub mod instrument;
pub mod loader;
pub mod logging;

pub use config::{load_config, load_config_with_file, LoaderConfig, LoggingConfig};
pub use error::{ConfigError, LoaderError, Result};
pub use instrument::{InstrumentError, Instrumented, Instrumenter};
pub use loader::{InputMap, LoadOutput, LoadRequest, Loader};
pub use logging::init_logging;
