// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for espower source map composition.
//!
//! This crate provides the value types shared by the source map codec
//! (`espower-sourcemap`) and the build loader (`espower-loader`).
//!
//! # Overview
//!
//! A source map is modelled as an ordered sequence of [`Segment`]s. Each
//! segment ties a generated [`Position`] to an optional [`OriginalLocation`]
//! (source index, original position, optional name index). Positions use
//! 1-based lines and 0-based columns, matching what debuggers and stack
//! traces display.

pub mod error;
pub mod position;
pub mod segment;

pub use error::{CoreError, Result};
pub use position::Position;
pub use segment::{OriginalLocation, Segment};
