// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! VLQ (Variable-Length Quantity) codec for source map mappings.
//!
//! Source maps use Base64 VLQ encoding for compact storage of line/column mappings.
//! This module encodes and decodes individual values following the source map v3 spec;
//! the delta state across segments lives in [`crate::mappings`].

use crate::error::{Result, SourceMapError};

/// Base64 character set used in VLQ encoding.
const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Continuation bit is the 6th bit.
const CONTINUATION_BIT: u8 = 0b100000;
const DIGIT_MASK: u8 = 0b011111;

/// Largest shift accepted before a value is considered overflowing.
const MAX_SHIFT: u32 = 60;

/// Decode a Base64 character to its 6-bit value.
fn decode_char(ch: u8) -> Result<u8> {
	BASE64_CHARS
		.iter()
		.position(|&c| c == ch)
		.map(|pos| pos as u8)
		.ok_or_else(|| SourceMapError::InvalidVlqChar(ch as char))
}

/// Decode a VLQ-encoded segment into a vector of signed integers.
///
/// Each segment represents one or more values:
/// - Minimum 1 value: generated column offset
/// - Optional 4 more values: source index, original line, original column, name index
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i64>> {
	let mut values = Vec::with_capacity(5);
	let mut value = 0i64;
	let mut shift = 0u32;
	let mut pending = false;

	for ch in segment.bytes() {
		let digit = decode_char(ch)?;

		if shift >= MAX_SHIFT {
			return Err(SourceMapError::VlqOverflow(segment.to_string()));
		}

		let continuation = digit & CONTINUATION_BIT != 0;
		value += i64::from(digit & DIGIT_MASK) << shift;
		shift += 5;

		if continuation {
			pending = true;
			continue;
		}

		// The lowest bit carries the sign: 1 = negative, 0 = positive
		let negated = value & 1 != 0;
		value >>= 1;
		if negated {
			value = -value;
		}
		values.push(value);
		value = 0;
		shift = 0;
		pending = false;
	}

	if pending {
		return Err(SourceMapError::TruncatedVlq(segment.to_string()));
	}

	Ok(values)
}

/// Append the VLQ encoding of `value` to `out`.
pub fn encode_vlq(value: i64, out: &mut String) {
	let mut vlq = if value < 0 {
		(value.unsigned_abs() << 1) | 1
	} else {
		(value as u64) << 1
	};

	loop {
		let mut digit = (vlq & u64::from(DIGIT_MASK)) as u8;
		vlq >>= 5;
		if vlq > 0 {
			digit |= CONTINUATION_BIT;
		}
		out.push(BASE64_CHARS[digit as usize] as char);
		if vlq == 0 {
			break;
		}
	}
}

/// Encode a full segment of values.
pub fn encode_vlq_segment(values: &[i64]) -> String {
	let mut out = String::new();
	for &value in values {
		encode_vlq(value, &mut out);
	}
	out
}
