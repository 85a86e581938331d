// Copyright 2024-2025 Irreducible Inc.

//! Big-endian byte strings representing unsigned integers ("words").
//!
//! Words are kept in minimal form (no leading zero bytes), so zero is the empty string.
//! Arithmetic on words goes through [`num_bigint::BigUint`]; only the byte-level layout helpers
//! used by the trace codec live here.

/// Strips leading zero bytes.
pub fn trim(bytes: &[u8]) -> &[u8] {
	let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
	&bytes[start..]
}

/// Left-pads a word with zero bytes up to `width` bytes.
///
/// ## Preconditions
///
/// * the minimal form of `bytes` fits in `width` bytes
pub fn pad(bytes: &[u8], width: usize) -> Vec<u8> {
	let bytes = trim(bytes);
	assert!(bytes.len() <= width, "word of {} bytes does not fit in {width} bytes", bytes.len());
	let mut padded = vec![0u8; width - bytes.len()];
	padded.extend_from_slice(bytes);
	padded
}
