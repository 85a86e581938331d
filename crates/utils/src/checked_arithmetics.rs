// Copyright 2024-2025 Irreducible Inc.

/// Largest power of two that is less than or equal to `val`.
///
/// Fails when `val` is zero, since no power of two satisfies the bound.
pub const fn floor_power_of_two(val: usize) -> usize {
	assert!(val != 0);
	1 << val.ilog2()
}

/// Rounds a byte count up to the nearest machine word width out of 1, 2, 4 or 8 bytes.
///
/// Returns `None` when more than 8 bytes are required.
pub const fn word_width_for_bytes(n_bytes: usize) -> Option<usize> {
	match n_bytes {
		0 | 1 => Some(1),
		2 => Some(2),
		3 | 4 => Some(4),
		5..=8 => Some(8),
		_ => None,
	}
}
