// Copyright 2024-2025 Irreducible Inc.

use std::{
	fmt::{Debug, Display},
	hash::Hash,
	iter::{Product, Sum},
	ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use num_bigint::BigUint;

/// A prime field whose elements are stored in trace columns.
///
/// Elements are totally ordered by their canonical integer representative, which is what
/// bit-width validation and lexicographic comparisons use.
pub trait Field:
	Sized
	+ Eq
	+ Ord
	+ Copy
	+ Clone
	+ Default
	+ Send
	+ Sync
	+ Debug
	+ Display
	+ Hash
	+ 'static
	+ From<u64>
	+ Neg<Output = Self>
	+ Add<Output = Self>
	+ Sub<Output = Self>
	+ Mul<Output = Self>
	+ Sum
	+ Product
	+ AddAssign
	+ SubAssign
	+ MulAssign
{
	/// The zero element of the field, the additive identity.
	const ZERO: Self;

	/// The one element of the field, the multiplicative identity.
	const ONE: Self;

	/// Number of bits in the modulus. Every canonical representative fits in this many bits.
	const MODULUS_BITS: usize;

	/// Returns true iff this element is zero.
	fn is_zero(&self) -> bool {
		*self == Self::ZERO
	}

	/// Computes the multiplicative inverse of this element,
	/// failing if the element is zero.
	fn invert(&self) -> Option<Self>;

	/// Computes the multiplicative inverse, mapping zero to zero.
	fn invert_or_zero(&self) -> Self {
		self.invert().unwrap_or(Self::ZERO)
	}

	/// Interprets big-endian bytes as an integer and reduces it modulo the field order.
	fn from_be_bytes(bytes: &[u8]) -> Self;

	/// Minimal big-endian encoding of the canonical representative (empty for zero).
	fn to_be_bytes(&self) -> Vec<u8>;

	/// The canonical representative as an unsigned integer.
	fn to_biguint(&self) -> BigUint {
		BigUint::from_bytes_be(&self.to_be_bytes())
	}

	/// Reduces an unsigned integer modulo the field order.
	fn from_biguint(value: &BigUint) -> Self {
		Self::from_be_bytes(&value.to_bytes_be())
	}

	/// Number of significant bits of the canonical representative.
	fn bit_len(&self) -> usize {
		self.to_biguint().bits() as usize
	}

	/// Returns true iff the canonical representative is strictly less than `2^bitwidth`.
	fn fits_in(&self, bitwidth: usize) -> bool {
		self.bit_len() <= bitwidth
	}

	/// Decimal rendering of the canonical representative.
	fn to_decimal(&self) -> String {
		self.to_biguint().to_string()
	}

	/// Returns `2^n`.
	fn pow2(n: usize) -> Self {
		Self::from_biguint(&(BigUint::from(1u8) << n))
	}

	/// Splits the canonical representative into `(v mod 2^lo_bits, v >> lo_bits)`.
	fn split(&self, lo_bits: usize) -> (Self, Self) {
		let value = self.to_biguint();
		let mask = (BigUint::from(1u8) << lo_bits) - 1u8;
		(Self::from_biguint(&(&value & mask)), Self::from_biguint(&(value >> lo_bits)))
	}
}
