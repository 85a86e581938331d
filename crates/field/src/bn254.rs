// Copyright 2024-2025 Irreducible Inc.

use ark_ff::{BigInteger, MontFp, PrimeField};

use crate::{word, Field};

/// The scalar field of the BN254 curve.
pub type Fr = ark_bn254::Fr;

impl Field for Fr {
	const ZERO: Self = MontFp!("0");
	const ONE: Self = MontFp!("1");
	const MODULUS_BITS: usize = <Fr as PrimeField>::MODULUS_BIT_SIZE as usize;

	fn invert(&self) -> Option<Self> {
		ark_ff::Field::inverse(self)
	}

	fn from_be_bytes(bytes: &[u8]) -> Self {
		match word::trim(bytes) {
			[] => Self::ZERO,
			bytes => Fr::from_be_bytes_mod_order(bytes),
		}
	}

	fn to_be_bytes(&self) -> Vec<u8> {
		word::trim(&self.into_bigint().to_bytes_be()).to_vec()
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn test_constants() {
		assert!(Fr::ZERO.is_zero());
		assert_eq!(Fr::ONE, Fr::from(1u64));
		assert_eq!(Fr::MODULUS_BITS, 254);
		assert_eq!(Fr::pow2(0), Fr::ONE);
		assert_eq!(Fr::pow2(8), Fr::from(256u64));
		assert_eq!(Fr::pow2(63), Fr::from(1u64 << 63));
	}

	#[test]
	fn test_bytes() {
		assert!(Fr::ZERO.to_be_bytes().is_empty());
		assert_eq!(Fr::from(0x1234u64).to_be_bytes(), vec![0x12, 0x34]);
		assert_eq!(Fr::from_be_bytes(&[0, 0, 0x12, 0x34]), Fr::from(0x1234u64));
		assert_eq!(Fr::from(255u64).bit_len(), 8);
		assert!(Fr::from(255u64).fits_in(8));
		assert!(!Fr::from(256u64).fits_in(8));
	}

	#[test]
	fn test_decimal_and_split() {
		assert_eq!(Fr::ZERO.to_decimal(), "0");
		assert_eq!(Fr::from(255u64).to_decimal(), "255");
		assert_eq!(Fr::from(u64::MAX).to_decimal(), u64::MAX.to_string());
		assert_eq!(Fr::ZERO.bit_len(), 0);
		assert_eq!(Fr::from(0x1234u64).split(4), (Fr::from(0x4u64), Fr::from(0x123u64)));
		assert_eq!(Fr::from(0x1234u64).split(8), (Fr::from(0x34u64), Fr::from(0x12u64)));
		assert_eq!(Fr::from(5u64).split(16), (Fr::from(5u64), Fr::ZERO));
	}

	#[test]
	fn test_negative_values_are_wide() {
		let minus_one = -Fr::ONE;
		assert_eq!(minus_one.bit_len(), 254);
		assert_eq!(Fr::from_be_bytes(&minus_one.to_be_bytes()), minus_one);
	}

	#[test]
	fn test_invert() {
		assert_eq!(Fr::ZERO.invert(), None);
		assert_eq!(Fr::ZERO.invert_or_zero(), Fr::ZERO);
		let x = Fr::from(12345u64);
		assert_eq!(x * x.invert().unwrap(), Fr::ONE);
	}

	proptest! {
		#[test]
		fn test_split_recombines(v in any::<u64>(), lo_bits in 1usize..64) {
			let x = Fr::from(v);
			let (lo, hi) = x.split(lo_bits);
			prop_assert_eq!(lo + Fr::pow2(lo_bits) * hi, x);
			prop_assert!(lo.fits_in(lo_bits));
		}

		#[test]
		fn test_split_matches_integer_ops(v in any::<u64>(), lo_bits in 1usize..64) {
			let (lo, hi) = Fr::from(v).split(lo_bits);
			prop_assert_eq!(lo, Fr::from(v & ((1u64 << lo_bits) - 1)));
			prop_assert_eq!(hi, Fr::from(v >> lo_bits));
		}

		#[test]
		fn test_ordering_follows_integers(a in any::<u64>(), b in any::<u64>()) {
			prop_assert_eq!(Fr::from(a).cmp(&Fr::from(b)), a.cmp(&b));
		}
	}
}
