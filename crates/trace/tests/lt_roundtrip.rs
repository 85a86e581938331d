// Copyright 2025 Irreducible Inc.

use assert_matches::assert_matches;
use corset_field::{Field, Fr};
use corset_trace::{
	lt::{RawColumn, RawModule, TraceFile, HEAP_MAJOR_VERSION, MAGIC},
	Error,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn value_strategy() -> impl Strategy<Value = Fr> {
	prop_oneof![
		(0u64..4).prop_map(Fr::from),
		any::<u16>().prop_map(|v| Fr::from(v as u64)),
		any::<u64>().prop_map(Fr::from),
		any::<u64>().prop_map(|v| -Fr::from(v)),
	]
}

fn module_strategy(index: usize) -> impl Strategy<Value = RawModule<Fr>> {
	(0usize..6, 1usize..4).prop_flat_map(move |(height, ncols)| {
		proptest::collection::vec(proptest::collection::vec(value_strategy(), height), ncols).prop_map(
			move |columns| {
				let name = if index == 0 { String::new() } else { format!("mod{index}") };
				let columns = columns
					.into_iter()
					.enumerate()
					.map(|(i, data)| RawColumn::new(format!("col{i}"), 254, data))
					.collect();
				RawModule {
					name,
					height,
					columns,
				}
			},
		)
	})
}

fn trace_strategy() -> impl Strategy<Value = Vec<RawModule<Fr>>> {
	(1usize..4).prop_flat_map(|n| (0..n).map(module_strategy).collect::<Vec<_>>())
}

proptest! {
	#[test]
	fn test_heap_roundtrip(modules in trace_strategy()) {
		let file = TraceFile::new(modules).with_metadata(b"{\"tool\":\"test\"}".to_vec());
		let bytes = file.to_bytes().unwrap();
		prop_assert!(TraceFile::<Fr>::is_trace_file(&bytes));
		prop_assert_eq!(TraceFile::from_bytes(&bytes).unwrap(), file);
	}

	#[test]
	fn test_legacy_roundtrip(modules in trace_strategy()) {
		let file = TraceFile::legacy(modules);
		let decoded = TraceFile::<Fr>::from_bytes(&file.to_bytes().unwrap()).unwrap();
		prop_assert_eq!(&decoded.header, &file.header);
		prop_assert_eq!(decoded.modules.len(), file.modules.len());
		for (actual, expected) in decoded.modules.iter().zip(&file.modules) {
			prop_assert_eq!(&actual.name, &expected.name);
			prop_assert_eq!(actual.height, expected.height);
			let actual = actual.columns.iter().map(|c| (&c.name, &c.data)).collect::<Vec<_>>();
			let expected = expected.columns.iter().map(|c| (&c.name, &c.data)).collect::<Vec<_>>();
			prop_assert_eq!(actual, expected);
		}
	}
}

#[test]
fn test_heap_format_shrinks_repeated_wide_values() {
	let mut rng = StdRng::seed_from_u64(0);
	let wide = [-Fr::ONE, -Fr::from(2u64), -Fr::from(3u64)];
	let data = (0..1024).map(|_| wide[rng.gen_range(0..3)]).collect::<Vec<_>>();
	let modules = vec![RawModule::new("m", vec![RawColumn::new("x", 254, data)])];

	let heap = TraceFile::new(modules.clone()).to_bytes().unwrap();
	let legacy = TraceFile::legacy(modules).to_bytes().unwrap();
	assert!(heap.len() * 8 < legacy.len());
}

#[test]
fn test_rejects_newer_major_version() {
	let mut bytes = TraceFile::<Fr>::new(vec![]).to_bytes().unwrap();
	assert_eq!(&bytes[..8], &MAGIC);
	bytes[9] = (HEAP_MAJOR_VERSION + 1) as u8;
	assert_matches!(
		TraceFile::<Fr>::from_bytes(&bytes),
		Err(Error::IncompatibleVersion {
			expected_major: 2,
			major: 3,
			..
		})
	);
}

#[test]
fn test_rejects_non_trace_files() {
	let bytes = b"PK\x03\x04 definitely not a trace";
	assert!(!TraceFile::<Fr>::is_trace_file(bytes));
	assert_matches!(TraceFile::<Fr>::from_bytes(bytes), Err(Error::InvalidMagic(_)));
}

#[test]
fn test_oversized_column_count_is_an_error() {
	let mut bytes = TraceFile::<Fr>::legacy(vec![]).to_bytes().unwrap();
	let count = bytes.len() - 4;
	bytes[count..].copy_from_slice(&u32::MAX.to_be_bytes());
	bytes.extend_from_slice(&[0; 4]);
	assert_eq!(bytes.len(), 24);
	assert_matches!(
		TraceFile::<Fr>::from_bytes(&bytes),
		Err(Error::CountExceedsData { available: 4, .. })
	);
}
