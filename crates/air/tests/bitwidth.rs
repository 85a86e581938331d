// Copyright 2025 Irreducible Inc.

use assert_matches::assert_matches;
use corset_air::{
	builder::{Error, GadgetConfig, Register, RegisterRef, Schema, SchemaBuilder},
	expansion::ExpansionConfig,
	gadgets::BitwidthGadget,
	test_utils::{expand_and_check, trace_file, validate_system_trace},
};
use corset_field::Fr;
use proptest::prelude::*;

/// A module with one input register `x`, constrained to `bitwidth` bits.
fn schema(declared: usize, bitwidth: usize, config: GadgetConfig) -> Schema<Fr> {
	let mut builder = SchemaBuilder::new().with_config(config);
	let m = builder.new_module("m", 1);
	let x = builder.module_mut(m).new_register(Register::input("x", declared));
	BitwidthGadget::new(&mut builder).constrain(RegisterRef::new(m, x), bitwidth);
	builder.build()
}

fn configs() -> [GadgetConfig; 2] {
	[
		GadgetConfig::default(),
		GadgetConfig::default().with_limitless(true),
	]
}

fn mask(bitwidth: usize) -> u64 {
	if bitwidth >= 64 {
		u64::MAX
	} else {
		(1 << bitwidth) - 1
	}
}

#[test]
fn test_binary() {
	for config in configs() {
		let schema = schema(1, 1, config);
		validate_system_trace(&schema, &trace_file(&[("m", "x", &[0, 1, 1, 0])]));

		let (_, errors, failures) =
			expand_and_check(&ExpansionConfig::sequential(), &schema, &trace_file(&[("m", "x", &[0, 2])]))
				.unwrap();
		assert_eq!(errors.len(), 1);
		assert_matches!(
			&errors[0],
			Error::ValueOutOfRange { column, row: 1, value, bitwidth: 1 } if column == "m.x" && value == "2"
		);
		assert_eq!(failures.len(), 1);
		assert_eq!(failures[0].handle(), "x:u1");
	}
}

#[test]
fn test_byte_decomposition_layout() {
	let schema = schema(20, 20, GadgetConfig::default());
	let trace = validate_system_trace(&schema, &trace_file(&[("m", "x", &[0xabcde, 0x12345])]));

	let module = trace.module(0);
	let limbs = (1..4)
		.map(|i| module.column(i).data().clone())
		.collect::<Vec<_>>();
	let expected = [[0xdeu64, 0x45], [0xbc, 0x23], [0xa, 0x1]]
		.map(|limb| limb.map(Fr::from).to_vec())
		.to_vec();
	assert_eq!(limbs, expected);
}

#[test]
fn test_type_proof_modules_hold_distinct_values() {
	let config = GadgetConfig::default().with_limitless(true);
	let schema = schema(32, 32, config);
	let trace = validate_system_trace(
		&schema,
		&trace_file(&[("m", "x", &[70000, 5, 70000, 0x1234_5678])]),
	);

	let u32_module = schema.has_module("u32").unwrap();
	let module = trace.module(u32_module);
	assert_eq!(module.height(), 3);
	assert_eq!(
		module.column(0).data(),
		&vec![Fr::from(5u64), Fr::from(70000u64), Fr::from(0x1234_5678u64)]
	);
	assert_eq!(
		module.column(2).data(),
		&vec![Fr::from(0u64), Fr::from(1u64), Fr::from(0x1234u64)]
	);
}

#[test]
fn test_value_out_of_range_is_reported() {
	let schema = schema(12, 12, GadgetConfig::default());
	for config in [ExpansionConfig::sequential(), ExpansionConfig::parallel(4)] {
		let (_, errors, failures) =
			expand_and_check(&config, &schema, &trace_file(&[("m", "x", &[1, 4096, 4097])])).unwrap();

		assert_eq!(errors.len(), 1);
		assert_matches!(
			&errors[0],
			Error::ValueOutOfRange { column, row: 1, value, bitwidth: 12 }
				if column == "m.x" && value == "4096"
		);
		assert_eq!(failures.len(), 1);
		assert_eq!(failures[0].handle(), "x:u12");
	}
}

#[test]
fn test_parallel_validation_reports_every_column() {
	let mut builder = SchemaBuilder::<Fr>::new();
	let m = builder.new_module("m", 1);
	let mut module = builder.module_mut(m);
	for name in ["a", "b", "c"] {
		module.new_register(Register::input(name, 4));
	}
	let schema = builder.build();
	let file = trace_file(&[("m", "a", &[1, 16]), ("m", "b", &[2, 3]), ("m", "c", &[99, 100])]);

	let (_, errors, _) = expand_and_check(&ExpansionConfig::parallel(2), &schema, &file).unwrap();
	let columns = errors
		.iter()
		.map(|error| match error {
			Error::ValueOutOfRange { column, row, .. } => (column.as_str(), *row),
			other => panic!("unexpected error {other}"),
		})
		.collect::<Vec<_>>();
	assert_eq!(columns, vec![("m.a", 1), ("m.c", 0)]);
}

/// `x` is declared 64 bits wide and constrained to each of `bitwidths` in turn.
fn schema_with_repeated_constraints(bitwidths: &[usize]) -> Schema<Fr> {
	let mut builder = SchemaBuilder::new();
	let m = builder.new_module("m", 1);
	let x = builder.module_mut(m).new_register(Register::input("x", 64));
	let mut gadget = BitwidthGadget::new(&mut builder);
	for &bitwidth in bitwidths {
		gadget.constrain(RegisterRef::new(m, x), bitwidth);
	}
	builder.build()
}

#[test]
fn test_narrower_byte_constraint_is_enforced() {
	let schema = schema_with_repeated_constraints(&[20, 12]);
	assert_eq!(schema.module(0).width(), 4, "limbs are shared between both widths");
	validate_system_trace(&schema, &trace_file(&[("m", "x", &[0, 4095])]));

	let (_, errors, failures) =
		expand_and_check(&ExpansionConfig::sequential(), &schema, &trace_file(&[("m", "x", &[4096])]))
			.unwrap();
	assert!(errors.is_empty(), "{errors:?}");
	let handles = failures.iter().map(|f| f.handle()).collect::<Vec<_>>();
	assert_eq!(handles, vec!["x'1:u4"]);

	let (_, _, failures) =
		expand_and_check(&ExpansionConfig::sequential(), &schema, &trace_file(&[("m", "x", &[1 << 16])]))
			.unwrap();
	let handles = failures.iter().map(|f| f.handle()).collect::<Vec<_>>();
	assert_eq!(handles, vec!["x'2:u0"]);
}

#[test]
fn test_wider_byte_constraint_is_implied() {
	let narrow = schema_with_repeated_constraints(&[12]);
	let both = schema_with_repeated_constraints(&[12, 20]);
	assert_eq!(
		both.constraints().count(),
		narrow.constraints().count(),
		"a wider request adds nothing"
	);

	let (_, _, failures) =
		expand_and_check(&ExpansionConfig::sequential(), &both, &trace_file(&[("m", "x", &[4096])]))
			.unwrap();
	assert!(!failures.is_empty());
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(32))]

	#[test]
	fn test_values_within_bitwidth_are_accepted(
		bitwidth in 2usize..=64,
		values in prop::collection::vec(any::<u64>(), 1..16),
		limitless in any::<bool>(),
	) {
		let config = GadgetConfig::default().with_limitless(limitless);
		let schema = schema(bitwidth, bitwidth, config);
		let values = values.into_iter().map(|v| v & mask(bitwidth)).collect::<Vec<_>>();

		let (_, errors, failures) =
			expand_and_check(&ExpansionConfig::sequential(), &schema, &trace_file(&[("m", "x", values.as_slice())]))
				.unwrap();
		prop_assert!(errors.is_empty(), "{:?}", errors);
		prop_assert!(failures.is_empty(), "{:?}", failures);
	}

	#[test]
	fn test_values_beyond_bitwidth_are_rejected(
		bitwidth in 2usize..=63,
		values in prop::collection::vec(any::<u64>(), 1..16),
		excess in any::<u64>(),
		position in any::<prop::sample::Index>(),
		limitless in any::<bool>(),
	) {
		let config = GadgetConfig::default().with_limitless(limitless);
		// The register is declared wide so validation does not mask the gadget's constraints.
		let schema = schema(64, bitwidth, config);
		let mut values = values.into_iter().map(|v| v & mask(bitwidth)).collect::<Vec<_>>();
		let bad = position.index(values.len());
		values[bad] = excess | (1 << bitwidth);

		let (_, _, failures) =
			expand_and_check(&ExpansionConfig::sequential(), &schema, &trace_file(&[("m", "x", values.as_slice())]))
				.unwrap();
		prop_assert!(!failures.is_empty());
	}
}
