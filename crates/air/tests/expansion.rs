// Copyright 2025 Irreducible Inc.

use anyhow::anyhow;
use assert_matches::assert_matches;
use corset_air::{
	builder::{Assignment, Error, GadgetConfig, Register, RegisterRef, Schema, SchemaBuilder, Term},
	expansion::{expand_trace, ExpansionConfig},
	gadgets::{normalise, BitwidthGadget, LexicographicSortingGadget},
	test_utils::{trace_file, validate_system_trace_with_config, ClosureAssignment},
	trace::build_trace,
};
use corset_field::{Field, Fr};
use corset_trace::{lt::TraceFile, ArrayTrace, Column};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Two modules exercising every gadget, with chains of dependent assignments.
fn schema(limitless: bool) -> Schema<Fr> {
	let config = GadgetConfig::default().with_limitless(limitless);
	let mut builder = SchemaBuilder::new().with_config(config);

	let a = builder.new_module("a", 1);
	let mut module = builder.module_mut(a);
	let [key, value] = ["key", "value"].map(|name| module.new_register(Register::input(name, 16)));
	let product = module.new_register(Register::computed("product", 32));
	module.add_assignment(ClosureAssignment::new(
		"product",
		vec![RegisterRef::new(a, key), RegisterRef::new(a, value)],
		vec![RegisterRef::new(a, product)],
		move |trace: &ArrayTrace<Fr>| {
			let module = trace.module(a);
			let (keys, values) = (module.column(key).data(), module.column(value).data());
			Ok(vec![keys.iter().zip(values).map(|(&k, &v)| k * v).collect()])
		},
	));
	module.assert_zero("product", Term::access(product) - Term::access(key) * Term::access(value));
	let nonzero = normalise(Term::access(value), &mut module);
	module.assert_zero("nonzero", Term::access(key) * (Term::one() - nonzero));
	LexicographicSortingGadget::new("sorted", vec![key, value], 16).apply(a, &mut builder);

	let mut gadget = BitwidthGadget::new(&mut builder);
	for register in [key, value] {
		gadget.constrain(RegisterRef::new(a, register), 16);
	}
	gadget.constrain(RegisterRef::new(a, product), 32);

	let b = builder.new_module("b", 2);
	let counter = builder
		.module_mut(b)
		.new_register(Register::input("counter", 12));
	BitwidthGadget::new(&mut builder).constrain(RegisterRef::new(b, counter), 12);
	builder.build()
}

fn input(rng: &mut StdRng) -> TraceFile<Fr> {
	let mut keys = (0..64).map(|_| rng.gen_range(1..1u64 << 16)).collect::<Vec<_>>();
	keys.sort_unstable();
	keys.dedup();
	let values = keys
		.iter()
		.map(|_| rng.gen_range(1..1u64 << 16))
		.collect::<Vec<_>>();
	let counters = (0..32).map(|_| rng.gen_range(0..1u64 << 12)).collect::<Vec<_>>();
	trace_file(&[
		("a", "key", keys.as_slice()),
		("a", "value", values.as_slice()),
		("b", "counter", counters.as_slice()),
	])
}

#[test]
fn test_parallel_expansion_matches_sequential() {
	let mut rng = StdRng::seed_from_u64(0);
	for limitless in [false, true] {
		let schema = schema(limitless);
		let file = input(&mut rng);
		let expected = validate_system_trace_with_config(&ExpansionConfig::sequential(), &schema, &file);

		for batch_size in [1, 2, 1 << 10] {
			let config = ExpansionConfig::parallel(batch_size);
			let trace = validate_system_trace_with_config(&config, &schema, &file);
			assert_eq!(trace, expected, "batch size {batch_size}");
		}
	}
}

#[test]
fn test_assignment_errors_are_propagated() {
	let mut builder = SchemaBuilder::<Fr>::new();
	let m = builder.new_module("m", 1);
	let mut module = builder.module_mut(m);
	let x = module.new_register(Register::input("x", 8));
	let y = module.new_register(Register::computed("y", 8));
	module.add_assignment(ClosureAssignment::new(
		"broken",
		vec![RegisterRef::new(m, x)],
		vec![RegisterRef::new(m, y)],
		|_| Err(anyhow!("no data")),
	));
	let schema = builder.build();

	for config in [ExpansionConfig::sequential(), ExpansionConfig::parallel(4)] {
		let mut trace = build_trace(&schema, &trace_file(&[("m", "x", &[1, 2])])).unwrap();
		let result = expand_trace(&config, &schema, &mut trace);
		assert_matches!(result, Err(Error::Assignment { name, .. }) if name == "broken");
	}
}

#[test]
fn test_failed_wave_keeps_earlier_writes() {
	let mut builder = SchemaBuilder::<Fr>::new();
	let m = builder.new_module("m", 1);
	let mut module = builder.module_mut(m);
	let x = module.new_register(Register::input("x", 8));
	let [y, z, w] = ["y", "z", "w"].map(|name| module.new_register(Register::computed(name, 8)));
	let increment = move |source: usize| {
		move |trace: &ArrayTrace<Fr>| -> anyhow::Result<Vec<Vec<Fr>>> {
			let column = trace.module(m).column(source).data();
			Ok(vec![column.iter().map(|&v| v + Fr::ONE).collect()])
		}
	};
	module.add_assignment(ClosureAssignment::new(
		"first",
		vec![RegisterRef::new(m, x)],
		vec![RegisterRef::new(m, y)],
		increment(x),
	));
	module.add_assignment(ClosureAssignment::new(
		"second",
		vec![RegisterRef::new(m, y)],
		vec![RegisterRef::new(m, z)],
		|_| Err(anyhow!("second wave fails")),
	));
	module.add_assignment(ClosureAssignment::new(
		"sibling",
		vec![RegisterRef::new(m, y)],
		vec![RegisterRef::new(m, w)],
		increment(y),
	));
	let schema = builder.build();

	for config in [ExpansionConfig::sequential(), ExpansionConfig::parallel(4)] {
		let mut trace = build_trace(&schema, &trace_file(&[("m", "x", &[1, 2])])).unwrap();
		let result = expand_trace(&config, &schema, &mut trace);
		assert_matches!(result, Err(Error::Assignment { name, .. }) if name == "second");

		let module = trace.module(m);
		assert_eq!(module.column(y).data(), &vec![Fr::from(2u64), Fr::from(3u64)]);
		assert!(module.column(z).data().is_empty());
		assert!(module.column(w).data().is_empty(), "results of a failed wave are discarded");
	}
}

/// Produces a column under the wrong name.
#[derive(Debug)]
struct Misnamed(RegisterRef);

impl Assignment<Fr> for Misnamed {
	fn name(&self) -> &str {
		"misnamed"
	}

	fn sources(&self) -> Vec<RegisterRef> {
		Vec::new()
	}

	fn targets(&self) -> Vec<RegisterRef> {
		vec![self.0]
	}

	fn compute(&self, _trace: &ArrayTrace<Fr>, _schema: &Schema<Fr>) -> anyhow::Result<Vec<Column<Fr>>> {
		Ok(vec![Column::new("elsewhere", vec![Fr::ONE], Fr::ZERO)])
	}
}

#[test]
#[should_panic(expected = "computed column elsewhere written to register y")]
fn test_misnamed_column_panics() {
	let mut builder = SchemaBuilder::<Fr>::new();
	let m = builder.new_module("m", 1);
	let mut module = builder.module_mut(m);
	let y = module.new_register(Register::computed("y", 8));
	module.add_assignment(Misnamed(RegisterRef::new(m, y)));
	let schema = builder.build();

	let mut trace = build_trace(&schema, &trace_file(&[])).unwrap();
	let _ = expand_trace(&ExpansionConfig::sequential(), &schema, &mut trace);
}
