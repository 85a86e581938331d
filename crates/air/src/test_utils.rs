// Copyright 2025 Irreducible Inc.

//! Utilities for testing schemas and gadgets.

use std::fmt;

use anyhow::Result;
use corset_field::Field;
use corset_trace::{
	lt::{RawColumn, RawModule, TraceFile},
	ArrayTrace, Column,
};
use corset_utils::{env::boolean_env_flag_set, tracing::init_tracing};

use crate::{
	builder::{Assignment, Error, Failure, RegisterRef, Schema},
	expansion::{expand_trace, ExpansionConfig},
	trace::build_trace,
	validation::{check_constraints, validate_trace},
};

/// An easy-to-use implementation of [`Assignment`] that is constructed with a closure returning
/// the data of each target.
///
/// Using this [`Assignment`] implementation carries some overhead, so it is best to use it only
/// for testing.
#[allow(clippy::type_complexity)]
pub struct ClosureAssignment<F: Field> {
	name: String,
	sources: Vec<RegisterRef>,
	targets: Vec<RegisterRef>,
	compute: Box<dyn Fn(&ArrayTrace<F>) -> Result<Vec<Vec<F>>> + Send + Sync>,
}

impl<F: Field> ClosureAssignment<F> {
	pub fn new(
		name: impl ToString,
		sources: Vec<RegisterRef>,
		targets: Vec<RegisterRef>,
		compute: impl Fn(&ArrayTrace<F>) -> Result<Vec<Vec<F>>> + Send + Sync + 'static,
	) -> Self {
		Self {
			name: name.to_string(),
			sources,
			targets,
			compute: Box::new(compute),
		}
	}
}

impl<F: Field> fmt::Debug for ClosureAssignment<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClosureAssignment")
			.field("name", &self.name)
			.field("sources", &self.sources)
			.field("targets", &self.targets)
			.finish_non_exhaustive()
	}
}

impl<F: Field> Assignment<F> for ClosureAssignment<F> {
	fn name(&self) -> &str {
		&self.name
	}

	fn sources(&self) -> Vec<RegisterRef> {
		self.sources.clone()
	}

	fn targets(&self) -> Vec<RegisterRef> {
		self.targets.clone()
	}

	fn compute(&self, trace: &ArrayTrace<F>, schema: &Schema<F>) -> Result<Vec<Column<F>>> {
		let data = (self.compute)(trace)?;
		Ok(self
			.targets
			.iter()
			.zip(data)
			.map(|(&target, data)| {
				let register = schema.register(target);
				Column::new(register.name(), data, register.padding())
			})
			.collect())
	}
}

/// Builds a trace file from `(module, column, values)` triples, grouping columns by module in
/// order of first appearance.
pub fn trace_file<F: Field>(columns: &[(&str, &str, &[u64])]) -> TraceFile<F> {
	let mut modules: Vec<(String, Vec<RawColumn<F>>)> = Vec::new();
	for &(module, column, values) in columns {
		let data = values.iter().map(|&v| F::from(v)).collect();
		let column = RawColumn::new(column, 64, data);
		match modules.iter_mut().find(|(name, _)| name == module) {
			Some((_, columns)) => columns.push(column),
			None => modules.push((module.to_string(), vec![column])),
		}
	}
	TraceFile::new(
		modules
			.into_iter()
			.map(|(name, columns)| RawModule::new(name, columns))
			.collect(),
	)
}

/// Converts integers into a column of field elements.
pub fn field_values<F: Field>(values: &[u64]) -> Vec<F> {
	values.iter().map(|&v| F::from(v)).collect()
}

/// Builds and expands a trace, then returns every bit-width error and constraint failure.
pub fn expand_and_check<F: Field>(
	config: &ExpansionConfig,
	schema: &Schema<F>,
	file: &TraceFile<F>,
) -> Result<(ArrayTrace<F>, Vec<Error>, Vec<Failure>), Error> {
	let mut trace = build_trace(schema, file)?;
	expand_trace(config, schema, &mut trace)?;
	let errors = validate_trace(config.parallel, schema, &trace);
	let failures = check_constraints(config.parallel, schema, &trace);
	Ok((trace, errors, failures))
}

/// Utility for tests to validate a schema against an input trace.
///
/// Expansion runs in parallel when `CORSET_TEST_PARALLEL` is set.
pub fn validate_system_trace<F: Field>(schema: &Schema<F>, file: &TraceFile<F>) -> ArrayTrace<F> {
	const TEST_PARALLEL_ENV_NAME: &str = "CORSET_TEST_PARALLEL";
	let config = if boolean_env_flag_set(TEST_PARALLEL_ENV_NAME) {
		ExpansionConfig::parallel(ExpansionConfig::DEFAULT_BATCH_SIZE)
	} else {
		ExpansionConfig::sequential()
	};
	validate_system_trace_with_config(&config, schema, file)
}

pub fn validate_system_trace_with_config<F: Field>(
	config: &ExpansionConfig,
	schema: &Schema<F>,
	file: &TraceFile<F>,
) -> ArrayTrace<F> {
	init_tracing();
	let (trace, errors, failures) = expand_and_check(config, schema, file).unwrap();
	assert!(errors.is_empty(), "bit-width errors: {errors:?}");
	assert!(failures.is_empty(), "constraint failures: {failures:?}");
	trace
}
