// Copyright 2025 Irreducible Inc.

use corset_field::Field;
use corset_trace::{ArrayTrace, Column};
use corset_utils::{
	env::{boolean_env_flag_set, usize_env_var},
	rayon::adjust_thread_pool,
};
use rayon::prelude::*;
use tracing::instrument;

use crate::{
	builder::{Assignment, Error, Schema},
	expander::Expander,
};

/// How trace expansion schedules assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionConfig {
	/// Run each wave of ready assignments on the rayon thread pool.
	pub parallel: bool,
	/// Maximum number of assignments per parallel wave.
	pub batch_size: usize,
}

impl ExpansionConfig {
	pub const DEFAULT_BATCH_SIZE: usize = 32;

	pub fn sequential() -> Self {
		Self {
			parallel: false,
			batch_size: 1,
		}
	}

	pub fn parallel(batch_size: usize) -> Self {
		Self {
			parallel: true,
			batch_size,
		}
	}

	/// Reads `CORSET_PARALLEL` and `CORSET_BATCH_SIZE`, falling back to the defaults.
	pub fn from_env() -> Self {
		Self {
			parallel: boolean_env_flag_set("CORSET_PARALLEL"),
			batch_size: usize_env_var("CORSET_BATCH_SIZE")
				.filter(|&size| size > 0)
				.unwrap_or(Self::DEFAULT_BATCH_SIZE),
		}
	}
}

impl Default for ExpansionConfig {
	fn default() -> Self {
		Self {
			parallel: false,
			batch_size: Self::DEFAULT_BATCH_SIZE,
		}
	}
}

/// Fills every computed register of `trace` by running the schema's assignments.
///
/// On failure, the writes of assignments that already completed remain in the trace.
#[instrument("expand_trace", skip_all, level = "debug", fields(parallel = config.parallel))]
pub fn expand_trace<F: Field>(
	config: &ExpansionConfig,
	schema: &Schema<F>,
	trace: &mut ArrayTrace<F>,
) -> Result<(), Error> {
	if config.parallel {
		parallel_expansion(config.batch_size, schema, trace)
	} else {
		sequential_expansion(schema, trace)
	}
}

fn sequential_expansion<F: Field>(schema: &Schema<F>, trace: &mut ArrayTrace<F>) -> Result<(), Error> {
	let mut expander = Expander::new(schema);
	while !expander.done() {
		for assignment in expander.next(1) {
			let columns = compute(assignment, schema, trace)?;
			apply(assignment, columns, trace);
		}
	}
	Ok(())
}

/// Runs assignments in waves. All members of a wave read the trace as it stood before the wave;
/// their results are written back in order once the whole wave has finished.
fn parallel_expansion<F: Field>(
	batch_size: usize,
	schema: &Schema<F>,
	trace: &mut ArrayTrace<F>,
) -> Result<(), Error> {
	if let Err(err) = adjust_thread_pool() {
		tracing::debug!(%err, "using the existing rayon thread pool");
	}

	let mut expander = Expander::new(schema);
	while !expander.done() {
		let batch = expander.next(batch_size);
		tracing::debug!(wave = batch.len(), remaining = expander.count(), "expansion wave");

		let snapshot: &ArrayTrace<F> = trace;
		let results = batch
			.par_iter()
			.map(|&assignment| compute(assignment, schema, snapshot))
			.collect::<Result<Vec<_>, _>>()?;
		for (assignment, columns) in batch.into_iter().zip(results) {
			apply(assignment, columns, trace);
		}
	}
	Ok(())
}

fn compute<F: Field>(
	assignment: &dyn Assignment<F>,
	schema: &Schema<F>,
	trace: &ArrayTrace<F>,
) -> Result<Vec<Column<F>>, Error> {
	assignment
		.compute(trace, schema)
		.map_err(|error| Error::Assignment {
			name: assignment.name().to_string(),
			error,
		})
}

fn apply<F: Field>(assignment: &dyn Assignment<F>, columns: Vec<Column<F>>, trace: &mut ArrayTrace<F>) {
	let targets = assignment.targets();
	assert_eq!(
		targets.len(),
		columns.len(),
		"assignment {} produced {} columns for {} targets",
		assignment.name(),
		columns.len(),
		targets.len()
	);
	for (target, column) in targets.into_iter().zip(columns) {
		trace.fill_column(target.module, target.register, column);
	}
}
