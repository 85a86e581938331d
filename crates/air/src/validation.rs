// Copyright 2025 Irreducible Inc.

use corset_field::Field;
use corset_trace::ArrayTrace;
use rayon::prelude::*;
use tracing::instrument;

use crate::builder::{Constraint, Error, Failure, RegisterRef, Schema};

/// Checks that every value of every bounded column fits in its register's width.
///
/// At most one error is reported per column, for its first offending row. Registers of
/// [`UNBOUNDED_WIDTH`](crate::builder::UNBOUNDED_WIDTH) are skipped.
#[instrument("validate_trace", skip_all, level = "debug")]
pub fn validate_trace<F: Field>(parallel: bool, schema: &Schema<F>, trace: &ArrayTrace<F>) -> Vec<Error> {
	let registers = schema.registers().collect::<Vec<_>>();
	let check = |&register: &RegisterRef| validate_column(schema, trace, register);
	if parallel {
		registers.par_iter().filter_map(check).collect()
	} else {
		registers.iter().filter_map(check).collect()
	}
}

fn validate_column<F: Field>(
	schema: &Schema<F>,
	trace: &ArrayTrace<F>,
	register: RegisterRef,
) -> Option<Error> {
	let declared = schema.register(register);
	if declared.is_unbounded() {
		return None;
	}
	let column = trace.module(register.module).column(register.register);
	let bitwidth = declared.width();
	column
		.data()
		.iter()
		.position(|value| !value.fits_in(bitwidth))
		.map(|row| Error::ValueOutOfRange {
			column: trace.qualified_name(register.module, register.register),
			row,
			value: column.data()[row].to_decimal(),
			bitwidth,
		})
}

/// Checks every constraint of the schema against an expanded trace, returning all failures.
#[instrument("check_constraints", skip_all, level = "debug")]
pub fn check_constraints<F: Field>(
	parallel: bool,
	schema: &Schema<F>,
	trace: &ArrayTrace<F>,
) -> Vec<Failure> {
	let constraints = schema.constraints().collect::<Vec<_>>();
	let check = |constraint: &&Constraint<F>| constraint.accepts(trace).err();
	let failures = if parallel {
		constraints.par_iter().filter_map(check).collect::<Vec<_>>()
	} else {
		constraints.iter().filter_map(check).collect::<Vec<_>>()
	};
	for failure in &failures {
		tracing::debug!(%failure, "constraint failure");
	}
	failures
}
