// Copyright 2025 Irreducible Inc.

use std::fmt::Debug;

use corset_field::Field;
use corset_trace::{ArrayTrace, Column};

use super::{register::RegisterRef, schema::Schema};

/// A deterministic rule computing the values of some computed registers.
///
/// An assignment only reads its [`sources`](Self::sources) and only writes its
/// [`targets`](Self::targets). It may list one of its targets among its sources, in which case it
/// reads the value the target had before the assignment ran.
pub trait Assignment<F: Field>: Debug + Send + Sync {
	/// Human readable name used in diagnostics.
	fn name(&self) -> &str;

	fn sources(&self) -> Vec<RegisterRef>;

	fn targets(&self) -> Vec<RegisterRef>;

	/// Computes one column per target, in the order of [`targets`](Self::targets).
	///
	/// Every returned column must be named after its target register.
	fn compute(&self, trace: &ArrayTrace<F>, schema: &Schema<F>) -> anyhow::Result<Vec<Column<F>>>;
}
