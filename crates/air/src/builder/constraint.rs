// Copyright 2025 Irreducible Inc.

use std::{collections::HashSet, ops::Range};

use corset_field::Field;
use corset_trace::{ArrayModule, ArrayTrace};
use itertools::Itertools;

use super::{
	register::{ModuleId, RegisterId},
	schema::Schema,
	term::{Bounds, Term},
};

/// Restricts the rows a vanishing constraint or assertion applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
	First,
	Last,
	AllButFirst,
}

/// `term` must evaluate to zero on every row of the domain (every row if `domain` is `None`).
#[derive(Debug, Clone)]
pub struct VanishingConstraint<F: Field> {
	pub handle: String,
	pub module: ModuleId,
	pub domain: Option<Domain>,
	pub term: Term<F>,
}

/// `term` must fit in `bitwidth` bits on every row.
#[derive(Debug, Clone)]
pub struct RangeConstraint<F: Field> {
	pub handle: String,
	pub module: ModuleId,
	pub term: Term<F>,
	pub bitwidth: usize,
}

/// Every row of `sources` must appear as some row of `targets`.
#[derive(Debug, Clone)]
pub struct LookupConstraint<F: Field> {
	pub handle: String,
	pub source: ModuleId,
	pub sources: Vec<Term<F>>,
	pub target: ModuleId,
	pub targets: Vec<Term<F>>,
}

/// The rows of `targets` are a permutation of the rows of `sources`.
#[derive(Debug, Clone)]
pub struct PermutationConstraint {
	pub handle: String,
	pub module: ModuleId,
	pub sources: Vec<RegisterId>,
	pub targets: Vec<RegisterId>,
}

#[derive(Debug, Clone)]
pub enum Constraint<F: Field> {
	Vanishing(VanishingConstraint<F>),
	Range(RangeConstraint<F>),
	Lookup(LookupConstraint<F>),
	Permutation(PermutationConstraint),
	/// A property that a valid trace satisfies but which is not enforced by the proof system.
	Assertion(VanishingConstraint<F>),
}

/// A constraint that does not hold on a trace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
	#[error("constraint {handle} does not hold on row {row}")]
	Vanishing { handle: String, row: usize },
	#[error("assertion {handle} does not hold on row {row}")]
	Assertion { handle: String, row: usize },
	#[error("range constraint {handle} fails on row {row}: {value} does not fit in u{bitwidth}")]
	Range {
		handle: String,
		row: usize,
		value: String,
		bitwidth: usize,
	},
	#[error("lookup {handle} fails on row {row}: no matching target row")]
	Lookup { handle: String, row: usize },
	#[error("permutation {handle} does not hold")]
	Permutation { handle: String },
}

impl Failure {
	pub fn handle(&self) -> &str {
		match self {
			Self::Vanishing { handle, .. }
			| Self::Assertion { handle, .. }
			| Self::Range { handle, .. }
			| Self::Lookup { handle, .. }
			| Self::Permutation { handle } => handle,
		}
	}
}

impl<F: Field> Constraint<F> {
	pub fn handle(&self) -> &str {
		match self {
			Self::Vanishing(c) | Self::Assertion(c) => &c.handle,
			Self::Range(c) => &c.handle,
			Self::Lookup(c) => &c.handle,
			Self::Permutation(c) => &c.handle,
		}
	}

	/// Checks the constraint on a fully expanded trace.
	pub fn accepts(&self, trace: &ArrayTrace<F>) -> Result<(), Failure> {
		match self {
			Self::Vanishing(c) => check_vanishing(c, trace).map_err(|row| Failure::Vanishing {
				handle: c.handle.clone(),
				row,
			}),
			Self::Assertion(c) => check_vanishing(c, trace).map_err(|row| Failure::Assertion {
				handle: c.handle.clone(),
				row,
			}),
			Self::Range(c) => check_range(c, trace),
			Self::Lookup(c) => check_lookup(c, trace),
			Self::Permutation(c) => check_permutation(c, trace),
		}
	}

	/// Renders the constraint as an s-expression over the schema's register names.
	pub fn lisp(&self, schema: &Schema<F>) -> String {
		let registers = |module: ModuleId| schema.module(module).registers().as_slice();
		let terms = |module: ModuleId, terms: &[Term<F>]| {
			terms
				.iter()
				.map(|term| term.lisp(registers(module)))
				.join(" ")
		};
		match self {
			Self::Vanishing(c) | Self::Assertion(c) => {
				let keyword = match self {
					Self::Assertion(_) => "assert",
					_ => "vanish",
				};
				let domain = match c.domain {
					None => "",
					Some(Domain::First) => ":first ",
					Some(Domain::Last) => ":last ",
					Some(Domain::AllButFirst) => ":all-but-first ",
				};
				format!("({} {} {}{})", keyword, c.handle, domain, c.term.lisp(registers(c.module)))
			}
			Self::Range(c) => format!(
				"(range {} {} u{})",
				c.handle,
				c.term.lisp(registers(c.module)),
				c.bitwidth
			),
			Self::Lookup(c) => format!(
				"(lookup {} ({}) ({}))",
				c.handle,
				terms(c.target, &c.targets),
				terms(c.source, &c.sources)
			),
			Self::Permutation(c) => {
				let names = |ids: &[RegisterId]| {
					ids.iter()
						.map(|&id| registers(c.module)[id].name())
						.join(" ")
				};
				format!("(permute {} ({}) ({}))", c.handle, names(&c.targets), names(&c.sources))
			}
		}
	}
}

/// Rows on which a constraint with the given bounds and domain is evaluated.
///
/// Rows whose shifted accesses would leave the module are skipped.
fn active_rows(domain: Option<Domain>, bounds: Bounds, height: usize) -> Range<usize> {
	let end = height.saturating_sub(bounds.after);
	match domain {
		None => bounds.before..end,
		Some(Domain::First) => 0..height.min(1),
		Some(Domain::Last) => height.saturating_sub(1)..height,
		Some(Domain::AllButFirst) => bounds.before.max(1)..end,
	}
}

fn check_vanishing<F: Field>(c: &VanishingConstraint<F>, trace: &ArrayTrace<F>) -> Result<(), usize> {
	let module = trace.module(c.module);
	match active_rows(c.domain, c.term.bounds(), module.height())
		.find(|&row| !c.term.eval(row, module).is_zero())
	{
		Some(row) => Err(row),
		None => Ok(()),
	}
}

fn check_range<F: Field>(c: &RangeConstraint<F>, trace: &ArrayTrace<F>) -> Result<(), Failure> {
	let module = trace.module(c.module);
	for row in active_rows(None, c.term.bounds(), module.height()) {
		let value = c.term.eval(row, module);
		if !value.fits_in(c.bitwidth) {
			return Err(Failure::Range {
				handle: c.handle.clone(),
				row,
				value: value.to_decimal(),
				bitwidth: c.bitwidth,
			});
		}
	}
	Ok(())
}

fn tuple<F: Field>(terms: &[Term<F>], row: usize, module: &ArrayModule<F>) -> Vec<F> {
	terms.iter().map(|term| term.eval(row, module)).collect()
}

fn check_lookup<F: Field>(c: &LookupConstraint<F>, trace: &ArrayTrace<F>) -> Result<(), Failure> {
	let target = trace.module(c.target);
	let rows = (0..target.height())
		.map(|row| tuple(&c.targets, row, target))
		.collect::<HashSet<_>>();

	let source = trace.module(c.source);
	match (0..source.height()).find(|&row| !rows.contains(&tuple(&c.sources, row, source))) {
		Some(row) => Err(Failure::Lookup {
			handle: c.handle.clone(),
			row,
		}),
		None => Ok(()),
	}
}

fn check_permutation<F: Field>(
	c: &PermutationConstraint,
	trace: &ArrayTrace<F>,
) -> Result<(), Failure> {
	let module = trace.module(c.module);
	let sorted_rows = |registers: &[RegisterId]| {
		(0..module.height())
			.map(|row| {
				registers
					.iter()
					.map(|&id| module.column(id).get(row as isize))
					.collect::<Vec<_>>()
			})
			.sorted()
			.collect::<Vec<_>>()
	};
	if sorted_rows(&c.sources) == sorted_rows(&c.targets) {
		Ok(())
	} else {
		Err(Failure::Permutation {
			handle: c.handle.clone(),
		})
	}
}
