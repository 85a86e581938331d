// Copyright 2025 Irreducible Inc.

//! Scheduling of assignments during trace expansion.

use std::mem;

use bitvec::prelude::*;
use corset_field::Field;

use crate::builder::{Assignment, Schema};

#[derive(Debug)]
struct Pending<'a, F: Field> {
	assignment: &'a dyn Assignment<F>,
	sources: Vec<usize>,
	targets: Vec<usize>,
}

/// Hands out assignments in an order respecting their data dependencies.
///
/// Registers are tracked by their global index. A register is *not ready* until the assignment
/// targeting it has been handed out. A register an assignment both reads and writes is
/// *expanding*: it does not block that assignment, which reads the register's prior value.
#[derive(Debug)]
pub struct Expander<'a, F: Field> {
	worklist: Vec<Pending<'a, F>>,
	not_ready: BitVec,
	expanding: BitVec,
}

impl<'a, F: Field> Expander<'a, F> {
	pub fn new(schema: &'a Schema<F>) -> Self {
		let num_registers = schema.num_registers();
		let mut not_ready = bitvec![0; num_registers];
		let mut expanding = bitvec![0; num_registers];

		let worklist = schema
			.assignments()
			.map(|assignment| {
				let index = |registers: Vec<_>| {
					registers
						.into_iter()
						.map(|register| schema.register_index(register))
						.collect::<Vec<_>>()
				};
				let sources = index(assignment.sources());
				let targets = index(assignment.targets());
				for &target in &targets {
					not_ready.set(target, true);
					if sources.contains(&target) {
						expanding.set(target, true);
					}
				}
				Pending {
					assignment,
					sources,
					targets,
				}
			})
			.collect();

		Self {
			worklist,
			not_ready,
			expanding,
		}
	}

	/// Whether every assignment has been handed out.
	pub fn done(&self) -> bool {
		self.worklist.is_empty()
	}

	/// Number of assignments not yet handed out.
	pub fn count(&self) -> usize {
		self.worklist.len()
	}

	/// Returns up to `n` assignments whose sources are all available, in declaration order, and
	/// marks their targets as available.
	///
	/// ## Panics
	///
	/// * If assignments remain but none of them is ready, which means the schema has a cycle.
	pub fn next(&mut self, n: usize) -> Vec<&'a dyn Assignment<F>> {
		assert!(n > 0, "batch size must be positive");
		let mut batch = Vec::new();
		let mut blocked = Vec::new();
		for pending in mem::take(&mut self.worklist) {
			if batch.len() < n && self.is_ready(&pending) {
				batch.push(pending);
			} else {
				blocked.push(pending);
			}
		}

		if batch.is_empty() && !blocked.is_empty() {
			let names = blocked
				.iter()
				.map(|pending| pending.assignment.name())
				.collect::<Vec<_>>();
			panic!("trace expansion cannot progress; blocked assignments: {names:?}");
		}

		for pending in &batch {
			tracing::trace!(assignment = pending.assignment.name(), "assignment scheduled");
			for &target in &pending.targets {
				self.not_ready.set(target, false);
			}
		}
		self.worklist = blocked;
		batch.into_iter().map(|pending| pending.assignment).collect()
	}

	fn is_ready(&self, pending: &Pending<'a, F>) -> bool {
		pending.sources.iter().all(|&source| {
			!self.not_ready[source] || (self.expanding[source] && pending.targets.contains(&source))
		})
	}
}
