// Copyright 2025 Irreducible Inc.

use corset_field::Field;
use corset_trace::{ArrayTrace, Column};

use super::{bitwidth::BitwidthGadget, normalise::normalise};
use crate::builder::{
	Assignment, Domain, ModuleBuilder, ModuleId, Register, RegisterId, RegisterRef, Schema,
	SchemaBuilder, Term,
};

/// Constrains the rows of a module to be sorted lexicographically by a list of registers.
///
/// Per source register `i` the gadget adds a binary register `{prefix}_{i}` marking the first
/// register that differs from the previous row, and a single `{prefix}_delta` register holding
/// the directed difference in that register. The delta is then constrained to `bitwidth` bits,
/// which rules out a negative difference wrapping around the field.
#[derive(Debug, Clone)]
pub struct LexicographicSortingGadget<F: Field> {
	prefix: String,
	sources: Vec<RegisterId>,
	signs: Vec<bool>,
	bitwidth: usize,
	strict: bool,
	selector: Option<Term<F>>,
}

impl<F: Field> LexicographicSortingGadget<F> {
	/// Creates a gadget sorting every source in ascending order.
	pub fn new(prefix: impl ToString, sources: Vec<RegisterId>, bitwidth: usize) -> Self {
		let signs = vec![true; sources.len()];
		Self {
			prefix: prefix.to_string(),
			sources,
			signs,
			bitwidth,
			strict: false,
			selector: None,
		}
	}

	/// Sets the direction per source: `true` for ascending, `false` for descending.
	pub fn with_signs(mut self, signs: Vec<bool>) -> Self {
		assert_eq!(signs.len(), self.sources.len(), "one sign per source register expected");
		self.signs = signs;
		self
	}

	/// Requires consecutive rows to differ.
	pub fn with_strictness(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	/// Only enforces the ordering on rows where `selector` is non-zero.
	pub fn with_selector(mut self, selector: Term<F>) -> Self {
		self.selector = Some(selector);
		self
	}

	pub fn apply(&self, module: ModuleId, schema: &mut SchemaBuilder<F>) {
		let delta_name = format!("{}_delta", self.prefix);
		if let Some(delta) = schema.module(module).has_register(&delta_name) {
			// Another sort over the same prefix already built the machinery.
			let bits = self.bit_registers(&schema.module_mut(module));
			self.add_delta_constraint(&mut schema.module_mut(module), &bits, delta);
			return;
		}

		let mut builder = schema.module_mut(module);
		let bits = (0..self.sources.len())
			.map(|i| builder.new_register(Register::computed(self.bit_name(i), 1)))
			.collect::<Vec<_>>();
		let delta = builder.new_register(Register::computed(delta_name, self.bitwidth));
		builder.add_assignment(LexicographicSort {
			name: self.prefix.clone(),
			module,
			sources: self.sources.clone(),
			signs: self.signs.clone(),
			selector: self.selector.clone(),
			bits: bits.clone(),
			delta,
		});

		self.add_xor_constraint(&mut builder, &bits);
		for i in 0..self.sources.len() {
			self.add_ordering_constraints(&mut builder, &bits, i);
		}
		self.add_delta_constraint(&mut builder, &bits, delta);

		let mut gadget = BitwidthGadget::new(schema);
		for &bit in &bits {
			gadget.constrain(RegisterRef::new(module, bit), 1);
		}
		gadget.constrain(RegisterRef::new(module, delta), self.bitwidth);
	}

	fn bit_name(&self, i: usize) -> String {
		format!("{}_{}", self.prefix, i)
	}

	fn bit_registers(&self, module: &ModuleBuilder<F>) -> Vec<RegisterId> {
		(0..self.sources.len())
			.map(|i| {
				module
					.has_register(&self.bit_name(i))
					.unwrap_or_else(|| panic!("missing sort bit {}", self.bit_name(i)))
			})
			.collect()
	}

	fn gate(&self, term: Term<F>) -> Term<F> {
		match &self.selector {
			Some(selector) => selector.clone() * term,
			None => term,
		}
	}

	/// `Col_i - Col_i[-1]`.
	fn difference(&self, i: usize) -> Term<F> {
		Term::access(self.sources[i]) - Term::shifted(self.sources[i], -1)
	}

	/// At most one bit is set, or exactly one when strict.
	fn add_xor_constraint(&self, module: &mut ModuleBuilder<F>, bits: &[RegisterId]) {
		let sum = Term::sum(bits.iter().map(|&bit| Term::access(bit)));
		let term = if self.strict {
			sum - F::ONE
		} else {
			sum.clone() * (sum - F::ONE)
		};
		module.assert_zero_on(
			format!("{}_xor", self.prefix),
			Some(Domain::AllButFirst),
			self.gate(term),
		);
	}

	/// Before the first set bit the columns are equal, and the set bit marks a change.
	fn add_ordering_constraints(&self, module: &mut ModuleBuilder<F>, bits: &[RegisterId], i: usize) {
		let set_before = |n: usize| Term::sum(bits[..n].iter().map(|&bit| Term::access(bit)));

		let equal = (Term::one() - set_before(i + 1)) * self.difference(i);
		module.assert_zero_on(
			format!("{}_{}_eq", self.prefix, i),
			Some(Domain::AllButFirst),
			self.gate(equal),
		);

		let differs = Term::one() - normalise(self.difference(i), module);
		let changed = (Term::one() - set_before(i)) * Term::access(bits[i]) * differs;
		module.assert_zero_on(
			format!("{}_{}_neq", self.prefix, i),
			Some(Domain::AllButFirst),
			self.gate(changed),
		);
	}

	/// `delta = Σ bit_i * ±(Col_i - Col_i[-1])`.
	fn add_delta_constraint(&self, module: &mut ModuleBuilder<F>, bits: &[RegisterId], delta: RegisterId) {
		let directed = Term::sum(bits.iter().zip(&self.signs).enumerate().map(|(i, (&bit, &sign))| {
			let difference = if sign {
				self.difference(i)
			} else {
				-self.difference(i)
			};
			Term::access(bit) * difference
		}));
		module.assert_zero_on(
			format!("{}_delta", self.prefix),
			Some(Domain::AllButFirst),
			self.gate(Term::access(delta) - directed),
		);
	}
}

/// Computes the sort bits and delta of a [`LexicographicSortingGadget`].
#[derive(Debug)]
pub struct LexicographicSort<F: Field> {
	name: String,
	module: ModuleId,
	sources: Vec<RegisterId>,
	signs: Vec<bool>,
	selector: Option<Term<F>>,
	bits: Vec<RegisterId>,
	delta: RegisterId,
}

impl<F: Field> Assignment<F> for LexicographicSort<F> {
	fn name(&self) -> &str {
		&self.name
	}

	fn sources(&self) -> Vec<RegisterRef> {
		let mut sources = self.sources.clone();
		if let Some(selector) = &self.selector {
			sources.extend(selector.registers());
		}
		sources.sort_unstable();
		sources.dedup();
		sources
			.into_iter()
			.map(|register| RegisterRef::new(self.module, register))
			.collect()
	}

	fn targets(&self) -> Vec<RegisterRef> {
		self.bits
			.iter()
			.chain([&self.delta])
			.map(|&register| RegisterRef::new(self.module, register))
			.collect()
	}

	fn compute(&self, trace: &ArrayTrace<F>, schema: &Schema<F>) -> anyhow::Result<Vec<Column<F>>> {
		let module = trace.module(self.module);
		let height = module.height();
		let mut bits = vec![vec![F::ZERO; height]; self.bits.len()];
		let mut delta = vec![F::ZERO; height];

		for row in 1..height {
			if let Some(selector) = &self.selector {
				if selector.eval(row, module).is_zero() {
					continue;
				}
			}
			for (i, (&source, &sign)) in self.sources.iter().zip(&self.signs).enumerate() {
				let column = module.column(source);
				let (current, previous) = (column.get(row as isize), column.get(row as isize - 1));
				if current != previous {
					bits[i][row] = F::ONE;
					delta[row] = if sign {
						current - previous
					} else {
						previous - current
					};
					break;
				}
			}
		}

		let name = |register: RegisterId| schema.register(RegisterRef::new(self.module, register)).name();
		let mut columns = self
			.bits
			.iter()
			.zip(bits)
			.map(|(&register, data)| Column::new(name(register), data, F::ZERO))
			.collect::<Vec<_>>();
		columns.push(Column::new(name(self.delta), delta, F::ZERO));
		Ok(columns)
	}
}
