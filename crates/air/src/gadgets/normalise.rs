// Copyright 2025 Irreducible Inc.

use corset_field::Field;
use corset_trace::{ArrayTrace, Column};

use crate::builder::{
	Assignment, ModuleBuilder, ModuleId, Register, RegisterId, RegisterRef, Schema, Term,
	UNBOUNDED_WIDTH,
};

/// Returns a term equal to `1` where `term` is non-zero and `0` where it is zero.
///
/// The result is `term * (inv term)`, where `(inv term)` is a computed pseudo-inverse register.
pub fn normalise<F: Field>(term: Term<F>, module: &mut ModuleBuilder<F>) -> Term<F> {
	let inverse = pseudo_inverse(term.clone(), module);
	term * inverse
}

/// Returns an access to a register holding the inverse of `term`, or zero where `term` is zero.
///
/// The register is named after the rendered term, so inverting the same term twice in a module
/// reuses the first register.
pub fn pseudo_inverse<F: Field>(term: Term<F>, module: &mut ModuleBuilder<F>) -> Term<F> {
	let name = format!("(inv {})", term.lisp(module.registers()));
	if let Some(id) = module.has_register(&name) {
		return Term::access(id);
	}

	let id = module.new_register(Register::computed(name.clone(), UNBOUNDED_WIDTH));
	let inverse = Term::access(id);
	// term * (1 - term * inverse) = 0
	module.assert_zero(
		name.clone(),
		term.clone() * (Term::one() - term.clone() * inverse.clone()),
	);
	module.add_assignment(PseudoInverse {
		name,
		module: module.id(),
		target: id,
		term,
	});
	inverse
}

#[derive(Debug)]
pub struct PseudoInverse<F: Field> {
	name: String,
	module: ModuleId,
	target: RegisterId,
	term: Term<F>,
}

impl<F: Field> Assignment<F> for PseudoInverse<F> {
	fn name(&self) -> &str {
		&self.name
	}

	fn sources(&self) -> Vec<RegisterRef> {
		self.term
			.registers()
			.into_iter()
			.map(|register| RegisterRef::new(self.module, register))
			.collect()
	}

	fn targets(&self) -> Vec<RegisterRef> {
		vec![RegisterRef::new(self.module, self.target)]
	}

	fn compute(&self, trace: &ArrayTrace<F>, _schema: &Schema<F>) -> anyhow::Result<Vec<Column<F>>> {
		let module = trace.module(self.module);
		let data = (0..module.height())
			.map(|row| self.term.eval(row, module).invert_or_zero())
			.collect();
		Ok(vec![Column::new(&self.name, data, F::ZERO)])
	}
}
