// Copyright 2025 Irreducible Inc.

use corset_field::Field;
use getset::{CopyGetters, Getters};

use super::{
	assignment::Assignment,
	constraint::{Constraint, Domain, RangeConstraint, VanishingConstraint},
	register::{ModuleId, Register, RegisterId, RegisterRef},
	term::Term,
};

/// A named group of registers sharing a height, together with the constraints and assignments
/// declared over them.
#[derive(Debug, Getters, CopyGetters)]
pub struct Module<F: Field> {
	#[get_copy = "pub"]
	id: ModuleId,
	#[get = "pub"]
	name: String,
	/// The module height must be a multiple of this.
	#[get_copy = "pub"]
	multiplier: usize,
	#[get = "pub"]
	registers: Vec<Register<F>>,
	#[get = "pub"]
	constraints: Vec<Constraint<F>>,
	assignments: Vec<Box<dyn Assignment<F>>>,
}

impl<F: Field> Module<F> {
	pub(crate) fn new(id: ModuleId, name: impl ToString, multiplier: usize) -> Self {
		assert!(multiplier > 0, "length multiplier must be positive");
		Self {
			id,
			name: name.to_string(),
			multiplier,
			registers: Vec::new(),
			constraints: Vec::new(),
			assignments: Vec::new(),
		}
	}

	pub fn register(&self, id: RegisterId) -> &Register<F> {
		&self.registers[id]
	}

	pub fn has_register(&self, name: &str) -> Option<RegisterId> {
		self.registers.iter().position(|reg| reg.name() == name)
	}

	/// Number of registers.
	pub fn width(&self) -> usize {
		self.registers.len()
	}

	pub fn assignments(&self) -> impl Iterator<Item = &dyn Assignment<F>> + '_ {
		self.assignments.iter().map(|assignment| assignment.as_ref())
	}

	pub(crate) fn push_assignment(&mut self, assignment: Box<dyn Assignment<F>>) {
		self.assignments.push(assignment);
	}
}

/// Mutable access to one module of a schema under construction.
#[derive(Debug)]
pub struct ModuleBuilder<'a, F: Field> {
	module: &'a mut Module<F>,
}

impl<'a, F: Field> ModuleBuilder<'a, F> {
	pub fn new(module: &'a mut Module<F>) -> Self {
		Self { module }
	}

	pub fn id(&self) -> ModuleId {
		self.module.id
	}

	pub fn name(&self) -> &str {
		&self.module.name
	}

	pub fn register(&self, id: RegisterId) -> &Register<F> {
		self.module.register(id)
	}

	pub fn registers(&self) -> &[Register<F>] {
		&self.module.registers
	}

	pub fn has_register(&self, name: &str) -> Option<RegisterId> {
		self.module.has_register(name)
	}

	pub fn register_ref(&self, id: RegisterId) -> RegisterRef {
		RegisterRef::new(self.module.id, id)
	}

	/// Declares a register, returning its index within the module.
	///
	/// ## Preconditions
	///
	/// * No register of the same name exists in the module.
	pub fn new_register(&mut self, register: Register<F>) -> RegisterId {
		assert!(
			self.has_register(register.name()).is_none(),
			"register {} already declared in module {}",
			register.name(),
			self.module.name
		);
		self.module.registers.push(register);
		self.module.registers.len() - 1
	}

	pub fn add_constraint(&mut self, constraint: Constraint<F>) {
		self.module.constraints.push(constraint);
	}

	/// Constrains `term` to vanish on every row.
	pub fn assert_zero(&mut self, handle: impl ToString, term: Term<F>) {
		self.assert_zero_on(handle, None, term);
	}

	pub fn assert_zero_on(&mut self, handle: impl ToString, domain: Option<Domain>, term: Term<F>) {
		let constraint = VanishingConstraint {
			handle: handle.to_string(),
			module: self.module.id,
			domain,
			term,
		};
		self.add_constraint(Constraint::Vanishing(constraint));
	}

	pub fn assert_range(&mut self, handle: impl ToString, term: Term<F>, bitwidth: usize) {
		let constraint = RangeConstraint {
			handle: handle.to_string(),
			module: self.module.id,
			term,
			bitwidth,
		};
		self.add_constraint(Constraint::Range(constraint));
	}

	pub fn add_assignment(&mut self, assignment: impl Assignment<F> + 'static) {
		self.module.push_assignment(Box::new(assignment));
	}
}
