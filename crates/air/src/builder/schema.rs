// Copyright 2025 Irreducible Inc.

use std::fmt;

use corset_field::Field;
use corset_trace::qualified_name;
use getset::CopyGetters;

use super::{
	assignment::Assignment,
	constraint::Constraint,
	module::{Module, ModuleBuilder},
	register::{ModuleId, Register, RegisterRef},
};
use crate::gadgets::bitwidth::TypeProofRegistry;

/// Controls how gadgets lower their requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub struct GadgetConfig {
	/// Largest bit-width the proof system can range-check directly.
	#[get_copy = "pub"]
	max_range_constraint: usize,
	/// Lower wide bit-widths through shared type-proof modules instead of byte decompositions.
	#[get_copy = "pub"]
	limitless: bool,
}

impl GadgetConfig {
	pub const DEFAULT_MAX_RANGE_CONSTRAINT: usize = 8;

	pub fn with_max_range_constraint(mut self, bitwidth: usize) -> Self {
		self.max_range_constraint = bitwidth;
		self
	}

	pub fn with_limitless(mut self, limitless: bool) -> Self {
		self.limitless = limitless;
		self
	}
}

impl Default for GadgetConfig {
	fn default() -> Self {
		Self {
			max_range_constraint: Self::DEFAULT_MAX_RANGE_CONSTRAINT,
			limitless: false,
		}
	}
}

/// Accumulates modules, registers, constraints and assignments during compilation.
///
/// Gadgets extend the schema in place. Once lowering is complete, [`Self::build`] freezes it into
/// a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder<F: Field> {
	modules: Vec<Module<F>>,
	config: GadgetConfig,
	type_proofs: TypeProofRegistry,
}

impl<F: Field> SchemaBuilder<F> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(mut self, config: GadgetConfig) -> Self {
		self.config = config;
		self
	}

	pub fn config(&self) -> GadgetConfig {
		self.config
	}

	/// Declares a module whose height must be a multiple of `multiplier`.
	///
	/// ## Preconditions
	///
	/// * No module of the same name exists.
	pub fn new_module(&mut self, name: impl ToString, multiplier: usize) -> ModuleId {
		let name = name.to_string();
		assert!(self.has_module(&name).is_none(), "module {name} already declared");
		let id = self.modules.len();
		self.modules.push(Module::new(id, name, multiplier));
		id
	}

	pub fn has_module(&self, name: &str) -> Option<ModuleId> {
		self.modules.iter().position(|module| module.name() == name)
	}

	pub fn modules(&self) -> &[Module<F>] {
		&self.modules
	}

	pub fn module(&self, id: ModuleId) -> &Module<F> {
		&self.modules[id]
	}

	pub fn module_mut(&mut self, id: ModuleId) -> ModuleBuilder<'_, F> {
		ModuleBuilder::new(&mut self.modules[id])
	}

	pub fn register(&self, register: RegisterRef) -> &Register<F> {
		self.modules[register.module].register(register.register)
	}

	pub(crate) fn type_proofs(&self) -> &TypeProofRegistry {
		&self.type_proofs
	}

	pub(crate) fn type_proofs_mut(&mut self) -> &mut TypeProofRegistry {
		&mut self.type_proofs
	}

	/// Finalises the schema, attaching the value assignments of every type-proof module.
	pub fn build(self) -> Schema<F> {
		let Self {
			mut modules,
			type_proofs,
			..
		} = self;
		type_proofs.finalize(&mut modules);

		let offsets = modules
			.iter()
			.scan(0, |offset, module| {
				let start = *offset;
				*offset += module.width();
				Some(start)
			})
			.collect();
		Schema { modules, offsets }
	}
}

/// A frozen set of modules.
///
/// Registers are additionally numbered globally, module by module in declaration order.
#[derive(Debug)]
pub struct Schema<F: Field> {
	modules: Vec<Module<F>>,
	offsets: Vec<usize>,
}

impl<F: Field> Schema<F> {
	pub fn modules(&self) -> &[Module<F>] {
		&self.modules
	}

	pub fn module(&self, id: ModuleId) -> &Module<F> {
		&self.modules[id]
	}

	pub fn has_module(&self, name: &str) -> Option<ModuleId> {
		self.modules.iter().position(|module| module.name() == name)
	}

	pub fn register(&self, register: RegisterRef) -> &Register<F> {
		self.modules[register.module].register(register.register)
	}

	/// Looks a register up by module and register name.
	pub fn find_register(&self, module: &str, register: &str) -> Option<RegisterRef> {
		let module = self.has_module(module)?;
		let register = self.modules[module].has_register(register)?;
		Some(RegisterRef::new(module, register))
	}

	/// Name of a register prefixed by its module name.
	pub fn qualified_name(&self, register: RegisterRef) -> String {
		qualified_name(
			self.modules[register.module].name(),
			self.register(register).name(),
		)
	}

	/// Total number of registers across all modules.
	pub fn num_registers(&self) -> usize {
		self.modules.iter().map(Module::width).sum()
	}

	/// Global index of a register.
	pub fn register_index(&self, register: RegisterRef) -> usize {
		self.offsets[register.module] + register.register
	}

	pub fn registers(&self) -> impl Iterator<Item = RegisterRef> + '_ {
		self.modules.iter().flat_map(|module| {
			(0..module.width()).map(move |register| RegisterRef::new(module.id(), register))
		})
	}

	pub fn constraints(&self) -> impl Iterator<Item = &Constraint<F>> + '_ {
		self.modules.iter().flat_map(|module| module.constraints())
	}

	pub fn assignments(&self) -> impl Iterator<Item = &dyn Assignment<F>> + '_ {
		self.modules.iter().flat_map(|module| module.assignments())
	}
}

impl<F: Field> fmt::Display for Schema<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for module in &self.modules {
			let name = if module.name().is_empty() {
				"<prelude>"
			} else {
				module.name()
			};
			writeln!(f, "module {} (x{}) {{", name, module.multiplier())?;
			for (id, register) in module.registers().iter().enumerate() {
				writeln!(f, "\t#{id} {register}")?;
			}
			for constraint in module.constraints() {
				writeln!(f, "\t{}", constraint.lisp(self))?;
			}
			for assignment in module.assignments() {
				writeln!(f, "\t(assign {})", assignment.name())?;
			}
			writeln!(f, "}}")?;
		}
		Ok(())
	}
}
