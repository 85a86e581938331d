// Copyright 2025 Irreducible Inc.

use std::collections::BTreeMap;

use corset_field::Field;
use corset_utils::checked_arithmetics::floor_power_of_two;

use super::decomposition::{ByteDecomposition, TypeDecomposition};
use crate::builder::{
	Constraint, LookupConstraint, Module, ModuleBuilder, ModuleId, Register, RegisterId,
	RegisterRef, SchemaBuilder, Term,
};

/// Ensures registers only hold values of a given bit-width.
///
/// Depending on the width and the configuration, a register is constrained
///
/// 1. to be binary, for widths of at most one bit,
/// 2. with a native range constraint, for widths up to `max_range_constraint`,
/// 3. by a lookup into a shared type-proof module `u{width}`, when `limitless` is set,
/// 4. otherwise by decomposing it into range constrained byte limbs.
#[derive(Debug)]
pub struct BitwidthGadget<'a, F: Field> {
	schema: &'a mut SchemaBuilder<F>,
	max_range_constraint: usize,
	limitless: bool,
}

impl<'a, F: Field> BitwidthGadget<'a, F> {
	/// Creates a gadget configured from the schema's [`GadgetConfig`](crate::builder::GadgetConfig).
	pub fn new(schema: &'a mut SchemaBuilder<F>) -> Self {
		let config = schema.config();
		Self {
			schema,
			max_range_constraint: config.max_range_constraint(),
			limitless: config.limitless(),
		}
	}

	pub fn with_max_range_constraint(mut self, bitwidth: usize) -> Self {
		self.max_range_constraint = bitwidth;
		self
	}

	pub fn with_limitless(mut self, limitless: bool) -> Self {
		self.limitless = limitless;
		self
	}

	pub fn constrain(&mut self, register: RegisterRef, bitwidth: usize) {
		if bitwidth <= 1 {
			self.constrain_binary(register);
		} else if bitwidth <= self.max_range_constraint {
			self.constrain_range(register, bitwidth);
		} else if self.limitless {
			self.constrain_by_type_proof(register, bitwidth);
		} else {
			self.constrain_by_bytes(register, bitwidth);
		}
	}

	fn constrain_binary(&mut self, register: RegisterRef) {
		let mut module = self.schema.module_mut(register.module);
		let handle = format!("{}:u1", module.register(register.register).name());
		let x = Term::access(register.register);
		module.assert_zero(handle, x.clone() * (x - F::ONE));
	}

	fn constrain_range(&mut self, register: RegisterRef, bitwidth: usize) {
		let mut module = self.schema.module_mut(register.module);
		let handle = format!("{}:u{}", module.register(register.register).name(), bitwidth);
		module.assert_range(handle, Term::access(register.register), bitwidth);
	}

	fn constrain_by_type_proof(&mut self, register: RegisterRef, bitwidth: usize) {
		let proof = self.type_proof_module(bitwidth);
		let handle = format!("{}:u{}", self.schema.register(register).name(), bitwidth);
		let lookup = LookupConstraint {
			handle,
			source: register.module,
			sources: vec![Term::access(register.register)],
			target: proof.module,
			targets: vec![Term::access(proof.value)],
		};
		self.schema
			.module_mut(register.module)
			.add_constraint(Constraint::Lookup(lookup));
		self.schema
			.type_proofs_mut()
			.add_source(bitwidth, register);
	}

	/// Returns the type-proof module for `bitwidth`, declaring it on first use.
	fn type_proof_module(&mut self, bitwidth: usize) -> TypeProof {
		if let Some(proof) = self.schema.type_proofs().get(bitwidth) {
			return proof.clone();
		}

		let (lo_width, hi_width) = determine_limb_split(bitwidth);
		tracing::debug!(bitwidth, lo_width, hi_width, "declaring type proof module");
		let id = self.schema.new_module(format!("u{bitwidth}"), 1);
		let mut module = self.schema.module_mut(id);
		let value = module.new_register(Register::computed("V", bitwidth));
		let lo = module.new_register(Register::computed("V'0", lo_width));
		let hi = module.new_register(Register::computed("V'1", hi_width));
		module.assert_zero(
			format!("u{bitwidth}"),
			Term::access(value) - (Term::access(lo) + Term::access(hi) * F::pow2(lo_width)),
		);

		let proof = TypeProof {
			module: id,
			value,
			limbs: [lo, hi],
			lo_width,
			sources: Vec::new(),
		};
		self.schema
			.type_proofs_mut()
			.insert(bitwidth, proof.clone());

		self.constrain(RegisterRef::new(id, lo), lo_width);
		self.constrain(RegisterRef::new(id, hi), hi_width);
		proof
	}

	fn constrain_by_bytes(&mut self, register: RegisterRef, bitwidth: usize) {
		let widths = byte_limb_widths(bitwidth);
		let mut module = self.schema.module_mut(register.module);
		let name = module.register(register.register).name().clone();
		let existing = (0..)
			.map_while(|i| module.has_register(&format!("{name}'{i}")))
			.collect::<Vec<_>>();
		if !existing.is_empty() {
			narrow_byte_limbs(&mut module, &existing, bitwidth);
			return;
		}

		let limbs = widths
			.iter()
			.enumerate()
			.map(|(i, &width)| module.new_register(Register::computed(format!("{name}'{i}"), width)))
			.collect::<Vec<_>>();

		for (&limb, &width) in limbs.iter().zip(&widths) {
			constrain_limb(&mut module, limb, width);
		}

		let recomposition = Term::sum(
			limbs
				.iter()
				.enumerate()
				.map(|(i, &limb)| Term::access(limb) * F::pow2(8 * i)),
		);
		module.assert_zero(
			format!("{name}:u{bitwidth}"),
			Term::access(register.register) - recomposition,
		);

		let targets = limbs
			.iter()
			.map(|&limb| module.register_ref(limb))
			.collect();
		module.add_assignment(ByteDecomposition::new(
			format!("decompose {name}"),
			register,
			targets,
			widths,
		));
	}
}

/// Range constrains a byte limb directly, as a binary register when it is one bit wide.
fn constrain_limb<F: Field>(module: &mut ModuleBuilder<F>, limb: RegisterId, width: usize) {
	let limb_name = module.register(limb).name().clone();
	let x = Term::access(limb);
	match width {
		0 => module.assert_zero(format!("{limb_name}:u0"), x),
		1 => module.assert_zero(format!("{limb_name}:u1"), x.clone() * (x - F::ONE)),
		_ => module.assert_range(format!("{limb_name}:u{width}"), x, width),
	}
}

/// Tightens an existing byte decomposition to `bitwidth` bits.
///
/// Limbs wholly above `bitwidth` are forced to zero and the limb straddling it is range
/// constrained to its remaining bits. Decompositions already at most `bitwidth` bits wide are
/// left untouched.
fn narrow_byte_limbs<F: Field>(module: &mut ModuleBuilder<F>, limbs: &[RegisterId], bitwidth: usize) {
	let decomposed = limbs.iter().map(|&limb| module.register(limb).width()).sum::<usize>();
	if bitwidth >= decomposed {
		return;
	}
	tracing::debug!(
		register = %module.register(limbs[0]).name(),
		decomposed,
		bitwidth,
		"narrowing byte decomposition"
	);
	for (i, &limb) in limbs.iter().enumerate() {
		let width = bitwidth.saturating_sub(8 * i);
		if width < module.register(limb).width() {
			constrain_limb(module, limb, width);
		}
	}
}

/// Splits a bit-width into the widths of two limbs `(lo, hi)` with `lo + hi = bitwidth`.
///
/// `lo` is the power of two closest to half of `bitwidth`, preferring the smaller one on ties.
pub fn determine_limb_split(bitwidth: usize) -> (usize, usize) {
	assert!(bitwidth >= 2, "cannot split a {bitwidth} bit register");
	let below = floor_power_of_two(bitwidth / 2);
	let above = bitwidth.div_ceil(2).next_power_of_two();
	// Distances to half the width, doubled to stay integral.
	let lo = if (2 * below).abs_diff(bitwidth) <= (2 * above).abs_diff(bitwidth) {
		below
	} else {
		above
	};
	(lo, bitwidth - lo)
}

/// Widths of the byte limbs of a `bitwidth` bit value, least significant first.
///
/// Every limb is a full byte except possibly the last.
pub fn byte_limb_widths(bitwidth: usize) -> Vec<usize> {
	assert!(bitwidth != 0, "zero byte decomposition encountered");
	(0..bitwidth.div_ceil(8))
		.map(|i| (bitwidth - 8 * i).min(8))
		.collect()
}

#[derive(Debug, Clone)]
pub(crate) struct TypeProof {
	pub module: ModuleId,
	pub value: RegisterId,
	pub limbs: [RegisterId; 2],
	pub lo_width: usize,
	pub sources: Vec<RegisterRef>,
}

/// The type-proof modules of a schema, keyed by bit-width.
#[derive(Debug, Default)]
pub struct TypeProofRegistry {
	proofs: BTreeMap<usize, TypeProof>,
}

impl TypeProofRegistry {
	pub(crate) fn get(&self, bitwidth: usize) -> Option<&TypeProof> {
		self.proofs.get(&bitwidth)
	}

	pub(crate) fn insert(&mut self, bitwidth: usize, proof: TypeProof) {
		self.proofs.insert(bitwidth, proof);
	}

	/// Records a register whose values the `bitwidth` type proof must cover.
	pub(crate) fn add_source(&mut self, bitwidth: usize, register: RegisterRef) {
		let proof = self
			.proofs
			.get_mut(&bitwidth)
			.unwrap_or_else(|| panic!("no u{bitwidth} type proof declared"));
		if !proof.sources.contains(&register) {
			proof.sources.push(register);
		}
	}

	/// Attaches a value assignment to every type-proof module.
	pub(crate) fn finalize<F: Field>(self, modules: &mut [Module<F>]) {
		for (bitwidth, proof) in self.proofs {
			let value = RegisterRef::new(proof.module, proof.value);
			let limbs = proof.limbs.map(|limb| RegisterRef::new(proof.module, limb));
			let assignment =
				TypeDecomposition::new(format!("u{bitwidth}"), value, limbs, proof.lo_width, proof.sources);
			modules[proof.module].push_assignment(Box::new(assignment));
		}
	}
}

#[cfg(test)]
mod tests {
	use corset_field::Fr;

	use super::*;

	#[test]
	fn test_determine_limb_split() {
		assert_eq!(determine_limb_split(33), (16, 17));
		assert_eq!(determine_limb_split(32), (16, 16));
		assert_eq!(determine_limb_split(24), (8, 16));
		assert_eq!(determine_limb_split(9), (4, 5));
		assert_eq!(determine_limb_split(3), (1, 2));
		assert_eq!(determine_limb_split(2), (1, 1));
		assert_eq!(determine_limb_split(256), (128, 128));
	}

	#[test]
	fn test_byte_limb_widths() {
		assert_eq!(byte_limb_widths(1), vec![1]);
		assert_eq!(byte_limb_widths(8), vec![8]);
		assert_eq!(byte_limb_widths(20), vec![8, 8, 4]);
	}

	#[test]
	#[should_panic(expected = "zero byte decomposition encountered")]
	fn test_zero_byte_decomposition() {
		byte_limb_widths(0);
	}

	#[test]
	fn test_lowering_policy() {
		let mut builder = SchemaBuilder::<Fr>::new();
		let m = builder.new_module("m", 1);
		let regs = ["b", "r", "w"].map(|name| {
			let id = builder.module_mut(m).new_register(Register::input(name, 64));
			RegisterRef::new(m, id)
		});

		let mut gadget = BitwidthGadget::new(&mut builder);
		gadget.constrain(regs[0], 1);
		gadget.constrain(regs[1], 8);
		gadget.constrain(regs[2], 20);
		// Decomposing twice is a no-op.
		gadget.constrain(regs[2], 20);

		let module = builder.module(m);
		let names = module
			.registers()
			.iter()
			.map(|reg| reg.name().as_str())
			.collect::<Vec<_>>();
		assert_eq!(names, vec!["b", "r", "w", "w'0", "w'1", "w'2"]);
		assert_eq!(module.register(5).width(), 4);
		assert_eq!(module.assignments().count(), 1);

		let handles = module
			.constraints()
			.iter()
			.map(|c| (c.handle(), matches!(c, Constraint::Range(_))))
			.collect::<Vec<_>>();
		assert_eq!(
			handles,
			vec![
				("b:u1", false),
				("r:u8", true),
				("w'0:u8", true),
				("w'1:u8", true),
				("w'2:u4", true),
				("w:u20", false),
			]
		);
	}

	#[test]
	fn test_type_proof_modules_are_shared() {
		let mut builder = SchemaBuilder::<Fr>::new();
		let m = builder.new_module("m", 1);
		let regs = ["x", "y"].map(|name| {
			let id = builder.module_mut(m).new_register(Register::input(name, 32));
			RegisterRef::new(m, id)
		});

		let mut gadget = BitwidthGadget::new(&mut builder).with_limitless(true);
		for reg in regs {
			gadget.constrain(reg, 32);
		}

		let u32_module = builder.has_module("u32").unwrap();
		assert!(builder.has_module("u16").is_some());
		// u32 splits into u16 limbs, u16 into u8 limbs which are range checked natively.
		assert!(builder.has_module("u8").is_none());
		assert_eq!(builder.type_proofs().get(32).unwrap().sources, regs.to_vec());
		assert_eq!(
			builder.type_proofs().get(16).unwrap().sources,
			vec![RegisterRef::new(u32_module, 1), RegisterRef::new(u32_module, 2)]
		);

		let schema = builder.build();
		assert_eq!(schema.module(u32_module).assignments().count(), 1);
	}
}
