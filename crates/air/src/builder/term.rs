// Copyright 2025 Irreducible Inc.

use std::{
	collections::BTreeSet,
	ops::{Add, Mul, Neg, Sub},
};

use corset_field::Field;
use corset_trace::ArrayModule;

use super::register::{Register, RegisterId};

/// An arithmetic expression over the registers of a single module.
///
/// Accesses carry a row shift, so `Access { register, shift: -1 }` reads the previous row.
/// Rows outside a column read the column's padding value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term<F: Field> {
	Const(F),
	Access { register: RegisterId, shift: isize },
	Add(Box<Term<F>>, Box<Term<F>>),
	Sub(Box<Term<F>>, Box<Term<F>>),
	Mul(Box<Term<F>>, Box<Term<F>>),
	Neg(Box<Term<F>>),
}

/// How many rows before and after the current one an expression reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
	pub before: usize,
	pub after: usize,
}

impl Bounds {
	pub fn union(self, other: Self) -> Self {
		Self {
			before: self.before.max(other.before),
			after: self.after.max(other.after),
		}
	}
}

impl<F: Field> Term<F> {
	pub fn access(register: RegisterId) -> Self {
		Self::Access { register, shift: 0 }
	}

	pub fn shifted(register: RegisterId, shift: isize) -> Self {
		Self::Access { register, shift }
	}

	pub fn constant(value: F) -> Self {
		Self::Const(value)
	}

	pub fn zero() -> Self {
		Self::Const(F::ZERO)
	}

	pub fn one() -> Self {
		Self::Const(F::ONE)
	}

	/// Sums the terms, giving zero for an empty iterator.
	pub fn sum(terms: impl IntoIterator<Item = Self>) -> Self {
		terms
			.into_iter()
			.reduce(|acc, term| acc + term)
			.unwrap_or_else(Self::zero)
	}

	/// Moves every access of this term by `by` rows.
	pub fn shift(self, by: isize) -> Self {
		match self {
			Self::Const(_) => self,
			Self::Access { register, shift } => Self::Access {
				register,
				shift: shift + by,
			},
			Self::Add(lhs, rhs) => lhs.shift(by) + rhs.shift(by),
			Self::Sub(lhs, rhs) => lhs.shift(by) - rhs.shift(by),
			Self::Mul(lhs, rhs) => lhs.shift(by) * rhs.shift(by),
			Self::Neg(inner) => -inner.shift(by),
		}
	}

	/// Evaluates the term on the given row of a filled module.
	pub fn eval(&self, row: usize, module: &ArrayModule<F>) -> F {
		match self {
			Self::Const(value) => *value,
			Self::Access { register, shift } => module.column(*register).get(row as isize + shift),
			Self::Add(lhs, rhs) => lhs.eval(row, module) + rhs.eval(row, module),
			Self::Sub(lhs, rhs) => lhs.eval(row, module) - rhs.eval(row, module),
			Self::Mul(lhs, rhs) => lhs.eval(row, module) * rhs.eval(row, module),
			Self::Neg(inner) => -inner.eval(row, module),
		}
	}

	/// Registers read by this term, in ascending order.
	pub fn registers(&self) -> Vec<RegisterId> {
		let mut registers = BTreeSet::new();
		self.collect_registers(&mut registers);
		registers.into_iter().collect()
	}

	fn collect_registers(&self, registers: &mut BTreeSet<RegisterId>) {
		match self {
			Self::Const(_) => {}
			Self::Access { register, .. } => {
				registers.insert(*register);
			}
			Self::Add(lhs, rhs) | Self::Sub(lhs, rhs) | Self::Mul(lhs, rhs) => {
				lhs.collect_registers(registers);
				rhs.collect_registers(registers);
			}
			Self::Neg(inner) => inner.collect_registers(registers),
		}
	}

	pub fn bounds(&self) -> Bounds {
		match self {
			Self::Const(_) => Bounds::default(),
			Self::Access { shift, .. } => Bounds {
				before: if *shift < 0 { shift.unsigned_abs() } else { 0 },
				after: if *shift > 0 { *shift as usize } else { 0 },
			},
			Self::Add(lhs, rhs) | Self::Sub(lhs, rhs) | Self::Mul(lhs, rhs) => {
				lhs.bounds().union(rhs.bounds())
			}
			Self::Neg(inner) => inner.bounds(),
		}
	}

	/// Renders the term as an s-expression using the given register names.
	///
	/// Structurally equal terms render identically, so the rendering doubles as a key for
	/// memoising registers derived from a term.
	pub fn lisp(&self, registers: &[Register<F>]) -> String {
		match self {
			Self::Const(value) => value.to_decimal(),
			Self::Access { register, shift: 0 } => registers[*register].name().clone(),
			Self::Access { register, shift } => {
				format!("(shift {} {})", registers[*register].name(), shift)
			}
			Self::Add(lhs, rhs) => format!("(+ {} {})", lhs.lisp(registers), rhs.lisp(registers)),
			Self::Sub(lhs, rhs) => format!("(- {} {})", lhs.lisp(registers), rhs.lisp(registers)),
			Self::Mul(lhs, rhs) => format!("(* {} {})", lhs.lisp(registers), rhs.lisp(registers)),
			Self::Neg(inner) => format!("(- {})", inner.lisp(registers)),
		}
	}
}

impl<F: Field> From<F> for Term<F> {
	fn from(value: F) -> Self {
		Self::Const(value)
	}
}

impl<F: Field> Add for Term<F> {
	type Output = Self;

	fn add(self, rhs: Self) -> Self::Output {
		Self::Add(Box::new(self), Box::new(rhs))
	}
}

impl<F: Field> Add<F> for Term<F> {
	type Output = Self;

	fn add(self, rhs: F) -> Self::Output {
		self + Self::Const(rhs)
	}
}

impl<F: Field> Sub for Term<F> {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self::Output {
		Self::Sub(Box::new(self), Box::new(rhs))
	}
}

impl<F: Field> Sub<F> for Term<F> {
	type Output = Self;

	fn sub(self, rhs: F) -> Self::Output {
		self - Self::Const(rhs)
	}
}

impl<F: Field> Mul for Term<F> {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self::Output {
		Self::Mul(Box::new(self), Box::new(rhs))
	}
}

impl<F: Field> Mul<F> for Term<F> {
	type Output = Self;

	fn mul(self, rhs: F) -> Self::Output {
		self * Self::Const(rhs)
	}
}

impl<F: Field> Neg for Term<F> {
	type Output = Self;

	fn neg(self) -> Self::Output {
		Self::Neg(Box::new(self))
	}
}

#[cfg(test)]
mod tests {
	use corset_field::Fr;
	use corset_trace::Column;

	use super::*;

	fn module() -> (Vec<Register<Fr>>, ArrayModule<Fr>) {
		let registers = vec![Register::input("x", 8), Register::input("y", 8)];
		let columns = vec![
			Column::new("x", vec![Fr::from(1u64), Fr::from(2u64), Fr::from(4u64)], Fr::from(0u64)),
			Column::new("y", vec![Fr::from(3u64), Fr::from(5u64), Fr::from(7u64)], Fr::from(9u64)),
		];
		(registers, ArrayModule::new("m", 3, columns))
	}

	#[test]
	fn test_eval_with_shifts_and_padding() {
		let (_, module) = module();
		let x = Term::<Fr>::access(0);
		let prev_y = Term::shifted(1, -1);

		let term = x.clone() * prev_y + Fr::from(1u64);
		assert_eq!(term.eval(0, &module), Fr::from(10u64));
		assert_eq!(term.eval(2, &module), Fr::from(21u64));

		let diff = x.clone() - x.shift(1);
		assert_eq!(diff.eval(0, &module), -Fr::from(1u64));
		assert_eq!(diff.eval(2, &module), Fr::from(4u64));
	}

	#[test]
	fn test_bounds_and_registers() {
		let term = Term::<Fr>::shifted(1, -2) * Term::shifted(0, 1) - Term::access(1);
		assert_eq!(term.bounds(), Bounds { before: 2, after: 1 });
		assert_eq!(term.registers(), vec![0, 1]);
		assert_eq!(Term::<Fr>::one().bounds(), Bounds::default());
	}

	#[test]
	fn test_lisp() {
		let (registers, _) = module();
		let term = Term::<Fr>::access(0) - Term::shifted(0, -1);
		assert_eq!(term.lisp(&registers), "(- x (shift x -1))");
		assert_eq!((-Term::<Fr>::access(1)).lisp(&registers), "(- y)");
		assert_eq!(Term::<Fr>::sum([]).lisp(&registers), "0");
	}
}
