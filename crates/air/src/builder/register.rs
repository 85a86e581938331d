// Copyright 2025 Irreducible Inc.

use std::fmt;

use corset_field::Field;
use getset::{CopyGetters, Getters};

pub type ModuleId = usize;
pub type RegisterId = usize;

/// Width of registers whose values may be any field element, such as pseudo-inverses.
///
/// Such registers are exempt from bit-width validation.
pub const UNBOUNDED_WIDTH: usize = usize::MAX;

/// Identifies a register by its module and its index within that module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterRef {
	pub module: ModuleId,
	pub register: RegisterId,
}

impl RegisterRef {
	pub const fn new(module: ModuleId, register: RegisterId) -> Self {
		Self { module, register }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
	/// Filled from the input trace.
	Input,
	/// Filled during trace expansion by an assignment.
	Computed,
}

/// A column declaration inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Register<F: Field> {
	#[get = "pub"]
	name: String,
	/// Number of bits every value must fit in.
	#[get_copy = "pub"]
	width: usize,
	#[get_copy = "pub"]
	kind: RegisterKind,
	/// Value read for rows outside the column.
	#[get_copy = "pub"]
	padding: F,
}

impl<F: Field> Register<F> {
	pub fn input(name: impl ToString, width: usize) -> Self {
		Self::new(name, width, RegisterKind::Input)
	}

	pub fn computed(name: impl ToString, width: usize) -> Self {
		Self::new(name, width, RegisterKind::Computed)
	}

	fn new(name: impl ToString, width: usize, kind: RegisterKind) -> Self {
		Self {
			name: name.to_string(),
			width,
			kind,
			padding: F::ZERO,
		}
	}

	pub fn with_padding(mut self, padding: F) -> Self {
		self.padding = padding;
		self
	}

	pub fn is_input(&self) -> bool {
		self.kind == RegisterKind::Input
	}

	pub fn is_computed(&self) -> bool {
		self.kind == RegisterKind::Computed
	}

	pub fn is_unbounded(&self) -> bool {
		self.width == UNBOUNDED_WIDTH
	}
}

impl<F: Field> fmt::Display for Register<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match self.kind {
			RegisterKind::Input => "input",
			RegisterKind::Computed => "computed",
		};
		if self.is_unbounded() {
			write!(f, "{} {} :𝔽", kind, self.name)
		} else {
			write!(f, "{} {} :u{}", kind, self.name, self.width)
		}
	}
}
