// Copyright 2025 Irreducible Inc.

use std::collections::BTreeSet;

use corset_field::Field;
use corset_trace::{ArrayTrace, Column};

use crate::builder::{Assignment, RegisterRef, Schema};

/// Fills the byte limbs of a register, least significant first.
///
/// Bits beyond the total limb width are dropped. A value that does not fit its declared width is
/// caught by validation and by the recomposition constraint, not here.
#[derive(Debug)]
pub struct ByteDecomposition {
	name: String,
	source: RegisterRef,
	targets: Vec<RegisterRef>,
	widths: Vec<usize>,
}

impl ByteDecomposition {
	pub fn new(
		name: impl ToString,
		source: RegisterRef,
		targets: Vec<RegisterRef>,
		widths: Vec<usize>,
	) -> Self {
		assert_eq!(targets.len(), widths.len());
		Self {
			name: name.to_string(),
			source,
			targets,
			widths,
		}
	}

	fn decompose<F: Field>(&self, mut value: F) -> Vec<F> {
		self.widths
			.iter()
			.map(|&width| {
				let (lo, hi) = value.split(width);
				value = hi;
				lo
			})
			.collect()
	}
}

impl<F: Field> Assignment<F> for ByteDecomposition {
	fn name(&self) -> &str {
		&self.name
	}

	fn sources(&self) -> Vec<RegisterRef> {
		vec![self.source]
	}

	fn targets(&self) -> Vec<RegisterRef> {
		self.targets.clone()
	}

	fn compute(&self, trace: &ArrayTrace<F>, schema: &Schema<F>) -> anyhow::Result<Vec<Column<F>>> {
		let source = trace
			.module(self.source.module)
			.column(self.source.register);

		let mut limbs = vec![Vec::with_capacity(source.len()); self.targets.len()];
		for &value in source.data() {
			for (limb, part) in limbs.iter_mut().zip(self.decompose(value)) {
				limb.push(part);
			}
		}

		let padding = self.decompose(source.padding());
		Ok(self
			.targets
			.iter()
			.zip(limbs)
			.zip(padding)
			.map(|((&target, data), padding)| Column::new(schema.register(target).name(), data, padding))
			.collect())
	}
}

/// Fills a type-proof module `u{n}` with every distinct value found in its source registers,
/// along with the two limbs of each value.
///
/// The module height becomes the number of distinct values.
#[derive(Debug)]
pub struct TypeDecomposition {
	name: String,
	value: RegisterRef,
	limbs: [RegisterRef; 2],
	lo_width: usize,
	sources: Vec<RegisterRef>,
}

impl TypeDecomposition {
	pub fn new(
		name: impl ToString,
		value: RegisterRef,
		limbs: [RegisterRef; 2],
		lo_width: usize,
		sources: Vec<RegisterRef>,
	) -> Self {
		Self {
			name: name.to_string(),
			value,
			limbs,
			lo_width,
			sources,
		}
	}
}

impl<F: Field> Assignment<F> for TypeDecomposition {
	fn name(&self) -> &str {
		&self.name
	}

	fn sources(&self) -> Vec<RegisterRef> {
		self.sources.clone()
	}

	fn targets(&self) -> Vec<RegisterRef> {
		vec![self.value, self.limbs[0], self.limbs[1]]
	}

	fn compute(&self, trace: &ArrayTrace<F>, schema: &Schema<F>) -> anyhow::Result<Vec<Column<F>>> {
		let values = self
			.sources
			.iter()
			.flat_map(|source| {
				trace
					.module(source.module)
					.column(source.register)
					.data()
					.iter()
					.copied()
			})
			.collect::<BTreeSet<F>>();

		let (lo, hi) = values
			.iter()
			.map(|value| value.split(self.lo_width))
			.unzip::<_, _, Vec<_>, Vec<_>>();
		let values: Vec<F> = values.into_iter().collect();

		let column = |register: RegisterRef, data: Vec<F>| {
			Column::new(schema.register(register).name(), data, F::ZERO)
		};
		Ok(vec![
			column(self.value, values),
			column(self.limbs[0], lo),
			column(self.limbs[1], hi),
		])
	}
}
