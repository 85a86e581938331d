// Copyright 2025 Irreducible Inc.

use corset_field::Field;
use getset::{CopyGetters, Getters};

/// The runtime data of one register: a named array of field elements.
///
/// Reads outside `0..len` return the padding value, which is how row shifts before the first row
/// or past the last row are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Column<F: Field> {
	#[get = "pub"]
	name: String,
	#[get = "pub"]
	data: Vec<F>,
	#[get_copy = "pub"]
	padding: F,
}

impl<F: Field> Column<F> {
	pub fn new(name: impl ToString, data: Vec<F>, padding: F) -> Self {
		Self {
			name: name.to_string(),
			data,
			padding,
		}
	}

	/// A column with no rows yet, used for registers awaiting expansion.
	pub fn empty(name: impl ToString, padding: F) -> Self {
		Self::new(name, Vec::new(), padding)
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Reads a row, returning the padding value when `row` is out of bounds.
	pub fn get(&self, row: isize) -> F {
		usize::try_from(row)
			.ok()
			.and_then(|row| self.data.get(row).copied())
			.unwrap_or(self.padding)
	}

	/// Overwrites a row.
	///
	/// ## Preconditions
	///
	/// * `row` is less than the column length
	pub fn set(&mut self, row: usize, value: F) {
		self.data[row] = value;
	}
}
